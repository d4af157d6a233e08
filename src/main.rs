//! BeeCrypt Command Line Tool
//!
//! `beetool` drives the security framework end to end: it lists the
//! installed providers, generates key pairs into a key store, exports
//! self-signed certificates and inspects or verifies BEE certificates.

use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::{debug, info};
use serde::Serialize;

use beecrypt::beeyond::BeeCertificate;
use beecrypt::common::{init_logger, Result, SecurityError};
use beecrypt::config::SecuritySettings;
use beecrypt::security::{Certificate, Key, KeyPairGenerator, KeyStore, ProviderCatalog, Security};
use beecrypt::{APP_NAME, VERSION};

/// BeeCrypt key and certificate tool
#[derive(Parser, Debug)]
#[clap(author, version = VERSION, about, long_about = None)]
struct Args {
    /// Log level (overrides the settings file, not RUST_LOG)
    #[clap(long)]
    log_level: Option<String>,

    /// Provider configuration file
    #[clap(long, env = "BEECRYPT_CONF_FILE")]
    conf_file: Option<PathBuf>,

    /// JSON settings file
    #[clap(long, env = "BEECRYPT_SETTINGS_FILE")]
    settings: Option<PathBuf>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List installed providers and their services
    Providers {
        /// Print as JSON
        #[clap(long)]
        json: bool,
    },

    /// Generate a key pair and store it with a self-signed certificate
    Keygen {
        /// Key algorithm (DSA or RSA)
        #[clap(long, default_value = "DSA")]
        algorithm: String,

        /// Key size in bits
        #[clap(long, default_value_t = 1024)]
        size: usize,

        /// Signature algorithm for the certificate; derived from the key algorithm if omitted
        #[clap(long)]
        sigalg: Option<String>,

        /// Key store file, created if missing
        #[clap(long)]
        keystore: PathBuf,

        /// Key store password
        #[clap(long)]
        storepass: String,

        /// Password protecting the private key; defaults to the store password
        #[clap(long)]
        keypass: Option<String>,

        /// Entry alias
        #[clap(long, default_value = "mykey")]
        alias: String,
    },

    /// Export the certificate of a key store entry
    SelfCert {
        #[clap(long)]
        keystore: PathBuf,

        #[clap(long)]
        storepass: String,

        #[clap(long, default_value = "mykey")]
        alias: String,

        /// Output file
        #[clap(long)]
        out: PathBuf,
    },

    /// Print a BEE certificate
    ShowCert {
        file: PathBuf,
    },

    /// Verify a BEE certificate's signature and validity window
    VerifyCert {
        file: PathBuf,

        /// Issuer certificate; the certificate's own key is used if omitted
        #[clap(long)]
        issuer: Option<PathBuf>,

        /// Check validity at this instant (milliseconds since the epoch) instead of now
        #[clap(long)]
        at: Option<i64>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = SecuritySettings::load_from(args.settings.as_deref())?;
    if let Some(conf_file) = args.conf_file.clone() {
        settings.conf_file = conf_file;
    }
    if let Some(level) = args.log_level.clone() {
        settings.log_level = level;
    }

    init_logger(&settings.log_level);
    info!("Starting {} v{}", APP_NAME, VERSION);
    debug!("Provider configuration: {}", settings.conf_file.display());

    let security = Security::from_settings(&settings, &ProviderCatalog::builtin());

    match args.command {
        Command::Providers { json } => list_providers(&security, json),
        Command::Keygen { algorithm, size, sigalg, keystore, storepass, keypass, alias } => {
            let keypass = keypass.unwrap_or_else(|| storepass.clone());
            keygen(&security, &algorithm, size, sigalg.as_deref(), &keystore, &storepass, &keypass, &alias)
        }
        Command::SelfCert { keystore, storepass, alias, out } => {
            export_certificate(&security, &keystore, &storepass, &alias, &out)
        }
        Command::ShowCert { file } => {
            let cert = read_certificate(&security, &file)?;
            println!("{}", cert);
            debug!("{} fields, fingerprint {}", cert.fields().len(), cert.fingerprint()?);
            Ok(())
        }
        Command::VerifyCert { file, issuer, at } => verify_certificate(&security, &file, issuer.as_deref(), at),
    }
}

/// Provider summary printed by `providers --json`
#[derive(Serialize, Debug)]
struct ProviderInfo {
    position: usize,
    name: String,
    version: f64,
    info: String,
    services: Vec<String>,
}

fn list_providers(security: &Security, json: bool) -> Result<()> {
    if json {
        let list: Vec<ProviderInfo> = security
            .providers()
            .iter()
            .enumerate()
            .map(|(i, p)| ProviderInfo {
                position: i + 1,
                name: p.name().to_string(),
                version: p.version(),
                info: p.info().to_string(),
                services: p.services().map(str::to_string).collect(),
            })
            .collect();
        let text = serde_json::to_string_pretty(&list)
            .map_err(|e| SecurityError::Config(format!("Failed to serialize provider list: {}", e)))?;
        println!("{}", text);
        return Ok(());
    }

    for (i, provider) in security.providers().iter().enumerate() {
        println!("{}. {} {} ({})", i + 1, provider.name(), provider.version(), provider.info());
        for service in provider.services() {
            println!("    {}", service);
        }
    }
    Ok(())
}

fn default_signature_algorithm(key_algorithm: &str) -> Result<&'static str> {
    match key_algorithm.to_ascii_uppercase().as_str() {
        "DSA" => Ok("SHA1withDSA"),
        "RSA" => Ok("SHA1withRSA"),
        other => Err(SecurityError::NoSuchAlgorithm(format!("no signature algorithm for {} keys", other))),
    }
}

fn open_keystore(security: &Security, path: &Path, storepass: &str) -> Result<KeyStore> {
    let mut ks = KeyStore::get_default(security)?;
    if path.exists() {
        let mut reader = BufReader::new(File::open(path)?);
        ks.load(security, Some(&mut reader), Some(storepass))?;
    } else {
        ks.load(security, None, None)?;
    }
    Ok(ks)
}

#[allow(clippy::too_many_arguments)]
fn keygen(
    security: &Security,
    algorithm: &str,
    size: usize,
    sigalg: Option<&str>,
    keystore: &Path,
    storepass: &str,
    keypass: &str,
    alias: &str,
) -> Result<()> {
    let sigalg = match sigalg {
        Some(s) => s,
        None => default_signature_algorithm(algorithm)?,
    };

    let mut kpg = KeyPairGenerator::get_instance(security, algorithm)?;
    kpg.initialize(size)?;
    let pair = kpg.generate_key_pair()?;
    info!("Generated {}-bit {} key pair", size, algorithm);

    let cert = BeeCertificate::self_signed(security, pair.public(), pair.private(), sigalg)?;

    let mut ks = open_keystore(security, keystore, storepass)?;
    ks.set_key_entry(alias, &Key::Private(pair.private().clone()), keypass, vec![Arc::new(cert)])?;

    let mut out = File::create(keystore)?;
    ks.store(&mut out, Some(storepass))?;
    info!("Stored {} in {}", alias, keystore.display());
    Ok(())
}

fn export_certificate(security: &Security, keystore: &Path, storepass: &str, alias: &str, out: &Path) -> Result<()> {
    let ks = open_keystore(security, keystore, storepass)?;
    let cert = ks
        .get_certificate(alias)?
        .ok_or_else(|| SecurityError::KeyStore(format!("no certificate for alias {}", alias)))?;
    fs::write(out, cert.encoded()?)?;
    info!("Wrote certificate {} to {}", alias, out.display());
    Ok(())
}

fn read_certificate(security: &Security, path: &Path) -> Result<BeeCertificate> {
    let mut reader = BufReader::new(File::open(path)?);
    BeeCertificate::decode(security, &mut reader)
}

fn verify_certificate(security: &Security, file: &Path, issuer: Option<&Path>, at: Option<i64>) -> Result<()> {
    let cert = read_certificate(security, file)?;

    let issuer_cert = match issuer {
        Some(path) => Some(read_certificate(security, path)?),
        None => None,
    };
    let key = issuer_cert
        .as_ref()
        .unwrap_or(&cert)
        .public_key()
        .ok_or_else(|| SecurityError::Certificate("certificate carries no public key".to_string()))?;

    cert.verify(security, key)?;
    match at {
        Some(millis) => cert.check_validity_at(millis)?,
        None => cert.check_validity()?,
    }
    println!("{}: OK", file.display());
    Ok(())
}
