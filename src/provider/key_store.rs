//! KeyStore.BEE
//!
//! Stream layout:
//!
//! ```text
//! magic 0xbeecceec, version 1
//! salt size, salt, iteration count
//! entry count                                   -+
//! entries, sorted by alias                       | HMAC-SHA-256
//!   1: alias, date, protected key, chain         |
//!   2: alias, date, certificate                 -+
//! MAC
//! ```
//!
//! The MAC key is derived from the store password, salt and iteration
//! count with the PKCS#12 KDF. Certificates are stored as type, length and
//! encoding and decoded with the registry's certificate factories.

use std::collections::hash_map::Entry as Slot;
use std::collections::{BTreeMap, HashMap};
use std::io::{Read, Write};
use std::sync::Arc;

use chrono::Utc;
use log::{debug, warn};

use crate::common::{DataInputStream, DataOutputStream, Result, SecurityError};
use crate::security::cert::{Certificate, CertificateFactory};
use crate::security::key::{Key, Pkcs12PbeKey};
use crate::security::random::SecureRandom;
use crate::security::registry::Security;
use crate::security::spi::{KeyStoreSpi, MacSpi};

use super::hmac::HmacEngine;
use super::key_protector::KeyProtector;

pub const BKS_MAGIC: i32 = 0xbeecceec_u32 as i32;
pub const BKS_VERSION_1: i32 = 1;

const PRIVATE_KEY_ENTRY: i32 = 1;
const CERTIFICATE_ENTRY: i32 = 2;

const DEFAULT_SALT_LEN: usize = 64;
const DEFAULT_ITERATIONS: u32 = 1024;

const TAMPERED: &str = "KeyStore has been tampered with, or password was incorrect";

enum Entry {
    Key {
        date: i64,
        protected: Vec<u8>,
        chain: Vec<Arc<dyn Certificate>>,
    },
    Cert {
        date: i64,
        cert: Arc<dyn Certificate>,
    },
}

impl Entry {
    fn date(&self) -> i64 {
        match self {
            Entry::Key { date, .. } | Entry::Cert { date, .. } => *date,
        }
    }

    /// The entry's own certificate, or the first of its chain
    fn certificate(&self) -> Option<&Arc<dyn Certificate>> {
        match self {
            Entry::Key { chain, .. } => chain.first(),
            Entry::Cert { cert, .. } => Some(cert),
        }
    }
}

pub struct BeeKeyStore {
    entries: BTreeMap<String, Entry>,
    salt: Vec<u8>,
    iterations: u32,
    random: SecureRandom,
}

impl BeeKeyStore {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            salt: Vec::new(),
            iterations: DEFAULT_ITERATIONS,
            random: SecureRandom::default_instance(),
        }
    }

    fn mac(&self, password: Option<&str>, data: &[u8]) -> Result<Vec<u8>> {
        let key = Key::Pbe(Pkcs12PbeKey::new(password.unwrap_or(""), &self.salt, self.iterations));
        let mut mac = HmacEngine::sha256();
        mac.init(&key, None)?;
        mac.update(data);
        Ok(mac.do_final())
    }

    fn read_certificate(
        security: &Security,
        factories: &mut HashMap<String, CertificateFactory>,
        input: &mut DataInputStream<&[u8]>,
    ) -> Result<Arc<dyn Certificate>> {
        let cert_type = input.read_utf()?;
        let size = input.read_i32()?;
        if size <= 0 {
            return Err(SecurityError::invalid_data("Invalid KeyStore certificate size"));
        }
        let encoded = input.read_bytes(size as usize)?;

        let factory = match factories.entry(cert_type) {
            Slot::Occupied(slot) => slot.into_mut(),
            Slot::Vacant(slot) => {
                let f = CertificateFactory::get_instance(security, slot.key())?;
                slot.insert(f)
            }
        };
        factory.generate_certificate(security, &mut encoded.as_slice())
    }

    fn write_certificate(out: &mut DataOutputStream, cert: &dyn Certificate) -> Result<()> {
        out.write_utf(cert.cert_type())?;
        out.write_sized(cert.encoded()?)
    }

    fn read_entries(&mut self, security: &Security, body: &[u8]) -> Result<()> {
        let mut input = DataInputStream::new(body);
        let mut factories = HashMap::new();

        let count = input.read_i32()?;
        if count < 0 {
            return Err(SecurityError::invalid_data("Invalid KeyStore entry count"));
        }

        for _ in 0..count {
            match input.read_i32()? {
                PRIVATE_KEY_ENTRY => {
                    let alias = input.read_utf()?;
                    let date = input.read_i64()?;
                    let size = input.read_i32()?;
                    if size <= 0 {
                        return Err(SecurityError::invalid_data("Invalid KeyStore key length"));
                    }
                    let protected = input.read_bytes(size as usize)?;
                    let certs = input.read_i32()?;
                    if certs <= 0 {
                        return Err(SecurityError::invalid_data("Invalid KeyStore certificate count"));
                    }
                    let mut chain = Vec::with_capacity(certs.min(16) as usize);
                    for _ in 0..certs {
                        chain.push(Self::read_certificate(security, &mut factories, &mut input)?);
                    }
                    self.entries.insert(alias, Entry::Key { date, protected, chain });
                }
                CERTIFICATE_ENTRY => {
                    let alias = input.read_utf()?;
                    let date = input.read_i64()?;
                    let cert = Self::read_certificate(security, &mut factories, &mut input)?;
                    self.entries.insert(alias, Entry::Cert { date, cert });
                }
                _ => return Err(SecurityError::invalid_data("Invalid KeyStore entry tag")),
            }
        }

        if input.available() != 0 {
            return Err(SecurityError::invalid_data("Invalid KeyStore format"));
        }
        Ok(())
    }

    fn write_entries(&self) -> Result<Vec<u8>> {
        let mut out = DataOutputStream::new();
        let count = i32::try_from(self.entries.len())
            .map_err(|_| SecurityError::KeyStore("too many entries".to_string()))?;
        out.write_i32(count);

        for (alias, entry) in &self.entries {
            match entry {
                Entry::Key { date, protected, chain } => {
                    out.write_i32(PRIVATE_KEY_ENTRY);
                    out.write_utf(alias)?;
                    out.write_i64(*date);
                    out.write_sized(protected)?;
                    out.write_i32(chain.len() as i32);
                    for cert in chain {
                        Self::write_certificate(&mut out, cert.as_ref())?;
                    }
                }
                Entry::Cert { date, cert } => {
                    out.write_i32(CERTIFICATE_ENTRY);
                    out.write_utf(alias)?;
                    out.write_i64(*date);
                    Self::write_certificate(&mut out, cert.as_ref())?;
                }
            }
        }
        Ok(out.into_vec())
    }
}

impl Default for BeeKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

impl KeyStoreSpi for BeeKeyStore {
    fn load(&mut self, security: &Security, reader: Option<&mut dyn Read>, password: Option<&str>) -> Result<()> {
        self.entries.clear();

        let Some(reader) = reader else {
            self.salt = vec![0u8; DEFAULT_SALT_LEN];
            self.random.next_bytes(&mut self.salt);
            self.iterations = DEFAULT_ITERATIONS;
            debug!("Initialized empty key store");
            return Ok(());
        };

        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        let mut input = DataInputStream::new(data.as_slice());

        let magic = input.read_i32()?;
        let version = input.read_i32()?;
        if magic != BKS_MAGIC || version != BKS_VERSION_1 {
            return Err(SecurityError::invalid_data("Invalid KeyStore format"));
        }

        let salt_size = input.read_i32()?;
        if salt_size <= 0 {
            return Err(SecurityError::invalid_data("Invalid KeyStore salt size"));
        }
        let salt = input.read_bytes(salt_size as usize)?;
        let iterations = input.read_i32()?;
        if iterations <= 0 {
            return Err(SecurityError::invalid_data("Invalid KeyStore iteration count"));
        }
        self.salt = salt;
        self.iterations = iterations as u32;

        let rest = data.len() - input.available();
        let mac_len = HmacEngine::sha256().mac_length();
        if input.available() < mac_len + 4 {
            return Err(SecurityError::KeyStore(TAMPERED.to_string()));
        }
        let (body, stored_mac) = data[rest..].split_at(input.available() - mac_len);

        // plain comparison, not constant time
        if self.mac(password, body)? != stored_mac {
            warn!("Key store integrity check failed");
            return Err(SecurityError::KeyStore(TAMPERED.to_string()));
        }

        self.read_entries(security, body)?;
        debug!("Loaded key store with {} entries", self.entries.len());
        Ok(())
    }

    fn store(&mut self, writer: &mut dyn Write, password: Option<&str>) -> Result<()> {
        let body = self.write_entries()?;
        let mac = self.mac(password, &body)?;

        let mut out = DataOutputStream::with_capacity(body.len() + self.salt.len() + 64);
        out.write_i32(BKS_MAGIC);
        out.write_i32(BKS_VERSION_1);
        out.write_sized(&self.salt)?;
        out.write_i32(self.iterations as i32);
        out.write(&body);
        out.write(&mac);

        writer.write_all(out.as_slice())?;
        writer.flush()?;
        Ok(())
    }

    fn aliases(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    fn contains_alias(&self, alias: &str) -> bool {
        self.entries.contains_key(alias)
    }

    fn delete_entry(&mut self, alias: &str) -> Result<()> {
        self.entries.remove(alias);
        Ok(())
    }

    fn creation_date(&self, alias: &str) -> Option<i64> {
        self.entries.get(alias).map(Entry::date)
    }

    fn get_key(&self, security: &Security, alias: &str, password: &str) -> Result<Option<Key>> {
        match self.entries.get(alias) {
            Some(Entry::Key { protected, .. }) => {
                let key = KeyProtector::new(password, self.iterations).recover(security, protected)?;
                Ok(Some(Key::Private(key)))
            }
            _ => Ok(None),
        }
    }

    fn get_certificate(&self, alias: &str) -> Option<Arc<dyn Certificate>> {
        self.entries.get(alias).and_then(Entry::certificate).cloned()
    }

    fn get_certificate_chain(&self, alias: &str) -> Option<Vec<Arc<dyn Certificate>>> {
        match self.entries.get(alias) {
            Some(Entry::Key { chain, .. }) => Some(chain.clone()),
            _ => None,
        }
    }

    fn get_certificate_alias(&self, cert: &dyn Certificate) -> Option<String> {
        self.entries
            .iter()
            .find(|(_, entry)| entry.certificate().map_or(false, |c| **c == *cert))
            .map(|(alias, _)| alias.clone())
    }

    fn is_key_entry(&self, alias: &str) -> bool {
        matches!(self.entries.get(alias), Some(Entry::Key { .. }))
    }

    fn is_certificate_entry(&self, alias: &str) -> bool {
        matches!(self.entries.get(alias), Some(Entry::Cert { .. }))
    }

    fn set_key_entry(&mut self, alias: &str, key: &Key, password: &str, chain: Vec<Arc<dyn Certificate>>) -> Result<()> {
        let Key::Private(private) = key else {
            return Err(SecurityError::KeyStore(
                "BeeKeyStore only supports storing of PrivateKey objects".to_string(),
            ));
        };
        if chain.is_empty() {
            return Err(SecurityError::KeyStore("a private key entry needs a certificate chain".to_string()));
        }
        let protected = KeyProtector::new(password, self.iterations)
            .protect(private, &mut self.random)
            .map_err(|e| match e {
                SecurityError::InvalidKey(msg) => SecurityError::KeyStore(msg),
                other => other,
            })?;
        self.entries.insert(alias.to_string(), Entry::Key { date: now_millis(), protected, chain });
        Ok(())
    }

    fn set_certificate_entry(&mut self, alias: &str, cert: Arc<dyn Certificate>) -> Result<()> {
        self.entries.insert(alias.to_string(), Entry::Cert { date: now_millis(), cert });
        Ok(())
    }

    fn size(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beeyond::BeeCertificate;
    use crate::security::key_pair_generator::KeyPairGenerator;

    fn fixture(security: &Security) -> (Key, Arc<dyn Certificate>) {
        let mut kpg = KeyPairGenerator::get_instance(security, "DSA").unwrap();
        kpg.initialize(512).unwrap();
        let (public, private) = kpg.generate_key_pair().unwrap().into_parts();
        let cert = BeeCertificate::self_signed(security, &public, &private, "SHA1withDSA").unwrap();
        (Key::Private(private), Arc::new(cert))
    }

    #[test]
    fn test_store_and_load() {
        let security = Security::with_builtin();
        let (key, cert) = fixture(&security);

        let mut ks = BeeKeyStore::new();
        ks.load(&security, None, None).unwrap();
        ks.set_key_entry("signer", &key, "keypass", vec![cert.clone()]).unwrap();
        ks.set_certificate_entry("trusted", cert.clone()).unwrap();

        let mut bytes = Vec::new();
        ks.store(&mut bytes, Some("storepass")).unwrap();
        assert_eq!(&bytes[..4], &[0xbe, 0xec, 0xce, 0xec]);

        let mut loaded = BeeKeyStore::new();
        loaded.load(&security, Some(&mut bytes.as_slice()), Some("storepass")).unwrap();
        assert_eq!(loaded.aliases(), vec!["signer".to_string(), "trusted".to_string()]);
        assert!(loaded.is_key_entry("signer"));
        assert!(loaded.is_certificate_entry("trusted"));
        assert_eq!(loaded.get_key(&security, "signer", "keypass").unwrap(), Some(key));
        assert_eq!(loaded.get_key(&security, "trusted", "keypass").unwrap(), None);
        assert_eq!(loaded.get_certificate_alias(cert.as_ref()), Some("signer".to_string()));
        assert!(matches!(
            loaded.get_key(&security, "signer", "wrong"),
            Err(SecurityError::UnrecoverableKey(_))
        ));
    }

    #[test]
    fn test_tamper_and_wrong_password() {
        let security = Security::with_builtin();
        let (_, cert) = fixture(&security);
        let mut ks = BeeKeyStore::new();
        ks.load(&security, None, None).unwrap();
        ks.set_certificate_entry("ca", cert).unwrap();
        let mut bytes = Vec::new();
        ks.store(&mut bytes, Some("pw")).unwrap();

        let mut other = BeeKeyStore::new();
        match other.load(&security, Some(&mut bytes.as_slice()), Some("PW")) {
            Err(SecurityError::KeyStore(msg)) => assert_eq!(msg, TAMPERED),
            other => panic!("Expected KeyStore error, got {:?}", other),
        }

        let mid = bytes.len() / 2;
        bytes[mid] ^= 0x40;
        assert!(matches!(
            other.load(&security, Some(&mut bytes.as_slice()), Some("pw")),
            Err(SecurityError::KeyStore(_))
        ));
    }

    #[test]
    fn test_only_private_keys() {
        let security = Security::with_builtin();
        let (_, cert) = fixture(&security);
        let public = Key::Public(cert.public_key().unwrap().clone());
        let mut ks = BeeKeyStore::new();
        ks.load(&security, None, None).unwrap();
        assert!(matches!(
            ks.set_key_entry("x", &public, "pw", vec![cert]),
            Err(SecurityError::KeyStore(_))
        ));
    }

    #[test]
    fn test_bad_magic() {
        let security = Security::with_builtin();
        let data = [0u8; 16];
        let err = BeeKeyStore::new().load(&security, Some(&mut &data[..]), None).unwrap_err();
        assert!(err.is_io());
    }
}
