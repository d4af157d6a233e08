//! BeeCrypt: pluggable cryptographic services framework
//!
//! A process-wide registry of named providers publishes algorithm
//! implementations; engine façades (`Signature`, `KeyFactory`,
//! `KeyPairGenerator`, `MessageDigest`, `Mac`, `AlgorithmParameters`,
//! `AlgorithmParameterGenerator`, `CertificateFactory`, `KeyStore`) look
//! them up by name and drive them through a uniform lifecycle.
//!
//! # Main Features
//!
//! - Provider registry configured from a properties file
//! - BEE key encoding for DH, DSA and RSA keys
//! - BEE certificates with an extensible field list
//! - SHA1withDSA, SHA1withRSA and SHA256withRSA signatures
//! - DH, DSA and RSA key pair and parameter generation
//! - Password protected key store
//!
//! # Example
//!
//! ```no_run
//! use beecrypt::beeyond::BeeCertificate;
//! use beecrypt::security::{Certificate, KeyPairGenerator, Security};
//!
//! # fn main() -> beecrypt::Result<()> {
//! let security = Security::global();
//! let mut kpg = KeyPairGenerator::get_instance(security, "DSA")?;
//! kpg.initialize(1024)?;
//! let pair = kpg.generate_key_pair()?;
//!
//! let cert = BeeCertificate::self_signed(security, pair.public(), pair.private(), "SHA1withDSA")?;
//! cert.verify(security, pair.public())?;
//! # Ok(())
//! # }
//! ```

pub mod beeyond;
pub mod common;
pub mod config;
pub mod crypto;
pub mod provider;
pub mod security;

pub use common::{Result, SecurityError};
pub use security::Security;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
