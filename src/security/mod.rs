//! Security framework
//!
//! The provider registry, the key model and the engine façades. Callers ask
//! a [`Security`] registry for an algorithm by name and get back a façade
//! wrapping whichever provider's implementation matched first.
//!
//! # Example
//!
//! ```no_run
//! use beecrypt::security::{KeyPairGenerator, Security, Signature};
//!
//! # fn main() -> beecrypt::Result<()> {
//! let security = Security::global();
//! let mut kpg = KeyPairGenerator::get_instance(security, "DSA")?;
//! kpg.initialize(1024)?;
//! let pair = kpg.generate_key_pair()?;
//!
//! let mut sig = Signature::get_instance(security, "SHA1withDSA")?;
//! sig.init_sign(pair.private())?;
//! sig.update(b"hello")?;
//! let signature = sig.sign()?;
//!
//! sig.init_verify(pair.public())?;
//! sig.update(b"hello")?;
//! assert!(sig.verify(&signature)?);
//! # Ok(())
//! # }
//! ```

pub mod cert;
pub mod key;
pub mod key_factory;
pub mod key_pair_generator;
pub mod key_store;
pub mod mac;
pub mod message_digest;
pub mod parameters;
pub mod provider;
pub mod random;
pub mod registry;
pub mod signature;
pub mod spec;
pub mod spi;

pub use cert::{Certificate, CertificateFactory};
pub use key::{
    DhParams, DhPrivateKey, DhPublicKey, DsaParams, DsaPrivateKey, DsaPublicKey, Key, KeyPair,
    Pkcs12PbeKey, PrivateKey, PublicKey, RsaPrivateCrtKey, RsaPrivateKey, RsaPublicKey, SecretKey,
};
pub use key_factory::KeyFactory;
pub use key_pair_generator::KeyPairGenerator;
pub use key_store::KeyStore;
pub use mac::Mac;
pub use message_digest::MessageDigest;
pub use parameters::{AlgorithmParameterGenerator, AlgorithmParameters};
pub use provider::Provider;
pub use random::SecureRandom;
pub use registry::{ProviderCatalog, Security, SpiHandle};
pub use signature::{Signature, SignatureState};
pub use spec::{EncodedKeySpec, KeySpec, KeySpecKind, ParameterSpec};
pub use spi::{Instantiator, ServiceType, Spi};
