//! Service provider interfaces
//!
//! Each engine class has one trait that concrete algorithm implementations
//! provide. Façades own a boxed implementation and forward to it; callers
//! never use these traits directly.

use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

use crate::common::Result;

use super::cert::Certificate;
use super::key::{Key, KeyPair, PrivateKey, PublicKey};
use super::random::SecureRandom;
use super::registry::Security;
use super::spec::{KeySpec, KeySpecKind, ParameterSpec};

pub trait SignatureSpi: Send {
    fn init_sign(&mut self, key: &PrivateKey, random: Option<SecureRandom>) -> Result<()>;
    fn init_verify(&mut self, key: &PublicKey) -> Result<()>;
    fn update(&mut self, data: &[u8]);
    fn sign(&mut self) -> Result<Vec<u8>>;
    /// Sign into `out`, returning the number of bytes written
    fn sign_into(&mut self, out: &mut [u8]) -> Result<usize>;
    fn verify(&mut self, signature: &[u8]) -> Result<bool>;
    fn set_parameter(&mut self, spec: &ParameterSpec) -> Result<()>;
}

pub trait KeyFactorySpi: Send {
    fn generate_public(&self, spec: &KeySpec) -> Result<PublicKey>;
    fn generate_private(&self, spec: &KeySpec) -> Result<PrivateKey>;
    fn get_key_spec(&self, key: &Key, kind: KeySpecKind) -> Result<KeySpec>;
    fn translate_key(&self, key: &Key) -> Result<Key>;
}

pub trait KeyPairGeneratorSpi: Send {
    fn initialize(&mut self, key_size: usize, random: Option<SecureRandom>) -> Result<()>;
    fn initialize_with_spec(&mut self, spec: &ParameterSpec, random: Option<SecureRandom>) -> Result<()>;
    fn generate_key_pair(&mut self) -> Result<KeyPair>;
}

pub trait MessageDigestSpi: Send {
    fn update(&mut self, data: &[u8]);
    /// Finish the hash and reset for reuse
    fn digest(&mut self) -> Vec<u8>;
    fn digest_length(&self) -> usize;
    fn reset(&mut self);
    fn box_clone(&self) -> Box<dyn MessageDigestSpi>;
}

pub trait MacSpi: Send {
    fn init(&mut self, key: &Key, spec: Option<&ParameterSpec>) -> Result<()>;
    fn update(&mut self, data: &[u8]);
    /// Finish the MAC and reset for reuse with the same key
    fn do_final(&mut self) -> Vec<u8>;
    fn mac_length(&self) -> usize;
    fn reset(&mut self);
}

pub trait AlgorithmParametersSpi: Send {
    fn init(&mut self, spec: &ParameterSpec) -> Result<()>;
    fn parameter_spec(&self) -> Result<ParameterSpec>;
    fn describe(&self) -> String;
}

pub trait AlgorithmParameterGeneratorSpi: Send {
    fn init(&mut self, size: usize, random: Option<SecureRandom>) -> Result<()>;
    fn init_with_spec(&mut self, spec: &ParameterSpec, random: Option<SecureRandom>) -> Result<()>;
    fn generate_parameters(&mut self) -> Result<ParameterSpec>;
}

pub trait CertificateFactorySpi: Send {
    fn generate_certificate(&mut self, security: &Security, reader: &mut dyn Read) -> Result<Arc<dyn Certificate>>;
    fn generate_certificates(&mut self, security: &Security, reader: &mut dyn Read) -> Result<Vec<Arc<dyn Certificate>>>;
}

pub trait KeyStoreSpi: Send {
    fn load(&mut self, security: &Security, reader: Option<&mut dyn Read>, password: Option<&str>) -> Result<()>;
    fn store(&mut self, writer: &mut dyn Write, password: Option<&str>) -> Result<()>;
    fn aliases(&self) -> Vec<String>;
    fn contains_alias(&self, alias: &str) -> bool;
    fn delete_entry(&mut self, alias: &str) -> Result<()>;
    /// Creation time of the entry in milliseconds since the epoch
    fn creation_date(&self, alias: &str) -> Option<i64>;
    fn get_key(&self, security: &Security, alias: &str, password: &str) -> Result<Option<Key>>;
    fn get_certificate(&self, alias: &str) -> Option<Arc<dyn Certificate>>;
    fn get_certificate_chain(&self, alias: &str) -> Option<Vec<Arc<dyn Certificate>>>;
    fn get_certificate_alias(&self, cert: &dyn Certificate) -> Option<String>;
    fn is_key_entry(&self, alias: &str) -> bool;
    fn is_certificate_entry(&self, alias: &str) -> bool;
    fn set_key_entry(&mut self, alias: &str, key: &Key, password: &str, chain: Vec<Arc<dyn Certificate>>) -> Result<()>;
    fn set_certificate_entry(&mut self, alias: &str, cert: Arc<dyn Certificate>) -> Result<()>;
    fn size(&self) -> usize;
}

pub trait SecureRandomSpi: Send {
    fn set_seed(&mut self, seed: &[u8]);
    fn next_bytes(&mut self, out: &mut [u8]);
    fn generate_seed(&mut self, len: usize) -> Vec<u8>;
}

/// Engine classes a provider can publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServiceType {
    AlgorithmParameterGenerator,
    AlgorithmParameters,
    CertificateFactory,
    KeyFactory,
    KeyPairGenerator,
    KeyStore,
    Mac,
    MessageDigest,
    SecureRandom,
    Signature,
}

impl ServiceType {
    pub const ALL: [ServiceType; 10] = [
        ServiceType::AlgorithmParameterGenerator,
        ServiceType::AlgorithmParameters,
        ServiceType::CertificateFactory,
        ServiceType::KeyFactory,
        ServiceType::KeyPairGenerator,
        ServiceType::KeyStore,
        ServiceType::Mac,
        ServiceType::MessageDigest,
        ServiceType::SecureRandom,
        ServiceType::Signature,
    ];

    /// Service type named by the part of a property key before the first dot
    pub fn from_key(key: &str) -> Option<ServiceType> {
        let (prefix, algorithm) = key.split_once('.')?;
        if algorithm.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|t| t.as_str() == prefix)
    }

    /// Property key prefix of this service type
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::AlgorithmParameterGenerator => "AlgorithmParameterGenerator",
            ServiceType::AlgorithmParameters => "AlgorithmParameters",
            ServiceType::CertificateFactory => "CertificateFactory",
            ServiceType::KeyFactory => "KeyFactory",
            ServiceType::KeyPairGenerator => "KeyPairGenerator",
            ServiceType::KeyStore => "KeyStore",
            ServiceType::Mac => "Mac",
            ServiceType::MessageDigest => "MessageDigest",
            ServiceType::SecureRandom => "SecureRandom",
            ServiceType::Signature => "Signature",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A freshly instantiated engine of one of the service types
pub enum Spi {
    AlgorithmParameterGenerator(Box<dyn AlgorithmParameterGeneratorSpi>),
    AlgorithmParameters(Box<dyn AlgorithmParametersSpi>),
    CertificateFactory(Box<dyn CertificateFactorySpi>),
    KeyFactory(Box<dyn KeyFactorySpi>),
    KeyPairGenerator(Box<dyn KeyPairGeneratorSpi>),
    KeyStore(Box<dyn KeyStoreSpi>),
    Mac(Box<dyn MacSpi>),
    MessageDigest(Box<dyn MessageDigestSpi>),
    SecureRandom(Box<dyn SecureRandomSpi>),
    Signature(Box<dyn SignatureSpi>),
}

/// Factory function a provider binds to an algorithm name
pub type Instantiator = fn() -> Spi;

impl Spi {
    pub fn service_type(&self) -> ServiceType {
        match self {
            Spi::AlgorithmParameterGenerator(_) => ServiceType::AlgorithmParameterGenerator,
            Spi::AlgorithmParameters(_) => ServiceType::AlgorithmParameters,
            Spi::CertificateFactory(_) => ServiceType::CertificateFactory,
            Spi::KeyFactory(_) => ServiceType::KeyFactory,
            Spi::KeyPairGenerator(_) => ServiceType::KeyPairGenerator,
            Spi::KeyStore(_) => ServiceType::KeyStore,
            Spi::Mac(_) => ServiceType::Mac,
            Spi::MessageDigest(_) => ServiceType::MessageDigest,
            Spi::SecureRandom(_) => ServiceType::SecureRandom,
            Spi::Signature(_) => ServiceType::Signature,
        }
    }
}

impl fmt::Debug for Spi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Spi::{}", self.service_type())
    }
}

macro_rules! spi_accessor {
    ($name:ident, $variant:ident, $spi:ident) => {
        impl Spi {
            /// Take the engine if it has the expected service type
            pub fn $name(self) -> Option<Box<dyn $spi>> {
                match self {
                    Spi::$variant(spi) => Some(spi),
                    _ => None,
                }
            }
        }
    };
}

spi_accessor!(into_algorithm_parameter_generator, AlgorithmParameterGenerator, AlgorithmParameterGeneratorSpi);
spi_accessor!(into_algorithm_parameters, AlgorithmParameters, AlgorithmParametersSpi);
spi_accessor!(into_certificate_factory, CertificateFactory, CertificateFactorySpi);
spi_accessor!(into_key_factory, KeyFactory, KeyFactorySpi);
spi_accessor!(into_key_pair_generator, KeyPairGenerator, KeyPairGeneratorSpi);
spi_accessor!(into_key_store, KeyStore, KeyStoreSpi);
spi_accessor!(into_mac, Mac, MacSpi);
spi_accessor!(into_message_digest, MessageDigest, MessageDigestSpi);
spi_accessor!(into_secure_random, SecureRandom, SecureRandomSpi);
spi_accessor!(into_signature, Signature, SignatureSpi);
