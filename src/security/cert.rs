//! Certificates and the certificate factory façade

use std::any::Any;
use std::fmt;
use std::io::Read;
use std::sync::Arc;

use crate::common::{Result, SecurityError};

use super::key::PublicKey;
use super::provider::Provider;
use super::registry::{Security, SpiHandle};
use super::spi::{CertificateFactorySpi, ServiceType};

/// A certificate produced by a certificate factory
///
/// Two certificates are equal when their types and encodings are equal.
pub trait Certificate: Send + Sync + fmt::Debug + fmt::Display {
    /// Certificate type, e.g. "BEE"
    fn cert_type(&self) -> &str;

    /// Wire encoding, computed once
    fn encoded(&self) -> Result<&[u8]>;

    /// Key certified by this certificate, if any
    fn public_key(&self) -> Option<&PublicKey>;

    /// Check the signature with `key`, using any provider
    fn verify(&self, security: &Security, key: &PublicKey) -> Result<()>;

    /// Check the signature with `key`, using the named provider
    fn verify_with_provider(&self, security: &Security, key: &PublicKey, provider: &str) -> Result<()>;

    fn as_any(&self) -> &dyn Any;
}

impl PartialEq for dyn Certificate + '_ {
    fn eq(&self, other: &Self) -> bool {
        if self.cert_type() != other.cert_type() {
            return false;
        }
        match (self.encoded(), other.encoded()) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

/// Decodes certificates of one type
pub struct CertificateFactory {
    spi: Box<dyn CertificateFactorySpi>,
    cert_type: String,
    provider: Arc<Provider>,
}

impl CertificateFactory {
    pub fn get_instance(security: &Security, cert_type: &str) -> Result<Self> {
        Self::from_handle(security.get_spi(cert_type, ServiceType::CertificateFactory)?)
    }

    pub fn get_instance_with_provider(security: &Security, cert_type: &str, provider: &str) -> Result<Self> {
        Self::from_handle(security.get_spi_with_provider(cert_type, ServiceType::CertificateFactory, provider)?)
    }

    pub fn get_instance_from(cert_type: &str, provider: &Arc<Provider>) -> Result<Self> {
        Self::from_handle(Security::get_spi_from(cert_type, ServiceType::CertificateFactory, provider)?)
    }

    fn from_handle(handle: SpiHandle) -> Result<Self> {
        let SpiHandle { spi, algorithm, provider } = handle;
        let spi = spi.into_certificate_factory().ok_or_else(|| {
            SecurityError::NoSuchAlgorithm(format!("{} CertificateFactory not available", algorithm))
        })?;
        Ok(Self { spi, cert_type: algorithm, provider })
    }

    pub fn cert_type(&self) -> &str {
        &self.cert_type
    }

    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }

    /// Decode one certificate from `reader`
    pub fn generate_certificate(&mut self, security: &Security, reader: &mut dyn Read) -> Result<Arc<dyn Certificate>> {
        self.spi.generate_certificate(security, reader)
    }

    /// Decode certificates until `reader` is exhausted
    pub fn generate_certificates(&mut self, security: &Security, reader: &mut dyn Read) -> Result<Vec<Arc<dyn Certificate>>> {
        self.spi.generate_certificates(security, reader)
    }
}
