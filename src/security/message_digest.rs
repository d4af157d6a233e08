//! Message digest façade

use std::sync::Arc;

use crate::common::{Result, SecurityError};

use super::provider::Provider;
use super::registry::{Security, SpiHandle};
use super::spi::{MessageDigestSpi, ServiceType};

pub struct MessageDigest {
    spi: Box<dyn MessageDigestSpi>,
    algorithm: String,
    provider: Arc<Provider>,
}

impl MessageDigest {
    pub fn get_instance(security: &Security, algorithm: &str) -> Result<Self> {
        Self::from_handle(security.get_spi(algorithm, ServiceType::MessageDigest)?)
    }

    pub fn get_instance_with_provider(security: &Security, algorithm: &str, provider: &str) -> Result<Self> {
        Self::from_handle(security.get_spi_with_provider(algorithm, ServiceType::MessageDigest, provider)?)
    }

    pub fn get_instance_from(algorithm: &str, provider: &Arc<Provider>) -> Result<Self> {
        Self::from_handle(Security::get_spi_from(algorithm, ServiceType::MessageDigest, provider)?)
    }

    fn from_handle(handle: SpiHandle) -> Result<Self> {
        let SpiHandle { spi, algorithm, provider } = handle;
        let spi = spi.into_message_digest().ok_or_else(|| {
            SecurityError::NoSuchAlgorithm(format!("{} MessageDigest not available", algorithm))
        })?;
        Ok(Self { spi, algorithm, provider })
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }

    pub fn update(&mut self, data: &[u8]) {
        self.spi.update(data);
    }

    /// Finish the computation; the digest is reset afterwards
    pub fn digest(&mut self) -> Vec<u8> {
        self.spi.digest()
    }

    /// Update with `data` and finish
    pub fn digest_data(&mut self, data: &[u8]) -> Vec<u8> {
        self.spi.update(data);
        self.spi.digest()
    }

    pub fn digest_length(&self) -> usize {
        self.spi.digest_length()
    }

    pub fn reset(&mut self) {
        self.spi.reset();
    }
}

impl Clone for MessageDigest {
    fn clone(&self) -> Self {
        Self {
            spi: self.spi.box_clone(),
            algorithm: self.algorithm.clone(),
            provider: Arc::clone(&self.provider),
        }
    }
}
