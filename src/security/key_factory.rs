//! Key factory façade

use std::sync::Arc;

use crate::common::{Result, SecurityError};

use super::key::{Key, PrivateKey, PublicKey};
use super::provider::Provider;
use super::registry::{Security, SpiHandle};
use super::spec::{KeySpec, KeySpecKind};
use super::spi::{KeyFactorySpi, ServiceType};

/// Converts between keys and key specifications
pub struct KeyFactory {
    spi: Box<dyn KeyFactorySpi>,
    algorithm: String,
    provider: Arc<Provider>,
}

impl KeyFactory {
    pub fn get_instance(security: &Security, algorithm: &str) -> Result<Self> {
        Self::from_handle(security.get_spi(algorithm, ServiceType::KeyFactory)?)
    }

    pub fn get_instance_with_provider(security: &Security, algorithm: &str, provider: &str) -> Result<Self> {
        Self::from_handle(security.get_spi_with_provider(algorithm, ServiceType::KeyFactory, provider)?)
    }

    pub fn get_instance_from(algorithm: &str, provider: &Arc<Provider>) -> Result<Self> {
        Self::from_handle(Security::get_spi_from(algorithm, ServiceType::KeyFactory, provider)?)
    }

    fn from_handle(handle: SpiHandle) -> Result<Self> {
        let SpiHandle { spi, algorithm, provider } = handle;
        let spi = spi.into_key_factory().ok_or_else(|| {
            SecurityError::NoSuchAlgorithm(format!("{} KeyFactory not available", algorithm))
        })?;
        Ok(Self { spi, algorithm, provider })
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }

    pub fn generate_public(&self, spec: &KeySpec) -> Result<PublicKey> {
        self.spi.generate_public(spec)
    }

    pub fn generate_private(&self, spec: &KeySpec) -> Result<PrivateKey> {
        self.spi.generate_private(spec)
    }

    pub fn get_key_spec(&self, key: &Key, kind: KeySpecKind) -> Result<KeySpec> {
        self.spi.get_key_spec(key, kind)
    }

    pub fn translate_key(&self, key: &Key) -> Result<Key> {
        self.spi.translate_key(key)
    }
}
