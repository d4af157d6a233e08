//! Key pair generator façade

use std::sync::Arc;

use crate::common::{Result, SecurityError};

use super::key::KeyPair;
use super::provider::Provider;
use super::random::SecureRandom;
use super::registry::{Security, SpiHandle};
use super::spec::ParameterSpec;
use super::spi::{KeyPairGeneratorSpi, ServiceType};

/// Generates key pairs for one algorithm
///
/// Without an explicit `initialize` the engine uses its default size.
pub struct KeyPairGenerator {
    spi: Box<dyn KeyPairGeneratorSpi>,
    algorithm: String,
    provider: Arc<Provider>,
}

impl KeyPairGenerator {
    pub fn get_instance(security: &Security, algorithm: &str) -> Result<Self> {
        Self::from_handle(security.get_spi(algorithm, ServiceType::KeyPairGenerator)?)
    }

    pub fn get_instance_with_provider(security: &Security, algorithm: &str, provider: &str) -> Result<Self> {
        Self::from_handle(security.get_spi_with_provider(algorithm, ServiceType::KeyPairGenerator, provider)?)
    }

    pub fn get_instance_from(algorithm: &str, provider: &Arc<Provider>) -> Result<Self> {
        Self::from_handle(Security::get_spi_from(algorithm, ServiceType::KeyPairGenerator, provider)?)
    }

    fn from_handle(handle: SpiHandle) -> Result<Self> {
        let SpiHandle { spi, algorithm, provider } = handle;
        let spi = spi.into_key_pair_generator().ok_or_else(|| {
            SecurityError::NoSuchAlgorithm(format!("{} KeyPairGenerator not available", algorithm))
        })?;
        Ok(Self { spi, algorithm, provider })
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }

    pub fn initialize(&mut self, key_size: usize) -> Result<()> {
        self.spi.initialize(key_size, None)
    }

    pub fn initialize_with_random(&mut self, key_size: usize, random: SecureRandom) -> Result<()> {
        self.spi.initialize(key_size, Some(random))
    }

    pub fn initialize_with_spec(&mut self, spec: &ParameterSpec) -> Result<()> {
        self.spi.initialize_with_spec(spec, None)
    }

    pub fn initialize_with_spec_and_random(&mut self, spec: &ParameterSpec, random: SecureRandom) -> Result<()> {
        self.spi.initialize_with_spec(spec, Some(random))
    }

    pub fn generate_key_pair(&mut self) -> Result<KeyPair> {
        self.spi.generate_key_pair()
    }
}
