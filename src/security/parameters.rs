//! Algorithm parameter façades

use std::fmt;
use std::sync::Arc;

use crate::common::{Result, SecurityError};

use super::provider::Provider;
use super::random::SecureRandom;
use super::registry::{Security, SpiHandle};
use super::spec::ParameterSpec;
use super::spi::{AlgorithmParameterGeneratorSpi, AlgorithmParametersSpi, ServiceType};

/// Holder of a validated parameter set for one algorithm
pub struct AlgorithmParameters {
    spi: Box<dyn AlgorithmParametersSpi>,
    algorithm: String,
    provider: Arc<Provider>,
    initialized: bool,
}

impl AlgorithmParameters {
    pub fn get_instance(security: &Security, algorithm: &str) -> Result<Self> {
        Self::from_handle(security.get_spi(algorithm, ServiceType::AlgorithmParameters)?)
    }

    pub fn get_instance_with_provider(security: &Security, algorithm: &str, provider: &str) -> Result<Self> {
        Self::from_handle(security.get_spi_with_provider(algorithm, ServiceType::AlgorithmParameters, provider)?)
    }

    pub fn get_instance_from(algorithm: &str, provider: &Arc<Provider>) -> Result<Self> {
        Self::from_handle(Security::get_spi_from(algorithm, ServiceType::AlgorithmParameters, provider)?)
    }

    fn from_handle(handle: SpiHandle) -> Result<Self> {
        let SpiHandle { spi, algorithm, provider } = handle;
        let spi = spi.into_algorithm_parameters().ok_or_else(|| {
            SecurityError::NoSuchAlgorithm(format!("{} AlgorithmParameters not available", algorithm))
        })?;
        Ok(Self { spi, algorithm, provider, initialized: false })
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }

    pub fn init(&mut self, spec: &ParameterSpec) -> Result<()> {
        if self.initialized {
            return Err(SecurityError::IllegalState("already initialized".to_string()));
        }
        self.spi.init(spec)?;
        self.initialized = true;
        Ok(())
    }

    pub fn parameter_spec(&self) -> Result<ParameterSpec> {
        if !self.initialized {
            return Err(SecurityError::IllegalState("not initialized".to_string()));
        }
        self.spi.parameter_spec()
    }
}

impl fmt::Display for AlgorithmParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.spi.describe())
    }
}

/// Generates parameter sets for one algorithm
pub struct AlgorithmParameterGenerator {
    spi: Box<dyn AlgorithmParameterGeneratorSpi>,
    algorithm: String,
    provider: Arc<Provider>,
}

impl AlgorithmParameterGenerator {
    pub fn get_instance(security: &Security, algorithm: &str) -> Result<Self> {
        Self::from_handle(security.get_spi(algorithm, ServiceType::AlgorithmParameterGenerator)?)
    }

    pub fn get_instance_with_provider(security: &Security, algorithm: &str, provider: &str) -> Result<Self> {
        Self::from_handle(security.get_spi_with_provider(
            algorithm,
            ServiceType::AlgorithmParameterGenerator,
            provider,
        )?)
    }

    pub fn get_instance_from(algorithm: &str, provider: &Arc<Provider>) -> Result<Self> {
        Self::from_handle(Security::get_spi_from(algorithm, ServiceType::AlgorithmParameterGenerator, provider)?)
    }

    fn from_handle(handle: SpiHandle) -> Result<Self> {
        let SpiHandle { spi, algorithm, provider } = handle;
        let spi = spi.into_algorithm_parameter_generator().ok_or_else(|| {
            SecurityError::NoSuchAlgorithm(format!("{} AlgorithmParameterGenerator not available", algorithm))
        })?;
        Ok(Self { spi, algorithm, provider })
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }

    pub fn init(&mut self, size: usize) -> Result<()> {
        self.spi.init(size, None)
    }

    pub fn init_with_random(&mut self, size: usize, random: SecureRandom) -> Result<()> {
        self.spi.init(size, Some(random))
    }

    pub fn init_with_spec(&mut self, spec: &ParameterSpec) -> Result<()> {
        self.spi.init_with_spec(spec, None)
    }

    /// Generate a parameter set, wrapped in parameters from the same provider
    pub fn generate_parameters(&mut self) -> Result<AlgorithmParameters> {
        let spec = self.spi.generate_parameters()?;
        let mut params = AlgorithmParameters::get_instance_from(&self.algorithm, &self.provider)?;
        params.init(&spec)?;
        Ok(params)
    }
}
