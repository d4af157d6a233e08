//! MAC façade

use std::sync::Arc;

use crate::common::{Result, SecurityError};

use super::key::Key;
use super::provider::Provider;
use super::registry::{Security, SpiHandle};
use super::spec::ParameterSpec;
use super::spi::{MacSpi, ServiceType};

/// Message authentication code engine
///
/// Must be initialized with a key before any data is processed.
pub struct Mac {
    spi: Box<dyn MacSpi>,
    algorithm: String,
    provider: Arc<Provider>,
    initialized: bool,
}

impl Mac {
    pub fn get_instance(security: &Security, algorithm: &str) -> Result<Self> {
        Self::from_handle(security.get_spi(algorithm, ServiceType::Mac)?)
    }

    pub fn get_instance_with_provider(security: &Security, algorithm: &str, provider: &str) -> Result<Self> {
        Self::from_handle(security.get_spi_with_provider(algorithm, ServiceType::Mac, provider)?)
    }

    pub fn get_instance_from(algorithm: &str, provider: &Arc<Provider>) -> Result<Self> {
        Self::from_handle(Security::get_spi_from(algorithm, ServiceType::Mac, provider)?)
    }

    fn from_handle(handle: SpiHandle) -> Result<Self> {
        let SpiHandle { spi, algorithm, provider } = handle;
        let spi = spi.into_mac().ok_or_else(|| {
            SecurityError::NoSuchAlgorithm(format!("{} Mac not available", algorithm))
        })?;
        Ok(Self { spi, algorithm, provider, initialized: false })
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }

    pub fn init(&mut self, key: &Key) -> Result<()> {
        self.spi.init(key, None)?;
        self.initialized = true;
        Ok(())
    }

    pub fn init_with_spec(&mut self, key: &Key, spec: &ParameterSpec) -> Result<()> {
        self.spi.init(key, Some(spec))?;
        self.initialized = true;
        Ok(())
    }

    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        self.require_init()?;
        self.spi.update(data);
        Ok(())
    }

    /// Finish the MAC; the engine stays keyed and is reset
    pub fn do_final(&mut self) -> Result<Vec<u8>> {
        self.require_init()?;
        Ok(self.spi.do_final())
    }

    pub fn do_final_data(&mut self, data: &[u8]) -> Result<Vec<u8>> {
        self.update(data)?;
        self.do_final()
    }

    pub fn mac_length(&self) -> usize {
        self.spi.mac_length()
    }

    pub fn reset(&mut self) {
        self.spi.reset();
    }

    fn require_init(&self) -> Result<()> {
        if !self.initialized {
            return Err(SecurityError::IllegalState("Mac not initialized".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::key::SecretKey;

    #[test]
    fn test_requires_init() {
        let security = Security::with_builtin();
        let mut mac = Mac::get_instance(&security, "HMAC-SHA-256").unwrap();
        assert!(matches!(mac.update(b"x"), Err(SecurityError::IllegalState(_))));
        assert!(matches!(mac.do_final(), Err(SecurityError::IllegalState(_))));
    }

    #[test]
    fn test_hmac_sha256_vector() {
        // RFC 4231 test case 2
        let security = Security::with_builtin();
        let mut mac = Mac::get_instance(&security, "HMAC-SHA-256").unwrap();
        mac.init(&Key::Secret(SecretKey::new("HMAC-SHA-256", b"Jefe"))).unwrap();
        let tag = mac.do_final_data(b"what do ya want for nothing?").unwrap();
        assert_eq!(
            hex::encode(tag),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
        assert_eq!(mac.mac_length(), 32);
    }
}
