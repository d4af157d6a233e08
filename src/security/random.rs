//! Secure random façade

use std::fmt;
use std::sync::Arc;

use rand::{CryptoRng, RngCore};

use crate::common::Result;
use crate::provider::{self, secure_random::BeeSecureRandom};

use super::provider::Provider;
use super::registry::{Security, SpiHandle};
use super::spi::{SecureRandomSpi, ServiceType};

/// Cryptographically strong random number generator
///
/// Also usable wherever a `rand::RngCore` is expected.
pub struct SecureRandom {
    spi: Box<dyn SecureRandomSpi>,
    algorithm: String,
    provider: Option<Arc<Provider>>,
}

impl SecureRandom {
    pub fn get_instance(security: &Security, algorithm: &str) -> Result<Self> {
        Self::from_handle(security.get_spi(algorithm, ServiceType::SecureRandom)?)
    }

    pub fn get_instance_with_provider(security: &Security, algorithm: &str, provider: &str) -> Result<Self> {
        Self::from_handle(security.get_spi_with_provider(algorithm, ServiceType::SecureRandom, provider)?)
    }

    pub fn get_instance_from(algorithm: &str, provider: &Arc<Provider>) -> Result<Self> {
        Self::from_handle(Security::get_spi_from(algorithm, ServiceType::SecureRandom, provider)?)
    }

    /// First generator any installed provider offers
    pub fn from_first_provider(security: &Security) -> Result<Self> {
        Self::from_handle(security.get_first_spi(ServiceType::SecureRandom)?)
    }

    /// The built-in generator, independent of any registry
    pub fn default_instance() -> Self {
        Self {
            spi: Box::new(BeeSecureRandom::new()),
            algorithm: provider::SECURE_RANDOM_ALGORITHM.to_string(),
            provider: None,
        }
    }

    fn from_handle(handle: SpiHandle) -> Result<Self> {
        let SpiHandle { spi, algorithm, provider } = handle;
        let spi = spi.into_secure_random().ok_or_else(|| {
            crate::common::SecurityError::NoSuchAlgorithm(format!("{} SecureRandom not available", algorithm))
        })?;
        Ok(Self { spi, algorithm, provider: Some(provider) })
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    /// Provider of the generator; `None` for the built-in default
    pub fn provider(&self) -> Option<&Arc<Provider>> {
        self.provider.as_ref()
    }

    /// Mix additional seed material into the generator
    pub fn set_seed(&mut self, seed: &[u8]) {
        self.spi.set_seed(seed);
    }

    pub fn next_bytes(&mut self, out: &mut [u8]) {
        self.spi.next_bytes(out);
    }

    /// Fresh seed bytes from the entropy source
    pub fn generate_seed(&mut self, len: usize) -> Vec<u8> {
        self.spi.generate_seed(len)
    }
}

impl RngCore for SecureRandom {
    fn next_u32(&mut self) -> u32 {
        let mut b = [0u8; 4];
        self.spi.next_bytes(&mut b);
        u32::from_le_bytes(b)
    }

    fn next_u64(&mut self) -> u64 {
        let mut b = [0u8; 8];
        self.spi.next_bytes(&mut b);
        u64::from_le_bytes(b)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.spi.next_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.spi.next_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for SecureRandom {}

impl fmt::Debug for SecureRandom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureRandom").field("algorithm", &self.algorithm).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_instance() {
        let security = Security::with_builtin();
        let mut random = SecureRandom::get_instance(&security, "BEE").unwrap();
        assert_eq!(random.algorithm(), "BEE");
        assert!(random.provider().is_some());

        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        random.next_bytes(&mut a);
        random.next_bytes(&mut b);
        assert_ne!(a, b);
        assert_eq!(random.generate_seed(16).len(), 16);
    }

    #[test]
    fn test_default_instance() {
        let mut random = SecureRandom::default_instance();
        assert!(random.provider().is_none());
        random.set_seed(b"extra seed");
        let _ = random.next_u64();
    }
}
