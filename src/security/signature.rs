//! Signature façade

use std::sync::Arc;

use crate::common::{Result, SecurityError};

use super::key::{PrivateKey, PublicKey};
use super::provider::Provider;
use super::random::SecureRandom;
use super::registry::{Security, SpiHandle};
use super::spec::ParameterSpec;
use super::spi::{ServiceType, SignatureSpi};

/// Engine state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureState {
    Uninitialized,
    Sign,
    Verify,
}

/// Signs and verifies data with a provider's signature engine
///
/// `update`, `sign` and `verify` require the matching `init_sign` or
/// `init_verify` first; a fresh instance is needed to go back to the
/// uninitialized state.
pub struct Signature {
    spi: Box<dyn SignatureSpi>,
    algorithm: String,
    provider: Arc<Provider>,
    state: SignatureState,
}

impl Signature {
    pub fn get_instance(security: &Security, algorithm: &str) -> Result<Self> {
        Self::from_handle(security.get_spi(algorithm, ServiceType::Signature)?)
    }

    pub fn get_instance_with_provider(security: &Security, algorithm: &str, provider: &str) -> Result<Self> {
        Self::from_handle(security.get_spi_with_provider(algorithm, ServiceType::Signature, provider)?)
    }

    pub fn get_instance_from(algorithm: &str, provider: &Arc<Provider>) -> Result<Self> {
        Self::from_handle(Security::get_spi_from(algorithm, ServiceType::Signature, provider)?)
    }

    fn from_handle(handle: SpiHandle) -> Result<Self> {
        let SpiHandle { spi, algorithm, provider } = handle;
        let spi = spi.into_signature().ok_or_else(|| {
            SecurityError::NoSuchAlgorithm(format!("{} Signature not available", algorithm))
        })?;
        Ok(Self { spi, algorithm, provider, state: SignatureState::Uninitialized })
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn provider(&self) -> &Arc<Provider> {
        &self.provider
    }

    pub fn state(&self) -> SignatureState {
        self.state
    }

    /// Prepare for signing with the default random source
    pub fn init_sign(&mut self, key: &PrivateKey) -> Result<()> {
        self.spi.init_sign(key, None)?;
        self.state = SignatureState::Sign;
        Ok(())
    }

    /// Prepare for signing with a caller supplied random source
    pub fn init_sign_with_random(&mut self, key: &PrivateKey, random: SecureRandom) -> Result<()> {
        self.spi.init_sign(key, Some(random))?;
        self.state = SignatureState::Sign;
        Ok(())
    }

    pub fn init_verify(&mut self, key: &PublicKey) -> Result<()> {
        self.spi.init_verify(key)?;
        self.state = SignatureState::Verify;
        Ok(())
    }

    pub fn set_parameter(&mut self, spec: &ParameterSpec) -> Result<()> {
        self.spi.set_parameter(spec)
    }

    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        if self.state == SignatureState::Uninitialized {
            return Err(SecurityError::IllegalState("object not initialized for signing or verification".to_string()));
        }
        self.spi.update(data);
        Ok(())
    }

    pub fn update_byte(&mut self, b: u8) -> Result<()> {
        self.update(&[b])
    }

    pub fn sign(&mut self) -> Result<Vec<u8>> {
        self.require(SignatureState::Sign)?;
        self.spi.sign()
    }

    /// Sign into `out`; fails with `ShortBuffer` when it is too small
    pub fn sign_into(&mut self, out: &mut [u8]) -> Result<usize> {
        self.require(SignatureState::Sign)?;
        self.spi.sign_into(out)
    }

    pub fn verify(&mut self, signature: &[u8]) -> Result<bool> {
        self.require(SignatureState::Verify)?;
        self.spi.verify(signature)
    }

    fn require(&self, state: SignatureState) -> Result<()> {
        if self.state != state {
            let what = match state {
                SignatureState::Sign => "signing",
                SignatureState::Verify => "verification",
                SignatureState::Uninitialized => "use",
            };
            return Err(SecurityError::IllegalState(format!("object not initialized for {}", what)));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signature")
            .field("algorithm", &self.algorithm)
            .field("provider", &self.provider.name())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_machine() {
        let security = Security::with_builtin();
        let mut sig = Signature::get_instance(&security, "SHA1withDSA").unwrap();
        assert_eq!(sig.state(), SignatureState::Uninitialized);

        match sig.update(b"data") {
            Err(SecurityError::IllegalState(_)) => assert!(true),
            other => panic!("Expected IllegalState, got {:?}", other),
        }
        assert!(matches!(sig.sign(), Err(SecurityError::IllegalState(_))));
        assert!(matches!(sig.verify(&[0x30, 0x00]), Err(SecurityError::IllegalState(_))));
    }

    #[test]
    fn test_unknown_algorithm() {
        let security = Security::with_builtin();
        assert!(matches!(
            Signature::get_instance(&security, "MD2withRSA"),
            Err(SecurityError::NoSuchAlgorithm(_))
        ));
    }
}
