//! SHA1withDSA
//!
//! The message is hashed with SHA-1 and the `(r, s)` pair travels DER
//! encoded.

use sha1::{Digest, Sha1};

use crate::common::{Result, SecurityError};
use crate::crypto::{der, dsa};
use crate::security::key::{DsaParams, DsaPrivateKey, DsaPublicKey, PrivateKey, PublicKey};
use crate::security::random::SecureRandom;
use crate::security::spec::ParameterSpec;
use crate::security::spi::SignatureSpi;

enum Mode {
    Idle,
    Sign(DsaPrivateKey, SecureRandom),
    Verify(DsaPublicKey),
}

pub struct Sha1WithDsaSignature {
    mode: Mode,
    hasher: Sha1,
}

impl Sha1WithDsaSignature {
    pub fn new() -> Self {
        Self { mode: Mode::Idle, hasher: Sha1::new() }
    }

    fn domain(params: &DsaParams) -> dsa::Domain {
        dsa::Domain { p: params.p.clone(), q: params.q.clone(), g: params.g.clone() }
    }

    /// Sign what has been hashed so far without consuming it
    fn engine_sign(&mut self) -> Result<Vec<u8>> {
        let digest = self.hasher.clone().finalize();
        match &mut self.mode {
            Mode::Sign(key, random) => {
                let domain = Self::domain(key.params());
                let (r, s) = dsa::sign(&domain, key.x(), &digest, random)?;
                Ok(der::encode_signature(&r, &s))
            }
            _ => Err(SecurityError::IllegalState("not initialized for signing".to_string())),
        }
    }
}

impl Default for Sha1WithDsaSignature {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureSpi for Sha1WithDsaSignature {
    fn init_sign(&mut self, key: &PrivateKey, random: Option<SecureRandom>) -> Result<()> {
        let PrivateKey::Dsa(key) = key else {
            return Err(SecurityError::InvalidKey("not a DSAPrivateKey".to_string()));
        };
        let random = random.unwrap_or_else(SecureRandom::default_instance);
        Digest::reset(&mut self.hasher);
        self.mode = Mode::Sign(key.clone(), random);
        Ok(())
    }

    fn init_verify(&mut self, key: &PublicKey) -> Result<()> {
        let PublicKey::Dsa(key) = key else {
            return Err(SecurityError::InvalidKey("not a DSAPublicKey".to_string()));
        };
        Digest::reset(&mut self.hasher);
        self.mode = Mode::Verify(key.clone());
        Ok(())
    }

    fn update(&mut self, data: &[u8]) {
        Digest::update(&mut self.hasher, data);
    }

    fn sign(&mut self) -> Result<Vec<u8>> {
        let sig = self.engine_sign()?;
        Digest::reset(&mut self.hasher);
        Ok(sig)
    }

    fn sign_into(&mut self, out: &mut [u8]) -> Result<usize> {
        let sig = self.engine_sign()?;
        if out.len() < sig.len() {
            return Err(SecurityError::ShortBuffer { needed: sig.len(), available: out.len() });
        }
        out[..sig.len()].copy_from_slice(&sig);
        Digest::reset(&mut self.hasher);
        Ok(sig.len())
    }

    fn verify(&mut self, signature: &[u8]) -> Result<bool> {
        let digest = self.hasher.finalize_reset();
        let Mode::Verify(key) = &self.mode else {
            return Err(SecurityError::IllegalState("not initialized for verification".to_string()));
        };
        let (r, s) = der::decode_signature(signature)
            .map_err(|_| SecurityError::Signature("invalid signature".to_string()))?;
        let domain = Self::domain(key.params());
        Ok(dsa::verify(&domain, key.y(), &digest, &r, &s))
    }

    fn set_parameter(&mut self, _spec: &ParameterSpec) -> Result<()> {
        Err(SecurityError::InvalidAlgorithmParameter("not supported for this algorithm".to_string()))
    }
}
