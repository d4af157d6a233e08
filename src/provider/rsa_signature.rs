//! PKCS#1 v1.5 RSA signatures
//!
//! `RsaSignature` is generic over the message digest and carries the
//! matching DigestInfo prefix. Private keys with CRT components sign
//! through the Chinese Remainder path.

use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::common::{Result, SecurityError};
use crate::crypto::{mp, rsa};
use crate::security::key::{PrivateKey, PublicKey, RsaPublicKey};
use crate::security::random::SecureRandom;
use crate::security::spec::ParameterSpec;
use crate::security::spi::SignatureSpi;

enum Mode {
    Idle,
    Sign(PrivateKey),
    Verify(RsaPublicKey),
}

pub struct RsaSignature<D: Digest + Send> {
    prefix: &'static [u8],
    hasher: D,
    mode: Mode,
}

pub type Sha1WithRsaSignature = RsaSignature<Sha1>;
pub type Sha256WithRsaSignature = RsaSignature<Sha256>;

impl RsaSignature<Sha1> {
    pub fn new() -> Self {
        Self::with_prefix(rsa::SHA1_DIGEST_INFO)
    }
}

impl RsaSignature<Sha256> {
    pub fn new() -> Self {
        Self::with_prefix(rsa::SHA256_DIGEST_INFO)
    }
}

impl<D: Digest + Send> RsaSignature<D> {
    fn with_prefix(prefix: &'static [u8]) -> Self {
        Self { prefix, hasher: D::new(), mode: Mode::Idle }
    }

    fn finish_hash(&mut self) -> Vec<u8> {
        let hasher = std::mem::replace(&mut self.hasher, D::new());
        hasher.finalize().to_vec()
    }

    fn engine_sign(&mut self) -> Result<Vec<u8>> {
        let hash = self.finish_hash();
        let Mode::Sign(key) = &self.mode else {
            return Err(SecurityError::IllegalState("not initialized for signing".to_string()));
        };

        let sig = match key {
            PrivateKey::Rsa(k) => {
                let len = mp::byte_length(k.modulus());
                let em = rsa::emsa_pkcs1_v15(self.prefix, &hash, len)?;
                let s = rsa::rsapri(k.modulus(), k.private_exponent(), &mp::os2ip(&em))?;
                mp::i2osp(&s, len)?
            }
            PrivateKey::RsaCrt(k) => {
                let len = mp::byte_length(k.modulus());
                let em = rsa::emsa_pkcs1_v15(self.prefix, &hash, len)?;
                let s = rsa::rsapricrt(
                    k.modulus(),
                    k.prime_p(),
                    k.prime_q(),
                    k.prime_exponent_p(),
                    k.prime_exponent_q(),
                    k.crt_coefficient(),
                    &mp::os2ip(&em),
                )?;
                mp::i2osp(&s, len)?
            }
            _ => return Err(SecurityError::InvalidKey("not an RSAPrivateKey".to_string())),
        };
        Ok(sig)
    }
}

impl<D: Digest + Send> SignatureSpi for RsaSignature<D> {
    fn init_sign(&mut self, key: &PrivateKey, _random: Option<SecureRandom>) -> Result<()> {
        match key {
            PrivateKey::Rsa(_) | PrivateKey::RsaCrt(_) => {
                self.hasher = D::new();
                self.mode = Mode::Sign(key.clone());
                Ok(())
            }
            _ => Err(SecurityError::InvalidKey("not an RSAPrivateKey".to_string())),
        }
    }

    fn init_verify(&mut self, key: &PublicKey) -> Result<()> {
        let PublicKey::Rsa(key) = key else {
            return Err(SecurityError::InvalidKey("not an RSAPublicKey".to_string()));
        };
        self.hasher = D::new();
        self.mode = Mode::Verify(key.clone());
        Ok(())
    }

    fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
    }

    fn sign(&mut self) -> Result<Vec<u8>> {
        self.engine_sign()
    }

    fn sign_into(&mut self, out: &mut [u8]) -> Result<usize> {
        let needed = match &self.mode {
            Mode::Sign(PrivateKey::Rsa(k)) => mp::byte_length(k.modulus()),
            Mode::Sign(PrivateKey::RsaCrt(k)) => mp::byte_length(k.modulus()),
            _ => 0,
        };
        if out.len() < needed {
            return Err(SecurityError::ShortBuffer { needed, available: out.len() });
        }
        let sig = self.engine_sign()?;
        out[..sig.len()].copy_from_slice(&sig);
        Ok(sig.len())
    }

    fn verify(&mut self, signature: &[u8]) -> Result<bool> {
        let hash = self.finish_hash();
        let Mode::Verify(key) = &self.mode else {
            return Err(SecurityError::IllegalState("not initialized for verification".to_string()));
        };

        let len = mp::byte_length(key.modulus());
        if signature.len() != len {
            return Ok(false);
        }
        let expected = rsa::emsa_pkcs1_v15(self.prefix, &hash, len)?;
        let m = match rsa::rsapub(key.modulus(), key.public_exponent(), &mp::os2ip(signature)) {
            Ok(m) => m,
            Err(_) => return Ok(false),
        };
        let em = mp::i2osp(&m, len)?;
        // plain comparison, not constant time
        Ok(em == expected)
    }

    fn set_parameter(&mut self, _spec: &ParameterSpec) -> Result<()> {
        Err(SecurityError::InvalidAlgorithmParameter("not supported for this algorithm".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::key::{RsaPrivateCrtKey, RsaPrivateKey};
    use num_bigint_dig::BigUint;
    use rand::rngs::OsRng;

    fn keys() -> (PublicKey, PrivateKey, PrivateKey) {
        let e = BigUint::from(rsa::DEFAULT_EXPONENT);
        let c = rsa::generate(512, &e, &mut OsRng).unwrap();
        let public = PublicKey::Rsa(RsaPublicKey::new(c.n.clone(), c.e.clone()));
        let plain = PrivateKey::Rsa(RsaPrivateKey::new(c.n.clone(), c.d.clone()));
        let crt = PrivateKey::RsaCrt(RsaPrivateCrtKey::new(
            c.n.clone(),
            c.e.clone(),
            c.d.clone(),
            c.p.clone(),
            c.q.clone(),
            c.dp.clone(),
            c.dq.clone(),
            c.qinv.clone(),
        ));
        (public, plain, crt)
    }

    #[test]
    fn test_crt_and_plain_agree() {
        let (public, plain, crt) = keys();

        let mut engine = Sha1WithRsaSignature::new();
        engine.init_sign(&plain, None).unwrap();
        engine.update(b"abc");
        let a = engine.sign().unwrap();

        engine.init_sign(&crt, None).unwrap();
        engine.update(b"abc");
        let b = engine.sign().unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);

        engine.init_verify(&public).unwrap();
        engine.update(b"abc");
        assert!(engine.verify(&a).unwrap());
        engine.update(b"abd");
        assert!(!engine.verify(&a).unwrap());
    }

    #[test]
    fn test_sha256_and_short_buffer() {
        let (public, _, crt) = keys();
        let mut engine = Sha256WithRsaSignature::new();
        engine.init_sign(&crt, None).unwrap();
        engine.update(b"message");

        let mut small = [0u8; 63];
        assert!(matches!(engine.sign_into(&mut small), Err(SecurityError::ShortBuffer { needed: 64, .. })));

        let mut out = [0u8; 80];
        let n = engine.sign_into(&mut out).unwrap();
        assert_eq!(n, 64);

        engine.init_verify(&public).unwrap();
        engine.update(b"message");
        assert!(engine.verify(&out[..n]).unwrap());
        // wrong length never verifies
        engine.update(b"message");
        assert!(!engine.verify(&out[..n - 1]).unwrap());
    }

    #[test]
    fn test_degenerate_keys_fail_cleanly() {
        let e = BigUint::from(rsa::DEFAULT_EXPONENT);
        let c = rsa::generate(512, &e, &mut OsRng).unwrap();
        let broken = PrivateKey::RsaCrt(RsaPrivateCrtKey::new(
            c.n.clone(),
            c.e.clone(),
            c.d.clone(),
            BigUint::from(0u32),
            c.q.clone(),
            c.dp.clone(),
            c.dq.clone(),
            c.qinv.clone(),
        ));
        let mut engine = Sha1WithRsaSignature::new();
        engine.init_sign(&broken, None).unwrap();
        engine.update(b"abc");
        match engine.sign() {
            Err(SecurityError::InvalidKey(_)) => assert!(true),
            other => panic!("Expected InvalidKey, got {:?}", other),
        }

        let zero = PublicKey::Rsa(RsaPublicKey::new(BigUint::from(0u32), e.clone()));
        engine.init_verify(&zero).unwrap();
        engine.update(b"abc");
        assert!(engine.verify(&[0x01]).map_or(true, |ok| !ok));
    }
}
