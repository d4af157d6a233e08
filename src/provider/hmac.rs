//! HMAC-SHA-1 and HMAC-SHA-256
//!
//! Keys are either raw `SecretKey`s or `Pkcs12PbeKey`s, in which case the
//! MAC key is derived from the password with the PKCS#12 KDF (MAC id).

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::common::{Result, SecurityError};
use crate::crypto::pkcs12;
use crate::security::key::Key;
use crate::security::spec::ParameterSpec;
use crate::security::spi::MacSpi;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HashKind {
    Sha1,
    Sha256,
}

impl HashKind {
    fn output_len(self) -> usize {
        match self {
            HashKind::Sha1 => 20,
            HashKind::Sha256 => 32,
        }
    }
}

#[derive(Clone)]
enum State {
    Sha1(Hmac<Sha1>),
    Sha256(Hmac<Sha256>),
}

impl State {
    fn keyed(kind: HashKind, key: &[u8]) -> Result<Self> {
        let invalid = |_| SecurityError::InvalidKey("unusable HMAC key".to_string());
        Ok(match kind {
            HashKind::Sha1 => State::Sha1(Hmac::<Sha1>::new_from_slice(key).map_err(invalid)?),
            HashKind::Sha256 => State::Sha256(Hmac::<Sha256>::new_from_slice(key).map_err(invalid)?),
        })
    }

    fn update(&mut self, data: &[u8]) {
        match self {
            State::Sha1(m) => m.update(data),
            State::Sha256(m) => m.update(data),
        }
    }

    fn finish(self) -> Vec<u8> {
        match self {
            State::Sha1(m) => m.finalize().into_bytes().to_vec(),
            State::Sha256(m) => m.finalize().into_bytes().to_vec(),
        }
    }
}

/// HMAC engine; `keyed` holds the state right after keying so the engine
/// can be reset without the key
pub struct HmacEngine {
    kind: HashKind,
    keyed: Option<State>,
    current: Option<State>,
}

impl HmacEngine {
    pub fn sha1() -> Self {
        Self { kind: HashKind::Sha1, keyed: None, current: None }
    }

    pub fn sha256() -> Self {
        Self { kind: HashKind::Sha256, keyed: None, current: None }
    }
}

impl MacSpi for HmacEngine {
    fn init(&mut self, key: &Key, spec: Option<&ParameterSpec>) -> Result<()> {
        if let Some(spec) = spec {
            return Err(SecurityError::InvalidAlgorithmParameter(format!(
                "{} not supported for HMAC",
                spec.name()
            )));
        }

        let state = match key {
            Key::Secret(k) => State::keyed(self.kind, k.as_bytes())?,
            Key::Pbe(k) => {
                let mut raw = pkcs12::derive(
                    pkcs12::ID_MAC,
                    k.password(),
                    k.salt(),
                    k.iterations(),
                    self.kind.output_len(),
                );
                let state = State::keyed(self.kind, &raw);
                raw.zeroize();
                state?
            }
            other => {
                return Err(SecurityError::InvalidKey(format!(
                    "HMAC requires a secret or PBE key, not {}",
                    other.algorithm()
                )))
            }
        };

        self.current = Some(state.clone());
        self.keyed = Some(state);
        Ok(())
    }

    fn update(&mut self, data: &[u8]) {
        if let Some(state) = self.current.as_mut() {
            state.update(data);
        }
    }

    fn do_final(&mut self) -> Vec<u8> {
        let fresh = self.keyed.clone();
        match std::mem::replace(&mut self.current, fresh) {
            Some(state) => state.finish(),
            None => Vec::new(),
        }
    }

    fn mac_length(&self) -> usize {
        self.kind.output_len()
    }

    fn reset(&mut self) {
        self.current = self.keyed.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::key::{Pkcs12PbeKey, SecretKey};

    #[test]
    fn test_rfc2202_sha1() {
        let mut mac = HmacEngine::sha1();
        mac.init(&Key::Secret(SecretKey::new("HMAC", &[0x0b; 20])), None).unwrap();
        mac.update(b"Hi There");
        assert_eq!(hex::encode(mac.do_final()), "b617318655057264e28bc0b6fb378c8ef146be00");
    }

    #[test]
    fn test_reset_keeps_key() {
        let mut mac = HmacEngine::sha256();
        mac.init(&Key::Secret(SecretKey::new("HMAC", b"key")), None).unwrap();
        mac.update(b"garbage");
        mac.reset();
        mac.update(b"data");
        let first = mac.do_final();
        mac.update(b"data");
        assert_eq!(mac.do_final(), first);
        assert_eq!(first.len(), mac.mac_length());
    }

    #[test]
    fn test_pbe_key() {
        let key = Key::Pbe(Pkcs12PbeKey::new("secret", b"saltsalt", 100));
        let mut a = HmacEngine::sha256();
        a.init(&key, None).unwrap();
        a.update(b"message");

        let other = Key::Pbe(Pkcs12PbeKey::new("Secret", b"saltsalt", 100));
        let mut b = HmacEngine::sha256();
        b.init(&other, None).unwrap();
        b.update(b"message");

        assert_ne!(a.do_final(), b.do_final());
    }

    #[test]
    fn test_rejects_parameters() {
        let mut mac = HmacEngine::sha1();
        let spec = ParameterSpec::DhGen { prime_size: 1024, exponent_size: 0 };
        match mac.init(&Key::Secret(SecretKey::new("HMAC", b"k")), Some(&spec)) {
            Err(SecurityError::InvalidAlgorithmParameter(_)) => assert!(true),
            other => panic!("Expected InvalidAlgorithmParameter, got {:?}", other),
        }
    }
}
