//! KeyFactory.BEE
//!
//! Turns BEE encoded key specs into keys and back. It does not translate
//! keys between providers.

use crate::common::{Result, SecurityError};
use crate::security::key::{Key, PrivateKey, PublicKey, BEE_FORMAT};
use crate::security::spec::{EncodedKeySpec, KeySpec, KeySpecKind};
use crate::security::spi::KeyFactorySpi;

use super::bee_codec;

#[derive(Debug, Default)]
pub struct BeeKeyFactory;

impl BeeKeyFactory {
    pub fn new() -> Self {
        BeeKeyFactory
    }
}

fn bee_bytes(spec: &KeySpec) -> Result<&[u8]> {
    match spec {
        KeySpec::Encoded(enc) if enc.format().eq_ignore_ascii_case(BEE_FORMAT) => Ok(enc.encoded()),
        KeySpec::Encoded(enc) => Err(SecurityError::InvalidKeySpec(format!(
            "Unsupported key format {}",
            enc.format()
        ))),
        other => Err(SecurityError::InvalidKeySpec(format!(
            "Unsupported KeySpec type {:?}",
            other.kind()
        ))),
    }
}

impl KeyFactorySpi for BeeKeyFactory {
    fn generate_public(&self, spec: &KeySpec) -> Result<PublicKey> {
        bee_codec::decode_public(bee_bytes(spec)?)
    }

    fn generate_private(&self, spec: &KeySpec) -> Result<PrivateKey> {
        bee_codec::decode_private(bee_bytes(spec)?)
    }

    fn get_key_spec(&self, key: &Key, kind: KeySpecKind) -> Result<KeySpec> {
        if kind != KeySpecKind::Encoded {
            return Err(SecurityError::InvalidKeySpec(format!("Unsupported KeySpec type {:?}", kind)));
        }
        match key.format() {
            Some(format) if format.eq_ignore_ascii_case(BEE_FORMAT) => {}
            _ => return Err(SecurityError::InvalidKeySpec("Unsupported key format".to_string())),
        }
        let encoded = key
            .encoded()
            .ok_or_else(|| SecurityError::InvalidKeySpec("key has no encoding".to_string()))?;
        Ok(KeySpec::Encoded(EncodedKeySpec::bee(encoded)))
    }

    fn translate_key(&self, _key: &Key) -> Result<Key> {
        Err(SecurityError::InvalidKey(
            "This KeyFactory can only be used for encoding and decoding".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::key::{RsaPublicKey, SecretKey};
    use num_bigint_dig::BigUint;

    #[test]
    fn test_encode_decode_through_specs() {
        let factory = BeeKeyFactory::new();
        let key = Key::Public(PublicKey::Rsa(RsaPublicKey::new(BigUint::from(3233u32), BigUint::from(17u32))));

        let spec = factory.get_key_spec(&key, KeySpecKind::Encoded).unwrap();
        let lower = match &spec {
            KeySpec::Encoded(enc) => KeySpec::Encoded(EncodedKeySpec::new("bee", enc.encoded())),
            other => panic!("Expected encoded spec, got {:?}", other),
        };
        let back = factory.generate_public(&lower).unwrap();
        assert_eq!(Key::Public(back), key);
    }

    #[test]
    fn test_rejections() {
        let factory = BeeKeyFactory::new();
        let x509 = KeySpec::Encoded(EncodedKeySpec::new("X.509", &[0x30]));
        assert!(matches!(factory.generate_public(&x509), Err(SecurityError::InvalidKeySpec(_))));

        let secret = Key::Secret(SecretKey::new("HMAC", b"k"));
        assert!(matches!(
            factory.get_key_spec(&secret, KeySpecKind::Encoded),
            Err(SecurityError::InvalidKeySpec(_))
        ));
        match factory.translate_key(&secret) {
            Err(SecurityError::InvalidKey(msg)) => assert!(msg.contains("encoding and decoding")),
            other => panic!("Expected InvalidKey, got {:?}", other),
        }
    }
}
