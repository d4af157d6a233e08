//! Component key factories for DH, DSA and RSA
//!
//! Each factory builds keys of its algorithm from component specs or from
//! BEE encoded specs, and hands the components back out.

use crate::common::{Result, SecurityError};
use crate::security::key::{
    DhPrivateKey, DhPublicKey, DsaPrivateKey, DsaPublicKey, Key, PrivateKey, PublicKey,
    RsaPrivateCrtKey, RsaPrivateKey, RsaPublicKey, BEE_FORMAT,
};
use crate::security::spec::{EncodedKeySpec, KeySpec, KeySpecKind};
use crate::security::spi::KeyFactorySpi;

use super::bee_codec;

fn unsupported_spec(algorithm: &str, spec: &KeySpec) -> SecurityError {
    SecurityError::InvalidKeySpec(format!("{} KeyFactory does not accept {:?}", algorithm, spec.kind()))
}

fn unsupported_kind(algorithm: &str, kind: KeySpecKind) -> SecurityError {
    SecurityError::InvalidKeySpec(format!("{} KeyFactory cannot produce {:?}", algorithm, kind))
}

fn wrong_key(algorithm: &str, key: &Key) -> SecurityError {
    SecurityError::InvalidKey(format!("{} KeyFactory cannot handle {} keys", algorithm, key.algorithm()))
}

/// Decode a BEE spec and check the algorithm of the result
fn decode_encoded_public(algorithm: &str, enc: &EncodedKeySpec) -> Result<PublicKey> {
    if !enc.format().eq_ignore_ascii_case(BEE_FORMAT) {
        return Err(SecurityError::InvalidKeySpec(format!("Unsupported key format {}", enc.format())));
    }
    let key = bee_codec::decode_public(enc.encoded())?;
    if key.algorithm() != algorithm {
        return Err(SecurityError::InvalidKeySpec(format!("encoded key is not a {} key", algorithm)));
    }
    Ok(key)
}

fn decode_encoded_private(algorithm: &str, enc: &EncodedKeySpec) -> Result<PrivateKey> {
    if !enc.format().eq_ignore_ascii_case(BEE_FORMAT) {
        return Err(SecurityError::InvalidKeySpec(format!("Unsupported key format {}", enc.format())));
    }
    let key = bee_codec::decode_private(enc.encoded())?;
    if key.algorithm() != algorithm {
        return Err(SecurityError::InvalidKeySpec(format!("encoded key is not a {} key", algorithm)));
    }
    Ok(key)
}

fn encoded_spec(key: &Key) -> Result<KeySpec> {
    key.encoded()
        .map(|bytes| KeySpec::Encoded(EncodedKeySpec::bee(bytes)))
        .ok_or_else(|| SecurityError::InvalidKeySpec("key has no encoding".to_string()))
}

fn translate(factory: &dyn KeyFactorySpi, algorithm: &str, key: &Key) -> Result<Key> {
    if key.algorithm() != algorithm {
        return Err(wrong_key(algorithm, key));
    }
    let spec = factory.get_key_spec(key, KeySpecKind::Encoded)?;
    match key {
        Key::Public(_) => Ok(Key::Public(factory.generate_public(&spec)?)),
        Key::Private(_) => Ok(Key::Private(factory.generate_private(&spec)?)),
        other => Err(wrong_key(algorithm, other)),
    }
}

/// KeyFactory.DH
#[derive(Debug, Default)]
pub struct DhKeyFactory;

impl DhKeyFactory {
    pub fn new() -> Self {
        DhKeyFactory
    }
}

impl KeyFactorySpi for DhKeyFactory {
    fn generate_public(&self, spec: &KeySpec) -> Result<PublicKey> {
        match spec {
            KeySpec::DhPublic { params, y } => Ok(PublicKey::Dh(DhPublicKey::new(params.clone(), y.clone()))),
            KeySpec::Encoded(enc) => decode_encoded_public("DH", enc),
            other => Err(unsupported_spec("DH", other)),
        }
    }

    fn generate_private(&self, spec: &KeySpec) -> Result<PrivateKey> {
        match spec {
            KeySpec::DhPrivate { params, x } => Ok(PrivateKey::Dh(DhPrivateKey::new(params.clone(), x.clone()))),
            KeySpec::Encoded(enc) => decode_encoded_private("DH", enc),
            other => Err(unsupported_spec("DH", other)),
        }
    }

    fn get_key_spec(&self, key: &Key, kind: KeySpecKind) -> Result<KeySpec> {
        match (key, kind) {
            (Key::Public(PublicKey::Dh(k)), KeySpecKind::DhPublic) => {
                Ok(KeySpec::DhPublic { params: k.params().clone(), y: k.y().clone() })
            }
            (Key::Private(PrivateKey::Dh(k)), KeySpecKind::DhPrivate) => {
                Ok(KeySpec::DhPrivate { params: k.params().clone(), x: k.x().clone() })
            }
            (Key::Public(PublicKey::Dh(_)) | Key::Private(PrivateKey::Dh(_)), KeySpecKind::Encoded) => encoded_spec(key),
            (Key::Public(PublicKey::Dh(_)) | Key::Private(PrivateKey::Dh(_)), kind) => Err(unsupported_kind("DH", kind)),
            (other, _) => Err(wrong_key("DH", other)),
        }
    }

    fn translate_key(&self, key: &Key) -> Result<Key> {
        translate(self, "DH", key)
    }
}

/// KeyFactory.DSA
#[derive(Debug, Default)]
pub struct DsaKeyFactory;

impl DsaKeyFactory {
    pub fn new() -> Self {
        DsaKeyFactory
    }
}

impl KeyFactorySpi for DsaKeyFactory {
    fn generate_public(&self, spec: &KeySpec) -> Result<PublicKey> {
        match spec {
            KeySpec::DsaPublic { params, y } => Ok(PublicKey::Dsa(DsaPublicKey::new(params.clone(), y.clone()))),
            KeySpec::Encoded(enc) => decode_encoded_public("DSA", enc),
            other => Err(unsupported_spec("DSA", other)),
        }
    }

    fn generate_private(&self, spec: &KeySpec) -> Result<PrivateKey> {
        match spec {
            KeySpec::DsaPrivate { params, x } => Ok(PrivateKey::Dsa(DsaPrivateKey::new(params.clone(), x.clone()))),
            KeySpec::Encoded(enc) => decode_encoded_private("DSA", enc),
            other => Err(unsupported_spec("DSA", other)),
        }
    }

    fn get_key_spec(&self, key: &Key, kind: KeySpecKind) -> Result<KeySpec> {
        match (key, kind) {
            (Key::Public(PublicKey::Dsa(k)), KeySpecKind::DsaPublic) => {
                Ok(KeySpec::DsaPublic { params: k.params().clone(), y: k.y().clone() })
            }
            (Key::Private(PrivateKey::Dsa(k)), KeySpecKind::DsaPrivate) => {
                Ok(KeySpec::DsaPrivate { params: k.params().clone(), x: k.x().clone() })
            }
            (Key::Public(PublicKey::Dsa(_)) | Key::Private(PrivateKey::Dsa(_)), KeySpecKind::Encoded) => encoded_spec(key),
            (Key::Public(PublicKey::Dsa(_)) | Key::Private(PrivateKey::Dsa(_)), kind) => Err(unsupported_kind("DSA", kind)),
            (other, _) => Err(wrong_key("DSA", other)),
        }
    }

    fn translate_key(&self, key: &Key) -> Result<Key> {
        translate(self, "DSA", key)
    }
}

/// KeyFactory.RSA
#[derive(Debug, Default)]
pub struct RsaKeyFactory;

impl RsaKeyFactory {
    pub fn new() -> Self {
        RsaKeyFactory
    }
}

impl KeyFactorySpi for RsaKeyFactory {
    fn generate_public(&self, spec: &KeySpec) -> Result<PublicKey> {
        match spec {
            KeySpec::RsaPublic { n, e } => Ok(PublicKey::Rsa(RsaPublicKey::new(n.clone(), e.clone()))),
            KeySpec::Encoded(enc) => decode_encoded_public("RSA", enc),
            other => Err(unsupported_spec("RSA", other)),
        }
    }

    fn generate_private(&self, spec: &KeySpec) -> Result<PrivateKey> {
        match spec {
            KeySpec::RsaPrivate { n, d } => Ok(PrivateKey::Rsa(RsaPrivateKey::new(n.clone(), d.clone()))),
            KeySpec::RsaPrivateCrt { n, e, d, p, q, dp, dq, qinv } => Ok(PrivateKey::RsaCrt(RsaPrivateCrtKey::new(
                n.clone(),
                e.clone(),
                d.clone(),
                p.clone(),
                q.clone(),
                dp.clone(),
                dq.clone(),
                qinv.clone(),
            ))),
            KeySpec::Encoded(enc) => decode_encoded_private("RSA", enc),
            other => Err(unsupported_spec("RSA", other)),
        }
    }

    fn get_key_spec(&self, key: &Key, kind: KeySpecKind) -> Result<KeySpec> {
        match (key, kind) {
            (Key::Public(PublicKey::Rsa(k)), KeySpecKind::RsaPublic) => Ok(KeySpec::RsaPublic {
                n: k.modulus().clone(),
                e: k.public_exponent().clone(),
            }),
            (Key::Private(PrivateKey::Rsa(k)), KeySpecKind::RsaPrivate) => Ok(KeySpec::RsaPrivate {
                n: k.modulus().clone(),
                d: k.private_exponent().clone(),
            }),
            (Key::Private(PrivateKey::RsaCrt(k)), KeySpecKind::RsaPrivate) => Ok(KeySpec::RsaPrivate {
                n: k.modulus().clone(),
                d: k.private_exponent().clone(),
            }),
            (Key::Private(PrivateKey::RsaCrt(k)), KeySpecKind::RsaPrivateCrt) => Ok(KeySpec::RsaPrivateCrt {
                n: k.modulus().clone(),
                e: k.public_exponent().clone(),
                d: k.private_exponent().clone(),
                p: k.prime_p().clone(),
                q: k.prime_q().clone(),
                dp: k.prime_exponent_p().clone(),
                dq: k.prime_exponent_q().clone(),
                qinv: k.crt_coefficient().clone(),
            }),
            (Key::Public(PublicKey::Rsa(_)) | Key::Private(PrivateKey::Rsa(_) | PrivateKey::RsaCrt(_)), KeySpecKind::Encoded) => {
                encoded_spec(key)
            }
            (Key::Public(PublicKey::Rsa(_)) | Key::Private(PrivateKey::Rsa(_) | PrivateKey::RsaCrt(_)), kind) => {
                Err(unsupported_kind("RSA", kind))
            }
            (other, _) => Err(wrong_key("RSA", other)),
        }
    }

    fn translate_key(&self, key: &Key) -> Result<Key> {
        translate(self, "RSA", key)
    }
}
