//! Key and parameter specifications
//!
//! Transparent descriptions of key material and algorithm parameters used to
//! move keys in and out of key factories and to configure generators.

use num_bigint_dig::BigUint;
use zeroize::Zeroize;

use super::key::{DhParams, DsaParams, BEE_FORMAT};

/// A key in an external encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedKeySpec {
    format: String,
    encoded: Vec<u8>,
}

impl EncodedKeySpec {
    pub fn new(format: impl Into<String>, encoded: &[u8]) -> Self {
        Self { format: format.into(), encoded: encoded.to_vec() }
    }

    /// A BEE encoded key
    pub fn bee(encoded: &[u8]) -> Self {
        Self::new(BEE_FORMAT, encoded)
    }

    pub fn format(&self) -> &str {
        &self.format
    }

    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }
}

impl Drop for EncodedKeySpec {
    fn drop(&mut self) {
        self.encoded.zeroize();
    }
}

/// Key material accepted and produced by key factories
#[derive(Debug, Clone, PartialEq)]
pub enum KeySpec {
    Encoded(EncodedKeySpec),
    DhPublic { params: DhParams, y: BigUint },
    DhPrivate { params: DhParams, x: BigUint },
    DsaPublic { params: DsaParams, y: BigUint },
    DsaPrivate { params: DsaParams, x: BigUint },
    RsaPublic { n: BigUint, e: BigUint },
    RsaPrivate { n: BigUint, d: BigUint },
    RsaPrivateCrt {
        n: BigUint,
        e: BigUint,
        d: BigUint,
        p: BigUint,
        q: BigUint,
        dp: BigUint,
        dq: BigUint,
        qinv: BigUint,
    },
}

impl KeySpec {
    pub fn kind(&self) -> KeySpecKind {
        match self {
            KeySpec::Encoded(_) => KeySpecKind::Encoded,
            KeySpec::DhPublic { .. } => KeySpecKind::DhPublic,
            KeySpec::DhPrivate { .. } => KeySpecKind::DhPrivate,
            KeySpec::DsaPublic { .. } => KeySpecKind::DsaPublic,
            KeySpec::DsaPrivate { .. } => KeySpecKind::DsaPrivate,
            KeySpec::RsaPublic { .. } => KeySpecKind::RsaPublic,
            KeySpec::RsaPrivate { .. } => KeySpecKind::RsaPrivate,
            KeySpec::RsaPrivateCrt { .. } => KeySpecKind::RsaPrivateCrt,
        }
    }
}

impl Drop for KeySpec {
    fn drop(&mut self) {
        match self {
            KeySpec::DhPrivate { x, .. } | KeySpec::DsaPrivate { x, .. } => x.zeroize(),
            KeySpec::RsaPrivate { d, .. } => d.zeroize(),
            KeySpec::RsaPrivateCrt { d, p, q, dp, dq, qinv, .. } => {
                d.zeroize();
                p.zeroize();
                q.zeroize();
                dp.zeroize();
                dq.zeroize();
                qinv.zeroize();
            }
            _ => {}
        }
    }
}

/// Which [`KeySpec`] variant a caller wants back from a key factory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySpecKind {
    Encoded,
    DhPublic,
    DhPrivate,
    DsaPublic,
    DsaPrivate,
    RsaPublic,
    RsaPrivate,
    RsaPrivateCrt,
}

/// Algorithm parameters for generators, parameter objects and engines
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParameterSpec {
    /// Diffie-Hellman domain
    Dh(DhParams),
    /// Sizes for Diffie-Hellman domain generation
    DhGen { prime_size: usize, exponent_size: usize },
    /// DSA domain
    Dsa(DsaParams),
    /// RSA key generation with an explicit public exponent
    RsaKeyGen { key_size: usize, public_exponent: BigUint },
}

impl ParameterSpec {
    /// Short description used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            ParameterSpec::Dh(_) => "DHParameterSpec",
            ParameterSpec::DhGen { .. } => "DHGenParameterSpec",
            ParameterSpec::Dsa(_) => "DSAParameterSpec",
            ParameterSpec::RsaKeyGen { .. } => "RSAKeyGenParameterSpec",
        }
    }
}
