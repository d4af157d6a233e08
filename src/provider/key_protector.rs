//! Password protection of private keys in the key store
//!
//! A protected key is a 16-byte random salt followed by the AES-256-GCM
//! encryption of the key's BEE encoding. The AES key and nonce come from
//! the PKCS#12 KDF (key and IV ids) over the password, the salt and the
//! store's iteration count; a fresh salt per key keeps nonces unique.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit};
use rand::RngCore;
use zeroize::Zeroizing;

use crate::common::{Result, SecurityError};
use crate::crypto::pkcs12;
use crate::security::key::{PrivateKey, BEE_FORMAT};
use crate::security::key_factory::KeyFactory;
use crate::security::registry::Security;
use crate::security::spec::{EncodedKeySpec, KeySpec};

const SALT_LEN: usize = 16;
const KEY_LEN: usize = 32;
const NONCE_LEN: usize = 12;

pub struct KeyProtector<'a> {
    password: &'a str,
    iterations: u32,
}

impl<'a> KeyProtector<'a> {
    pub fn new(password: &'a str, iterations: u32) -> Self {
        Self { password, iterations }
    }

    fn cipher(&self, salt: &[u8]) -> (Aes256Gcm, Zeroizing<Vec<u8>>) {
        let key = Zeroizing::new(pkcs12::derive(pkcs12::ID_KEY, self.password, salt, self.iterations, KEY_LEN));
        let nonce = Zeroizing::new(pkcs12::derive(pkcs12::ID_IV, self.password, salt, self.iterations, NONCE_LEN));
        (Aes256Gcm::new(key.as_slice().into()), nonce)
    }

    /// Encrypt the BEE encoding of `key`
    pub fn protect(&self, key: &PrivateKey, rng: &mut dyn RngCore) -> Result<Vec<u8>> {
        let encoded = key
            .encoded()
            .ok_or_else(|| SecurityError::InvalidKey("PrivateKey has no encoding".to_string()))?;

        let mut salt = [0u8; SALT_LEN];
        rng.fill_bytes(&mut salt);
        let (cipher, nonce) = self.cipher(&salt);
        let sealed = cipher
            .encrypt(nonce.as_slice().into(), encoded)
            .map_err(|_| SecurityError::KeyStore("Failed to protect key".to_string()))?;

        let mut out = Vec::with_capacity(SALT_LEN + sealed.len());
        out.extend_from_slice(&salt);
        out.extend_from_slice(&sealed);
        Ok(out)
    }

    /// Decrypt and decode a protected key
    pub fn recover(&self, security: &Security, protected: &[u8]) -> Result<PrivateKey> {
        if protected.len() <= SALT_LEN {
            return Err(SecurityError::UnrecoverableKey("protected key is truncated".to_string()));
        }
        let (salt, sealed) = protected.split_at(SALT_LEN);
        let (cipher, nonce) = self.cipher(salt);
        let encoded = Zeroizing::new(
            cipher
                .decrypt(nonce.as_slice().into(), sealed)
                .map_err(|_| SecurityError::UnrecoverableKey("wrong password or corrupted key".to_string()))?,
        );

        let factory = KeyFactory::get_instance(security, BEE_FORMAT)?;
        factory
            .generate_private(&KeySpec::Encoded(EncodedKeySpec::bee(&encoded)))
            .map_err(|e| SecurityError::UnrecoverableKey(e.to_string()))
    }
}
