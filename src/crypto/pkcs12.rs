//! PKCS#12 key derivation
//!
//! The password based key derivation of RFC 7292 appendix B.2, instantiated
//! with SHA-256 (u = 32, v = 64). Used by the keystore for its integrity
//! key, for private key protection and by MACs keyed with a PBE key.

use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// Purpose byte for encryption keys
pub const ID_KEY: u8 = 1;
/// Purpose byte for initialisation vectors / nonces
pub const ID_IV: u8 = 2;
/// Purpose byte for MAC keys
pub const ID_MAC: u8 = 3;

const U: usize = 32;
const V: usize = 64;

/// Password as a BMPString: UTF-16BE code units followed by two zero bytes
pub fn bmp_password(password: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(password.len() * 2 + 2);
    for unit in password.encode_utf16() {
        out.extend_from_slice(&unit.to_be_bytes());
    }
    out.extend_from_slice(&[0, 0]);
    out
}

fn repeat_to_block(src: &[u8]) -> Vec<u8> {
    if src.is_empty() {
        return Vec::new();
    }
    let len = V * src.len().div_ceil(V);
    src.iter().copied().cycle().take(len).collect()
}

/// Derive `n` bytes of key material for purpose `id`
pub fn derive(id: u8, password: &str, salt: &[u8], iterations: u32, n: usize) -> Vec<u8> {
    let mut pass = bmp_password(password);
    let d = [id; V];
    let s = repeat_to_block(salt);
    let p = repeat_to_block(&pass);
    pass.zeroize();

    let mut i_block: Vec<u8> = s.into_iter().chain(p).collect();
    let mut out = Vec::with_capacity(n + U);
    let rounds = iterations.max(1);

    while out.len() < n {
        let mut hasher = Sha256::new();
        hasher.update(d);
        hasher.update(&i_block);
        let mut a = hasher.finalize();
        for _ in 1..rounds {
            a = Sha256::digest(a);
        }
        out.extend_from_slice(&a);

        if out.len() >= n {
            break;
        }

        // I_j = (I_j + B + 1) mod 2^(8v), B = A repeated to v bytes
        let b: Vec<u8> = a.iter().copied().cycle().take(V).collect();
        for chunk in i_block.chunks_mut(V) {
            let mut carry = 1u16;
            for k in (0..V).rev() {
                let sum = chunk[k] as u16 + b[k] as u16 + carry;
                chunk[k] = sum as u8;
                carry = sum >> 8;
            }
        }
    }

    i_block.zeroize();
    out.truncate(n);
    out
}
