//! RSA primitives
//!
//! PKCS#1 v1.5 signature encoding, the public and private operations (plain
//! and Chinese Remainder) and key generation.

use log::debug;
use num_bigint_dig::{BigUint, RandPrime};
use num_integer::Integer;
use num_traits::One;
use rand::RngCore;
use zeroize::Zeroize;

use crate::common::{Result, SecurityError};
use crate::crypto::mp;

/// Default public exponent
pub const DEFAULT_EXPONENT: u32 = 65537;

/// Smallest modulus accepted by the key pair generator
pub const MIN_BITS: usize = 512;

/// DER DigestInfo prefix for SHA-1
pub const SHA1_DIGEST_INFO: &[u8] = &[
    0x30, 0x21, 0x30, 0x09, 0x06, 0x05, 0x2b, 0x0e, 0x03, 0x02, 0x1a, 0x05, 0x00, 0x04, 0x14,
];

/// DER DigestInfo prefix for SHA-256
pub const SHA256_DIGEST_INFO: &[u8] = &[
    0x30, 0x31, 0x30, 0x0d, 0x06, 0x09, 0x60, 0x86, 0x48, 0x01, 0x65, 0x03, 0x04, 0x02, 0x01,
    0x05, 0x00, 0x04, 0x20,
];

/// Components of a freshly generated key
#[derive(Clone)]
pub struct CrtComponents {
    pub n: BigUint,
    pub e: BigUint,
    pub d: BigUint,
    pub p: BigUint,
    pub q: BigUint,
    pub dp: BigUint,
    pub dq: BigUint,
    pub qinv: BigUint,
}

impl Drop for CrtComponents {
    fn drop(&mut self) {
        self.d.zeroize();
        self.p.zeroize();
        self.q.zeroize();
        self.dp.zeroize();
        self.dq.zeroize();
        self.qinv.zeroize();
    }
}

/// EMSA-PKCS1-v1_5 encoding: `00 01 FF .. FF 00 || prefix || hash`
pub fn emsa_pkcs1_v15(prefix: &[u8], hash: &[u8], em_len: usize) -> Result<Vec<u8>> {
    let t_len = prefix.len() + hash.len();
    if em_len < t_len + 11 {
        return Err(SecurityError::Signature(
            "modulus too short for PKCS#1 v1.5 encoding".to_string(),
        ));
    }

    let mut em = Vec::with_capacity(em_len);
    em.push(0x00);
    em.push(0x01);
    em.resize(em_len - t_len - 1, 0xff);
    em.push(0x00);
    em.extend_from_slice(prefix);
    em.extend_from_slice(hash);
    Ok(em)
}

fn check_modulus(n: &BigUint, name: &str) -> Result<()> {
    if n <= &BigUint::one() {
        return Err(SecurityError::InvalidKey(format!("RSA {} must be greater than one", name)));
    }
    Ok(())
}

/// `m^e mod n`
pub fn rsapub(n: &BigUint, e: &BigUint, m: &BigUint) -> Result<BigUint> {
    check_modulus(n, "modulus")?;
    if m >= n {
        return Err(SecurityError::Signature("message representative out of range".to_string()));
    }
    Ok(m.modpow(e, n))
}

/// `c^d mod n`
pub fn rsapri(n: &BigUint, d: &BigUint, c: &BigUint) -> Result<BigUint> {
    check_modulus(n, "modulus")?;
    if c >= n {
        return Err(SecurityError::Signature("ciphertext representative out of range".to_string()));
    }
    Ok(c.modpow(d, n))
}

/// Private operation with the Chinese Remainder Theorem
pub fn rsapricrt(
    n: &BigUint,
    p: &BigUint,
    q: &BigUint,
    dp: &BigUint,
    dq: &BigUint,
    qinv: &BigUint,
    c: &BigUint,
) -> Result<BigUint> {
    check_modulus(n, "modulus")?;
    check_modulus(p, "prime p")?;
    check_modulus(q, "prime q")?;
    if c >= n {
        return Err(SecurityError::Signature("ciphertext representative out of range".to_string()));
    }
    let m1 = (c % p).modpow(dp, p);
    let m2 = (c % q).modpow(dq, q);

    // h = qInv * (m1 - m2) mod p
    let m2p = &m2 % p;
    let diff = if m1 >= m2p { m1 - m2p } else { m1 + p - m2p };
    let h = (qinv * diff) % p;
    Ok(m2 + h * q)
}

/// Generate a key with an exactly `bits`-bit modulus
pub fn generate(bits: usize, e: &BigUint, rng: &mut dyn RngCore) -> Result<CrtComponents> {
    if bits < MIN_BITS {
        return Err(SecurityError::InvalidParameter(format!(
            "RSA modulus must be at least {} bits",
            MIN_BITS
        )));
    }
    let one = BigUint::one();
    if e <= &one || e.is_even() {
        return Err(SecurityError::InvalidParameter("public exponent must be odd and greater than one".to_string()));
    }
    debug!("Generating {}-bit RSA key", bits);

    let p_bits = (bits + 1) / 2;
    let q_bits = bits - p_bits;
    loop {
        let mut p: BigUint = rng.gen_prime(p_bits);
        let mut q: BigUint = rng.gen_prime(q_bits);
        if p == q {
            continue;
        }
        if p < q {
            std::mem::swap(&mut p, &mut q);
        }
        let n = &p * &q;
        if n.bits() != bits {
            continue;
        }

        let p1 = &p - &one;
        let q1 = &q - &one;
        if !e.gcd(&p1).is_one() || !e.gcd(&q1).is_one() {
            continue;
        }
        let phi = &p1 * &q1;
        let d = match mp::mod_inverse(e, &phi) {
            Some(d) => d,
            None => continue,
        };
        let qinv = match mp::mod_inverse(&q, &p) {
            Some(v) => v,
            None => continue,
        };
        let dp = &d % &p1;
        let dq = &d % &q1;

        return Ok(CrtComponents { n, e: e.clone(), d, p, q, dp, dq, qinv });
    }
}
