//! Multi-precision helpers
//!
//! Conversions between `BigUint` and byte strings plus the few number
//! theoretic helpers the engines need on top of `num-bigint-dig`.

use num_bigint_dig::{BigInt, BigUint, ModInverse, RandBigInt, Sign, ToBigUint};
use num_traits::{One, Zero};
use rand::RngCore;
use zeroize::Zeroize;

use crate::common::{Result, SecurityError};

/// Number of bytes needed to hold `n` without sign padding
pub fn byte_length(n: &BigUint) -> usize {
    (n.bits() + 7) >> 3
}

/// Integer to octet string of exactly `len` bytes
///
/// Fails when `n` needs more than `len` bytes.
pub fn i2osp(n: &BigUint, len: usize) -> Result<Vec<u8>> {
    let size = byte_length(n);
    if size > len {
        return Err(SecurityError::invalid_data(format!(
            "integer needs {} bytes but only {} available",
            size, len
        )));
    }

    let mut out = vec![0u8; len];
    if !n.is_zero() {
        let raw = n.to_bytes_be();
        out[len - raw.len()..].copy_from_slice(&raw);
    }
    Ok(out)
}

/// Octet string to integer
pub fn os2ip(bytes: &[u8]) -> BigUint {
    BigUint::from_bytes_be(bytes)
}

/// Minimal big-endian encoding that still reads back as non-negative
///
/// One leading zero byte is added when the top bit of the first byte is
/// set, so `0` encodes as `[0x00]` and `0x80` as `[0x00, 0x80]`.
pub fn unsigned_bytes(n: &BigUint) -> Vec<u8> {
    let raw = n.to_bytes_be();
    if raw.is_empty() {
        return vec![0];
    }
    if raw[0] & 0x80 != 0 {
        let mut padded = Vec::with_capacity(raw.len() + 1);
        padded.push(0);
        padded.extend_from_slice(&raw);
        padded
    } else {
        raw
    }
}

/// Parse a hexadecimal literal
pub fn from_hex(hex: &str) -> Result<BigUint> {
    BigUint::parse_bytes(hex.as_bytes(), 16)
        .ok_or_else(|| SecurityError::invalid_data(format!("invalid hex number: {}", hex)))
}

/// Modular inverse of `a` modulo `m`, if it exists
pub fn mod_inverse(a: &BigUint, m: &BigUint) -> Option<BigUint> {
    let inv: BigInt = a.clone().mod_inverse(m)?;
    let inv = if inv.sign() == Sign::Minus {
        inv + BigInt::from_biguint(Sign::Plus, m.clone())
    } else {
        inv
    };
    inv.to_biguint()
}

/// Uniform random integer in `[1, bound)`
pub fn random_below(rng: &mut dyn RngCore, bound: &BigUint) -> BigUint {
    random_range(rng, &BigUint::one(), bound)
}

/// Uniform random integer in `[low, high)`
pub fn random_range(rng: &mut dyn RngCore, low: &BigUint, high: &BigUint) -> BigUint {
    rng.gen_biguint_range(low, high)
}

/// Random integer of exactly `bits` bits
pub fn random_bits(rng: &mut dyn RngCore, bits: usize) -> BigUint {
    let n = rng.gen_biguint(bits);
    n | (BigUint::one() << (bits - 1))
}

/// Overwrite a secret integer
pub fn wipe(n: &mut BigUint) {
    n.zeroize();
    // zeroize leaves the limbs in place, which no longer compares as zero
    *n = BigUint::zero();
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    #[test]
    fn test_unsigned_bytes() {
        assert_eq!(unsigned_bytes(&BigUint::zero()), vec![0x00]);
        assert_eq!(unsigned_bytes(&BigUint::from(1u32)), vec![0x01]);
        assert_eq!(unsigned_bytes(&BigUint::from(0x7fu32)), vec![0x7f]);
        assert_eq!(unsigned_bytes(&BigUint::from(0x80u32)), vec![0x00, 0x80]);
        assert_eq!(unsigned_bytes(&BigUint::from(0x0100u32)), vec![0x01, 0x00]);
    }

    #[test]
    fn test_i2osp() {
        let n = BigUint::from(0x0102u32);
        assert_eq!(i2osp(&n, 4).unwrap(), vec![0, 0, 1, 2]);
        assert_eq!(i2osp(&BigUint::zero(), 2).unwrap(), vec![0, 0]);
        assert!(i2osp(&n, 1).is_err(), "two-byte value must not fit in one byte");
        assert_eq!(os2ip(&[0, 0, 1, 2]), n);
    }

    #[test]
    fn test_mod_inverse() {
        let m = BigUint::from(97u32);
        let a = BigUint::from(15u32);
        let inv = mod_inverse(&a, &m).unwrap();
        assert_eq!((a * inv) % &m, BigUint::one());
        assert!(mod_inverse(&BigUint::from(6u32), &BigUint::from(9u32)).is_none());
    }

    #[test]
    fn test_random_ranges() {
        let bound = BigUint::from(10u32);
        for _ in 0..50 {
            let r = random_below(&mut OsRng, &bound);
            assert!(r >= BigUint::one() && r < bound);
        }
        assert_eq!(random_bits(&mut OsRng, 160).bits(), 160);
    }

    #[test]
    fn test_wipe() {
        let mut n = from_hex("deadbeef").unwrap();
        wipe(&mut n);
        assert!(n.is_zero());
        assert_eq!(n, BigUint::zero());
        assert_eq!(unsigned_bytes(&n), vec![0x00]);
    }
}
