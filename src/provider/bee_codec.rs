//! BEE key encoding
//!
//! A key is written as its algorithm name (`write_utf`) followed by each
//! component as a 4-byte length and the minimal unsigned big-endian bytes
//! of the integer:
//!
//! | algorithm   | components                        |
//! |-------------|-----------------------------------|
//! | DH          | p, g, x or y                      |
//! | DSA         | p, q, g, x or y                   |
//! | RSA public  | n, e                              |
//! | RSA private | n, d                              |
//! | RSA CRT     | n, e, d, p, q, dP, dQ, qInv       |
//!
//! Decoding tells a CRT key from a plain private key by whether bytes remain
//! after the second component.

use num_bigint_dig::BigUint;
use zeroize::Zeroize;

use crate::common::{DataInputStream, DataOutputStream, Result, SecurityError};
use crate::crypto::mp;
use crate::security::key::{
    DhParams, DhPrivateKey, DhPublicKey, DsaParams, DsaPrivateKey, DsaPublicKey, PrivateKey,
    PublicKey, RsaPrivateCrtKey, RsaPrivateKey, RsaPublicKey,
};

fn write_mp(out: &mut DataOutputStream, n: &BigUint) -> Result<()> {
    out.write_sized(&mp::unsigned_bytes(n))
}

fn read_mp(input: &mut DataInputStream<&[u8]>) -> Result<BigUint> {
    let len = input.read_i32().map_err(spec_error)?;
    if len <= 0 {
        return Err(SecurityError::InvalidKeySpec(format!("invalid component length {}", len)));
    }
    let len = len as usize;
    if len > input.available() {
        return Err(SecurityError::InvalidKeySpec("truncated key encoding".to_string()));
    }
    let mut raw = input.read_bytes(len).map_err(spec_error)?;
    let n = mp::os2ip(&raw);
    raw.zeroize();
    Ok(n)
}

fn spec_error(e: SecurityError) -> SecurityError {
    match e {
        SecurityError::Io(io) => SecurityError::InvalidKeySpec(format!("malformed key encoding: {}", io)),
        other => other,
    }
}

/// BEE encoding of a public key
pub fn encode_public(key: &PublicKey) -> Result<Vec<u8>> {
    let mut out = DataOutputStream::new();
    out.write_utf(key.algorithm())?;
    match key {
        PublicKey::Dh(k) => {
            write_mp(&mut out, &k.params().p)?;
            write_mp(&mut out, &k.params().g)?;
            write_mp(&mut out, k.y())?;
        }
        PublicKey::Dsa(k) => {
            write_mp(&mut out, &k.params().p)?;
            write_mp(&mut out, &k.params().q)?;
            write_mp(&mut out, &k.params().g)?;
            write_mp(&mut out, k.y())?;
        }
        PublicKey::Rsa(k) => {
            write_mp(&mut out, k.modulus())?;
            write_mp(&mut out, k.public_exponent())?;
        }
    }
    Ok(out.into_vec())
}

/// BEE encoding of a private key
pub fn encode_private(key: &PrivateKey) -> Result<Vec<u8>> {
    let mut out = DataOutputStream::new();
    out.write_utf(key.algorithm())?;
    match key {
        PrivateKey::Dh(k) => {
            write_mp(&mut out, &k.params().p)?;
            write_mp(&mut out, &k.params().g)?;
            write_mp(&mut out, k.x())?;
        }
        PrivateKey::Dsa(k) => {
            write_mp(&mut out, &k.params().p)?;
            write_mp(&mut out, &k.params().q)?;
            write_mp(&mut out, &k.params().g)?;
            write_mp(&mut out, k.x())?;
        }
        PrivateKey::Rsa(k) => {
            write_mp(&mut out, k.modulus())?;
            write_mp(&mut out, k.private_exponent())?;
        }
        PrivateKey::RsaCrt(k) => {
            write_mp(&mut out, k.modulus())?;
            write_mp(&mut out, k.public_exponent())?;
            write_mp(&mut out, k.private_exponent())?;
            write_mp(&mut out, k.prime_p())?;
            write_mp(&mut out, k.prime_q())?;
            write_mp(&mut out, k.prime_exponent_p())?;
            write_mp(&mut out, k.prime_exponent_q())?;
            write_mp(&mut out, k.crt_coefficient())?;
        }
    }
    Ok(out.into_vec())
}

fn read_algorithm(input: &mut DataInputStream<&[u8]>) -> Result<String> {
    input.read_utf().map_err(spec_error)
}

fn unsupported(algorithm: &str) -> SecurityError {
    SecurityError::InvalidKeySpec(format!("Unsupported key algorithm {}", algorithm))
}

/// Decode a BEE encoded public key
///
/// The returned key keeps `encoded` as its encoding.
pub fn decode_public(encoded: &[u8]) -> Result<PublicKey> {
    let mut input = DataInputStream::new(encoded);
    let algorithm = read_algorithm(&mut input)?;
    let cache = Some(encoded.to_vec());

    let key = match algorithm.as_str() {
        "DH" => {
            let p = read_mp(&mut input)?;
            let g = read_mp(&mut input)?;
            let y = read_mp(&mut input)?;
            PublicKey::Dh(DhPublicKey::with_encoding(DhParams::new(p, g), y, cache))
        }
        "DSA" => {
            let p = read_mp(&mut input)?;
            let q = read_mp(&mut input)?;
            let g = read_mp(&mut input)?;
            let y = read_mp(&mut input)?;
            PublicKey::Dsa(DsaPublicKey::with_encoding(DsaParams::new(p, q, g), y, cache))
        }
        "RSA" => {
            let n = read_mp(&mut input)?;
            let e = read_mp(&mut input)?;
            PublicKey::Rsa(RsaPublicKey::with_encoding(n, e, cache))
        }
        other => return Err(unsupported(other)),
    };
    Ok(key)
}

/// Decode a BEE encoded private key
///
/// The returned key keeps `encoded` as its encoding.
pub fn decode_private(encoded: &[u8]) -> Result<PrivateKey> {
    let mut input = DataInputStream::new(encoded);
    let algorithm = read_algorithm(&mut input)?;
    let cache = Some(encoded.to_vec());

    let key = match algorithm.as_str() {
        "DH" => {
            let p = read_mp(&mut input)?;
            let g = read_mp(&mut input)?;
            let x = read_mp(&mut input)?;
            PrivateKey::Dh(DhPrivateKey::with_encoding(DhParams::new(p, g), x, cache))
        }
        "DSA" => {
            let p = read_mp(&mut input)?;
            let q = read_mp(&mut input)?;
            let g = read_mp(&mut input)?;
            let x = read_mp(&mut input)?;
            PrivateKey::Dsa(DsaPrivateKey::with_encoding(DsaParams::new(p, q, g), x, cache))
        }
        "RSA" => {
            let n = read_mp(&mut input)?;
            let second = read_mp(&mut input)?;
            if input.available() == 0 {
                PrivateKey::Rsa(RsaPrivateKey::with_encoding(n, second, cache))
            } else {
                let d = read_mp(&mut input)?;
                let p = read_mp(&mut input)?;
                let q = read_mp(&mut input)?;
                let dp = read_mp(&mut input)?;
                let dq = read_mp(&mut input)?;
                let qinv = read_mp(&mut input)?;
                let key = RsaPrivateCrtKey::new(n, second, d, p, q, dp, dq, qinv);
                PrivateKey::RsaCrt(key.set_encoding(encoded.to_vec()))
            }
        }
        other => return Err(unsupported(other)),
    };
    Ok(key)
}
