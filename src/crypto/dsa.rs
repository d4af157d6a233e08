//! DSA primitives
//!
//! Signing, verification, domain parameter generation and the precomputed
//! domains for 512, 768 and 1024 bit moduli.

use log::{debug, warn};
use num_bigint_dig::prime::probably_prime;
use num_bigint_dig::{BigUint, RandPrime};
use num_traits::{One, Zero};
use once_cell::sync::OnceCell;
use rand::RngCore;

use crate::common::{Result, SecurityError};
use crate::crypto::mp;

/// Bit length of the subgroup order
pub const Q_BITS: usize = 160;

/// Nonces drawn before signing gives up on a domain
const MAX_SIGN_ATTEMPTS: usize = 64;

/// DSA domain parameters as plain integers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    pub p: BigUint,
    pub q: BigUint,
    pub g: BigUint,
}

/// FIPS 186 example domain
const P_512: &str = "8df2a494492276aa3d25759bb06869cbeac0d83afb8d0cf7cbb8324f0d7882e5d0762fc5b7210eafc2e9adac32ab7aac49693dfbf83724c2ec0736ee31c80291";
const Q_512: &str = "c773218c737ec8ee993b4f2ded30f48edace915f";
const G_512: &str = "626d027839ea0a13413163a55b4cb500299d5522956cefcb3bff10f399ce2c2e71cb9de5fa24babf58e5b79521925c9cc42e9f6f464b088cc572af53e6d78802";

const P_768: &str = "e9e642599d355f37c97ffd3567120b8e25c9cd43e927b3a9670fbec5d890141922d2c3b3ad2480093799869d1e846aab49fab0ad26d2ce6a22219d470bce7d777d4a21fbe9c270b57f607002f3cef8393694cf45ee3688c11a8c56ab127a3daf";
const Q_768: &str = "9cdbd84c9f1ac2f38d0f80f42ab952e7338bf511";
const G_768: &str = "30470ad5a005fb14ce2d9dcd87e38bc7d1b1c5facbaecbe95f190aa7a31d23c4dbbcbe06174544401a5b2c020965d8c2bd2171d3668445771f74ba084d2029d83c1c158547f3a9f1a2715be23d51ae4d3e5a1f6a7064f316933a346d3f529252";

const P_1024: &str = "fd7f53811d75122952df4a9c2eece4e7f611b7523cef4400c31e3f80b6512669455d402251fb593d8d58fabfc5f5ba30f6cb9b556cd7813b801d346ff26660b76b9950a5a49f9fe8047b1022c24fbba9d7feb7c61bf83b57e7c6a8a6150f04fb83f6d3c51ec3023554135a169132f675f3ae2b61d72aeff22203199dd14801c7";
const Q_1024: &str = "9760508f15230bccb292b982a2eb840bf0581cf5";
const G_1024: &str = "f7e1a085d69b3ddecbbcab5c36b857b97994afbbfa3aea82f9574c0b3d0782675159578ebad4594fe67107108180b449167123e84c281613b7cf09328cc8a6e13c167a8b547c8d28e0a3ae1e2bb3a675916ea37f0bfa213562f1fb627a01243bcca4f1bea8519089a883dfe15ae59f06928b665e807b552564014c3bfecf492a";

static DOMAIN_512: OnceCell<Option<Domain>> = OnceCell::new();
static DOMAIN_768: OnceCell<Option<Domain>> = OnceCell::new();
static DOMAIN_1024: OnceCell<Option<Domain>> = OnceCell::new();

fn load_domain(bits: usize, p: &str, q: &str, g: &str) -> Option<Domain> {
    let domain = match (mp::from_hex(p), mp::from_hex(q), mp::from_hex(g)) {
        (Ok(p), Ok(q), Ok(g)) => Domain { p, q, g },
        _ => {
            warn!("Precomputed {}-bit DSA domain is not valid hex", bits);
            return None;
        }
    };
    if domain.p.bits() != bits || !is_valid_domain(&domain) {
        warn!("Precomputed {}-bit DSA domain failed validation, generating at runtime", bits);
        return None;
    }
    debug!("Using precomputed {}-bit DSA domain", bits);
    Some(domain)
}

/// Precomputed domain for a common modulus size, checked once on first use
pub fn precomputed(bits: usize) -> Option<&'static Domain> {
    let cell = match bits {
        512 => DOMAIN_512.get_or_init(|| load_domain(512, P_512, Q_512, G_512)),
        768 => DOMAIN_768.get_or_init(|| load_domain(768, P_768, Q_768, G_768)),
        1024 => DOMAIN_1024.get_or_init(|| load_domain(1024, P_1024, Q_1024, G_1024)),
        _ => return None,
    };
    cell.as_ref()
}

/// Check primality of p and q, `q | p - 1` and that g generates the q-order subgroup
pub fn is_valid_domain(d: &Domain) -> bool {
    let one = BigUint::one();
    if d.g <= one || d.g >= d.p {
        return false;
    }
    if !((&d.p - &one) % &d.q).is_zero() {
        return false;
    }
    if d.g.modpow(&d.q, &d.p) != one {
        return false;
    }
    probably_prime(&d.q, 20) && probably_prime(&d.p, 5)
}

/// Cheap structural check: `p > 1`, `q > 1` and `1 < g < p`
///
/// Unlike [`is_valid_domain`] this does no primality testing, it only
/// rules out values the modular arithmetic cannot work with.
pub fn is_usable_domain(d: &Domain) -> bool {
    let one = BigUint::one();
    d.p > one && d.q > one && d.g > one && d.g < d.p
}

/// Generate a fresh domain with a 160-bit q and an `l_bits` p
pub fn generate_domain(l_bits: usize, rng: &mut dyn RngCore) -> Result<Domain> {
    if l_bits <= Q_BITS + 1 {
        return Err(SecurityError::InvalidParameter(format!(
            "DSA modulus of {} bits is too small",
            l_bits
        )));
    }
    debug!("Generating {}-bit DSA domain parameters", l_bits);

    let one = BigUint::one();
    loop {
        let q: BigUint = rng.gen_prime(Q_BITS);
        let two_q = &q << 1;

        for _ in 0..4 * l_bits {
            let x = mp::random_bits(rng, l_bits);
            let c = &x % &two_q;
            if c.is_zero() {
                continue;
            }
            let p = x - (c - &one);
            if p.bits() != l_bits || !probably_prime(&p, 20) {
                continue;
            }
            let g = subgroup_generator(&p, &q)?;
            return Ok(Domain { p, q, g });
        }
        debug!("No suitable p found for current q, retrying");
    }
}

/// First `h^((p-1)/q) mod p` different from one, for h = 2, 3, ...
pub fn subgroup_generator(p: &BigUint, q: &BigUint) -> Result<BigUint> {
    let one = BigUint::one();
    let e = (p - &one) / q;
    let mut h = BigUint::from(2u32);
    while &h < p {
        let g = h.modpow(&e, p);
        if g != one {
            return Ok(g);
        }
        h += 1u32;
    }
    Err(SecurityError::InvalidParameter("no subgroup generator found".to_string()))
}

/// Private exponent in `[1, q)`
pub fn generate_x(q: &BigUint, rng: &mut dyn RngCore) -> BigUint {
    mp::random_below(rng, q)
}

/// Public value `g^x mod p`
pub fn public_y(d: &Domain, x: &BigUint) -> BigUint {
    d.g.modpow(x, &d.p)
}

/// Leftmost `bits(q)` bits of the digest as an integer
fn digest_to_int(q: &BigUint, digest: &[u8]) -> BigUint {
    let h = mp::os2ip(digest);
    let hbits = digest.len() * 8;
    let qbits = q.bits();
    if hbits > qbits {
        h >> (hbits - qbits)
    } else {
        h
    }
}

/// Sign a message digest, returning `(r, s)`
pub fn sign(d: &Domain, x: &BigUint, digest: &[u8], rng: &mut dyn RngCore) -> Result<(BigUint, BigUint)> {
    if !is_usable_domain(d) {
        return Err(SecurityError::InvalidKey("DSA domain parameters are degenerate".to_string()));
    }
    let h = digest_to_int(&d.q, digest);

    for _ in 0..MAX_SIGN_ATTEMPTS {
        let mut k = mp::random_below(rng, &d.q);
        let r = d.g.modpow(&k, &d.p) % &d.q;
        if r.is_zero() {
            mp::wipe(&mut k);
            continue;
        }
        let k_inv = mp::mod_inverse(&k, &d.q);
        mp::wipe(&mut k);
        let k_inv = match k_inv {
            Some(v) => v,
            None => continue,
        };
        let s = (k_inv * ((&h + x * &r) % &d.q)) % &d.q;
        if s.is_zero() {
            continue;
        }
        return Ok((r, s));
    }
    Err(SecurityError::Signature(format!(
        "no usable nonce after {} attempts",
        MAX_SIGN_ATTEMPTS
    )))
}

/// Verify `(r, s)` over a message digest
pub fn verify(d: &Domain, y: &BigUint, digest: &[u8], r: &BigUint, s: &BigUint) -> bool {
    if !is_usable_domain(d) || r.is_zero() || s.is_zero() || r >= &d.q || s >= &d.q {
        return false;
    }
    let w = match mp::mod_inverse(s, &d.q) {
        Some(w) => w,
        None => return false,
    };
    let h = digest_to_int(&d.q, digest);
    let u1 = (h * &w) % &d.q;
    let u2 = (r * &w) % &d.q;
    let v = (d.g.modpow(&u1, &d.p) * y.modpow(&u2, &d.p)) % &d.p % &d.q;
    // plain comparison, not constant time
    &v == r
}

/// Whether `bits` is an acceptable DSA modulus size
pub fn is_valid_size(bits: usize) -> bool {
    (512..=1024).contains(&bits) && bits % 64 == 0
}
