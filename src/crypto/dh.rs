//! Diffie-Hellman domain parameters
//!
//! Precomputed safe-prime groups for 1024 and 2048 bit moduli and runtime
//! generation of `p = k*q + 1` domains for other sizes.

use log::{debug, warn};
use num_bigint_dig::prime::probably_prime;
use num_bigint_dig::{BigUint, RandPrime};
use num_integer::Integer;
use num_traits::One;
use once_cell::sync::OnceCell;
use rand::RngCore;

use crate::common::{Result, SecurityError};
use crate::crypto::{dsa, mp};

/// Bit length of the prime subgroup order used for runtime generation
pub const Q_BITS: usize = 256;

/// Smallest modulus accepted for key pairs and parameter generation
pub const MIN_BITS: usize = 768;

/// DH domain with the order of the generator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    pub p: BigUint,
    pub g: BigUint,
    pub q: BigUint,
}

/// Oakley group 2 (RFC 2409)
const P_1024: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE65381FFFFFFFFFFFFFFFF";

/// MODP group 14 (RFC 3526)
const P_2048: &str = "FFFFFFFFFFFFFFFFC90FDAA22168C234C4C6628B80DC1CD129024E088A67CC74020BBEA63B139B22514A08798E3404DDEF9519B3CD3A431B302B0A6DF25F14374FE1356D6D51C245E485B576625E7EC6F44C42E9A637ED6B0BFF5CB6F406B7EDEE386BFB5A899FA5AE9F24117C4B1FE649286651ECE45B3DC2007CB8A163BF0598DA48361C55D39A69163FA8FD24CF5F83655D23DCA3AD961C62F356208552BB9ED529077096966D670C354E4ABC9804F1746C08CA18217C32905E462E36CE3BE39E772C180E86039B2783A2EC07A28FB5C55DF06F4C52C9DE2BCBF6955817183995497CEA956AE515D2261898FA051015728E5A8AACAA68FFFFFFFFFFFFFFFF";

static GROUP_1024: OnceCell<Option<Domain>> = OnceCell::new();
static GROUP_2048: OnceCell<Option<Domain>> = OnceCell::new();

/// Derive q = (p-1)/2 and the smallest generator of the q-order subgroup
fn load_safe_prime(bits: usize, hex: &str) -> Option<Domain> {
    let p = match mp::from_hex(hex) {
        Ok(p) if p.bits() == bits => p,
        _ => {
            warn!("Precomputed {}-bit DH modulus is malformed", bits);
            return None;
        }
    };
    let one = BigUint::one();
    let q = (&p - &one) >> 1;

    // Fermat check on p, Miller-Rabin on q
    let two = BigUint::from(2u32);
    if two.modpow(&(&p - &one), &p) != one || !probably_prime(&q, 2) {
        warn!("Precomputed {}-bit DH modulus failed validation, generating at runtime", bits);
        return None;
    }

    match safe_prime_generator(&p, &q) {
        Some(g) => {
            debug!("Using precomputed {}-bit DH group with generator {}", bits, g);
            Some(Domain { p, g, q })
        }
        None => {
            warn!("No small generator found for precomputed {}-bit DH modulus", bits);
            None
        }
    }
}

/// Precomputed group for a common modulus size, checked once on first use
pub fn precomputed(bits: usize) -> Option<&'static Domain> {
    let cell = match bits {
        1024 => GROUP_1024.get_or_init(|| load_safe_prime(1024, P_1024)),
        2048 => GROUP_2048.get_or_init(|| load_safe_prime(2048, P_2048)),
        _ => return None,
    };
    cell.as_ref()
}

/// Smallest h with `h^2 != 1` and `h^q == 1 (mod p)`
fn safe_prime_generator(p: &BigUint, q: &BigUint) -> Option<BigUint> {
    let one = BigUint::one();
    let two = BigUint::from(2u32);
    (2u32..256).map(BigUint::from).find(|h| {
        h.modpow(&two, p) != one && h.modpow(q, p) == one
    })
}

/// Generate `p = k*q + 1` with a 256-bit prime q and a generator of order q
pub fn generate_domain(bits: usize, rng: &mut dyn RngCore) -> Result<Domain> {
    if bits < MIN_BITS {
        return Err(SecurityError::InvalidParameter(format!(
            "DH modulus must be at least {} bits",
            MIN_BITS
        )));
    }
    debug!("Generating {}-bit DH domain parameters", bits);

    let q: BigUint = rng.gen_prime(Q_BITS);
    loop {
        let mut k = mp::random_bits(rng, bits - Q_BITS);
        if k.is_odd() {
            k += 1u32;
        }
        let p = k * &q + 1u32;
        if p.bits() != bits || !probably_prime(&p, 20) {
            continue;
        }
        let g = dsa::subgroup_generator(&p, &q)?;
        return Ok(Domain { p, g, q });
    }
}

/// Private value: `l` bits when requested, otherwise in `[1, q)`
pub fn generate_x(domain: &Domain, l: usize, rng: &mut dyn RngCore) -> BigUint {
    if l > 1 && l < domain.p.bits() {
        mp::random_bits(rng, l)
    } else {
        mp::random_below(rng, &domain.q)
    }
}

/// Whether `p > 2` and `1 < g < p`, the least a caller-supplied group needs
pub fn is_usable_group(p: &BigUint, g: &BigUint) -> bool {
    let one = BigUint::one();
    p > &BigUint::from(2u32) && g > &one && g < p
}

/// Private value for a domain whose order is unknown: `l` bits, or in `[1, p - 1)`
pub fn generate_x_without_order(p: &BigUint, l: usize, rng: &mut dyn RngCore) -> Result<BigUint> {
    if p <= &BigUint::from(2u32) {
        return Err(SecurityError::InvalidParameter("DH prime must be greater than two".to_string()));
    }
    if l > 1 && l < p.bits() {
        Ok(mp::random_bits(rng, l))
    } else {
        Ok(mp::random_below(rng, &(p - BigUint::one())))
    }
}

/// Public value `g^x mod p`
pub fn public_y(p: &BigUint, g: &BigUint, x: &BigUint) -> BigUint {
    g.modpow(x, p)
}
