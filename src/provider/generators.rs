//! Key pair and parameter generators for DH, DSA and RSA
//!
//! Without explicit domain parameters the generators use the precomputed
//! domain for the requested size when one exists and generate a fresh one
//! otherwise.

use log::debug;
use num_bigint_dig::BigUint;

use crate::common::{Result, SecurityError};
use crate::crypto::{dh, dsa, rsa};
use crate::security::key::{
    DhParams, DhPrivateKey, DhPublicKey, DsaParams, DsaPrivateKey, DsaPublicKey, KeyPair,
    PrivateKey, PublicKey, RsaPrivateCrtKey, RsaPublicKey,
};
use crate::security::random::SecureRandom;
use crate::security::spec::ParameterSpec;
use crate::security::spi::{AlgorithmParameterGeneratorSpi, KeyPairGeneratorSpi};

/// Modulus size used when the caller never initializes a generator
pub const DEFAULT_KEY_SIZE: usize = 1024;

fn unsupported(spec: &ParameterSpec) -> SecurityError {
    SecurityError::InvalidAlgorithmParameter(format!("{} not supported", spec.name()))
}

fn dsa_size_error(bits: usize) -> SecurityError {
    SecurityError::InvalidParameter(format!(
        "DSA modulus size {} must be between 512 and 1024 and a multiple of 64",
        bits
    ))
}

fn dsa_domain(bits: usize, random: &mut SecureRandom) -> Result<dsa::Domain> {
    match dsa::precomputed(bits) {
        Some(domain) => Ok(domain.clone()),
        None => dsa::generate_domain(bits, random),
    }
}

fn dh_domain(bits: usize, random: &mut SecureRandom) -> Result<dh::Domain> {
    match dh::precomputed(bits) {
        Some(domain) => Ok(domain.clone()),
        None => dh::generate_domain(bits, random),
    }
}

/// KeyPairGenerator.DSA
pub struct DsaKeyPairGenerator {
    size: usize,
    params: Option<DsaParams>,
    random: SecureRandom,
}

impl DsaKeyPairGenerator {
    pub fn new() -> Self {
        Self { size: DEFAULT_KEY_SIZE, params: None, random: SecureRandom::default_instance() }
    }
}

impl Default for DsaKeyPairGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyPairGeneratorSpi for DsaKeyPairGenerator {
    fn initialize(&mut self, key_size: usize, random: Option<SecureRandom>) -> Result<()> {
        if !dsa::is_valid_size(key_size) {
            return Err(dsa_size_error(key_size));
        }
        self.size = key_size;
        self.params = None;
        if let Some(random) = random {
            self.random = random;
        }
        Ok(())
    }

    fn initialize_with_spec(&mut self, spec: &ParameterSpec, random: Option<SecureRandom>) -> Result<()> {
        match spec {
            ParameterSpec::Dsa(params) => {
                let domain = dsa::Domain { p: params.p.clone(), q: params.q.clone(), g: params.g.clone() };
                if !dsa::is_usable_domain(&domain) {
                    return Err(SecurityError::InvalidAlgorithmParameter(
                        "DSA parameters need p > 1, q > 1 and 1 < g < p".to_string(),
                    ));
                }
                self.size = params.p.bits();
                self.params = Some(params.clone());
            }
            other => return Err(unsupported(other)),
        }
        if let Some(random) = random {
            self.random = random;
        }
        Ok(())
    }

    fn generate_key_pair(&mut self) -> Result<KeyPair> {
        let domain = match &self.params {
            Some(p) => dsa::Domain { p: p.p.clone(), q: p.q.clone(), g: p.g.clone() },
            None => dsa_domain(self.size, &mut self.random)?,
        };
        let x = dsa::generate_x(&domain.q, &mut self.random);
        let y = dsa::public_y(&domain, &x);
        let params = DsaParams::new(domain.p, domain.q, domain.g);

        Ok(KeyPair::new(
            PublicKey::Dsa(DsaPublicKey::new(params.clone(), y)),
            PrivateKey::Dsa(DsaPrivateKey::new(params, x)),
        ))
    }
}

/// KeyPairGenerator.DH
pub struct DhKeyPairGenerator {
    size: usize,
    params: Option<DhParams>,
    random: SecureRandom,
}

impl DhKeyPairGenerator {
    pub fn new() -> Self {
        Self { size: DEFAULT_KEY_SIZE, params: None, random: SecureRandom::default_instance() }
    }
}

impl Default for DhKeyPairGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyPairGeneratorSpi for DhKeyPairGenerator {
    fn initialize(&mut self, key_size: usize, random: Option<SecureRandom>) -> Result<()> {
        if key_size < dh::MIN_BITS {
            return Err(SecurityError::InvalidParameter(format!(
                "DH modulus size must be at least {} bits",
                dh::MIN_BITS
            )));
        }
        self.size = key_size;
        self.params = None;
        if let Some(random) = random {
            self.random = random;
        }
        Ok(())
    }

    fn initialize_with_spec(&mut self, spec: &ParameterSpec, random: Option<SecureRandom>) -> Result<()> {
        match spec {
            ParameterSpec::Dh(params) => {
                if !dh::is_usable_group(&params.p, &params.g) {
                    return Err(SecurityError::InvalidAlgorithmParameter(
                        "DH parameters need p > 2 and 1 < g < p".to_string(),
                    ));
                }
                self.size = params.p.bits();
                self.params = Some(params.clone());
            }
            other => return Err(unsupported(other)),
        }
        if let Some(random) = random {
            self.random = random;
        }
        Ok(())
    }

    fn generate_key_pair(&mut self) -> Result<KeyPair> {
        let (params, x) = match &self.params {
            Some(params) => {
                let x = dh::generate_x_without_order(&params.p, params.l, &mut self.random)?;
                (params.clone(), x)
            }
            None => {
                let domain = dh_domain(self.size, &mut self.random)?;
                let x = dh::generate_x(&domain, 0, &mut self.random);
                (DhParams::new(domain.p, domain.g), x)
            }
        };
        let y = dh::public_y(&params.p, &params.g, &x);

        Ok(KeyPair::new(
            PublicKey::Dh(DhPublicKey::new(params.clone(), y)),
            PrivateKey::Dh(DhPrivateKey::new(params, x)),
        ))
    }
}

/// KeyPairGenerator.RSA
pub struct RsaKeyPairGenerator {
    size: usize,
    exponent: BigUint,
    random: SecureRandom,
}

impl RsaKeyPairGenerator {
    pub fn new() -> Self {
        Self {
            size: DEFAULT_KEY_SIZE,
            exponent: BigUint::from(rsa::DEFAULT_EXPONENT),
            random: SecureRandom::default_instance(),
        }
    }
}

impl Default for RsaKeyPairGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyPairGeneratorSpi for RsaKeyPairGenerator {
    fn initialize(&mut self, key_size: usize, random: Option<SecureRandom>) -> Result<()> {
        if key_size < rsa::MIN_BITS {
            return Err(SecurityError::InvalidParameter(format!(
                "RSA modulus size must be at least {} bits",
                rsa::MIN_BITS
            )));
        }
        self.size = key_size;
        self.exponent = BigUint::from(rsa::DEFAULT_EXPONENT);
        if let Some(random) = random {
            self.random = random;
        }
        Ok(())
    }

    fn initialize_with_spec(&mut self, spec: &ParameterSpec, random: Option<SecureRandom>) -> Result<()> {
        match spec {
            ParameterSpec::RsaKeyGen { key_size, public_exponent } => {
                self.initialize(*key_size, random)?;
                self.exponent = public_exponent.clone();
                Ok(())
            }
            other => Err(unsupported(other)),
        }
    }

    fn generate_key_pair(&mut self) -> Result<KeyPair> {
        let c = rsa::generate(self.size, &self.exponent, &mut self.random)?;
        let public = PublicKey::Rsa(RsaPublicKey::new(c.n.clone(), c.e.clone()));
        let private = PrivateKey::RsaCrt(RsaPrivateCrtKey::new(
            c.n.clone(),
            c.e.clone(),
            c.d.clone(),
            c.p.clone(),
            c.q.clone(),
            c.dp.clone(),
            c.dq.clone(),
            c.qinv.clone(),
        ));
        // c wipes its copies when it goes out of scope
        Ok(KeyPair::new(public, private))
    }
}

/// AlgorithmParameterGenerator.DSA
pub struct DsaParameterGenerator {
    size: usize,
    random: SecureRandom,
}

impl DsaParameterGenerator {
    pub fn new() -> Self {
        Self { size: DEFAULT_KEY_SIZE, random: SecureRandom::default_instance() }
    }
}

impl Default for DsaParameterGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgorithmParameterGeneratorSpi for DsaParameterGenerator {
    fn init(&mut self, size: usize, random: Option<SecureRandom>) -> Result<()> {
        if !dsa::is_valid_size(size) {
            return Err(dsa_size_error(size));
        }
        self.size = size;
        if let Some(random) = random {
            self.random = random;
        }
        Ok(())
    }

    fn init_with_spec(&mut self, spec: &ParameterSpec, _random: Option<SecureRandom>) -> Result<()> {
        Err(unsupported(spec))
    }

    fn generate_parameters(&mut self) -> Result<ParameterSpec> {
        debug!("Generating fresh {}-bit DSA parameters", self.size);
        let d = dsa::generate_domain(self.size, &mut self.random)?;
        Ok(ParameterSpec::Dsa(DsaParams::new(d.p, d.q, d.g)))
    }
}

/// AlgorithmParameterGenerator.DH
pub struct DhParameterGenerator {
    size: usize,
    exponent_size: usize,
    random: SecureRandom,
}

impl DhParameterGenerator {
    pub fn new() -> Self {
        Self { size: DEFAULT_KEY_SIZE, exponent_size: 0, random: SecureRandom::default_instance() }
    }

    fn check_size(size: usize) -> Result<()> {
        if size < dh::MIN_BITS || size % 64 != 0 {
            return Err(SecurityError::InvalidParameter(format!(
                "DH prime size {} must be at least {} bits and a multiple of 64",
                size,
                dh::MIN_BITS
            )));
        }
        Ok(())
    }
}

impl Default for DhParameterGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl AlgorithmParameterGeneratorSpi for DhParameterGenerator {
    fn init(&mut self, size: usize, random: Option<SecureRandom>) -> Result<()> {
        Self::check_size(size)?;
        self.size = size;
        self.exponent_size = 0;
        if let Some(random) = random {
            self.random = random;
        }
        Ok(())
    }

    fn init_with_spec(&mut self, spec: &ParameterSpec, random: Option<SecureRandom>) -> Result<()> {
        let ParameterSpec::DhGen { prime_size, exponent_size } = spec else {
            return Err(unsupported(spec));
        };
        Self::check_size(*prime_size)?;
        if *exponent_size >= *prime_size {
            return Err(SecurityError::InvalidAlgorithmParameter(
                "exponent size must be smaller than the prime size".to_string(),
            ));
        }
        self.size = *prime_size;
        self.exponent_size = *exponent_size;
        if let Some(random) = random {
            self.random = random;
        }
        Ok(())
    }

    fn generate_parameters(&mut self) -> Result<ParameterSpec> {
        debug!("Generating fresh {}-bit DH parameters", self.size);
        let d = dh::generate_domain(self.size, &mut self.random)?;
        Ok(ParameterSpec::Dh(DhParams::with_private_length(d.p, d.g, self.exponent_size)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_traits::One;

    #[test]
    fn test_dsa_defaults_and_sizes() {
        let mut kpg = DsaKeyPairGenerator::new();
        for bad in [448usize, 520, 1088] {
            assert!(matches!(kpg.initialize(bad, None), Err(SecurityError::InvalidParameter(_))));
        }
        kpg.initialize(512, None).unwrap();
        let pair = kpg.generate_key_pair().unwrap();
        match (pair.public(), pair.private()) {
            (PublicKey::Dsa(public), PrivateKey::Dsa(private)) => {
                assert_eq!(public.params().p.bits(), 512);
                assert_eq!(public.params().g.modpow(private.x(), &public.params().p), *public.y());
            }
            other => panic!("Expected DSA pair, got {:?}", other),
        }
    }

    #[test]
    fn test_dh_from_params() {
        let mut kpg = DhKeyPairGenerator::new();
        assert!(matches!(kpg.initialize(512, None), Err(SecurityError::InvalidParameter(_))));

        let domain = dh::precomputed(1024).unwrap();
        let params = DhParams::with_private_length(domain.p.clone(), domain.g.clone(), 160);
        kpg.initialize_with_spec(&ParameterSpec::Dh(params), None).unwrap();
        let pair = kpg.generate_key_pair().unwrap();
        match pair.private() {
            PrivateKey::Dh(k) => assert_eq!(k.x().bits(), 160),
            other => panic!("Expected DH key, got {:?}", other),
        }
    }

    #[test]
    fn test_degenerate_parameters_rejected() {
        let mut dh_kpg = DhKeyPairGenerator::new();
        let tiny = DhParams::new(BigUint::from(2u32), BigUint::one());
        match dh_kpg.initialize_with_spec(&ParameterSpec::Dh(tiny), None) {
            Err(SecurityError::InvalidAlgorithmParameter(_)) => assert!(true),
            other => panic!("Expected InvalidAlgorithmParameter, got {:?}", other),
        }
        let zero = DhParams::new(BigUint::from(0u32), BigUint::from(2u32));
        assert!(dh_kpg.initialize_with_spec(&ParameterSpec::Dh(zero), None).is_err());

        let mut dsa_kpg = DsaKeyPairGenerator::new();
        let unit_q = DsaParams::new(BigUint::from(23u32), BigUint::one(), BigUint::from(4u32));
        match dsa_kpg.initialize_with_spec(&ParameterSpec::Dsa(unit_q), None) {
            Err(SecurityError::InvalidAlgorithmParameter(_)) => assert!(true),
            other => panic!("Expected InvalidAlgorithmParameter, got {:?}", other),
        }

        // a rejected spec leaves the previous configuration in place
        dsa_kpg.initialize(512, None).unwrap();
        let bad_g = DsaParams::new(BigUint::from(23u32), BigUint::from(11u32), BigUint::from(23u32));
        assert!(dsa_kpg.initialize_with_spec(&ParameterSpec::Dsa(bad_g), None).is_err());
        match dsa_kpg.generate_key_pair().unwrap().public() {
            PublicKey::Dsa(k) => assert_eq!(k.params().p.bits(), 512),
            other => panic!("Expected DSA key, got {:?}", other),
        }

        let toy = DsaParams::new(BigUint::from(23u32), BigUint::from(11u32), BigUint::from(4u32));
        dsa_kpg.initialize_with_spec(&ParameterSpec::Dsa(toy.clone()), None).unwrap();
        match dsa_kpg.generate_key_pair().unwrap().private() {
            PrivateKey::Dsa(k) => {
                assert_eq!(k.params(), &toy);
                assert!(k.x() < &BigUint::from(11u32));
            }
            other => panic!("Expected DSA key, got {:?}", other),
        }
    }

    #[test]
    fn test_rsa_exponent_from_spec() {
        let mut kpg = RsaKeyPairGenerator::new();
        assert!(matches!(kpg.initialize(256, None), Err(SecurityError::InvalidParameter(_))));
        let spec = ParameterSpec::RsaKeyGen { key_size: 512, public_exponent: BigUint::from(3u32) };
        kpg.initialize_with_spec(&spec, None).unwrap();
        let pair = kpg.generate_key_pair().unwrap();
        match pair.private() {
            PrivateKey::RsaCrt(k) => {
                assert_eq!(k.public_exponent(), &BigUint::from(3u32));
                assert_eq!(k.modulus().bits(), 512);
                assert_eq!(k.prime_p() * k.prime_q(), *k.modulus());
            }
            other => panic!("Expected CRT key, got {:?}", other),
        }
    }

    #[test]
    fn test_dsa_parameter_generation() {
        let mut gen = DsaParameterGenerator::new();
        gen.init(512, None).unwrap();
        match gen.generate_parameters().unwrap() {
            ParameterSpec::Dsa(p) => {
                assert_eq!(p.p.bits(), 512);
                assert_eq!(p.q.bits(), dsa::Q_BITS);
                assert_eq!(p.g.modpow(&p.q, &p.p), BigUint::one());
            }
            other => panic!("Expected DSA parameters, got {:?}", other),
        }
    }

    #[test]
    fn test_dh_parameter_sizes() {
        let mut gen = DhParameterGenerator::new();
        assert!(gen.init(512, None).is_err());
        assert!(gen.init(800, None).is_err());
        let spec = ParameterSpec::DhGen { prime_size: 768, exponent_size: 160 };
        gen.init_with_spec(&spec, None).unwrap();
        match gen.generate_parameters().unwrap() {
            ParameterSpec::Dh(p) => {
                assert_eq!(p.p.bits(), 768);
                assert_eq!(p.l, 160);
            }
            other => panic!("Expected DH parameters, got {:?}", other),
        }
    }
}
