//! The built-in BeeCrypt provider
//!
//! Registers every engine this crate implements under its algorithm name,
//! together with the usual aliases.

pub mod bee_codec;
pub mod bee_key_factory;
pub mod cert_factory;
pub mod digest;
pub mod dsa_signature;
pub mod generators;
pub mod hmac;
pub mod key_factories;
pub mod key_protector;
pub mod key_store;
pub mod parameters;
pub mod rsa_signature;
pub mod secure_random;

use crate::security::provider::Provider;
use crate::security::spi::{ServiceType, Spi};

pub const PROVIDER_NAME: &str = "BeeCrypt++";
pub const PROVIDER_VERSION: f64 = 0.1;
pub const PROVIDER_INFO: &str = "Copyright (c) 2004 Beeyond Software Holding";

/// Algorithm name of the built-in random generator
pub const SECURE_RANDOM_ALGORITHM: &str = "BEE";

fn dh_parameter_generator() -> Spi {
    Spi::AlgorithmParameterGenerator(Box::new(generators::DhParameterGenerator::new()))
}

fn dsa_parameter_generator() -> Spi {
    Spi::AlgorithmParameterGenerator(Box::new(generators::DsaParameterGenerator::new()))
}

fn dh_parameters() -> Spi {
    Spi::AlgorithmParameters(Box::new(parameters::DhParameters::new()))
}

fn dsa_parameters() -> Spi {
    Spi::AlgorithmParameters(Box::new(parameters::DsaParameters::new()))
}

fn bee_certificate_factory() -> Spi {
    Spi::CertificateFactory(Box::new(cert_factory::BeeCertificateFactory::new()))
}

fn bee_key_factory() -> Spi {
    Spi::KeyFactory(Box::new(bee_key_factory::BeeKeyFactory::new()))
}

fn dh_key_factory() -> Spi {
    Spi::KeyFactory(Box::new(key_factories::DhKeyFactory::new()))
}

fn dsa_key_factory() -> Spi {
    Spi::KeyFactory(Box::new(key_factories::DsaKeyFactory::new()))
}

fn rsa_key_factory() -> Spi {
    Spi::KeyFactory(Box::new(key_factories::RsaKeyFactory::new()))
}

fn bee_key_store() -> Spi {
    Spi::KeyStore(Box::new(key_store::BeeKeyStore::new()))
}

fn dh_key_pair_generator() -> Spi {
    Spi::KeyPairGenerator(Box::new(generators::DhKeyPairGenerator::new()))
}

fn dsa_key_pair_generator() -> Spi {
    Spi::KeyPairGenerator(Box::new(generators::DsaKeyPairGenerator::new()))
}

fn rsa_key_pair_generator() -> Spi {
    Spi::KeyPairGenerator(Box::new(generators::RsaKeyPairGenerator::new()))
}

fn hmac_sha1() -> Spi {
    Spi::Mac(Box::new(hmac::HmacEngine::sha1()))
}

fn hmac_sha256() -> Spi {
    Spi::Mac(Box::new(hmac::HmacEngine::sha256()))
}

fn sha1_digest() -> Spi {
    Spi::MessageDigest(Box::new(digest::Sha1Digest::new()))
}

fn sha256_digest() -> Spi {
    Spi::MessageDigest(Box::new(digest::Sha256Digest::new()))
}

fn bee_secure_random() -> Spi {
    Spi::SecureRandom(Box::new(secure_random::BeeSecureRandom::new()))
}

fn sha1_with_dsa() -> Spi {
    Spi::Signature(Box::new(dsa_signature::Sha1WithDsaSignature::new()))
}

fn sha1_with_rsa() -> Spi {
    Spi::Signature(Box::new(rsa_signature::Sha1WithRsaSignature::new()))
}

fn sha256_with_rsa() -> Spi {
    Spi::Signature(Box::new(rsa_signature::Sha256WithRsaSignature::new()))
}

/// Build the BeeCrypt provider
pub fn beecrypt_provider() -> Provider {
    use ServiceType::*;

    let mut p = Provider::new(PROVIDER_NAME, PROVIDER_VERSION, PROVIDER_INFO);

    p.add_service(AlgorithmParameterGenerator, "DH", "beecrypt_DHParameterGenerator_create", dh_parameter_generator);
    p.add_service(AlgorithmParameterGenerator, "DSA", "beecrypt_DSAParameterGenerator_create", dsa_parameter_generator);
    p.add_service(AlgorithmParameters, "DH", "beecrypt_DHParameters_create", dh_parameters);
    p.add_service(AlgorithmParameters, "DSA", "beecrypt_DSAParameters_create", dsa_parameters);
    p.add_service(CertificateFactory, "BEE", "beecrypt_BeeCertificateFactory_create", bee_certificate_factory);
    p.add_service(KeyFactory, "BEE", "beecrypt_BeeKeyFactory_create", bee_key_factory);
    p.add_service(KeyFactory, "DH", "beecrypt_DHKeyFactory_create", dh_key_factory);
    p.add_service(KeyFactory, "DSA", "beecrypt_DSAKeyFactory_create", dsa_key_factory);
    p.add_service(KeyFactory, "RSA", "beecrypt_RSAKeyFactory_create", rsa_key_factory);
    p.add_service(KeyStore, "BEE", "beecrypt_BeeKeyStore_create", bee_key_store);
    p.add_service(KeyPairGenerator, "DH", "beecrypt_DHKeyPairGenerator_create", dh_key_pair_generator);
    p.add_service(KeyPairGenerator, "DSA", "beecrypt_DSAKeyPairGenerator_create", dsa_key_pair_generator);
    p.add_service(KeyPairGenerator, "RSA", "beecrypt_RSAKeyPairGenerator_create", rsa_key_pair_generator);
    p.add_service(Mac, "HMAC-SHA-1", "beecrypt_HMACSHA1_create", hmac_sha1);
    p.add_service(Mac, "HMAC-SHA-256", "beecrypt_HMACSHA256_create", hmac_sha256);
    p.add_service(MessageDigest, "SHA-1", "beecrypt_SHA1Digest_create", sha1_digest);
    p.add_service(MessageDigest, "SHA-256", "beecrypt_SHA256Digest_create", sha256_digest);
    p.add_service(SecureRandom, SECURE_RANDOM_ALGORITHM, "beecrypt_BeeSecureRandom_create", bee_secure_random);
    p.add_service(Signature, "SHA1withDSA", "beecrypt_SHA1withDSASignature_create", sha1_with_dsa);
    p.add_service(Signature, "SHA1withRSA", "beecrypt_SHA1withRSASignature_create", sha1_with_rsa);
    p.add_service(Signature, "SHA256withRSA", "beecrypt_SHA256withRSASignature_create", sha256_with_rsa);

    p.add_alias(AlgorithmParameters, "DiffieHellman", "DH");
    p.add_alias(AlgorithmParameterGenerator, "DiffieHellman", "DH");
    p.add_alias(KeyFactory, "DiffieHellman", "DH");
    p.add_alias(KeyPairGenerator, "DiffieHellman", "DH");
    p.add_alias(MessageDigest, "SHA", "SHA-1");
    p.add_alias(MessageDigest, "SHA1", "SHA-1");
    p.add_alias(MessageDigest, "SHA256", "SHA-256");
    p.add_alias(Signature, "DSS", "SHA1withDSA");
    p.add_alias(Signature, "SHAwithDSA", "SHA1withDSA");
    p.add_alias(Signature, "SHA/DSA", "SHA1withDSA");
    p.add_alias(Signature, "SHA-1/DSA", "SHA1withDSA");

    p.put("Provider.id className", "beecrypt::provider::BeeCryptProvider");

    p
}
