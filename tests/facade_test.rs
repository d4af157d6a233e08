//! Engine façade tests
//!
//! Drives the signature, key factory, key pair generator, digest, MAC and
//! parameter façades through the built-in provider.

use beecrypt::security::{
    AlgorithmParameterGenerator, AlgorithmParameters, DsaParams, EncodedKeySpec, Key, KeyFactory,
    KeyPair, KeyPairGenerator, KeySpec, KeySpecKind, Mac, MessageDigest, ParameterSpec, PrivateKey,
    PublicKey, SecretKey, Security, Signature, SignatureState,
};
use beecrypt::SecurityError;
use num_bigint_dig::BigUint;

fn key_pair(security: &Security, algorithm: &str, bits: usize) -> KeyPair {
    let mut kpg = KeyPairGenerator::get_instance(security, algorithm).unwrap();
    kpg.initialize(bits).unwrap();
    kpg.generate_key_pair().unwrap()
}

#[test]
fn test_signature_lifecycle() {
    let security = Security::with_builtin();
    let pair = key_pair(&security, "DSA", 512);

    let mut sig = Signature::get_instance(&security, "SHA1withDSA").unwrap();
    assert_eq!(sig.state(), SignatureState::Uninitialized);
    match sig.update(b"early") {
        Err(SecurityError::IllegalState(_)) => assert!(true),
        other => panic!("Expected IllegalState, got {:?}", other),
    }

    sig.init_sign(pair.private()).unwrap();
    assert_eq!(sig.state(), SignatureState::Sign);
    assert!(matches!(sig.verify(&[0u8; 8]), Err(SecurityError::IllegalState(_))));
    sig.update(b"The quick brown fox").unwrap();
    let signature = sig.sign().unwrap();

    sig.init_verify(pair.public()).unwrap();
    assert_eq!(sig.state(), SignatureState::Verify);
    assert!(matches!(sig.sign(), Err(SecurityError::IllegalState(_))));
    sig.update(b"The quick brown fox").unwrap();
    assert!(sig.verify(&signature).unwrap());

    sig.init_verify(pair.public()).unwrap();
    sig.update(b"The quick brown dog").unwrap();
    assert!(!sig.verify(&signature).unwrap());
}

#[test]
fn test_dsa_signature_rejects_garbage() {
    let security = Security::with_builtin();
    let pair = key_pair(&security, "DSA", 512);

    let mut sig = Signature::get_instance(&security, "SHA1withDSA").unwrap();
    sig.init_verify(pair.public()).unwrap();
    sig.update(b"data").unwrap();
    match sig.verify(&[0x30, 0x03, 0x02, 0x01]) {
        Err(SecurityError::Signature(_)) => assert!(true),
        other => panic!("Expected Signature error, got {:?}", other),
    }
}

#[test]
fn test_rsa_signatures() {
    let security = Security::with_builtin();
    let pair = key_pair(&security, "RSA", 512);

    for alg in ["SHA1withRSA", "SHA256withRSA"] {
        let mut sig = Signature::get_instance(&security, alg).unwrap();
        sig.init_sign(pair.private()).unwrap();
        sig.update(b"message").unwrap();
        let mut out = [0u8; 64];
        assert_eq!(sig.sign_into(&mut out).unwrap(), 64);

        sig.init_verify(pair.public()).unwrap();
        sig.update(b"message").unwrap();
        assert!(sig.verify(&out).unwrap(), "{} signature did not verify", alg);

        sig.init_verify(pair.public()).unwrap();
        sig.update(b"message").unwrap();
        assert!(!sig.verify(&out[..63]).unwrap());
    }

    let dsa = key_pair(&security, "DSA", 512);
    let mut sig = Signature::get_instance(&security, "SHA1withRSA").unwrap();
    assert!(matches!(sig.init_sign(dsa.private()), Err(SecurityError::InvalidKey(_))));
}

#[test]
fn test_key_factory_round_trip() {
    let security = Security::with_builtin();
    let pair = key_pair(&security, "DSA", 512);

    let encoded = pair.public().encoded().unwrap().to_vec();
    let bee = KeyFactory::get_instance(&security, "BEE").unwrap();
    let public = bee.generate_public(&KeySpec::Encoded(EncodedKeySpec::bee(&encoded))).unwrap();
    assert_eq!(&public, pair.public());

    let dsa = KeyFactory::get_instance(&security, "DSA").unwrap();
    let spec = dsa.get_key_spec(&Key::Private(pair.private().clone()), KeySpecKind::DsaPrivate).unwrap();
    let private = dsa.generate_private(&spec).unwrap();
    assert_eq!(&private, pair.private());

    match bee.generate_public(&KeySpec::Encoded(EncodedKeySpec::new("X.509", &encoded))) {
        Err(SecurityError::InvalidKeySpec(_)) => assert!(true),
        other => panic!("Expected InvalidKeySpec, got {:?}", other),
    }

    let rsa = KeyFactory::get_instance(&security, "RSA").unwrap();
    assert!(rsa.generate_public(&KeySpec::Encoded(EncodedKeySpec::bee(&encoded))).is_err());
}

#[test]
fn test_rsa_exponent_spec() {
    let security = Security::with_builtin();
    let mut kpg = KeyPairGenerator::get_instance(&security, "RSA").unwrap();
    kpg.initialize_with_spec(&ParameterSpec::RsaKeyGen {
        key_size: 512,
        public_exponent: BigUint::from(3u32),
    })
    .unwrap();
    let pair = kpg.generate_key_pair().unwrap();

    match pair.public() {
        PublicKey::Rsa(k) => {
            assert_eq!(k.public_exponent(), &BigUint::from(3u32));
            assert_eq!(k.modulus().bits(), 512);
        }
        other => panic!("Expected RSA public key, got {:?}", other),
    }
    assert!(matches!(pair.private(), PrivateKey::RsaCrt(_)));
}

#[test]
fn test_dsa_generator_with_parameters() {
    let security = Security::with_builtin();
    let mut paramgen = AlgorithmParameterGenerator::get_instance(&security, "DSA").unwrap();
    paramgen.init(512).unwrap();
    let params = paramgen.generate_parameters().unwrap();
    assert_eq!(params.algorithm(), "DSA");

    let spec = params.parameter_spec().unwrap();
    let dsa: DsaParams = match &spec {
        ParameterSpec::Dsa(p) => p.clone(),
        other => panic!("Expected DSA parameters, got {:?}", other),
    };
    assert_eq!(dsa.p.bits(), 512);
    assert_eq!(dsa.q.bits(), 160);

    let mut kpg = KeyPairGenerator::get_instance(&security, "DSA").unwrap();
    kpg.initialize_with_spec(&spec).unwrap();
    let pair = kpg.generate_key_pair().unwrap();
    match pair.public() {
        PublicKey::Dsa(k) => assert_eq!(k.params(), &dsa),
        other => panic!("Expected DSA public key, got {:?}", other),
    }
}

#[test]
fn test_parameters_state() {
    let security = Security::with_builtin();
    let params = AlgorithmParameters::get_instance(&security, "DH").unwrap();
    assert!(params.parameter_spec().is_err());

    let mut kpg = KeyPairGenerator::get_instance(&security, "DiffieHellman").unwrap();
    assert!(matches!(kpg.initialize(512), Err(SecurityError::InvalidParameter(_))));
    assert!(kpg.initialize(1024).is_ok());
}

#[test]
fn test_digests() {
    let security = Security::with_builtin();

    let mut sha1 = MessageDigest::get_instance(&security, "SHA-1").unwrap();
    assert_eq!(hex::encode(sha1.digest_data(b"abc")), "a9993e364706816aba3e25717850c26c9cd0d89d");

    let mut sha256 = MessageDigest::get_instance(&security, "SHA-256").unwrap();
    sha256.update(b"a");
    sha256.update(b"bc");
    assert_eq!(
        hex::encode(sha256.digest()),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(hex::encode(sha256.digest()), hex::encode(sha256.digest_data(b"")));
}

#[test]
fn test_mac() {
    let security = Security::with_builtin();
    let mut mac = Mac::get_instance(&security, "HMAC-SHA-256").unwrap();
    assert!(matches!(mac.update(b"x"), Err(SecurityError::IllegalState(_))));

    // RFC 4231 test case 2
    mac.init(&Key::Secret(SecretKey::new("HMAC-SHA-256", b"Jefe"))).unwrap();
    let tag = mac.do_final_data(b"what do ya want for nothing?").unwrap();
    assert_eq!(
        hex::encode(&tag),
        "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
    );
    assert_eq!(mac.mac_length(), 32);

    // Still keyed after do_final
    let again = mac.do_final_data(b"what do ya want for nothing?").unwrap();
    assert_eq!(tag, again);
}
