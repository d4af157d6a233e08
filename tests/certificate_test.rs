//! BEE certificate tests
//!
//! Builds small certificate chains, moves them through the certificate
//! factory and checks signatures and validity windows.

use std::sync::Arc;

use beecrypt::beeyond::{BeeCertificate, BeeCertificateBuilder, Field, FOREVER};
use beecrypt::security::{
    Certificate, CertificateFactory, KeyPair, KeyPairGenerator, Security,
};
use beecrypt::SecurityError;

fn key_pair(security: &Security, algorithm: &str) -> KeyPair {
    let mut kpg = KeyPairGenerator::get_instance(security, algorithm).unwrap();
    kpg.initialize(512).unwrap();
    kpg.generate_key_pair().unwrap()
}

#[test]
fn test_chain_through_factory() {
    let security = Security::with_builtin();
    let ca = key_pair(&security, "DSA");
    let leaf = key_pair(&security, "RSA");

    let ca_cert: Arc<dyn Certificate> = Arc::new(
        BeeCertificate::self_signed(&security, ca.public(), ca.private(), "SHA1withDSA").unwrap(),
    );
    let leaf_cert = BeeCertificateBuilder::new()
        .issuer("Test CA")
        .subject("leaf")
        .public_key(leaf.public().clone())
        .parent_certificate(ca_cert.clone())
        .field(Field::Unknown { tag: 0x4e4f5445, bytes: b"note".to_vec() })
        .sign(&security, ca.private(), "SHA1withDSA")
        .unwrap();

    let mut stream = Vec::new();
    stream.extend_from_slice(Certificate::encoded(&leaf_cert).unwrap());
    stream.extend_from_slice(ca_cert.encoded().unwrap());

    let mut factory = CertificateFactory::get_instance(&security, "BEE").unwrap();
    let certs = factory.generate_certificates(&security, &mut stream.as_slice()).unwrap();
    assert_eq!(certs.len(), 2);
    assert!(*certs[1] == *ca_cert);

    let decoded = certs[0].as_any().downcast_ref::<BeeCertificate>().unwrap();
    assert_eq!(decoded.subject(), "leaf");
    assert_eq!(decoded.issuer(), "Test CA");
    assert_eq!(decoded.fields().len(), 3);
    assert_eq!(decoded.public_key(), Some(leaf.public()));
    assert!(decoded.has_parent_certificate());

    let parent = decoded.parent_certificate().unwrap();
    decoded.verify(&security, parent.public_key().unwrap()).unwrap();
    assert!(decoded.verify(&security, leaf.public()).is_err());
}

#[test]
fn test_rsa_self_signed() {
    let security = Security::with_builtin();
    let pair = key_pair(&security, "RSA");

    let cert = BeeCertificate::self_signed(&security, pair.public(), pair.private(), "SHA256withRSA").unwrap();
    assert_eq!(cert.not_after(), FOREVER);
    cert.verify(&security, pair.public()).unwrap();
    cert.check_validity().unwrap();

    let text = cert.to_string();
    assert!(text.contains("PublicKey Certificate"));
    assert!(text.contains("SHA256withRSA"));
}

#[test]
fn test_validity_window() {
    let security = Security::with_builtin();
    let pair = key_pair(&security, "DSA");

    let cert = BeeCertificateBuilder::new()
        .not_before(1_000)
        .not_after(2_000)
        .public_key(pair.public().clone())
        .sign(&security, pair.private(), "SHA1withDSA")
        .unwrap();

    assert!(cert.check_validity_at(1_000).is_ok());
    assert!(cert.check_validity_at(2_000).is_ok());

    let early = cert.check_validity_at(999).unwrap_err();
    assert!(matches!(early, SecurityError::CertificateNotYetValid(_)));
    assert!(early.is_certificate_exception());

    let late = cert.check_validity_at(2_001).unwrap_err();
    assert!(matches!(late, SecurityError::CertificateExpired(_)));
    assert!(late.is_certificate_exception());

    // Expired long ago
    assert!(cert.check_validity().is_err());
}

#[test]
fn test_tampered_signature() {
    let security = Security::with_builtin();
    let pair = key_pair(&security, "DSA");
    let cert = BeeCertificate::self_signed(&security, pair.public(), pair.private(), "SHA1withDSA").unwrap();

    let mut bytes = Certificate::encoded(&cert).unwrap().to_vec();
    // The subject sits right after the empty issuer's length prefix
    bytes[4] ^= 0x20;
    let forged = BeeCertificate::decode(&security, &mut bytes.as_slice()).unwrap();
    assert_ne!(forged.subject(), cert.subject());

    match forged.verify(&security, pair.public()) {
        Err(e) => assert!(e.is_certificate_exception() || matches!(e, SecurityError::Signature(_))),
        Ok(()) => panic!("tampered certificate verified"),
    }
}

#[test]
fn test_signature_key_mismatch() {
    let security = Security::with_builtin();
    let dsa = key_pair(&security, "DSA");

    match BeeCertificate::self_signed(&security, dsa.public(), dsa.private(), "SHA1withRSA") {
        Err(SecurityError::InvalidKey(_)) => assert!(true),
        other => panic!("Expected InvalidKey, got {:?}", other.map(|c| c.subject().to_string())),
    }
}
