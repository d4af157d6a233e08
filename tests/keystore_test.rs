//! Key store tests
//!
//! Stores keys and certificates to disk through the KeyStore façade and
//! reads them back.

use std::fs::{self, File};
use std::sync::Arc;

use beecrypt::beeyond::BeeCertificate;
use beecrypt::security::{Certificate, Key, KeyPairGenerator, KeyStore, Security};
use beecrypt::SecurityError;
use tempfile::tempdir;

fn signer(security: &Security, algorithm: &str, sigalg: &str) -> (Key, Arc<dyn Certificate>) {
    let mut kpg = KeyPairGenerator::get_instance(security, algorithm).unwrap();
    kpg.initialize(512).unwrap();
    let pair = kpg.generate_key_pair().unwrap();
    let cert = BeeCertificate::self_signed(security, pair.public(), pair.private(), sigalg).unwrap();
    (Key::Private(pair.private().clone()), Arc::new(cert))
}

#[test]
fn test_uninitialized_keystore() {
    let security = Security::with_builtin();
    let ks = KeyStore::get_default(&security).unwrap();
    assert_eq!(ks.store_type(), "BEE");
    match ks.aliases() {
        Err(SecurityError::KeyStore(_)) => assert!(true),
        other => panic!("Expected KeyStore error, got {:?}", other),
    }
}

#[test]
fn test_file_round_trip() {
    let security = Security::with_builtin();
    let dir = tempdir().unwrap();
    let path = dir.path().join("keys.bks");

    let (dsa_key, dsa_cert) = signer(&security, "DSA", "SHA1withDSA");
    let (rsa_key, rsa_cert) = signer(&security, "RSA", "SHA256withRSA");

    let mut ks = KeyStore::get_instance(&security, "BEE").unwrap();
    ks.load(&security, None, None).unwrap();
    ks.set_key_entry("dsa", &dsa_key, "dsa-pass", vec![dsa_cert.clone()]).unwrap();
    ks.set_key_entry("rsa", &rsa_key, "rsa-pass", vec![rsa_cert.clone(), dsa_cert.clone()]).unwrap();
    ks.set_certificate_entry("anchor", dsa_cert.clone()).unwrap();
    assert_eq!(ks.size().unwrap(), 3);

    let mut file = File::create(&path).unwrap();
    ks.store(&mut file, Some("secret")).unwrap();
    drop(file);

    let mut ks = KeyStore::get_instance(&security, "BEE").unwrap();
    let mut file = File::open(&path).unwrap();
    ks.load(&security, Some(&mut file), Some("secret")).unwrap();

    assert_eq!(ks.aliases().unwrap(), vec!["anchor", "dsa", "rsa"]);
    assert!(ks.creation_date("rsa").unwrap().is_some());
    assert_eq!(ks.creation_date("nobody").unwrap(), None);

    assert_eq!(ks.get_key(&security, "dsa", "dsa-pass").unwrap(), Some(dsa_key));
    assert_eq!(ks.get_key(&security, "rsa", "rsa-pass").unwrap(), Some(rsa_key));

    let chain = ks.get_certificate_chain("rsa").unwrap().unwrap();
    assert_eq!(chain.len(), 2);
    assert!(*chain[0] == *rsa_cert);
    assert!(*chain[1] == *dsa_cert);
    assert_eq!(ks.get_certificate_chain("anchor").unwrap().map(|c| c.len()), None);

    let anchor = ks.get_certificate("anchor").unwrap().unwrap();
    anchor.verify(&security, anchor.public_key().unwrap()).unwrap();
    assert_eq!(ks.get_certificate_alias(rsa_cert.as_ref()).unwrap().as_deref(), Some("rsa"));

    ks.delete_entry("anchor").unwrap();
    assert!(!ks.contains_alias("anchor").unwrap());
    assert!(ks.is_key_entry("dsa").unwrap());
    assert!(!ks.is_certificate_entry("dsa").unwrap());
}

#[test]
fn test_wrong_passwords() {
    let security = Security::with_builtin();
    let dir = tempdir().unwrap();
    let path = dir.path().join("keys.bks");

    let (key, cert) = signer(&security, "DSA", "SHA1withDSA");
    let mut ks = KeyStore::get_default(&security).unwrap();
    ks.load(&security, None, None).unwrap();
    ks.set_key_entry("me", &key, "right", vec![cert]).unwrap();
    let mut out = Vec::new();
    ks.store(&mut out, Some("store")).unwrap();
    fs::write(&path, &out).unwrap();

    let mut reloaded = KeyStore::get_default(&security).unwrap();
    let mut file = File::open(&path).unwrap();
    match reloaded.load(&security, Some(&mut file), Some("wrong")) {
        Err(SecurityError::KeyStore(msg)) => assert!(msg.contains("tampered")),
        other => panic!("Expected KeyStore error, got {:?}", other),
    }

    let mut file = File::open(&path).unwrap();
    reloaded.load(&security, Some(&mut file), Some("store")).unwrap();
    match reloaded.get_key(&security, "me", "wrong") {
        Err(SecurityError::UnrecoverableKey(_)) => assert!(true),
        other => panic!("Expected UnrecoverableKey, got {:?}", other),
    }
}

#[test]
fn test_truncated_store() {
    let security = Security::with_builtin();
    let (_, cert) = signer(&security, "DSA", "SHA1withDSA");

    let mut ks = KeyStore::get_default(&security).unwrap();
    ks.load(&security, None, None).unwrap();
    ks.set_certificate_entry("ca", cert).unwrap();
    let mut out = Vec::new();
    ks.store(&mut out, None).unwrap();

    // An absent password is the empty password
    let mut again = KeyStore::get_default(&security).unwrap();
    again.load(&security, Some(&mut out.as_slice()), Some("")).unwrap();
    assert_eq!(again.size().unwrap(), 1);

    out.truncate(out.len() - 40);
    assert!(again.load(&security, Some(&mut out.as_slice()), None).is_err());
}
