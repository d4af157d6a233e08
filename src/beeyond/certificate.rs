//! BEE certificates
//!
//! Wire layout:
//!
//! ```text
//! issuer        UTF
//! subject       UTF
//! created       i64, milliseconds since the epoch
//! expires       i64, milliseconds since the epoch or FOREVER
//! field count   i32
//! fields        tag i32, length i32, payload
//! sig algorithm UTF
//! signature     i32 length, bytes
//! ```
//!
//! The signature covers the to-be-signed (TBS) encoding: the same layout up
//! to and including the fields, with each field written as tag and payload
//! without a length.

use std::any::Any;
use std::fmt;
use std::io::{self, Read};
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use log::debug;
use once_cell::sync::OnceCell;
use sha2::{Digest, Sha256};

use crate::common::{DataInputStream, DataOutputStream, Result, SecurityError};
use crate::security::cert::Certificate;
use crate::security::key::{PrivateKey, PublicKey};
use crate::security::registry::Security;
use crate::security::signature::Signature;

use super::field::Field;

/// Certificate type name
pub const CERTIFICATE_TYPE: &str = "BEE";

/// Expiry value of a certificate that never expires
pub const FOREVER: i64 = -1;

/// Subject of certificates made by [`BeeCertificate::self_signed`]
pub const SELF_SIGNED_SUBJECT: &str = "PublicKey Certificate";

/// Copies everything read from the inner reader
struct Recorder<'a> {
    inner: &'a mut dyn Read,
    seen: Vec<u8>,
}

impl Read for Recorder<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.seen.extend_from_slice(&buf[..n]);
        Ok(n)
    }
}

/// An immutable BEE certificate
pub struct BeeCertificate {
    issuer: String,
    subject: String,
    created: i64,
    expires: i64,
    fields: Vec<Field>,
    signature_algorithm: String,
    signature: Vec<u8>,
    encoded: OnceCell<Vec<u8>>,
    display: OnceCell<String>,
}

impl BeeCertificate {
    /// Read one certificate from `reader`
    ///
    /// Field payloads are decoded with the key and certificate factories
    /// installed in `security`. The certificate remembers the exact bytes
    /// it was read from as its encoding.
    pub fn decode(security: &Security, reader: &mut dyn Read) -> Result<Self> {
        let mut recorder = Recorder { inner: reader, seen: Vec::new() };
        let mut input = DataInputStream::new(&mut recorder);

        let issuer = input.read_utf()?;
        let subject = input.read_utf()?;
        let created = input.read_i64()?;
        let expires = input.read_i64()?;

        let count = input.read_i32()?;
        if count < 0 {
            return Err(SecurityError::invalid_data("field count < 0"));
        }
        let mut fields = Vec::with_capacity(count.min(64) as usize);
        for _ in 0..count {
            let tag = input.read_i32()?;
            let size = input.read_i32()?;
            if size < 0 {
                return Err(SecurityError::invalid_data("field size < 0"));
            }
            let payload = input.read_bytes(size as usize)?;
            fields.push(Field::decode(security, tag, &payload)?);
        }

        let signature_algorithm = input.read_utf()?;
        let length = input.read_i32()?;
        if length < 0 {
            return Err(SecurityError::invalid_data("signature length < 0"));
        }
        let signature = input.read_bytes(length as usize)?;

        let seen = std::mem::take(&mut input.get_mut().seen);
        debug!("Decoded BEE certificate for '{}' with {} fields", subject, fields.len());

        Ok(Self {
            issuer,
            subject,
            created,
            expires,
            fields,
            signature_algorithm,
            signature,
            encoded: OnceCell::with_value(seen),
            display: OnceCell::new(),
        })
    }

    /// Build a certificate for `public`, signed by `private` with
    /// `algorithm`
    ///
    /// The issuer is blank, the subject is [`SELF_SIGNED_SUBJECT`], the
    /// certificate is valid from now on and never expires.
    pub fn self_signed(security: &Security, public: &PublicKey, private: &PrivateKey, algorithm: &str) -> Result<Self> {
        if public.encoded().is_none() {
            return Err(SecurityError::InvalidKey("PublicKey doesn't have an encoding".to_string()));
        }
        BeeCertificateBuilder::new()
            .subject(SELF_SIGNED_SUBJECT)
            .not_after(FOREVER)
            .public_key(public.clone())
            .sign(security, private, algorithm)
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Start of the validity window in milliseconds since the epoch
    pub fn not_before(&self) -> i64 {
        self.created
    }

    /// End of the validity window in milliseconds since the epoch, or [`FOREVER`]
    pub fn not_after(&self) -> i64 {
        self.expires
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    pub fn signature_algorithm(&self) -> &str {
        &self.signature_algorithm
    }

    /// Key of the first public key field
    pub fn public_key(&self) -> Option<&PublicKey> {
        self.fields.iter().find_map(|f| match f {
            Field::PublicKey { key, .. } => Some(key),
            _ => None,
        })
    }

    /// Certificate of the first parent certificate field
    pub fn parent_certificate(&self) -> Option<&Arc<dyn Certificate>> {
        self.fields.iter().find_map(|f| match f {
            Field::ParentCertificate(cert) => Some(cert),
            _ => None,
        })
    }

    pub fn has_public_key(&self) -> bool {
        self.public_key().is_some()
    }

    pub fn has_parent_certificate(&self) -> bool {
        self.parent_certificate().is_some()
    }

    /// SHA-256 of the encoding, as lowercase hex
    pub fn fingerprint(&self) -> Result<String> {
        Ok(hex::encode(Sha256::digest(Certificate::encoded(self)?)))
    }

    /// The bytes the signature is computed over
    pub fn encode_tbs(&self) -> Result<Vec<u8>> {
        encode_tbs(&self.issuer, &self.subject, self.created, self.expires, &self.fields)
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let mut out = DataOutputStream::new();
        write_header(&mut out, &self.issuer, &self.subject, self.created, self.expires, &self.fields)?;
        for field in &self.fields {
            let mut payload = DataOutputStream::new();
            field.encode(&mut payload)?;
            out.write_i32(field.tag());
            out.write_sized(payload.as_slice())?;
        }
        out.write_utf(&self.signature_algorithm)?;
        out.write_sized(&self.signature)?;
        Ok(out.into_vec())
    }

    /// Check the validity window against the current time
    pub fn check_validity(&self) -> Result<()> {
        self.check_validity_at(Utc::now().timestamp_millis())
    }

    /// Check the validity window against `at` (milliseconds since the epoch)
    pub fn check_validity_at(&self, at: i64) -> Result<()> {
        if at < self.created {
            return Err(SecurityError::CertificateNotYetValid(format!(
                "certificate is valid from {}",
                format_millis(self.created)
            )));
        }
        if self.expires != FOREVER && at > self.expires {
            return Err(SecurityError::CertificateExpired(format!(
                "certificate expired at {}",
                format_millis(self.expires)
            )));
        }
        Ok(())
    }

    fn check_signature(&self, mut sig: Signature, key: &PublicKey) -> Result<()> {
        sig.init_verify(key)?;
        sig.update(&self.encode_tbs()?)?;
        if !sig.verify(&self.signature)? {
            return Err(SecurityError::Certificate("signature doesn't match".to_string()));
        }
        Ok(())
    }
}

fn write_header(
    out: &mut DataOutputStream,
    issuer: &str,
    subject: &str,
    created: i64,
    expires: i64,
    fields: &[Field],
) -> Result<()> {
    out.write_utf(issuer)?;
    out.write_utf(subject)?;
    out.write_i64(created);
    out.write_i64(expires);
    let count = i32::try_from(fields.len()).map_err(|_| SecurityError::invalid_data("too many fields"))?;
    out.write_i32(count);
    Ok(())
}

fn encode_tbs(issuer: &str, subject: &str, created: i64, expires: i64, fields: &[Field]) -> Result<Vec<u8>> {
    let mut out = DataOutputStream::new();
    write_header(&mut out, issuer, subject, created, expires, fields)?;
    for field in fields {
        out.write_i32(field.tag());
        field.encode(&mut out)?;
    }
    Ok(out.into_vec())
}

fn format_millis(ms: i64) -> String {
    if ms == FOREVER {
        return "forever".to_string();
    }
    match Utc.timestamp_millis_opt(ms).single() {
        Some(t) => t.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("{} ms", ms),
    }
}

impl Certificate for BeeCertificate {
    fn cert_type(&self) -> &str {
        CERTIFICATE_TYPE
    }

    fn encoded(&self) -> Result<&[u8]> {
        self.encoded.get_or_try_init(|| self.encode()).map(Vec::as_slice)
    }

    fn public_key(&self) -> Option<&PublicKey> {
        BeeCertificate::public_key(self)
    }

    fn verify(&self, security: &Security, key: &PublicKey) -> Result<()> {
        let sig = Signature::get_instance(security, &self.signature_algorithm)?;
        self.check_signature(sig, key)
    }

    fn verify_with_provider(&self, security: &Security, key: &PublicKey, provider: &str) -> Result<()> {
        let sig = Signature::get_instance_with_provider(security, &self.signature_algorithm, provider)?;
        self.check_signature(sig, key)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PartialEq for BeeCertificate {
    fn eq(&self, other: &Self) -> bool {
        match (Certificate::encoded(self), Certificate::encoded(other)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for BeeCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeeCertificate")
            .field("issuer", &self.issuer)
            .field("subject", &self.subject)
            .field("created", &self.created)
            .field("expires", &self.expires)
            .field("fields", &self.fields)
            .field("signature_algorithm", &self.signature_algorithm)
            .finish()
    }
}

impl fmt::Display for BeeCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.display.get_or_init(|| {
            let mut s = format!(
                "BEE certificate\n  issuer:    {}\n  subject:   {}\n  valid:     {} .. {}\n",
                self.issuer,
                self.subject,
                format_millis(self.created),
                format_millis(self.expires)
            );
            for field in &self.fields {
                s.push_str(&format!("  field:     {:?}\n", field));
            }
            s.push_str(&format!(
                "  signature: {} ({} bytes)",
                self.signature_algorithm,
                self.signature.len()
            ));
            if let Ok(fp) = self.fingerprint() {
                s.push_str(&format!("\n  sha256:    {}", fp));
            }
            s
        });
        f.write_str(text)
    }
}

/// Assembles and signs a [`BeeCertificate`]
#[derive(Debug, Clone)]
pub struct BeeCertificateBuilder {
    issuer: String,
    subject: String,
    created: Option<i64>,
    expires: i64,
    fields: Vec<Field>,
}

impl Default for BeeCertificateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BeeCertificateBuilder {
    /// Blank issuer and subject, valid from signing time, never expiring
    pub fn new() -> Self {
        Self {
            issuer: String::new(),
            subject: String::new(),
            created: None,
            expires: FOREVER,
            fields: Vec::new(),
        }
    }

    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Start of validity; defaults to the time of signing
    pub fn not_before(mut self, millis: i64) -> Self {
        self.created = Some(millis);
        self
    }

    pub fn not_after(mut self, millis: i64) -> Self {
        self.expires = millis;
        self
    }

    pub fn public_key(mut self, key: PublicKey) -> Self {
        self.fields.push(Field::PublicKey { format: key.format().unwrap_or("BEE").to_string(), key });
        self
    }

    pub fn parent_certificate(mut self, cert: Arc<dyn Certificate>) -> Self {
        self.fields.push(Field::ParentCertificate(cert));
        self
    }

    /// Append any field, including ones of unknown type
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Sign the TBS encoding with `key` using the `algorithm` signature
    pub fn sign(self, security: &Security, key: &PrivateKey, algorithm: &str) -> Result<BeeCertificate> {
        let mut sig = Signature::get_instance(security, algorithm)?;
        sig.init_sign(key)?;

        let created = self.created.unwrap_or_else(|| Utc::now().timestamp_millis());
        let tbs = encode_tbs(&self.issuer, &self.subject, created, self.expires, &self.fields)?;
        sig.update(&tbs)?;
        let signature = sig.sign()?;

        Ok(BeeCertificate {
            issuer: self.issuer,
            subject: self.subject,
            created,
            expires: self.expires,
            fields: self.fields,
            signature_algorithm: algorithm.to_string(),
            signature,
            encoded: OnceCell::new(),
            display: OnceCell::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::key_pair_generator::KeyPairGenerator;

    fn dsa_pair(security: &Security) -> (PublicKey, PrivateKey) {
        let mut kpg = KeyPairGenerator::get_instance(security, "DSA").unwrap();
        kpg.initialize(512).unwrap();
        kpg.generate_key_pair().unwrap().into_parts()
    }

    #[test]
    fn test_self_signed_round_trip() {
        let security = Security::with_builtin();
        let (public, private) = dsa_pair(&security);

        let cert = BeeCertificate::self_signed(&security, &public, &private, "SHA1withDSA").unwrap();
        assert_eq!(cert.issuer(), "");
        assert_eq!(cert.subject(), SELF_SIGNED_SUBJECT);
        assert_eq!(cert.not_after(), FOREVER);
        cert.verify(&security, &public).unwrap();

        let bytes = Certificate::encoded(&cert).unwrap().to_vec();
        let back = BeeCertificate::decode(&security, &mut bytes.as_slice()).unwrap();
        assert_eq!(back, cert);
        assert_eq!(back.public_key(), Some(&public));
        back.verify(&security, &public).unwrap();
        assert_eq!(back.fingerprint().unwrap(), cert.fingerprint().unwrap());
        assert_eq!(cert.fingerprint().unwrap().len(), 64);
    }

    #[test]
    fn test_tampered_signature() {
        let security = Security::with_builtin();
        let (public, private) = dsa_pair(&security);
        let cert = BeeCertificate::self_signed(&security, &public, &private, "SHA1withDSA").unwrap();

        let mut bytes = Certificate::encoded(&cert).unwrap().to_vec();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        let back = BeeCertificate::decode(&security, &mut bytes.as_slice()).unwrap();
        let err = back.verify(&security, &public).unwrap_err();
        assert!(err.is_certificate_exception() || matches!(err, SecurityError::Signature(_)));
    }

    #[test]
    fn test_validity_window() {
        let security = Security::with_builtin();
        let (public, private) = dsa_pair(&security);
        let cert = BeeCertificateBuilder::new()
            .issuer("CA")
            .subject("leaf")
            .not_before(1_000)
            .not_after(2_000)
            .public_key(public)
            .sign(&security, &private, "SHA1withDSA")
            .unwrap();

        assert!(cert.check_validity_at(1_500).is_ok());
        assert!(matches!(cert.check_validity_at(999), Err(SecurityError::CertificateNotYetValid(_))));
        assert!(matches!(cert.check_validity_at(2_001), Err(SecurityError::CertificateExpired(_))));
        assert!(matches!(cert.check_validity(), Err(SecurityError::CertificateExpired(_))));
    }

    #[test]
    fn test_unknown_field_round_trip() {
        let security = Security::with_builtin();
        let (public, private) = dsa_pair(&security);
        let cert = BeeCertificateBuilder::new()
            .subject("with extras")
            .public_key(public.clone())
            .field(Field::Unknown { tag: 0x45585431, bytes: vec![9, 8, 7] })
            .sign(&security, &private, "SHA1withDSA")
            .unwrap();

        let bytes = Certificate::encoded(&cert).unwrap().to_vec();
        let back = BeeCertificate::decode(&security, &mut bytes.as_slice()).unwrap();
        assert_eq!(back.fields().len(), 2);
        assert_eq!(back.fields()[1].tag(), 0x45585431);
        assert_eq!(Certificate::encoded(&back).unwrap(), bytes.as_slice());
        back.verify(&security, &public).unwrap();
    }

    #[test]
    fn test_negative_counts() {
        let security = Security::with_builtin();
        let mut out = DataOutputStream::new();
        out.write_utf("").unwrap();
        out.write_utf("s").unwrap();
        out.write_i64(0);
        out.write_i64(FOREVER);
        out.write_i32(-1);
        let err = BeeCertificate::decode(&security, &mut out.as_slice()).unwrap_err();
        assert!(err.is_io());
    }

    #[test]
    fn test_huge_declared_sizes() {
        let security = Security::with_builtin();
        let header = |out: &mut DataOutputStream| {
            out.write_utf("").unwrap();
            out.write_utf("s").unwrap();
            out.write_i64(0);
            out.write_i64(FOREVER);
        };

        let mut out = DataOutputStream::new();
        header(&mut out);
        out.write_i32(1);
        out.write_i32(0x7075_6220);
        out.write_i32(i32::MAX);
        out.write(&[0u8; 4]);
        match BeeCertificate::decode(&security, &mut out.as_slice()) {
            Err(SecurityError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("Expected EOF, got {:?}", other),
        }

        let mut out = DataOutputStream::new();
        header(&mut out);
        out.write_i32(0);
        out.write_utf("SHA1withDSA").unwrap();
        out.write_i32(i32::MAX);
        match BeeCertificate::decode(&security, &mut out.as_slice()) {
            Err(SecurityError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::UnexpectedEof),
            other => panic!("Expected EOF, got {:?}", other),
        }
    }
}
