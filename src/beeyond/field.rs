//! Certificate fields
//!
//! On the wire a field is a 4-byte tag, a 4-byte payload length and the
//! payload. Tags this crate does not know are kept as opaque bytes so a
//! certificate always re-encodes to the bytes it was read from.

use std::fmt;
use std::sync::Arc;

use crate::common::{DataInputStream, DataOutputStream, Result, SecurityError};
use crate::security::cert::{Certificate, CertificateFactory};
use crate::security::key::PublicKey;
use crate::security::key_factory::KeyFactory;
use crate::security::registry::Security;
use crate::security::spec::{EncodedKeySpec, KeySpec};

/// 'PUBK'
pub const PUBLIC_KEY_TAG: i32 = 0x5055424b;

/// 'CERT'
pub const PARENT_CERTIFICATE_TAG: i32 = 0x43455254;

#[derive(Clone)]
pub enum Field {
    /// The certified key, with the encoding format it travels in
    PublicKey { format: String, key: PublicKey },
    /// The certificate of the issuer
    ParentCertificate(Arc<dyn Certificate>),
    /// A field of unknown type, kept verbatim
    Unknown { tag: i32, bytes: Vec<u8> },
}

impl Field {
    /// Field carrying `key` in its own encoding format
    pub fn public_key(key: PublicKey) -> Result<Self> {
        let format = key
            .format()
            .ok_or_else(|| SecurityError::InvalidKey("PublicKey has no encoding format".to_string()))?;
        Ok(Field::PublicKey { format: format.to_string(), key })
    }

    pub fn parent_certificate(cert: Arc<dyn Certificate>) -> Self {
        Field::ParentCertificate(cert)
    }

    pub fn tag(&self) -> i32 {
        match self {
            Field::PublicKey { .. } => PUBLIC_KEY_TAG,
            Field::ParentCertificate(_) => PARENT_CERTIFICATE_TAG,
            Field::Unknown { tag, .. } => *tag,
        }
    }

    /// Write the payload (without tag or length)
    pub fn encode(&self, out: &mut DataOutputStream) -> Result<()> {
        match self {
            Field::PublicKey { format, key } => {
                let encoded = key
                    .encoded()
                    .ok_or_else(|| SecurityError::InvalidKey("PublicKey has no encoding".to_string()))?;
                out.write_utf(format)?;
                out.write_sized(encoded)?;
            }
            Field::ParentCertificate(cert) => {
                out.write_utf(cert.cert_type())?;
                out.write_sized(cert.encoded()?)?;
            }
            Field::Unknown { bytes, .. } => out.write(bytes),
        }
        Ok(())
    }

    /// Decode the payload of a field with the given tag
    ///
    /// Keys and parent certificates are decoded with the key factory or
    /// certificate factory the registry has for their format.
    pub fn decode(security: &Security, tag: i32, payload: &[u8]) -> Result<Self> {
        match tag {
            PUBLIC_KEY_TAG => {
                let mut input = DataInputStream::new(payload);
                let format = input.read_utf()?;
                let factory = KeyFactory::get_instance(security, &format)?;
                let size = input.read_i32()?;
                if size <= 0 {
                    return Err(SecurityError::invalid_data("Invalid key encoding size"));
                }
                let encoded = input.read_bytes(size as usize)?;
                let key = factory.generate_public(&KeySpec::Encoded(EncodedKeySpec::new(format.as_str(), &encoded)))?;
                Ok(Field::PublicKey { format, key })
            }
            PARENT_CERTIFICATE_TAG => {
                let mut input = DataInputStream::new(payload);
                let cert_type = input.read_utf()?;
                let mut factory = CertificateFactory::get_instance(security, &cert_type)?;
                let size = input.read_i32()?;
                if size <= 0 {
                    return Err(SecurityError::invalid_data("Invalid certificate encoding size"));
                }
                let encoded = input.read_bytes(size as usize)?;
                let parent = factory.generate_certificate(security, &mut encoded.as_slice())?;
                Ok(Field::ParentCertificate(parent))
            }
            _ => Ok(Field::Unknown { tag, bytes: payload.to_vec() }),
        }
    }
}

impl fmt::Debug for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::PublicKey { format, key } => {
                write!(f, "PublicKey({} {})", key.algorithm(), format)
            }
            Field::ParentCertificate(cert) => write!(f, "ParentCertificate({})", cert.cert_type()),
            Field::Unknown { tag, bytes } => write!(f, "Unknown({:#010x}, {} bytes)", tag, bytes.len()),
        }
    }
}
