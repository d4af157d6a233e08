//! Beeyond certificates
//!
//! The BEE certificate format: issuer, subject, validity window, an
//! extensible list of typed fields and a signature over everything else.

pub mod certificate;
pub mod field;

pub use certificate::{BeeCertificate, BeeCertificateBuilder, CERTIFICATE_TYPE, FOREVER, SELF_SIGNED_SUBJECT};
pub use field::{Field, PARENT_CERTIFICATE_TAG, PUBLIC_KEY_TAG};
