//! Error handling module
//!
//! This module defines the error type and result type alias shared by the
//! registry, the façades and every provider implementation.

use thiserror::Error;
use std::io;

/// BeeCrypt security error type
///
/// Each variant corresponds to one exception class of the security
/// framework; the message carries the detail.
#[derive(Error, Debug)]
pub enum SecurityError {
    /// No provider publishes the requested algorithm for the service type
    #[error("No such algorithm: {0}")]
    NoSuchAlgorithm(String),

    /// A provider was requested by name but is not installed
    #[error("No such provider: {0}")]
    NoSuchProvider(String),

    /// Key of the wrong type, polarity or without a usable encoding
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Key specification that cannot be turned into a key
    #[error("Invalid key spec: {0}")]
    InvalidKeySpec(String),

    /// Parameter outside the documented range (e.g. key size)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Algorithm parameter spec not supported by the engine
    #[error("Invalid algorithm parameter: {0}")]
    InvalidAlgorithmParameter(String),

    /// Engine used out of sequence
    #[error("Illegal state: {0}")]
    IllegalState(String),

    /// IO error, including malformed or truncated wire data
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Generic certificate failure (e.g. signature mismatch)
    #[error("Certificate error: {0}")]
    Certificate(String),

    /// Certificate validity window ended before the checked instant
    #[error("Certificate expired: {0}")]
    CertificateExpired(String),

    /// Certificate validity window starts after the checked instant
    #[error("Certificate not yet valid: {0}")]
    CertificateNotYetValid(String),

    /// Cryptographic operation failure
    #[error("Signature error: {0}")]
    Signature(String),

    /// Output buffer too small for the result
    #[error("Short buffer: need {needed} bytes, have {available}")]
    ShortBuffer {
        /// Bytes required
        needed: usize,
        /// Bytes supplied by the caller
        available: usize,
    },

    /// Key store format, integrity or password failure
    #[error("KeyStore error: {0}")]
    KeyStore(String),

    /// A protected key could not be recovered
    #[error("Unrecoverable key: {0}")]
    UnrecoverableKey(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SecurityError {
    /// Create an IO error carrying `InvalidData` with the given message
    pub fn invalid_data(msg: impl Into<String>) -> Self {
        SecurityError::Io(io::Error::new(io::ErrorKind::InvalidData, msg.into()))
    }

    /// Whether this error belongs to the certificate exception family
    pub fn is_certificate_exception(&self) -> bool {
        matches!(
            self,
            SecurityError::Certificate(_)
                | SecurityError::CertificateExpired(_)
                | SecurityError::CertificateNotYetValid(_)
        )
    }

    /// Whether this error is an IO error (including certificate parsing errors)
    pub fn is_io(&self) -> bool {
        matches!(self, SecurityError::Io(_))
    }
}

impl From<config::ConfigError> for SecurityError {
    fn from(err: config::ConfigError) -> Self {
        SecurityError::Config(err.to_string())
    }
}

/// Result type alias
///
/// This is a `Result` type alias that uses our custom `SecurityError`.
pub type Result<T> = std::result::Result<T, SecurityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "stream exhausted");
        let err: SecurityError = io_err.into();

        match err {
            SecurityError::Io(e) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
            _ => panic!("Should convert to IO error"),
        }
    }

    #[test]
    fn test_error_display() {
        let err = SecurityError::NoSuchAlgorithm("Foo Signature not available".to_string());
        let err_str = format!("{}", err);
        assert!(err_str.contains("Foo Signature not available"));

        let err = SecurityError::ShortBuffer { needed: 64, available: 10 };
        assert!(err.to_string().contains("64"));
    }

    #[test]
    fn test_certificate_family() {
        assert!(SecurityError::CertificateExpired("x".into()).is_certificate_exception());
        assert!(SecurityError::CertificateNotYetValid("x".into()).is_certificate_exception());
        assert!(SecurityError::Certificate("x".into()).is_certificate_exception());
        assert!(!SecurityError::Signature("x".into()).is_certificate_exception());
        assert!(SecurityError::invalid_data("bad").is_io());
    }
}
