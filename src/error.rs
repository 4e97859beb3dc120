//! Error type shared by every fallible operation of the crate.

use thiserror::Error;

/// Represents errors that can occur while issuing certificates.
///
/// Every failure is returned to the caller; none of them is retried internally.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CertSmithError {
    /// The request text is not structurally valid.
    #[error("Failed to parse certificate request: {0}")]
    ParseError(String),

    /// Unsupported algorithm, out-of-range key size, missing subject or no usable key usage.
    #[error("Invalid input: {0}")]
    ValidationError(String),

    /// Randomness, key generation or signing failed.
    #[error("Cryptographic failure: {0}")]
    CryptoError(String),

    /// PEM or DER material could not be encoded or decoded.
    #[error("Encoding error: {0}")]
    EncodingError(String),
}

pub type Result<T> = std::result::Result<T, CertSmithError>;

impl From<serde_yaml::Error> for CertSmithError {
    fn from(err: serde_yaml::Error) -> Self {
        CertSmithError::ParseError(err.to_string())
    }
}

impl From<der::Error> for CertSmithError {
    /// Converts a `der::Error` into a `CertSmithError`.
    fn from(err: der::Error) -> Self {
        CertSmithError::EncodingError(err.to_string())
    }
}

impl From<pkcs8::Error> for CertSmithError {
    fn from(err: pkcs8::Error) -> Self {
        CertSmithError::EncodingError(err.to_string())
    }
}

impl From<pkcs8::spki::Error> for CertSmithError {
    fn from(err: pkcs8::spki::Error) -> Self {
        CertSmithError::EncodingError(err.to_string())
    }
}

impl From<pem::PemError> for CertSmithError {
    fn from(err: pem::PemError) -> Self {
        CertSmithError::EncodingError(err.to_string())
    }
}

impl From<rsa::Error> for CertSmithError {
    fn from(err: rsa::Error) -> Self {
        CertSmithError::CryptoError(err.to_string())
    }
}

impl From<ecdsa::Error> for CertSmithError {
    fn from(err: ecdsa::Error) -> Self {
        CertSmithError::CryptoError(err.to_string())
    }
}
