use core::fmt;
use core::str::FromStr;

use crate::cert::SignatureAlgorithm;
use crate::error::{CertSmithError, Result};

/// Smallest RSA modulus accepted from a request.
pub const MIN_RSA_KEY_SIZE: usize = 2048;

/// Largest RSA modulus accepted from a request.
pub const MAX_RSA_KEY_SIZE: usize = 8192;

const ECDSA_KEY_SIZES: [usize; 3] = [256, 384, 521];

/// Key algorithms a certificate request may ask for.
///
/// The set is closed: every variant has a default size, a set of valid sizes
/// and a mapping from key size to the X.509 signature algorithm it signs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Ecdsa,
    Rsa,
}

impl KeyAlgorithm {
    /// The size used when a request asks for size `0`.
    pub const fn default_size(self) -> usize {
        match self {
            KeyAlgorithm::Ecdsa => 256,
            KeyAlgorithm::Rsa => 4096,
        }
    }

    /// Checks `size` against the sizes this algorithm accepts. `0` always
    /// passes and means "use the default".
    pub fn validate_size(self, size: usize) -> Result<()> {
        match self {
            KeyAlgorithm::Ecdsa => {
                if size == 0 || ECDSA_KEY_SIZES.contains(&size) {
                    Ok(())
                } else {
                    Err(CertSmithError::ValidationError(format!(
                        "invalid ecdsa key size {size} - key size must be either 256, 384 or 521"
                    )))
                }
            }
            KeyAlgorithm::Rsa => {
                if size == 0 || (MIN_RSA_KEY_SIZE..=MAX_RSA_KEY_SIZE).contains(&size) {
                    Ok(())
                } else {
                    Err(CertSmithError::ValidationError(format!(
                        "invalid rsa key size {size} - key size must be between {MIN_RSA_KEY_SIZE} and {MAX_RSA_KEY_SIZE}"
                    )))
                }
            }
        }
    }

    /// Resolves `0` to the default size, leaving other sizes untouched.
    pub const fn resolve_size(self, size: usize) -> usize {
        if size == 0 { self.default_size() } else { size }
    }

    /// The signature algorithm a key of this algorithm and `size` signs with.
    ///
    /// # Panics
    /// For ECDSA, `size` must be one of 256, 384 or 521.
    pub fn signature_algorithm(self, size: usize) -> SignatureAlgorithm {
        match self {
            KeyAlgorithm::Ecdsa => match size {
                256 => SignatureAlgorithm::Sha256WithECDSA,
                384 => SignatureAlgorithm::Sha384WithECDSA,
                521 => SignatureAlgorithm::Sha512WithECDSA,
                _ => unreachable!("unexpected ecdsa key size {size}"),
            },
            // Keys under 2048 bits only arrive through the loader and keep SHA-256.
            KeyAlgorithm::Rsa => match size {
                4096.. => SignatureAlgorithm::Sha512WithRSA,
                3072.. => SignatureAlgorithm::Sha384WithRSA,
                _ => SignatureAlgorithm::Sha256WithRSA,
            },
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            KeyAlgorithm::Ecdsa => "ecdsa",
            KeyAlgorithm::Rsa => "rsa",
        }
    }
}

impl FromStr for KeyAlgorithm {
    type Err = CertSmithError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ecdsa" => Ok(KeyAlgorithm::Ecdsa),
            "rsa" => Ok(KeyAlgorithm::Rsa),
            other => Err(CertSmithError::ValidationError(format!(
                "unknown key type: {other}"
            ))),
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses `algorithm` and checks `size` against it in one step.
pub fn validate_key(algorithm: &str, size: usize) -> Result<KeyAlgorithm> {
    let algorithm: KeyAlgorithm = algorithm.parse()?;
    algorithm.validate_size(size)?;
    Ok(algorithm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ecdsa_size_boundaries() {
        for size in [0, 256, 384, 521] {
            assert!(KeyAlgorithm::Ecdsa.validate_size(size).is_ok(), "{size}");
        }
        for size in [5, 255, 333, 512, 1024] {
            assert!(matches!(
                KeyAlgorithm::Ecdsa.validate_size(size),
                Err(CertSmithError::ValidationError(_))
            ));
        }
    }

    #[test]
    fn test_rsa_size_boundaries() {
        for size in [0, 2048, 3072, 4096, 8192] {
            assert!(KeyAlgorithm::Rsa.validate_size(size).is_ok(), "{size}");
        }
        for size in [5, 222, 2047, 8193] {
            assert!(KeyAlgorithm::Rsa.validate_size(size).is_err(), "{size}");
        }
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("ecdsa".parse::<KeyAlgorithm>().unwrap(), KeyAlgorithm::Ecdsa);
        assert_eq!("rsa".parse::<KeyAlgorithm>().unwrap(), KeyAlgorithm::Rsa);
        assert_eq!(KeyAlgorithm::Ecdsa.to_string(), "ecdsa");
        assert_eq!(KeyAlgorithm::Rsa.to_string(), "rsa");

        let err = "ddd".parse::<KeyAlgorithm>().unwrap_err();
        assert_eq!(
            err,
            CertSmithError::ValidationError("unknown key type: ddd".to_string())
        );
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("ecdsa", 222).is_err());
        assert!(validate_key("rsa", 222).is_err());
        assert!(validate_key("ddd", 222).is_err());
        assert_eq!(validate_key("rsa", 0).unwrap(), KeyAlgorithm::Rsa);
    }

    #[test]
    fn test_signature_algorithm_mapping() {
        use SignatureAlgorithm::*;
        assert_eq!(KeyAlgorithm::Ecdsa.signature_algorithm(256), Sha256WithECDSA);
        assert_eq!(KeyAlgorithm::Ecdsa.signature_algorithm(384), Sha384WithECDSA);
        assert_eq!(KeyAlgorithm::Ecdsa.signature_algorithm(521), Sha512WithECDSA);
        assert_eq!(KeyAlgorithm::Rsa.signature_algorithm(2048), Sha256WithRSA);
        assert_eq!(KeyAlgorithm::Rsa.signature_algorithm(3072), Sha384WithRSA);
        assert_eq!(KeyAlgorithm::Rsa.signature_algorithm(4096), Sha512WithRSA);
        assert_eq!(KeyAlgorithm::Rsa.signature_algorithm(8192), Sha512WithRSA);
    }

    #[test]
    fn test_default_sizes() {
        assert_eq!(KeyAlgorithm::Ecdsa.resolve_size(0), 256);
        assert_eq!(KeyAlgorithm::Rsa.resolve_size(0), 4096);
        assert_eq!(KeyAlgorithm::Rsa.resolve_size(3072), 3072);
    }

    #[test]
    #[should_panic(expected = "unexpected ecdsa key size")]
    fn test_ecdsa_signature_algorithm_rejects_unknown_size() {
        KeyAlgorithm::Ecdsa.signature_algorithm(222);
    }
}
