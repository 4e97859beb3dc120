//! # CertSmith - A Pure Rust Certificate Issuance Engine
//!
//! CertSmith turns small declarative certificate requests into PEM-encoded key
//! and certificate material, built entirely with rustcrypto libraries. It
//! issues self-signed certificate authorities and leaf certificates signed by
//! an existing CA.
//!
//! ## Supported Key Types
//!
//! - **ECDSA**: P-256 (default), P-384 and P-521 curves. P-224 keys can be
//!   loaded and used to sign, but are never generated.
//! - **RSA**: 2048 to 8192-bit keys, 4096 by default
//!
//! The signature algorithm follows the signing key: SHA-256, SHA-384 or
//! SHA-512 for the three curves, and for RSA SHA-512 from 4096 bits, SHA-384
//! from 3072 bits and SHA-256 below.
//!
//! ## Requests
//!
//! ```yaml
//! keyAlgorithm: ecdsa      # or rsa
//! keySize: 384             # optional, 0 or missing selects the default
//! commonName: test.example.com
//! names:
//!   - C: CA
//!     ST: QC
//!     L: Montreal
//!     O: test org
//!     OU: test org unit
//! hosts:
//!   - example.com          # DNS name
//!   - admin@example.com    # email address
//!   - https://example.com  # URI
//!   - 10.1.0.1             # IP address
//! ```
//!
//! Hosts are classified in that precedence order (IP address, email, URI,
//! then DNS name) and written to the subject alternative name extension.
//!
//! ## Quick Start
//!
//! ### Creating a CA and a Server Certificate
//!
//! ```rust,no_run
//! use std::time::Duration;
//!
//! # fn main() -> Result<(), certsmith::error::CertSmithError> {
//! let ca = certsmith::generate_ca(
//!     b"keyAlgorithm: ecdsa\ncommonName: Example CA\n",
//!     Duration::ZERO,
//! )?;
//!
//! let server = certsmith::generate(
//!     b"keyAlgorithm: rsa\nkeySize: 2048\ncommonName: example.com\nhosts: [example.com]\n",
//!     &ca.certificate_pem,
//!     &ca.private_key_pem,
//!     Duration::from_secs(90 * 24 * 3600),
//!     &["signing", "key encipherment", "server auth"],
//! )?;
//!
//! println!("{}", String::from_utf8_lossy(&server.certificate_pem));
//! # Ok(())
//! # }
//! ```
//!
//! ### Generating a Certificate Signing Request
//!
//! ```rust,no_run
//! use certsmith::request::{ca_extension, parse_certificate_request};
//!
//! # fn main() -> Result<(), certsmith::error::CertSmithError> {
//! let request = parse_certificate_request(b"keyAlgorithm: ecdsa\ncommonName: Sub CA\n")?;
//! let key = request.generate_key()?;
//! let csr = request.to_csr_pem(&key, &[ca_extension()?])?;
//! # let _ = csr;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every failure is reported through [`error::CertSmithError`]:
//!
//! ```rust
//! use certsmith::error::CertSmithError;
//!
//! match certsmith::parse_certificate_request(b"keyAlgorithm: dsa\ncommonName: a\n") {
//!     Ok(_) => unreachable!(),
//!     Err(CertSmithError::ValidationError(msg)) => assert_eq!(msg, "unknown key type: dsa"),
//!     Err(e) => panic!("unexpected error: {e}"),
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`key`]: Key algorithm policy, key generation and private key loading
//! - [`hosts`]: Classification of request hosts into subject alternative names
//! - [`request`]: Request parsing, subjects and PKCS#10 requests
//! - [`template`]: Certificate templates, validity and serial numbers
//! - [`issuer`]: Certificate issuing and the CA / leaf entry points
//! - [`cert`]: Certificate encoding, extensions and usage tables
//! - [`error`]: Error types

pub mod cert;
pub mod error;
pub mod hosts;
pub mod issuer;
pub mod key;
pub mod pem_utils;
pub mod request;
pub mod template;

pub use issuer::{IssuedMaterial, generate, generate_ca};
pub use key::{
    Key, KeyAlgorithm, MAX_RSA_KEY_SIZE, MIN_RSA_KEY_SIZE, generate_key, parse_private_key,
};
pub use request::{CertificateRequest, parse_certificate_request};
pub use template::{CLOCK_SKEW_ALLOWANCE, DEFAULT_CERTIFICATE_EXPIRATION};
