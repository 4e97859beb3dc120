use std::time::Duration;

use der::Encode;
use x509_cert::certificate::CertificateInner;
use x509_cert::name::Name;

use crate::cert::Certificate;
use crate::cert::extensions::SubjectKeyIdentifier;
use crate::cert::usage::resolve_usages;
use crate::error::{CertSmithError, Result};
use crate::key::{Key, parse_private_key};
use crate::request::{CertificateRequest, parse_certificate_request};
use crate::template::{
    CertificateTemplate, build_template, build_template_with_usage, signature_bits,
};

/// Usage every generated CA is restricted to.
pub const CA_USAGES: [&str; 2] = ["cert sign", "crl sign"];

/// Represents an entity capable of issuing certificates.
///
/// This trait provides methods to retrieve issuer details and issue certificates.
pub trait Issuer {
    /// Returns the name placed in the issuer field of issued certificates.
    fn issuer_name(&self) -> Result<Name>;

    /// Returns the signing key of the issuer.
    fn signing_key(&self) -> &Key;

    /// Key identifier copied into the authority key identifier of issued certificates.
    fn authority_key_id(&self) -> Result<Option<Vec<u8>>>;

    /// Issues a certificate for `template`.
    ///
    /// The signature algorithm follows the issuer's signing key.
    fn issue(&self, template: &CertificateTemplate) -> Result<Certificate> {
        let signing_key = self.signing_key();
        let signature_algorithm = signing_key.signature_algorithm();

        let tbs_certificate = template.to_tbs_certificate_inner(
            self.issuer_name()?,
            signature_algorithm,
            self.authority_key_id()?,
        )?;
        let signature = signing_key.sign(&tbs_certificate.to_der()?)?;

        tracing::info!(
            serial = template.serial_number,
            common_name = %template.subject.common_name,
            is_ca = template.is_ca,
            "issued certificate"
        );

        Ok(Certificate {
            inner: CertificateInner {
                tbs_certificate,
                signature_algorithm: signature_algorithm.into(),
                signature: signature_bits(&signature)?,
            },
        })
    }
}

/// Issuer of a self-signed certificate: the subject signs its own template.
pub struct SelfIssuer<'a> {
    pub subject: Name,
    pub key: &'a Key,
}

impl Issuer for SelfIssuer<'_> {
    fn issuer_name(&self) -> Result<Name> {
        Ok(self.subject.clone())
    }

    fn signing_key(&self) -> &Key {
        self.key
    }

    fn authority_key_id(&self) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

/// A CA certificate together with the private key it certifies.
#[derive(Debug, Clone)]
pub struct CertificateWithPrivateKey {
    pub cert: Certificate,
    pub key: Key,
}

impl CertificateWithPrivateKey {
    /// Pairs `cert` with `key`, rejecting a key whose public half is not the
    /// one `cert` certifies.
    pub fn new(cert: Certificate, key: Key) -> Result<Self> {
        if key.public_key_info()? != cert.inner.tbs_certificate.subject_public_key_info {
            return Err(CertSmithError::ValidationError(
                "private key does not match the CA certificate".to_string(),
            ));
        }
        Ok(Self { cert, key })
    }

    /// Decodes a CA certificate and its private key from PEM.
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<Self> {
        let cert = Certificate::from_pem(cert_pem).map_err(|e| {
            CertSmithError::EncodingError(format!("cannot parse CA certificate: {e}"))
        })?;
        let key = parse_private_key(key_pem)?;
        Self::new(cert, key)
    }
}

impl Issuer for CertificateWithPrivateKey {
    fn issuer_name(&self) -> Result<Name> {
        Ok(self.cert.inner.tbs_certificate.subject.clone())
    }

    fn signing_key(&self) -> &Key {
        &self.key
    }

    fn authority_key_id(&self) -> Result<Option<Vec<u8>>> {
        Ok(self
            .cert
            .extension::<SubjectKeyIdentifier>()?
            .map(|subject_key_id| subject_key_id.0))
    }
}

/// PEM-encoded output of an issuance call. The caller owns both buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedMaterial {
    /// `CERTIFICATE` PEM block.
    pub certificate_pem: Vec<u8>,
    /// `EC PRIVATE KEY` or `RSA PRIVATE KEY` PEM block.
    pub private_key_pem: Vec<u8>,
}

impl IssuedMaterial {
    fn new(certificate: &Certificate, key: &Key) -> Result<Self> {
        Ok(Self {
            certificate_pem: certificate.to_pem()?.into_bytes(),
            private_key_pem: key.encoded().to_vec(),
        })
    }
}

/// Generates a self-signed CA from a YAML request.
///
/// The CA gets a fresh key and is restricted to signing certificates and CRLs.
/// A zero `expiration` selects the ten-year default.
pub fn generate_ca(request: &[u8], expiration: Duration) -> Result<IssuedMaterial> {
    let request = parse_certificate_request(request)?;
    let key = request.generate_key()?;
    issue_self_signed(&request, &key, expiration)
}

fn issue_self_signed(
    request: &CertificateRequest,
    key: &Key,
    expiration: Duration,
) -> Result<IssuedMaterial> {
    let template = build_template(request, key, expiration, &CA_USAGES, true)?;
    let issuer = SelfIssuer {
        subject: template.subject.as_x509_name()?,
        key,
    };
    let certificate = issuer.issue(&template)?;
    IssuedMaterial::new(&certificate, key)
}

/// Generates a leaf certificate from a YAML request, signed by the CA in
/// `ca_cert_pem` and `ca_key_pem`.
///
/// `usages` are names such as `"signing"` or `"server auth"`; unknown names
/// are ignored, but at least one must be recognised.
pub fn generate<S: AsRef<str>>(
    request: &[u8],
    ca_cert_pem: &[u8],
    ca_key_pem: &[u8],
    expiration: Duration,
    usages: &[S],
) -> Result<IssuedMaterial> {
    let request = parse_certificate_request(request)?;
    let ca = CertificateWithPrivateKey::from_pem(ca_cert_pem, ca_key_pem)?;
    let usage = resolve_usages(usages)?;
    let key = request.generate_key()?;
    let template = build_template_with_usage(&request, &key, expiration, usage, false)?;
    let certificate = ca.issue(&template)?;
    IssuedMaterial::new(&certificate, &key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cert::extensions::{AuthorityKeyIdentifier, BasicConstraints, KeyUsage, KeyUsages};
    use crate::key::{KeyAlgorithm, generate_key};

    const CA_REQUEST: &[u8] = b"keyAlgorithm: ecdsa\ncommonName: Test CA\n";
    const LEAF_REQUEST: &[u8] =
        b"keyAlgorithm: ecdsa\nkeySize: 384\ncommonName: leaf.example.com\nhosts:\n  - leaf.example.com\n";

    #[test]
    fn test_ca_is_self_signed() {
        let material = generate_ca(CA_REQUEST, Duration::ZERO).unwrap();
        let ca = Certificate::from_pem(&material.certificate_pem).unwrap();

        assert_eq!(ca.issuer(), ca.subject());
        ca.verify_issued_by(&ca).unwrap();

        let constraints = ca.extension::<BasicConstraints>().unwrap().unwrap();
        assert!(constraints.is_ca);
        let key_usage = ca.extension::<KeyUsage>().unwrap().unwrap();
        assert_eq!(key_usage.0, KeyUsages::KeyCertSign | KeyUsages::CRLSign);
        assert!(ca.extension::<SubjectKeyIdentifier>().unwrap().is_some());
        assert!(ca.extension::<AuthorityKeyIdentifier>().unwrap().is_none());

        let key = parse_private_key(&material.private_key_pem).unwrap();
        assert_eq!(key.algorithm(), KeyAlgorithm::Ecdsa);
        assert_eq!(key.size(), 256);
    }

    #[test]
    fn test_leaf_is_signed_by_ca() {
        let ca_material = generate_ca(CA_REQUEST, Duration::ZERO).unwrap();
        let leaf_material = generate(
            LEAF_REQUEST,
            &ca_material.certificate_pem,
            &ca_material.private_key_pem,
            Duration::from_secs(86400),
            &["signing", "key encipherment", "server auth"],
        )
        .unwrap();

        let ca = Certificate::from_pem(&ca_material.certificate_pem).unwrap();
        let leaf = Certificate::from_pem(&leaf_material.certificate_pem).unwrap();
        leaf.verify_issued_by(&ca).unwrap();
        assert!(leaf.verify_issued_by(&leaf).is_err());
        assert_eq!(leaf.issuer(), ca.subject());

        // the CA key is P-256, so the leaf is signed with SHA-256 despite its P-384 key
        assert_eq!(
            leaf.inner.signature_algorithm.oid,
            const_oid::db::rfc5912::ECDSA_WITH_SHA_256
        );

        let ca_key_id = ca.extension::<SubjectKeyIdentifier>().unwrap().unwrap();
        let leaf_authority = leaf.extension::<AuthorityKeyIdentifier>().unwrap().unwrap();
        assert_eq!(leaf_authority.key_identifier, ca_key_id.0);
        assert!(!leaf.extension::<BasicConstraints>().unwrap().unwrap().is_ca);
    }

    #[test]
    fn test_mismatched_ca_key_is_rejected() {
        let ca_material = generate_ca(CA_REQUEST, Duration::ZERO).unwrap();
        let other_key = generate_key(KeyAlgorithm::Ecdsa, 256).unwrap();
        let err = generate(
            LEAF_REQUEST,
            &ca_material.certificate_pem,
            other_key.encoded(),
            Duration::ZERO,
            &["signing"],
        )
        .unwrap_err();
        assert!(matches!(err, CertSmithError::ValidationError(_)));
    }

    #[test]
    fn test_undecodable_ca_material() {
        let ca_material = generate_ca(CA_REQUEST, Duration::ZERO).unwrap();
        let err = generate(
            LEAF_REQUEST,
            b"not a certificate",
            &ca_material.private_key_pem,
            Duration::ZERO,
            &["signing"],
        )
        .unwrap_err();
        assert!(matches!(err, CertSmithError::EncodingError(_)));

        let err = generate(
            LEAF_REQUEST,
            &ca_material.certificate_pem,
            b"not a key",
            Duration::ZERO,
            &["signing"],
        )
        .unwrap_err();
        assert!(matches!(err, CertSmithError::EncodingError(_)));
    }

    #[test]
    fn test_leaf_without_usage_fails() {
        let ca_material = generate_ca(CA_REQUEST, Duration::ZERO).unwrap();
        let err = generate(
            LEAF_REQUEST,
            &ca_material.certificate_pem,
            &ca_material.private_key_pem,
            Duration::ZERO,
            &["sever auth"],
        )
        .unwrap_err();
        assert_eq!(
            err,
            CertSmithError::ValidationError("no key usage(s) specified".to_string())
        );
    }

    #[test]
    fn test_usages_are_checked_before_key_generation() {
        let ca_material = generate_ca(CA_REQUEST, Duration::ZERO).unwrap();
        let started = std::time::Instant::now();
        let err = generate(
            b"keyAlgorithm: rsa\nkeySize: 8192\ncommonName: slow.example.com\n",
            &ca_material.certificate_pem,
            &ca_material.private_key_pem,
            Duration::ZERO,
            &["sever auth"],
        )
        .unwrap_err();
        assert_eq!(
            err,
            CertSmithError::ValidationError("no key usage(s) specified".to_string())
        );
        // an 8192-bit RSA key takes far longer than this to generate
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[test]
    fn test_p224_key_self_signs() {
        use pkcs8::LineEnding;

        let secret = p224::SecretKey::random(&mut rand_core::OsRng);
        let pem = secret.to_sec1_pem(LineEnding::LF).unwrap();
        let key = parse_private_key(pem.as_bytes()).unwrap();
        assert_eq!(key.size(), 256);

        let request = parse_certificate_request(CA_REQUEST).unwrap();
        let material = issue_self_signed(&request, &key, Duration::ZERO).unwrap();
        let ca = Certificate::from_pem(&material.certificate_pem).unwrap();
        ca.verify_issued_by(&ca).unwrap();
        assert_eq!(
            ca.inner.signature_algorithm.oid,
            const_oid::db::rfc5912::ECDSA_WITH_SHA_256
        );
    }
}
