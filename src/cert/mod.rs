pub mod extensions;
pub mod params;
pub mod usage;

use der::{Decode, DecodePem, Encode, EncodePem};
use extensions::ToAndFromX509Extension;
use params::{DistinguishedName, ExtensionParam};
use const_oid::AssociatedOid;
use rsa::pkcs1::DecodeRsaPublicKey;
use rsa::signature::Verifier;
use rsa::signature::hazmat::PrehashVerifier;
use sha2::Digest;
use x509_cert::certificate::CertificateInner;

use crate::error::{CertSmithError, Result};

/// Represents the supported signature algorithms for certificates.
///
/// This enum provides a mapping to the corresponding OIDs for each algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignatureAlgorithm {
    /// SHA-256 with RSA encryption.
    Sha256WithRSA,
    /// SHA-384 with RSA encryption.
    Sha384WithRSA,
    /// SHA-512 with RSA encryption.
    Sha512WithRSA,
    /// SHA-256 with ECDSA.
    Sha256WithECDSA,
    /// SHA-384 with ECDSA.
    Sha384WithECDSA,
    /// SHA-512 with ECDSA.
    Sha512WithECDSA,
}

impl SignatureAlgorithm {
    pub const fn oid(self) -> const_oid::ObjectIdentifier {
        match self {
            SignatureAlgorithm::Sha256WithRSA => const_oid::db::rfc5912::SHA_256_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha384WithRSA => const_oid::db::rfc5912::SHA_384_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha512WithRSA => const_oid::db::rfc5912::SHA_512_WITH_RSA_ENCRYPTION,
            SignatureAlgorithm::Sha256WithECDSA => const_oid::db::rfc5912::ECDSA_WITH_SHA_256,
            SignatureAlgorithm::Sha384WithECDSA => const_oid::db::rfc5912::ECDSA_WITH_SHA_384,
            SignatureAlgorithm::Sha512WithECDSA => const_oid::db::rfc5912::ECDSA_WITH_SHA_512,
        }
    }

    /// Maps an algorithm identifier OID back to the algorithm, if supported.
    pub fn from_oid(oid: const_oid::ObjectIdentifier) -> Option<Self> {
        [
            SignatureAlgorithm::Sha256WithRSA,
            SignatureAlgorithm::Sha384WithRSA,
            SignatureAlgorithm::Sha512WithRSA,
            SignatureAlgorithm::Sha256WithECDSA,
            SignatureAlgorithm::Sha384WithECDSA,
            SignatureAlgorithm::Sha512WithECDSA,
        ]
        .into_iter()
        .find(|algorithm| algorithm.oid() == oid)
    }
}

impl From<SignatureAlgorithm> for x509_cert::spki::AlgorithmIdentifierOwned {
    /// Converts a `SignatureAlgorithm` into an `AlgorithmIdentifierOwned`.
    ///
    /// RSA identifiers carry an explicit NULL parameter (RFC 4055), ECDSA ones
    /// carry none (RFC 5758).
    fn from(value: SignatureAlgorithm) -> Self {
        let parameters = match value {
            SignatureAlgorithm::Sha256WithRSA
            | SignatureAlgorithm::Sha384WithRSA
            | SignatureAlgorithm::Sha512WithRSA => Some(der::asn1::Any::from(der::asn1::AnyRef::NULL)),
            _ => None,
        };
        x509_cert::spki::AlgorithmIdentifierOwned {
            oid: value.oid(),
            parameters,
        }
    }
}

/// Represents an X.509 certificate.
///
/// This struct provides methods to encode the certificate into DER or PEM formats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Certificate {
    /// The inner representation of the certificate.
    pub inner: CertificateInner,
}

impl Certificate {
    /// Encodes the certificate into DER format.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        self.inner
            .to_der()
            .map_err(|e| CertSmithError::EncodingError(e.to_string()))
    }

    /// Encodes the certificate into a `CERTIFICATE` PEM block.
    pub fn to_pem(&self) -> Result<String> {
        self.inner
            .to_pem(pkcs8::LineEnding::LF)
            .map_err(|e| CertSmithError::EncodingError(e.to_string()))
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        let inner = x509_cert::Certificate::from_der(der)?;
        Ok(Self { inner })
    }

    /// Decodes a `CERTIFICATE` PEM block.
    pub fn from_pem(pem: &[u8]) -> Result<Self> {
        let inner = x509_cert::Certificate::from_pem(pem)?;
        Ok(Self { inner })
    }

    pub fn subject(&self) -> DistinguishedName {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.subject)
    }

    pub fn issuer(&self) -> DistinguishedName {
        DistinguishedName::from_x509_name(&self.inner.tbs_certificate.issuer)
    }

    /// All extensions of the certificate, in encoded order.
    pub fn extensions(&self) -> Vec<ExtensionParam> {
        self.inner
            .tbs_certificate
            .extensions
            .iter()
            .flatten()
            .map(|ext| ExtensionParam {
                oid: ext.extn_id,
                critical: ext.critical,
                value: ext.extn_value.as_bytes().to_vec(),
            })
            .collect()
    }

    /// Decodes the extension of type `E`, if the certificate carries one.
    pub fn extension<E: ToAndFromX509Extension>(&self) -> Result<Option<E>> {
        self.extensions()
            .iter()
            .find(|ext| ext.oid == E::OID)
            .map(|ext| ext.to_extension::<E>())
            .transpose()
    }

    /// Checks that this certificate's signature was made by the key in
    /// `issuer`'s subject public key info.
    pub fn verify_issued_by(&self, issuer: &Certificate) -> Result<()> {
        let tbs = self.inner.tbs_certificate.to_der()?;
        let signature = self.inner.signature.raw_bytes();
        let public_key = issuer
            .inner
            .tbs_certificate
            .subject_public_key_info
            .subject_public_key
            .raw_bytes();
        let issuer_curve = issuer
            .inner
            .tbs_certificate
            .subject_public_key_info
            .algorithm
            .parameters
            .as_ref()
            .and_then(|parameters| parameters.decode_as::<const_oid::ObjectIdentifier>().ok());

        let algorithm = SignatureAlgorithm::from_oid(self.inner.signature_algorithm.oid)
            .ok_or_else(|| {
                CertSmithError::EncodingError(format!(
                    "unsupported signature algorithm {}",
                    self.inner.signature_algorithm.oid
                ))
            })?;

        match algorithm {
            SignatureAlgorithm::Sha256WithECDSA if issuer_curve == Some(p224::NistP224::OID) => {
                let key = p224::ecdsa::VerifyingKey::from_sec1_bytes(public_key)?;
                let signature = p224::ecdsa::Signature::from_der(signature)?;
                key.verify_prehash(&sha2::Sha256::digest(&tbs), &signature)?;
            }
            SignatureAlgorithm::Sha256WithECDSA => {
                let key = p256::ecdsa::VerifyingKey::from_sec1_bytes(public_key)?;
                let signature = p256::ecdsa::Signature::from_der(signature)?;
                key.verify(&tbs, &signature)?;
            }
            SignatureAlgorithm::Sha384WithECDSA => {
                let key = p384::ecdsa::VerifyingKey::from_sec1_bytes(public_key)?;
                let signature = p384::ecdsa::Signature::from_der(signature)?;
                key.verify(&tbs, &signature)?;
            }
            SignatureAlgorithm::Sha512WithECDSA => {
                let key = p521::ecdsa::VerifyingKey::from_sec1_bytes(public_key)?;
                let signature = p521::ecdsa::Signature::from_der(signature)?;
                key.verify(&tbs, &signature)?;
            }
            SignatureAlgorithm::Sha256WithRSA => {
                verify_rsa::<sha2::Sha256>(public_key, &tbs, signature)?
            }
            SignatureAlgorithm::Sha384WithRSA => {
                verify_rsa::<sha2::Sha384>(public_key, &tbs, signature)?
            }
            SignatureAlgorithm::Sha512WithRSA => {
                verify_rsa::<sha2::Sha512>(public_key, &tbs, signature)?
            }
        }
        Ok(())
    }
}

fn verify_rsa<D>(public_key: &[u8], message: &[u8], signature: &[u8]) -> Result<()>
where
    D: sha2::Digest + const_oid::AssociatedOid,
{
    let public_key = rsa::RsaPublicKey::from_pkcs1_der(public_key)
        .map_err(|e| CertSmithError::EncodingError(e.to_string()))?;
    let verifying_key = rsa::pkcs1v15::VerifyingKey::<D>::new(public_key);
    let signature = rsa::pkcs1v15::Signature::try_from(signature)?;
    verifying_key.verify(message, &signature)?;
    Ok(())
}
