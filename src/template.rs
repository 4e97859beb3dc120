use std::time::Duration as StdDuration;

use der::asn1::BitString;
use der::flagset::FlagSet;
use rand::TryRngCore;
use rand::rngs::OsRng;
use sha1::{Digest, Sha1};
use x509_cert::Version;
use x509_cert::certificate::TbsCertificateInner;
use x509_cert::ext::pkix::KeyUsages;
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::SignatureAlgorithm;
use crate::cert::extensions::{
    AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, ExtendedKeyUsageOption, KeyUsage,
    SubjectAltName, SubjectKeyIdentifier,
};
use crate::cert::params::{DistinguishedName, ExtensionParam, Validity};
use crate::cert::usage::{ResolvedUsage, resolve_usages};
use crate::error::{CertSmithError, Result};
use crate::hosts::CertificateHosts;
use crate::key::Key;
use crate::request::CertificateRequest;

/// Lifetime of a certificate when the caller asks for a zero expiration: ten
/// 365-day years.
pub const DEFAULT_CERTIFICATE_EXPIRATION: StdDuration = StdDuration::from_secs(10 * 8760 * 3600);

/// How far `notBefore` is moved into the past to tolerate verifier clock skew.
pub const CLOCK_SKEW_ALLOWANCE: StdDuration = StdDuration::from_secs(5 * 60);

/// Everything about a certificate except who signs it.
///
/// A template is built from a parsed request and the subject's key, and is
/// turned into a "To Be Signed" structure once the issuer is known.
///
/// # Fields
/// * `serial_number` - Random non-negative 63-bit serial.
/// * `subject` - The distinguished name of the certificate subject.
/// * `subject_public_key` - Public key info of the subject's key.
/// * `hosts` - Subject alternative names, already classified.
/// * `validity` - The certificate's validity period.
/// * `key_usage` - Key usage bits, possibly empty.
/// * `extended_key_usage` - Extended key usage purposes, possibly empty.
/// * `is_ca` - Whether the certificate may sign other certificates.
#[derive(Clone, Debug)]
pub struct CertificateTemplate {
    pub serial_number: u64,
    pub subject: DistinguishedName,
    pub subject_public_key: SubjectPublicKeyInfoOwned,
    pub hosts: CertificateHosts,
    pub validity: Validity,
    pub key_usage: FlagSet<KeyUsages>,
    pub extended_key_usage: Vec<ExtendedKeyUsageOption>,
    /// Always true; kept so the basic constraints extension is never omitted.
    pub basic_constraints_valid: bool,
    pub is_ca: bool,
}

/// Builds the template for `request` certifying `key`.
///
/// A zero `expiration` selects [`DEFAULT_CERTIFICATE_EXPIRATION`]. Fails with a
/// validation error when none of `usages` is a known usage name.
pub fn build_template<S: AsRef<str>>(
    request: &CertificateRequest,
    key: &Key,
    expiration: StdDuration,
    usages: &[S],
    is_ca: bool,
) -> Result<CertificateTemplate> {
    let usage = resolve_usages(usages)?;
    build_template_with_usage(request, key, expiration, usage, is_ca)
}

/// Same as [`build_template`], for usage names that were already resolved.
pub fn build_template_with_usage(
    request: &CertificateRequest,
    key: &Key,
    expiration: StdDuration,
    usage: ResolvedUsage,
    is_ca: bool,
) -> Result<CertificateTemplate> {
    let expiration = if expiration.is_zero() {
        DEFAULT_CERTIFICATE_EXPIRATION
    } else {
        expiration
    };
    let out_of_range = |_| {
        CertSmithError::ValidationError(format!(
            "certificate expiration {expiration:?} is out of range"
        ))
    };
    let expiration = time::Duration::try_from(expiration).map_err(out_of_range)?;
    let skew = time::Duration::try_from(CLOCK_SKEW_ALLOWANCE).map_err(out_of_range)?;
    let validity = Validity::starting_at(time::OffsetDateTime::now_utc(), skew, expiration)?;

    Ok(CertificateTemplate {
        serial_number: random_serial_number()?,
        subject: request.subject(),
        subject_public_key: key.public_key_info()?,
        hosts: CertificateHosts::classify(&request.hosts),
        validity,
        key_usage: usage.key_usage,
        extended_key_usage: usage.extended_key_usage,
        basic_constraints_valid: true,
        is_ca,
    })
}

fn random_serial_number() -> Result<u64> {
    let value = OsRng
        .try_next_u64()
        .map_err(|e| CertSmithError::CryptoError(format!("failed to generate serial number: {e}")))?;
    Ok(value >> 1)
}

impl CertificateTemplate {
    /// SHA-1 of the subject public key bits, as used for key identifiers.
    pub fn subject_key_id(&self) -> Vec<u8> {
        Sha1::digest(self.subject_public_key.subject_public_key.raw_bytes()).to_vec()
    }

    /// Extensions in the order they are written to the certificate.
    pub fn extensions(&self, authority_key_id: Option<Vec<u8>>) -> Result<Vec<ExtensionParam>> {
        let mut extensions = Vec::new();

        if !self.key_usage.is_empty() {
            extensions.push(ExtensionParam::from_extension(KeyUsage(self.key_usage), true)?);
        }

        if !self.extended_key_usage.is_empty() {
            let extended_key_usage = ExtendedKeyUsage {
                usage: self.extended_key_usage.clone(),
            };
            extensions.push(ExtensionParam::from_extension(extended_key_usage, false)?);
        }

        if self.basic_constraints_valid {
            let basic_constraints = BasicConstraints {
                is_ca: self.is_ca,
                max_path_length: None,
            };
            extensions.push(ExtensionParam::from_extension(basic_constraints, true)?);
        }

        if self.is_ca {
            let subject_key_id = SubjectKeyIdentifier(self.subject_key_id());
            extensions.push(ExtensionParam::from_extension(subject_key_id, false)?);
        }

        if let Some(key_identifier) = authority_key_id {
            let authority_key_id = AuthorityKeyIdentifier { key_identifier };
            extensions.push(ExtensionParam::from_extension(authority_key_id, false)?);
        }

        if !self.hosts.is_empty() {
            let san = SubjectAltName {
                hosts: self.hosts.clone(),
            };
            extensions.push(ExtensionParam::from_extension(san, false)?);
        }

        Ok(extensions)
    }

    /// Converts the template into a `TbsCertificateInner` for DER encoding.
    ///
    /// # Arguments
    /// * `issuer` - Name of the signing certificate's subject.
    /// * `signature_algorithm` - Algorithm of the issuer's signing key.
    /// * `authority_key_id` - Issuer's subject key identifier, if it has one.
    pub fn to_tbs_certificate_inner(
        &self,
        issuer: Name,
        signature_algorithm: SignatureAlgorithm,
        authority_key_id: Option<Vec<u8>>,
    ) -> Result<TbsCertificateInner> {
        let extensions = self
            .extensions(authority_key_id)?
            .iter()
            .map(ExtensionParam::to_x509_extension)
            .collect::<Result<Vec<_>>>()?;

        Ok(TbsCertificateInner {
            version: Version::V3,
            serial_number: SerialNumber::new(&self.serial_number.to_be_bytes())?,
            signature: signature_algorithm.into(),
            issuer,
            validity: self.validity.to_x509_validity()?,
            subject: self.subject.as_x509_name()?,
            subject_public_key_info: self.subject_public_key.clone(),
            issuer_unique_id: None,
            subject_unique_id: None,
            extensions: Some(extensions),
        })
    }
}

/// Wraps a signature in the bit string form a certificate carries.
pub(crate) fn signature_bits(signature: &[u8]) -> Result<BitString> {
    Ok(BitString::from_bytes(signature)?)
}
