//! Declarative certificate requests.
//!
//! A request is a small YAML document naming the key to generate, the subject
//! and the hosts the certificate is for:
//!
//! ```yaml
//! keyAlgorithm: ecdsa
//! keySize: 384
//! commonName: test.example.com
//! names:
//!   - C: CA
//!     ST: QC
//!     L: Montreal
//!     O: test org
//!     OU: test org unit
//! hosts:
//!   - example.com
//!   - 10.1.0.1
//! ```

use der::Encode;
use der::asn1::SetOfVec;
use serde::Deserialize;
use x509_cert::attr::Attribute;
use x509_cert::ext::Extension;
use x509_cert::request::{CertReq, CertReqInfo, ExtensionReq};

use crate::cert::extensions::{BasicConstraints, SubjectAltName};
use crate::cert::params::{DistinguishedName, ExtensionParam};
use crate::error::{CertSmithError, Result};
use crate::hosts::CertificateHosts;
use crate::key::{self, Key, KeyAlgorithm};
use crate::pem_utils::der_to_pem;
use crate::template::signature_bits;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCertificateRequest {
    key_algorithm: Option<String>,
    key_size: Option<i64>,
    common_name: Option<String>,
    names: Option<Vec<RawCertificateName>>,
    hosts: Option<Vec<String>>,
    serial_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCertificateName {
    #[serde(rename = "C")]
    country: Option<String>,
    #[serde(rename = "ST")]
    province: Option<String>,
    #[serde(rename = "L")]
    locality: Option<String>,
    #[serde(rename = "O")]
    organization: Option<String>,
    #[serde(rename = "OU")]
    organizational_unit: Option<String>,
    #[serde(rename = "serialNumber")]
    serial_number: Option<String>,
}

/// One entry of a request's `names` list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CertificateName {
    pub country: String,
    pub province: String,
    pub locality: String,
    pub organization: String,
    pub organizational_unit: String,
    pub serial_number: String,
}

impl CertificateName {
    fn trim(&mut self) {
        for field in [
            &mut self.country,
            &mut self.province,
            &mut self.locality,
            &mut self.organization,
            &mut self.organizational_unit,
            &mut self.serial_number,
        ] {
            *field = field.trim().to_string();
        }
    }

    /// True when none of C, ST, L, O and OU is set. The serial number does not count.
    pub fn is_empty(&self) -> bool {
        self.country.is_empty()
            && self.province.is_empty()
            && self.locality.is_empty()
            && self.organization.is_empty()
            && self.organizational_unit.is_empty()
    }
}

impl From<RawCertificateName> for CertificateName {
    fn from(raw: RawCertificateName) -> Self {
        Self {
            country: raw.country.unwrap_or_default(),
            province: raw.province.unwrap_or_default(),
            locality: raw.locality.unwrap_or_default(),
            organization: raw.organization.unwrap_or_default(),
            organizational_unit: raw.organizational_unit.unwrap_or_default(),
            serial_number: raw.serial_number.unwrap_or_default(),
        }
    }
}

/// A validated certificate request.
///
/// Every string is trimmed, names that were empty after trimming are dropped
/// and the key algorithm and size are known to be compatible.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificateRequest {
    pub key_algorithm: KeyAlgorithm,
    /// Requested size in bits, `0` for the algorithm's default.
    pub key_size: usize,
    pub common_name: String,
    pub names: Vec<CertificateName>,
    /// Raw host strings in request order; see [`CertificateHosts::classify`].
    pub hosts: Vec<String>,
    pub serial_number: String,
}

/// Parses and validates a YAML certificate request.
pub fn parse_certificate_request(input: &[u8]) -> Result<CertificateRequest> {
    let raw: RawCertificateRequest = serde_yaml::from_slice(input)?;

    let key_size = match raw.key_size {
        None => 0,
        Some(size) => usize::try_from(size).map_err(|_| {
            CertSmithError::ValidationError(format!("invalid key size {size}"))
        })?,
    };
    let key_algorithm =
        key::validate_key(raw.key_algorithm.as_deref().unwrap_or_default(), key_size)?;

    let names = raw
        .names
        .unwrap_or_default()
        .into_iter()
        .map(|raw_name| {
            let mut name = CertificateName::from(raw_name);
            name.trim();
            name
        })
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>();

    let request = CertificateRequest {
        key_algorithm,
        key_size,
        common_name: raw.common_name.unwrap_or_default().trim().to_string(),
        names,
        hosts: raw
            .hosts
            .unwrap_or_default()
            .iter()
            .map(|host| host.trim().to_string())
            .collect(),
        serial_number: raw.serial_number.unwrap_or_default().trim().to_string(),
    };

    if request.common_name.is_empty() && request.names.is_empty() {
        return Err(CertSmithError::ValidationError(
            "no subject information provided".to_string(),
        ));
    }

    Ok(request)
}

impl CertificateRequest {
    /// The subject every certificate issued from this request carries.
    pub fn subject(&self) -> DistinguishedName {
        let collect = |field: fn(&CertificateName) -> &String| {
            self.names
                .iter()
                .map(field)
                .filter(|value| !value.is_empty())
                .cloned()
                .collect::<Vec<_>>()
        };

        DistinguishedName {
            country: collect(|name| &name.country),
            province: collect(|name| &name.province),
            locality: collect(|name| &name.locality),
            organization: collect(|name| &name.organization),
            organizational_unit: collect(|name| &name.organizational_unit),
            common_name: self.common_name.clone(),
            serial_number: self.serial_number.clone(),
        }
    }

    /// Generates a fresh key of the requested algorithm and size.
    pub fn generate_key(&self) -> Result<Key> {
        key::generate_key(self.key_algorithm, self.key_size)
    }

    /// Encodes a PKCS#10 `CERTIFICATE REQUEST` for this request, signed by `key`.
    ///
    /// The hosts are requested as a subject alternative name, followed by
    /// `extra_extensions` in the given order.
    pub fn to_csr_pem(&self, key: &Key, extra_extensions: &[ExtensionParam]) -> Result<Vec<u8>> {
        let hosts = CertificateHosts::classify(&self.hosts);
        let mut extensions: Vec<Extension> = Vec::new();
        if !hosts.is_empty() {
            let san = ExtensionParam::from_extension(SubjectAltName { hosts }, false)?;
            extensions.push(san.to_x509_extension()?);
        }
        for extension in extra_extensions {
            extensions.push(extension.to_x509_extension()?);
        }

        let mut attributes = SetOfVec::new();
        if !extensions.is_empty() {
            attributes.insert(Attribute::try_from(ExtensionReq(extensions))?)?;
        }

        let info = CertReqInfo {
            version: x509_cert::request::Version::V1,
            subject: self.subject().as_x509_name()?,
            public_key: key.public_key_info()?,
            attributes,
        };
        let signature = key.sign(&info.to_der()?)?;

        let csr = CertReq {
            info,
            algorithm: key.signature_algorithm().into(),
            signature: signature_bits(&signature)?,
        };
        Ok(der_to_pem(&csr.to_der()?, "CERTIFICATE REQUEST"))
    }
}

/// The critical `basicConstraints` extension marking a CSR as a CA request.
pub fn ca_extension() -> Result<ExtensionParam> {
    ExtensionParam::from_extension(
        BasicConstraints {
            is_ca: true,
            max_path_length: None,
        },
        true,
    )
}
