use std::time::SystemTime;

use bon::Builder;
use const_oid::ObjectIdentifier;
use der::{Tag, Tagged};
use der::asn1::{Any, GeneralizedTime, PrintableStringRef, SetOfVec, UtcTime};
use time::{Duration, OffsetDateTime};
use x509_cert::attr::AttributeTypeAndValue;
use x509_cert::name::{RdnSequence, RelativeDistinguishedName};

use super::extensions::ToAndFromX509Extension;
use crate::error::{CertSmithError, Result};

/// Distinguished name of a certificate subject.
///
/// Every attribute but the common name and serial number may carry several
/// values; each value becomes its own relative distinguished name.
///
/// # Fields
/// * `country` - Countries (C).
/// * `province` - States or provinces (ST).
/// * `locality` - Localities or cities (L).
/// * `organization` - Organizations (O).
/// * `organizational_unit` - Organizational units (OU).
/// * `common_name` - The common name (CN), omitted when empty.
/// * `serial_number` - The subject serial number, omitted when empty.
#[derive(Clone, Debug, Builder, Default, PartialEq, Eq)]
pub struct DistinguishedName {
    #[builder(default)]
    pub country: Vec<String>,
    #[builder(default)]
    pub province: Vec<String>,
    #[builder(default)]
    pub locality: Vec<String>,
    #[builder(default)]
    pub organization: Vec<String>,
    #[builder(default)]
    pub organizational_unit: Vec<String>,
    #[builder(default)]
    pub common_name: String,
    #[builder(default)]
    pub serial_number: String,
}

impl DistinguishedName {
    /// Converts the distinguished name to an X.509 name.
    ///
    /// Attributes are emitted in the order C, ST, L, O, OU, CN, serialNumber.
    pub fn as_x509_name(&self) -> Result<x509_cert::name::Name> {
        let single = |value: &String| -> Vec<String> {
            if value.is_empty() {
                Vec::new()
            } else {
                vec![value.clone()]
            }
        };

        let attributes = [
            (const_oid::db::rfc4519::C, self.country.clone()),
            (const_oid::db::rfc4519::ST, self.province.clone()),
            (const_oid::db::rfc4519::L, self.locality.clone()),
            (const_oid::db::rfc4519::O, self.organization.clone()),
            (const_oid::db::rfc4519::OU, self.organizational_unit.clone()),
            (const_oid::db::rfc4519::CN, single(&self.common_name)),
            (const_oid::db::rfc4519::SERIAL_NUMBER, single(&self.serial_number)),
        ];

        let mut rdns = Vec::new();
        for (oid, values) in attributes {
            for value in values {
                let atv = AttributeTypeAndValue {
                    oid,
                    value: directory_string(&value)?,
                };
                rdns.push(RelativeDistinguishedName(SetOfVec::try_from(vec![atv])?));
            }
        }

        Ok(RdnSequence(rdns))
    }

    /// Reads the attributes this type knows about back out of an X.509 name.
    /// Unknown attributes and values that are not strings are skipped.
    pub fn from_x509_name(x509dn: &x509_cert::name::Name) -> Self {
        let mut dn = DistinguishedName::default();

        for rdn in x509dn.0.iter() {
            for attr in rdn.0.iter() {
                let Some(value) = decode_directory_string(&attr.value) else {
                    continue;
                };
                match attr.oid {
                    const_oid::db::rfc4519::C => dn.country.push(value),
                    const_oid::db::rfc4519::ST => dn.province.push(value),
                    const_oid::db::rfc4519::L => dn.locality.push(value),
                    const_oid::db::rfc4519::O => dn.organization.push(value),
                    const_oid::db::rfc4519::OU => dn.organizational_unit.push(value),
                    const_oid::db::rfc4519::CN => dn.common_name = value,
                    const_oid::db::rfc4519::SERIAL_NUMBER => dn.serial_number = value,
                    _ => {}
                }
            }
        }

        dn
    }
}

/// PrintableString when every character allows it, UTF8String otherwise.
fn directory_string(value: &str) -> Result<Any> {
    let tag = if PrintableStringRef::new(value).is_ok() {
        Tag::PrintableString
    } else {
        Tag::Utf8String
    };
    Ok(Any::new(tag, value.as_bytes())?)
}

fn decode_directory_string(value: &Any) -> Option<String> {
    match value.tag() {
        Tag::PrintableString | Tag::Utf8String | Tag::Ia5String | Tag::TeletexString => {
            String::from_utf8(value.value().to_vec()).ok()
        }
        _ => None,
    }
}

/// Certificate validity period.
///
/// This struct represents the `notBefore` and `notAfter` fields in a certificate.
///
/// # Fields
/// * `not_before` - The start of the validity period.
/// * `not_after` - The end of the validity period.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validity {
    pub not_before: OffsetDateTime,
    pub not_after: OffsetDateTime,
}

impl Validity {
    /// Creates a validity period around `now`: backdated by `skew` and lasting
    /// `expiration` from `now`.
    pub fn starting_at(now: OffsetDateTime, skew: Duration, expiration: Duration) -> Result<Self> {
        let out_of_range = || {
            CertSmithError::ValidationError(format!(
                "certificate expiration {expiration} is out of range"
            ))
        };
        Ok(Self {
            not_before: now.checked_sub(skew).ok_or_else(out_of_range)?,
            not_after: now.checked_add(expiration).ok_or_else(out_of_range)?,
        })
    }

    /// Encodes the period for a TBS certificate. Dates before 2050 use
    /// UTCTime, later ones GeneralizedTime.
    pub fn to_x509_validity(&self) -> Result<x509_cert::time::Validity> {
        Ok(x509_cert::time::Validity {
            not_before: x509_time(self.not_before)?,
            not_after: x509_time(self.not_after)?,
        })
    }
}

fn x509_time(at: OffsetDateTime) -> Result<x509_cert::time::Time> {
    let system_time = SystemTime::from(at);
    if at.year() < 2050 {
        Ok(x509_cert::time::Time::UtcTime(UtcTime::from_system_time(
            system_time,
        )?))
    } else {
        Ok(x509_cert::time::Time::GeneralTime(
            GeneralizedTime::from_system_time(system_time)?,
        ))
    }
}

/// Represents an X.509 extension.
///
/// This struct contains the OID, criticality, and value of an extension.
///
/// # Fields
/// * `oid` - The object identifier of the extension.
/// * `critical` - Indicates if the extension is critical.
/// * `value` - The DER-encoded value of the extension.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtensionParam {
    pub oid: ObjectIdentifier,
    pub critical: bool,
    /// DER-encoded extension value
    pub value: Vec<u8>,
}

impl ExtensionParam {
    /// Creates an `ExtensionParam` from a specific extension.
    pub fn from_extension<E: ToAndFromX509Extension>(extension: E, critical: bool) -> Result<Self> {
        Ok(Self {
            oid: E::OID,
            critical,
            value: extension.to_x509_extension_value()?,
        })
    }

    /// Decodes an `ExtensionParam` into a specific extension.
    pub fn to_extension<E: ToAndFromX509Extension>(&self) -> Result<E> {
        E::from_x509_extension_value(&self.value)
    }

    pub fn to_x509_extension(&self) -> Result<x509_cert::ext::Extension> {
        Ok(x509_cert::ext::Extension {
            extn_id: self.oid,
            critical: self.critical,
            extn_value: der::asn1::OctetString::new(self.value.clone())?,
        })
    }
}
