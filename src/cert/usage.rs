//! Lookup tables turning human-readable usage names into key usage bits and
//! extended key usage purposes.

use der::flagset::FlagSet;
use x509_cert::ext::pkix::KeyUsages;

use super::extensions::ExtendedKeyUsageOption;
use crate::error::{CertSmithError, Result};

/// Usage names that map to key usage bits.
pub static KEY_USAGES: &[(&str, KeyUsages)] = &[
    ("signing", KeyUsages::DigitalSignature),
    ("digital signature", KeyUsages::DigitalSignature),
    ("content commitment", KeyUsages::NonRepudiation),
    ("key encipherment", KeyUsages::KeyEncipherment),
    ("key agreement", KeyUsages::KeyAgreement),
    ("data encipherment", KeyUsages::DataEncipherment),
    ("cert sign", KeyUsages::KeyCertSign),
    ("crl sign", KeyUsages::CRLSign),
    ("encipher only", KeyUsages::EncipherOnly),
    ("decipher only", KeyUsages::DecipherOnly),
];

/// Usage names that map to extended key usage purposes.
pub static EXTENDED_KEY_USAGES: &[(&str, ExtendedKeyUsageOption)] = &[
    ("any", ExtendedKeyUsageOption::Any),
    ("server auth", ExtendedKeyUsageOption::ServerAuth),
    ("client auth", ExtendedKeyUsageOption::ClientAuth),
    ("code signing", ExtendedKeyUsageOption::CodeSigning),
    ("email protection", ExtendedKeyUsageOption::EmailProtection),
    ("s/mime", ExtendedKeyUsageOption::EmailProtection),
    ("ipsec end system", ExtendedKeyUsageOption::IpsecEndSystem),
    ("ipsec tunnel", ExtendedKeyUsageOption::IpsecTunnel),
    ("ipsec user", ExtendedKeyUsageOption::IpsecUser),
    ("timestamping", ExtendedKeyUsageOption::TimeStamping),
    ("ocsp signing", ExtendedKeyUsageOption::OcspSigning),
    ("microsoft sgc", ExtendedKeyUsageOption::MicrosoftServerGatedCrypto),
    ("netscape sgc", ExtendedKeyUsageOption::NetscapeServerGatedCrypto),
];

/// Usage the caller asked for, after dropping names neither table knows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUsage {
    pub key_usage: FlagSet<KeyUsages>,
    /// In request order, duplicates kept.
    pub extended_key_usage: Vec<ExtendedKeyUsageOption>,
}

impl ResolvedUsage {
    /// Looks every name up, key usage table first. Unknown names are skipped.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut key_usage = FlagSet::<KeyUsages>::default();
        let mut extended_key_usage = Vec::new();

        for name in names {
            let name = name.as_ref();
            if let Some((_, bit)) = KEY_USAGES.iter().find(|(known, _)| *known == name) {
                key_usage |= *bit;
            } else if let Some((_, purpose)) =
                EXTENDED_KEY_USAGES.iter().find(|(known, _)| *known == name)
            {
                extended_key_usage.push(*purpose);
            } else {
                tracing::warn!(usage = name, "ignoring unrecognized usage");
            }
        }

        Self {
            key_usage,
            extended_key_usage,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.key_usage.is_empty() && self.extended_key_usage.is_empty()
    }
}

/// Resolves `names`, failing when nothing usable is left.
pub fn resolve_usages<S: AsRef<str>>(names: &[S]) -> Result<ResolvedUsage> {
    let resolved = ResolvedUsage::from_names(names);
    if resolved.is_empty() {
        return Err(CertSmithError::ValidationError(
            "no key usage(s) specified".to_string(),
        ));
    }
    Ok(resolved)
}
