use std::net::IpAddr;
use std::sync::LazyLock;

use regex::Regex;
use url::Url;

// dot-atom local part and domain, as in RFC 5322 addr-spec.
static EMAIL_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[^<>]*<)?([A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*)(?:>)?$",
    )
    .expect("email pattern is valid")
});

/// Hosts of a request split by the kind of subject alternative name they become.
///
/// Each list keeps the order the hosts were given in.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CertificateHosts {
    pub dns_names: Vec<String>,
    pub email_addresses: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
    /// Written to the certificate exactly as requested.
    pub uris: Vec<String>,
}

impl CertificateHosts {
    /// Classifies every host independently: IP address first, then email
    /// address, then absolute URI. Anything else is kept as a DNS name
    /// without further checks. A URI only has to parse; the host string
    /// itself is kept, not the parsed form.
    pub fn classify<S: AsRef<str>>(hosts: &[S]) -> Self {
        let mut out = Self::default();
        for host in hosts {
            let host = host.as_ref();
            if let Ok(ip) = host.parse::<IpAddr>() {
                out.ip_addresses.push(ip);
            } else if let Some(email) = parse_email_address(host) {
                out.email_addresses.push(email);
            } else if Url::parse(host).is_ok() {
                out.uris.push(host.to_string());
            } else {
                out.dns_names.push(host.to_string());
            }
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.dns_names.is_empty()
            && self.email_addresses.is_empty()
            && self.ip_addresses.is_empty()
            && self.uris.is_empty()
    }
}

/// Returns the bare address of `local@domain` or `Name <local@domain>`.
fn parse_email_address(host: &str) -> Option<String> {
    let captures = EMAIL_ADDRESS.captures(host)?;
    // An opening bracket needs its closing one and vice versa.
    if host.contains('<') != host.ends_with('>') {
        return None;
    }
    Some(captures[1].to_string())
}
