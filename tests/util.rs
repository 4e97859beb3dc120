#![allow(dead_code)]

use std::time::Duration;

use certsmith::IssuedMaterial;
use certsmith::pem_utils::pem_to_der;

pub const CA_REQUEST: &[u8] = br#"
keyAlgorithm: ecdsa
commonName: myca.local
names:
  - C: CA
    ST: QC
    L: Montreal
    O: test org
"#;

pub const SERVER_REQUEST: &[u8] = br#"
keyAlgorithm: ecdsa
keySize: 384
commonName: server.myca.local
names:
  - O: test org
    OU: servers
hosts:
  - server.myca.local
  - admin@myca.local
  - https://server.myca.local
  - 10.1.0.1
  - "::1"
"#;

pub const CLIENT_REQUEST: &[u8] = br#"
keyAlgorithm: rsa
keySize: 2048
commonName: client.myca.local
"#;

pub fn generate_ca() -> IssuedMaterial {
    certsmith::generate_ca(CA_REQUEST, Duration::ZERO).unwrap()
}

/// DER bytes of the `CERTIFICATE` block in `material`, for x509-parser.
pub fn certificate_der(material: &IssuedMaterial) -> Vec<u8> {
    pem_to_der(&material.certificate_pem).unwrap()
}

pub fn write_debug_pem(name: &str, pem: &[u8]) {
    use std::io::Write;
    std::fs::create_dir_all(".debug_certs").unwrap();
    std::fs::File::create(format!(".debug_certs/{name}.pem"))
        .unwrap()
        .write_all(pem)
        .unwrap();
}
