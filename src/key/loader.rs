use pkcs8::{DecodePrivateKey, PrivateKeyInfo};
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::traits::PublicKeyParts;

use super::{Key, KeyAlgorithm, KeyPair};
use crate::error::{CertSmithError, Result};
use crate::pem_utils::pem_to_der;

/// Parses a PEM-encoded private key whose inner encoding is unknown.
///
/// PKCS#8 is tried first, then PKCS#1 (RSA) and finally SEC1 (EC); the first
/// encoding that decodes wins. The PEM label is not consulted. Key strength is
/// not checked, only structure.
pub fn parse_private_key(pem: &[u8]) -> Result<Key> {
    let der = pem_to_der(pem)?;

    let key_pair = parse_pkcs8(&der)
        .inspect(|_| tracing::debug!("loaded PKCS#8 private key"))
        .or_else(|| {
            RsaPrivateKey::from_pkcs1_der(&der)
                .ok()
                .map(|private| KeyPair::Rsa(Box::new(private)))
                .inspect(|_| tracing::debug!("loaded PKCS#1 private key"))
        })
        .or_else(|| parse_sec1(&der).inspect(|_| tracing::debug!("loaded SEC1 private key")))
        .ok_or_else(|| CertSmithError::EncodingError("cannot parse private key".to_string()))?;

    let (algorithm, size) = match &key_pair {
        KeyPair::Rsa(private) => (KeyAlgorithm::Rsa, private.n().bits()),
        // P-224 has no size of its own in the policy and takes the ECDSA default.
        KeyPair::EcdsaP224(_) => (KeyAlgorithm::Ecdsa, KeyAlgorithm::Ecdsa.default_size()),
        KeyPair::EcdsaP256(_) => (KeyAlgorithm::Ecdsa, 256),
        KeyPair::EcdsaP384(_) => (KeyAlgorithm::Ecdsa, 384),
        KeyPair::EcdsaP521(_) => (KeyAlgorithm::Ecdsa, 521),
    };

    Ok(Key::from_parts(algorithm, size, pem.to_vec(), key_pair))
}

fn parse_pkcs8(der: &[u8]) -> Option<KeyPair> {
    // Reject anything that is not a PrivateKeyInfo before trying each key type.
    PrivateKeyInfo::try_from(der).ok()?;

    if let Ok(private) = RsaPrivateKey::from_pkcs8_der(der) {
        return Some(KeyPair::Rsa(Box::new(private)));
    }
    if let Ok(secret) = p256::SecretKey::from_pkcs8_der(der) {
        return Some(KeyPair::EcdsaP256(secret));
    }
    if let Ok(secret) = p384::SecretKey::from_pkcs8_der(der) {
        return Some(KeyPair::EcdsaP384(secret));
    }
    if let Ok(secret) = p521::SecretKey::from_pkcs8_der(der) {
        return Some(KeyPair::EcdsaP521(secret));
    }
    p224::SecretKey::from_pkcs8_der(der)
        .ok()
        .map(KeyPair::EcdsaP224)
}

fn parse_sec1(der: &[u8]) -> Option<KeyPair> {
    if let Ok(secret) = p256::SecretKey::from_sec1_der(der) {
        return Some(KeyPair::EcdsaP256(secret));
    }
    if let Ok(secret) = p384::SecretKey::from_sec1_der(der) {
        return Some(KeyPair::EcdsaP384(secret));
    }
    if let Ok(secret) = p521::SecretKey::from_sec1_der(der) {
        return Some(KeyPair::EcdsaP521(secret));
    }
    p224::SecretKey::from_sec1_der(der)
        .ok()
        .map(KeyPair::EcdsaP224)
}
