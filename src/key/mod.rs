pub mod algorithm;
pub mod loader;

pub use algorithm::{KeyAlgorithm, MAX_RSA_KEY_SIZE, MIN_RSA_KEY_SIZE, validate_key};
pub use loader::parse_private_key;

use const_oid::ObjectIdentifier;
use pkcs8::LineEnding;
use rand_core::OsRng;
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::signature::hazmat::PrehashSigner;
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha2::{Digest, Sha256, Sha384, Sha512};
use x509_cert::spki::SubjectPublicKeyInfoOwned;

use crate::cert::SignatureAlgorithm;
use crate::error::{CertSmithError, Result};

/// The private half of a key, one variant per supported curve or modulus.
///
/// P-224 keys are never generated; they only come from the loader.
#[derive(Clone, Debug)]
pub enum KeyPair {
    Rsa(Box<RsaPrivateKey>),
    EcdsaP224(p224::SecretKey),
    EcdsaP256(p256::SecretKey),
    EcdsaP384(p384::SecretKey),
    EcdsaP521(p521::SecretKey),
}

impl KeyPair {
    /// Encodes the public half as a SubjectPublicKeyInfo.
    pub fn as_spki(&self) -> Result<SubjectPublicKeyInfoOwned> {
        let spki = match self {
            KeyPair::Rsa(private) => SubjectPublicKeyInfoOwned::from_key(private.to_public_key())?,
            KeyPair::EcdsaP224(secret) => SubjectPublicKeyInfoOwned::from_key(secret.public_key())?,
            KeyPair::EcdsaP256(secret) => SubjectPublicKeyInfoOwned::from_key(secret.public_key())?,
            KeyPair::EcdsaP384(secret) => SubjectPublicKeyInfoOwned::from_key(secret.public_key())?,
            KeyPair::EcdsaP521(secret) => SubjectPublicKeyInfoOwned::from_key(secret.public_key())?,
        };
        Ok(spki)
    }

    /// Signs `data` with the digest matching the key. ECDSA signatures are
    /// returned DER-encoded, RSA signatures use PKCS#1 v1.5.
    pub fn sign_data(&self, data: &[u8], algorithm: SignatureAlgorithm) -> Result<Vec<u8>> {
        match (self, algorithm) {
            (KeyPair::Rsa(private), SignatureAlgorithm::Sha256WithRSA) => {
                let signing_key = rsa::pkcs1v15::SigningKey::<Sha256>::new(*private.clone());
                Ok(signing_key.try_sign(data)?.to_vec())
            }
            (KeyPair::Rsa(private), SignatureAlgorithm::Sha384WithRSA) => {
                let signing_key = rsa::pkcs1v15::SigningKey::<Sha384>::new(*private.clone());
                Ok(signing_key.try_sign(data)?.to_vec())
            }
            (KeyPair::Rsa(private), SignatureAlgorithm::Sha512WithRSA) => {
                let signing_key = rsa::pkcs1v15::SigningKey::<Sha512>::new(*private.clone());
                Ok(signing_key.try_sign(data)?.to_vec())
            }
            (KeyPair::EcdsaP224(secret), SignatureAlgorithm::Sha256WithECDSA) => {
                let signing_key = p224::ecdsa::SigningKey::from(secret);
                let signature: p224::ecdsa::Signature =
                    signing_key.sign_prehash(&Sha256::digest(data))?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            (KeyPair::EcdsaP256(secret), SignatureAlgorithm::Sha256WithECDSA) => {
                let signing_key = p256::ecdsa::SigningKey::from(secret);
                let signature: p256::ecdsa::Signature = signing_key.try_sign(data)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            (KeyPair::EcdsaP384(secret), SignatureAlgorithm::Sha384WithECDSA) => {
                let signing_key = p384::ecdsa::SigningKey::from(secret);
                let signature: p384::ecdsa::Signature = signing_key.try_sign(data)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            (KeyPair::EcdsaP521(secret), SignatureAlgorithm::Sha512WithECDSA) => {
                let signing_key = p521::ecdsa::SigningKey::from_bytes(&secret.to_bytes())?;
                let signature: p521::ecdsa::Signature = signing_key.try_sign(data)?;
                Ok(signature.to_der().as_bytes().to_vec())
            }
            (_, algorithm) => Err(CertSmithError::CryptoError(format!(
                "{algorithm:?} cannot be produced by this key"
            ))),
        }
    }
}

/// A generated or loaded private key together with its PEM encoding.
///
/// The PEM bytes are the only durable artifact; the handle is consumed by
/// template building and signing.
#[derive(Clone, Debug)]
pub struct Key {
    algorithm: KeyAlgorithm,
    size: usize,
    encoded: Vec<u8>,
    key_pair: KeyPair,
}

impl Key {
    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    /// Effective key size in bits.
    pub fn size(&self) -> usize {
        self.size
    }

    /// PEM-encoded private key.
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    pub fn key_pair(&self) -> &KeyPair {
        &self.key_pair
    }

    pub fn public_key_info(&self) -> Result<SubjectPublicKeyInfoOwned> {
        self.key_pair.as_spki()
    }

    /// Algorithm OID carried in the public key info.
    pub fn public_key_algorithm(&self) -> ObjectIdentifier {
        match self.algorithm {
            KeyAlgorithm::Ecdsa => const_oid::db::rfc5912::ID_EC_PUBLIC_KEY,
            KeyAlgorithm::Rsa => const_oid::db::rfc5912::RSA_ENCRYPTION,
        }
    }

    pub fn signature_algorithm(&self) -> SignatureAlgorithm {
        self.algorithm.signature_algorithm(self.size)
    }

    /// Signs `data` with this key's own signature algorithm.
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.key_pair.sign_data(data, self.signature_algorithm())
    }

    pub(crate) fn from_parts(
        algorithm: KeyAlgorithm,
        size: usize,
        encoded: Vec<u8>,
        key_pair: KeyPair,
    ) -> Self {
        Self {
            algorithm,
            size,
            encoded,
            key_pair,
        }
    }
}

/// Generates a fresh key for `algorithm`. A `size` of `0` selects the
/// algorithm's default.
pub fn generate_key(algorithm: KeyAlgorithm, size: usize) -> Result<Key> {
    algorithm.validate_size(size)?;
    let size = algorithm.resolve_size(size);
    tracing::debug!(%algorithm, size, "generating key");

    match algorithm {
        KeyAlgorithm::Ecdsa => generate_ecdsa_key(size),
        KeyAlgorithm::Rsa => generate_rsa_key(size),
    }
}

fn generate_ecdsa_key(size: usize) -> Result<Key> {
    let mut rng = OsRng;
    let (key_pair, encoded) = match size {
        256 => {
            let secret = p256::SecretKey::random(&mut rng);
            let encoded = secret.to_sec1_pem(LineEnding::LF).map_err(encoding_error)?;
            (KeyPair::EcdsaP256(secret), encoded)
        }
        384 => {
            let secret = p384::SecretKey::random(&mut rng);
            let encoded = secret.to_sec1_pem(LineEnding::LF).map_err(encoding_error)?;
            (KeyPair::EcdsaP384(secret), encoded)
        }
        521 => {
            let secret = p521::SecretKey::random(&mut rng);
            let encoded = secret.to_sec1_pem(LineEnding::LF).map_err(encoding_error)?;
            (KeyPair::EcdsaP521(secret), encoded)
        }
        _ => unreachable!("unexpected ecdsa key size {size}"),
    };

    Ok(Key::from_parts(
        KeyAlgorithm::Ecdsa,
        size,
        encoded.as_bytes().to_vec(),
        key_pair,
    ))
}

fn generate_rsa_key(size: usize) -> Result<Key> {
    let mut rng = OsRng;
    let private = RsaPrivateKey::new(&mut rng, size)?;
    let encoded = private
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(encoding_error)?;

    Ok(Key::from_parts(
        KeyAlgorithm::Rsa,
        size,
        encoded.as_bytes().to_vec(),
        KeyPair::Rsa(Box::new(private)),
    ))
}

fn encoding_error(err: impl std::fmt::Display) -> CertSmithError {
    CertSmithError::EncodingError(err.to_string())
}
