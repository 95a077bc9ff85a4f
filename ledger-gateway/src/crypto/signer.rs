use super::{CryptoError, Hasher, Sign};
use async_trait::async_trait;
use p256::ecdsa::signature::hazmat::PrehashSigner;
use pkcs8::{DecodePrivateKey, ObjectIdentifier, PrivateKeyInfo, SecretDocument};

const ID_EC_PUBLIC_KEY: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.2.1");
const SECP256R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.10045.3.1.7");
const SECP384R1: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.132.0.34");
const ED25519: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

/// A private key of one of the supported kinds.
///
/// ECDSA kinds sign a pre-hashed digest; Ed25519 signs the full message and
/// must be paired with [`Hasher::None`] upstream. Key kinds outside this set
/// are rejected at construction, naming the offending object identifier.
#[derive(Debug, Clone)]
pub enum PrivateKey {
    EcdsaP256(p256::ecdsa::SigningKey),
    EcdsaP384(p384::ecdsa::SigningKey),
    Ed25519(ed25519_dalek::SigningKey),
}

impl PrivateKey {
    pub fn from_pkcs8_pem(pem: &str) -> Result<Self, CryptoError> {
        let (_, document) = SecretDocument::from_pem(pem)
            .map_err(|error| CryptoError::Pkcs8(pkcs8::Error::Asn1(error)))?;
        Self::from_pkcs8_der(document.as_bytes())
    }

    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, CryptoError> {
        let info = PrivateKeyInfo::try_from(der).map_err(CryptoError::Pkcs8)?;
        let curve = if info.algorithm.oid == ID_EC_PUBLIC_KEY {
            Some(
                info.algorithm
                    .parameters_oid()
                    .map_err(|_| CryptoError::Pkcs8(pkcs8::Error::ParametersMalformed))?,
            )
        } else {
            None
        };

        match key_kind(info.algorithm.oid, curve)? {
            KeyKind::EcdsaP256 => Ok(Self::EcdsaP256(
                p256::ecdsa::SigningKey::from_pkcs8_der(der).map_err(CryptoError::Pkcs8)?,
            )),
            KeyKind::EcdsaP384 => Ok(Self::EcdsaP384(
                p384::ecdsa::SigningKey::from_pkcs8_der(der).map_err(CryptoError::Pkcs8)?,
            )),
            KeyKind::Ed25519 => Ok(Self::Ed25519(
                ed25519_dalek::SigningKey::from_pkcs8_der(der).map_err(CryptoError::Pkcs8)?,
            )),
        }
    }

    /// The digest scheme that must accompany this key kind.
    pub fn hasher(&self) -> Hasher {
        match self {
            PrivateKey::EcdsaP256(_) => Hasher::Sha256,
            PrivateKey::EcdsaP384(_) => Hasher::Sha384,
            PrivateKey::Ed25519(_) => Hasher::None,
        }
    }

    pub fn signer(self) -> PrivateKeySigner {
        PrivateKeySigner(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyKind {
    EcdsaP256,
    EcdsaP384,
    Ed25519,
}

fn key_kind(
    algorithm: ObjectIdentifier,
    curve: Option<ObjectIdentifier>,
) -> Result<KeyKind, CryptoError> {
    if algorithm == ED25519 {
        return Ok(KeyKind::Ed25519);
    }
    if algorithm == ID_EC_PUBLIC_KEY {
        return match curve {
            Some(curve) if curve == SECP256R1 => Ok(KeyKind::EcdsaP256),
            Some(curve) if curve == SECP384R1 => Ok(KeyKind::EcdsaP384),
            Some(curve) => Err(CryptoError::UnsupportedKey(curve.to_string())),
            None => Err(CryptoError::UnsupportedKey(algorithm.to_string())),
        };
    }
    Err(CryptoError::UnsupportedKey(algorithm.to_string()))
}

/// [`Sign`] implementation over a software [`PrivateKey`].
#[derive(Debug, Clone)]
pub struct PrivateKeySigner(PrivateKey);

#[async_trait]
impl Sign for PrivateKeySigner {
    async fn sign(&self, digest: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match &self.0 {
            PrivateKey::EcdsaP256(key) => {
                let signature: p256::ecdsa::Signature = key.sign_prehash(digest)?;
                Ok(canonicalize_p256(signature))
            }
            PrivateKey::EcdsaP384(key) => {
                let signature: p384::ecdsa::Signature = key.sign_prehash(digest)?;
                Ok(canonicalize_p384(signature))
            }
            PrivateKey::Ed25519(key) => {
                use ed25519_dalek::Signer;
                // Full-message signing; `digest` is the unhashed message when
                // paired with `Hasher::None` as required.
                Ok(key.sign(digest).to_bytes().to_vec())
            }
        }
    }
}

/// Normalizes `s` to the low half-order and encodes as DER, so a signature
/// has exactly one acceptable encoding. Downstream systems may de-duplicate
/// by raw signature bytes.
pub(crate) fn canonicalize_p256(signature: p256::ecdsa::Signature) -> Vec<u8> {
    let signature = signature.normalize_s().unwrap_or(signature);
    signature.to_der().as_bytes().to_vec()
}

pub(crate) fn canonicalize_p384(signature: p384::ecdsa::Signature) -> Vec<u8> {
    let signature = signature.normalize_s().unwrap_or(signature);
    signature.to_der().as_bytes().to_vec()
}

#[cfg(test)]
mod test {
    use super::*;
    use p256::ecdsa::signature::hazmat::PrehashVerifier;
    use rand::{rngs::OsRng, RngCore};

    #[tokio::test]
    async fn p256_signatures_are_low_s() -> anyhow::Result<()> {
        let key = p256::ecdsa::SigningKey::random(&mut OsRng);
        let verifying_key = *key.verifying_key();
        let signer = PrivateKey::EcdsaP256(key).signer();

        for _ in 0..1000 {
            let mut digest = [0u8; 32];
            OsRng.fill_bytes(&mut digest);

            let der = signer.sign(&digest).await?;
            let signature = p256::ecdsa::Signature::from_der(&der)?;
            assert!(
                signature.normalize_s().is_none(),
                "signature s exceeds curve half-order"
            );
            verifying_key.verify_prehash(&digest, &signature)?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn p384_signatures_are_low_s() -> anyhow::Result<()> {
        let key = p384::ecdsa::SigningKey::random(&mut OsRng);
        let verifying_key = *key.verifying_key();
        let signer = PrivateKey::EcdsaP384(key).signer();

        for _ in 0..100 {
            let mut digest = [0u8; 48];
            OsRng.fill_bytes(&mut digest);

            let der = signer.sign(&digest).await?;
            let signature = p384::ecdsa::Signature::from_der(&der)?;
            assert!(signature.normalize_s().is_none());
            verifying_key.verify_prehash(&digest, &signature)?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn ed25519_signs_full_message() -> anyhow::Result<()> {
        use ed25519_dalek::Verifier;

        let key = ed25519_dalek::SigningKey::generate(&mut OsRng);
        let verifying_key = key.verifying_key();
        let signer = PrivateKey::Ed25519(key).signer();

        let message = b"full message, not a digest".to_vec();
        let signature_bytes = signer.sign(&message).await?;
        let signature = ed25519_dalek::Signature::from_slice(&signature_bytes)?;
        verifying_key.verify(&message, &signature)?;
        Ok(())
    }

    #[test]
    fn pem_round_trip_dispatches_on_curve() -> anyhow::Result<()> {
        use p256::pkcs8::EncodePrivateKey;

        let key = p256::ecdsa::SigningKey::random(&mut OsRng);
        let pem = key.to_pkcs8_pem(pkcs8::LineEnding::LF)?;

        let private_key = PrivateKey::from_pkcs8_pem(&pem)?;
        assert!(matches!(private_key, PrivateKey::EcdsaP256(_)));
        assert_eq!(private_key.hasher(), Hasher::Sha256);
        Ok(())
    }

    #[test]
    fn unsupported_curve_is_rejected_by_name() {
        let secp256k1 = ObjectIdentifier::new_unwrap("1.3.132.0.10");
        let result = key_kind(ID_EC_PUBLIC_KEY, Some(secp256k1));
        match result {
            Err(CryptoError::UnsupportedKey(oid)) => assert_eq!(oid, "1.3.132.0.10"),
            other => panic!("expected UnsupportedKey, got {other:?}"),
        }
    }

    #[test]
    fn unsupported_algorithm_is_rejected_by_name() {
        let rsa = ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.1");
        let result = key_kind(rsa, None);
        match result {
            Err(CryptoError::UnsupportedKey(oid)) => assert_eq!(oid, "1.2.840.113549.1.1.1"),
            other => panic!("expected UnsupportedKey, got {other:?}"),
        }
    }
}
