use super::{CryptoError, Sign};
use crate::protos::msp::SerializedIdentity;
use prost::Message;
use sha2::{Digest, Sha256, Sha384};
use std::{fmt, sync::Arc};

/// A network identity: the membership service provider that issued the
/// credentials plus the credential bytes (typically a certificate).
///
/// Both fields are captured by value at construction and only lent out by
/// reference, so a caller-held buffer can never mutate internal state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    msp_id: String,
    credentials: Vec<u8>,
}

impl Identity {
    pub fn new(msp_id: impl Into<String>, credentials: impl Into<Vec<u8>>) -> Self {
        Self {
            msp_id: msp_id.into(),
            credentials: credentials.into(),
        }
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    pub fn credentials(&self) -> &[u8] {
        &self.credentials
    }
}

/// Digest scheme applied to message bytes before signing, and used to derive
/// transaction IDs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Hasher {
    #[default]
    Sha256,
    Sha384,
    /// Pass the message through unhashed. Required for key kinds that sign
    /// the full message themselves (Ed25519); never the default.
    None,
}

impl Hasher {
    pub fn digest(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Hasher::Sha256 => Sha256::digest(message).to_vec(),
            Hasher::Sha384 => Sha384::digest(message).to_vec(),
            Hasher::None => message.to_vec(),
        }
    }
}

/// An [`Identity`] able to sign protocol messages.
///
/// The serialized creator bytes are derived exactly once at construction and
/// never change. The signer is optional: without one, [`Self::sign`] fails
/// with [`CryptoError::NoSignImplementation`], which is how purely offline
/// signing flows are supported.
#[derive(Clone)]
pub struct SigningIdentity {
    identity: Identity,
    creator: Vec<u8>,
    hasher: Hasher,
    signer: Option<Arc<dyn Sign>>,
}

impl SigningIdentity {
    pub fn new(identity: Identity) -> Self {
        let creator = SerializedIdentity {
            msp_id: identity.msp_id().to_string(),
            id_bytes: identity.credentials().to_vec(),
        }
        .encode_to_vec();

        Self {
            identity,
            creator,
            hasher: Hasher::default(),
            signer: None,
        }
    }

    pub fn with_signer(mut self, signer: Arc<dyn Sign>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_hasher(mut self, hasher: Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// The wire encoding of this identity, embedded as the creator field of
    /// every signature header. Pure and infallible.
    pub fn creator(&self) -> &[u8] {
        &self.creator
    }

    pub fn hash(&self, message: &[u8]) -> Vec<u8> {
        self.hasher.digest(message)
    }

    pub async fn sign(&self, digest: &[u8]) -> Result<Vec<u8>, CryptoError> {
        match &self.signer {
            Some(signer) => signer.sign(digest).await,
            None => Err(CryptoError::NoSignImplementation),
        }
    }
}

impl fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("identity", &self.identity)
            .field("hasher", &self.hasher)
            .field("signer", &self.signer.as_ref().map(|_| "dyn Sign"))
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn identity() -> Identity {
        Identity::new("Org1MSP", b"certificate".to_vec())
    }

    #[test]
    fn creator_is_deterministic() -> anyhow::Result<()> {
        let first = SigningIdentity::new(identity());
        let second = SigningIdentity::new(identity());
        assert_eq!(first.creator(), second.creator());
        Ok(())
    }

    #[test]
    fn creator_decodes_to_original_identity() -> anyhow::Result<()> {
        let signing_identity = SigningIdentity::new(identity());
        let decoded = SerializedIdentity::decode(signing_identity.creator())?;
        assert_eq!(decoded.msp_id, "Org1MSP");
        assert_eq!(decoded.id_bytes, b"certificate");
        Ok(())
    }

    #[test]
    fn default_hash_is_sha256() {
        let signing_identity = SigningIdentity::new(identity());
        let expected = Sha256::digest(b"message").to_vec();
        assert_eq!(signing_identity.hash(b"message"), expected);
    }

    #[test]
    fn none_hasher_passes_message_through() {
        let hasher = Hasher::None;
        assert_eq!(hasher.digest(b"message"), b"message");
    }

    #[tokio::test]
    async fn sign_without_signer_is_distinguished_error() {
        let signing_identity = SigningIdentity::new(identity());
        let result = signing_identity.sign(b"digest").await;
        assert!(matches!(result, Err(CryptoError::NoSignImplementation)));
    }
}
