//! Identity and signing primitives for gateway protocol messages.
//!
//! Everything that produces or is covered by a signature lives here: the
//! serialized creator identity, the digest schemes, software private-key
//! signers, and hardware-module signers. All ECDSA output is canonicalized
//! to low-S DER so a given signature has exactly one encoding.

use async_trait::async_trait;
use thiserror::Error;

mod hsm;
mod identity;
mod signer;

pub use hsm::{
    HsmError, HsmModule, HsmSession, HsmSigner, HsmSignerFactory, HsmSignerOptions, KeyHandle,
    LoginStatus, SlotId, SlotInfo,
};
pub use identity::{Hasher, Identity, SigningIdentity};
pub use signer::{PrivateKey, PrivateKeySigner};

#[derive(Debug, Error)]
pub enum CryptoError {
    /// Requested a signature but no signer was configured. Callers using the
    /// offline-signing flow match on this variant to detect that they must
    /// sign externally.
    #[error("no signing implementation configured")]
    NoSignImplementation,

    /// Key algorithm or curve this implementation cannot sign with, named by
    /// its object identifier.
    #[error("unsupported private key algorithm or curve: {0}")]
    UnsupportedKey(String),

    // Wrapped errors
    #[error(transparent)]
    Hsm(#[from] HsmError),
    #[error(transparent)]
    Pkcs8(#[from] pkcs8::Error),
    #[error(transparent)]
    Signature(#[from] p256::ecdsa::Error),
}

/// An asymmetric signing function over a message digest.
///
/// Implementations may perform I/O (for example a hardware round trip) and
/// are invoked through a shared reference, so they manage their own state.
/// The digest passed in is whatever the paired [`Hasher`] produced; for
/// [`Hasher::None`] that is the full message.
#[async_trait]
pub trait Sign: Send + Sync {
    async fn sign(&self, digest: &[u8]) -> Result<Vec<u8>, CryptoError>;
}
