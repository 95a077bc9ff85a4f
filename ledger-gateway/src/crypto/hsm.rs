//! Signers backed by a hardware security module.
//!
//! The module handle is an explicit, caller-owned resource: the factory owns
//! it for its lifetime and [`HsmSignerFactory::dispose`] releases it exactly
//! once, after which every signer it produced is invalid. Vendor PKCS#11
//! wiring implements [`HsmModule`]/[`HsmSession`] outside this crate; the
//! factory only encodes the acquisition protocol and its error ladder.

use super::{signer, CryptoError, Sign};
use async_trait::async_trait;
use std::sync::Mutex;
use thiserror::Error;
use tracing::debug;

pub type SlotId = u64;
pub type KeyHandle = u64;

/// A slot reported by the module, identified to callers by its token label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotInfo {
    pub id: SlotId,
    pub token_label: String,
}

/// Outcome of a session login. An already-authenticated session is success,
/// not an error: factories are commonly re-run against a live token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStatus {
    LoggedIn,
    AlreadyLoggedIn,
}

#[derive(Debug, Error)]
pub enum HsmError {
    #[error("no slots available in HSM")]
    NoSlots,
    #[error("no token found with label {0:?}")]
    TokenNotFound(String),
    #[error("HSM authentication failed")]
    AuthenticationFailed,
    #[error("no key object found with label {0:?}")]
    KeyNotFound(String),
    #[error("HSM module error: {0}")]
    Module(String),
}

/// A loaded and initialized hardware module. Implementations perform the
/// one-time library initialization in their constructor.
pub trait HsmModule: Send + Sync {
    fn slots(&self) -> Result<Vec<SlotInfo>, HsmError>;
    fn open_session(&self, slot: SlotId) -> Result<Box<dyn HsmSession>, HsmError>;
    /// Releases the module. Called exactly once, by
    /// [`HsmSignerFactory::dispose`].
    fn finalize(&self) -> Result<(), HsmError>;
}

/// An open session with a token. `close` must be safe to call after any
/// partial sequence of operations.
pub trait HsmSession: Send {
    /// Authenticates the session. Implementations map the module's
    /// "already logged in" condition to [`LoginStatus::AlreadyLoggedIn`]
    /// rather than an error.
    fn login(&mut self, pin: &str) -> Result<LoginStatus, HsmError>;
    fn find_initialize(&mut self, key_label: &str) -> Result<(), HsmError>;
    fn find_next(&mut self) -> Result<Option<KeyHandle>, HsmError>;
    fn find_finalize(&mut self) -> Result<(), HsmError>;
    /// Starts a fresh signing operation with the given key.
    fn sign_init(&mut self, key: KeyHandle) -> Result<(), HsmError>;
    /// Signs a pre-hashed digest, returning the raw `r ‖ s` signature.
    fn sign(&mut self, digest: &[u8]) -> Result<Vec<u8>, HsmError>;
    fn close(&mut self);
}

#[derive(Debug, Clone)]
pub struct HsmSignerOptions {
    pub token_label: String,
    pub pin: String,
    pub key_label: String,
}

/// Produces [`HsmSigner`]s from an owned hardware module.
pub struct HsmSignerFactory {
    module: Box<dyn HsmModule>,
}

impl HsmSignerFactory {
    pub fn new(module: Box<dyn HsmModule>) -> Self {
        Self { module }
    }

    /// Opens a session against the token named in `options`, authenticates,
    /// and locates the signing key by label.
    ///
    /// Each failure is distinguishable: [`HsmError::NoSlots`],
    /// [`HsmError::TokenNotFound`], [`HsmError::AuthenticationFailed`], and
    /// [`HsmError::KeyNotFound`]. The last releases the find cursor and the
    /// partially-opened session before propagating.
    pub fn signer(&self, options: &HsmSignerOptions) -> Result<HsmSigner, HsmError> {
        let slots = self.module.slots()?;
        if slots.is_empty() {
            return Err(HsmError::NoSlots);
        }
        let slot = slots
            .iter()
            .find(|slot| slot.token_label == options.token_label)
            .ok_or_else(|| HsmError::TokenNotFound(options.token_label.clone()))?;

        let mut session = self.module.open_session(slot.id)?;
        if let Err(error) = session.login(&options.pin) {
            session.close();
            return Err(error);
        }

        if let Err(error) = session.find_initialize(&options.key_label) {
            session.close();
            return Err(error);
        }
        let found = match session.find_next() {
            Ok(found) => found,
            Err(error) => {
                let _ = session.find_finalize();
                session.close();
                return Err(error);
            }
        };
        if let Err(error) = session.find_finalize() {
            session.close();
            return Err(error);
        }

        match found {
            Some(key) => {
                debug!(token_label = %options.token_label, "HSM signer acquired");
                Ok(HsmSigner {
                    session: Mutex::new(session),
                    key,
                })
            }
            None => {
                session.close();
                Err(HsmError::KeyNotFound(options.key_label.clone()))
            }
        }
    }

    /// Releases the module. All signers produced by this factory are invalid
    /// afterwards.
    pub fn dispose(self) -> Result<(), HsmError> {
        self.module.finalize()
    }
}

/// [`Sign`] implementation over an open HSM session and a located key.
///
/// Each call re-initializes the sign operation, so the signer is stateless
/// from the caller's perspective. Output is canonical low-S DER, identical
/// to the software ECDSA path.
pub struct HsmSigner {
    session: Mutex<Box<dyn HsmSession>>,
    key: KeyHandle,
}

impl HsmSigner {
    /// Closes the underlying session. Must be invoked when the signer is no
    /// longer needed.
    pub fn close(self) {
        if let Ok(mut session) = self.session.into_inner() {
            session.close();
        }
    }
}

#[async_trait]
impl Sign for HsmSigner {
    async fn sign(&self, digest: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let raw = {
            let mut session = self
                .session
                .lock()
                .map_err(|_| HsmError::Module("signer session mutex poisoned".into()))?;
            session.sign_init(self.key)?;
            session.sign(digest)?
        };
        let signature = p256::ecdsa::Signature::from_slice(&raw)?;
        Ok(signer::canonicalize_p256(signature))
    }
}
