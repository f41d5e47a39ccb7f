//! The stored auth token and user email.
//!
//! # Design
//! `CredentialStore` is a single-writer, multi-reader register. Reads are
//! lock-free snapshots from a `tokio::sync::watch` channel, which also gives
//! every interested party a change notification through
//! [`CredentialStore::subscribe`]. Writes are serialized by a mutex and
//! persisted through a [`CredentialVault`] (the platform keychain in the app,
//! [`MemoryVault`] here).

use std::fmt;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::types::LoginCallback;

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub token: String,
    pub email: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("email", &self.email)
            .finish()
    }
}

impl From<LoginCallback> for Credentials {
    fn from(callback: LoginCallback) -> Self {
        Self {
            token: callback.token,
            email: callback.email,
        }
    }
}

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("credential vault unavailable: {0}")]
    Unavailable(String),
}

/// Device-scoped persistence for one set of credentials.
pub trait CredentialVault: Send + Sync {
    fn load(&self) -> Result<Option<Credentials>, VaultError>;
    fn save(&self, credentials: &Credentials) -> Result<(), VaultError>;
    fn clear(&self) -> Result<(), VaultError>;
}

/// Vault that forgets everything when the process exits.
#[derive(Default)]
pub struct MemoryVault {
    slot: Mutex<Option<Credentials>>,
}

impl MemoryVault {
    pub fn with(credentials: Credentials) -> Self {
        Self {
            slot: Mutex::new(Some(credentials)),
        }
    }
}

impl CredentialVault for MemoryVault {
    fn load(&self) -> Result<Option<Credentials>, VaultError> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, credentials: &Credentials) -> Result<(), VaultError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), VaultError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Shared holder of the signed-in user's token and email.
///
/// Writes are serialized and always reach readers; a [`CredentialVault`] that
/// fails to persist them is reported to the caller and logged.
pub struct CredentialStore {
    state: watch::Sender<Option<Credentials>>,
    vault: Box<dyn CredentialVault>,
    writer: Mutex<()>,
}

impl CredentialStore {
    /// Open the store, loading whatever `vault` already holds.
    pub fn open(vault: impl CredentialVault + 'static) -> Result<Self, VaultError> {
        let initial = vault.load()?;
        debug!(signed_in = initial.is_some(), "opened credential store");
        let (state, _) = watch::channel(initial);
        Ok(Self {
            state,
            vault: Box::new(vault),
            writer: Mutex::new(()),
        })
    }

    pub fn in_memory() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            state,
            vault: Box::new(MemoryVault::default()),
            writer: Mutex::new(()),
        }
    }

    pub fn read(&self) -> Option<Credentials> {
        self.state.borrow().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.state.borrow().as_ref().map(|c| c.token.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.state.borrow().is_some()
    }

    /// Replace the stored credentials and notify subscribers.
    ///
    /// The in-memory value is updated even if persisting it fails; the error
    /// is returned so the caller can decide whether that matters.
    pub fn write(&self, credentials: Credentials) -> Result<(), VaultError> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let persisted = self.vault.save(&credentials);
        if let Err(error) = &persisted {
            warn!(%error, "failed to persist credentials");
        }
        self.state.send_replace(Some(credentials));
        persisted
    }

    /// Forget the stored credentials and notify subscribers.
    pub fn clear(&self) -> Result<(), VaultError> {
        let _guard = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let cleared = self.vault.clear();
        if let Err(error) = &cleared {
            warn!(%error, "failed to clear persisted credentials");
        }
        self.state.send_replace(None);
        cleared
    }

    /// Receiver that observes every later write and clear.
    pub fn subscribe(&self) -> watch::Receiver<Option<Credentials>> {
        self.state.subscribe()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("signed_in", &self.is_signed_in())
            .finish_non_exhaustive()
    }
}
