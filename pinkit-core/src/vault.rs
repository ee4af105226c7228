//! Access to the stored PIN.
//!
//! `PinVault` is the only component that touches the PIN entry of the
//! [`SecretStore`]. Every gate and flow receives the same `Arc<PinVault>` so
//! that they observe one enrollment epoch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::{Pin, PinKitError, SecretStore};

/// Key under which the PIN is kept in the secret store.
pub const PIN_STORE_KEY: &str = "user_pin";

/// Reads, writes and compares the process-wide PIN.
#[derive(uniffi::Object)]
pub struct PinVault {
    store: Arc<dyn SecretStore>,
    epoch: AtomicU64,
}

#[uniffi::export]
impl PinVault {
    /// Wraps the platform secret store.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(store: Arc<dyn SecretStore>) -> Self {
        Self {
            store,
            epoch: AtomicU64::new(0),
        }
    }

    /// Returns whether a PIN is configured. An unreadable store counts as no PIN.
    #[must_use]
    pub fn has_pin(&self) -> bool {
        self.load().is_some()
    }

    /// Counter bumped each time the PIN is written or deleted.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }
}

impl PinVault {
    /// Loads the stored PIN.
    ///
    /// Read failures and malformed stored values are logged and reported as
    /// `None`; callers route the user back to enrollment in that case.
    #[must_use]
    pub fn load(&self) -> Option<Pin> {
        let stored = match self.store.get(PIN_STORE_KEY.to_string()) {
            Ok(stored) => stored?,
            Err(err) => {
                log::warn!("PIN read failed, treating as not configured: {err}");
                return None;
            }
        };
        match Pin::parse(&stored) {
            Ok(pin) => Some(pin),
            Err(_) => {
                log::warn!("stored PIN is malformed, treating as not configured");
                None
            }
        }
    }

    /// Persists `pin`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`PinKitError::StoreUnavailable`] if the write fails.
    pub fn save(&self, pin: &Pin) -> Result<(), PinKitError> {
        self.store
            .set(PIN_STORE_KEY.to_string(), pin.expose().to_owned())?;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        log::info!("PIN saved");
        Ok(())
    }

    /// Deletes the stored PIN.
    ///
    /// # Errors
    ///
    /// Returns [`PinKitError::StoreUnavailable`] if the delete fails.
    pub fn clear(&self) -> Result<(), PinKitError> {
        self.store.delete(PIN_STORE_KEY.to_string())?;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        log::info!("PIN cleared");
        Ok(())
    }

    /// Compares `candidate` against the stored PIN. Returns `false` when no PIN
    /// is stored.
    #[must_use]
    pub fn matches(&self, candidate: &Pin) -> bool {
        self.load().is_some_and(|stored| stored.matches(candidate))
    }
}
