//! First-run PIN setup.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::{PinInputBuffer, PinKitError, PinVault};

/// Result of a keypad event during enrollment.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum EnrollmentOutcome {
    /// More digits are needed.
    Pending {
        /// Digits entered so far.
        filled: u8,
    },
    /// The PIN was saved. The host should navigate to the login screen.
    Completed,
}

struct EnrollmentState {
    buffer: PinInputBuffer,
    completed: bool,
}

/// Captures a new six-digit PIN and saves it to the vault.
#[derive(uniffi::Object)]
pub struct PinEnrollment {
    vault: Arc<PinVault>,
    state: Mutex<EnrollmentState>,
}

#[uniffi::export]
impl PinEnrollment {
    /// Starts a new enrollment against `vault`.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(vault: Arc<PinVault>) -> Self {
        Self {
            vault,
            state: Mutex::new(EnrollmentState {
                buffer: PinInputBuffer::new(),
                completed: false,
            }),
        }
    }

    /// Handles a digit key.
    ///
    /// The sixth digit saves the PIN, replacing any previous one, and
    /// completes the flow.
    ///
    /// # Errors
    ///
    /// - [`PinKitError::InvalidInput`] if `digit` is not 0-9.
    /// - [`PinKitError::StoreUnavailable`] if the PIN cannot be saved. The
    ///   entry is discarded and the user has to start over.
    /// - [`PinKitError::FlowFinished`] if the PIN was already saved.
    pub fn on_digit(&self, digit: u8) -> Result<EnrollmentOutcome, PinKitError> {
        let mut state = self.lock();
        if state.completed {
            return Err(PinKitError::FlowFinished);
        }
        let Some(pin) = state.buffer.push(digit)? else {
            return Ok(EnrollmentOutcome::Pending {
                filled: state.buffer.filled(),
            });
        };

        if let Err(err) = self.vault.save(&pin) {
            log::error!("PIN enrollment failed: {err}");
            return Err(err);
        }
        state.completed = true;
        Ok(EnrollmentOutcome::Completed)
    }

    /// Handles the delete key. No-op on an empty entry.
    pub fn on_delete(&self) {
        self.lock().buffer.pop();
    }

    /// Digits entered so far.
    #[must_use]
    pub fn filled(&self) -> u8 {
        self.lock().buffer.filled()
    }

    /// Returns whether the PIN has been saved.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.lock().completed
    }
}

impl PinEnrollment {
    fn lock(&self) -> MutexGuard<'_, EnrollmentState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
