//! Reveal gate: protects an on-screen amount behind biometrics with a PIN
//! fallback.
//!
//! Each screen that shows protected amounts owns its own [`PinGate`]. Gates
//! share the [`PinVault`] but nothing else, so a biometric lockout on one
//! screen does not carry over to another.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

mod machine;

pub use machine::{GateOutcome, GateSnapshot, GateState};
use machine::{RevealMachine, RevealStep};

use crate::{
    ledger::format_amount, AmountStyle, BiometricSensor, GateConfig, PinKitError, PinVault,
    Transaction,
};

/// Biometric-first, PIN-fallback gate around one screen's reveal toggle.
///
/// Events are applied one at a time: every method waits for the previous
/// event, including an in-flight biometric challenge, before it runs.
/// [`PinGate::snapshot`] does not wait and may report
/// [`GateState::AuthenticatingBiometric`].
#[derive(uniffi::Object)]
pub struct PinGate {
    vault: Arc<PinVault>,
    sensor: Arc<dyn BiometricSensor>,
    prompt: String,
    events: tokio::sync::Mutex<()>,
    machine: Mutex<RevealMachine>,
}

#[uniffi::export]
impl PinGate {
    /// Creates a hidden gate.
    ///
    /// # Errors
    ///
    /// Returns [`PinKitError::InvalidInput`] if `config` is invalid.
    #[uniffi::constructor]
    pub fn new(
        vault: Arc<PinVault>,
        sensor: Arc<dyn BiometricSensor>,
        config: GateConfig,
    ) -> Result<Self, PinKitError> {
        config.validate()?;
        let machine = RevealMachine::new(config.max_biometric_attempts, vault.epoch());
        Ok(Self {
            vault,
            sensor,
            prompt: config.reveal_prompt,
            events: tokio::sync::Mutex::new(()),
            machine: Mutex::new(machine),
        })
    }

    /// Asks to reveal the amount.
    ///
    /// Runs one biometric challenge when biometrics are still allowed;
    /// otherwise opens the PIN modal. Already revealed or already waiting for
    /// the PIN, this does nothing and reports the current situation.
    pub async fn request_reveal(&self) -> GateOutcome {
        let _event = self.events.lock().await;
        self.reveal().await
    }

    /// Masks the amount again and re-arms biometrics for the next reveal.
    ///
    /// # Errors
    ///
    /// Returns [`PinKitError::InvalidState`] while the PIN modal is open.
    pub async fn request_hide(&self) -> Result<GateOutcome, PinKitError> {
        let _event = self.events.lock().await;
        self.hide()
    }

    /// Handles the single "Reveal / Hide" button.
    ///
    /// # Errors
    ///
    /// See [`PinGate::request_hide`].
    pub async fn toggle(&self) -> Result<GateOutcome, PinKitError> {
        let _event = self.events.lock().await;
        let revealed = self.machine().is_revealed();
        if revealed {
            self.hide()
        } else {
            Ok(self.reveal().await)
        }
    }

    /// Handles a digit key in the PIN modal. The sixth digit is checked
    /// against the stored PIN.
    ///
    /// # Errors
    ///
    /// - [`PinKitError::InvalidState`] if the PIN modal is not open.
    /// - [`PinKitError::InvalidInput`] if `digit` is not 0-9.
    pub async fn on_digit(&self, digit: u8) -> Result<GateOutcome, PinKitError> {
        let _event = self.events.lock().await;
        let outcome = self
            .synced_machine()
            .enter_digit(digit, |pin| self.vault.matches(pin))?;
        match outcome {
            GateOutcome::Revealed => log::info!("amount revealed with PIN"),
            GateOutcome::IncorrectPin => log::info!("incorrect PIN on reveal gate"),
            _ => {}
        }
        Ok(outcome)
    }

    /// Handles the delete key in the PIN modal.
    ///
    /// # Errors
    ///
    /// Returns [`PinKitError::InvalidState`] if the PIN modal is not open.
    pub async fn on_delete(&self) -> Result<(), PinKitError> {
        let _event = self.events.lock().await;
        self.machine().delete_digit()
    }

    /// Closes the PIN modal, discarding the entry. Idempotent.
    pub async fn cancel(&self) {
        let _event = self.events.lock().await;
        self.machine().cancel();
    }

    /// Returns the current state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> GateSnapshot {
        self.machine().snapshot()
    }

    /// Formats `transaction`'s amount for `style`, masked unless the gate is
    /// revealed.
    #[must_use]
    #[allow(clippy::needless_pass_by_value)]
    pub fn display_amount(&self, transaction: Transaction, style: AmountStyle) -> String {
        format_amount(&transaction, style, self.machine().is_revealed())
    }
}

impl PinGate {
    async fn reveal(&self) -> GateOutcome {
        let step = self.synced_machine().begin_reveal();
        if let RevealStep::Done(outcome) = step {
            return outcome;
        }

        let passed = match self.sensor.challenge(self.prompt.clone()).await {
            Ok(passed) => passed,
            Err(err) => {
                log::warn!("biometric challenge errored, counting as a failure: {err}");
                false
            }
        };

        let outcome = self.machine().finish_biometric(passed);
        match outcome {
            GateOutcome::Revealed => log::info!("amount revealed with biometrics"),
            GateOutcome::LockedOut => {
                log::warn!("biometric reveal locked out, PIN required");
            }
            _ => log::info!("biometric reveal denied"),
        }
        outcome
    }

    fn hide(&self) -> Result<GateOutcome, PinKitError> {
        self.synced_machine().hide()
    }

    fn machine(&self) -> MutexGuard<'_, RevealMachine> {
        self.machine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn synced_machine(&self) -> MutexGuard<'_, RevealMachine> {
        let mut machine = self.machine();
        machine.sync_epoch(self.vault.epoch());
        machine
    }
}
