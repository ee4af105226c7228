//! Entry-point authentication.
//!
//! The login gate checks that a PIN exists, offers one automatic biometric
//! attempt when the device supports it, and otherwise waits for the PIN. It
//! has no attempt counter: a failed biometric read only falls back to the
//! keypad.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use strum::Display;

use crate::{BiometricSensor, GateConfig, PinInputBuffer, PinKitError, PinVault};

/// Where the login gate currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, uniffi::Enum)]
#[strum(serialize_all = "snake_case")]
pub enum LoginState {
    /// Not mounted yet.
    CheckingStore,
    /// No PIN is configured; the host must show enrollment. Terminal.
    NoPin,
    /// Waiting for PIN digits or a biometric attempt.
    AwaitingInput,
    /// The user is in. Terminal.
    Authenticated,
}

/// Result of an event on the login gate, for the host to render.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum LoginOutcome {
    /// Waiting for the PIN.
    AwaitingPin {
        /// Whether the "Use Biometrics" button should be enabled.
        biometrics_available: bool,
    },
    /// More PIN digits are needed.
    Pending {
        /// Digits entered so far.
        filled: u8,
    },
    /// The entered PIN was wrong. The entry was cleared.
    IncorrectPin,
    /// The biometric challenge failed or errored. The user should enter
    /// their PIN.
    BiometricFailed,
    /// The device has no enrolled biometric hardware. No challenge was run.
    BiometricsUnavailable,
    /// The user is authenticated. The host should navigate to the home
    /// screen. Emitted once.
    Authenticated,
    /// No PIN is configured. The host should navigate to enrollment.
    RedirectToEnrollment,
}

/// Read-only view of the login gate.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct LoginSnapshot {
    /// Current state.
    pub state: LoginState,
    /// Whether the "Use Biometrics" button should be enabled.
    pub biometrics_available: bool,
    /// Digits entered so far.
    pub filled: u8,
}

struct LoginCore {
    state: LoginState,
    buffer: PinInputBuffer,
    biometrics_available: bool,
}

impl LoginCore {
    fn require_input(&self) -> Result<(), PinKitError> {
        match self.state {
            LoginState::AwaitingInput => Ok(()),
            LoginState::NoPin | LoginState::Authenticated => Err(PinKitError::FlowFinished),
            LoginState::CheckingStore => {
                Err(PinKitError::InvalidState("login gate is not mounted".to_string()))
            }
        }
    }
}

/// Login screen gate.
#[derive(uniffi::Object)]
pub struct LoginGate {
    vault: Arc<PinVault>,
    sensor: Arc<dyn BiometricSensor>,
    prompt: String,
    events: tokio::sync::Mutex<()>,
    core: Mutex<LoginCore>,
}

#[uniffi::export]
impl LoginGate {
    /// Creates an unmounted login gate.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(
        vault: Arc<PinVault>,
        sensor: Arc<dyn BiometricSensor>,
        config: GateConfig,
    ) -> Self {
        Self {
            vault,
            sensor,
            prompt: config.login_prompt,
            events: tokio::sync::Mutex::new(()),
            core: Mutex::new(LoginCore {
                state: LoginState::CheckingStore,
                buffer: PinInputBuffer::new(),
                biometrics_available: false,
            }),
        }
    }

    /// Runs when the login screen appears.
    ///
    /// Reads the store once. Without a PIN the gate finishes with
    /// [`LoginOutcome::RedirectToEnrollment`]. With one, and with enrolled
    /// biometric hardware, it runs one biometric challenge right away.
    ///
    /// # Errors
    ///
    /// Returns [`PinKitError::FlowFinished`] if the gate was already mounted.
    pub async fn mount(&self) -> Result<LoginOutcome, PinKitError> {
        let _event = self.events.lock().await;
        if self.core().state != LoginState::CheckingStore {
            return Err(PinKitError::FlowFinished);
        }

        if !self.vault.has_pin() {
            log::info!("no PIN configured, redirecting to enrollment");
            self.core().state = LoginState::NoPin;
            return Ok(LoginOutcome::RedirectToEnrollment);
        }

        let available = self.biometrics_available().await;
        {
            let mut core = self.core();
            core.state = LoginState::AwaitingInput;
            core.biometrics_available = available;
        }

        if available {
            Ok(self.challenge().await)
        } else {
            Ok(LoginOutcome::AwaitingPin {
                biometrics_available: false,
            })
        }
    }

    /// Handles the "Use Biometrics" button.
    ///
    /// Does nothing while PIN digits are being entered.
    ///
    /// # Errors
    ///
    /// - [`PinKitError::InvalidState`] before [`LoginGate::mount`].
    /// - [`PinKitError::FlowFinished`] once authenticated or redirected.
    pub async fn use_biometrics(&self) -> Result<LoginOutcome, PinKitError> {
        let _event = self.events.lock().await;
        {
            let core = self.core();
            core.require_input()?;
            if !core.biometrics_available {
                return Ok(LoginOutcome::BiometricsUnavailable);
            }
            if !core.buffer.is_empty() {
                return Ok(LoginOutcome::Pending {
                    filled: core.buffer.filled(),
                });
            }
        }
        Ok(self.challenge().await)
    }

    /// Handles a digit key. The sixth digit is checked against the stored PIN.
    ///
    /// # Errors
    ///
    /// - [`PinKitError::InvalidInput`] if `digit` is not 0-9.
    /// - [`PinKitError::InvalidState`] before [`LoginGate::mount`].
    /// - [`PinKitError::FlowFinished`] once authenticated or redirected.
    pub async fn on_digit(&self, digit: u8) -> Result<LoginOutcome, PinKitError> {
        let _event = self.events.lock().await;
        let mut core = self.core();
        core.require_input()?;
        let Some(pin) = core.buffer.push(digit)? else {
            return Ok(LoginOutcome::Pending {
                filled: core.buffer.filled(),
            });
        };

        if self.vault.matches(&pin) {
            log::info!("PIN authentication successful");
            core.state = LoginState::Authenticated;
            Ok(LoginOutcome::Authenticated)
        } else {
            log::info!("incorrect PIN on login");
            Ok(LoginOutcome::IncorrectPin)
        }
    }

    /// Handles the delete key.
    ///
    /// # Errors
    ///
    /// See [`LoginGate::on_digit`].
    pub async fn on_delete(&self) -> Result<(), PinKitError> {
        let _event = self.events.lock().await;
        let mut core = self.core();
        core.require_input()?;
        core.buffer.pop();
        Ok(())
    }

    /// Deletes the stored PIN and sends the user back to enrollment.
    ///
    /// This cannot be undone.
    ///
    /// # Errors
    ///
    /// - [`PinKitError::StoreUnavailable`] if the PIN cannot be deleted.
    /// - [`PinKitError::FlowFinished`] once authenticated.
    pub async fn reset(&self) -> Result<LoginOutcome, PinKitError> {
        let _event = self.events.lock().await;
        let mut core = self.core();
        if core.state == LoginState::Authenticated {
            return Err(PinKitError::FlowFinished);
        }
        self.vault.clear()?;
        log::warn!("stored PIN reset by user");
        core.buffer.clear();
        core.state = LoginState::NoPin;
        Ok(LoginOutcome::RedirectToEnrollment)
    }

    /// Returns the current state for rendering.
    #[must_use]
    pub fn snapshot(&self) -> LoginSnapshot {
        let core = self.core();
        LoginSnapshot {
            state: core.state,
            biometrics_available: core.biometrics_available,
            filled: core.buffer.filled(),
        }
    }
}

impl LoginGate {
    async fn biometrics_available(&self) -> bool {
        let hardware = match self.sensor.has_hardware().await {
            Ok(hardware) => hardware,
            Err(err) => {
                log::warn!("biometric hardware check failed: {err}");
                false
            }
        };
        if !hardware {
            return false;
        }
        match self.sensor.is_enrolled().await {
            Ok(enrolled) => enrolled,
            Err(err) => {
                log::warn!("biometric enrollment check failed: {err}");
                false
            }
        }
    }

    async fn challenge(&self) -> LoginOutcome {
        let passed = match self.sensor.challenge(self.prompt.clone()).await {
            Ok(passed) => passed,
            Err(err) => {
                log::warn!("biometric challenge errored: {err}");
                false
            }
        };
        if passed {
            log::info!("biometric authentication successful");
            self.core().state = LoginState::Authenticated;
            LoginOutcome::Authenticated
        } else {
            LoginOutcome::BiometricFailed
        }
    }

    fn core(&self) -> MutexGuard<'_, LoginCore> {
        self.core.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
