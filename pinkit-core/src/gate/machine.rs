//! Reveal gate state machine.
//!
//! The machine performs no I/O. A reveal request either resolves immediately
//! or asks its driver to run one biometric challenge and report the result
//! back through [`RevealMachine::finish_biometric`]. PIN comparison is passed
//! in as a closure so the machine never sees the stored secret.

use strum::Display;

use crate::{Pin, PinInputBuffer, PinKitError};

/// Where a reveal gate currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, uniffi::Enum)]
#[strum(serialize_all = "snake_case")]
pub enum GateState {
    /// The amount is masked.
    Hidden,
    /// A biometric challenge is in flight.
    AuthenticatingBiometric,
    /// The PIN modal is open.
    AwaitingPin,
    /// The amount is shown in clear.
    Revealed,
}

/// Result of an event on a reveal gate, for the host to render.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum GateOutcome {
    /// The amount is now visible.
    Revealed,
    /// The amount is masked again.
    Hidden,
    /// The biometric challenge failed; the amount stays masked.
    BiometricDenied {
        /// Biometric attempts left before the PIN becomes mandatory.
        attempts_remaining: u32,
    },
    /// Too many biometric failures. Biometrics are disabled and the PIN modal
    /// is open. Emitted once per lockout.
    LockedOut,
    /// The PIN modal is open and waiting for digits.
    PinRequired,
    /// More PIN digits are needed.
    Pending {
        /// Digits entered so far.
        filled: u8,
    },
    /// The entered PIN was wrong. The entry was cleared and the modal stays open.
    IncorrectPin,
}

/// Read-only view of a reveal gate.
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct GateSnapshot {
    /// Current state.
    pub state: GateState,
    /// Whether the amount is shown in clear.
    pub revealed: bool,
    /// Whether the next reveal may try biometrics.
    pub bio_enabled: bool,
    /// Consecutive failed biometric attempts.
    pub attempt_count: u32,
    /// Digits entered in the PIN modal.
    pub filled: u8,
}

/// What the driver must do after a reveal request.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum RevealStep {
    /// Run one biometric challenge, then call `finish_biometric`.
    Challenge,
    /// Nothing to run.
    Done(GateOutcome),
}

pub(crate) struct RevealMachine {
    state: GateState,
    bio_enabled: bool,
    attempt_count: u32,
    max_attempts: u32,
    buffer: PinInputBuffer,
    seen_epoch: u64,
}

impl RevealMachine {
    pub(crate) fn new(max_attempts: u32, epoch: u64) -> Self {
        Self {
            state: GateState::Hidden,
            bio_enabled: true,
            attempt_count: 0,
            max_attempts,
            buffer: PinInputBuffer::new(),
            seen_epoch: epoch,
        }
    }

    /// Re-arms biometrics if the PIN was re-enrolled or reset since the last
    /// event.
    pub(crate) fn sync_epoch(&mut self, epoch: u64) {
        if epoch != self.seen_epoch {
            log::debug!("PIN changed, resetting biometric lockout");
            self.seen_epoch = epoch;
            self.attempt_count = 0;
            self.bio_enabled = true;
        }
    }

    pub(crate) fn begin_reveal(&mut self) -> RevealStep {
        match self.state {
            GateState::Revealed => RevealStep::Done(GateOutcome::Revealed),
            GateState::AwaitingPin => RevealStep::Done(GateOutcome::PinRequired),
            // A challenge whose driver was dropped never resolved. Start over.
            GateState::Hidden | GateState::AuthenticatingBiometric => {
                if self.bio_enabled && self.attempt_count < self.max_attempts {
                    self.state = GateState::AuthenticatingBiometric;
                    RevealStep::Challenge
                } else {
                    self.bio_enabled = false;
                    self.state = GateState::AwaitingPin;
                    RevealStep::Done(GateOutcome::PinRequired)
                }
            }
        }
    }

    /// Applies the result of the challenge started by `begin_reveal`. A sensor
    /// error must be reported as `passed == false`.
    pub(crate) fn finish_biometric(&mut self, passed: bool) -> GateOutcome {
        if passed {
            self.state = GateState::Revealed;
            self.attempt_count = 0;
            return GateOutcome::Revealed;
        }

        self.attempt_count = self.attempt_count.saturating_add(1);
        if self.attempt_count >= self.max_attempts {
            self.bio_enabled = false;
            self.state = GateState::AwaitingPin;
            GateOutcome::LockedOut
        } else {
            self.state = GateState::Hidden;
            GateOutcome::BiometricDenied {
                attempts_remaining: self.max_attempts - self.attempt_count,
            }
        }
    }

    pub(crate) fn enter_digit(
        &mut self,
        digit: u8,
        matches_stored: impl FnOnce(&Pin) -> bool,
    ) -> Result<GateOutcome, PinKitError> {
        self.require_pin_modal()?;
        let Some(pin) = self.buffer.push(digit)? else {
            return Ok(GateOutcome::Pending {
                filled: self.buffer.filled(),
            });
        };

        if matches_stored(&pin) {
            self.state = GateState::Revealed;
            self.attempt_count = 0;
            self.bio_enabled = true;
            Ok(GateOutcome::Revealed)
        } else {
            Ok(GateOutcome::IncorrectPin)
        }
    }

    pub(crate) fn delete_digit(&mut self) -> Result<(), PinKitError> {
        self.require_pin_modal()?;
        self.buffer.pop();
        Ok(())
    }

    /// Closes the PIN modal. No-op unless the modal is open.
    pub(crate) fn cancel(&mut self) {
        if matches!(
            self.state,
            GateState::AwaitingPin | GateState::AuthenticatingBiometric
        ) {
            self.buffer.clear();
            self.state = GateState::Hidden;
        }
    }

    pub(crate) fn hide(&mut self) -> Result<GateOutcome, PinKitError> {
        match self.state {
            GateState::Revealed => {
                self.state = GateState::Hidden;
                self.bio_enabled = true;
                self.attempt_count = 0;
                Ok(GateOutcome::Hidden)
            }
            GateState::Hidden => Ok(GateOutcome::Hidden),
            state => Err(PinKitError::InvalidState(format!(
                "cannot hide while {state}"
            ))),
        }
    }

    pub(crate) const fn is_revealed(&self) -> bool {
        matches!(self.state, GateState::Revealed)
    }

    pub(crate) fn snapshot(&self) -> GateSnapshot {
        GateSnapshot {
            state: self.state,
            revealed: self.is_revealed(),
            bio_enabled: self.bio_enabled,
            attempt_count: self.attempt_count,
            filled: self.buffer.filled(),
        }
    }

    fn require_pin_modal(&self) -> Result<(), PinKitError> {
        if self.state == GateState::AwaitingPin {
            Ok(())
        } else {
            Err(PinKitError::InvalidState(format!(
                "PIN entry is closed while {}",
                self.state
            )))
        }
    }
}
