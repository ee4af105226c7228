//! Scripted keypad sessions against the gates.

use eyre::bail;
use pinkit_core::{
    EnrollmentOutcome, GateOutcome, LoginGate, LoginOutcome, Pin, PinEnrollment, PinGate,
};
use tracing::{info, warn};

/// Validates `pin` and splits it into keypad digits.
pub fn keypad_digits(pin: &str) -> eyre::Result<Vec<u8>> {
    Pin::parse(pin)?;
    Ok(pin.bytes().map(|b| b - b'0').collect())
}

pub fn enroll(enrollment: &PinEnrollment, pin: &str) -> eyre::Result<()> {
    for digit in keypad_digits(pin)? {
        if enrollment.on_digit(digit)? == EnrollmentOutcome::Completed {
            return Ok(());
        }
    }
    bail!("enrollment did not complete")
}

/// Types `pin` on the login keypad and returns the last outcome.
pub async fn login_with_pin(gate: &LoginGate, pin: &str) -> eyre::Result<LoginOutcome> {
    let mut outcome = LoginOutcome::Pending { filled: 0 };
    for digit in keypad_digits(pin)? {
        outcome = gate.on_digit(digit).await?;
    }
    Ok(outcome)
}

/// Drives a reveal gate to the end of one reveal attempt.
///
/// Biometrics are retried until they pass or lock out. Once the PIN modal is
/// open, each of `pins` is tried in order. If none matches, the modal is
/// cancelled. Returns whether the amount ended up revealed.
pub async fn reveal(gate: &PinGate, pins: &[String]) -> eyre::Result<bool> {
    loop {
        match gate.request_reveal().await {
            GateOutcome::Revealed => {
                info!("revealed with biometrics");
                return Ok(true);
            }
            GateOutcome::BiometricDenied { attempts_remaining } => {
                warn!(attempts_remaining, "biometric authentication failed");
            }
            GateOutcome::LockedOut => {
                warn!("maximum biometric attempts reached, please use your PIN");
                break;
            }
            GateOutcome::PinRequired => break,
            other => bail!("unexpected reveal outcome: {other:?}"),
        }
    }

    for pin in pins {
        let mut outcome = GateOutcome::PinRequired;
        for digit in keypad_digits(pin)? {
            outcome = gate.on_digit(digit).await?;
        }
        match outcome {
            GateOutcome::Revealed => {
                info!("revealed with PIN");
                return Ok(true);
            }
            GateOutcome::IncorrectPin => warn!("incorrect PIN, please try again"),
            other => bail!("unexpected PIN outcome: {other:?}"),
        }
    }

    gate.cancel().await;
    Ok(false)
}
