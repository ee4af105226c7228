//! Gate tuning shared by the login and reveal gates.

use serde::{Deserialize, Serialize};

use crate::PinKitError;

/// Default ceiling of consecutive failed biometric attempts before lockout.
pub const DEFAULT_MAX_BIOMETRIC_ATTEMPTS: u32 = 3;

/// Tunables shared by the login and reveal gates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, uniffi::Record)]
#[serde(default)]
pub struct GateConfig {
    /// Consecutive biometric failures that disable the biometric path on a reveal gate.
    pub max_biometric_attempts: u32,
    /// Prompt shown by the sensor when revealing an amount.
    pub reveal_prompt: String,
    /// Prompt shown by the sensor on the login screen.
    pub login_prompt: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            max_biometric_attempts: DEFAULT_MAX_BIOMETRIC_ATTEMPTS,
            reveal_prompt: "Use biometrics to reveal amount".to_string(),
            login_prompt: "Login with Face ID / Fingerprint".to_string(),
        }
    }
}

impl GateConfig {
    /// Parses a (possibly partial) JSON configuration. Missing fields take
    /// their default values.
    ///
    /// # Errors
    ///
    /// Returns [`PinKitError::InvalidInput`] if the JSON is malformed or the
    /// resulting configuration is invalid.
    pub fn from_json(json: &str) -> Result<Self, PinKitError> {
        let config: Self =
            serde_json::from_str(json).map_err(|err| PinKitError::InvalidInput {
                attribute: "config".to_string(),
                reason: err.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PinKitError::InvalidInput`] if `max_biometric_attempts` is zero.
    pub fn validate(&self) -> Result<(), PinKitError> {
        if self.max_biometric_attempts == 0 {
            return Err(PinKitError::InvalidInput {
                attribute: "max_biometric_attempts".to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Returns the default gate configuration.
#[uniffi::export]
#[must_use]
pub fn default_gate_config() -> GateConfig {
    GateConfig::default()
}

/// Parses a gate configuration from JSON, filling missing fields with defaults.
///
/// # Errors
///
/// See [`GateConfig::from_json`].
#[uniffi::export]
#[allow(clippy::needless_pass_by_value)]
pub fn gate_config_from_json(json: String) -> Result<GateConfig, PinKitError> {
    GateConfig::from_json(&json)
}
