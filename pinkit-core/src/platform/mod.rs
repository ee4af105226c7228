//! Platform interfaces implemented by the host app.
//!
//! The host provides the encrypted secret store (Keychain, Android Keystore,
//! `expo-secure-store`, ...) and the biometric sensor. Both are passed into
//! the gates explicitly; nothing in this crate reaches for a global store.

use crate::error::{SensorResult, StoreResult};

mod memory;

pub use memory::{BiometricScript, MemorySecretStore, ScriptedBiometricSensor};

/// Persistent key-value store for secrets, encrypted at rest by the platform.
#[uniffi::export(with_foreign)]
pub trait SecretStore: Send + Sync {
    /// Reads the value stored under `key`, if present.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    fn get(&self, key: String) -> StoreResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails. A failed write must not leave a
    /// partial value behind.
    fn set(&self, key: String, value: String) -> StoreResult<()>;

    /// Deletes the value stored under `key`. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    fn delete(&self, key: String) -> StoreResult<()>;
}

/// Device biometric sensor (Face ID, Touch ID, fingerprint).
///
/// Only the outcome of a challenge crosses this boundary; no biometric data
/// does.
#[uniffi::export(with_foreign)]
#[async_trait::async_trait]
pub trait BiometricSensor: Send + Sync {
    /// Returns whether the device has biometric hardware.
    ///
    /// # Errors
    ///
    /// Returns an error if the capability check throws.
    async fn has_hardware(&self) -> SensorResult<bool>;

    /// Returns whether the user has enrolled at least one biometric.
    ///
    /// # Errors
    ///
    /// Returns an error if the enrollment check throws.
    async fn is_enrolled(&self) -> SensorResult<bool>;

    /// Prompts the user with `prompt` and reports whether they passed.
    ///
    /// Device passcode fallback must be disabled by the implementation; the
    /// gates provide their own PIN fallback.
    ///
    /// # Errors
    ///
    /// Returns an error if the challenge throws instead of completing.
    async fn challenge(&self, prompt: String) -> SensorResult<bool>;
}
