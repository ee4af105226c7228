//! In-memory implementations of the platform traits.
//!
//! These are NOT secure for production use. They back the unit and
//! integration tests and the developer CLI.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use strum::{Display, EnumString};

use super::{BiometricSensor, SecretStore};
use crate::error::{SensorError, SensorResult, StoreError, StoreResult};

// =============================================================================
// Memory secret store
// =============================================================================

/// Secret store backed by a `HashMap`.
///
/// Reads and writes can be made to fail to exercise the store-unavailable
/// paths.
#[derive(Default)]
pub struct MemorySecretStore {
    values: Mutex<HashMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemorySecretStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `get` fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes every subsequent `set` and `delete` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.values
            .lock()
            .map_err(|_| StoreError::Unavailable("mutex poisoned".to_string()))
    }

    fn check_writable(&self) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("write refused".to_string()));
        }
        Ok(())
    }
}

impl SecretStore for MemorySecretStore {
    fn get(&self, key: String) -> StoreResult<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("read refused".to_string()));
        }
        Ok(self.lock()?.get(&key).cloned())
    }

    fn set(&self, key: String, value: String) -> StoreResult<()> {
        self.check_writable()?;
        self.lock()?.insert(key, value);
        Ok(())
    }

    fn delete(&self, key: String) -> StoreResult<()> {
        self.check_writable()?;
        self.lock()?.remove(&key);
        Ok(())
    }
}

// =============================================================================
// Scripted biometric sensor
// =============================================================================

/// One scripted challenge result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum BiometricScript {
    /// The user passes the challenge.
    Pass,
    /// The user fails the challenge.
    Fail,
    /// The sensor throws.
    Error,
}

/// Biometric sensor that replays a queue of scripted outcomes.
///
/// Once the script is exhausted every challenge fails.
pub struct ScriptedBiometricSensor {
    has_hardware: bool,
    is_enrolled: bool,
    script: Mutex<VecDeque<BiometricScript>>,
    prompts: Mutex<Vec<String>>,
    challenges: AtomicUsize,
}

impl ScriptedBiometricSensor {
    /// Creates an available, enrolled sensor replaying `script`.
    #[must_use]
    pub fn new(script: impl IntoIterator<Item = BiometricScript>) -> Self {
        Self::with_capabilities(true, true, script)
    }

    /// Creates a sensor with explicit hardware and enrollment flags.
    #[must_use]
    pub fn with_capabilities(
        has_hardware: bool,
        is_enrolled: bool,
        script: impl IntoIterator<Item = BiometricScript>,
    ) -> Self {
        Self {
            has_hardware,
            is_enrolled,
            script: Mutex::new(script.into_iter().collect()),
            prompts: Mutex::new(Vec::new()),
            challenges: AtomicUsize::new(0),
        }
    }

    /// Appends outcomes to the script.
    pub fn push(&self, outcomes: impl IntoIterator<Item = BiometricScript>) {
        if let Ok(mut script) = self.script.lock() {
            script.extend(outcomes);
        }
    }

    /// Number of challenges run so far.
    #[must_use]
    pub fn challenge_count(&self) -> usize {
        self.challenges.load(Ordering::SeqCst)
    }

    /// Prompts shown so far, in order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl BiometricSensor for ScriptedBiometricSensor {
    async fn has_hardware(&self) -> SensorResult<bool> {
        Ok(self.has_hardware)
    }

    async fn is_enrolled(&self) -> SensorResult<bool> {
        Ok(self.is_enrolled)
    }

    async fn challenge(&self, prompt: String) -> SensorResult<bool> {
        self.challenges.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt);
        }
        let next = self
            .script
            .lock()
            .map_err(|_| SensorError::Unavailable("mutex poisoned".to_string()))?
            .pop_front();
        match next {
            Some(BiometricScript::Pass) => Ok(true),
            Some(BiometricScript::Fail) | None => Ok(false),
            Some(BiometricScript::Error) => {
                Err(SensorError::Unavailable("scripted sensor error".to_string()))
            }
        }
    }
}
