//! End-to-end flows across launch, enrollment, login and the reveal gates.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use pinkit_core::{
    ledger::fixture_transactions, AmountStyle, BiometricScript, BiometricSensor,
    EnrollmentOutcome, GateConfig, GateOutcome, GateState, LaunchRoute, LaunchRouter, LoginGate,
    LoginOutcome, MemorySecretStore, PinEnrollment, PinGate, PinKitError, PinVault,
    ScriptedBiometricSensor, SensorResult,
};

use BiometricScript::{Error, Fail, Pass};

fn vault() -> Arc<PinVault> {
    Arc::new(PinVault::new(Arc::new(MemorySecretStore::new())))
}

fn digits(pin: &str) -> Vec<u8> {
    pin.bytes().map(|b| b - b'0').collect()
}

fn enroll(vault: &Arc<PinVault>, pin: &str) {
    let enrollment = PinEnrollment::new(vault.clone());
    let mut last = None;
    for d in digits(pin) {
        last = Some(enrollment.on_digit(d).expect("digit accepted"));
    }
    assert_eq!(last, Some(EnrollmentOutcome::Completed));
}

fn reveal_gate(
    vault: &Arc<PinVault>,
    script: impl IntoIterator<Item = BiometricScript>,
) -> (Arc<ScriptedBiometricSensor>, PinGate) {
    let sensor = Arc::new(ScriptedBiometricSensor::new(script));
    let gate = PinGate::new(vault.clone(), sensor.clone(), GateConfig::default()).expect("gate");
    (sensor, gate)
}

async fn enter_on_gate(gate: &PinGate, pin: &str) -> GateOutcome {
    let mut last = None;
    for d in digits(pin) {
        last = Some(gate.on_digit(d).await.expect("digit accepted"));
    }
    last.expect("non-empty pin")
}

#[tokio::test]
async fn test_fresh_install_enrolls_then_logs_in() {
    let vault = vault();
    let router = LaunchRouter::new(vault.clone());
    assert_eq!(router.route(), LaunchRoute::Enrollment);

    enroll(&vault, "123456");
    assert_eq!(router.route(), LaunchRoute::Login);

    let sensor = Arc::new(ScriptedBiometricSensor::with_capabilities(false, false, []));
    let login = LoginGate::new(vault.clone(), sensor, GateConfig::default());
    assert_eq!(
        login.mount().await.unwrap(),
        LoginOutcome::AwaitingPin {
            biometrics_available: false
        }
    );

    let mut outcomes = Vec::new();
    for d in digits("654321") {
        outcomes.push(login.on_digit(d).await.unwrap());
    }
    assert_eq!(outcomes.last(), Some(&LoginOutcome::IncorrectPin));
    assert_eq!(login.snapshot().filled, 0);

    outcomes.clear();
    for d in digits("123456") {
        outcomes.push(login.on_digit(d).await.unwrap());
    }
    let authenticated = outcomes
        .iter()
        .filter(|o| **o == LoginOutcome::Authenticated)
        .count();
    assert_eq!(authenticated, 1);
    assert!(matches!(login.on_digit(1).await, Err(PinKitError::FlowFinished)));
}

#[tokio::test]
async fn test_login_reset_returns_to_enrollment() {
    let vault = vault();
    enroll(&vault, "123456");
    let sensor = Arc::new(ScriptedBiometricSensor::new([Fail]));
    let login = LoginGate::new(vault.clone(), sensor, GateConfig::default());
    assert_eq!(login.mount().await.unwrap(), LoginOutcome::BiometricFailed);
    assert_eq!(
        login.reset().await.unwrap(),
        LoginOutcome::RedirectToEnrollment
    );
    assert_eq!(LaunchRouter::new(vault).route(), LaunchRoute::Enrollment);
}

#[tokio::test]
async fn test_three_biometric_failures_lock_out_once() {
    let vault = vault();
    enroll(&vault, "123456");
    let (sensor, gate) = reveal_gate(&vault, [Fail, Error, Fail]);

    let mut outcomes = Vec::new();
    for _ in 0..3 {
        outcomes.push(gate.request_reveal().await);
    }
    assert_eq!(
        outcomes,
        vec![
            GateOutcome::BiometricDenied {
                attempts_remaining: 2
            },
            GateOutcome::BiometricDenied {
                attempts_remaining: 1
            },
            GateOutcome::LockedOut,
        ]
    );

    let snapshot = gate.snapshot();
    assert_eq!(snapshot.state, GateState::AwaitingPin);
    assert!(!snapshot.bio_enabled);
    assert_eq!(snapshot.attempt_count, 3);

    // locked out: cancelling and asking again must not touch the sensor
    gate.cancel().await;
    assert_eq!(gate.request_reveal().await, GateOutcome::PinRequired);
    assert_eq!(sensor.challenge_count(), 3);
}

#[tokio::test]
async fn test_pin_fallback_reveals_and_hide_rearms_biometrics() {
    let vault = vault();
    enroll(&vault, "123456");
    let (sensor, gate) = reveal_gate(&vault, [Fail, Fail, Fail, Pass]);
    for _ in 0..3 {
        gate.request_reveal().await;
    }

    assert_eq!(enter_on_gate(&gate, "000000").await, GateOutcome::IncorrectPin);
    assert_eq!(gate.snapshot().state, GateState::AwaitingPin);
    assert_eq!(enter_on_gate(&gate, "123456").await, GateOutcome::Revealed);

    let transaction = fixture_transactions().remove(0);
    assert_eq!(
        gate.display_amount(transaction.clone(), AmountStyle::List),
        "+ RM 10000.00"
    );
    assert_eq!(
        gate.display_amount(transaction.clone(), AmountStyle::Detail),
        "+$10000"
    );

    assert_eq!(gate.toggle().await.unwrap(), GateOutcome::Hidden);
    let snapshot = gate.snapshot();
    assert_eq!(snapshot.state, GateState::Hidden);
    assert!(snapshot.bio_enabled);
    assert_eq!(snapshot.attempt_count, 0);
    assert_eq!(
        gate.display_amount(transaction.clone(), AmountStyle::List),
        "****"
    );
    assert_eq!(
        gate.display_amount(transaction, AmountStyle::Detail),
        "+$****"
    );

    assert_eq!(gate.request_reveal().await, GateOutcome::Revealed);
    assert_eq!(sensor.challenge_count(), 4);
}

#[tokio::test]
async fn test_gates_on_different_screens_are_independent() {
    let vault = vault();
    enroll(&vault, "123456");
    let (_, history) = reveal_gate(&vault, [Fail, Fail, Fail]);
    let (detail_sensor, detail) = reveal_gate(&vault, [Pass]);

    for _ in 0..3 {
        history.request_reveal().await;
    }
    assert!(!history.snapshot().bio_enabled);

    assert_eq!(detail.request_reveal().await, GateOutcome::Revealed);
    assert_eq!(detail_sensor.challenge_count(), 1);
    assert_eq!(history.snapshot().state, GateState::AwaitingPin);
}

#[tokio::test]
async fn test_reenrollment_clears_lockout() {
    let vault = vault();
    enroll(&vault, "123456");
    let (sensor, gate) = reveal_gate(&vault, [Fail, Fail, Fail, Pass]);
    for _ in 0..3 {
        gate.request_reveal().await;
    }
    gate.cancel().await;

    enroll(&vault, "222222");

    assert_eq!(gate.request_reveal().await, GateOutcome::Revealed);
    assert_eq!(sensor.challenge_count(), 4);
}

#[tokio::test]
async fn test_cancel_twice_equals_once() {
    let vault = vault();
    enroll(&vault, "123456");
    let (_, gate) = reveal_gate(&vault, [Fail, Fail, Fail]);
    for _ in 0..3 {
        gate.request_reveal().await;
    }
    gate.on_digit(1).await.unwrap();

    gate.cancel().await;
    let once = gate.snapshot();
    gate.cancel().await;
    assert_eq!(gate.snapshot(), once);
    assert_eq!(once.state, GateState::Hidden);
    assert_eq!(once.filled, 0);
}

/// Sensor that always fails after a delay and records how many challenges
/// overlap.
#[derive(Default)]
struct SlowFailingSensor {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

#[async_trait::async_trait]
impl BiometricSensor for SlowFailingSensor {
    async fn has_hardware(&self) -> SensorResult<bool> {
        Ok(true)
    }

    async fn is_enrolled(&self) -> SensorResult<bool> {
        Ok(true)
    }

    async fn challenge(&self, _prompt: String) -> SensorResult<bool> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(false)
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_reveals_run_one_challenge_at_a_time() {
    let vault = vault();
    enroll(&vault, "123456");
    let sensor = Arc::new(SlowFailingSensor::default());
    let gate = Arc::new(PinGate::new(vault, sensor.clone(), GateConfig::default()).unwrap());

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let gate = gate.clone();
            tokio::spawn(async move { gate.request_reveal().await })
        })
        .collect();
    let mut outcomes = Vec::new();
    for handle in handles {
        outcomes.push(handle.await.unwrap());
    }

    assert_eq!(sensor.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(sensor.calls.load(Ordering::SeqCst), 3);
    let locked_out = outcomes
        .iter()
        .filter(|o| **o == GateOutcome::LockedOut)
        .count();
    assert_eq!(locked_out, 1);
    let denied = outcomes
        .iter()
        .filter(|o| matches!(o, GateOutcome::BiometricDenied { .. }))
        .count();
    assert_eq!(denied, 2);
    let pin_required = outcomes
        .iter()
        .filter(|o| **o == GateOutcome::PinRequired)
        .count();
    assert_eq!(pin_required, 2);

    let snapshot = gate.snapshot();
    assert_eq!(snapshot.state, GateState::AwaitingPin);
    assert_eq!(snapshot.attempt_count, 3);
}

#[test]
fn test_invalid_config_rejected() {
    let vault = vault();
    let sensor = Arc::new(ScriptedBiometricSensor::new([]));
    let config = GateConfig {
        max_biometric_attempts: 0,
        ..GateConfig::default()
    };
    assert!(matches!(
        PinGate::new(vault, sensor, config),
        Err(PinKitError::InvalidInput { .. })
    ));
}
