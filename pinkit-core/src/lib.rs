//! Core of `PinKit`: the PIN and biometric gates that protect a personal
//! finance app.
//!
//! The host app supplies a [`SecretStore`] and a [`BiometricSensor`], wraps the
//! store in one shared [`PinVault`], and creates:
//!
//! - a [`LaunchRouter`] to pick the first screen,
//! - a [`PinEnrollment`] for first-run setup,
//! - a [`LoginGate`] for the login screen,
//! - one [`PinGate`] per screen that reveals amounts.
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]

mod config;
pub use config::*;

mod error;
pub use error::*;

mod pin;
pub use pin::*;

mod platform;
pub use platform::*;

mod vault;
pub use vault::*;

mod enrollment;
pub use enrollment::*;

mod launch;
pub use launch::*;

mod login;
pub use login::*;

mod gate;
pub use gate::*;

pub mod ledger;
pub use ledger::{AmountStyle, DayGroup, Ledger, Transaction, TransactionKind};

pub mod logger;

uniffi::setup_scaffolding!("pinkit_core");
