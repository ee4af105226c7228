//! Launch routing: picks the first screen from whether a PIN is stored.

use std::sync::Arc;

use strum::Display;

use crate::PinVault;

/// First screen to show when the app starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, uniffi::Enum)]
#[strum(serialize_all = "lowercase")]
pub enum LaunchRoute {
    /// No usable PIN: run [`PinEnrollment`](crate::PinEnrollment).
    Enrollment,
    /// A PIN exists: run [`LoginGate`](crate::LoginGate).
    Login,
}

/// Picks the entry screen from the state of the vault.
#[derive(uniffi::Object)]
pub struct LaunchRouter {
    vault: Arc<PinVault>,
}

#[uniffi::export]
impl LaunchRouter {
    /// Creates a router over `vault`.
    #[uniffi::constructor]
    #[must_use]
    pub fn new(vault: Arc<PinVault>) -> Self {
        Self { vault }
    }

    /// Reads the store once and returns the entry route.
    ///
    /// An unreadable store routes to enrollment.
    #[must_use]
    pub fn route(&self) -> LaunchRoute {
        let route = if self.vault.has_pin() {
            LaunchRoute::Login
        } else {
            LaunchRoute::Enrollment
        };
        log::debug!("launch route: {route}");
        route
    }
}
