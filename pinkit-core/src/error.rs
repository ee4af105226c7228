use thiserror::Error;

/// Error outputs from `PinKit`
#[derive(Debug, Error, uniffi::Error)]
pub enum PinKitError {
    /// The presented input is not valid for the requested operation
    #[error("invalid_input_{attribute}: {reason}")]
    InvalidInput {
        /// The attribute that is invalid
        attribute: String,
        /// The reason the input is invalid
        reason: String,
    },
    /// The secret store could not complete a write or delete
    #[error("store_unavailable: {0}")]
    StoreUnavailable(String),
    /// The event is not accepted in the flow's current state
    #[error("invalid_state: {0}")]
    InvalidState(String),
    /// The one-shot flow already reached its terminal state
    #[error("flow_finished")]
    FlowFinished,
    /// No transaction exists with the requested id
    #[error("transaction_not_found: {0}")]
    TransactionNotFound(String),
}

impl From<StoreError> for PinKitError {
    fn from(error: StoreError) -> Self {
        Self::StoreUnavailable(error.to_string())
    }
}

/// Result type for secret store callbacks.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a [`SecretStore`](crate::SecretStore) implementation.
#[derive(Debug, Error, uniffi::Error)]
pub enum StoreError {
    /// The platform store refused or failed the operation.
    #[error("secret store unavailable: {0}")]
    Unavailable(String),

    /// Unexpected `UniFFI` callback error.
    #[error("unexpected uniffi callback error: {0}")]
    UnexpectedUniFFICallbackError(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for StoreError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError(error.reason)
    }
}

/// Result type for biometric sensor callbacks.
pub type SensorResult<T> = Result<T, SensorError>;

/// Errors raised by a [`BiometricSensor`](crate::BiometricSensor) implementation.
///
/// Gates never surface these to the caller; a sensor error counts as a failed
/// challenge.
#[derive(Debug, Error, uniffi::Error)]
pub enum SensorError {
    /// The sensor threw while checking capability, enrollment or challenging.
    #[error("biometric sensor unavailable: {0}")]
    Unavailable(String),

    /// Unexpected `UniFFI` callback error.
    #[error("unexpected uniffi callback error: {0}")]
    UnexpectedUniFFICallbackError(String),
}

impl From<uniffi::UnexpectedUniFFICallbackError> for SensorError {
    fn from(error: uniffi::UnexpectedUniFFICallbackError) -> Self {
        Self::UnexpectedUniFFICallbackError(error.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_maps_to_store_unavailable() {
        let err: PinKitError = StoreError::Unavailable("keychain locked".to_string()).into();
        assert!(matches!(err, PinKitError::StoreUnavailable(ref reason) if reason.contains("keychain locked")));
    }

    #[test]
    fn test_invalid_input_display() {
        let err = PinKitError::InvalidInput {
            attribute: "digit".to_string(),
            reason: "must be between 0 and 9".to_string(),
        };
        assert_eq!(err.to_string(), "invalid_input_digit: must be between 0 and 9");
    }
}
