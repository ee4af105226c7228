//! The PIN secret and the keypad buffer that produces it.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::PinKitError;

/// Number of digits in a PIN.
pub const PIN_LENGTH: usize = 6;

/// A six-digit numeric PIN.
///
/// The value is zeroized on drop and never printed; `Debug` renders a fixed
/// mask. Equality is only exposed through [`Pin::matches`], which compares in
/// constant time.
pub struct Pin(SecretString);

impl Pin {
    /// Parses a PIN from its string form.
    ///
    /// # Errors
    ///
    /// Returns [`PinKitError::InvalidInput`] if `value` is not exactly
    /// [`PIN_LENGTH`] ASCII decimal digits.
    pub fn parse(value: &str) -> Result<Self, PinKitError> {
        if value.len() != PIN_LENGTH {
            return Err(PinKitError::InvalidInput {
                attribute: "pin".to_string(),
                reason: format!("expected {PIN_LENGTH} digits, got {}", value.len()),
            });
        }
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(PinKitError::InvalidInput {
                attribute: "pin".to_string(),
                reason: "only decimal digits are allowed".to_string(),
            });
        }
        Ok(Self(SecretString::from(value.to_owned())))
    }

    /// Returns `true` if both PINs hold the same digits.
    #[must_use]
    pub fn matches(&self, other: &Self) -> bool {
        self.expose().as_bytes().ct_eq(other.expose().as_bytes()).into()
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(******)")
    }
}

/// Ordered keypad input, holding at most [`PIN_LENGTH`] digits.
///
/// The buffer never fills up in place: the digit that completes a PIN drains
/// the buffer and hands the PIN to the caller, so every comparison starts from
/// an empty buffer.
#[derive(Default)]
pub struct PinInputBuffer {
    digits: Vec<u8>,
}

impl PinInputBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            digits: Vec::with_capacity(PIN_LENGTH),
        }
    }

    /// Appends a digit.
    ///
    /// Returns the completed PIN when this digit is the sixth one, leaving the
    /// buffer empty. Returns `None` while the buffer is still filling.
    ///
    /// # Errors
    ///
    /// Returns [`PinKitError::InvalidInput`] if `digit` is greater than 9. The
    /// buffer is left unchanged.
    pub fn push(&mut self, digit: u8) -> Result<Option<Pin>, PinKitError> {
        if digit > 9 {
            return Err(PinKitError::InvalidInput {
                attribute: "digit".to_string(),
                reason: format!("{digit} is not a decimal digit"),
            });
        }
        self.digits.push(b'0' + digit);
        if self.digits.len() < PIN_LENGTH {
            return Ok(None);
        }

        let mut value = String::with_capacity(PIN_LENGTH);
        value.extend(self.digits.iter().map(|b| char::from(*b)));
        self.clear();
        let pin = Pin(SecretString::from(value));
        Ok(Some(pin))
    }

    /// Removes the last digit. No-op on an empty buffer.
    pub fn pop(&mut self) {
        if let Some(last) = self.digits.last_mut() {
            last.zeroize();
            self.digits.pop();
        }
    }

    /// Empties the buffer, wiping the entered digits.
    pub fn clear(&mut self) {
        self.digits.zeroize();
    }

    /// Number of digits entered so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.digits.len()
    }

    /// Returns `true` if no digit has been entered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    /// Number of filled dots to render, as exported to the host.
    pub(crate) fn filled(&self) -> u8 {
        // bounded by PIN_LENGTH
        u8::try_from(self.digits.len()).unwrap_or(u8::MAX)
    }
}

impl Drop for PinInputBuffer {
    fn drop(&mut self) {
        self.digits.zeroize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn enter(buffer: &mut PinInputBuffer, digits: &str) -> Option<Pin> {
        let mut completed = None;
        for d in digits.bytes() {
            completed = buffer.push(d - b'0').expect("valid digit");
        }
        completed
    }

    #[test_case("123456" ; "ascending")]
    #[test_case("000000" ; "all zeros")]
    #[test_case("909090" ; "alternating")]
    fn test_parse_accepts_six_digits(value: &str) {
        let pin = Pin::parse(value).expect("valid pin");
        assert_eq!(pin.expose(), value);
    }

    #[test_case("" ; "empty")]
    #[test_case("12345" ; "too short")]
    #[test_case("1234567" ; "too long")]
    #[test_case("12a456" ; "letter")]
    #[test_case(" 23456" ; "whitespace")]
    #[test_case("١٢٣٤٥٦" ; "non ascii digits")]
    fn test_parse_rejects(value: &str) {
        assert!(matches!(
            Pin::parse(value),
            Err(PinKitError::InvalidInput { ref attribute, .. }) if attribute == "pin"
        ));
    }

    #[test]
    fn test_pin_debug_is_redacted() {
        let pin = Pin::parse("987654").unwrap();
        let rendered = format!("{pin:?}");
        assert_eq!(rendered, "Pin(******)");
        assert!(!rendered.contains("987654"));
    }

    #[test]
    fn test_pin_matches() {
        let a = Pin::parse("123456").unwrap();
        let b = Pin::parse("123456").unwrap();
        let c = Pin::parse("654321").unwrap();
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }

    #[test]
    fn test_buffer_below_length_yields_nothing() {
        let mut buffer = PinInputBuffer::new();
        assert!(enter(&mut buffer, "12345").is_none());
        assert_eq!(buffer.len(), 5);
    }

    #[test]
    fn test_buffer_completes_and_clears_on_sixth_digit() {
        let mut buffer = PinInputBuffer::new();
        let pin = enter(&mut buffer, "123456").expect("completed");
        assert_eq!(pin.expose(), "123456");
        assert!(buffer.is_empty());

        // the next digit starts a fresh entry
        assert!(buffer.push(7).unwrap().is_none());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_buffer_rejects_non_digit() {
        let mut buffer = PinInputBuffer::new();
        buffer.push(1).unwrap();
        assert!(buffer.push(10).is_err());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_buffer_pop() {
        let mut buffer = PinInputBuffer::new();
        buffer.pop();
        assert!(buffer.is_empty());

        enter(&mut buffer, "12");
        buffer.pop();
        assert_eq!(buffer.len(), 1);
        let pin = enter(&mut buffer, "34567").expect("completed");
        assert_eq!(pin.expose(), "134567");
    }
}
