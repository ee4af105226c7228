//! `PinKit` bindings entry point.
//!
//! Re-exports [`pinkit_core`] and its `UniFFI` scaffolding so that a single
//! library is built for Swift, Kotlin and React Native hosts.

pinkit_core::uniffi_reexport_scaffolding!();

pub use pinkit_core::*;
