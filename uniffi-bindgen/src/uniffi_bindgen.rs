//! Generates the Swift and Kotlin bindings for `PinKit`.

fn main() {
    uniffi::uniffi_bindgen_main();
}
