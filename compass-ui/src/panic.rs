//! Helpers for hooks that panic.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Extract a human-readable message from a panic payload.
///
/// Panics can contain either `&str` or `String` payloads. This function
/// attempts to extract either, falling back to a generic message.
pub fn extract_panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

/// Run a boolean hook, turning a panic into `false`.
///
/// The panic message is logged under `hook_name`.
pub fn guard_hook(hook_name: &str, f: impl FnOnce() -> bool) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(allowed) => allowed,
        Err(payload) => {
            log::warn!(
                "Stepper: {} panicked, treating as veto: {}",
                hook_name,
                extract_panic_message(&payload)
            );
            false
        }
    }
}
