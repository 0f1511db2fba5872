//! Process-wide verbose diagnostics toggle.
//!
//! The toggle is shared by every compile and invoke request in the process,
//! and by every module compiled through it. Each compile request sets it
//! from its own options (see [`apply_options`]); the setting then stays in
//! effect for later invoke requests.
//!
//! Use the [`diag!`](crate::diag) macro to emit an event that is promoted to
//! `info` while the toggle is on and stays at `debug` otherwise.

use std::sync::atomic::{AtomicBool, Ordering};

/// The compiler option that turns verbose diagnostics on.
pub const VERBOSE_FLAG: &str = "-v";

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Whether verbose diagnostics are currently enabled.
#[inline]
pub fn enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Set the diagnostics toggle.
pub fn set_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

/// Set the toggle from a compile request's option tokens.
///
/// Returns the new state.
pub fn apply_options<S: AsRef<str>>(options: &[S]) -> bool {
    let verbose = options.iter().any(|token| token.as_ref() == VERBOSE_FLAG);
    set_enabled(verbose);
    verbose
}

/// Emit a diagnostics event on target `rtcc::diagnostics`.
///
/// Logged at `info` when [`enabled`] returns true, at `debug` otherwise.
#[macro_export]
macro_rules! diag {
    ($($arg:tt)+) => {
        if $crate::diagnostics::enabled() {
            $crate::__tracing::info!(target: "rtcc::diagnostics", $($arg)+);
        } else {
            $crate::__tracing::debug!(target: "rtcc::diagnostics", $($arg)+);
        }
    };
}

#[cfg(test)]
mod tests;
