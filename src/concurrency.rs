//! Process-wide "concurrency enabled" switch.
//!
//! Set once at startup from a flag or env value; read by whatever runs work
//! in parallel downstream. Enabled by default.

use std::sync::atomic::{AtomicBool, Ordering};

static CONCURRENCY_ENABLED: AtomicBool = AtomicBool::new(true);

pub fn concurrency_enabled() -> bool {
    CONCURRENCY_ENABLED.load(Ordering::Relaxed)
}

pub fn set_concurrency_enabled(enabled: bool) {
    CONCURRENCY_ENABLED.store(enabled, Ordering::Relaxed);
}

/// Interpret a raw flag value. `""`, `"true"` and `"1"` enable; anything
/// else disables.
pub fn parse_concurrency_flag(raw: &str) -> bool {
    matches!(raw, "" | "true" | "1")
}
