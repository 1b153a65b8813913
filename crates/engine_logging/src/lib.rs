#![deny(missing_docs)]
//! Logging front end for the harvester workspace.
//!
//! Library crates log only through the `engine_*` macros, which forward to
//! the `log` facade re-exported here so callers need no direct `log`
//! dependency. The `harvester` binary installs the real sinks.

#[doc(hidden)]
pub use log as __log;

/// Logs a trace-level message, e.g. raw response payloads.
#[macro_export]
macro_rules! engine_trace {
    ($($arg:tt)*) => {{
        $crate::__log::trace!($($arg)*);
    }};
}

/// Logs a debug-level message, e.g. each request URL.
#[macro_export]
macro_rules! engine_debug {
    ($($arg:tt)*) => {{
        $crate::__log::debug!($($arg)*);
    }};
}

/// Logs an info-level message: run and batch milestones.
#[macro_export]
macro_rules! engine_info {
    ($($arg:tt)*) => {{
        $crate::__log::info!($($arg)*);
    }};
}

/// Logs a warn-level message: a skipped task, instance or mapping pass.
#[macro_export]
macro_rules! engine_warn {
    ($($arg:tt)*) => {{
        $crate::__log::warn!($($arg)*);
    }};
}

/// Logs an error-level message: a failed search or credential lookup.
#[macro_export]
macro_rules! engine_error {
    ($($arg:tt)*) => {{
        $crate::__log::error!($($arg)*);
    }};
}

/// Environment variable that overrides the level used by
/// [`initialize_for_tests`], e.g. `HARVESTER_TEST_LOG=trace`.
pub const TEST_LOG_ENV: &str = "HARVESTER_TEST_LOG";

/// Installs a terminal logger for tests. Safe to call from every test; only
/// the first call in a process installs anything.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, Config, TermLogger, TerminalMode};

    let level = std::env::var(TEST_LOG_ENV)
        .ok()
        .and_then(|raw| raw.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Debug);

    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
