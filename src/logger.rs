//! Console logging macros. Each line carries a coloured level tag and a UTC wall clock stamp.

/// Environment variable that enables [`event!`] output.
pub const EVENT_LOG_VAR: &str = "LOG_DEBRIS_EVENTS";

/// Whether per-record events are printed. Read once per process.
pub fn events_enabled() -> bool {
    static ENABLED: std::sync::OnceLock<bool> = std::sync::OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var_os(EVENT_LOG_VAR).is_some())
}

#[doc(hidden)]
#[macro_export]
macro_rules! emit_line {
    ($colour:literal, $tag:literal, $($arg:tt)*) => {
        println!(
            concat!("\x1b[", $colour, "m", $tag, "[{}]\x1b[0m {}"),
            chrono::Utc::now().format("%H:%M:%S"),
            format_args!($($arg)*)
        )
    };
}

#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => { $crate::emit_line!("32", "[INFO] ", $($arg)*) };
}

/// Routine progress, e.g. batch summaries.
#[macro_export]
macro_rules! log {
    ($($arg:tt)*) => { $crate::emit_line!("33", "[LOG]  ", $($arg)*) };
}

#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => { $crate::emit_line!("35", "[WARN] ", $($arg)*) };
}

#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => { $crate::emit_line!("31", "[ERROR]", $($arg)*) };
}

/// Logs and panics. Only for startup failures the service cannot run without.
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)*) => {
        panic!(
            "\x1b[1;31m[FATAL][{}]\x1b[0m {}",
            chrono::Utc::now().format("%H:%M:%S"),
            format_args!($($arg)*)
        )
    };
}

/// Per-record pipeline chatter, thousands of lines per catalog query.
/// Silent unless [`EVENT_LOG_VAR`] is set.
#[macro_export]
macro_rules! event {
    ($($arg:tt)*) => {
        if $crate::logger::events_enabled() {
            $crate::emit_line!("36", "[EVENT]", $($arg)*)
        }
    };
}
