#![deny(missing_docs)]
//! Logging for the link management workspace.
//!
//! The `lm_*` macros forward to the `log` facade. On the thread that runs the
//! interactive event loop each line is prefixed with the sequence number of
//! the message being applied, so a log file reads as a trace of the loop:
//! `[#12] Applying Key(Enter)` followed by whatever that message caused.

use std::cell::Cell;

thread_local! {
    static MESSAGE_SEQ: Cell<u64> = const { Cell::new(0) };
}

/// Marks the start of the next message on this thread and returns its
/// sequence number, starting at 1.
pub fn begin_message() -> u64 {
    MESSAGE_SEQ.with(|seq| {
        let next = seq.get() + 1;
        seq.set(next);
        next
    })
}

/// Number of messages started on this thread. Zero off the event loop thread.
pub fn messages_seen() -> u64 {
    MESSAGE_SEQ.with(Cell::get)
}

/// Prefix for log lines written while a message is being applied.
#[doc(hidden)]
pub fn message_prefix() -> String {
    match messages_seen() {
        0 => String::new(),
        seq => format!("[#{seq}] "),
    }
}

/// Logs at trace level.
#[macro_export]
macro_rules! lm_trace {
    ($($arg:tt)*) => {{
        log::trace!("{}{}", $crate::message_prefix(), format_args!($($arg)*));
    }};
}

/// Logs at debug level.
#[macro_export]
macro_rules! lm_debug {
    ($($arg:tt)*) => {{
        log::debug!("{}{}", $crate::message_prefix(), format_args!($($arg)*));
    }};
}

/// Logs at info level.
#[macro_export]
macro_rules! lm_info {
    ($($arg:tt)*) => {{
        log::info!("{}{}", $crate::message_prefix(), format_args!($($arg)*));
    }};
}

/// Logs at warn level.
#[macro_export]
macro_rules! lm_warn {
    ($($arg:tt)*) => {{
        log::warn!("{}{}", $crate::message_prefix(), format_args!($($arg)*));
    }};
}

/// Logs at error level.
#[macro_export]
macro_rules! lm_error {
    ($($arg:tt)*) => {{
        log::error!("{}{}", $crate::message_prefix(), format_args!($($arg)*));
    }};
}

/// Installs a terminal logger for tests, showing only this workspace's
/// crates so HTTP mock servers stay quiet.
///
/// No-ops if another test already installed a logger.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    let config = ConfigBuilder::new()
        .add_filter_allow_str("linkmgmt")
        .build();

    let _ = TermLogger::init(level, config, TerminalMode::Mixed, ColorChoice::Auto);
}
