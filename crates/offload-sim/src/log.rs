//! Logging facilities.
//!
//! The macros mirror the usual `log` ones but prefix every line with the simulated time,
//! a colored level tag and the name of the component that emits it:
//!
//! ```text
//! [12.345 DEBUG cloudlet] preempted task 17
//! ```

use atty::Stream;
use colored::{Color, ColoredString, Colorize};

/// Applies the color to the string if stderr (log) goes to console.
pub fn get_colored(s: &str, color: Color) -> ColoredString {
    if atty::is(Stream::Stderr) {
        s.color(color)
    } else {
        s.normal()
    }
}

/// Logs a message at the info level.
///
/// # Examples
///
/// ```rust
/// use offload_sim::log_info;
///
/// let now = 1.5;
/// log_info!(now, "simulation", "started");
/// log_info!(now, "simulation", "generated {} tasks", 2);
/// ```
#[macro_export]
macro_rules! log_info {
    ($time:expr, $name:expr, $msg:expr) => (
        log::info!(
            target: $name,
            "[{:.3} {}  {}] {}",
            $time, $crate::log::get_colored("INFO", $crate::colored::Color::Green), $name, $msg
        )
    );
    ($time:expr, $name:expr, $format:expr, $($arg:tt)+) => (
        log::info!(
            target: $name,
            concat!("[{:.3} {}  {}] ", $format),
            $time, $crate::log::get_colored("INFO", $crate::colored::Color::Green), $name, $($arg)+
        )
    );
}

/// Logs a message at the debug level.
///
/// See [`log_info!`](crate::log_info!).
#[macro_export]
macro_rules! log_debug {
    ($time:expr, $name:expr, $msg:expr) => (
        log::debug!(
            target: $name,
            "[{:.3} {} {}] {}",
            $time, $crate::log::get_colored("DEBUG", $crate::colored::Color::Blue), $name, $msg
        )
    );
    ($time:expr, $name:expr, $format:expr, $($arg:tt)+) => (
        log::debug!(
            target: $name,
            concat!("[{:.3} {} {}] ", $format),
            $time, $crate::log::get_colored("DEBUG", $crate::colored::Color::Blue), $name, $($arg)+
        )
    );
}

/// Logs a message at the trace level.
///
/// See [`log_info!`](crate::log_info!).
#[macro_export]
macro_rules! log_trace {
    ($time:expr, $name:expr, $msg:expr) => (
        log::trace!(
            target: $name,
            "[{:.3} {} {}] {}",
            $time, $crate::log::get_colored("TRACE", $crate::colored::Color::Cyan), $name, $msg
        )
    );
    ($time:expr, $name:expr, $format:expr, $($arg:tt)+) => (
        log::trace!(
            target: $name,
            concat!("[{:.3} {} {}] ", $format),
            $time, $crate::log::get_colored("TRACE", $crate::colored::Color::Cyan), $name, $($arg)+
        )
    );
}

/// Logs a message at the warn level.
///
/// See [`log_info!`](crate::log_info!).
#[macro_export]
macro_rules! log_warn {
    ($time:expr, $name:expr, $msg:expr) => (
        log::warn!(
            target: $name,
            "[{:.3} {}  {}] {}",
            $time, $crate::log::get_colored("WARN", $crate::colored::Color::Yellow), $name, $msg
        )
    );
    ($time:expr, $name:expr, $format:expr, $($arg:tt)+) => (
        log::warn!(
            target: $name,
            concat!("[{:.3} {}  {}] ", $format),
            $time, $crate::log::get_colored("WARN", $crate::colored::Color::Yellow), $name, $($arg)+
        )
    );
}

/// Logs a message at the error level.
///
/// See [`log_info!`](crate::log_info!).
#[macro_export]
macro_rules! log_error {
    ($time:expr, $name:expr, $msg:expr) => (
        log::error!(
            target: $name,
            "[{:.3} {} {}] {}",
            $time, $crate::log::get_colored("ERROR", $crate::colored::Color::Red), $name, $msg
        )
    );
    ($time:expr, $name:expr, $format:expr, $($arg:tt)+) => (
        log::error!(
            target: $name,
            concat!("[{:.3} {} {}] ", $format),
            $time, $crate::log::get_colored("ERROR", $crate::colored::Color::Red), $name, $($arg)+
        )
    );
}
