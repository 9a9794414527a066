// SPDX-License-Identifier: MIT OR Apache-2.0

//! Logging macros.
//!
//! Each macro captures the call site (`file!()`, `line!()` and the enclosing
//! function's name) and forwards `format_args!` to the process-wide engine in
//! [`global_logger`](crate::global_logger).  The arguments are formatted on the
//! calling thread only if the engine is running.
//!
//! ```rust
//! # use slicelog::{log_debug, log_error, log_info};
//! let attempts = 3;
//! log_debug!("retrying, attempt {attempts}");
//! log_info!("{} Hello World!", 7);
//! log_error!("open failed: {}", "permission denied");
//! ```
//!
//! For an explicitly constructed [`LogContext`](crate::LogContext), use
//! [`call_site!`](crate::call_site) with its methods directly.

/// The name of the function a [`function_name!`](crate::function_name) expansion sits in.
///
/// `path` is the type name of a nested item, for example
/// `my_crate::server::accept::{{closure}}::here`.
#[doc(hidden)]
pub fn enclosing_function(path: &'static str) -> &'static str {
    let mut path = path.strip_suffix("::here").unwrap_or(path);
    while let Some(outer) = path.strip_suffix("::{{closure}}") {
        path = outer;
    }
    path.rsplit("::").next().unwrap_or(path)
}

/// Expands to the name of the enclosing function, as a `&'static str`.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn here() {}
        $crate::macros::enclosing_function(::std::any::type_name_of_val(&here))
    }};
}

/// Expands to a [`CallSite`](crate::CallSite) for the current location.
#[macro_export]
macro_rules! call_site {
    () => {
        $crate::CallSite::new(::std::file!(), ::std::line!(), $crate::function_name!())
    };
}

/// Logs at an explicit [`Level`](crate::Level).  Returns the formatted length, or 0.
#[macro_export]
macro_rules! log_at {
    ($level:expr, $($arg:tt)+) => {
        $crate::global_logger::log($level, $crate::call_site!(), ::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Info, $($arg)+) };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)+) => { $crate::log_at!($crate::Level::Error, $($arg)+) };
}

/**
Logs a fatal record, drains the engine and exits with status 1.

The expansion has type `!`, so code after it is unreachable.
*/
#[macro_export]
macro_rules! log_fatal {
    ($($arg:tt)+) => {
        $crate::global_logger::fatal($crate::call_site!(), ::std::format_args!($($arg)+))
    };
}
