// SPDX-License-Identifier: MIT OR Apache-2.0

//! The process-wide engine.
//!
//! Most applications want exactly one logger for the whole process, started
//! early in `main` and stopped on the way out.  This module holds that instance
//! and exposes the ingestion API as free functions, which is also what the
//! `log_*!` macros call.
//!
//! # Architecture
//!
//! The instance is a [`LogContext`] stored in a `OnceLock` and created on first
//! use, uninitialized.  All of its lifecycle rules apply unchanged: `init` is
//! idempotent while running, `uninit` drains and is safe to repeat, and logging
//! while not running does nothing.
//!
//! # Examples
//!
//! ## Start, log, stop
//!
//! ```
//! use slicelog::{Level, global_logger, log_info, log_warn};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("server.log");
//!
//! global_logger::init(&path, Level::Info).unwrap();
//! global_logger::set_slice_size(10 * 1024 * 1024);
//!
//! for i in 0..3 {
//!     log_info!("{} Hello World!", i);
//! }
//! log_warn!("disk at {}%", 91);
//!
//! global_logger::uninit();
//! let contents = std::fs::read_to_string(&path).unwrap();
//! assert_eq!(contents.lines().count(), 4);
//! ```
//!
//! ## Stopping on the way out
//!
//! Rust has no `atexit`.  Hold a [`ShutdownGuard`] in `main` instead; every
//! return path out of `main` then drains the engine.
//!
//! ```
//! use slicelog::{Config, global_logger, log_info};
//!
//! fn main() {
//!     let _shutdown = global_logger::shutdown_guard();
//!     global_logger::init_with(Config::new()).unwrap();
//!     log_info!("console only");
//! }
//! ```
//!
//! # Fatal
//!
//! [`fatal`] and `log_fatal!` never return.  They queue the record, stop the
//! engine so the record reaches the file, and exit the process with status 1.

use crate::Level;
use crate::config::Config;
use crate::context::LogContext;
use crate::error::Result;
use crate::log_record::CallSite;
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;

static GLOBAL_CONTEXT: OnceLock<LogContext> = OnceLock::new();

/// The process-wide engine, created uninitialized on first use.
pub fn global_context() -> &'static LogContext {
    GLOBAL_CONTEXT.get_or_init(LogContext::new)
}

/**
Starts the process-wide engine, persisting records at or above `level` to `path`.

An empty path means console-only.  Returns `Ok` if the engine is already running.
*/
pub fn init(path: impl AsRef<Path>, level: Level) -> Result<()> {
    global_context().init(Config::file(path).level(level))
}

/// Starts the process-wide engine with a full [`Config`].
pub fn init_with(config: Config) -> Result<()> {
    global_context().init(config)
}

/// Stops the process-wide engine, blocking until everything queued is written.
pub fn uninit() {
    global_context().uninit()
}

/// See [`LogContext::set_slice_size`].
pub fn set_slice_size(bytes: u64) {
    global_context().set_slice_size(bytes)
}

/// See [`LogContext::set_slice_duration`].
pub fn set_slice_duration(ms: u64) {
    global_context().set_slice_duration(ms)
}

/// See [`LogContext::log`].  Does not return for [`Level::Fatal`] while running.
pub fn log(level: Level, site: CallSite, args: fmt::Arguments<'_>) -> usize {
    global_context().log(level, site, args)
}

/// See [`LogContext::fatal`].
pub fn fatal(site: CallSite, args: fmt::Arguments<'_>) -> ! {
    global_context().fatal(site, args)
}

/// See [`LogContext::flush`].
pub fn flush() {
    global_context().flush()
}

/**
Stops the process-wide engine when dropped.

Create one at the top of `main`.
*/
#[derive(Debug)]
#[must_use = "the engine is stopped when the guard is dropped"]
pub struct ShutdownGuard {
    _private: (),
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        uninit();
    }
}

pub fn shutdown_guard() -> ShutdownGuard {
    ShutdownGuard { _private: () }
}
