// SPDX-License-Identifier: MIT OR Apache-2.0

//! # In-Memory Logger
//!
//! A console [`Logger`] that keeps lines in memory instead of printing them.
//! It is what the test suite uses to observe the debug mirror, write fallbacks
//! and engine diagnostics, and it works just as well for an application that
//! wants to show recent log lines in its own UI.
//!
//! ## Architecture
//!
//! Lines are stored in a `Mutex<Vec<String>>`.  The drain worker is the only
//! writer in practice, but any thread may read.

use crate::Level;
use crate::logger::Logger;
use std::sync::Mutex;

/// A console logger that stores each line, without its trailing newline, in a `Vec<String>`.
///
/// # Example
///
/// ```rust
/// use slicelog::{Config, InMemoryLogger, Level, LogContext, call_site};
/// use std::sync::Arc;
///
/// let console = Arc::new(InMemoryLogger::new());
/// let ctx = LogContext::new();
/// ctx.init(Config::new().mirror(true).console(console.clone())).unwrap();
/// ctx.log(Level::Info, call_site!(), format_args!("hello {}", 42));
/// ctx.uninit();
///
/// assert!(console.drain_logs().contains("hello 42"));
/// ```
#[derive(Debug)]
pub struct InMemoryLogger {
    logs: Mutex<Vec<String>>,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug: Derived for diagnostic purposes and required by Logger trait
// - Default: Implemented with obvious zero-value (empty log buffer)
// - Clone: NOT implemented - share it with Arc instead
// - PartialEq/Eq: NOT implemented - equality semantics unclear for loggers
// - Send/Sync: Automatically implemented due to Mutex usage (required for Logger trait)

impl Default for InMemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLogger {
    pub fn new() -> Self {
        Self {
            logs: Mutex::new(Vec::new()),
        }
    }

    /// Drains all lines into a single string joined by newlines, clearing the buffer.
    pub fn drain_logs(&self) -> String {
        let mut logs = self.logs.lock().unwrap_or_else(|e| e.into_inner());
        let result = logs.join("\n");
        logs.clear();
        result
    }

    /// Number of lines currently held.
    pub fn len(&self) -> usize {
        self.logs.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Logger for InMemoryLogger {
    fn write_line(&self, _level: Level, line: &str) {
        let line = line.strip_suffix('\n').unwrap_or(line);
        let mut logs = self.logs.lock().unwrap_or_else(|e| e.into_inner());
        logs.push(line.to_string());
    }

    /// Nothing is buffered outside the vector, so there is nothing to flush.
    fn prepare_to_die(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_clears() {
        let logger = InMemoryLogger::new();
        logger.write_line(Level::Info, "first\n");
        logger.write_line(Level::Warn, "second\n");
        assert_eq!(logger.len(), 2);
        assert_eq!(logger.drain_logs(), "first\nsecond");
        assert!(logger.is_empty());
        assert_eq!(logger.drain_logs(), "");
    }
}
