// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::Level;
use crate::logger::Logger;
use std::io::Write;

/**
A console logger that writes to stderr.

This is the default console for every engine.
 */
#[derive(Debug, Clone)]
pub struct StdErrorLogger {}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug/Clone: Already derived - appropriate for zero-sized struct
// - Copy: Implemented - safe for zero-sized struct with no heap allocation
// - PartialEq/Eq: Implemented - all instances are equivalent (zero-sized)
// - Default: Implemented - provides convenient zero-argument constructor
// - Send/Sync: Automatically implemented - zero-sized struct is always thread-safe

impl Copy for StdErrorLogger {}

impl PartialEq for StdErrorLogger {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for StdErrorLogger {}

impl Default for StdErrorLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl StdErrorLogger {
    pub const fn new() -> Self {
        Self {}
    }
}

impl Logger for StdErrorLogger {
    fn write_line(&self, _level: Level, line: &str) {
        // Keep stdout and stderr roughly in order when both go to a terminal.
        let _ = std::io::stdout().flush();
        let mut lock = std::io::stderr().lock();
        // Nowhere left to report a failing stderr.
        let _ = lock.write_all(line.as_bytes());
        let _ = lock.flush();
    }

    fn prepare_to_die(&self) {
        let _ = std::io::stderr().flush();
    }
}
