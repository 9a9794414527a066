// SPDX-License-Identifier: MIT OR Apache-2.0
use std::fmt::Display;
use std::str::FromStr;

/// Severity of a log record, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Level {
    /// Diagnostic detail, usually only persisted while debugging
    #[default]
    Debug,
    /// Normal operation
    Info,
    /// Suspicious condition, the program can continue
    Warn,
    /// Runtime error, typically a failed system call
    Error,
    /// The program cannot continue.  Logging at this level terminates the process.
    Fatal,
}

impl Level {
    pub const ALL: [Level; 5] = [
        Level::Debug,
        Level::Info,
        Level::Warn,
        Level::Error,
        Level::Fatal,
    ];

    /**
    Converts a raw severity into a level.

    Unknown severities are treated as the most severe, so a corrupted or
    out-of-range value can never silence a record.
    */
    pub const fn from_raw(raw: i32) -> Self {
        match raw {
            0 => Level::Debug,
            1 => Level::Info,
            2 => Level::Warn,
            3 => Level::Error,
            _ => Level::Fatal,
        }
    }

    /**
    Converts a raw threshold into a level, saturating at both ends.

    Used for the minimum persisted level, where a value below `Debug` means
    "persist everything" rather than "persist only fatal records".
    */
    pub const fn clamped(raw: i32) -> Self {
        if raw <= 0 {
            Level::Debug
        } else {
            Level::from_raw(raw)
        }
    }

    /// The literal written into the `[LEVEL]` column of a persisted line.
    pub const fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
            Level::Fatal => "FATAL",
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a [`Level`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log level {0:?}")]
pub struct ParseLevelError(String);

impl FromStr for Level {
    type Err = ParseLevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Level::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseLevelError(s.to_string()))
    }
}

/*
Boilerplate notes for Level:

- Copy/Clone/Eq/Ord/Hash: derived, a level is a small value and its ordering is its meaning
- Default: Debug, the threshold that persists everything
- Display: the persisted literal, so `format!("{}", level)` matches the file contents
- From<i32>: NOT implemented, because there are two reasonable conversions
  (`from_raw` for record severities, `clamped` for thresholds) and picking one silently would be a trap
*/
