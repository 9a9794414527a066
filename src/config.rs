// SPDX-License-Identifier: MIT OR Apache-2.0

//! Engine configuration.
//!
//! A [`Config`] is handed to [`LogContext::init`](crate::LogContext::init).  It
//! says where records are persisted, which of them are persisted, how the file is
//! sliced, and where console output goes.
//!
//! ```rust
//! use slicelog::{Config, Level};
//! use std::time::Duration;
//!
//! let config = Config::file("logs/server.log")
//!     .level(Level::Info)
//!     .slice_size(10 * 1024 * 1024)
//!     .slice_duration(Duration::from_secs(3600));
//! assert_eq!(config.minimum_level(), Level::Info);
//! ```

use crate::Level;
use crate::format::LINE_MAX;
use crate::logger::Logger;
use crate::rotation::SliceSettings;
use crate::stderror_logger::StdErrorLogger;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) path: Option<PathBuf>,
    pub(crate) level: Level,
    pub(crate) slices: SliceSettings,
    pub(crate) mirror: bool,
    pub(crate) console: Arc<dyn Logger>,
    pub(crate) line_max: usize,
}

impl Config {
    /**
    A console-only configuration: nothing is persisted.

    Records are still mirrored to the console in debug builds.
    */
    pub fn new() -> Self {
        Self {
            path: None,
            level: Level::Debug,
            slices: SliceSettings::default(),
            mirror: cfg!(debug_assertions),
            console: Arc::new(StdErrorLogger::new()),
            line_max: LINE_MAX,
        }
    }

    /**
    Persists records to `path`.  An empty path means console-only.

    Missing parent directories are created at init.
    */
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::new().path(path)
    }

    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        self.path = if path.as_os_str().is_empty() {
            None
        } else {
            Some(path.to_path_buf())
        };
        self
    }

    /// The minimum level written to the file.  Lower levels are only mirrored.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Rotate once the active file grows beyond `bytes`.  Zero leaves it unset.
    pub fn slice_size(mut self, bytes: u64) -> Self {
        self.slices.size_bytes = bytes;
        self
    }

    /// Rotate once the active file is older than `duration`.  Zero leaves it unset.
    pub fn slice_duration(mut self, duration: Duration) -> Self {
        self.slices.duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Mirror every record to the console.  Defaults to on in debug builds only.
    pub fn mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    /// Where mirrored records, fallback lines and diagnostics go.  Defaults to stderr.
    pub fn console(mut self, console: Arc<dyn Logger>) -> Self {
        self.console = console;
        self
    }

    /// Bound on a rendered line in bytes.  Zero removes the bound.
    pub fn line_max(mut self, line_max: usize) -> Self {
        self.line_max = line_max;
        self
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn minimum_level(&self) -> Level {
        self.level
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
