// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error kinds reported by the engine.
//!
//! Only the `init` family returns these to a caller.  Everything that goes wrong
//! on the drain worker is handed to the console [`Logger`](crate::Logger) as a
//! one-line diagnostic instead, since the worker has nobody to return to.

use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The log directory could not be created or the log file could not be opened.
    #[error("failed to open log file {}: {source}", path.display())]
    InitFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The drain worker thread could not be spawned.
    #[error("failed to start drain worker: {0}")]
    WorkerStartFailure(#[source] io::Error),
    /// A record could not be allocated or queued and was dropped.
    #[error("out of memory, log record dropped")]
    OutOfMemory,
    /// Archiving the active file or reopening it failed.  Writing continues.
    #[error("failed to rotate {} to {}: {source}", from.display(), to.display())]
    RotationFailure {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: io::Error,
    },
    /// A persisted write failed.  The line was sent to the console instead.
    #[error("failed to write to {}: {source}", path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
