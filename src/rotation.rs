// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slicing decisions.
//!
//! Everything here is pure: [`decide`] looks at a file size, a clock reading and
//! the configured thresholds and says whether the active file should be archived.
//! The file sink carries the decision out.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Rotation thresholds.  Zero disables a dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SliceSettings {
    pub size_bytes: u64,
    pub duration_ms: u64,
}

impl SliceSettings {
    pub fn is_enabled(&self) -> bool {
        self.size_bytes > 0 || self.duration_ms > 0
    }
}

/// Per-file slicing progress, owned by whoever owns the active file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SliceState {
    /// Number of archives produced so far.  Never decreases.
    pub slice_count: u64,
    /// When the active file was opened or last rotated, epoch milliseconds.
    pub started_at_ms: i64,
}

impl SliceState {
    pub fn new(started_at_ms: i64) -> Self {
        Self {
            slice_count: 0,
            started_at_ms,
        }
    }

    /**
    Claims the next archive number.

    The number is consumed even if the archive is never produced, so every name
    handed out is unique for the lifetime of the state.
    */
    pub fn next_slice(&mut self) -> u64 {
        self.slice_count += 1;
        self.slice_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotateReason {
    Size,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotateDecision {
    None,
    Rotate(RotateReason),
}

/**
Decides whether the active file should be rotated after a write.

Size is checked before duration, and a single call reports at most one
rotation.

`file_size` is `None` when the size could not be determined, which only
disables the size predicate.
*/
pub fn decide(
    file_size: Option<u64>,
    now_ms: i64,
    state: &SliceState,
    settings: &SliceSettings,
) -> RotateDecision {
    if settings.size_bytes > 0 && file_size.is_some_and(|size| size > settings.size_bytes) {
        return RotateDecision::Rotate(RotateReason::Size);
    }
    if settings.duration_ms > 0 {
        let elapsed = now_ms.saturating_sub(state.started_at_ms);
        if elapsed > 0 && elapsed as u64 > settings.duration_ms {
            return RotateDecision::Rotate(RotateReason::Duration);
        }
    }
    RotateDecision::None
}

/**
The archive name for slice `n` of `base`.

`_<n>` is inserted in front of the extension, which starts at the first `.`
of the file name, so `logs/app.tar.log` becomes `logs/app_1.tar.log`.  A
name without a dot gets the suffix appended.  The archive stays in the
directory of `base`.
*/
pub fn archive_path(base: &Path, n: u64) -> PathBuf {
    let Some(name) = base.file_name() else {
        let mut raw = base.as_os_str().to_os_string();
        raw.push(format!("_{n}"));
        return PathBuf::from(raw);
    };
    let name = name.to_string_lossy();
    let (stem, ext) = match name.find('.') {
        Some(dot) => name.split_at(dot),
        None => (&*name, ""),
    };
    let mut archived = OsString::from(stem);
    archived.push(format!("_{n}{ext}"));
    base.with_file_name(archived)
}
