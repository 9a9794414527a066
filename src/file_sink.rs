// SPDX-License-Identifier: MIT OR Apache-2.0
/*!
The persisted log file.

A [`FileSink`] is created at init and then moved onto the drain worker, which
is the only thread that ever touches it.  Nothing here propagates past the
worker: failures come back as [`Error`] values for the worker to report.
*/

use crate::error::{Error, Result};
use crate::rotation::{self, RotateDecision, SliceSettings, SliceState};
use crate::sys::{ensure_parent_dir, file_exists};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub(crate) struct FileSink {
    path: PathBuf,
    file: File,
    slices: SliceState,
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl FileSink {
    /// Creates missing directories and opens `path` for appending.
    pub(crate) fn open(path: &Path, now_ms: i64) -> Result<Self> {
        let init_failure = |source| Error::InitFailure {
            path: path.to_path_buf(),
            source,
        };
        ensure_parent_dir(path).map_err(init_failure)?;
        let file = open_append(path).map_err(init_failure)?;
        Ok(Self {
            path: path.to_path_buf(),
            file,
            slices: SliceState::new(now_ms),
        })
    }

    /**
    Appends one rendered line.

    If the file was removed behind our back it is recreated first.  When that
    fails the write goes to the handle we already have, which is still better
    than nothing.
    */
    pub(crate) fn write_line(&mut self, line: &str) -> Result<()> {
        if !file_exists(&self.path) {
            if let Ok(file) = ensure_parent_dir(&self.path).and_then(|()| open_append(&self.path)) {
                self.file = file;
            }
        }
        self.file
            .write_all(line.as_bytes())
            .and_then(|()| self.file.flush())
            .map_err(|source| Error::WriteFailure {
                path: self.path.clone(),
                source,
            })
    }

    /**
    Rotates the active file if `settings` say so.

    Returns the archive path when a rotation happened.  On failure the current
    handle is kept and the next qualifying write tries again with a fresh
    archive number.
    */
    pub(crate) fn rotate_if_needed(
        &mut self,
        settings: &SliceSettings,
        now_ms: i64,
    ) -> Result<Option<PathBuf>> {
        let size = if settings.size_bytes > 0 {
            std::fs::metadata(&self.path).ok().map(|meta| meta.len())
        } else {
            None
        };
        match rotation::decide(size, now_ms, &self.slices, settings) {
            RotateDecision::None => Ok(None),
            RotateDecision::Rotate(_) => self.rotate(now_ms).map(Some),
        }
    }

    fn rotate(&mut self, now_ms: i64) -> Result<PathBuf> {
        let archive = rotation::archive_path(&self.path, self.slices.next_slice());
        let rotation_failure = |source| Error::RotationFailure {
            from: self.path.clone(),
            to: archive.clone(),
            source,
        };
        ensure_parent_dir(&archive).map_err(rotation_failure)?;
        std::fs::rename(&self.path, &archive).map_err(rotation_failure)?;
        self.slices.started_at_ms = now_ms;
        self.file = open_append(&self.path).map_err(rotation_failure)?;
        Ok(archive)
    }

    #[cfg(test)]
    pub(crate) fn slice_state(&self) -> SliceState {
        self.slices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_creates_directories_and_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/app.log");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "existing\n").unwrap();

        let mut sink = FileSink::open(&path, 0).unwrap();
        sink.write_line("appended\n").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "existing\nappended\n"
        );
    }

    #[test]
    fn open_fails_on_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileSink::open(dir.path(), 0).unwrap_err();
        assert!(matches!(err, Error::InitFailure { .. }));
    }

    #[test]
    fn deleted_file_is_recreated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/app.log");
        let mut sink = FileSink::open(&path, 0).unwrap();
        sink.write_line("one\n").unwrap();
        std::fs::remove_dir_all(dir.path().join("logs")).unwrap();

        sink.write_line("two\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "two\n");
    }

    #[test]
    fn size_rotation_archives_and_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = FileSink::open(&path, 0).unwrap();
        let settings = SliceSettings {
            size_bytes: 8,
            duration_ms: 0,
        };

        sink.write_line("1234\n").unwrap();
        assert_eq!(sink.rotate_if_needed(&settings, 0).unwrap(), None);
        sink.write_line("5678\n").unwrap();
        let archive = sink.rotate_if_needed(&settings, 0).unwrap().unwrap();

        assert_eq!(archive, dir.path().join("app_1.log"));
        assert_eq!(std::fs::read_to_string(&archive).unwrap(), "1234\n5678\n");
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);

        sink.write_line("next\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "next\n");
        assert_eq!(sink.slice_state().slice_count, 1);
    }

    #[test]
    fn duration_rotation_resets_the_clock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = FileSink::open(&path, 1_000).unwrap();
        let settings = SliceSettings {
            size_bytes: 0,
            duration_ms: 500,
        };

        sink.write_line("a\n").unwrap();
        assert_eq!(sink.rotate_if_needed(&settings, 1_400).unwrap(), None);
        sink.write_line("b\n").unwrap();
        assert!(sink.rotate_if_needed(&settings, 1_501).unwrap().is_some());
        assert_eq!(sink.slice_state().started_at_ms, 1_501);

        sink.write_line("c\n").unwrap();
        assert_eq!(sink.rotate_if_needed(&settings, 1_600).unwrap(), None);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "c\n");
    }

    #[test]
    fn failed_rotation_still_consumes_the_number() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let mut sink = FileSink::open(&path, 0).unwrap();
        // a non-empty directory in the way makes the rename fail
        std::fs::create_dir_all(dir.path().join("app_1.log/blocker")).unwrap();
        let settings = SliceSettings {
            size_bytes: 1,
            duration_ms: 0,
        };

        sink.write_line("first\n").unwrap();
        let err = sink.rotate_if_needed(&settings, 0).unwrap_err();
        assert!(matches!(err, Error::RotationFailure { .. }));

        // writing continues on the same file
        sink.write_line("second\n").unwrap();
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "first\nsecond\n"
        );

        let archive = sink.rotate_if_needed(&settings, 0).unwrap().unwrap();
        assert_eq!(archive, dir.path().join("app_2.log"));
    }
}
