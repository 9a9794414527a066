// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform capabilities the engine depends on.
//!
//! The core never asks the operating system for the time or the current thread
//! directly; it goes through [`Platform`].  [`NativePlatform`] is what the
//! process-wide engine uses.  [`ManualPlatform`] has a clock that only moves when
//! told to, which makes time-based slicing reproducible.
//!
//! The small path helpers at the bottom wrap `std::fs` with the exact semantics
//! the file sink needs.

use chrono::{DateTime, Local, TimeZone};
use std::fmt::Debug;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};

pub trait Platform: Debug + Send + Sync {
    /// Wall-clock time in milliseconds since the Unix epoch.
    fn now_ms(&self) -> i64;

    /// An identifier for the calling thread, stable for the thread's lifetime.
    fn thread_id(&self) -> u64;

    /// Calendar time for a value previously returned by [`Self::now_ms`].
    fn calendar(&self, epoch_ms: i64) -> DateTime<Local> {
        Local
            .timestamp_millis_opt(epoch_ms)
            .single()
            .unwrap_or_else(|| DateTime::<chrono::Utc>::default().with_timezone(&Local))
    }
}

/// The operating system's clock and thread ids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NativePlatform;

impl Platform for NativePlatform {
    fn now_ms(&self) -> i64 {
        Local::now().timestamp_millis()
    }

    fn thread_id(&self) -> u64 {
        os_thread_id()
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn os_thread_id() -> u64 {
    // SAFETY: gettid takes no arguments and cannot fail.
    unsafe { libc::syscall(libc::SYS_gettid) as u64 }
}

#[cfg(all(unix, not(any(target_os = "linux", target_os = "android"))))]
fn os_thread_id() -> u64 {
    // SAFETY: pthread_self is always safe to call.
    unsafe { libc::pthread_self() as usize as u64 }
}

#[cfg(not(unix))]
fn os_thread_id() -> u64 {
    use std::sync::atomic::AtomicU64;
    static NEXT_ID: AtomicU64 = AtomicU64::new(1);
    thread_local! {
        static ID: u64 = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    }
    ID.with(|id| *id)
}

/**
A platform whose clock is set by hand.

Thread ids still come from the operating system.
*/
#[derive(Debug, Default)]
pub struct ManualPlatform {
    now_ms: AtomicI64,
}

impl ManualPlatform {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(start_ms),
        }
    }

    pub fn set_ms(&self, ms: i64) {
        self.now_ms.store(ms, Ordering::SeqCst);
    }

    pub fn advance_ms(&self, ms: i64) {
        self.now_ms.fetch_add(ms, Ordering::SeqCst);
    }
}

impl Platform for ManualPlatform {
    fn now_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn thread_id(&self) -> u64 {
        os_thread_id()
    }
}

/// Creates every missing directory above `path`.
pub(crate) fn ensure_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

pub(crate) fn file_exists(path: &Path) -> bool {
    path.try_exists().unwrap_or(false)
}

/// The final component of a `/` or `\` separated path.
pub(crate) fn base_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_name_handles_both_separators() {
        assert_eq!(base_name("src/engine/worker.rs"), "worker.rs");
        assert_eq!(base_name(r"C:\work\main.c"), "main.c");
        assert_eq!(base_name("lib.rs"), "lib.rs");
    }

    #[test]
    fn manual_clock_only_moves_when_told() {
        let platform = ManualPlatform::new(1_000);
        assert_eq!(platform.now_ms(), 1_000);
        platform.advance_ms(250);
        assert_eq!(platform.now_ms(), 1_250);
        platform.set_ms(5);
        assert_eq!(platform.now_ms(), 5);
    }

    #[test]
    fn thread_ids_differ_between_threads() {
        let here = NativePlatform.thread_id();
        let there = std::thread::spawn(|| NativePlatform.thread_id())
            .join()
            .unwrap();
        assert_ne!(here, there);
        assert_eq!(here, NativePlatform.thread_id());
    }

    #[test]
    fn parent_dirs_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c/app.log");
        ensure_parent_dir(&nested).unwrap();
        assert!(dir.path().join("a/b/c").is_dir());
        assert!(!file_exists(&nested));
    }
}
