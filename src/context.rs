// SPDX-License-Identifier: MIT OR Apache-2.0

//! The log context: one engine instance and its lifecycle.
//!
//! A [`LogContext`] owns the configuration, the record queue, the slice
//! thresholds and the drain worker.  It is cheap to clone; every clone is a handle
//! to the same engine.  The process-wide instance behind the free functions in
//! [`global_logger`](crate::global_logger) is just one of these stored in a
//! `OnceLock`, and tests build their own.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized ──init──▶ Initializing ──▶ Running ──uninit──▶ Draining ──▶ Uninitialized
//! ```
//!
//! Every transition happens under the context lock, so concurrent `init` and
//! `uninit` calls serialize: a call that finds the engine in a transitional
//! state waits for the transition to finish instead of racing it.
//!
//! # Concurrency
//!
//! Producers hold the lock only to push a record, and signal the worker after
//! releasing it.  The worker holds it only to pop.  File I/O never happens under
//! the lock, and only the worker ever touches the file.
//!
//! There is no backpressure.  A producer that outpaces the disk grows the queue.
//!
//! # Fatal records
//!
//! Logging at [`Level::Fatal`] on a running engine does not return: the record
//! is queued, the engine is shut down (which drains the queue to the file), and
//! the process exits with status 1.

use crate::Level;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::file_sink::FileSink;
use crate::format::{LINE_MAX, render_line};
use crate::log_record::{CallSite, LogRecord, Message};
use crate::logger::Logger;
use crate::queue::RecordQueue;
use crate::rotation::SliceSettings;
use crate::stderror_logger::StdErrorLogger;
use crate::sys::{NativePlatform, Platform};
use crate::worker::{Worker, report};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard};
use std::thread::JoinHandle;

/// Where an engine is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Uninitialized,
    Initializing,
    Running,
    Draining,
}

#[derive(Debug)]
pub(crate) struct State {
    pub(crate) lifecycle: Lifecycle,
    pub(crate) queue: RecordQueue,
    pub(crate) slices: SliceSettings,
    /// Records accepted into the queue since the last init.
    pub(crate) queued: u64,
    /// Records the worker has finished with since the last init.
    pub(crate) written: u64,
    generation: u64,
    console: Arc<dyn Logger>,
    worker: Option<JoinHandle<()>>,
}

#[derive(Debug)]
pub(crate) struct Shared {
    state: Mutex<State>,
    /// The worker waits here for records or a stop request.
    pub(crate) wake: Condvar,
    /// Lifecycle transitions and written records are announced here.
    pub(crate) progress: Condvar,
    /// Mirrors `lifecycle == Running`, so idle producers can skip formatting.
    accepting: AtomicBool,
    pub(crate) platform: Arc<dyn Platform>,
}

impl Shared {
    pub(crate) fn lock(&self) -> MutexGuard<'_, State> {
        // Every critical section leaves the state consistent, so a panic while
        // holding the lock does not invalidate it.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn wait_progress<'a>(&self, guard: MutexGuard<'a, State>) -> MutexGuard<'a, State> {
        self.progress.wait(guard).unwrap_or_else(|e| e.into_inner())
    }

    fn set_lifecycle(&self, state: &mut State, lifecycle: Lifecycle) {
        state.lifecycle = lifecycle;
        self.accepting
            .store(lifecycle == Lifecycle::Running, Ordering::Release);
    }
}

/**
An asynchronous, sliced file logger.

# Example

```rust
use slicelog::{Config, Level, LogContext, call_site};

let dir = tempfile::tempdir().unwrap();
let path = dir.path().join("app.log");

let ctx = LogContext::new();
ctx.init(Config::file(&path).level(Level::Info)).unwrap();
ctx.log(Level::Info, call_site!(), format_args!("{} Hello World!", 1));
ctx.log(Level::Debug, call_site!(), format_args!("not persisted"));
ctx.uninit();

let contents = std::fs::read_to_string(&path).unwrap();
assert!(contents.contains("[INFO]"));
assert!(contents.ends_with("] 1 Hello World!\n"));
assert!(!contents.contains("not persisted"));
```
*/
#[derive(Debug, Clone)]
pub struct LogContext {
    shared: Arc<Shared>,
}

impl LogContext {
    /// A new, uninitialized engine using the operating system's clock and thread ids.
    pub fn new() -> Self {
        Self::with_platform(Arc::new(NativePlatform))
    }

    pub fn with_platform(platform: Arc<dyn Platform>) -> Self {
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    lifecycle: Lifecycle::Uninitialized,
                    queue: RecordQueue::new(),
                    slices: SliceSettings::default(),
                    queued: 0,
                    written: 0,
                    generation: 0,
                    console: Arc::new(StdErrorLogger::new()),
                    worker: None,
                }),
                wake: Condvar::new(),
                progress: Condvar::new(),
                accepting: AtomicBool::new(false),
                platform,
            }),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.shared.lock().lifecycle
    }

    pub fn is_running(&self) -> bool {
        self.shared.accepting.load(Ordering::Acquire)
    }

    /**
    Starts the engine.

    Returns `Ok` immediately if the engine is already running.  If a file is
    configured its directories are created and it is opened for appending; a
    failure there, or a failure to start the worker, returns an error and leaves
    the engine uninitialized with nothing open.

    Non-zero slice thresholds in `config` are applied as if passed to
    [`Self::set_slice_size`] and [`Self::set_slice_duration`].
    */
    pub fn init(&self, config: Config) -> Result<()> {
        let shared = &self.shared;
        let mut state = shared.lock();
        loop {
            match state.lifecycle {
                Lifecycle::Running => return Ok(()),
                Lifecycle::Uninitialized => break,
                Lifecycle::Initializing | Lifecycle::Draining => {
                    state = shared.wait_progress(state);
                }
            }
        }
        shared.set_lifecycle(&mut state, Lifecycle::Initializing);
        drop(state);

        let now_ms = shared.platform.now_ms();
        let sink = match config.path.as_deref().map(|path| FileSink::open(path, now_ms)) {
            Some(Err(err)) => {
                self.abort_init();
                return Err(err);
            }
            Some(Ok(sink)) => Some(sink),
            None => None,
        };
        let worker = Worker::new(shared.clone(), sink, &config);

        let mut state = shared.lock();
        state.queue = RecordQueue::new();
        state.queued = 0;
        state.written = 0;
        state.generation += 1;
        state.console = config.console.clone();
        if config.slices.size_bytes > 0 {
            state.slices.size_bytes = config.slices.size_bytes;
        }
        if config.slices.duration_ms > 0 {
            state.slices.duration_ms = config.slices.duration_ms;
        }
        // The worker's first act is to take this lock, so it cannot observe the
        // engine before the lifecycle below is settled.
        let spawned = std::thread::Builder::new()
            .name("slicelog-drain".to_string())
            .spawn(move || worker.run());
        let result = match spawned {
            Ok(handle) => {
                state.worker = Some(handle);
                shared.set_lifecycle(&mut state, Lifecycle::Running);
                Ok(())
            }
            Err(err) => {
                shared.set_lifecycle(&mut state, Lifecycle::Uninitialized);
                Err(Error::WorkerStartFailure(err))
            }
        };
        drop(state);
        shared.progress.notify_all();
        result
    }

    fn abort_init(&self) {
        let mut state = self.shared.lock();
        self.shared
            .set_lifecycle(&mut state, Lifecycle::Uninitialized);
        drop(state);
        self.shared.progress.notify_all();
    }

    /**
    Stops the engine.

    Blocks until the worker has written every queued record and exited, then
    closes the file and resets the slice thresholds.  Does nothing if the engine
    is not running; if another thread is already stopping it, waits for that to
    finish.
    */
    pub fn uninit(&self) {
        let shared = &self.shared;
        let mut state = shared.lock();
        loop {
            match state.lifecycle {
                Lifecycle::Uninitialized => return,
                Lifecycle::Running => break,
                Lifecycle::Initializing => state = shared.wait_progress(state),
                Lifecycle::Draining => {
                    while state.lifecycle == Lifecycle::Draining {
                        state = shared.wait_progress(state);
                    }
                    return;
                }
            }
        }
        shared.set_lifecycle(&mut state, Lifecycle::Draining);
        let worker = state.worker.take();
        let console = state.console.clone();
        drop(state);
        shared.wake.notify_all();

        if let Some(worker) = worker {
            if worker.join().is_err() {
                report(console.as_ref(), "drain worker panicked, queued records were lost");
            }
        }

        let mut state = shared.lock();
        state.queue.clear();
        state.slices = SliceSettings::default();
        shared.set_lifecycle(&mut state, Lifecycle::Uninitialized);
        drop(state);
        shared.progress.notify_all();
    }

    /// Rotates once the active file exceeds `bytes`.  Zero is ignored.
    pub fn set_slice_size(&self, bytes: u64) {
        if bytes > 0 {
            self.shared.lock().slices.size_bytes = bytes;
        }
    }

    /// Rotates once the active file is older than `ms` milliseconds.  Zero is ignored.
    pub fn set_slice_duration(&self, ms: u64) {
        if ms > 0 {
            self.shared.lock().slices.duration_ms = ms;
        }
    }

    /**
    Queues a record and returns the length of the formatted message.

    Returns 0 without doing anything if the engine is not running.  The
    timestamp and thread id are captured here, on the calling thread.

    If the record cannot be allocated it is dropped and a diagnostic is written
    to the console; the caller is not told.

    # Fatal

    If `level` is [`Level::Fatal`] and the engine is running, this call does
    not return: it drains the engine and exits the process with status 1.
    */
    pub fn log(&self, level: Level, site: CallSite, args: fmt::Arguments<'_>) -> usize {
        if !self.is_running() {
            return 0;
        }
        let platform = &self.shared.platform;
        let timestamp_ms = platform.now_ms();
        let thread_id = platform.thread_id();
        let message = match Message::format(args) {
            Ok(message) => message,
            Err(err) => {
                let console = self.shared.lock().console.clone();
                report(console.as_ref(), err);
                return 0;
            }
        };
        let len = message.len();
        let record = LogRecord::new(level, timestamp_ms, thread_id, site, message);

        let mut state = self.shared.lock();
        if state.lifecycle != Lifecycle::Running {
            return 0;
        }
        let pushed = state.queue.push(record);
        match pushed {
            Ok(()) => state.queued += 1,
            Err(ref err) => report(state.console.as_ref(), err),
        }
        drop(state);
        self.shared.wake.notify_one();

        if level == Level::Fatal {
            self.uninit();
            std::process::exit(1);
        }
        len
    }

    /**
    Logs a fatal record, drains the engine and exits the process with status 1.

    If the engine is not running the line is written to the console instead of
    the file, and the process still exits.  If another thread is stopping the
    engine, its drain completes first.
    */
    pub fn fatal(&self, site: CallSite, args: fmt::Arguments<'_>) -> ! {
        self.log(Level::Fatal, site.clone(), args);

        // Only reached when the engine was not running.  Another thread may be
        // stopping it; let that drain finish before the process goes away.
        self.uninit();
        let platform = &self.shared.platform;
        let message = Message::format(args).unwrap_or_else(|_| Message::Inline(Default::default()));
        let record = LogRecord::new(
            Level::Fatal,
            platform.now_ms(),
            platform.thread_id(),
            site,
            message,
        );
        let console = self.shared.lock().console.clone();
        console.write_line(Level::Fatal, &render_line(&record, platform.as_ref(), LINE_MAX));
        console.prepare_to_die();
        std::process::exit(1)
    }

    /**
    Blocks until every record queued before this call has been processed by
    the worker, then flushes the console.

    Returns immediately if the engine is not running, and stops waiting if the
    engine is stopped meanwhile.
    */
    pub fn flush(&self) {
        let shared = &self.shared;
        let mut state = shared.lock();
        if state.lifecycle != Lifecycle::Running {
            return;
        }
        let target = state.queued;
        let generation = state.generation;
        while state.written < target
            && state.generation == generation
            && matches!(state.lifecycle, Lifecycle::Running | Lifecycle::Draining)
        {
            state = shared.wait_progress(state);
        }
        let console = state.console.clone();
        drop(state);
        console.prepare_to_die();
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::new()
    }
}

/*
Boilerplate notes for LogContext:

- Clone: handle semantics, clones share one engine
- Default: an uninitialized engine on the native platform
- PartialEq/Eq/Hash: NOT implemented, identity of an engine is not data equality
- Drop: NOT implemented, the worker holds its own handle so dropping a clone
  must not stop the engine; call `uninit`
*/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryLogger;
    use crate::sys::ManualPlatform;
    use std::path::Path;

    fn site(line: u32) -> CallSite {
        CallSite::new("context.rs", line, "tests")
    }

    fn lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn log_before_init_is_a_no_op() {
        let ctx = LogContext::new();
        assert_eq!(ctx.log(Level::Error, site(1), format_args!("dropped")), 0);
        assert_eq!(ctx.lifecycle(), Lifecycle::Uninitialized);
    }

    #[test]
    fn init_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = LogContext::new();
        ctx.init(Config::file(dir.path().join("a.log")).mirror(false))
            .unwrap();
        // a second init with a different path changes nothing
        ctx.init(Config::file(dir.path().join("b.log")).mirror(false))
            .unwrap();
        assert!(ctx.is_running());
        ctx.log(Level::Info, site(2), format_args!("to a"));
        ctx.uninit();

        assert_eq!(lines(&dir.path().join("a.log")).len(), 1);
        assert!(!dir.path().join("b.log").exists());
    }

    #[test]
    fn failed_init_leaves_nothing_running() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = LogContext::new();
        let err = ctx
            .init(Config::file(dir.path()).mirror(false))
            .unwrap_err();
        assert!(matches!(err, Error::InitFailure { .. }));
        assert_eq!(ctx.lifecycle(), Lifecycle::Uninitialized);
        assert!(!ctx.is_running());

        // and a later init still works
        ctx.init(Config::file(dir.path().join("ok.log")).mirror(false))
            .unwrap();
        ctx.uninit();
    }

    #[test]
    fn uninit_twice_is_harmless() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = LogContext::new();
        ctx.init(Config::file(dir.path().join("app.log")).mirror(false))
            .unwrap();
        ctx.uninit();
        ctx.uninit();
        assert_eq!(ctx.lifecycle(), Lifecycle::Uninitialized);
        assert_eq!(ctx.log(Level::Info, site(3), format_args!("late")), 0);
    }

    #[test]
    fn log_returns_formatted_length() {
        let ctx = LogContext::new();
        ctx.init(Config::new().mirror(false)).unwrap();
        assert_eq!(ctx.log(Level::Info, site(4), format_args!("{}-{}", 12, 345)), 6);
        ctx.uninit();
    }

    #[test]
    fn minimum_level_filters_the_file_but_not_the_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let console = Arc::new(InMemoryLogger::new());
        let ctx = LogContext::new();
        ctx.init(
            Config::file(&path)
                .level(Level::Warn)
                .mirror(true)
                .console(console.clone()),
        )
        .unwrap();
        ctx.log(Level::Debug, site(5), format_args!("quiet"));
        ctx.log(Level::Error, site(6), format_args!("loud"));
        ctx.uninit();

        let persisted = lines(&path);
        assert_eq!(persisted.len(), 1);
        assert!(persisted[0].contains("[ERROR]"));
        assert!(persisted[0].ends_with("loud"));

        let mirrored = console.drain_logs();
        assert!(mirrored.contains("quiet"));
        assert!(mirrored.contains("loud"));
    }

    #[test]
    fn thresholds_reset_on_uninit_and_zero_is_ignored() {
        let ctx = LogContext::new();
        ctx.set_slice_size(100);
        ctx.set_slice_size(0);
        ctx.set_slice_duration(0);
        assert_eq!(ctx.shared.lock().slices.size_bytes, 100);
        assert_eq!(ctx.shared.lock().slices.duration_ms, 0);

        ctx.init(Config::new().mirror(false).slice_duration(std::time::Duration::from_millis(7)))
            .unwrap();
        assert_eq!(
            ctx.shared.lock().slices,
            SliceSettings {
                size_bytes: 100,
                duration_ms: 7
            }
        );
        ctx.uninit();
        assert_eq!(ctx.shared.lock().slices, SliceSettings::default());
    }

    #[test]
    fn flush_waits_for_the_worker() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let ctx = LogContext::new();
        ctx.init(Config::file(&path).mirror(false)).unwrap();
        for n in 0..50 {
            ctx.log(Level::Info, site(7), format_args!("record {n}"));
        }
        ctx.flush();
        assert_eq!(lines(&path).len(), 50);
        ctx.uninit();
        ctx.flush();
    }

    #[test]
    fn timestamps_are_taken_at_submission() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        let platform = Arc::new(ManualPlatform::new(0));
        let ctx = LogContext::with_platform(platform.clone());
        ctx.init(Config::file(&path).mirror(false)).unwrap();

        let expected = platform
            .calendar(86_400_000 + 123)
            .format("%Y/%m/%d %H:%M:%S%.3f")
            .to_string();
        platform.set_ms(86_400_000 + 123);
        ctx.log(Level::Info, site(8), format_args!("stamped"));
        platform.set_ms(999_999_999);
        ctx.uninit();

        let persisted = lines(&path);
        assert!(persisted[0].starts_with(&format!("[{expected}]")));
    }
}
