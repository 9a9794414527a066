// SPDX-License-Identifier: MIT OR Apache-2.0

//! The drain worker.
//!
//! One thread per running engine.  It sleeps on the context's wake condition
//! while the queue is empty, and when woken writes every queued record in FIFO
//! order, evaluating rotation after each one.  Once the engine leaves `Running`
//! it makes one last pass over the queue and exits, dropping (and so closing)
//! the file.
//!
//! ```text
//! WaitingForWork ──wake──▶ Draining ──queue empty, running──▶ WaitingForWork
//!                             │
//!                             └──queue empty, stopping──▶ Exiting (final drain)
//! ```
//!
//! The context lock is held only to pop a record, never while formatting or
//! writing it.

use crate::Level;
use crate::config::Config;
use crate::context::{Lifecycle, Shared};
use crate::file_sink::FileSink;
use crate::format::render_line;
use crate::log_record::LogRecord;
use crate::logger::Logger;
use crate::rotation::SliceSettings;
use std::fmt::Display;
use std::sync::Arc;

#[derive(Debug)]
pub(crate) struct Worker {
    shared: Arc<Shared>,
    sink: Option<FileSink>,
    minimum_level: Level,
    mirror: bool,
    console: Arc<dyn Logger>,
    line_max: usize,
}

impl Worker {
    pub(crate) fn new(shared: Arc<Shared>, sink: Option<FileSink>, config: &Config) -> Self {
        Self {
            shared,
            sink,
            minimum_level: config.level,
            mirror: config.mirror,
            console: config.console.clone(),
            line_max: config.line_max,
        }
    }

    pub(crate) fn run(mut self) {
        while self.wait_for_work() {
            self.drain();
        }
        // Exiting: whatever is still queued was accepted before the engine
        // stopped taking records, so it must reach the file.
        self.drain();
    }

    /// Blocks until there is work.  Returns `false` once the engine is stopping.
    fn wait_for_work(&self) -> bool {
        let mut state = self.shared.lock();
        while state.queue.is_empty() && state.lifecycle == Lifecycle::Running {
            state = self
                .shared
                .wake
                .wait(state)
                .unwrap_or_else(|e| e.into_inner());
        }
        state.lifecycle == Lifecycle::Running
    }

    /// Writes queued records one at a time until the queue is empty.
    fn drain(&mut self) {
        let mut wrote_previous = false;
        loop {
            let next = {
                let mut state = self.shared.lock();
                if wrote_previous {
                    state.written += 1;
                }
                let slices = state.slices;
                state.queue.pop_front().map(|record| (record, slices))
            };
            if wrote_previous {
                self.shared.progress.notify_all();
            }
            let Some((record, slices)) = next else {
                return;
            };
            self.process(&record, &slices);
            wrote_previous = true;
        }
    }

    fn process(&mut self, record: &LogRecord, slices: &SliceSettings) {
        let line = render_line(record, self.shared.platform.as_ref(), self.line_max);
        if self.mirror {
            self.console.write_line(record.level(), &line);
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        if record.level() >= self.minimum_level {
            if let Err(err) = sink.write_line(&line) {
                report(self.console.as_ref(), err);
                if !self.mirror {
                    self.console.write_line(record.level(), &line);
                }
            }
        }
        if slices.is_enabled() {
            let now_ms = self.shared.platform.now_ms();
            if let Err(err) = sink.rotate_if_needed(slices, now_ms) {
                report(self.console.as_ref(), err);
            }
        }
    }
}

/// Writes an engine diagnostic to the console.
pub(crate) fn report(console: &dyn Logger, what: impl Display) {
    console.write_line(Level::Error, &format!("slicelog: {what}\n"));
}

#[cfg(test)]
mod tests {
    use crate::{CallSite, Config, InMemoryLogger, Level, LogContext};
    use std::sync::Arc;

    fn site() -> CallSite {
        CallSite::new("worker.rs", 1, "process")
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_write_falls_back_to_the_console() {
        let console = Arc::new(InMemoryLogger::new());
        let ctx = LogContext::new();
        ctx.init(
            Config::file("/dev/full")
                .mirror(false)
                .console(console.clone()),
        )
        .unwrap();
        ctx.log(Level::Warn, site(), format_args!("no space"));
        ctx.log(Level::Info, site(), format_args!("still going"));
        ctx.uninit();

        let logs = console.drain_logs();
        let lines: Vec<&str> = logs.lines().collect();
        assert_eq!(lines.len(), 4, "{logs}");
        assert!(lines[0].starts_with("slicelog: failed to write to /dev/full"));
        assert!(lines[1].ends_with("] no space"));
        assert!(lines[2].starts_with("slicelog: failed to write"));
        assert!(lines[3].ends_with("] still going"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn mirrored_line_is_not_repeated_on_write_failure() {
        let console = Arc::new(InMemoryLogger::new());
        let ctx = LogContext::new();
        ctx.init(
            Config::file("/dev/full")
                .mirror(true)
                .console(console.clone()),
        )
        .unwrap();
        ctx.log(Level::Error, site(), format_args!("once"));
        ctx.uninit();

        let logs = console.drain_logs();
        assert_eq!(logs.matches("] once").count(), 1, "{logs}");
        assert!(logs.contains("slicelog: failed to write"));
    }

    #[test]
    fn failed_rotation_is_reported_and_writing_continues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app.log");
        // a non-empty directory where the first archive would go
        std::fs::create_dir_all(dir.path().join("app_1.log/blocker")).unwrap();
        let console = Arc::new(InMemoryLogger::new());
        let ctx = LogContext::new();
        ctx.init(
            Config::file(&path)
                .mirror(false)
                .slice_size(1)
                .console(console.clone()),
        )
        .unwrap();
        ctx.log(Level::Info, site(), format_args!("first"));
        ctx.log(Level::Info, site(), format_args!("second"));
        ctx.uninit();

        let logs = console.drain_logs();
        assert_eq!(logs.lines().count(), 1, "{logs}");
        assert!(logs.starts_with("slicelog: failed to rotate"));

        let archived = std::fs::read_to_string(dir.path().join("app_2.log")).unwrap();
        assert!(archived.contains("] first\n"));
        assert!(archived.ends_with("] second\n"));
        assert_eq!(std::fs::metadata(&path).unwrap().len(), 0);
    }
}
