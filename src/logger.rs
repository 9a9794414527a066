// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::Level;
use std::fmt::Debug;

/**
The console side of the engine.

Every rendered record is mirrored here when mirroring is enabled, lines that
could not be persisted fall back to it, and the engine's own diagnostics are
written to it.  It is called from the drain worker, and from producers only on
the paths that never reach the worker.
*/
pub trait Logger: Debug + Send + Sync {
    /**
    Writes one rendered line.  `line` already ends with a newline.
    */
    fn write_line(&self, level: Level, line: &str);

    /**
    The application may imminently exit.  Ensure all buffers are flushed and up to date.
    */
    fn prepare_to_die(&self);
}

/*
Boilerplate notes.

# Logger

I don't think Clone on Logger makes sense, so copy's out.
PartialEq and Eq are possible but it's a little unclear if we mean data equality or some kind of provenance-based thing.  Let's avoid that and not implement it.
Default is not necessarily sensible since who knows how the logger is constructed.
Send/Sync are required: the drain worker holds the logger on its own thread.
*/
