//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# slicelog

slicelog is an asynchronous file logger with size- and time-based slicing.

# The problem

Writing a log line to disk from the thread that produced it puts file I/O on
every hot path that logs.  slicelog moves the I/O to one background thread:
callers format their message, push it onto a queue, and return.

# The implementation

* Producers build a record on their own thread.  The timestamp and thread id are
  taken at that moment, so the file reflects when things happened rather than
  when the worker got to them.
* Records go into an unbounded FIFO guarded by the engine's lock.  The lock is
  held only long enough to push or pop.
* A single drain worker writes records in queue order, one line each:

```text
[2024/03/09 07:05:01.042][WARN][4242][socket.rs:17][connect] peer closed
```

* After every write the worker checks the slice thresholds.  When the active
  file is too large (checked first) or too old, it is renamed to
  `<name>_<n><ext>` next to the original and a fresh file is opened at the
  configured path.
* Records below the minimum persisted level are not written to the file.  In
  debug builds every record is also mirrored to stderr.
* `uninit` blocks until the worker has written everything that was queued.

# The API

```rust
use slicelog::{Level, global_logger, log_info};

let dir = tempfile::tempdir().unwrap();
global_logger::init(dir.path().join("app.log"), Level::Info).unwrap();
global_logger::set_slice_duration(24 * 60 * 60 * 1000);

log_info!("listening on {}", 8080);

global_logger::uninit();
```

[`LogContext`] is the engine itself, for code that wants an explicit instance
instead of the process-wide one.

# Fatal

Logging at [`Level::Fatal`] never returns.  The record is queued, the engine is
stopped so the record reaches the file, and the process exits with status 1.

# Limits

There is no backpressure: a producer that outpaces the disk grows the queue
without bound.  Records still queued when the process dies without `uninit`
are lost.
*/

mod config;
mod context;
mod error;
mod file_sink;
mod format;
pub mod global_logger;
mod inmemory_logger;
mod level;
mod log_record;
mod logger;
#[doc(hidden)]
pub mod macros;
mod queue;
pub mod rotation;
mod stderror_logger;
pub mod sys;
mod worker;

pub use config::Config;
pub use context::{Lifecycle, LogContext};
pub use error::{Error, Result};
pub use format::{LINE_MAX, render_line};
pub use inmemory_logger::InMemoryLogger;
pub use level::{Level, ParseLevelError};
pub use log_record::{CallSite, LogRecord, MSG_INLINE_MAX, Message, NAME_MAX};
pub use logger::Logger;
pub use queue::RecordQueue;
pub use stderror_logger::StdErrorLogger;
pub use sys::{ManualPlatform, NativePlatform, Platform};
