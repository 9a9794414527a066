// SPDX-License-Identifier: MIT OR Apache-2.0
//! Rendering of persisted lines.

use crate::log_record::{LogRecord, truncate_to_boundary};
use crate::sys::Platform;
use std::fmt::Write;

/// Default bound on a rendered line, in bytes, including the newline.
pub const LINE_MAX: usize = 4096;

/**
Renders `record` as

```text
[YYYY/MM/DD hh:mm:ss.mmm][LEVEL][thread_id][source_file:line][function] message
```

followed by a newline.  A rendered line longer than `line_max` bytes is cut on a
character boundary; the newline is always kept.  `line_max == 0` disables the
bound.  The stored message is never affected.
*/
pub fn render_line(record: &LogRecord, platform: &dyn Platform, line_max: usize) -> String {
    let time = platform.calendar(record.timestamp_ms());
    let site = record.call_site();
    let message = record.message().as_str();

    let mut line = String::with_capacity(96 + site.file().len() + site.function().len() + message.len());
    let _ = write!(
        line,
        "[{}][{}][{}][{}:{}][{}] ",
        time.format("%Y/%m/%d %H:%M:%S%.3f"),
        record.level().as_str(),
        record.thread_id(),
        site.file(),
        site.line(),
        site.function(),
    );
    line.push_str(message);

    if line_max > 0 && line.len() + 1 > line_max {
        let keep = truncate_to_boundary(&line, line_max - 1).len();
        line.truncate(keep);
    }
    line.push('\n');
    line
}
