// SPDX-License-Identifier: MIT OR Apache-2.0

//! The record type moved through the queue.
//!
//! A [`LogRecord`] is built once on the producing thread, with its timestamp and
//! thread id taken at that moment, and is never mutated afterwards.  The
//! formatted text lives in a [`Message`], which keeps short messages inline and
//! only allocates when the text does not fit.  Messages are never truncated.

use crate::Level;
use crate::error::{Error, Result};
use arrayvec::ArrayString;
use std::fmt::{self, Debug, Display, Write};

/// Bound on the inline message storage, in bytes.
pub const MSG_INLINE_MAX: usize = 3072;
/// Bound on the stored source file and function names, in bytes.
pub const NAME_MAX: usize = 128;

/**
Where a record was logged from.

The file is reduced to its base name.  Both names are cut at [`NAME_MAX`] bytes,
on a character boundary.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallSite {
    file: ArrayString<NAME_MAX>,
    line: u32,
    function: ArrayString<NAME_MAX>,
}

impl CallSite {
    pub fn new(file: &str, line: u32, function: &str) -> Self {
        Self {
            file: bounded_name(crate::sys::base_name(file)),
            line,
            function: bounded_name(function),
        }
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn function(&self) -> &str {
        &self.function
    }
}

impl Default for CallSite {
    fn default() -> Self {
        Self::new("", 0, "")
    }
}

fn bounded_name(name: &str) -> ArrayString<NAME_MAX> {
    let mut out = ArrayString::new();
    out.push_str(truncate_to_boundary(name, NAME_MAX));
    out
}

/// The longest prefix of `s` that is at most `max` bytes and ends on a char boundary.
pub(crate) fn truncate_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// The formatted payload of a record.
#[derive(Clone, PartialEq, Eq, Hash)]
pub enum Message {
    Inline(ArrayString<MSG_INLINE_MAX>),
    Heap(Box<str>),
}

impl Message {
    /**
    Formats `args`, inline when the result fits and on the heap otherwise.

    The heap buffer is reserved at exactly the formatted length.  If that
    reservation fails the record cannot be built and [`Error::OutOfMemory`] is
    returned rather than aborting the process.
    */
    pub fn format(args: fmt::Arguments<'_>) -> Result<Self> {
        if let Some(s) = args.as_str() {
            return Self::from_str_exact(s);
        }
        let mut inline = ArrayString::<MSG_INLINE_MAX>::new();
        if inline.write_fmt(args).is_ok() {
            return Ok(Message::Inline(inline));
        }

        let mut counter = LengthCounter(0);
        // Counting never fails; an error here can only come from a Display impl.
        let _ = counter.write_fmt(args);
        let mut heap = String::new();
        heap.try_reserve_exact(counter.0)
            .map_err(|_| Error::OutOfMemory)?;
        let _ = heap.write_fmt(args);
        Ok(Message::Heap(heap.into_boxed_str()))
    }

    fn from_str_exact(s: &str) -> Result<Self> {
        if let Ok(inline) = ArrayString::from(s) {
            return Ok(Message::Inline(inline));
        }
        let mut heap = String::new();
        heap.try_reserve_exact(s.len())
            .map_err(|_| Error::OutOfMemory)?;
        heap.push_str(s);
        Ok(Message::Heap(heap.into_boxed_str()))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Message::Inline(s) => s,
            Message::Heap(s) => s,
        }
    }

    pub fn len(&self) -> usize {
        self.as_str().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Message::Inline(_))
    }
}

impl Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(self.as_str(), f)
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

struct LengthCounter(usize);

impl Write for LengthCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0 += s.len();
        Ok(())
    }
}

/**
A log record.

Everything that identifies the event is captured on the producing thread: the
timestamp is the submission time, not the time the worker gets around to
writing it.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogRecord {
    level: Level,
    timestamp_ms: i64,
    thread_id: u64,
    call_site: CallSite,
    message: Message,
}

impl LogRecord {
    pub fn new(
        level: Level,
        timestamp_ms: i64,
        thread_id: u64,
        call_site: CallSite,
        message: Message,
    ) -> Self {
        Self {
            level,
            timestamp_ms,
            thread_id,
            call_site,
            message,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Submission time, milliseconds since the Unix epoch.
    pub fn timestamp_ms(&self) -> i64 {
        self.timestamp_ms
    }

    pub fn thread_id(&self) -> u64 {
        self.thread_id
    }

    pub fn call_site(&self) -> &CallSite {
        &self.call_site
    }

    pub fn message(&self) -> &Message {
        &self.message
    }
}

/*
Boilerplate notes for LogRecord:

IMPLEMENTED:
- Debug/Clone/PartialEq/Eq/Hash: derived, useful for tests and forwarding
- Accessors only: there are no setters, a record is immutable once built

NOT IMPLEMENTED:
- Default: a record without a timestamp or thread is not meaningful
- Display: the persisted rendering needs a calendar, see `format::render_line`
- Ord: records are ordered by the queue, not by their contents
*/
