// SPDX-License-Identifier: MIT OR Apache-2.0
/*!
The record queue.

An unbounded FIFO of owned records.  It has no locking of its own; the engine
only touches it while holding the context lock, and that lock is what linearizes
pushes from many producers against pops from the single drain worker.

There is deliberately no capacity limit.  A producer that outruns the disk grows
the queue instead of blocking, because logging must never stall the caller.
*/

use crate::error::{Error, Result};
use crate::log_record::LogRecord;
use std::collections::VecDeque;

#[derive(Debug, Default)]
pub struct RecordQueue {
    records: VecDeque<LogRecord>,
}

impl RecordQueue {
    pub fn new() -> Self {
        Self {
            records: VecDeque::new(),
        }
    }

    /**
    Appends a record at the tail.

    Growth is reserved fallibly, so an allocation failure comes back as
    [`Error::OutOfMemory`] and the caller decides what to do with the record.
    */
    pub fn push(&mut self, record: LogRecord) -> Result<()> {
        self.records
            .try_reserve(1)
            .map_err(|_| Error::OutOfMemory)?;
        self.records.push_back(record);
        Ok(())
    }

    /// Removes and returns the head, or `None` when empty.
    pub fn pop_front(&mut self) -> Option<LogRecord> {
        self.records.pop_front()
    }

    pub fn front(&self) -> Option<&LogRecord> {
        self.records.front()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Discards every queued record without processing it.
    pub fn clear(&mut self) {
        self.records.clear();
    }
}
