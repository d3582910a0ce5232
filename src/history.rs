// Effitherm - Machine efficiency monitoring
// Copyright (c) 2025 Effitherm Engineering
//
// Licensed under AGPL-3.0. See LICENSE file for details.

//! Bounded sliding window of recent readings.

use crate::reading::Reading;
use std::collections::VecDeque;

/// Default window capacity.
pub const DEFAULT_CAPACITY: usize = 10;

/// Fixed-capacity, insertion-ordered window of the most recent readings.
///
/// Eviction is FIFO and silent; the window lives for the process session
/// only and is never persisted. Only the pipeline worker writes to it.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    buffer: VecDeque<Reading>,
    capacity: usize,
}

impl HistoryBuffer {
    /// Create a buffer with the default capacity of 10 readings.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a buffer with a custom capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a reading, evicting the oldest entry when full.
    pub fn push(&mut self, reading: Reading) {
        if self.buffer.len() == self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(reading);
    }

    /// Read-only view of the window, oldest first.
    pub fn snapshot(&self) -> Vec<Reading> {
        self.buffer.iter().cloned().collect()
    }

    /// Most recent reading, if any.
    pub fn latest(&self) -> Option<&Reading> {
        self.buffer.back()
    }

    /// Number of readings currently held.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Whether the window is empty.
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Maximum number of readings held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}
