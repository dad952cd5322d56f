/*
 * SPDX-FileCopyrightText: 2026 The dobfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::Appender;

/// The default capacity of a [`QueueBuffer`].
pub const DEFAULT_BUFFER_CAPACITY: usize = 16384;

/// A thread-private buffer batching appends to a
/// [`SlidingQueue`](super::SlidingQueue).
///
/// Nodes are accumulated locally and moved to the queue in bulk when the
/// buffer is full, when [`flush`](Self::flush) is called, and when the buffer
/// is dropped. In this way the shared append cursor of the queue is touched
/// once per batch rather than once per node.
///
/// Since the buffer flushes itself on drop, nodes cannot be lost when a
/// parallel region ends, even if the worker leaves its loop early.
///
/// # Examples
///
/// ```
/// use dobfs::frontier::{QueueBuffer, SlidingQueue};
/// use rayon::prelude::*;
///
/// let mut queue = SlidingQueue::new(100);
/// let (_, appender) = queue.split();
/// (0..100).into_par_iter().for_each_init(
///     || QueueBuffer::with_capacity(appender, 8),
///     |buffer, node| buffer.push_back(node),
/// );
/// queue.slide_window();
/// assert_eq!(queue.len(), 100);
/// ```
#[derive(Debug)]
pub struct QueueBuffer<'a> {
    local: Vec<usize>,
    capacity: usize,
    appender: Appender<'a>,
}

impl<'a> QueueBuffer<'a> {
    /// Creates a buffer of [default capacity](DEFAULT_BUFFER_CAPACITY).
    pub fn new(appender: Appender<'a>) -> Self {
        Self::with_capacity(appender, DEFAULT_BUFFER_CAPACITY)
    }

    /// Creates a buffer holding at most `capacity` nodes between flushes.
    ///
    /// # Panics
    ///
    /// If `capacity` is zero.
    pub fn with_capacity(appender: Appender<'a>, capacity: usize) -> Self {
        assert!(capacity > 0, "The capacity of a queue buffer must be positive");
        Self {
            local: Vec::with_capacity(capacity),
            capacity,
            appender,
        }
    }

    /// Adds a node to the buffer, flushing first if the buffer is full.
    #[inline]
    pub fn push_back(&mut self, node: usize) {
        if self.local.len() == self.capacity {
            self.flush();
        }
        self.local.push(node);
    }

    /// Moves the buffered nodes to the queue.
    pub fn flush(&mut self) {
        self.appender.append(&self.local);
        self.local.clear();
    }

    /// Returns the number of buffered nodes.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.local.len()
    }

    /// Returns true if no node is buffered.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.local.is_empty()
    }
}

impl Drop for QueueBuffer<'_> {
    fn drop(&mut self) {
        // Flushing while unwinding could panic again on a full queue
        if !std::thread::panicking() {
            self.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontier::SlidingQueue;

    #[test]
    fn test_flush_when_full() {
        let mut queue = SlidingQueue::new(10);
        let (_, appender) = queue.split();
        let mut buffer = QueueBuffer::with_capacity(appender, 3);
        for node in 0..3 {
            buffer.push_back(node);
        }
        assert_eq!(buffer.len(), 3);
        // The fourth push flushes the first three nodes
        buffer.push_back(3);
        assert_eq!(buffer.len(), 1);
        buffer.flush();
        assert!(buffer.is_empty());
        buffer.flush();
        drop(buffer);
        queue.slide_window();
        assert_eq!(queue.window(), &[0, 1, 2, 3]);
    }

    #[test]
    fn test_preallocated() {
        let mut queue = SlidingQueue::new(100);
        let (_, appender) = queue.split();
        let mut buffer = QueueBuffer::with_capacity(appender, 64);
        let local = buffer.local.as_ptr();
        assert!(buffer.local.capacity() >= 64);
        for node in 0..64 {
            buffer.push_back(node);
        }
        // Filling the buffer never reallocates
        assert_eq!(buffer.local.as_ptr(), local);
        buffer.push_back(64);
        assert_eq!(buffer.local.as_ptr(), local);
    }

    #[test]
    fn test_flush_on_drop() {
        let mut queue = SlidingQueue::new(10);
        {
            let (_, appender) = queue.split();
            let mut buffer = QueueBuffer::new(appender);
            buffer.push_back(7);
            buffer.push_back(8);
        }
        queue.slide_window();
        assert_eq!(queue.window(), &[7, 8]);
    }

    #[test]
    fn test_multiple_buffers() {
        let mut queue = SlidingQueue::new(10);
        {
            let (_, appender) = queue.split();
            let mut first = QueueBuffer::new(appender);
            let mut second = QueueBuffer::new(appender);
            first.push_back(1);
            second.push_back(2);
            second.flush();
            first.push_back(3);
        }
        queue.slide_window();
        // The second buffer flushed first, reserving the first slot
        assert_eq!(queue.window(), &[2, 1, 3]);
    }
}
