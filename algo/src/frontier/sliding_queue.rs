/*
 * SPDX-FileCopyrightText: 2026 The dobfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crossbeam_utils::CachePadded;
use std::collections::TryReserveError;
use std::sync::atomic::{AtomicUsize, Ordering};
use sync_cell_slice::{SyncCell, SyncSlice};

/// A double-buffered, append-only queue of nodes.
///
/// The backing array has a fixed capacity and is partitioned by three
/// cursors: everything before `out_start` has already been consumed, the
/// *window* `[out_start..out_end)` is the part that can be iterated, and
/// `[out_end..in)` contains the nodes appended since the last call to
/// [`slide_window`](Self::slide_window). Appended nodes are invisible until
/// the window is slid, at which point the window becomes exactly the range
/// appended in the meantime.
///
/// A single owner can append with [`push_back`](Self::push_back). For
/// concurrent appends, [`split`](Self::split) returns the current window
/// together with an [`Appender`] that many threads can share; usually each
/// thread wraps the appender in a [`QueueBuffer`](super::QueueBuffer).
///
/// Since during a visit each node is appended at most once, a capacity equal
/// to the number of nodes is always sufficient. Exceeding the capacity is a
/// logic error and causes a panic.
///
/// # Examples
///
/// ```
/// use dobfs::frontier::SlidingQueue;
///
/// let mut queue = SlidingQueue::new(4);
/// queue.push_back(2);
/// assert!(queue.is_empty());
/// queue.slide_window();
/// assert_eq!(queue.window(), &[2]);
/// queue.push_back(0);
/// queue.push_back(1);
/// assert_eq!(queue.window(), &[2]);
/// queue.slide_window();
/// assert_eq!(queue.window(), &[0, 1]);
/// ```
pub struct SlidingQueue {
    shared: Box<[usize]>,
    shared_in: CachePadded<AtomicUsize>,
    out_start: usize,
    out_end: usize,
}

impl SlidingQueue {
    /// Creates an empty queue able to hold `capacity` appends.
    pub fn new(capacity: usize) -> Self {
        Self::from_backing(vec![0; capacity].into_boxed_slice())
    }

    /// Creates an empty queue able to hold `capacity` appends, returning an
    /// error if the backing array cannot be allocated.
    pub fn try_new(capacity: usize) -> Result<Self, TryReserveError> {
        let mut shared = Vec::new();
        shared.try_reserve_exact(capacity)?;
        shared.resize(capacity, 0);
        Ok(Self::from_backing(shared.into_boxed_slice()))
    }

    fn from_backing(shared: Box<[usize]>) -> Self {
        Self {
            shared,
            shared_in: CachePadded::new(AtomicUsize::new(0)),
            out_start: 0,
            out_end: 0,
        }
    }

    /// Returns the maximum number of appends between two [resets](Self::reset).
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.shared.len()
    }

    /// Appends a node; it will become visible after the next
    /// [`slide_window`](Self::slide_window).
    ///
    /// # Panics
    ///
    /// If the capacity of the queue is exceeded.
    #[inline]
    pub fn push_back(&mut self, node: usize) {
        let shared_in = self.shared_in.get_mut();
        assert!(
            *shared_in < self.shared.len(),
            "Sliding queue capacity ({}) exceeded",
            self.shared.len()
        );
        self.shared[*shared_in] = node;
        *shared_in += 1;
    }

    /// Returns true if the window is empty.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.out_start == self.out_end
    }

    /// Returns the number of nodes in the window.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.out_end - self.out_start
    }

    /// Returns the number of nodes appended since the last slide.
    #[inline(always)]
    pub fn num_pending(&self) -> usize {
        self.shared_in.load(Ordering::Relaxed) - self.out_end
    }

    /// Empties the queue, making the whole capacity available again.
    pub fn reset(&mut self) {
        *self.shared_in.get_mut() = 0;
        self.out_start = 0;
        self.out_end = 0;
    }

    /// Makes the nodes appended since the last slide the new window.
    ///
    /// The previous window is discarded.
    #[inline]
    pub fn slide_window(&mut self) {
        self.out_start = self.out_end;
        self.out_end = *self.shared_in.get_mut();
    }

    /// Returns the window.
    ///
    /// The window is stable until the next slide.
    #[inline(always)]
    pub fn window(&self) -> &[usize] {
        &self.shared[self.out_start..self.out_end]
    }

    /// Returns an iterator over the window.
    #[inline(always)]
    pub fn iter(&self) -> core::slice::Iter<'_, usize> {
        self.window().iter()
    }

    /// Returns the window and an [`Appender`] that can be used to append
    /// concurrently to the queue while the window is being read.
    ///
    /// The window and the pending part of the backing array are disjoint, so
    /// reading the first while appending to the second does not require any
    /// synchronization.
    pub fn split(&mut self) -> (&[usize], Appender<'_>) {
        let (out_start, out_end) = (self.out_start, self.out_end);
        let (head, tail) = self.shared.split_at_mut(out_end);
        (
            &head[out_start..],
            Appender {
                tail: tail.as_sync_slice(),
                base: out_end,
                shared_in: &self.shared_in,
            },
        )
    }
}

impl<'a> IntoIterator for &'a SlidingQueue {
    type Item = &'a usize;
    type IntoIter = core::slice::Iter<'a, usize>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl core::fmt::Debug for SlidingQueue {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SlidingQueue")
            .field("capacity", &self.capacity())
            .field("out_start", &self.out_start)
            .field("out_end", &self.out_end)
            .field("in", &self.shared_in.load(Ordering::Relaxed))
            .finish()
    }
}

/// A shareable handle appending to the pending part of a [`SlidingQueue`].
///
/// Each call to [`append`](Self::append) reserves a contiguous range of the
/// backing array with a single fetch-and-add on the shared append cursor and
/// then copies the nodes in the range; distinct calls thus never write the
/// same slot.
#[derive(Clone, Copy)]
pub struct Appender<'a> {
    tail: &'a [SyncCell<usize>],
    base: usize,
    shared_in: &'a AtomicUsize,
}

impl Appender<'_> {
    /// Appends a batch of nodes.
    ///
    /// # Panics
    ///
    /// If the capacity of the queue is exceeded.
    pub fn append(&self, nodes: &[usize]) {
        if nodes.is_empty() {
            return;
        }
        let start = self.shared_in.fetch_add(nodes.len(), Ordering::Relaxed) - self.base;
        assert!(
            start + nodes.len() <= self.tail.len(),
            "Sliding queue capacity ({}) exceeded",
            self.base + self.tail.len()
        );
        for (cell, &node) in self.tail[start..start + nodes.len()].iter().zip(nodes) {
            // The range has been reserved by the fetch-and-add above
            unsafe { cell.set(node) };
        }
    }
}

impl core::fmt::Debug for Appender<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Appender")
            .field("base", &self.base)
            .field("capacity", &(self.base + self.tail.len()))
            .finish()
    }
}
