/*
 * SPDX-FileCopyrightText: 2026 The dobfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use rayon::prelude::*;
use std::sync::atomic::Ordering;
use sux::bits::AtomicBitVec;

/// A dense set of nodes represented by one bit per node.
///
/// The bitmap is used as the frontier of bottom-up steps: during a step one
/// bitmap is only read (the current frontier) and the other one is only
/// written (the next frontier). Bits are stored in an [`AtomicBitVec`], so
/// setting a bit is a word-level atomic OR that never disturbs the other bits
/// of the same word, and reads may happen concurrently with writes.
///
/// Two bitmaps are exchanged with [`std::mem::swap`], which moves the owned
/// buffers without copying their content.
pub struct Bitmap {
    bits: AtomicBitVec,
    len: usize,
}

impl Bitmap {
    /// Creates a cleared bitmap on `num_nodes` nodes.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            bits: AtomicBitVec::new(num_nodes),
            len: num_nodes,
        }
    }

    /// Returns the number of nodes the bitmap can represent.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the bitmap represents no node at all.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Clears all bits.
    ///
    /// The exclusive borrow guarantees that no step is using the bitmap.
    pub fn reset(&mut self) {
        self.bits.fill(false, Ordering::Relaxed);
    }

    /// Sets the bit of `node` when the caller owns the bitmap exclusively.
    #[inline(always)]
    pub fn set_bit(&mut self, node: usize) {
        self.bits.set(node, true, Ordering::Relaxed);
    }

    /// Sets the bit of `node`; safe under concurrent writers, including writers
    /// of other bits of the same word.
    #[inline(always)]
    pub fn set_bit_atomic(&self, node: usize) {
        self.bits.set(node, true, Ordering::Relaxed);
    }

    /// Returns whether the bit of `node` is set.
    #[inline(always)]
    pub fn get_bit(&self, node: usize) -> bool {
        self.bits.get(node, Ordering::Relaxed)
    }

    /// Returns the number of set bits, counted in parallel on the current
    /// rayon thread pool.
    pub fn count_ones(&self) -> usize {
        (0..self.len())
            .into_par_iter()
            .with_min_len(1 << 16)
            .filter(|&node| self.get_bit(node))
            .count()
    }
}

impl core::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Bitmap").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_reset() {
        let mut bitmap = Bitmap::new(200);
        assert_eq!(bitmap.len(), 200);
        assert!(!bitmap.is_empty());
        assert!((0..200).all(|node| !bitmap.get_bit(node)));

        bitmap.set_bit(0);
        bitmap.set_bit_atomic(63);
        bitmap.set_bit_atomic(64);
        bitmap.set_bit(199);
        assert!(bitmap.get_bit(0));
        assert!(bitmap.get_bit(63));
        assert!(bitmap.get_bit(64));
        assert!(bitmap.get_bit(199));
        assert!(!bitmap.get_bit(1));
        assert!(!bitmap.get_bit(65));
        assert_eq!(bitmap.count_ones(), 4);

        bitmap.reset();
        assert_eq!(bitmap.count_ones(), 0);
    }

    #[test]
    fn test_concurrent_set_same_word() {
        // Every thread sets bits interleaved with the bits of the others, so
        // all words are written concurrently.
        let bitmap = Bitmap::new(64 * 1000);
        (0..8_usize).into_par_iter().for_each(|t| {
            for node in (t..bitmap.len()).step_by(8) {
                if node % 3 != 0 {
                    bitmap.set_bit_atomic(node);
                }
            }
        });
        for node in 0..bitmap.len() {
            assert_eq!(bitmap.get_bit(node), node % 3 != 0, "node {node}");
        }
    }

    #[test]
    fn test_swap() {
        let mut front = Bitmap::new(10);
        let mut next = Bitmap::new(10);
        next.set_bit(3);
        std::mem::swap(&mut front, &mut next);
        assert!(front.get_bit(3));
        assert!(!next.get_bit(3));
    }
}
