/*
 * SPDX-FileCopyrightText: 2026 The dobfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Frontier representations.
//!
//! Top-down steps keep the frontier in a [`SlidingQueue`], which workers fill
//! concurrently through thread-private [`QueueBuffer`]s; bottom-up steps keep
//! the frontier in a dense [`Bitmap`].

mod bitmap;
pub use bitmap::*;

mod sliding_queue;
pub use sliding_queue::*;

mod queue_buffer;
pub use queue_buffer::*;
