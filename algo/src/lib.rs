/*
 * SPDX-FileCopyrightText: 2026 The dobfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#![doc = include_str!("../README.md")]
#![deny(unstable_features)]
#![deny(trivial_casts)]
#![deny(unconditional_recursion)]
#![deny(clippy::empty_loop)]
#![deny(unreachable_code)]
#![deny(unreachable_pub)]
#![deny(unreachable_patterns)]
#![deny(unused_macro_rules)]
#![deny(unused_doc_comments)]

pub mod bfs;
pub mod build;
pub mod frontier;
pub mod source;
pub mod stats;
pub mod verify;

/// Creates a [`ThreadPool`](rayon::ThreadPool) with default parameters or
/// with a given number of threads.
///
/// # Examples
///
/// ```
/// use dobfs::thread_pool;
///
/// let t = thread_pool![];
/// let t = thread_pool![4];
/// assert_eq!(t.current_num_threads(), 4);
/// ```
#[macro_export]
macro_rules! thread_pool {
    () => {
        rayon::ThreadPoolBuilder::new()
            .build()
            .expect("Cannot build a ThreadPool with default parameters")
    };
    ($num_threads:expr) => {
        rayon::ThreadPoolBuilder::new()
            .num_threads($num_threads)
            .build()
            .unwrap_or_else(|_| {
                panic!(
                    "Cannot build a ThreadPool with {} threads",
                    $num_threads,
                )
            })
    };
}

pub mod prelude {
    pub use crate::bfs::{dobfs, BfsError, BfsTree, DobfsConfig, Step, UNVISITED};
    pub use crate::build::{BuiltGraph, GraphBuilder};
    pub use crate::frontier::{Bitmap, QueueBuffer, SlidingQueue};
    pub use crate::source::SourcePicker;
    pub use crate::stats::TreeStats;
    pub use crate::thread_pool;
    pub use crate::verify::{bfs_depths, verify, VerifyError};
}
