/*
 * SPDX-FileCopyrightText: 2026 The dobfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Direction-optimizing breadth-first search.
//!
//! The [driver](dobfs) alternates between two kinds of parallel steps:
//!
//! * a [top-down step](top_down_step) scans the successors of the nodes in the
//!   frontier, which is kept in a [`SlidingQueue`](crate::frontier::SlidingQueue);
//! * a [bottom-up step](bottom_up_step) scans the predecessors of every
//!   unvisited node looking for a node in the frontier, which is kept in a
//!   [`Bitmap`](crate::frontier::Bitmap).
//!
//! Top-down steps are cheap when the frontier is small; bottom-up steps are
//! cheap when the frontier is large, as most unvisited nodes find a parent
//! after examining a few predecessors. The driver estimates the number of
//! arcs the next top-down step would scan (the *scout count*) and switches to
//! bottom-up steps when it exceeds the number of arcs still unexplored divided
//! by [`alpha`](DobfsConfig::alpha); it switches back when the number of nodes
//! discovered by a bottom-up step (the *awake count*) stops growing and drops
//! below the number of nodes divided by [`beta`](DobfsConfig::beta).
//!
//! The result of a visit is an array of parents with the following encoding,
//! which is also used during the visit:
//!
//! * a nonnegative value is the parent of a visited node (the source is its
//!   own parent);
//! * [`UNVISITED`] (-1) marks an unvisited node;
//! * during the visit, a value smaller than -1 marks an unvisited node and
//!   its absolute value is the outdegree of the node.
//!
//! # Examples
//!
//! ```
//! use dobfs::prelude::*;
//! use dsi_progress_logger::no_logging;
//! use webgraph::graphs::vec_graph::VecGraph;
//!
//! let graph = VecGraph::from_arcs([(0, 1), (1, 2), (2, 3), (0, 4)]);
//! let transpose = VecGraph::from_arcs([(1, 0), (2, 1), (3, 2), (4, 0)]);
//! let tree = dobfs(
//!     &graph,
//!     &transpose,
//!     0,
//!     &DobfsConfig::default(),
//!     &thread_pool![],
//!     no_logging![],
//! )?;
//! assert_eq!(tree.parents(), &[0, 0, 1, 2, 0]);
//! # Ok::<(), dobfs::bfs::BfsError>(())
//! ```

mod driver;
pub use driver::*;

mod steps;
pub use steps::*;

use thiserror::Error;
use webgraph::utils::Granularity;

/// The parent of a node that has not been visited.
pub const UNVISITED: isize = -1;

/// The default value of [`DobfsConfig::alpha`].
pub const DEFAULT_ALPHA: usize = 15;

/// The default value of [`DobfsConfig::beta`].
pub const DEFAULT_BETA: usize = 18;

/// Parameters of a [direction-optimizing visit](dobfs).
#[derive(Debug, Clone, Copy)]
pub struct DobfsConfig {
    /// The visit switches to bottom-up steps when the scout count exceeds the
    /// number of unexplored arcs divided by `alpha`. Larger values switch
    /// earlier.
    pub alpha: usize,
    /// The visit switches back to top-down steps when the awake count drops
    /// below the number of nodes divided by `beta` (and it is not growing).
    /// Larger values stay longer in bottom-up mode.
    pub beta: usize,
    /// The size of parallel tasks.
    ///
    /// Loops over all nodes use its [node
    /// granularity](Granularity::node_granularity). Top-down steps use its
    /// [arc granularity](Granularity::arc_granularity) instead: the frontier
    /// is cut into chunks whose outdegrees sum tentatively to that number of
    /// arcs (see [`top_down_granularity`]), so a frontier made of a few hubs
    /// is still split among several threads.
    pub granularity: Granularity,
    /// The capacity of the [thread-private
    /// buffers](crate::frontier::QueueBuffer) used to fill the queue.
    pub buffer_capacity: usize,
}

impl Default for DobfsConfig {
    fn default() -> Self {
        Self {
            alpha: DEFAULT_ALPHA,
            beta: DEFAULT_BETA,
            granularity: Granularity::default(),
            buffer_capacity: crate::frontier::DEFAULT_BUFFER_CAPACITY,
        }
    }
}

impl DobfsConfig {
    /// Sets [`alpha`](Self::alpha).
    pub fn alpha(mut self, alpha: usize) -> Self {
        self.alpha = alpha;
        self
    }

    /// Sets [`beta`](Self::beta).
    pub fn beta(mut self, beta: usize) -> Self {
        self.beta = beta;
        self
    }

    /// Sets [`granularity`](Self::granularity).
    pub fn granularity(mut self, granularity: Granularity) -> Self {
        self.granularity = granularity;
        self
    }

    /// Sets [`buffer_capacity`](Self::buffer_capacity).
    pub fn buffer_capacity(mut self, buffer_capacity: usize) -> Self {
        self.buffer_capacity = buffer_capacity;
        self
    }

    /// Checks that all parameters are positive.
    pub fn validate(&self) -> Result<(), BfsError> {
        for (name, value) in [
            ("alpha", self.alpha),
            ("beta", self.beta),
            (
                "granularity",
                match self.granularity {
                    Granularity::Nodes(nodes) => nodes,
                    Granularity::Arcs(arcs) => usize::try_from(arcs).unwrap_or(usize::MAX),
                },
            ),
            ("buffer_capacity", self.buffer_capacity),
        ] {
            if value == 0 {
                return Err(BfsError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Errors preventing a visit from starting.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BfsError {
    #[error("Source node {node} does not exist (the graph has {num_nodes} nodes)")]
    InvalidSource { node: usize, num_nodes: usize },
    #[error("Invalid value {value} for parameter {name}: it must be positive")]
    InvalidParameter { name: &'static str, value: usize },
    #[error("Could not allocate the {what} for {num_nodes} nodes")]
    Allocation { what: &'static str, num_nodes: usize },
}

/// A step performed by the [driver](dobfs).
///
/// The sequence of steps of a visit is available from [`BfsTree::steps`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A top-down step.
    TopDown {
        /// The size of the frontier.
        frontier: usize,
        /// The sum of the outdegrees of the nodes discovered.
        scout_count: usize,
    },
    /// The frontier was moved from the queue to a bitmap.
    QueueToBitmap {
        /// The size of the frontier.
        nodes: usize,
    },
    /// A bottom-up step.
    BottomUp {
        /// The number of nodes discovered.
        awake_count: usize,
    },
    /// The frontier was moved from a bitmap to the queue.
    BitmapToQueue {
        /// The size of the frontier.
        nodes: usize,
    },
}

/// The breadth-first tree computed by a [visit](dobfs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BfsTree {
    source: usize,
    parents: Box<[isize]>,
    steps: Vec<Step>,
}

impl BfsTree {
    pub(crate) fn new(source: usize, parents: Box<[isize]>, steps: Vec<Step>) -> Self {
        Self {
            source,
            parents,
            steps,
        }
    }

    /// Returns the source of the visit.
    pub fn source(&self) -> usize {
        self.source
    }

    /// Returns the number of nodes of the visited graph.
    pub fn num_nodes(&self) -> usize {
        self.parents.len()
    }

    /// Returns the parent array: the parent of each visited node, or
    /// [`UNVISITED`].
    pub fn parents(&self) -> &[isize] {
        &self.parents
    }

    /// Returns the parent of `node`, or `None` if `node` has not been visited.
    #[inline(always)]
    pub fn parent(&self, node: usize) -> Option<usize> {
        usize::try_from(self.parents[node]).ok()
    }

    /// Returns whether `node` has been visited.
    #[inline(always)]
    pub fn is_visited(&self, node: usize) -> bool {
        self.parents[node] >= 0
    }

    /// Returns the number of visited nodes.
    pub fn num_visited(&self) -> usize {
        self.parents.iter().filter(|&&p| p >= 0).count()
    }

    /// Returns the steps performed by the visit, in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Returns the parent array, consuming the tree.
    pub fn into_parents(self) -> Box<[isize]> {
        self.parents
    }
}
