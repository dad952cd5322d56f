/*
 * SPDX-FileCopyrightText: 2026 The dobfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use rayon::prelude::*;
use std::fmt::Display;
use webgraph::traits::RandomAccessGraph;

/// Size of a breadth-first tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TreeStats {
    /// The number of visited nodes.
    pub num_nodes: usize,
    /// The sum of the outdegrees of the visited nodes, that is, the number of
    /// arcs a top-down visit would scan.
    pub num_arcs: u64,
}

impl TreeStats {
    /// Computes the statistics of the tree described by `parents`, which must
    /// have length `graph.num_nodes()`.
    pub fn new(graph: &(impl RandomAccessGraph + Sync), parents: &[isize]) -> Self {
        assert_eq!(parents.len(), graph.num_nodes());
        parents
            .par_iter()
            .enumerate()
            .filter(|&(_, &parent)| parent >= 0)
            .map(|(node, _)| Self {
                num_nodes: 1,
                num_arcs: graph.outdegree(node) as u64,
            })
            .reduce(Self::default, |a, b| Self {
                num_nodes: a.num_nodes + b.num_nodes,
                num_arcs: a.num_arcs + b.num_arcs,
            })
    }
}

impl Display for TreeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BFS tree has {} nodes and {} arcs",
            self.num_nodes, self.num_arcs
        )
    }
}
