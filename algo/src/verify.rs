/*
 * SPDX-FileCopyrightText: 2026 The dobfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Verification of breadth-first trees against a sequential visit.
//!
//! A parent array is a valid breadth-first tree of a graph from a source if
//! the source is its own parent, the nodes with a parent are exactly the nodes
//! reachable from the source, and each parent is a predecessor of its child
//! whose distance from the source is smaller by one.

use std::collections::VecDeque;
use thiserror::Error;
use webgraph::traits::RandomAccessGraph;

/// The reasons why a parent array is not a breadth-first tree.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    #[error("The parent array has length {actual}, but the graph has {expected} nodes")]
    LengthMismatch { expected: usize, actual: usize },
    #[error("The source {source_node} is not a node (the graph has {num_nodes} nodes)")]
    InvalidSource { source_node: usize, num_nodes: usize },
    #[error("The parent of the source {source_node} is {parent} instead of the source itself")]
    WrongSource { source_node: usize, parent: isize },
    #[error("Node {node} has invalid parent {parent}")]
    InvalidParent { node: usize, parent: isize },
    #[error("Node {node} is reachable from the source, but it has not been visited")]
    NotVisited { node: usize },
    #[error("Node {node} has been visited, but it is not reachable from the source")]
    NotReachable { node: usize },
    #[error("Node {node} has depth {depth}, but its parent {parent} has depth {parent_depth:?}")]
    WrongDepth {
        node: usize,
        depth: usize,
        parent: usize,
        parent_depth: Option<usize>,
    },
    #[error("Node {node} has parent {parent}, but there is no arc from {parent} to {node}")]
    MissingArc { node: usize, parent: usize },
}

/// Returns the distance from `source` of each node of `graph`, or `None` for
/// nodes that are not reachable from `source`.
///
/// This is a sequential visit intended as a reference.
///
/// # Panics
///
/// If `source` is not a node of `graph`.
pub fn bfs_depths(graph: &impl RandomAccessGraph, source: usize) -> Box<[Option<usize>]> {
    let mut depths = vec![None; graph.num_nodes()];
    let mut queue = VecDeque::new();
    depths[source] = Some(0);
    queue.push_back(source);
    while let Some(node) = queue.pop_front() {
        let depth = depths[node].map(|d| d + 1);
        for succ in graph.successors(node) {
            if depths[succ].is_none() {
                depths[succ] = depth;
                queue.push_back(succ);
            }
        }
    }
    depths.into_boxed_slice()
}

/// Checks that `parents` is a breadth-first tree of `graph` from `source`.
///
/// Arcs from parents to children are looked up in `transpose`, which must be
/// the transpose of `graph` (or `graph` itself, if `graph` is symmetric).
///
/// # Errors
///
/// [`VerifyError::InvalidSource`] if `source` is not a node of `graph`;
/// otherwise, the first violation found, scanning nodes in increasing order.
pub fn verify(
    graph: &impl RandomAccessGraph,
    transpose: &impl RandomAccessGraph,
    source: usize,
    parents: &[isize],
) -> Result<(), VerifyError> {
    let num_nodes = graph.num_nodes();
    if source >= num_nodes {
        return Err(VerifyError::InvalidSource {
            source_node: source,
            num_nodes,
        });
    }
    if parents.len() != num_nodes {
        return Err(VerifyError::LengthMismatch {
            expected: num_nodes,
            actual: parents.len(),
        });
    }
    if parents[source] != source as isize {
        return Err(VerifyError::WrongSource {
            source_node: source,
            parent: parents[source],
        });
    }

    let depths = bfs_depths(graph, source);
    for (node, &parent) in parents.iter().enumerate() {
        if node == source {
            continue;
        }
        let parent = match (usize::try_from(parent), depths[node]) {
            (Ok(parent), Some(depth)) if parent < num_nodes => {
                if depth == 0 || depths[parent] != Some(depth - 1) {
                    return Err(VerifyError::WrongDepth {
                        node,
                        depth,
                        parent,
                        parent_depth: depths[parent],
                    });
                }
                parent
            }
            (Ok(_), None) => return Err(VerifyError::NotReachable { node }),
            (Err(_), None) if parent == -1 => continue,
            (Err(_), Some(_)) if parent == -1 => return Err(VerifyError::NotVisited { node }),
            _ => return Err(VerifyError::InvalidParent { node, parent }),
        };
        if !transpose.successors(node).into_iter().any(|pred| pred == parent) {
            return Err(VerifyError::MissingArc { node, parent });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use webgraph::graphs::vec_graph::VecGraph;

    fn graphs() -> (VecGraph, VecGraph) {
        // 0 -> 1 -> 2, 0 -> 2, 3 -> 0
        let arcs = [(0, 1), (1, 2), (0, 2), (3, 0)];
        (
            VecGraph::from_arcs(arcs),
            VecGraph::from_arcs(arcs.map(|(src, dst)| (dst, src))),
        )
    }

    #[test]
    fn test_bfs_depths() {
        let (graph, _) = graphs();
        assert_eq!(&*bfs_depths(&graph, 0), &[Some(0), Some(1), Some(1), None]);
        assert_eq!(
            &*bfs_depths(&graph, 3),
            &[Some(1), Some(2), Some(2), Some(0)]
        );
    }

    #[test]
    fn test_verify() {
        let (graph, transpose) = graphs();
        assert_eq!(verify(&graph, &transpose, 0, &[0, 0, 0, -1]), Ok(()));
        assert_eq!(
            verify(&graph, &transpose, 0, &[0, 0, 0]),
            Err(VerifyError::LengthMismatch {
                expected: 4,
                actual: 3
            })
        );
        assert_eq!(
            verify(&graph, &transpose, 0, &[1, 0, 0, -1]),
            Err(VerifyError::WrongSource {
                source_node: 0,
                parent: 1
            })
        );
        // 2 is at depth 1, not 2
        assert_eq!(
            verify(&graph, &transpose, 0, &[0, 0, 1, -1]),
            Err(VerifyError::WrongDepth {
                node: 2,
                depth: 1,
                parent: 1,
                parent_depth: Some(1)
            })
        );
        assert_eq!(
            verify(&graph, &transpose, 0, &[0, 0, -1, -1]),
            Err(VerifyError::NotVisited { node: 2 })
        );
        assert_eq!(
            verify(&graph, &transpose, 0, &[0, 0, 0, 0]),
            Err(VerifyError::NotReachable { node: 3 })
        );
        assert_eq!(
            verify(&graph, &transpose, 0, &[0, 0, -5, -1]),
            Err(VerifyError::InvalidParent { node: 2, parent: -5 })
        );
        assert_eq!(
            verify(&graph, &transpose, 0, &[0, 0, 7, -1]),
            Err(VerifyError::InvalidParent { node: 2, parent: 7 })
        );
    }

    #[test]
    fn test_source_out_of_range() {
        let (graph, transpose) = graphs();
        assert_eq!(
            verify(&graph, &transpose, 4, &[0, 0, 0, -1]),
            Err(VerifyError::InvalidSource {
                source_node: 4,
                num_nodes: 4
            })
        );
        // Checked before the length of the parent array
        assert_eq!(
            verify(&graph, &transpose, 9, &[]),
            Err(VerifyError::InvalidSource {
                source_node: 9,
                num_nodes: 4
            })
        );
    }

    #[test]
    fn test_missing_arc() {
        // 0 -> 1, 0 -> 2, 2 -> 3, 1 -> 4
        let arcs = [(0, 1), (0, 2), (2, 3), (1, 4)];
        let graph = VecGraph::from_arcs(arcs);
        let transpose = VecGraph::from_arcs(arcs.map(|(src, dst)| (dst, src)));
        assert_eq!(verify(&graph, &transpose, 0, &[0, 0, 0, 2, 1]), Ok(()));
        // 1 has the right depth, but it is not a predecessor of 3
        assert_eq!(
            verify(&graph, &transpose, 0, &[0, 0, 0, 1, 1]),
            Err(VerifyError::MissingArc { node: 3, parent: 1 })
        );
    }
}
