/*
 * SPDX-FileCopyrightText: 2026 The dobfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Choice of the sources of repeated visits.

use crate::bfs::BfsError;
use anyhow::{ensure, Result};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use webgraph::traits::RandomAccessGraph;

/// Picks the sources of a sequence of visits.
///
/// A picker either returns always the same source, or returns pseudorandom
/// nodes with nonzero outdegree, so that each visit has something to do.
///
/// # Examples
///
/// ```
/// use dobfs::source::SourcePicker;
/// use webgraph::graphs::vec_graph::VecGraph;
///
/// let mut graph = VecGraph::from_arcs([(1, 2), (2, 1)]);
/// graph.add_node(3);
/// let mut picker = SourcePicker::random(&graph, 0)?;
/// for _ in 0..10 {
///     let source = picker.next_source();
///     assert!(source == 1 || source == 2);
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug)]
pub struct SourcePicker<'a, G> {
    graph: &'a G,
    kind: Kind,
}

#[derive(Debug)]
enum Kind {
    Fixed(usize),
    Random(SmallRng),
}

impl<'a, G: RandomAccessGraph> SourcePicker<'a, G> {
    /// Creates a picker that always returns `source`.
    ///
    /// # Errors
    ///
    /// If `source` is not a node of `graph`.
    pub fn fixed(graph: &'a G, source: usize) -> Result<Self, BfsError> {
        let num_nodes = graph.num_nodes();
        if source >= num_nodes {
            return Err(BfsError::InvalidSource {
                node: source,
                num_nodes,
            });
        }
        Ok(Self {
            graph,
            kind: Kind::Fixed(source),
        })
    }

    /// Creates a picker returning pseudorandom nodes with nonzero outdegree
    /// generated by a [`SmallRng`] seeded with `seed`.
    ///
    /// # Errors
    ///
    /// If `graph` has no arcs.
    pub fn random(graph: &'a G, seed: u64) -> Result<Self> {
        ensure!(
            graph.num_arcs() > 0,
            "Cannot pick random sources in a graph with no arcs"
        );
        Ok(Self {
            graph,
            kind: Kind::Random(SmallRng::seed_from_u64(seed)),
        })
    }

    /// Creates a [fixed](Self::fixed) picker if `source` is `Some`, a
    /// [random](Self::random) one otherwise.
    pub fn new(graph: &'a G, source: Option<usize>, seed: u64) -> Result<Self> {
        match source {
            Some(source) => Ok(Self::fixed(graph, source)?),
            None => Self::random(graph, seed),
        }
    }

    /// Returns the next source.
    pub fn next_source(&mut self) -> usize {
        match &mut self.kind {
            Kind::Fixed(source) => *source,
            Kind::Random(rng) => {
                let num_nodes = self.graph.num_nodes();
                loop {
                    let node = rng.random_range(0..num_nodes);
                    if self.graph.outdegree(node) != 0 {
                        break node;
                    }
                }
            }
        }
    }
}

impl<G: RandomAccessGraph> Iterator for SourcePicker<'_, G> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        Some(self.next_source())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webgraph::graphs::vec_graph::VecGraph;

    #[test]
    fn test_fixed() -> Result<()> {
        let graph = VecGraph::from_arcs([(0, 1), (1, 2)]);
        let picker = SourcePicker::fixed(&graph, 2)?;
        assert_eq!(picker.take(3).collect::<Vec<_>>(), vec![2, 2, 2]);
        assert_eq!(
            SourcePicker::fixed(&graph, 3).unwrap_err(),
            BfsError::InvalidSource {
                node: 3,
                num_nodes: 3
            }
        );
        Ok(())
    }

    #[test]
    fn test_random() -> Result<()> {
        let mut graph = VecGraph::from_arcs([(5, 0), (9, 3)]);
        graph.add_node(20);
        let sources = SourcePicker::random(&graph, 42)?.take(100).collect::<Vec<_>>();
        assert!(sources.iter().all(|&s| s == 5 || s == 9));
        // Same seed, same sources
        let again = SourcePicker::new(&graph, None, 42)?.take(100).collect::<Vec<_>>();
        assert_eq!(sources, again);
        Ok(())
    }

    #[test]
    fn test_no_arcs() {
        let graph = VecGraph::empty(10);
        assert!(SourcePicker::random(&graph, 0).is_err());
        assert!(SourcePicker::new(&graph, Some(3), 0).is_ok());
    }
}
