/*
 * SPDX-FileCopyrightText: 2026 The dobfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Construction of in-memory graphs for visits.
//!
//! A [`GraphBuilder`] collects arcs from an [arc list](read_arcs) or from a
//! [random generator](uniform), removes loops and duplicate arcs, and builds a
//! [`BuiltGraph`], which contains the graph and, unless the graph is
//! symmetric, its transpose.
//!
//! # Examples
//!
//! ```
//! use dobfs::build::GraphBuilder;
//!
//! let mut builder = GraphBuilder::new().symmetric(true);
//! builder.add_arcs([(0, 1), (1, 2), (2, 2), (1, 0)]);
//! let built = builder.build()?;
//! assert_eq!(built.num_nodes(), 3);
//! // The loop is gone, and (0, 1) and (1, 0) are not duplicated
//! assert_eq!(built.num_arcs(), 4);
//! assert!(built.is_symmetric());
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{bail, ensure, Context, Result};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use rayon::prelude::*;
use std::cmp::Reverse;
use std::io::BufRead;
use webgraph::graphs::vec_graph::VecGraph;
use webgraph::traits::{RandomAccessGraph, RandomAccessLabeling, SequentialLabeling};

/// The default seed of the [uniform random graph generator](uniform).
pub const DEFAULT_SEED: u64 = 27491095;

/// Collects arcs and builds a [`BuiltGraph`].
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    arcs: Vec<(usize, usize)>,
    num_nodes: Option<usize>,
    symmetric: bool,
}

impl GraphBuilder {
    /// Creates a builder for a directed graph with no arcs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether the graph should be symmetrized, that is, whether for
    /// each arc the reverse arc should be added, too.
    pub fn symmetric(mut self, symmetric: bool) -> Self {
        self.symmetric = symmetric;
        self
    }

    /// Sets the number of nodes of the graph.
    ///
    /// By default, the number of nodes is one plus the largest node appearing
    /// in an arc. A larger value adds isolated nodes at the end of the graph.
    pub fn num_nodes(mut self, num_nodes: Option<usize>) -> Self {
        self.num_nodes = num_nodes;
        self
    }

    /// Adds an arc.
    pub fn add_arc(&mut self, src: usize, dst: usize) {
        self.arcs.push((src, dst));
    }

    /// Adds arcs from an iterator.
    pub fn add_arcs(&mut self, arcs: impl IntoIterator<Item = (usize, usize)>) {
        self.arcs.extend(arcs);
    }

    /// Returns the number of arcs added so far, including loops and
    /// duplicates.
    pub fn num_added_arcs(&self) -> usize {
        self.arcs.len()
    }

    /// Builds the graph and, unless the graph is symmetric, its transpose.
    ///
    /// # Errors
    ///
    /// If the number of nodes was set to a value smaller than one plus the
    /// largest node appearing in an arc.
    pub fn build(self) -> Result<BuiltGraph> {
        let Self {
            mut arcs,
            num_nodes,
            symmetric,
        } = self;

        let min_num_nodes = arcs
            .par_iter()
            .map(|&(src, dst)| src.max(dst) + 1)
            .max()
            .unwrap_or(0);
        let num_nodes = match num_nodes {
            Some(num_nodes) => {
                ensure!(
                    num_nodes >= min_num_nodes,
                    "The number of nodes ({num_nodes}) is smaller than the number of nodes appearing in arcs ({min_num_nodes})"
                );
                num_nodes
            }
            None => min_num_nodes,
        };

        if symmetric {
            let reversed = arcs.par_iter().map(|&(src, dst)| (dst, src)).collect::<Vec<_>>();
            arcs.extend(reversed);
        }
        let added = arcs.len();
        arcs.retain(|&(src, dst)| src != dst);
        arcs.par_sort_unstable();
        arcs.dedup();
        log::info!(
            "Built graph with {num_nodes} nodes and {} arcs ({} loops or duplicates removed)",
            arcs.len(),
            added - arcs.len()
        );

        let transpose = if symmetric {
            None
        } else {
            let mut transposed = arcs.par_iter().map(|&(src, dst)| (dst, src)).collect::<Vec<_>>();
            transposed.par_sort_unstable();
            Some(vec_graph(num_nodes, transposed))
        };

        Ok(BuiltGraph {
            graph: vec_graph(num_nodes, arcs),
            transpose,
        })
    }
}

/// Builds a [`VecGraph`] with `num_nodes` nodes from arcs without
/// duplicates.
fn vec_graph(num_nodes: usize, arcs: Vec<(usize, usize)>) -> VecGraph {
    let mut graph = VecGraph::empty(num_nodes);
    graph.add_arcs(arcs);
    graph
}

/// A graph ready to be visited, with its transpose.
#[derive(Debug, Clone)]
pub struct BuiltGraph {
    graph: VecGraph,
    transpose: Option<VecGraph>,
}

impl BuiltGraph {
    /// Returns the graph.
    pub fn graph(&self) -> &VecGraph {
        &self.graph
    }

    /// Returns the transpose of the graph, which is the graph itself if the
    /// graph is symmetric.
    pub fn transpose(&self) -> &VecGraph {
        self.transpose.as_ref().unwrap_or(&self.graph)
    }

    /// Returns whether the graph was built symmetric.
    pub fn is_symmetric(&self) -> bool {
        self.transpose.is_none()
    }

    pub fn num_nodes(&self) -> usize {
        self.graph.num_nodes()
    }

    pub fn num_arcs(&self) -> u64 {
        self.graph.num_arcs()
    }

    /// Renumbers the nodes by decreasing outdegree, breaking ties by node
    /// index.
    ///
    /// Node `0` of the result is thus a node of maximum outdegree. The
    /// transpose, if present, is renumbered consistently. Note that for
    /// directed graphs only outdegrees are taken into account.
    pub fn relabel_by_degree(self) -> Self {
        let num_nodes = self.num_nodes();
        let mut order = (0..num_nodes).collect::<Vec<_>>();
        order.par_sort_unstable_by_key(|&node| (Reverse(self.graph.outdegree(node)), node));
        let mut perm = vec![0; num_nodes];
        for (new, &old) in order.iter().enumerate() {
            perm[old] = new;
        }
        log::info!("Relabeled {num_nodes} nodes by decreasing outdegree");

        Self {
            graph: permute(&self.graph, &perm),
            transpose: self.transpose.as_ref().map(|t| permute(t, &perm)),
        }
    }

    /// Returns the graph and its transpose, if any.
    pub fn into_parts(self) -> (VecGraph, Option<VecGraph>) {
        (self.graph, self.transpose)
    }
}

fn permute(graph: &VecGraph, perm: &[usize]) -> VecGraph {
    let mut arcs = (0..graph.num_nodes())
        .into_par_iter()
        .flat_map_iter(|node| {
            graph
                .successors(node)
                .into_iter()
                .map(move |succ| (perm[node], perm[succ]))
        })
        .collect::<Vec<_>>();
    arcs.par_sort_unstable();
    vec_graph(graph.num_nodes(), arcs)
}

/// Returns a builder containing the arcs of a uniform random graph with
/// 2<sup>`scale`</sup> nodes and `degree` · 2<sup>`scale`</sup> arcs.
///
/// Both endpoints of each arc are chosen uniformly at random using a
/// [`SmallRng`] seeded with `seed`; loops and duplicates will be removed by
/// [`GraphBuilder::build`]. The number of nodes of the builder is set to
/// 2<sup>`scale`</sup>.
///
/// # Panics
///
/// If 2<sup>`scale`</sup> or the number of arcs does not fit a `usize`.
pub fn uniform(scale: u32, degree: usize, seed: u64) -> GraphBuilder {
    let num_nodes = 1_usize
        .checked_shl(scale)
        .unwrap_or_else(|| panic!("Scale {scale} is too large"));
    let num_arcs = degree
        .checked_mul(num_nodes)
        .unwrap_or_else(|| panic!("Too many arcs ({degree} * 2^{scale})"));
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut builder = GraphBuilder::new().num_nodes(Some(num_nodes));
    builder.add_arcs((0..num_arcs).map(|_| {
        (
            rng.random_range(0..num_nodes),
            rng.random_range(0..num_nodes),
        )
    }));
    builder
}

/// Reads a list of arcs, one per line, into a builder.
///
/// Each line contains a source and a destination separated by whitespace, a
/// comma, or a semicolon; further fields (e.g., weights) are ignored. Empty
/// lines and lines starting with `#` or `%` are skipped.
///
/// # Errors
///
/// On I/O errors and on lines that cannot be parsed; the error reports the
/// offending line number.
pub fn read_arcs(reader: impl BufRead) -> Result<GraphBuilder> {
    let mut builder = GraphBuilder::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line_num = line_num + 1;
        let line = line.with_context(|| format!("Could not read line {line_num}"))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('%') {
            continue;
        }
        let mut fields = line
            .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
            .filter(|field| !field.is_empty());
        let (Some(src), Some(dst)) = (fields.next(), fields.next()) else {
            bail!("Line {line_num} does not contain an arc: {line:?}");
        };
        let src = src
            .parse::<usize>()
            .with_context(|| format!("Invalid source node at line {line_num}: {src:?}"))?;
        let dst = dst
            .parse::<usize>()
            .with_context(|| format!("Invalid destination node at line {line_num}: {dst:?}"))?;
        builder.add_arc(src, dst);
    }
    Ok(builder)
}
