/*
 * SPDX-FileCopyrightText: 2026 The dobfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::*;
use crate::frontier::{Bitmap, SlidingQueue};
use dsi_progress_logger::ProgressLog;
use rayon::{prelude::*, ThreadPool};
use std::sync::atomic::AtomicIsize;
use webgraph::traits::RandomAccessGraph;

/// Computes a breadth-first tree of `graph` from `source` using a
/// direction-optimizing visit.
///
/// See the [module documentation](super) for a description of the algorithm
/// and of the returned parent array. The visit is deterministic in the set of
/// visited nodes and in their distances from the source, but not in the choice
/// of parents, which depends on thread scheduling.
///
/// # Arguments
///
/// * `graph`: the graph to visit.
///
/// * `transpose`: the transpose of `graph`; for symmetric graphs, `graph`
///   itself.
///
/// * `source`: the node the visit starts from.
///
/// * `config`: the parameters of the visit.
///
/// * `thread_pool`: the thread pool running the parallel steps.
///
/// * `pl`: a progress logger, updated with the number of discovered nodes
///   after each step.
///
/// # Errors
///
/// The visit does not start if `source` is not a node of `graph`, if some
/// parameter of `config` is zero, or if the parent array or the queue cannot be
/// allocated.
///
/// # Panics
///
/// If `graph` and `transpose` have a different number of nodes.
pub fn dobfs<G, T>(
    graph: &G,
    transpose: &T,
    source: usize,
    config: &DobfsConfig,
    thread_pool: &ThreadPool,
    pl: &mut impl ProgressLog,
) -> Result<BfsTree, BfsError>
where
    G: RandomAccessGraph + Sync,
    T: RandomAccessGraph + Sync,
{
    config.validate()?;
    let num_nodes = graph.num_nodes();
    if source >= num_nodes {
        return Err(BfsError::InvalidSource {
            node: source,
            num_nodes,
        });
    }
    assert_eq!(
        num_nodes,
        transpose.num_nodes(),
        "The transpose has a different number of nodes"
    );
    let DobfsConfig {
        alpha,
        beta,
        granularity,
        buffer_capacity,
    } = *config;

    let num_arcs = graph.num_arcs();
    let node_granularity = granularity
        .node_granularity(num_nodes, Some(num_arcs))
        .max(1);
    let arc_granularity = granularity.arc_granularity(num_nodes, Some(num_arcs));

    pl.item_name("node");
    pl.expected_updates(Some(num_nodes));
    pl.start(format!("Visiting the graph from node {source}..."));

    let parents = thread_pool.install(|| init_parents(graph, node_granularity))?;
    parents[source].store(source as isize, std::sync::atomic::Ordering::Relaxed);
    let mut queue = SlidingQueue::try_new(num_nodes).map_err(|_| BfsError::Allocation {
        what: "queue",
        num_nodes,
    })?;
    let mut edges_to_check = num_arcs as usize;
    let mut scout_count = graph.outdegree(source);
    // The sum of the outdegrees of the frontier, used to size top-down tasks
    let mut frontier_arcs = scout_count as u64;
    if scout_count > 0 {
        queue.push_back(source);
        queue.slide_window();
    }
    pl.update_with_count(1);

    let mut front = Bitmap::new(num_nodes);
    let mut curr = Bitmap::new(num_nodes);
    let mut steps = vec![];

    while !queue.is_empty() {
        if scout_count > edges_to_check / alpha {
            log::debug!(
                "Switching to bottom-up steps: scout count {scout_count}, {edges_to_check} arcs to check"
            );
            front.reset();
            thread_pool.install(|| queue_to_bitmap(&queue, &front, node_granularity));
            let mut awake_count = queue.len();
            steps.push(Step::QueueToBitmap { nodes: awake_count });
            queue.slide_window();
            loop {
                let old_awake_count = awake_count;
                awake_count = thread_pool.install(|| {
                    bottom_up_step(transpose, &parents, &front, &mut curr, node_granularity)
                });
                std::mem::swap(&mut front, &mut curr);
                log::debug!("Bottom-up step: awake count {awake_count}");
                steps.push(Step::BottomUp { awake_count });
                pl.update_with_count(awake_count);
                // A stable awake count keeps the visit bottom-up
                if awake_count < old_awake_count && awake_count <= num_nodes / beta {
                    break;
                }
            }
            frontier_arcs = thread_pool.install(|| {
                bitmap_to_queue(&front, &mut queue, node_granularity, buffer_capacity);
                queue
                    .window()
                    .par_iter()
                    .with_min_len(node_granularity)
                    .map(|&node| graph.outdegree(node) as u64)
                    .sum::<u64>()
            });
            steps.push(Step::BitmapToQueue { nodes: queue.len() });
            log::debug!("Switching to top-down steps: frontier {}", queue.len());
            scout_count = 1;
        } else {
            edges_to_check = edges_to_check.saturating_sub(scout_count);
            let frontier = queue.len();
            let chunk_size = top_down_granularity(arc_granularity, frontier, frontier_arcs);
            scout_count = thread_pool.install(|| {
                top_down_step(graph, &parents, &mut queue, chunk_size, buffer_capacity)
            });
            frontier_arcs = scout_count as u64;
            queue.slide_window();
            log::debug!(
                "Top-down step: frontier {frontier}, discovered {}, scout count {scout_count}",
                queue.len()
            );
            steps.push(Step::TopDown {
                frontier,
                scout_count,
            });
            pl.update_with_count(queue.len());
        }
    }

    let parents = thread_pool.install(|| finalize_parents(parents, node_granularity));
    pl.done();

    Ok(BfsTree::new(source, parents, steps))
}

/// Replaces outdegree markers of unvisited nodes with [`UNVISITED`].
///
/// Markers are cleared in place; the final conversion reuses the
/// allocation, as atomic and plain integers have the same layout.
fn finalize_parents(mut parents: Box<[AtomicIsize]>, granularity: usize) -> Box<[isize]> {
    parents
        .par_iter_mut()
        .with_min_len(granularity)
        .for_each(|parent| {
            let parent = parent.get_mut();
            if *parent < UNVISITED {
                *parent = UNVISITED;
            }
        });
    parents
        .into_vec()
        .into_iter()
        .map(AtomicIsize::into_inner)
        .collect()
}
