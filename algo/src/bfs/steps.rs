/*
 * SPDX-FileCopyrightText: 2026 The dobfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! The parallel steps of a direction-optimizing visit.
//!
//! All functions in this module run on the current rayon thread pool; the
//! [driver](super::dobfs) wraps each call in
//! [`ThreadPool::install`](rayon::ThreadPool::install). Parents are stored in
//! a slice of atomic integers using the encoding described in the [module
//! documentation](super).

use super::{BfsError, UNVISITED};
use crate::frontier::{Bitmap, QueueBuffer, SlidingQueue};
use rayon::prelude::*;
use std::sync::atomic::{AtomicIsize, Ordering};
use webgraph::traits::RandomAccessGraph;
use webgraph::utils::Granularity;

/// Returns a parent array in which each node is unvisited and carries its
/// outdegree.
///
/// Nodes with outdegree zero are marked by [`UNVISITED`].
pub fn init_parents<G: RandomAccessGraph + Sync>(
    graph: &G,
    granularity: usize,
) -> Result<Box<[AtomicIsize]>, BfsError> {
    let num_nodes = graph.num_nodes();
    let mut parents = Vec::new();
    parents
        .try_reserve_exact(num_nodes)
        .map_err(|_| BfsError::Allocation {
            what: "parent array",
            num_nodes,
        })?;
    parents.par_extend(
        (0..num_nodes)
            .into_par_iter()
            .with_min_len(granularity)
            .map(|node| {
                AtomicIsize::new(match graph.outdegree(node) {
                    0 => UNVISITED,
                    d => -(d as isize),
                })
            }),
    );
    Ok(parents.into_boxed_slice())
}

/// Returns the number of frontier nodes per task of a [top-down
/// step](top_down_step), so that each task scans tentatively
/// `arc_granularity` arcs.
///
/// `frontier_arcs` is (an estimate of) the sum of the outdegrees of the
/// `frontier_len` nodes of the frontier. The result is between one and
/// `frontier_len`: a frontier of hubs yields one node per task, and a
/// frontier without arcs a single task.
pub fn top_down_granularity(
    arc_granularity: usize,
    frontier_len: usize,
    frontier_arcs: u64,
) -> usize {
    Granularity::Arcs(arc_granularity as u64)
        .node_granularity(frontier_len, Some(frontier_arcs))
        .clamp(1, frontier_len.max(1))
}

/// Expands the window of `queue` by scanning successors, and returns the
/// scout count.
///
/// Each unvisited successor is claimed with a compare-and-exchange on its
/// parent; the thread that wins the race appends the node to the queue
/// (through a [`QueueBuffer`]) and adds its outdegree to the scout count. A
/// thread losing a race just moves on, as the node has a parent already.
///
/// The frontier is processed in chunks of `granularity` nodes, usually
/// computed by [`top_down_granularity`].
///
/// Discovered nodes are pending in the queue: the caller must [slide the
/// window](SlidingQueue::slide_window) to make them the next frontier.
pub fn top_down_step<G: RandomAccessGraph + Sync>(
    graph: &G,
    parents: &[AtomicIsize],
    queue: &mut SlidingQueue,
    granularity: usize,
    buffer_capacity: usize,
) -> usize {
    let (frontier, appender) = queue.split();
    frontier
        .par_chunks(granularity)
        .map_init(
            || QueueBuffer::with_capacity(appender, buffer_capacity),
            |buffer, chunk| {
                let mut scout_count = 0;
                for &node in chunk {
                    for succ in graph.successors(node) {
                        let curr = parents[succ].load(Ordering::Relaxed);
                        if curr < 0
                            && parents[succ]
                                .compare_exchange(
                                    curr,
                                    node as isize,
                                    Ordering::Relaxed,
                                    Ordering::Relaxed,
                                )
                                .is_ok()
                        {
                            buffer.push_back(succ);
                            scout_count += curr.unsigned_abs();
                        }
                    }
                }
                scout_count
            },
        )
        .sum()
}

/// Finds a parent in `front` for every unvisited node, marks the nodes found
/// in `next`, and returns their number (the awake count).
///
/// The predecessors of a node are its successors in `transpose`. Each node is
/// examined by exactly one thread, which stops at the first predecessor in the
/// frontier, so parents can be written without synchronization. `next` is
/// cleared before the step.
pub fn bottom_up_step<T: RandomAccessGraph + Sync>(
    transpose: &T,
    parents: &[AtomicIsize],
    front: &Bitmap,
    next: &mut Bitmap,
    granularity: usize,
) -> usize {
    next.reset();
    let next = &*next;
    (0..parents.len())
        .into_par_iter()
        .with_min_len(granularity)
        .map(|node| {
            if parents[node].load(Ordering::Relaxed) >= 0 {
                return 0;
            }
            for pred in transpose.successors(node) {
                if front.get_bit(pred) {
                    parents[node].store(pred as isize, Ordering::Relaxed);
                    next.set_bit_atomic(node);
                    return 1;
                }
            }
            0
        })
        .sum()
}

/// Sets in `bitmap` the nodes in the window of `queue`.
pub fn queue_to_bitmap(queue: &SlidingQueue, bitmap: &Bitmap, granularity: usize) {
    queue
        .window()
        .par_iter()
        .with_min_len(granularity)
        .for_each(|&node| bitmap.set_bit_atomic(node));
}

/// Appends to `queue` the nodes set in `bitmap` and slides the window, so that
/// the window contains exactly those nodes.
pub fn bitmap_to_queue(
    bitmap: &Bitmap,
    queue: &mut SlidingQueue,
    granularity: usize,
    buffer_capacity: usize,
) {
    {
        let (_, appender) = queue.split();
        (0..bitmap.len())
            .into_par_iter()
            .with_min_len(granularity)
            .for_each_init(
                || QueueBuffer::with_capacity(appender, buffer_capacity),
                |buffer, node| {
                    if bitmap.get_bit(node) {
                        buffer.push_back(node);
                    }
                },
            );
    }
    queue.slide_window();
}

#[cfg(test)]
mod tests {
    use super::*;
    use webgraph::graphs::vec_graph::VecGraph;
    use webgraph::traits::SequentialLabeling;

    fn load(parents: &[AtomicIsize]) -> Vec<isize> {
        parents.iter().map(|p| p.load(Ordering::Relaxed)).collect()
    }

    #[test]
    fn test_init_parents() -> anyhow::Result<()> {
        let mut graph = VecGraph::from_arcs([(0, 1), (0, 2), (0, 3), (2, 3)]);
        graph.add_node(4);
        let parents = init_parents(&graph, 1)?;
        assert_eq!(load(&parents), vec![-3, -1, -1, -1, -1]);
        Ok(())
    }

    #[test]
    fn test_top_down_step() -> anyhow::Result<()> {
        // 0 -> 1, 2; 1 -> 2, 3; 2 -> 4; 3 -> 4, 5
        let graph = VecGraph::from_arcs([(0, 1), (0, 2), (1, 2), (1, 3), (2, 4), (3, 4), (3, 5)]);
        let parents = init_parents(&graph, 1)?;
        parents[0].store(0, Ordering::Relaxed);
        let mut queue = SlidingQueue::new(graph.num_nodes());
        queue.push_back(0);
        queue.slide_window();

        let scout_count = top_down_step(&graph, &parents, &mut queue, 1, 1);
        queue.slide_window();
        // 1 has outdegree 2, 2 has outdegree 1
        assert_eq!(scout_count, 3);
        let mut frontier = queue.window().to_vec();
        frontier.sort_unstable();
        assert_eq!(frontier, vec![1, 2]);
        assert_eq!(&load(&parents)[..3], &[0, 0, 0]);

        let scout_count = top_down_step(&graph, &parents, &mut queue, 1, 1);
        queue.slide_window();
        // 3 has outdegree 2, 4 is a sink and contributes its marker
        assert_eq!(scout_count, 3);
        let mut frontier = queue.window().to_vec();
        frontier.sort_unstable();
        assert_eq!(frontier, vec![3, 4]);
        let parents_now = load(&parents);
        assert_eq!(parents_now[3], 1);
        assert_eq!(parents_now[4], 2);
        assert_eq!(parents_now[5], UNVISITED);
        Ok(())
    }

    #[test]
    fn test_top_down_granularity() {
        // Average outdegree 2
        assert_eq!(top_down_granularity(2000, 1000, 2000), 1000);
        assert_eq!(top_down_granularity(64, 100, 800), 8);
        // A few hubs are split into single-node tasks
        assert_eq!(top_down_granularity(2000, 1000, 10_000_000), 1);
        assert_eq!(top_down_granularity(2000, 4, 40_000), 1);
        // Never more than the frontier, never zero
        assert_eq!(top_down_granularity(2000, 10, 0), 10);
        assert_eq!(top_down_granularity(2000, 0, 0), 1);
    }

    #[test]
    fn test_top_down_step_chunks() -> anyhow::Result<()> {
        // Four hubs, each with its own 100 leaves
        let graph = VecGraph::from_arcs(
            (0..4).flat_map(|hub| (0..100).map(move |leaf| (hub, 4 + 100 * hub + leaf))),
        );
        let parents = init_parents(&graph, 1)?;
        let mut queue = SlidingQueue::new(graph.num_nodes());
        for hub in 0..4 {
            parents[hub].store(hub as isize, Ordering::Relaxed);
            queue.push_back(hub);
        }
        queue.slide_window();

        let granularity = top_down_granularity(100, queue.len(), 400);
        assert_eq!(granularity, 1);
        let scout_count = top_down_step(&graph, &parents, &mut queue, granularity, 16);
        queue.slide_window();
        // Leaves are sinks and contribute their marker
        assert_eq!(scout_count, 400);
        assert_eq!(queue.len(), 400);
        let parents = load(&parents);
        for hub in 0..4 {
            assert!(parents[4 + 100 * hub..4 + 100 * (hub + 1)]
                .iter()
                .all(|&parent| parent == hub as isize));
        }
        Ok(())
    }

    #[test]
    fn test_bottom_up_step() -> anyhow::Result<()> {
        let graph = VecGraph::from_arcs([(0, 1), (0, 2), (1, 3), (2, 3), (3, 4)]);
        let transpose = VecGraph::from_arcs([(1, 0), (2, 0), (3, 1), (3, 2), (4, 3)]);
        let parents = init_parents(&graph, 1)?;
        parents[0].store(0, Ordering::Relaxed);
        let mut front = Bitmap::new(graph.num_nodes());
        let mut next = Bitmap::new(graph.num_nodes());
        front.set_bit(0);

        let awake_count = bottom_up_step(&transpose, &parents, &front, &mut next, 1);
        assert_eq!(awake_count, 2);
        assert_eq!(load(&parents), vec![0, 0, 0, -1, -1]);
        assert!(next.get_bit(1) && next.get_bit(2));
        assert!(!next.get_bit(0) && !next.get_bit(3));

        std::mem::swap(&mut front, &mut next);
        let awake_count = bottom_up_step(&transpose, &parents, &front, &mut next, 1);
        assert_eq!(awake_count, 1);
        let parent_of_3 = load(&parents)[3];
        assert!(parent_of_3 == 1 || parent_of_3 == 2);
        // The next frontier has been cleared before the step
        assert!(!next.get_bit(1) && !next.get_bit(2));
        assert!(next.get_bit(3));
        Ok(())
    }

    #[test]
    fn test_conversions() {
        let mut queue = SlidingQueue::new(100);
        for node in [3, 64, 65, 99] {
            queue.push_back(node);
        }
        queue.slide_window();
        let bitmap = Bitmap::new(100);
        queue_to_bitmap(&queue, &bitmap, 1);
        assert_eq!(bitmap.count_ones(), 4);

        queue.slide_window();
        assert!(queue.is_empty());
        bitmap_to_queue(&bitmap, &mut queue, 7, 2);
        let mut window = queue.window().to_vec();
        window.sort_unstable();
        assert_eq!(window, vec![3, 64, 65, 99]);
    }
}
