//! Topological ordering (Kahn's algorithm).
//!
//! # Determinism
//!
//! The queue is FIFO and is seeded with zero in-degree vertices in increasing
//! id order; successors are released in adjacency (insertion) order. For a
//! fixed graph the produced order is therefore always the same.

use std::collections::VecDeque;

use tracing::{debug, instrument, warn};

use crate::error::{GraphError, Result};
use crate::graph::model::Graph;
use crate::metrics::Metrics;

/// Topological order of `graph`.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] if the graph contains a cycle. No
/// partial order is returned.
pub fn topological_order(graph: &Graph) -> Result<Vec<usize>> {
    topological_order_with_metrics(graph, &mut Metrics::default())
}

/// [`topological_order`], recording queue pushes and pops in `metrics`.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] if the graph contains a cycle.
#[instrument(skip_all, fields(vertices = graph.vertex_count(), edges = graph.edge_count()))]
pub fn topological_order_with_metrics(graph: &Graph, metrics: &mut Metrics) -> Result<Vec<usize>> {
    metrics.timed(|metrics| {
        let n = graph.vertex_count();

        let mut in_degree = vec![0_usize; n];
        for v in 0..n {
            for edge in graph.outgoing_edges(v) {
                in_degree[edge.to] += 1;
            }
        }

        let mut queue: VecDeque<usize> = VecDeque::new();
        for (v, &degree) in in_degree.iter().enumerate() {
            if degree == 0 {
                queue.push_back(v);
                metrics.queue_pushes += 1;
            }
        }

        let mut order: Vec<usize> = Vec::with_capacity(n);
        while let Some(u) = queue.pop_front() {
            metrics.queue_pops += 1;
            order.push(u);

            for edge in graph.outgoing_edges(u) {
                let degree = &mut in_degree[edge.to];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(edge.to);
                    metrics.queue_pushes += 1;
                }
            }
        }

        if order.len() < n {
            warn!(ordered = order.len(), vertices = n, "cycle present, no topological order");
            return Err(GraphError::CycleDetected {
                ordered: order.len(),
                vertex_count: n,
            });
        }

        debug!(vertices = n, "topological order computed");
        Ok(order)
    })
}

/// Expand an order over components into an order over original vertices.
///
/// Each component contributes its member list, as stored in `components`, at
/// the position the component holds in `component_order`.
/// `vertex_to_component` must be the mapping that accompanies `components`.
#[must_use]
pub fn expand_component_order(
    component_order: &[usize],
    vertex_to_component: &[usize],
    components: &[Vec<usize>],
) -> Vec<usize> {
    debug_assert!(components.iter().enumerate().all(|(idx, members)| {
        members
            .iter()
            .all(|&v| vertex_to_component.get(v) == Some(&idx))
    }));

    component_order
        .iter()
        .filter_map(|&c| components.get(c))
        .flat_map(|members| members.iter().copied())
        .collect()
}
