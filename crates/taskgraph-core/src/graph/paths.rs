//! Shortest and longest (critical) paths over a DAG.
//!
//! # Overview
//!
//! Both computations are a single relaxation pass in topological order. The
//! order is derived here from the graph itself via [`topo`]; a cyclic input is
//! refused with [`GraphError::CycleDetected`] rather than producing numbers.
//!
//! | Computation      | Seed                         | Relaxation (edge `u → v`)          |
//! |------------------|------------------------------|------------------------------------|
//! | shortest paths   | `dist[source] = 0`, else ∞   | `dist[u] + weight < dist[v]`       |
//! | longest paths    | `dist[v] = duration(v)`      | `dist[u] + duration(v) > dist[v]`  |
//!
//! Shortest paths use edge weights, which may be negative. Longest paths
//! ignore edge weights and sum vertex durations: `dist[v]` is the largest
//! total duration of any path that ends at `v` (the forward pass of the
//! critical path method).
//!
//! "Unreached" and "no predecessor" are `None`, never an in-band integer.

#![allow(clippy::module_name_repetitions)]

use serde::Serialize;
use tracing::{debug, instrument, trace};

use crate::error::{GraphError, Result};
use crate::graph::model::Graph;
use crate::graph::topo;
use crate::metrics::Metrics;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Single-source shortest distances over edge weights.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortestPaths {
    /// The source vertex.
    pub source: usize,
    /// Distance per vertex; `None` when unreachable from `source`.
    pub distances: Vec<Option<i64>>,
    /// Predecessor on a shortest path; `None` for the source and unreached
    /// vertices.
    pub predecessors: Vec<Option<usize>>,
}

impl ShortestPaths {
    /// Distance to `target`, `None` if unreachable or out of range.
    #[must_use]
    pub fn distance_to(&self, target: usize) -> Option<i64> {
        self.distances.get(target).copied().flatten()
    }

    /// Shortest path `source → … → target`, or `None` if `target` is
    /// unreachable.
    #[must_use]
    pub fn path_to(&self, target: usize) -> Option<Vec<usize>> {
        self.distance_to(target)?;
        Some(reconstruct_path(&self.predecessors, target))
    }

    /// Number of vertices reachable from the source (source included).
    #[must_use]
    pub fn reached_count(&self) -> usize {
        self.distances.iter().filter(|d| d.is_some()).count()
    }
}

/// Longest duration-weighted path ending at every vertex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LongestPaths {
    /// Largest total duration of a path ending at each vertex.
    pub distances: Vec<u64>,
    /// Predecessor on that path; `None` where the vertex itself starts it.
    pub predecessors: Vec<Option<usize>>,
}

/// The longest duration-weighted path in a DAG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriticalPath {
    /// Vertices from source to sink. Empty only for the empty graph.
    pub path: Vec<usize>,
    /// Sum of the durations along `path`.
    pub length: u64,
}

impl CriticalPath {
    /// Return `true` if there is no path (empty graph).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Shortest paths
// ---------------------------------------------------------------------------

/// Shortest distances from `source` along edge weights.
///
/// # Errors
///
/// - [`GraphError::InvalidVertex`] if `source` is out of range.
/// - [`GraphError::CycleDetected`] if `graph` is not a DAG.
/// - [`GraphError::WeightOverflow`] if a distance leaves the `i64` range.
pub fn shortest_paths_from(graph: &Graph, source: usize) -> Result<ShortestPaths> {
    shortest_paths_from_with_metrics(graph, source, &mut Metrics::default())
}

/// [`shortest_paths_from`], recording relaxations in `metrics`.
///
/// The queue counters and time of the internal topological sort are
/// recorded as well.
///
/// # Errors
///
/// See [`shortest_paths_from`].
#[instrument(skip(graph, metrics), fields(vertices = graph.vertex_count()))]
pub fn shortest_paths_from_with_metrics(
    graph: &Graph,
    source: usize,
    metrics: &mut Metrics,
) -> Result<ShortestPaths> {
    let n = graph.vertex_count();
    if source >= n {
        return Err(GraphError::InvalidVertex {
            vertex: source,
            vertex_count: n,
        });
    }

    let order = topo::topological_order_with_metrics(graph, metrics)?;

    metrics.timed(|metrics| {
        let mut distances: Vec<Option<i64>> = vec![None; n];
        let mut predecessors: Vec<Option<usize>> = vec![None; n];
        distances[source] = Some(0);

        for &u in &order {
            // Never relax out of an unreached vertex.
            let Some(base) = distances[u] else {
                continue;
            };

            for edge in graph.outgoing_edges(u) {
                metrics.relaxations += 1;
                let candidate = base
                    .checked_add(edge.weight)
                    .ok_or(GraphError::WeightOverflow {
                        from: u,
                        to: edge.to,
                    })?;
                if distances[edge.to].is_none_or(|current| candidate < current) {
                    distances[edge.to] = Some(candidate);
                    predecessors[edge.to] = Some(u);
                }
            }
        }

        let paths = ShortestPaths {
            source,
            distances,
            predecessors,
        };
        debug!(reached = paths.reached_count(), "shortest paths computed");
        Ok(paths)
    })
}

// ---------------------------------------------------------------------------
// Longest paths
// ---------------------------------------------------------------------------

/// Longest duration-weighted path ending at each vertex.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] if `graph` is not a DAG.
pub fn longest_paths(graph: &Graph) -> Result<LongestPaths> {
    longest_paths_with_metrics(graph, &mut Metrics::default())
}

/// [`longest_paths`], recording relaxations in `metrics`.
///
/// Includes the queue counters of the internal topological sort.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] if `graph` is not a DAG.
#[instrument(skip_all, fields(vertices = graph.vertex_count()))]
pub fn longest_paths_with_metrics(graph: &Graph, metrics: &mut Metrics) -> Result<LongestPaths> {
    let order = topo::topological_order_with_metrics(graph, metrics)?;

    Ok(metrics.timed(|metrics| {
        let durations = graph.durations();
        let mut distances: Vec<u64> = durations.to_vec();
        let mut predecessors: Vec<Option<usize>> = vec![None; graph.vertex_count()];

        for &u in &order {
            let base = distances[u];
            for edge in graph.outgoing_edges(u) {
                metrics.relaxations += 1;
                let candidate = base.saturating_add(durations[edge.to]);
                if candidate > distances[edge.to] {
                    distances[edge.to] = candidate;
                    predecessors[edge.to] = Some(u);
                }
            }
            trace!(vertex = u, distance = base, "vertex finalized");
        }

        LongestPaths {
            distances,
            predecessors,
        }
    }))
}

/// The critical (longest duration-weighted) path of a DAG.
///
/// The sink is the vertex with the greatest longest-path distance; on ties
/// the lowest vertex id wins. An empty graph yields an empty path of length 0.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] if `graph` is not a DAG.
pub fn critical_path(graph: &Graph) -> Result<CriticalPath> {
    critical_path_with_metrics(graph, &mut Metrics::default())
}

/// [`critical_path`], recording relaxations in `metrics`.
///
/// # Errors
///
/// Returns [`GraphError::CycleDetected`] if `graph` is not a DAG.
pub fn critical_path_with_metrics(graph: &Graph, metrics: &mut Metrics) -> Result<CriticalPath> {
    let longest = longest_paths_with_metrics(graph, metrics)?;

    let mut sink: Option<(usize, u64)> = None;
    for (v, &distance) in longest.distances.iter().enumerate() {
        if sink.is_none_or(|(_, best)| distance > best) {
            sink = Some((v, distance));
        }
    }

    let Some((sink, length)) = sink else {
        return Ok(CriticalPath {
            path: Vec::new(),
            length: 0,
        });
    };

    let path = reconstruct_path(&longest.predecessors, sink);
    debug!(sink, length, hops = path.len(), "critical path found");
    Ok(CriticalPath { path, length })
}

// ---------------------------------------------------------------------------
// Path reconstruction
// ---------------------------------------------------------------------------

/// Walk predecessor links back from `target` and return the path in forward
/// order (`… → target`).
///
/// The walk stops at the first `None`. An out-of-range `target` yields an
/// empty path.
#[must_use]
pub fn reconstruct_path(predecessors: &[Option<usize>], target: usize) -> Vec<usize> {
    if target >= predecessors.len() {
        return Vec::new();
    }

    let mut path = vec![target];
    let mut current = target;
    while let Some(prev) = predecessors.get(current).copied().flatten() {
        // A predecessor chain longer than the vertex count means corrupted
        // input; stop rather than loop forever.
        if path.len() > predecessors.len() {
            break;
        }
        path.push(prev);
        current = prev;
    }

    path.reverse();
    path
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn weighted(n: usize, edges: &[(usize, usize, i64)]) -> Graph {
        let mut g = Graph::new(n);
        for &(from, to, w) in edges {
            g.add_edge(from, to, w).unwrap_or_else(|e| panic!("{e}"));
        }
        g
    }

    fn with_durations(mut g: Graph, durations: &[u64]) -> Graph {
        for (v, &d) in durations.iter().enumerate() {
            g.set_node_duration(v, d).unwrap_or_else(|e| panic!("{e}"));
        }
        g
    }

    // -----------------------------------------------------------------------
    // Shortest paths
    // -----------------------------------------------------------------------

    #[test]
    fn shortest_simple_chain() {
        let g = weighted(3, &[(0, 1, 5), (1, 2, 3)]);
        let sp = shortest_paths_from(&g, 0).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(sp.distances, vec![Some(0), Some(5), Some(8)]);
    }

    #[test]
    fn shortest_picks_minimum_of_two_routes() {
        let g = weighted(4, &[(0, 1, 5), (0, 2, 3), (1, 3, 2), (2, 3, 4)]);
        let sp = shortest_paths_from(&g, 0).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(sp.distances, vec![Some(0), Some(5), Some(3), Some(7)]);
        assert_eq!(sp.predecessors[3], Some(1), "5+2 beats 3+4");
        assert_eq!(sp.path_to(3), Some(vec![0, 1, 3]));
    }

    #[test]
    fn shortest_handles_negative_weights() {
        let g = weighted(3, &[(0, 1, 4), (0, 2, 1), (2, 1, -5)]);
        let sp = shortest_paths_from(&g, 0).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(sp.distance_to(1), Some(-4));
        assert_eq!(sp.path_to(1), Some(vec![0, 2, 1]));
    }

    #[test]
    fn unreachable_vertices_stay_unreached() {
        // 1 -> 0 and isolated 2; source 0 reaches nothing else.
        let g = weighted(3, &[(1, 0, 1)]);
        let sp = shortest_paths_from(&g, 0).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(sp.distances, vec![Some(0), None, None]);
        assert_eq!(sp.path_to(1), None);
        assert_eq!(sp.reached_count(), 1);
    }

    #[test]
    fn unreached_vertices_never_relax() {
        // 1 is unreachable from 0 and sits before 2 in topological order.
        // Relaxing out of it would give 2 a bogus distance.
        let g = weighted(3, &[(1, 2, -100), (0, 2, 1)]);
        let sp = shortest_paths_from(&g, 0).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(sp.distance_to(2), Some(1));
        assert_eq!(sp.predecessors[2], Some(0));
    }

    #[test]
    fn shortest_rejects_bad_source() {
        let g = Graph::new(2);
        assert_eq!(
            shortest_paths_from(&g, 2),
            Err(GraphError::InvalidVertex {
                vertex: 2,
                vertex_count: 2
            })
        );
    }

    #[test]
    fn shortest_refuses_cycles() {
        let g = weighted(2, &[(0, 1, 1), (1, 0, 1)]);
        assert!(shortest_paths_from(&g, 0).is_err_and(|e| e.is_cycle()));
    }

    #[test]
    fn shortest_reports_overflow() {
        let g = weighted(3, &[(0, 1, i64::MAX), (1, 2, 1)]);
        assert_eq!(
            shortest_paths_from(&g, 0),
            Err(GraphError::WeightOverflow { from: 1, to: 2 })
        );
    }

    #[test]
    fn shortest_counts_relaxations_from_reached_vertices_only() {
        let g = weighted(4, &[(0, 1, 1), (2, 3, 1), (1, 3, 1)]);
        let mut metrics = Metrics::default();
        let _ = shortest_paths_from_with_metrics(&g, 0, &mut metrics);
        assert_eq!(metrics.relaxations, 2, "edge 2->3 is never relaxed");
        assert_eq!(metrics.queue_pops, 4, "every vertex is dequeued by the sort");
    }

    // -----------------------------------------------------------------------
    // Longest / critical paths
    // -----------------------------------------------------------------------

    #[test]
    fn longest_sums_durations_along_chain() {
        let g = with_durations(weighted(3, &[(0, 1, 1), (1, 2, 1)]), &[1, 2, 3]);
        let lp = longest_paths(&g).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(lp.distances, vec![1, 3, 6]);
        assert_eq!(lp.predecessors, vec![None, Some(0), Some(1)]);
    }

    #[test]
    fn longest_saturates_instead_of_overflowing() {
        let g = with_durations(weighted(2, &[(0, 1, 1)]), &[u64::MAX, 5]);
        let lp = longest_paths(&g).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(lp.distances, vec![u64::MAX, u64::MAX]);

        let cp = critical_path(&g).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(cp.length, u64::MAX);
        assert_eq!(cp.path, vec![0]);
    }

    #[test]
    fn longest_metrics_include_sort_counters() {
        let g = with_durations(weighted(3, &[(0, 1, 1), (1, 2, 1)]), &[1, 2, 3]);
        let mut metrics = Metrics::default();
        longest_paths_with_metrics(&g, &mut metrics).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(metrics.relaxations, 2);
        assert_eq!(metrics.queue_pushes, 3);
        assert_eq!(metrics.queue_pops, 3);
    }

    #[test]
    fn longest_seeds_with_own_duration() {
        let g = with_durations(Graph::new(3), &[4, 1, 7]);
        let lp = longest_paths(&g).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(lp.distances, vec![4, 1, 7]);
        assert!(lp.predecessors.iter().all(Option::is_none));
    }

    #[test]
    fn longest_ignores_edge_weights() {
        let g = with_durations(weighted(2, &[(0, 1, 1_000)]), &[2, 3]);
        let lp = longest_paths(&g).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(lp.distances[1], 5);
    }

    #[test]
    fn critical_path_picks_heavier_branch() {
        // 0 -> 1 -> 3 (5+3+1) vs 0 -> 2 -> 3 (5+4+1)
        let g = with_durations(
            weighted(4, &[(0, 1, 1), (0, 2, 1), (1, 3, 1), (2, 3, 1)]),
            &[5, 3, 4, 1],
        );
        let cp = critical_path(&g).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(cp.path, vec![0, 2, 3]);
        assert_eq!(cp.length, 10);
    }

    #[test]
    fn critical_path_fork_without_join() {
        let g = with_durations(weighted(3, &[(0, 1, 1), (0, 2, 1)]), &[5, 3, 4]);
        let cp = critical_path(&g).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(cp.path, vec![0, 2]);
        assert_eq!(cp.length, 9);
    }

    #[test]
    fn critical_path_ties_go_to_lowest_id() {
        let g = Graph::new(3);
        let cp = critical_path(&g).unwrap_or_else(|e| panic!("{e}"));
        assert_eq!(cp.path, vec![0]);
        assert_eq!(cp.length, 1);
    }

    #[test]
    fn critical_path_of_empty_graph_is_empty() {
        let cp = critical_path(&Graph::new(0)).unwrap_or_else(|e| panic!("{e}"));
        assert!(cp.is_empty());
        assert_eq!(cp.length, 0);
    }

    #[test]
    fn critical_path_refuses_cycles() {
        let g = weighted(2, &[(0, 1, 1), (1, 0, 1)]);
        assert!(critical_path(&g).is_err_and(|e| e.is_cycle()));
        assert!(longest_paths(&g).is_err());
    }

    // -----------------------------------------------------------------------
    // Reconstruction
    // -----------------------------------------------------------------------

    #[test]
    fn reconstruct_walks_to_sentinel() {
        let preds = vec![None, Some(0), Some(1), None];
        assert_eq!(reconstruct_path(&preds, 2), vec![0, 1, 2]);
        assert_eq!(reconstruct_path(&preds, 3), vec![3]);
        assert_eq!(reconstruct_path(&preds, 9), Vec::<usize>::new());
    }

    #[test]
    fn reconstruct_stops_on_corrupt_chain() {
        let preds = vec![Some(1), Some(0)];
        let path = reconstruct_path(&preds, 0);
        assert!(path.len() <= 3);
    }
}
