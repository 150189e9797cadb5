//! Strongly connected components (Kosaraju) and SCC condensation.
//!
//! # Algorithm
//!
//! 1. **First pass**: depth-first search over the graph, launching from every
//!    unvisited vertex in increasing id order. A vertex is pushed onto the
//!    finish stack once all of its children are explored (post-order).
//! 2. **Reverse**: build the transposed graph.
//! 3. **Second pass**: pop the finish stack; every popped vertex that is still
//!    unvisited roots a depth-first search on the transposed graph, and the
//!    vertices it reaches form one component.
//!
//! Components are numbered in the order their second-pass search launched,
//! i.e. by decreasing first-pass finish time. Both passes walk adjacency
//! lists in insertion order, so the numbering is fully determined by the
//! order edges were added.
//!
//! Both passes run on an explicit stack of `(vertex, next edge index)` frames
//! so that long dependency chains cannot exhaust the call stack.

#![allow(clippy::module_name_repetitions)]

use std::collections::HashSet;

use fixedbitset::FixedBitSet;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::graph::model::Graph;
use crate::metrics::Metrics;

// ---------------------------------------------------------------------------
// SccResult
// ---------------------------------------------------------------------------

/// Partition of a graph's vertices into strongly connected components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SccResult {
    /// Components in discovery order. Members are listed in the order the
    /// second pass reached them.
    pub components: Vec<Vec<usize>>,
    /// Component index of every vertex (dense, total over `0..n`).
    pub vertex_to_component: Vec<usize>,
}

impl SccResult {
    /// Number of components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Component index of vertex `v`, or `None` if `v` is out of range.
    #[must_use]
    pub fn component_of(&self, v: usize) -> Option<usize> {
        self.vertex_to_component.get(v).copied()
    }

    /// Size of the largest component (0 for the empty graph).
    #[must_use]
    pub fn largest_component_size(&self) -> usize {
        self.components.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Indices of components that contain a cycle: more than one member, or a
    /// single member with a self-loop in `graph`.
    #[must_use]
    pub fn cyclic_components(&self, graph: &Graph) -> Vec<usize> {
        self.components
            .iter()
            .enumerate()
            .filter(|(_, members)| {
                members.len() > 1 || members.first().is_some_and(|&v| graph.has_edge(v, v))
            })
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Returns true if `graph` (the graph these components came from) has no
    /// cycle.
    #[must_use]
    pub fn is_acyclic(&self, graph: &Graph) -> bool {
        self.cyclic_components(graph).is_empty()
    }
}

// ---------------------------------------------------------------------------
// Kosaraju
// ---------------------------------------------------------------------------

/// Compute the strongly connected components of `graph`.
#[must_use]
pub fn find_components(graph: &Graph) -> SccResult {
    find_components_with_metrics(graph, &mut Metrics::default())
}

/// [`find_components`], recording DFS visits and edge traversals in `metrics`.
#[instrument(skip_all, fields(vertices = graph.vertex_count(), edges = graph.edge_count()))]
pub fn find_components_with_metrics(graph: &Graph, metrics: &mut Metrics) -> SccResult {
    metrics.timed(|metrics| {
        let n = graph.vertex_count();
        let mut visited = FixedBitSet::with_capacity(n);

        let mut finish_order: Vec<usize> = Vec::with_capacity(n);
        for root in 0..n {
            if !visited.contains(root) {
                record_finish_order(graph, root, &mut visited, &mut finish_order, metrics);
            }
        }

        let reversed = graph.reversed();
        visited.clear();

        let mut components: Vec<Vec<usize>> = Vec::new();
        while let Some(v) = finish_order.pop() {
            if !visited.contains(v) {
                components.push(collect_component(&reversed, v, &mut visited, metrics));
            }
        }

        let mut vertex_to_component = vec![0; n];
        for (idx, members) in components.iter().enumerate() {
            for &v in members {
                vertex_to_component[v] = idx;
            }
        }

        debug!(components = components.len(), "scc decomposition complete");

        SccResult {
            components,
            vertex_to_component,
        }
    })
}

/// First pass: iterative DFS from `root`, appending vertices in post-order.
fn record_finish_order(
    graph: &Graph,
    root: usize,
    visited: &mut FixedBitSet,
    finish_order: &mut Vec<usize>,
    metrics: &mut Metrics,
) {
    visited.insert(root);
    metrics.dfs_visits += 1;
    let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

    while let Some(frame) = stack.last_mut() {
        let (v, next) = *frame;
        let edges = graph.outgoing_edges(v);

        if let Some(edge) = edges.get(next) {
            frame.1 += 1;
            metrics.edge_traversals += 1;
            if !visited.put(edge.to) {
                metrics.dfs_visits += 1;
                stack.push((edge.to, 0));
            }
        } else {
            stack.pop();
            finish_order.push(v);
        }
    }
}

/// Second pass: iterative DFS on the reversed graph, collecting reached
/// vertices in pre-order.
fn collect_component(
    reversed: &Graph,
    root: usize,
    visited: &mut FixedBitSet,
    metrics: &mut Metrics,
) -> Vec<usize> {
    visited.insert(root);
    metrics.dfs_visits += 1;
    let mut members = vec![root];
    let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

    while let Some(frame) = stack.last_mut() {
        let (v, next) = *frame;

        if let Some(edge) = reversed.outgoing_edges(v).get(next) {
            frame.1 += 1;
            metrics.edge_traversals += 1;
            if !visited.put(edge.to) {
                metrics.dfs_visits += 1;
                members.push(edge.to);
                stack.push((edge.to, 0));
            }
        } else {
            stack.pop();
        }
    }

    members
}

// ---------------------------------------------------------------------------
// Condensation
// ---------------------------------------------------------------------------

/// Collapse every component of `sccs` into one vertex.
///
/// - Vertex `c` of the result has the largest duration among the members of
///   component `c` (the bottleneck task of the cycle).
/// - For each original edge whose endpoints fall in different components,
///   one edge `from_component → to_component` is added the first time that
///   pair is seen, carrying that first edge's weight. Later edges between the
///   same pair are dropped, as are edges inside a component.
///
/// Edges whose component id falls outside `sccs.components` (an
/// `SccResult` not produced for `graph`) are skipped with a warning.
///
/// The result is always acyclic.
#[must_use]
#[instrument(skip_all, fields(components = sccs.component_count()))]
pub fn build_condensation(graph: &Graph, sccs: &SccResult) -> Graph {
    let mut condensed = Graph::new(sccs.component_count());
    let durations = graph.durations();

    for (idx, members) in sccs.components.iter().enumerate() {
        let bottleneck = members
            .iter()
            .filter_map(|&v| durations.get(v).copied())
            .max()
            .unwrap_or(0);
        if let Err(err) = condensed.set_node_duration(idx, bottleneck) {
            warn!(%err, component = idx, "component duration not set");
        }
    }

    let mut seen: HashSet<(usize, usize)> = HashSet::new();
    for edge in graph.edges() {
        let (Some(from), Some(to)) = (sccs.component_of(edge.from), sccs.component_of(edge.to))
        else {
            continue;
        };
        if from == to || !seen.insert((from, to)) {
            continue;
        }
        if let Err(err) = condensed.add_edge(from, to, edge.weight) {
            warn!(%err, from, to, "component edge skipped");
        }
    }

    debug!(
        vertices = condensed.vertex_count(),
        edges = condensed.edge_count(),
        "condensation built"
    );

    condensed
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
