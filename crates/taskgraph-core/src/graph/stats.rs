//! Summary statistics for a task graph and its condensation.
//!
//! # Statistics Provided
//!
//! - **vertex_count** / **edge_count**: size of the original graph
//!   (duplicate edges counted).
//! - **density**: `edge_count / (vertex_count * (vertex_count - 1))`; zero
//!   for graphs with fewer than two vertices. Multigraphs can exceed 1.0.
//! - **scc_count**: number of strongly connected components (vertices of the
//!   condensation).
//! - **cyclic_component_count**: components that contain a cycle (more than
//!   one member, or a self-loop).
//! - **weakly_connected_component_count**: disjoint subgraphs when edge
//!   direction is ignored.
//! - **isolated_vertex_count**: vertices with neither in- nor out-edges.
//! - **max_in_degree** / **max_out_degree**: over the original graph.
//! - **condensed_edge_count**: edges left after condensation.
//! - **total_duration**: sum of all vertex durations, saturating at `u64::MAX`.

use petgraph::algo::connected_components;
use serde::Serialize;

use crate::graph::model::Graph;
use crate::graph::scc::SccResult;

/// Summary statistics for a task graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub vertex_count: usize,
    pub edge_count: usize,
    pub density: f64,
    pub scc_count: usize,
    pub cyclic_component_count: usize,
    pub largest_component_size: usize,
    pub weakly_connected_component_count: usize,
    pub isolated_vertex_count: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    pub condensed_edge_count: usize,
    pub total_duration: u64,
}

impl GraphStats {
    /// Compute statistics for `graph`, given its components and condensation.
    #[must_use]
    pub fn compute(graph: &Graph, sccs: &SccResult, condensed: &Graph) -> Self {
        let n = graph.vertex_count();

        let mut in_degree = vec![0_usize; n];
        for edge in graph.edges() {
            in_degree[edge.to] += 1;
        }
        let out_degree: Vec<usize> = (0..n).map(|v| graph.outgoing_edges(v).len()).collect();

        let isolated_vertex_count = in_degree
            .iter()
            .zip(&out_degree)
            .filter(|&(&i, &o)| i == 0 && o == 0)
            .count();

        Self {
            vertex_count: n,
            edge_count: graph.edge_count(),
            density: compute_density(n, graph.edge_count()),
            scc_count: sccs.component_count(),
            cyclic_component_count: sccs.cyclic_components(graph).len(),
            largest_component_size: sccs.largest_component_size(),
            weakly_connected_component_count: connected_components(&graph.to_petgraph()),
            isolated_vertex_count,
            max_in_degree: in_degree.iter().copied().max().unwrap_or(0),
            max_out_degree: out_degree.iter().copied().max().unwrap_or(0),
            condensed_edge_count: condensed.edge_count(),
            total_duration: graph.durations().iter().fold(0, |acc, &d| acc.saturating_add(d)),
        }
    }

    /// Return `true` if the graph contains at least one cycle.
    #[must_use]
    pub const fn has_cycles(&self) -> bool {
        self.cyclic_component_count > 0
    }

    /// Return `true` if the graph has no edges.
    #[must_use]
    pub const fn is_flat(&self) -> bool {
        self.edge_count == 0
    }
}

#[allow(clippy::cast_precision_loss)]
fn compute_density(vertex_count: usize, edge_count: usize) -> f64 {
    if vertex_count < 2 {
        return 0.0_f64;
    }
    let max_edges = (vertex_count * (vertex_count - 1)) as f64;
    edge_count as f64 / max_edges
}
