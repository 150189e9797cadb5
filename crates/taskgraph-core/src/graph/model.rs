//! Dense directed multigraph with per-vertex durations.
//!
//! # Edge Direction
//!
//! An edge `A → B` means "A must finish before B starts" (dependency →
//! dependent). Duplicate edges are kept: the graph is a multigraph, and the
//! order in which edges were added is the order every engine walks them.

#![allow(clippy::module_name_repetitions)]

use std::fmt;

use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::error::{GraphError, Result};

/// Duration a vertex has until [`Graph::set_node_duration`] says otherwise.
pub const DEFAULT_DURATION: u64 = 1;

/// A directed, weighted edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub weight: i64,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} (w={})", self.from, self.to, self.weight)
    }
}

/// Directed task graph over vertices `0..vertex_count`.
///
/// The vertex count is fixed at construction. Edges and durations are added
/// through [`Graph::add_edge`] and [`Graph::set_node_duration`]; there are no
/// other mutators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Graph {
    adjacency: Vec<Vec<Edge>>,
    edges: Vec<Edge>,
    durations: Vec<u64>,
}

impl Graph {
    /// Create a graph with `vertex_count` isolated vertices of duration 1.
    #[must_use]
    pub fn new(vertex_count: usize) -> Self {
        Self {
            adjacency: vec![Vec::new(); vertex_count],
            edges: Vec::new(),
            durations: vec![DEFAULT_DURATION; vertex_count],
        }
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of stored edges, duplicates included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns true for the zero-vertex graph.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    /// Append the edge `from → to` to the edge list and to `from`'s adjacency.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidVertex`] if either endpoint is out of
    /// range. The graph is left unchanged.
    pub fn add_edge(&mut self, from: usize, to: usize, weight: i64) -> Result<()> {
        self.check_vertex(from)?;
        self.check_vertex(to)?;

        let edge = Edge { from, to, weight };
        self.adjacency[from].push(edge);
        self.edges.push(edge);
        Ok(())
    }

    /// Set the duration of vertex `v`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidVertex`] if `v` is out of range.
    pub fn set_node_duration(&mut self, v: usize, duration: u64) -> Result<()> {
        self.check_vertex(v)?;
        self.durations[v] = duration;
        Ok(())
    }

    /// Duration of vertex `v` (1 unless set).
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::InvalidVertex`] if `v` is out of range.
    pub fn node_duration(&self, v: usize) -> Result<u64> {
        self.durations
            .get(v)
            .copied()
            .ok_or(GraphError::InvalidVertex {
                vertex: v,
                vertex_count: self.vertex_count(),
            })
    }

    /// All durations, indexed by vertex id.
    #[must_use]
    pub fn durations(&self) -> &[u64] {
        &self.durations
    }

    /// Outgoing edges of `v` in insertion order.
    ///
    /// An out-of-range `v` has no edges.
    #[must_use]
    pub fn outgoing_edges(&self, v: usize) -> &[Edge] {
        self.adjacency.get(v).map_or(&[], Vec::as_slice)
    }

    /// Every edge in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Returns true if some stored edge runs `u → v`.
    #[must_use]
    pub fn has_edge(&self, u: usize, v: usize) -> bool {
        self.outgoing_edges(u).iter().any(|e| e.to == v)
    }

    /// A new graph with every edge flipped, same vertex count and durations.
    ///
    /// Edges are re-added in the original global insertion order, so the
    /// reversed adjacency lists are ordered by original edge position.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut reversed = Self {
            adjacency: vec![Vec::new(); self.vertex_count()],
            edges: Vec::with_capacity(self.edges.len()),
            durations: self.durations.clone(),
        };

        for edge in &self.edges {
            let flipped = Edge {
                from: edge.to,
                to: edge.from,
                weight: edge.weight,
            };
            reversed.adjacency[flipped.from].push(flipped);
            reversed.edges.push(flipped);
        }

        reversed
    }

    /// BLAKE3 hash over vertex count, durations and the ordered edge list.
    ///
    /// Two graphs with the same hash produce identical analysis results.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&(self.vertex_count() as u64).to_le_bytes());
        for duration in &self.durations {
            hasher.update(&duration.to_le_bytes());
        }
        for edge in &self.edges {
            hasher.update(&(edge.from as u64).to_le_bytes());
            hasher.update(&(edge.to as u64).to_le_bytes());
            hasher.update(&edge.weight.to_le_bytes());
        }
        format!("blake3:{}", hasher.finalize())
    }

    /// Export as a petgraph graph (node weight = duration, edge weight = weight).
    ///
    /// Node indices match vertex ids.
    #[must_use]
    pub fn to_petgraph(&self) -> DiGraph<u64, i64> {
        let mut graph = DiGraph::with_capacity(self.vertex_count(), self.edge_count());
        for &duration in &self.durations {
            graph.add_node(duration);
        }
        for edge in &self.edges {
            graph.add_edge(
                NodeIndex::new(edge.from),
                NodeIndex::new(edge.to),
                edge.weight,
            );
        }
        graph
    }

    fn check_vertex(&self, v: usize) -> Result<()> {
        if v < self.vertex_count() {
            Ok(())
        } else {
            Err(GraphError::InvalidVertex {
                vertex: v,
                vertex_count: self.vertex_count(),
            })
        }
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Graph with {} vertices:", self.vertex_count())?;
        for (v, edges) in self.adjacency.iter().enumerate() {
            write!(f, "{v} -> [")?;
            for (i, edge) in edges.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{edge}")?;
            }
            writeln!(f, "] (duration={})", self.durations[v])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(n: usize) -> Graph {
        let mut g = Graph::new(n);
        for v in 1..n {
            g.add_edge(v - 1, v, 1).unwrap_or_else(|e| panic!("{e}"));
        }
        g
    }

    #[test]
    fn new_graph_has_default_durations() {
        let g = Graph::new(3);
        assert_eq!(g.vertex_count(), 3);
        assert_eq!(g.edge_count(), 0);
        for v in 0..3 {
            assert_eq!(g.node_duration(v), Ok(DEFAULT_DURATION));
        }
    }

    #[test]
    fn add_edge_rejects_out_of_range_endpoints() {
        let mut g = Graph::new(2);
        assert_eq!(
            g.add_edge(0, 2, 1),
            Err(GraphError::InvalidVertex {
                vertex: 2,
                vertex_count: 2
            })
        );
        assert_eq!(
            g.add_edge(5, 0, 1),
            Err(GraphError::InvalidVertex {
                vertex: 5,
                vertex_count: 2
            })
        );
        assert_eq!(g.edge_count(), 0, "failed add leaves graph unchanged");
    }

    #[test]
    fn durations_are_validated() {
        let mut g = Graph::new(1);
        assert!(g.set_node_duration(0, 7).is_ok());
        assert_eq!(g.node_duration(0), Ok(7));
        assert!(g.set_node_duration(1, 7).is_err());
        assert!(g.node_duration(1).is_err());
    }

    #[test]
    fn adjacency_preserves_insertion_order_and_duplicates() {
        let mut g = Graph::new(3);
        g.add_edge(0, 2, 4).unwrap_or_else(|e| panic!("{e}"));
        g.add_edge(0, 1, 3).unwrap_or_else(|e| panic!("{e}"));
        g.add_edge(0, 2, 9).unwrap_or_else(|e| panic!("{e}"));

        let targets: Vec<(usize, i64)> =
            g.outgoing_edges(0).iter().map(|e| (e.to, e.weight)).collect();
        assert_eq!(targets, vec![(2, 4), (1, 3), (2, 9)]);
        assert_eq!(g.edge_count(), 3);
    }

    #[test]
    fn outgoing_edges_of_unknown_vertex_is_empty() {
        let g = Graph::new(1);
        assert!(g.outgoing_edges(10).is_empty());
        assert!(!g.has_edge(10, 0));
    }

    #[test]
    fn has_edge_is_directional() {
        let g = chain(3);
        assert!(g.has_edge(0, 1));
        assert!(g.has_edge(1, 2));
        assert!(!g.has_edge(1, 0));
        assert!(!g.has_edge(0, 2));
    }

    #[test]
    fn reversed_flips_edges_and_keeps_durations() {
        let mut g = chain(3);
        g.set_node_duration(2, 5).unwrap_or_else(|e| panic!("{e}"));

        let r = g.reversed();

        assert_eq!(r.vertex_count(), 3);
        assert!(r.has_edge(1, 0));
        assert!(r.has_edge(2, 1));
        assert!(!r.has_edge(0, 1));
        assert_eq!(r.node_duration(2), Ok(5));
        // Original untouched.
        assert!(g.has_edge(0, 1));
    }

    #[test]
    fn content_hash_tracks_edges_and_durations() {
        let a = chain(3);
        let mut b = chain(3);
        assert_eq!(a.content_hash(), b.content_hash());
        assert!(a.content_hash().starts_with("blake3:"));

        b.set_node_duration(0, 2).unwrap_or_else(|e| panic!("{e}"));
        assert_ne!(a.content_hash(), b.content_hash());

        let mut c = chain(3);
        c.add_edge(0, 2, 1).unwrap_or_else(|e| panic!("{e}"));
        assert_ne!(a.content_hash(), c.content_hash());
    }

    #[test]
    fn petgraph_export_keeps_indices() {
        let mut g = chain(3);
        g.set_node_duration(1, 4).unwrap_or_else(|e| panic!("{e}"));
        let pg = g.to_petgraph();

        assert_eq!(pg.node_count(), 3);
        assert_eq!(pg.edge_count(), 2);
        assert_eq!(pg[NodeIndex::new(1)], 4);
        assert!(pg.contains_edge(NodeIndex::new(0), NodeIndex::new(1)));
    }

    #[test]
    fn display_lists_every_vertex() {
        let g = chain(2);
        let text = g.to_string();
        assert!(text.starts_with("Graph with 2 vertices:"));
        assert!(text.contains("0 -> [0 -> 1 (w=1)] (duration=1)"));
        assert!(text.contains("1 -> [] (duration=1)"));
    }
}
