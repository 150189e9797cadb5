//! Task-dependency graph and the engines that analyse it.
//!
//! # Overview
//!
//! [`model::Graph`] is a dense, index-addressed directed multigraph with
//! per-vertex durations. Adjacency lists keep insertion order, and every
//! engine walks them in that order, so results are reproducible for a fixed
//! sequence of `add_edge` calls.
//!
//! ## Pipeline
//!
//! ```text
//! Graph (may contain cycles)
//!        ↓  scc::find_components()
//! SccResult (components + vertex_to_component)
//!        ↓  scc::build_condensation()
//! condensation Graph (DAG)
//!        ↓  topo::topological_order()
//! Vec<usize> over components
//!        ↓  paths::shortest_paths_from() / paths::critical_path()
//! ShortestPaths / CriticalPath
//! ```
//!
//! ## Typical Usage
//!
//! ```rust
//! use taskgraph_core::graph::{Graph, paths, scc, topo};
//!
//! let mut g = Graph::new(3);
//! g.add_edge(0, 1, 1)?;
//! g.add_edge(1, 0, 1)?;
//! g.add_edge(1, 2, 1)?;
//!
//! let sccs = scc::find_components(&g);
//! let dag = scc::build_condensation(&g, &sccs);
//! let order = topo::topological_order(&dag)?;
//! let critical = paths::critical_path(&dag)?;
//!
//! assert_eq!(sccs.component_count(), 2);
//! assert_eq!(order.len(), 2);
//! assert_eq!(critical.length, 2);
//! # Ok::<(), taskgraph_core::GraphError>(())
//! ```

pub mod model;
pub mod paths;
pub mod scc;
pub mod stats;
pub mod topo;

// Re-export primary types at module level for convenience.
pub use model::{Edge, Graph};
pub use paths::{CriticalPath, LongestPaths, ShortestPaths};
pub use scc::SccResult;
pub use stats::GraphStats;
