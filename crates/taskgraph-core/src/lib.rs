#![forbid(unsafe_code)]
//! taskgraph-core library.
//!
//! # Conventions
//!
//! - **Errors**: graph operations return [`error::GraphError`]; file and
//!   config boundaries use `anyhow::Result` with context.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).
//!
//! # Pipeline
//!
//! ```text
//! tasks.json
//!        ↓  load::load_graph()
//! Graph (may contain cycles)
//!        ↓  graph::scc::find_components() + build_condensation()
//! condensation Graph (DAG, one vertex per SCC)
//!        ↓  graph::topo::topological_order()
//! component order  →  expand_component_order() → vertex schedule
//!        ↓  graph::paths::{shortest_paths_from, critical_path}()
//! distances / critical path
//! ```
//!
//! [`analysis::analyze`] runs the whole chain for one graph.

pub mod analysis;
pub mod config;
pub mod error;
pub mod generate;
pub mod graph;
pub mod load;
pub mod metrics;

pub use error::{ErrorCode, GraphError};
pub use graph::Graph;
pub use metrics::Metrics;
