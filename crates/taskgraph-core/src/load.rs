//! Task-file loading.
//!
//! # Format
//!
//! ```json
//! {
//!   "tasks": [
//!     { "id": 0, "name": "survey", "duration": 3 },
//!     { "id": 1, "name": "build",  "duration": 5, "dependencies": [0] }
//!   ]
//! }
//! ```
//!
//! ## Edge Direction
//!
//! Each entry in `dependencies` becomes an edge `dependency → task`: the
//! dependency must finish before the task starts. The edge weight is the
//! dependency's own declared duration, or 1 when it declares none.
//!
//! ## Vertex Ids
//!
//! Vertices are packed densely from 0 to the largest id referenced anywhere
//! in the file (as a task or as a dependency). Ids that never appear as a
//! task keep the default duration of 1. The largest id must stay below
//! [`MAX_VERTICES`], and declared durations must fit in an `i64` edge weight.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::graph::Graph;

/// Weight of a dependency edge whose source declares no duration.
pub const DEFAULT_EDGE_WEIGHT: i64 = 1;

/// Upper bound on the vertex count a task file may imply.
pub const MAX_VERTICES: usize = 1 << 24;

/// On-disk task file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFile {
    pub tasks: Vec<TaskSpec>,
}

/// One task entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskSpec {
    pub id: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
    #[serde(default)]
    pub dependencies: Vec<usize>,
}

impl TaskFile {
    /// Read and parse a task file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid task
    /// file. The path is included in the error context.
    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Write this task file as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or the write fails.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Number of vertices the graph for this file will have.
    ///
    /// # Errors
    ///
    /// Returns an error if the largest referenced id would need
    /// more than [`MAX_VERTICES`] vertices.
    pub fn vertex_count(&self) -> Result<usize> {
        let Some(max_id) = self
            .tasks
            .iter()
            .flat_map(|t| std::iter::once(t.id).chain(t.dependencies.iter().copied()))
            .max()
        else {
            return Ok(0);
        };
        match max_id.checked_add(1) {
            Some(count) if count <= MAX_VERTICES => Ok(count),
            _ => bail!("task id {max_id} exceeds the supported vertex count {MAX_VERTICES}"),
        }
    }

    /// Build the dependency graph described by this file.
    ///
    /// # Errors
    ///
    /// Returns an error if an id is out of the supported range or a declared
    /// duration does not fit in an `i64` edge weight.
    pub fn to_graph(&self) -> Result<Graph> {
        let mut graph = Graph::new(self.vertex_count()?);

        let mut declared: HashMap<usize, i64> = HashMap::new();
        for task in &self.tasks {
            if let Some(duration) = task.duration {
                let weight = i64::try_from(duration).with_context(|| {
                    format!("task {} duration {duration} exceeds {}", task.id, i64::MAX)
                })?;
                graph.set_node_duration(task.id, duration)?;
                declared.insert(task.id, weight);
            }
        }

        for task in &self.tasks {
            for &dep in &task.dependencies {
                let weight = declared.get(&dep).copied().unwrap_or(DEFAULT_EDGE_WEIGHT);
                graph.add_edge(dep, task.id, weight)?;
            }
        }

        Ok(graph)
    }
}

/// Parse a task file from a JSON string into a graph.
///
/// # Errors
///
/// Returns an error if `json` is not a valid task file.
pub fn parse_graph(json: &str) -> Result<Graph> {
    let file: TaskFile = serde_json::from_str(json).context("Failed to parse task file")?;
    file.to_graph()
}

/// Load the graph stored in the task file at `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
#[instrument]
pub fn load_graph(path: &Path) -> Result<Graph> {
    let file = TaskFile::read(path)?;
    let graph = file
        .to_graph()
        .with_context(|| format!("Invalid task graph in {}", path.display()))?;
    debug!(
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "task graph loaded"
    );
    Ok(graph)
}
