//! End-to-end analysis of one task graph.
//!
//! # Stages
//!
//! 1. SCC decomposition of the raw graph.
//! 2. Condensation (always a DAG) and summary statistics.
//! 3. Topological order of the condensation, optionally expanded to a
//!    vertex-level schedule.
//! 4. Shortest paths over the condensation from the configured source.
//! 5. Critical path over the condensation.
//!
//! A stage that fails is recorded as [`StageOutcome::Refused`] with the
//! error's reason (e.g. "cycle present"); stages that depend on it are
//! [`StageOutcome::Skipped`]. Nothing here aborts, so one bad graph never
//! stops a batch.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::config::AnalysisConfig;
use crate::error::GraphError;
use crate::graph::model::Graph;
use crate::graph::paths;
use crate::graph::scc::{self, SccResult};
use crate::graph::stats::GraphStats;
use crate::graph::topo;
use crate::load::load_graph;
use crate::metrics::Metrics;

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Result of one pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum StageOutcome<T> {
    Completed(T),
    /// The stage ran and refused its input.
    Refused { code: &'static str, reason: String },
    /// The stage did not run.
    Skipped { reason: String },
}

impl<T> StageOutcome<T> {
    fn refused(err: &GraphError) -> Self {
        Self::Refused {
            code: err.code().code(),
            reason: err.to_string(),
        }
    }

    fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// The completed value, if any.
    #[must_use]
    pub const fn completed(&self) -> Option<&T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Refused { .. } | Self::Skipped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComponentSummary {
    pub count: usize,
    /// Member lists of components that contain a cycle.
    pub cyclic: Vec<Vec<usize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members: Option<Vec<Vec<usize>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertex_to_component: Option<Vec<usize>>,
    pub metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CondensationSummary {
    pub vertices: usize,
    pub edges: usize,
    pub durations: Vec<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSection {
    pub component_order: Vec<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vertex_order: Option<Vec<usize>>,
    pub metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortestSection {
    pub source_component: usize,
    /// Distance per component; `None` when unreachable.
    pub distances: Vec<Option<i64>>,
    pub metrics: Metrics,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriticalSection {
    pub component_path: Vec<usize>,
    /// `component_path` with each component replaced by its members.
    pub vertex_path: Vec<usize>,
    pub length: u64,
    pub metrics: Metrics,
}

/// Everything [`analyze`] learned about one graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub content_hash: String,
    pub stats: GraphStats,
    pub components: ComponentSummary,
    pub condensation: CondensationSummary,
    pub topological_order: StageOutcome<OrderSection>,
    pub shortest_paths: StageOutcome<ShortestSection>,
    pub critical_path: StageOutcome<CriticalSection>,
}

impl AnalysisReport {
    /// Sum of the metrics of every stage that ran.
    #[must_use]
    pub fn total_metrics(&self) -> Metrics {
        let mut total = self.components.metrics;
        if let Some(order) = self.topological_order.completed() {
            total.merge(&order.metrics);
        }
        if let Some(shortest) = self.shortest_paths.completed() {
            total.merge(&shortest.metrics);
        }
        if let Some(critical) = self.critical_path.completed() {
            total.merge(&critical.metrics);
        }
        total
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Run every stage on `graph`.
#[must_use]
#[instrument(skip_all, fields(vertices = graph.vertex_count(), edges = graph.edge_count()))]
pub fn analyze(graph: &Graph, config: &AnalysisConfig) -> AnalysisReport {
    let mut scc_metrics = Metrics::default();
    let sccs = scc::find_components_with_metrics(graph, &mut scc_metrics);
    let condensed = scc::build_condensation(graph, &sccs);
    let stats = GraphStats::compute(graph, &sccs, &condensed);

    let components = ComponentSummary {
        count: sccs.component_count(),
        cyclic: sccs
            .cyclic_components(graph)
            .into_iter()
            .filter_map(|idx| sccs.components.get(idx).cloned())
            .collect(),
        members: config.include_components.then(|| sccs.components.clone()),
        vertex_to_component: config
            .include_components
            .then(|| sccs.vertex_to_component.clone()),
        metrics: scc_metrics,
    };

    let condensation = CondensationSummary {
        vertices: condensed.vertex_count(),
        edges: condensed.edge_count(),
        durations: condensed.durations().to_vec(),
    };

    let topological_order = order_stage(&condensed, &sccs, config);
    let shortest_paths = shortest_stage(&condensed, &sccs, &topological_order, config);
    let critical_path = critical_stage(&condensed, &sccs);

    info!(
        components = components.count,
        cyclic = components.cyclic.len(),
        "analysis complete"
    );

    AnalysisReport {
        content_hash: graph.content_hash(),
        stats,
        components,
        condensation,
        topological_order,
        shortest_paths,
        critical_path,
    }
}

/// Load the task file at `path` and [`analyze`] it.
///
/// # Errors
///
/// Returns an error only if the file cannot be loaded; analysis failures are
/// recorded inside the report.
pub fn analyze_file(path: &Path, config: &AnalysisConfig) -> Result<AnalysisReport> {
    let graph = load_graph(path)?;
    Ok(analyze(&graph, config))
}

fn order_stage(
    condensed: &Graph,
    sccs: &SccResult,
    config: &AnalysisConfig,
) -> StageOutcome<OrderSection> {
    let mut metrics = Metrics::default();
    match topo::topological_order_with_metrics(condensed, &mut metrics) {
        Ok(component_order) => {
            let vertex_order = config.expand_vertex_order.then(|| {
                topo::expand_component_order(
                    &component_order,
                    &sccs.vertex_to_component,
                    &sccs.components,
                )
            });
            StageOutcome::Completed(OrderSection {
                component_order,
                vertex_order,
                metrics,
            })
        }
        Err(err) => {
            warn!(%err, "topological order refused");
            StageOutcome::refused(&err)
        }
    }
}

fn shortest_stage(
    condensed: &Graph,
    sccs: &SccResult,
    order: &StageOutcome<OrderSection>,
    config: &AnalysisConfig,
) -> StageOutcome<ShortestSection> {
    let Some(order) = order.completed() else {
        return StageOutcome::skipped("no topological order");
    };

    let source = match config.shortest_path_source {
        Some(vertex) => match sccs.component_of(vertex) {
            Some(component) => component,
            None => {
                return StageOutcome::refused(&GraphError::InvalidVertex {
                    vertex,
                    vertex_count: sccs.vertex_to_component.len(),
                });
            }
        },
        None => match order.component_order.first() {
            Some(&first) => first,
            None => return StageOutcome::skipped("empty graph"),
        },
    };

    let mut metrics = Metrics::default();
    match paths::shortest_paths_from_with_metrics(condensed, source, &mut metrics) {
        Ok(shortest) => StageOutcome::Completed(ShortestSection {
            source_component: source,
            distances: shortest.distances,
            metrics,
        }),
        Err(err) => {
            warn!(%err, "shortest paths refused");
            StageOutcome::refused(&err)
        }
    }
}

fn critical_stage(condensed: &Graph, sccs: &SccResult) -> StageOutcome<CriticalSection> {
    let mut metrics = Metrics::default();
    match paths::critical_path_with_metrics(condensed, &mut metrics) {
        Ok(critical) => {
            let vertex_path = topo::expand_component_order(
                &critical.path,
                &sccs.vertex_to_component,
                &sccs.components,
            );
            StageOutcome::Completed(CriticalSection {
                component_path: critical.path,
                vertex_path,
                length: critical.length,
                metrics,
            })
        }
        Err(err) => {
            warn!(%err, "critical path refused");
            StageOutcome::refused(&err)
        }
    }
}

/// Shortest route between two condensation vertices, if one is reachable.
///
/// Reports keep only distances; this recomputes predecessors on `condensed`.
///
/// # Errors
///
/// Propagates [`GraphError`] from the path engine.
pub fn component_route(
    condensed: &Graph,
    source: usize,
    target: usize,
) -> Result<Option<Vec<usize>>, GraphError> {
    Ok(paths::shortest_paths_from(condensed, source)?.path_to(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(n: usize, edges: &[(usize, usize, i64)], durations: &[u64]) -> Graph {
        let mut g = Graph::new(n);
        for &(from, to, w) in edges {
            g.add_edge(from, to, w).unwrap_or_else(|e| panic!("{e}"));
        }
        for (v, &d) in durations.iter().enumerate() {
            g.set_node_duration(v, d).unwrap_or_else(|e| panic!("{e}"));
        }
        g
    }

    #[test]
    fn empty_graph_completes_with_empty_sections() {
        let report = analyze(&Graph::new(0), &AnalysisConfig::default());

        assert_eq!(report.components.count, 0);
        assert_eq!(report.condensation.vertices, 0);
        let order = report
            .topological_order
            .completed()
            .unwrap_or_else(|| panic!("order should complete"));
        assert!(order.component_order.is_empty());
        assert!(matches!(report.shortest_paths, StageOutcome::Skipped { .. }));
        let critical = report
            .critical_path
            .completed()
            .unwrap_or_else(|| panic!("critical path should complete"));
        assert_eq!(critical.length, 0);
    }

    #[test]
    fn cyclic_graph_is_analysed_through_condensation() {
        // {0,1} (durations 2,5) -> 2 (duration 3)
        let g = graph(3, &[(0, 1, 1), (1, 0, 1), (1, 2, 4)], &[2, 5, 3]);
        let report = analyze(&g, &AnalysisConfig::default());

        assert_eq!(report.components.count, 2);
        assert_eq!(report.components.cyclic.len(), 1);
        assert_eq!(report.condensation.edges, 1);

        let order = report
            .topological_order
            .completed()
            .unwrap_or_else(|| panic!("condensation is a DAG"));
        assert_eq!(order.vertex_order.as_ref().map(Vec::len), Some(3));

        let shortest = report
            .shortest_paths
            .completed()
            .unwrap_or_else(|| panic!("shortest paths"));
        assert_eq!(shortest.distances.iter().filter(|d| d.is_some()).count(), 2);

        let critical = report
            .critical_path
            .completed()
            .unwrap_or_else(|| panic!("critical path"));
        assert_eq!(critical.length, 8, "max(2,5) + 3");
        assert_eq!(critical.vertex_path.len(), 3);
        assert_eq!(critical.vertex_path.last(), Some(&2));
    }

    #[test]
    fn configured_source_maps_to_its_component() {
        let g = graph(3, &[(0, 1, 1), (1, 2, 1)], &[]);
        let config = AnalysisConfig {
            shortest_path_source: Some(1),
            ..AnalysisConfig::default()
        };
        let report = analyze(&g, &config);

        let shortest = report
            .shortest_paths
            .completed()
            .unwrap_or_else(|| panic!("shortest paths"));
        let comp_of_1 = report
            .components
            .vertex_to_component
            .as_ref()
            .and_then(|m| m.get(1).copied())
            .unwrap_or_else(|| panic!("mapping included by default"));
        assert_eq!(shortest.source_component, comp_of_1);
        assert_eq!(shortest.distances[comp_of_1], Some(0));
    }

    #[test]
    fn out_of_range_source_is_refused() {
        let g = graph(2, &[(0, 1, 1)], &[]);
        let config = AnalysisConfig {
            shortest_path_source: Some(9),
            ..AnalysisConfig::default()
        };
        let report = analyze(&g, &config);

        match report.shortest_paths {
            StageOutcome::Refused { code, .. } => assert_eq!(code, "E2001"),
            other => panic!("expected refusal, got {other:?}"),
        }
        assert!(report.critical_path.completed().is_some());
    }

    #[test]
    fn component_lists_can_be_omitted() {
        let config = AnalysisConfig {
            include_components: false,
            expand_vertex_order: false,
            ..AnalysisConfig::default()
        };
        let report = analyze(&graph(2, &[(0, 1, 1)], &[]), &config);

        assert!(report.components.members.is_none());
        assert!(report.components.vertex_to_component.is_none());
        let order = report
            .topological_order
            .completed()
            .unwrap_or_else(|| panic!("order"));
        assert!(order.vertex_order.is_none());
    }

    #[test]
    fn report_serializes_stage_status() {
        let report = analyze(&graph(2, &[(0, 1, 1)], &[]), &AnalysisConfig::default());
        let json = serde_json::to_value(&report).unwrap_or_else(|e| panic!("{e}"));

        assert_eq!(json["topological_order"]["status"], "completed");
        assert_eq!(json["critical_path"]["result"]["length"], 2);
        assert!(json["content_hash"].as_str().is_some_and(|h| h.starts_with("blake3:")));
    }

    #[test]
    fn total_metrics_covers_all_stages() {
        let report = analyze(&graph(3, &[(0, 1, 1), (1, 2, 1)], &[]), &AnalysisConfig::default());
        let total = report.total_metrics();

        assert_eq!(total.dfs_visits, 6);
        assert_eq!(total.queue_pops, 9, "order, shortest and critical stages each sort 3");
        assert!(total.relaxations >= 4, "shortest + longest each relax 2 edges");
    }

    #[test]
    fn component_route_reconstructs_path() {
        let g = graph(3, &[(0, 1, 1), (1, 2, 1)], &[]);
        assert_eq!(component_route(&g, 0, 2), Ok(Some(vec![0, 1, 2])));
        assert_eq!(component_route(&g, 2, 0), Ok(None));
    }
}
