//! `tg analyze`: run the full analysis pipeline over task files.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use taskgraph_core::analysis::{AnalysisReport, StageOutcome, analyze};
use taskgraph_core::config::AnalysisConfig;
use taskgraph_core::graph::topo;
use taskgraph_core::load::load_graph;
use tracing::warn;

use crate::output::{CliError, OutputMode, join_ids, pretty_kv, pretty_section, render_mode};

/// Arguments for `tg analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Task files (JSON) to analyse.
    #[arg(required = true, value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Vertex whose component is the shortest-path source.
    #[arg(long, value_name = "VERTEX")]
    pub source: Option<usize>,

    /// Omit component membership lists from the report.
    #[arg(long)]
    pub no_components: bool,

    /// Report the component order only, without the vertex schedule.
    #[arg(long)]
    pub no_expand: bool,

    /// Fail files whose raw graph contains a cycle.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum FileResult {
    Analyzed { file: String, report: Box<AnalysisReport> },
    Failed { file: String, error: CliError },
}

/// Execute `tg analyze`.
///
/// Every file is attempted; failures are reported alongside successes.
///
/// # Errors
///
/// Returns an error if any file failed or output cannot be written.
pub fn run_analyze(
    args: &AnalyzeArgs,
    base: &AnalysisConfig,
    output: OutputMode,
    timing: bool,
) -> anyhow::Result<()> {
    let config = effective_config(args, base);

    let results: Vec<FileResult> = args
        .files
        .iter()
        .map(|path| {
            let file = path.display().to_string();
            let graph = match load_graph(path) {
                Ok(graph) => graph,
                Err(err) => {
                    warn!(%file, error = %format!("{err:#}"), "skipping file");
                    return FileResult::Failed {
                        file,
                        error: CliError::with_details(
                            format!("{err:#}"),
                            "check the path and the task file format",
                            "load_failed",
                        ),
                    };
                }
            };

            if args.strict {
                if let Err(err) = topo::topological_order(&graph) {
                    return FileResult::Failed {
                        file,
                        error: CliError::from(&err),
                    };
                }
            }

            let report = analyze(&graph, &config);
            if timing {
                eprintln!("timing: {file}: {}", report.total_metrics());
            }
            FileResult::Analyzed {
                file,
                report: Box::new(report),
            }
        })
        .collect();

    render_mode(output, results.as_slice(), render_text, render_pretty)?;

    let failed = results
        .iter()
        .filter(|r| matches!(r, FileResult::Failed { .. }))
        .count();
    if failed > 0 {
        anyhow::bail!("{failed} of {} files failed", results.len());
    }
    Ok(())
}

fn effective_config(args: &AnalyzeArgs, base: &AnalysisConfig) -> AnalysisConfig {
    let mut config = base.clone();
    if args.source.is_some() {
        config.shortest_path_source = args.source;
    }
    if args.no_components {
        config.include_components = false;
    }
    if args.no_expand {
        config.expand_vertex_order = false;
    }
    config
}

fn stage_status<T>(outcome: &StageOutcome<T>) -> String {
    match outcome {
        StageOutcome::Completed(_) => "completed".to_string(),
        StageOutcome::Refused { code, reason } => format!("refused [{code}]: {reason}"),
        StageOutcome::Skipped { reason } => format!("skipped: {reason}"),
    }
}

fn render_text(results: &[FileResult], w: &mut dyn Write) -> io::Result<()> {
    for result in results {
        match result {
            FileResult::Analyzed { file, report } => {
                let critical = report
                    .critical_path
                    .completed()
                    .map_or_else(|| "-".to_string(), |c| c.length.to_string());
                writeln!(
                    w,
                    "{file}\tvertices={} edges={} sccs={} cyclic={} critical={critical}",
                    report.stats.vertex_count,
                    report.stats.edge_count,
                    report.stats.scc_count,
                    report.stats.cyclic_component_count,
                )?;
            }
            FileResult::Failed { file, error } => {
                writeln!(w, "{file}\terror={}", error.message)?;
            }
        }
    }
    Ok(())
}

fn render_pretty(results: &[FileResult], w: &mut dyn Write) -> io::Result<()> {
    for result in results {
        match result {
            FileResult::Analyzed { file, report } => render_report(file, report, w)?,
            FileResult::Failed { file, error } => {
                pretty_section(w, file)?;
                pretty_kv(w, "error", &error.message)?;
                if let Some(suggestion) = &error.suggestion {
                    pretty_kv(w, "suggestion", suggestion)?;
                }
            }
        }
        writeln!(w)?;
    }
    Ok(())
}

fn render_report(file: &str, report: &AnalysisReport, w: &mut dyn Write) -> io::Result<()> {
    let stats = &report.stats;
    pretty_section(w, file)?;
    pretty_kv(w, "hash", &report.content_hash)?;
    pretty_kv(
        w,
        "graph",
        format!(
            "{} vertices, {} edges, density {:.3}",
            stats.vertex_count, stats.edge_count, stats.density
        ),
    )?;
    pretty_kv(
        w,
        "components",
        format!(
            "{} ({} cyclic, largest {})",
            stats.scc_count, stats.cyclic_component_count, stats.largest_component_size
        ),
    )?;
    for members in &report.components.cyclic {
        let ids: Vec<String> = members.iter().map(ToString::to_string).collect();
        pretty_kv(w, "  cycle", ids.join(", "))?;
    }
    pretty_kv(
        w,
        "condensation",
        format!(
            "{} vertices, {} edges",
            report.condensation.vertices, report.condensation.edges
        ),
    )?;

    match report.topological_order.completed() {
        Some(order) => {
            let schedule = order.vertex_order.as_ref().unwrap_or(&order.component_order);
            pretty_kv(w, "order", join_ids(schedule))?;
        }
        None => pretty_kv(w, "order", stage_status(&report.topological_order))?,
    }

    match report.shortest_paths.completed() {
        Some(shortest) => {
            let reached = shortest.distances.iter().filter(|d| d.is_some()).count();
            pretty_kv(
                w,
                "shortest",
                format!(
                    "from component {}: {reached}/{} reached",
                    shortest.source_component,
                    shortest.distances.len()
                ),
            )?;
        }
        None => pretty_kv(w, "shortest", stage_status(&report.shortest_paths))?,
    }

    match report.critical_path.completed() {
        Some(critical) => pretty_kv(
            w,
            "critical",
            format!("{} via {}", critical.length, join_ids(&critical.vertex_path)),
        ),
        None => pretty_kv(w, "critical", stage_status(&report.critical_path)),
    }
}
