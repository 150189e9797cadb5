//! `tg dot`: export a task graph (or its condensation) as Graphviz DOT.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use petgraph::dot::Dot;
use taskgraph_core::Graph;
use taskgraph_core::graph::scc;
use taskgraph_core::load::load_graph;

/// Arguments for `tg dot`.
#[derive(Args, Debug)]
pub struct DotArgs {
    /// Task file (JSON) to export.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Export the condensation (one node per strongly connected component).
    #[arg(long)]
    pub condensed: bool,
}

/// Execute `tg dot`.
///
/// Nodes are labelled with their duration, edges with their weight.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or stdout cannot be written.
pub fn run_dot(args: &DotArgs) -> anyhow::Result<()> {
    let graph = load_graph(&args.file)?;
    let rendered = render_dot(&graph, args.condensed);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write!(out, "{rendered}")?;
    Ok(())
}

fn render_dot(graph: &Graph, condensed: bool) -> String {
    let exported = if condensed {
        scc::build_condensation(graph, &scc::find_components(graph)).to_petgraph()
    } else {
        graph.to_petgraph()
    };
    format!("{}", Dot::new(&exported))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cycle_into_tail() -> Graph {
        let mut g = Graph::new(3);
        for (from, to, w) in [(0, 1, 4), (1, 0, 5), (1, 2, 6)] {
            g.add_edge(from, to, w).unwrap_or_else(|e| panic!("{e}"));
        }
        g
    }

    #[test]
    fn raw_export_has_every_edge() {
        let dot = render_dot(&two_cycle_into_tail(), false);
        assert!(dot.starts_with("digraph"));
        assert_eq!(dot.matches("->").count(), 3);
        assert!(dot.contains("label = \"6\""));
    }

    #[test]
    fn condensed_export_collapses_cycle() {
        let dot = render_dot(&two_cycle_into_tail(), true);
        assert_eq!(dot.matches("->").count(), 1);
        assert!(dot.contains("label = \"6\""));
    }
}
