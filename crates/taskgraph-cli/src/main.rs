#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use output::{CliError, OutputMode, resolve_output_mode};
use taskgraph_core::config::{ProjectConfig, discover_config, load_config};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "tg: structural analysis of task-dependency graphs",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit per-file engine counters and command timing to stderr.
    #[arg(long, global = true)]
    timing: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    /// Config file (default: ./taskgraph.toml when present).
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }

    fn project_config(&self) -> anyhow::Result<ProjectConfig> {
        match &self.config {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("config file not found: {}", path.display());
                }
                load_config(path)
            }
            None => {
                let cwd = env::current_dir().context("Failed to read current directory")?;
                discover_config(&cwd)
            }
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        next_help_heading = "Analysis",
        about = "Analyse task files",
        long_about = "Decompose each task graph into strongly connected components, order the \
                      condensation, and compute shortest and critical paths.",
        after_help = "EXAMPLES:\n    # Analyse one file\n    tg analyze data/medium_mixed.json\n\n    # Analyse a batch, machine-readable\n    tg analyze data/*.json --json\n\n    # Pick the shortest-path source vertex\n    tg analyze tasks.json --source 3"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),

    #[command(
        next_help_heading = "Datasets",
        about = "Generate the standard dataset suite",
        long_about = "Write nine seeded synthetic task files covering DAGs, single and multiple cycles, and mixed shapes.",
        after_help = "EXAMPLES:\n    # Write ./data with the default seed\n    tg generate\n\n    # Choose directory and seed\n    tg generate --dir fixtures --seed 7"
    )]
    Generate(cmd::generate::GenerateArgs),

    #[command(
        next_help_heading = "Analysis",
        about = "Export a task graph as Graphviz DOT",
        after_help = "EXAMPLES:\n    # Raw graph\n    tg dot tasks.json | dot -Tsvg > tasks.svg\n\n    # Condensation\n    tg dot tasks.json --condensed"
    )]
    Dot(cmd::dot::DotArgs),

    #[command(
        next_help_heading = "Maintenance",
        about = "Generate shell completion scripts",
        after_help = "EXAMPLES:\n    # Generate bash completions\n    tg completions bash"
    )]
    Completions(cmd::completions::CompletionsArgs),
}

impl Commands {
    const fn name(&self) -> &'static str {
        match self {
            Self::Analyze(_) => "cmd.analyze",
            Self::Generate(_) => "cmd.generate",
            Self::Dot(_) => "cmd.dot",
            Self::Completions(_) => "cmd.completions",
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("TASKGRAPH_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "taskgraph_core=debug,tg=debug,info"
        } else {
            "warn"
        })
    });

    let format = env::var("TASKGRAPH_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.project_config()?;
    debug!(?config, "configuration resolved");

    let output = cli.output_mode();
    let started = Instant::now();
    let name = cli.command.name();

    let command_result = match &cli.command {
        Commands::Analyze(args) => {
            cmd::analyze::run_analyze(args, &config.analysis, output, cli.timing)
        }
        Commands::Generate(args) => cmd::generate::run_generate(args, &config.generate, output),
        Commands::Dot(args) => cmd::dot::run_dot(args),
        Commands::Completions(args) => {
            let mut command = Cli::command();
            cmd::completions::run_completions(args.shell, &mut command)
        }
    };

    if cli.timing {
        eprintln!(
            "timing: {name} {:.3}ms",
            started.elapsed().as_secs_f64() * 1_000.0
        );
    }
    info!(command = name, ok = command_result.is_ok(), "command finished");

    if output.is_json() {
        if let Err(err) = &command_result {
            output::render_error(
                output,
                &CliError::with_details(
                    format!("{err:#}"),
                    "rerun with --verbose for details",
                    "command_failed",
                ),
            )?;
        }
    }

    command_result
}
