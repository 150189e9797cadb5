//! `tg generate`: write the seeded standard dataset suite.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use serde::Serialize;
use taskgraph_core::config::GenerateConfig;
use taskgraph_core::generate::generate_suite;

use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `tg generate`.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Output directory (defaults to the configured one, `data`).
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Random seed (defaults to the configured one, 42).
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct GenerateOutput {
    dir: PathBuf,
    seed: u64,
    files: Vec<PathBuf>,
}

/// Execute `tg generate`.
///
/// # Errors
///
/// Returns an error if the directory or a dataset file cannot be written.
pub fn run_generate(
    args: &GenerateArgs,
    config: &GenerateConfig,
    output: OutputMode,
) -> anyhow::Result<()> {
    let dir = args.dir.clone().unwrap_or_else(|| config.dir.clone());
    let seed = args.seed.unwrap_or(config.seed);

    let files = generate_suite(&dir, seed)?;
    let payload = GenerateOutput { dir, seed, files };

    render_mode(output, &payload, render_text, render_pretty)
}

fn render_text(payload: &GenerateOutput, w: &mut dyn Write) -> io::Result<()> {
    for file in &payload.files {
        writeln!(w, "{}", file.display())?;
    }
    Ok(())
}

fn render_pretty(payload: &GenerateOutput, w: &mut dyn Write) -> io::Result<()> {
    pretty_section(w, "Generated datasets")?;
    pretty_kv(w, "dir", payload.dir.display().to_string())?;
    pretty_kv(w, "seed", payload.seed.to_string())?;
    pretty_kv(w, "files", payload.files.len().to_string())?;
    for file in &payload.files {
        writeln!(w, "  {}", file.display())?;
    }
    Ok(())
}
