use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::generate::DEFAULT_SEED;

/// File looked up in the working directory when no `--config` is given.
pub const CONFIG_FILE_NAME: &str = "taskgraph.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub generate: GenerateConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Vertex of the original graph whose component is the shortest-path
    /// source. Unset means the first component in topological order.
    #[serde(default)]
    pub shortest_path_source: Option<usize>,
    /// Expand the component order into a vertex-level schedule.
    #[serde(default = "default_true")]
    pub expand_vertex_order: bool,
    /// Include the full component membership lists in reports.
    #[serde(default = "default_true")]
    pub include_components: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            shortest_path_source: None,
            expand_vertex_order: default_true(),
            include_components: default_true(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_data_dir")]
    pub dir: PathBuf,
}

impl Default for GenerateConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            dir: default_data_dir(),
        }
    }
}

/// Load a config file; a missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<ProjectConfig> {
    if !path.exists() {
        return Ok(ProjectConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<ProjectConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// Load [`CONFIG_FILE_NAME`] from `dir`, falling back to the defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn discover_config(dir: &Path) -> Result<ProjectConfig> {
    load_config(&dir.join(CONFIG_FILE_NAME))
}

const fn default_true() -> bool {
    true
}

const fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
