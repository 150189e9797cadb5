//! Seeded synthetic task-file generation.
//!
//! Every dataset is drawn from one [`StdRng`] seeded by the caller, so a
//! given seed always produces byte-identical files. Durations are uniform in
//! `1..=10`; the dependency structure depends on the [`GraphShape`].

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::load::{TaskFile, TaskSpec};

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Dependency structure of a generated dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphShape {
    /// Each task depends on 1..=3 distinct lower ids.
    PureDag,
    /// A ring: every task depends on its predecessor, task 0 closes the loop
    /// through the last task.
    SingleCycle,
    /// Two disjoint rings splitting the ids in half.
    TwoCycles,
    /// Chains with 60% probability plus occasional back references.
    Mixed,
    /// Rings of `max(2, n / 5)` tasks, linked forward with 30% probability.
    MultipleSccs,
    /// Each lower id is a dependency with 50% probability.
    DenseDag,
    /// At most one lower-id dependency, with 30% probability.
    SparseDag,
    /// Chains with a stride-3 skip and 20% random cross edges.
    ComplexMixed,
}

impl GraphShape {
    pub const ALL: [Self; 8] = [
        Self::PureDag,
        Self::SingleCycle,
        Self::TwoCycles,
        Self::Mixed,
        Self::MultipleSccs,
        Self::DenseDag,
        Self::SparseDag,
        Self::ComplexMixed,
    ];

    /// Stable snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PureDag => "pure_dag",
            Self::SingleCycle => "single_cycle",
            Self::TwoCycles => "two_cycles",
            Self::Mixed => "mixed",
            Self::MultipleSccs => "multiple_sccs",
            Self::DenseDag => "dense_dag",
            Self::SparseDag => "sparse_dag",
            Self::ComplexMixed => "complex_mixed",
        }
    }

    /// Returns true for shapes that never produce a cycle.
    #[must_use]
    pub const fn is_acyclic(self) -> bool {
        matches!(self, Self::PureDag | Self::DenseDag | Self::SparseDag)
    }
}

impl fmt::Display for GraphShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraphShape {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|shape| shape.as_str() == s)
            .ok_or_else(|| format!("unknown graph shape '{s}'"))
    }
}

/// One dataset of the standard suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetSpec {
    pub name: &'static str,
    pub vertices: usize,
    pub shape: GraphShape,
}

/// The nine default datasets: three small, three medium, three large.
#[must_use]
pub const fn standard_suite() -> [DatasetSpec; 9] {
    [
        DatasetSpec { name: "small_pure_dag", vertices: 8, shape: GraphShape::PureDag },
        DatasetSpec { name: "small_single_cycle", vertices: 7, shape: GraphShape::SingleCycle },
        DatasetSpec { name: "small_two_cycles", vertices: 9, shape: GraphShape::TwoCycles },
        DatasetSpec { name: "medium_mixed", vertices: 15, shape: GraphShape::Mixed },
        DatasetSpec { name: "medium_multiple_sccs", vertices: 18, shape: GraphShape::MultipleSccs },
        DatasetSpec { name: "medium_dense", vertices: 12, shape: GraphShape::DenseDag },
        DatasetSpec { name: "large_sparse", vertices: 25, shape: GraphShape::SparseDag },
        DatasetSpec { name: "large_complex", vertices: 35, shape: GraphShape::ComplexMixed },
        DatasetSpec { name: "large_multiple_sccs", vertices: 30, shape: GraphShape::MultipleSccs },
    ]
}

/// Generate one task file of `vertices` tasks.
#[must_use]
pub fn generate(vertices: usize, shape: GraphShape, rng: &mut StdRng) -> TaskFile {
    let tasks = (0..vertices)
        .map(|id| {
            let duration = rng.gen_range(1..=10_u64);
            let dependencies = dependencies_for(id, vertices, shape, rng);
            TaskSpec {
                id,
                name: Some(format!("task{id}")),
                duration: Some(duration),
                dependencies,
            }
        })
        .collect();
    TaskFile { tasks }
}

/// Write every dataset of [`standard_suite`] into `dir` as `<name>.json`.
///
/// # Errors
///
/// Returns an error if `dir` cannot be created or a file cannot be written.
#[instrument(skip(dir), fields(dir = %dir.display()))]
pub fn generate_suite(dir: &Path, seed: u64) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut written = Vec::new();
    for dataset in standard_suite() {
        let file = generate(dataset.vertices, dataset.shape, &mut rng);
        let path = dir.join(format!("{}.json", dataset.name));
        file.write_to(&path)?;
        written.push(path);
    }

    info!(datasets = written.len(), "generated dataset suite");
    Ok(written)
}

fn dependencies_for(id: usize, n: usize, shape: GraphShape, rng: &mut StdRng) -> Vec<usize> {
    let mut deps = Vec::new();

    match shape {
        GraphShape::PureDag => {
            if id > 0 {
                let wanted = rng.gen_range(1..=id.min(3));
                while deps.len() < wanted {
                    let dep = rng.gen_range(0..id);
                    if !deps.contains(&dep) {
                        deps.push(dep);
                    }
                }
            }
        }
        GraphShape::SingleCycle => {
            if id > 0 {
                deps.push(id - 1);
            } else if n > 1 {
                deps.push(n - 1);
            }
        }
        GraphShape::TwoCycles => {
            let mid = n / 2;
            if id < mid {
                if id > 0 {
                    deps.push(id - 1);
                } else if mid > 1 {
                    deps.push(mid - 1);
                }
            } else if id > mid {
                deps.push(id - 1);
            } else if n > mid + 1 {
                deps.push(n - 1);
            }
        }
        GraphShape::Mixed => {
            if id > 0 {
                if rng.gen_bool(0.6) {
                    deps.push(id - 1);
                }
                if rng.gen_bool(0.4) && id > 2 {
                    deps.push(rng.gen_range(0..id - 1));
                }
            }
        }
        GraphShape::MultipleSccs => {
            let ring = (n / 5).max(2);
            let ring_id = id / ring;
            let local = id % ring;
            let prev_in_ring = if local > 0 {
                ring_id * ring + local - 1
            } else {
                ring_id * ring + ring - 1
            };
            // The final ring can be short; only link to ids that exist.
            if prev_in_ring < n && prev_in_ring != id {
                deps.push(prev_in_ring);
            }
            if ring_id > 0 && rng.gen_bool(0.3) {
                deps.push((ring_id - 1) * ring + rng.gen_range(0..ring));
            }
        }
        GraphShape::DenseDag => {
            deps.extend((0..id).filter(|_| rng.gen_bool(0.5)));
        }
        GraphShape::SparseDag => {
            if id > 0 && rng.gen_bool(0.3) {
                deps.push(rng.gen_range(0..id));
            }
        }
        GraphShape::ComplexMixed => {
            if id > 0 {
                if id % 3 == 0 {
                    deps.push(id - 3);
                } else {
                    deps.push(id - 1);
                }
                if rng.gen_bool(0.2) && id > 2 {
                    deps.push(rng.gen_range(0..id - 1));
                }
            }
        }
    }

    deps
}
