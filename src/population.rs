use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::Path,
    sync::Arc,
};

use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::agent::{Agent, AGREEABLENESS, INCOME};
use crate::config::GridConfig;

const MIN_INCOME: f64 = 10_000.0;
const MAX_INCOME: f64 = 150_000.0;

/// Reads a JSON array of agent records.
pub fn load_agents(path: impl AsRef<Path>) -> Result<Vec<Arc<Agent>>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open agents file {}", path.display()))?;
    let agents: Vec<Agent> = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse agents from {}", path.display()))?;
    info!(agents = agents.len(), path = %path.display(), "loaded agents");
    Ok(agents.into_iter().map(Arc::new).collect())
}

pub fn save_agents(path: impl AsRef<Path>, agents: &[Arc<Agent>]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    let file = File::create(path)
        .with_context(|| format!("Failed to create agents file {}", path.display()))?;
    let records: Vec<&Agent> = agents.iter().map(Arc::as_ref).collect();
    serde_json::to_writer(BufWriter::new(file), &records)
        .with_context(|| format!("Failed to write agents to {}", path.display()))?;
    Ok(())
}

/// Seeded source of agents scattered uniformly over a grid's range.
pub struct PopulationGenerator {
    rng: ChaCha8Rng,
}

impl PopulationGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn agent(&mut self, grid: &GridConfig) -> Agent {
        let longitude = self.rng.gen_range(grid.min_longitude..grid.max_longitude);
        let latitude = self.rng.gen_range(grid.min_latitude..grid.max_latitude);
        let agreeableness: f64 = self.rng.gen();
        let income = self.rng.gen_range(MIN_INCOME..MAX_INCOME).round();
        Agent::new(longitude, latitude)
            .with_attribute(AGREEABLENESS, agreeableness)
            .with_attribute(INCOME, income)
    }

    pub fn generate(&mut self, grid: &GridConfig, count: usize) -> Vec<Arc<Agent>> {
        (0..count).map(|_| Arc::new(self.agent(grid))).collect()
    }
}
