use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::aggregate::{GraphSeries, ZoneStats};
use crate::config::GridConfig;

/// Everything a renderer needs for one run.
#[derive(Debug, Serialize)]
pub struct ZoneReport {
    pub name: String,
    pub generated_at: DateTime<Utc>,
    pub grid: GridConfig,
    pub zone_count: usize,
    pub total_population: usize,
    pub zones: Vec<ZoneStats>,
    pub series: GraphSeries,
}

pub struct ReportWriter {
    output_dir: PathBuf,
}

impl ReportWriter {
    pub fn new(output_dir: impl AsRef<Path>) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn path_for(&self, report: &ZoneReport) -> PathBuf {
        self.output_dir.join(&report.name).join(format!(
            "zones_{}.json",
            report.series.kind.trait_name()
        ))
    }

    pub fn write(&self, report: &ZoneReport) -> Result<PathBuf> {
        let path = self.path_for(report);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create report dir {}", dir.display()))?;
        }
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!(path = %path.display(), zones = report.zones.len(), "wrote zone report");
        Ok(path)
    }
}
