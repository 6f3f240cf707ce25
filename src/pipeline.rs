use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::{
    agent::{Agent, AgentSchema},
    aggregate::{self, GraphKind, GraphSeries},
    config::RunConfig,
    report::{ReportWriter, ZoneReport},
    spatial::ZoneGrid,
};

pub struct PipelineSettings {
    pub name: String,
    pub graph: GraphKind,
    pub schema: AgentSchema,
    /// Reports are only written when set.
    pub output_dir: Option<PathBuf>,
}

impl PipelineSettings {
    pub fn from_config(config: &RunConfig) -> Self {
        let mut schema = AgentSchema::new(config.required_traits.iter().cloned());
        let graph_trait = config.graph.trait_name();
        if !schema.required_traits.iter().any(|name| name == graph_trait) {
            schema.required_traits.push(graph_trait.to_string());
        }
        Self {
            name: config.name.clone(),
            graph: config.graph,
            schema,
            output_dir: Some(config.output_dir.clone()),
        }
    }
}

pub struct PipelineOutcome {
    pub report: ZoneReport,
    pub report_path: Option<PathBuf>,
}

/// Owns the grid for one run: validate, ingest, aggregate, report.
pub struct Pipeline {
    settings: PipelineSettings,
    grid: ZoneGrid,
}

impl Pipeline {
    pub fn new(settings: PipelineSettings, grid: ZoneGrid) -> Self {
        Self { settings, grid }
    }

    pub fn from_config(config: &RunConfig) -> Result<Self> {
        let grid = ZoneGrid::new(config.grid.clone()).context("Failed to set up zone grid")?;
        Ok(Self::new(PipelineSettings::from_config(config), grid))
    }

    pub fn grid(&self) -> &ZoneGrid {
        &self.grid
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Places every agent or none: schema and grid range are checked for the
    /// whole batch before the first agent is assigned to a zone.
    pub fn ingest(&mut self, agents: &[Arc<Agent>]) -> Result<usize> {
        self.settings
            .schema
            .validate(agents.iter().map(Arc::as_ref))
            .context("Agent records failed validation")?;
        for (index, agent) in agents.iter().enumerate() {
            self.grid
                .zone_index(agent.position())
                .with_context(|| format!("Agent #{index} cannot be placed on the grid"))?;
        }
        let count = aggregate::ingest(&mut self.grid, agents.iter().cloned())
            .context("Failed to place agents on the grid")?;
        Ok(count)
    }

    pub fn report(&self) -> Result<ZoneReport> {
        let graph = self.settings.graph;
        let series = GraphSeries::from_zones(graph, self.grid.zones())
            .context("Failed to aggregate zone statistics")?;
        let zones = aggregate::populated_zone_stats(&self.grid, graph)?;
        Ok(ZoneReport {
            name: self.settings.name.clone(),
            generated_at: Utc::now(),
            grid: self.grid.config().clone(),
            zone_count: self.grid.zone_count(),
            total_population: self.grid.total_population(),
            zones,
            series,
        })
    }

    pub fn run(&mut self, agents: &[Arc<Agent>]) -> Result<PipelineOutcome> {
        self.ingest(agents)?;
        let report = self.report()?;
        let report_path = match &self.settings.output_dir {
            Some(dir) => Some(ReportWriter::new(dir).write(&report)?),
            None => None,
        };
        info!(
            run = %self.settings.name,
            population = report.total_population,
            populated_zones = report.zones.len(),
            "aggregation finished"
        );
        Ok(PipelineOutcome {
            report,
            report_path,
        })
    }
}
