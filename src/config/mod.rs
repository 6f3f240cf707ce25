//! Grid parameters and run settings

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::aggregate::GraphKind;
use crate::error::{GridError, GridResult};

pub const DEFAULT_EARTH_RADIUS_KM: f64 = 6371.0;

/// Slack, in cells, allowed when checking that the span is a whole number of cells.
const CELL_FIT_TOLERANCE: f64 = 1e-6;

/// Upper bound on the number of zones a grid may hold.
pub const MAX_ZONE_COUNT: usize = 100_000_000;

fn default_min_longitude() -> f64 {
    -180.0
}

fn default_max_longitude() -> f64 {
    180.0
}

fn default_min_latitude() -> f64 {
    -90.0
}

fn default_max_latitude() -> f64 {
    90.0
}

fn default_cell_degrees() -> f64 {
    1.0
}

fn default_earth_radius_km() -> f64 {
    DEFAULT_EARTH_RADIUS_KM
}

fn default_run_name() -> String {
    "zones".to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_agent_count() -> usize {
    100_000
}

fn default_seed() -> u64 {
    7
}

/// Extent and resolution of a zone grid, in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_min_longitude")]
    pub min_longitude: f64,
    #[serde(default = "default_max_longitude")]
    pub max_longitude: f64,
    #[serde(default = "default_min_latitude")]
    pub min_latitude: f64,
    #[serde(default = "default_max_latitude")]
    pub max_latitude: f64,
    #[serde(default = "default_cell_degrees")]
    pub cell_width: f64,
    #[serde(default = "default_cell_degrees")]
    pub cell_height: f64,
    #[serde(default = "default_earth_radius_km")]
    pub earth_radius_km: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            min_longitude: default_min_longitude(),
            max_longitude: default_max_longitude(),
            min_latitude: default_min_latitude(),
            max_latitude: default_max_latitude(),
            cell_width: default_cell_degrees(),
            cell_height: default_cell_degrees(),
            earth_radius_km: default_earth_radius_km(),
        }
    }
}

impl GridConfig {
    pub fn with_cell_size(mut self, cell_width: f64, cell_height: f64) -> Self {
        self.cell_width = cell_width;
        self.cell_height = cell_height;
        self
    }

    pub fn with_bounds(
        mut self,
        min_longitude: f64,
        max_longitude: f64,
        min_latitude: f64,
        max_latitude: f64,
    ) -> Self {
        self.min_longitude = min_longitude;
        self.max_longitude = max_longitude;
        self.min_latitude = min_latitude;
        self.max_latitude = max_latitude;
        self
    }

    pub fn longitude_bins(&self) -> usize {
        bins(self.max_longitude - self.min_longitude, self.cell_width)
    }

    pub fn latitude_bins(&self) -> usize {
        bins(self.max_latitude - self.min_latitude, self.cell_height)
    }

    /// Saturates for unvalidated configs; `validate` rejects anything above `MAX_ZONE_COUNT`.
    pub fn zone_count(&self) -> usize {
        self.longitude_bins().saturating_mul(self.latitude_bins())
    }

    pub fn validate(&self) -> GridResult<()> {
        let values = [
            self.min_longitude,
            self.max_longitude,
            self.min_latitude,
            self.max_latitude,
            self.cell_width,
            self.cell_height,
            self.earth_radius_km,
        ];
        if values.iter().any(|value| !value.is_finite()) {
            return Err(GridError::InvalidConfig(
                "grid parameters must be finite".to_string(),
            ));
        }
        if self.min_longitude >= self.max_longitude {
            return Err(GridError::InvalidConfig(format!(
                "min_longitude {} must be below max_longitude {}",
                self.min_longitude, self.max_longitude
            )));
        }
        if self.min_latitude >= self.max_latitude {
            return Err(GridError::InvalidConfig(format!(
                "min_latitude {} must be below max_latitude {}",
                self.min_latitude, self.max_latitude
            )));
        }
        if self.cell_width <= 0.0 || self.cell_height <= 0.0 {
            return Err(GridError::InvalidConfig(
                "cell width and height must be positive".to_string(),
            ));
        }
        if self.earth_radius_km <= 0.0 {
            return Err(GridError::InvalidConfig(
                "earth radius must be positive".to_string(),
            ));
        }
        check_fit(
            "longitude",
            self.max_longitude - self.min_longitude,
            self.cell_width,
        )?;
        check_fit(
            "latitude",
            self.max_latitude - self.min_latitude,
            self.cell_height,
        )?;
        let zones = self
            .longitude_bins()
            .checked_mul(self.latitude_bins())
            .filter(|zones| *zones <= MAX_ZONE_COUNT);
        if zones.is_none() {
            return Err(GridError::InvalidConfig(format!(
                "{} x {} cells exceeds the limit of {MAX_ZONE_COUNT} zones",
                self.longitude_bins(),
                self.latitude_bins()
            )));
        }
        Ok(())
    }
}

fn bins(span: f64, cell: f64) -> usize {
    (span / cell).round() as usize
}

fn check_fit(axis: &str, span: f64, cell: f64) -> GridResult<()> {
    let ratio = span / cell;
    let cells = ratio.round();
    if cells < 1.0 || cells > MAX_ZONE_COUNT as f64 || (ratio - cells).abs() > CELL_FIT_TOLERANCE {
        return Err(GridError::InvalidConfig(format!(
            "{axis} span {span} is not a whole number of {cell} degree cells"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Settings for the synthetic population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_agent_count")]
    pub agents: usize,
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            agents: default_agent_count(),
            seed: default_seed(),
        }
    }
}

/// Everything one aggregation run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default = "default_run_name")]
    pub name: String,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub graph: GraphKind,
    /// Traits checked on every agent before ingestion, on top of the graph's trait.
    #[serde(default)]
    pub required_traits: Vec<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            name: default_run_name(),
            grid: GridConfig::default(),
            graph: GraphKind::default(),
            required_traits: Vec::new(),
            output_dir: default_output_dir(),
            logging: LoggingConfig::default(),
            generator: GeneratorConfig::default(),
        }
    }
}

impl RunConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: RunConfig = serde_yaml::from_str(text).context("Failed to parse run config")?;
        config.grid.validate()?;
        Ok(config)
    }

    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path, yaml)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }
}

/// Resolves config files relative to a base directory.
pub struct ConfigLoader {
    base_dir: PathBuf,
}

impl ConfigLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<RunConfig> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        RunConfig::from_yaml_str(&data).with_context(|| format!("Invalid config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid() {
        let grid = GridConfig::default();

        assert_eq!(grid.longitude_bins(), 360);
        assert_eq!(grid.latitude_bins(), 180);
        assert_eq!(grid.zone_count(), 64_800);
        assert_eq!(grid.earth_radius_km, 6371.0);
        assert!(grid.validate().is_ok());
    }

    #[test]
    fn test_fractional_cells() {
        let grid = GridConfig::default().with_cell_size(0.5, 0.25);
        assert!(grid.validate().is_ok());
        assert_eq!(grid.zone_count(), 720 * 720);

        let tenth = GridConfig::default().with_cell_size(0.1, 0.1);
        assert!(tenth.validate().is_ok());
        assert_eq!(tenth.longitude_bins(), 3600);
    }

    #[test]
    fn test_invalid_grids() {
        let cases = [
            GridConfig::default().with_cell_size(0.0, 1.0),
            GridConfig::default().with_cell_size(1.0, -1.0),
            GridConfig::default().with_cell_size(7.0, 1.0),
            GridConfig::default().with_bounds(10.0, 10.0, -90.0, 90.0),
            GridConfig::default().with_bounds(-180.0, 180.0, 90.0, -90.0),
            GridConfig::default().with_bounds(f64::NAN, 180.0, -90.0, 90.0),
            GridConfig {
                earth_radius_km: 0.0,
                ..GridConfig::default()
            },
        ];
        for grid in cases {
            assert!(
                matches!(grid.validate(), Err(GridError::InvalidConfig(_))),
                "expected {grid:?} to be rejected"
            );
        }
    }

    #[test]
    fn test_fine_cells_must_divide_span() {
        let tiny = GridConfig::default().with_cell_size(1e-9, 1e-9);
        assert!(matches!(tiny.validate(), Err(GridError::InvalidConfig(_))));
        assert_eq!(tiny.zone_count(), usize::MAX);

        let uneven = GridConfig::default()
            .with_bounds(0.0, 1.0, 0.0, 1.0)
            .with_cell_size(1.0 / 99_999_999.05, 1.0);
        assert!(matches!(uneven.validate(), Err(GridError::InvalidConfig(_))));
    }

    #[test]
    fn test_zone_count_limit() {
        let err = GridConfig::default()
            .with_cell_size(0.01, 0.01)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("exceeds the limit"), "{err}");

        let dense = GridConfig::default().with_cell_size(0.05, 0.05);
        assert!(dense.validate().is_ok());
        assert_eq!(dense.zone_count(), 7200 * 3600);
    }

    #[test]
    fn test_yaml_defaults() {
        let config = RunConfig::from_yaml_str("name: europe\ngraph: income\ngrid:\n  cell_width: 2.0\n").unwrap();

        assert_eq!(config.name, "europe");
        assert_eq!(config.graph, GraphKind::Income);
        assert_eq!(config.grid.cell_width, 2.0);
        assert_eq!(config.grid.cell_height, 1.0);
        assert_eq!(config.grid.min_latitude, -90.0);
        assert_eq!(config.output_dir, PathBuf::from("reports"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.generator.agents, 100_000);
    }

    #[test]
    fn test_yaml_rejects_bad_grid() {
        let err = RunConfig::from_yaml_str("grid:\n  cell_width: 7.0\n").unwrap_err();
        assert!(err.to_string().contains("whole number"), "{err}");
    }

    #[test]
    fn test_config_round_trip() {
        let config = RunConfig {
            name: "coarse".into(),
            grid: GridConfig::default().with_cell_size(5.0, 5.0),
            required_traits: vec!["income".into()],
            ..RunConfig::default()
        };

        let dir = tempfile::tempdir().unwrap();
        config.to_yaml(dir.path().join("run.yaml")).unwrap();

        let loaded = ConfigLoader::new(dir.path()).load("run.yaml").unwrap();
        assert_eq!(loaded, config);
    }
}
