use std::sync::Arc;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::agent::{Agent, AGREEABLENESS, INCOME};
use crate::error::GridResult;
use crate::spatial::{Zone, ZoneBounds, ZoneGrid};

/// Which trait a density plot puts on its y axis.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum GraphKind {
    #[default]
    Agreeableness,
    Income,
}

impl GraphKind {
    pub fn trait_name(&self) -> &'static str {
        match self {
            GraphKind::Agreeableness => AGREEABLENESS,
            GraphKind::Income => INCOME,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            GraphKind::Agreeableness => "Agreeableness by population density",
            GraphKind::Income => "Income by population density",
        }
    }

    pub fn x_label(&self) -> &'static str {
        "Population density (inhabitants per km²)"
    }

    pub fn y_label(&self) -> &'static str {
        match self {
            GraphKind::Agreeableness => "Average agreeableness",
            GraphKind::Income => "Average income",
        }
    }
}

/// Resolves every agent to its zone and appends it there, in input order.
/// Stops at the first agent the grid cannot place.
pub fn ingest<I>(grid: &mut ZoneGrid, agents: I) -> GridResult<usize>
where
    I: IntoIterator<Item = Arc<Agent>>,
{
    let mut count = 0;
    for agent in agents {
        grid.assign(agent)?;
        count += 1;
    }
    info!(agents = count, zones = grid.zone_count(), "ingested agents");
    Ok(count)
}

/// Parallel x (density) and y (trait average) values, one entry per zone.
/// `None` in `x` marks a zone whose density is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSeries {
    pub kind: GraphKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x: Vec<Option<f64>>,
    pub y: Vec<f64>,
}

impl GraphSeries {
    pub fn from_zones<'a, I>(kind: GraphKind, zones: I) -> GridResult<Self>
    where
        I: IntoIterator<Item = &'a Zone>,
    {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for zone in zones {
            x.push(density_or_none(zone));
            y.push(zone.average(kind.trait_name())?);
        }
        Ok(Self {
            kind,
            title: kind.title().to_string(),
            x_label: kind.x_label().to_string(),
            y_label: kind.y_label().to_string(),
            x,
            y,
        })
    }

    pub fn len(&self) -> usize {
        self.y.len()
    }

    pub fn is_empty(&self) -> bool {
        self.y.is_empty()
    }

    /// Pairs a renderer can draw; zones without a density are skipped.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x
            .iter()
            .zip(&self.y)
            .filter_map(|(x, y)| x.map(|x| (x, *y)))
    }

    pub fn unavailable_count(&self) -> usize {
        self.x.iter().filter(|x| x.is_none()).count()
    }
}

/// Statistics of one populated zone.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneStats {
    pub index: usize,
    pub column: usize,
    pub row: usize,
    pub bounds: ZoneBounds,
    pub area_km2: f64,
    pub population: usize,
    pub density: Option<f64>,
    pub average: f64,
}

pub fn populated_zone_stats(grid: &ZoneGrid, kind: GraphKind) -> GridResult<Vec<ZoneStats>> {
    let mut stats = Vec::new();
    for (index, zone) in grid.zones().iter().enumerate() {
        if zone.population() == 0 {
            continue;
        }
        stats.push(ZoneStats {
            index,
            column: index % grid.longitude_bins(),
            row: index / grid.longitude_bins(),
            bounds: zone.bounds(),
            area_km2: zone.area(),
            population: zone.population(),
            density: density_or_none(zone),
            average: zone.average(kind.trait_name())?,
        });
    }
    Ok(stats)
}

fn density_or_none(zone: &Zone) -> Option<f64> {
    match zone.population_density() {
        Ok(density) => Some(density),
        Err(err) => {
            warn!(%err, "skipping density");
            None
        }
    }
}
