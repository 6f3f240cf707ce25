use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::coordinate::Coordinate;
use super::zone::Zone;
use crate::agent::Agent;
use crate::config::GridConfig;
use crate::error::{GridError, GridResult};

/// Column (longitude band) and row (latitude band) of a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZonePos {
    pub column: usize,
    pub row: usize,
}

/// All zones tiling the configured range, stored row-major: latitude band
/// outer, longitude band inner. Zones are built on first access.
pub struct ZoneGrid {
    config: GridConfig,
    longitude_bins: usize,
    latitude_bins: usize,
    zones: OnceLock<Vec<Zone>>,
}

impl ZoneGrid {
    pub fn new(config: GridConfig) -> GridResult<Self> {
        config.validate()?;
        Ok(Self {
            longitude_bins: config.longitude_bins(),
            latitude_bins: config.latitude_bins(),
            config,
            zones: OnceLock::new(),
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn longitude_bins(&self) -> usize {
        self.longitude_bins
    }

    pub fn latitude_bins(&self) -> usize {
        self.latitude_bins
    }

    pub fn zone_count(&self) -> usize {
        self.longitude_bins.saturating_mul(self.latitude_bins)
    }

    pub fn is_built(&self) -> bool {
        self.zones.get().is_some()
    }

    pub fn zones(&self) -> &[Zone] {
        self.zones.get_or_init(|| self.build_zones())
    }

    pub fn zones_mut(&mut self) -> &mut [Zone] {
        self.zones();
        match self.zones.get_mut() {
            Some(zones) => zones.as_mut_slice(),
            None => &mut [],
        }
    }

    pub fn pos_to_index(&self, pos: ZonePos) -> Option<usize> {
        if pos.column < self.longitude_bins && pos.row < self.latitude_bins {
            Some(pos.row * self.longitude_bins + pos.column)
        } else {
            None
        }
    }

    pub fn index_to_pos(&self, index: usize) -> Option<ZonePos> {
        if index < self.zone_count() {
            Some(ZonePos {
                column: index % self.longitude_bins,
                row: index / self.longitude_bins,
            })
        } else {
            None
        }
    }

    /// Flat index of the zone owning `coordinate`, computed without a scan.
    pub fn zone_index(&self, coordinate: Coordinate) -> GridResult<usize> {
        let lon = coordinate.longitude_degrees;
        let lat = coordinate.latitude_degrees;
        let c = &self.config;
        let in_range = c.min_longitude <= lon
            && lon < c.max_longitude
            && c.min_latitude <= lat
            && lat < c.max_latitude;
        if !in_range {
            return Err(GridError::OutOfRange {
                coordinate,
                min_longitude: c.min_longitude,
                max_longitude: c.max_longitude,
                min_latitude: c.min_latitude,
                max_latitude: c.max_latitude,
            });
        }

        let column = band_index(
            lon,
            c.min_longitude,
            c.max_longitude,
            c.cell_width,
            self.longitude_bins,
        );
        let row = band_index(
            lat,
            c.min_latitude,
            c.max_latitude,
            c.cell_height,
            self.latitude_bins,
        );
        Ok(row * self.longitude_bins + column)
    }

    pub fn find_zone_containing(&self, coordinate: Coordinate) -> GridResult<&Zone> {
        let index = self.zone_index(coordinate)?;
        self.zones()
            .get(index)
            .filter(|zone| zone.contains(coordinate))
            .ok_or(GridError::PostconditionViolated { coordinate, index })
    }

    pub fn find_zone_containing_mut(&mut self, coordinate: Coordinate) -> GridResult<&mut Zone> {
        let index = self.zone_index(coordinate)?;
        self.checked_zone_mut(index, coordinate)
    }

    /// Appends `agent` to the zone owning its position and returns that zone's index.
    pub fn assign(&mut self, agent: Arc<Agent>) -> GridResult<usize> {
        let coordinate = agent.position();
        let index = self.zone_index(coordinate)?;
        self.checked_zone_mut(index, coordinate)?.add_inhabitant(agent);
        Ok(index)
    }

    pub fn total_population(&self) -> usize {
        match self.zones.get() {
            Some(zones) => zones.iter().map(Zone::population).sum(),
            None => 0,
        }
    }

    fn checked_zone_mut(&mut self, index: usize, coordinate: Coordinate) -> GridResult<&mut Zone> {
        self.zones_mut()
            .get_mut(index)
            .filter(|zone| zone.contains(coordinate))
            .ok_or(GridError::PostconditionViolated { coordinate, index })
    }

    fn longitude_edge(&self, column: usize) -> f64 {
        let c = &self.config;
        band_edge(column, c.min_longitude, c.max_longitude, c.cell_width, self.longitude_bins)
    }

    fn latitude_edge(&self, row: usize) -> f64 {
        let c = &self.config;
        band_edge(row, c.min_latitude, c.max_latitude, c.cell_height, self.latitude_bins)
    }

    fn build_zones(&self) -> Vec<Zone> {
        let mut zones = Vec::with_capacity(self.zone_count());
        for row in 0..self.latitude_bins {
            let (lat, next_lat) = (self.latitude_edge(row), self.latitude_edge(row + 1));
            for column in 0..self.longitude_bins {
                let (lon, next_lon) = (self.longitude_edge(column), self.longitude_edge(column + 1));
                zones.push(Zone::with_earth_radius(
                    Coordinate::new(lon, lat),
                    Coordinate::new(next_lon, next_lat),
                    self.config.earth_radius_km,
                ));
            }
        }
        debug!(
            zones = zones.len(),
            cell_width = self.config.cell_width,
            cell_height = self.config.cell_height,
            "built zone grid"
        );
        zones
    }
}

/// Lower edge of band `index`. The closing edge is pinned to `max` so the
/// bands cover the range exactly.
fn band_edge(index: usize, min: f64, max: f64, cell: f64, bins: usize) -> f64 {
    if index >= bins {
        max
    } else {
        min + index as f64 * cell
    }
}

/// `floor((value - min) / cell)`, nudged by one band when rounding puts the
/// value across an edge built by `band_edge`.
fn band_index(value: f64, min: f64, max: f64, cell: f64, bins: usize) -> usize {
    let raw = ((value - min) / cell).floor().max(0.0) as usize;
    let index = raw.min(bins - 1);
    if index > 0 && value < band_edge(index, min, max, cell, bins) {
        index - 1
    } else if index + 1 < bins && value >= band_edge(index + 1, min, max, cell, bins) {
        index + 1
    } else {
        index
    }
}
