use std::sync::Arc;

use serde::Serialize;

use super::coordinate::{degrees_to_radians, Coordinate};
use crate::agent::{Agent, AGREEABLENESS, INCOME};
use crate::config::DEFAULT_EARTH_RADIUS_KM;
use crate::error::{GridError, GridResult};

/// Normalized rectangle of a zone in degrees. Lower bounds are inclusive,
/// upper bounds exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneBounds {
    pub min_longitude: f64,
    pub max_longitude: f64,
    pub min_latitude: f64,
    pub max_latitude: f64,
}

impl ZoneBounds {
    pub fn overlaps(&self, other: &ZoneBounds) -> bool {
        self.min_longitude < other.max_longitude
            && other.min_longitude < self.max_longitude
            && self.min_latitude < other.max_latitude
            && other.min_latitude < self.max_latitude
    }
}

/// Fixed rectangular cell of the grid together with the agents located in it.
#[derive(Debug, Clone)]
pub struct Zone {
    corner1: Coordinate,
    corner2: Coordinate,
    earth_radius_km: f64,
    inhabitants: Vec<Arc<Agent>>,
}

impl Zone {
    pub fn new(corner1: Coordinate, corner2: Coordinate) -> Self {
        Self::with_earth_radius(corner1, corner2, DEFAULT_EARTH_RADIUS_KM)
    }

    pub fn with_earth_radius(corner1: Coordinate, corner2: Coordinate, earth_radius_km: f64) -> Self {
        Self {
            corner1,
            corner2,
            earth_radius_km,
            inhabitants: Vec::new(),
        }
    }

    pub fn corners(&self) -> (Coordinate, Coordinate) {
        (self.corner1, self.corner2)
    }

    pub fn bounds(&self) -> ZoneBounds {
        ZoneBounds {
            min_longitude: self.corner1.longitude_degrees.min(self.corner2.longitude_degrees),
            max_longitude: self.corner1.longitude_degrees.max(self.corner2.longitude_degrees),
            min_latitude: self.corner1.latitude_degrees.min(self.corner2.latitude_degrees),
            max_latitude: self.corner1.latitude_degrees.max(self.corner2.latitude_degrees),
        }
    }

    pub fn contains(&self, coordinate: Coordinate) -> bool {
        let bounds = self.bounds();
        let lon = coordinate.longitude_degrees;
        let lat = coordinate.latitude_degrees;
        bounds.min_longitude <= lon
            && lon < bounds.max_longitude
            && bounds.min_latitude <= lat
            && lat < bounds.max_latitude
    }

    pub fn add_inhabitant(&mut self, agent: Arc<Agent>) {
        self.inhabitants.push(agent);
    }

    pub fn inhabitants(&self) -> &[Arc<Agent>] {
        &self.inhabitants
    }

    pub fn population(&self) -> usize {
        self.inhabitants.len()
    }

    /// East-west extent in km. Planar approximation without a cos(latitude)
    /// factor; only meaningful for small cells.
    pub fn width(&self) -> f64 {
        let delta = (self.corner2.longitude_degrees - self.corner1.longitude_degrees).abs();
        degrees_to_radians(delta) * self.earth_radius_km
    }

    /// North-south extent in km.
    pub fn height(&self) -> f64 {
        let delta = (self.corner2.latitude_degrees - self.corner1.latitude_degrees).abs();
        degrees_to_radians(delta) * self.earth_radius_km
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Inhabitants per km². A zero-area zone has no density.
    pub fn population_density(&self) -> GridResult<f64> {
        let area = self.area();
        if area == 0.0 {
            return Err(GridError::DegenerateZone {
                corner1: self.corner1,
                corner2: self.corner2,
            });
        }
        Ok(self.population() as f64 / area)
    }

    /// Mean of `trait_name` over the inhabitants, 0 for an empty zone.
    pub fn average(&self, trait_name: &str) -> GridResult<f64> {
        if self.inhabitants.is_empty() {
            return Ok(0.0);
        }
        let mut total = 0.0;
        for agent in &self.inhabitants {
            total += agent.trait_value(trait_name)?;
        }
        Ok(total / self.population() as f64)
    }

    pub fn average_agreeableness(&self) -> GridResult<f64> {
        self.average(AGREEABLENESS)
    }

    pub fn average_income(&self) -> GridResult<f64> {
        self.average(INCOME)
    }
}
