use std::f64::consts::PI;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Geographic point in degrees. Radian views are derived on every access.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub longitude_degrees: f64,
    pub latitude_degrees: f64,
}

impl Coordinate {
    pub fn new(longitude_degrees: f64, latitude_degrees: f64) -> Self {
        Self {
            longitude_degrees,
            latitude_degrees,
        }
    }

    pub fn longitude_degrees(&self) -> f64 {
        self.longitude_degrees
    }

    pub fn latitude_degrees(&self) -> f64 {
        self.latitude_degrees
    }

    pub fn longitude_radians(&self) -> f64 {
        degrees_to_radians(self.longitude_degrees)
    }

    pub fn latitude_radians(&self) -> f64 {
        degrees_to_radians(self.latitude_degrees)
    }

    /// `(longitude, latitude)` in radians.
    pub fn to_radians(&self) -> (f64, f64) {
        (self.longitude_radians(), self.latitude_radians())
    }

    pub fn is_finite(&self) -> bool {
        self.longitude_degrees.is_finite() && self.latitude_degrees.is_finite()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(lon {}, lat {})",
            self.longitude_degrees, self.latitude_degrees
        )
    }
}

pub(crate) fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}
