use thiserror::Error;

use crate::spatial::Coordinate;

/// Failures raised by the grid, its zones and agent records.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("invalid grid configuration: {0}")]
    InvalidConfig(String),

    #[error(
        "coordinate {coordinate} lies outside the grid \
         (longitude [{min_longitude}, {max_longitude}), latitude [{min_latitude}, {max_latitude}))"
    )]
    OutOfRange {
        coordinate: Coordinate,
        min_longitude: f64,
        max_longitude: f64,
        min_latitude: f64,
        max_latitude: f64,
    },

    #[error("zone {corner1} - {corner2} has zero area, density is unavailable")]
    DegenerateZone {
        corner1: Coordinate,
        corner2: Coordinate,
    },

    #[error("agent position {0} is not finite")]
    NonFinitePosition(Coordinate),

    #[error("agent is missing attribute '{0}'")]
    MissingAttribute(String),

    #[error("agent attribute '{0}' is not numeric")]
    NonNumericAttribute(String),

    #[error("agent #{index} failed validation: {source}")]
    InvalidAgent {
        index: usize,
        #[source]
        source: Box<GridError>,
    },

    #[error("zone index {index} resolved for {coordinate} does not contain it")]
    PostconditionViolated { coordinate: Coordinate, index: usize },
}

pub type GridResult<T> = Result<T, GridError>;
