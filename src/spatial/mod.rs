//! Spatial model - uniform latitude/longitude zone grid

mod coordinate;
mod grid;
mod zone;

pub use coordinate::Coordinate;
pub use grid::{ZoneGrid, ZonePos};
pub use zone::{Zone, ZoneBounds};
