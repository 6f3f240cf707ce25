pub mod agent;
pub mod aggregate;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod population;
pub mod report;
pub mod spatial;

pub use agent::{Agent, AgentSchema, AttributeValue};
pub use aggregate::{GraphKind, GraphSeries};
pub use config::{GridConfig, RunConfig};
pub use error::{GridError, GridResult};
pub use pipeline::{Pipeline, PipelineSettings};
pub use spatial::{Coordinate, Zone, ZoneGrid};
