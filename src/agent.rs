use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::spatial::Coordinate;

pub const AGREEABLENESS: &str = "agreeableness";
pub const INCOME: &str = "income";

/// Value of a named agent attribute as it appears in the source records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Number(f64),
    Flag(bool),
    Text(String),
}

impl AttributeValue {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Flag(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

/// A geolocated agent: position plus whatever named attributes the source supplies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub longitude: f64,
    pub latitude: f64,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Agent {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn position(&self) -> Coordinate {
        Coordinate::new(self.longitude, self.latitude)
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }

    /// Numeric value of `name`, failing when it is absent or not a number.
    pub fn trait_value(&self, name: &str) -> GridResult<f64> {
        let value = self
            .attribute(name)
            .ok_or_else(|| GridError::MissingAttribute(name.to_string()))?;
        value
            .as_number()
            .ok_or_else(|| GridError::NonNumericAttribute(name.to_string()))
    }
}

/// Numeric traits every agent of a population must carry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentSchema {
    pub required_traits: Vec<String>,
}

impl AgentSchema {
    pub fn new<I, S>(required_traits: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            required_traits: required_traits.into_iter().map(Into::into).collect(),
        }
    }

    pub fn validate_agent(&self, agent: &Agent) -> GridResult<()> {
        let position = agent.position();
        if !position.is_finite() {
            return Err(GridError::NonFinitePosition(position));
        }
        for name in &self.required_traits {
            agent.trait_value(name)?;
        }
        Ok(())
    }

    /// Stops at the first invalid record, reporting its index.
    pub fn validate<'a, I>(&self, agents: I) -> GridResult<()>
    where
        I: IntoIterator<Item = &'a Agent>,
    {
        for (index, agent) in agents.into_iter().enumerate() {
            self.validate_agent(agent)
                .map_err(|source| GridError::InvalidAgent {
                    index,
                    source: Box::new(source),
                })?;
        }
        Ok(())
    }
}
