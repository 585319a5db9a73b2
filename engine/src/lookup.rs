//! FILENAME: engine/src/lookup.rs
//! PURPOSE: Capabilities the host application supplies to the engine.
//! CONTEXT: The engine owns no inspection-plan data. Everything it needs is
//! asked through these traits, passed explicitly into every evaluation and
//! dependency query. Implementations must be safe to call concurrently if the
//! host evaluates from several threads.

use charformula_parser::Path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structure of the inspection plan.
pub trait PlanLookup {
    /// Direct children of `path`, in any order.
    fn child_paths(&self, path: &Path) -> Vec<Path>;

    /// The formula of `path` if it is a calculated characteristic.
    fn formula(&self, path: &Path) -> Option<String>;
}

/// Measured data and entity attributes.
pub trait ValueLookup {
    fn measurement_value(&self, path: &Path) -> Option<f64>;

    fn attribute_value(
        &self,
        path: &Path,
        key: u16,
        timestamp: Option<DateTime<Utc>>,
    ) -> Option<AttributeValue>;
}

/// A typed entity attribute as stored by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Date(DateTime<Utc>),
}

impl AttributeValue {
    /// Returns an `f64` representation if this value is numeric.
    /// Text and dates are not coerced.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Integer(i) => Some(*i as f64),
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Text(_) | AttributeValue::Date(_) => None,
        }
    }
}
