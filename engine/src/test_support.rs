//! In-memory plan used by the unit tests of this crate.

use crate::lookup::{AttributeValue, PlanLookup, ValueLookup};
use charformula_parser::{Path, PathSegment};
use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;

#[derive(Debug, Default)]
pub(crate) struct MapPlan {
    pub formulas: FxHashMap<Path, String>,
    pub values: FxHashMap<Path, f64>,
    pub attributes: FxHashMap<(Path, u16), AttributeValue>,
    pub children: FxHashMap<Path, Vec<Path>>,
}

impl MapPlan {
    pub fn add_child(&mut self, child: Path) {
        self.children.entry(child.parent()).or_default().push(child);
    }

    pub fn add_formula(&mut self, path: Path, formula: &str) {
        self.formulas.insert(path.clone(), formula.to_string());
        self.add_child(path);
    }

    pub fn add_value(&mut self, path: Path, value: f64) {
        self.values.insert(path.clone(), value);
        self.add_child(path);
    }

    pub fn add_point(&mut self, point: Path, x: f64, y: f64, z: f64) {
        self.add_child(point.clone());
        for (axis, value) in [("X", x), ("Y", y), ("Z", z)] {
            self.add_value(point.child(PathSegment::characteristic(axis)), value);
        }
    }
}

impl PlanLookup for MapPlan {
    fn child_paths(&self, path: &Path) -> Vec<Path> {
        self.children.get(path).cloned().unwrap_or_default()
    }

    fn formula(&self, path: &Path) -> Option<String> {
        self.formulas.get(path).cloned()
    }
}

impl ValueLookup for MapPlan {
    fn measurement_value(&self, path: &Path) -> Option<f64> {
        self.values.get(path).copied()
    }

    fn attribute_value(
        &self,
        path: &Path,
        key: u16,
        _timestamp: Option<DateTime<Utc>>,
    ) -> Option<AttributeValue> {
        self.attributes.get(&(path.clone(), key)).cloned()
    }
}
