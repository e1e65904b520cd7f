//! Ordered workflow step records
//!
//! A workflow records each executed step's raw response under a name that
//! is unique within the run. Serialization preserves execution order, and
//! a duplicate step name is an error rather than a silent overwrite.

use crate::error::{CoreError, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Accumulated outputs of one workflow run, in step order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Report {
    steps: Vec<(String, Value)>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one step's output. Step names must be unique per run.
    pub fn push(&mut self, name: impl Into<String>, output: Value) -> Result<()> {
        let name = name.into();
        if self.steps.iter().any(|(existing, _)| *existing == name) {
            return Err(CoreError::DuplicateStep(name));
        }
        self.steps.push((name, output));
        Ok(())
    }

    /// Appends all of another report's steps, keeping their order.
    pub fn merge(&mut self, other: Report) -> Result<()> {
        for (name, output) in other.steps {
            self.push(name, output)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.steps
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, output)| output)
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.steps
            .iter()
            .map(|(name, output)| (name.as_str(), output))
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.steps.len()))?;
        for (name, output) in &self.steps {
            map.serialize_entry(name, output)?;
        }
        map.end()
    }
}
