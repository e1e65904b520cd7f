//! Loosely-typed parameter bags
//!
//! Callers hand operations a JSON object whose members may arrive as the
//! target type, as strings, or as JSON-encoded strings. The accessors here
//! normalize those shapes into the types the payload builders expect.
//! Absent or empty members normalize to `None`; `req_*` accessors error
//! with the parameter name instead.

use crate::error::{CoreError, Result};
use crate::tags::{self, Tag};
use serde_json::{Map, Value};

/// A bag of caller-supplied operation parameters.
#[derive(Debug, Clone, Default)]
pub struct Params {
    values: Map<String, Value>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a JSON value, which must be an object (or null for an empty bag).
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            Value::Null => Ok(Self::default()),
            other => Err(CoreError::BadJsonValue(other.to_string())),
        }
    }

    /// Returns a copy of the bag with one member added or replaced.
    ///
    /// Workflows use this to thread IDs captured from one step into the
    /// parameters of the next.
    pub fn with(&self, name: impl Into<String>, value: Value) -> Self {
        let mut values = self.values.clone();
        values.insert(name.into(), value);
        Self { values }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    /// Raw member access. `null` members count as absent.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name).filter(|v| !v.is_null())
    }

    /// A trimmed string, or `None` when the member is absent or blank.
    pub fn opt_string(&self, name: &str) -> Result<Option<String>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(trimmed.to_string()))
                }
            }
            Some(_) => Err(CoreError::NotAString {
                name: name.to_string(),
            }),
        }
    }

    pub fn req_string(&self, name: &str) -> Result<String> {
        self.opt_string(name)?
            .ok_or_else(|| CoreError::MissingParam(name.to_string()))
    }

    /// An integer, accepting JSON numbers and numeric strings.
    pub fn opt_i64(&self, name: &str) -> Result<Option<i64>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Number(n)) => {
                n.as_i64()
                    .map(Some)
                    .ok_or_else(|| CoreError::NotANumber {
                        name: name.to_string(),
                        value: n.to_string(),
                    })
            }
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                trimmed
                    .parse::<i64>()
                    .map(Some)
                    .map_err(|_| CoreError::NotANumber {
                        name: name.to_string(),
                        value: s.clone(),
                    })
            }
            Some(other) => Err(CoreError::NotANumber {
                name: name.to_string(),
                value: other.to_string(),
            }),
        }
    }

    pub fn req_i64(&self, name: &str) -> Result<i64> {
        self.opt_i64(name)?
            .ok_or_else(|| CoreError::MissingParam(name.to_string()))
    }

    /// A boolean, accepting JSON booleans and `"true"` / `"false"` strings.
    pub fn opt_bool(&self, name: &str) -> Result<Option<bool>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => match s.trim() {
                "" => Ok(None),
                "true" => Ok(Some(true)),
                "false" => Ok(Some(false)),
                other => Err(CoreError::NotABoolean {
                    name: name.to_string(),
                    value: other.to_string(),
                }),
            },
            Some(other) => Err(CoreError::NotABoolean {
                name: name.to_string(),
                value: other.to_string(),
            }),
        }
    }

    /// Optional-step switch: absent means off.
    pub fn flag(&self, name: &str) -> Result<bool> {
        Ok(self.opt_bool(name)?.unwrap_or(false))
    }

    /// A list of strings, from a JSON array or a newline-delimited string.
    /// Lines are trimmed and blank lines dropped. Absent input is an empty
    /// list.
    pub fn string_list(&self, name: &str) -> Result<Vec<String>> {
        match self.get(name) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Ok(s.trim().to_string()),
                    _ => Err(CoreError::BadArrayFormat(name.to_string())),
                })
                .collect(),
            Some(Value::String(s)) => Ok(s
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect()),
            Some(_) => Err(CoreError::BadArrayFormat(name.to_string())),
        }
    }

    pub fn req_string_list(&self, name: &str) -> Result<Vec<String>> {
        let list = self.string_list(name)?;
        if list.is_empty() {
            return Err(CoreError::MissingParam(name.to_string()));
        }
        Ok(list)
    }

    /// A JSON object, from an object member or a JSON-encoded string.
    pub fn opt_object(&self, name: &str) -> Result<Option<Value>> {
        match self.get(name) {
            None => Ok(None),
            Some(v @ Value::Object(_)) => Ok(Some(v.clone())),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                serde_json::from_str::<Value>(trimmed)
                    .ok()
                    .filter(Value::is_object)
                    .map(Some)
                    .ok_or_else(|| CoreError::BadJsonValue(s.clone()))
            }
            Some(other) => Err(CoreError::BadJsonValue(other.to_string())),
        }
    }

    /// Any JSON value, from a structured member or a JSON-encoded string.
    /// Used for filter lists and other API-shaped passthrough members.
    pub fn opt_json(&self, name: &str) -> Result<Option<Value>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                serde_json::from_str::<Value>(trimmed)
                    .map(Some)
                    .map_err(|_| CoreError::BadJsonValue(s.clone()))
            }
            Some(other) => Ok(Some(other.clone())),
        }
    }

    /// AWS tag pairs; see [`tags::parse_tags`] for the accepted shapes.
    pub fn tags(&self, name: &str) -> Result<Option<Vec<Tag>>> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => tags::parse_tags(value),
        }
    }
}
