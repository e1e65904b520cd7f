//! AWS tag pairs and tag specifications
//!
//! Tags arrive as structured `[{Key, Value}]` arrays, as `{key: value}`
//! maps, or as newline-delimited `key=value` lines; all three parse to the
//! same pairs. Tag values may themselves contain `=`.

use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// One AWS resource tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "Key")]
    pub key: String,

    #[serde(rename = "Value", default)]
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Parses any accepted tag shape into pairs. Empty input is `None`.
pub fn parse_tags(value: &Value) -> Result<Option<Vec<Tag>>> {
    let tags = match value {
        Value::Null => return Ok(None),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                let tag: Tag = serde_json::from_value(item.clone())
                    .map_err(|_| CoreError::BadTagsFormat("every tag needs a Key".into()))?;
                Ok(tag)
            })
            .collect::<Result<Vec<_>>>()?,
        Value::String(s) => s
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(parse_tag_line)
            .collect::<Result<Vec<_>>>()?,
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| match value {
                Value::String(s) => Tag::new(key.as_str(), s.as_str()),
                other => Tag::new(key.as_str(), other.to_string()),
            })
            .collect(),
        other => {
            return Err(CoreError::BadTagsFormat(format!(
                "unsupported tags value: {other}"
            )));
        }
    };

    if tags.is_empty() {
        Ok(None)
    } else {
        Ok(Some(tags))
    }
}

/// Parses one `key=value` line. The value keeps any further `=` characters.
pub fn parse_tag_line(line: &str) -> Result<Tag> {
    let (key, value) = line
        .split_once('=')
        .ok_or_else(|| CoreError::BadTagsFormat("missing '='".into()))?;
    if key.is_empty() {
        return Err(CoreError::BadTagsFormat("missing key".into()));
    }
    if value.is_empty() {
        return Err(CoreError::BadTagsFormat("missing value".into()));
    }
    Ok(Tag::new(key, value))
}

/// Builds the `TagSpecifications` member for a create call: the caller's
/// tags plus any synthetic ones (a `Name` tag, typically), scoped to one
/// resource type. `None` when there is nothing to tag.
pub fn tag_specifications(
    resource_type: &str,
    tags: Option<&[Tag]>,
    extra: &[Tag],
) -> Option<Value> {
    let mut all: Vec<&Tag> = tags.map(|t| t.iter().collect()).unwrap_or_default();
    all.extend(extra.iter());
    if all.is_empty() {
        return None;
    }
    Some(json!([{
        "ResourceType": resource_type,
        "Tags": all,
    }]))
}
