//! Autocomplete picker items

use serde::{Deserialize, Serialize};

/// One entry in an interactive parameter picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutocompleteItem {
    pub id: String,
    pub value: String,
}

impl AutocompleteItem {
    pub fn new(id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: value.into(),
        }
    }

    /// An item whose display text equals its id.
    pub fn from_primitive(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            value: id.clone(),
            id,
        }
    }
}
