//! Shared plumbing error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Missing required parameter: {0}")]
    MissingParam(String),

    #[error("Value of parameter {name} is not a valid string")]
    NotAString { name: String },

    #[error("Value {value:?} of parameter {name} is not a valid number")]
    NotANumber { name: String, value: String },

    #[error("Value {value:?} of parameter {name} is not a valid boolean")]
    NotABoolean { name: String, value: String },

    #[error("Unsupported array format for parameter {0}")]
    BadArrayFormat(String),

    #[error("Bad tags format: {0}")]
    BadTagsFormat(String),

    #[error("Error occurred while trying to parse value {0:?} to JSON object")]
    BadJsonValue(String),

    #[error(
        "Invalid port range string specified: {0:?}. Valid examples include \"*\" (all ports), \
         \"80\" (one port), and \"8080-8099\" (a range of 20 ports)"
    )]
    BadPortRange(String),

    #[error("Ports in the {0:?} range are defined in the wrong order")]
    ReversedPortRange(String),

    #[error("Duplicate workflow step name: {0}")]
    DuplicateStep(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
