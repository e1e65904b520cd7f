//! EC2 provider error types

use opsflow_core::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Ec2Error {
    #[error("aws CLI not found. Please install the AWS CLI v2 and configure credentials")]
    AwsCliNotFound,

    #[error("aws command failed: {0}")]
    CommandFailed(String),

    #[error("{0}")]
    InvalidParams(String),

    #[error("Missing field in AWS response: {0}")]
    MissingResponseField(String),

    #[error("Timed out waiting for {target} after {attempts} attempts")]
    WaitTimeout { target: String, attempts: u32 },

    #[error("Parameter error: {0}")]
    Param(#[from] CoreError),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Ec2Error>;
