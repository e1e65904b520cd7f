//! aws CLI transport
//!
//! Wraps `aws ec2` subcommands: request payloads go in through
//! `--cli-input-json`, responses come back as `--output json`. The
//! [`Ec2Api`] trait is the seam tests script an in-memory backend behind.

use crate::error::{Ec2Error, Result};
use crate::ops::ApiCall;
use async_trait::async_trait;
use serde_json::Value;
use std::process::Stdio;
use tokio::process::Command;

/// A backend able to issue single EC2 API calls.
#[async_trait]
pub trait Ec2Api: Send + Sync {
    /// Issues one call with a request payload in the AWS JSON shape.
    /// Responses are the raw AWS response object; calls without response
    /// content resolve to `null`.
    async fn call(&self, call: ApiCall, payload: Value) -> Result<Value>;
}

/// The aws CLI backend.
pub struct AwsCli {
    region: String,
    profile: Option<String>,
}

impl AwsCli {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Check that the aws CLI is installed.
    pub async fn check_installed() -> Result<()> {
        let which = Command::new("which").arg("aws").output().await?;
        if !which.status.success() {
            return Err(Ec2Error::AwsCliNotFound);
        }
        Ok(())
    }

    /// Run one `aws ec2` subcommand and return stdout.
    async fn run_command(&self, subcommand: &str, payload: &Value) -> Result<String> {
        let mut cmd = Command::new("aws");
        cmd.arg("ec2").arg(subcommand);
        cmd.arg("--region").arg(&self.region);
        if let Some(profile) = &self.profile {
            cmd.arg("--profile").arg(profile);
        }
        cmd.arg("--output").arg("json");

        let input = match payload {
            Value::Null => None,
            Value::Object(map) if map.is_empty() => None,
            other => Some(other.to_string()),
        };
        if let Some(input) = &input {
            cmd.arg("--cli-input-json").arg(input);
        }
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        tracing::debug!(
            "Running: aws ec2 {} --region {}{}",
            subcommand,
            self.region,
            input.as_deref().map(|_| " --cli-input-json …").unwrap_or("")
        );

        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Ec2Error::CommandFailed(stderr.trim().to_string()));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

#[async_trait]
impl Ec2Api for AwsCli {
    async fn call(&self, call: ApiCall, payload: Value) -> Result<Value> {
        let stdout = self.run_command(&call.cli_name(), &payload).await?;
        if stdout.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&stdout)?)
    }
}
