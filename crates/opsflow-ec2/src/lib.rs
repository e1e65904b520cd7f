//! AWS EC2 provisioning operations for opsflow
//!
//! This crate maps named operations onto EC2 API calls: instance
//! lifecycle, VPC/subnet/routing topology construction, security groups,
//! volumes and snapshots, and elastic IPs. Multi-step operations are
//! fixed linear recipes that thread IDs captured from one call into the
//! next.
//!
//! # Requirements
//!
//! - The AWS CLI v2 must be installed and configured; requests go through
//!   `aws ec2 … --cli-input-json` and responses come back as JSON.
//!
//! # Example
//!
//! ```ignore
//! use opsflow_core::Params;
//! use opsflow_ec2::{AwsCli, Operation, dispatch};
//!
//! let api = AwsCli::new("eu-west-1");
//! let params = Params::from_value(serde_json::json!({
//!     "cidrBlock": "10.0.0.0/16",
//!     "createInternetGateway": true,
//! }))?;
//! let report = dispatch(&api, Operation::CreateVpc, &params).await?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```

pub mod autocomplete;
pub mod awscli;
pub mod error;
pub mod exec;
pub mod ops;
pub mod payload;
pub mod waiter;
pub mod workflows;

// Re-exports
pub use autocomplete::Picker;
pub use awscli::{AwsCli, Ec2Api};
pub use error::{Ec2Error, Result};
pub use exec::execute;
pub use ops::{ApiCall, Operation};
pub use waiter::{WaitConfig, WaitTarget, wait_for};
pub use workflows::dispatch;
