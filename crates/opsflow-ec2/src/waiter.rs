//! Resource-state waiters
//!
//! Polls a describe call until every tracked resource reports its target
//! state, with exponential backoff between attempts and a hard attempt
//! cap. Exhaustion is a timeout error; there is no cancellation hook once
//! a wait starts.

use crate::awscli::Ec2Api;
use crate::error::{Ec2Error, Result};
use crate::ops::ApiCall;
use serde_json::{Map, Value, json};
use std::time::Duration;
use tokio::time::sleep;

/// Backoff schedule for one wait.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            max_attempts: 40,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl WaitConfig {
    /// Delay before the next poll after `attempt` (zero-based) failed
    /// attempts, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt as i32);
        let delay = self.initial_delay.mul_f64(factor);
        delay.min(self.max_delay)
    }
}

/// The resource states a workflow can wait on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTarget {
    InstanceStopped,
    NatGatewayAvailable,
    VolumeAvailable,
    SnapshotCompleted,
}

impl WaitTarget {
    pub fn name(&self) -> &'static str {
        match self {
            WaitTarget::InstanceStopped => "instance-stopped",
            WaitTarget::NatGatewayAvailable => "nat-gateway-available",
            WaitTarget::VolumeAvailable => "volume-available",
            WaitTarget::SnapshotCompleted => "snapshot-completed",
        }
    }

    fn describe_call(&self) -> ApiCall {
        match self {
            WaitTarget::InstanceStopped => ApiCall::DescribeInstances,
            WaitTarget::NatGatewayAvailable => ApiCall::DescribeNatGateways,
            WaitTarget::VolumeAvailable => ApiCall::DescribeVolumes,
            WaitTarget::SnapshotCompleted => ApiCall::DescribeSnapshots,
        }
    }

    fn id_member(&self) -> &'static str {
        match self {
            WaitTarget::InstanceStopped => "InstanceIds",
            WaitTarget::NatGatewayAvailable => "NatGatewayIds",
            WaitTarget::VolumeAvailable => "VolumeIds",
            WaitTarget::SnapshotCompleted => "SnapshotIds",
        }
    }

    fn target_state(&self) -> &'static str {
        match self {
            WaitTarget::InstanceStopped => "stopped",
            WaitTarget::NatGatewayAvailable => "available",
            WaitTarget::VolumeAvailable => "available",
            WaitTarget::SnapshotCompleted => "completed",
        }
    }

    /// Pulls every tracked resource's state string out of the describe
    /// response.
    fn states<'a>(&self, response: &'a Value) -> Vec<&'a str> {
        let list = |member: &str, state: fn(&'a Value) -> Option<&'a str>| -> Vec<&'a str> {
            response
                .get(member)
                .and_then(Value::as_array)
                .map(|items| items.iter().filter_map(state).collect())
                .unwrap_or_default()
        };
        match self {
            WaitTarget::InstanceStopped => response
                .pointer("/Reservations")
                .and_then(Value::as_array)
                .map(|reservations| {
                    reservations
                        .iter()
                        .filter_map(|r| r.get("Instances").and_then(Value::as_array))
                        .flatten()
                        .filter_map(|i| i.pointer("/State/Name").and_then(Value::as_str))
                        .collect()
                })
                .unwrap_or_default(),
            WaitTarget::NatGatewayAvailable => {
                list("NatGateways", |g| g.get("State").and_then(Value::as_str))
            }
            WaitTarget::VolumeAvailable => {
                list("Volumes", |v| v.get("State").and_then(Value::as_str))
            }
            WaitTarget::SnapshotCompleted => {
                list("Snapshots", |s| s.get("State").and_then(Value::as_str))
            }
        }
    }
}

/// Polls until every resource in `ids` reports the target state, then
/// returns the terminal describe response.
pub async fn wait_for(
    api: &dyn Ec2Api,
    target: WaitTarget,
    ids: &[String],
    config: &WaitConfig,
) -> Result<Value> {
    let mut payload = Map::new();
    payload.insert(target.id_member().to_string(), json!(ids));
    let payload = Value::Object(payload);

    for attempt in 0..config.max_attempts {
        let response = api.call(target.describe_call(), payload.clone()).await?;
        let states = target.states(&response);
        if states.len() >= ids.len()
            && !states.is_empty()
            && states.iter().all(|state| *state == target.target_state())
        {
            return Ok(response);
        }

        tracing::debug!(
            "waiting for {}: attempt {}/{}, states {:?}",
            target.name(),
            attempt + 1,
            config.max_attempts,
            states
        );

        if attempt + 1 < config.max_attempts {
            sleep(config.delay_for_attempt(attempt)).await;
        }
    }

    Err(Ec2Error::WaitTimeout {
        target: target.name().to_string(),
        attempts: config.max_attempts,
    })
}
