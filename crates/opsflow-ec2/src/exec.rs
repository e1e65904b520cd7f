//! Single-call executor
//!
//! One API call per invocation. Cloud errors surface unchanged, with one
//! exception: a dry-run request the service reports as "would have
//! succeeded" resolves to `null` instead of an error, so callers can probe
//! permissions without performing the mutation.

use crate::awscli::Ec2Api;
use crate::error::{Ec2Error, Result};
use crate::ops::ApiCall;
use serde_json::Value;

pub async fn execute(api: &dyn Ec2Api, call: ApiCall, payload: Value) -> Result<Value> {
    match api.call(call, payload).await {
        Ok(response) => Ok(response),
        Err(Ec2Error::CommandFailed(message)) if is_dry_run_success(&message) => {
            tracing::debug!("{call} dry run would have succeeded");
            Ok(Value::Null)
        }
        Err(err) => Err(err),
    }
}

fn is_dry_run_success(message: &str) -> bool {
    message
        .to_ascii_lowercase()
        .contains("request would have succeeded, but dryrun flag is set")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockApi;
    use serde_json::json;

    #[tokio::test]
    async fn passes_responses_through() {
        let api = MockApi::new().ok(json!({ "Vpc": { "VpcId": "vpc-1" } }));
        let response = execute(&api, ApiCall::CreateVpc, json!({})).await.unwrap();
        assert_eq!(response["Vpc"]["VpcId"], "vpc-1");
    }

    #[tokio::test]
    async fn dry_run_success_resolves_to_null() {
        let api = MockApi::new().err(Ec2Error::CommandFailed(
            "An error occurred (DryRunOperation) when calling the CreateVpc operation: \
             Request would have succeeded, but DryRun flag is set."
                .into(),
        ));
        let response = execute(&api, ApiCall::CreateVpc, json!({ "DryRun": true }))
            .await
            .unwrap();
        assert!(response.is_null());
    }

    #[tokio::test]
    async fn other_errors_surface_unchanged() {
        let api = MockApi::new().err(Ec2Error::CommandFailed(
            "An error occurred (UnauthorizedOperation)".into(),
        ));
        let err = execute(&api, ApiCall::CreateVpc, json!({})).await.unwrap_err();
        assert!(matches!(err, Ec2Error::CommandFailed(_)));
    }
}
