//! Workflow orchestrators
//!
//! Each operation is a linear sequence of named steps; optional steps run
//! only when their parameters were supplied. IDs captured from one step
//! feed the payload of the next, so steps execute strictly in order. A
//! step failure aborts the workflow and already-applied cloud-side
//! effects stay in place.
//!
//! When a dry-run probe swallows a step's response (see [`crate::exec`]),
//! dependent steps have no captured ID to build on; the workflow returns
//! the report accumulated so far.

use crate::awscli::Ec2Api;
use crate::error::{Ec2Error, Result};
use crate::exec::execute;
use crate::ops::{ApiCall, Operation};
use crate::payload;
use crate::waiter::{self, WaitConfig, WaitTarget};
use futures_util::future::try_join_all;
use opsflow_core::{Params, Report};
use serde_json::{Value, json};

/// Routes one operation to its orchestrator.
pub async fn dispatch(api: &dyn Ec2Api, operation: Operation, params: &Params) -> Result<Report> {
    match operation {
        Operation::StartInstances => {
            single(api, ApiCall::StartInstances, payload::manage_instances(params)?).await
        }
        Operation::RebootInstances => {
            single(api, ApiCall::RebootInstances, payload::manage_instances(params)?).await
        }
        Operation::TerminateInstances => {
            single(
                api,
                ApiCall::TerminateInstances,
                payload::manage_instances(params)?,
            )
            .await
        }
        Operation::StopInstances => stop_instances(api, params).await,
        Operation::DescribeInstances => describe_instances(api, params).await,
        Operation::CreateInstance => create_instance(api, params).await,
        Operation::ModifyInstanceType => modify_instance_type(api, params).await,
        Operation::ModifyInstanceAttribute => modify_instance_attribute(api, params).await,
        Operation::CreateVpc => create_vpc(api, params).await,
        Operation::DeleteVpc => single(api, ApiCall::DeleteVpc, payload::delete_vpc(params)?).await,
        Operation::CreateSubnet => create_subnet(api, params).await,
        Operation::DeleteSubnet => {
            single(api, ApiCall::DeleteSubnet, payload::delete_subnet(params)?).await
        }
        Operation::CreateInternetGateway => create_internet_gateway(api, params).await,
        Operation::AttachInternetGateway => {
            single(
                api,
                ApiCall::AttachInternetGateway,
                payload::attach_internet_gateway(params)?,
            )
            .await
        }
        Operation::CreateRouteTable => create_route_table(api, params).await,
        Operation::AssociateRouteTable => associate_route_table(api, params).await,
        Operation::CreateRoute => {
            single(api, ApiCall::CreateRoute, payload::create_route(params)?).await
        }
        Operation::CreateNatGateway => {
            single(
                api,
                ApiCall::CreateNatGateway,
                payload::create_nat_gateway(params)?,
            )
            .await
        }
        Operation::ModifySubnetAttribute => {
            single(
                api,
                ApiCall::ModifySubnetAttribute,
                payload::modify_subnet_attribute(params)?,
            )
            .await
        }
        Operation::CreateSecurityGroup => create_security_group(api, params).await,
        Operation::AddSecurityGroupRules => add_security_group_rules(api, params).await,
        Operation::CreateVolume => create_volume(api, params).await,
        Operation::CreateSnapshot => create_snapshot(api, params).await,
        Operation::CreateKeyPair => {
            single(api, ApiCall::CreateKeyPair, payload::manage_key_pairs(params)?).await
        }
        Operation::DeleteKeyPair => {
            single(api, ApiCall::DeleteKeyPair, payload::manage_key_pairs(params)?).await
        }
        Operation::DescribeKeyPairs => single(api, ApiCall::DescribeKeyPairs, json!({})).await,
        Operation::AllocateAddress => {
            single(api, ApiCall::AllocateAddress, payload::allocate_address(params)?).await
        }
        Operation::AssociateAddress => {
            single(
                api,
                ApiCall::AssociateAddress,
                payload::associate_address(params)?,
            )
            .await
        }
        Operation::ReleaseAddress => {
            single(api, ApiCall::ReleaseAddress, payload::release_address(params)?).await
        }
        Operation::CreateTags => {
            single(api, ApiCall::CreateTags, payload::create_tags(params)?).await
        }
    }
}

/// One call, one report step keyed by the call name.
async fn single(api: &dyn Ec2Api, call: ApiCall, payload: Value) -> Result<Report> {
    let mut report = Report::new();
    report.push(call.name(), execute(api, call, payload).await?)?;
    Ok(report)
}

/// Reads a required string out of a response by JSON pointer.
fn require_str(response: &Value, pointer: &str) -> Result<String> {
    response
        .pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| Ec2Error::MissingResponseField(pointer.trim_start_matches('/').to_string()))
}

pub async fn create_vpc(api: &dyn Ec2Api, params: &Params) -> Result<Report> {
    let mut report = Report::new();
    let vpc = execute(api, ApiCall::CreateVpc, payload::create_vpc(params)?).await?;
    report.push("createVpc", vpc.clone())?;
    if vpc.is_null() {
        return Ok(report);
    }

    let vpc_id = require_str(&vpc, "/Vpc/VpcId")?;
    tracing::info!("created VPC {vpc_id}");
    let scoped = params.with("vpcId", json!(vpc_id.clone()));

    let mut gateway_id = None;
    if params.flag("createInternetGateway")? {
        let gateway = execute(
            api,
            ApiCall::CreateInternetGateway,
            payload::create_internet_gateway(&scoped)?,
        )
        .await?;
        let id = require_str(&gateway, "/InternetGateway/InternetGatewayId")?;
        report.push("createInternetGateway", gateway)?;

        let attach = scoped.with("gatewayId", json!(id.clone()));
        report.push(
            "attachInternetGateway",
            execute(
                api,
                ApiCall::AttachInternetGateway,
                payload::attach_internet_gateway(&attach)?,
            )
            .await?,
        )?;
        gateway_id = Some(id);
    }

    if params.flag("createRouteTable")? {
        let table = execute(
            api,
            ApiCall::CreateRouteTable,
            payload::create_route_table(&scoped)?,
        )
        .await?;
        let table_id = require_str(&table, "/RouteTable/RouteTableId")?;
        report.push("createRouteTable", table)?;

        // Default route to the internet through the gateway created above.
        if let Some(gateway_id) = &gateway_id {
            let route = scoped
                .with("routeTableId", json!(table_id.clone()))
                .with("gatewayId", json!(gateway_id))
                .with("destinationCidrBlock", json!("0.0.0.0/0"));
            report.push(
                "createRoute",
                execute(api, ApiCall::CreateRoute, payload::create_route(&route)?).await?,
            )?;
        }
    }

    if params.flag("createSecurityGroup")? {
        let group = scoped
            .with("name", json!(format!("{vpc_id}-dedicated-security-group")))
            .with(
                "description",
                json!(format!("A security group dedicated only for {vpc_id}")),
            );
        report.push(
            "createSecurityGroup",
            create_security_group_steps(api, &group).await?,
        )?;
    }

    Ok(report)
}

pub async fn create_subnet(api: &dyn Ec2Api, params: &Params) -> Result<Report> {
    let mut report = Report::new();
    let subnet = execute(api, ApiCall::CreateSubnet, payload::create_subnet(params)?).await?;
    report.push("createSubnet", subnet.clone())?;
    if subnet.is_null() {
        return Ok(report);
    }

    let subnet_id = require_str(&subnet, "/Subnet/SubnetId")?;
    tracing::info!("created subnet {subnet_id}");
    let scoped = params.with("subnetId", json!(subnet_id));

    let mut nat_gateway_id = None;
    if params.opt_string("allocationId")?.is_some() {
        let nat = execute(
            api,
            ApiCall::CreateNatGateway,
            payload::create_nat_gateway(&scoped)?,
        )
        .await?;
        nat_gateway_id = Some(require_str(&nat, "/NatGateway/NatGatewayId")?);
        report.push("createNatGateway", nat)?;
    }

    if params.opt_string("routeTableId")?.is_some() {
        report.push(
            "associateRouteTableToSubnet",
            execute(
                api,
                ApiCall::AssociateRouteTable,
                payload::associate_route_table_to_subnet(&scoped)?,
            )
            .await?,
        )?;
    } else if params.flag("createPrivateRouteTable")? {
        let table = execute(
            api,
            ApiCall::CreateRouteTable,
            payload::create_route_table(&scoped)?,
        )
        .await?;
        let table_id = require_str(&table, "/RouteTable/RouteTableId")?;
        report.push("createRouteTable", table)?;

        let with_table = scoped.with("routeTableId", json!(table_id.clone()));
        report.push(
            "associateRouteTableToSubnet",
            execute(
                api,
                ApiCall::AssociateRouteTable,
                payload::associate_route_table_to_subnet(&with_table)?,
            )
            .await?,
        )?;

        // A NAT route is only useful once the gateway leaves "pending".
        if let Some(nat_id) = &nat_gateway_id {
            waiter::wait_for(
                api,
                WaitTarget::NatGatewayAvailable,
                std::slice::from_ref(nat_id),
                &WaitConfig::default(),
            )
            .await?;
            let route = with_table
                .with("natGatewayId", json!(nat_id))
                .with("destinationCidrBlock", json!("0.0.0.0/0"));
            report.push(
                "createRoute",
                execute(api, ApiCall::CreateRoute, payload::create_route(&route)?).await?,
            )?;
        }
    }

    if params.flag("mapPublicIpOnLaunch")? {
        let modify = scoped.with("mapPublicIpOnLaunch", json!(true));
        report.push(
            "modifySubnetAttribute",
            execute(
                api,
                ApiCall::ModifySubnetAttribute,
                payload::modify_subnet_attribute(&modify)?,
            )
            .await?,
        )?;
    }

    Ok(report)
}

pub async fn create_internet_gateway(api: &dyn Ec2Api, params: &Params) -> Result<Report> {
    let mut report = Report::new();
    let gateway = execute(
        api,
        ApiCall::CreateInternetGateway,
        payload::create_internet_gateway(params)?,
    )
    .await?;
    report.push("createInternetGateway", gateway.clone())?;

    if params.opt_string("vpcId")?.is_some() && !gateway.is_null() {
        let attach = params.with(
            "gatewayId",
            json!(require_str(&gateway, "/InternetGateway/InternetGatewayId")?),
        );
        report.push(
            "attachInternetGateway",
            execute(
                api,
                ApiCall::AttachInternetGateway,
                payload::attach_internet_gateway(&attach)?,
            )
            .await?,
        )?;
    }

    Ok(report)
}

pub async fn create_route_table(api: &dyn Ec2Api, params: &Params) -> Result<Report> {
    let mut report = Report::new();
    let table = execute(
        api,
        ApiCall::CreateRouteTable,
        payload::create_route_table(params)?,
    )
    .await?;
    report.push("createRouteTable", table.clone())?;
    if table.is_null() {
        return Ok(report);
    }

    let has_target =
        params.opt_string("subnetId")?.is_some() || params.opt_string("gatewayId")?.is_some();
    if has_target {
        let with_table = params.with(
            "routeTableId",
            json!(require_str(&table, "/RouteTable/RouteTableId")?),
        );
        report.merge(associate_route_table(api, &with_table).await?)?;
    }

    Ok(report)
}

pub async fn associate_route_table(api: &dyn Ec2Api, params: &Params) -> Result<Report> {
    let has_subnet = params.opt_string("subnetId")?.is_some();
    let has_gateway = params.opt_string("gatewayId")?.is_some();
    if !has_subnet && !has_gateway {
        return Err(Ec2Error::InvalidParams(
            "You need to provide a Subnet ID or a Gateway ID!".into(),
        ));
    }

    let mut report = Report::new();
    if has_subnet {
        report.push(
            "associateRouteTableToSubnet",
            execute(
                api,
                ApiCall::AssociateRouteTable,
                payload::associate_route_table_to_subnet(params)?,
            )
            .await?,
        )?;
    }
    if has_gateway {
        report.push(
            "associateRouteTableToGateway",
            execute(
                api,
                ApiCall::AssociateRouteTable,
                payload::associate_route_table_to_gateway(params)?,
            )
            .await?,
        )?;
    }
    Ok(report)
}

pub async fn create_security_group(api: &dyn Ec2Api, params: &Params) -> Result<Report> {
    let mut report = Report::new();
    report.push(
        "createSecurityGroup",
        create_security_group_steps(api, params).await?,
    )?;
    Ok(report)
}

/// Creates a security group and, when outbound traffic is disallowed,
/// revokes the allow-all egress rules AWS attaches to every new group.
async fn create_security_group_steps(api: &dyn Ec2Api, params: &Params) -> Result<Value> {
    let group = execute(
        api,
        ApiCall::CreateSecurityGroup,
        payload::create_security_group(params)?,
    )
    .await?;

    if !params.flag("disallowOutboundTraffic")? || group.is_null() {
        return Ok(group);
    }

    let group_id = require_str(&group, "/GroupId")?;
    let rules = api
        .call(
            ApiCall::DescribeSecurityGroupRules,
            json!({
                "Filters": [{ "Name": "group-id", "Values": [group_id.clone()] }],
            }),
        )
        .await?;

    let egress_rule_ids: Vec<&str> = rules
        .pointer("/SecurityGroupRules")
        .and_then(Value::as_array)
        .map(|rules| {
            rules
                .iter()
                .filter(|rule| rule.get("IsEgress").and_then(Value::as_bool).unwrap_or(false))
                .filter_map(|rule| rule.get("SecurityGroupRuleId").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();

    api.call(
        ApiCall::RevokeSecurityGroupEgress,
        json!({
            "GroupId": group_id,
            "SecurityGroupRuleIds": egress_rule_ids,
        }),
    )
    .await?;

    Ok(group)
}

pub async fn add_security_group_rules(api: &dyn Ec2Api, params: &Params) -> Result<Report> {
    let payload = payload::add_security_group_rules(params)?;
    let call = match params.opt_string("ruleType")?.as_deref() {
        Some("Egress-Authorize") => ApiCall::AuthorizeSecurityGroupEgress,
        Some("Ingress-Revoke") => ApiCall::RevokeSecurityGroupIngress,
        Some("Egress-Revoke") => ApiCall::RevokeSecurityGroupEgress,
        _ => ApiCall::AuthorizeSecurityGroupIngress,
    };
    single(api, call, payload).await
}

pub async fn create_instance(api: &dyn Ec2Api, params: &Params) -> Result<Report> {
    let root_device_name = match params.opt_i64("rootVolumeSize")? {
        None => None,
        Some(_) => {
            // The device mapping must name the image's root device.
            let images = execute(
                api,
                ApiCall::DescribeImages,
                json!({ "ImageIds": [params.req_string("imageId")?] }),
            )
            .await?;
            Some(require_str(&images, "/Images/0/RootDeviceName")?)
        }
    };

    single(
        api,
        ApiCall::RunInstances,
        payload::create_instance(params, root_device_name.as_deref())?,
    )
    .await
}

pub async fn stop_instances(api: &dyn Ec2Api, params: &Params) -> Result<Report> {
    let mut report = Report::new();
    report.push(
        "stopInstances",
        execute(api, ApiCall::StopInstances, payload::manage_instances(params)?).await?,
    )?;

    if params.flag("waitForStop")? {
        let ids = params.req_string_list("instanceIds")?;
        let terminal = waiter::wait_for(
            api,
            WaitTarget::InstanceStopped,
            &ids,
            &WaitConfig::default(),
        )
        .await?;
        tracing::info!("current state is stopped for all instances");
        report.push("instanceStopped", terminal)?;
    }

    Ok(report)
}

pub async fn describe_instances(api: &dyn Ec2Api, params: &Params) -> Result<Report> {
    if !params.flag("getAllRecursively")? {
        return single(api, ApiCall::DescribeInstances, payload::describe_instances(params)?).await;
    }

    let mut reservations = Vec::new();
    let mut next_token: Option<String> = None;
    loop {
        let page_params = match &next_token {
            Some(token) => params.with("nextToken", json!(token)),
            None => params.clone(),
        };
        let page = execute(
            api,
            ApiCall::DescribeInstances,
            payload::describe_instances(&page_params)?,
        )
        .await?;
        if let Some(items) = page.get("Reservations").and_then(Value::as_array) {
            reservations.extend(items.iter().cloned());
        }
        next_token = page
            .get("NextToken")
            .and_then(Value::as_str)
            .map(str::to_string);
        if next_token.is_none() {
            break;
        }
    }

    let mut report = Report::new();
    report.push("describeInstances", json!({ "Reservations": reservations }))?;
    Ok(report)
}

pub async fn create_volume(api: &dyn Ec2Api, params: &Params) -> Result<Report> {
    let created = execute(api, ApiCall::CreateVolume, payload::create_volume(params)?).await?;
    let mut report = Report::new();

    if params.flag("waitForEnd")? && !created.is_null() {
        let volume_id = require_str(&created, "/VolumeId")?;
        let terminal = waiter::wait_for(
            api,
            WaitTarget::VolumeAvailable,
            &[volume_id],
            &WaitConfig::default(),
        )
        .await?;
        let volume = terminal
            .pointer("/Volumes/0")
            .cloned()
            .unwrap_or(terminal);
        report.push("createVolume", volume)?;
    } else {
        report.push("createVolume", created)?;
    }

    Ok(report)
}

pub async fn create_snapshot(api: &dyn Ec2Api, params: &Params) -> Result<Report> {
    let created = execute(api, ApiCall::CreateSnapshot, payload::create_snapshot(params)?).await?;
    let mut report = Report::new();

    if params.flag("waitForEnd")? && !created.is_null() {
        let snapshot_id = require_str(&created, "/SnapshotId")?;
        let terminal = waiter::wait_for(
            api,
            WaitTarget::SnapshotCompleted,
            &[snapshot_id],
            &WaitConfig::default(),
        )
        .await?;
        let snapshot = terminal
            .pointer("/Snapshots/0")
            .cloned()
            .unwrap_or(terminal);
        report.push("createSnapshot", snapshot)?;
    } else {
        report.push("createSnapshot", created)?;
    }

    Ok(report)
}

pub async fn modify_instance_type(api: &dyn Ec2Api, params: &Params) -> Result<Report> {
    let instance_ids = params.req_string_list("instanceIds")?;
    let instance_type = params.req_string("instanceType")?;

    // One call per instance, dispatched together; any failure fails the
    // aggregate and completed mutations stay applied.
    let calls = instance_ids.iter().map(|instance_id| {
        let payload = json!({
            "InstanceId": instance_id.clone(),
            "InstanceType": { "Value": instance_type.clone() },
        });
        execute(api, ApiCall::ModifyInstanceAttribute, payload)
    });
    let results = try_join_all(calls).await?;

    let mut report = Report::new();
    report.push("modifyInstanceType", Value::Array(results))?;
    Ok(report)
}

pub async fn modify_instance_attribute(api: &dyn Ec2Api, params: &Params) -> Result<Report> {
    let instance_ids = params.req_string_list("instanceIds")?;
    let attribute = params.req_string("attribute")?;
    let value = params.req_string("attributeValue")?;
    let dry_run = params.opt_bool("dryRun")?;

    let payloads = instance_ids
        .iter()
        .map(|id| payload::modify_instance_attribute(id, &attribute, &value, dry_run))
        .collect::<Result<Vec<_>>>()?;
    let results = try_join_all(
        payloads
            .into_iter()
            .map(|payload| execute(api, ApiCall::ModifyInstanceAttribute, payload)),
    )
    .await?;

    let mut report = Report::new();
    report.push("modifyInstanceAttribute", Value::Array(results))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockApi;

    fn params(value: Value) -> Params {
        Params::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn create_vpc_alone_records_one_step() {
        let api = MockApi::new().ok(json!({ "Vpc": { "VpcId": "vpc-1" } }));
        let report = create_vpc(&api, &params(json!({ "cidrBlock": "10.0.0.0/16" })))
            .await
            .unwrap();
        assert_eq!(report.step_names(), vec!["createVpc"]);
    }

    #[tokio::test]
    async fn create_vpc_full_recipe_keeps_the_fixed_step_order() {
        let api = MockApi::new()
            .ok(json!({ "Vpc": { "VpcId": "vpc-1" } }))
            .ok(json!({ "InternetGateway": { "InternetGatewayId": "igw-1" } }))
            .ok(Value::Null) // attach has no response body
            .ok(json!({ "RouteTable": { "RouteTableId": "rtb-1" } }))
            .ok(json!({ "Return": true }))
            .ok(json!({ "GroupId": "sg-1" }));
        let report = create_vpc(
            &api,
            &params(json!({
                "cidrBlock": "10.0.0.0/16",
                "createInternetGateway": true,
                "createRouteTable": true,
                "createSecurityGroup": true,
            })),
        )
        .await
        .unwrap();

        assert_eq!(
            report.step_names(),
            vec![
                "createVpc",
                "createInternetGateway",
                "attachInternetGateway",
                "createRouteTable",
                "createRoute",
                "createSecurityGroup",
            ]
        );

        let calls = api.calls();
        // The dedicated group is named after the VPC it guards.
        let group_payload = &calls[5].1;
        assert_eq!(calls[5].0, ApiCall::CreateSecurityGroup);
        assert_eq!(group_payload["GroupName"], "vpc-1-dedicated-security-group");
        assert!(
            group_payload["Description"]
                .as_str()
                .unwrap()
                .contains("vpc-1")
        );
        // The default route goes through the created gateway.
        assert_eq!(calls[4].0, ApiCall::CreateRoute);
        assert_eq!(calls[4].1["GatewayId"], "igw-1");
        assert_eq!(calls[4].1["RouteTableId"], "rtb-1");
        assert_eq!(calls[4].1["DestinationCidrBlock"], "0.0.0.0/0");
    }

    #[tokio::test]
    async fn create_vpc_dry_run_stops_after_the_probe() {
        let api = MockApi::new().err(Ec2Error::CommandFailed(
            "Request would have succeeded, but DryRun flag is set.".into(),
        ));
        let report = create_vpc(
            &api,
            &params(json!({
                "cidrBlock": "10.0.0.0/16",
                "dryRun": true,
                "createInternetGateway": true,
            })),
        )
        .await
        .unwrap();
        assert_eq!(report.step_names(), vec!["createVpc"]);
        assert!(report.get("createVpc").unwrap().is_null());
        assert_eq!(api.calls().len(), 1);
    }

    #[tokio::test]
    async fn create_subnet_private_route_table_waits_for_the_nat_gateway() {
        let api = MockApi::new()
            .ok(json!({ "Subnet": { "SubnetId": "subnet-1" } }))
            .ok(json!({ "NatGateway": { "NatGatewayId": "nat-1" } }))
            .ok(json!({ "RouteTable": { "RouteTableId": "rtb-1" } }))
            .ok(json!({ "AssociationId": "rtbassoc-1" }))
            .ok(json!({ "NatGateways": [{ "State": "available" }] }))
            .ok(json!({ "Return": true }));
        let report = create_subnet(
            &api,
            &params(json!({
                "vpcId": "vpc-1",
                "cidrBlock": "10.0.1.0/24",
                "allocationId": "eipalloc-1",
                "createPrivateRouteTable": true,
            })),
        )
        .await
        .unwrap();

        assert_eq!(
            report.step_names(),
            vec![
                "createSubnet",
                "createNatGateway",
                "createRouteTable",
                "associateRouteTableToSubnet",
                "createRoute",
            ]
        );
        let calls = api.calls();
        assert_eq!(calls[4].0, ApiCall::DescribeNatGateways);
        assert_eq!(calls[5].1["NatGatewayId"], "nat-1");
        assert_eq!(calls[5].1["DestinationCidrBlock"], "0.0.0.0/0");
    }

    #[tokio::test]
    async fn create_subnet_associates_an_existing_route_table() {
        let api = MockApi::new()
            .ok(json!({ "Subnet": { "SubnetId": "subnet-1" } }))
            .ok(json!({ "AssociationId": "rtbassoc-1" }))
            .ok(Value::Null);
        let report = create_subnet(
            &api,
            &params(json!({
                "vpcId": "vpc-1",
                "cidrBlock": "10.0.1.0/24",
                "routeTableId": "rtb-9",
                "mapPublicIpOnLaunch": true,
            })),
        )
        .await
        .unwrap();

        assert_eq!(
            report.step_names(),
            vec![
                "createSubnet",
                "associateRouteTableToSubnet",
                "modifySubnetAttribute",
            ]
        );
        let calls = api.calls();
        assert_eq!(calls[1].1["RouteTableId"], "rtb-9");
        assert_eq!(calls[1].1["SubnetId"], "subnet-1");
        assert_eq!(calls[2].1["MapPublicIpOnLaunch"]["Value"], true);
    }

    #[tokio::test]
    async fn associate_route_table_requires_a_target() {
        let api = MockApi::new();
        let err = associate_route_table(&api, &params(json!({ "routeTableId": "rtb-1" })))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Subnet ID or a Gateway ID"));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn associate_route_table_records_each_target_uniquely() {
        let api = MockApi::new()
            .ok(json!({ "AssociationId": "rtbassoc-1" }))
            .ok(json!({ "AssociationId": "rtbassoc-2" }));
        let report = associate_route_table(
            &api,
            &params(json!({
                "routeTableId": "rtb-1",
                "subnetId": "subnet-1",
                "gatewayId": "igw-1",
            })),
        )
        .await
        .unwrap();
        assert_eq!(
            report.step_names(),
            vec!["associateRouteTableToSubnet", "associateRouteTableToGateway"]
        );
    }

    #[tokio::test]
    async fn disallowing_outbound_revokes_only_egress_rules() {
        let api = MockApi::new()
            .ok(json!({ "GroupId": "sg-1" }))
            .ok(json!({ "SecurityGroupRules": [
                { "SecurityGroupRuleId": "sgr-in", "IsEgress": false },
                { "SecurityGroupRuleId": "sgr-out", "IsEgress": true },
                { "SecurityGroupRuleId": "sgr-out2", "IsEgress": true },
            ]}))
            .ok(json!({ "Return": true }));
        let report = create_security_group(
            &api,
            &params(json!({
                "name": "locked-down",
                "description": "no egress",
                "vpcId": "vpc-1",
                "disallowOutboundTraffic": true,
            })),
        )
        .await
        .unwrap();
        assert_eq!(report.step_names(), vec!["createSecurityGroup"]);

        let calls = api.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[2].0, ApiCall::RevokeSecurityGroupEgress);
        assert_eq!(calls[2].1["GroupId"], "sg-1");
        assert_eq!(
            calls[2].1["SecurityGroupRuleIds"],
            json!(["sgr-out", "sgr-out2"])
        );
    }

    #[tokio::test]
    async fn describe_instances_follows_every_page_in_order() {
        let api = MockApi::new()
            .ok(json!({ "Reservations": [{ "ReservationId": "r-1" }], "NextToken": "t1" }))
            .ok(json!({ "Reservations": [{ "ReservationId": "r-2" }], "NextToken": "t2" }))
            .ok(json!({ "Reservations": [{ "ReservationId": "r-3" }] }));
        let report = describe_instances(&api, &params(json!({ "getAllRecursively": true })))
            .await
            .unwrap();
        let reservations = report.get("describeInstances").unwrap()["Reservations"]
            .as_array()
            .unwrap();
        assert_eq!(reservations.len(), 3);
        assert_eq!(reservations[0]["ReservationId"], "r-1");
        assert_eq!(reservations[2]["ReservationId"], "r-3");

        let calls = api.calls();
        assert_eq!(calls.len(), 3);
        assert!(calls[0].1.get("NextToken").is_none());
        assert_eq!(calls[1].1["NextToken"], "t1");
        assert_eq!(calls[2].1["NextToken"], "t2");
    }

    #[tokio::test]
    async fn describe_instances_single_page_by_default() {
        let api = MockApi::new()
            .ok(json!({ "Reservations": [{ "ReservationId": "r-1" }], "NextToken": "t1" }));
        let report = describe_instances(&api, &params(json!({})))
            .await
            .unwrap();
        assert_eq!(api.calls().len(), 1);
        assert_eq!(
            report.get("describeInstances").unwrap()["NextToken"],
            "t1",
            "the first page is returned as-is"
        );
    }

    #[tokio::test]
    async fn create_instance_resolves_the_root_device_first() {
        let api = MockApi::new()
            .ok(json!({ "Images": [{ "RootDeviceName": "/dev/xvda" }] }))
            .ok(json!({ "Instances": [{ "InstanceId": "i-1" }] }));
        let report = create_instance(
            &api,
            &params(json!({
                "imageId": "ami-1",
                "instanceType": "t3.micro",
                "rootVolumeSize": 64,
            })),
        )
        .await
        .unwrap();
        assert_eq!(report.step_names(), vec!["runInstances"]);

        let calls = api.calls();
        assert_eq!(calls[0].0, ApiCall::DescribeImages);
        assert_eq!(
            calls[1].1["BlockDeviceMappings"][0]["DeviceName"],
            "/dev/xvda"
        );
    }

    #[tokio::test]
    async fn stop_instances_can_wait_for_the_stopped_state() {
        let api = MockApi::new()
            .ok(json!({ "StoppingInstances": [{ "InstanceId": "i-1" }] }))
            .ok(json!({ "Reservations": [
                { "Instances": [{ "State": { "Name": "stopped" } }] },
            ]}));
        let report = stop_instances(
            &api,
            &params(json!({ "instanceIds": ["i-1"], "waitForStop": true })),
        )
        .await
        .unwrap();
        assert_eq!(report.step_names(), vec!["stopInstances", "instanceStopped"]);
    }

    #[tokio::test]
    async fn create_volume_wait_returns_the_terminal_volume() {
        let api = MockApi::new()
            .ok(json!({ "VolumeId": "vol-1", "State": "creating" }))
            .ok(json!({ "Volumes": [{ "VolumeId": "vol-1", "State": "available" }] }));
        let report = create_volume(
            &api,
            &params(json!({
                "availabilityZone": "eu-west-1a",
                "size": 20,
                "waitForEnd": true,
            })),
        )
        .await
        .unwrap();
        assert_eq!(
            report.get("createVolume").unwrap()["State"],
            "available",
            "the pending response is replaced by the terminal description"
        );
    }

    #[tokio::test]
    async fn modify_instance_type_issues_one_call_per_instance() {
        let api = MockApi::new().ok(Value::Null).ok(Value::Null);
        let report = modify_instance_type(
            &api,
            &params(json!({
                "instanceIds": "i-1\ni-2",
                "instanceType": "t3.large",
            })),
        )
        .await
        .unwrap();
        assert_eq!(report.get("modifyInstanceType").unwrap().as_array().unwrap().len(), 2);

        let calls = api.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|(call, _)| *call == ApiCall::ModifyInstanceAttribute));
        assert_eq!(calls[0].1["InstanceType"]["Value"], "t3.large");
    }

    #[tokio::test]
    async fn add_security_group_rules_resolves_the_rule_type() {
        let api = MockApi::new().ok(json!({ "Return": true }));
        let report = add_security_group_rules(
            &api,
            &params(json!({
                "groupId": "sg-1",
                "ipProtocol": "TCP",
                "portRanges": ["443"],
                "ruleType": "Egress-Revoke",
            })),
        )
        .await
        .unwrap();
        assert_eq!(report.step_names(), vec!["revokeSecurityGroupEgress"]);
        assert_eq!(api.calls()[0].0, ApiCall::RevokeSecurityGroupEgress);
    }

    #[tokio::test]
    async fn dispatch_routes_simple_operations() {
        let api = MockApi::new().ok(json!({ "StartingInstances": [] }));
        let report = dispatch(
            &api,
            Operation::StartInstances,
            &params(json!({ "instanceIds": ["i-1"] })),
        )
        .await
        .unwrap();
        assert_eq!(report.step_names(), vec!["startInstances"]);
        assert_eq!(api.calls()[0].0, ApiCall::StartInstances);
    }
}
