//! Request payload builders
//!
//! One pure function per operation. Each builder validates its own
//! mandatory-field combinations and fails before any network call is
//! issued. Absent optional parameters are omitted from the payload rather
//! than serialized as `null`, which is also what `--cli-input-json`
//! expects.

use crate::error::{Ec2Error, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use opsflow_core::{Params, PortRange, Tag, tag_specifications};
use serde_json::{Map, Value, json};

/// Port-range sentinels accepted together with the "All" protocol.
const MATCH_ALL_PORT_RANGES: [&str; 3] = ["-1", "*", "0-65535"];

/// The wildcard protocol code AWS uses for "all traffic".
const MATCH_ALL_PROTOCOL: &str = "-1";

/// Cap for `describe-instances` pages when no instance IDs are given.
const DESCRIBE_INSTANCES_MAX_RESULTS: i64 = 1000;

fn object(members: Vec<(&'static str, Option<Value>)>) -> Value {
    let mut map = Map::new();
    for (name, value) in members {
        if let Some(value) = value {
            map.insert(name.to_string(), value);
        }
    }
    Value::Object(map)
}

fn dry_run(params: &Params) -> Result<Option<Value>> {
    Ok(params.opt_bool("dryRun")?.map(Value::from))
}

fn tag_spec(params: &Params, resource_type: &str) -> Result<Option<Value>> {
    let tags = params.tags("tags")?;
    Ok(tag_specifications(resource_type, tags.as_deref(), &[]))
}

fn string_list_value(params: &Params, name: &str) -> Result<Option<Value>> {
    let list = params.string_list(name)?;
    if list.is_empty() {
        Ok(None)
    } else {
        Ok(Some(json!(list)))
    }
}

/// Start/stop/reboot/terminate all share the ID-list payload.
pub fn manage_instances(params: &Params) -> Result<Value> {
    Ok(json!({ "InstanceIds": params.req_string_list("instanceIds")? }))
}

pub fn describe_instances(params: &Params) -> Result<Value> {
    let instance_ids = string_list_value(params, "instanceIds")?;
    let max_results = if instance_ids.is_none() {
        Some(Value::from(DESCRIBE_INSTANCES_MAX_RESULTS))
    } else {
        None
    };
    Ok(object(vec![
        ("DryRun", dry_run(params)?),
        ("Filters", params.opt_json("filters")?),
        ("InstanceIds", instance_ids),
        ("MaxResults", max_results),
        (
            "NextToken",
            params.opt_string("nextToken")?.map(Value::from),
        ),
    ]))
}

/// Instance creation. The root device name, when the caller asked for a
/// root volume resize, is resolved by the orchestrator from the image.
pub fn create_instance(params: &Params, root_device_name: Option<&str>) -> Result<Value> {
    let min_count = params.opt_i64("minCount")?.unwrap_or(1);
    let max_count = params.opt_i64("maxCount")?.unwrap_or(min_count);
    if max_count < min_count {
        return Err(Ec2Error::InvalidParams(
            "Max Count must be bigger or equal to Min Count".into(),
        ));
    }

    let name_tag: Vec<Tag> = params
        .opt_string("nameTag")?
        .map(|name| vec![Tag::new("Name", name)])
        .unwrap_or_default();
    let tags = params.tags("tags")?;
    let tag_specifications = tag_specifications("instance", tags.as_deref(), &name_tag);

    let block_device_mappings = match (root_device_name, params.opt_i64("rootVolumeSize")?) {
        (Some(device), Some(size)) => Some(json!([{
            "DeviceName": device,
            "Ebs": { "VolumeSize": size },
        }])),
        _ => None,
    };

    Ok(object(vec![
        ("ImageId", Some(Value::from(params.req_string("imageId")?))),
        (
            "InstanceType",
            Some(Value::from(params.req_string("instanceType")?)),
        ),
        ("KeyName", params.opt_string("keyName")?.map(Value::from)),
        (
            "SecurityGroupIds",
            string_list_value(params, "securityGroupIds")?,
        ),
        (
            "UserData",
            params
                .opt_string("userData")?
                .map(|data| Value::from(BASE64.encode(data))),
        ),
        ("MinCount", Some(Value::from(min_count))),
        ("MaxCount", Some(Value::from(max_count))),
        ("SubnetId", params.opt_string("subnetId")?.map(Value::from)),
        ("BlockDeviceMappings", block_device_mappings),
        ("TagSpecifications", tag_specifications),
        ("DryRun", dry_run(params)?),
    ]))
}

pub fn create_vpc(params: &Params) -> Result<Value> {
    let cidr_block = params.opt_string("cidrBlock")?;
    let ipv6 = params.opt_bool("amazonProvidedIpv6CidrBlock")?;
    if cidr_block.is_none() && !ipv6.unwrap_or(false) {
        return Err(Ec2Error::InvalidParams(
            "Must provide CIDR Block or select Amazon-provided IPv6 CIDR Block".into(),
        ));
    }
    Ok(object(vec![
        ("CidrBlock", cidr_block.map(Value::from)),
        ("AmazonProvidedIpv6CidrBlock", ipv6.map(Value::from)),
        (
            "InstanceTenancy",
            params.opt_string("instanceTenancy")?.map(Value::from),
        ),
        ("TagSpecifications", tag_spec(params, "vpc")?),
        ("DryRun", dry_run(params)?),
    ]))
}

pub fn delete_vpc(params: &Params) -> Result<Value> {
    Ok(object(vec![
        ("VpcId", Some(Value::from(params.req_string("vpcId")?))),
        ("DryRun", dry_run(params)?),
    ]))
}

pub fn create_internet_gateway(params: &Params) -> Result<Value> {
    Ok(object(vec![
        ("TagSpecifications", tag_spec(params, "internet-gateway")?),
        ("DryRun", dry_run(params)?),
    ]))
}

pub fn attach_internet_gateway(params: &Params) -> Result<Value> {
    Ok(object(vec![
        (
            "InternetGatewayId",
            Some(Value::from(params.req_string("gatewayId")?)),
        ),
        ("VpcId", Some(Value::from(params.req_string("vpcId")?))),
        ("DryRun", dry_run(params)?),
    ]))
}

pub fn create_route_table(params: &Params) -> Result<Value> {
    Ok(object(vec![
        ("VpcId", Some(Value::from(params.req_string("vpcId")?))),
        ("TagSpecifications", tag_spec(params, "route-table")?),
        ("DryRun", dry_run(params)?),
    ]))
}

pub fn create_route(params: &Params) -> Result<Value> {
    Ok(object(vec![
        (
            "RouteTableId",
            Some(Value::from(params.req_string("routeTableId")?)),
        ),
        ("GatewayId", params.opt_string("gatewayId")?.map(Value::from)),
        (
            "NatGatewayId",
            params.opt_string("natGatewayId")?.map(Value::from),
        ),
        (
            "InstanceId",
            params.opt_string("instanceId")?.map(Value::from),
        ),
        (
            "DestinationCidrBlock",
            params.opt_string("destinationCidrBlock")?.map(Value::from),
        ),
        ("DryRun", dry_run(params)?),
    ]))
}

pub fn create_nat_gateway(params: &Params) -> Result<Value> {
    Ok(object(vec![
        (
            "SubnetId",
            Some(Value::from(params.req_string("subnetId")?)),
        ),
        (
            "AllocationId",
            params.opt_string("allocationId")?.map(Value::from),
        ),
        ("TagSpecifications", tag_spec(params, "natgateway")?),
        ("DryRun", dry_run(params)?),
    ]))
}

fn validate_associate_route_table(params: &Params) -> Result<()> {
    if params.opt_string("subnetId")?.is_none() && params.opt_string("gatewayId")?.is_none() {
        return Err(Ec2Error::InvalidParams(
            "You need to provide a Subnet ID or a Gateway ID!".into(),
        ));
    }
    Ok(())
}

pub fn associate_route_table_to_subnet(params: &Params) -> Result<Value> {
    validate_associate_route_table(params)?;
    let subnet_id = params
        .opt_string("subnetId")?
        .ok_or_else(|| Ec2Error::InvalidParams("Subnet ID is missing!".into()))?;
    Ok(json!({
        "RouteTableId": params.req_string("routeTableId")?,
        "SubnetId": subnet_id,
    }))
}

pub fn associate_route_table_to_gateway(params: &Params) -> Result<Value> {
    validate_associate_route_table(params)?;
    let gateway_id = params
        .opt_string("gatewayId")?
        .ok_or_else(|| Ec2Error::InvalidParams("Gateway ID is missing!".into()))?;
    Ok(json!({
        "RouteTableId": params.req_string("routeTableId")?,
        "GatewayId": gateway_id,
    }))
}

pub fn create_security_group(params: &Params) -> Result<Value> {
    Ok(object(vec![
        ("GroupName", Some(Value::from(params.req_string("name")?))),
        (
            "Description",
            Some(Value::from(params.req_string("description")?)),
        ),
        ("VpcId", params.opt_string("vpcId")?.map(Value::from)),
        ("TagSpecifications", tag_spec(params, "security-group")?),
        ("DryRun", dry_run(params)?),
    ]))
}

pub fn create_subnet(params: &Params) -> Result<Value> {
    let cidr_block = params.opt_string("cidrBlock")?;
    let ipv6_cidr_block = params.opt_string("ipv6CidrBlock")?;
    if cidr_block.is_none() && ipv6_cidr_block.is_none() {
        return Err(Ec2Error::InvalidParams(
            "Must either provide CIDR Block or IPv6 CIDR Block".into(),
        ));
    }
    Ok(object(vec![
        ("VpcId", Some(Value::from(params.req_string("vpcId")?))),
        (
            "AvailabilityZone",
            params.opt_string("availabilityZone")?.map(Value::from),
        ),
        ("CidrBlock", cidr_block.map(Value::from)),
        ("Ipv6CidrBlock", ipv6_cidr_block.map(Value::from)),
        (
            "OutpostArn",
            params.opt_string("outpostArn")?.map(Value::from),
        ),
        ("TagSpecifications", tag_spec(params, "subnet")?),
        ("DryRun", dry_run(params)?),
    ]))
}

pub fn delete_subnet(params: &Params) -> Result<Value> {
    Ok(object(vec![
        (
            "SubnetId",
            Some(Value::from(params.req_string("subnetId")?)),
        ),
        ("DryRun", dry_run(params)?),
    ]))
}

fn validate_security_group_rules(protocol: &str, port_ranges: &[String]) -> Result<()> {
    if protocol != "ICMP" && protocol != "All" && port_ranges.is_empty() {
        return Err(Ec2Error::InvalidParams(format!(
            "Protocol {protocol} requires a port range. Please use the Port Range parameter to \
             specify a single port, range of ports, or \"*\" for all ports."
        )));
    }
    if protocol == "ICMP" && !port_ranges.is_empty() {
        return Err(Ec2Error::InvalidParams(
            "Ports cannot be configured for protocol ICMP, use parameter \"ICMP Type\" instead."
                .into(),
        ));
    }
    if protocol == "All"
        && !port_ranges
            .iter()
            .all(|range| MATCH_ALL_PORT_RANGES.contains(&range.as_str()))
    {
        return Err(Ec2Error::InvalidParams(
            "Specifying All IP Protocols allows all traffic and cannot be restricted by Port \
             Range. If you intend to allow a specific Port Range, please use TCP or UDP instead."
                .into(),
        ));
    }
    Ok(())
}

pub fn add_security_group_rules(params: &Params) -> Result<Value> {
    let protocol = params.req_string("ipProtocol")?;
    let port_ranges = params.string_list("portRanges")?;
    validate_security_group_rules(&protocol, &port_ranges)?;

    let description = params.opt_string("description")?;
    let range_entry = |member: &str, cidr: &String| {
        let mut entry = Map::new();
        entry.insert(member.to_string(), Value::from(cidr.clone()));
        if let Some(description) = &description {
            entry.insert("Description".to_string(), Value::from(description.clone()));
        }
        Value::Object(entry)
    };

    let ipv4 = params.string_list("cidrIps")?;
    let ipv6 = params.string_list("cidrIps6")?;
    let mut ranges = Map::new();
    if !ipv4.is_empty() {
        ranges.insert(
            "IpRanges".to_string(),
            Value::Array(ipv4.iter().map(|c| range_entry("CidrIp", c)).collect()),
        );
    }
    if !ipv6.is_empty() {
        ranges.insert(
            "Ipv6Ranges".to_string(),
            Value::Array(ipv6.iter().map(|c| range_entry("CidrIpv6", c)).collect()),
        );
    }

    let with_ranges = |mut permission: Map<String, Value>| {
        permission.extend(ranges.clone());
        Value::Object(permission)
    };

    let ip_permissions: Vec<Value> = match protocol.as_str() {
        "All" => {
            let mut permission = Map::new();
            permission.insert("IpProtocol".to_string(), Value::from(MATCH_ALL_PROTOCOL));
            vec![with_ranges(permission)]
        }
        "ICMP" => {
            let mut permission = Map::new();
            permission.insert("IpProtocol".to_string(), Value::from("icmp"));
            permission.insert(
                "FromPort".to_string(),
                Value::from(params.opt_i64("icmpType")?.unwrap_or(-1)),
            );
            permission.insert("ToPort".to_string(), Value::from(-1));
            vec![with_ranges(permission)]
        }
        other => {
            let protocol_code = other.to_ascii_lowercase();
            port_ranges
                .iter()
                .map(|raw| {
                    let range = PortRange::parse(raw)?;
                    let mut permission = Map::new();
                    permission.insert("IpProtocol".to_string(), Value::from(protocol_code.clone()));
                    permission.insert("FromPort".to_string(), Value::from(range.from));
                    permission.insert("ToPort".to_string(), Value::from(range.to));
                    Ok(with_ranges(permission))
                })
                .collect::<Result<Vec<_>>>()?
        }
    };

    Ok(json!({
        "GroupId": params.req_string("groupId")?,
        "IpPermissions": ip_permissions,
    }))
}

/// Create/delete key pairs share the name-only payload.
pub fn manage_key_pairs(params: &Params) -> Result<Value> {
    Ok(json!({ "KeyName": params.req_string("keyPairName")? }))
}

pub fn allocate_address(params: &Params) -> Result<Value> {
    Ok(object(vec![
        ("Domain", Some(Value::from("vpc"))),
        ("Address", params.opt_string("address")?.map(Value::from)),
        (
            "PublicIpv4Pool",
            params.opt_string("publicIpv4Pool")?.map(Value::from),
        ),
        ("DryRun", dry_run(params)?),
    ]))
}

pub fn associate_address(params: &Params) -> Result<Value> {
    Ok(object(vec![
        (
            "AllocationId",
            Some(Value::from(params.req_string("allocationId")?)),
        ),
        (
            "InstanceId",
            params.opt_string("instanceId")?.map(Value::from),
        ),
        (
            "NetworkInterfaceId",
            params.opt_string("networkInterfaceId")?.map(Value::from),
        ),
        (
            "PrivateIpAddress",
            params.opt_string("privateIpAddress")?.map(Value::from),
        ),
        ("DryRun", dry_run(params)?),
    ]))
}

pub fn release_address(params: &Params) -> Result<Value> {
    let allocation_id = params.opt_string("allocationId")?;
    let public_ip = params.opt_string("publicIp")?;
    if allocation_id.is_none() && public_ip.is_none() {
        return Err(Ec2Error::InvalidParams(
            "Must provide an Allocation ID or a Public IP".into(),
        ));
    }
    Ok(object(vec![
        ("AllocationId", allocation_id.map(Value::from)),
        ("PublicIp", public_ip.map(Value::from)),
        ("DryRun", dry_run(params)?),
    ]))
}

pub fn create_volume(params: &Params) -> Result<Value> {
    let size = params.opt_i64("size")?;
    let snapshot_id = params.opt_string("snapshotId")?;
    if size.is_none() && snapshot_id.is_none() {
        return Err(Ec2Error::InvalidParams(
            "Must provide a Size or a Snapshot ID".into(),
        ));
    }
    Ok(object(vec![
        (
            "AvailabilityZone",
            Some(Value::from(params.req_string("availabilityZone")?)),
        ),
        (
            "VolumeType",
            params.opt_string("volumeType")?.map(Value::from),
        ),
        ("Size", size.map(Value::from)),
        ("Iops", params.opt_i64("iops")?.map(Value::from)),
        ("SnapshotId", snapshot_id.map(Value::from)),
        (
            "OutpostArn",
            params.opt_string("outpostArn")?.map(Value::from),
        ),
        ("Throughput", params.opt_i64("throughput")?.map(Value::from)),
        ("Encrypted", params.opt_bool("encrypted")?.map(Value::from)),
        ("KmsKeyId", params.opt_string("kmsKeyId")?.map(Value::from)),
        (
            "MultiAttachEnabled",
            params.opt_bool("multiAttachEnabled")?.map(Value::from),
        ),
        ("DryRun", dry_run(params)?),
    ]))
}

pub fn create_snapshot(params: &Params) -> Result<Value> {
    Ok(object(vec![
        (
            "VolumeId",
            Some(Value::from(params.req_string("volumeId")?)),
        ),
        (
            "Description",
            params.opt_string("description")?.map(Value::from),
        ),
        (
            "OutpostArn",
            params.opt_string("outpostArn")?.map(Value::from),
        ),
        ("DryRun", dry_run(params)?),
    ]))
}

pub fn create_tags(params: &Params) -> Result<Value> {
    let tags = params
        .tags("tags")?
        .ok_or_else(|| Ec2Error::InvalidParams("Must provide at least one tag".into()))?;
    Ok(json!({
        "Resources": [params.req_string("resourceId")?],
        "Tags": tags,
    }))
}

pub fn modify_subnet_attribute(params: &Params) -> Result<Value> {
    let map_public_ip = params.opt_bool("mapPublicIpOnLaunch")?;
    let assign_ipv6 = params.opt_bool("assignIpv6AddressOnCreation")?;
    if map_public_ip.is_none() && assign_ipv6.is_none() {
        return Err(Ec2Error::InvalidParams(
            "Must select a subnet attribute to modify".into(),
        ));
    }
    Ok(object(vec![
        (
            "SubnetId",
            Some(Value::from(params.req_string("subnetId")?)),
        ),
        (
            "MapPublicIpOnLaunch",
            map_public_ip.map(|v| json!({ "Value": v })),
        ),
        (
            "AssignIpv6AddressOnCreation",
            assign_ipv6.map(|v| json!({ "Value": v })),
        ),
    ]))
}

/// Attributes whose value member is a boolean toggle.
const BOOLEAN_INSTANCE_ATTRIBUTES: [&str; 5] = [
    "DisableApiTermination",
    "DisableApiStop",
    "SourceDestCheck",
    "EbsOptimized",
    "EnaSupport",
];

/// One per-instance payload for `modify-instance-attribute`. The value is
/// typed per attribute: booleans for the toggle attributes, base64 for
/// user data, a plain string otherwise.
pub fn modify_instance_attribute(
    instance_id: &str,
    attribute: &str,
    raw_value: &str,
    dry_run: Option<bool>,
) -> Result<Value> {
    let value = if BOOLEAN_INSTANCE_ATTRIBUTES.contains(&attribute) {
        match raw_value {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => {
                return Err(Ec2Error::InvalidParams(format!(
                    "Attribute {attribute} expects \"true\" or \"false\", got {other:?}"
                )));
            }
        }
    } else if attribute == "UserData" {
        Value::from(BASE64.encode(raw_value))
    } else {
        Value::from(raw_value)
    };

    let mut payload = Map::new();
    payload.insert("InstanceId".to_string(), Value::from(instance_id));
    if let Some(dry_run) = dry_run {
        payload.insert("DryRun".to_string(), Value::from(dry_run));
    }
    payload.insert(attribute.to_string(), json!({ "Value": value }));
    Ok(Value::Object(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> Params {
        Params::from_value(value).unwrap()
    }

    #[test]
    fn create_vpc_requires_cidr_or_ipv6() {
        let err = create_vpc(&params(json!({}))).unwrap_err();
        assert!(err.to_string().contains("CIDR Block"));

        let payload = create_vpc(&params(json!({ "amazonProvidedIpv6CidrBlock": true }))).unwrap();
        assert_eq!(payload["AmazonProvidedIpv6CidrBlock"], true);
        assert!(payload.get("CidrBlock").is_none());
    }

    #[test]
    fn create_vpc_omits_absent_members() {
        let payload = create_vpc(&params(json!({ "cidrBlock": "10.0.0.0/16" }))).unwrap();
        assert_eq!(
            payload,
            json!({ "CidrBlock": "10.0.0.0/16" }),
            "absent members must be omitted, not null"
        );
    }

    #[test]
    fn create_subnet_requires_a_cidr_form() {
        let err = create_subnet(&params(json!({ "vpcId": "vpc-1" }))).unwrap_err();
        assert!(err.to_string().contains("CIDR Block"));
    }

    #[test]
    fn create_instance_validates_counts() {
        let base = json!({
            "imageId": "ami-1",
            "instanceType": "t3.micro",
            "minCount": 3,
            "maxCount": 2,
        });
        let err = create_instance(&params(base), None).unwrap_err();
        assert!(err.to_string().contains("Max Count"));
    }

    #[test]
    fn create_instance_merges_name_tag_and_encodes_user_data() {
        let payload = create_instance(
            &params(json!({
                "imageId": "ami-1",
                "instanceType": "t3.micro",
                "nameTag": "web-1",
                "tags": "env=prod",
                "userData": "#!/bin/sh\necho hi",
            })),
            None,
        )
        .unwrap();
        assert_eq!(payload["MinCount"], 1);
        assert_eq!(payload["MaxCount"], 1);
        assert_eq!(payload["UserData"], BASE64.encode("#!/bin/sh\necho hi"));
        let tags = payload["TagSpecifications"][0]["Tags"].as_array().unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[1], json!({ "Key": "Name", "Value": "web-1" }));
    }

    #[test]
    fn create_instance_maps_the_root_volume() {
        let payload = create_instance(
            &params(json!({
                "imageId": "ami-1",
                "instanceType": "t3.micro",
                "rootVolumeSize": 64,
            })),
            Some("/dev/xvda"),
        )
        .unwrap();
        assert_eq!(
            payload["BlockDeviceMappings"],
            json!([{ "DeviceName": "/dev/xvda", "Ebs": { "VolumeSize": 64 } }])
        );
    }

    #[test]
    fn describe_instances_caps_pages_only_without_ids() {
        let capped = describe_instances(&params(json!({}))).unwrap();
        assert_eq!(capped["MaxResults"], DESCRIBE_INSTANCES_MAX_RESULTS);

        let by_id = describe_instances(&params(json!({ "instanceIds": ["i-1"] }))).unwrap();
        assert!(by_id.get("MaxResults").is_none());
        assert_eq!(by_id["InstanceIds"], json!(["i-1"]));
    }

    #[test]
    fn describe_instances_accepts_encoded_filters() {
        let payload = describe_instances(&params(json!({
            "filters": "[{\"Name\":\"tag:env\",\"Values\":[\"prod\"]}]",
        })))
        .unwrap();
        assert_eq!(payload["Filters"][0]["Name"], "tag:env");
    }

    #[test]
    fn associate_route_table_payloads_validate_ids() {
        let neither = params(json!({ "routeTableId": "rtb-1" }));
        assert!(associate_route_table_to_subnet(&neither).is_err());

        let gateway_only = params(json!({ "routeTableId": "rtb-1", "gatewayId": "igw-1" }));
        let err = associate_route_table_to_subnet(&gateway_only).unwrap_err();
        assert!(err.to_string().contains("Subnet ID is missing"));
        let payload = associate_route_table_to_gateway(&gateway_only).unwrap();
        assert_eq!(payload["GatewayId"], "igw-1");
    }

    #[test]
    fn icmp_rules_forbid_port_ranges() {
        let err = add_security_group_rules(&params(json!({
            "groupId": "sg-1",
            "ipProtocol": "ICMP",
            "portRanges": ["80"],
        })))
        .unwrap_err();
        assert!(err.to_string().contains("ICMP"));
    }

    #[test]
    fn icmp_rules_use_the_icmp_type() {
        let payload = add_security_group_rules(&params(json!({
            "groupId": "sg-1",
            "ipProtocol": "ICMP",
            "icmpType": 8,
            "cidrIps": ["0.0.0.0/0"],
        })))
        .unwrap();
        let permission = &payload["IpPermissions"][0];
        assert_eq!(permission["IpProtocol"], "icmp");
        assert_eq!(permission["FromPort"], 8);
        assert_eq!(permission["ToPort"], -1);
    }

    #[test]
    fn protocol_all_admits_only_full_range_sentinels() {
        let err = add_security_group_rules(&params(json!({
            "groupId": "sg-1",
            "ipProtocol": "All",
            "portRanges": ["80-90"],
        })))
        .unwrap_err();
        assert!(err.to_string().contains("All IP Protocols"));

        let payload = add_security_group_rules(&params(json!({
            "groupId": "sg-1",
            "ipProtocol": "All",
            "portRanges": ["*", "0-65535", "-1"],
        })))
        .unwrap();
        assert_eq!(payload["IpPermissions"][0]["IpProtocol"], "-1");
    }

    #[test]
    fn tcp_rules_require_and_expand_port_ranges() {
        let missing = add_security_group_rules(&params(json!({
            "groupId": "sg-1",
            "ipProtocol": "TCP",
        })))
        .unwrap_err();
        assert!(missing.to_string().contains("requires a port range"));

        let payload = add_security_group_rules(&params(json!({
            "groupId": "sg-1",
            "ipProtocol": "TCP",
            "portRanges": "22\n8080-8099",
            "cidrIps": ["10.0.0.0/8"],
            "description": "internal",
        })))
        .unwrap();
        let permissions = payload["IpPermissions"].as_array().unwrap();
        assert_eq!(permissions.len(), 2);
        assert_eq!(permissions[0]["FromPort"], 22);
        assert_eq!(permissions[1]["ToPort"], 8099);
        assert_eq!(
            permissions[1]["IpRanges"][0],
            json!({ "CidrIp": "10.0.0.0/8", "Description": "internal" })
        );
    }

    #[test]
    fn create_volume_needs_size_or_snapshot() {
        let err = create_volume(&params(json!({ "availabilityZone": "eu-west-1a" }))).unwrap_err();
        assert!(err.to_string().contains("Size or a Snapshot ID"));
    }

    #[test]
    fn create_tags_surfaces_tag_format_errors() {
        let err = create_tags(&params(json!({
            "resourceId": "vpc-1",
            "tags": "missing-separator",
        })))
        .unwrap_err();
        assert!(err.to_string().contains("missing '='"));
    }

    #[test]
    fn modify_instance_attribute_types_the_value() {
        let toggled =
            modify_instance_attribute("i-1", "DisableApiTermination", "true", None).unwrap();
        assert_eq!(toggled["DisableApiTermination"]["Value"], true);

        let typed = modify_instance_attribute("i-1", "InstanceType", "t3.large", Some(true)).unwrap();
        assert_eq!(typed["InstanceType"]["Value"], "t3.large");
        assert_eq!(typed["DryRun"], true);

        let encoded = modify_instance_attribute("i-1", "UserData", "echo hi", None).unwrap();
        assert_eq!(encoded["UserData"]["Value"], BASE64.encode("echo hi"));

        assert!(modify_instance_attribute("i-1", "SourceDestCheck", "maybe", None).is_err());
    }
}
