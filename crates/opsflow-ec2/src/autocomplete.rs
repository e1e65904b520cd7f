//! Interactive parameter pickers
//!
//! Read-only listings backing the host's autocomplete fields. Every
//! provider returns `{id, value}` items filtered by the caller's query.

use crate::awscli::Ec2Api;
use crate::error::Result;
use crate::ops::ApiCall;
use opsflow_core::AutocompleteItem;
use serde_json::{Value, json};

/// The pickers exposed to the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Picker {
    InstanceTypes,
    Regions,
    Subnets,
}

impl Picker {
    pub const ALL: &'static [Picker] = &[Picker::InstanceTypes, Picker::Regions, Picker::Subnets];

    pub fn name(&self) -> &'static str {
        match self {
            Picker::InstanceTypes => "instance-types",
            Picker::Regions => "regions",
            Picker::Subnets => "subnets",
        }
    }

    pub fn parse(name: &str) -> Option<Picker> {
        Self::ALL.iter().copied().find(|picker| picker.name() == name)
    }
}

impl std::fmt::Display for Picker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const REGIONS: [(&str, &str); 16] = [
    ("us-east-1", "US East 1 (N. Virginia)"),
    ("us-east-2", "US East 2 (Ohio)"),
    ("us-west-1", "US West 1 (N. California)"),
    ("us-west-2", "US West 2 (Oregon)"),
    ("ap-south-1", "Asia Pacific South (Mumbai)"),
    ("ap-southeast-1", "Asia Pacific Southeast 1 (Singapore)"),
    ("ap-southeast-2", "Asia Pacific Southeast 2 (Sydney)"),
    ("ap-northeast-1", "Asia Pacific Northeast 1 (Tokyo)"),
    ("ap-northeast-2", "Asia Pacific Northeast 2 (Seoul)"),
    ("ca-central-1", "Canada Central (Montreal)"),
    ("eu-west-1", "EU West 1 (Ireland)"),
    ("eu-west-2", "EU West 2 (London)"),
    ("eu-west-3", "EU West 3 (Paris)"),
    ("eu-central-1", "EU Central (Frankfurt)"),
    ("eu-north-1", "EU North (Stockholm)"),
    ("sa-east-1", "South America East (São Paulo)"),
];

/// Static region catalog filtered by query against id and label.
pub fn regions(query: &str) -> Vec<AutocompleteItem> {
    REGIONS
        .iter()
        .filter(|(id, label)| query.is_empty() || id.contains(query) || label.contains(query))
        .map(|(id, label)| AutocompleteItem::new(*id, *label))
        .collect()
}

/// Instance types offered in the region, matching `*query*`.
pub async fn instance_types(
    api: &dyn Ec2Api,
    region: &str,
    query: &str,
) -> Result<Vec<AutocompleteItem>> {
    let payload = json!({
        "MaxResults": 100,
        "Filters": [
            { "Name": "location", "Values": [region] },
            { "Name": "instance-type", "Values": [format!("*{query}*")] },
        ],
    });
    let response = api.call(ApiCall::DescribeInstanceTypeOfferings, payload).await?;

    let mut items: Vec<AutocompleteItem> = response
        .pointer("/InstanceTypeOfferings")
        .and_then(Value::as_array)
        .map(|offerings| {
            offerings
                .iter()
                .filter_map(|offering| offering.get("InstanceType").and_then(Value::as_str))
                .map(AutocompleteItem::from_primitive)
                .collect()
        })
        .unwrap_or_default();
    items.sort_by(|a, b| a.id.cmp(&b.id));
    Ok(items)
}

/// Subnets whose id, VPC or availability zone matches the query.
pub async fn subnets(api: &dyn Ec2Api, query: &str) -> Result<Vec<AutocompleteItem>> {
    let response = api.call(ApiCall::DescribeSubnets, json!({})).await?;

    let items = response
        .pointer("/Subnets")
        .and_then(Value::as_array)
        .map(|subnets| {
            subnets
                .iter()
                .filter(|subnet| {
                    let field = |name: &str| {
                        subnet.get(name).and_then(Value::as_str).unwrap_or_default()
                    };
                    query.is_empty()
                        || field("SubnetId").contains(query)
                        || field("VpcId").contains(query)
                        || field("AvailabilityZone").contains(query)
                })
                .filter_map(|subnet| {
                    let id = subnet.get("SubnetId").and_then(Value::as_str)?;
                    Some(AutocompleteItem::new(id, subnet_label(subnet, id)))
                })
                .collect()
        })
        .unwrap_or_default();
    Ok(items)
}

/// `subnet-id | Name-tag | availability-zone`, skipping missing segments.
fn subnet_label(subnet: &Value, id: &str) -> String {
    let mut segments = vec![id.to_string()];
    let name_tag = subnet
        .get("Tags")
        .and_then(Value::as_array)
        .and_then(|tags| {
            tags.iter()
                .find(|tag| tag.get("Key").and_then(Value::as_str) == Some("Name"))
        })
        .and_then(|tag| tag.get("Value").and_then(Value::as_str));
    if let Some(name) = name_tag {
        segments.push(name.to_string());
    }
    if let Some(zone) = subnet.get("AvailabilityZone").and_then(Value::as_str) {
        segments.push(zone.to_string());
    }
    segments.join(" | ")
}
