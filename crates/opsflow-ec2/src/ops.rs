//! Closed operation catalogs
//!
//! Two enums replace name-string dispatch: [`ApiCall`] is the set of raw
//! EC2 API calls the transport can issue, and [`Operation`] is the set of
//! operations exposed to callers. Unknown names fail when arguments are
//! parsed, never at call time.

/// One raw EC2 API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiCall {
    AllocateAddress,
    AssociateAddress,
    AssociateRouteTable,
    AttachInternetGateway,
    AuthorizeSecurityGroupEgress,
    AuthorizeSecurityGroupIngress,
    CreateInternetGateway,
    CreateKeyPair,
    CreateNatGateway,
    CreateRoute,
    CreateRouteTable,
    CreateSecurityGroup,
    CreateSnapshot,
    CreateSubnet,
    CreateTags,
    CreateVolume,
    CreateVpc,
    DeleteKeyPair,
    DeleteSubnet,
    DeleteVpc,
    DescribeImages,
    DescribeInstanceTypeOfferings,
    DescribeInstances,
    DescribeKeyPairs,
    DescribeNatGateways,
    DescribeSecurityGroupRules,
    DescribeSnapshots,
    DescribeSubnets,
    DescribeVolumes,
    ModifyInstanceAttribute,
    ModifySubnetAttribute,
    RebootInstances,
    ReleaseAddress,
    RevokeSecurityGroupEgress,
    RevokeSecurityGroupIngress,
    RunInstances,
    StartInstances,
    StopInstances,
    TerminateInstances,
}

impl ApiCall {
    /// The call name in the AWS SDK's camelCase spelling; workflow reports
    /// key single-call steps by this name.
    pub fn name(&self) -> &'static str {
        match self {
            ApiCall::AllocateAddress => "allocateAddress",
            ApiCall::AssociateAddress => "associateAddress",
            ApiCall::AssociateRouteTable => "associateRouteTable",
            ApiCall::AttachInternetGateway => "attachInternetGateway",
            ApiCall::AuthorizeSecurityGroupEgress => "authorizeSecurityGroupEgress",
            ApiCall::AuthorizeSecurityGroupIngress => "authorizeSecurityGroupIngress",
            ApiCall::CreateInternetGateway => "createInternetGateway",
            ApiCall::CreateKeyPair => "createKeyPair",
            ApiCall::CreateNatGateway => "createNatGateway",
            ApiCall::CreateRoute => "createRoute",
            ApiCall::CreateRouteTable => "createRouteTable",
            ApiCall::CreateSecurityGroup => "createSecurityGroup",
            ApiCall::CreateSnapshot => "createSnapshot",
            ApiCall::CreateSubnet => "createSubnet",
            ApiCall::CreateTags => "createTags",
            ApiCall::CreateVolume => "createVolume",
            ApiCall::CreateVpc => "createVpc",
            ApiCall::DeleteKeyPair => "deleteKeyPair",
            ApiCall::DeleteSubnet => "deleteSubnet",
            ApiCall::DeleteVpc => "deleteVpc",
            ApiCall::DescribeImages => "describeImages",
            ApiCall::DescribeInstanceTypeOfferings => "describeInstanceTypeOfferings",
            ApiCall::DescribeInstances => "describeInstances",
            ApiCall::DescribeKeyPairs => "describeKeyPairs",
            ApiCall::DescribeNatGateways => "describeNatGateways",
            ApiCall::DescribeSecurityGroupRules => "describeSecurityGroupRules",
            ApiCall::DescribeSnapshots => "describeSnapshots",
            ApiCall::DescribeSubnets => "describeSubnets",
            ApiCall::DescribeVolumes => "describeVolumes",
            ApiCall::ModifyInstanceAttribute => "modifyInstanceAttribute",
            ApiCall::ModifySubnetAttribute => "modifySubnetAttribute",
            ApiCall::RebootInstances => "rebootInstances",
            ApiCall::ReleaseAddress => "releaseAddress",
            ApiCall::RevokeSecurityGroupEgress => "revokeSecurityGroupEgress",
            ApiCall::RevokeSecurityGroupIngress => "revokeSecurityGroupIngress",
            ApiCall::RunInstances => "runInstances",
            ApiCall::StartInstances => "startInstances",
            ApiCall::StopInstances => "stopInstances",
            ApiCall::TerminateInstances => "terminateInstances",
        }
    }

    /// The aws CLI subcommand spelling (`createVpc` -> `create-vpc`).
    pub fn cli_name(&self) -> String {
        let mut out = String::new();
        for ch in self.name().chars() {
            if ch.is_ascii_uppercase() {
                out.push('-');
                out.push(ch.to_ascii_lowercase());
            } else {
                out.push(ch);
            }
        }
        out
    }
}

impl std::fmt::Display for ApiCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One caller-facing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AddSecurityGroupRules,
    AllocateAddress,
    AssociateAddress,
    AssociateRouteTable,
    AttachInternetGateway,
    CreateInstance,
    CreateInternetGateway,
    CreateKeyPair,
    CreateNatGateway,
    CreateRoute,
    CreateRouteTable,
    CreateSecurityGroup,
    CreateSnapshot,
    CreateSubnet,
    CreateTags,
    CreateVolume,
    CreateVpc,
    DeleteKeyPair,
    DeleteSubnet,
    DeleteVpc,
    DescribeInstances,
    DescribeKeyPairs,
    ModifyInstanceAttribute,
    ModifyInstanceType,
    ModifySubnetAttribute,
    RebootInstances,
    ReleaseAddress,
    StartInstances,
    StopInstances,
    TerminateInstances,
}

impl Operation {
    pub const ALL: &'static [Operation] = &[
        Operation::AddSecurityGroupRules,
        Operation::AllocateAddress,
        Operation::AssociateAddress,
        Operation::AssociateRouteTable,
        Operation::AttachInternetGateway,
        Operation::CreateInstance,
        Operation::CreateInternetGateway,
        Operation::CreateKeyPair,
        Operation::CreateNatGateway,
        Operation::CreateRoute,
        Operation::CreateRouteTable,
        Operation::CreateSecurityGroup,
        Operation::CreateSnapshot,
        Operation::CreateSubnet,
        Operation::CreateTags,
        Operation::CreateVolume,
        Operation::CreateVpc,
        Operation::DeleteKeyPair,
        Operation::DeleteSubnet,
        Operation::DeleteVpc,
        Operation::DescribeInstances,
        Operation::DescribeKeyPairs,
        Operation::ModifyInstanceAttribute,
        Operation::ModifyInstanceType,
        Operation::ModifySubnetAttribute,
        Operation::RebootInstances,
        Operation::ReleaseAddress,
        Operation::StartInstances,
        Operation::StopInstances,
        Operation::TerminateInstances,
    ];

    /// The CLI-facing operation name.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::AddSecurityGroupRules => "add-security-group-rules",
            Operation::AllocateAddress => "allocate-address",
            Operation::AssociateAddress => "associate-address",
            Operation::AssociateRouteTable => "associate-route-table",
            Operation::AttachInternetGateway => "attach-internet-gateway",
            Operation::CreateInstance => "create-instance",
            Operation::CreateInternetGateway => "create-internet-gateway",
            Operation::CreateKeyPair => "create-key-pair",
            Operation::CreateNatGateway => "create-nat-gateway",
            Operation::CreateRoute => "create-route",
            Operation::CreateRouteTable => "create-route-table",
            Operation::CreateSecurityGroup => "create-security-group",
            Operation::CreateSnapshot => "create-snapshot",
            Operation::CreateSubnet => "create-subnet",
            Operation::CreateTags => "create-tags",
            Operation::CreateVolume => "create-volume",
            Operation::CreateVpc => "create-vpc",
            Operation::DeleteKeyPair => "delete-key-pair",
            Operation::DeleteSubnet => "delete-subnet",
            Operation::DeleteVpc => "delete-vpc",
            Operation::DescribeInstances => "describe-instances",
            Operation::DescribeKeyPairs => "describe-key-pairs",
            Operation::ModifyInstanceAttribute => "modify-instance-attribute",
            Operation::ModifyInstanceType => "modify-instance-type",
            Operation::ModifySubnetAttribute => "modify-subnet-attribute",
            Operation::RebootInstances => "reboot-instances",
            Operation::ReleaseAddress => "release-address",
            Operation::StartInstances => "start-instances",
            Operation::StopInstances => "stop-instances",
            Operation::TerminateInstances => "terminate-instances",
        }
    }

    /// Resolves a CLI operation name. `None` for unsupported names, so a
    /// bad name fails argument parsing instead of surfacing mid-run.
    pub fn parse(name: &str) -> Option<Operation> {
        Self::ALL.iter().copied().find(|op| op.name() == name)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
