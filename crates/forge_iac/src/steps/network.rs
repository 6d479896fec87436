//! VPC, per-zone subnets and the private/public subnet id lists.

use crate::cidr::{SubnetAllocation, SubnetRole};
use crate::hcl::{Body, Declaration, Node};

use super::{tags_with, GenerationContext};

pub const VPC_RESOURCE: &str = "aws_vpc";
pub const SUBNET_RESOURCE: &str = "aws_subnet";
pub const VPC_NAME: &str = "main";

pub const VPC_ID_REF: &str = "aws_vpc.main.id";
pub const PRIVATE_SUBNETS_LOCAL: &str = "private_subnet_ids";
pub const PUBLIC_SUBNETS_LOCAL: &str = "public_subnet_ids";
pub const PRIVATE_SUBNETS_REF: &str = "local.private_subnet_ids";
pub const PUBLIC_SUBNETS_REF: &str = "local.public_subnet_ids";

pub fn build(ctx: &GenerationContext<'_>) -> Vec<Declaration> {
    let config = ctx.config;
    let mut declarations = Vec::with_capacity(ctx.allocation.len() + 2);

    let vpc = Body::new()
        .with("cidr_block", config.cidr_block.to_string())
        .with("enable_dns_hostnames", true)
        .with("enable_dns_support", true)
        .with("tags", tags_with(config, [("Name", format!("{}-vpc", config.cluster_name))]));
    declarations.push(Declaration::resource(VPC_RESOURCE, VPC_NAME, vpc));

    let subnet_ids = |role: SubnetRole| {
        Node::references(
            ctx.allocation
                .with_role(role)
                .map(|s| format!("{}.{}.id", SUBNET_RESOURCE, s.resource_name())),
        )
    };
    declarations.push(Declaration::locals(
        Body::new()
            .with(PRIVATE_SUBNETS_LOCAL, subnet_ids(SubnetRole::Private))
            .with(PUBLIC_SUBNETS_LOCAL, subnet_ids(SubnetRole::Public)),
    ));

    for subnet in ctx.allocation.iter() {
        declarations.push(subnet_declaration(ctx, subnet));
    }

    declarations
}

fn subnet_declaration(ctx: &GenerationContext<'_>, subnet: &SubnetAllocation) -> Declaration {
    let config = ctx.config;
    let role = subnet.role();

    // Tags the AWS load balancer controller uses for subnet discovery.
    let elb_role_tag = match role {
        SubnetRole::Private => "kubernetes.io/role/internal-elb",
        SubnetRole::Public => "kubernetes.io/role/elb",
    };
    let cluster_tag = format!("kubernetes.io/cluster/{}", config.cluster_name);

    let tags = tags_with(
        config,
        [
            ("Name", format!("{}-{}-{}", config.cluster_name, role, subnet.zone)),
            (elb_role_tag, "1".to_string()),
            (cluster_tag.as_str(), "shared".to_string()),
        ],
    );

    let mut body = Body::new()
        .with("vpc_id", Node::reference(VPC_ID_REF))
        .with("cidr_block", subnet.cidr.to_string())
        .with("availability_zone", &subnet.zone);
    if role == SubnetRole::Public {
        body.insert("map_public_ip_on_launch", true);
    }
    body.insert("tags", tags);

    Declaration::resource(SUBNET_RESOURCE, subnet.resource_name(), body)
}
