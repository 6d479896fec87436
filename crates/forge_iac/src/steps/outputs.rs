//! Output values for downstream tooling.

use crate::hcl::{Body, Declaration, Node};

use super::cluster::module_output;
use super::network::{PRIVATE_SUBNETS_REF, PUBLIC_SUBNETS_REF, VPC_ID_REF};
use super::GenerationContext;

pub fn build(_ctx: &GenerationContext<'_>) -> Vec<Declaration> {
    let cluster_name = module_output("cluster_name");
    let cluster_endpoint = module_output("cluster_endpoint");

    [
        ("cluster_name", "Name of the EKS cluster", cluster_name.as_str()),
        ("cluster_endpoint", "Endpoint of the EKS control plane", cluster_endpoint.as_str()),
        ("vpc_id", "ID of the cluster VPC", VPC_ID_REF),
        ("private_subnet_ids", "IDs of the private subnets", PRIVATE_SUBNETS_REF),
        ("public_subnet_ids", "IDs of the public subnets", PUBLIC_SUBNETS_REF),
    ]
    .into_iter()
    .map(|(name, description, value)| {
        Declaration::output(
            name,
            Body::new()
                .with("description", description)
                .with("value", Node::reference(value)),
        )
    })
    .collect()
}
