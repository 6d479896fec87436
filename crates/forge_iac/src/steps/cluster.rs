//! Managed EKS cluster module.
//!
//! Worker capacity comes from exactly one of two mutually exclusive shapes:
//! an `eks_managed_node_groups` map keyed by group name, or a single
//! `default` Fargate profile selecting every cluster namespace.

use forge_config::{NodeGroup, NodeProvisioning};

use crate::hcl::{Body, Declaration, Node};
use crate::provider::{EKS_MODULE, EKS_MODULE_NAME};

use super::network::{PRIVATE_SUBNETS_REF, VPC_ID_REF};
use super::{tags, GenerationContext};

pub const NODE_GROUPS_KEY: &str = "eks_managed_node_groups";
pub const FARGATE_PROFILES_KEY: &str = "fargate_profiles";
pub const DEFAULT_FARGATE_PROFILE: &str = "default";

/// Reference to an attribute exported by the cluster module.
pub fn module_output(attribute: &str) -> String {
    format!("module.{}.{}", EKS_MODULE_NAME, attribute)
}

pub fn build(ctx: &GenerationContext<'_>) -> Vec<Declaration> {
    let config = ctx.config;

    let mut args = Body::new()
        .with("cluster_name", &config.cluster_name)
        .with("cluster_version", &config.eks_version)
        .with("cluster_endpoint_public_access", true)
        .with("vpc_id", Node::reference(VPC_ID_REF))
        .with("subnet_ids", Node::reference(PRIVATE_SUBNETS_REF))
        .with("control_plane_subnet_ids", Node::reference(PRIVATE_SUBNETS_REF));

    match config.node_provisioning() {
        NodeProvisioning::ManagedNodeGroups(groups) => {
            args.insert(NODE_GROUPS_KEY, node_groups(groups));
        }
        NodeProvisioning::Fargate { namespaces } => {
            args.insert(FARGATE_PROFILES_KEY, fargate_profiles(namespaces));
        }
    }

    args.insert("tags", tags(config));

    vec![Declaration::module(EKS_MODULE_NAME, EKS_MODULE.source, EKS_MODULE.version, args)]
}

fn node_groups(groups: &[NodeGroup]) -> Body {
    groups
        .iter()
        .map(|group| {
            let body = Body::new()
                .with("min_size", group.min_size)
                .with("max_size", group.max_size)
                .with("desired_size", group.desired_size())
                .with("instance_types", Node::list([group.instance_type.as_str()]));
            (group.name.clone(), body)
        })
        .collect()
}

fn fargate_profiles(namespaces: &[String]) -> Body {
    let selectors = Node::list(
        namespaces
            .iter()
            .map(|namespace| Body::new().with("namespace", namespace)),
    );

    Body::new().with(
        DEFAULT_FARGATE_PROFILE,
        Body::new()
            .with("name", DEFAULT_FARGATE_PROFILE)
            .with("selectors", selectors),
    )
}
