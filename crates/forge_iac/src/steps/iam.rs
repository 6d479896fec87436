//! Cluster admin and developer roles.
//!
//! Each logical role gets a policy. When a role with the resolved name is
//! already present in the cloud facts the policy is attached to it;
//! otherwise a new role trusting the account root is declared.

use serde_json::json;
use tracing::debug;

use forge_config::ClusterConfig;

use crate::error::IacResult;
use crate::hcl::{Body, Declaration, Node};

use super::cluster::module_output;
use super::{tags, GenerationContext};

const CALLER_IDENTITY: &str = "aws_caller_identity";
const CALLER_IDENTITY_NAME: &str = "current";

/// The two roles every cluster gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterRole {
    Admin,
    Developer,
}

impl ClusterRole {
    pub fn all() -> [ClusterRole; 2] {
        [ClusterRole::Admin, ClusterRole::Developer]
    }

    /// Terraform local name.
    pub fn local_name(&self) -> &'static str {
        match self {
            ClusterRole::Admin => "cluster_admin",
            ClusterRole::Developer => "cluster_developer",
        }
    }

    /// IAM role name from the config, which already carries the default.
    pub fn role_name<'a>(&self, config: &'a ClusterConfig) -> &'a str {
        match self {
            ClusterRole::Admin => &config.cluster_admin_role,
            ClusterRole::Developer => &config.cluster_developer_role,
        }
    }

    fn statement_id(&self) -> &'static str {
        match self {
            ClusterRole::Admin => "ClusterAdmin",
            ClusterRole::Developer => "ClusterDeveloper",
        }
    }

    fn actions(&self) -> &'static [&'static str] {
        match self {
            ClusterRole::Admin => &["eks:*"],
            ClusterRole::Developer => &[
                "eks:AccessKubernetesApi",
                "eks:DescribeCluster",
                "eks:DescribeNodegroup",
                "eks:ListClusters",
                "eks:ListNodegroups",
            ],
        }
    }

    fn policy_ref(&self) -> String {
        format!("aws_iam_policy.{}.arn", self.local_name())
    }
}

pub fn build(ctx: &GenerationContext<'_>) -> IacResult<Vec<Declaration>> {
    let config = ctx.config;
    let mut declarations = Vec::new();

    let missing: Vec<ClusterRole> = ClusterRole::all()
        .into_iter()
        .filter(|role| !ctx.facts.role_exists(role.role_name(config)))
        .collect();

    if !missing.is_empty() {
        declarations.push(Declaration::data(CALLER_IDENTITY, CALLER_IDENTITY_NAME, Body::new()));
    }

    for role in ClusterRole::all() {
        declarations.push(policy_document(role));
        declarations.push(policy(config, role));

        if missing.contains(&role) {
            debug!("Role {} not found, declaring it", role.role_name(config));
            declarations.push(new_role(config, role)?);
        } else {
            debug!("Role {} exists, attaching policy", role.role_name(config));
            declarations.push(attachment(config, role));
        }
    }

    Ok(declarations)
}

fn policy_document(role: ClusterRole) -> Declaration {
    let statement = Body::new()
        .with("sid", role.statement_id())
        .with("effect", "Allow")
        .with("actions", Node::list(role.actions().iter().copied()))
        .with("resources", Node::references([module_output("cluster_arn")]));

    Declaration::data(
        "aws_iam_policy_document",
        role.local_name(),
        Body::new().with("statement", Node::block(statement)),
    )
}

fn policy(config: &ClusterConfig, role: ClusterRole) -> Declaration {
    let body = Body::new()
        .with("name", format!("{}-{}", config.cluster_name, role.local_name().replace('_', "-")))
        .with(
            "policy",
            Node::reference(format!("data.aws_iam_policy_document.{}.json", role.local_name())),
        )
        .with("tags", tags(config));

    Declaration::resource("aws_iam_policy", role.local_name(), body)
}

fn attachment(config: &ClusterConfig, role: ClusterRole) -> Declaration {
    let body = Body::new()
        .with("role", role.role_name(config))
        .with("policy_arn", Node::reference(role.policy_ref()));

    Declaration::resource("aws_iam_role_policy_attachment", role.local_name(), body)
}

fn new_role(config: &ClusterConfig, role: ClusterRole) -> IacResult<Declaration> {
    let body = Body::new()
        .with("name", role.role_name(config))
        .with("assume_role_policy", trust_policy()?)
        .with("managed_policy_arns", Node::references([role.policy_ref()]))
        .with("tags", tags(config));

    Ok(Declaration::resource("aws_iam_role", role.local_name(), body))
}

/// Lets principals of the current account assume the role.
fn trust_policy() -> IacResult<String> {
    let document = json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Effect": "Allow",
            "Action": "sts:AssumeRole",
            "Principal": {
                "AWS": format!(
                    "arn:aws:iam::${{data.{}.{}.account_id}}:root",
                    CALLER_IDENTITY, CALLER_IDENTITY_NAME
                ),
            },
        }],
    });
    Ok(serde_json::to_string(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trust_policy_references_caller_identity() {
        let policy = trust_policy().unwrap();
        assert!(policy.contains("sts:AssumeRole"));
        assert!(policy.contains("arn:aws:iam::${data.aws_caller_identity.current.account_id}:root"));
    }
}
