//! Data models for cluster documents.

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};

/// Cluster document as written by the user.
///
/// Every field is optional here so the validator can name whatever is
/// missing instead of failing inside the deserializer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawClusterConfig {
    pub aws_region: Option<String>,
    pub cidr_block: Option<String>,
    pub availability_zones: Option<Vec<String>>,
    pub cluster_name: Option<String>,
    pub eks_version: Option<String>,
    pub fargate: Option<bool>,
    pub node_groups: Option<Vec<RawNodeGroup>>,
    pub cluster_namespaces: Option<Vec<String>>,
    pub ingress_type: Option<String>,
    pub resource_owner: Option<String>,
    pub environment: Option<String>,
    pub additional_tags: Option<Vec<RawTag>>,
    pub bucket_name: Option<String>,
    pub dynamodb_table_name: Option<String>,
    pub cluster_admin_role: Option<String>,
    pub cluster_developer_role: Option<String>,
}

/// Node group entry as written by the user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawNodeGroup {
    pub name: Option<String>,
    pub instance_type: Option<String>,
    pub min_size: Option<i64>,
    pub max_size: Option<i64>,
    pub desired_capacity: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTag {
    pub key: Option<String>,
    pub value: Option<String>,
}

/// Validated cluster configuration.
///
/// Built once by [`crate::ConfigValidator::validate`] and read-only for the
/// rest of the run. All defaults are resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterConfig {
    pub aws_region: String,
    pub cidr_block: Ipv4Net,
    pub availability_zones: Vec<String>,
    pub cluster_name: String,
    pub eks_version: String,
    pub fargate: bool,
    pub node_groups: Vec<NodeGroup>,
    pub cluster_namespaces: Vec<String>,
    pub ingress_type: String,
    pub resource_owner: String,
    pub environment: String,
    pub additional_tags: Vec<Tag>,
    pub bucket_name: String,
    pub dynamodb_table_name: String,
    pub cluster_admin_role: String,
    pub cluster_developer_role: String,
}

impl ClusterConfig {
    /// Resolve the node provisioning mode.
    pub fn node_provisioning(&self) -> NodeProvisioning<'_> {
        if self.fargate {
            NodeProvisioning::Fargate {
                namespaces: &self.cluster_namespaces,
            }
        } else {
            NodeProvisioning::ManagedNodeGroups(&self.node_groups)
        }
    }

    /// Tags applied to every taggable resource, in emission order.
    pub fn tags(&self) -> Vec<(String, String)> {
        let mut tags = vec![
            ("resource_owner".to_string(), self.resource_owner.clone()),
            ("environment".to_string(), self.environment.clone()),
        ];
        tags.extend(
            self.additional_tags
                .iter()
                .map(|t| (t.key.clone(), t.value.clone())),
        );
        tags
    }
}

/// Managed node group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeGroup {
    pub name: String,
    pub instance_type: String,
    pub min_size: u32,
    pub max_size: u32,
    pub desired_capacity: Option<u32>,
}

impl NodeGroup {
    pub fn new(name: impl Into<String>, instance_type: impl Into<String>, min_size: u32, max_size: u32) -> Self {
        Self {
            name: name.into(),
            instance_type: instance_type.into(),
            min_size,
            max_size,
            desired_capacity: None,
        }
    }

    pub fn with_desired(mut self, desired: u32) -> Self {
        self.desired_capacity = Some(desired);
        self
    }

    /// Desired size, falling back to the minimum.
    pub fn desired_size(&self) -> u32 {
        self.desired_capacity.unwrap_or(self.min_size)
    }

    /// Whether `1 <= min <= desired <= max` holds.
    pub fn sizes_consistent(&self) -> bool {
        let desired = self.desired_size();
        self.min_size >= 1 && self.min_size <= self.max_size && desired >= self.min_size && desired <= self.max_size
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Mutually exclusive ways of providing worker capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeProvisioning<'a> {
    ManagedNodeGroups(&'a [NodeGroup]),
    Fargate { namespaces: &'a [String] },
}

/// Supported ingress controllers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IngressType {
    Alb,
}

impl IngressType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngressType::Alb => "alb",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "alb" => Some(IngressType::Alb),
            _ => None,
        }
    }

    pub fn all() -> Vec<Self> {
        vec![IngressType::Alb]
    }
}

impl std::fmt::Display for IngressType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
