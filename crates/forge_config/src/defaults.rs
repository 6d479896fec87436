//! Default values and allow-lists for cluster documents.

/// VPC block used when the document does not name one.
pub const DEFAULT_CIDR_BLOCK: &str = "10.0.0.0/16";

/// Supported EKS control plane versions, newest first.
pub const VALID_EKS_VERSIONS: &[&str] = &["1.27", "1.26", "1.25", "1.24", "1.23"];

pub const DEFAULT_INGRESS_TYPE: &str = "alb";

pub const DEFAULT_ENVIRONMENT: &str = "dev";

/// Namespace selected by the default Fargate profile.
pub const SYSTEM_NAMESPACE: &str = "kube-system";

pub const DEFAULT_ADMIN_ROLE: &str = "eks-cluster-admin";

pub const DEFAULT_DEVELOPER_ROLE: &str = "eks-cluster-developer";

/// Partition key the S3 backend expects on its lock table.
pub const LOCK_TABLE_PARTITION_KEY: &str = "LockID";

/// AWS VPC prefix length limits.
pub const MIN_VPC_PREFIX: u8 = 16;
pub const MAX_VPC_PREFIX: u8 = 28;

pub const MAX_CLUSTER_NAME_LEN: usize = 100;

/// Newest supported EKS version.
pub fn default_eks_version() -> &'static str {
    VALID_EKS_VERSIONS[0]
}

pub fn default_namespaces() -> Vec<String> {
    vec![SYSTEM_NAMESPACE.to_string()]
}
