//! Provider and module pins for generated configuration.

/// A registry source with a version constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePin {
    pub source: &'static str,
    pub version: &'static str,
}

/// Terraform core version the output is written for.
pub const TERRAFORM_REQUIRED_VERSION: &str = ">= 1.3";

/// Local name of the AWS provider.
pub const AWS_PROVIDER_NAME: &str = "aws";

pub const AWS_PROVIDER: SourcePin = SourcePin {
    source: "hashicorp/aws",
    version: "~> 5.0",
};

/// Community EKS module.
pub const EKS_MODULE: SourcePin = SourcePin {
    source: "terraform-aws-modules/eks/aws",
    version: "~> 19.15",
};

/// Local name of the managed-cluster module block.
pub const EKS_MODULE_NAME: &str = "eks";

/// State object key inside the backend bucket.
pub fn state_key(cluster_name: &str) -> String {
    format!("{}/terraform.tfstate", cluster_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_key() {
        assert_eq!(state_key("demo"), "demo/terraform.tfstate");
    }
}
