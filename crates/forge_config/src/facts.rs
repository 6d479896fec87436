//! Cloud facts resolved outside of ClusterForge.
//!
//! The lookups behind these lists (regions, zones, instance type offerings,
//! IAM roles, S3 buckets, DynamoDB tables) are performed by whatever produced
//! the facts document. ClusterForge only reads them.

use serde::{Deserialize, Serialize};

/// Already-resolved cloud lookups for one target region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloudFacts {
    /// Every region name the account can use.
    pub regions: Vec<String>,
    /// Availability zones of the target region, in provider order.
    pub availability_zones: Vec<String>,
    /// Instance types offered in the target region.
    pub instance_types: Vec<String>,
    /// Names of IAM roles that already exist.
    pub iam_roles: Vec<String>,
    /// Names of existing S3 buckets.
    pub buckets: Vec<String>,
    /// Existing DynamoDB tables.
    pub lock_tables: Vec<LockTable>,
}

/// DynamoDB table and its partition key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockTable {
    pub name: String,
    pub partition_key: String,
}

impl LockTable {
    pub fn new(name: impl Into<String>, partition_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            partition_key: partition_key.into(),
        }
    }
}

impl CloudFacts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_zones<I, S>(mut self, zones: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.availability_zones = zones.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_instance_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instance_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.iam_roles = roles.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.buckets.push(bucket.into());
        self
    }

    pub fn with_lock_table(mut self, table: LockTable) -> Self {
        self.lock_tables.push(table);
        self
    }

    pub fn has_region(&self, region: &str) -> bool {
        self.regions.iter().any(|r| r == region)
    }

    pub fn has_zone(&self, zone: &str) -> bool {
        self.availability_zones.iter().any(|z| z == zone)
    }

    pub fn offers_instance_type(&self, instance_type: &str) -> bool {
        self.instance_types.iter().any(|t| t == instance_type)
    }

    pub fn role_exists(&self, name: &str) -> bool {
        self.iam_roles.iter().any(|r| r == name)
    }

    /// Existing roles whose name starts with `prefix`.
    pub fn roles_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.iam_roles
            .iter()
            .map(String::as_str)
            .filter(move |r| r.starts_with(prefix))
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.buckets.iter().any(|b| b == bucket)
    }

    pub fn lock_table(&self, name: &str) -> Option<&LockTable> {
        self.lock_tables.iter().find(|t| t.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_with_prefix() {
        let facts = CloudFacts::new().with_roles(["eks-cluster-admin", "eks-node", "ci-runner"]);
        let roles: Vec<_> = facts.roles_with_prefix("eks-").collect();
        assert_eq!(roles, vec!["eks-cluster-admin", "eks-node"]);
        assert!(facts.role_exists("ci-runner"));
        assert!(!facts.role_exists("eks"));
    }

    #[test]
    fn test_lock_table_lookup() {
        let facts = CloudFacts::new().with_lock_table(LockTable::new("tf-locks", "LockID"));
        assert_eq!(facts.lock_table("tf-locks").map(|t| t.partition_key.as_str()), Some("LockID"));
        assert!(facts.lock_table("other").is_none());
    }

    #[test]
    fn test_deserialize_partial_document() {
        let facts: CloudFacts = serde_yaml::from_str("regions: [eu-west-1]\n").unwrap();
        assert!(facts.has_region("eu-west-1"));
        assert!(facts.availability_zones.is_empty());
    }
}
