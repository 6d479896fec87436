//! Generation steps.
//!
//! Each step reads the [`GenerationContext`] and returns the declarations it
//! contributes. Steps never look anything up themselves; everything they
//! branch on is already in the config, the facts or the allocation.

pub mod cluster;
pub mod header;
pub mod iam;
pub mod ingress;
pub mod network;
pub mod outputs;
pub mod provider;

use forge_config::{ClusterConfig, CloudFacts};

use crate::cidr::Allocation;
use crate::hcl::Body;

/// Read-only inputs shared by all steps of one run.
#[derive(Debug, Clone)]
pub struct GenerationContext<'a> {
    pub config: &'a ClusterConfig,
    pub facts: &'a CloudFacts,
    pub allocation: Allocation,
}

impl<'a> GenerationContext<'a> {
    pub fn new(config: &'a ClusterConfig, facts: &'a CloudFacts, allocation: Allocation) -> Self {
        Self {
            config,
            facts,
            allocation,
        }
    }
}

/// Owner, environment and additional tags.
pub(crate) fn tags(config: &ClusterConfig) -> Body {
    config.tags().into_iter().collect()
}

/// Common tags plus resource specific ones.
pub(crate) fn tags_with<'k>(config: &ClusterConfig, extra: impl IntoIterator<Item = (&'k str, String)>) -> Body {
    let mut body = tags(config);
    for (key, value) in extra {
        body.insert(key, value);
    }
    body
}
