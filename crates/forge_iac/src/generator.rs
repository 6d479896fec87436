//! Terraform document generation.

use ipnet::IpNet;
use tracing::{debug, info};

use forge_config::{ClusterConfig, CloudFacts, NodeProvisioning};

use crate::cidr::{Allocation, SubnetAllocator, AWS_MAX_SUBNET_PREFIX};
use crate::error::{IacError, IacResult};
use crate::hcl::{Declaration, HclSerializer};
use crate::steps::{self, GenerationContext};

/// One stage of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Header,
    Provider,
    ManagedCluster,
    Network,
    Ingress,
    Iam,
    Outputs,
}

impl Step {
    /// Canonical execution order.
    pub const PIPELINE: [Step; 7] = [
        Step::Header,
        Step::Provider,
        Step::ManagedCluster,
        Step::Network,
        Step::Ingress,
        Step::Iam,
        Step::Outputs,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Step::Header => "header",
            Step::Provider => "provider",
            Step::ManagedCluster => "managed-cluster",
            Step::Network => "network",
            Step::Ingress => "ingress",
            Step::Iam => "iam",
            Step::Outputs => "outputs",
        }
    }

    pub fn run(&self, ctx: &GenerationContext<'_>) -> IacResult<Vec<Declaration>> {
        match self {
            Step::Header => Ok(steps::header::build(ctx)),
            Step::Provider => Ok(steps::provider::build(ctx)),
            Step::ManagedCluster => Ok(steps::cluster::build(ctx)),
            Step::Network => Ok(steps::network::build(ctx)),
            Step::Ingress => steps::ingress::build(ctx),
            Step::Iam => steps::iam::build(ctx),
            Step::Outputs => Ok(steps::outputs::build(ctx)),
        }
    }
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Turns a validated cluster config into a Terraform document.
pub struct TerraformGenerator {
    serializer: HclSerializer,
    allocator: SubnetAllocator,
    steps: Vec<Step>,
}

impl Default for TerraformGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl TerraformGenerator {
    pub fn new() -> Self {
        Self {
            serializer: HclSerializer::new(),
            allocator: SubnetAllocator::new().with_max_prefix_len(AWS_MAX_SUBNET_PREFIX),
            steps: Step::PIPELINE.to_vec(),
        }
    }

    pub fn with_serializer(mut self, serializer: HclSerializer) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn with_allocator(mut self, allocator: SubnetAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Allocate subnets for the config's VPC block and zones.
    pub fn allocate(&self, config: &ClusterConfig) -> IacResult<Allocation> {
        self.allocator
            .allocate(IpNet::V4(config.cidr_block), &config.availability_zones)
    }

    /// Run every step and collect the declarations in order.
    pub fn declarations(&self, config: &ClusterConfig, facts: &CloudFacts) -> IacResult<Vec<Declaration>> {
        ensure_invariants(config)?;

        let allocation = self.allocate(config)?;
        let ctx = GenerationContext::new(config, facts, allocation);

        let mut declarations = Vec::new();
        for step in &self.steps {
            let produced = step.run(&ctx)?;
            debug!("Step {} produced {} declaration(s)", step, produced.len());
            declarations.extend(produced);
        }
        Ok(declarations)
    }

    /// Generate the full document. Blocks are separated by a blank line.
    pub fn generate(&self, config: &ClusterConfig, facts: &CloudFacts) -> IacResult<String> {
        info!("Generating Terraform for cluster {}", config.cluster_name);

        let declarations = self.declarations(config, facts)?;
        let blocks = declarations
            .iter()
            .map(|d| self.serializer.serialize_declaration(d))
            .collect::<IacResult<Vec<_>>>()?;

        info!("Generated {} block(s)", blocks.len());
        Ok(blocks.join("\n"))
    }
}

/// Re-check what the validator guarantees; a config built by hand can skip it.
fn ensure_invariants(config: &ClusterConfig) -> IacResult<()> {
    let fail = |message: String| Err(IacError::InvalidConfig(message));

    if config.aws_region.trim().is_empty() {
        return fail("aws_region is empty".to_string());
    }
    if config.cluster_name.trim().is_empty() {
        return fail("cluster_name is empty".to_string());
    }
    if config.availability_zones.is_empty() {
        return fail("availability_zones is empty".to_string());
    }

    match config.node_provisioning() {
        NodeProvisioning::ManagedNodeGroups([]) => {
            return fail("node_groups is empty and fargate is disabled".to_string());
        }
        NodeProvisioning::ManagedNodeGroups(groups) => {
            if let Some(group) = groups.iter().find(|g| !g.sizes_consistent()) {
                return fail(format!(
                    "node group '{}' has inconsistent sizes (min {}, desired {}, max {})",
                    group.name,
                    group.min_size,
                    group.desired_size(),
                    group.max_size
                ));
            }
        }
        NodeProvisioning::Fargate { namespaces: [] } => {
            return fail("cluster_namespaces is empty and fargate is enabled".to_string());
        }
        NodeProvisioning::Fargate { .. } => {}
    }

    for tag in &config.additional_tags {
        if tag.key.is_empty() || tag.value.is_empty() {
            return fail(format!("tag '{}' has an empty key or value", tag.key));
        }
    }

    Ok(())
}
