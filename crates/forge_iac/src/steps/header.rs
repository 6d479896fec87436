//! Root `terraform` block: version constraints and the S3 backend.

use crate::hcl::{Body, Declaration, Node};
use crate::provider::{state_key, AWS_PROVIDER, AWS_PROVIDER_NAME, TERRAFORM_REQUIRED_VERSION};

use super::GenerationContext;

pub fn build(ctx: &GenerationContext<'_>) -> Vec<Declaration> {
    let config = ctx.config;

    let required_providers = Body::new().with(
        AWS_PROVIDER_NAME,
        Body::new()
            .with("source", AWS_PROVIDER.source)
            .with("version", AWS_PROVIDER.version),
    );

    let backend = Body::new()
        .with("bucket", &config.bucket_name)
        .with("key", state_key(&config.cluster_name))
        .with("region", &config.aws_region)
        .with("dynamodb_table", &config.dynamodb_table_name)
        .with("encrypt", true);

    vec![Declaration::terraform(
        Body::new()
            .with("required_version", TERRAFORM_REQUIRED_VERSION)
            .with("required_providers", Node::block(required_providers))
            .with("backend \"s3\"", Node::block(backend)),
    )]
}
