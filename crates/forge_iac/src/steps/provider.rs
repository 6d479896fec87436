//! AWS provider block.

use crate::hcl::{Body, Declaration, Node};
use crate::provider::AWS_PROVIDER_NAME;

use super::{tags, GenerationContext};

pub fn build(ctx: &GenerationContext<'_>) -> Vec<Declaration> {
    let body = Body::new()
        .with("region", &ctx.config.aws_region)
        .with("default_tags", Node::block(Body::new().with("tags", tags(ctx.config))));

    vec![Declaration::provider(AWS_PROVIDER_NAME, body)]
}
