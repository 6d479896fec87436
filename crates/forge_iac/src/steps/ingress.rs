//! Ingress controller resources.
//!
//! The ALB controller is installed through the cluster API once the cluster
//! exists, so it contributes nothing to the Terraform document. New ingress
//! kinds plug in here.

use tracing::debug;

use forge_config::IngressType;

use crate::error::{IacError, IacResult};
use crate::hcl::Declaration;

use super::GenerationContext;

pub fn build(ctx: &GenerationContext<'_>) -> IacResult<Vec<Declaration>> {
    let ingress_type = &ctx.config.ingress_type;
    let ingress = IngressType::from_str(ingress_type)
        .ok_or_else(|| IacError::UnsupportedIngressType(ingress_type.clone()))?;

    match ingress {
        IngressType::Alb => {
            debug!("ALB ingress is installed after provisioning, no declarations emitted");
            Ok(Vec::new())
        }
    }
}
