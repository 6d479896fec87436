//! Validate command - Report problems in a cluster document.

use anyhow::Result;
use clap::Args;
use tracing::info;

use forge_config::{ConfigError, ConfigValidator};

use super::InputArgs;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("Validating cluster document: {}", args.input.config.display());

    let (raw, facts) = args.input.load()?;
    let report = ConfigValidator::check(&raw, &facts);

    println!("📋 Validating {}...", args.input.config.display());

    for warning in &report.warnings {
        println!("   ⚠️  {}", warning);
    }

    if report.valid {
        println!("   ✅ Cluster document is valid");
        return Ok(());
    }

    println!("   ❌ {} error(s) found", report.errors.len());
    Err(ConfigError::Validation(report).into())
}
