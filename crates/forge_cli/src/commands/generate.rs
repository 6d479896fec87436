//! Generate command - Write Terraform for a cluster.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use forge_iac::writer::DEFAULT_OUTPUT_ROOT;
use forge_iac::{OutputWriter, TerraformGenerator};

use super::InputArgs;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output directory (defaults to output/<region>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the document instead of writing it
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,
}

pub fn execute(args: GenerateArgs) -> Result<()> {
    let (config, facts) = args.input.load_validated()?;
    info!("Generating Terraform for cluster: {}", config.cluster_name);

    let document = TerraformGenerator::new()
        .generate(&config, &facts)
        .context("Failed to generate Terraform")?;

    if args.stdout {
        print!("{}", document);
        return Ok(());
    }

    let writer = match args.output {
        Some(dir) => OutputWriter::new(dir),
        None => OutputWriter::for_region(DEFAULT_OUTPUT_ROOT, &config.aws_region),
    };
    let path = writer
        .write(&document)
        .with_context(|| format!("Failed to write {}", writer.target().display()))?;

    println!("✅ Terraform written to {}", path.display());
    Ok(())
}
