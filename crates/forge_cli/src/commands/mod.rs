//! CLI command definitions.
//!
//! Each subcommand reads its inputs, calls into `forge_config` and
//! `forge_iac`, and reports the outcome.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use forge_config::{CloudFacts, ClusterConfig, ConfigReader, ConfigValidator, RawClusterConfig};

pub mod generate;
pub mod subnets;
pub mod validate;

/// Default cluster document.
pub const DEFAULT_CONFIG_FILE: &str = "config.yml";

/// Default cloud facts document.
pub const DEFAULT_FACTS_FILE: &str = "facts.yml";

/// ClusterForge - EKS cluster Terraform generator
#[derive(Parser)]
#[command(name = "forge")]
#[command(version, about = "ClusterForge - EKS cluster Terraform generator")]
#[command(long_about = r#"
ClusterForge reads a cluster document and a cloud facts document and writes
a single Terraform file describing an EKS cluster, its VPC and subnets, and
the IAM roles used to administer it.

COMMANDS:
  generate  → Validate the documents and write output/<region>/main.tf
  validate  → Report every problem in the cluster document
  subnets   → Show how a CIDR block is split across availability zones

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments or unreadable input
  3 - Validation failure
  5 - IaC generation error
"#)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate Terraform for a cluster
    Generate(generate::GenerateArgs),

    /// Validate a cluster document against cloud facts
    Validate(validate::ValidateArgs),

    /// Show the subnet allocation for a CIDR block
    Subnets(subnets::SubnetsArgs),
}

/// Input documents shared by `generate` and `validate`.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Cluster document (.yml, .yaml, .json or .toml)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Cloud facts document
    #[arg(short, long, default_value = DEFAULT_FACTS_FILE)]
    pub facts: PathBuf,
}

impl InputArgs {
    pub fn load(&self) -> Result<(RawClusterConfig, CloudFacts)> {
        let raw = ConfigReader::read_config(&self.config)
            .with_context(|| format!("Failed to read cluster document {}", self.config.display()))?;
        let facts = ConfigReader::read_facts(&self.facts)
            .with_context(|| format!("Failed to read cloud facts {}", self.facts.display()))?;
        Ok((raw, facts))
    }

    /// Load both documents and validate the cluster document.
    pub fn load_validated(&self) -> Result<(ClusterConfig, CloudFacts)> {
        let (raw, facts) = self.load()?;
        let config = ConfigValidator::validate(&raw, &facts)?;
        Ok((config, facts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_defaults() {
        let cli = Cli::try_parse_from(["forge", "generate"]).unwrap();
        match cli.command {
            Commands::Generate(args) => {
                assert_eq!(args.input.config, PathBuf::from("config.yml"));
                assert_eq!(args.input.facts, PathBuf::from("facts.yml"));
                assert!(args.output.is_none());
                assert!(!args.stdout);
            }
            _ => panic!("expected generate"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["forge", "validate", "-c", "c.json", "--verbose"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Validate(args) => assert_eq!(args.input.config, PathBuf::from("c.json")),
            _ => panic!("expected validate"),
        }
    }

    #[test]
    fn test_subnets_parses_zone_list() {
        let cli = Cli::try_parse_from(["forge", "subnets", "--cidr", "10.0.0.0/16", "--zones", "a,b,c"]).unwrap();
        match cli.command {
            Commands::Subnets(args) => {
                assert_eq!(args.cidr.to_string(), "10.0.0.0/16");
                assert_eq!(args.zones, vec!["a", "b", "c"]);
            }
            _ => panic!("expected subnets"),
        }
    }

    #[test]
    fn test_invalid_arguments_rejected() {
        assert!(Cli::try_parse_from(["forge", "subnets", "--cidr", "not-a-cidr", "--zones", "a"]).is_err());
        assert!(Cli::try_parse_from(["forge", "generate", "-v", "-q"]).is_err());
    }
}
