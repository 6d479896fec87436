//! ClusterForge CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or unreadable input
//! - 3: Validation failure
//! - 5: IaC generation error

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use forge_config::ConfigError;
use forge_iac::IacError;

mod commands;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const IAC_ERROR: u8 = 5;
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose {
        "forge=debug"
    } else if cli.quiet {
        "forge=warn"
    } else {
        "forge=info"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("warn,{}", level)));

    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    let result = match cli.command {
        Commands::Generate(args) => commands::generate::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Subnets(args) => commands::subnets::execute(args),
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(err) = cause.downcast_ref::<ConfigError>() {
            return match err {
                ConfigError::Validation(_) => ExitCodes::VALIDATION_FAILURE,
                ConfigError::Io(_) => ExitCodes::GENERAL_ERROR,
                ConfigError::NotFound(_)
                | ConfigError::UnsupportedFormat(_)
                | ConfigError::Yaml(_)
                | ConfigError::Json(_)
                | ConfigError::Toml(_) => ExitCodes::INVALID_ARGS,
            };
        }
        if let Some(err) = cause.downcast_ref::<IacError>() {
            return match err {
                IacError::Io(_) => ExitCodes::GENERAL_ERROR,
                _ => ExitCodes::IAC_ERROR,
            };
        }
    }
    ExitCodes::GENERAL_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use forge_config::ValidationReport;

    #[test]
    fn test_validation_failure_exit_code() {
        let mut report = ValidationReport::new();
        report.add_error("aws_region", "is required");
        let err = anyhow::Error::new(ConfigError::Validation(report));
        assert_eq!(categorize_error(&err), ExitCodes::VALIDATION_FAILURE);
    }

    #[test]
    fn test_exit_code_survives_context() {
        let result: Result<(), IacError> = Err(IacError::MaxRecursionExceeded { limit: 8 });
        let err = result.context("Failed to generate Terraform").unwrap_err();
        assert_eq!(categorize_error(&err), ExitCodes::IAC_ERROR);

        let result: Result<(), ConfigError> = Err(ConfigError::NotFound("config.yml".into()));
        let err = result.context("Failed to read config.yml").unwrap_err();
        assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);
    }

    #[test]
    fn test_unknown_errors_are_general() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(categorize_error(&err), ExitCodes::GENERAL_ERROR);
    }
}
