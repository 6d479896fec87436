//! Error types for IaC generation.

use thiserror::Error;

/// Result type alias for IaC operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur while generating Terraform configuration.
#[derive(Error, Debug)]
pub enum IacError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid cluster config reached the generator: {0}")]
    InvalidConfig(String),

    #[error("Insufficient address space: {cidr} cannot hold two subnets for each of {zones} availability zone(s)")]
    InsufficientAddressSpace { cidr: String, zones: usize },

    #[error("Declaration tree exceeds the maximum nesting depth of {limit}")]
    MaxRecursionExceeded { limit: usize },

    #[error("Unsupported ingress type: {0}")]
    UnsupportedIngressType(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
