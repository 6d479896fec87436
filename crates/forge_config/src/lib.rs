//! # forge_config
//!
//! Cluster configuration loading and validation for ClusterForge.
//!
//! A cluster document is deserialized into a [`RawClusterConfig`], checked
//! against a set of already-resolved [`CloudFacts`] and turned into an
//! immutable [`ClusterConfig`] with every default filled in. Nothing in this
//! crate talks to a cloud API: facts are plain data handed in by the caller.
//!
//! ## Example
//!
//! ```rust,no_run
//! use forge_config::{ConfigReader, ConfigValidator};
//!
//! let raw = ConfigReader::read_config("config.yml").unwrap();
//! let facts = ConfigReader::read_facts("facts.yml").unwrap();
//!
//! let config = ConfigValidator::validate(&raw, &facts).unwrap();
//! println!("cluster {} in {}", config.cluster_name, config.aws_region);
//! ```

pub mod defaults;
pub mod error;
pub mod facts;
pub mod models;
pub mod reader;
pub mod validator;

pub use error::{ConfigError, ConfigResult};
pub use facts::{CloudFacts, LockTable};
pub use models::*;
pub use reader::ConfigReader;
pub use validator::{ConfigValidator, ValidationReport, Violation};
