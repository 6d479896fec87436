//! # forge_iac
//!
//! Terraform generation for ClusterForge.
//!
//! This crate turns a validated [`forge_config::ClusterConfig`] into a single
//! Terraform document describing an EKS cluster, its VPC and subnets, and the
//! IAM roles used to reach it.
//!
//! ## Features
//!
//! - Ordered declaration trees with reference/literal distinction ([`hcl`])
//! - HCL serialization with aligned attributes and a nesting ceiling
//! - Power-of-two subnet allocation, two subnets per availability zone ([`cidr`])
//! - A fixed generation pipeline ([`TerraformGenerator`])
//! - Atomic output writing ([`OutputWriter`])
//!
//! ## Example
//!
//! ```rust,no_run
//! use forge_config::{ConfigReader, ConfigValidator};
//! use forge_iac::{OutputWriter, TerraformGenerator};
//!
//! let raw = ConfigReader::read_config("config.yml").unwrap();
//! let facts = ConfigReader::read_facts("facts.yml").unwrap();
//! let config = ConfigValidator::validate(&raw, &facts).unwrap();
//!
//! let document = TerraformGenerator::new().generate(&config, &facts).unwrap();
//! OutputWriter::for_region("output", &config.aws_region)
//!     .write(&document)
//!     .unwrap();
//! ```

pub mod cidr;
pub mod error;
pub mod generator;
pub mod hcl;
pub mod provider;
pub mod steps;
pub mod writer;

pub use cidr::{allocate, Allocation, SubnetAllocation, SubnetAllocator, SubnetRole};
pub use error::{IacError, IacResult};
pub use generator::{Step, TerraformGenerator};
pub use hcl::{BlockKind, Body, Declaration, HclSerializer, Node, Scalar};
pub use steps::GenerationContext;
pub use writer::OutputWriter;
