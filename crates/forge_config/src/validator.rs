//! Cluster document validation.
//!
//! Every rule runs, and every violation is recorded against the field that
//! caused it. A [`ClusterConfig`] is only produced when no error was found.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use ipnet::Ipv4Net;
use regex::Regex;
use tracing::{debug, warn};

use crate::defaults::{
    default_eks_version, default_namespaces, DEFAULT_ADMIN_ROLE, DEFAULT_CIDR_BLOCK,
    DEFAULT_DEVELOPER_ROLE, DEFAULT_ENVIRONMENT, DEFAULT_INGRESS_TYPE, LOCK_TABLE_PARTITION_KEY,
    MAX_CLUSTER_NAME_LEN, MAX_VPC_PREFIX, MIN_VPC_PREFIX, VALID_EKS_VERSIONS,
};
use crate::error::{ConfigError, ConfigResult};
use crate::facts::CloudFacts;
use crate::models::{ClusterConfig, IngressType, NodeGroup, RawClusterConfig, RawNodeGroup, RawTag, Tag};

/// Tag keys the generator sets itself.
const RESERVED_TAG_KEYS: &[&str] = &["resource_owner", "environment", "Name"];

/// A single problem with a named field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Outcome of validating a cluster document.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<Violation>,
    pub warnings: Vec<Violation>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(Violation {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(Violation {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Whether any error names `field`.
    pub fn has_error_for(&self, field: &str) -> bool {
        self.errors.iter().any(|v| v.field == field)
    }
}

impl Default for ValidationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for error in &self.errors {
            writeln!(f, "  - {}", error)?;
        }
        Ok(())
    }
}

/// Validator for cluster documents.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate a document and resolve its defaults.
    pub fn validate(raw: &RawClusterConfig, facts: &CloudFacts) -> ConfigResult<ClusterConfig> {
        let (report, config) = Self::run(raw, facts);
        for warning in &report.warnings {
            warn!("{}", warning);
        }
        match config {
            Some(config) if report.valid => Ok(config),
            _ => Err(ConfigError::Validation(report)),
        }
    }

    /// Collect every violation without building a config.
    pub fn check(raw: &RawClusterConfig, facts: &CloudFacts) -> ValidationReport {
        Self::run(raw, facts).0
    }

    fn run(raw: &RawClusterConfig, facts: &CloudFacts) -> (ValidationReport, Option<ClusterConfig>) {
        let mut report = ValidationReport::new();

        let aws_region = Self::validate_region(&mut report, raw, facts);
        let cidr_block = Self::validate_cidr(&mut report, raw);
        let availability_zones = Self::validate_zones(&mut report, raw, facts);
        let cluster_name = Self::validate_cluster_name(&mut report, raw);
        let eks_version = Self::validate_eks_version(&mut report, raw);
        let fargate = raw.fargate.unwrap_or(false);
        let node_groups = Self::validate_node_groups(&mut report, raw, facts, fargate);
        let cluster_namespaces = Self::validate_namespaces(&mut report, raw);
        let ingress_type = Self::validate_ingress_type(&mut report, raw);
        let resource_owner = required(&mut report, "resource_owner", &raw.resource_owner);
        let environment = optional(&mut report, "environment", &raw.environment, DEFAULT_ENVIRONMENT);
        let additional_tags = Self::validate_tags(&mut report, raw);
        let bucket_name = Self::validate_bucket(&mut report, raw, facts);
        let dynamodb_table_name = Self::validate_lock_table(&mut report, raw, facts);
        let cluster_admin_role =
            optional(&mut report, "cluster_admin_role", &raw.cluster_admin_role, DEFAULT_ADMIN_ROLE);
        let cluster_developer_role = optional(
            &mut report,
            "cluster_developer_role",
            &raw.cluster_developer_role,
            DEFAULT_DEVELOPER_ROLE,
        );
        for (field, role) in [
            ("cluster_admin_role", &cluster_admin_role),
            ("cluster_developer_role", &cluster_developer_role),
        ] {
            if let Some(role) = role {
                Self::check_role(&mut report, field, role, facts);
            }
        }

        debug!(
            "Validated cluster document: {} error(s), {} warning(s)",
            report.errors.len(),
            report.warnings.len()
        );

        let config = (|| {
            Some(ClusterConfig {
                aws_region: aws_region?,
                cidr_block: cidr_block?,
                availability_zones: availability_zones?,
                cluster_name: cluster_name?,
                eks_version: eks_version?,
                fargate,
                node_groups: node_groups?,
                cluster_namespaces: cluster_namespaces?,
                ingress_type: ingress_type?,
                resource_owner: resource_owner?,
                environment: environment?,
                additional_tags: additional_tags?,
                bucket_name: bucket_name?,
                dynamodb_table_name: dynamodb_table_name?,
                cluster_admin_role: cluster_admin_role?,
                cluster_developer_role: cluster_developer_role?,
            })
        })();

        // Every rule that rejects a value records an error for it.
        if config.is_none() && report.valid {
            report.add_error("cluster document", "could not be resolved into a cluster configuration");
        }

        (report, config)
    }

    /// A missing role is declared by the generator. Warn when roles that
    /// extend its name already exist, since one of them may be the intended one.
    fn check_role(report: &mut ValidationReport, field: &str, role: &str, facts: &CloudFacts) {
        if facts.role_exists(role) {
            return;
        }
        let similar: Vec<&str> = facts.roles_with_prefix(role).collect();
        if !similar.is_empty() {
            report.add_warning(
                field,
                format!(
                    "role '{}' does not exist and will be created (existing roles with this prefix: {})",
                    role,
                    similar.join(", ")
                ),
            );
        }
    }

    fn validate_region(report: &mut ValidationReport, raw: &RawClusterConfig, facts: &CloudFacts) -> Option<String> {
        let region = required(report, "aws_region", &raw.aws_region)?;
        if !facts.has_region(&region) {
            report.add_error("aws_region", format!("'{}' is not a known AWS region", region));
            return None;
        }
        Some(region)
    }

    fn validate_cidr(report: &mut ValidationReport, raw: &RawClusterConfig) -> Option<Ipv4Net> {
        let text = raw.cidr_block.as_deref().unwrap_or(DEFAULT_CIDR_BLOCK).trim();
        let net: Ipv4Net = match text.parse() {
            Ok(net) => net,
            Err(_) => {
                report.add_error("cidr_block", format!("'{}' is not a valid IPv4 CIDR block", text));
                return None;
            }
        };

        if net != net.trunc() {
            report.add_error(
                "cidr_block",
                format!("'{}' has host bits set (network address is {})", net, net.trunc()),
            );
            return None;
        }

        if !(MIN_VPC_PREFIX..=MAX_VPC_PREFIX).contains(&net.prefix_len()) {
            report.add_error(
                "cidr_block",
                format!(
                    "prefix length /{} is outside the VPC range /{}../{}",
                    net.prefix_len(),
                    MIN_VPC_PREFIX,
                    MAX_VPC_PREFIX
                ),
            );
            return None;
        }

        Some(net)
    }

    fn validate_zones(report: &mut ValidationReport, raw: &RawClusterConfig, facts: &CloudFacts) -> Option<Vec<String>> {
        let zones = match &raw.availability_zones {
            Some(zones) => zones.clone(),
            None => {
                debug!("No availability zones given, using the {} known to the region", facts.availability_zones.len());
                facts.availability_zones.clone()
            }
        };

        if zones.is_empty() {
            report.add_error("availability_zones", "at least one availability zone is required");
            return None;
        }

        let mut seen = HashSet::new();
        let mut ok = true;
        for (i, zone) in zones.iter().enumerate() {
            let field = format!("availability_zones[{}]", i);
            if !facts.has_zone(zone) {
                report.add_error(field, format!("'{}' is not an availability zone of the region", zone));
                ok = false;
            } else if !seen.insert(zone.as_str()) {
                report.add_error(field, format!("'{}' is listed more than once", zone));
                ok = false;
            }
        }

        ok.then_some(zones)
    }

    fn validate_cluster_name(report: &mut ValidationReport, raw: &RawClusterConfig) -> Option<String> {
        let name = required(report, "cluster_name", &raw.cluster_name)?;
        if name.len() > MAX_CLUSTER_NAME_LEN {
            report.add_error(
                "cluster_name",
                format!("must be at most {} characters", MAX_CLUSTER_NAME_LEN),
            );
            return None;
        }
        if !cluster_name_pattern().is_match(&name) {
            report.add_error(
                "cluster_name",
                format!("'{}' must start with a letter or digit and contain only letters, digits, '-' and '_'", name),
            );
            return None;
        }
        Some(name)
    }

    fn validate_eks_version(report: &mut ValidationReport, raw: &RawClusterConfig) -> Option<String> {
        let version = raw.eks_version.as_deref().unwrap_or(default_eks_version()).trim();
        if !VALID_EKS_VERSIONS.contains(&version) {
            report.add_error(
                "eks_version",
                format!("'{}' is not supported (expected one of {})", version, VALID_EKS_VERSIONS.join(", ")),
            );
            return None;
        }
        Some(version.to_string())
    }

    fn validate_node_groups(
        report: &mut ValidationReport,
        raw: &RawClusterConfig,
        facts: &CloudFacts,
        fargate: bool,
    ) -> Option<Vec<NodeGroup>> {
        let groups = raw.node_groups.as_deref().unwrap_or_default();

        if fargate {
            if !groups.is_empty() {
                report.add_warning("node_groups", "ignored because fargate is enabled");
            }
            return Some(Vec::new());
        }

        if groups.is_empty() {
            report.add_error("node_groups", "at least one node group is required when fargate is disabled");
            return None;
        }

        let mut names = HashSet::new();
        let mut validated = Vec::with_capacity(groups.len());
        for (i, group) in groups.iter().enumerate() {
            if let Some(group) = Self::validate_node_group(report, i, group, facts) {
                if !names.insert(group.name.clone()) {
                    report.add_error(
                        format!("node_groups[{}].name", i),
                        format!("'{}' is used by more than one node group", group.name),
                    );
                    continue;
                }
                validated.push(group);
            }
        }

        (validated.len() == groups.len()).then_some(validated)
    }

    fn validate_node_group(
        report: &mut ValidationReport,
        index: usize,
        group: &RawNodeGroup,
        facts: &CloudFacts,
    ) -> Option<NodeGroup> {
        let field = |name: &str| format!("node_groups[{}].{}", index, name);

        let name = required(report, &field("name"), &group.name);
        let instance_type = required(report, &field("instance_type"), &group.instance_type).and_then(|t| {
            if facts.offers_instance_type(&t) {
                Some(t)
            } else {
                report.add_error(field("instance_type"), format!("'{}' is not offered in the region", t));
                None
            }
        });

        let min_size = match group.min_size {
            None => {
                report.add_error(field("min_size"), "is required");
                None
            }
            Some(min) => group_size(report, &field("min_size"), min),
        };

        let max_size = match group.max_size {
            None => {
                report.add_error(field("max_size"), "is required");
                None
            }
            Some(max) => group_size(report, &field("max_size"), max).and_then(|max| match min_size {
                Some(min) if max < min => {
                    report.add_error(
                        field("max_size"),
                        format!("must be greater than or equal to min_size {} (got {})", min, max),
                    );
                    None
                }
                _ => Some(max),
            }),
        };

        let desired_capacity = match group.desired_capacity {
            None => Some(None),
            Some(desired) => group_size(report, &field("desired_capacity"), desired).and_then(|desired| {
                match (min_size, max_size) {
                    (Some(min), Some(max)) if desired < min || desired > max => {
                        report.add_error(
                            field("desired_capacity"),
                            format!("must be between {} and {} (got {})", min, max, desired),
                        );
                        None
                    }
                    _ => Some(Some(desired)),
                }
            }),
        };

        Some(NodeGroup {
            name: name?,
            instance_type: instance_type?,
            min_size: min_size?,
            max_size: max_size?,
            desired_capacity: desired_capacity?,
        })
    }

    fn validate_namespaces(report: &mut ValidationReport, raw: &RawClusterConfig) -> Option<Vec<String>> {
        let namespaces = raw.cluster_namespaces.clone().unwrap_or_else(default_namespaces);
        if namespaces.is_empty() {
            report.add_error("cluster_namespaces", "at least one namespace is required");
            return None;
        }

        let mut seen = HashSet::new();
        let mut ok = true;
        for (i, namespace) in namespaces.iter().enumerate() {
            let field = format!("cluster_namespaces[{}]", i);
            if namespace.len() > 63 || !namespace_pattern().is_match(namespace) {
                report.add_error(field, format!("'{}' is not a valid Kubernetes namespace name", namespace));
                ok = false;
            } else if !seen.insert(namespace.as_str()) {
                report.add_error(field, format!("'{}' is listed more than once", namespace));
                ok = false;
            }
        }

        ok.then_some(namespaces)
    }

    fn validate_ingress_type(report: &mut ValidationReport, raw: &RawClusterConfig) -> Option<String> {
        let value = raw.ingress_type.as_deref().unwrap_or(DEFAULT_INGRESS_TYPE).trim();
        match IngressType::from_str(value) {
            Some(ingress) => Some(ingress.as_str().to_string()),
            None => {
                report.add_error(
                    "ingress_type",
                    format!(
                        "'{}' is not supported (expected one of {})",
                        value,
                        IngressType::all().iter().map(IngressType::as_str).collect::<Vec<_>>().join(", ")
                    ),
                );
                None
            }
        }
    }

    fn validate_tags(report: &mut ValidationReport, raw: &RawClusterConfig) -> Option<Vec<Tag>> {
        let tags: &[RawTag] = raw.additional_tags.as_deref().unwrap_or_default();
        let mut keys = HashSet::new();
        let mut validated = Vec::with_capacity(tags.len());

        for (i, tag) in tags.iter().enumerate() {
            let key = required(report, &format!("additional_tags[{}].key", i), &tag.key);
            let value = required(report, &format!("additional_tags[{}].value", i), &tag.value);
            let (Some(key), Some(value)) = (key, value) else {
                continue;
            };

            if RESERVED_TAG_KEYS.contains(&key.as_str()) {
                report.add_error(
                    format!("additional_tags[{}].key", i),
                    format!("'{}' is set by the generator and cannot be overridden", key),
                );
                continue;
            }
            if !keys.insert(key.clone()) {
                report.add_error(
                    format!("additional_tags[{}].key", i),
                    format!("'{}' is used by more than one tag", key),
                );
                continue;
            }
            validated.push(Tag { key, value });
        }

        (validated.len() == tags.len()).then_some(validated)
    }

    fn validate_bucket(report: &mut ValidationReport, raw: &RawClusterConfig, facts: &CloudFacts) -> Option<String> {
        let bucket = required(report, "bucket_name", &raw.bucket_name)?;
        if !facts.has_bucket(&bucket) {
            report.add_error("bucket_name", format!("state bucket '{}' does not exist", bucket));
            return None;
        }
        Some(bucket)
    }

    fn validate_lock_table(
        report: &mut ValidationReport,
        raw: &RawClusterConfig,
        facts: &CloudFacts,
    ) -> Option<String> {
        let name = required(report, "dynamodb_table_name", &raw.dynamodb_table_name)?;
        match facts.lock_table(&name) {
            None => {
                report.add_error("dynamodb_table_name", format!("lock table '{}' does not exist", name));
                None
            }
            Some(table) if table.partition_key != LOCK_TABLE_PARTITION_KEY => {
                report.add_error(
                    "dynamodb_table_name",
                    format!(
                        "lock table '{}' has partition key '{}', expected '{}'",
                        name, table.partition_key, LOCK_TABLE_PARTITION_KEY
                    ),
                );
                None
            }
            Some(_) => Some(name),
        }
    }
}

/// Node group size: at least 1 and representable as `u32`.
fn group_size(report: &mut ValidationReport, field: &str, value: i64) -> Option<u32> {
    if value < 1 {
        report.add_error(field, format!("must be at least 1 (got {})", value));
        return None;
    }
    match u32::try_from(value) {
        Ok(size) => Some(size),
        Err(_) => {
            report.add_error(field, format!("must be at most {} (got {})", u32::MAX, value));
            None
        }
    }
}

/// Required, non-blank string field.
fn required(report: &mut ValidationReport, field: &str, value: &Option<String>) -> Option<String> {
    match value.as_deref().map(str::trim) {
        None => {
            report.add_error(field, "is required");
            None
        }
        Some("") => {
            report.add_error(field, "cannot be empty");
            None
        }
        Some(value) => Some(value.to_string()),
    }
}

/// Optional string field with a default; blank values are rejected.
fn optional(report: &mut ValidationReport, field: &str, value: &Option<String>, default: &str) -> Option<String> {
    match value {
        None => Some(default.to_string()),
        Some(_) => required(report, field, value),
    }
}

fn cluster_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9A-Za-z][A-Za-z0-9_-]*$").expect("cluster name pattern"))
}

fn namespace_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("namespace pattern"))
}
