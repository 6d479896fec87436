//! Cluster document and facts file reading.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::facts::CloudFacts;
use crate::models::RawClusterConfig;

/// Reader for cluster documents and facts files.
pub struct ConfigReader;

impl ConfigReader {
    /// Read a cluster document.
    pub fn read_config(path: impl AsRef<Path>) -> ConfigResult<RawClusterConfig> {
        let path = path.as_ref();
        debug!("Reading cluster config from {:?}", path);
        Self::read_document(path)
    }

    /// Read a cloud facts file.
    pub fn read_facts(path: impl AsRef<Path>) -> ConfigResult<CloudFacts> {
        let path = path.as_ref();
        debug!("Reading cloud facts from {:?}", path);
        Self::read_document(path)
    }

    /// Parse a cluster document from YAML text.
    pub fn parse_config(content: &str) -> ConfigResult<RawClusterConfig> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parse cloud facts from YAML text.
    pub fn parse_facts(content: &str) -> ConfigResult<CloudFacts> {
        Ok(serde_yaml::from_str(content)?)
    }

    fn read_document<T: DeserializeOwned>(path: &Path) -> ConfigResult<T> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let extension = path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let content = fs::read_to_string(path)?;
        let document = match extension.as_str() {
            "yml" | "yaml" => serde_yaml::from_str(&content)?,
            "json" => serde_json::from_str(&content)?,
            "toml" => toml::from_str(&content)?,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let content = r#"
aws_region: us-east-1
cluster_name: demo
fargate: false
node_groups:
  - name: general
    instance_type: t3.medium
    min_size: 1
    max_size: 3
additional_tags:
  - key: team
    value: infra
"#;

        let raw = ConfigReader::parse_config(content).unwrap();
        assert_eq!(raw.aws_region.as_deref(), Some("us-east-1"));
        assert_eq!(raw.node_groups.as_ref().map(Vec::len), Some(1));
        assert!(raw.cidr_block.is_none());
    }

    #[test]
    fn test_parse_config_rejects_unknown_fields() {
        let result = ConfigReader::parse_config("aws_regoin: us-east-1\n");
        assert!(matches!(result, Err(ConfigError::Yaml(_))));
    }
}
