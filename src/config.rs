//! Registry configuration
//!
//! Loaded from YAML or JSON, with environment overrides:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `INTENT_DUPLICATE_IDS` | `duplicate_ids` (`replace` / `reject`) |
//! | `INTENT_WARN_DEPRECATED` | `warn_on_deprecated_params` (`true` / `false`) |

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{Error, ErrorContext, Result};

pub const ENV_DUPLICATE_IDS: &str = "INTENT_DUPLICATE_IDS";
pub const ENV_WARN_DEPRECATED: &str = "INTENT_WARN_DEPRECATED";

/// What the registry does when an object is registered under an id already in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateIdPolicy {
    /// Replace the stored object, unindexing it first.
    #[default]
    Replace,
    /// Fail with [`Error::DuplicateId`].
    Reject,
}

impl std::str::FromStr for DuplicateIdPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(DuplicateIdPolicy::Replace),
            "reject" => Ok(DuplicateIdPolicy::Reject),
            other => Err(Error::configuration_with_context(
                format!("unknown duplicate id policy '{}'", other),
                ErrorContext::new()
                    .with_field_path("duplicate_ids")
                    .with_details("expected 'replace' or 'reject'"),
            )),
        }
    }
}

fn default_warn_on_deprecated() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub duplicate_ids: DuplicateIdPolicy,
    /// Log a warning the first time a sender uses a deprecated parameter.
    #[serde(default = "default_warn_on_deprecated")]
    pub warn_on_deprecated_params: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            duplicate_ids: DuplicateIdPolicy::default(),
            warn_on_deprecated_params: default_warn_on_deprecated(),
        }
    }
}

impl RegistryConfig {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a `.yaml`/`.yml` or `.json` file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(Error::configuration_with_context(
                "unsupported configuration file format",
                ErrorContext::new()
                    .with_field_path(path.display().to_string())
                    .with_details("expected .yaml, .yml or .json"),
            )),
        }
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_DUPLICATE_IDS) {
            self.duplicate_ids = value.parse()?;
        }
        if let Some(value) = lookup(ENV_WARN_DEPRECATED) {
            self.warn_on_deprecated_params = parse_bool(&value).ok_or_else(|| {
                Error::configuration_with_context(
                    format!("invalid boolean '{}'", value),
                    ErrorContext::new().with_field_path(ENV_WARN_DEPRECATED),
                )
            })?;
        }
        Ok(self)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, RegistryConfig::default());
        assert_eq!(config.duplicate_ids, DuplicateIdPolicy::Replace);
        assert!(config.warn_on_deprecated_params);
    }

    #[test]
    fn test_yaml_and_json() {
        let yaml = "duplicate_ids: reject\nwarn_on_deprecated_params: false\n";
        let config = RegistryConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.duplicate_ids, DuplicateIdPolicy::Reject);
        assert!(!config.warn_on_deprecated_params);

        let config = RegistryConfig::from_json_str(r#"{"duplicate_ids": "reject"}"#).unwrap();
        assert_eq!(config.duplicate_ids, DuplicateIdPolicy::Reject);
    }

    #[test]
    fn test_invalid_policy() {
        assert!(matches!(
            RegistryConfig::from_yaml_str("duplicate_ids: merge"),
            Err(Error::Yaml(_))
        ));
        assert!(matches!(
            "merge".parse::<DuplicateIdPolicy>(),
            Err(Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let config = RegistryConfig::default()
            .with_overrides(|key| match key {
                ENV_DUPLICATE_IDS => Some("Reject".to_string()),
                ENV_WARN_DEPRECATED => Some("off".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.duplicate_ids, DuplicateIdPolicy::Reject);
        assert!(!config.warn_on_deprecated_params);

        let err = RegistryConfig::default()
            .with_overrides(|key| (key == ENV_WARN_DEPRECATED).then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_WARN_DEPRECATED));
    }

    #[test]
    fn test_from_path() {
        let path = std::env::temp_dir().join(format!(
            "intent_registry_config_{}.yaml",
            std::process::id()
        ));
        std::fs::write(&path, "duplicate_ids: reject\n").unwrap();
        let config = RegistryConfig::from_path(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(config.unwrap().duplicate_ids, DuplicateIdPolicy::Reject);

        let err = RegistryConfig::from_path(std::env::temp_dir().join("missing_config.toml"))
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
