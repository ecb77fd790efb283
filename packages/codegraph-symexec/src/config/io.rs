//! YAML import/export (schema v1)
//!
//! ```yaml
//! version: 1
//! preset: fast
//! overrides:
//!   max_explored_states: 500
//!   checks:
//!     constant_condition: false
//! ```

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use super::symex_config::SymexConfig;
use super::validation::Validatable;
use serde::{Deserialize, Serialize};
use std::path::Path;

const SUPPORTED_VERSIONS: &[u32] = &[1];

/// On-disk configuration document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigExportV1 {
    pub version: u32,
    pub preset: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<ConfigOverrides>,
}

/// Partial override applied on top of a preset
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_explored_states: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_stack_depth: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_block_visits_per_path: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collect_garbage: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isolate_check_panics: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks: Option<CheckTogglesPatch>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckTogglesPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_pointer_dereference: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_disposed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unchecked_argument: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constant_condition: Option<bool>,
}

impl ConfigOverrides {
    fn apply(&self, mut config: SymexConfig) -> SymexConfig {
        if let Some(v) = self.max_explored_states {
            config.max_explored_states = v;
        }
        if let Some(v) = self.max_stack_depth {
            config.max_stack_depth = v;
        }
        if let Some(v) = self.max_block_visits_per_path {
            config.max_block_visits_per_path = v;
        }
        if let Some(v) = self.collect_garbage {
            config.collect_garbage = v;
        }
        if let Some(v) = self.isolate_check_panics {
            config.isolate_check_panics = v;
        }
        if let Some(checks) = &self.checks {
            let toggles = &mut config.checks;
            if let Some(v) = checks.null_pointer_dereference {
                toggles.null_pointer_dereference = v;
            }
            if let Some(v) = checks.object_disposed {
                toggles.object_disposed = v;
            }
            if let Some(v) = checks.unchecked_argument {
                toggles.unchecked_argument = v;
            }
            if let Some(v) = checks.constant_condition {
                toggles.constant_condition = v;
            }
        }
        config
    }

    /// Full override reproducing `config` exactly
    fn from_config(config: &SymexConfig) -> Self {
        Self {
            max_explored_states: Some(config.max_explored_states),
            max_stack_depth: Some(config.max_stack_depth),
            max_block_visits_per_path: Some(config.max_block_visits_per_path),
            collect_garbage: Some(config.collect_garbage),
            isolate_check_panics: Some(config.isolate_check_panics),
            checks: Some(CheckTogglesPatch {
                null_pointer_dereference: Some(config.checks.null_pointer_dereference),
                object_disposed: Some(config.checks.object_disposed),
                unchecked_argument: Some(config.checks.unchecked_argument),
                constant_condition: Some(config.checks.constant_condition),
            }),
        }
    }
}

impl SymexConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        if !SUPPORTED_VERSIONS.contains(&export.version) {
            return Err(ConfigError::UnsupportedVersion {
                found: export.version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }

        let preset = Preset::parse(&export.preset)
            .ok_or_else(|| ConfigError::UnknownPreset(export.preset.clone()))?;

        let mut config = Self::from_preset(preset);
        if let Some(overrides) = &export.overrides {
            config = overrides.apply(config);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from YAML file (v1 schema)
    pub fn from_yaml_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Export as a self-contained YAML document
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: 1,
            preset: Preset::Custom.as_str().to_string(),
            overrides: Some(ConfigOverrides::from_config(self)),
        };
        Ok(serde_yaml::to_string(&export)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_yaml_export_contains_version() {
        let config = SymexConfig::from_preset(Preset::Fast);
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("version: 1"));
        assert!(yaml.contains("preset: custom"));
        assert!(yaml.contains("max_explored_states: 1000"));
    }

    #[test]
    fn test_yaml_export_reloads_identically() {
        let config = SymexConfig::from_preset(Preset::Thorough).max_stack_depth(99);
        let yaml = config.to_yaml().unwrap();
        assert_eq!(SymexConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    #[test]
    fn test_yaml_loading_applies_overrides() {
        let yaml_content = r#"
version: 1
preset: fast
overrides:
  max_explored_states: 500
  checks:
    constant_condition: false
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml_content.as_bytes()).unwrap();

        let config = SymexConfig::from_yaml_file(temp_file.path()).unwrap();
        assert_eq!(config.max_explored_states, 500);
        assert_eq!(config.max_stack_depth, 64);
        assert!(!config.checks.constant_condition);
        assert!(config.checks.null_pointer_dereference);
    }

    #[test]
    fn test_yaml_unsupported_version() {
        let result = SymexConfig::from_yaml_str("version: 2\npreset: fast\n");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::UnsupportedVersion { found: 2, .. }
        ));
    }

    #[test]
    fn test_yaml_missing_version() {
        let result = SymexConfig::from_yaml_str("preset: fast\n");
        assert!(matches!(result.unwrap_err(), ConfigError::Yaml(_)));
    }

    #[test]
    fn test_yaml_unknown_preset() {
        let result = SymexConfig::from_yaml_str("version: 1\npreset: turbo\n");
        assert!(matches!(result.unwrap_err(), ConfigError::UnknownPreset(ref p) if p == "turbo"));
    }

    #[test]
    fn test_yaml_out_of_range_override_is_rejected() {
        let yaml = "version: 1\npreset: balanced\noverrides:\n  max_stack_depth: 0\n";
        assert!(matches!(
            SymexConfig::from_yaml_str(yaml).unwrap_err(),
            ConfigError::Range { .. }
        ));
    }

    #[test]
    fn test_yaml_unknown_override_field_is_rejected() {
        let yaml = "version: 1\npreset: balanced\noverrides:\n  max_states: 10\n";
        assert!(SymexConfig::from_yaml_str(yaml).is_err());
    }
}
