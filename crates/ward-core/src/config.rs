//! Project configuration loaded from `.ward/config.toml`.
//!
//! Every field has a serde default so a partial (or absent) file still
//! yields a working configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::model::department::Department;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub rank: RankConfig,
    #[serde(default)]
    pub disclosure: DisclosureConfig,
    #[serde(default)]
    pub intake: IntakeConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            rank: RankConfig::default(),
            disclosure: DisclosureConfig::default(),
            intake: IntakeConfig::default(),
        }
    }
}

/// Periodic rescoring cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankConfig {
    #[serde(default = "default_rescore_interval_secs")]
    pub rescore_interval_secs: u64,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            rescore_interval_secs: default_rescore_interval_secs(),
        }
    }
}

/// Public disclosure posting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisclosureConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for DisclosureConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

/// Citizen report intake defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Department used when a report names none.
    #[serde(default)]
    pub default_department: Option<Department>,
}

impl ProjectConfig {
    /// Load the config file, falling back to defaults when it is absent.
    ///
    /// # Errors
    ///
    /// Returns an error when the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parse config {}", path.display()))
    }

    /// Serialize the config to TOML, used by `wd init` to seed the file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("serialize config")
    }
}

fn default_rescore_interval_secs() -> u64 {
    300
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::ProjectConfig;
    use crate::model::department::Department;

    #[test]
    fn defaults_are_stable() {
        let config = ProjectConfig::default();
        assert_eq!(config.rank.rescore_interval_secs, 300);
        assert!(config.disclosure.enabled);
        assert!(config.intake.default_department.is_none());
    }

    #[test]
    fn partial_file_fills_missing_sections() {
        let config: ProjectConfig =
            toml::from_str("[intake]\ndefault_department = \"water\"\n").expect("parse");
        assert_eq!(config.intake.default_department, Some(Department::Water));
        assert_eq!(config.rank.rescore_interval_secs, 300);
        assert!(config.disclosure.enabled);
    }

    #[test]
    fn toml_roundtrips() {
        let config = ProjectConfig::default();
        let text = config.to_toml().expect("serialize");
        let back: ProjectConfig = toml::from_str(&text).expect("parse");
        assert_eq!(
            back.rank.rescore_interval_secs,
            config.rank.rescore_interval_secs
        );
    }
}
