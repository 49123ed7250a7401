//! Configuration file loading and process settings.
//!
//! Settings come from command-line flags, environment variables and an
//! optional TOML file (`--config`). The file only supplies defaults; flags
//! and environment variables win. Once built, [`Settings`] is immutable for
//! the lifetime of the process.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Default listen address.
pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
/// Default name of the final incident phase.
pub const DEFAULT_LAST_PHASE: &str = "Done";
/// Default recognised impact types.
pub const DEFAULT_IMPACT_TYPES: &[&str] = &["performance-degration", "connectivity-issues"];

/// Root structure of the optional TOML configuration file.
///
/// ```toml
/// addr = "127.0.0.1:8080"
/// last_phase = "Resolved"
/// impact_types = ["performance-degration", "connectivity-issues"]
///
/// [project]
/// owner = "octocat"
/// number = 3
///
/// [github]
/// api_url = "https://github.example.com/api/graphql"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StatusPageConfig {
    /// Listen address (optional).
    pub addr: Option<String>,
    /// Name of the final phase; must be the last Status option (optional).
    pub last_phase: Option<String>,
    /// Recognised impact types (optional).
    pub impact_types: Option<Vec<String>>,
    /// Project reference (optional).
    pub project: Option<ProjectConfig>,
    /// GitHub API settings (optional).
    pub github: Option<GitHubConfig>,
}

/// `[project]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub owner: Option<String>,
    pub owner_is_org: Option<bool>,
    pub number: Option<u64>,
}

/// `[github]` table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitHubConfig {
    /// GraphQL endpoint (default: public GitHub).
    pub api_url: Option<String>,
}

impl StatusPageConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse status page configuration")
    }

    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn project_owner(&self) -> Option<&str> {
        self.project.as_ref().and_then(|p| p.owner.as_deref())
    }

    pub fn project_owner_is_org(&self) -> Option<bool> {
        self.project.as_ref().and_then(|p| p.owner_is_org)
    }

    pub fn project_number(&self) -> Option<u64> {
        self.project.as_ref().and_then(|p| p.number)
    }

    pub fn api_url(&self) -> Option<&str> {
        self.github.as_ref().and_then(|g| g.api_url.as_deref())
    }
}

/// Project reference as configured by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSettings {
    /// Login of the project owner
    pub owner: String,
    /// Whether the owner is an organization rather than a user
    pub owner_is_org: bool,
    /// Owner-scoped project number
    pub number: u64,
}

/// Fully resolved process settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub addr: String,
    pub project: ProjectSettings,
    /// Name the last Status option must carry
    pub last_phase: String,
    /// Recognised impact types; compared with the Impact Type options at
    /// startup but never enforced
    pub impact_types: Vec<String>,
    pub api_url: String,
}

/// Split a comma-separated list, dropping empty entries.
///
/// ```
/// use statuspage::config::split_list;
///
/// assert_eq!(split_list("a, b,,c"), vec!["a", "b", "c"]);
/// assert!(split_list("").is_empty());
/// ```
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_config() {
        let config = StatusPageConfig::from_toml_str(
            r#"
addr = "127.0.0.1:8080"
last_phase = "Resolved"
impact_types = ["outage"]

[project]
owner = "octocat"
owner_is_org = false
number = 3

[github]
api_url = "https://github.example.com/api/graphql"
"#,
        )
        .unwrap();

        assert_eq!(config.addr.as_deref(), Some("127.0.0.1:8080"));
        assert_eq!(config.last_phase.as_deref(), Some("Resolved"));
        assert_eq!(config.impact_types, Some(vec!["outage".to_string()]));
        assert_eq!(config.project_owner(), Some("octocat"));
        assert_eq!(config.project_owner_is_org(), Some(false));
        assert_eq!(config.project_number(), Some(3));
        assert_eq!(
            config.api_url(),
            Some("https://github.example.com/api/graphql")
        );
    }

    #[test]
    fn test_empty_config_has_no_values() {
        let config = StatusPageConfig::from_toml_str("").unwrap();
        assert!(config.addr.is_none());
        assert!(config.project_owner().is_none());
        assert!(config.project_number().is_none());
        assert!(config.api_url().is_none());
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let result = StatusPageConfig::from_toml_str("[project]\nowner = \"x\"\nnumbr = 1\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[project]\nowner = \"octocat\"\nnumber = 1").unwrap();

        let config = StatusPageConfig::load(file.path()).unwrap();
        assert_eq!(config.project_owner(), Some("octocat"));
    }

    #[test]
    fn test_load_missing_file_names_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");

        let err = StatusPageConfig::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("missing.toml"));
    }

    #[test]
    fn test_split_list_trims_entries() {
        assert_eq!(
            split_list("performance-degration, connectivity-issues"),
            vec!["performance-degration", "connectivity-issues"]
        );
    }
}
