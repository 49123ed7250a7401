//! Command-line interface definitions using clap.

use clap::Parser;
use statuspage::config::{
    split_list, DEFAULT_ADDR, DEFAULT_IMPACT_TYPES, DEFAULT_LAST_PHASE,
};
use statuspage::source::github::DEFAULT_ENDPOINT;
use statuspage::{ProjectSettings, Settings, StartupError, StatusPageConfig};
use std::path::PathBuf;

/// Environment variable holding the GitHub access token.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// Status page REST API backed by a GitHub project board
///
/// Every flag can also be given through its environment variable or the
/// TOML file passed with --config; flags win over the environment, which
/// wins over the file. The access token is read from GITHUB_TOKEN.
#[derive(Debug, Parser)]
#[command(name = "statuspage-server", version)]
#[command(about = "Status page REST API backed by a GitHub project board", long_about = None)]
pub struct Args {
    /// Address to listen on [default: 0.0.0.0:3000]
    #[arg(long, env = "STATUSPAGE_ADDR")]
    pub addr: Option<String>,

    /// Login of the user owning the project
    #[arg(long = "github-project-owner", env = "STATUSPAGE_PROJECT_OWNER")]
    pub project_owner: Option<String>,

    /// The project owner is an organization (not supported yet)
    #[arg(long = "github-project-owner-is-org", env = "STATUSPAGE_PROJECT_OWNER_IS_ORG")]
    pub project_owner_is_org: bool,

    /// Owner-scoped project number
    #[arg(long = "github-project-number", env = "STATUSPAGE_PROJECT_NUMBER")]
    pub project_number: Option<u64>,

    /// Comma-separated list of impact types
    #[arg(long, env = "STATUSPAGE_IMPACT_TYPES")]
    pub impact_types: Option<String>,

    /// Final incident phase; must be the last option of the Status field [default: Done]
    #[arg(long, env = "STATUSPAGE_LAST_PHASE")]
    pub last_phase: Option<String>,

    /// GitHub GraphQL endpoint
    #[arg(long, env = "STATUSPAGE_GITHUB_API_URL")]
    pub github_api_url: Option<String>,

    /// Path to a TOML configuration file
    #[arg(long, env = "STATUSPAGE_CONFIG")]
    pub config: Option<PathBuf>,
}

impl Args {
    /// Merge flags over file values and fill in defaults.
    pub fn into_settings(self, file: &StatusPageConfig) -> Result<Settings, StartupError> {
        let owner = self
            .project_owner
            .or_else(|| file.project_owner().map(str::to_string))
            .ok_or_else(|| StartupError::InvalidSettings("project owner is not set".to_string()))?;
        let number = self
            .project_number
            .or_else(|| file.project_number())
            .ok_or_else(|| {
                StartupError::InvalidSettings("project number is not set".to_string())
            })?;

        let impact_types = match self.impact_types {
            Some(list) => split_list(&list),
            None => file.impact_types.clone().unwrap_or_else(|| {
                DEFAULT_IMPACT_TYPES.iter().map(|t| t.to_string()).collect()
            }),
        };

        Ok(Settings {
            addr: self
                .addr
                .or_else(|| file.addr.clone())
                .unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            project: ProjectSettings {
                owner,
                owner_is_org: self.project_owner_is_org
                    || file.project_owner_is_org().unwrap_or(false),
                number,
            },
            last_phase: self
                .last_phase
                .or_else(|| file.last_phase.clone())
                .unwrap_or_else(|| DEFAULT_LAST_PHASE.to_string()),
            impact_types,
            api_url: self
                .github_api_url
                .or_else(|| file.api_url().map(str::to_string))
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        })
    }
}
