//! Resolution of the configured project reference to its node id.

use crate::config::ProjectSettings;
use crate::errors::StartupError;
use crate::source::{ProjectRef, ProjectSource};
use tracing::{info, warn};

/// Resolve an owner login and project number to the project's opaque id.
///
/// Runs once at startup; there is no retry. Organisation owners are rejected
/// before any query is issued.
pub fn resolve_project<S: ProjectSource>(
    source: &S,
    settings: &ProjectSettings,
) -> Result<ProjectRef, StartupError> {
    if settings.owner_is_org {
        return Err(StartupError::UnsupportedOwnerKind {
            owner: settings.owner.clone(),
        });
    }
    if settings.owner.trim().is_empty() {
        return Err(StartupError::InvalidSettings(
            "project owner login must not be empty".to_string(),
        ));
    }
    if settings.number == 0 {
        return Err(StartupError::InvalidSettings(
            "project number must be positive".to_string(),
        ));
    }

    let project = source.find_user_project(&settings.owner, settings.number)?;

    if project.number != settings.number {
        warn!(
            "Project {}/{} echoed number {}",
            settings.owner, settings.number, project.number
        );
    }
    info!(
        "Resolved project {}/{} to {}",
        settings.owner, settings.number, project.id
    );

    Ok(project)
}
