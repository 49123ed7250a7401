//! Startup errors and their diagnostics.
//!
//! Resolving the project and validating its configuration both happen once
//! before the server starts listening. Any failure there is fatal, so each
//! variant of [`StartupError`] names the failed check with the expected and
//! actual values, and can be rendered as a [`Diagnostic`] with hints on how
//! to fix the project board.

use crate::labels::COMPONENT_PREFIX;
use crate::source::SourceError;
use std::fmt;
use thiserror::Error;

/// Fatal conditions detected before serving.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Organisation-owned projects cannot be resolved yet
    #[error("Project owner '{owner}' is an organization; organization-owned projects are not supported")]
    UnsupportedOwnerKind { owner: String },
    /// Project settings are unusable before any query is made
    #[error("Invalid project settings: {0}")]
    InvalidSettings(String),
    /// The upstream query failed
    #[error(transparent)]
    Transport(#[from] SourceError),
    #[error("Expected components (labels prefixed 'component:'), got none")]
    MissingComponents,
    #[error("Expected phases encoded as options of field \"Status\"; not having any")]
    MissingPhases,
    #[error("Expected final phase to be \"{expected}\"; is \"{actual}\"")]
    TerminalPhaseMismatch { expected: String, actual: String },
    #[error("Expected impact types encoded as options of field \"Impact Type\"; not having any")]
    MissingImpactTypes,
    #[error("Expected field \"{field}\" to be \"{expected}\"; is \"{actual}\"")]
    FieldTypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },
}

impl StartupError {
    /// Attach possible causes and fixes for display on stderr.
    pub fn diagnostic(&self) -> Diagnostic {
        let error = Diagnostic::new(self.to_string());
        match self {
            StartupError::UnsupportedOwnerKind { .. } => error
                .fix("Move the project to a user account")
                .fix("Run without --github-project-owner-is-org if the owner is a user"),
            StartupError::InvalidSettings(_) => error
                .fix("Pass --github-project-owner and --github-project-number")
                .fix("Or set them in the [project] table of the config file"),
            StartupError::Transport(_) => error
                .cause("GITHUB_TOKEN may be missing, expired or lack the read:project scope")
                .cause("The owner login or project number may be wrong")
                .cause("The GraphQL endpoint may be unreachable")
                .fix("Check the token: gh auth status")
                .fix("Open https://github.com/users/<owner>/projects/<number> to verify the project"),
            StartupError::MissingComponents => error
                .cause("No repository is linked to the project")
                .cause(format!(
                    "Linked repositories have no label starting with '{}'",
                    COMPONENT_PREFIX
                ))
                .fix("Link a repository to the project")
                .fix(format!(
                    "Create a label such as '{}api' in a linked repository",
                    COMPONENT_PREFIX
                )),
            StartupError::MissingPhases => error
                .cause("The \"Status\" field was removed or has no options")
                .fix("Add phase options to the \"Status\" field, ending with the final phase"),
            StartupError::TerminalPhaseMismatch { expected, .. } => error
                .cause("The options of \"Status\" were reordered or renamed")
                .fix(format!(
                    "Move \"{}\" to the last position of the \"Status\" options",
                    expected
                ))
                .fix("Or pass the actual final phase via --last-phase"),
            StartupError::MissingImpactTypes => error
                .cause("The \"Impact Type\" field is missing or not single-select")
                .fix("Create a single-select field \"Impact Type\" with at least one option"),
            StartupError::FieldTypeMismatch { field, expected, .. } => error
                .cause("Timestamps are stored as RFC 3339 text, not native dates")
                .fix(format!(
                    "Recreate \"{}\" as a field of type {}",
                    field, expected
                )),
        }
    }
}

/// Startup failure rendered for a human reading stderr.
///
/// ```
/// use statuspage::errors::Diagnostic;
///
/// let diagnostic = Diagnostic::new("Expected final phase to be \"Done\"; is \"Closed\"")
///     .cause("The options of \"Status\" were reordered")
///     .fix("Pass --last-phase Closed");
///
/// assert!(diagnostic.to_string().ends_with("to fix: Pass --last-phase Closed\n"));
/// ```
#[derive(Debug, Clone)]
pub struct Diagnostic {
    message: String,
    hints: Vec<Hint>,
}

#[derive(Debug, Clone)]
enum Hint {
    Cause(String),
    Fix(String),
}

impl Diagnostic {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            hints: Vec::new(),
        }
    }

    pub fn cause(mut self, cause: impl Into<String>) -> Self {
        self.hints.push(Hint::Cause(cause.into()));
        self
    }

    pub fn fix(mut self, fix: impl Into<String>) -> Self {
        self.hints.push(Hint::Fix(fix.into()));
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "error: {}", self.message)?;
        // causes first, then fixes, each group in insertion order
        for hint in &self.hints {
            if let Hint::Cause(cause) = hint {
                writeln!(f, "  possible cause: {}", cause)?;
            }
        }
        for hint in &self.hints {
            if let Hint::Fix(fix) = hint {
                writeln!(f, "  to fix: {}", fix)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phase_mismatch_names_both_values() {
        let err = StartupError::TerminalPhaseMismatch {
            expected: "Resolved".to_string(),
            actual: "Done".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Expected final phase to be \"Resolved\"; is \"Done\""
        );
    }

    #[test]
    fn test_field_type_mismatch_message() {
        let err = StartupError::FieldTypeMismatch {
            field: "Ended At".to_string(),
            expected: "TEXT".to_string(),
            actual: "DATE".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Expected field \"Ended At\" to be \"TEXT\"; is \"DATE\""
        );
    }

    #[test]
    fn test_transport_error_is_transparent() {
        let err = StartupError::from(SourceError::NotFound {
            kind: "Project",
            id: "octocat/9".to_string(),
        });
        assert_eq!(err.to_string(), "Project not found: octocat/9");
    }

    #[test]
    fn test_diagnostic_groups_causes_before_fixes() {
        let rendered = Diagnostic::new("Test error")
            .fix("Fix 1")
            .cause("Cause 1")
            .fix("Fix 2")
            .to_string();

        assert_eq!(
            rendered,
            "error: Test error\n  possible cause: Cause 1\n  to fix: Fix 1\n  to fix: Fix 2\n"
        );
    }

    #[test]
    fn test_diagnostic_without_hints() {
        assert_eq!(Diagnostic::new("Only message").to_string(), "error: Only message\n");
    }

    #[test]
    fn test_startup_error_diagnostic_mentions_fix() {
        let formatted = StartupError::MissingComponents.diagnostic().to_string();
        assert!(formatted.contains("got none"));
        assert!(formatted.contains("component:api"));
    }
}
