//! Project configuration validation.
//!
//! The projection layer relies on naming conventions of the project board:
//! component labels, a Status field whose last option is the final phase, an
//! Impact Type field, and two text fields holding timestamps. This module
//! checks all of them against a single snapshot before the server starts.

use crate::errors::StartupError;
use crate::labels;
use crate::source::{
    FieldRecord, ProjectSchema, ProjectSource, DATA_TYPE_TEXT, FIELD_BEGAN_AT, FIELD_ENDED_AT,
};
use tracing::{info, warn};

/// Validate a project snapshot.
///
/// Checks run in a fixed order and the first failure is returned:
/// components, phases (including the final phase), impact types, then the
/// data types of Began At and Ended At.
pub fn validate_project(schema: &ProjectSchema, last_phase: &str) -> Result<(), StartupError> {
    if !schema
        .labels
        .iter()
        .any(|label| labels::is_component_label(&label.name))
    {
        return Err(StartupError::MissingComponents);
    }

    let phases = schema.status.options();
    let final_phase = phases.last().ok_or(StartupError::MissingPhases)?;
    if final_phase != last_phase {
        return Err(StartupError::TerminalPhaseMismatch {
            expected: last_phase.to_string(),
            actual: final_phase.clone(),
        });
    }

    if schema.impact_type.options().is_empty() {
        return Err(StartupError::MissingImpactTypes);
    }

    ensure_text_field(FIELD_BEGAN_AT, &schema.began_at)?;
    ensure_text_field(FIELD_ENDED_AT, &schema.ended_at)?;

    Ok(())
}

fn ensure_text_field(name: &str, field: &FieldRecord) -> Result<(), StartupError> {
    let actual = match field {
        FieldRecord::Plain { data_type } if data_type == DATA_TYPE_TEXT => return Ok(()),
        FieldRecord::Plain { data_type } => data_type.as_str(),
        FieldRecord::SingleSelect { .. } => "SINGLE_SELECT",
        FieldRecord::Missing => "missing",
    };
    Err(StartupError::FieldTypeMismatch {
        field: name.to_string(),
        expected: DATA_TYPE_TEXT.to_string(),
        actual: actual.to_string(),
    })
}

/// Configured impact types that are not options of the Impact Type field.
pub fn unknown_impact_types<'a>(schema: &ProjectSchema, configured: &'a [String]) -> Vec<&'a str> {
    let options = schema.impact_type.options();
    configured
        .iter()
        .filter(|impact_type| !options.contains(*impact_type))
        .map(String::as_str)
        .collect()
}

/// Fetch the project snapshot once and validate it.
///
/// Configured impact types missing from the board are only reported as
/// warnings. Returns the snapshot that passed validation.
pub fn ensure_project_configuration<S: ProjectSource>(
    source: &S,
    project_id: &str,
    last_phase: &str,
    impact_types: &[String],
) -> Result<ProjectSchema, StartupError> {
    let schema = source.project_schema(project_id)?;
    validate_project(&schema, last_phase)?;

    for impact_type in unknown_impact_types(&schema, impact_types) {
        warn!(
            "Configured impact type '{}' is not an option of field \"Impact Type\"",
            impact_type
        );
    }

    info!(
        "Project {} passed validation ({} phases, {} impact types)",
        project_id,
        schema.status.options().len(),
        schema.impact_type.options().len()
    );

    Ok(schema)
}
