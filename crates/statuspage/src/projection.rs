//! Read models served by the API.
//!
//! The `StatusPage` answers the four read queries (components, impact types,
//! phases, incidents). Each operation issues exactly one upstream query and
//! maps the canonical records into REST types with the pure functions below.
//! Errors are returned unchanged; there is no retry and no partial result.

use crate::config::Settings;
use crate::domain::{Component, Incident, IncidentFilter, IncidentImpactType, IncidentPhase};
use crate::errors::StartupError;
use crate::labels;
use crate::resolver::resolve_project;
use crate::source::{
    FieldValue, ItemRecord, LabelRecord, ProjectSource, SourceError, FIELD_IMPACT_TYPE,
    FIELD_STATUS,
};
use crate::time::parse_timestamp;
use crate::validation::ensure_project_configuration;
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use tracing::{debug, warn};

/// Immutable per-process project state established at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    /// Opaque project node id every query is scoped by
    pub project_id: String,
    /// Project number echoed by the source
    pub project_number: u64,
}

/// Projection layer over a project source.
///
/// Generic over the source backend so the same mapping runs against GitHub
/// and against in-memory fixtures.
pub struct StatusPage<S: ProjectSource> {
    source: S,
    context: ProjectContext,
}

impl<S: ProjectSource> StatusPage<S> {
    /// Wrap a source and an already resolved project context.
    pub fn new(source: S, context: ProjectContext) -> Self {
        Self { source, context }
    }

    /// Resolve and validate the configured project.
    ///
    /// This is the startup gate: any error means the service must not serve.
    pub fn connect(source: S, settings: &Settings) -> Result<Self, StartupError> {
        let project = resolve_project(&source, &settings.project)?;
        ensure_project_configuration(
            &source,
            &project.id,
            &settings.last_phase,
            &settings.impact_types,
        )?;

        let context = ProjectContext {
            project_id: project.id,
            project_number: project.number,
        };
        Ok(Self::new(source, context))
    }

    pub fn context(&self) -> &ProjectContext {
        &self.context
    }

    /// All components across the linked repositories, in enumeration order.
    pub fn list_components(&self) -> Result<Vec<Component>, SourceError> {
        let labels = self.source.repository_labels(&self.context.project_id)?;
        Ok(components_from_labels(&labels))
    }

    /// A single component by label id.
    ///
    /// The label is mapped as-is; a label without the component prefix keeps
    /// its full name as display name.
    pub fn get_component(&self, component_id: &str) -> Result<Component, SourceError> {
        let label = self.source.label(component_id)?;
        Ok(component_from_label(&label))
    }

    /// Options of the Impact Type field, in declaration order.
    pub fn list_impact_types(&self) -> Result<Vec<IncidentImpactType>, SourceError> {
        self.source
            .field_options(&self.context.project_id, FIELD_IMPACT_TYPE)
    }

    /// Options of the Status field, in declaration order.
    pub fn list_phases(&self) -> Result<Vec<IncidentPhase>, SourceError> {
        self.source
            .field_options(&self.context.project_id, FIELD_STATUS)
    }

    /// The first page of incidents.
    ///
    /// Filter parameters are accepted but not applied yet.
    pub fn list_incidents(&self, filter: &IncidentFilter) -> Result<Vec<Incident>, SourceError> {
        if !filter.is_empty() {
            debug!("Ignoring incident filter {:?}", filter);
        }
        let items = self.source.project_items(&self.context.project_id)?;
        Ok(items.into_iter().map(incident_from_item).collect())
    }

    /// A single incident by project item id.
    pub fn get_incident(&self, incident_id: &str) -> Result<Incident, SourceError> {
        let item = self.source.project_item(incident_id)?;
        Ok(incident_from_item(item))
    }
}

/// Map a label to a component.
pub fn component_from_label(label: &LabelRecord) -> Component {
    Component {
        id: label.id.clone(),
        display_name: labels::display_name(&label.name).to_string(),
        affected_by: label.linked_items.clone(),
        labels: HashMap::new(),
    }
}

/// Keep component labels only and map them, preserving order.
pub fn components_from_labels(labels: &[LabelRecord]) -> Vec<Component> {
    labels
        .iter()
        .filter(|label| labels::is_component_label(&label.name))
        .map(component_from_label)
        .collect()
}

/// Map a project item to an incident.
///
/// Unparseable timestamps are logged and left unset; they never fail the
/// mapping.
pub fn incident_from_item(item: ItemRecord) -> Incident {
    let began_at = timestamp_field(&item.id, "Began At", &item.began_at);
    let ended_at = timestamp_field(&item.id, "Ended At", &item.ended_at);

    Incident {
        affects: item.labels.label_ids().to_vec(),
        phase: option_name(&item.phase),
        impact_type: option_name(&item.impact_type),
        title: item.title.unwrap_or_default(),
        id: item.id,
        began_at,
        ended_at,
    }
}

fn option_name(value: &FieldValue) -> String {
    value.option_name().unwrap_or_default().to_string()
}

fn timestamp_field(item_id: &str, field: &str, value: &FieldValue) -> Option<DateTime<FixedOffset>> {
    let text = value.text()?;
    match parse_timestamp(text) {
        Ok(timestamp) => Some(timestamp),
        Err(e) => {
            warn!(
                "Item {}: field \"{}\" value {:?} is not an RFC 3339 timestamp: {}",
                item_id, field, text, e
            );
            None
        }
    }
}
