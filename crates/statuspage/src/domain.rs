//! REST domain types served by the status page API.
//!
//! These are the shapes returned to API callers. They are produced from the
//! canonical upstream records in [`crate::source`] by the projection layer and
//! never read back from callers.

use chrono::{DateTime, FixedOffset};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque node identifier assigned by the upstream source.
pub type Id = String;

/// Named lifecycle stage of an incident, drawn from the Status field options.
pub type IncidentPhase = String;

/// Kind of impact an incident has, drawn from the Impact Type field options.
pub type IncidentImpactType = String;

/// A component of the monitored system, backed by a `component:` label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Opaque label node id (stable across label renames)
    pub id: Id,
    /// Label name with the `component:` prefix removed
    pub display_name: String,
    /// Ids of incidents (project items) whose issue carries this label
    pub affected_by: Vec<Id>,
    /// Free-form metadata. Declared by the API but currently always empty.
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// An incident, backed by one project item wrapping an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    /// Opaque project item id
    pub id: Id,
    /// Title of the underlying issue
    pub title: String,
    /// Current phase (option name of the Status field)
    pub phase: IncidentPhase,
    /// Impact type (option name of the Impact Type field)
    pub impact_type: IncidentImpactType,
    /// When the incident began, if the Began At field holds a valid timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub began_at: Option<DateTime<FixedOffset>>,
    /// When the incident ended, if the Ended At field holds a valid timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<FixedOffset>>,
    /// Ids of the component labels attached to the item, in source order
    pub affects: Vec<Id>,
}

/// Filter parameters accepted by the incident listing.
///
/// Parsed from the query string and passed through to the projection layer,
/// which does not apply them to the upstream query yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentFilter {
    /// Only incidents active at or after this instant
    #[serde(default)]
    pub start: Option<DateTime<FixedOffset>>,
    /// Only incidents active at or before this instant
    #[serde(default)]
    pub end: Option<DateTime<FixedOffset>>,
    /// Only incidents in this phase
    #[serde(default)]
    pub phase: Option<IncidentPhase>,
}

impl IncidentFilter {
    /// True when no filter parameter was supplied
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none() && self.phase.is_none()
    }
}
