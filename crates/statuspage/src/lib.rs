//! Status Page Library
//!
//! Read model of a status page whose data lives on a GitHub Projects (v2)
//! board: incidents are project items, phases and impact types are
//! single-select field options, and components are repository labels
//! prefixed `component:`.

pub mod config;
pub mod domain;
pub mod errors;
pub mod labels;
pub mod openapi;
pub mod projection;
pub mod resolver;
pub mod source;
pub mod time;
pub mod validation;

// Re-export commonly used types
pub use config::{ProjectSettings, Settings, StatusPageConfig};
pub use domain::{Component, Incident, IncidentFilter, IncidentImpactType, IncidentPhase};
pub use errors::{Diagnostic, StartupError};
pub use projection::{ProjectContext, StatusPage};
pub use source::{GitHubSource, MemorySource, ProjectFixture, ProjectSource, SourceError};
