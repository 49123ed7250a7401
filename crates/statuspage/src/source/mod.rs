//! Upstream data source abstraction.
//!
//! This module defines the `ProjectSource` trait that abstracts the read
//! queries issued against the project board, plus the canonical records every
//! query result is decoded into. The projection layer and the schema validator
//! only ever see these records, never raw GraphQL response shapes, so the
//! GitHub backend and the in-memory backend are interchangeable.

use thiserror::Error;

pub mod github;
pub mod memory;

pub use github::GitHubSource;
pub use memory::{MemorySource, ProjectFixture};

/// Name of the single-select field holding the incident phase.
pub const FIELD_STATUS: &str = "Status";
/// Name of the single-select field holding the impact type.
pub const FIELD_IMPACT_TYPE: &str = "Impact Type";
/// Name of the text field holding the RFC 3339 start timestamp.
pub const FIELD_BEGAN_AT: &str = "Began At";
/// Name of the text field holding the RFC 3339 end timestamp.
pub const FIELD_ENDED_AT: &str = "Ended At";
/// Name of the built-in labels field of a project item.
pub const FIELD_LABELS: &str = "Labels";

/// Declared data type of a plain text field.
pub const DATA_TYPE_TEXT: &str = "TEXT";

/// Errors raised while talking to the upstream source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network failure or non-success HTTP status
    #[error("HTTP request to {endpoint} failed: {message}")]
    Http { endpoint: String, message: String },
    /// The GraphQL endpoint answered with an `errors` array
    #[error("GraphQL query failed: {}", .messages.join("; "))]
    GraphQl { messages: Vec<String> },
    /// The response body did not have the expected shape
    #[error("Failed to decode GraphQL response: {0}")]
    Decode(String),
    /// A node looked up by id or number does not exist (or has another type)
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

/// Identity of a resolved project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    /// Opaque project node id
    pub id: String,
    /// Project number echoed back by the source
    pub number: u64,
}

/// A repository label as seen from the project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    /// Project item ids of the issues carrying this label
    pub linked_items: Vec<String>,
}

/// Declared shape of a project field, looked up by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRecord {
    /// Single-select field with its options in declaration order
    SingleSelect { options: Vec<String> },
    /// Plain field with its declared data type (e.g. `TEXT`, `DATE`)
    Plain { data_type: String },
    /// No field with that name exists
    Missing,
}

impl FieldRecord {
    /// Options of a single-select field; empty for any other shape.
    pub fn options(&self) -> &[String] {
        match self {
            FieldRecord::SingleSelect { options } => options,
            _ => &[],
        }
    }

    /// Declared data type of a plain field.
    pub fn data_type(&self) -> Option<&str> {
        match self {
            FieldRecord::Plain { data_type } => Some(data_type),
            _ => None,
        }
    }
}

/// Structural metadata of a project, fetched in a single query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSchema {
    /// Labels of all linked repositories, repository by repository
    pub labels: Vec<LabelRecord>,
    pub status: FieldRecord,
    pub impact_type: FieldRecord,
    pub began_at: FieldRecord,
    pub ended_at: FieldRecord,
}

/// Value a project item holds for one named field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    /// Selected option name of a single-select field
    SingleSelect(String),
    /// Raw text of a text field
    Text(String),
    /// Label ids of a labels field, in source order
    Labels(Vec<String>),
    /// The item holds no value (or a value of an unexpected type)
    #[default]
    Empty,
}

impl FieldValue {
    pub fn option_name(&self) -> Option<&str> {
        match self {
            FieldValue::SingleSelect(name) => Some(name),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn label_ids(&self) -> &[String] {
        match self {
            FieldValue::Labels(ids) => ids,
            _ => &[],
        }
    }
}

/// A project item together with the field values an incident is built from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ItemRecord {
    /// Opaque project item id
    pub id: String,
    /// Title of the wrapped issue; `None` for content without a title
    pub title: Option<String>,
    pub phase: FieldValue,
    pub impact_type: FieldValue,
    pub began_at: FieldValue,
    pub ended_at: FieldValue,
    pub labels: FieldValue,
}

/// Read access to the project board.
///
/// Every method issues exactly one upstream query and returns canonical
/// records. Implementations are shared across request handlers and must be
/// cheap to clone.
pub trait ProjectSource: Clone + Send + Sync {
    /// Look up a user-owned project by owner login and project number.
    fn find_user_project(&self, login: &str, number: u64) -> Result<ProjectRef, SourceError>;

    /// Fetch labels and field declarations needed to validate the project.
    fn project_schema(&self, project_id: &str) -> Result<ProjectSchema, SourceError>;

    /// Fetch labels of all repositories linked to the project.
    fn repository_labels(&self, project_id: &str) -> Result<Vec<LabelRecord>, SourceError>;

    /// Fetch a single label by its node id.
    fn label(&self, label_id: &str) -> Result<LabelRecord, SourceError>;

    /// Fetch the options of a single-select field, in declaration order.
    fn field_options(&self, project_id: &str, field: &str) -> Result<Vec<String>, SourceError>;

    /// Fetch the first page of project items.
    fn project_items(&self, project_id: &str) -> Result<Vec<ItemRecord>, SourceError>;

    /// Fetch a single project item by its node id.
    fn project_item(&self, item_id: &str) -> Result<ItemRecord, SourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_record_accessors() {
        let select = FieldRecord::SingleSelect {
            options: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(select.options(), ["a", "b"]);
        assert_eq!(select.data_type(), None);

        let plain = FieldRecord::Plain {
            data_type: "DATE".to_string(),
        };
        assert!(plain.options().is_empty());
        assert_eq!(plain.data_type(), Some("DATE"));

        assert!(FieldRecord::Missing.options().is_empty());
        assert_eq!(FieldRecord::Missing.data_type(), None);
    }

    #[test]
    fn test_field_value_accessors() {
        assert_eq!(
            FieldValue::SingleSelect("Done".to_string()).option_name(),
            Some("Done")
        );
        assert_eq!(FieldValue::Text("x".to_string()).option_name(), None);
        assert_eq!(FieldValue::Text("x".to_string()).text(), Some("x"));
        assert!(FieldValue::Empty.label_ids().is_empty());
        assert_eq!(
            FieldValue::Labels(vec!["L1".to_string(), "L1".to_string()]).label_ids(),
            ["L1", "L1"]
        );
    }

    #[test]
    fn test_graphql_error_joins_messages() {
        let err = SourceError::GraphQl {
            messages: vec!["first".to_string(), "second".to_string()],
        };
        assert_eq!(err.to_string(), "GraphQL query failed: first; second");
    }
}
