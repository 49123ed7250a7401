//! In-memory project source for testing.
//!
//! Serves a fixed [`ProjectFixture`] without any network access. Clones share
//! the same fixture and failure switch, so a test can keep a handle and make
//! every subsequent query fail after the fixture has been handed to a server.

use super::{
    FieldRecord, FieldValue, ItemRecord, LabelRecord, ProjectRef, ProjectSchema, ProjectSource,
    SourceError, DATA_TYPE_TEXT, FIELD_BEGAN_AT, FIELD_ENDED_AT, FIELD_IMPACT_TYPE, FIELD_STATUS,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Contents of a project board as the upstream source would report them.
#[derive(Debug, Clone, Default)]
pub struct ProjectFixture {
    pub owner: String,
    pub number: u64,
    pub id: String,
    /// Labels of each linked repository, in enumeration order
    pub repositories: Vec<Vec<LabelRecord>>,
    /// Project fields by name
    pub fields: Vec<(String, FieldRecord)>,
    pub items: Vec<ItemRecord>,
}

impl ProjectFixture {
    /// Empty project owned by `owner`.
    pub fn new(owner: &str, number: u64, id: &str) -> Self {
        Self {
            owner: owner.to_string(),
            number,
            id: id.to_string(),
            ..Default::default()
        }
    }

    /// A project following every naming convention, with two incidents.
    ///
    /// - labels `component:api`, `component:web`, `bug` in one repository
    /// - Status options `Investigating`, `Identified`, `Monitoring`, `Done`
    /// - Impact Type options `performance-degration`, `connectivity-issues`
    /// - Began At / Ended At declared as text fields
    pub fn sample() -> Self {
        Self::new("octocat", 1, "PVT_sample")
            .with_repository(vec![
                label("LA_api", "component:api", &["PVTI_1"]),
                label("LA_web", "component:web", &[]),
                label("LA_bug", "bug", &["PVTI_2"]),
            ])
            .with_single_select(
                FIELD_STATUS,
                &["Investigating", "Identified", "Monitoring", "Done"],
            )
            .with_single_select(
                FIELD_IMPACT_TYPE,
                &["performance-degration", "connectivity-issues"],
            )
            .with_text_field(FIELD_BEGAN_AT)
            .with_text_field(FIELD_ENDED_AT)
            .with_item(ItemRecord {
                id: "PVTI_1".to_string(),
                title: Some("API unreachable".to_string()),
                phase: FieldValue::SingleSelect("Investigating".to_string()),
                impact_type: FieldValue::SingleSelect("connectivity-issues".to_string()),
                began_at: FieldValue::Text("2024-03-01T10:00:00Z".to_string()),
                ended_at: FieldValue::Text(String::new()),
                labels: FieldValue::Labels(vec!["LA_api".to_string()]),
            })
            .with_item(ItemRecord {
                id: "PVTI_2".to_string(),
                title: Some("Slow dashboard".to_string()),
                phase: FieldValue::SingleSelect("Done".to_string()),
                impact_type: FieldValue::SingleSelect("performance-degration".to_string()),
                began_at: FieldValue::Text("2024-02-10T08:30:00+01:00".to_string()),
                ended_at: FieldValue::Text("2024-02-10T09:15:00+01:00".to_string()),
                labels: FieldValue::Labels(vec!["LA_web".to_string(), "LA_api".to_string()]),
            })
    }

    /// Link a repository carrying `labels`.
    pub fn with_repository(mut self, labels: Vec<LabelRecord>) -> Self {
        self.repositories.push(labels);
        self
    }

    /// Declare (or replace) a field.
    pub fn with_field(mut self, name: &str, field: FieldRecord) -> Self {
        self.fields.retain(|(existing, _)| existing != name);
        self.fields.push((name.to_string(), field));
        self
    }

    /// Declare a single-select field with the given options.
    pub fn with_single_select(self, name: &str, options: &[&str]) -> Self {
        let options = options.iter().map(|o| o.to_string()).collect();
        self.with_field(name, FieldRecord::SingleSelect { options })
    }

    /// Declare a plain text field.
    pub fn with_text_field(self, name: &str) -> Self {
        self.with_field(
            name,
            FieldRecord::Plain {
                data_type: DATA_TYPE_TEXT.to_string(),
            },
        )
    }

    pub fn with_item(mut self, item: ItemRecord) -> Self {
        self.items.push(item);
        self
    }

    fn field(&self, name: &str) -> FieldRecord {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, field)| field.clone())
            .unwrap_or(FieldRecord::Missing)
    }

    fn labels(&self) -> impl Iterator<Item = &LabelRecord> {
        self.repositories.iter().flatten()
    }
}

/// Build a label record, mainly for fixtures.
pub fn label(id: &str, name: &str, linked_items: &[&str]) -> LabelRecord {
    LabelRecord {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        linked_items: linked_items.iter().map(|i| i.to_string()).collect(),
    }
}

/// In-memory [`ProjectSource`] serving a [`ProjectFixture`].
#[derive(Debug, Clone)]
pub struct MemorySource {
    fixture: Arc<ProjectFixture>,
    failing: Arc<AtomicBool>,
}

impl MemorySource {
    pub fn new(fixture: ProjectFixture) -> Self {
        Self {
            fixture: Arc::new(fixture),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every following query fail with a transport error.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<&ProjectFixture, SourceError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(SourceError::Http {
                endpoint: "memory".to_string(),
                message: "simulated upstream failure".to_string(),
            });
        }
        Ok(&self.fixture)
    }

    fn project(&self, project_id: &str) -> Result<&ProjectFixture, SourceError> {
        let fixture = self.check()?;
        if fixture.id != project_id {
            return Err(SourceError::NotFound {
                kind: "ProjectV2",
                id: project_id.to_string(),
            });
        }
        Ok(fixture)
    }
}

impl ProjectSource for MemorySource {
    fn find_user_project(&self, login: &str, number: u64) -> Result<ProjectRef, SourceError> {
        let fixture = self.check()?;
        if fixture.owner != login || fixture.number != number {
            return Err(SourceError::NotFound {
                kind: "Project",
                id: format!("{}/{}", login, number),
            });
        }
        Ok(ProjectRef {
            id: fixture.id.clone(),
            number: fixture.number,
        })
    }

    fn project_schema(&self, project_id: &str) -> Result<ProjectSchema, SourceError> {
        let fixture = self.project(project_id)?;
        let labels = fixture
            .labels()
            .map(|label| LabelRecord {
                linked_items: Vec::new(),
                ..label.clone()
            })
            .collect();

        Ok(ProjectSchema {
            labels,
            status: fixture.field(FIELD_STATUS),
            impact_type: fixture.field(FIELD_IMPACT_TYPE),
            began_at: fixture.field(FIELD_BEGAN_AT),
            ended_at: fixture.field(FIELD_ENDED_AT),
        })
    }

    fn repository_labels(&self, project_id: &str) -> Result<Vec<LabelRecord>, SourceError> {
        Ok(self.project(project_id)?.labels().cloned().collect())
    }

    fn label(&self, label_id: &str) -> Result<LabelRecord, SourceError> {
        self.check()?
            .labels()
            .find(|label| label.id == label_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                kind: "Label",
                id: label_id.to_string(),
            })
    }

    fn field_options(&self, project_id: &str, field: &str) -> Result<Vec<String>, SourceError> {
        Ok(self.project(project_id)?.field(field).options().to_vec())
    }

    fn project_items(&self, project_id: &str) -> Result<Vec<ItemRecord>, SourceError> {
        Ok(self.project(project_id)?.items.clone())
    }

    fn project_item(&self, item_id: &str) -> Result<ItemRecord, SourceError> {
        self.check()?
            .items
            .iter()
            .find(|item| item.id == item_id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound {
                kind: "ProjectV2Item",
                id: item_id.to_string(),
            })
    }
}
