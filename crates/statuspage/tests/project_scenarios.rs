//! End-to-end scenarios: startup gate plus projections over fixture projects.

use statuspage::source::memory::label;
use statuspage::source::{
    FieldValue, ItemRecord, FIELD_BEGAN_AT, FIELD_ENDED_AT, FIELD_IMPACT_TYPE, FIELD_STATUS,
};
use statuspage::{
    IncidentFilter, MemorySource, ProjectFixture, ProjectSettings, Settings, StartupError,
    StatusPage,
};

fn settings(last_phase: &str) -> Settings {
    Settings {
        addr: "127.0.0.1:0".to_string(),
        project: ProjectSettings {
            owner: "statuscorp".to_string(),
            owner_is_org: false,
            number: 4,
        },
        last_phase: last_phase.to_string(),
        impact_types: vec!["performance-degration".to_string()],
        api_url: "memory".to_string(),
    }
}

fn incident_project() -> ProjectFixture {
    ProjectFixture::new("statuscorp", 4, "PVT_statuscorp")
        .with_repository(vec![
            label("LA_api", "component:api", &["PVTI_outage"]),
            label("LA_web", "component:web", &[]),
            label("LA_bug", "bug", &[]),
        ])
        .with_single_select(
            FIELD_STATUS,
            &["Investigating", "Identified", "Monitoring", "Done"],
        )
        .with_single_select(FIELD_IMPACT_TYPE, &["performance-degration"])
        .with_text_field(FIELD_BEGAN_AT)
        .with_text_field(FIELD_ENDED_AT)
        .with_item(ItemRecord {
            id: "PVTI_outage".to_string(),
            title: Some("Partial API outage".to_string()),
            phase: FieldValue::SingleSelect("Monitoring".to_string()),
            impact_type: FieldValue::SingleSelect("performance-degration".to_string()),
            began_at: FieldValue::Text("2024-03-01T10:00:00Z".to_string()),
            ended_at: FieldValue::Text(String::new()),
            labels: FieldValue::Labels(vec!["LA_api".to_string()]),
        })
}

#[test]
fn test_project_passes_validation_with_matching_final_phase() {
    let page = StatusPage::connect(MemorySource::new(incident_project()), &settings("Done"));
    assert!(page.is_ok());
}

#[test]
fn test_project_fails_validation_with_other_final_phase() {
    let result = StatusPage::connect(MemorySource::new(incident_project()), &settings("Resolved"));
    let err = result.err().expect("validation should fail");

    match &err {
        StartupError::TerminalPhaseMismatch { expected, actual } => {
            assert_eq!(expected, "Resolved");
            assert_eq!(actual, "Done");
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let diagnostic = err.diagnostic().to_string();
    assert!(diagnostic.contains("\"Resolved\""));
    assert!(diagnostic.contains("\"Done\""));
    assert!(diagnostic.contains("--last-phase"));
}

#[test]
fn test_project_without_components_never_starts() {
    let fixture = ProjectFixture::new("statuscorp", 4, "PVT_statuscorp")
        .with_repository(vec![label("LA_bug", "bug", &[])])
        .with_single_select(FIELD_STATUS, &["Done"])
        .with_single_select(FIELD_IMPACT_TYPE, &["performance-degration"])
        .with_text_field(FIELD_BEGAN_AT)
        .with_text_field(FIELD_ENDED_AT);

    let result = StatusPage::connect(MemorySource::new(fixture), &settings("Done"));
    assert!(matches!(result, Err(StartupError::MissingComponents)));
}

#[test]
fn test_organization_projects_are_rejected() {
    let mut settings = settings("Done");
    settings.project.owner_is_org = true;

    let result = StatusPage::connect(MemorySource::new(incident_project()), &settings);
    assert!(matches!(
        result,
        Err(StartupError::UnsupportedOwnerKind { .. })
    ));
}

#[test]
fn test_labels_yield_two_components() {
    let page = StatusPage::connect(MemorySource::new(incident_project()), &settings("Done")).unwrap();

    let components = page.list_components().unwrap();
    assert_eq!(components.len(), 2);
    assert_eq!(components[0].display_name, "api");
    assert_eq!(components[1].display_name, "web");
    assert_eq!(components[0].affected_by, vec!["PVTI_outage"]);
}

#[test]
fn test_incident_with_open_end() {
    let page = StatusPage::connect(MemorySource::new(incident_project()), &settings("Done")).unwrap();

    let incidents = page.list_incidents(&IncidentFilter::default()).unwrap();
    assert_eq!(incidents.len(), 1);

    let incident = &incidents[0];
    assert_eq!(incident.title, "Partial API outage");
    assert_eq!(incident.phase, "Monitoring");
    assert!(incident.began_at.is_some());
    assert!(incident.ended_at.is_none());
    assert_eq!(incident.affects, vec!["LA_api"]);
}
