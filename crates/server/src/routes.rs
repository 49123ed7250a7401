//! API route definitions

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use std::sync::Arc;

use statuspage::openapi::openapi_document;
use statuspage::{
    Component, Incident, IncidentFilter, IncidentImpactType, IncidentPhase, ProjectSource,
    SourceError, StatusPage,
};

/// Shared application state
pub type AppState<S> = Arc<StatusPage<S>>;

/// Create API routes
pub fn create_routes<S: ProjectSource + 'static>(page: Arc<StatusPage<S>>) -> Router {
    Router::new()
        .route("/health", get(health_check::<S>))
        .route("/openapi.json", get(openapi))
        .route("/components", get(list_components::<S>))
        .route("/components/:component_id", get(get_component::<S>))
        .route("/impacttypes", get(list_impact_types::<S>))
        .route("/phases", get(list_phases::<S>))
        .route("/incidents", get(list_incidents::<S>))
        .route("/incidents/:incident_id", get(get_incident::<S>))
        .with_state(page)
}

/// Run a projection on the blocking pool.
///
/// Upstream queries block on HTTP, so they stay off the async workers. Any
/// failure is logged with `context` and answered with an empty 500.
async fn project<S, T, F>(page: AppState<S>, context: String, query: F) -> Result<T, StatusCode>
where
    S: ProjectSource + 'static,
    T: Send + 'static,
    F: FnOnce(&StatusPage<S>) -> Result<T, SourceError> + Send + 'static,
{
    let outcome = tokio::task::spawn_blocking(move || query(&page))
        .await
        .map_err(|e| {
            tracing::error!("{} panicked: {:?}", context, e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?;

    outcome.map_err(|e| {
        tracing::error!("{}: {}", context, e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

/// Health check endpoint
async fn health_check<S: ProjectSource + 'static>(
    State(page): State<AppState<S>>,
) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "statuspage-api",
        "version": env!("CARGO_PKG_VERSION"),
        "project": page.context().project_number,
    }))
}

async fn openapi() -> impl IntoResponse {
    Json(openapi_document())
}

/// List all components
async fn list_components<S: ProjectSource + 'static>(
    State(page): State<AppState<S>>,
) -> Result<Json<Vec<Component>>, StatusCode> {
    project(page, "Failed to list components".to_string(), |page| {
        page.list_components()
    })
    .await
    .map(Json)
}

/// Get single component by label id
async fn get_component<S: ProjectSource + 'static>(
    Path(component_id): Path<String>,
    State(page): State<AppState<S>>,
) -> Result<Json<Component>, StatusCode> {
    let context = format!("Failed to get component {}", component_id);
    project(page, context, move |page| page.get_component(&component_id))
        .await
        .map(Json)
}

async fn list_impact_types<S: ProjectSource + 'static>(
    State(page): State<AppState<S>>,
) -> Result<Json<Vec<IncidentImpactType>>, StatusCode> {
    project(page, "Failed to list impact types".to_string(), |page| {
        page.list_impact_types()
    })
    .await
    .map(Json)
}

async fn list_phases<S: ProjectSource + 'static>(
    State(page): State<AppState<S>>,
) -> Result<Json<Vec<IncidentPhase>>, StatusCode> {
    project(page, "Failed to list phases".to_string(), |page| {
        page.list_phases()
    })
    .await
    .map(Json)
}

/// List incidents; filter parameters are parsed but not applied
async fn list_incidents<S: ProjectSource + 'static>(
    State(page): State<AppState<S>>,
    Query(filter): Query<IncidentFilter>,
) -> Result<Json<Vec<Incident>>, StatusCode> {
    project(page, "Failed to list incidents".to_string(), move |page| {
        page.list_incidents(&filter)
    })
    .await
    .map(Json)
}

/// Get single incident by project item id
async fn get_incident<S: ProjectSource + 'static>(
    Path(incident_id): Path<String>,
    State(page): State<AppState<S>>,
) -> Result<Json<Incident>, StatusCode> {
    let context = format!("Failed to get incident {}", incident_id);
    project(page, context, move |page| page.get_incident(&incident_id))
        .await
        .map(Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;
    use statuspage::{MemorySource, ProjectContext, ProjectFixture};

    fn create_test_page(source: MemorySource) -> Arc<StatusPage<MemorySource>> {
        let context = ProjectContext {
            project_id: "PVT_sample".to_string(),
            project_number: 1,
        };
        Arc::new(StatusPage::new(source, context))
    }

    fn create_test_app() -> TestServer {
        let source = MemorySource::new(ProjectFixture::sample());
        TestServer::new(create_routes(create_test_page(source))).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = create_test_app();
        let response = server.get("/health").await;

        response.assert_status_ok();
        let json: serde_json::Value = response.json();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "statuspage-api");
        assert_eq!(json["project"], 1);
    }

    #[tokio::test]
    async fn test_list_components() {
        let server = create_test_app();
        let response = server.get("/components").await;

        response.assert_status_ok();
        let components: Vec<Component> = response.json();
        let names: Vec<&str> = components
            .iter()
            .map(|c| c.display_name.as_str())
            .collect();
        assert_eq!(names, vec!["api", "web"]);
    }

    #[tokio::test]
    async fn test_component_json_uses_rest_field_names() {
        let server = create_test_app();
        let json: serde_json::Value = server.get("/components/LA_api").await.json();

        assert_eq!(json["id"], "LA_api");
        assert_eq!(json["displayName"], "api");
        assert_eq!(json["affectedBy"], serde_json::json!(["PVTI_1"]));
        assert_eq!(json["labels"], serde_json::json!({}));
    }

    #[tokio::test]
    async fn test_phases_keep_field_order() {
        let server = create_test_app();
        let phases: Vec<String> = server.get("/phases").await.json();
        assert_eq!(
            phases,
            vec!["Investigating", "Identified", "Monitoring", "Done"]
        );
    }

    #[tokio::test]
    async fn test_impact_types() {
        let server = create_test_app();
        let types: Vec<String> = server.get("/impacttypes").await.json();
        assert_eq!(types, vec!["performance-degration", "connectivity-issues"]);
    }

    #[tokio::test]
    async fn test_list_incidents_ignores_filter() {
        let server = create_test_app();

        let all: Vec<Incident> = server.get("/incidents").await.json();
        let filtered: Vec<Incident> = server
            .get("/incidents")
            .add_query_param("phase", "Done")
            .add_query_param("start", "2024-03-01T00:00:00Z")
            .await
            .json();

        assert_eq!(all.len(), 2);
        assert_eq!(all, filtered);
    }

    #[tokio::test]
    async fn test_incident_omits_missing_end() {
        let server = create_test_app();
        let response = server.get("/incidents/PVTI_1").await;

        response.assert_status_ok();
        let json: serde_json::Value = response.json();
        assert_eq!(json["title"], "API unreachable");
        assert_eq!(json["impactType"], "connectivity-issues");
        assert!(json.get("beganAt").is_some());
        assert!(json.get("endedAt").is_none());
    }

    #[tokio::test]
    async fn test_unknown_incident_is_server_error() {
        let server = create_test_app();
        let response = server.get("/incidents/PVTI_missing").await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_empty_server_error() {
        let source = MemorySource::new(ProjectFixture::sample());
        let server = TestServer::new(create_routes(create_test_page(source.clone()))).unwrap();

        source.set_failing(true);
        let response = server.get("/components").await;

        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.text().is_empty());
    }

    #[tokio::test]
    async fn test_openapi_document_served() {
        let server = create_test_app();
        let json: serde_json::Value = server.get("/openapi.json").await.json();
        assert_eq!(json["openapi"], "3.0.3");
        assert!(json["paths"]["/incidents/{incidentId}"].is_object());
    }
}
