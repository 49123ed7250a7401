//! OpenAPI document describing the REST surface.
//!
//! Paths are written out by hand; component schemas are generated from the
//! domain types so the document cannot drift from what the handlers return.

use crate::domain::{Component, Incident};
use schemars::gen::SchemaSettings;
use serde_json::{json, Map, Value};

/// Build the OpenAPI 3.0 document.
pub fn openapi_document() -> Value {
    let mut generator = SchemaSettings::openapi3().into_generator();
    generator.subschema_for::<Component>();
    generator.subschema_for::<Incident>();

    let mut schemas = Map::new();
    for (name, schema) in generator.take_definitions() {
        schemas.insert(name, json!(schema));
    }
    schemas.insert(
        "IncidentPhase".to_string(),
        json!({ "type": "string", "description": "Option of the Status field" }),
    );
    schemas.insert(
        "IncidentImpactType".to_string(),
        json!({ "type": "string", "description": "Option of the Impact Type field" }),
    );

    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Status Page API",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": {
            "/components": {
                "get": operation("getComponents", "List components", array_of("Component"), &[]),
            },
            "/components/{componentId}": {
                "get": operation(
                    "getComponent",
                    "Get a component",
                    reference("Component"),
                    &[path_parameter("componentId")],
                ),
            },
            "/impacttypes": {
                "get": operation(
                    "getImpacttypes",
                    "List impact types",
                    array_of("IncidentImpactType"),
                    &[],
                ),
            },
            "/phases": {
                "get": operation("getPhases", "List incident phases", array_of("IncidentPhase"), &[]),
            },
            "/incidents": {
                "get": operation(
                    "getIncidents",
                    "List incidents",
                    array_of("Incident"),
                    &[
                        query_parameter("start", json!({ "type": "string", "format": "date-time" })),
                        query_parameter("end", json!({ "type": "string", "format": "date-time" })),
                        query_parameter("phase", reference("IncidentPhase")),
                    ],
                ),
            },
            "/incidents/{incidentId}": {
                "get": operation(
                    "getIncident",
                    "Get an incident",
                    reference("Incident"),
                    &[path_parameter("incidentId")],
                ),
            },
        },
        "components": { "schemas": schemas },
    })
}

fn reference(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{}", name) })
}

fn array_of(name: &str) -> Value {
    json!({ "type": "array", "items": reference(name) })
}

fn path_parameter(name: &str) -> Value {
    json!({ "name": name, "in": "path", "required": true, "schema": { "type": "string" } })
}

fn query_parameter(name: &str, schema: Value) -> Value {
    json!({ "name": name, "in": "query", "required": false, "schema": schema })
}

fn operation(id: &str, summary: &str, schema: Value, parameters: &[Value]) -> Value {
    json!({
        "operationId": id,
        "summary": summary,
        "parameters": parameters,
        "responses": {
            "200": {
                "description": "OK",
                "content": { "application/json": { "schema": schema } },
            },
            "500": { "description": "Upstream query failed" },
        },
    })
}
