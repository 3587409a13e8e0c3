//! Checks on the published OpenAPI document.

use std::collections::HashSet;

use focus::ApiDoc;
use rstest::rstest;
use serde_json::Value;
use utoipa::OpenApi;

fn document() -> Value {
    let json = ApiDoc::openapi().to_json().expect("document serialises");
    serde_json::from_str(&json).expect("document is JSON")
}

fn operations(doc: &Value) -> Vec<(String, &Value)> {
    doc["paths"]
        .as_object()
        .expect("paths object")
        .iter()
        .flat_map(|(path, item)| {
            item.as_object()
                .into_iter()
                .flatten()
                .map(move |(method, op)| (format!("{method} {path}"), op))
        })
        .collect()
}

#[rstest]
fn operation_ids_are_unique() {
    let doc = document();
    let mut seen = HashSet::new();
    for (route, op) in operations(&doc) {
        if let Some(id) = op["operationId"].as_str() {
            assert!(seen.insert(id.to_owned()), "duplicate operationId {id} on {route}");
        }
    }
}

#[rstest]
#[case("post /api/v1/login")]
#[case("post /api/v1/register")]
#[case("get /api/v1/notice")]
#[case("get /api/v1/user/{id}")]
#[case("get /health/live")]
fn public_routes_opt_out_of_the_session_cookie(#[case] route: &str) {
    let doc = document();
    let (_, op) = operations(&doc)
        .into_iter()
        .find(|(name, _)| name == route)
        .unwrap_or_else(|| panic!("{route} documented"));
    let requirements = op["security"].as_array().expect("security override");
    assert!(
        requirements
            .iter()
            .all(|requirement| requirement.get("SessionCookie").is_none()),
        "{route} should not require the session cookie"
    );
}

#[rstest]
fn error_schema_uses_camel_case_trace_id() {
    let doc = document();
    let properties = &doc["components"]["schemas"]["Error"]["properties"];
    assert!(properties.get("traceId").is_some());
    assert!(properties.get("trace_id").is_none());
}
