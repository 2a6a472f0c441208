mod common;

use brrtpets::app::AppOptions;
use common::test_server::TestServer;
use serde_json::json;
use std::fs;

fn post_json(path: &str, body: &str) -> String {
    format!(
        "POST {path} HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
}

#[test]
fn test_health_endpoint() {
    let server = TestServer::seeded();
    let resp = server.send("GET /health HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.json()["status"], "ok");
    assert_eq!(server.app.metrics.top_level_request_count(), 1);
}

#[test]
fn test_metrics_endpoint_is_prometheus_text() {
    let server = TestServer::seeded();
    let _ = server.send("GET /pet/1 HTTP/1.1\r\nHost: localhost\r\n\r\n");

    let resp = server.send("GET /metrics HTTP/1.1\r\nHost: localhost\r\n\r\n");

    assert_eq!(resp.status, 200);
    assert!(resp
        .header("content-type")
        .is_some_and(|ct| ct.starts_with("text/plain")));
    assert!(resp.body.contains("brrtpets_requests_total 1"));
    assert!(resp.body.contains("brrtpets_store_conflicts_total"));
}

#[test]
fn test_get_seeded_pet() {
    let server = TestServer::seeded();
    let resp = server.send("GET /pet/1 HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(resp.status, 200);
    assert!(resp
        .header("content-type")
        .is_some_and(|ct| ct.starts_with("application/json")));
    assert_eq!(resp.json()["name"], "Rex");
}

#[test]
fn test_add_pet_returns_location() {
    let server = TestServer::start(&AppOptions::default());
    let body = json!({ "id": 21, "name": "Wire" }).to_string();

    let resp = server.send(&post_json("/pet", &body));

    assert_eq!(resp.status, 201);
    assert_eq!(resp.header("location"), Some("/pet/21"));
    assert_eq!(server.app.store.get(&["pets", "21"]).unwrap()["name"], "Wire");
}

#[test]
fn test_form_patch_over_the_wire() {
    let server = TestServer::seeded();
    let body = "status=sold";
    let req = format!(
        "PATCH /pet/2 HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/x-www-form-urlencoded\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    );

    let resp = server.send(&req);

    assert_eq!(resp.status, 200);
    assert_eq!(resp.body, "OK");
    assert_eq!(server.app.store.get(&["pets", "2"]).unwrap()["status"], "sold");
}

#[test]
fn test_query_string_filters_list() {
    let server = TestServer::seeded();
    let resp = server.send("GET /pet?status=available HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(resp.status, 200);
    assert_eq!(resp.json()["total"], 1);
    assert_eq!(resp.json()["pets"][0]["name"], "Rex");
}

#[test]
fn test_unknown_route_is_json_404() {
    let server = TestServer::seeded();
    let resp = server.send("GET /store/order/1 HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(resp.status, 404);
    assert_eq!(resp.json()["error"], "Not Found");
}

#[test]
fn test_request_id_stays_off_the_wire() {
    let server = TestServer::seeded();
    let resp = server.send("GET /pet/1 HTTP/1.1\r\nHost: localhost\r\nX-Request-Id: abc-123\r\n\r\n");
    assert_eq!(resp.status, 200);
    assert!(resp.header("x-request-id").is_none());
}

#[test]
fn test_docs_endpoint() {
    let server = TestServer::start(&AppOptions::default());
    let resp = server.send("GET /docs HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(resp.status, 200);
    let doc = resp.json();
    assert_eq!(doc["info"]["title"], "brrtpets");
    assert!(doc["paths"]["/user/{username}"]["get"].is_object());
}

#[test]
fn test_ui_serves_rendered_index() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("index.html"),
        "<html><title>{{ title }}</title><a href=\"{{ spec_url }}\">spec</a></html>",
    )
    .unwrap();
    let server = TestServer::start(&AppOptions {
        ui_dir: Some(dir.path().to_path_buf()),
        seed: false,
    });

    let index = server.send("GET /ui HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(index.status, 200);
    assert!(index.body.contains("href=\"/docs\""));

    let missing = server.send("GET /ui/nope.css HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(missing.status, 404);
}
