//! End-to-end HTTP tests through the axum router.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use batchrelay_gateway::app_state::AppState;
use batchrelay_gateway::config;
use batchrelay_gateway::router::build_router;

use common::RecordingSink;

fn app(sink: Arc<RecordingSink>) -> Router {
    build_router(AppState::with_sink(common::config(), sink))
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, axum::http::HeaderMap, Value) {
    let body = body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty);
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, json)
}

#[tokio::test]
async fn scenario_success_skip_error() {
    let sink = Arc::new(RecordingSink::scripted());
    let body = json!({
        "deviceId": "dev-1",
        "records": [
            { "userId": "a", "total": 3 },
            { "total": 3 },
            { "userId": "boom" }
        ]
    });

    let (status, _, json) = send(app(Arc::clone(&sink)), "POST", "/api/bulk-sync", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "done");
    assert_eq!(json["total"], 3);
    assert_eq!(json["successCount"], 1);
    assert_eq!(json["skippedCount"], 1);
    assert_eq!(json["errorCount"], 1);

    let statuses: Vec<&str> = json["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, ["success", "skipped", "error"]);
    assert_eq!(json["results"][0]["mainResponse"], json!({ "accepted": true }));
    assert_eq!(json["results"][1]["reason"], "customCheck_failed");
    assert_eq!(json["results"][2]["error"], "downstream error 500: db down");
    assert_eq!(sink.calls(), 2);
}

#[tokio::test]
async fn all_records_failing_is_still_200() {
    let sink = Arc::new(RecordingSink::scripted());
    let body = json!({ "records": [{ "userId": "" }, { "userId": "boom" }] });

    let (status, _, json) = send(app(Arc::clone(&sink)), "POST", "/api/bulk-sync", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["successCount"], 0);
    assert_eq!(json["skippedCount"], 1);
    assert_eq!(json["errorCount"], 1);
}

#[tokio::test]
async fn oversized_batch_is_400_without_downstream_calls() {
    let sink = Arc::new(RecordingSink::scripted());
    let body = json!({ "records": vec![json!({ "userId": "a" }); 4] });

    let (status, _, json) = send(app(Arc::clone(&sink)), "POST", "/api/bulk-sync", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BATCH_TOO_LARGE");
    assert_eq!(json["max"], 3);
    assert_eq!(json["received"], 4);
    assert_eq!(sink.calls(), 0);
}

#[tokio::test]
async fn bad_records_field_is_400() {
    for body in [
        Some(json!({ "records": [] })),
        Some(json!({ "records": { "userId": "a" } })),
        Some(json!({ "deviceId": "d" })),
        None,
    ] {
        let sink = Arc::new(RecordingSink::scripted());
        let (status, _, json) = send(app(Arc::clone(&sink)), "POST", "/api/bulk-sync", body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "BAD_REQUEST");
        assert_eq!(json["message"], "records must be a non-empty array");
        assert_eq!(sink.calls(), 0);
    }
}

#[tokio::test]
async fn non_string_device_id_is_400() {
    let sink = Arc::new(RecordingSink::scripted());
    let body = json!({ "deviceId": 7, "records": [{ "userId": "a" }] });

    let (status, _, json) = send(app(Arc::clone(&sink)), "POST", "/api/bulk-sync", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["message"], "deviceId must be a string or null");
    assert_eq!(sink.calls(), 0);
}

#[tokio::test]
async fn panicking_sink_is_500_internal() {
    let sink = Arc::new(RecordingSink::new(|_| panic!("sink defect")));
    let body = json!({ "records": [{ "userId": "a" }] });

    let (status, _, json) = send(app(sink), "POST", "/api/bulk-sync", Some(body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL");
    assert_eq!(json["message"], "Unexpected error in relay");
    assert!(json["error"].as_str().unwrap().contains("batch task failed"));
}

#[tokio::test]
async fn malformed_json_is_400() {
    let sink = Arc::new(RecordingSink::scripted());
    let req = Request::builder()
        .method("POST")
        .uri("/api/bulk-sync")
        .body(Body::from("{\"records\": ["))
        .unwrap();
    let resp = app(sink).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn wrong_method_is_405_with_allow_header() {
    let sink = Arc::new(RecordingSink::scripted());
    let (status, headers, json) = send(app(sink), "GET", "/api/location-sync", None).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(headers.get(header::ALLOW).unwrap(), "POST");
    assert_eq!(json["message"], "Method not allowed");
}

#[tokio::test]
async fn geolocation_route_uses_its_own_rules() {
    let sink = Arc::new(RecordingSink::scripted());
    let sample = json!({
        "id": "s-1",
        "locationId": "loc-1",
        "latitude": 40.41,
        "longitude": -3.70,
        "startTime": "2026-10-01T08:00:00Z"
    });
    let body = json!({
        "deviceId": "tracker-2",
        "records": [
            { "id": 1, "payload": sample.to_string() },
            { "id": 2, "payload": { "id": "s-2" } }
        ]
    });

    let (status, _, json) = send(app(Arc::clone(&sink)), "POST", "/api/location-sync", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["successCount"], 1);
    assert_eq!(json["skippedCount"], 1);
    assert_eq!(json["results"][0]["record"]["id"], 1);
    assert_eq!(sink.seen.lock().unwrap()[0]["deviceId"], "tracker-2");
}

#[tokio::test]
async fn ops_endpoints() {
    let sink = Arc::new(RecordingSink::scripted());
    let router = app(Arc::clone(&sink));

    let body = json!({ "records": [{ "userId": "a" }] });
    let (status, _, _) = send(router.clone(), "POST", "/api/bulk-sync", Some(body)).await;
    assert_eq!(status, StatusCode::OK);

    let resp = router
        .clone()
        .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = router
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("batchrelay_batches_total{integration=\"bulk-sync\",result=\"done\"} 1"));
    assert!(text.contains("batchrelay_records_total{integration=\"bulk-sync\",outcome=\"success\"} 1"));
}

#[tokio::test]
async fn readyz_reports_draining() {
    let state = AppState::with_sink(common::config(), Arc::new(RecordingSink::scripted()));
    let router = build_router(state.clone());
    state.set_draining();

    let resp = router
        .oneshot(Request::builder().uri("/readyz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn forwards_over_http_to_downstream() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/your-endpoint"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .expect(2)
        .mount(&server)
        .await;

    let yaml = format!(
        r#"
version: 1
downstream:
  base_url: "{}"
integrations:
  - id: bulk-sync
    route: /api/bulk-sync
"#,
        server.uri()
    );
    let cfg = config::load_from_str(&yaml).unwrap();
    let router = build_router(AppState::new(cfg).unwrap());

    let body = json!({ "records": [{ "userId": "a" }, { "userId": "b" }, { "userId": null }] });
    let (status, _, json) = send(router, "POST", "/api/bulk-sync", Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["successCount"], 2);
    assert_eq!(json["skippedCount"], 1);
    // unparsable acknowledgement reads as {}
    assert_eq!(json["results"][0]["mainResponse"], json!({}));
}
