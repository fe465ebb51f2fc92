use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use crudbench::api::BenchApi;
use crudbench::bench::Workload;
use crudbench::testutil::Fixture;

const EXPECTED_KEYS: [&str; 4] = [
    "time_bulk_insert",
    "time_scan_all",
    "time_point_lookup",
    "time_bulk_delete",
];

fn setup() -> (TempDir, Fixture, Router) {
    let dir = TempDir::new().unwrap();
    let fixture = Fixture::new().with_sqlite(dir.path()).unwrap();
    let service = fixture.service(Workload::default()).unwrap();
    let router = BenchApi::new(service).router();
    (dir, fixture, router)
}

async fn get(router: Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let response = router.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes().to_vec();
    (status, bytes)
}

/// Keys in document order, read from the raw body so ordering is checked.
fn ordered_keys(body: &[u8]) -> Vec<String> {
    let text = std::str::from_utf8(body).unwrap();
    text.trim_matches(|c| c == '{' || c == '}')
        .split(',')
        .map(|pair| pair.split(':').next().unwrap().trim_matches('"').to_string())
        .collect()
}

#[tokio::test]
async fn test_health() {
    let (_dir, _fixture, router) = setup();
    let (status, bytes) = get(router, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"OK");
}

#[tokio::test]
async fn test_list_routes() {
    let (_dir, _fixture, router) = setup();
    let (status, bytes) = get(router, "/routes").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&bytes).unwrap();
    let paths: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"/sync/sqlite"));
    assert!(paths.contains(&"/async/sqlite"));
    assert!(paths.contains(&"/async/memory-native"));
    assert!(!paths.contains(&"/async/sqlite-native"));
}

#[tokio::test]
async fn test_benchmark_document() {
    for uri in [
        "/sync/memory",
        "/async/memory",
        "/async/memory-native",
        "/sync/sqlite",
        "/async/sqlite",
    ] {
        let (_dir, fixture, router) = setup();
        let (status, bytes) = get(router, uri).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(ordered_keys(&bytes), EXPECTED_KEYS.to_vec(), "{uri}");

        let json: Value = serde_json::from_slice(&bytes).unwrap();
        for key in EXPECTED_KEYS {
            assert!(json[key].as_f64().unwrap() >= 0.0, "{uri} {key}");
        }
        assert_eq!(fixture.memory.len(), Ok(0));
    }
}

#[tokio::test]
async fn test_repeated_requests_are_idempotent() {
    let (_dir, _fixture, router) = setup();
    let (first_status, first) = get(router.clone(), "/sync/sqlite").await;
    let (second_status, second) = get(router, "/sync/sqlite").await;
    assert_eq!(first_status, StatusCode::OK);
    assert_eq!(second_status, StatusCode::OK);
    assert_eq!(ordered_keys(&first), ordered_keys(&second));
}

#[tokio::test]
async fn test_unknown_routes() {
    let (_dir, _fixture, router) = setup();
    let (status, bytes) = get(router.clone(), "/sync/mongo").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json["error"].as_str().unwrap().contains("/sync/mongo"));

    let (status, _) = get(router.clone(), "/batch/memory").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(router, "/async/sqlite-native").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_backend_fault_returns_no_timings() {
    let (_dir, fixture, router) = setup();
    let (status, bytes) = get(router, "/sync/faulty").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let json: Value = serde_json::from_slice(&bytes).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 1);
    assert!(object["error"].as_str().unwrap().contains("scan_all"));
    // Insert ran, delete never did.
    assert_eq!(fixture.faulty.store().len(), Ok(10_000));
}
