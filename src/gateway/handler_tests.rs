//! Gateway tests driven through the router with `tower::ServiceExt::oneshot`.

use axum::{Router, body::Body, http::Request, http::StatusCode};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use crate::cache::{CACHE_STATUS_HEADER, ComparisonCaches};
use crate::embedding::MockEmbeddingProvider;
use crate::gateway::error::ERROR_KIND_HEADER;
use crate::gateway::handler::{UploadForm, search_options};
use crate::gateway::state::HandlerState;
use crate::gateway::{GatewayError, create_router_with_limit, create_router_with_state};
use crate::pipeline::ComparisonPipeline;
use crate::search::{CorpusRecord, InMemoryCorpus, SearchOptions};

const BOUNDARY: &str = "facefind-test-boundary";
const SKETCH: &[u8] = b"sketch-bytes";
const PHOTO: &[u8] = b"photo-bytes";
const TEST_CACHE_CAPACITY: usize = 64;

#[derive(Clone, Copy)]
enum Part<'a> {
    File(&'a [u8]),
    Text(&'a str),
}

fn multipart_body(parts: &[(&str, Part<'_>)]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, part) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File(bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{name}.png\"\r\n\
                         Content-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text(value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(uri: &str, parts: &[(&str, Part<'_>)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

fn compare_request(extra: &[(&str, Part<'_>)]) -> Request<Body> {
    let mut parts = vec![("sketch", Part::File(SKETCH)), ("photo", Part::File(PHOTO))];
    parts.extend_from_slice(extra);
    multipart_request("/api/compare", &parts)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn angled(degrees: f32) -> Vec<f32> {
    let rad = degrees.to_radians();
    vec![rad.cos(), rad.sin()]
}

/// Sketch and photo 30° apart, plus a five-record corpus around the sketch.
fn test_state() -> (HandlerState<MockEmbeddingProvider>, MockEmbeddingProvider) {
    let mut mock = MockEmbeddingProvider::new()
        .with_model_name("mock-facenet")
        .with_vector(SKETCH, vec![1.0, 0.0])
        .with_vector(PHOTO, angled(30.0));

    let mut records = Vec::new();
    for (id, deg) in [("a", 20.0), ("b", 60.0), ("c", 5.0), ("d", 80.0), ("e", 40.0)] {
        let photo = format!("corpus-{id}").into_bytes();
        mock = mock.with_vector(&photo, angled(deg));
        records.push(CorpusRecord::new(id, format!("{id}.jpg"), photo));
    }

    let pipeline = ComparisonPipeline::new(
        Arc::new(mock.clone()),
        Arc::new(ComparisonCaches::new(TEST_CACHE_CAPACITY)),
    );
    let state = HandlerState::new(
        pipeline,
        Arc::new(InMemoryCorpus::new(records)),
        SearchOptions::default(),
    );
    (state, mock)
}

fn test_router() -> (Router, MockEmbeddingProvider) {
    let (state, mock) = test_state();
    (create_router_with_state(state), mock)
}

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_reports_service() {
        let (app, _) = test_router();

        let response = app.oneshot(get("/api/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "FaceFind");
        let timestamp = json["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
    }
}

mod compare_tests {
    use super::*;

    #[tokio::test]
    async fn test_compare_miss_then_hit() {
        let (app, _) = test_router();

        let first = app.clone().oneshot(compare_request(&[])).await.unwrap();
        assert_eq!(first.status(), StatusCode::OK);
        assert_eq!(first.headers()[CACHE_STATUS_HEADER], "MISS");
        let first = body_json(first).await;
        assert_eq!(first["success"], true);
        assert_eq!(first["from_cache"], false);
        assert_eq!(first["model_used"], "mock-facenet");
        assert_eq!(first["metric_used"], "cosine");
        assert!(first.get("error").is_none());

        let second = app.oneshot(compare_request(&[])).await.unwrap();
        assert_eq!(second.headers()[CACHE_STATUS_HEADER], "HIT");
        let second = body_json(second).await;
        assert_eq!(second["from_cache"], true);
        assert_eq!(second["similarity"], first["similarity"]);
        assert_eq!(second["distance"], first["distance"]);
    }

    #[tokio::test]
    async fn test_compare_without_cache_never_hits() {
        let (app, mock) = test_router();

        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(compare_request(&[("use_cache", Part::Text("false"))]))
                .await
                .unwrap();
            assert_eq!(response.headers()[CACHE_STATUS_HEADER], "MISS");
        }
        assert_eq!(mock.calls(), 4);
    }

    #[tokio::test]
    async fn test_compare_forced_domains() {
        let (app, _) = test_router();

        let response = app
            .oneshot(compare_request(&[
                ("sketch_domain", Part::Text("sketch")),
                ("photo_domain", Part::Text("photo")),
            ]))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["is_cross_domain"], true);
        assert_eq!(json["probe_domain"], "sketch");
        assert_eq!(json["reference_domain"], "photo");
    }

    #[tokio::test]
    async fn test_compare_unknown_domain_is_bad_request() {
        let (app, _) = test_router();

        let response = app
            .oneshot(compare_request(&[("sketch_domain", Part::Text("painting"))]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers()[ERROR_KIND_HEADER], "invalid_request");
    }

    #[tokio::test]
    async fn test_compare_missing_photo_is_bad_request() {
        let (app, _) = test_router();

        let response = app
            .oneshot(multipart_request(
                "/api/compare",
                &[("sketch", Part::File(SKETCH))],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["code"], 400);
        assert!(json["error"].as_str().unwrap().contains("photo"));
    }

    #[tokio::test]
    async fn test_compare_provider_failure_is_sentinel() {
        let (state, mock) = test_state();
        mock.set_failure(PHOTO);
        let app = create_router_with_state(state);

        let response = app.oneshot(compare_request(&[])).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["confidence_level"], "error");
        assert_eq!(json["distance"], 1.0);
        assert_eq!(json["similarity"], 0.0);
        assert!(json["error"].as_str().unwrap().contains("no face detected"));
    }

    #[tokio::test]
    async fn test_upload_over_limit_is_rejected() {
        let (state, _) = test_state();
        let app = create_router_with_limit(state, 64);
        let large = vec![7u8; 1024];

        let response = app
            .oneshot(multipart_request(
                "/api/compare",
                &[("sketch", Part::File(&large)), ("photo", Part::File(PHOTO))],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

mod search_tests {
    use super::*;

    #[tokio::test]
    async fn test_search_returns_ranked_matches() {
        let (app, _) = test_router();

        let response = app
            .oneshot(multipart_request(
                "/api/search",
                &[("sketch", Part::File(SKETCH))],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = body_json(response).await;
        assert!(uuid::Uuid::parse_str(json["search_id"].as_str().unwrap()).is_ok());
        assert_eq!(json["total_matches"], 3);
        assert_eq!(json["searched_records"], 5);
        assert_eq!(json["failed_records"], 0);
        assert!(json["threshold_used"].is_null());

        let matches = json["matches"].as_array().unwrap();
        let ids: Vec<_> = matches
            .iter()
            .map(|m| m["record"]["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["c", "a", "e"]);
        assert_eq!(matches[0]["rank"], 1);
        assert_eq!(matches[0]["record"]["filename"], "c.jpg");
    }

    #[tokio::test]
    async fn test_search_threshold_becomes_min_similarity() {
        let (app, _) = test_router();

        // 0.9 * 0.6 = 0.54: cos(60°) = 0.5 and cos(80°) fall below it.
        let response = app
            .oneshot(multipart_request(
                "/api/search",
                &[
                    ("sketch", Part::File(SKETCH)),
                    ("top_k", Part::Text("5")),
                    ("threshold", Part::Text("0.9")),
                ],
            ))
            .await
            .unwrap();

        let json = body_json(response).await;
        assert_eq!(json["threshold_used"], 0.54);
        assert_eq!(json["total_matches"], 3);
    }

    #[tokio::test]
    async fn test_search_probe_without_face_is_unprocessable() {
        let (state, mock) = test_state();
        mock.set_failure(SKETCH);
        let app = create_router_with_state(state);

        let response = app
            .oneshot(multipart_request(
                "/api/search",
                &[("sketch", Part::File(SKETCH))],
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.headers()[ERROR_KIND_HEADER], "probe_error");
    }

    #[tokio::test]
    async fn test_search_rejects_bad_fields() {
        for (name, value) in [("top_k", "0"), ("top_k", "many"), ("threshold", "1.5")] {
            let (app, _) = test_router();
            let response = app
                .oneshot(multipart_request(
                    "/api/search",
                    &[("sketch", Part::File(SKETCH)), (name, Part::Text(value))],
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{name}={value}");
        }
    }

    #[test]
    fn test_search_options_over_defaults() {
        let defaults = SearchOptions::default().top_k(7).concurrency(2);

        let options = search_options(&UploadForm::default(), defaults).unwrap();
        assert_eq!(options, defaults);

        let form = UploadForm::from_parts([
            ("top_k", b"2".to_vec()),
            ("threshold", b" 0.2 ".to_vec()),
        ]);
        let options = search_options(&form, defaults).unwrap();
        assert_eq!(options.top_k, 2);
        assert_eq!(options.concurrency, 2);
        assert_eq!(options.min_similarity, Some(0.30));
    }
}

mod cache_tests {
    use super::*;

    #[tokio::test]
    async fn test_stats_then_clear() {
        let (app, _) = test_router();

        app.clone().oneshot(compare_request(&[])).await.unwrap();

        let stats = body_json(app.clone().oneshot(get("/api/cache/stats")).await.unwrap()).await;
        assert_eq!(stats["embedding_cache_size"], 2);
        assert_eq!(stats["result_cache_size"], 1);
        assert_eq!(stats["max_size"], TEST_CACHE_CAPACITY);
        assert_eq!(stats["model"], "mock-facenet");

        let response = app.clone().oneshot(post("/api/cache/clear")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cleared = body_json(response).await;
        assert_eq!(cleared["message"], "Caches cleared successfully");
        assert_eq!(cleared["result_cache_cleared"], 1);
        assert_eq!(cleared["embedding_cache_cleared"], 2);

        let stats = body_json(app.oneshot(get("/api/cache/stats")).await.unwrap()).await;
        assert_eq!(stats["embedding_cache_size"], 0);
        assert_eq!(stats["result_cache_size"], 0);
    }
}

mod error_tests {
    use super::*;
    use axum::response::IntoResponse;

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = GatewayError::ProviderError("timeout".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(response.headers()[ERROR_KIND_HEADER], "provider_error");
        let json = body_json(response).await;
        assert_eq!(json["code"], 502);
        assert_eq!(json["error"], "provider error: timeout");
    }
}
