use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use httpmock::prelude::*;
use newsdesk::config::Config;
use tower::ServiceExt;

struct TestApp {
    app: Router,
    server: MockServer,
    _data_dir: tempfile::TempDir,
}

async fn spawn_app() -> TestApp {
    let server = MockServer::start();
    let data_dir = tempfile::tempdir().expect("tempdir");

    let mut config = Config::default();
    config.store.base_url = server.base_url();
    config.general.data_path = data_dir.path().to_string_lossy().into_owned();

    let state = newsdesk::api::create_app_state_from_config(config, None)
        .expect("Failed to create app state");
    let app = newsdesk::api::router(state).await;

    TestApp {
        app,
        server,
        _data_dir: data_dir,
    }
}

fn store_rows() -> serde_json::Value {
    serde_json::json!([
        {
            "id": 101,
            "title": "Quantum computing breakthrough announced",
            "description": "Researchers demonstrate a new error-correction scheme",
            "content_snippet": "quantum error correction qubits",
            "link": "https://example.com/quantum-breakthrough",
            "source": "TechWire",
            "author": "A. Jones",
            "pub_date": chrono::Utc::now().to_rfc3339(),
            "category": "News",
            "featured": "TRUE",
            "breaking_news": false,
            "word_count": "1450",
            "trending_score": 8.2
        },
        {
            "id": "102",
            "title": "Quantum chips: a field guide",
            "description": "How the hardware actually works",
            "link": "https://example.com/quantum-chips",
            "source": "Hardware Daily",
            "word_count": 600
        }
    ])
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_system_status() {
    let test = spawn_app().await;

    let response = test
        .app
        .oneshot(
            Request::builder()
                .uri("/api/system/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert!(json["data"]["version"].is_string());
    assert_eq!(json["data"]["cached_search_pages"], 0);
}

#[tokio::test]
async fn test_search_returns_merged_results() {
    let test = spawn_app().await;
    test.server.mock(|when, then| {
        when.method(GET).path("/articles");
        then.status(200).json_body(store_rows());
    });

    let response = test
        .app
        .oneshot(
            Request::builder()
                .uri("/api/search?q=quantum")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["total"], 2);
    assert_eq!(json["data"]["sources"]["rss"], 2);
    assert!(json["data"]["error"].is_null());

    // Spreadsheet-style "TRUE" normalizes to a real boolean at ingestion.
    let results = json["data"]["results"].as_array().unwrap();
    let featured = results
        .iter()
        .find(|r| r["id"] == "101")
        .expect("featured row present");
    assert_eq!(featured["featured"], true);
    assert_eq!(featured["content_type"], "rss");
}

#[tokio::test]
async fn test_search_degrades_when_store_is_down() {
    let test = spawn_app().await;
    test.server.mock(|when, then| {
        when.method(GET).path("/articles");
        then.status(503).body("maintenance");
    });

    let response = test
        .app
        .oneshot(
            Request::builder()
                .uri("/api/search?q=midjourney")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Store failures degrade the search; they never fail the endpoint.
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert!(json["data"]["error"].is_string());

    // The original-content leg still answers.
    let results = json["data"]["results"].as_array().unwrap();
    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r["content_type"] == "original"));
}

#[tokio::test]
async fn test_search_rejects_bad_limit() {
    let test = spawn_app().await;

    let response = test
        .app
        .oneshot(
            Request::builder()
                .uri("/api/search?q=ai&limit=0")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["success"], false);
}

#[tokio::test]
async fn test_search_fragment_renders_html() {
    let test = spawn_app().await;
    test.server.mock(|when, then| {
        when.method(GET).path("/articles");
        then.status(200).json_body(store_rows());
    });

    let response = test
        .app
        .oneshot(
            Request::builder()
                .uri("/api/search/fragment?q=quantum")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let html = String::from_utf8(body.to_vec()).unwrap();
    assert!(html.contains("search-result-item"));
    assert!(html.contains("<mark>"));
}

#[tokio::test]
async fn test_suggestions_survive_store_outage() {
    let test = spawn_app().await;
    test.server.mock(|when, then| {
        when.method(GET).path("/articles");
        then.status(500);
    });

    let response = test
        .app
        .oneshot(
            Request::builder()
                .uri("/api/search/suggestions?q=clau")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let suggestions = json["data"].as_array().unwrap();
    assert!(
        suggestions
            .iter()
            .any(|s| s.as_str() == Some("Claude review"))
    );
    assert!(suggestions.iter().any(|s| s.as_str() == Some("Claude")));
}

#[tokio::test]
async fn test_latest_articles() {
    let test = spawn_app().await;
    test.server.mock(|when, then| {
        when.method(GET).path("/articles");
        then.status(200).json_body(store_rows());
    });

    let response = test
        .app
        .oneshot(
            Request::builder()
                .uri("/api/articles/latest?limit=5")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["data"]["articles"].as_array().unwrap().len(), 2);

    // The row flagged featured leads the top-stories strip.
    let top = json["data"]["top_stories"].as_array().unwrap();
    assert_eq!(top[0]["id"], "101");
}

#[tokio::test]
async fn test_cache_clear_forces_refetch() {
    let test = spawn_app().await;
    let mock = test.server.mock(|when, then| {
        when.method(GET).path("/articles");
        then.status(200).json_body(store_rows());
    });

    for _ in 0..2 {
        let response = test
            .app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/search?q=quantum")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // Identical page served from cache.
    mock.assert_hits(1);

    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/system/cache/clear")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test
        .app
        .oneshot(
            Request::builder()
                .uri("/api/search?q=quantum")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    mock.assert_hits(2);
}

#[tokio::test]
async fn test_analytics_track_searches() {
    let test = spawn_app().await;
    test.server.mock(|when, then| {
        when.method(GET).path("/articles");
        then.status(200).json_body(store_rows());
    });

    test.app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/search?q=how+to+use+quantum+computers")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let response = test
        .app
        .oneshot(
            Request::builder()
                .uri("/api/analytics/summary")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_json(response).await;
    assert_eq!(json["data"]["total_searches"], 1);
    let recent = json["data"]["recent_events"].as_array().unwrap();
    assert_eq!(recent[0]["query_type"], "tutorial");
}

#[tokio::test]
async fn test_profile_roundtrip_and_clear() {
    let test = spawn_app().await;
    test.server.mock(|when, then| {
        when.method(GET).path("/articles");
        then.status(200).json_body(store_rows());
    });

    test.app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/search?q=quantum+hardware")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/profile")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = body_json(response).await;
    let recent = json["data"]["recent_searches"].as_array().unwrap();
    assert_eq!(recent[0], "quantum hardware");
    assert!(json["data"]["profile"]["interests"]["quantum"].is_number());

    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/api/profile")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test
        .app
        .oneshot(
            Request::builder()
                .uri("/api/profile")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_json(response).await;
    assert!(
        json["data"]["recent_searches"]
            .as_array()
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_config_update_validates() {
    let test = spawn_app().await;

    let mut bad_config = serde_json::to_value(Config::default()).unwrap();
    bad_config["store"]["base_url"] = serde_json::json!("");

    let response = test
        .app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/api/system/config")
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&bad_config).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
