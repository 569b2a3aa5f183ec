use std::sync::Arc;

use httpmock::prelude::*;

use newsdesk::clients::{ArticleStore, HttpArticleStore, SearchOptions};
use newsdesk::services::search::AdvancedFilters;
use newsdesk::services::{AnalyticsService, ProfileStore, SearchService, SuggestService};

fn search_service(base_url: &str, data_dir: &tempfile::TempDir) -> SearchService {
    let store: Arc<dyn ArticleStore> = Arc::new(HttpArticleStore::new(
        reqwest::Client::new(),
        base_url,
        None,
    ));
    let profiles = Arc::new(ProfileStore::open(data_dir.path()).unwrap());
    let analytics = Arc::new(AnalyticsService::new(Arc::clone(&profiles)));
    SearchService::new(store, profiles, analytics)
}

#[tokio::test]
async fn remote_leg_requests_eighty_percent_of_the_page() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/articles")
            .query_param("limit", "16");
        then.status(200).json_body(serde_json::json!([]));
    });

    let dir = tempfile::tempdir().unwrap();
    let service = search_service(&server.base_url(), &dir);

    let options = SearchOptions {
        limit: 20,
        include_static: false,
        ..SearchOptions::default()
    };
    let results = service
        .unified_search("quantum", &options, &AdvancedFilters::default())
        .await;

    mock.assert();
    assert!(results.error.is_none());
}

#[tokio::test]
async fn failed_pages_are_never_cached() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/articles");
        then.status(500).body("boom");
    });

    let dir = tempfile::tempdir().unwrap();
    let service = search_service(&server.base_url(), &dir);
    let options = SearchOptions {
        include_static: false,
        ..SearchOptions::default()
    };

    let first = service
        .unified_search("quantum", &options, &AdvancedFilters::default())
        .await;
    let second = service
        .unified_search("quantum", &options, &AdvancedFilters::default())
        .await;

    assert!(first.error.is_some());
    assert!(!second.cache_hit);
    mock.assert_hits(2);
    assert_eq!(service.cached_pages(), 0);
}

#[tokio::test]
async fn successful_pages_are_cached_for_identical_requests() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/articles");
        then.status(200).json_body(serde_json::json!([
            {
                "id": 1,
                "title": "Quantum roundup",
                "source": "TechWire"
            }
        ]));
    });

    let dir = tempfile::tempdir().unwrap();
    let service = search_service(&server.base_url(), &dir);
    let options = SearchOptions {
        include_static: false,
        ..SearchOptions::default()
    };

    let first = service
        .unified_search("quantum", &options, &AdvancedFilters::default())
        .await;
    let second = service
        .unified_search("quantum", &options, &AdvancedFilters::default())
        .await;

    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(first.total, second.total);
    mock.assert_hits(1);
}

#[tokio::test]
async fn spreadsheet_booleans_feed_the_scorer() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/articles");
        then.status(200).json_body(serde_json::json!([
            {
                "id": 1,
                "title": "Quantum plain",
                "source": "A"
            },
            {
                "id": 2,
                "title": "Quantum flagged",
                "source": "B",
                "featured": "TRUE",
                "is_top_story": 1
            }
        ]));
    });

    let dir = tempfile::tempdir().unwrap();
    let service = search_service(&server.base_url(), &dir);
    let options = SearchOptions {
        include_static: false,
        ..SearchOptions::default()
    };

    let results = service
        .unified_search("quantum", &options, &AdvancedFilters::default())
        .await;

    // The flagged row outranks the plain one on the normalized booleans.
    assert_eq!(results.results[0].article.id, "2");
    assert!(results.results[0].article.featured);
    assert!(results.results[0].article.is_top_story);
}

#[tokio::test]
async fn suggestions_use_store_titles_when_available() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/articles");
        then.status(200).json_body(serde_json::json!([
            { "title": "Quantum computing explained" },
            { "title": "Understanding quantum links" }
        ]));
    });

    let dir = tempfile::tempdir().unwrap();
    let store: Arc<dyn ArticleStore> = Arc::new(HttpArticleStore::new(
        reqwest::Client::new(),
        server.base_url(),
        None,
    ));
    let profiles = Arc::new(ProfileStore::open(dir.path()).unwrap());
    let suggest = SuggestService::new(store, profiles);

    let suggestions = suggest.suggest("quan", 5).await;

    // Any title word extending the query qualifies, first or mid-title,
    // and case-insensitive dedupe collapses the repeats.
    assert!(suggestions.contains(&"Quantum".to_string()));
    assert_eq!(
        suggestions
            .iter()
            .filter(|s| s.eq_ignore_ascii_case("quantum"))
            .count(),
        1
    );
    assert!(!suggestions.iter().any(|s| s.starts_with("Understanding")));
}
