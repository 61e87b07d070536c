//! Integration tests for the scraper
//!
//! These tests use wiremock to stand in for both the catalog website and
//! its persisted-query endpoint, and drive the public façade end-to-end
//! through the real reqwest client.

use reel_harvest::config::{compute_config_hash, load_config, Config};
use reel_harvest::scrape::{RawNodes, Scraped, Scraper};
use reel_harvest::{ConnectionCategory, ProgressLog, ScrapeError};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

/// Matches JSON requests by the `after` cursor in their variables, GET or POST
struct AfterCursor(Option<&'static str>);

impl Match for AfterCursor {
    fn matches(&self, request: &Request) -> bool {
        let variables = if request.body.is_empty() {
            request
                .url
                .query_pairs()
                .find(|(name, _)| name == "variables")
                .and_then(|(_, value)| serde_json::from_str::<Value>(&value).ok())
        } else {
            serde_json::from_slice::<Value>(&request.body)
                .ok()
                .map(|body| body["variables"].clone())
        };

        let after = variables
            .and_then(|v| v.get("after").and_then(Value::as_str).map(str::to_string));
        after.as_deref() == self.0
    }
}

/// Matches requests whose query string lacks a parameter
struct MissingParam(&'static str);

impl Match for MissingParam {
    fn matches(&self, request: &Request) -> bool {
        !request.url.query_pairs().any(|(name, _)| name == self.0)
    }
}

/// Installs a test-writer subscriber; honours `RUST_LOG`
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Creates a configuration pointing every endpoint at the mock server
fn create_test_config(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.site.base_url = server.uri();
    config.site.graphql_url = format!("{}/graphql", server.uri());
    config
}

fn connection_page(field: &str, first: usize, count: usize, next: Option<&str>) -> Value {
    let edges: Vec<Value> = (first..first + count)
        .map(|n| json!({ "node": { "id": format!("n{}", n) } }))
        .collect();
    json!({
        "data": { "title": { field: {
            "total": 210,
            "edges": edges,
            "pageInfo": { "endCursor": next, "hasNextPage": next.is_some() }
        }}}
    })
}

#[tokio::test]
async fn test_filming_dates_via_persisted_queries() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/graphql"))
        .and(query_param("operationName", "TitleFilmingDatesPaginated"))
        .and(AfterCursor(None))
        .respond_with(ResponseTemplate::new(200).set_body_json(connection_page(
            "filmingDates",
            0,
            150,
            Some("cursor-2"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/graphql"))
        .and(AfterCursor(Some("cursor-2")))
        .respond_with(ResponseTemplate::new(200).set_body_json(connection_page(
            "filmingDates",
            150,
            60,
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let scraper =
        Scraper::from_config(create_test_config(&server)).expect("Failed to build scraper");
    let scraped = scraper
        .filming_dates("tt0068646", None, &RawNodes)
        .await
        .expect("Expected filming dates");

    assert_eq!(scraped.node_count(), 210);
    let first = scraped.nodes().next().and_then(|n| n.as_json()).unwrap();
    assert_eq!(first["id"], "n0");

    let record = &scraper.progress().history()[0];
    assert_eq!(record.steps.len(), 1);
    assert_eq!(record.steps[0].finished_requests, 2);
    assert_eq!(record.progress, 1.0);
}

#[tokio::test]
async fn test_unknown_hash_falls_back_to_full_query() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/graphql"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"errors":[{"message":"PersistedQueryNotFound"}]}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(body_string_contains("\"query\""))
        .and(body_string_contains("TitleQuotesPagination"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(connection_page("quotes", 0, 7, None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let scraper =
        Scraper::from_config(create_test_config(&server)).expect("Failed to build scraper");
    let count = scraper
        .quotes("tt0068646", None, &|s: &Scraped| Some(s.node_count()))
        .await;

    assert_eq!(count, Some(7));
}

#[tokio::test]
async fn test_reviews_follow_continuation_keys() {
    init_tracing();
    let server = MockServer::start().await;
    let reviews = "/title/tt0068646/reviews/_ajax";

    Mock::given(method("GET"))
        .and(path(reviews))
        .and(MissingParam("paginationKey"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><head><script>track()</script></head><body>
            <div class="review">An offer he couldn't refuse</div>
            <div class="load-more-data" data-key="k1"></div>
            </body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(reviews))
        .and(query_param("paginationKey", "k1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body><div class="review">Leave the gun</div></body></html>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let scraper =
        Scraper::from_config(create_test_config(&server)).expect("Failed to build scraper");
    let scraped = scraper
        .reviews("tt0068646", None, &RawNodes)
        .await
        .expect("Expected reviews");

    assert_eq!(scraped.node_count(), 2);
    let first = scraped.nodes().next().and_then(|n| n.as_html()).unwrap();
    assert!(first.contains("An offer he couldn't refuse"));
    assert!(!first.contains("track()"));
}

#[tokio::test]
async fn test_episodes_discover_season_count() {
    init_tracing();
    let server = MockServer::start().await;
    let episodes = "/title/tt0903747/episodes/_ajax";

    for season in 1..=3 {
        Mock::given(method("GET"))
            .and(path(episodes))
            .and(query_param("season", season.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<select id="bySeason"><option>1</option><option>2</option><option>3</option></select>
                <div class="eplist">Season {}</div>"#,
                season
            )))
            .expect(1)
            .mount(&server)
            .await;
    }

    let scraper =
        Scraper::from_config(create_test_config(&server)).expect("Failed to build scraper");
    let seasons = scraper
        .episodes("tt0903747", None, &|s: &Scraped| Some(s.node_count()))
        .await;

    assert_eq!(seasons, Some(3));
}

#[tokio::test]
async fn test_connections_subset_and_progress_observer() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/graphql"))
        .and(query_param("operationName", "TitleConnectionsSubPagePagination"))
        .respond_with(ResponseTemplate::new(200).set_body_json(connection_page(
            "connections",
            0,
            3,
            None,
        )))
        .expect(2)
        .mount(&server)
        .await;

    let scraper =
        Scraper::from_config(create_test_config(&server)).expect("Failed to build scraper");

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    scraper
        .progress()
        .subscribe(move |log: &ProgressLog| sink.lock().unwrap().push(log.progress));

    let scraped = scraper
        .connections_in(
            "tt0068646",
            &[ConnectionCategory::Follows, ConnectionCategory::FollowedBy],
            &RawNodes,
        )
        .await
        .expect("Expected connections");

    assert_eq!(scraped.batches.len(), 2);
    assert_eq!(scraped.node_count(), 6);

    let seen = seen.lock().unwrap();
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(*seen.last().unwrap(), 1.0);
}

#[tokio::test]
async fn test_repeated_calls_hit_the_cache() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/title/tt0068646/releaseinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html><body>1972</body></html>"))
        .expect(1)
        .mount(&server)
        .await;

    let scraper =
        Scraper::from_config(create_test_config(&server)).expect("Failed to build scraper");
    for _ in 0..3 {
        let found = scraper
            .page("tt0068646", "releaseinfo", &|s: &Scraped| {
                s.nodes().next().and_then(|n| n.as_html()).map(|h| h.contains("1972"))
            })
            .await;
        assert_eq!(found, Some(true));
    }

    assert_eq!(scraper.cache().stats().hits, 2);
    assert_eq!(scraper.progress().history().len(), 3);
}

#[tokio::test]
async fn test_unreachable_upstream_yields_no_data() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let scraper =
        Scraper::from_config(create_test_config(&server)).expect("Failed to build scraper");

    assert!(scraper.trivia("tt0068646", None, &RawNodes).await.is_none());
    assert!(scraper.reviews("tt0068646", None, &RawNodes).await.is_none());
    assert!(scraper.cache().is_empty());
    assert!(scraper.progress().history().iter().all(|log| log.is_finished()));
}

#[test]
fn test_missing_config_file_is_a_config_error() {
    let result = Scraper::from_config_file(std::path::Path::new("/nonexistent/harvest.toml"));
    assert!(matches!(result, Err(ScrapeError::Config(_))));
}

#[tokio::test]
async fn test_config_file_drives_scraper() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/graphql"))
        .and(query_param("operationName", "TitleNewsPagination"))
        .respond_with(ResponseTemplate::new(200).set_body_json(connection_page(
            "news",
            0,
            5,
            Some("more"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut file = tempfile::NamedTempFile::new().expect("Failed to create temp file");
    write!(
        file,
        r#"
[site]
base-url = "{uri}"
graphql-url = "{uri}/graphql"
locale = "en-GB"
accept-language = "en-GB"

[user-agent]
name = "TestBot"
version = "1.0.0"
contact-url = "https://example.com/contact"

[pagination]
page-size = 5
default-max-pages = 1
"#,
        uri = server.uri()
    )
    .expect("Failed to write config");

    let config = load_config(file.path()).expect("Failed to load config");
    assert_eq!(config.pagination.default_max_pages, 1);

    let scraper = Scraper::from_config_file(file.path()).expect("Failed to build scraper");
    let expected_hash = compute_config_hash(file.path()).expect("Failed to hash config");
    assert_eq!(scraper.config_hash(), Some(expected_hash.as_str()));
    assert_eq!(scraper.config().site.locale, "en-GB");
    let scraped = scraper
        .news("tt0068646", None, &RawNodes)
        .await
        .expect("Expected news");

    assert_eq!(scraped.node_count(), 5);

    let requests = server.received_requests().await.unwrap();
    let variables: Value = requests[0]
        .url
        .query_pairs()
        .find(|(name, _)| name == "variables")
        .and_then(|(_, value)| serde_json::from_str(&value).ok())
        .unwrap();
    assert_eq!(variables["first"], 5);
    assert_eq!(variables["locale"], "en-GB");
}
