use axum::http::StatusCode;
use axum_test::TestServer;
use reelpack_metadata::ProviderConfig;
use reelpack_server::config::ServerConfig;
use reelpack_server::fetcher::Credentials;
use reelpack_server::routes::build_router;
use reelpack_server::state::AppState;
use serde_json::{Value, json};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IMDB_KEY: &str = "k_test";
const TMDB_KEY: &str = "tmdb-secret";

/// Both upstreams live on one mock server under different prefixes.
fn config(upstream: &MockServer, network_domains: &[&str]) -> ServerConfig {
    ServerConfig {
        bind_addr: "127.0.0.1:0".to_string(),
        credentials: Credentials {
            imdb_api_key: IMDB_KEY.to_string(),
            tmdb_api_key: TMDB_KEY.to_string(),
        },
        providers: ProviderConfig {
            imdb_base_url: format!("{}/en/API", upstream.uri()),
            tmdb_base_url: format!("{}/3", upstream.uri()),
            ..Default::default()
        },
        network_domains: network_domains.iter().map(|d| d.to_string()).collect(),
    }
}

fn test_app(upstream: &MockServer) -> TestServer {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("debug")
        .try_init();
    let app = build_router(AppState::new(config(upstream, &["127.0.0.1"])));
    TestServer::new(app).unwrap()
}

async fn mount_json(upstream: &MockServer, at: &str, body: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(upstream)
        .await;
}

async fn mount_incendies(upstream: &MockServer, search_calls: u64) {
    mount_json(
        upstream,
        "/en/API/SearchMovie/k_test/incendies",
        json!({
            "results": [{ "id": "tt1255953", "title": "Incendies", "description": "(2010)" }],
            "errorMessage": ""
        }),
        search_calls,
    )
    .await;
    mount_json(
        upstream,
        "/en/API/Title/k_test/tt1255953/Ratings,Trailer",
        json!({
            "id": "tt1255953",
            "title": "Incendies",
            "year": "2010",
            "runtimeMins": "131",
            "directors": "Denis Villeneuve",
            "directorList": [{ "id": "nm0898288", "name": "Denis Villeneuve" }],
            "genres": "Drama, Mystery, War",
            "imDbRating": "8.3",
            "errorMessage": ""
        }),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/3/find/tt1255953"))
        .and(query_param("external_source", "imdb_id"))
        .and(query_param("api_key", TMDB_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "movie_results": [{ "id": 46738, "backdrop_path": "/incendies_bd.jpg" }],
            "tv_results": [],
            "person_results": []
        })))
        .expect(1)
        .mount(upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/3/movie/46738/watch/providers"))
        .and(query_param("api_key", TMDB_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": {
                "CA": {
                    "link": "https://www.themoviedb.org/movie/46738/watch?locale=CA",
                    "flatrate": [{ "provider_name": "Crave", "logo_path": "/crave.jpg" }]
                }
            }
        })))
        .expect(1)
        .mount(upstream)
        .await;
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let upstream = MockServer::start().await;
    let server = test_app(&upstream);
    let resp = server.get("/health").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn movie_formula_substitutes_keys_and_merges_upstreams() {
    let upstream = MockServer::start().await;
    mount_incendies(&upstream, 1).await;
    let server = test_app(&upstream);

    let resp = server
        .get("/api/v1/formulas/movie")
        .add_query_param("query", "incendies")
        .add_query_param("country", "ca")
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();

    assert_eq!(body["ImdbId"], "tt1255953");
    assert_eq!(body["Title"], "Incendies");
    assert_eq!(body["Runtime"], "131 minutes");
    assert_eq!(body["ImdbRating"], 8.3);
    assert_eq!(body["TmdbId"], 46738);
    assert_eq!(body["Director"][0]["Name"], "Denis Villeneuve");
    assert_eq!(body["Stream"][0]["Name"], "Crave");
    assert_eq!(body["Stream"][0]["Country"], "CA");
    assert_eq!(body["Buy"], json!([]));
}

#[tokio::test]
async fn id_query_never_searches() {
    let upstream = MockServer::start().await;
    mount_incendies(&upstream, 0).await;
    let server = test_app(&upstream);

    let resp = server
        .get("/api/v1/formulas/movie")
        .add_query_param("query", "tt1255953")
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["ImdbId"], "tt1255953");
    // Default country has no providers in the fixture.
    assert_eq!(body["Stream"], json!([]));
}

#[tokio::test]
async fn empty_search_is_a_not_found_envelope() {
    let upstream = MockServer::start().await;
    mount_json(
        &upstream,
        "/en/API/SearchSeries/k_test/no%20such%20show",
        json!({ "results": [], "errorMessage": "" }),
        1,
    )
    .await;
    let server = test_app(&upstream);

    let resp = server
        .get("/api/v1/formulas/series")
        .add_query_param("query", "no such show")
        .await;
    resp.assert_status(StatusCode::NOT_FOUND);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "not_found");
    assert_eq!(body["error"]["message"], "Couldn't find a series with that title");
    assert_eq!(body["error"]["details"]["kind"], "series");
}

#[tokio::test]
async fn search_error_message_is_shown_verbatim() {
    let upstream = MockServer::start().await;
    mount_json(
        &upstream,
        "/en/API/SearchName/k_test/villeneuve",
        json!({ "results": null, "errorMessage": "Invalid API Key" }),
        1,
    )
    .await;
    let server = test_app(&upstream);

    let resp = server
        .get("/api/v1/formulas/person")
        .add_query_param("query", "villeneuve")
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = resp.json();
    assert_eq!(body["error"]["message"], "Invalid API Key");
}

#[tokio::test]
async fn upstream_failure_is_generic_and_leaks_nothing() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/en/API/Title/k_test/tt1255953/Ratings,Trailer"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&upstream)
        .await;
    // May or may not be reached before the detail request fails.
    Mock::given(method("GET"))
        .and(path("/3/find/tt1255953"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "movie_results": [] })))
        .mount(&upstream)
        .await;
    let server = test_app(&upstream);

    let resp = server
        .get("/api/v1/formulas/movie")
        .add_query_param("query", "tt1255953")
        .await;
    resp.assert_status(StatusCode::BAD_GATEWAY);
    let text = resp.text();
    assert!(text.contains("upstream_error"));
    assert!(!text.contains(IMDB_KEY));
    assert!(!text.contains("500"));
}

#[tokio::test]
async fn undeclared_hosts_are_never_contacted() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&upstream)
        .await;

    let app = build_router(AppState::new(config(&upstream, &["imdb-api.com"])));
    let server = TestServer::new(app).unwrap();

    let resp = server
        .get("/api/v1/formulas/movie")
        .add_query_param("query", "incendies")
        .await;
    resp.assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn blank_query_is_rejected_without_upstream_calls() {
    let upstream = MockServer::start().await;
    let server = test_app(&upstream);

    let resp = server
        .get("/api/v1/formulas/movie")
        .add_query_param("query", "   ")
        .await;
    resp.assert_status(StatusCode::BAD_REQUEST);
    assert!(upstream.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn country_autocomplete_ranks_matches() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/3/watch/providers/regions"))
        .and(query_param("api_key", TMDB_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                { "iso_3166_1": "US", "english_name": "United States of America", "native_name": "United States" },
                { "iso_3166_1": "CA", "english_name": "Canada", "native_name": "Canada" },
                { "iso_3166_1": "CF", "english_name": "Central African Republic", "native_name": "Central African Republic" }
            ]
        })))
        .expect(1)
        .mount(&upstream)
        .await;
    let server = test_app(&upstream);

    let resp = server
        .get("/api/v1/autocomplete/countries")
        .add_query_param("search", "can")
        .await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(
        body,
        json!([
            { "display": "Canada", "value": "CA" },
            { "display": "Central African Republic", "value": "CF" }
        ])
    );
}

#[tokio::test]
async fn schemas_are_served_by_kind() {
    let upstream = MockServer::start().await;
    let server = test_app(&upstream);

    let resp = server.get("/api/v1/schemas/series").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["identity"], "Series");
    assert_eq!(body["primary"], "Title");
    assert_eq!(body["id"], "ImdbId");

    let resp = server.get("/api/v1/schemas/episode").await;
    resp.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn pack_manifest_lists_formulas_and_domains() {
    let upstream = MockServer::start().await;
    let server = test_app(&upstream);

    let resp = server.get("/api/v1/pack").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["network_domains"], json!(["imdb-api.com", "themoviedb.org"]));
    let names: Vec<&str> = body["formulas"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|f| f["name"].as_str())
        .collect();
    assert_eq!(names, vec!["Movie", "Series", "Person"]);
}
