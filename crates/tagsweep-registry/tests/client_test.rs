//! Integration tests for the registry client.
//!
//! Each test serves a fake Harbor API from an in-process axum server bound to
//! an ephemeral port, then drives the real `RegistryClient` against it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tagsweep_registry::{ProjectId, RegistryApi, RegistryAuth, RegistryClient, RegistryConfig, RegistryError};

type Responder = Arc<dyn Fn(&Method, &str, &str) -> Reply + Send + Sync>;

/// A canned response from the fake registry.
struct Reply {
    status: StatusCode,
    headers: Vec<(&'static str, String)>,
    body: String,
}

impl Reply {
    fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }
}

impl From<(StatusCode, String)> for Reply {
    fn from((status, body): (StatusCode, String)) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body,
        }
    }
}

/// A request as seen by the fake registry.
#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    query: String,
    authorization: Option<String>,
}

#[derive(Clone)]
struct FakeHarbor {
    responder: Responder,
    delay: Option<Duration>,
    log: Arc<Mutex<Vec<Recorded>>>,
}

async fn handle(
    State(fake): State<FakeHarbor>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
) -> Response {
    let path = uri.path().to_string();
    let query = uri.query().unwrap_or_default().to_string();
    fake.log.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        query: query.clone(),
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(String::from),
    });

    if let Some(delay) = fake.delay {
        tokio::time::sleep(delay).await;
    }

    let reply = (fake.responder)(&method, &path, &query);
    let mut response =
        (reply.status, [("content-type", "application/json")], reply.body).into_response();
    for (name, value) in reply.headers {
        response
            .headers_mut()
            .insert(name, HeaderValue::from_str(&value).unwrap());
    }
    response
}

/// Starts a fake registry and returns its base URL and request log.
async fn serve<R: Into<Reply>>(
    delay: Option<Duration>,
    responder: impl Fn(&Method, &str, &str) -> R + Send + Sync + 'static,
) -> (String, Arc<Mutex<Vec<Recorded>>>) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let log = Arc::new(Mutex::new(Vec::new()));

    let app = Router::new().fallback(handle).with_state(FakeHarbor {
        responder: Arc::new(move |method: &Method, path: &str, query: &str| {
            responder(method, path, query).into()
        }),
        delay,
        log: Arc::clone(&log),
    });
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), log)
}

fn client(url: &str) -> RegistryClient {
    let config = RegistryConfig::new(url).with_auth(RegistryAuth::basic("admin", "Harbor12345"));
    RegistryClient::new(config).unwrap()
}

fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

fn ok(body: &str) -> (StatusCode, String) {
    (StatusCode::OK, body.to_string())
}

fn page_number(query: &str) -> usize {
    query_param(query, "page").and_then(|p| p.parse().ok()).unwrap_or(1)
}

/// Serves `names` as repository pages of at most `cap` items, whatever
/// `page_size` the client asked for.
fn capped_page(names: &[&str], query: &str, cap: usize) -> (StatusCode, String) {
    let items: Vec<_> = names
        .iter()
        .skip((page_number(query) - 1) * cap)
        .take(cap)
        .map(|name| format!(r#"{{"name": "{name}"}}"#))
        .collect();
    (StatusCode::OK, format!("[{}]", items.join(",")))
}

// =============================================================================
// Project Resolution Tests
// =============================================================================

#[tokio::test]
async fn test_resolve_project_picks_exact_match() {
    let (url, log) = serve(None, |_, _, _| {
        ok(r#"[
            {"project_id": 3, "name": "library-archive"},
            {"project_id": 7, "name": "library"}
        ]"#)
    })
    .await;

    let id = client(&url).resolve_project_id("library").await.unwrap();
    assert_eq!(id, ProjectId(7));

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].method, Method::GET);
    assert_eq!(log[0].path, "/api/projects");
    assert_eq!(query_param(&log[0].query, "name"), Some("library"));
    // base64("admin:Harbor12345")
    assert_eq!(
        log[0].authorization.as_deref(),
        Some("Basic YWRtaW46SGFyYm9yMTIzNDU=")
    );
}

#[tokio::test]
async fn test_resolve_project_found_on_later_page() {
    let (url, log) = serve(None, |_, _, query| match page_number(query) {
        1 => ok(r#"[
            {"project_id": 1, "name": "library-archive"},
            {"project_id": 2, "name": "library-old"}
        ]"#),
        2 => ok(r#"[{"project_id": 7, "name": "library"}]"#),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, String::new()),
    })
    .await;

    let id = client(&url).resolve_project_id("library").await.unwrap();
    assert_eq!(id, ProjectId(7));

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(query_param(&log[1].query, "name"), Some("library"));
    assert_eq!(query_param(&log[1].query, "page"), Some("2"));
}

#[tokio::test]
async fn test_resolve_project_is_case_sensitive() {
    let (url, _) = serve(None, |_, _, _| ok(r#"[{"project_id": 7, "name": "Library"}]"#)).await;

    let err = client(&url).resolve_project_id("library").await.unwrap_err();
    assert!(matches!(err, RegistryError::ProjectNotFound { ref name } if name == "library"));
}

#[tokio::test]
async fn test_resolve_project_empty_listing_is_not_found() {
    let (url, _) = serve(None, |_, _, _| ok("[]")).await;

    let err = client(&url).resolve_project_id("library").await.unwrap_err();
    assert!(matches!(err, RegistryError::ProjectNotFound { .. }));
}

#[tokio::test]
async fn test_resolve_project_null_listing_is_protocol_error() {
    let (url, _) = serve(None, |_, _, _| ok("null")).await;

    let err = client(&url).resolve_project_id("library").await.unwrap_err();
    assert!(matches!(err, RegistryError::Protocol { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_resolve_project_server_error() {
    let (url, _) = serve(None, |_, _, _| {
        (StatusCode::UNAUTHORIZED, r#"{"code":401,"message":"unauthorized"}"#.to_string())
    })
    .await;

    let err = client(&url).resolve_project_id("library").await.unwrap_err();
    let message = err.to_string();
    assert!(message.contains("401"), "got {message}");
    assert!(message.contains("unauthorized"), "got {message}");
}

// =============================================================================
// Repository Listing Tests
// =============================================================================

#[tokio::test]
async fn test_list_repositories_follows_pages() {
    let (url, log) = serve(None, |_, _, query| match query_param(query, "page") {
        Some("1") => ok(r#"[{"name": "library/nginx"}, {"name": "library/redis"}]"#),
        Some("2") => ok(r#"[{"name": "library/postgres"}]"#),
        _ => ok("[]"),
    })
    .await;

    let config = RegistryConfig::new(&url).with_page_size(2);
    let client = RegistryClient::new(config).unwrap();
    let repos = client.list_repositories(ProjectId(6)).await.unwrap();

    assert_eq!(repos, vec!["library/nginx", "library/redis", "library/postgres"]);

    let log = log.lock().unwrap();
    assert_eq!(log.len(), 3);
    assert_eq!(query_param(&log[0].query, "project_id"), Some("6"));
    assert_eq!(query_param(&log[0].query, "page_size"), Some("2"));
}

#[tokio::test]
async fn test_list_repositories_survives_capped_page_size() {
    let names = ["r1", "r2", "r3", "r4", "r5"];
    let (url, _) = serve(None, move |_, _, query| capped_page(&names, query, 2)).await;

    let config = RegistryConfig::new(&url).with_page_size(5);
    let client = RegistryClient::new(config).unwrap();
    let repos = client.list_repositories(ProjectId(6)).await.unwrap();

    assert_eq!(repos, names);
}

#[tokio::test]
async fn test_list_repositories_stops_at_total_count() {
    let (url, log) = serve(None, |_, _, query| {
        let reply: Reply = match page_number(query) {
            1 => ok(r#"[{"name": "a"}, {"name": "b"}]"#),
            2 => ok(r#"[{"name": "c"}]"#),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, String::new()),
        }
        .into();
        reply.with_header("x-total-count", "3")
    })
    .await;

    let client = RegistryClient::new(RegistryConfig::new(&url).with_page_size(2)).unwrap();
    let repos = client.list_repositories(ProjectId(1)).await.unwrap();

    assert_eq!(repos, vec!["a", "b", "c"]);
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_repositories_follows_link_header() {
    let (url, log) = serve(None, |_, _, query| match page_number(query) {
        1 => Reply::from(ok(r#"[{"name": "a"}]"#)).with_header(
            "link",
            r#"</api/repositories?page=2&page_size=10>; rel="next""#,
        ),
        2 => Reply::from(ok(r#"[{"name": "b"}]"#)).with_header(
            "link",
            r#"</api/repositories?page=1&page_size=10>; rel="prev""#,
        ),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, String::new()).into(),
    })
    .await;

    let client = RegistryClient::new(RegistryConfig::new(&url).with_page_size(10)).unwrap();
    let repos = client.list_repositories(ProjectId(1)).await.unwrap();

    assert_eq!(repos, vec!["a", "b"]);
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_repositories_stops_when_pages_repeat() {
    let (url, log) = serve(None, |_, _, _| ok(r#"[{"name": "a"}, {"name": "b"}]"#)).await;

    let client = RegistryClient::new(RegistryConfig::new(&url).with_page_size(2)).unwrap();
    let repos = client.list_repositories(ProjectId(1)).await.unwrap();

    assert_eq!(repos, vec!["a", "b"]);
    assert_eq!(log.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_repositories_null_is_empty() {
    let (url, _) = serve(None, |_, _, _| ok("null")).await;

    let repos = client(&url).list_repositories(ProjectId(6)).await.unwrap();
    assert!(repos.is_empty());
}

#[tokio::test]
async fn test_list_repositories_undecodable_body() {
    let (url, _) = serve(None, |_, _, _| ok("<html>maintenance</html>")).await;

    let err = client(&url).list_repositories(ProjectId(6)).await.unwrap_err();
    assert!(matches!(err, RegistryError::Protocol { .. }));
    assert!(err.to_string().contains("undecodable"));
}

// =============================================================================
// Tag Listing Tests
// =============================================================================

#[tokio::test]
async fn test_list_tags_returns_oldest_first() {
    let (url, log) = serve(None, |_, _, _| {
        ok(r#"[
            {"digest": "sha256:aa", "name": "v2", "size": 53504535, "created": "2020-08-28T02:14:13.009841239Z"},
            {"digest": "sha256:bb", "name": "v1", "size": 2190824484, "created": "2020-08-14T00:36:48.610531148Z"},
            {"digest": "sha256:cc", "name": "v3", "size": 1000, "created": "2020-09-01T00:00:00Z"}
        ]"#)
    })
    .await;

    let tags = client(&url).list_tags("library/nginx").await.unwrap();
    let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["v1", "v2", "v3"]);
    assert_eq!(tags[0].size, 2_190_824_484);

    let log = log.lock().unwrap();
    assert_eq!(log[0].path, "/api/repositories/library/nginx/tags");
}

#[tokio::test]
async fn test_list_tags_server_error_is_protocol_error() {
    let (url, _) = serve(None, |_, _, _| (StatusCode::INTERNAL_SERVER_ERROR, String::new())).await;

    let err = client(&url).list_tags("library/nginx").await.unwrap_err();
    assert!(matches!(err, RegistryError::Protocol { .. }));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_list_tags_times_out() {
    let (url, _) = serve(Some(Duration::from_secs(5)), |_, _, _| ok("[]")).await;

    let config = RegistryConfig::new(&url).with_timeout(Duration::from_millis(200));
    let client = RegistryClient::new(config).unwrap();

    let err = client.list_tags("library/nginx").await.unwrap_err();
    assert!(matches!(err, RegistryError::Protocol { .. }));
    assert!(err.to_string().contains("timed out"), "got {err}");
}

#[tokio::test]
async fn test_unreachable_registry_is_protocol_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(&format!("http://{addr}"))
        .list_tags("library/nginx")
        .await
        .unwrap_err();
    assert!(matches!(err, RegistryError::Protocol { .. }));
}

// =============================================================================
// Tag Deletion Tests
// =============================================================================

#[tokio::test]
async fn test_delete_tag() {
    let (url, log) = serve(None, |method, path, _| {
        if *method == Method::DELETE && path.ends_with("/tags/v1") {
            (StatusCode::OK, String::new())
        } else {
            (StatusCode::NOT_FOUND, String::new())
        }
    })
    .await;

    client(&url).delete_tag("library/nginx", "v1").await.unwrap();

    let log = log.lock().unwrap();
    assert_eq!(log[0].method, Method::DELETE);
    assert_eq!(log[0].path, "/api/repositories/library/nginx/tags/v1");
}

#[tokio::test]
async fn test_delete_tag_failure_carries_context() {
    let (url, _) = serve(None, |_, _, _| {
        (StatusCode::PRECONDITION_FAILED, r#"{"message":"tag is locked"}"#.to_string())
    })
    .await;

    let err = client(&url).delete_tag("library/nginx", "v1").await.unwrap_err();
    match err {
        RegistryError::DeleteFailed { repository, tag, reason } => {
            assert_eq!(repository, "library/nginx");
            assert_eq!(tag, "v1");
            assert!(reason.contains("412"));
            assert!(reason.contains("tag is locked"));
        }
        other => panic!("Expected DeleteFailed, got {other:?}"),
    }
}
