//! Integration tests for the Mastodon client against a mock server.

use serde_json::{json, Value};
use toot_embed::api::mastodon::{FeedQuery, MastodonClient, ThreadQuery};
use toot_embed::api::ClientOptions;
use toot_embed::error::UpstreamCause;
use toot_embed::Error;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client() -> MastodonClient {
    MastodonClient::new(&ClientOptions::default()).expect("client should build")
}

fn toot(id: &str, reply_to: Option<&str>) -> Value {
    json!({
        "id": id,
        "created_at": "2024-01-15T12:00:00.000Z",
        "in_reply_to_id": reply_to.map(|_| "99"),
        "in_reply_to_account_id": reply_to,
        "content": format!("<p>toot {id}</p>"),
        "url": format!("https://example.social/@alice/{id}"),
        "uri": format!("https://example.social/users/alice/statuses/{id}"),
        "account": {
            "id": "1",
            "username": "alice",
            "acct": "alice",
            "display_name": "Alice",
            "avatar": "https://files.example/alice.png",
            "url": "https://example.social/@alice"
        },
        "reblog": null,
        "media_attachments": []
    })
}

fn ids(toots: &[toot_embed::mastodon::Toot]) -> Vec<&str> {
    toots.iter().map(|t| t.id.as_str()).collect()
}

#[tokio::test]
async fn test_resolve_and_fetch_looks_up_handle_first() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/lookup"))
        .and(query_param("acct", "alice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "109" })))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/109/statuses"))
        .and(query_param("limit", "5"))
        .and(query_param("exclude_replies", "false"))
        .and(query_param("exclude_reblogs", "false"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([toot("3", None), toot("2", None)])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let profile = format!("{}/@alice", mock_server.uri());
    let toots = client()
        .resolve_and_fetch(&profile, &FeedQuery::default())
        .await
        .expect("fetch failed");
    assert_eq!(ids(&toots), ["3", "2"]);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].url.path(), "/api/v1/accounts/lookup");
    assert_eq!(requests[1].url.path(), "/api/v1/accounts/109/statuses");
}

#[tokio::test]
async fn test_account_id_skips_lookup_and_passes_filters() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "1" })))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/42/statuses"))
        .and(query_param("limit", "2"))
        .and(query_param("exclude_replies", "true"))
        .and(query_param("exclude_reblogs", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([toot("7", None)])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = FeedQuery {
        account_id: Some("42".to_string()),
        limit: Some(2),
        exclude_replies: true,
        exclude_reblogs: true,
        self_replies_only: false,
    };
    // no handle in the path, which is fine with an explicit account id
    let toots = client()
        .resolve_and_fetch(&format!("{}/about", mock_server.uri()), &query)
        .await
        .expect("fetch failed");
    assert_eq!(ids(&toots), ["7"]);
}

#[tokio::test]
async fn test_missing_handle_is_malformed_and_sends_nothing() {
    let mock_server = MockServer::start().await;

    for reference in [
        format!("{}/users/alice", mock_server.uri()),
        format!("{}/@alice/109", mock_server.uri()),
        "not a url".to_string(),
    ] {
        let err = client()
            .resolve_and_fetch(&reference, &FeedQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MalformedReference(_)), "{reference}: {err:?}");
    }

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.is_empty());
}

#[tokio::test]
async fn test_failed_lookup_is_unresolvable() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/lookup"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Record not found" })))
        .mount(&mock_server)
        .await;

    let err = client()
        .resolve_and_fetch(&format!("{}/@ghost", mock_server.uri()), &FeedQuery::default())
        .await
        .unwrap_err();
    let Error::UnresolvableHandle { handle, source } = err else {
        panic!("expected unresolvable handle, got {err:?}");
    };
    assert_eq!(handle, "ghost");
    assert!(matches!(
        *source,
        Error::UpstreamError { source: UpstreamCause::Status(status), .. } if status.as_u16() == 404
    ));
}

#[tokio::test]
async fn test_lookup_without_id_is_unresolvable() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/lookup"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "username": "alice" })))
        .mount(&mock_server)
        .await;

    let err = client()
        .resolve_account(&format!("{}/@alice", mock_server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnresolvableHandle { .. }));
}

#[tokio::test]
async fn test_statuses_errors_are_upstream_errors() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/1/statuses"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/2/statuses"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&mock_server)
        .await;

    let query = |id: &str| FeedQuery {
        account_id: Some(id.to_string()),
        ..FeedQuery::default()
    };
    let profile = format!("{}/@alice", mock_server.uri());

    let err = client().resolve_and_fetch(&profile, &query("1")).await.unwrap_err();
    assert!(matches!(
        err,
        Error::UpstreamError { source: UpstreamCause::Status(_), .. }
    ));

    let err = client().resolve_and_fetch(&profile, &query("2")).await.unwrap_err();
    assert!(matches!(
        err,
        Error::UpstreamError { source: UpstreamCause::Decode(_), .. }
    ));

    // no retries by default
    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_self_replies_only_drops_every_reply() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/accounts/1/statuses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            toot("5", None),
            toot("4", Some("1")),
            toot("3", Some("2")),
            toot("2", None),
        ])))
        .mount(&mock_server)
        .await;

    let mut query = FeedQuery {
        account_id: Some("1".to_string()),
        ..FeedQuery::default()
    };
    let profile = format!("{}/@alice", mock_server.uri());

    let toots = client().resolve_and_fetch(&profile, &query).await.unwrap();
    assert_eq!(ids(&toots), ["5", "4", "3", "2"]);

    query.self_replies_only = true;
    let toots = client().resolve_and_fetch(&profile, &query).await.unwrap();
    assert_eq!(ids(&toots), ["5", "2"]);
}

#[tokio::test]
async fn test_fetch_thread_root_then_descendants() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/statuses/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(toot("10", None)))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/statuses/10/context"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ancestors": [toot("9", None)],
            "descendants": [toot("12", Some("1")), toot("11", Some("1"))],
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = ThreadQuery {
        post_id: "10".to_string(),
        ..ThreadQuery::default()
    };
    let toots = client()
        .fetch_thread(&format!("{}/@alice/10", mock_server.uri()), &query)
        .await
        .unwrap();
    assert_eq!(ids(&toots), ["10", "12", "11"]);
}

#[tokio::test]
async fn test_fetch_thread_exclude_post_skips_status_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/statuses/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(toot("10", None)))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/statuses/10/context"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ancestors": [],
            "descendants": [toot("13", Some("1")), toot("11", Some("1")), toot("12", Some("1"))],
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = ThreadQuery {
        post_id: "10".to_string(),
        exclude_post: true,
        exclude_replies: false,
    };
    let toots = client()
        .fetch_thread(&format!("{}/@alice/10", mock_server.uri()), &query)
        .await
        .unwrap();
    assert_eq!(ids(&toots), ["13", "11", "12"]);
}

#[tokio::test]
async fn test_fetch_thread_exclude_replies_skips_context_request() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/statuses/10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(toot("10", None)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let query = ThreadQuery {
        post_id: "10".to_string(),
        exclude_post: false,
        exclude_replies: true,
    };
    let toots = client()
        .fetch_thread(&format!("{}/@alice/10", mock_server.uri()), &query)
        .await
        .unwrap();
    assert_eq!(ids(&toots), ["10"]);

    let requests = mock_server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}
