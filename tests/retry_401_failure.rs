mod common;

use std::time::Duration;

use blog_client::Error;
use blog_client::session::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, SessionStorage};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{client_with_tokens, ok};

#[tokio::test]
async fn rejected_refresh_logs_out_once_for_all_queued_requests() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "code": 401,
                    "message": "refresh token expired",
                    "data": null
                }))
                .set_delay(Duration::from_millis(250)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(wiremock::matchers::any())
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (client, notifier, storage) = client_with_tokens(&server, Some("a1"), Some("r1"));

    let (users, posts, comments) = tokio::join!(
        client.users().list(),
        client.posts().list_admin(Some(1), Some(10), None),
        client.comments().list_admin(None, None, None),
    );

    assert!(matches!(users, Err(Error::Auth(_))));
    assert!(matches!(posts, Err(Error::Auth(_))));
    assert!(matches!(comments, Err(Error::Auth(_))));
    assert_eq!(
        notifier.messages(),
        vec!["Session expired, please log in again"]
    );
    assert!(!client.is_logged_in());
    assert_eq!(storage.get(ACCESS_TOKEN_KEY), None);
    assert_eq!(storage.get(REFRESH_TOKEN_KEY), None);
}

#[tokio::test]
async fn no_refresh_token_logs_out_immediately() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(ok(serde_json::json!({"token": "x"}))))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/3"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let (client, notifier, _storage) = client_with_tokens(&server, Some("a1"), None);

    let err = client.users().get(3).await.expect_err("unauthorized");
    assert!(err.is_auth());
    assert!(!client.is_logged_in());
    assert_eq!(notifier.messages(), vec!["Unauthorized, please log in again"]);
}

#[tokio::test]
async fn direct_refresh_call_is_never_refreshed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let (client, _notifier, _storage) = client_with_tokens(&server, Some("a1"), Some("r1"));

    let err = client.auth().refresh("r1").await.expect_err("401 surfaces");
    assert_eq!(err.status(), Some(reqwest::StatusCode::UNAUTHORIZED));
    // session untouched: refresh was not attempted, so no logout either
    assert!(client.is_logged_in());
}
