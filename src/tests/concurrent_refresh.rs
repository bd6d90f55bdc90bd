use std::sync::Arc;
use std::time::Duration;

use wiremock::MockServer;

use crate::pipeline::outcome::MSG_SESSION_EXPIRED;
use crate::request::RequestSpec;
use crate::tests::test_support::{
    FRESH, ScriptedSession, authorization_headers, mount_protected, ok_envelope, pipeline,
};

#[tokio::test]
async fn two_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;
    mount_protected(&server, ok_envelope(serde_json::json!([]))).await;

    let session =
        Arc::new(ScriptedSession::expired().with_refresh_delay(Duration::from_millis(200)));
    let (pipeline, notifier) = pipeline(&server.uri(), session.clone());

    let (a, b) = tokio::join!(
        pipeline.send::<Vec<serde_json::Value>>(RequestSpec::get("/tags")),
        pipeline.send::<Vec<serde_json::Value>>(RequestSpec::get("/categories")),
    );
    a.expect("first request resumes");
    b.expect("second request resumes");

    assert_eq!(session.refresh_calls(), 1);
    assert!(notifier.messages().is_empty());

    let headers = authorization_headers(&server).await;
    let fresh = Some(format!("Bearer {FRESH}"));
    assert_eq!(headers.len(), 4);
    assert_eq!(
        headers.iter().filter(|h| **h == fresh).count(),
        2,
        "both replays carry the refreshed token: {:?}",
        headers
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn burst_of_401s_across_tasks_refreshes_once() {
    let server = MockServer::start().await;
    mount_protected(&server, ok_envelope(serde_json::json!({"ok": true}))).await;

    let session =
        Arc::new(ScriptedSession::expired().with_refresh_delay(Duration::from_millis(300)));
    let (pipeline, notifier) = pipeline(&server.uri(), session.clone());

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let pipeline = pipeline.clone();
            tokio::spawn(async move {
                pipeline
                    .send::<serde_json::Value>(RequestSpec::get(format!("/posts/{i}")))
                    .await
            })
        })
        .collect();

    for handle in handles {
        let envelope = handle.await.unwrap().expect("every request resumes");
        assert_eq!(envelope.data, serde_json::json!({"ok": true}));
    }

    assert_eq!(session.refresh_calls(), 1);
    assert!(notifier.messages().is_empty());
    assert!(!pipeline.is_refreshing());
}

#[tokio::test]
async fn failed_refresh_rejects_every_queued_request() {
    let server = MockServer::start().await;
    mount_protected(&server, ok_envelope(serde_json::Value::Null)).await;

    let session = Arc::new(
        ScriptedSession::expired()
            .failing_refresh()
            .with_refresh_delay(Duration::from_millis(200)),
    );
    let (pipeline, notifier) = pipeline(&server.uri(), session.clone());

    let (a, b, c) = tokio::join!(
        pipeline.send::<()>(RequestSpec::get("/users")),
        pipeline.send::<()>(RequestSpec::get("/tags")),
        pipeline.send::<()>(RequestSpec::get("/comments/admin")),
    );

    for res in [a, b, c] {
        let err = res.expect_err("queued requests are rejected");
        assert!(err.is_auth(), "expected Error::Auth, got {:?}", err);
    }
    assert_eq!(session.refresh_calls(), 1);
    assert_eq!(session.terminate_calls(), 1);
    assert_eq!(notifier.messages(), vec![MSG_SESSION_EXPIRED]);
    // nothing was replayed
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn queued_requests_replay_in_enqueue_order() {
    let server = MockServer::start().await;
    mount_protected(&server, ok_envelope(serde_json::Value::Null)).await;

    let session =
        Arc::new(ScriptedSession::expired().with_refresh_delay(Duration::from_millis(400)));
    let (pipeline, notifier) = pipeline(&server.uri(), session.clone());

    // staggered so /posts/0 leads the refresh and the rest queue one by one
    let handles: Vec<_> = (0..5u64)
        .map(|i| {
            let pipeline = pipeline.clone();
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(40 * i)).await;
                pipeline
                    .send::<()>(RequestSpec::get(format!("/posts/{i}")))
                    .await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().expect("every request resumes");
    }
    assert_eq!(session.refresh_calls(), 1);
    assert!(notifier.messages().is_empty());

    let fresh = format!("Bearer {FRESH}");
    let replayed: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|req| {
            req.headers
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                == Some(fresh.as_str())
        })
        .map(|req| req.url.path().to_string())
        .filter(|path| path != "/posts/0")
        .collect();
    assert_eq!(replayed, vec!["/posts/1", "/posts/2", "/posts/3", "/posts/4"]);
}
