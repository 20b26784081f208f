//! Request pipeline tests
//!
//! Token refresh on 401, failure notification and error mapping, against a
//! wiremock backend.

mod common;

use common::*;
use futures::future::join_all;
use mp_sdk::{Error, Notification};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, header, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;
    let (client, notifier) = signed_in(&server, "old", "r1");

    Mock::given(method("GET"))
        .and(path_regex(r"^/backoffice/transfers/tr_\d+$"))
        .and(header("authorization", bearer("old").as_str()))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
        .expect(5)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path_regex(r"^/backoffice/transfers/tr_\d+$"))
        .and(header("authorization", bearer("new").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(transfer("tr_0"))))
        .expect(5)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .and(body_json(json!({"refreshToken": "r1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"accessToken": "new", "refreshToken": "r2"}))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ids: Vec<String> = (0..5).map(|i| format!("tr_{}", i)).collect();
    let transfers = client.transfers();
    let results = join_all(ids.iter().map(|id| transfers.get(id))).await;

    for result in &results {
        assert!(result.is_ok(), "replayed request failed: {:?}", result);
    }
    assert_eq!(client.session().access_token().as_deref(), Some("new"));
    assert_eq!(client.session().refresh_token().as_deref(), Some("r2"));
    assert!(notifier.all().is_empty());
}

#[tokio::test]
async fn test_failed_refresh_expires_every_waiter() {
    let server = MockServer::start().await;
    let (client, notifier) = signed_in(&server, "old", "r1");

    Mock::given(method("GET"))
        .and(path_regex(r"^/backoffice/transfers/tr_\d+$"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "jwt expired"})))
        .expect(4)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"message": "Invalid refresh token"}))
                .set_delay(Duration::from_millis(50)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let ids: Vec<String> = (0..4).map(|i| format!("tr_{}", i)).collect();
    let transfers = client.transfers();
    let results = join_all(ids.iter().map(|id| transfers.get(id))).await;

    for result in results {
        assert!(matches!(result, Err(Error::SessionExpired)));
    }
    assert!(!client.session().is_authenticated());
    assert!(client.session().access_token().is_none());
    assert!(client.session().refresh_token().is_none());
    assert_eq!(notifier.all(), vec![Notification::RedirectToLogin]);
}

#[tokio::test]
async fn test_missing_refresh_token_ends_session() {
    let server = MockServer::start().await;
    let (client, notifier) = client_for(&server);
    // Token without a refresh token, as left behind by an older session.
    client.session().update_tokens("orphan", None);

    Mock::given(method("GET"))
        .and(path("/backoffice/settings"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let result = client.settings().get().await;
    assert!(matches!(result, Err(Error::SessionExpired)));
    assert_eq!(notifier.redirects(), 1);
    assert!(notifier.errors().is_empty());
}

#[tokio::test]
async fn test_expired_session_drops_cached_queries() {
    let server = MockServer::start().await;
    let (client, notifier) = signed_in(&server, "old", "r1");

    Mock::given(method("GET"))
        .and(path("/backoffice/loans"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"_id": "ln_1", "userId": "u_1", "amount": 50000, "status": "pending"}],
            "pagination": {"page": 1, "limit": 10, "total": 1, "totalPages": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/backoffice/loans"))
        .and(header("authorization", "Bearer other"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [],
            "pagination": {"page": 1, "limit": 10, "total": 0, "totalPages": 0}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/backoffice/settings"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid refresh token"})))
        .expect(1)
        .mount(&server)
        .await;

    let query = mp_sdk::dto::LoanQuery::default();
    assert_eq!(client.loans().list(&query).await.unwrap().len(), 1);
    assert!(!client.cache().is_empty());

    let result = client.settings().get().await;
    assert!(matches!(result, Err(Error::SessionExpired)));
    assert!(client.cache().is_empty());
    assert_eq!(notifier.redirects(), 1);

    // The next admin on this client reads from the backend, not the old cache.
    let other: mp_sdk::dto::Admin =
        serde_json::from_value(json!({"_id": "adm_2", "email": "audit@myprime.ng"})).unwrap();
    client.session().set_session(other, "other", "r9");
    assert!(client.loans().list(&query).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_401_after_replay_is_not_refreshed_again() {
    let server = MockServer::start().await;
    let (client, notifier) = signed_in(&server, "old", "r1");

    Mock::given(method("GET"))
        .and(path("/backoffice/dashboard"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Admin disabled"})))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(envelope(json!({"accessToken": "new"}))),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client.dashboard().overview().await.unwrap_err();
    match err {
        Error::Unauthorized(message) => assert_eq!(message, "Admin disabled"),
        other => panic!("expected Unauthorized, got {:?}", other),
    }
    assert!(notifier.all().is_empty());
    // Session survives; only this request gave up.
    assert_eq!(client.session().access_token().as_deref(), Some("new"));
    assert_eq!(client.session().refresh_token().as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_server_message_is_notified_once_verbatim() {
    let server = MockServer::start().await;
    let (client, notifier) = signed_in(&server, "tok", "r1");

    Mock::given(method("POST"))
        .and(path("/backoffice/transfers"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"success": false, "message": "Insufficient balance"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let request = mp_sdk::dto::CreateTransferRequest {
        to_user_id: None,
        recipient_account: Some("0123456789".into()),
        amount: 5_000_000.0,
        kind: mp_sdk::dto::TransferKind::External,
        description: None,
    };
    let err = client.transfers().create(&request, None).await.unwrap_err();

    assert!(matches!(err, Error::Validation(ref m) if m == "Insufficient balance"));
    assert_eq!(
        notifier.all(),
        vec![Notification::Error("Insufficient balance".to_string())]
    );
}

#[tokio::test]
async fn test_error_without_message_gets_generic_text() {
    let server = MockServer::start().await;
    let (client, notifier) = signed_in(&server, "tok", "r1");

    Mock::given(method("GET"))
        .and(path("/backoffice/system/health"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = client.dashboard().system_health().await.unwrap_err();
    assert!(matches!(err, Error::Server(_)));
    assert_eq!(notifier.errors(), vec!["An error occurred".to_string()]);
}

#[tokio::test]
async fn test_unsuccessful_envelope_is_an_error() {
    let server = MockServer::start().await;
    let (client, notifier) = signed_in(&server, "tok", "r1");

    Mock::given(method("PUT"))
        .and(path("/backoffice/settings"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": "false", "message": "Unknown setting key"})),
        )
        .mount(&server)
        .await;

    let update = vec![mp_sdk::dto::SettingUpdate::new("transfer_fee", 25)];
    let err = client.settings().update(update).await.unwrap_err();

    assert!(matches!(err, Error::Api { status: 200, .. }));
    assert_eq!(notifier.errors(), vec!["Unknown setting key".to_string()]);
}

#[tokio::test]
async fn test_transport_failure_is_notified_generically() {
    let notifier = std::sync::Arc::new(mp_sdk::CollectingNotifier::new());
    let config = mp_sdk::Config::new("http://127.0.0.1:1").with_timeout(Duration::from_secs(2));
    let client =
        mp_sdk::Client::with_notifier(config, mp_sdk::SessionContext::in_memory(), notifier.clone())
            .unwrap();

    let err = client.settings().get().await.unwrap_err();
    assert!(matches!(err, Error::Http(_)));
    assert_eq!(notifier.errors(), vec!["An error occurred".to_string()]);
}

#[tokio::test]
async fn test_bearer_header_tracks_session() {
    let server = MockServer::start().await;
    let (client, _) = client_for(&server);

    Mock::given(method("GET"))
        .and(path("/backoffice/settings"))
        .and(NoAuthorization)
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/backoffice/admins"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!([]))))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client.settings().get().await.unwrap().is_empty());
    client.session().set_session(admin(), "tok", "r1");
    assert!(client.admins().list().await.unwrap().is_empty());
}
