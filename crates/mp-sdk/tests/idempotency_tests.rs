//! Idempotency-Key propagation for money-moving calls

mod common;

use common::*;
use mp_sdk::dto::{CreateTransferRequest, DisburseLoanRequest, TransferKind};
use mp_sdk::{IdempotencyKey, TransferFlow};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn external_transfer() -> CreateTransferRequest {
    CreateTransferRequest {
        to_user_id: None,
        recipient_account: Some("0123456789".into()),
        amount: 2500.0,
        kind: TransferKind::External,
        description: Some("Vendor payout".into()),
    }
}

#[tokio::test]
async fn test_refresh_replay_resends_the_same_key() {
    let server = MockServer::start().await;
    let (client, _) = signed_in(&server, "old", "r1");

    Mock::given(method("POST"))
        .and(path("/backoffice/transfers"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/backoffice/transfers"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(201).set_body_json(envelope(transfer("tr_9"))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"accessToken": "new"})))
        .expect(1)
        .mount(&server)
        .await;

    let key = IdempotencyKey::from("transfer-7f3a");
    let created = assert_ok!(
        client
            .transfers()
            .create(&external_transfer(), Some(key.clone()))
            .await
    );
    assert_eq!(created.id, "tr_9");

    let sent = requests_to(&server, "/backoffice/transfers").await;
    assert_eq!(sent.len(), 2);
    assert_eq!(idempotency_key_of(&sent[0]), "transfer-7f3a");
    assert_eq!(idempotency_key_of(&sent[1]), "transfer-7f3a");
    assert_eq!(sent[0].body, sent[1].body);
}

#[tokio::test]
async fn test_manual_retry_with_supplied_key_is_identical() {
    let server = MockServer::start().await;
    let (client, notifier) = signed_in(&server, "tok", "r1");

    Mock::given(method("POST"))
        .and(path("/backoffice/loans/disburse"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "Provider unavailable"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/backoffice/loans/disburse"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "message": "ok"})))
        .mount(&server)
        .await;

    let request = DisburseLoanRequest {
        loan_id: "ln_1".into(),
        amount: None,
        notes: None,
    };
    let key = IdempotencyKey::generate();

    assert_err!(client.loans().disburse(&request, Some(key.clone())).await);
    assert_ok!(client.loans().disburse(&request, Some(key.clone())).await);

    let sent = requests_to(&server, "/backoffice/loans/disburse").await;
    assert_eq!(sent.len(), 2);
    assert_eq!(idempotency_key_of(&sent[0]), key.as_str());
    assert_eq!(idempotency_key_of(&sent[1]), key.as_str());
    assert_eq!(
        notifier.errors(),
        vec!["Provider unavailable".to_string()],
        "the failed attempt is reported once and the retry is not"
    );
}

#[tokio::test]
async fn test_independent_actions_get_distinct_keys() {
    let server = MockServer::start().await;
    let (client, _) = signed_in(&server, "tok", "r1");

    Mock::given(method("POST"))
        .and(path("/backoffice/savings/deposit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(2)
        .mount(&server)
        .await;

    assert_ok!(client.savings().deposit(1000.0, None).await);
    assert_ok!(client.savings().deposit(1000.0, None).await);

    let sent = requests_to(&server, "/backoffice/savings/deposit").await;
    let first = idempotency_key_of(&sent[0]);
    let second = idempotency_key_of(&sent[1]);
    assert_ne!(first, second);
    assert!(uuid::Uuid::parse_str(&first).is_ok());
}

#[tokio::test]
async fn test_transfer_flow_retry_reuses_its_key() {
    let server = MockServer::start().await;
    let (client, _) = signed_in(&server, "tok", "r1");

    Mock::given(method("POST"))
        .and(path("/backoffice/transfers"))
        .respond_with(ResponseTemplate::new(504).set_body_json(json!({"message": "Gateway timeout"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/backoffice/transfers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(transfer("tr_2"))))
        .mount(&server)
        .await;

    let mut flow = TransferFlow::new();
    {
        let draft = flow.edit().unwrap();
        draft.kind = TransferKind::External;
        draft.amount = 2500.0;
        draft.recipient_account = Some("0123456789".into());
    }
    let transfers = client.transfers();

    flow.proceed().unwrap();
    assert_eq!(flow.submit(&transfers).await.unwrap(), mp_sdk::Step::Error);
    assert_eq!(flow.error_message(), Some("Gateway timeout"));

    flow.retry().unwrap();
    flow.proceed().unwrap();
    assert_eq!(flow.submit(&transfers).await.unwrap(), mp_sdk::Step::Success);

    let sent = requests_to(&server, "/backoffice/transfers").await;
    assert_eq!(sent.len(), 2);
    assert_eq!(idempotency_key_of(&sent[0]), flow.idempotency_key().as_str());
    assert_eq!(idempotency_key_of(&sent[1]), flow.idempotency_key().as_str());
}
