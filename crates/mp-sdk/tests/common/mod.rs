#![allow(dead_code)]

use mp_sdk::dto::Admin;
use mp_sdk::{Client, CollectingNotifier, Config, SessionContext};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::{Match, MockServer, Request};

pub const REFRESH_PATH: &str = "/api/auth/refresh";
pub const LOGIN_PATH: &str = "/api/users/login";

pub fn admin() -> Admin {
    serde_json::from_value(json!({
        "_id": "adm_1",
        "email": "ops@myprime.ng",
        "firstName": "Ngozi",
        "lastName": "Eze",
        "permissions": ["view_loans", "manage_loans"]
    }))
    .unwrap()
}

/// Client against `server` with a collecting notifier and no session.
pub fn client_for(server: &MockServer) -> (Client, Arc<CollectingNotifier>) {
    let notifier = Arc::new(CollectingNotifier::new());
    let config = Config::new(server.uri());
    let client = Client::with_notifier(config, SessionContext::in_memory(), notifier.clone())
        .expect("client should build");
    (client, notifier)
}

/// Client already signed in with the given tokens.
pub fn signed_in(server: &MockServer, access: &str, refresh: &str) -> (Client, Arc<CollectingNotifier>) {
    let (client, notifier) = client_for(server);
    client.session().set_session(admin(), access, refresh);
    (client, notifier)
}

pub fn envelope(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

pub fn transfer(id: &str) -> Value {
    json!({
        "_id": id,
        "amount": 1000,
        "status": "PENDING",
        "transferType": "external"
    })
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

/// Matches requests that carry no `Authorization` header.
pub struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

pub async fn requests_to(server: &MockServer, path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == path)
        .collect()
}

pub fn idempotency_key_of(request: &Request) -> String {
    request
        .headers
        .get("Idempotency-Key")
        .expect("request should carry an idempotency key")
        .to_str()
        .unwrap()
        .to_string()
}
