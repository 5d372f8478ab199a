#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use tower::ServiceExt;

use runbook_gate::app::{build_router, build_state_with};
use runbook_gate::config::Config;
use runbook_gate::services::audit::MemoryAuditSink;
use runbook_gate::services::jobs::{InMemoryOrchestrator, JobOrchestrator};
use runbook_gate::state::AppState;

pub const TENANT: &str = "11111111-2222-3333-4444-555555555555";
pub const SECRET: &str = "integration-test-shared-secret";

pub fn config() -> Config {
    config_with(&[])
}

/// Signature mode with the shared test secret, behind a trusted proxy;
/// `overrides` replace or add individual variables.
pub fn config_with(overrides: &[(&str, &str)]) -> Config {
    Config::from_lookup(|key| {
        if let Some((_, value)) = overrides.iter().find(|(k, _)| *k == key) {
            return Some(value.to_string());
        }
        let value = match key {
            "AZURE_TENANT_ID" => TENANT,
            "TOKEN_VERIFIER" => "signature",
            "TOKEN_ALGORITHM" => "HS256",
            "TOKEN_VERIFY_KEY" => SECRET,
            "TRUST_PROXY" => "true",
            _ => return None,
        };
        Some(value.to_string())
    })
    .expect("test config")
}

pub struct TestApp {
    pub router: Router,
    pub audit: Arc<MemoryAuditSink>,
    pub orchestrator: Arc<InMemoryOrchestrator>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(config())
    }

    pub fn with_config(config: Config) -> Self {
        let orchestrator = Arc::new(InMemoryOrchestrator::new());
        let audit = Arc::new(MemoryAuditSink::new());
        let state =
            build_state_with(&config, orchestrator.clone(), audit.clone()).expect("state");
        Self {
            router: build_router(state, &config),
            audit,
            orchestrator,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        send(&self.router, req).await
    }
}

/// Router backed by `orchestrator`; `tweak` may adjust the state before it is frozen.
pub fn router_with(
    orchestrator: Arc<dyn JobOrchestrator>,
    tweak: impl FnOnce(&mut AppState),
) -> (Router, Arc<MemoryAuditSink>) {
    let config = config();
    let audit = Arc::new(MemoryAuditSink::new());
    let mut state = build_state_with(&config, orchestrator, audit.clone()).expect("state");
    tweak(&mut state);
    (build_router(state, &config), audit)
}

pub async fn send(router: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = router.clone().oneshot(req).await.expect("infallible");
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub fn sign(claims: &Value) -> String {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .expect("sign")
}

pub fn claims(upn: &str, roles: &[&str]) -> Value {
    json!({
        "upn": upn,
        "name": "Console Admin",
        "tid": TENANT,
        "roles": roles,
        "oid": "00000000-0000-0000-0000-000000000001",
        "exp": Utc::now().timestamp() + 3600,
    })
}

pub fn bearer(roles: &[&str]) -> String {
    format!("Bearer {}", sign(&claims("admin@contoso.com", roles)))
}

pub fn execute(authorization: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post("/api/v1/execute-runbook")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-forwarded-for", "203.0.113.10");
    if let Some(auth) = authorization {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn get(uri: &str, authorization: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(uri);
    if let Some(auth) = authorization {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).expect("request")
}
