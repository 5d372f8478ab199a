mod common;

use axum::http::StatusCode;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use serde_json::{Value, json};

use common::{TENANT, TestApp, config_with, execute};
use runbook_gate::services::audit::AuditAction;

/// Entra-shaped RS256 token with a signature nothing can check.
fn rs256_token(claims: &Value) -> String {
    let header = json!({"alg": "RS256", "typ": "JWT", "kid": "entra-signing-key"});
    format!(
        "{}.{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string()),
        URL_SAFE_NO_PAD.encode(b"opaque-signature-bytes"),
    )
}

fn unverified_app() -> TestApp {
    TestApp::with_config(config_with(&[
        ("TOKEN_VERIFIER", "unverified"),
        ("TRUST_PROXY", "false"),
    ]))
}

fn extension_attributes() -> Value {
    json!({
        "operation": "ExtensionAttributes",
        "parameters": {
            "extensionAttributeNumber": 5,
            "attributeValue": "Contoso",
            "usersToAdd": "a@b.com"
        }
    })
}

#[tokio::test]
async fn entra_rs256_token_is_accepted_without_a_signing_key() {
    let app = unverified_app();
    let token = rs256_token(&json!({
        "upn": "a@b.com",
        "name": "Console Admin",
        "tid": TENANT,
        "roles": ["User Administrator"],
        "exp": Utc::now().timestamp() + 3600,
    }));

    let (status, body) = app
        .send(execute(
            Some(&format!("Bearer {token}")),
            extension_attributes(),
        ))
        .await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["success"], true);
    assert_eq!(body["whatIf"], true);

    let job = app
        .orchestrator
        .submitted(body["jobId"].as_str().unwrap())
        .await
        .unwrap();
    assert_eq!(job.attribution.executed_by, "a@b.com");

    assert_eq!(
        app.audit.actions(),
        vec![
            AuditAction::AuthenticationSucceeded,
            AuditAction::JobAccepted,
            AuditAction::JobSubmitted,
        ]
    );
    // No proxy is trusted and the test transport has no peer address.
    assert!(app.audit.records().iter().all(|r| r.origin.is_none()));
}

#[tokio::test]
async fn claims_are_still_checked_when_signatures_are_not() {
    let app = unverified_app();
    let token = rs256_token(&json!({
        "upn": "a@b.com",
        "tid": "99999999-0000-0000-0000-000000000000",
        "roles": ["User Administrator"],
        "exp": Utc::now().timestamp() + 3600,
    }));

    let (status, body) = app
        .send(execute(
            Some(&format!("Bearer {token}")),
            extension_attributes(),
        ))
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "WRONG_TENANT");
    assert_eq!(app.audit.actions(), vec![AuditAction::AuthenticationRejected]);
}
