//! Bearer credential → [`Principal`].
//!
//! Checks run in a fixed order, first failure wins:
//! 1. `Authorization: Bearer <token>` present and non-empty, else `MissingCredential`
//! 2. token length within the configured maximum, else `MalformedToken` (not decoded)
//! 3. token decodes through the configured [`TokenVerifier`], else `MalformedToken`
//! 4. `upn` claim present and non-empty, else `MalformedToken`
//! 5. `exp`, when present, strictly after `now`, else `Expired`
//! 6. `tid` equals the configured tenant, else `WrongTenant`
//!
//! Every attempt is written to the audit sink with a token fingerprint, never the token.

use std::sync::Arc;

use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde_json::json;
use sha2::{Digest, Sha256};

use crate::services::audit::{self, AuditAction, AuditRecord, AuditSink};
use crate::services::auth::principal::Principal;
use crate::services::auth::verifier::TokenVerifier;
use crate::services::rejection::Rejection;

pub const DEFAULT_MAX_TOKEN_LENGTH: usize = 4096;

pub struct ClaimsExtractor {
    verifier: Arc<dyn TokenVerifier>,
    expected_tenant_id: String,
    max_token_length: usize,
    audit: Arc<dyn AuditSink>,
}

impl std::fmt::Debug for ClaimsExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimsExtractor")
            .field("verifier", &self.verifier)
            .field("expected_tenant_id", &self.expected_tenant_id)
            .field("max_token_length", &self.max_token_length)
            .finish()
    }
}

impl ClaimsExtractor {
    pub fn new(
        verifier: Arc<dyn TokenVerifier>,
        expected_tenant_id: impl Into<String>,
        max_token_length: usize,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            verifier,
            expected_tenant_id: expected_tenant_id.into(),
            max_token_length,
            audit,
        }
    }

    pub fn extract(
        &self,
        credential_header: Option<&str>,
        origin: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Principal, Rejection> {
        let token = bearer_token(credential_header);
        let fingerprint = token.map(token_fingerprint);
        let result = self.evaluate(token, now);

        let record = match &result {
            Ok(principal) => AuditRecord::new(AuditAction::AuthenticationSucceeded, now)
                .principal(principal.subject_id())
                .details(json!({
                    "verifier": self.verifier.name(),
                    "roles": principal.roles(),
                    "token_fingerprint": fingerprint,
                })),
            Err(rejection) => {
                tracing::warn!(
                    reason = rejection.code(),
                    origin = origin.unwrap_or("-"),
                    "bearer credential rejected"
                );
                AuditRecord::new(AuditAction::AuthenticationRejected, now).details(json!({
                    "reason": rejection.code(),
                    "token_fingerprint": fingerprint,
                }))
            }
        };
        audit::emit(self.audit.as_ref(), record.origin(origin));

        result
    }

    fn evaluate(&self, token: Option<&str>, now: DateTime<Utc>) -> Result<Principal, Rejection> {
        let token = token.ok_or(Rejection::MissingCredential)?;

        if token.chars().count() > self.max_token_length {
            return Err(Rejection::MalformedToken);
        }

        let claims = self.verifier.decode(token).map_err(|err| {
            tracing::debug!(error = %err, verifier = self.verifier.name(), "token decode failed");
            Rejection::MalformedToken
        })?;

        let subject_id = claims
            .upn
            .filter(|s| !s.trim().is_empty())
            .ok_or(Rejection::MalformedToken)?;

        let expires_at = match claims.exp {
            Some(exp) => {
                Some(DateTime::<Utc>::from_timestamp(exp, 0).ok_or(Rejection::MalformedToken)?)
            }
            None => None,
        };
        if let Some(exp) = expires_at
            && exp <= now
        {
            return Err(Rejection::Expired);
        }

        let tenant_id = match claims.tid {
            Some(tid) if tid == self.expected_tenant_id => tid,
            _ => return Err(Rejection::WrongTenant),
        };

        Ok(Principal::new(
            subject_id,
            claims.name,
            tenant_id,
            claims.roles.unwrap_or_default().into_iter().collect(),
            claims.oid,
            expires_at,
        ))
    }
}

/// Returns the token from an `Authorization` header value using the Bearer scheme.
pub fn bearer_token(header: Option<&str>) -> Option<&str> {
    let (scheme, token) = header?.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Short correlation id for a token: base64url(SHA-256(token)), first 16 chars.
pub fn token_fingerprint(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    let mut encoded = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(digest);
    encoded.truncate(16);
    encoded
}
