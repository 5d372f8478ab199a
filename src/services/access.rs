/* Responsibility
 * - Inbound call surface: credential header + request → Decision
 * - Runs the claims extractor, then the gate, and records the outcome
 * - Never submits; the caller hands an allowed job to the orchestrator
 */
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::services::audit::{self, AuditAction, AuditRecord, AuditSink};
use crate::services::auth::{ClaimsExtractor, Principal};
use crate::services::authz::{Gate, OperationRequest, ValidatedJob};
use crate::services::rejection::Rejection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(ValidatedJob),
    Deny(Rejection),
}

impl Decision {
    pub fn into_result(self) -> Result<ValidatedJob, Rejection> {
        match self {
            Self::Allow(job) => Ok(job),
            Self::Deny(rejection) => Err(rejection),
        }
    }
}

pub struct AccessService {
    extractor: ClaimsExtractor,
    gate: Gate,
    audit: Arc<dyn AuditSink>,
}

impl std::fmt::Debug for AccessService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessService")
            .field("extractor", &self.extractor)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl AccessService {
    pub fn new(extractor: ClaimsExtractor, gate: Gate, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            extractor,
            gate,
            audit,
        }
    }

    /// Authentication only, for read-only endpoints.
    pub fn authenticate(
        &self,
        credential_header: Option<&str>,
        origin: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Principal, Rejection> {
        self.extractor.extract(credential_header, origin, now)
    }

    pub fn authorize_and_validate(
        &self,
        credential_header: Option<&str>,
        origin: Option<&str>,
        request: &OperationRequest,
        now: DateTime<Utc>,
    ) -> Decision {
        let principal = match self.authenticate(credential_header, origin, now) {
            Ok(principal) => principal,
            Err(rejection) => return Decision::Deny(rejection),
        };

        match self.gate.authorize_and_validate(&principal, request) {
            Ok(job) => {
                tracing::info!(
                    principal = principal.subject_id(),
                    operation = %job.operation,
                    what_if = job.what_if,
                    "job accepted"
                );
                let record = AuditRecord::new(AuditAction::JobAccepted, now)
                    .principal(principal.subject_id())
                    .origin(origin)
                    .details(json!({
                        "operation": job.operation,
                        "whatIf": job.what_if,
                        "parameters": job.parameters,
                    }));
                audit::emit(self.audit.as_ref(), record);
                Decision::Allow(job)
            }
            Err(rejection) => {
                tracing::warn!(
                    principal = principal.subject_id(),
                    reason = rejection.code(),
                    "request denied"
                );
                let mut details = json!({
                    "reason": rejection.code(),
                    "operation": request.operation,
                });
                match &rejection {
                    Rejection::InsufficientRole { required } => {
                        details["required"] = json!(required);
                    }
                    Rejection::InvalidParameters { violations } => {
                        details["violations"] = json!(violations);
                    }
                    _ => {}
                }
                let record = AuditRecord::new(AuditAction::AuthorizationDenied, now)
                    .principal(principal.subject_id())
                    .origin(origin)
                    .details(details);
                audit::emit(self.audit.as_ref(), record);
                Decision::Deny(rejection)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::audit::MemoryAuditSink;
    use crate::services::auth::SignatureVerifyingDecoder;
    use crate::services::auth::extractor::DEFAULT_MAX_TOKEN_LENGTH;
    use crate::services::authz::RoleRequirementTable;
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    use serde_json::Value;

    const SECRET: &str = "access-test-secret";
    const TENANT: &str = "contoso-tenant";

    fn service(audit: Arc<MemoryAuditSink>) -> AccessService {
        let verifier =
            SignatureVerifyingDecoder::new(Algorithm::HS256, SECRET, None, None).unwrap();
        let extractor =
            ClaimsExtractor::new(Arc::new(verifier), TENANT, DEFAULT_MAX_TOKEN_LENGTH, audit.clone());
        let gate = Gate::new(Arc::new(RoleRequirementTable::builtin()));
        AccessService::new(extractor, gate, audit)
    }

    fn header(roles: &[&str]) -> String {
        let claims = json!({
            "upn": "admin@contoso.com",
            "name": "Admin",
            "tid": TENANT,
            "roles": roles,
            "exp": Utc::now().timestamp() + 3600,
        });
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();
        format!("Bearer {token}")
    }

    fn request(operation: &str, parameters: Value) -> OperationRequest {
        OperationRequest {
            operation: Some(operation.into()),
            what_if: None,
            parameters: Some(parameters),
        }
    }

    #[test]
    fn allowed_request_is_audited_as_accepted() {
        let audit = Arc::new(MemoryAuditSink::new());
        let svc = service(audit.clone());

        let decision = svc.authorize_and_validate(
            Some(&header(&["Intune Administrator"])),
            Some("10.0.0.1"),
            &request("DeviceCleanup", json!({"maxDevices": 50})),
            Utc::now(),
        );

        let job = decision.into_result().unwrap();
        assert_eq!(job.parameters.max_devices, Some(50));
        assert_eq!(
            audit.actions(),
            vec![AuditAction::AuthenticationSucceeded, AuditAction::JobAccepted]
        );
        let accepted = audit.records().pop().unwrap();
        assert_eq!(accepted.principal.as_deref(), Some("admin@contoso.com"));
        assert_eq!(accepted.origin.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn denied_request_records_required_roles() {
        let audit = Arc::new(MemoryAuditSink::new());
        let svc = service(audit.clone());

        let decision = svc.authorize_and_validate(
            Some(&header(&["Helpdesk"])),
            None,
            &request("GroupCleanup", json!({})),
            Utc::now(),
        );

        assert!(matches!(
            decision,
            Decision::Deny(Rejection::InsufficientRole { .. })
        ));
        let denied = audit.records().pop().unwrap();
        assert_eq!(denied.action, AuditAction::AuthorizationDenied);
        assert_eq!(denied.details["reason"], "INSUFFICIENT_ROLE");
        assert_eq!(denied.details["required"][0], "Groups Administrator");
    }

    #[test]
    fn authentication_failure_short_circuits_the_gate() {
        let audit = Arc::new(MemoryAuditSink::new());
        let svc = service(audit.clone());

        let decision = svc.authorize_and_validate(
            None,
            None,
            &request("NotAnOperation", json!({})),
            Utc::now(),
        );

        assert_eq!(decision, Decision::Deny(Rejection::MissingCredential));
        assert_eq!(audit.actions(), vec![AuditAction::AuthenticationRejected]);
    }

    #[test]
    fn authenticate_returns_principal() {
        let svc = service(Arc::new(MemoryAuditSink::new()));
        let principal = svc
            .authenticate(Some(&header(&["Reports Reader"])), None, Utc::now())
            .unwrap();
        assert_eq!(principal.subject_id(), "admin@contoso.com");
        assert_eq!(principal.display_name(), "Admin");
    }
}
