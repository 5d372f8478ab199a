/*
 * Responsibility
 * - The authenticated identity handed from the claims extractor to the gate
 * - Only the extractor builds one, so holding a Principal means the token passed
 *   every check (subject present, not expired, tenant matches)
 */
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};

pub const UNKNOWN_DISPLAY_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    subject_id: String,
    display_name: String,
    tenant_id: String,
    roles: BTreeSet<String>,
    object_id: Option<String>,
    expires_at: Option<DateTime<Utc>>,
}

impl Principal {
    pub(crate) fn new(
        subject_id: String,
        display_name: Option<String>,
        tenant_id: String,
        roles: BTreeSet<String>,
        object_id: Option<String>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        let display_name = display_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNKNOWN_DISPLAY_NAME.to_string());

        Self {
            subject_id,
            display_name,
            tenant_id,
            roles,
            object_id,
            expires_at,
        }
    }

    /// User principal name (UPN).
    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    pub fn object_id(&self) -> Option<&str> {
        self.object_id.as_deref()
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn has_any_role<'a>(&self, candidates: impl IntoIterator<Item = &'a String>) -> bool {
        candidates.into_iter().any(|r| self.roles.contains(r))
    }

    /// Test fixture: a principal in `tenant` holding `roles`.
    #[cfg(test)]
    pub fn for_tests(subject_id: &str, tenant: &str, roles: &[&str]) -> Self {
        Self::new(
            subject_id.to_string(),
            Some("Test User".to_string()),
            tenant.to_string(),
            roles.iter().map(|r| r.to_string()).collect(),
            None,
            None,
        )
    }
}
