//! Authorization & validation gate.
//!
//! Single-shot and stateless: the decision depends only on the principal, the
//! request and the read-only role table. The gate never submits anything; it
//! returns a [`ValidatedJob`] for the caller to hand to the orchestrator.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::operation::OperationTag;
use super::params::{self, ValidatedParameters};
use super::role_table::RoleRequirementTable;
use crate::services::auth::Principal;
use crate::services::rejection::Rejection;

pub const INTERACTIVE_CONSOLE_CONTEXT: &str = "interactive-console";

/// Inbound job request, as posted by the console.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    #[serde(default)]
    pub operation: Option<String>,
    #[serde(default)]
    pub what_if: Option<Value>,
    #[serde(default)]
    pub parameters: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribution {
    pub executed_by: String,
    pub executed_by_name: String,
    pub context: &'static str,
}

/// Immutable parameter bag handed to the job orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedJob {
    pub operation: OperationTag,
    pub what_if: bool,
    pub parameters: ValidatedParameters,
    pub attribution: Attribution,
}

#[derive(Debug, Clone)]
pub struct Gate {
    roles: Arc<RoleRequirementTable>,
}

impl Gate {
    pub fn new(roles: Arc<RoleRequirementTable>) -> Self {
        Self { roles }
    }

    pub fn authorize_and_validate(
        &self,
        principal: &Principal,
        request: &OperationRequest,
    ) -> Result<ValidatedJob, Rejection> {
        let raw_operation = request.operation.as_deref().unwrap_or_default();
        let unknown = || Rejection::UnknownOperation {
            operation: raw_operation.to_string(),
        };

        let tag: OperationTag = raw_operation.parse().map_err(|_| unknown())?;
        let required = self.roles.required(tag).ok_or_else(unknown)?;

        if !principal.has_any_role(required) {
            return Err(Rejection::InsufficientRole {
                required: required.to_vec(),
            });
        }

        let mut violations = Vec::new();
        let what_if = params::resolve_what_if(request.what_if.as_ref(), &mut violations);
        let parameters =
            params::validate_parameters(tag, request.parameters.as_ref(), &mut violations);

        if !violations.is_empty() {
            return Err(Rejection::InvalidParameters { violations });
        }

        Ok(ValidatedJob {
            operation: tag,
            what_if,
            parameters,
            attribution: Attribution {
                executed_by: principal.subject_id().to_string(),
                executed_by_name: principal.display_name().to_string(),
                context: INTERACTIVE_CONSOLE_CONTEXT,
            },
        })
    }
}
