//! Per-operation parameter validation.
//!
//! Validation is exhaustive: every violation in the request is collected so the
//! caller can fix them in one round-trip. Fields that do not apply to the
//! requested operation, and unknown keys, are dropped rather than forwarded.

use serde::Serialize;
use serde_json::{Map, Value};

use super::operation::OperationTag;
use crate::services::rejection::Violation;

pub const MAX_LABEL_LEN: usize = 256;
pub const MAX_USER_LIST_LEN: usize = 10_000;
pub const EXTENSION_ATTRIBUTE_RANGE: (i64, i64) = (1, 15);
pub const MAX_DEVICES_RANGE: (i64, i64) = (1, 500);
pub const GROUP_CLEANUP_DAYS_RANGE: (i64, i64) = (1, 365);

/// Parameters after validation and escaping, ready for the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatedParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension_attribute_number: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attribute_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_to_add: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_to_remove: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_devices: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_cleanup_days: Option<u16>,
}

/// `whatIf`: absent or null means dry-run.
pub fn resolve_what_if(raw: Option<&Value>, violations: &mut Vec<Violation>) -> bool {
    match raw {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            violations.push(Violation::new("whatIf", "must be a boolean"));
            true
        }
    }
}

pub fn validate_parameters(
    tag: OperationTag,
    raw: Option<&Value>,
    violations: &mut Vec<Violation>,
) -> ValidatedParameters {
    let empty = Map::new();
    let fields = match raw {
        None | Some(Value::Null) => &empty,
        Some(Value::Object(map)) => map,
        Some(_) => {
            violations.push(Violation::new("parameters", "must be a JSON object"));
            &empty
        }
    };

    let mut out = ValidatedParameters::default();
    let mut check = FieldReader { fields, violations };

    if tag.edits_extension_attributes() {
        out.extension_attribute_number = check
            .integer("extensionAttributeNumber", EXTENSION_ATTRIBUTE_RANGE)
            .map(|n| n as u8);
        out.attribute_value = check
            .string("attributeValue", MAX_LABEL_LEN)
            .map(|s| escape_html(&s));
        out.users_to_add = check.string("usersToAdd", MAX_USER_LIST_LEN);
        out.users_to_remove = check.string("usersToRemove", MAX_USER_LIST_LEN);
    }

    if tag.cleans_devices() {
        out.max_devices = check
            .integer("maxDevices", MAX_DEVICES_RANGE)
            .map(|n| n as u16);
    }

    if tag.cleans_groups() {
        out.group_name = check
            .string("groupName", MAX_LABEL_LEN)
            .map(|s| escape_html(&s));
        out.group_cleanup_days = check
            .integer("groupCleanupDays", GROUP_CLEANUP_DAYS_RANGE)
            .map(|n| n as u16);
    }

    out
}

struct FieldReader<'a> {
    fields: &'a Map<String, Value>,
    violations: &'a mut Vec<Violation>,
}

impl<'a> FieldReader<'a> {
    fn present(&self, name: &str) -> Option<&'a Value> {
        self.fields.get(name).filter(|v| !v.is_null())
    }

    // Only JSON integers are accepted: 5.0 and "5" are rejected.
    fn integer(&mut self, name: &'static str, (min, max): (i64, i64)) -> Option<i64> {
        let value = self.present(name)?;
        let Some(n) = value.as_i64() else {
            self.violations
                .push(Violation::new(name, "must be an integer"));
            return None;
        };
        if n < min || n > max {
            self.violations.push(Violation::new(
                name,
                format!("must be between {min} and {max}, got {n}"),
            ));
            return None;
        }
        Some(n)
    }

    fn string(&mut self, name: &'static str, max_len: usize) -> Option<String> {
        let value = self.present(name)?;
        let Some(s) = value.as_str() else {
            self.violations.push(Violation::new(name, "must be a string"));
            return None;
        };
        let len = s.chars().count();
        if len > max_len {
            self.violations.push(Violation::new(
                name,
                format!("must be at most {max_len} characters, got {len}"),
            ));
            return None;
        }
        Some(s.to_string())
    }
}

/// Escape text for safe inclusion in HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
