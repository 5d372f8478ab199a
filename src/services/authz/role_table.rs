//! Operation → acceptable roles (any one suffices).
//!
//! Loaded once at startup and shared read-only. A table is only constructible
//! when every [`OperationTag`] has a non-empty entry.

use std::collections::BTreeMap;
use std::path::Path;

use thiserror::Error;

use super::operation::OperationTag;

pub const GLOBAL_ADMINISTRATOR: &str = "Global Administrator";
pub const PRIVILEGED_ROLE_ADMINISTRATOR: &str = "Privileged Role Administrator";

#[derive(Debug, Error)]
pub enum RoleTableError {
    #[error("failed to read role table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("role table is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("role table names unknown operation {0:?}")]
    UnknownOperation(String),

    #[error("role table has no entry for {0}")]
    MissingOperation(OperationTag),

    #[error("role table entry for {0} is empty")]
    EmptyEntry(OperationTag),

    #[error("role table entry for {0} contains a blank role name")]
    BlankRole(OperationTag),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRequirementTable {
    entries: BTreeMap<OperationTag, Vec<String>>,
}

impl RoleRequirementTable {
    /// The default mapping. `All` is reserved for the most privileged roles;
    /// Global Administrator also appears in every narrower entry.
    pub fn builtin() -> Self {
        let entry = |roles: &[&str]| roles.iter().map(|r| r.to_string()).collect::<Vec<_>>();

        let entries = BTreeMap::from([
            (
                OperationTag::ExtensionAttributes,
                entry(&["User Administrator", GLOBAL_ADMINISTRATOR]),
            ),
            (
                OperationTag::DeviceCleanup,
                entry(&[
                    "Cloud Device Administrator",
                    "Intune Administrator",
                    GLOBAL_ADMINISTRATOR,
                ]),
            ),
            (
                OperationTag::GroupCleanup,
                entry(&[
                    "Groups Administrator",
                    "User Administrator",
                    GLOBAL_ADMINISTRATOR,
                ]),
            ),
            (
                OperationTag::All,
                entry(&[GLOBAL_ADMINISTRATOR, PRIVILEGED_ROLE_ADMINISTRATOR]),
            ),
        ]);

        Self { entries }
    }

    pub fn from_entries(
        entries: impl IntoIterator<Item = (OperationTag, Vec<String>)>,
    ) -> Result<Self, RoleTableError> {
        let mut table = BTreeMap::new();
        for (tag, roles) in entries {
            let mut deduped: Vec<String> = Vec::with_capacity(roles.len());
            for role in roles {
                let role = role.trim().to_string();
                if role.is_empty() {
                    return Err(RoleTableError::BlankRole(tag));
                }
                if !deduped.contains(&role) {
                    deduped.push(role);
                }
            }
            if deduped.is_empty() {
                return Err(RoleTableError::EmptyEntry(tag));
            }
            table.insert(tag, deduped);
        }

        for tag in OperationTag::ALL_TAGS {
            if !table.contains_key(&tag) {
                return Err(RoleTableError::MissingOperation(tag));
            }
        }

        Ok(Self { entries: table })
    }

    /// Parse `{ "DeviceCleanup": ["Intune Administrator", ...], ... }`.
    pub fn from_json(raw: &str) -> Result<Self, RoleTableError> {
        let parsed: BTreeMap<String, Vec<String>> = serde_json::from_str(raw)?;
        let entries = parsed
            .into_iter()
            .map(|(name, roles)| {
                name.parse::<OperationTag>()
                    .map(|tag| (tag, roles))
                    .map_err(|e| RoleTableError::UnknownOperation(e.0))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_entries(entries)
    }

    pub fn load(path: &Path) -> Result<Self, RoleTableError> {
        let raw = std::fs::read_to_string(path).map_err(|source| RoleTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn required(&self, tag: OperationTag) -> Option<&[String]> {
        self.entries.get(&tag).map(Vec::as_slice)
    }
}

impl Default for RoleRequirementTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_covers_every_tag() {
        let table = RoleRequirementTable::builtin();
        for tag in OperationTag::ALL_TAGS {
            assert!(!table.required(tag).unwrap().is_empty(), "{tag}");
        }
        // round-trips through validation
        let rebuilt = RoleRequirementTable::from_entries(
            OperationTag::ALL_TAGS.map(|t| (t, table.required(t).unwrap().to_vec())),
        )
        .unwrap();
        assert_eq!(rebuilt, table);
    }

    #[test]
    fn device_cleanup_entry_matches_documented_order() {
        let table = RoleRequirementTable::builtin();
        assert_eq!(
            table.required(OperationTag::DeviceCleanup).unwrap(),
            [
                "Cloud Device Administrator",
                "Intune Administrator",
                "Global Administrator"
            ]
        );
    }

    #[test]
    fn all_is_limited_to_most_privileged_roles() {
        let table = RoleRequirementTable::builtin();
        assert_eq!(
            table.required(OperationTag::All).unwrap(),
            [GLOBAL_ADMINISTRATOR, PRIVILEGED_ROLE_ADMINISTRATOR]
        );
    }

    #[test]
    fn json_table_must_be_complete() {
        let err = RoleRequirementTable::from_json(r#"{"DeviceCleanup": ["Intune Administrator"]}"#)
            .unwrap_err();
        assert!(matches!(err, RoleTableError::MissingOperation(_)));
    }

    #[test]
    fn json_table_rejects_unknown_operations_and_empty_entries() {
        let unknown = r#"{
            "ExtensionAttributes": ["A"], "DeviceCleanup": ["B"],
            "GroupCleanup": ["C"], "All": ["D"], "PasswordReset": ["E"]
        }"#;
        assert!(matches!(
            RoleRequirementTable::from_json(unknown),
            Err(RoleTableError::UnknownOperation(name)) if name == "PasswordReset"
        ));

        let empty = r#"{
            "ExtensionAttributes": [], "DeviceCleanup": ["B"],
            "GroupCleanup": ["C"], "All": ["D"]
        }"#;
        assert!(matches!(
            RoleRequirementTable::from_json(empty),
            Err(RoleTableError::EmptyEntry(OperationTag::ExtensionAttributes))
        ));

        assert!(matches!(
            RoleRequirementTable::from_json("[1,2]"),
            Err(RoleTableError::Json(_))
        ));
    }

    #[test]
    fn json_table_dedupes_preserving_order() {
        let raw = r#"{
            "ExtensionAttributes": ["B", "A", "B"], "DeviceCleanup": ["B"],
            "GroupCleanup": ["C"], "All": [" D "]
        }"#;
        let table = RoleRequirementTable::from_json(raw).unwrap();
        assert_eq!(
            table.required(OperationTag::ExtensionAttributes).unwrap(),
            ["B", "A"]
        );
        assert_eq!(table.required(OperationTag::All).unwrap(), ["D"]);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = RoleRequirementTable::load(Path::new("/nonexistent/roles.json")).unwrap_err();
        assert!(matches!(err, RoleTableError::Io { .. }));
    }
}
