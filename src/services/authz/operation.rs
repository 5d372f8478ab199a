use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Administrative runbook operations the console can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum OperationTag {
    ExtensionAttributes,
    DeviceCleanup,
    GroupCleanup,
    All,
}

impl OperationTag {
    pub const ALL_TAGS: [OperationTag; 4] = [
        OperationTag::ExtensionAttributes,
        OperationTag::DeviceCleanup,
        OperationTag::GroupCleanup,
        OperationTag::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExtensionAttributes => "ExtensionAttributes",
            Self::DeviceCleanup => "DeviceCleanup",
            Self::GroupCleanup => "GroupCleanup",
            Self::All => "All",
        }
    }

    pub fn edits_extension_attributes(&self) -> bool {
        matches!(self, Self::ExtensionAttributes | Self::All)
    }

    pub fn cleans_devices(&self) -> bool {
        matches!(self, Self::DeviceCleanup | Self::All)
    }

    pub fn cleans_groups(&self) -> bool {
        matches!(self, Self::GroupCleanup | Self::All)
    }
}

impl fmt::Display for OperationTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownOperationTag(pub String);

impl FromStr for OperationTag {
    type Err = UnknownOperationTag;

    // Exact, case-sensitive match on the canonical names.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL_TAGS
            .into_iter()
            .find(|tag| tag.as_str() == s)
            .ok_or_else(|| UnknownOperationTag(s.to_string()))
    }
}
