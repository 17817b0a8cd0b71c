//! Inventory kind discriminator.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the seven inventory categories reported by endpoints.
///
/// The declaration order is the processing order used by the full-inventory
/// orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventoryKind {
    /// Mandatory singular system description.
    System,
    /// Physical components.
    Hardware,
    /// Installed software packages.
    Software,
    /// Applied hotfixes and updates.
    Hotfix,
    /// Security findings.
    Security,
    /// Network interfaces.
    Network,
    /// Browser configuration.
    Browser,
}

impl InventoryKind {
    /// Every kind in processing order.
    pub const ALL: [Self; 7] = [
        Self::System,
        Self::Hardware,
        Self::Software,
        Self::Hotfix,
        Self::Security,
        Self::Network,
        Self::Browser,
    ];

    /// Stable lowercase name used in URLs, logs, and table prefixes.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::Hardware => "hardware",
            Self::Software => "software",
            Self::Hotfix => "hotfix",
            Self::Security => "security",
            Self::Network => "network",
            Self::Browser => "browser",
        }
    }

    /// Current-state table for this kind.
    pub const fn current_table(self) -> &'static str {
        match self {
            Self::System => "system_current",
            Self::Hardware => "hardware_current",
            Self::Software => "software_current",
            Self::Hotfix => "hotfix_current",
            Self::Security => "security_current",
            Self::Network => "network_current",
            Self::Browser => "browser_current",
        }
    }

    /// Append-only change-log table for this kind.
    pub const fn changes_table(self) -> &'static str {
        match self {
            Self::System => "system_changes",
            Self::Hardware => "hardware_changes",
            Self::Software => "software_changes",
            Self::Hotfix => "hotfix_changes",
            Self::Security => "security_changes",
            Self::Network => "network_changes",
            Self::Browser => "browser_changes",
        }
    }
}

impl fmt::Display for InventoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a path segment names no known kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown inventory kind: {0}")]
pub struct ParseInventoryKindError(pub String);

impl FromStr for InventoryKind {
    type Err = ParseInventoryKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "system" => Ok(Self::System),
            "hardware" => Ok(Self::Hardware),
            "software" => Ok(Self::Software),
            // The agent posts hotfixes under the plural route.
            "hotfix" | "hotfixes" => Ok(Self::Hotfix),
            "security" => Ok(Self::Security),
            "network" => Ok(Self::Network),
            "browser" => Ok(Self::Browser),
            other => Err(ParseInventoryKindError(other.to_owned())),
        }
    }
}
