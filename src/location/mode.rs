use serde::{Deserialize, Serialize};

use crate::host::Host;

/// Navigation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NavigationMode {
    /// Address bar and back/forward stack (`pathname + search + hash`)
    History,
    /// Fragment of the address is the virtual path (`/#/users`)
    Hash,
    /// In-process string only; nothing visible changes
    Memory,
    /// Stopped: no event wiring, writes go to the in-process string
    Off,
}

impl NavigationMode {
    /// Parse `history`, `hash` or `memory` (case-insensitive)
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "history" => Some(Self::History),
            "hash" => Some(Self::Hash),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }

    /// Memory inside `srcdoc` documents, history everywhere else
    #[must_use]
    pub fn default_for(host: &dyn Host) -> Self {
        if host.is_srcdoc() {
            Self::Memory
        } else {
            Self::History
        }
    }
}

impl std::fmt::Display for NavigationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::History => "history",
            Self::Hash => "hash",
            Self::Memory => "memory",
            Self::Off => "off",
        };
        f.write_str(s)
    }
}
