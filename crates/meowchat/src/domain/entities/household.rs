//! Household - Catalog-level display metadata

use serde::{Deserialize, Serialize};

/// Who the personas live with, plus canned openers for an idle conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Household {
    #[serde(default)]
    pub owners: Vec<String>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub conversation_starters: Vec<String>,
}

impl Household {
    /// Owners joined for display, e.g. `Zaidah & Faza`
    pub fn owners_display(&self) -> String {
        self.owners.join(" & ")
    }
}
