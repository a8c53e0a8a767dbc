// src/core/leaf.rs
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Versioned rule for turning one period figure into its leaf string.
///
/// Changing how a figure is rendered changes every root built from it, so
/// the rendering is pinned per version and new renderings get a new variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LeafEncoding {
    /// `"<period>:<amount fixed to 2 decimal places>"`, e.g. `"2025-01:150.00"`.
    V1,
}

impl Default for LeafEncoding {
    fn default() -> Self {
        LeafEncoding::V1
    }
}

impl LeafEncoding {
    /// Numeric version recorded alongside roots on the ledger.
    pub fn version_number(&self) -> u32 {
        match self {
            LeafEncoding::V1 => 1,
        }
    }

    /// Renders the leaf for `period` carrying `amount`.
    pub fn encode(&self, period: &str, amount: f64) -> String {
        match self {
            // Adding 0.0 folds -0.0 into 0.0 so an all-refund-cancelled month reads "0.00".
            LeafEncoding::V1 => format!("{}:{:.2}", period, amount + 0.0),
        }
    }
}
