//! Aggregate delivery counters reported by the relay.

use serde::{Deserialize, Serialize};

/// Aggregate counters across both pipeline directions.
///
/// The client performs no cross-validation of these values; they are
/// displayed as reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub successful: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub pending: u64,
    /// Order-direction breakdown, when the backend provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<DirectionStats>,
    /// Report-direction breakdown, when the backend provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reports: Option<DirectionStats>,
}

/// Per-direction counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub successful: u64,
    #[serde(default)]
    pub failed: u64,
}
