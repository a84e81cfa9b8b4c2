//! Health-check classification.
//!
//! The banner status is fully overwritten by every check; a transient
//! failure never sticks past the next successful check.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Overall system status shown in the banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemStatus {
    /// No health check has completed yet.
    Loading,
    /// Backend reports itself healthy.
    Running,
    /// Backend reachable but reporting a problem.
    Degraded,
    /// Backend unreachable or answering with an error status.
    ConnectionError,
}

impl SystemStatus {
    /// Returns the display label for the banner.
    pub fn label(&self) -> &'static str {
        match self {
            SystemStatus::Loading => "Loading",
            SystemStatus::Running => "Running",
            SystemStatus::Degraded => "Degraded",
            SystemStatus::ConnectionError => "Connection Error",
        }
    }

    /// Classify a successfully fetched health body. Anything other than a
    /// "healthy" status reads as degraded.
    pub fn from_body(body: &HealthBody) -> Self {
        if body.status == "healthy" {
            SystemStatus::Running
        } else {
            SystemStatus::Degraded
        }
    }
}

/// Body of the backend health endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthBody {
    #[serde(default)]
    pub status: String,
    /// Component name to state string, e.g. "nats" -> "healthy".
    #[serde(default)]
    pub components: BTreeMap<String, String>,
    #[serde(default)]
    pub version: Option<String>,
}

impl HealthBody {
    /// Components not reporting healthy, formatted for the status line.
    pub fn failing_components(&self) -> Vec<String> {
        self.components
            .iter()
            .filter(|(_, state)| !state.starts_with("healthy"))
            .map(|(name, state)| format!("{}: {}", name, state))
            .collect()
    }
}

/// Outcome of one health check: the classified status plus the decoded
/// body, when one arrived.
#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub status: SystemStatus,
    pub body: Option<HealthBody>,
}
