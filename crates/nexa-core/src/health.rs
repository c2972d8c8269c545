//! Backend reachability probe
//!
//! Independent of the transcript: the result is shown through a separate,
//! ephemeral surface and never touches [`crate::SessionStore`].

use serde::{Deserialize, Serialize};

use crate::client::AssistantClient;

/// Which endpoint the probe hits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthPath {
    /// `GET /health`, JSON readiness report
    #[default]
    Health,
    /// `GET /`, reachability only
    Root,
}

impl HealthPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthPath::Health => "/health",
            HealthPath::Root => "/",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Ready { campuses: Option<usize> },
    NotReady { campuses: Option<usize> },
    Unreachable,
}

impl HealthStatus {
    pub fn is_reachable(&self) -> bool {
        !matches!(self, HealthStatus::Unreachable)
    }

    /// Human-readable text for the alert surface
    pub fn summary(&self) -> String {
        match self {
            HealthStatus::Ready { campuses: Some(n) } => {
                format!("Backend reachable ({} campuses loaded).", n)
            }
            HealthStatus::Ready { campuses: None } => "Backend reachable.".to_string(),
            HealthStatus::NotReady { campuses } => {
                format!("Backend not ready: {} campuses loaded", campuses.unwrap_or(0))
            }
            HealthStatus::Unreachable => {
                "Can't reach backend. Verify the configured base URL.".to_string()
            }
        }
    }
}

pub async fn check_health(client: &AssistantClient, path: HealthPath) -> HealthStatus {
    match client.health(path).await {
        Ok(report) => {
            tracing::debug!(
                ok = report.ok,
                campuses = ?report.campuses,
                has_api_key = ?report.has_api_key,
                "health probe answered"
            );
            if report.ok {
                HealthStatus::Ready { campuses: report.campuses }
            } else {
                HealthStatus::NotReady { campuses: report.campuses }
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, base_url = client.base_url(), "health probe failed");
            HealthStatus::Unreachable
        }
    }
}
