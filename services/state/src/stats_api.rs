//! Platform statistics REST collaborator.
//!
//! The dashboard backend exposes one aggregate endpoint; the mirror only
//! consumes its JSON envelope and never assumes anything else about that
//! service.

use crate::reader::ReadError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Off-ledger aggregates the backend tracks per network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseStats {
    pub total_users: u64,
    pub total_votes: u64,
    #[serde(default)]
    pub total_questionnaire_completions: u64,
}

#[derive(Debug, Deserialize)]
struct StatsEnvelope {
    success: bool,
    data: Option<DatabaseStats>,
}

/// Anything that can produce platform statistics. Production uses the
/// HTTP client below; tests substitute a canned source.
#[async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch(&self) -> Result<DatabaseStats, ReadError>;
}

pub struct StatsApiClient {
    http: reqwest::Client,
    base_url: String,
    network: String,
}

impl StatsApiClient {
    pub fn new(base_url: impl Into<String>, network: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_default();
        Self {
            http,
            base_url: base_url.into(),
            network: network.into(),
        }
    }
}

#[async_trait]
impl StatsSource for StatsApiClient {
    async fn fetch(&self) -> Result<DatabaseStats, ReadError> {
        let url = format!(
            "{}/api/platform/stats?network={}",
            self.base_url, self.network
        );
        debug!(%url, "fetching platform stats");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ReadError::Network { reason: e.to_string() })?;

        if !response.status().is_success() {
            return Err(ReadError::Network {
                reason: format!("stats endpoint returned {}", response.status()),
            });
        }

        let envelope: StatsEnvelope = response
            .json()
            .await
            .map_err(|e| ReadError::Malformed { reason: e.to_string() })?;

        match envelope {
            StatsEnvelope { success: true, data: Some(data) } => Ok(data),
            _ => Err(ReadError::Malformed {
                reason: "stats envelope reported failure".to_string(),
            }),
        }
    }
}
