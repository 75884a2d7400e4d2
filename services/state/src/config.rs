//! Mirror configuration.

use crate::cache::StalenessConfig;

/// Everything the reconciler needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct MirrorConfig {
    /// Base URL of the dashboard backend serving platform statistics.
    pub stats_base_url: String,
    /// Network tag forwarded to the stats endpoint.
    pub network: String,
    pub staleness: StalenessConfig,
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            stats_base_url: "http://localhost:5000".to_string(),
            network: "testnet".to_string(),
            staleness: StalenessConfig::default(),
        }
    }
}
