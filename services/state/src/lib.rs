//! Ledger state mirror
//!
//! ## Purpose
//!
//! Keeps a local, staleness-tracked mirror of remote ledger state so the
//! dashboard layers above never issue their own view calls. Reads fan out
//! concurrently and absorb individual failures into documented defaults;
//! writes are strictly sequential submit-then-confirm and invalidate
//! exactly the entity classes they touched.
//!
//! ## Integration Points
//!
//! - **Input**: a `LedgerReader`/`LedgerWriter` pair (RPC-backed in
//!   production, mocked in tests) and the platform stats REST endpoint
//! - **Output**: display-ready view structs with all formatting done by
//!   `types::fixed_point`
//! - **Consumers**: dashboard frontends and platform statistics pages

pub mod cache;
pub mod config;
pub mod reader;
pub mod reconciler;
pub mod stats_api;
pub mod views;
pub mod writer;

pub use cache::{ClassCache, EntityClass, FetchState, StalenessConfig};
pub use config::MirrorConfig;
pub use reader::{LedgerReader, ReadError};
pub use reconciler::StateReconciler;
pub use stats_api::{DatabaseStats, StatsApiClient, StatsSource};
pub use views::{LpPosition, PlatformStats, PoolView, QuoteView, StakingInfo};
pub use writer::{EntryFunction, LedgerWriter, RejectionCategory, WriteError};
