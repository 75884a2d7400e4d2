//! Ledger state reconciliation.
//!
//! One reconciler instance owns the cached mirror of everything the
//! dashboard shows. Reads go through staleness-tracked slots and absorb
//! individual view failures into documented defaults. Writes are strictly
//! submit-then-confirm, never optimistic, and a confirmed write drops
//! exactly the slots it could have changed.

use crate::cache::{ClassCache, EntityClass};
use crate::config::MirrorConfig;
use crate::reader::{LedgerReader, ReadError};
use crate::stats_api::{DatabaseStats, StatsApiClient, StatsSource};
use crate::views::{LpPosition, PlatformStats, PoolView, QuoteView, StakingInfo};
use crate::writer::{EntryFunction, LedgerWriter, WriteError};
use futures::future;
use pulse_amm::{PoolSnapshot, SwapDirection};
use pulse_rewards::{aggregate, Poll};
use pulse_staking::{StakePosition, StakingLedger};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};
use types::{AccountAddress, Coin, PollId, TxHash};

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

pub struct StateReconciler<R, W> {
    reader: Arc<R>,
    writer: Arc<W>,
    stats: Arc<dyn StatsSource>,
    config: MirrorConfig,
    pool_cache: ClassCache<PoolSnapshot>,
    staking_cache: ClassCache<StakingInfo>,
    polls_cache: ClassCache<Vec<Poll>>,
    stats_cache: ClassCache<DatabaseStats>,
}

impl<R, W> StateReconciler<R, W>
where
    R: LedgerReader,
    W: LedgerWriter,
{
    pub fn new(
        reader: Arc<R>,
        writer: Arc<W>,
        stats: Arc<dyn StatsSource>,
        config: MirrorConfig,
    ) -> Self {
        Self {
            reader,
            writer,
            stats,
            config,
            pool_cache: ClassCache::new(),
            staking_cache: ClassCache::new(),
            polls_cache: ClassCache::new(),
            stats_cache: ClassCache::new(),
        }
    }

    /// Production constructor wiring the HTTP stats client from config.
    pub fn with_http_stats(reader: Arc<R>, writer: Arc<W>, config: MirrorConfig) -> Self {
        let stats = Arc::new(StatsApiClient::new(
            config.stats_base_url.clone(),
            config.network.clone(),
        ));
        Self::new(reader, writer, stats, config)
    }

    // ---- pool ----

    async fn pool_snapshot(&self) -> Result<PoolSnapshot, ReadError> {
        let reader = Arc::clone(&self.reader);
        self.pool_cache
            .get_or_fetch(EntityClass::Pool, self.config.staleness.pool, move || {
                let reader = Arc::clone(&reader);
                async move { reader.pool_info().await }
            })
            .await
    }

    /// Current pool reserves, or `None` when the ledger is unreachable.
    pub async fn pool_view(&self) -> Option<PoolView> {
        match self.pool_snapshot().await {
            Ok(snapshot) => Some(PoolView::from_snapshot(&snapshot)),
            Err(error) => {
                warn!(%error, "pool view unavailable");
                None
            }
        }
    }

    /// Quote a swap against the mirrored pool. `None` for a zero amount,
    /// an unreachable ledger, or a pool that cannot be quoted.
    pub async fn swap_quote(
        &self,
        amount_in: u64,
        direction: SwapDirection,
    ) -> Option<QuoteView> {
        if amount_in == 0 {
            return None;
        }
        let snapshot = match self.pool_snapshot().await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                warn!(%error, "swap quote unavailable");
                return None;
            }
        };
        match snapshot.quote(amount_in, direction) {
            Ok(quote) => Some(QuoteView::from_quote(&quote, direction)),
            Err(error) => {
                warn!(%error, amount_in, "pool not quotable");
                None
            }
        }
    }

    /// Spot price scaled by `pulse_amm::SPOT_PRICE_SCALE`.
    pub async fn spot_price(&self, pulse_per_stable: bool) -> Option<u128> {
        let snapshot = self.pool_snapshot().await.ok()?;
        match snapshot.spot_price(pulse_per_stable) {
            Ok(price) => Some(price),
            Err(error) => {
                warn!(%error, "spot price unavailable");
                None
            }
        }
    }

    /// An account's LP holding valued against current reserves.
    pub async fn lp_position(&self, owner: AccountAddress) -> Option<LpPosition> {
        let snapshot = self.pool_snapshot().await.ok()?;
        if !snapshot.is_initialized() {
            return Some(LpPosition::empty());
        }
        match self.reader.lp_shares(owner).await {
            Ok(shares) => Some(LpPosition::from_shares(&snapshot, shares)),
            Err(error) => {
                warn!(%error, %owner, "lp position unavailable");
                None
            }
        }
    }

    // ---- staking ----

    /// An account's staking picture. Secondary sub-query failures are
    /// absorbed into their zero defaults; only a failed position count
    /// fails the fetch, in which case zeroed defaults are served and the
    /// slot stays stale for a retry.
    pub async fn staking_info(&self, owner: AccountAddress) -> StakingInfo {
        let reader = Arc::clone(&self.reader);
        let result = self
            .staking_cache
            .get_or_fetch(
                EntityClass::Staking(owner),
                self.config.staleness.staking,
                move || {
                    let reader = Arc::clone(&reader);
                    async move { assemble_staking_info(reader.as_ref(), owner).await }
                },
            )
            .await;
        match result {
            Ok(info) => info,
            Err(error) => {
                warn!(%error, %owner, "staking info unavailable, serving defaults");
                StakingInfo::default()
            }
        }
    }

    /// Whether the staking pool exists on this network at all.
    /// `Some(false)` is a configuration state ("not yet available");
    /// `None` means the check itself could not complete.
    pub async fn staking_available(&self) -> Option<bool> {
        match self.reader.staking_initialized().await {
            Ok(flag) => Some(flag),
            Err(error) => {
                warn!(%error, "staking initialization check failed");
                None
            }
        }
    }

    // ---- polls ----

    /// Every poll the registry knows. Individual fetch failures drop that
    /// poll; a failed count serves an empty list without caching it.
    pub async fn polls(&self) -> Vec<Poll> {
        let reader = Arc::clone(&self.reader);
        let result = self
            .polls_cache
            .get_or_fetch(EntityClass::Polls, self.config.staleness.polls, move || {
                let reader = Arc::clone(&reader);
                async move { fetch_all_polls(reader.as_ref()).await }
            })
            .await;
        result.unwrap_or_else(|error| {
            warn!(%error, "poll registry unavailable, serving empty list");
            Vec::new()
        })
    }

    /// Vote and claim status for one account on one poll; failures read
    /// as "not yet".
    pub async fn voter_status(&self, poll: PollId, account: AccountAddress) -> (bool, bool) {
        let (voted, claimed) = tokio::join!(
            self.reader.has_voted(poll, account),
            self.reader.has_claimed(poll, account),
        );
        (
            voted.unwrap_or_else(|error| {
                warn!(%error, %poll, "has_voted failed");
                false
            }),
            claimed.unwrap_or_else(|error| {
                warn!(%error, %poll, "has_claimed failed");
                false
            }),
        )
    }

    // ---- platform stats ----

    /// Ledger-derived and backend-derived aggregates combined. A dead
    /// stats backend zeroes the off-ledger numbers only.
    pub async fn platform_stats(&self) -> PlatformStats {
        let stats = Arc::clone(&self.stats);
        let database = self
            .stats_cache
            .get_or_fetch(
                EntityClass::PlatformStats,
                self.config.staleness.platform_stats,
                move || {
                    let stats = Arc::clone(&stats);
                    async move { stats.fetch().await }
                },
            )
            .await
            .unwrap_or_else(|error| {
                warn!(%error, "platform stats backend unavailable");
                DatabaseStats::default()
            });

        let polls = self.polls().await;
        let rewards_distributed = aggregate(&polls);

        PlatformStats {
            polls_created: polls.len() as u64,
            total_responses: database.total_votes,
            rewards_distributed,
            active_users: database.total_users,
            rewards_distributed_display: Coin::Move.format(rewards_distributed),
        }
    }

    // ---- refresh and writes ----

    /// Refetch one entity class now, regardless of freshness.
    pub async fn refresh(&self, class: EntityClass) {
        debug!(?class, "forced refresh");
        let result = match class {
            EntityClass::Pool => {
                let reader = Arc::clone(&self.reader);
                self.pool_cache
                    .force_refresh(class, move || {
                        let reader = Arc::clone(&reader);
                        async move { reader.pool_info().await }
                    })
                    .await
                    .map(|_| ())
            }
            EntityClass::Staking(owner) => {
                let reader = Arc::clone(&self.reader);
                self.staking_cache
                    .force_refresh(class, move || {
                        let reader = Arc::clone(&reader);
                        async move { assemble_staking_info(reader.as_ref(), owner).await }
                    })
                    .await
                    .map(|_| ())
            }
            EntityClass::Polls => {
                let reader = Arc::clone(&self.reader);
                self.polls_cache
                    .force_refresh(class, move || {
                        let reader = Arc::clone(&reader);
                        async move { fetch_all_polls(reader.as_ref()).await }
                    })
                    .await
                    .map(|_| ())
            }
            EntityClass::PlatformStats => {
                let stats = Arc::clone(&self.stats);
                self.stats_cache
                    .force_refresh(class, move || {
                        let stats = Arc::clone(&stats);
                        async move { stats.fetch().await }
                    })
                    .await
                    .map(|_| ())
            }
        };
        if let Err(error) = result {
            warn!(?class, %error, "forced refresh failed");
        }
    }

    fn invalidate(&self, class: &EntityClass) {
        match class {
            EntityClass::Pool => self.pool_cache.invalidate(class),
            EntityClass::Staking(_) => self.staking_cache.invalidate(class),
            EntityClass::Polls => self.polls_cache.invalidate(class),
            EntityClass::PlatformStats => self.stats_cache.invalidate(class),
        }
    }

    /// Submit an entry function and wait for its confirmation. Mirrored
    /// state changes only after the ledger confirms; on success the touched
    /// slots are dropped so the next read refetches. Failures propagate
    /// typed and leave the cache alone.
    pub async fn execute(
        &self,
        actor: AccountAddress,
        entry: EntryFunction,
    ) -> Result<TxHash, WriteError> {
        let hash = self.writer.submit(actor, &entry).await?;
        debug!(function = entry.name(), %hash, "transaction submitted");
        self.writer.confirm(&hash).await?;

        for class in entry.touched_classes(actor) {
            self.invalidate(&class);
        }
        info!(function = entry.name(), %hash, "transaction confirmed");
        Ok(hash)
    }
}

/// Fan out the staking views for one account and fold the results into a
/// single consistent summary. The position count is the backbone query and
/// fails the whole fetch; every other sub-query failure zeroes its own
/// field only.
async fn assemble_staking_info<R: LedgerReader + ?Sized>(
    reader: &R,
    owner: AccountAddress,
) -> Result<StakingInfo, ReadError> {
    let (count, reported_total, pool_total, stakers) = tokio::join!(
        reader.positions_count(owner),
        reader.staked_amount(owner),
        reader.pool_total_staked(),
        reader.stakers_count(),
    );
    let count = count?;

    let results =
        future::join_all((0..count).map(|index| reader.position(owner, index))).await;
    let mut positions: Vec<StakePosition> = Vec::with_capacity(count as usize);
    for (index, result) in results.into_iter().enumerate() {
        match result {
            Ok(position) => positions.push(position),
            Err(error) => warn!(%error, %owner, index, "position fetch failed, skipping"),
        }
    }

    let ledger = StakingLedger::from_positions(positions);
    let summary = ledger.summarize(unix_now());

    // The ledger exposes its own total; a mismatch with the position sum
    // means a position fetch was dropped or the views raced a write.
    if let Ok(reported) = reported_total {
        if reported != summary.total_staked {
            warn!(
                %owner,
                reported,
                computed = summary.total_staked,
                "staked total diverges from position sum"
            );
        }
    }

    Ok(StakingInfo {
        total_staked: summary.total_staked,
        total_staked_display: Coin::Pulse.format(summary.total_staked),
        positions: ledger.positions().to_vec(),
        unlockable_amount: summary.unlockable_amount,
        locked_amount: summary.locked_amount,
        pool_total_staked: pool_total.unwrap_or_else(|error| {
            warn!(%error, "pool total staked failed");
            0
        }),
        stakers_count: stakers.unwrap_or_else(|error| {
            warn!(%error, "stakers count failed");
            0
        }),
    })
}

/// Walk the poll registry front to back. A failed count is a failed fetch
/// (nothing gets cached); a failed individual poll is skipped. Consistency
/// checks run here so bad data is logged at fetch time, not render time.
async fn fetch_all_polls<R: LedgerReader + ?Sized>(
    reader: &R,
) -> Result<Vec<Poll>, ReadError> {
    let count = reader.poll_count().await?;

    let results = future::join_all((0..count).map(|id| reader.poll(PollId(id)))).await;
    let mut polls = Vec::with_capacity(count as usize);
    for (id, result) in (0..count).zip(results) {
        match result {
            Ok(Some(poll)) => {
                if let Err(error) = poll.validate() {
                    warn!(%error, "poll data failed validation, keeping for accounting");
                }
                polls.push(poll);
            }
            Ok(None) => debug!(id, "poll id past registry, skipping"),
            Err(error) => warn!(%error, id, "poll fetch failed, skipping"),
        }
    }
    Ok(polls)
}
