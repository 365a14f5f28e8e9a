//! Rate Cache
//!
//! Holds the last successful spot fetch and merges it with the stored rate
//! table on every read. Reads take the [`RwLock`] fast path; a refresh happens
//! behind a single [`Mutex`] so concurrent expiries collapse into one upstream
//! fetch. A live entry older than the validity window is never served.

use std::{sync::Arc, time::Duration};

use aurum::{
    metals::{Metal, per_ounce_to_per_gram},
    rates::{RateEntry, RateOrigin, RateTable},
};
use jiff::Timestamp;
use rust_decimal::Decimal;
use tokio::{
    sync::{Mutex, RwLock},
    time::Instant,
};
use tracing::{debug, info, warn};

use super::{
    feed::{SpotFeed, SpotQuote},
    repository::RatesRepository,
};

/// Default lifetime of a live fetch.
pub const DEFAULT_VALIDITY: Duration = Duration::from_secs(300);

/// Default pause after a failed fetch before the feed is tried again.
pub const DEFAULT_FAILURE_BACKOFF: Duration = Duration::from_secs(30);

/// Timing and calibration for [`RateCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateCacheConfig {
    /// How long a live fetch is served before the feed is asked again.
    pub validity: Duration,

    /// How long to stay on stored rates after a failed fetch.
    pub failure_backoff: Duration,

    /// Multiplier applied to the per-gram gold price.
    pub gold_calibration: Decimal,

    /// Multiplier applied to the per-gram silver price.
    pub silver_calibration: Decimal,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            validity: DEFAULT_VALIDITY,
            failure_backoff: DEFAULT_FAILURE_BACKOFF,
            gold_calibration: Decimal::ONE,
            silver_calibration: Decimal::ONE,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct LiveSnapshot {
    gold_per_gram: Decimal,
    silver_per_gram: Decimal,
    fetched_at: Timestamp,
    fetched: Instant,
}

impl LiveSnapshot {
    fn entries(&self) -> [RateEntry; 2] {
        [
            RateEntry {
                metal: Metal::Gold,
                price_per_gram: self.gold_per_gram,
                origin: RateOrigin::Live,
                fetched_at: self.fetched_at,
            },
            RateEntry {
                metal: Metal::Silver,
                price_per_gram: self.silver_per_gram,
                origin: RateOrigin::Live,
                fetched_at: self.fetched_at,
            },
        ]
    }
}

#[derive(Debug, Default)]
struct CacheState {
    live: Option<LiveSnapshot>,
    last_failure: Option<Instant>,
}

impl CacheState {
    fn fresh(&self, now: Instant, validity: Duration) -> Option<LiveSnapshot> {
        self.live
            .filter(|snapshot| now.saturating_duration_since(snapshot.fetched) < validity)
    }

    fn backing_off(&self, now: Instant, backoff: Duration) -> bool {
        self.last_failure
            .is_some_and(|failed| now.saturating_duration_since(failed) < backoff)
    }
}

/// Live spot rates with a validity window, merged over the stored table.
///
/// At most one refresh runs at a time; readers that arrive during a refresh
/// wait for it rather than starting their own. A failed fetch leaves stored
/// rates in charge until the backoff elapses.
pub struct RateCache {
    feed: Arc<dyn SpotFeed>,
    config: RateCacheConfig,
    state: RwLock<CacheState>,
    refresh: Mutex<()>,
}

impl std::fmt::Debug for RateCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateCache")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RateCache {
    #[must_use]
    pub fn new(feed: Arc<dyn SpotFeed>, config: RateCacheConfig) -> Self {
        Self {
            feed,
            config,
            state: RwLock::new(CacheState::default()),
            refresh: Mutex::new(()),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &RateCacheConfig {
        &self.config
    }

    /// The authoritative rate table right now.
    ///
    /// Gold and silver come from a fresh live fetch when one is available;
    /// every other metal, and gold and silver when the feed fails, come from
    /// the stored table. Never fails: with neither source the table is empty.
    pub async fn rates(&self, stored: &dyn RatesRepository) -> RateTable {
        let mut table = RateTable::new();

        if let Some(snapshot) = self.live().await {
            for entry in snapshot.entries() {
                table.insert(entry);
            }
        }

        match stored.list_stored_rates().await {
            Ok(rows) => {
                for row in rows {
                    table.insert_if_absent(row.entry());
                }
            }
            Err(error) => {
                warn!(%error, "failed to read stored rates; pricing falls back to item prices");
            }
        }

        table
    }

    /// Drops the cached fetch so the next read goes upstream.
    pub async fn invalidate(&self) {
        *self.state.write().await = CacheState::default();
    }

    async fn live(&self) -> Option<LiveSnapshot> {
        let now = Instant::now();

        {
            let state = self.state.read().await;

            if let Some(snapshot) = state.fresh(now, self.config.validity) {
                debug!("live rates served from cache");
                return Some(snapshot);
            }

            if state.backing_off(now, self.config.failure_backoff) {
                debug!("spot feed backing off; serving stored rates");
                return None;
            }
        }

        let _refresh = self.refresh.lock().await;

        // Another task may have refreshed or failed while this one waited.
        {
            let now = Instant::now();
            let state = self.state.read().await;

            if let Some(snapshot) = state.fresh(now, self.config.validity) {
                return Some(snapshot);
            }

            if state.backing_off(now, self.config.failure_backoff) {
                return None;
            }
        }

        match self.feed.fetch_spot().await {
            Ok(quote) => {
                let snapshot = self.snapshot(quote);

                let mut state = self.state.write().await;
                state.live = Some(snapshot);
                state.last_failure = None;

                info!(
                    gold_per_gram = %snapshot.gold_per_gram,
                    silver_per_gram = %snapshot.silver_per_gram,
                    "live rates refreshed"
                );

                Some(snapshot)
            }
            Err(error) => {
                self.state.write().await.last_failure = Some(Instant::now());

                warn!(%error, "spot feed failed; serving stored rates");

                None
            }
        }
    }

    fn snapshot(&self, quote: SpotQuote) -> LiveSnapshot {
        LiveSnapshot {
            gold_per_gram: per_ounce_to_per_gram(quote.gold_per_oz) * self.config.gold_calibration,
            silver_per_gram: per_ounce_to_per_gram(quote.silver_per_oz)
                * self.config.silver_calibration,
            fetched_at: Timestamp::now(),
            fetched: Instant::now(),
        }
    }
}
