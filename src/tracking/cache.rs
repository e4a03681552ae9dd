//! Expiring Rider Cache
//!
//! Riders are kept while they keep reporting. Each access slides the
//! rider's idle deadline forward; an entry past its deadline is invisible to
//! lookups immediately and is purged on the next sweep.
//!
//! Backed by `moka::sync::Cache` with `time_to_idle`, so expiry is checked on
//! read and housekeeping happens in `run_pending_tasks`.

use std::sync::Arc;
use std::time::Duration;

use moka::notification::RemovalCause;
use moka::sync::Cache;
use parking_lot::Mutex;
use tracing::debug;

use crate::core::types::RiderId;
use crate::tracking::rider::Rider;

/// A rider record shared between the cache and the update holding it.
pub type SharedRider = Arc<Mutex<Rider>>;

/// Rider id → tracking state, with sliding expiry.
pub struct RiderCache {
    riders: Cache<RiderId, SharedRider>,
    ttl: Option<Duration>,
}

impl RiderCache {
    /// Create a cache expiring riders idle for `ttl`.
    ///
    /// A zero `ttl` disables expiry.
    pub fn new(ttl: Duration) -> Self {
        let ttl = (!ttl.is_zero()).then_some(ttl);

        let mut builder = Cache::<RiderId, SharedRider>::builder().eviction_listener(
            |id: Arc<RiderId>, _rider: SharedRider, cause: RemovalCause| {
                if matches!(cause, RemovalCause::Expired) {
                    debug!(rider = %id, "rider expired");
                }
            },
        );
        if let Some(ttl) = ttl {
            builder = builder.time_to_idle(ttl);
        }

        Self {
            riders: builder.build(),
            ttl,
        }
    }

    /// Idle timeout, or `None` if riders never expire.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    /// Look up a rider, refreshing its deadline.
    pub fn get(&self, id: RiderId) -> Option<SharedRider> {
        self.riders.get(&id)
    }

    /// Look up a rider, creating an untracked one if absent or expired.
    pub fn get_or_track(&self, id: RiderId) -> SharedRider {
        self.riders
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(Rider::new(id))))
            .into_value()
    }

    /// Forget a rider. Returns whether it was present.
    pub fn remove(&self, id: RiderId) -> bool {
        self.riders.remove(&id).is_some()
    }

    /// Is the rider present and unexpired? Does not refresh the deadline.
    pub fn contains(&self, id: RiderId) -> bool {
        self.riders.contains_key(&id)
    }

    /// Purge expired riders and apply pending bookkeeping.
    pub fn sweep(&self) {
        self.riders.run_pending_tasks();
    }

    /// Number of riders held. Approximate until [`RiderCache::sweep`] runs.
    pub fn len(&self) -> u64 {
        self.riders.entry_count()
    }

    /// No riders held? Approximate, as [`RiderCache::len`].
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for RiderCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RiderCache")
            .field("riders", &self.riders.entry_count())
            .field("ttl", &self.ttl)
            .finish()
    }
}
