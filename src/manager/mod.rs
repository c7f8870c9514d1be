//! Expiring Data Manager.
//!
//! The only shared, mutable component of the crate. It records accepted entries
//! in a time-bucketed index, rejects stale and replayed submissions, and evicts
//! buckets once their timestamp leaves the freshness window.
//!
//! # States
//! - **Stopped**: No background sweep. `clear()` is allowed.
//! - **Running**: A sweep thread evicts stale buckets every `update_period`.
//!
//! Both states accept entries and reconfiguration.
//!
//! # Concurrency
//! - The index sits behind one coarse mutex. The freshness check, the duplicate
//!   check and the insert of an `accept` happen under that lock, and so does the
//!   sweep's evaluate-and-evict pass. A stale key is therefore never recreated
//!   after eviction, and evicting one key never drops an insert into another.
//! - Signature checks and decryption run before the lock is taken.
//! - `start`/`stop`/`clear` serialize on a separate scheduler lock.
//! - Poisoned locks are recovered; the index is consistent between statements.

mod index;
pub mod params;
mod sweeper;

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use std::time::Duration;

use crate::config::{ManagerConfig, TimeUnit};
use crate::freshness::{Clock, SystemClock, TimeTester};
use crate::payload::SecureData;
use index::BucketIndex;
pub use params::{AcceptParams, ReplayProtection};
use sweeper::Sweeper;

/// Tolerance settings and the tester derived from them.
struct Policy {
    clock: Arc<dyn Clock>,
    max_time_error: u64,
    unit: TimeUnit,
    tester: TimeTester,
}

impl Policy {
    fn new(clock: Arc<dyn Clock>, max_time_error: u64, unit: TimeUnit) -> Self {
        let tester = TimeTester::new(Arc::clone(&clock), max_time_error, unit);
        Self {
            clock,
            max_time_error,
            unit,
            tester,
        }
    }

    fn rebuild(&mut self) {
        self.tester = TimeTester::new(Arc::clone(&self.clock), self.max_time_error, self.unit);
    }
}

/// State shared with the sweep thread.
pub(crate) struct Shared {
    index: Mutex<BucketIndex>,
    policy: RwLock<Policy>,
}

impl Shared {
    fn lock_index(&self) -> MutexGuard<'_, BucketIndex> {
        self.index.lock().unwrap_or_else(|poisoned| {
            log::warn!("Recovering poisoned bucket index lock");
            poisoned.into_inner()
        })
    }

    fn tester(&self) -> TimeTester {
        self.policy
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .tester
            .clone()
    }

    fn update_policy<F: FnOnce(&mut Policy)>(&self, update: F) {
        let mut policy = self.policy.write().unwrap_or_else(PoisonError::into_inner);
        update(&mut policy);
        policy.rebuild();
    }

    /// Evicts every bucket whose key is outside the window right now.
    pub(crate) fn sweep(&self) -> usize {
        let tester = self.tester();
        self.lock_index().evict(|timestamp| !tester.test(timestamp))
    }
}

struct Schedule {
    update_period: Duration,
    sweeper: Option<Sweeper>,
}

/// Accepts fresh, authentic, non-replayed entries and forgets them once stale.
pub struct ExpiringDataManager {
    shared: Arc<Shared>,
    schedule: Mutex<Schedule>,
}

impl ExpiringDataManager {
    /// Creates a stopped manager on the system clock.
    pub fn new(config: ManagerConfig) -> Self {
        Self::with_clock(Arc::new(SystemClock), config)
    }

    /// Creates a stopped manager on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>, config: ManagerConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                index: Mutex::new(BucketIndex::default()),
                policy: RwLock::new(Policy::new(clock, config.max_time_error, config.unit)),
            }),
            schedule: Mutex::new(Schedule {
                update_period: config.update_period,
                sweeper: None,
            }),
        }
    }

    fn lock_schedule(&self) -> MutexGuard<'_, Schedule> {
        self.schedule.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_running(&self) -> bool {
        self.lock_schedule().sweeper.is_some()
    }

    /// Starts the periodic sweep, beginning immediately.
    ///
    /// Returns `false` if already running, if `update_period` is zero, or if the
    /// sweep thread cannot be spawned.
    pub fn start(&self) -> bool {
        let mut schedule = self.lock_schedule();
        if schedule.sweeper.is_some() {
            return false;
        }
        if schedule.update_period.is_zero() {
            log::warn!("Refusing to start sweep with a zero update period");
            return false;
        }
        match Sweeper::spawn(Arc::clone(&self.shared), schedule.update_period) {
            Ok(sweeper) => {
                log::info!("Sweep started (period {:?})", schedule.update_period);
                schedule.sweeper = Some(sweeper);
                true
            }
            Err(e) => {
                log::error!("Failed to spawn sweep thread: {}", e);
                false
            }
        }
    }

    /// Stops the periodic sweep. Returns `false` if it was not running.
    pub fn stop(&self) -> bool {
        let mut schedule = self.lock_schedule();
        match schedule.sweeper.take() {
            Some(sweeper) => {
                sweeper.shutdown();
                log::info!("Sweep stopped");
                true
            }
            None => false,
        }
    }

    /// Forgets every recorded entry. Only allowed while stopped.
    pub fn clear(&self) -> bool {
        let schedule = self.lock_schedule();
        if schedule.sweeper.is_some() {
            return false;
        }
        self.shared.lock_index().clear();
        log::info!("Bucket index cleared");
        true
    }

    /// Runs one sweep now, on the calling thread. Returns the number of evicted buckets.
    pub fn sweep(&self) -> usize {
        self.shared.sweep()
    }

    /// `accept` for a possibly absent entry. An absent entry is rejected.
    pub fn accept_opt(&self, entry: Option<&SecureData>, params: &AcceptParams<'_>) -> bool {
        match entry {
            Some(entry) => self.accept(entry, params),
            None => {
                log::debug!("Rejected: no entry");
                false
            }
        }
    }

    /// Decides whether `entry` is authentic, fresh and not a replay, and records it.
    ///
    /// Every failure mode yields `false`; nothing is propagated.
    ///
    /// Note: the entry is recorded before the final verdict is computed. If the
    /// clock moves out of the window in between, the call reports `false` yet the
    /// entry still takes part in later duplicate checks.
    pub fn accept(&self, entry: &SecureData, params: &AcceptParams<'_>) -> bool {
        if !entry.has_timestamp() {
            log::debug!("Rejected: no timestamp attached");
            return false;
        }
        if let Some(verifier) = params.data_verifier {
            if !matches!(entry.verify(verifier), Ok(true)) {
                log::debug!("Rejected: payload signature does not verify");
                return false;
            }
        }
        let timestamp = match entry.timestamp_millis(params.decryptor) {
            Ok(timestamp) => timestamp,
            Err(e) => {
                log::debug!("Rejected: unreadable timestamp ({})", e);
                return false;
            }
        };
        let timestamp_verifier = params.replay.verifier();
        if let Some(verifier) = timestamp_verifier {
            if !matches!(entry.verify_timestamp(verifier), Ok(true)) {
                log::debug!("Rejected: timestamp signature does not verify");
                return false;
            }
        }

        let tester = self.shared.tester();
        {
            let mut index = self.shared.lock_index();
            if !tester.test(timestamp) {
                log::debug!("Rejected: timestamp {} outside freshness window", timestamp);
                return false;
            }
            if params.replay.is_enabled() && index.contains(timestamp, entry) {
                log::debug!("Rejected: replay of entry under timestamp {}", timestamp);
                return false;
            }
            index.insert(timestamp, entry.clone());
        }

        !entry.is_expired(&tester, params.decryptor, timestamp_verifier)
    }

    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.shared.policy.read().unwrap_or_else(PoisonError::into_inner).clock)
    }

    /// Swaps the clock. Takes effect for the next `accept` and sweep.
    pub fn set_clock(&self, clock: Arc<dyn Clock>) {
        self.shared.update_policy(|policy| policy.clock = clock);
    }

    pub fn max_time_error(&self) -> u64 {
        self.shared.policy.read().unwrap_or_else(PoisonError::into_inner).max_time_error
    }

    /// Changes the tolerance. Recorded buckets are re-evaluated at the next sweep.
    pub fn set_max_time_error(&self, max_time_error: u64) {
        self.shared.update_policy(|policy| policy.max_time_error = max_time_error);
    }

    pub fn unit(&self) -> TimeUnit {
        self.shared.policy.read().unwrap_or_else(PoisonError::into_inner).unit
    }

    pub fn set_unit(&self, unit: TimeUnit) {
        self.shared.update_policy(|policy| policy.unit = unit);
    }

    /// The current freshness predicate.
    pub fn time_tester(&self) -> TimeTester {
        self.shared.tester()
    }

    pub fn update_period(&self) -> Duration {
        self.lock_schedule().update_period
    }

    /// Changes the sweep interval. A running sweep keeps its interval until restarted.
    pub fn set_update_period(&self, update_period: Duration) {
        self.lock_schedule().update_period = update_period;
    }

    /// Number of distinct timestamps currently recorded.
    pub fn bucket_count(&self) -> usize {
        self.shared.lock_index().bucket_count()
    }

    /// Number of entries recorded under `timestamp`.
    pub fn bucket_len(&self, timestamp: i64) -> usize {
        self.shared.lock_index().bucket_len(timestamp)
    }

    /// Total number of recorded entries across all buckets.
    pub fn entry_count(&self) -> usize {
        self.shared.lock_index().entry_count()
    }

    pub fn contains(&self, timestamp: i64, entry: &SecureData) -> bool {
        self.shared.lock_index().contains(timestamp, entry)
    }
}

impl Default for ExpiringDataManager {
    fn default() -> Self {
        Self::new(ManagerConfig::default())
    }
}

impl Drop for ExpiringDataManager {
    fn drop(&mut self) {
        self.stop();
    }
}

impl fmt::Display for ExpiringDataManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (buckets, entries) = {
            let index = self.shared.lock_index();
            (index.bucket_count(), index.entry_count())
        };
        write!(
            f,
            "ExpiringDataManager{{buckets={}, entries={}, max_time_error={}{}, update_period={:?}, running={}}}",
            buckets,
            entries,
            self.max_time_error(),
            self.unit(),
            self.update_period(),
            self.is_running()
        )
    }
}

impl fmt::Debug for ExpiringDataManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
