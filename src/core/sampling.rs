//! Tick-based sampling of repeated records
//!
//! Within each tick, the first `first` records with a given level and
//! message are written; after that only every `thereafter`-th one is, and a
//! `thereafter` of zero drops the rest of the tick entirely. Counters are
//! kept per level in a fixed table of buckets keyed by a hash of the message,
//! so unrelated messages that collide share a budget.
//!
//! # Example
//!
//! ```
//! use ctxlog::{LogLevel, LogSampler, SamplingConfig};
//! use std::time::Duration;
//!
//! let sampler = LogSampler::new(SamplingConfig::new(Duration::from_secs(1), 1, 0));
//! assert!(sampler.should_sample(LogLevel::Info, "cache miss"));
//! assert!(!sampler.should_sample(LogLevel::Info, "cache miss"));
//! assert!(sampler.should_sample(LogLevel::Warn, "cache miss"));
//! ```

use super::log_level::LogLevel;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const BUCKETS: usize = 4096;

/// Sampling policy: per tick, the first `first` records pass, then every
/// `thereafter`-th
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingConfig {
    /// Length of one counting window. Zero disables sampling.
    #[serde(default = "default_tick")]
    pub tick: Duration,

    /// Records allowed per bucket at the start of each tick
    #[serde(default = "default_first")]
    pub first: u64,

    /// After `first`, allow one record in every `thereafter`
    #[serde(default = "default_thereafter")]
    pub thereafter: u64,
}

fn default_tick() -> Duration {
    Duration::from_secs(1)
}

fn default_first() -> u64 {
    100
}

fn default_thereafter() -> u64 {
    100
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            tick: default_tick(),
            first: default_first(),
            thereafter: default_thereafter(),
        }
    }
}

impl SamplingConfig {
    pub fn new(tick: Duration, first: u64, thereafter: u64) -> Self {
        Self {
            tick,
            first,
            thereafter,
        }
    }

    /// Whether this configuration samples at all
    pub fn is_enabled(&self) -> bool {
        !self.tick.is_zero()
    }
}

/// Sampling counters
///
/// ```
/// use ctxlog::SamplerMetrics;
///
/// let metrics = SamplerMetrics::new();
/// assert_eq!(metrics.sampled_count(), 0);
/// assert_eq!(metrics.dropped_count(), 0);
/// ```
#[derive(Debug)]
pub struct SamplerMetrics {
    sampled_count: AtomicU64,
    dropped_count: AtomicU64,
    total_count: AtomicU64,
}

impl SamplerMetrics {
    pub const fn new() -> Self {
        Self {
            sampled_count: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            total_count: AtomicU64::new(0),
        }
    }

    /// Records that passed the sampler
    #[inline]
    pub fn sampled_count(&self) -> u64 {
        self.sampled_count.load(Ordering::Relaxed)
    }

    /// Records the sampler suppressed
    #[inline]
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total_count(&self) -> u64 {
        self.total_count.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn record_sampled(&self) {
        self.sampled_count.fetch_add(1, Ordering::Relaxed);
        self.total_count.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_dropped(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
        self.total_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Fraction of records that passed. 1.0 before anything was seen.
    pub fn effective_sample_rate(&self) -> f64 {
        let sampled = self.sampled_count() as f64;
        let total = self.total_count() as f64;

        if total == 0.0 {
            1.0
        } else {
            sampled / total
        }
    }

    pub fn reset(&self) {
        self.sampled_count.store(0, Ordering::Relaxed);
        self.dropped_count.store(0, Ordering::Relaxed);
        self.total_count.store(0, Ordering::Relaxed);
    }
}

impl Default for SamplerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for SamplerMetrics {
    fn clone(&self) -> Self {
        Self {
            sampled_count: AtomicU64::new(self.sampled_count()),
            dropped_count: AtomicU64::new(self.dropped_count()),
            total_count: AtomicU64::new(self.total_count()),
        }
    }
}

/// One bucket: a count and the instant (as nanos since sampler start) after
/// which it resets
#[derive(Debug)]
struct Counter {
    reset_at: AtomicU64,
    count: AtomicU64,
}

impl Counter {
    /// The first window opens with the sampler itself
    fn starting(tick: u64) -> Self {
        Self {
            reset_at: AtomicU64::new(tick),
            count: AtomicU64::new(0),
        }
    }

    /// Increment, starting a new window if the current one has expired.
    /// Returns the count within the current window.
    fn inc_check_reset(&self, now: u64, tick: u64) -> u64 {
        let reset_at = self.reset_at.load(Ordering::Acquire);
        if reset_at > now {
            return self.count.fetch_add(1, Ordering::AcqRel) + 1;
        }
        self.open_window(reset_at, now, tick)
    }

    /// Only the thread whose swap of `expired` succeeds resets the count;
    /// everyone else counts into the window it opened.
    fn open_window(&self, expired: u64, now: u64, tick: u64) -> u64 {
        let next = now.saturating_add(tick);
        match self
            .reset_at
            .compare_exchange(expired, next, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => {
                self.count.store(1, Ordering::Release);
                1
            }
            Err(_) => self.count.fetch_add(1, Ordering::AcqRel) + 1,
        }
    }
}

/// 32-bit FNV-1a
fn fnv32a(s: &str) -> u32 {
    const OFFSET: u32 = 2_166_136_261;
    const PRIME: u32 = 16_777_619;
    s.bytes()
        .fold(OFFSET, |hash, byte| (hash ^ u32::from(byte)).wrapping_mul(PRIME))
}

/// Thread-safe tick sampler
///
/// Every `Logger` handle derived from the same configuration shares one
/// sampler, so budgets are global to the backend.
pub struct LogSampler {
    config: SamplingConfig,
    counters: Vec<Counter>,
    epoch: Instant,
    metrics: SamplerMetrics,
}

impl LogSampler {
    pub fn new(config: SamplingConfig) -> Self {
        let tick = config.tick.as_nanos() as u64;
        let mut counters = Vec::with_capacity(LogLevel::ALL.len() * BUCKETS);
        counters.resize_with(LogLevel::ALL.len() * BUCKETS, || Counter::starting(tick));
        Self {
            config,
            counters,
            epoch: Instant::now(),
            metrics: SamplerMetrics::new(),
        }
    }

    /// Decide whether a record should be written
    pub fn should_sample(&self, level: LogLevel, message: &str) -> bool {
        if !self.config.is_enabled() {
            self.metrics.record_sampled();
            return true;
        }

        let bucket = fnv32a(message) as usize % BUCKETS;
        let counter = &self.counters[level.index() * BUCKETS + bucket];

        let now = self.epoch.elapsed().as_nanos() as u64;
        let tick = self.config.tick.as_nanos() as u64;
        let n = counter.inc_check_reset(now, tick);

        let keep = n <= self.config.first
            || (self.config.thereafter > 0 && (n - self.config.first) % self.config.thereafter == 0);

        if keep {
            self.metrics.record_sampled();
        } else {
            self.metrics.record_dropped();
        }
        keep
    }

    pub fn metrics(&self) -> &SamplerMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }
}

impl std::fmt::Debug for LogSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogSampler")
            .field("config", &self.config)
            .field("metrics", &self.metrics)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_first_then_drop_within_tick() {
        let sampler = LogSampler::new(SamplingConfig::new(Duration::from_millis(100), 1, 0));

        let passed = (0..5)
            .filter(|_| sampler.should_sample(LogLevel::Info, "repeated"))
            .count();

        assert_eq!(passed, 1);
        assert_eq!(sampler.metrics().sampled_count(), 1);
        assert_eq!(sampler.metrics().dropped_count(), 4);
    }

    #[test]
    fn test_thereafter_keeps_every_nth() {
        let sampler = LogSampler::new(SamplingConfig::new(Duration::from_secs(60), 2, 3));

        let decisions: Vec<bool> = (0..8)
            .map(|_| sampler.should_sample(LogLevel::Debug, "tick"))
            .collect();

        // 1 and 2 pass as `first`, then 5 and 8.
        assert_eq!(
            decisions,
            vec![true, true, false, false, true, false, false, true]
        );
    }

    #[test]
    fn test_levels_and_messages_have_separate_budgets() {
        let sampler = LogSampler::new(SamplingConfig::new(Duration::from_secs(60), 1, 0));

        assert!(sampler.should_sample(LogLevel::Info, "a"));
        assert!(!sampler.should_sample(LogLevel::Info, "a"));
        assert!(sampler.should_sample(LogLevel::Error, "a"));
        assert!(sampler.should_sample(LogLevel::Info, "b"));
    }

    #[test]
    fn test_window_resets_after_tick() {
        let sampler = LogSampler::new(SamplingConfig::new(Duration::from_millis(20), 1, 0));

        assert!(sampler.should_sample(LogLevel::Info, "again"));
        assert!(!sampler.should_sample(LogLevel::Info, "again"));

        thread::sleep(Duration::from_millis(40));
        assert!(sampler.should_sample(LogLevel::Info, "again"));
    }

    #[test]
    fn test_late_window_opener_does_not_reset_count() {
        let counter = Counter::starting(10);

        assert_eq!(counter.inc_check_reset(15, 10), 1);
        assert_eq!(counter.inc_check_reset(16, 10), 2);

        // A thread that still saw the old deadline loses the swap and
        // counts into the window that was already opened.
        assert_eq!(counter.open_window(10, 17, 10), 3);
        assert_eq!(counter.inc_check_reset(18, 10), 4);
        assert_eq!(counter.reset_at.load(Ordering::Acquire), 25);

        assert_eq!(counter.inc_check_reset(25, 10), 1);
    }

    #[test]
    fn test_zero_tick_disables_sampling() {
        let sampler = LogSampler::new(SamplingConfig::new(Duration::ZERO, 1, 0));
        assert!((0..10).all(|_| sampler.should_sample(LogLevel::Info, "x")));
        assert_eq!(sampler.metrics().effective_sample_rate(), 1.0);
    }

    #[test]
    fn test_concurrent_budget_is_respected() {
        let sampler = Arc::new(LogSampler::new(SamplingConfig::new(
            Duration::from_secs(60),
            10,
            0,
        )));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sampler = Arc::clone(&sampler);
                thread::spawn(move || {
                    (0..100)
                        .filter(|_| sampler.should_sample(LogLevel::Info, "shared"))
                        .count()
                })
            })
            .collect();

        let passed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(passed, 10);
        assert_eq!(sampler.metrics().total_count(), 800);
    }

    #[test]
    fn test_fnv32a_known_values() {
        assert_eq!(fnv32a(""), 0x811c_9dc5);
        assert_eq!(fnv32a("a"), 0xe40c_292c);
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: SamplingConfig = serde_json::from_str("{\"first\": 5}").unwrap();
        assert_eq!(config.first, 5);
        assert_eq!(config.thereafter, 100);
        assert_eq!(config.tick, Duration::from_secs(1));
    }
}
