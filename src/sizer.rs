//! Adaptive Buffer Sizer
//!
//! Predicts render output size so buffers are allocated once at the right
//! capacity. Two phases:
//!
//! 1. Sampling: collects `max_samples` sizes, then publishes
//!    `average * growth_factor_pct / 100` as the baseline.
//! 2. Baseline: serves the published baseline; a size deviating by more
//!    than `variance_threshold_pct` restarts sampling, seeded with that size.
//!
//! Performance characteristics:
//! - Hot path (`baseline`): single atomic load, called on every render.
//! - Warm path (deviation checks): lock-free unless a resample is needed.
//! - Cold path (sampling): short mutex section, the statistics change together.
//!
//! Baseline and phase are packed into one `AtomicU64` and always published
//! with a single store, so a reader never sees a baseline from one phase
//! paired with the other phase.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use crate::config::SizerConfig;

/// Bit 63 of the snapshot: set while sampling
const SAMPLING_BIT: u64 = 1 << 63;
/// Bits 0-62 of the snapshot: baseline in bytes
const BASELINE_MASK: u64 = SAMPLING_BIT - 1;

/// Estimation phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Collecting size samples
    Sampling,
    /// Serving an established baseline
    Baseline,
}

/// Atomically published view of the sizer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub baseline: usize,
    pub phase: Phase,
}

impl Snapshot {
    #[inline]
    fn pack(baseline: u64, phase: Phase) -> u64 {
        let mut packed = baseline.min(BASELINE_MASK);
        if phase == Phase::Sampling {
            packed |= SAMPLING_BIT;
        }
        packed
    }

    #[inline]
    fn unpack(packed: u64) -> Self {
        let phase = if packed & SAMPLING_BIT != 0 {
            Phase::Sampling
        } else {
            Phase::Baseline
        };
        Snapshot {
            baseline: usize::try_from(packed & BASELINE_MASK).unwrap_or(usize::MAX),
            phase,
        }
    }
}

/// Statistics and parameters guarded by the sizer mutex
#[derive(Debug)]
struct Stats {
    sum: u64,
    count: u32,
    max_samples: u32,
    growth_factor_pct: u32,
}

/// Whether `actual` deviates from `predicted` by more than `pct` percent
///
/// Integer form of `|actual - predicted| / predicted > pct / 100`.
#[inline]
pub(crate) fn deviates(predicted: usize, actual: usize, pct: u32) -> bool {
    let diff = predicted.abs_diff(actual) as u64;
    diff.saturating_mul(100) > (predicted as u64).saturating_mul(u64::from(pct))
}

/// Two-phase output size estimator, safe to share between threads
#[derive(Debug)]
pub struct AdaptiveSizer {
    /// Packed {phase, baseline}
    snapshot: AtomicU64,
    /// Read lock-free by deviation checks; written under `stats`
    variance_threshold_pct: AtomicU32,
    stats: Mutex<Stats>,
}

impl Default for AdaptiveSizer {
    fn default() -> Self {
        Self::new()
    }
}

impl AdaptiveSizer {
    /// Create a sizer with default parameters (5 samples, 20%, 115%)
    pub fn new() -> Self {
        Self::with_config(SizerConfig::default())
    }

    /// Create a sizer with custom parameters
    pub fn with_config(config: SizerConfig) -> Self {
        AdaptiveSizer {
            snapshot: AtomicU64::new(Snapshot::pack(0, Phase::Sampling)),
            variance_threshold_pct: AtomicU32::new(config.variance_threshold_pct),
            stats: Mutex::new(Stats {
                sum: 0,
                count: 0,
                max_samples: config.max_samples,
                growth_factor_pct: config.growth_factor_pct,
            }),
        }
    }

    /// Replace all parameters and restart sampling
    ///
    /// Statistics collected under the old parameters are discarded.
    pub fn configure(&self, config: SizerConfig) {
        let mut stats = self.stats.lock();
        stats.max_samples = config.max_samples;
        stats.growth_factor_pct = config.growth_factor_pct;
        stats.sum = 0;
        stats.count = 0;
        self.variance_threshold_pct
            .store(config.variance_threshold_pct, Ordering::Relaxed);
        self.publish(0, Phase::Sampling);
    }

    /// Current parameters
    pub fn config(&self) -> SizerConfig {
        let stats = self.stats.lock();
        SizerConfig {
            max_samples: stats.max_samples,
            variance_threshold_pct: self.variance_threshold_pct.load(Ordering::Relaxed),
            growth_factor_pct: stats.growth_factor_pct,
        }
    }

    /// Predicted buffer capacity in bytes (lock-free)
    #[inline]
    pub fn baseline(&self) -> usize {
        self.snapshot().baseline
    }

    /// Baseline and phase as one consistent view (lock-free)
    #[inline]
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::unpack(self.snapshot.load(Ordering::Acquire))
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.snapshot().phase
    }

    #[inline]
    pub fn is_sampling(&self) -> bool {
        self.phase() == Phase::Sampling
    }

    /// Number of samples in the current sampling run
    pub fn sample_count(&self) -> u32 {
        self.stats.lock().count
    }

    /// Clear statistics and return to sampling with no baseline
    pub fn reset(&self) {
        let mut stats = self.stats.lock();
        stats.sum = 0;
        stats.count = 0;
        self.publish(0, Phase::Sampling);
    }

    /// Record an observed render size
    pub fn update(&self, size: usize) {
        // Advisory only: both paths re-check under the lock before committing
        match self.phase() {
            Phase::Sampling => self.sample(size),
            Phase::Baseline => self.check(size),
        }
    }

    #[inline]
    fn publish(&self, baseline: u64, phase: Phase) {
        self.snapshot
            .store(Snapshot::pack(baseline, phase), Ordering::Release);
    }

    fn sample(&self, size: usize) {
        let mut stats = self.stats.lock();

        // A concurrent caller may have finished the run already
        if self.phase() != Phase::Sampling {
            return;
        }

        stats.sum = stats.sum.saturating_add(size as u64);
        stats.count += 1;
        self.finish_if_ready(&mut stats);
    }

    fn check(&self, size: usize) {
        let snapshot = self.snapshot();
        if snapshot.baseline == 0 {
            return;
        }

        let pct = self.variance_threshold_pct.load(Ordering::Relaxed);
        if !deviates(snapshot.baseline, size, pct) {
            return;
        }

        let mut stats = self.stats.lock();

        // Another caller already restarted sampling (or finished a new run)
        if self.snapshot() != snapshot {
            return;
        }

        debug!(
            size,
            baseline = snapshot.baseline,
            "render size deviated from baseline, resampling"
        );

        // Seed the new run with this size; keep the old baseline as the
        // capacity hint until the run completes
        stats.sum = size as u64;
        stats.count = 1;
        self.publish(snapshot.baseline as u64, Phase::Sampling);
        self.finish_if_ready(&mut stats);
    }

    /// Publish a baseline once enough samples are collected (lock held)
    fn finish_if_ready(&self, stats: &mut Stats) {
        if stats.count < stats.max_samples {
            return;
        }

        let average = stats.sum / u64::from(stats.count);
        let baseline = average.saturating_mul(u64::from(stats.growth_factor_pct)) / 100;

        if baseline == 0 {
            // Nothing worth reserving; start a fresh run
            stats.sum = 0;
            stats.count = 0;
            self.publish(0, Phase::Sampling);
            return;
        }

        debug!(baseline, samples = stats.count, "size baseline established");
        self.publish(baseline, Phase::Baseline);
    }
}
