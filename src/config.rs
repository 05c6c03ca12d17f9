//! Sizing Configuration
//!
//! All values are whole-number percentages or counts. Both structs
//! deserialize with missing fields filled from the defaults, so partial
//! configs loaded from JSON or TOML are accepted.

use serde::{Deserialize, Serialize};

/// Default number of samples collected before a baseline is established
pub const DEFAULT_MAX_SAMPLES: u32 = 5;
/// Default deviation (percent) from baseline that triggers resampling
pub const DEFAULT_VARIANCE_THRESHOLD_PCT: u32 = 20;
/// Default headroom (percent) applied to the sampled average
pub const DEFAULT_GROWTH_FACTOR_PCT: u32 = 115;
/// Default deviation (percent) before a compiler feeds its sizer
pub const DEFAULT_UPDATE_THRESHOLD_PCT: u32 = 15;

/// Adaptive sizer parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SizerConfig {
    /// Samples to collect before establishing a baseline
    pub max_samples: u32,
    /// Deviation from baseline (percent) that restarts sampling
    pub variance_threshold_pct: u32,
    /// Multiplier (percent) applied to the average size
    pub growth_factor_pct: u32,
}

impl Default for SizerConfig {
    fn default() -> Self {
        SizerConfig {
            max_samples: DEFAULT_MAX_SAMPLES,
            variance_threshold_pct: DEFAULT_VARIANCE_THRESHOLD_PCT,
            growth_factor_pct: DEFAULT_GROWTH_FACTOR_PCT,
        }
    }
}

impl SizerConfig {
    pub fn new(max_samples: u32, variance_threshold_pct: u32, growth_factor_pct: u32) -> Self {
        SizerConfig {
            max_samples,
            variance_threshold_pct,
            growth_factor_pct,
        }
    }

    pub fn with_max_samples(mut self, max_samples: u32) -> Self {
        self.max_samples = max_samples;
        self
    }

    pub fn with_variance_threshold_pct(mut self, pct: u32) -> Self {
        self.variance_threshold_pct = pct;
        self
    }

    pub fn with_growth_factor_pct(mut self, pct: u32) -> Self {
        self.growth_factor_pct = pct;
        self
    }
}

/// Compiler parameters: sizer settings plus the update threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Predicted-vs-actual deviation (percent) before the sizer is fed
    pub update_threshold_pct: u32,
    #[serde(flatten)]
    pub sizer: SizerConfig,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            update_threshold_pct: DEFAULT_UPDATE_THRESHOLD_PCT,
            sizer: SizerConfig::default(),
        }
    }
}

impl CompilerConfig {
    pub fn new(
        update_threshold_pct: u32,
        max_samples: u32,
        variance_threshold_pct: u32,
        growth_factor_pct: u32,
    ) -> Self {
        CompilerConfig {
            update_threshold_pct,
            sizer: SizerConfig::new(max_samples, variance_threshold_pct, growth_factor_pct),
        }
    }

    pub fn with_update_threshold_pct(mut self, pct: u32) -> Self {
        self.update_threshold_pct = pct;
        self
    }

    pub fn with_sizer(mut self, sizer: SizerConfig) -> Self {
        self.sizer = sizer;
        self
    }
}
