//! Analysis configuration

use crate::histogram::DEFAULT_BIT_CAP;
use crate::loudest::DEFAULT_THRESHOLD;
use crate::loudness::SHORT_TERM_SECS;
use masvis_core::{MasvisError, Result};
use serde::{Deserialize, Serialize};

/// Tunable parameters of an analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Seconds between the starts of consecutive short-term blocks
    /// (3 gives non-overlapping blocks, 1 gives a block every second)
    pub short_term_hop_secs: u32,

    /// Upper bound on `log2` of the histogram bin count
    pub histogram_bit_cap: u32,

    /// Share of the global peak a sample must exceed to count towards
    /// the loudest window
    pub loudest_threshold: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            short_term_hop_secs: SHORT_TERM_SECS as u32,
            histogram_bit_cap: DEFAULT_BIT_CAP,
            loudest_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl AnalysisConfig {
    /// Short-term blocks start every second and overlap by two seconds
    pub fn overlapping_short_term() -> Self {
        Self {
            short_term_hop_secs: 1,
            ..Default::default()
        }
    }

    /// Set the short-term hop in seconds
    pub fn with_short_term_hop(mut self, secs: u32) -> Self {
        self.short_term_hop_secs = secs;
        self
    }

    /// Set the histogram bin cap
    pub fn with_histogram_bit_cap(mut self, bits: u32) -> Self {
        self.histogram_bit_cap = bits;
        self
    }

    /// Set the loudest window threshold
    pub fn with_loudest_threshold(mut self, threshold: f64) -> Self {
        self.loudest_threshold = threshold;
        self
    }

    /// Check every parameter is in range
    pub fn validate(&self) -> Result<()> {
        if self.short_term_hop_secs == 0 {
            return Err(MasvisError::invalid_config(
                "short_term_hop_secs must be at least 1",
            ));
        }
        if !(8..=24).contains(&self.histogram_bit_cap) {
            return Err(MasvisError::invalid_config(format!(
                "histogram_bit_cap must be between 8 and 24, got {}",
                self.histogram_bit_cap
            )));
        }
        if !(self.loudest_threshold > 0.0 && self.loudest_threshold <= 1.0) {
            return Err(MasvisError::invalid_config(format!(
                "loudest_threshold must be in (0, 1], got {}",
                self.loudest_threshold
            )));
        }
        Ok(())
    }
}
