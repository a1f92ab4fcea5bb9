//! Dynamic range ("DR") score
//!
//! The signal is cut into 3 second blocks (plus the trailing partial block).
//! Each block contributes `sqrt(2 * mean(x²))` and its peak. Per channel,
//! the loudest 20% of block RMS values are compared against the second
//! highest block peak, which keeps a single outlier block from deciding the
//! score. The score is the rounded mean over channels.

use crate::levels::{mean_square, peak};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

/// Block length in seconds
pub const DR_BLOCK_SECS: usize = 3;

/// Share of the loudest blocks entering the RMS average
const LOUDEST_SHARE: f64 = 0.2;

/// Dynamic range score of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynamicRange {
    /// DR score in dB
    Value(u32),
    /// Could not be determined (too short, silent or degenerate)
    Unknown,
}

impl DynamicRange {
    /// The score, if known
    pub fn value(self) -> Option<u32> {
        match self {
            Self::Value(dr) => Some(dr),
            Self::Unknown => None,
        }
    }

    /// Whether the score could not be determined
    pub fn is_unknown(self) -> bool {
        self == Self::Unknown
    }
}

impl fmt::Display for DynamicRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(dr) => write!(f, "{dr}"),
            Self::Unknown => f.write_str("??"),
        }
    }
}

/// Reasons a DR score cannot be computed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DynamicRangeError {
    /// No channels were given
    #[error("No channels to measure")]
    NoChannels,

    /// The second highest peak needs at least two blocks
    #[error("Too few blocks: {0} (need at least 2)")]
    TooFewBlocks(usize),

    /// A channel produced a non-finite DR (silence, zero peak)
    #[error("Channel {channel} has a non-finite DR")]
    NonFinite { channel: usize },

    /// The rounded mean came out negative
    #[error("Negative DR: {0}")]
    Negative(i64),
}

/// Block RMS (scaled by sqrt 2) and peak of one channel, both sorted ascending
fn block_statistics(samples: &[f64], block_len: usize) -> (Vec<f64>, Vec<f64>) {
    let blocks = samples.chunks(block_len.max(1));
    let mut rms = Vec::with_capacity(blocks.len());
    let mut peaks = Vec::with_capacity(blocks.len());
    for block in blocks {
        rms.push((2.0 * mean_square(block)).sqrt());
        peaks.push(peak(block));
    }
    rms.sort_by(f64::total_cmp);
    peaks.sort_by(f64::total_cmp);
    (rms, peaks)
}

/// Number of loudest blocks averaged, at least one
///
/// Warns when 20% of the blocks rounds down to nothing.
fn loudest_block_count(blocks: usize) -> usize {
    let loudest = (blocks as f64 * LOUDEST_SHARE).round_ties_even() as usize;
    if loudest < 1 {
        warn!("Too few DR blocks ({}), using the loudest one", blocks);
        return 1;
    }
    loudest
}

/// Compute the DR score, reporting why it failed
pub fn try_dynamic_range<S: AsRef<[f64]>>(
    channels: &[S],
    sample_rate: usize,
) -> Result<u32, DynamicRangeError> {
    if channels.is_empty() {
        return Err(DynamicRangeError::NoChannels);
    }
    let block_len = (DR_BLOCK_SECS * sample_rate).max(1);

    // Channels share one length, so the block count is the same for all
    let blocks = channels[0].as_ref().len().div_ceil(block_len);
    let loudest = loudest_block_count(blocks);
    if blocks < 2 {
        return Err(DynamicRangeError::TooFewBlocks(blocks));
    }

    let mut sum = 0.0;
    for (channel, samples) in channels.iter().enumerate() {
        let (rms, peaks) = block_statistics(samples.as_ref(), block_len);
        let blocks = rms.len();
        if blocks < 2 {
            return Err(DynamicRangeError::TooFewBlocks(blocks));
        }
        let loudest = loudest.min(blocks);

        let top = &rms[blocks - loudest..];
        let top_rms = (top.iter().map(|r| r * r).sum::<f64>() / top.len() as f64).sqrt();
        let second_peak = peaks[blocks - 2];

        let dr = -20.0 * (top_rms / second_peak).log10();
        if !dr.is_finite() {
            return Err(DynamicRangeError::NonFinite { channel });
        }
        sum += dr;
    }

    let dr = (sum / channels.len() as f64).round_ties_even() as i64;
    u32::try_from(dr).map_err(|_| DynamicRangeError::Negative(dr))
}

/// DR score of a track; any failure is reported as [`DynamicRange::Unknown`]
pub fn dynamic_range<S: AsRef<[f64]>>(channels: &[S], sample_rate: usize) -> DynamicRange {
    match try_dynamic_range(channels, sample_rate) {
        Ok(dr) => DynamicRange::Value(dr),
        Err(e) => {
            debug!("DR unknown: {}", e);
            DynamicRange::Unknown
        }
    }
}
