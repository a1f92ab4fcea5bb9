//! ITU-R BS.1770 loudness and EBU R128 measurements
//!
//! It measures:
//! - Integrated loudness (LKFS/LUFS): gated over 400 ms blocks with 75% overlap
//! - Short-term loudness: ungated over 3 second windows
//! - Loudness range (LRA): spread of the short-term distribution (EBU Tech 3342)
//!
//! Gating is two-pass. The absolute gate drops blocks at or below -70 LKFS;
//! the relative gate sits 10 LU below the loudness of the mean power of the
//! blocks that survived the absolute gate.

use crate::filters::k_weighting_coeffs;
use crate::levels::{mean_square, DB_FLOOR};
use masvis_core::ChannelWeights;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Absolute gate in LKFS
pub const ABSOLUTE_GATE_LKFS: f64 = -70.0;

/// Relative gate below the absolute-gated loudness, in LU
pub const RELATIVE_GATE_LU: f64 = 10.0;

/// Relative gate for the loudness range, in LU
pub const LRA_RELATIVE_GATE_LU: f64 = 20.0;

/// Short-term window length in seconds
pub const SHORT_TERM_SECS: usize = 3;

const LKFS_OFFSET: f64 = -0.691;
const GATE_BLOCK_SECS: f64 = 0.4;
const GATE_OVERLAP: f64 = 0.75;

/// Loudness of a channel-weighted mean square, floored like [`crate::db`]
fn power_to_lkfs(power: f64) -> f64 {
    let lkfs = LKFS_OFFSET + 10.0 * power.log10();
    if lkfs.is_finite() {
        lkfs
    } else {
        DB_FLOOR
    }
}

fn weighted_power(mean_squares: &[f64], weights: &[f64]) -> f64 {
    mean_squares.iter().zip(weights).map(|(z, g)| g * z).sum()
}

/// Start offsets of `window`-long blocks advanced by `hop`
///
/// Only blocks that fit entirely inside `len` samples are produced.
pub fn block_ranges(len: usize, window: usize, hop: usize) -> impl Iterator<Item = Range<usize>> {
    let count = if window == 0 || hop == 0 || len < window {
        0
    } else {
        (len - window) / hop + 1
    };
    (0..count).map(move |i| i * hop..i * hop + window)
}

/// Blocks of the short-term series: 3 second windows advanced by `hop` samples
pub fn short_term_ranges(
    len: usize,
    sample_rate: usize,
    hop: usize,
) -> impl Iterator<Item = Range<usize>> {
    block_ranges(len, SHORT_TERM_SECS * sample_rate, hop)
}

/// Loudness of `channels` per ITU-R BS.1770
///
/// Every channel is K-weighted from a zero filter state. With `gated` the
/// integrated (two-pass gated) loudness is returned; otherwise the mean
/// square over the whole buffer is used, which is how short-term blocks are
/// measured. Silence, or a buffer where no block survives gating, reports
/// [`DB_FLOOR`].
pub fn itu1770<S: AsRef<[f64]>>(
    channels: &[S],
    sample_rate: f64,
    weights: &ChannelWeights,
    gated: bool,
) -> f64 {
    let coeffs = k_weighting_coeffs(sample_rate);
    let weighted: Vec<Vec<f64>> = channels
        .iter()
        .map(|channel| coeffs.apply(channel.as_ref()))
        .collect();
    let g = weights.as_slice();

    if !gated {
        let z: Vec<f64> = weighted.iter().map(|c| mean_square(c)).collect();
        return power_to_lkfs(weighted_power(&z, g));
    }

    let len = weighted.first().map_or(0, Vec::len);
    let block = (sample_rate * GATE_BLOCK_SECS) as usize;
    let hop = ((1.0 - GATE_OVERLAP) * block as f64) as usize;

    // z[i][c]: mean square of channel c over block i
    let z: Vec<Vec<f64>> = block_ranges(len, block, hop)
        .map(|range| {
            weighted
                .iter()
                .map(|c| mean_square(&c[range.clone()]))
                .collect()
        })
        .collect();
    let block_loudness: Vec<f64> = z.iter().map(|zi| power_to_lkfs(weighted_power(zi, g))).collect();

    let above_absolute = |i: &usize| block_loudness[*i] > ABSOLUTE_GATE_LKFS;
    let absolute: Vec<usize> = (0..z.len()).filter(above_absolute).collect();
    if absolute.is_empty() {
        return DB_FLOOR;
    }
    let relative_gate =
        power_to_lkfs(weighted_power(&mean_blocks(&z, &absolute), g)) - RELATIVE_GATE_LU;

    let relative: Vec<usize> = absolute
        .into_iter()
        .filter(|&i| block_loudness[i] > relative_gate)
        .collect();
    if relative.is_empty() {
        return DB_FLOOR;
    }
    power_to_lkfs(weighted_power(&mean_blocks(&z, &relative), g))
}

/// Per-channel mean of the selected blocks' mean squares
fn mean_blocks(z: &[Vec<f64>], selected: &[usize]) -> Vec<f64> {
    let channels = z.first().map_or(0, Vec::len);
    let mut mean = vec![0.0; channels];
    for &i in selected {
        for (m, v) in mean.iter_mut().zip(&z[i]) {
            *m += v;
        }
    }
    let n = selected.len() as f64;
    mean.iter_mut().for_each(|m| *m /= n);
    mean
}

/// EBU R128 measurements of one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EbuR128Loudness {
    /// Gated integrated loudness in LKFS
    pub integrated_lkfs: f64,
    /// Short-term loudness of each block in LKFS
    pub short_term_lkfs: Vec<f64>,
    /// Loudness range in LU
    pub range_lu: f64,
}

/// Integrated loudness, short-term series and loudness range
///
/// Short-term blocks are 3 seconds long and advance by `hop` samples; a hop
/// of three seconds gives non-overlapping blocks.
pub fn ebu_r128<S: AsRef<[f64]>>(
    channels: &[S],
    sample_rate: usize,
    weights: &ChannelWeights,
    hop: usize,
) -> EbuR128Loudness {
    let fs = sample_rate as f64;
    let integrated_lkfs = itu1770(channels, fs, weights, true);

    let len = channels.first().map_or(0, |c| c.as_ref().len());
    let short_term_lkfs: Vec<f64> = short_term_ranges(len, sample_rate, hop)
        .map(|range| {
            let block: Vec<&[f64]> = channels.iter().map(|c| &c.as_ref()[range.clone()]).collect();
            itu1770(&block, fs, weights, false)
        })
        .collect();

    let range_lu = loudness_range(&short_term_lkfs);

    EbuR128Loudness {
        integrated_lkfs,
        short_term_lkfs,
        range_lu,
    }
}

/// Loudness range of a short-term series
///
/// Blocks at or above -70 LKFS are kept, then those within 20 LU of their
/// power mean. The range spans the 10th to the 95th percentile of what
/// remains. Returns 0.0 when nothing survives.
pub fn loudness_range(short_term_lkfs: &[f64]) -> f64 {
    let absolute: Vec<f64> = short_term_lkfs
        .iter()
        .copied()
        .filter(|&l| l >= ABSOLUTE_GATE_LKFS)
        .collect();
    if absolute.is_empty() {
        return 0.0;
    }

    let power = absolute.iter().map(|l| 10.0_f64.powf(l / 10.0)).sum::<f64>() / absolute.len() as f64;
    let integrated = 10.0 * power.log10();

    let mut relative: Vec<f64> = absolute
        .into_iter()
        .filter(|&l| l >= integrated - LRA_RELATIVE_GATE_LU)
        .collect();
    if relative.is_empty() {
        return 0.0;
    }
    relative.sort_by(f64::total_cmp);

    let last = (relative.len() - 1) as f64;
    let low = relative[(last * 0.10).round_ties_even() as usize];
    let high = relative[(last * 0.95).round_ties_even() as usize];
    high - low
}
