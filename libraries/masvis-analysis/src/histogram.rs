//! Sample histogram and bit utilization
//!
//! Bins are equal-width over the full fixed-point range of the bit depth,
//! with the last bin closed on both ends. Depths above the bin cap share
//! bins between neighbouring codes, so their effective bit count is scaled
//! back up as an approximation.

use serde::{Deserialize, Serialize};

/// Default upper bound on `log2(bin count)`
pub const DEFAULT_BIT_CAP: u32 = 18;

/// Histogram of the fixed-point samples of every channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    /// Lowest representable sample value (left edge of the first bin)
    pub min: i64,
    /// Highest representable sample value (right edge of the last bin)
    pub max: i64,
    /// `[channel][bin]` sample counts
    pub counts: Vec<Vec<u64>>,
    /// Effective bits per channel: `log2` of the number of used bins
    pub effective_bits: Vec<f64>,
}

impl Histogram {
    /// Number of bins per channel
    pub fn bins(&self) -> usize {
        self.counts.first().map_or(0, Vec::len)
    }

    /// Bin that `value` falls into
    pub fn bin_of(&self, value: i64) -> usize {
        bin_index(value, self.min, self.max, self.bins())
    }
}

/// Bin of `value` among `bins` equal-width bins over `[min, max]`
///
/// Values outside the range land in the outermost bins.
fn bin_index(value: i64, min: i64, max: i64, bins: usize) -> usize {
    if bins == 0 {
        return 0;
    }
    let width = (max - min).max(1) as u128;
    let offset = (value.clamp(min, max) - min) as u128;
    let index = (offset * bins as u128 / width) as usize;
    index.min(bins - 1)
}

/// Histogram and effective bits of every channel
///
/// Uses `2^min(bit_depth, bit_cap)` bins spanning
/// `[-2^(bit_depth-1), 2^(bit_depth-1) - 1]`.
pub fn histogram<S: AsRef<[i32]>>(channels: &[S], bit_depth: u32, bit_cap: u32) -> Histogram {
    let hist_bits = bit_depth.min(bit_cap);
    let bins = 1_usize << hist_bits;
    let min = -(1_i64 << (bit_depth - 1));
    let max = (1_i64 << (bit_depth - 1)) - 1;

    let counts: Vec<Vec<u64>> = channels
        .iter()
        .map(|channel| {
            let mut counts = vec![0_u64; bins];
            for &x in channel.as_ref() {
                counts[bin_index(i64::from(x), min, max, bins)] += 1;
            }
            counts
        })
        .collect();

    let scale = if bit_depth > hist_bits {
        f64::from(bit_depth) / f64::from(hist_bits)
    } else {
        1.0
    };
    let effective_bits = counts
        .iter()
        .map(|c| (c.iter().filter(|&&n| n > 0).count() as f64).log2() * scale)
        .collect();

    Histogram {
        min,
        max,
        counts,
        effective_bits,
    }
}
