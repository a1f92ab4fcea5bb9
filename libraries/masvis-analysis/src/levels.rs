//! Level primitives: RMS, peak, decibel conversion and crest factor

use serde::{Deserialize, Serialize};

/// Level reported in place of `-inf` dB (silence, zero denominators)
pub const DB_FLOOR: f64 = -128.0;

/// Root mean square of `samples`, 0.0 for an empty slice
pub fn rms(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    mean_square(samples).sqrt()
}

/// Mean of the squared samples, 0.0 for an empty slice
pub fn mean_square(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64
}

/// Largest absolute sample value
pub fn peak(samples: &[f64]) -> f64 {
    samples.iter().fold(0.0_f64, |acc, s| acc.max(s.abs()))
}

/// Ratio of `numerator` to `denominator` in decibels (`20 * log10`)
///
/// Never fails and never returns NaN or `-inf`:
/// - a NaN input or NaN result gives 0.0
/// - a zero denominator, `0 / 0` or a `-inf` result gives [`DB_FLOOR`]
pub fn db(numerator: f64, denominator: f64) -> f64 {
    if numerator.is_nan() || denominator.is_nan() {
        return 0.0;
    }
    if denominator == 0.0 {
        return DB_FLOOR;
    }
    let value = 20.0 * (numerator / denominator).log10();
    if value.is_nan() {
        0.0
    } else if value == f64::NEG_INFINITY {
        DB_FLOOR
    } else {
        value
    }
}

/// Peak, RMS and crest factor of every channel of a track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Levels {
    /// Linear peak per channel
    pub peak: Vec<f64>,
    /// Linear RMS per channel
    pub rms: Vec<f64>,
    /// Peak per channel in dBFS
    pub peak_dbfs: Vec<f64>,
    /// RMS per channel in dBFS
    pub rms_dbfs: Vec<f64>,
    /// Crest factor (peak over RMS) per channel in dB
    pub crest_db: Vec<f64>,
    /// Crest factor of all channels taken together
    pub crest_total_db: f64,
}

impl Levels {
    /// Largest peak over all channels
    pub fn max_peak(&self) -> f64 {
        self.peak.iter().copied().fold(0.0, f64::max)
    }
}

/// Per-channel peak and RMS, with the total crest over all channels flattened
pub fn peak_and_rms<S: AsRef<[f64]>>(channels: &[S]) -> Levels {
    let peak: Vec<f64> = channels.iter().map(|c| self::peak(c.as_ref())).collect();
    let rms: Vec<f64> = channels.iter().map(|c| self::rms(c.as_ref())).collect();

    let total_len: usize = channels.iter().map(|c| c.as_ref().len()).sum();
    let total_rms = if total_len == 0 {
        0.0
    } else {
        let sum: f64 = channels
            .iter()
            .flat_map(|c| c.as_ref().iter())
            .map(|s| s * s)
            .sum();
        (sum / total_len as f64).sqrt()
    };
    let global_peak = peak.iter().copied().fold(0.0, f64::max);

    Levels {
        peak_dbfs: peak.iter().map(|&p| db(p, 1.0)).collect(),
        rms_dbfs: rms.iter().map(|&r| db(r, 1.0)).collect(),
        crest_db: peak.iter().zip(&rms).map(|(&p, &r)| db(p, r)).collect(),
        crest_total_db: db(global_peak, total_rms),
        peak,
        rms,
    }
}

/// Peak, RMS and crest of every whole second, `[channel][second]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerSecondLevels {
    /// Peak of each second in dBFS
    pub peak_dbfs: Vec<Vec<f64>>,
    /// RMS of each second in dBFS
    pub rms_dbfs: Vec<Vec<f64>>,
    /// Crest factor of each second in dB
    pub crest_db: Vec<Vec<f64>>,
}

impl PerSecondLevels {
    /// Number of whole seconds measured
    pub fn seconds(&self) -> usize {
        self.peak_dbfs.first().map_or(0, Vec::len)
    }
}

/// Peak vs RMS over consecutive one-second frames; a trailing partial second is ignored
pub fn peak_vs_rms<S: AsRef<[f64]>>(channels: &[S], sample_rate: usize) -> PerSecondLevels {
    let mut result = PerSecondLevels {
        peak_dbfs: Vec::with_capacity(channels.len()),
        rms_dbfs: Vec::with_capacity(channels.len()),
        crest_db: Vec::with_capacity(channels.len()),
    };

    for channel in channels {
        let seconds = channel.as_ref().chunks_exact(sample_rate.max(1));
        let mut peaks = Vec::with_capacity(seconds.len());
        let mut rmss = Vec::with_capacity(seconds.len());
        let mut crests = Vec::with_capacity(seconds.len());
        for second in seconds {
            let p = peak(second);
            let r = rms(second);
            peaks.push(db(p, 1.0));
            rmss.push(db(r, 1.0));
            crests.push(db(p, r));
        }
        result.peak_dbfs.push(peaks);
        result.rms_dbfs.push(rmss);
        result.crest_db.push(crests);
    }

    result
}
