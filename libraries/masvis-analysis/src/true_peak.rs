//! True peak estimation by 4x polyphase oversampling
//!
//! Every 24-sample window of a channel is dotted with the four FIR phases,
//! which yields the four interpolated values of that position without
//! building the upsampled signal. The true peak of a channel is the larger
//! of its sample peak and the largest interpolated magnitude.

use crate::filters::{true_peak_fir, TRUE_PEAK_TAPS};
use crate::levels::db;
use crate::loudness::short_term_ranges;
use serde::{Deserialize, Serialize};

/// True peak measurements of one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruePeak {
    /// Linear true peak per channel
    pub linear: Vec<f64>,
    /// True peak per channel in dBTP
    pub dbtp: Vec<f64>,
    /// Largest oversampled magnitude in each short-term block, `[channel][block]`
    pub short_term: Vec<Vec<f64>>,
}

impl TruePeak {
    /// Highest true peak over all channels, in dBTP
    pub fn max_dbtp(&self) -> f64 {
        self.dbtp.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Largest interpolated magnitude at each window position of `samples`
///
/// Window `j` covers `samples[j..j + 24]`; positions run up to (not
/// including) `len - 24`.
pub fn oversampled_peaks(samples: &[f64]) -> Vec<f64> {
    let fir = true_peak_fir();
    let positions = samples.len().saturating_sub(TRUE_PEAK_TAPS);

    samples
        .windows(TRUE_PEAK_TAPS)
        .take(positions)
        .map(|window| {
            fir.iter()
                .map(|phase| {
                    phase
                        .iter()
                        .zip(window)
                        .map(|(c, x)| c * x)
                        .sum::<f64>()
                        .abs()
                })
                .fold(0.0, f64::max)
        })
        .collect()
}

/// True peak of every channel and its short-term series
///
/// `sample_peaks` are the linear sample-domain peaks from
/// [`crate::peak_and_rms`]. The short-term series uses the same block grid
/// as the short-term loudness (3 second windows advanced by `hop` samples),
/// taking the largest oversampled value whose window starts in the block.
pub fn true_peaks<S: AsRef<[f64]>>(
    channels: &[S],
    sample_peaks: &[f64],
    sample_rate: usize,
    hop: usize,
) -> TruePeak {
    let mut linear = Vec::with_capacity(channels.len());
    let mut short_term = Vec::with_capacity(channels.len());

    for (channel, &sample_peak) in channels.iter().zip(sample_peaks) {
        let samples = channel.as_ref();
        let peaks = oversampled_peaks(samples);
        let oversampled_peak = peaks.iter().copied().fold(0.0, f64::max);
        linear.push(sample_peak.max(oversampled_peak));

        let blocks = short_term_ranges(samples.len(), sample_rate, hop)
            .map(|range| {
                let end = range.end.min(peaks.len());
                let start = range.start.min(end);
                peaks[start..end].iter().copied().fold(0.0, f64::max)
            })
            .collect();
        short_term.push(blocks);
    }

    TruePeak {
        dbtp: linear.iter().map(|&tp| db(tp, 1.0)).collect(),
        linear,
        short_term,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{peak, DB_FLOOR};
    use std::f64::consts::PI;

    #[test]
    fn short_buffers_have_no_windows() {
        assert!(oversampled_peaks(&[1.0; TRUE_PEAK_TAPS]).is_empty());
        assert_eq!(oversampled_peaks(&[1.0; TRUE_PEAK_TAPS + 3]).len(), 3);
    }

    #[test]
    fn inter_sample_peak_exceeds_sample_peak() {
        // fs/4 sine at 45 degrees phase: samples sit at +-0.707 of the true amplitude
        let samples: Vec<f64> = (0..4_800)
            .map(|i| (PI / 2.0 * i as f64 + PI / 4.0).sin())
            .collect();
        let sample_peak = peak(&samples);
        let tp = true_peaks(&[samples], &[sample_peak], 48_000, 48_000 * 3);
        assert!(tp.linear[0] > sample_peak * 1.3);
        assert!(tp.dbtp[0] > -0.5 && tp.dbtp[0] < 0.5, "got {}", tp.dbtp[0]);
    }

    #[test]
    fn silence_reads_floor() {
        let tp = true_peaks(&[vec![0.0; 1_000]], &[0.0], 100, 300);
        assert_eq!(tp.dbtp, vec![DB_FLOOR]);
        assert_eq!(tp.short_term[0], vec![0.0; 3]);
    }

    #[test]
    fn short_term_series_tracks_blocks() {
        let fs = 100;
        let mut samples = vec![0.5; fs * 3];
        samples.extend(vec![0.1; fs * 3]);
        let tp = true_peaks(&[samples.clone()], &[peak(&samples)], fs, 3 * fs);
        assert_eq!(tp.short_term[0].len(), 2);
        // The step at the block boundary rings above 0.5
        assert!(tp.short_term[0][0] >= 0.5);
        assert!((tp.short_term[0][1] - 0.1).abs() < 0.001);
    }

    #[test]
    fn max_dbtp_spans_channels() {
        let tp = TruePeak {
            linear: vec![0.5, 1.0],
            dbtp: vec![db(0.5, 1.0), 0.0],
            short_term: vec![Vec::new(), Vec::new()],
        };
        assert_eq!(tp.max_dbtp(), 0.0);
    }
}
