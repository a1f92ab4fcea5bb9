//! Locate the densest run of near-peak samples
//!
//! The loudest part of a track is where the most samples come close to the
//! global peak within a short window. It is the part most likely to show
//! clipping or limiting artefacts.

use crate::levels::peak;
use serde::{Deserialize, Serialize};

/// Default share of the global peak a sample must exceed
pub const DEFAULT_THRESHOLD: f64 = 0.95;

/// Position of the loudest part of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoudestWindow {
    /// Channel holding the densest run
    pub channel: usize,
    /// First sample of the densest run
    pub sample_index: usize,
    /// Samples above the threshold within `sample_rate / 50` samples
    pub count: usize,
    /// Display window `(start, end)` around the run, within the track
    pub window: (usize, usize),
}

/// Find the loudest part of a track
///
/// A sample counts when `|x| > threshold * global_peak`. For every such
/// sample, the counted samples less than `sample_rate / 50` positions after
/// it are tallied; the first strict maximum over all channels wins. A track
/// with no qualifying sample reports channel 0, sample 0 and a count of 0.
pub fn loudest<S: AsRef<[f64]>>(channels: &[S], sample_rate: usize, threshold: f64) -> LoudestWindow {
    let span = sample_rate / 50;
    let global_peak = channels
        .iter()
        .map(|c| peak(c.as_ref()))
        .fold(0.0, f64::max);
    let level = threshold * global_peak;

    let mut best_channel = 0;
    let mut best_sample = 0;
    let mut best_count = 0;
    for (channel, samples) in channels.iter().enumerate() {
        let hits: Vec<usize> = samples
            .as_ref()
            .iter()
            .enumerate()
            .filter(|(_, x)| x.abs() > level)
            .map(|(i, _)| i)
            .collect();

        for (i, &s) in hits.iter().enumerate() {
            let end = (i + span).min(hits.len());
            let count = hits[i..end].iter().filter(|&&h| h < s + span).count();
            if count > best_count {
                best_channel = channel;
                best_sample = s;
                best_count = count;
            }
        }
    }

    let frames = channels.first().map_or(0, |c| c.as_ref().len());
    LoudestWindow {
        channel: best_channel,
        sample_index: best_sample,
        count: best_count,
        window: display_window(best_sample, frames, sample_rate),
    }
}

/// Window of `sample_rate / 10` samples centered on `sample`
///
/// Pinned to the first or last `sample_rate / 10` samples when it would
/// cross either end of the track.
fn display_window(sample: usize, frames: usize, sample_rate: usize) -> (usize, usize) {
    let half = sample_rate / 20;
    let full = sample_rate / 10;
    let mut window = match sample.checked_sub(half) {
        Some(start) => (start, sample + half),
        None => (0, full),
    };
    if window.1 > frames {
        window = (frames.saturating_sub(full), frames);
    }
    window
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn densest_run_wins() {
        let fs = 1_000;
        let mut samples = vec![0.1; fs];
        // Isolated full-scale sample, then a dense run of near-peak samples
        samples[100] = 1.0;
        for s in &mut samples[500..510] {
            *s = 0.97;
        }
        let result = loudest(&[samples], fs, DEFAULT_THRESHOLD);
        assert_eq!(result.channel, 0);
        assert_eq!(result.sample_index, 500);
        assert_eq!(result.count, 10);
        assert_eq!(result.window, (450, 550));
    }

    #[test]
    fn run_is_limited_to_the_window_span() {
        let fs = 1_000;
        // 20 sample span, every sample qualifies
        let result = loudest(&[vec![0.5; 200]], fs, DEFAULT_THRESHOLD);
        assert_eq!(result.count, 20);
        assert_eq!(result.sample_index, 0);
    }

    #[test]
    fn first_strict_maximum_across_channels() {
        let fs = 1_000;
        let mut left = vec![0.0; fs];
        let mut right = vec![0.0; fs];
        for s in &mut left[300..305] {
            *s = 1.0;
        }
        for s in &mut right[600..606] {
            *s = -1.0;
        }
        let result = loudest(&[left, right], fs, DEFAULT_THRESHOLD);
        assert_eq!(result.channel, 1);
        assert_eq!(result.sample_index, 600);
        assert_eq!(result.count, 6);
    }

    #[test]
    fn display_window_is_pinned_to_track_edges() {
        assert_eq!(display_window(10, 1_000, 1_000), (0, 100));
        assert_eq!(display_window(980, 1_000, 1_000), (900, 1_000));
        assert_eq!(display_window(500, 1_000, 1_000), (450, 550));
        assert_eq!(display_window(10, 50, 1_000), (0, 50));
    }

    #[test]
    fn silence_reports_nothing() {
        let result = loudest(&[vec![0.0; 500]], 1_000, DEFAULT_THRESHOLD);
        assert_eq!(result.count, 0);
        assert_eq!(result.sample_index, 0);
        assert_eq!(result.window, (0, 100));
    }
}
