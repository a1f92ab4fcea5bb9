//! Normalized average spectrum
//!
//! Each channel is cut into non-overlapping one second frames. Every frame
//! is Blackman windowed and transformed with an FFT as long as the sample
//! rate, so bin `k` sits at exactly `k` Hz. Power is averaged over frames and
//! expressed relative to the channel RMS.

use crate::levels::db;
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Average spectrum of every channel, in dB relative to the channel RMS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    /// Number of one second frames averaged
    pub frames: usize,
    /// `[channel][bin]`, bins `0..=sample_rate / 2`, one bin per Hz
    pub bins_db: Vec<Vec<f64>>,
}

impl Spectrum {
    /// Frequency of bin `bin` in Hz
    pub fn bin_hz(&self, bin: usize) -> f64 {
        bin as f64
    }
}

/// Symmetric Blackman window of `len` points
pub fn blackman(len: usize) -> Vec<f64> {
    match len {
        0 => Vec::new(),
        1 => vec![1.0],
        _ => {
            let m = (len - 1) as f64;
            (0..len)
                .map(|n| {
                    let x = n as f64 / m;
                    0.42 - 0.5 * (2.0 * PI * x).cos() + 0.08 * (4.0 * PI * x).cos()
                })
                .collect()
        }
    }
}

/// Normalized average spectrum of every channel
///
/// `channel_rms` comes from [`crate::peak_and_rms`]. Tracks shorter than one
/// second yield no frames and empty spectra.
pub fn spectrum<S: AsRef<[f64]>>(
    channels: &[S],
    sample_rate: usize,
    channel_rms: &[f64],
) -> Spectrum {
    let len = channels.first().map_or(0, |c| c.as_ref().len());
    let frames = if sample_rate == 0 { 0 } else { len / sample_rate };
    if frames == 0 {
        return Spectrum {
            frames,
            bins_db: vec![Vec::new(); channels.len()],
        };
    }

    let window = blackman(sample_rate);
    let fft = FftPlanner::<f64>::new().plan_fft_forward(sample_rate);
    let mut buffer = vec![Complex::new(0.0, 0.0); sample_rate];
    let mut scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
    let bins = sample_rate / 2 + 1;
    let scale = sample_rate as f64;

    let bins_db = channels
        .iter()
        .zip(channel_rms)
        .map(|(channel, &rms)| {
            let mut power = vec![0.0; bins];
            for frame in channel.as_ref().chunks_exact(sample_rate) {
                for ((slot, &x), &w) in buffer.iter_mut().zip(frame).zip(&window) {
                    *slot = Complex::new(x * w, 0.0);
                }
                fft.process_with_scratch(&mut buffer, &mut scratch);
                for (p, bin) in power.iter_mut().zip(&buffer) {
                    *p += (bin.norm() / scale).powi(2);
                }
            }
            power
                .into_iter()
                .map(|p| db((p / frames as f64).sqrt(), rms))
                .collect()
        })
        .collect();

    Spectrum { frames, bins_db }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::{rms, DB_FLOOR};

    #[test]
    fn blackman_is_symmetric_and_tapered() {
        let w = blackman(9);
        assert!(w[0].abs() < 1e-12);
        assert!(w[8].abs() < 1e-12);
        assert!((w[4] - 1.0).abs() < 1e-12);
        for (a, b) in w.iter().zip(w.iter().rev()) {
            assert!((a - b).abs() < 1e-12);
        }
        assert!(blackman(0).is_empty());
        assert_eq!(blackman(1), vec![1.0]);
    }

    #[test]
    fn sine_peaks_at_its_frequency() {
        let fs = 8_000;
        let signal: Vec<f64> = (0..fs * 2)
            .map(|i| 0.5 * (2.0 * PI * 1_000.0 * i as f64 / fs as f64).sin())
            .collect();
        let spec = spectrum(&[signal.clone()], fs, &[rms(&signal)]);

        assert_eq!(spec.frames, 2);
        assert_eq!(spec.bins_db[0].len(), fs / 2 + 1);
        let (loudest, level) = spec.bins_db[0]
            .iter()
            .copied()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert_eq!(loudest, 1_000);
        assert_eq!(spec.bin_hz(loudest), 1_000.0);
        // 0.21 * amplitude (Blackman coherent gain / 2) against amplitude / sqrt(2)
        assert!((level - (-10.545)).abs() < 0.05, "got {level}");
    }

    #[test]
    fn short_track_has_no_frames() {
        let spec = spectrum(&[vec![0.1; 500], vec![0.1; 500]], 1_000, &[0.1, 0.1]);
        assert_eq!(spec.frames, 0);
        assert_eq!(spec.bins_db, vec![Vec::<f64>::new(), Vec::new()]);
    }

    #[test]
    fn silence_is_floored() {
        let spec = spectrum(&[vec![0.0; 2_000]], 1_000, &[0.0]);
        assert!(spec.bins_db[0].iter().all(|&v| v == DB_FLOOR));
    }
}
