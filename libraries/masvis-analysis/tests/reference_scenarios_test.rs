//! ITU-R BS.1770 / EBU R128 reference scenarios
//!
//! These tests check the analyzer against known values:
//! - 997 Hz / 1 kHz full-scale tones (-3.01 LKFS mono, 3.01 dB crest)
//! - Digital silence (-128 dB floor everywhere, unknown DR)
//! - Gated integrated loudness against the `ebur128` crate
//! - True peak of inter-sample overs

use ebur128::{EbuR128, Mode};
use masvis_analysis::{itu1770, Analyzer, DynamicRange, DB_FLOOR};
use masvis_core::{ChannelWeights, NoProgress, Track};
use std::f64::consts::PI;

// ============================================================================
// Test Signal Generators
// ============================================================================

fn generate_sine(sample_rate: u32, frequency: f64, amplitude: f64, duration_secs: f64) -> Vec<f64> {
    let num_samples = (f64::from(sample_rate) * duration_secs) as usize;
    (0..num_samples)
        .map(|i| amplitude * (2.0 * PI * frequency * i as f64 / f64::from(sample_rate)).sin())
        .collect()
}

fn to_fixed(samples: &[f64], bit_depth: u32) -> Vec<i32> {
    let scale = f64::from(1_u32 << (bit_depth - 1));
    samples
        .iter()
        .map(|&x| (x * scale).round().clamp(-scale, scale - 1.0) as i32)
        .collect()
}

/// Integrated loudness of interleaved stereo measured by `ebur128`
fn reference_loudness(left: &[f64], right: &[f64], sample_rate: u32) -> f64 {
    let mut meter = EbuR128::new(2, sample_rate, Mode::I).unwrap();
    let interleaved: Vec<f64> = left
        .iter()
        .zip(right)
        .flat_map(|(&l, &r)| [l, r])
        .collect();
    meter.add_frames_f64(&interleaved).unwrap();
    meter.loudness_global().unwrap()
}

// ============================================================================
// Full-Scale Tone (48 kHz, mono, 5 s)
// ============================================================================

#[test]
fn test_full_scale_sine_scenario() {
    let fs = 48_000;
    let sine = generate_sine(fs, 1_000.0, 1.0, 5.0);
    let fixed = to_fixed(&sine, 16);
    let track = Track::new(vec![fixed], vec![sine], fs, 16, Some("mono")).unwrap();

    let result = Analyzer::default().analyze(&track, &mut NoProgress).unwrap();

    assert!((result.levels.crest_db[0] - 3.01).abs() < 0.05, "crest {}", result.levels.crest_db[0]);
    assert!(result.true_peak.dbtp[0].abs() < 0.1, "true peak {}", result.true_peak.dbtp[0]);
    assert!(
        (result.loudness.integrated_lkfs - (-3.01)).abs() < 0.1,
        "loudness {}",
        result.loudness.integrated_lkfs
    );
    match result.dynamic_range {
        DynamicRange::Value(dr) => assert!(dr < 20, "DR {dr}"),
        DynamicRange::Unknown => panic!("DR should be known for a 5 s tone"),
    }

    let again = Analyzer::default().analyze(&track, &mut NoProgress).unwrap();
    assert_eq!(result.checksum, again.checksum);
    assert_ne!(result.checksum, 0);
}

#[test]
fn test_997hz_reference_tone_is_minus_3_01_lkfs() {
    for fs in [44_100, 48_000] {
        let sine = generate_sine(fs, 997.0, 1.0, 5.0);
        let weights = ChannelWeights::resolve(Some("mono"), 1);
        let lkfs = itu1770(&[sine], f64::from(fs), &weights, true);
        assert!((lkfs - (-3.01)).abs() < 0.05, "{fs} Hz: {lkfs}");
    }
}

// ============================================================================
// Digital Silence (44.1 kHz, stereo, 10 s)
// ============================================================================

#[test]
fn test_digital_silence_scenario() {
    let fs = 44_100;
    let frames = fs as usize * 10;
    let track = Track::from_fixed(vec![vec![0; frames]; 2], fs, 16, Some("stereo")).unwrap();

    let result = Analyzer::default().analyze(&track, &mut NoProgress).unwrap();

    assert_eq!(result.levels.peak_dbfs, vec![DB_FLOOR, DB_FLOOR]);
    assert_eq!(result.levels.rms_dbfs, vec![DB_FLOOR, DB_FLOOR]);
    assert_eq!(result.dynamic_range, DynamicRange::Unknown);
    assert_eq!(result.loudness.integrated_lkfs, DB_FLOOR);
    assert_eq!(result.loudness.range_lu, 0.0);
    assert_eq!(result.true_peak.dbtp, vec![DB_FLOOR, DB_FLOOR]);
    assert_eq!(result.checksum, 0);

    let zero_bin = result.histogram.bin_of(0);
    for channel in &result.histogram.counts {
        assert_eq!(channel[zero_bin], frames as u64);
    }
    assert_eq!(result.histogram.effective_bits, vec![0.0, 0.0]);
}

// ============================================================================
// Cross-check Against ebur128
// ============================================================================

#[test]
fn test_integrated_loudness_matches_ebur128() {
    let fs = 48_000;
    let left = generate_sine(fs, 1_000.0, 0.5, 10.0);
    let right = generate_sine(fs, 440.0, 0.25, 10.0);
    let weights = ChannelWeights::resolve(Some("stereo"), 2);

    let ours = itu1770(&[left.clone(), right.clone()], f64::from(fs), &weights, true);
    let reference = reference_loudness(&left, &right, fs);
    assert!((ours - reference).abs() < 0.1, "ours {ours}, ebur128 {reference}");
}

#[test]
fn test_relative_gate_matches_ebur128() {
    // 5 s at -6 dBFS then 5 s at -40 dBFS: the quiet half falls below the relative gate
    let fs = 48_000;
    let mut left = generate_sine(fs, 1_000.0, 0.5, 5.0);
    left.extend(generate_sine(fs, 1_000.0, 0.01, 5.0));
    let right = left.clone();
    let weights = ChannelWeights::resolve(Some("stereo"), 2);

    let ours = itu1770(&[left.clone(), right.clone()], f64::from(fs), &weights, true);
    let reference = reference_loudness(&left, &right, fs);
    assert!((ours - reference).abs() < 0.1, "ours {ours}, ebur128 {reference}");
}

// ============================================================================
// True Peak
// ============================================================================

#[test]
fn test_inter_sample_over_is_detected() {
    // fs/4 tone at 45 degrees: every sample sits at 0.707 of the waveform peak
    let fs = 48_000;
    let samples: Vec<f64> = (0..fs as usize)
        .map(|i| 0.9 * (PI / 2.0 * i as f64 + PI / 4.0).sin())
        .collect();
    let fixed = to_fixed(&samples, 24);
    let track = Track::new(vec![fixed], vec![samples], fs, 24, None).unwrap();

    let result = Analyzer::default().analyze(&track, &mut NoProgress).unwrap();

    let sample_peak_db = result.levels.peak_dbfs[0];
    let true_peak_db = result.true_peak.dbtp[0];
    assert!((sample_peak_db - 20.0 * (0.9 * 0.5_f64.sqrt()).log10()).abs() < 0.01);
    assert!(true_peak_db > sample_peak_db + 2.5, "{true_peak_db} vs {sample_peak_db}");
}
