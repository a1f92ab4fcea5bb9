//! Mastering analysis for MasVis
//!
//! This crate provides:
//! - Peak, RMS and crest factor, per track and per second
//! - ITU-R BS.1770 / EBU R128 loudness (integrated, short-term, LRA)
//! - True peak by 4x oversampling, and the peak-to-loudness ratio
//! - The DR score, an averaged spectrum and allpass crest factors
//! - Sample histograms with effective bit depth
//! - The loudest part of a track and an energy checksum
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌──────────────┐     ┌────────────────┐
//! │   Track     │ ──► │  Analyzer    │ ──► │ AnalysisResult │
//! └─────────────┘     └──────────────┘     └────────────────┘
//!                            │
//!                            ▼
//!                     ┌──────────────┐
//!                     │ ProgressSink │  start/stop per phase
//!                     └──────────────┘
//! ```
//!
//! Every measurement is also available as a free function over
//! `&[impl AsRef<[f64]>]` channel slices.
//!
//! # Example
//!
//! ```rust
//! use masvis_analysis::{Analyzer, PhaseTimings};
//! use masvis_core::Track;
//!
//! // Four seconds of a quiet 16-bit tone
//! let samples: Vec<i32> = (0..4 * 8_000).map(|i| (i % 16) * 500 - 4_000).collect();
//! let track = Track::from_fixed(vec![samples], 8_000, 16, Some("mono")).unwrap();
//!
//! let mut timings = PhaseTimings::new();
//! let result = Analyzer::default().analyze(&track, &mut timings).unwrap();
//!
//! println!("Integrated loudness: {:.1} LUFS", result.loudness.integrated_lkfs);
//! println!("True peak: {:.1} dBTP", result.true_peak.max_dbtp());
//! println!("DR: {}", result.dynamic_range);
//! timings.log_report();
//! ```

#![deny(unsafe_code)]

pub mod allpass;
mod analyzer;
pub mod checksum;
mod config;
pub mod dynamic_range;
pub mod filters;
pub mod histogram;
pub mod levels;
pub mod loudest;
pub mod loudness;
pub mod plr;
pub mod spectrum;
mod timing;
pub mod true_peak;

pub use allpass::{allpass, AllpassCrest, ALLPASS_FREQUENCIES};
pub use analyzer::{AnalysisResult, Analyzer};
pub use checksum::checksum;
pub use config::AnalysisConfig;
pub use dynamic_range::{dynamic_range, try_dynamic_range, DynamicRange, DynamicRangeError};
pub use filters::{allpass_coeffs, k_weighting_coeffs, FilterCoefficients};
pub use histogram::{histogram, Histogram};
pub use levels::{db, peak, peak_and_rms, peak_vs_rms, rms, Levels, PerSecondLevels, DB_FLOOR};
pub use loudest::{loudest, LoudestWindow};
pub use loudness::{ebu_r128, itu1770, loudness_range, EbuR128Loudness};
pub use plr::{plr, Plr};
pub use spectrum::{spectrum, Spectrum};
pub use timing::{PhaseTiming, PhaseTimings};
pub use true_peak::{true_peaks, TruePeak};
