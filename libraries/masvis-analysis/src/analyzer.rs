//! Full track analysis
//!
//! The [`Analyzer`] runs every measurement over one [`Track`] in a fixed
//! order and gathers them into an [`AnalysisResult`]. Each phase is wrapped
//! in start/stop notifications to the caller's [`ProgressSink`], which is
//! also polled for cancellation between phases.

use crate::allpass::{allpass, AllpassCrest};
use crate::checksum::checksum;
use crate::config::AnalysisConfig;
use crate::dynamic_range::{dynamic_range, DynamicRange};
use crate::histogram::{histogram, Histogram};
use crate::levels::{peak_and_rms, peak_vs_rms, Levels, PerSecondLevels};
use crate::loudest::{loudest, LoudestWindow};
use crate::loudness::{ebu_r128, EbuR128Loudness};
use crate::plr::{plr, Plr};
use crate::spectrum::{spectrum, Spectrum};
use crate::true_peak::{true_peaks, TruePeak};
use masvis_core::{ChannelWeights, MasvisError, Phase, ProgressEvent, ProgressSink, Result, Track};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Everything measured on one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub levels: Levels,
    pub loudest: LoudestWindow,
    pub true_peak: TruePeak,
    pub loudness: EbuR128Loudness,
    pub plr: Plr,
    pub spectrum: Spectrum,
    pub allpass: AllpassCrest,
    pub histogram: Histogram,
    pub per_second: PerSecondLevels,
    pub dynamic_range: DynamicRange,
    pub checksum: u64,
}

/// Runs all measurements over a track
///
/// Holds only configuration, so one analyzer can serve any number of
/// tracks, from any number of threads.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    /// Create an analyzer, rejecting an out-of-range configuration
    pub fn new(config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze `track`, reporting progress to `progress`
    ///
    /// Returns [`MasvisError::Cancelled`] if the sink asks to stop; a phase
    /// that has started always runs to completion.
    pub fn analyze<P: ProgressSink>(&self, track: &Track, progress: &mut P) -> Result<AnalysisResult> {
        let fs = track.sample_rate() as usize;
        let channels = track.samples_float();
        let hop = self.config.short_term_hop_secs as usize * fs;

        info!(
            "Analyzing {} channel(s), {} Hz, {} bit, {:.2} s",
            track.channel_count(),
            track.sample_rate(),
            track.bit_depth(),
            track.duration_secs()
        );

        let weights = ChannelWeights::resolve(track.channel_layout(), track.channel_count());
        if weights.is_guess() {
            warn!(
                "Channel layout {:?} does not match {} channel(s), guessing weights {:?}",
                track.channel_layout(),
                track.channel_count(),
                weights.as_slice()
            );
        }

        let levels = run_phase(progress, Phase::PeakRms, || peak_and_rms(channels))?;
        let loudest = run_phase(progress, Phase::Loudest, || {
            loudest(channels, fs, self.config.loudest_threshold)
        })?;
        let true_peak = run_phase(progress, Phase::TruePeak, || {
            true_peaks(channels, &levels.peak, fs, hop)
        })?;
        let loudness = run_phase(progress, Phase::EbuR128, || {
            ebu_r128(channels, fs, &weights, hop)
        })?;
        let plr = run_phase(progress, Phase::Plr, || plr(&true_peak, &loudness))?;
        let spectrum = run_phase(progress, Phase::Spectrum, || {
            spectrum(channels, fs, &levels.rms)
        })?;
        let allpass = run_phase(progress, Phase::Allpass, || allpass(channels, fs as f64))?;
        let histogram = run_phase(progress, Phase::Histogram, || {
            histogram(
                track.samples_fixed(),
                track.bit_depth(),
                self.config.histogram_bit_cap,
            )
        })?;
        let per_second = run_phase(progress, Phase::PeakVsRms, || peak_vs_rms(channels, fs))?;
        let dynamic_range = run_phase(progress, Phase::DynamicRange, || {
            dynamic_range(channels, fs)
        })?;
        let checksum = run_phase(progress, Phase::Checksum, || checksum(track.samples_fixed()))?;

        info!(
            "Done: {:.1} LUFS, {:.1} dBTP, DR {}",
            loudness.integrated_lkfs,
            true_peak.max_dbtp(),
            dynamic_range
        );

        Ok(AnalysisResult {
            levels,
            loudest,
            true_peak,
            loudness,
            plr,
            spectrum,
            allpass,
            histogram,
            per_second,
            dynamic_range,
            checksum,
        })
    }
}

/// Run one phase between start and stop notifications
fn run_phase<P, T, F>(progress: &mut P, phase: Phase, f: F) -> Result<T>
where
    P: ProgressSink,
    F: FnOnce() -> T,
{
    if progress.is_cancelled() {
        info!("Analysis cancelled before {}", phase);
        return Err(MasvisError::Cancelled(phase));
    }

    let description = phase.description();
    info!("{}", description);
    progress.on_event(phase, ProgressEvent::Start { description });

    let start = Instant::now();
    let output = f();
    let elapsed = start.elapsed();

    debug!("{} took {} ms", phase, elapsed.as_millis());
    progress.on_event(phase, ProgressEvent::Stop { elapsed });
    Ok(output)
}
