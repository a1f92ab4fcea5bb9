use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Analysis phases, in the order the analyzer runs them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Phase {
    PeakRms,
    Loudest,
    TruePeak,
    EbuR128,
    Plr,
    Spectrum,
    Allpass,
    Histogram,
    PeakVsRms,
    DynamicRange,
    Checksum,
}

impl Phase {
    /// All phases in execution order
    pub const ALL: [Phase; 11] = [
        Self::PeakRms,
        Self::Loudest,
        Self::TruePeak,
        Self::EbuR128,
        Self::Plr,
        Self::Spectrum,
        Self::Allpass,
        Self::Histogram,
        Self::PeakVsRms,
        Self::DynamicRange,
        Self::Checksum,
    ];

    /// Human readable description, announced when the phase starts
    pub fn description(self) -> &'static str {
        match self {
            Self::PeakRms => "Calculating peak and RMS...",
            Self::Loudest => "Calculating loudest...",
            Self::TruePeak => "Calculating true peaks...",
            Self::EbuR128 => "Calculating EBU R 128...",
            Self::Plr => "Calculating PLR...",
            Self::Spectrum => "Calculating spectrum...",
            Self::Allpass => "Calculating allpass...",
            Self::Histogram => "Calculating histogram...",
            Self::PeakVsRms => "Calculating peak vs RMS...",
            Self::DynamicRange => "Calculating DR...",
            Self::Checksum => "Calculating checksum...",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::PeakRms => "peak/RMS",
            Self::Loudest => "loudest window",
            Self::TruePeak => "true peak",
            Self::EbuR128 => "EBU R128",
            Self::Plr => "PLR",
            Self::Spectrum => "spectrum",
            Self::Allpass => "allpass",
            Self::Histogram => "histogram",
            Self::PeakVsRms => "peak vs RMS",
            Self::DynamicRange => "dynamic range",
            Self::Checksum => "checksum",
        };
        f.write_str(name)
    }
}

/// Progress notification emitted around each phase
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProgressEvent {
    /// The phase is about to run
    Start { description: &'static str },
    /// The phase finished after `elapsed`
    Stop { elapsed: Duration },
}
