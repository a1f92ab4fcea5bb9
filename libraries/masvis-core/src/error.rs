/// Core error types for MasVis
use thiserror::Error;

use crate::types::Phase;

/// Result type alias using `MasvisError`
pub type Result<T> = std::result::Result<T, MasvisError>;

/// Core error type for MasVis
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MasvisError {
    /// Sample rate of zero
    #[error("Invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    /// Track without channels
    #[error("Invalid channel count: {0} (must be at least 1)")]
    InvalidChannelCount(usize),

    /// Bit depth the fixed-point buffer cannot carry
    #[error("Unsupported bit depth: {0} (must be 8, 16, 24 or 32)")]
    UnsupportedBitDepth(u32),

    /// Track without frames
    #[error("Track contains no frames")]
    EmptyTrack,

    /// Channels of different lengths, or fixed and float buffers of different shapes
    #[error("Channel {channel} has {actual} frames, expected {expected}")]
    ChannelLengthMismatch {
        channel: usize,
        expected: usize,
        actual: usize,
    },

    /// Fixed and float buffers carry a different number of channels
    #[error("Fixed-point buffer has {fixed} channels but float buffer has {float}")]
    ChannelCountMismatch { fixed: usize, float: usize },

    /// Rejected analysis configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The host cancelled the analysis before the given phase started
    #[error("Analysis cancelled before {0}")]
    Cancelled(Phase),
}

impl MasvisError {
    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}
