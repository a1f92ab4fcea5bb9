use crate::error::{MasvisError, Result};
use serde::{Deserialize, Serialize};

/// Bit depths a decoder may hand over
pub const SUPPORTED_BIT_DEPTHS: [u32; 4] = [8, 16, 24, 32];

/// A fully decoded track, ready for analysis
///
/// Holds two channel-major copies of the same audio: the integer PCM the
/// decoder produced and a float copy normalized to [-1.0, 1.0]. Both are
/// immutable once constructed; analyzers only ever borrow them.
///
/// # Example
///
/// ```rust
/// use masvis_core::Track;
///
/// let left = vec![0, 16_384, -16_384, 0];
/// let right = vec![0, 8_192, -8_192, 0];
/// let track = Track::from_fixed(vec![left, right], 44_100, 16, Some("stereo")).unwrap();
///
/// assert_eq!(track.channel_count(), 2);
/// assert_eq!(track.frame_count(), 4);
/// assert!((track.channel(0)[1] - 0.5).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TrackData")]
pub struct Track {
    samples_fixed: Vec<Vec<i32>>,
    samples_float: Vec<Vec<f64>>,
    sample_rate: u32,
    bit_depth: u32,
    channel_layout: Option<String>,
}

impl Track {
    /// Create a track from both sample buffers
    ///
    /// # Errors
    /// Returns an error if the sample rate is zero, the bit depth is not
    /// supported, there are no channels or frames, or the two buffers do not
    /// share the same shape.
    pub fn new(
        samples_fixed: Vec<Vec<i32>>,
        samples_float: Vec<Vec<f64>>,
        sample_rate: u32,
        bit_depth: u32,
        channel_layout: Option<&str>,
    ) -> Result<Self> {
        if sample_rate == 0 {
            return Err(MasvisError::InvalidSampleRate(sample_rate));
        }
        if !SUPPORTED_BIT_DEPTHS.contains(&bit_depth) {
            return Err(MasvisError::UnsupportedBitDepth(bit_depth));
        }
        if samples_fixed.is_empty() {
            return Err(MasvisError::InvalidChannelCount(0));
        }
        if samples_fixed.len() != samples_float.len() {
            return Err(MasvisError::ChannelCountMismatch {
                fixed: samples_fixed.len(),
                float: samples_float.len(),
            });
        }

        let expected = samples_fixed[0].len();
        if expected == 0 {
            return Err(MasvisError::EmptyTrack);
        }
        for (channel, (fixed, float)) in samples_fixed.iter().zip(&samples_float).enumerate() {
            for actual in [fixed.len(), float.len()] {
                if actual != expected {
                    return Err(MasvisError::ChannelLengthMismatch {
                        channel,
                        expected,
                        actual,
                    });
                }
            }
        }

        Ok(Self {
            samples_fixed,
            samples_float,
            sample_rate,
            bit_depth,
            channel_layout: channel_layout.map(str::to_owned),
        })
    }

    /// Create a track from fixed-point samples, deriving the float copy
    ///
    /// Each float sample is `fixed / 2^(bit_depth - 1)`.
    ///
    /// # Errors
    /// Same conditions as [`Track::new`].
    pub fn from_fixed(
        samples_fixed: Vec<Vec<i32>>,
        sample_rate: u32,
        bit_depth: u32,
        channel_layout: Option<&str>,
    ) -> Result<Self> {
        if !SUPPORTED_BIT_DEPTHS.contains(&bit_depth) {
            return Err(MasvisError::UnsupportedBitDepth(bit_depth));
        }
        let scale = f64::from(1_u32 << (bit_depth - 1));
        let samples_float = samples_fixed
            .iter()
            .map(|channel| channel.iter().map(|&s| f64::from(s) / scale).collect())
            .collect();

        Self::new(
            samples_fixed,
            samples_float,
            sample_rate,
            bit_depth,
            channel_layout,
        )
    }

    /// Create a track from samples decoded into a signed 32-bit container
    ///
    /// Decoders commonly deliver 24-bit PCM left-justified in 32 bits. For a
    /// bit depth of 24 the samples are shifted right by 8 to recover the
    /// native values; other depths are taken as-is.
    ///
    /// # Errors
    /// Same conditions as [`Track::new`].
    pub fn from_s32_container(
        mut samples: Vec<Vec<i32>>,
        sample_rate: u32,
        bit_depth: u32,
        channel_layout: Option<&str>,
    ) -> Result<Self> {
        if bit_depth == 24 {
            for channel in &mut samples {
                for sample in channel.iter_mut() {
                    *sample >>= 8;
                }
            }
        }
        Self::from_fixed(samples, sample_rate, bit_depth, channel_layout)
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Bits per fixed-point sample
    pub fn bit_depth(&self) -> u32 {
        self.bit_depth
    }

    /// Number of channels
    pub fn channel_count(&self) -> usize {
        self.samples_fixed.len()
    }

    /// Number of frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.samples_fixed[0].len()
    }

    /// Layout tag reported by the decoder, e.g. `"5.1"`
    pub fn channel_layout(&self) -> Option<&str> {
        self.channel_layout.as_deref()
    }

    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        self.frame_count() as f64 / f64::from(self.sample_rate)
    }

    /// Normalized samples, one vector per channel
    pub fn samples_float(&self) -> &[Vec<f64>] {
        &self.samples_float
    }

    /// Fixed-point samples, one vector per channel
    pub fn samples_fixed(&self) -> &[Vec<i32>] {
        &self.samples_fixed
    }

    /// Normalized samples of a single channel
    ///
    /// # Panics
    /// Panics if `channel` is out of range.
    pub fn channel(&self, channel: usize) -> &[f64] {
        &self.samples_float[channel]
    }
}

/// Unvalidated wire form of a [`Track`]; deserialization goes through [`Track::new`]
#[derive(Deserialize)]
struct TrackData {
    samples_fixed: Vec<Vec<i32>>,
    samples_float: Vec<Vec<f64>>,
    sample_rate: u32,
    bit_depth: u32,
    channel_layout: Option<String>,
}

impl TryFrom<TrackData> for Track {
    type Error = MasvisError;

    fn try_from(data: TrackData) -> Result<Self> {
        Self::new(
            data.samples_fixed,
            data.samples_float,
            data.sample_rate,
            data.bit_depth,
            data.channel_layout.as_deref(),
        )
    }
}
