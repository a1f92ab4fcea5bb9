//! MasVis Core
//!
//! Core types, traits, and error handling shared by the MasVis analysis
//! libraries and their hosts.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Track`, `ChannelLayout`, `ChannelWeights`, `Phase`
//! - **Core Traits**: `ProgressSink`
//! - **Error Handling**: Unified `MasvisError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use masvis_core::{ChannelWeights, Track};
//!
//! // One second of 16-bit stereo silence
//! let track = Track::from_fixed(vec![vec![0; 44_100]; 2], 44_100, 16, Some("stereo")).unwrap();
//!
//! let weights = ChannelWeights::resolve(track.channel_layout(), track.channel_count());
//! assert_eq!(weights.as_slice(), &[1.0, 1.0]);
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{MasvisError, Result};
pub use traits::{NoProgress, ProgressSink};
pub use types::{
    ChannelLayout, ChannelWeights, Phase, ProgressEvent, Track, SUPPORTED_BIT_DEPTHS,
};
