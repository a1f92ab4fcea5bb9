mod layout;
mod phase;
mod track;

pub use layout::{ChannelLayout, ChannelWeights};
pub use phase::{Phase, ProgressEvent};
pub use track::{Track, SUPPORTED_BIT_DEPTHS};
