//! Channel layouts and their ITU-R BS.1770 loudness weights
//!
//! Front channels weigh 1.0, surround (side/back) channels 1.41 and LFE
//! channels 0.0. The layout set is closed, so each layout maps to a static
//! weight table in decoder channel order.

use serde::{Deserialize, Serialize};
use std::fmt;

const G_F: f64 = 1.0;
const G_S: f64 = 1.41;
const G_LFE: f64 = 0.0;

/// Named channel layouts as reported by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelLayout {
    Mono,
    Stereo,
    Downmix,
    Surround2_1,
    Surround3_0,
    Surround3_0Back,
    Surround4_0,
    Quad,
    QuadSide,
    Surround3_1,
    Surround5_0,
    Surround5_0Side,
    Surround4_1,
    Surround5_1,
    Surround5_1Side,
    Surround6_0,
    Surround6_0Front,
    Surround3_1_2,
    Hexagonal,
    Surround6_1,
    Surround6_1Back,
    Surround6_1Front,
    Surround7_0,
    Surround7_0Front,
    Surround7_1,
    Surround7_1Wide,
    Surround7_1WideSide,
    Surround5_1_2,
    Octagonal,
    Cube,
    Surround5_1_4,
    Surround7_1_2,
    Surround7_1_4,
    Hexadecagonal,
    Surround22_2,
}

impl ChannelLayout {
    /// Every known layout
    pub const ALL: [ChannelLayout; 35] = [
        Self::Mono,
        Self::Stereo,
        Self::Downmix,
        Self::Surround2_1,
        Self::Surround3_0,
        Self::Surround3_0Back,
        Self::Surround4_0,
        Self::Quad,
        Self::QuadSide,
        Self::Surround3_1,
        Self::Surround5_0,
        Self::Surround5_0Side,
        Self::Surround4_1,
        Self::Surround5_1,
        Self::Surround5_1Side,
        Self::Surround6_0,
        Self::Surround6_0Front,
        Self::Surround3_1_2,
        Self::Hexagonal,
        Self::Surround6_1,
        Self::Surround6_1Back,
        Self::Surround6_1Front,
        Self::Surround7_0,
        Self::Surround7_0Front,
        Self::Surround7_1,
        Self::Surround7_1Wide,
        Self::Surround7_1WideSide,
        Self::Surround5_1_2,
        Self::Octagonal,
        Self::Cube,
        Self::Surround5_1_4,
        Self::Surround7_1_2,
        Self::Surround7_1_4,
        Self::Hexadecagonal,
        Self::Surround22_2,
    ];

    /// Look up a layout by its decoder name, e.g. `"5.1(side)"`
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|layout| layout.name() == name)
    }

    /// Decoder name of the layout
    pub fn name(self) -> &'static str {
        match self {
            Self::Mono => "mono",
            Self::Stereo => "stereo",
            Self::Downmix => "downmix",
            Self::Surround2_1 => "2.1",
            Self::Surround3_0 => "3.0",
            Self::Surround3_0Back => "3.0(back)",
            Self::Surround4_0 => "4.0",
            Self::Quad => "quad",
            Self::QuadSide => "quad(side)",
            Self::Surround3_1 => "3.1",
            Self::Surround5_0 => "5.0",
            Self::Surround5_0Side => "5.0(side)",
            Self::Surround4_1 => "4.1",
            Self::Surround5_1 => "5.1",
            Self::Surround5_1Side => "5.1(side)",
            Self::Surround6_0 => "6.0",
            Self::Surround6_0Front => "6.0(front)",
            Self::Surround3_1_2 => "3.1.2",
            Self::Hexagonal => "hexagonal",
            Self::Surround6_1 => "6.1",
            Self::Surround6_1Back => "6.1(back)",
            Self::Surround6_1Front => "6.1(front)",
            Self::Surround7_0 => "7.0",
            Self::Surround7_0Front => "7.0(front)",
            Self::Surround7_1 => "7.1",
            Self::Surround7_1Wide => "7.1(wide)",
            Self::Surround7_1WideSide => "7.1(wide-side)",
            Self::Surround5_1_2 => "5.1.2",
            Self::Octagonal => "octagonal",
            Self::Cube => "cube",
            Self::Surround5_1_4 => "5.1.4",
            Self::Surround7_1_2 => "7.1.2",
            Self::Surround7_1_4 => "7.1.4",
            Self::Hexadecagonal => "hexadecagonal",
            Self::Surround22_2 => "22.2",
        }
    }

    /// Loudness weight of each channel, in decoder channel order
    pub fn weights(self) -> &'static [f64] {
        match self {
            // FC
            Self::Mono => &[G_F],
            // FL FR
            Self::Stereo | Self::Downmix => &[G_F, G_F],
            // FL FR LFE
            Self::Surround2_1 => &[G_F, G_F, G_LFE],
            // FL FR FC / FL FR BC
            Self::Surround3_0 | Self::Surround3_0Back => &[G_F, G_F, G_F],
            // FL FR FC BC
            Self::Surround4_0 => &[G_F, G_F, G_F, G_F],
            // FL FR BL BR / FL FR SL SR
            Self::Quad | Self::QuadSide => &[G_F, G_F, G_S, G_S],
            // FL FR FC LFE
            Self::Surround3_1 => &[G_F, G_F, G_F, G_LFE],
            // FL FR FC BL BR / FL FR FC SL SR
            Self::Surround5_0 | Self::Surround5_0Side => &[G_F, G_F, G_F, G_S, G_S],
            // FL FR FC LFE BC
            Self::Surround4_1 => &[G_F, G_F, G_F, G_LFE, G_F],
            // FL FR FC LFE BL BR / FL FR FC LFE SL SR
            Self::Surround5_1 | Self::Surround5_1Side => &[G_F, G_F, G_F, G_LFE, G_S, G_S],
            // FL FR FC BC SL SR / FL FR FLC FRC SL SR
            Self::Surround6_0 | Self::Surround6_0Front => &[G_F, G_F, G_F, G_F, G_S, G_S],
            // FL FR FC LFE TFL TFR
            Self::Surround3_1_2 => &[G_F, G_F, G_F, G_LFE, G_F, G_F],
            // FL FR FC BL BR BC
            Self::Hexagonal => &[G_F, G_F, G_F, G_S, G_S, G_F],
            // FL FR FC LFE BC SL SR
            Self::Surround6_1 => &[G_F, G_F, G_F, G_LFE, G_F, G_S, G_S],
            // FL FR FC LFE BL BR BC
            Self::Surround6_1Back => &[G_F, G_F, G_F, G_LFE, G_S, G_S, G_F],
            // FL FR LFE FLC FRC SL SR
            Self::Surround6_1Front => &[G_F, G_F, G_LFE, G_F, G_F, G_S, G_S],
            // FL FR FC BL BR SL SR
            Self::Surround7_0 => &[G_F, G_F, G_F, G_S, G_S, G_S, G_S],
            // FL FR FC FLC FRC SL SR
            Self::Surround7_0Front => &[G_F, G_F, G_F, G_F, G_F, G_S, G_S],
            // FL FR FC LFE BL BR SL SR
            Self::Surround7_1 => &[G_F, G_F, G_F, G_LFE, G_S, G_S, G_S, G_S],
            // FL FR FC LFE BL BR FLC FRC / FL FR FC LFE BL BR TFL TFR
            Self::Surround7_1Wide | Self::Surround5_1_2 => {
                &[G_F, G_F, G_F, G_LFE, G_S, G_S, G_F, G_F]
            }
            // FL FR FC LFE FLC FRC SL SR
            Self::Surround7_1WideSide => &[G_F, G_F, G_F, G_LFE, G_F, G_F, G_S, G_S],
            // FL FR FC BL BR BC SL SR
            Self::Octagonal => &[G_F, G_F, G_F, G_S, G_S, G_F, G_S, G_S],
            // FL FR BL BR TFL TFR TBL TBR
            Self::Cube => &[G_F, G_F, G_S, G_S, G_F, G_F, G_F, G_F],
            // FL FR FC LFE BL BR TFL TFR TBL TBR
            Self::Surround5_1_4 => &[G_F, G_F, G_F, G_LFE, G_S, G_S, G_F, G_F, G_F, G_F],
            // FL FR FC LFE BL BR SL SR TFL TFR
            Self::Surround7_1_2 => &[G_F, G_F, G_F, G_LFE, G_S, G_S, G_S, G_S, G_F, G_F],
            // FL FR FC LFE BL BR SL SR TFL TFR TBL TBR
            Self::Surround7_1_4 => &[
                G_F, G_F, G_F, G_LFE, G_S, G_S, G_S, G_S, G_F, G_F, G_F, G_F,
            ],
            // FL FR FC BL BR BC SL SR TFL TFC TFR TBL TBC TBR WL WR
            Self::Hexadecagonal => &[
                G_F, G_F, G_F, G_S, G_S, G_F, G_S, G_S, G_F, G_F, G_F, G_F, G_F, G_F, G_F, G_F,
            ],
            // FL FR FC LFE BL BR FLC FRC BC SL SR TC TFL TFC TFR TBL TBC TBR LFE2 TSL TSR BFC BFL BFR
            Self::Surround22_2 => &[
                G_F, G_F, G_F, G_LFE, G_S, G_S, G_F, G_F, G_F, G_S, G_S, G_F, G_F, G_F, G_F, G_F,
                G_F, G_F, G_LFE, G_S, G_S, G_F, G_F, G_F,
            ],
        }
    }

    /// Number of channels in the layout
    pub fn channel_count(self) -> usize {
        self.weights().len()
    }
}

impl fmt::Display for ChannelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-channel loudness weights resolved for one track
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelWeights {
    weights: Vec<f64>,
    layout: Option<ChannelLayout>,
}

impl ChannelWeights {
    /// Resolve weights for a layout tag and channel count
    ///
    /// A known layout whose channel count matches is used as-is. Anything
    /// else (no tag, an unknown tag, or a tag that disagrees with the channel
    /// count) is guessed by truncating the 22.2 table to the channel count.
    /// The guess is an approximation; channels past the 24th weigh 1.0.
    pub fn resolve(layout: Option<&str>, channels: usize) -> Self {
        if let Some(layout) = layout
            .and_then(ChannelLayout::from_name)
            .filter(|layout| layout.channel_count() == channels)
        {
            return Self {
                weights: layout.weights().to_vec(),
                layout: Some(layout),
            };
        }

        let reference = ChannelLayout::Surround22_2.weights();
        let weights = (0..channels)
            .map(|c| reference.get(c).copied().unwrap_or(G_F))
            .collect();
        Self {
            weights,
            layout: None,
        }
    }

    /// Weight of each channel
    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }

    /// The matched layout, or `None` when the weights were guessed
    pub fn layout(&self) -> Option<ChannelLayout> {
        self.layout
    }

    /// Whether the weights come from the 22.2 fallback guess
    pub fn is_guess(&self) -> bool {
        self.layout.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for layout in ChannelLayout::ALL {
            assert_eq!(ChannelLayout::from_name(layout.name()), Some(layout));
        }
        assert_eq!(ChannelLayout::from_name("5.1(rear)"), None);
    }

    #[test]
    fn surround_channels_weigh_more() {
        assert_eq!(
            ChannelLayout::Surround5_1.weights(),
            &[1.0, 1.0, 1.0, 0.0, 1.41, 1.41]
        );
        assert_eq!(ChannelLayout::Surround22_2.channel_count(), 24);
        assert_eq!(ChannelLayout::Hexadecagonal.channel_count(), 16);
    }

    #[test]
    fn known_layout_resolves_exactly() {
        let weights = ChannelWeights::resolve(Some("quad(side)"), 4);
        assert_eq!(weights.layout(), Some(ChannelLayout::QuadSide));
        assert_eq!(weights.as_slice(), &[1.0, 1.0, 1.41, 1.41]);
        assert!(!weights.is_guess());
    }

    #[test]
    fn unknown_layout_guesses_from_22_2() {
        let weights = ChannelWeights::resolve(Some("weird"), 6);
        assert!(weights.is_guess());
        assert_eq!(weights.as_slice(), &[1.0, 1.0, 1.0, 0.0, 1.41, 1.41]);

        let weights = ChannelWeights::resolve(None, 1);
        assert_eq!(weights.as_slice(), &[1.0]);
    }

    #[test]
    fn mismatched_channel_count_guesses() {
        let weights = ChannelWeights::resolve(Some("stereo"), 3);
        assert!(weights.is_guess());
        assert_eq!(weights.as_slice(), &[1.0, 1.0, 1.0]);
    }

    #[test]
    fn channels_past_reference_weigh_one() {
        let weights = ChannelWeights::resolve(None, 26);
        assert_eq!(weights.as_slice().len(), 26);
        assert_eq!(weights.as_slice()[18], 0.0);
        assert_eq!(weights.as_slice()[24], 1.0);
        assert_eq!(weights.as_slice()[25], 1.0);
    }
}
