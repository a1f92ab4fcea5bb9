//! Crest factor after first-order allpass filtering
//!
//! An allpass keeps the magnitude spectrum but shifts phase around its
//! center frequency. Material whose peaks rely on phase alignment (heavily
//! clipped or limited masters) shows a rising crest factor once shifted.

use crate::filters::allpass_coeffs;
use crate::levels::{db, peak, rms};
use serde::{Deserialize, Serialize};

/// Center frequencies of the allpass filters, in Hz
pub const ALLPASS_FREQUENCIES: [f64; 7] = [20.0, 60.0, 200.0, 600.0, 2_000.0, 6_000.0, 20_000.0];

/// Crest factor per allpass frequency and channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllpassCrest {
    /// Center frequencies in Hz
    pub frequencies: Vec<f64>,
    /// `[frequency][channel]` crest factor in dB
    pub crest_db: Vec<Vec<f64>>,
}

/// Crest factor of every channel after each allpass filter
pub fn allpass<S: AsRef<[f64]>>(channels: &[S], sample_rate: f64) -> AllpassCrest {
    let crest_db = ALLPASS_FREQUENCIES
        .iter()
        .map(|&fc| {
            let coeffs = allpass_coeffs(fc, sample_rate);
            channels
                .iter()
                .map(|channel| {
                    let filtered = coeffs.apply(channel.as_ref());
                    db(peak(&filtered), rms(&filtered))
                })
                .collect()
        })
        .collect();

    AllpassCrest {
        frequencies: ALLPASS_FREQUENCIES.to_vec(),
        crest_db,
    }
}
