//! Peak-to-loudness ratio

use crate::levels::db;
use crate::loudness::EbuR128Loudness;
use crate::true_peak::TruePeak;
use serde::{Deserialize, Serialize};

/// Peak-to-loudness ratios of one track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plr {
    /// Highest true peak minus integrated loudness, in LU
    pub plr_lu: f64,
    /// Per short-term block: highest channel true peak minus short-term loudness
    pub short_term_lu: Vec<f64>,
}

/// PLR and short-term PLR from the true peak and loudness measurements
///
/// Both series share the short-term block grid; if they ever disagree in
/// length the shorter one bounds the result.
pub fn plr(true_peak: &TruePeak, loudness: &EbuR128Loudness) -> Plr {
    let plr_lu = true_peak.max_dbtp() - loudness.integrated_lkfs;

    let short_term_lu = loudness
        .short_term_lkfs
        .iter()
        .enumerate()
        .map_while(|(block, &lkfs)| {
            let peaks: Option<Vec<f64>> = true_peak
                .short_term
                .iter()
                .map(|channel| channel.get(block).copied())
                .collect();
            let peak = peaks?.into_iter().fold(0.0, f64::max);
            Some(db(peak, 1.0) - lkfs)
        })
        .collect();

    Plr {
        plr_lu,
        short_term_lu,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::DB_FLOOR;

    #[test]
    fn plr_uses_loudest_channel_peak() {
        let tp = TruePeak {
            linear: vec![0.5, 1.0],
            dbtp: vec![db(0.5, 1.0), 0.0],
            short_term: vec![vec![0.5, 0.25], vec![0.1, 0.5]],
        };
        let loudness = EbuR128Loudness {
            integrated_lkfs: -14.0,
            short_term_lkfs: vec![-12.0, -20.0],
            range_lu: 3.0,
        };
        let plr = plr(&tp, &loudness);
        assert!((plr.plr_lu - 14.0).abs() < 1e-12);
        assert_eq!(plr.short_term_lu.len(), 2);
        assert!((plr.short_term_lu[0] - (db(0.5, 1.0) + 12.0)).abs() < 1e-12);
        assert!((plr.short_term_lu[1] - (db(0.5, 1.0) + 20.0)).abs() < 1e-12);
    }

    #[test]
    fn silence_has_zero_plr() {
        let tp = TruePeak {
            linear: vec![0.0],
            dbtp: vec![DB_FLOOR],
            short_term: vec![vec![0.0]],
        };
        let loudness = EbuR128Loudness {
            integrated_lkfs: DB_FLOOR,
            short_term_lkfs: vec![DB_FLOOR],
            range_lu: 0.0,
        };
        let plr = plr(&tp, &loudness);
        assert_eq!(plr.plr_lu, 0.0);
        assert_eq!(plr.short_term_lu, vec![0.0]);
    }
}
