//! Filter coefficients for the analyzers
//!
//! Only the filters the measurements need are designed here:
//! - K-weighting (ITU-R BS.1770): shelf pre-filter cascaded with the RLB highpass
//! - First-order allpass, used by the allpass crest analysis
//! - The 4-phase, 24-tap polyphase FIR used for 4x oversampled true peak

use std::f64::consts::PI;

/// Number of phases in the true peak FIR bank (oversampling factor)
pub const TRUE_PEAK_PHASES: usize = 4;

/// Number of taps per true peak FIR phase
pub const TRUE_PEAK_TAPS: usize = 24;

/// Feed-forward and feedback coefficients of a direct-form IIR filter
///
/// `a[0]` is always 1.0; [`FilterCoefficients::new`] is the only way in
/// from outside this module, and it normalizes.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCoefficients {
    b: Vec<f64>,
    a: Vec<f64>,
}

impl FilterCoefficients {
    /// Create a filter, normalizing both polynomials by `a[0]`
    ///
    /// # Panics
    /// Panics if `a` is empty or `a[0]` is zero.
    pub fn new(b: Vec<f64>, a: Vec<f64>) -> Self {
        assert!(
            a.first().is_some_and(|&a0| a0 != 0.0),
            "a[0] must be non-zero"
        );
        let a0 = a[0];
        Self {
            b: b.into_iter().map(|c| c / a0).collect(),
            a: a.into_iter().map(|c| c / a0).collect(),
        }
    }

    /// Feed-forward (numerator) coefficients
    pub fn b(&self) -> &[f64] {
        &self.b
    }

    /// Feedback (denominator) coefficients, starting with 1.0
    pub fn a(&self) -> &[f64] {
        &self.a
    }

    /// Filter order (number of state variables)
    pub fn order(&self) -> usize {
        self.b.len().max(self.a.len()).saturating_sub(1)
    }

    /// Run the filter over `input` with zero initial state
    ///
    /// Transposed direct form II, forward only.
    pub fn apply(&self, input: &[f64]) -> Vec<f64> {
        let order = self.order();
        let b = padded(&self.b, order + 1);
        let a = padded(&self.a, order + 1);
        let mut state = vec![0.0; order];

        input
            .iter()
            .map(|&x| {
                let y = b[0] * x + state.first().copied().unwrap_or(0.0);
                for i in 0..order {
                    let next = state.get(i + 1).copied().unwrap_or(0.0);
                    state[i] = b[i + 1] * x + next - a[i + 1] * y;
                }
                y
            })
            .collect()
    }
}

fn padded(coeffs: &[f64], len: usize) -> Vec<f64> {
    let mut out = coeffs.to_vec();
    out.resize(len, 0.0);
    out
}

/// Full polynomial product of two coefficient vectors
fn convolve(x: &[f64], y: &[f64]) -> Vec<f64> {
    if x.is_empty() || y.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; x.len() + y.len() - 1];
    for (i, &xi) in x.iter().enumerate() {
        for (j, &yj) in y.iter().enumerate() {
            out[i + j] += xi * yj;
        }
    }
    out
}

/// Discrete first-order allpass centered on `fc`
///
/// `fc` is clamped just below Nyquist (`fs / 2.0001`) where the bilinear
/// transform would be singular.
pub fn allpass_coeffs(fc: f64, fs: f64) -> FilterCoefficients {
    let fc = fc.min(fs / 2.0001);
    let rho = (PI * fc / fs).tan();
    let p = (1.0 - rho) / (1.0 + rho);
    FilterCoefficients::new(vec![p, -1.0], vec![1.0, -p])
}

/// Stage 1 of K-weighting: high shelf modelling the acoustic effect of the head
pub(crate) fn shelf_coeffs(fs: f64) -> FilterCoefficients {
    let f0 = 1681.974450955533;
    let gain_db = 3.999843853973347;
    let q = 0.7071752369554196;

    let k = (PI * f0 / fs).tan();
    let vh = 10.0_f64.powf(gain_db / 20.0);
    let vb = vh.powf(0.4996667741545416);

    let a0 = 1.0 + k / q + k * k;
    let b = vec![
        (vh + vb * k / q + k * k) / a0,
        2.0 * (k * k - vh) / a0,
        (vh - vb * k / q + k * k) / a0,
    ];
    let a = vec![1.0, 2.0 * (k * k - 1.0) / a0, (1.0 - k / q + k * k) / a0];
    FilterCoefficients { b, a }
}

/// Stage 2 of K-weighting: the RLB highpass
pub(crate) fn highpass_coeffs(fs: f64) -> FilterCoefficients {
    let f0 = 38.13547087602444;
    let q = 0.5003270373238773;

    let k = (PI * f0 / fs).tan();
    let a0 = 1.0 + k / q + k * k;
    let a = vec![1.0, 2.0 * (k * k - 1.0) / a0, (1.0 - k / q + k * k) / a0];
    FilterCoefficients {
        b: vec![1.0, -2.0, 1.0],
        a,
    }
}

/// K-weighting filter for sample rate `fs`
///
/// Both second-order stages are multiplied out into one 4th-order section,
/// so a single pass of [`FilterCoefficients::apply`] weights a channel.
pub fn k_weighting_coeffs(fs: f64) -> FilterCoefficients {
    let shelf = shelf_coeffs(fs);
    let highpass = highpass_coeffs(fs);
    FilterCoefficients {
        b: convolve(&shelf.b, &highpass.b),
        a: convolve(&shelf.a, &highpass.a),
    }
}

static TRUE_PEAK_FIR: [[f64; TRUE_PEAK_TAPS]; TRUE_PEAK_PHASES] = [
    [
        -0.001780280772489,
        0.003253283030257,
        -0.005447293390376,
        0.008414568116553,
        -0.012363296099675,
        0.017436805871070,
        -0.024020143876810,
        0.032746828420101,
        -0.045326602900760,
        0.066760686868173,
        -0.120643370377371,
        0.989429605248410,
        0.122160009958442,
        -0.046376232812786,
        0.022831393004364,
        -0.011580897261667,
        0.005358105753167,
        -0.001834671998839,
        -0.000103681038815,
        0.001002216283171,
        -0.001293611238062,
        0.001184842429930,
        -0.000908719377960,
        0.002061304229100,
    ],
    [
        -0.001473218555432,
        0.002925336766866,
        -0.005558126468508,
        0.009521159741206,
        -0.015296028027209,
        0.023398977482278,
        -0.034752051245281,
        0.050880967772373,
        -0.075227488678419,
        0.116949442543490,
        -0.212471239510148,
        0.788420616540440,
        0.460788819545818,
        -0.166082211358253,
        0.092555759769552,
        -0.057854829231334,
        0.037380809681132,
        -0.024098441541823,
        0.015115653825711,
        -0.009060645712669,
        0.005033299068467,
        -0.002511544062471,
        0.001030723665756,
        -0.000694079453823,
    ],
    [
        -0.000694079453823,
        0.001030723665756,
        -0.002511544062471,
        0.005033299068467,
        -0.009060645712669,
        0.015115653825711,
        -0.024098441541823,
        0.037380809681132,
        -0.057854829231334,
        0.092555759769552,
        -0.166082211358253,
        0.460788819545818,
        0.788420616540440,
        -0.212471239510148,
        0.116949442543490,
        -0.075227488678419,
        0.050880967772373,
        -0.034752051245281,
        0.023398977482278,
        -0.015296028027209,
        0.009521159741206,
        -0.005558126468508,
        0.002925336766866,
        -0.001473218555432,
    ],
    [
        0.002061304229100,
        -0.000908719377960,
        0.001184842429930,
        -0.001293611238062,
        0.001002216283171,
        -0.000103681038815,
        -0.001834671998839,
        0.005358105753167,
        -0.011580897261667,
        0.022831393004364,
        -0.046376232812786,
        0.122160009958442,
        0.989429605248410,
        -0.120643370377371,
        0.066760686868173,
        -0.045326602900760,
        0.032746828420101,
        -0.024020143876810,
        0.017436805871070,
        -0.012363296099675,
        0.008414568116553,
        -0.005447293390376,
        0.003253283030257,
        -0.001780280772489,
    ],
];

/// Polyphase FIR bank for 4x oversampled peak detection
///
/// Each row is one interpolation phase; dotting a 24-sample window with a
/// row yields one oversampled value without materializing the upsampled
/// signal.
pub fn true_peak_fir() -> &'static [[f64; TRUE_PEAK_TAPS]; TRUE_PEAK_PHASES] {
    &TRUE_PEAK_FIR
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() < tolerance,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn shelf_matches_bs1770_table_at_48k() {
        // Table 1 of ITU-R BS.1770-4
        let f = shelf_coeffs(48_000.0);
        assert_close(f.a[1], -1.69065929318241, 1e-9);
        assert_close(f.a[2], 0.73248077421585, 1e-9);
        assert_close(f.b[0], 1.53512485958697, 1e-9);
        assert_close(f.b[1], -2.69169618940638, 1e-9);
        assert_close(f.b[2], 1.19839281085285, 1e-9);
    }

    #[test]
    fn highpass_matches_bs1770_table_at_48k() {
        // Table 2 of ITU-R BS.1770-4
        let f = highpass_coeffs(48_000.0);
        assert_close(f.a[1], -1.99004745483398, 1e-9);
        assert_close(f.a[2], 0.99007225036621, 1e-9);
        assert_eq!(f.b, vec![1.0, -2.0, 1.0]);
    }

    #[test]
    fn k_weighting_is_fourth_order_and_blocks_dc() {
        let f = k_weighting_coeffs(44_100.0);
        assert_eq!(f.b.len(), 5);
        assert_eq!(f.a.len(), 5);
        assert_eq!(f.a[0], 1.0);
        assert_eq!(f.order(), 4);
        // The highpass has a double zero at z = 1
        assert_close(f.b.iter().sum::<f64>(), 0.0, 1e-12);
    }

    #[test]
    fn cascade_matches_sequential_stages() {
        let fs = 48_000.0;
        let input: Vec<f64> = (0..2_000)
            .map(|i| (f64::from(i) * 0.05).sin() + 0.3 * (f64::from(i) * 0.7).cos())
            .collect();
        let staged = highpass_coeffs(fs).apply(&shelf_coeffs(fs).apply(&input));
        let combined = k_weighting_coeffs(fs).apply(&input);
        for (a, b) in staged.iter().zip(&combined) {
            assert_close(*a, *b, 1e-9);
        }
    }

    #[test]
    fn allpass_at_quarter_rate_is_negated_delay() {
        let f = allpass_coeffs(11_025.0, 44_100.0);
        assert_close(f.b[0], 0.0, 1e-12);
        assert_eq!(f.b[1], -1.0);
        let out = f.apply(&[1.0, 2.0, 3.0]);
        assert_close(out[0], 0.0, 1e-12);
        assert_close(out[1], -1.0, 1e-12);
        assert_close(out[2], -2.0, 1e-12);
    }

    #[test]
    fn allpass_clamps_above_nyquist() {
        let clamped = allpass_coeffs(30_000.0, 44_100.0);
        let limit = allpass_coeffs(44_100.0 / 2.0001, 44_100.0);
        assert_eq!(clamped, limit);
        assert!(clamped.b.iter().all(|c| c.is_finite()));
    }

    #[test]
    fn apply_handles_pure_gain() {
        let gain = FilterCoefficients::new(vec![0.5], vec![1.0]);
        assert_eq!(gain.order(), 0);
        assert_eq!(gain.apply(&[2.0, -4.0]), vec![1.0, -2.0]);
    }

    #[test]
    fn new_normalizes_by_a0() {
        let f = FilterCoefficients::new(vec![2.0, 4.0], vec![2.0, 1.0]);
        assert_eq!(f.b, vec![1.0, 2.0]);
        assert_eq!(f.a, vec![1.0, 0.5]);
    }

    #[test]
    fn unnormalized_input_filters_like_normalized() {
        // 2y[n] - y[n-1] = 2x[n], i.e. y[n] = x[n] + 0.5 y[n-1]
        let f = FilterCoefficients::new(vec![2.0], vec![2.0, -1.0]);
        assert_eq!(f.b(), &[1.0]);
        assert_eq!(f.a(), &[1.0, -0.5]);
        assert_eq!(f.apply(&[1.0, 0.0, 0.0]), vec![1.0, 0.5, 0.25]);
    }

    #[test]
    fn fir_phases_have_unity_dc_gain() {
        for phase in true_peak_fir() {
            assert_close(phase.iter().sum::<f64>(), 1.0, 2e-3);
        }
    }
}
