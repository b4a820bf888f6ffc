//! Filter design for the bass-management crossover
//!
//! High-order Butterworth filters are realized as cascaded second-order
//! sections. For an even order N the poles of section k carry
//!
//! Q_k = 1 / (2 cos(π (2k + 1) / (2N))),   k = 0..N/2
//!
//! A Linkwitz-Riley low-pass of order 2M is two identical Butterworth
//! low-passes of order M in series; at order 4 both sections use Q = 1/√2.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

use crate::biquad::BiquadCoeffs;

/// Order of the main-channel high-pass
pub const HIGHPASS_ORDER: usize = 8;

/// Biquad sections per high-pass cascade
pub const HIGHPASS_SECTIONS: usize = HIGHPASS_ORDER / 2;

/// Biquad sections per Linkwitz-Riley low-pass (4th order)
pub const LINKWITZ_RILEY_SECTIONS: usize = 2;

/// Highest cutoff as a fraction of the sample rate
const MAX_CUTOFF_RATIO: f64 = 0.49;

/// Q of section `section` of an even-order Butterworth filter
pub fn butterworth_q(order: usize, section: usize) -> f64 {
    debug_assert!(order % 2 == 0 && section < order / 2);
    let angle = PI * (2 * section + 1) as f64 / (2 * order) as f64;
    1.0 / (2.0 * angle.cos())
}

/// Keep the cutoff strictly below Nyquist
#[inline]
fn safe_cutoff(cutoff: f64, sample_rate: f64) -> f64 {
    cutoff.min(sample_rate * MAX_CUTOFF_RATIO)
}

/// Sections of an 8th-order Butterworth high-pass at `cutoff`
pub fn butterworth_highpass(cutoff: f64, sample_rate: f64) -> [BiquadCoeffs; HIGHPASS_SECTIONS] {
    let cutoff = safe_cutoff(cutoff, sample_rate);
    std::array::from_fn(|k| {
        BiquadCoeffs::highpass(cutoff, butterworth_q(HIGHPASS_ORDER, k), sample_rate)
    })
}

/// Sections of a 4th-order Linkwitz-Riley low-pass at `cutoff`
pub fn linkwitz_riley_lowpass(
    cutoff: f64,
    sample_rate: f64,
) -> [BiquadCoeffs; LINKWITZ_RILEY_SECTIONS] {
    let section = BiquadCoeffs::lowpass(safe_cutoff(cutoff, sample_rate), FRAC_1_SQRT_2, sample_rate);
    [section; LINKWITZ_RILEY_SECTIONS]
}

/// Combined magnitude and phase of sections in series
pub fn cascade_response(sections: &[BiquadCoeffs], freq: f64, sample_rate: f64) -> (f64, f64) {
    sections.iter().fold((1.0, 0.0), |(mag, phase), coeffs| {
        let (m, p) = coeffs.frequency_response(freq, sample_rate);
        (mag * m, phase + p)
    })
}
