//! bm-dsp: DSP building blocks for Bassic
//!
//! ## Modules
//! - `biquad` - TDF-II second-order filter stage and RBJ coefficients
//! - `design` - Butterworth / Linkwitz-Riley section design
//! - `crossover` - five-channel high-order high-pass bank
//! - `linkwitz_riley` - complementary 4th-order low-pass path
//! - `smoothing` - linear parameter ramps
//! - `metering` - block peak and decaying display meters

pub mod biquad;
pub mod crossover;
pub mod design;
pub mod linkwitz_riley;
pub mod metering;
pub mod smoothing;

pub use biquad::{BiquadCoeffs, BiquadTDF2};
pub use crossover::CrossoverBank;
pub use linkwitz_riley::LinkwitzRileyLowpass;
pub use smoothing::LinearSmoother;

use bm_core::Sample;

/// Trait for all DSP processors
pub trait Processor: Send + Sync {
    /// Reset processor state
    fn reset(&mut self);
}

/// Mono processor trait
pub trait MonoProcessor: Processor {
    /// Process a single sample
    fn process_sample(&mut self, input: Sample) -> Sample;
}
