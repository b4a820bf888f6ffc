//! bm-core: Shared types, traits, and utilities for Bassic
//!
//! This crate provides the foundational types used across all Bassic crates:
//! the sample type, the 5.1 channel layout, audio block access, the
//! lock-free parameter set and the error type.

mod channel;
mod error;
mod params;
mod sample;

pub use channel::*;
pub use error::*;
pub use params::*;
pub use sample::*;

/// Decibel value wrapper
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Decibels(pub f64);

impl Decibels {
    pub const ZERO: Self = Self(0.0);

    #[inline]
    pub fn to_gain(self) -> f64 {
        if self.0 <= -144.0 {
            0.0
        } else {
            10.0_f64.powf(self.0 / 20.0)
        }
    }
}

impl Default for Decibels {
    fn default() -> Self {
        Self::ZERO
    }
}
