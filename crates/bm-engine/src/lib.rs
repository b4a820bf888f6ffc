//! bm-engine: 5.1 bass management for Bassic
//!
//! The engine splits the five main channels at the crossover frequency,
//! routes their summed low end into the LFE channel and keeps both cutoffs
//! automatable while audio is running.
//!
//! ## Threads
//! - Control thread: `BassManager::new`, `prepare`, meter attach/detach.
//!   These allocate.
//! - Audio thread: `process_block` only. Wait-free, no allocation.
//! - Any thread: parameter writes through the shared `BassParams`.

mod engine;
mod meter;

pub use engine::BassManager;
pub use meter::{MeterReading, MeterReceiver};

use bm_core::{BmError, BmResult, Decibels};
use serde::{Deserialize, Serialize};

/// Engine configuration, fixed for the lifetime of a `BassManager`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Length of a cutoff ramp; one ramp step is taken per block
    pub smoothing_time_ms: f64,
    /// Gain applied to the discrete LFE channel before the bass sum is added
    pub lfe_gain_db: f64,
    /// Capacity of the meter ring, in readings
    pub meter_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            smoothing_time_ms: 1.0,
            lfe_gain_db: 10.0,
            meter_capacity: 256,
        }
    }
}

impl EngineConfig {
    /// Cutoff changes land on the next block with no ramp
    pub fn instant() -> Self {
        Self {
            smoothing_time_ms: 0.0,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> BmResult<()> {
        if !self.smoothing_time_ms.is_finite() || self.smoothing_time_ms < 0.0 {
            return Err(BmError::InvalidConfig(format!(
                "smoothing_time_ms must be finite and >= 0, got {}",
                self.smoothing_time_ms
            )));
        }
        if !self.lfe_gain_db.is_finite() {
            return Err(BmError::InvalidConfig(format!(
                "lfe_gain_db must be finite, got {}",
                self.lfe_gain_db
            )));
        }
        if self.meter_capacity == 0 {
            return Err(BmError::InvalidConfig(
                "meter_capacity must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Linear LFE gain
    #[inline]
    pub fn lfe_gain(&self) -> f64 {
        Decibels(self.lfe_gain_db).to_gain()
    }

    #[inline]
    pub fn smoothing_time_seconds(&self) -> f64 {
        self.smoothing_time_ms / 1000.0
    }
}
