//! Parameter types for the bass manager
//!
//! Parameters are published by a control thread (UI gesture, automation,
//! session load) and sampled once per block by the audio thread. Every value
//! lives in its own atomic, so neither side ever waits on the other.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Lowest allowed crossover / LFE cutoff frequency in Hz
pub const MIN_FREQUENCY_HZ: f64 = 20.0;

/// Highest allowed crossover / LFE cutoff frequency in Hz
pub const MAX_FREQUENCY_HZ: f64 = 250.0;

/// Default crossover frequency in Hz
pub const DEFAULT_CROSSOVER_HZ: f64 = 60.0;

/// Default LFE low-pass cutoff in Hz
pub const DEFAULT_LFE_CUTOFF_HZ: f64 = 120.0;

/// Crossover frequency range
pub const CROSSOVER_RANGE: ParamRange =
    ParamRange::linear(MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ, DEFAULT_CROSSOVER_HZ);

/// LFE low-pass cutoff range
pub const LFE_CUTOFF_RANGE: ParamRange =
    ParamRange::linear(MIN_FREQUENCY_HZ, MAX_FREQUENCY_HZ, DEFAULT_LFE_CUTOFF_HZ);

/// Parameter identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParamId {
    CrossoverFrequency,
    LfeLowPassFrequency,
    LfeBoost,
}

impl ParamId {
    pub const ALL: [ParamId; 3] = [
        ParamId::CrossoverFrequency,
        ParamId::LfeLowPassFrequency,
        ParamId::LfeBoost,
    ];

    /// Stable key used for persistence and host automation
    pub const fn key(self) -> &'static str {
        match self {
            ParamId::CrossoverFrequency => "crossoverFrequency",
            ParamId::LfeLowPassFrequency => "lfeLowPassFrequency",
            ParamId::LfeBoost => "lfeBoost",
        }
    }

    pub const fn display_name(self) -> &'static str {
        match self {
            ParamId::CrossoverFrequency => "Crossover Frequency",
            ParamId::LfeLowPassFrequency => "LFE Low Pass Frequency",
            ParamId::LfeBoost => "LFE Boost",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.key() == key)
    }

    /// Value range, `None` for the boolean flag
    pub fn range(self) -> Option<ParamRange> {
        match self {
            ParamId::CrossoverFrequency => Some(CROSSOVER_RANGE),
            ParamId::LfeLowPassFrequency => Some(LFE_CUTOFF_RANGE),
            ParamId::LfeBoost => None,
        }
    }
}

/// Atomic parameter for lock-free access
#[derive(Debug)]
pub struct AtomicParam {
    bits: AtomicU64,
}

impl AtomicParam {
    pub fn new(value: f64) -> Self {
        Self {
            bits: AtomicU64::new(value.to_bits()),
        }
    }

    #[inline]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }

    #[inline]
    pub fn set(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Relaxed);
    }
}

impl Default for AtomicParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Parameter range specification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamRange {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl ParamRange {
    pub const fn linear(min: f64, max: f64, default: f64) -> Self {
        Self {
            min,
            max,
            default,
        }
    }

    /// Clamp into range; NaN falls back to the default
    #[inline]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        }
    }

    /// Denormalize a 0-1 value to actual value
    pub fn denormalize(&self, normalized: f64) -> f64 {
        if normalized.is_nan() {
            return self.default;
        }
        let normalized = normalized.clamp(0.0, 1.0);
        self.min + normalized * (self.max - self.min)
    }

    /// Normalize an actual value to 0-1
    pub fn normalize(&self, value: f64) -> f64 {
        (self.clamp(value) - self.min) / (self.max - self.min)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BASS MANAGER PARAMETER SET
// ═══════════════════════════════════════════════════════════════════════════════

/// Plain copy of the parameter set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParamSnapshot {
    pub crossover_frequency: f64,
    pub lfe_low_pass_frequency: f64,
    pub lfe_boost: bool,
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self {
            crossover_frequency: DEFAULT_CROSSOVER_HZ,
            lfe_low_pass_frequency: DEFAULT_LFE_CUTOFF_HZ,
            lfe_boost: false,
        }
    }
}

/// Published parameter values shared between control and audio threads.
///
/// Single writer, single reader per value. Writes clamp to range, so the
/// audio thread never sees an out-of-range frequency.
#[derive(Debug)]
pub struct BassParams {
    crossover_frequency: AtomicParam,
    lfe_low_pass_frequency: AtomicParam,
    // Stored and persisted; the processing path does not read it.
    lfe_boost: AtomicBool,
}

impl BassParams {
    pub fn new() -> Self {
        Self::from_snapshot(ParamSnapshot::default())
    }

    pub fn from_snapshot(snapshot: ParamSnapshot) -> Self {
        let params = Self {
            crossover_frequency: AtomicParam::default(),
            lfe_low_pass_frequency: AtomicParam::default(),
            lfe_boost: AtomicBool::new(false),
        };
        params.apply(snapshot);
        params
    }

    #[inline]
    pub fn crossover_frequency(&self) -> f64 {
        self.crossover_frequency.get()
    }

    #[inline]
    pub fn lfe_low_pass_frequency(&self) -> f64 {
        self.lfe_low_pass_frequency.get()
    }

    #[inline]
    pub fn lfe_boost(&self) -> bool {
        self.lfe_boost.load(Ordering::Relaxed)
    }

    pub fn set_crossover_frequency(&self, hz: f64) {
        self.crossover_frequency.set(CROSSOVER_RANGE.clamp(hz));
    }

    pub fn set_lfe_low_pass_frequency(&self, hz: f64) {
        self.lfe_low_pass_frequency.set(LFE_CUTOFF_RANGE.clamp(hz));
    }

    pub fn set_lfe_boost(&self, enabled: bool) {
        self.lfe_boost.store(enabled, Ordering::Relaxed);
    }

    /// Set a parameter from a host-normalized 0-1 value
    pub fn set_normalized(&self, id: ParamId, normalized: f64) {
        match id.range() {
            Some(range) => self.set_value(id, range.denormalize(normalized)),
            None => self.set_lfe_boost(normalized >= 0.5),
        }
    }

    /// Get a parameter as a host-normalized 0-1 value
    pub fn normalized(&self, id: ParamId) -> f64 {
        match id.range() {
            Some(range) => range.normalize(self.value(id)),
            None => self.value(id),
        }
    }

    /// Set a parameter in plain units; the flag treats non-zero as on
    pub fn set_value(&self, id: ParamId, value: f64) {
        match id {
            ParamId::CrossoverFrequency => self.set_crossover_frequency(value),
            ParamId::LfeLowPassFrequency => self.set_lfe_low_pass_frequency(value),
            ParamId::LfeBoost => self.set_lfe_boost(value != 0.0),
        }
    }

    /// Get a parameter in plain units; the flag reads as 0.0 / 1.0
    pub fn value(&self, id: ParamId) -> f64 {
        match id {
            ParamId::CrossoverFrequency => self.crossover_frequency(),
            ParamId::LfeLowPassFrequency => self.lfe_low_pass_frequency(),
            ParamId::LfeBoost => {
                if self.lfe_boost() {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }

    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            crossover_frequency: self.crossover_frequency(),
            lfe_low_pass_frequency: self.lfe_low_pass_frequency(),
            lfe_boost: self.lfe_boost(),
        }
    }

    pub fn apply(&self, snapshot: ParamSnapshot) {
        self.set_crossover_frequency(snapshot.crossover_frequency);
        self.set_lfe_low_pass_frequency(snapshot.lfe_low_pass_frequency);
        self.set_lfe_boost(snapshot.lfe_boost);
    }
}

impl Default for BassParams {
    fn default() -> Self {
        Self::new()
    }
}
