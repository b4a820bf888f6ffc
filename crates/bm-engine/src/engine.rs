//! Bass management engine
//!
//! Per block, in this order:
//! 1. Zero output channels that carry no input
//! 2. Sum the unfiltered main channels into the bass buffer
//! 3. Low-pass the bass buffer at the crossover frequency
//! 4. High-pass the main channels at the crossover frequency
//! 5. Low-pass the LFE channel at the LFE cutoff
//! 6. Apply the LFE gain
//! 7. Add the bass buffer into the LFE channel
//! 8. Advance the cutoff smoothers and retune whatever moved
//!
//! The bass sum has to be taken before step 4 destroys the low end of the
//! main channels.

use std::sync::Arc;

use bm_core::{
    AudioBlock, BassParams, BmError, BmResult, Channel, DEFAULT_CROSSOVER_HZ,
    DEFAULT_LFE_CUTOFF_HZ, MonoBuffer, NUM_CHANNELS,
};
use bm_dsp::{CrossoverBank, LinearSmoother, LinkwitzRileyLowpass};

use crate::EngineConfig;
use crate::meter::{MeterReceiver, MeterTap, meter_bridge};

/// 5.1 bass manager
pub struct BassManager {
    config: EngineConfig,
    params: Arc<BassParams>,
    lfe_gain: f64,

    sample_rate: f64,
    max_block_size: usize,
    prepared: bool,

    bass_buffer: MonoBuffer,
    crossover: CrossoverBank,
    bass_lowpass: LinkwitzRileyLowpass,
    lfe_lowpass: LinkwitzRileyLowpass,

    crossover_smoother: LinearSmoother,
    lfe_smoother: LinearSmoother,

    meter_tap: Option<MeterTap>,
}

impl BassManager {
    /// Engine with its own parameter set at default values
    pub fn new(config: EngineConfig) -> BmResult<Self> {
        Self::with_params(config, Arc::new(BassParams::new()))
    }

    /// Engine reading from a parameter set shared with the control side
    pub fn with_params(config: EngineConfig, params: Arc<BassParams>) -> BmResult<Self> {
        config.validate()?;

        let sample_rate = 48000.0;
        Ok(Self {
            lfe_gain: config.lfe_gain(),
            config,
            params,
            sample_rate,
            max_block_size: 0,
            prepared: false,
            bass_buffer: MonoBuffer::default(),
            crossover: CrossoverBank::new(sample_rate),
            bass_lowpass: LinkwitzRileyLowpass::new(DEFAULT_CROSSOVER_HZ, sample_rate),
            lfe_lowpass: LinkwitzRileyLowpass::new(DEFAULT_LFE_CUTOFF_HZ, sample_rate),
            crossover_smoother: LinearSmoother::new(DEFAULT_CROSSOVER_HZ),
            lfe_smoother: LinearSmoother::new(DEFAULT_LFE_CUTOFF_HZ),
            meter_tap: None,
        })
    }

    /// Size buffers and reset all filters. Control thread only; allocates.
    ///
    /// Filters come up tuned to the currently published parameter values
    /// with no ramp pending. Must be called again whenever the sample rate or
    /// the maximum block size changes.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize) -> BmResult<()> {
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(BmError::InvalidSampleRate(sample_rate));
        }
        if max_block_size == 0 {
            return Err(BmError::InvalidBlockSize(max_block_size));
        }

        self.sample_rate = sample_rate;
        self.max_block_size = max_block_size;
        self.bass_buffer.resize(max_block_size);

        let crossover = self.params.crossover_frequency();
        let lfe_cutoff = self.params.lfe_low_pass_frequency();
        let ramp = self.config.smoothing_time_seconds();

        self.crossover_smoother.set_current_and_target(crossover);
        self.crossover_smoother.reset(sample_rate, ramp);
        self.lfe_smoother.set_current_and_target(lfe_cutoff);
        self.lfe_smoother.reset(sample_rate, ramp);

        self.crossover.prepare(sample_rate, crossover);
        self.bass_lowpass.set_cutoff_frequency(crossover);
        self.bass_lowpass.prepare(sample_rate);
        self.lfe_lowpass.set_cutoff_frequency(lfe_cutoff);
        self.lfe_lowpass.prepare(sample_rate);

        self.prepared = true;

        log::info!(
            "Bass manager prepared: {} Hz, max block {}, crossover {:.1} Hz, LFE cutoff {:.1} Hz, ramp {} blocks",
            sample_rate,
            max_block_size,
            crossover,
            lfe_cutoff,
            self.crossover_smoother.steps_to_target()
        );
        Ok(())
    }

    /// Bass-manage one block in place. Audio thread; never allocates.
    ///
    /// # Panics
    /// If called before `prepare`, with fewer than six channels, with
    /// more samples than the prepared maximum, or when any of the six
    /// channels differs in length from the block.
    pub fn process_block<B: AudioBlock + ?Sized>(&mut self, block: &mut B) {
        assert!(self.prepared, "process_block called before prepare");

        let num_channels = block.num_channels();
        assert!(
            num_channels >= NUM_CHANNELS,
            "bass management needs {} channels, block has {}",
            NUM_CHANNELS,
            num_channels
        );

        let num_samples = block.num_samples();
        assert!(
            num_samples <= self.max_block_size,
            "block of {} samples exceeds prepared maximum {}",
            num_samples,
            self.max_block_size
        );
        for ch in 0..NUM_CHANNELS {
            let len = block.channel(ch).len();
            assert!(
                len == num_samples,
                "ragged block: channel {} has {} samples, expected {}",
                ch,
                len,
                num_samples
            );
        }

        for ch in block.num_input_channels()..num_channels {
            block.channel_mut(ch).fill(0.0);
        }

        let bass = &mut self.bass_buffer.samples_mut()[..num_samples];
        bass.copy_from_slice(block.channel(Channel::L.index()));
        for channel in [Channel::R, Channel::C, Channel::Ls, Channel::Rs] {
            for (sum, &x) in bass.iter_mut().zip(block.channel(channel.index())) {
                *sum += x;
            }
        }
        self.bass_lowpass.process_in_place(bass);

        for (slot, channel) in Channel::MAIN.iter().enumerate() {
            self.crossover
                .process_channel_in_place(slot, block.channel_mut(channel.index()));
        }

        let lfe = block.channel_mut(Channel::Lfe.index());
        self.lfe_lowpass.process_in_place(lfe);
        for (out, &low) in lfe.iter_mut().zip(bass.iter()) {
            *out = *out * self.lfe_gain + low;
        }

        if let Some(tap) = self.meter_tap.as_mut() {
            tap.publish(&*block);
        }

        self.advance_smoothers();
    }

    /// Take one ramp step per smoother; redesign only the filters whose
    /// cutoff actually moved. A zero-step ramp moves on `set_target` itself.
    #[inline]
    fn advance_smoothers(&mut self) {
        let jumped = self.lfe_smoother.set_target(self.params.lfe_low_pass_frequency());
        if jumped || self.lfe_smoother.is_smoothing() {
            let cutoff = self.lfe_smoother.next_value();
            self.lfe_lowpass.set_cutoff_frequency(cutoff);
        }

        let jumped = self
            .crossover_smoother
            .set_target(self.params.crossover_frequency());
        if jumped || self.crossover_smoother.is_smoothing() {
            let cutoff = self.crossover_smoother.next_value();
            self.crossover.retune(cutoff, self.sample_rate);
            self.bass_lowpass.set_cutoff_frequency(cutoff);
        }
    }

    /// Publish new cutoff targets; out-of-range values clamp.
    /// Takes effect from the next block.
    pub fn set_parameters(&self, crossover_hz: f64, lfe_cutoff_hz: f64) {
        self.params.set_crossover_frequency(crossover_hz);
        self.params.set_lfe_low_pass_frequency(lfe_cutoff_hz);
    }

    /// Shared handle for the control side
    pub fn params(&self) -> &Arc<BassParams> {
        &self.params
    }

    // ═══════════════════════════════════════════════════════════════════════
    // METERS
    // ═══════════════════════════════════════════════════════════════════════

    /// Start publishing per-channel block peaks. Replaces any previous
    /// receiver. Control thread only; allocates the ring.
    pub fn attach_meters(&mut self) -> MeterReceiver {
        let (tap, receiver) = meter_bridge(self.config.meter_capacity);
        if self.meter_tap.replace(tap).is_some() {
            log::debug!("Replacing existing meter receiver");
        }
        log::info!("Meters attached ({} readings)", self.config.meter_capacity);
        receiver
    }

    pub fn detach_meters(&mut self) {
        if self.meter_tap.take().is_some() {
            log::info!("Meters detached");
        }
    }

    pub fn has_meters(&self) -> bool {
        self.meter_tap.is_some()
    }

    // ═══════════════════════════════════════════════════════════════════════
    // INTROSPECTION
    // ═══════════════════════════════════════════════════════════════════════

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn max_block_size(&self) -> usize {
        self.max_block_size
    }

    /// Crossover frequency the filters are currently tuned to
    pub fn crossover_frequency(&self) -> f64 {
        self.crossover.cutoff()
    }

    /// LFE cutoff the LFE filter is currently tuned to
    pub fn lfe_cutoff(&self) -> f64 {
        self.lfe_lowpass.cutoff()
    }

    /// True while either cutoff is still ramping
    pub fn is_smoothing(&self) -> bool {
        self.crossover_smoother.is_smoothing() || self.lfe_smoother.is_smoothing()
    }

    pub fn crossover_bank(&self) -> &CrossoverBank {
        &self.crossover
    }

    pub fn bass_lowpass(&self) -> &LinkwitzRileyLowpass {
        &self.bass_lowpass
    }

    pub fn lfe_lowpass(&self) -> &LinkwitzRileyLowpass {
        &self.lfe_lowpass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bm_core::{MultiChannelBuffer, Sample};
    use bm_dsp::design;

    fn prepared(config: EngineConfig) -> BassManager {
        let mut engine = BassManager::new(config).unwrap();
        engine.prepare(44100.0, 512).unwrap();
        engine
    }

    #[test]
    fn test_prepare_rejects_bad_config() {
        let mut engine = BassManager::new(EngineConfig::default()).unwrap();
        assert!(matches!(
            engine.prepare(0.0, 512),
            Err(BmError::InvalidSampleRate(_))
        ));
        assert!(matches!(
            engine.prepare(-44100.0, 512),
            Err(BmError::InvalidSampleRate(_))
        ));
        assert!(matches!(
            engine.prepare(f64::NAN, 512),
            Err(BmError::InvalidSampleRate(_))
        ));
        assert!(matches!(
            engine.prepare(44100.0, 0),
            Err(BmError::InvalidBlockSize(0))
        ));
        assert!(!engine.is_prepared());
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = EngineConfig {
            meter_capacity: 0,
            ..Default::default()
        };
        assert!(BassManager::new(config).is_err());
    }

    #[test]
    fn test_prepare_tunes_to_published_params() {
        let params = Arc::new(BassParams::new());
        params.set_crossover_frequency(80.0);
        params.set_lfe_low_pass_frequency(150.0);

        let mut engine = BassManager::with_params(EngineConfig::default(), params).unwrap();
        engine.prepare(48000.0, 256).unwrap();

        assert_eq!(engine.crossover_frequency(), 80.0);
        assert_eq!(engine.lfe_cutoff(), 150.0);
        assert!(!engine.is_smoothing());
        assert_eq!(
            engine.crossover_bank().sections(),
            &design::butterworth_highpass(80.0, 48000.0)
        );
        assert_eq!(
            engine.lfe_lowpass().coefficients(),
            design::linkwitz_riley_lowpass(150.0, 48000.0)
        );
    }

    #[test]
    fn test_lfe_is_gained_and_summed() {
        let mut engine = prepared(EngineConfig::default());
        let mut block = MultiChannelBuffer::new(NUM_CHANNELS, 512);

        // DC settles to unity through the low-passes
        for _ in 0..200 {
            for ch in Channel::ALL {
                block.channel_mut(ch.index()).fill(0.1);
            }
            engine.process_block(&mut block);
        }

        let lfe = block.channel(Channel::Lfe.index())[511];
        let expected = 0.1 * engine.config().lfe_gain() + 0.5;
        assert!((lfe - expected).abs() < 1e-6, "{} vs {}", lfe, expected);
        assert!(block.channel(Channel::L.index())[511].abs() < 1e-6);
    }

    #[test]
    fn test_set_parameters_clamps() {
        let engine = prepared(EngineConfig::default());
        engine.set_parameters(5.0, 1000.0);
        assert_eq!(engine.params().crossover_frequency(), 20.0);
        assert_eq!(engine.params().lfe_low_pass_frequency(), 250.0);
    }

    fn assert_tuned_to(engine: &BassManager, crossover: f64, lfe_cutoff: f64) {
        let sr = engine.sample_rate();
        assert_eq!(engine.crossover_frequency(), crossover);
        assert_eq!(engine.lfe_cutoff(), lfe_cutoff);
        assert_eq!(
            engine.crossover_bank().sections(),
            &design::butterworth_highpass(crossover, sr)
        );
        assert_eq!(
            engine.bass_lowpass().coefficients(),
            design::linkwitz_riley_lowpass(crossover, sr)
        );
        assert_eq!(
            engine.lfe_lowpass().coefficients(),
            design::linkwitz_riley_lowpass(lfe_cutoff, sr)
        );
    }

    #[test]
    fn test_instant_config_retunes_next_block() {
        let mut engine = prepared(EngineConfig::instant());
        engine.set_parameters(150.0, 200.0);

        let mut block = MultiChannelBuffer::new(NUM_CHANNELS, 64);
        engine.process_block(&mut block);

        assert!(!engine.is_smoothing());
        assert_tuned_to(&engine, 150.0, 200.0);

        for _ in 0..10 {
            engine.process_block(&mut block);
        }
        assert_tuned_to(&engine, 150.0, 200.0);
    }

    #[test]
    fn test_sub_step_ramp_retunes_next_block() {
        let config = EngineConfig {
            smoothing_time_ms: 0.01,
            ..Default::default()
        };
        let mut engine = prepared(config);
        engine.set_parameters(150.0, 90.0);

        let mut block = MultiChannelBuffer::new(NUM_CHANNELS, 64);
        engine.process_block(&mut block);

        assert_tuned_to(&engine, 150.0, 90.0);
    }

    #[test]
    fn test_ramp_ends_on_direct_design() {
        let mut engine = prepared(EngineConfig::default());
        engine.set_parameters(110.0, 70.0);

        let mut block = MultiChannelBuffer::new(NUM_CHANNELS, 64);
        engine.process_block(&mut block);
        assert!(engine.crossover_frequency() > 60.0 && engine.crossover_frequency() < 110.0);

        while engine.is_smoothing() {
            engine.process_block(&mut block);
        }
        assert_tuned_to(&engine, 110.0, 70.0);
    }

    #[test]
    #[should_panic(expected = "ragged block")]
    fn test_ragged_block_panics() {
        let mut engine = prepared(EngineConfig::default());
        let mut data: Vec<Vec<Sample>> = vec![vec![0.0; 64]; NUM_CHANNELS];
        data[Channel::Ls.index()].truncate(32);
        let mut views: Vec<&mut [Sample]> = data.iter_mut().map(|ch| ch.as_mut_slice()).collect();
        engine.process_block(views.as_mut_slice());
    }

    #[test]
    fn test_meter_attach_detach() {
        let mut engine = prepared(EngineConfig::default());
        let mut rx = engine.attach_meters();
        assert!(engine.has_meters());

        let mut block = MultiChannelBuffer::new(NUM_CHANNELS, 64);
        block.channel_mut(Channel::Ls.index()).fill(0.5);
        engine.process_block(&mut block);

        let levels = rx.poll();
        assert!(levels[Channel::Ls.index()] > 0.0);
        assert!(levels[Channel::Lfe.index()] > 0.0);
        assert_eq!(levels[Channel::R.index()], 0.0);

        engine.detach_meters();
        assert!(!engine.has_meters());
        assert!(rx.is_detached());
    }

    #[test]
    fn test_empty_block_still_advances_smoothers() {
        let mut engine = prepared(EngineConfig::default());
        engine.set_parameters(90.0, 120.0);

        let mut block = MultiChannelBuffer::new(NUM_CHANNELS, 0);
        engine.process_block(&mut block);

        assert!(engine.is_smoothing());
        assert!(engine.crossover_frequency() > 60.0);
    }
}
