//! bm-render: run WAV files through the bass manager offline
//!
//! Files are processed block by block through zero-copy windows into one
//! de-interleaved buffer, exactly as a host would drive the engine.

use std::path::Path;

use bm_core::{AudioBlock, BmError, BmResult, Channel, MultiChannelBuffer, NUM_CHANNELS};
use bm_engine::BassManager;

/// De-interleaved audio file contents
#[derive(Debug, Clone)]
pub struct AudioFile {
    pub buffer: MultiChannelBuffer,
    pub sample_rate: u32,
}

impl AudioFile {
    pub fn num_channels(&self) -> usize {
        self.buffer.num_channels()
    }

    pub fn num_samples(&self) -> usize {
        self.buffer.num_samples()
    }

    pub fn duration_secs(&self) -> f64 {
        self.num_samples() as f64 / self.sample_rate as f64
    }
}

/// Outcome of a render pass
#[derive(Debug, Clone, PartialEq)]
pub struct RenderReport {
    pub blocks: usize,
    /// Highest metered output peak per channel, indexed by `Channel::index`
    pub peaks: [f64; NUM_CHANNELS],
}

impl RenderReport {
    pub fn peak_db(&self, channel: Channel) -> f64 {
        20.0 * self.peaks[channel.index()].max(1e-10).log10()
    }
}

/// Load a WAV file (integer or float PCM) into `f64` channels in [-1, 1]
pub fn read_wav<P: AsRef<Path>>(path: P) -> BmResult<AudioFile> {
    let path = path.as_ref();
    let reader = hound::WavReader::open(path)
        .map_err(|e| BmError::AudioFile(format!("{}: {}", path.display(), e)))?;

    let spec = reader.spec();
    let num_channels = spec.channels as usize;
    if num_channels == 0 {
        return Err(BmError::AudioFile(format!("{}: no channels", path.display())));
    }

    let samples: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| s.map(|v| v as f64))
            .collect::<Result<Vec<_>, _>>(),
        hound::SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f64;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f64 / max_val))
                .collect::<Result<Vec<_>, _>>()
        }
    }
    .map_err(|e| BmError::AudioFile(format!("{}: {}", path.display(), e)))?;

    let num_samples = samples.len() / num_channels;
    let mut channels = vec![Vec::with_capacity(num_samples); num_channels];
    for (i, sample) in samples.into_iter().take(num_samples * num_channels).enumerate() {
        channels[i % num_channels].push(sample);
    }

    log::debug!(
        "Loaded {:?}: {} ch, {} Hz, {} samples",
        path,
        num_channels,
        spec.sample_rate,
        num_samples
    );

    Ok(AudioFile {
        buffer: MultiChannelBuffer::from_channels(channels)?,
        sample_rate: spec.sample_rate,
    })
}

/// Write `audio` as 32-bit float WAV
pub fn write_wav<P: AsRef<Path>>(path: P, audio: &AudioFile) -> BmResult<()> {
    let path = path.as_ref();
    let spec = hound::WavSpec {
        channels: audio.num_channels() as u16,
        sample_rate: audio.sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let to_err = |e: hound::Error| BmError::AudioFile(format!("{}: {}", path.display(), e));
    let mut writer = hound::WavWriter::create(path, spec).map_err(to_err)?;

    let channels = audio.buffer.channels();
    for i in 0..audio.num_samples() {
        for ch in channels {
            writer.write_sample(ch[i] as f32).map_err(to_err)?;
        }
    }
    writer.finalize().map_err(to_err)?;

    log::debug!("Wrote {:?}", path);
    Ok(())
}

/// Prepare `engine` for the file and bass-manage it in place, `block_size`
/// samples at a time.
pub fn render(
    engine: &mut BassManager,
    audio: &mut AudioFile,
    block_size: usize,
) -> BmResult<RenderReport> {
    if audio.num_channels() < NUM_CHANNELS {
        return Err(BmError::AudioFile(format!(
            "bass management needs at least {} channels, file has {}",
            NUM_CHANNELS,
            audio.num_channels()
        )));
    }

    engine.prepare(audio.sample_rate as f64, block_size)?;
    let mut meters = engine.attach_meters();

    let mut report = RenderReport {
        blocks: 0,
        peaks: [0.0; NUM_CHANNELS],
    };

    let len = audio.num_samples();
    let mut start = 0;
    while start < len {
        let n = block_size.min(len - start);
        engine.process_block(&mut audio.buffer.slice_mut(start, n));
        start += n;
        report.blocks += 1;

        for (peak, level) in report.peaks.iter_mut().zip(meters.poll()) {
            *peak = peak.max(level);
        }
    }

    engine.detach_meters();
    log::info!(
        "Rendered {} samples in {} blocks of {}",
        len,
        report.blocks,
        block_size
    );
    Ok(report)
}
