//! Sample types and audio buffer definitions

use crate::{BmError, BmResult};

/// Type alias for audio samples (always f64 for maximum precision)
pub type Sample = f64;

/// Mono audio buffer
#[derive(Debug, Clone, Default)]
pub struct MonoBuffer {
    samples: Vec<Sample>,
}

impl MonoBuffer {
    pub fn new(size: usize) -> Self {
        Self {
            samples: vec![0.0; size],
        }
    }

    /// Resize and zero the buffer. Allocates; never call from the audio thread.
    pub fn resize(&mut self, size: usize) {
        self.samples.clear();
        self.samples.resize(size, 0.0);
    }

    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    #[inline]
    pub fn samples_mut(&mut self) -> &mut [Sample] {
        &mut self.samples
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MULTICHANNEL BLOCK ACCESS
// ═══════════════════════════════════════════════════════════════════════════════

/// A block of non-interleaved multichannel audio owned by the host.
///
/// Every channel holds exactly `num_samples()` samples. Channels at or above
/// `num_input_channels()` carry no input data and may contain garbage.
pub trait AudioBlock {
    fn num_channels(&self) -> usize;

    fn num_input_channels(&self) -> usize {
        self.num_channels()
    }

    fn num_samples(&self) -> usize;

    fn channel(&self, index: usize) -> &[Sample];

    fn channel_mut(&mut self, index: usize) -> &mut [Sample];
}

impl AudioBlock for [&mut [Sample]] {
    fn num_channels(&self) -> usize {
        self.len()
    }

    fn num_samples(&self) -> usize {
        self.first().map_or(0, |ch| ch.len())
    }

    #[inline]
    fn channel(&self, index: usize) -> &[Sample] {
        &*self[index]
    }

    #[inline]
    fn channel_mut(&mut self, index: usize) -> &mut [Sample] {
        &mut *self[index]
    }
}

impl AudioBlock for [Vec<Sample>] {
    fn num_channels(&self) -> usize {
        self.len()
    }

    fn num_samples(&self) -> usize {
        self.first().map_or(0, Vec::len)
    }

    #[inline]
    fn channel(&self, index: usize) -> &[Sample] {
        &self[index]
    }

    #[inline]
    fn channel_mut(&mut self, index: usize) -> &mut [Sample] {
        &mut self[index]
    }
}

/// Owned non-interleaved multichannel buffer
#[derive(Debug, Clone)]
pub struct MultiChannelBuffer {
    channels: Vec<Vec<Sample>>,
    num_samples: usize,
    input_channels: usize,
}

impl MultiChannelBuffer {
    /// Silent buffer; every channel is an input channel
    pub fn new(num_channels: usize, num_samples: usize) -> Self {
        Self {
            channels: vec![vec![0.0; num_samples]; num_channels],
            num_samples,
            input_channels: num_channels,
        }
    }

    /// Wrap existing channel data. All channels must have the same length.
    pub fn from_channels(channels: Vec<Vec<Sample>>) -> BmResult<Self> {
        let num_samples = channels.first().map_or(0, Vec::len);
        if let Some(bad) = channels.iter().position(|ch| ch.len() != num_samples) {
            return Err(BmError::InvalidParam(format!(
                "channel {} has {} samples, expected {}",
                bad,
                channels[bad].len(),
                num_samples
            )));
        }
        let input_channels = channels.len();
        Ok(Self {
            channels,
            num_samples,
            input_channels,
        })
    }

    /// Mark only the first `input_channels` channels as carrying input
    pub fn with_input_channels(mut self, input_channels: usize) -> Self {
        self.input_channels = input_channels.min(self.channels.len());
        self
    }

    #[inline]
    pub fn channels(&self) -> &[Vec<Sample>] {
        &self.channels
    }

    pub fn into_channels(self) -> Vec<Vec<Sample>> {
        self.channels
    }

    /// Zero-copy window over `[start, start + len)` of every channel
    pub fn slice_mut(&mut self, start: usize, len: usize) -> BlockSliceMut<'_> {
        assert!(
            start + len <= self.num_samples,
            "slice {}..{} out of bounds for {} samples",
            start,
            start + len,
            self.num_samples
        );
        BlockSliceMut {
            channels: &mut self.channels,
            start,
            len,
            input_channels: self.input_channels,
        }
    }
}

impl AudioBlock for MultiChannelBuffer {
    fn num_channels(&self) -> usize {
        self.channels.len()
    }

    fn num_input_channels(&self) -> usize {
        self.input_channels
    }

    fn num_samples(&self) -> usize {
        self.num_samples
    }

    #[inline]
    fn channel(&self, index: usize) -> &[Sample] {
        &self.channels[index]
    }

    #[inline]
    fn channel_mut(&mut self, index: usize) -> &mut [Sample] {
        &mut self.channels[index]
    }
}

/// Mutable view of a sample range inside a [`MultiChannelBuffer`]
pub struct BlockSliceMut<'a> {
    channels: &'a mut [Vec<Sample>],
    start: usize,
    len: usize,
    input_channels: usize,
}

impl AudioBlock for BlockSliceMut<'_> {
    fn num_channels(&self) -> usize {
        self.channels.len()
    }

    fn num_input_channels(&self) -> usize {
        self.input_channels
    }

    fn num_samples(&self) -> usize {
        self.len
    }

    #[inline]
    fn channel(&self, index: usize) -> &[Sample] {
        &self.channels[index][self.start..self.start + self.len]
    }

    #[inline]
    fn channel_mut(&mut self, index: usize) -> &mut [Sample] {
        &mut self.channels[index][self.start..self.start + self.len]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mono_resize_zeroes() {
        let mut buf = MonoBuffer::new(4);
        buf.samples_mut().fill(1.0);
        buf.resize(8);
        assert_eq!(buf.samples().len(), 8);
        assert!(buf.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_from_channels_rejects_ragged() {
        let result = MultiChannelBuffer::from_channels(vec![vec![0.0; 4], vec![0.0; 3]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_slice_writes_through() {
        let mut buf = MultiChannelBuffer::new(2, 8);
        {
            let mut view = buf.slice_mut(4, 4);
            assert_eq!(view.num_samples(), 4);
            view.channel_mut(1).fill(0.5);
        }
        assert_eq!(&buf.channels()[1][..4], &[0.0; 4]);
        assert_eq!(&buf.channels()[1][4..], &[0.5; 4]);
    }

    #[test]
    #[should_panic]
    fn test_slice_out_of_bounds() {
        let mut buf = MultiChannelBuffer::new(2, 8);
        let _ = buf.slice_mut(6, 4);
    }

    #[test]
    fn test_input_channels_clamped() {
        let buf = MultiChannelBuffer::new(6, 16).with_input_channels(10);
        assert_eq!(buf.num_input_channels(), 6);
    }

    #[test]
    fn test_slice_of_slices_block() {
        let mut a = [1.0, 2.0];
        let mut b = [3.0, 4.0];
        let mut chans: [&mut [Sample]; 2] = [&mut a, &mut b];
        let block: &mut [&mut [Sample]] = &mut chans;
        assert_eq!(block.num_channels(), 2);
        assert_eq!(block.num_samples(), 2);
        block.channel_mut(1)[0] = 9.0;
        assert_eq!(block.channel(1), &[9.0, 4.0]);
    }
}
