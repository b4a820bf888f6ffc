//! Meter bridge: audio thread → UI thread
//!
//! The audio thread pushes one `MeterReading` per channel per block into a
//! bounded SPSC ring. When the ring is full readings are dropped; the push
//! never blocks and never allocates.

use bm_core::{AudioBlock, Channel, NUM_CHANNELS};
use bm_dsp::metering::{DecayingMeter, block_peak};
use rtrb::{Consumer, Producer, RingBuffer};

/// Post-processing peak of one channel over one block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeterReading {
    pub channel: Channel,
    pub peak: f64,
}

/// Audio-thread side of the bridge
pub(crate) struct MeterTap {
    producer: Producer<MeterReading>,
}

impl MeterTap {
    /// Push the block peak of each of the six channels
    #[inline]
    pub(crate) fn publish<B: AudioBlock + ?Sized>(&mut self, block: &B) {
        for channel in Channel::ALL {
            let peak = block_peak(block.channel(channel.index()));
            // Full ring: drop the reading
            let _ = self.producer.push(MeterReading { channel, peak });
        }
    }
}

/// UI-thread side of the bridge
pub struct MeterReceiver {
    consumer: Consumer<MeterReading>,
    meters: [DecayingMeter; NUM_CHANNELS],
}

impl MeterReceiver {
    /// Drain pending readings and advance every meter one display frame.
    /// Returns the displayed level per channel, indexed by `Channel::index`.
    pub fn poll(&mut self) -> [f64; NUM_CHANNELS] {
        while let Ok(reading) = self.consumer.pop() {
            self.meters[reading.channel.index()].update(reading.peak);
        }
        std::array::from_fn(|i| self.meters[i].tick())
    }

    /// Drain pending readings without touching the meters
    pub fn drain(&mut self) -> Vec<MeterReading> {
        let mut readings = Vec::with_capacity(self.consumer.slots());
        while let Ok(reading) = self.consumer.pop() {
            readings.push(reading);
        }
        readings
    }

    pub fn level(&self, channel: Channel) -> f64 {
        self.meters[channel.index()].level()
    }

    pub fn level_db(&self, channel: Channel) -> f64 {
        self.meters[channel.index()].level_db()
    }

    /// True once the engine has dropped its side of the bridge
    pub fn is_detached(&self) -> bool {
        self.consumer.is_abandoned()
    }
}

/// Allocate a bridge holding up to `capacity` readings
pub(crate) fn meter_bridge(capacity: usize) -> (MeterTap, MeterReceiver) {
    let (producer, consumer) = RingBuffer::new(capacity);
    (
        MeterTap { producer },
        MeterReceiver {
            consumer,
            meters: Default::default(),
        },
    )
}
