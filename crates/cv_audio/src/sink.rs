//! Streaming output seam and its cpal-backed implementation.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use ringbuf::{
    traits::{Consumer, Observer, Producer, Split},
    HeapCons, HeapProd, HeapRb,
};

use crate::AudioError;

/// A device that consumes queued interleaved f32 samples at playback rate.
pub trait AudioSink {
    /// Samples queued but not yet played.
    fn queued(&self) -> usize;
    /// Queue as many samples as fit; returns how many were accepted.
    fn push(&mut self, samples: &[f32]) -> usize;
    /// Drop everything still queued.
    fn clear(&mut self);
    fn resume(&mut self);
    fn pause(&mut self);
    fn channels(&self) -> u16;
    fn sample_rate(&self) -> u32;
}

/// Output format of the default device, needed before a wave is converted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceFormat {
    pub channels: u16,
    pub sample_rate: u32,
}

/// Default output device fed from a lock-free SPSC ring.
///
/// The producer half stays on the game thread; the consumer half lives in the
/// cpal callback. Clearing is requested through `pending_skip`, which the
/// callback drains before reading.
pub struct DeviceSink {
    producer: HeapProd<f32>,
    pending_skip: Arc<AtomicUsize>,
    stream: cpal::Stream,
    format: DeviceFormat,
}

pub fn default_device_format() -> Result<DeviceFormat, AudioError> {
    let device = cpal::default_host()
        .default_output_device()
        .ok_or(AudioError::NoDevice)?;
    let config = device
        .default_output_config()
        .map_err(|e| AudioError::Stream(format!("default output config: {e}")))?;
    Ok(DeviceFormat {
        channels: config.channels(),
        sample_rate: config.sample_rate().0,
    })
}

impl DeviceSink {
    /// Open the default output with room for `capacity` samples. The stream
    /// starts paused.
    pub fn open(capacity: usize) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let supported = device
            .default_output_config()
            .map_err(|e| AudioError::Stream(format!("default output config: {e}")))?;
        let format = DeviceFormat {
            channels: supported.channels(),
            sample_rate: supported.sample_rate().0,
        };
        let config: cpal::StreamConfig = supported.config();

        let ring = HeapRb::<f32>::new(capacity.max(1));
        let (producer, consumer) = ring.split();
        let pending_skip = Arc::new(AtomicUsize::new(0));

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &config, consumer, pending_skip.clone())?
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &config, consumer, pending_skip.clone())?
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &config, consumer, pending_skip.clone())?
            }
            other => {
                return Err(AudioError::UnsupportedFormat(format!(
                    "device sample format {other:?}"
                )))
            }
        };
        stream
            .pause()
            .map_err(|e| AudioError::Stream(format!("pause: {e}")))?;

        log::info!(
            "Audio device: {} ch, {} Hz, {:?}, ring {} samples",
            format.channels,
            format.sample_rate,
            supported.sample_format(),
            capacity
        );

        Ok(Self {
            producer,
            pending_skip,
            stream,
            format,
        })
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut consumer: HeapCons<f32>,
    pending_skip: Arc<AtomicUsize>,
) -> Result<cpal::Stream, AudioError>
where
    T: SizedSample + FromSample<f32>,
{
    let mut scratch: Vec<f32> = vec![0.0; 4096];
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let skip = pending_skip.swap(0, Ordering::AcqRel);
                if skip > 0 {
                    consumer.skip(skip.min(consumer.occupied_len()));
                }
                if scratch.len() < data.len() {
                    scratch.resize(data.len(), 0.0);
                }
                let popped = consumer.pop_slice(&mut scratch[..data.len()]);
                for (out, &sample) in data.iter_mut().zip(&scratch[..popped]) {
                    *out = T::from_sample(sample);
                }
                for out in &mut data[popped..] {
                    *out = T::EQUILIBRIUM;
                }
            },
            |err| log::error!("Audio stream error: {}", err),
            None,
        )
        .map_err(|e| AudioError::Stream(format!("build stream: {e}")))
}

impl AudioSink for DeviceSink {
    fn queued(&self) -> usize {
        self.producer
            .occupied_len()
            .saturating_sub(self.pending_skip.load(Ordering::Acquire))
    }

    fn push(&mut self, samples: &[f32]) -> usize {
        let pushed = self.producer.push_slice(samples);
        if pushed < samples.len() {
            log::debug!(
                "Audio ring full: dropped {} samples",
                samples.len() - pushed
            );
        }
        pushed
    }

    fn clear(&mut self) {
        // A callback racing this store may already have played a few of these
        // samples; the overshoot only trims the start of the next push.
        self.pending_skip
            .store(self.producer.occupied_len(), Ordering::Release);
    }

    fn resume(&mut self) {
        if let Err(e) = self.stream.play() {
            log::warn!("Could not resume audio stream: {}", e);
        }
    }

    fn pause(&mut self) {
        if let Err(e) = self.stream.pause() {
            log::warn!("Could not pause audio stream: {}", e);
        }
    }

    fn channels(&self) -> u16 {
        self.format.channels
    }

    fn sample_rate(&self) -> u32 {
        self.format.sample_rate
    }
}
