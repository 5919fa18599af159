//! Looped and one-shot WAV playback over a streaming output device.
//!
//! A wave is decoded once, converted to the device's channel count and sample
//! rate, and kept in memory. Looping works by re-queuing the whole buffer
//! whenever less than one buffer's worth is still queued, so the device never
//! runs dry and nothing is decoded twice.

pub mod player;
pub mod sink;
pub mod wav;

use thiserror::Error;

pub use player::SoundPlayer;
pub use sink::{AudioSink, DeviceSink};
pub use wav::{load_wav, WaveBuffer};

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("could not decode '{path}': {reason}")]
    Decode { path: String, reason: String },
    #[error("unsupported wave format: {0}")]
    UnsupportedFormat(String),
    #[error("no audio output device available")]
    NoDevice,
    #[error("audio stream error: {0}")]
    Stream(String),
}
