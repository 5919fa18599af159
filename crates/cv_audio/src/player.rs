use std::path::Path;

use crate::sink::{default_device_format, AudioSink, DeviceSink};
use crate::wav::{load_wav, WaveBuffer};
use crate::AudioError;

/// One in-memory wave bound to one output stream.
pub struct SoundPlayer<S: AudioSink> {
    wave: WaveBuffer,
    sink: S,
    playing: bool,
    /// Next wave sample to queue. A push the ring could not take in full
    /// resumes from here, so the loop stays seamless.
    cursor: usize,
}

impl SoundPlayer<DeviceSink> {
    /// Load a WAV file and open the default device for it. The ring holds two
    /// copies of the wave so a refill never has to wait for space.
    pub fn open(path: &Path) -> Result<Self, AudioError> {
        let format = default_device_format()?;
        let wave = load_wav(path)?.convert(format.channels, format.sample_rate);
        if wave.is_empty() {
            return Err(AudioError::UnsupportedFormat(format!(
                "'{}' contains no samples",
                path.display()
            )));
        }
        let sink = DeviceSink::open(wave.len() * 2)?;
        Ok(Self::new(wave, sink))
    }
}

impl<S: AudioSink> SoundPlayer<S> {
    /// Wrap an already loaded wave; it is converted to the sink's format here.
    pub fn new(wave: WaveBuffer, sink: S) -> Self {
        let wave = if wave.channels != sink.channels() || wave.sample_rate != sink.sample_rate() {
            wave.convert(sink.channels(), sink.sample_rate())
        } else {
            wave
        };
        Self {
            wave,
            sink,
            playing: false,
            cursor: 0,
        }
    }

    pub fn start(&mut self) {
        self.sink.resume();
        self.playing = true;
    }

    /// Top the stream up with the rest of the current pass through the wave
    /// once less than one copy is left queued. Call once per frame while
    /// looping.
    pub fn continue_loop(&mut self) {
        if self.sink.queued() < self.wave.len() {
            self.push_from_cursor();
        }
    }

    pub fn stop(&mut self) {
        self.sink.pause();
        self.sink.clear();
        self.cursor = 0;
        self.playing = false;
    }

    /// Restart the wave from the top, discarding whatever was queued.
    pub fn play_once(&mut self) {
        self.sink.clear();
        self.cursor = 0;
        self.push_from_cursor();
        self.sink.resume();
        self.playing = true;
    }

    fn push_from_cursor(&mut self) {
        let accepted = self.sink.push(&self.wave.samples[self.cursor..]);
        self.cursor += accepted;
        if self.cursor >= self.wave.len() {
            self.cursor = 0;
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn queued(&self) -> usize {
        self.sink.queued()
    }

    pub fn wave(&self) -> &WaveBuffer {
        &self.wave
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeSink {
        queue: Vec<f32>,
        capacity: usize,
        resumed: bool,
        pushes: usize,
    }

    impl FakeSink {
        fn with_capacity(capacity: usize) -> Self {
            Self {
                capacity,
                ..Default::default()
            }
        }

        /// Simulate the device playing `n` samples.
        fn drain(&mut self, n: usize) {
            let n = n.min(self.queue.len());
            self.queue.drain(..n);
        }
    }

    impl AudioSink for FakeSink {
        fn queued(&self) -> usize {
            self.queue.len()
        }

        fn push(&mut self, samples: &[f32]) -> usize {
            let room = self.capacity - self.queue.len();
            let n = room.min(samples.len());
            self.queue.extend_from_slice(&samples[..n]);
            self.pushes += 1;
            n
        }

        fn clear(&mut self) {
            self.queue.clear();
        }

        fn resume(&mut self) {
            self.resumed = true;
        }

        fn pause(&mut self) {
            self.resumed = false;
        }

        fn channels(&self) -> u16 {
            1
        }

        fn sample_rate(&self) -> u32 {
            8_000
        }
    }

    fn wave(len: usize) -> WaveBuffer {
        WaveBuffer {
            samples: (0..len).map(|i| i as f32 / len as f32).collect(),
            channels: 1,
            sample_rate: 8_000,
        }
    }

    fn player(len: usize) -> SoundPlayer<FakeSink> {
        SoundPlayer::new(wave(len), FakeSink::with_capacity(len * 2))
    }

    #[test]
    fn continue_loop_refills_only_below_one_wave() {
        let mut p = player(100);
        p.start();
        p.continue_loop();
        assert_eq!(p.queued(), 100);

        p.continue_loop();
        assert_eq!(p.sink.pushes, 1, "full wave still queued, no refill");

        p.sink.drain(1);
        p.continue_loop();
        assert_eq!(p.queued(), 199);
        assert_eq!(p.sink.pushes, 2);
    }

    #[test]
    fn loop_never_runs_dry_with_regular_refills() {
        let mut p = player(50);
        p.start();
        for _ in 0..100 {
            p.continue_loop();
            assert!(p.queued() >= 50);
            p.sink.drain(30);
        }
    }

    #[test]
    fn play_once_restarts_from_top() {
        let mut p = player(10);
        p.continue_loop();
        p.sink.drain(4);
        p.play_once();
        assert_eq!(p.queued(), 10);
        assert_eq!(p.sink.queue[0], 0.0);
        assert!(p.sink.resumed);
        assert!(p.is_playing());
    }

    #[test]
    fn stop_pauses_and_clears() {
        let mut p = player(10);
        p.start();
        p.continue_loop();
        p.stop();
        assert_eq!(p.queued(), 0);
        assert!(!p.sink.resumed);
        assert!(!p.is_playing());
    }

    /// Models a ring that still physically holds samples a `clear` asked to
    /// skip: space only returns once the device runs again.
    #[derive(Default)]
    struct LaggingClearSink {
        inner: FakeSink,
        stale: usize,
    }

    impl AudioSink for LaggingClearSink {
        fn queued(&self) -> usize {
            self.inner.queue.len() - self.stale
        }

        fn push(&mut self, samples: &[f32]) -> usize {
            self.inner.push(samples)
        }

        fn clear(&mut self) {
            self.stale = self.inner.queue.len();
        }

        fn resume(&mut self) {
            self.inner.resume();
        }

        fn pause(&mut self) {
            self.inner.pause();
        }

        fn channels(&self) -> u16 {
            1
        }

        fn sample_rate(&self) -> u32 {
            8_000
        }
    }

    impl LaggingClearSink {
        /// The device wakes up: drop the stale samples, then play `n`.
        fn play(&mut self, n: usize) {
            self.inner.drain(self.stale);
            self.stale = 0;
            self.inner.drain(n);
        }
    }

    #[test]
    fn partial_push_resumes_where_it_stopped() {
        let mut p = player(10);
        p.sink.capacity = 14;
        p.start();
        p.continue_loop();
        p.sink.drain(6);
        p.continue_loop();
        // 4 left + 10 room => whole wave fits; now fill to the brim.
        p.sink.drain(8);
        p.continue_loop();
        assert_eq!(p.queued(), 14);
        assert_eq!(p.cursor, 8);

        p.sink.drain(14);
        p.continue_loop();
        let w = wave(10).samples;
        assert_eq!(p.sink.queue[..2], w[8..]);
        assert_eq!(p.cursor, 0);
    }

    #[test]
    fn restart_after_stop_plays_the_whole_track_in_order() {
        let w = wave(10).samples;
        let mut p = SoundPlayer::new(wave(10), LaggingClearSink::default());
        p.sink.inner.capacity = 20;
        p.start();
        p.continue_loop();
        p.sink.play(3);
        p.continue_loop();
        assert_eq!(p.queued(), 17);

        p.stop();
        assert_eq!(p.queued(), 0);
        p.start();
        p.continue_loop();
        // Only 3 slots were free behind the stale samples.
        assert_eq!(p.queued(), 3);

        p.sink.play(0);
        p.continue_loop();
        assert_eq!(p.sink.inner.queue[..10], w[..]);
    }

    #[test]
    fn new_converts_wave_to_sink_format() {
        let stereo = WaveBuffer {
            samples: vec![0.5, 0.5, 1.0, 1.0],
            channels: 2,
            sample_rate: 8_000,
        };
        let p = SoundPlayer::new(stereo, FakeSink::with_capacity(16));
        assert_eq!(p.wave().channels, 1);
        assert_eq!(p.wave().samples, vec![0.5, 1.0]);
    }
}
