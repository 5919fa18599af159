use std::collections::VecDeque;
use std::time::Instant;

/// Frames averaged for the FPS readout.
pub const SMOOTHING_WINDOW: usize = 60;

/// Variable-step frame clock. Each `begin_frame` measures the wall-clock time
/// since the previous call; the very first frame reports `dt = 0`.
pub struct FrameClock {
    pub max_frame_dt: f64,
    pub dt: f64,
    pub total_time: f64,
    pub frame_count: u64,
    last_instant: Option<Instant>,
    recent: RollingMean,
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            max_frame_dt: 0.25,
            dt: 0.0,
            total_time: 0.0,
            frame_count: 0,
            last_instant: None,
            recent: RollingMean::new(SMOOTHING_WINDOW),
        }
    }

    pub fn begin_frame(&mut self) -> f64 {
        let now = Instant::now();
        let raw_dt = self
            .last_instant
            .replace(now)
            .map_or(0.0, |last| now.duration_since(last).as_secs_f64());
        self.record(raw_dt)
    }

    fn record(&mut self, raw_dt: f64) -> f64 {
        if raw_dt > self.max_frame_dt {
            log::warn!(
                "Frame took {:.1}ms, capping dt to {}ms",
                raw_dt * 1000.0,
                self.max_frame_dt * 1000.0
            );
        }
        self.dt = raw_dt.min(self.max_frame_dt);
        self.total_time += self.dt;
        self.frame_count += 1;
        // Zero-length frames (the first one) would skew the average.
        if self.dt > 0.0 {
            self.recent.push(self.dt);
        }
        self.dt
    }

    /// Mean frame time over the last `SMOOTHING_WINDOW` measured frames,
    /// in milliseconds. Zero until a frame has been measured.
    pub fn smoothed_frame_time_ms(&self) -> f64 {
        self.recent.mean().map_or(0.0, |dt| dt * 1000.0)
    }

    pub fn smoothed_fps(&self) -> f64 {
        self.recent.mean().map_or(0.0, |dt| 1.0 / dt)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

struct RollingMean {
    samples: VecDeque<f64>,
    capacity: usize,
    sum: f64,
}

impl RollingMean {
    fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            sum: 0.0,
        }
    }

    fn push(&mut self, value: f64) {
        if self.samples.len() == self.capacity {
            if let Some(oldest) = self.samples.pop_front() {
                self.sum -= oldest;
            }
        }
        self.samples.push_back(value);
        self.sum += value;
    }

    fn mean(&self) -> Option<f64> {
        (!self.samples.is_empty()).then(|| self.sum / self.samples.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_frame_has_zero_dt() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.begin_frame(), 0.0);
        assert_eq!(clock.frame_count, 1);
        assert_eq!(clock.smoothed_fps(), 0.0);
        assert!(clock.begin_frame() >= 0.0);
        assert_eq!(clock.frame_count, 2);
    }

    #[test]
    fn long_frames_are_capped() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.record(2.0), 0.25);
        assert_eq!(clock.total_time, 0.25);
    }

    #[test]
    fn smoothing_follows_the_latest_window() {
        let mut clock = FrameClock::new();
        for _ in 0..SMOOTHING_WINDOW {
            clock.record(1.0 / 60.0);
        }
        for _ in 0..SMOOTHING_WINDOW {
            clock.record(1.0 / 30.0);
        }
        assert!((clock.smoothed_fps() - 30.0).abs() < 0.01);
        assert!((clock.smoothed_frame_time_ms() - 33.333).abs() < 0.01);
    }

    #[test]
    fn zero_frames_do_not_enter_the_average() {
        let mut clock = FrameClock::new();
        clock.record(0.02);
        clock.record(0.0);
        assert!((clock.smoothed_frame_time_ms() - 20.0).abs() < 1e-9);
    }
}
