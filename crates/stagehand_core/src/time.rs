#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Timer for tracking frame timing and elapsed time.
pub struct Timer {
    start_time: Instant,
    last_update: Instant,
    /// Time since last tick
    pub delta: Duration,
    /// Total elapsed time since creation
    pub elapsed: Duration,
    /// Total number of ticks
    pub frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Creates a new timer starting from now.
    #[must_use]
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_update: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// Updates the timer; call once per frame.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last_update;
        self.elapsed = now - self.start_time;
        self.last_update = now;
        self.frame_count += 1;
    }

    #[must_use]
    pub fn dt_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }
}

/// Fires at a fixed cadence of accumulated frame time.
///
/// The cadence is measured in the deltas fed to [`tick`](Self::tick), so it does not
/// depend on how many frames the host renders per second: at 144 fps and at 20 fps a
/// 30 Hz throttle fires about 30 times per simulated second (never more than once per
/// tick).
#[derive(Debug, Clone)]
pub struct FrameThrottle {
    interval: f32,
    accumulated: f32,
}

impl FrameThrottle {
    /// `rate_hz <= 0` disables throttling: every tick fires.
    #[must_use]
    pub fn new(rate_hz: f32) -> Self {
        let interval = if rate_hz > 0.0 && rate_hz.is_finite() {
            1.0 / rate_hz
        } else {
            0.0
        };
        Self {
            interval,
            accumulated: 0.0,
        }
    }

    #[inline]
    #[must_use]
    pub fn interval(&self) -> f32 {
        self.interval
    }

    /// Accumulates `dt` seconds and reports whether a sample is due.
    pub fn tick(&mut self, dt: f32) -> bool {
        if dt.is_finite() && dt > 0.0 {
            self.accumulated += dt;
        }

        if self.accumulated + f32::EPSILON < self.interval {
            return false;
        }

        // Keep the remainder so the cadence does not drift, but never bank more
        // than one interval after a long stall.
        self.accumulated = if self.interval > 0.0 {
            (self.accumulated - self.interval).min(self.interval)
        } else {
            0.0
        };
        true
    }
}
