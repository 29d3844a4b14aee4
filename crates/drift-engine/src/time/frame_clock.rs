use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous tick, in seconds (clamped).
    pub dt: f32,

    /// Exponential moving average of `dt`, in seconds.
    pub avg_dt: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

impl FrameTime {
    /// Frames per second derived from the smoothed frame time.
    #[inline]
    pub fn fps(&self) -> f32 {
        if self.avg_dt > 0.0 { 1.0 / self.avg_dt } else { 0.0 }
    }
}

/// Frame clock producing `FrameTime` snapshots.
///
/// The scroll easing is per-frame, not per-second, so nothing in the gallery
/// integrates `dt`; the clock exists for diagnostics and pacing logs.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    frame_index: u64,
    avg_dt: f32,
    dt_min: Duration,
    dt_max: Duration,
}

/// Weight of the newest sample in the moving average.
const AVG_WEIGHT: f32 = 0.1;

impl FrameClock {
    pub fn new() -> Self {
        Self::with_clamps(Duration::from_micros(100), Duration::from_millis(250))
    }

    /// Creates a clock with custom delta-time clamps.
    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self {
            last: Instant::now(),
            frame_index: 0,
            avg_dt: 0.0,
            dt_min,
            dt_max,
        }
    }

    /// Resets the clock baseline (e.g. after a resize stall).
    pub fn reset(&mut self) {
        self.last = Instant::now();
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = self.advance(now);
        FrameTime {
            dt,
            avg_dt: self.avg_dt,
            now,
            frame_index: self.frame_index.wrapping_sub(1),
        }
    }

    fn advance(&mut self, now: Instant) -> f32 {
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max)
            .as_secs_f32();

        self.avg_dt = if self.frame_index == 0 {
            dt
        } else {
            self.avg_dt + (dt - self.avg_dt) * AVG_WEIGHT
        };

        self.last = now;
        self.frame_index = self.frame_index.wrapping_add(1);
        dt
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
