//! Fixed-timestep game clock using an accumulator pattern.
//!
//! The host loop calls with variable frame timestamps. GameTime converts
//! them into a fixed number of discrete ticks per second, so the workshop's
//! sweep and income cadence stay deterministic and testable.

#[derive(Clone, Debug)]
pub struct GameTime {
    /// Milliseconds per tick (e.g. 100ms = 10 ticks/sec)
    ms_per_tick: f64,
    /// Accumulated milliseconds not yet consumed as ticks
    accumulator: f64,
    /// Largest frame delta honoured; `None` replays any gap in full.
    max_frame_ms: Option<f64>,
    /// Total elapsed ticks since creation
    pub total_ticks: u64,
    /// Timestamp of the last update (ms), None if first frame
    last_timestamp: Option<f64>,
}

impl GameTime {
    /// `ticks_per_sec`: how many game ticks per real-time second (e.g. 10).
    /// `max_frame_ms`: clamp for a single frame's delta; `0` disables it.
    pub fn new(ticks_per_sec: u32, max_frame_ms: f64) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec.max(1) as f64,
            accumulator: 0.0,
            max_frame_ms: (max_frame_ms > 0.0).then_some(max_frame_ms),
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    pub fn ms_per_tick(&self) -> f64 {
        self.ms_per_tick
    }

    /// Feed a frame timestamp. Returns the number of discrete ticks to
    /// process this frame.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_timestamp {
            Some(prev) => {
                let d = (now_ms - prev).max(0.0);
                match self.max_frame_ms {
                    Some(max) => d.min(max),
                    None => d,
                }
            }
            None => 0.0, // First frame: no delta
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }
}
