/// Frames per second over `elapsed_ms`; zero when no time has elapsed.
pub fn calculate_fps(frames: u32, elapsed_ms: f64) -> f64 {
    if elapsed_ms <= 0.0 {
        return 0.0;
    }
    frames as f64 * 1_000.0 / elapsed_ms
}

/// Windowed frame-rate counter. The published value only changes once per
/// `update_interval` milliseconds.
#[derive(Clone, Debug)]
pub struct FpsCounter {
    update_interval: f64,
    window_start: Option<f64>,
    frames: u32,
    fps: f64,
}

impl FpsCounter {
    pub fn new(update_interval: f64) -> Self {
        Self {
            update_interval,
            window_start: None,
            frames: 0,
            fps: 0.0,
        }
    }

    /// Count one admitted frame at `now`. Returns the new value when the
    /// window closes.
    pub fn tick(&mut self, now: f64) -> Option<f64> {
        let start = *self.window_start.get_or_insert(now);
        self.frames = self.frames.saturating_add(1);
        let elapsed = now - start;
        if elapsed < self.update_interval || elapsed <= 0.0 {
            return None;
        }
        self.fps = calculate_fps(self.frames, elapsed);
        self.frames = 0;
        self.window_start = Some(now);
        Some(self.fps)
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }
}
