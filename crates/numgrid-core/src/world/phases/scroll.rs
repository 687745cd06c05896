use super::super::World;

impl World {
    /// Advance the wave texture by one frame's worth of scroll.
    pub(in crate::world) fn step_scroll_phase(&mut self) {
        let width = self.texture.width() as f64;
        if width <= 0.0 {
            return;
        }
        self.scroll_offset = (self.scroll_offset + self.config.scroll_per_frame()) % width;
    }
}
