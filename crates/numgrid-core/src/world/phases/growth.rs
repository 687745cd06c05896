use super::super::World;
use crate::metrics::FrameMetrics;

impl World {
    /// Fire every due Being growth timer and rewrite the affected body cells.
    pub(in crate::world) fn step_growth_phase(&mut self, now: f64, metrics: &mut FrameMetrics) {
        let outcome = self
            .beings
            .advance_growth(&mut self.grid, now, &self.config, &mut self.rng);
        metrics.growth_firings = outcome.fired;
        metrics.growth_points = outcome.points;
    }
}
