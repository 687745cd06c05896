use super::super::World;
use crate::metrics::FrameMetrics;

impl World {
    /// Passive spawn on the right edge, then move, absorb, split, and remove.
    pub(in crate::world) fn step_payload_phase(&mut self, now: f64, metrics: &mut FrameMetrics) {
        if self
            .payloads
            .maybe_spawn_passive(&self.grid, &self.config, &mut self.rng)
        {
            metrics.passive_spawns += 1;
        }
        let tick = self.payloads.update(
            &mut self.grid,
            &mut self.beings,
            now,
            &self.config,
            &mut self.rng,
        );
        metrics.absorptions = tick.absorbed;
        metrics.exits = tick.exited;
        metrics.children_spawned = tick.children;
        metrics.refused_spawns = tick.refused;
    }
}
