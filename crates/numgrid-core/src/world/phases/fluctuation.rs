use super::super::World;
use crate::fluctuation::fluctuate;
use crate::metrics::FrameMetrics;

impl World {
    pub(in crate::world) fn step_fluctuation_phase(&mut self, metrics: &mut FrameMetrics) {
        metrics.fluctuations = fluctuate(&mut self.grid, &self.config, &mut self.rng);
    }
}
