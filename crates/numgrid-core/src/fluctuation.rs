use crate::config::FieldConfig;
use crate::grid::{Cell, Grid};
use rand::Rng;

/// Random-walk every empty cell's base value by one of {-1, 0, +1} with
/// probability `empty_fluctuation_probability`, clamped to the empty range.
///
/// Returns how many cells were selected for a step (including zero steps).
pub fn fluctuate<R: Rng>(grid: &mut Grid, config: &FieldConfig, rng: &mut R) -> usize {
    let probability = config.empty_fluctuation_probability;
    if probability <= 0.0 {
        return 0;
    }
    let (min, max) = (config.empty_min_value as i64, config.empty_max_value as i64);
    let mut stepped = 0;
    for cell in grid.cells_mut() {
        let Cell::Empty { base_value } = cell else {
            continue;
        };
        if !rng.random_bool(probability) {
            continue;
        }
        let delta: i64 = rng.random_range(-1..=1);
        *base_value = (*base_value as i64 + delta).clamp(min, max) as u32;
        stepped += 1;
    }
    stepped
}
