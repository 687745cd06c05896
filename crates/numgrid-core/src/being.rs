use crate::config::FieldConfig;
use crate::grid::{BeingId, BodyCell, Cell, Grid};
use rand::Rng;

/// Position of one body cell and its distance from the Being's center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyCellRef {
    pub row: usize,
    pub col: usize,
    pub distance: f64,
}

/// A stationary multi-cell entity with a growing value.
///
/// The body is fixed at creation; only `value`, the growth timer, and the
/// absorption stamp change afterwards.
#[derive(Clone, Debug)]
pub struct Being {
    id: BeingId,
    center: (usize, usize),
    body: Vec<BodyCellRef>,
    max_distance: f64,
    pub value: u64,
    pub last_growth_time: f64,
    pub next_growth_delay: f64,
    pub consume_time: Option<f64>,
}

impl Being {
    pub fn id(&self) -> BeingId {
        self.id
    }

    pub fn center(&self) -> (usize, usize) {
        self.center
    }

    /// Body cells ordered by distance from the center; the center comes first.
    pub fn body(&self) -> &[BodyCellRef] {
        &self.body
    }

    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Whether the growth timer has elapsed at `now`.
    pub fn is_due(&self, now: f64) -> bool {
        now - self.last_growth_time >= self.next_growth_delay
    }
}

/// Linear interpolation from `core` at the center to `edge` at `max_distance`.
/// The center (distance 0) always keeps the full core value.
pub fn interpolate_body_value(core: u64, edge: u64, distance: f64, max_distance: f64) -> u64 {
    if distance <= 0.0 || max_distance <= 0.0 {
        return core;
    }
    let t = (distance / max_distance).clamp(0.0, 1.0);
    let value = core as f64 + (edge as f64 - core as f64) * t;
    value.max(0.0).floor() as u64
}

/// Draw a growth delay uniformly from the configured interval.
pub fn draw_growth_delay<R: Rng>(rng: &mut R, config: &FieldConfig) -> f64 {
    if config.growth_max_interval > config.growth_min_interval {
        rng.random_range(config.growth_min_interval..=config.growth_max_interval)
    } else {
        config.growth_min_interval
    }
}

/// Draw a growth amount: zero with probability `W / (W + max_points)`,
/// otherwise uniform in `[1, max_points]`.
pub fn draw_growth_amount<R: Rng>(rng: &mut R, config: &FieldConfig) -> u64 {
    let max_points = config.growth_max_points;
    if max_points == 0 {
        return 0;
    }
    let weight = config.growth_no_growth_weight;
    let no_growth_chance = weight / (weight + max_points as f64);
    if rng.random::<f64>() < no_growth_chance {
        0
    } else {
        rng.random_range(1..=max_points)
    }
}

/// Result of one growth scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GrowthOutcome {
    /// Beings whose timer fired this scan.
    pub fired: usize,
    /// Total points added (after the ceiling clamp).
    pub points: u64,
}

/// Owner of every Being. Cells reference entries by `BeingId`.
#[derive(Clone, Debug, Default)]
pub struct BeingRegistry {
    beings: Vec<Being>,
    edge_value: u64,
}

impl BeingRegistry {
    /// Empty registry whose body gradients fade toward `edge_value`.
    pub fn new(edge_value: u64) -> Self {
        Self {
            beings: Vec::new(),
            edge_value,
        }
    }

    pub fn len(&self) -> usize {
        self.beings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.beings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Being> {
        self.beings.iter()
    }

    pub fn get(&self, id: BeingId) -> Option<&Being> {
        self.beings.get(id.index())
    }

    pub fn get_mut(&mut self, id: BeingId) -> Option<&mut Being> {
        self.beings.get_mut(id.index())
    }

    /// Value body gradients fade toward at the outer radius.
    pub fn edge_value(&self) -> u64 {
        self.edge_value
    }

    pub fn total_value(&self) -> u128 {
        self.beings.iter().map(|b| b.value as u128).sum()
    }

    /// Register a Being with an explicit body and write its cells into `grid`.
    ///
    /// The first cell of `body` is the center. Returns `None` (and leaves the
    /// grid untouched) if `body` is empty, repeats a cell, or any cell is out of
    /// bounds or already part of a Being. Separation from other Beings is the
    /// caller's concern.
    pub fn place(
        &mut self,
        grid: &mut Grid,
        body: &[(usize, usize)],
        value: u64,
        last_growth_time: f64,
        next_growth_delay: f64,
    ) -> Option<BeingId> {
        let &(center_row, center_col) = body.first()?;
        let mut seen = std::collections::HashSet::with_capacity(body.len());
        for &(row, col) in body {
            if !grid.is_empty_cell(row, col) || !seen.insert((row, col)) {
                return None;
            }
        }

        let id = BeingId(u32::try_from(self.beings.len()).ok()?);
        let mut cells: Vec<BodyCellRef> = body
            .iter()
            .map(|&(row, col)| {
                let dr = row as f64 - center_row as f64;
                let dc = col as f64 - center_col as f64;
                BodyCellRef {
                    row,
                    col,
                    distance: dr.hypot(dc),
                }
            })
            .collect();
        // Stable: the center is the only cell at distance 0 and stays first.
        cells.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        let max_distance = cells.iter().map(|c| c.distance).fold(0.0, f64::max);

        self.beings.push(Being {
            id,
            center: (center_row, center_col),
            body: cells,
            max_distance,
            value,
            last_growth_time,
            next_growth_delay,
            consume_time: None,
        });
        self.write_body(grid, id);
        Some(id)
    }

    /// Fire every Being whose growth timer is due at `now`.
    pub fn advance_growth<R: Rng>(
        &mut self,
        grid: &mut Grid,
        now: f64,
        config: &FieldConfig,
        rng: &mut R,
    ) -> GrowthOutcome {
        let mut outcome = GrowthOutcome::default();
        for idx in 0..self.beings.len() {
            let being = &mut self.beings[idx];
            if !being.is_due(now) {
                continue;
            }
            let amount = draw_growth_amount(rng, config);
            let before = being.value;
            being.value = being.value.saturating_add(amount).min(config.being_max_value);
            // A value placed above the ceiling is never lowered by growth.
            being.value = being.value.max(before);
            being.last_growth_time = now;
            being.next_growth_delay = draw_growth_delay(rng, config);
            outcome.fired += 1;
            outcome.points += being.value - before;
            let id = being.id;
            self.write_body(grid, id);
        }
        outcome
    }

    /// Stamp an absorption at `now` on the Being and every one of its cells.
    pub fn mark_consumed(&mut self, grid: &mut Grid, id: BeingId, now: f64) {
        let Some(being) = self.beings.get_mut(id.index()) else {
            return;
        };
        being.consume_time = Some(now);
        for cell in &being.body {
            if let Some(Cell::Body(body)) = grid.get_mut(cell.row, cell.col) {
                body.consume_time = Some(now);
            }
        }
    }

    /// Rewrite every body cell of `id` from the Being's current value.
    fn write_body(&self, grid: &mut Grid, id: BeingId) {
        let Some(being) = self.beings.get(id.index()) else {
            return;
        };
        for cell in &being.body {
            let value =
                interpolate_body_value(being.value, self.edge_value, cell.distance, being.max_distance);
            let Some(slot) = grid.get_mut(cell.row, cell.col) else {
                continue;
            };
            match slot {
                Cell::Body(body) if body.being == id => body.value = value,
                _ => {
                    *slot = Cell::Body(BodyCell {
                        value,
                        being: id,
                        is_center: (cell.row, cell.col) == being.center,
                        distance: cell.distance,
                        consume_time: being.consume_time,
                    });
                }
            }
        }
    }
}
