use crate::being::BeingRegistry;
use crate::config::{FieldConfig, PayloadOverflow};
use crate::grid::{BeingId, Cell, Grid};
use rand::Rng;
use std::collections::HashSet;
use tracing::debug;

/// Directions a split child may be released in, relative to a body cell:
/// above, below, left. Never right, so children drift away from the Being
/// instead of re-entering it on the next tick.
pub const SPLIT_DIRECTIONS: [(i64, i64); 3] = [(-1, 0), (1, 0), (0, -1)];

/// A single-cell particle drifting leftwards along its row.
#[derive(Clone, Debug, PartialEq)]
pub struct Payload {
    row: usize,
    position: f64,
    column: i64,
    pub value: u64,
    /// Undecayed value of the blob this payload was spawned in.
    pub center_value: u64,
}

impl Payload {
    pub fn new(row: usize, col: usize, value: u64, center_value: u64) -> Self {
        Self {
            row,
            position: col as f64,
            column: col as i64,
            value,
            center_value,
        }
    }

    pub fn row(&self) -> usize {
        self.row
    }

    /// Fractional column; only ever decreases.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// `floor(position)`; negative once the payload has left the grid.
    pub fn column(&self) -> i64 {
        self.column
    }

    /// Grid cell currently occupied, if still on the grid.
    pub fn cell(&self) -> Option<(usize, usize)> {
        usize::try_from(self.column).ok().map(|col| (self.row, col))
    }

    fn advance(&mut self, speed: f64) {
        self.position -= speed;
        self.column = self.position.floor() as i64;
    }
}

/// Per-tick accounting of the payload update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PayloadTick {
    /// Payloads absorbed by a Being.
    pub absorbed: usize,
    /// Payloads that left through the left edge.
    pub exited: usize,
    /// Children released by absorptions.
    pub children: usize,
    /// Spawns refused by the payload cap.
    pub refused: usize,
}

/// Owner of the live payload collection.
#[derive(Clone, Debug, Default)]
pub struct PayloadSystem {
    payloads: Vec<Payload>,
}

impl PayloadSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.payloads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payloads.is_empty()
    }

    pub fn payloads(&self) -> &[Payload] {
        &self.payloads
    }

    pub fn iter(&self) -> impl Iterator<Item = &Payload> {
        self.payloads.iter()
    }

    /// Cells currently holding at least one payload.
    pub fn occupied(&self) -> HashSet<(usize, usize)> {
        self.payloads.iter().filter_map(Payload::cell).collect()
    }

    /// First payload occupying (row, col), in collection order.
    pub fn payload_at(&self, row: usize, col: usize) -> Option<&Payload> {
        self.payloads.iter().find(|p| p.cell() == Some((row, col)))
    }

    /// Whether one more payload may be added under the configured cap.
    pub fn has_capacity(&self, config: &FieldConfig) -> bool {
        match config.payload_overflow {
            PayloadOverflow::Unbounded => true,
            PayloadOverflow::RejectSpawns => self.payloads.len() < config.max_payload_count,
        }
    }

    /// Add a payload unless the cap refuses it.
    pub fn push(&mut self, payload: Payload, config: &FieldConfig) -> bool {
        if !self.has_capacity(config) {
            debug!(
                live = self.payloads.len(),
                cap = config.max_payload_count,
                "payload cap reached; spawn refused"
            );
            return false;
        }
        self.payloads.push(payload);
        true
    }

    /// Spawn up to `size` payloads on the valid cells nearest to (row, col).
    ///
    /// Valid cells are in bounds, empty, and payload-free, within a search
    /// radius of `ceil(sqrt(size)) + 1`. Values fall off linearly from `value`
    /// at the click to `payload_blob_edge_fraction * value` at the farthest
    /// included cell. Returns how many were spawned; never pads.
    pub fn spawn_blob(
        &mut self,
        grid: &Grid,
        row: usize,
        col: usize,
        size: usize,
        value: u64,
        config: &FieldConfig,
    ) -> usize {
        if size == 0 || grid.get(row, col).is_none() {
            return 0;
        }
        let radius = (size as f64).sqrt().ceil() as i64 + 1;
        let occupied = self.occupied();

        let mut candidates: Vec<(f64, usize, usize)> = Vec::new();
        for dr in -radius..=radius {
            for dc in -radius..=radius {
                let Some((r, c)) = grid.offset(row, col, dr, dc) else {
                    continue;
                };
                let distance = (dr as f64).hypot(dc as f64);
                if distance > radius as f64 {
                    continue;
                }
                if grid.is_empty_cell(r, c) && !occupied.contains(&(r, c)) {
                    candidates.push((distance, r, c));
                }
            }
        }
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0).then((a.1, a.2).cmp(&(b.1, b.2))));
        candidates.truncate(size);

        let max_distance = candidates.iter().map(|c| c.0).fold(0.0, f64::max);
        let falloff = 1.0 - config.payload_blob_edge_fraction;
        let mut spawned = 0;
        for (distance, r, c) in candidates {
            let scale = if max_distance > 0.0 {
                1.0 - falloff * (distance / max_distance)
            } else {
                1.0
            };
            let cell_value = (value as f64 * scale).floor() as u64;
            if !self.push(Payload::new(r, c, cell_value, value), config) {
                break;
            }
            spawned += 1;
        }
        spawned
    }

    /// With probability `random_payload_probability`, drop one payload on a
    /// random row of the rightmost column, if that cell is empty and free.
    pub fn maybe_spawn_passive<R: Rng>(
        &mut self,
        grid: &Grid,
        config: &FieldConfig,
        rng: &mut R,
    ) -> bool {
        if grid.is_empty() || !rng.random_bool(config.random_payload_probability) {
            return false;
        }
        let row = rng.random_range(0..grid.rows());
        let col = grid.cols() - 1;
        if !grid.is_empty_cell(row, col) || self.payload_at(row, col).is_some() {
            return false;
        }
        let value =
            rng.random_range(config.random_payload_min_value..=config.random_payload_max_value);
        self.push(Payload::new(row, col, value, value), config)
    }

    /// Advance every payload one tick, resolving exits and absorptions.
    ///
    /// Only payloads present at the start of the tick move; children released
    /// by absorptions start moving on the next tick. Removals are applied in
    /// reverse index order after the scan.
    pub fn update<R: Rng>(
        &mut self,
        grid: &mut Grid,
        beings: &mut BeingRegistry,
        now: f64,
        config: &FieldConfig,
        rng: &mut R,
    ) -> PayloadTick {
        let mut tick = PayloadTick::default();
        let mut to_remove = Vec::new();
        let live = self.payloads.len();

        for idx in 0..live {
            let payload = &mut self.payloads[idx];
            payload.advance(config.payload_speed);
            let Some((row, col)) = payload.cell() else {
                to_remove.push(idx);
                tick.exited += 1;
                continue;
            };
            let Some(being) = grid.get(row, col).and_then(Cell::being_id) else {
                continue;
            };
            let parent_value = payload.value;
            to_remove.push(idx);
            tick.absorbed += 1;
            beings.mark_consumed(grid, being, now);
            let (children, refused) =
                self.release_children(grid, beings, being, parent_value, config, rng);
            tick.children += children;
            tick.refused += refused;
        }

        for idx in to_remove.into_iter().rev() {
            self.payloads.swap_remove(idx);
        }
        tick
    }

    /// Release split children around the body of `being`. Returns
    /// `(spawned, refused)`.
    fn release_children<R: Rng>(
        &mut self,
        grid: &Grid,
        beings: &BeingRegistry,
        being: BeingId,
        parent_value: u64,
        config: &FieldConfig,
        rng: &mut R,
    ) -> (usize, usize) {
        let Some(being) = beings.get(being) else {
            return (0, 0);
        };
        let count = rng.random_range(config.payload_split_min..=config.payload_split_max);
        let child_value = (parent_value as f64 * config.payload_split_reduction).floor() as u64;
        let occupied = self.occupied();

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for cell in being.body() {
            for (dr, dc) in SPLIT_DIRECTIONS {
                let Some(target) = grid.offset(cell.row, cell.col, dr, dc) else {
                    continue;
                };
                if !seen.insert(target) {
                    continue;
                }
                if grid.is_empty_cell(target.0, target.1) && !occupied.contains(&target) {
                    candidates.push(target);
                }
            }
        }

        let mut spawned = 0;
        while spawned < count && !candidates.is_empty() {
            let pick = rng.random_range(0..candidates.len());
            let (row, col) = candidates.swap_remove(pick);
            if !self.push(Payload::new(row, col, child_value, child_value), config) {
                return (spawned, count - spawned);
            }
            spawned += 1;
        }
        (spawned, 0)
    }
}
