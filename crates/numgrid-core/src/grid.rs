use serde::{Deserialize, Serialize};

/// Index of a Being inside its `BeingRegistry`. Cells refer to Beings only
/// through this handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BeingId(pub u32);

impl BeingId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A grid cell that is part of a Being's body.
#[derive(Clone, Debug, PartialEq)]
pub struct BodyCell {
    /// Current interpolated value shown for this cell.
    pub value: u64,
    pub being: BeingId,
    pub is_center: bool,
    /// Euclidean distance from the Being's center cell.
    pub distance: f64,
    /// Timestamp of the Being's last absorption; only drives the fade colour.
    pub consume_time: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    Empty { base_value: u32 },
    Body(BodyCell),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty { .. })
    }

    pub fn being_id(&self) -> Option<BeingId> {
        match self {
            Cell::Body(body) => Some(body.being),
            Cell::Empty { .. } => None,
        }
    }

    /// Underlying value before any payload or wave overlay.
    pub fn base_value(&self) -> u64 {
        match self {
            Cell::Empty { base_value } => *base_value as u64,
            Cell::Body(body) => body.value,
        }
    }
}

/// Row-major grid of cells.
#[derive(Clone, Debug)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

/// Offsets of the four edge-adjacent neighbours.
pub const NEIGHBORS_4: [(i64, i64); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

impl Grid {
    /// Grid of empty cells, all holding `base_value`.
    pub fn new(rows: usize, cols: usize, base_value: u32) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Empty { base_value }; rows * cols],
        }
    }

    /// Build from row-major empty base values. `None` if the length does not
    /// match the dimensions.
    pub fn from_base_values(rows: usize, cols: usize, values: Vec<u32>) -> Option<Self> {
        if values.len() != rows * cols {
            return None;
        }
        let cells = values
            .into_iter()
            .map(|base_value| Cell::Empty { base_value })
            .collect();
        Some(Self { rows, cols, cells })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    pub fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// Out-of-bounds coordinates are rejected, never clamped.
    pub fn get(&self, row: usize, col: usize) -> Option<&Cell> {
        self.index(row, col).map(|idx| &self.cells[idx])
    }

    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        let idx = self.index(row, col)?;
        Some(&mut self.cells[idx])
    }

    /// Signed lookup for neighbour arithmetic; negative coordinates are `None`.
    pub fn get_signed(&self, row: i64, col: i64) -> Option<&Cell> {
        let row = usize::try_from(row).ok()?;
        let col = usize::try_from(col).ok()?;
        self.get(row, col)
    }

    /// Apply `(dr, dc)` to `(row, col)`, returning the result if it is in bounds.
    pub fn offset(&self, row: usize, col: usize, dr: i64, dc: i64) -> Option<(usize, usize)> {
        let r = usize::try_from(row as i64 + dr).ok()?;
        let c = usize::try_from(col as i64 + dc).ok()?;
        (r < self.rows && c < self.cols).then_some((r, c))
    }

    pub fn is_empty_cell(&self, row: usize, col: usize) -> bool {
        self.get(row, col).is_some_and(Cell::is_empty)
    }

    /// Median base value over all empty cells (upper median for even counts).
    pub fn median_empty_value(&self) -> Option<u32> {
        let mut values: Vec<u32> = self
            .cells
            .iter()
            .filter_map(|cell| match cell {
                Cell::Empty { base_value } => Some(*base_value),
                Cell::Body(_) => None,
            })
            .collect();
        if values.is_empty() {
            return None;
        }
        let mid = values.len() / 2;
        let (_, median, _) = values.select_nth_unstable(mid);
        Some(*median)
    }

    pub fn count_empty(&self) -> usize {
        self.cells.iter().filter(|c| c.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_bounds_lookups() {
        let grid = Grid::new(3, 4, 1);
        assert!(grid.get(2, 3).is_some());
        assert!(grid.get(3, 0).is_none());
        assert!(grid.get(0, 4).is_none());
        assert!(grid.get_signed(-1, 0).is_none());
        assert!(grid.get_signed(0, -1).is_none());
        assert_eq!(grid.offset(0, 0, -1, 0), None);
        assert_eq!(grid.offset(1, 1, 1, 2), Some((2, 3)));
    }

    #[test]
    fn from_base_values_checks_length() {
        assert!(Grid::from_base_values(2, 2, vec![0; 3]).is_none());
        let grid = Grid::from_base_values(2, 2, vec![1, 2, 3, 4]).expect("length matches");
        assert_eq!(grid.get(1, 0).map(Cell::base_value), Some(3));
    }

    #[test]
    fn median_ignores_body_cells() {
        let mut grid = Grid::from_base_values(1, 4, vec![1, 5, 9, 2]).expect("length matches");
        *grid.get_mut(0, 2).expect("in bounds") = Cell::Body(BodyCell {
            value: 1_000,
            being: BeingId(0),
            is_center: true,
            distance: 0.0,
            consume_time: None,
        });
        // Remaining empties: 1, 5, 2 -> median 2.
        assert_eq!(grid.median_empty_value(), Some(2));
        assert_eq!(grid.count_empty(), 3);
    }
}
