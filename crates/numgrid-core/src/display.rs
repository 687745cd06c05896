//! Read-only per-frame view of the field: value, colour, and label for every
//! cell, resolved from the grid, the payloads, and the scrolling wave texture.

use crate::color::Rgb;
use crate::config::FieldConfig;
use crate::grid::{Cell, Grid};
use crate::noise::NoiseTexture;
use crate::payload::PayloadSystem;
use serde::Serialize;
use std::collections::HashMap;

/// What a cell shows this frame. Only used for classification; the renderer
/// draws from `value`, `color`, and `text`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Empty,
    Wave,
    Body,
    Payload,
}

impl CellKind {
    fn glyph(self) -> char {
        match self {
            CellKind::Empty => '.',
            CellKind::Wave => '~',
            CellKind::Body => '#',
            CellKind::Payload => 'o',
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CellView {
    pub value: u64,
    pub color: Rgb,
    pub text: String,
    pub kind: CellKind,
}

impl CellView {
    fn new(value: u64, color: Rgb, kind: CellKind) -> Self {
        Self {
            value,
            color,
            text: format!("[{value:02}]"),
            kind,
        }
    }
}

/// One frame's worth of cell views, row-major.
#[derive(Clone, Debug, Serialize)]
pub struct FrameSnapshot {
    pub rows: usize,
    pub cols: usize,
    pub fps: f64,
    pub cells: Vec<CellView>,
}

impl FrameSnapshot {
    pub fn get(&self, row: usize, col: usize) -> Option<&CellView> {
        if row < self.rows && col < self.cols {
            self.cells.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// One glyph per cell: `.` empty, `~` wave, `#` Being, `o` payload.
    pub fn to_ascii(&self) -> String {
        let mut out = String::with_capacity(self.rows * (self.cols + 1));
        for row in self.cells.chunks(self.cols.max(1)) {
            out.extend(row.iter().map(|c| c.kind.glyph()));
            out.push('\n');
        }
        out
    }
}

/// Inputs to one read pass.
pub struct DisplayInputs<'a> {
    pub grid: &'a Grid,
    pub payloads: &'a PayloadSystem,
    pub texture: &'a NoiseTexture,
    /// Accumulated scroll offset in cells.
    pub scroll_offset: f64,
    pub hover: Option<(usize, usize)>,
    pub now: f64,
    pub fps: f64,
}

/// Boost applied to an empty cell under a wave, or `None` below the threshold.
pub fn wave_boost(sample: f64, config: &FieldConfig) -> Option<f64> {
    let threshold = config.wave_threshold;
    if sample <= threshold {
        return None;
    }
    let k = (sample - threshold) / (1.0 - threshold);
    let min = config.wave_min_value as f64;
    let peak = config.wave_peak_value as f64;
    Some(min + k * (peak - min))
}

/// Colour of a Being cell, fading from `being_fade_color` back to
/// `being_color` over `consume_fade_duration` after an absorption.
pub fn body_color(consume_time: Option<f64>, now: f64, config: &FieldConfig) -> Rgb {
    let duration = config.consume_fade_duration;
    match consume_time {
        Some(at) if duration > 0.0 && now >= at && now - at < duration => config
            .being_fade_color
            .lerp(config.being_color, (now - at) / duration),
        _ => config.being_color,
    }
}

pub fn resolve(inputs: &DisplayInputs<'_>, config: &FieldConfig) -> FrameSnapshot {
    let grid = inputs.grid;
    // First payload in collection order wins a shared cell.
    let mut overlay = HashMap::new();
    for payload in inputs.payloads.iter() {
        if let Some(cell) = payload.cell() {
            overlay.entry(cell).or_insert(payload);
        }
    }

    let mut cells = Vec::with_capacity(grid.len());
    for row in 0..grid.rows() {
        for col in 0..grid.cols() {
            let Some(cell) = grid.get(row, col) else {
                continue;
            };
            let base = cell.base_value();
            let view = if let Some(payload) = overlay.get(&(row, col)) {
                let t = if payload.center_value == 0 {
                    1.0
                } else {
                    (payload.value as f64 / payload.center_value as f64).min(1.0)
                };
                CellView::new(
                    base.saturating_add(payload.value),
                    config.payload_min_color.lerp(config.payload_max_color, t),
                    CellKind::Payload,
                )
            } else {
                match cell {
                    Cell::Body(body) => CellView::new(
                        base,
                        body_color(body.consume_time, inputs.now, config),
                        CellKind::Body,
                    ),
                    Cell::Empty { .. } => empty_view(inputs, row, col, base, config),
                }
            };
            cells.push(view);
        }
    }

    FrameSnapshot {
        rows: grid.rows(),
        cols: grid.cols(),
        fps: inputs.fps,
        cells,
    }
}

fn empty_view(
    inputs: &DisplayInputs<'_>,
    row: usize,
    col: usize,
    base: u64,
    config: &FieldConfig,
) -> CellView {
    let boost = inputs
        .texture
        .sample(row, col, inputs.scroll_offset)
        .and_then(|sample| wave_boost(sample, config));
    let (value, kind) = match boost {
        Some(boost) => ((base as f64 + boost).floor() as u64, CellKind::Wave),
        None => (base, CellKind::Empty),
    };
    let color = if inputs.hover == Some((row, col)) {
        config.empty_hover_color
    } else {
        let peak = config.wave_peak_value.max(1) as f64;
        config
            .empty_min_color
            .lerp(config.empty_max_color, (value as f64 / peak).min(1.0))
    };
    CellView::new(value, color, kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::being::BeingRegistry;
    use crate::payload::Payload;

    fn flat_texture(rows: usize, cols: usize) -> NoiseTexture {
        // Zero frequency samples a single lattice point everywhere.
        NoiseTexture::generate(rows, cols, 0.0, 0.0, 0)
    }

    fn inputs<'a>(
        grid: &'a Grid,
        payloads: &'a PayloadSystem,
        texture: &'a NoiseTexture,
    ) -> DisplayInputs<'a> {
        DisplayInputs {
            grid,
            payloads,
            texture,
            scroll_offset: 0.0,
            hover: None,
            now: 0.0,
            fps: 0.0,
        }
    }

    fn no_waves() -> FieldConfig {
        FieldConfig {
            wave_threshold: 0.999_999,
            ..FieldConfig::default()
        }
    }

    #[test]
    fn wave_boost_scales_from_min_to_peak() {
        let config = FieldConfig {
            wave_threshold: 0.5,
            wave_min_value: 50,
            wave_peak_value: 300,
            ..FieldConfig::default()
        };
        assert_eq!(wave_boost(0.5, &config), None);
        assert_eq!(wave_boost(0.75, &config), Some(175.0));
        assert_eq!(wave_boost(1.0, &config), Some(300.0));
    }

    #[test]
    fn text_is_zero_padded_and_bracketed() {
        let view = CellView::new(7, Rgb::default(), CellKind::Empty);
        assert_eq!(view.text, "[07]");
        let view = CellView::new(1234, Rgb::default(), CellKind::Body);
        assert_eq!(view.text, "[1234]");
    }

    #[test]
    fn payload_overlay_adds_value_and_uses_gradient() {
        let config = no_waves();
        let grid = Grid::new(2, 3, 4);
        let texture = flat_texture(2, 3);
        let mut payloads = PayloadSystem::new();
        payloads.push(Payload::new(0, 1, 500, 1_000), &config);
        payloads.push(Payload::new(0, 1, 900, 1_000), &config);

        let frame = resolve(&inputs(&grid, &payloads, &texture), &config);
        let cell = frame.get(0, 1).expect("in bounds");
        assert_eq!(cell.value, 504);
        assert_eq!(cell.kind, CellKind::Payload);
        assert_eq!(
            cell.color,
            config.payload_min_color.lerp(config.payload_max_color, 0.5)
        );
    }

    #[test]
    fn waves_boost_free_empty_cells_under_scroll() {
        let config = FieldConfig {
            wave_threshold: 0.0,
            ..FieldConfig::default()
        };
        let grid = Grid::new(2, 3, 4);
        let texture = NoiseTexture::generate(2, 3, 0.37, 0.61, 9);
        let mut payloads = PayloadSystem::new();
        assert!(payloads.push(Payload::new(0, 1, 100, 100), &config));

        let mut saw_wave = false;
        for offset in [0.0, 1.7, 8.2] {
            let mut frame_inputs = inputs(&grid, &payloads, &texture);
            frame_inputs.scroll_offset = offset;
            frame_inputs.hover = Some((1, 2));
            let frame = resolve(&frame_inputs, &config);

            for row in 0..2 {
                for col in 0..3 {
                    let cell = frame.get(row, col).expect("in bounds");
                    if (row, col) == (0, 1) {
                        assert_eq!((cell.value, cell.kind), (104, CellKind::Payload));
                        continue;
                    }
                    let boost = texture
                        .sample(row, col, offset)
                        .and_then(|sample| wave_boost(sample, &config));
                    match boost {
                        Some(boost) => {
                            saw_wave = true;
                            assert_eq!(cell.value, (4.0 + boost).floor() as u64);
                            assert_eq!(cell.kind, CellKind::Wave);
                        }
                        None => {
                            assert_eq!(cell.value, 4);
                            assert_eq!(cell.kind, CellKind::Empty);
                        }
                    }
                    if (row, col) == (1, 2) {
                        assert_eq!(cell.color, config.empty_hover_color);
                    }
                }
            }
        }
        assert!(saw_wave);
    }

    #[test]
    fn hover_only_recolours_empty_cells() {
        let config = no_waves();
        let mut grid = Grid::new(3, 3, 0);
        let mut beings = BeingRegistry::new(0);
        beings
            .place(&mut grid, &[(1, 1)], 5_000, 0.0, 1.0)
            .expect("placement succeeds");
        let texture = flat_texture(3, 3);
        let payloads = PayloadSystem::new();

        let mut hovered = inputs(&grid, &payloads, &texture);
        hovered.hover = Some((0, 0));
        let frame = resolve(&hovered, &config);
        assert_eq!(frame.get(0, 0).map(|c| c.color), Some(config.empty_hover_color));
        assert_eq!(frame.get(0, 1).map(|c| c.color), Some(config.empty_min_color));

        hovered.hover = Some((1, 1));
        let frame = resolve(&hovered, &config);
        assert_eq!(frame.get(1, 1).map(|c| c.color), Some(config.being_color));
        assert_eq!(frame.get(1, 1).map(|c| c.value), Some(5_000));
    }

    #[test]
    fn absorbed_being_fades_back_to_its_colour() {
        let config = FieldConfig {
            consume_fade_duration: 1_000.0,
            ..FieldConfig::default()
        };
        assert_eq!(body_color(Some(0.0), 0.0, &config), config.being_fade_color);
        assert_eq!(
            body_color(Some(0.0), 500.0, &config),
            config.being_fade_color.lerp(config.being_color, 0.5)
        );
        assert_eq!(body_color(Some(0.0), 1_000.0, &config), config.being_color);
        assert_eq!(body_color(None, 10.0, &config), config.being_color);
    }

    #[test]
    fn ascii_dump_has_one_line_per_row() {
        let config = no_waves();
        let mut grid = Grid::new(2, 3, 0);
        let mut beings = BeingRegistry::new(0);
        beings
            .place(&mut grid, &[(0, 0)], 10, 0.0, 1.0)
            .expect("placement succeeds");
        let texture = flat_texture(2, 3);
        let mut payloads = PayloadSystem::new();
        payloads.push(Payload::new(1, 2, 10, 10), &config);

        let frame = resolve(&inputs(&grid, &payloads, &texture), &config);
        assert_eq!(frame.to_ascii(), "#..\n..o\n");
    }
}
