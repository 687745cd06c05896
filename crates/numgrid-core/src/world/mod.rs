use crate::being::BeingRegistry;
use crate::config::{FieldConfig, FieldConfigError};
use crate::constants::{GENESIS_STREAM, SIMULATION_STREAM};
use crate::display::{self, DisplayInputs, FrameSnapshot};
use crate::fps::FpsCounter;
use crate::genesis;
use crate::grid::{Cell, Grid};
use crate::metrics::{FrameMetrics, RunSummary};
use crate::noise::NoiseTexture;
use crate::payload::{Payload, PayloadSystem};
use crate::rng::derive_stream;
use rand::Rng;
use rand_chacha::ChaCha12Rng;
use std::time::Instant;
use std::{error::Error, fmt};
use tracing::{debug, info};

#[derive(Clone, Debug, Default)]
pub struct FrameTimings {
    pub scroll_us: u64,
    pub growth_us: u64,
    pub fluctuation_us: u64,
    pub payload_us: u64,
    pub total_us: u64,
}

/// Outcome of one admitted frame.
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub timings: FrameTimings,
    pub metrics: FrameMetrics,
}

/// A Being supplied explicitly instead of generated from noise.
#[derive(Clone, Debug)]
pub struct BeingLayout {
    /// Body cells; the first one is the center.
    pub body: Vec<(usize, usize)>,
    pub value: u64,
    pub growth_delay: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WorldInitError {
    Config(FieldConfigError),
    NonFiniteStartTime,
    LayoutMismatch { expected: usize, actual: usize },
    InvalidBeingLayout { index: usize },
}

impl fmt::Display for WorldInitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldInitError::Config(e) => write!(f, "{}", e),
            WorldInitError::NonFiniteStartTime => write!(f, "start_time must be finite"),
            WorldInitError::LayoutMismatch { expected, actual } => write!(
                f,
                "base_values.len() ({actual}) must match grid_rows * grid_cols ({expected})"
            ),
            WorldInitError::InvalidBeingLayout { index } => write!(
                f,
                "being layout {index} is empty, out of bounds, or overlaps another Being"
            ),
        }
    }
}

impl From<FieldConfigError> for WorldInitError {
    fn from(err: FieldConfigError) -> Self {
        WorldInitError::Config(err)
    }
}

impl Error for WorldInitError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            WorldInitError::Config(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    InvalidSampleEvery,
    TooManyFrames { max: usize, actual: usize },
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::InvalidSampleEvery => write!(f, "sample_every must be positive"),
            RunError::TooManyFrames { max, actual } => {
                write!(f, "frames ({actual}) exceed supported maximum ({max})")
            }
        }
    }
}

impl Error for RunError {}

/// The whole simulated field: grid, Beings, payloads, wave texture, and the
/// frame clock.
pub struct World {
    config: FieldConfig,
    grid: Grid,
    beings: BeingRegistry,
    payloads: PayloadSystem,
    texture: NoiseTexture,
    scroll_offset: f64,
    rng: ChaCha12Rng,
    fps: FpsCounter,
    hover: Option<(usize, usize)>,
    last_frame: Option<f64>,
    frame_index: usize,
    beings_requested: usize,
    beings_dropped: usize,
}

impl World {
    pub const MAX_RUN_FRAMES: usize = 10_000_000;

    /// Generate a world from `config.seed` with the clock starting at 0 ms.
    pub fn new(config: FieldConfig) -> Result<Self, WorldInitError> {
        Self::with_start_time(config, 0.0)
    }

    /// Generate a world whose Being growth timers start at `start_time`.
    pub fn with_start_time(config: FieldConfig, start_time: f64) -> Result<Self, WorldInitError> {
        config.validate()?;
        if !start_time.is_finite() {
            return Err(WorldInitError::NonFiniteStartTime);
        }
        let mut genesis_rng = derive_stream(config.seed, GENESIS_STREAM);
        let genesis = genesis::generate(&config, &mut genesis_rng, start_time);
        Ok(Self::assemble(
            config,
            genesis.grid,
            genesis.beings,
            genesis.requested,
            genesis.dropped,
        ))
    }

    /// Build a world from explicit empty-cell values and Being bodies.
    ///
    /// Body gradients fade toward the median of the empty cells, as in a
    /// generated world. Separation between Beings is not enforced here.
    pub fn from_layout(
        config: FieldConfig,
        base_values: Vec<u32>,
        layouts: &[BeingLayout],
        start_time: f64,
    ) -> Result<Self, WorldInitError> {
        config.validate()?;
        if !start_time.is_finite() {
            return Err(WorldInitError::NonFiniteStartTime);
        }
        let expected = config.grid_rows * config.grid_cols;
        let actual = base_values.len();
        let mut grid = Grid::from_base_values(config.grid_rows, config.grid_cols, base_values)
            .ok_or(WorldInitError::LayoutMismatch { expected, actual })?;
        for cell in grid.cells_mut() {
            if let Cell::Empty { base_value } = cell {
                *base_value = (*base_value).clamp(config.empty_min_value, config.empty_max_value);
            }
        }

        let edge_value = grid.median_empty_value().unwrap_or(config.empty_min_value);
        let mut beings = BeingRegistry::new(edge_value as u64);
        for (index, layout) in layouts.iter().enumerate() {
            let value = layout.value.min(config.being_max_value);
            beings
                .place(&mut grid, &layout.body, value, start_time, layout.growth_delay)
                .ok_or(WorldInitError::InvalidBeingLayout { index })?;
        }
        Ok(Self::assemble(config, grid, beings, layouts.len(), 0))
    }

    fn assemble(
        config: FieldConfig,
        grid: Grid,
        beings: BeingRegistry,
        beings_requested: usize,
        beings_dropped: usize,
    ) -> Self {
        let texture = NoiseTexture::generate(
            config.grid_rows,
            config.grid_cols,
            config.noise_scale_x,
            config.noise_scale_y,
            config.seed,
        );
        let fps = FpsCounter::new(config.fps_update_interval);
        let rng = derive_stream(config.seed, SIMULATION_STREAM);
        Self {
            grid,
            beings,
            payloads: PayloadSystem::new(),
            texture,
            scroll_offset: 0.0,
            rng,
            fps,
            hover: None,
            last_frame: None,
            frame_index: 0,
            beings_requested,
            beings_dropped,
            config,
        }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn beings(&self) -> &BeingRegistry {
        &self.beings
    }

    pub fn payloads(&self) -> &PayloadSystem {
        &self.payloads
    }

    pub fn texture(&self) -> &NoiseTexture {
        &self.texture
    }

    /// Accumulated wave scroll, in cells, wrapped to the texture width.
    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn fps(&self) -> f64 {
        self.fps.fps()
    }

    pub fn hover(&self) -> Option<(usize, usize)> {
        self.hover
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn last_frame_time(&self) -> Option<f64> {
        self.last_frame
    }

    pub fn beings_requested(&self) -> usize {
        self.beings_requested
    }

    pub fn beings_dropped(&self) -> usize {
        self.beings_dropped
    }

    /// Whether a frame at `timestamp` would be admitted by the frame cap.
    pub fn admits(&self, timestamp: f64) -> bool {
        match self.last_frame {
            Some(last) => timestamp - last >= self.config.frame_interval() - 1.0,
            None => true,
        }
    }

    /// Drive one frame at `timestamp` (ms). Frames arriving faster than
    /// `max_fps` are dropped without touching any state.
    pub fn frame(&mut self, timestamp: f64) -> Option<FrameReport> {
        if !self.admits(timestamp) {
            return None;
        }
        self.last_frame = Some(timestamp);
        self.fps.tick(timestamp);
        Some(self.step(timestamp))
    }

    /// Run one update pass at `now`, bypassing the frame cap.
    pub fn step(&mut self, now: f64) -> FrameReport {
        let total_start = Instant::now();
        self.frame_index = self.frame_index.saturating_add(1);
        let mut metrics = FrameMetrics {
            frame: self.frame_index,
            timestamp: now,
            ..FrameMetrics::default()
        };

        let t0 = Instant::now();
        self.step_scroll_phase();
        let scroll_us = t0.elapsed().as_micros() as u64;

        let t1 = Instant::now();
        self.step_growth_phase(now, &mut metrics);
        let growth_us = t1.elapsed().as_micros() as u64;

        let t2 = Instant::now();
        self.step_fluctuation_phase(&mut metrics);
        let fluctuation_us = t2.elapsed().as_micros() as u64;

        let t3 = Instant::now();
        self.step_payload_phase(now, &mut metrics);
        let payload_us = t3.elapsed().as_micros() as u64;

        metrics.payload_count = self.payloads.len();
        metrics.being_count = self.beings.len();
        metrics.total_being_value = self.beings.total_value();
        metrics.fps = self.fps.fps();

        FrameReport {
            timings: FrameTimings {
                scroll_us,
                growth_us,
                fluctuation_us,
                payload_us,
                total_us: total_start.elapsed().as_micros() as u64,
            },
            metrics,
        }
    }

    /// Read pass: resolve every cell's value, colour, and label at `now`.
    pub fn snapshot(&self, now: f64) -> FrameSnapshot {
        let inputs = DisplayInputs {
            grid: &self.grid,
            payloads: &self.payloads,
            texture: &self.texture,
            scroll_offset: self.scroll_offset,
            hover: self.hover,
            now,
            fps: self.fps.fps(),
        };
        display::resolve(&inputs, &self.config)
    }

    /// Set the hovered cell. Out-of-bounds coordinates clear the hover.
    pub fn set_hover(&mut self, cell: Option<(usize, usize)>) {
        self.hover = cell.filter(|&(row, col)| self.grid.get(row, col).is_some());
    }

    /// Spawn a click blob of random size and value around (row, col).
    /// Out-of-bounds clicks are ignored. Returns the number of payloads spawned.
    pub fn click(&mut self, row: usize, col: usize) -> usize {
        if self.grid.get(row, col).is_none() {
            return 0;
        }
        let size = self
            .rng
            .random_range(self.config.payload_blob_min_size..=self.config.payload_blob_max_size);
        let value = self
            .rng
            .random_range(self.config.payload_min_value..=self.config.payload_max_value);
        let spawned = self.spawn_blob(row, col, size, value);
        debug!(row, col, size, value, spawned, "click blob");
        spawned
    }

    /// Spawn a blob with an explicit size and center value.
    pub fn spawn_blob(&mut self, row: usize, col: usize, size: usize, value: u64) -> usize {
        self.payloads.spawn_blob(&self.grid, row, col, size, value, &self.config)
    }

    /// Place a single payload. Fails when the cell is out of bounds, part of a
    /// Being, already holds a payload, or the payload cap refuses it.
    pub fn spawn_payload(&mut self, row: usize, col: usize, value: u64) -> bool {
        if !self.grid.is_empty_cell(row, col) || self.payloads.payload_at(row, col).is_some() {
            return false;
        }
        self.payloads.push(Payload::new(row, col, value, value), &self.config)
    }

    /// Drive `frames` admitted frames spaced exactly one frame interval apart,
    /// sampling metrics every `sample_every` frames and on the last frame.
    pub fn run_frames(&mut self, frames: usize, sample_every: usize) -> Result<RunSummary, RunError> {
        if sample_every == 0 {
            return Err(RunError::InvalidSampleEvery);
        }
        if frames > Self::MAX_RUN_FRAMES {
            return Err(RunError::TooManyFrames {
                max: Self::MAX_RUN_FRAMES,
                actual: frames,
            });
        }

        let interval = self.config.frame_interval();
        let mut now = self.last_frame.map_or(0.0, |last| last + interval);
        let mut samples = Vec::new();
        let mut total_absorptions = 0;
        let mut total_children_spawned = 0;
        let mut total_refused_spawns = 0;
        let mut total_update_us = 0u64;
        for frame in 1..=frames {
            let Some(report) = self.frame(now) else {
                now += interval;
                continue;
            };
            total_absorptions += report.metrics.absorptions;
            total_children_spawned += report.metrics.children_spawned;
            total_refused_spawns += report.metrics.refused_spawns;
            total_update_us = total_update_us.saturating_add(report.timings.total_us);
            if frame % sample_every == 0 || frame == frames {
                samples.push(report.metrics);
            }
            now += interval;
        }

        info!(
            frames,
            payloads = self.payloads.len(),
            beings = self.beings.len(),
            total_absorptions,
            "run finished"
        );

        Ok(RunSummary {
            schema_version: 1,
            seed: self.config.seed,
            frames,
            sample_every,
            beings_requested: self.beings_requested,
            beings_placed: self.beings.len(),
            final_payload_count: self.payloads.len(),
            final_total_being_value: self.beings.total_value(),
            total_absorptions,
            total_children_spawned,
            total_refused_spawns,
            total_update_us,
            samples,
        })
    }
}

mod phases;
