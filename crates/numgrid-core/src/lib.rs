pub mod being;
pub mod color;
pub mod config;
pub mod constants;
pub mod display;
pub mod fluctuation;
pub mod fps;
pub mod genesis;
pub mod grid;
pub mod metrics;
pub mod noise;
pub mod payload;
pub mod rng;
pub mod world;

pub use config::{FieldConfig, FieldConfigError, PayloadOverflow};
pub use display::{CellKind, CellView, FrameSnapshot};
pub use metrics::{FrameMetrics, RunSummary};
pub use world::{BeingLayout, FrameReport, FrameTimings, RunError, World, WorldInitError};
