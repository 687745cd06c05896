/// Largest supported cell count (`grid_rows * grid_cols`). Keeps the
/// per-frame scans and the 3x-wide noise texture within a sane memory budget.
pub const MAX_GRID_CELLS: usize = 1 << 22;

/// Prime multiplier used to derive independent RNG streams from a base seed.
pub const RNG_DERIVATION_PRIME: u64 = 7919;

/// Stream index for world generation (growth delays at construction).
pub const GENESIS_STREAM: u64 = 1;
/// Stream index for the per-frame simulation (growth, fluctuation, payloads, clicks).
pub const SIMULATION_STREAM: u64 = 2;

/// Linear congruential recurrence behind `noise::value_noise`.
pub const LCG_MULTIPLIER: u64 = 9301;
pub const LCG_INCREMENT: u64 = 49297;
pub const LCG_MODULUS: u64 = 233_280;

/// Lattice hash constants behind `noise::smooth_noise_2d`.
pub const HASH_PRIME_X: i64 = 374_761_393;
pub const HASH_PRIME_Y: i64 = 668_265_263;
pub const HASH_MODULUS: i64 = 2_147_483_647;

/// The noise texture is this many grid widths wide so the scroll offset can
/// wrap without a visible seam inside the viewport.
pub const TEXTURE_WIDTH_FACTOR: usize = 3;

/// Amplitude of the three-lobed angular modulation of a Being's body radius.
pub const BODY_LOBE_AMPLITUDE: f64 = 0.25;
/// Number of lobes around a Being's body outline.
pub const BODY_LOBE_COUNT: f64 = 3.0;
/// Peak-to-peak amplitude of the per-cell noise perturbation of the body radius.
pub const BODY_PERTURBATION: f64 = 0.3;

/// Exponent of the convex remap applied to noise when seeding empty-cell values.
pub const EMPTY_VALUE_EXPONENT: f64 = 2.5;
