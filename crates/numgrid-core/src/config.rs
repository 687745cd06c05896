use crate::color::Rgb;
use serde::{Deserialize, Serialize};

/// What happens to new payloads once `max_payload_count` are alive.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PayloadOverflow {
    /// Refuse new payloads (click blobs, split children, passive spawns) while
    /// the collection is at capacity. Live payloads are never evicted.
    #[default]
    RejectSpawns,
    /// Never enforce `max_payload_count`; the collection grows without bound.
    Unbounded,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Session seed. Every layout and every stochastic draw derives from it.
    pub seed: u64,
    /// Number of grid rows.
    pub grid_rows: usize,
    /// Number of grid columns.
    pub grid_cols: usize,
    /// Width of one cell in renderer pixels; converts the wave scroll speed to cells.
    pub cell_width: f64,
    /// Requested number of Beings. Fewer may be placed when shapes collide.
    pub beings_count: usize,
    /// Shape attempts per Being slot before the slot is dropped.
    pub being_placement_retries: usize,
    /// Fewest digits of a freshly generated Being core value.
    pub being_min_digits: u32,
    /// Most digits of a freshly generated Being core value.
    pub being_max_digits: u32,
    /// Ceiling on a Being's value.
    pub being_max_value: u64,
    /// Smallest body (cells, center included).
    pub being_body_min_size: usize,
    /// Largest body (cells, center included).
    pub being_body_max_size: usize,
    /// Probability that a Being gets a single-cell body.
    pub being_single_cell_chance: f64,
    /// Shortest growth delay in milliseconds.
    pub growth_min_interval: f64,
    /// Longest growth delay in milliseconds.
    pub growth_max_interval: f64,
    /// Largest growth amount per firing.
    pub growth_max_points: u64,
    /// Relative weight of a zero-point firing against `growth_max_points`.
    pub growth_no_growth_weight: f64,
    /// Lower clamp of an empty cell's base value.
    pub empty_min_value: u32,
    /// Upper clamp of an empty cell's base value.
    pub empty_max_value: u32,
    /// Per-frame probability that an empty cell takes a random-walk step.
    pub empty_fluctuation_probability: f64,
    /// Wave scroll speed in renderer pixels per frame.
    pub noise_scroll_speed: f64,
    /// Noise texture frequency along columns.
    pub noise_scale_x: f64,
    /// Noise texture frequency along rows.
    pub noise_scale_y: f64,
    /// Texture samples above this value raise a wave over empty cells.
    pub wave_threshold: f64,
    /// Boost at the crest of a wave.
    pub wave_peak_value: u64,
    /// Boost just above the threshold.
    pub wave_min_value: u64,
    /// Lower bound of a click-spawned payload value.
    pub payload_min_value: u64,
    /// Upper bound of a click-spawned payload value.
    pub payload_max_value: u64,
    /// Columns travelled per frame.
    pub payload_speed: f64,
    /// Fewest children released when a Being absorbs a payload.
    pub payload_split_min: usize,
    /// Most children released when a Being absorbs a payload.
    pub payload_split_max: usize,
    /// Child value as a fraction of the absorbed payload's value.
    pub payload_split_reduction: f64,
    /// Value fraction kept at the outer edge of a click blob.
    pub payload_blob_edge_fraction: f64,
    /// Fewest cells in a click blob.
    pub payload_blob_min_size: usize,
    /// Most cells in a click blob.
    pub payload_blob_max_size: usize,
    /// Live-payload cap applied according to `payload_overflow`.
    pub max_payload_count: usize,
    /// Cap policy.
    pub payload_overflow: PayloadOverflow,
    /// Per-frame probability of a passive spawn on the rightmost column.
    pub random_payload_probability: f64,
    /// Lower bound of a passive payload value.
    pub random_payload_min_value: u64,
    /// Upper bound of a passive payload value.
    pub random_payload_max_value: u64,
    /// Duration of the absorption fade on a Being, in milliseconds.
    pub consume_fade_duration: f64,
    /// Frame-rate cap. Frames arriving faster are dropped.
    pub max_fps: f64,
    /// Interval between FPS readout refreshes, in milliseconds.
    pub fps_update_interval: f64,
    pub being_color: Rgb,
    /// Colour a Being flashes to right after absorbing a payload.
    pub being_fade_color: Rgb,
    /// Empty-cell colour at value 0.
    pub empty_min_color: Rgb,
    /// Empty-cell colour at `wave_peak_value` and above.
    pub empty_max_color: Rgb,
    pub empty_hover_color: Rgb,
    /// Payload colour at the faint edge of a blob.
    pub payload_min_color: Rgb,
    /// Payload colour at the centre of a blob.
    pub payload_max_color: Rgb,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            grid_rows: 135,
            grid_cols: 192,
            cell_width: 50.0,
            beings_count: 100,
            being_placement_retries: 8,
            being_min_digits: 7,
            being_max_digits: 10,
            being_max_value: 9_999_999_999,
            being_body_min_size: 1,
            being_body_max_size: 20,
            being_single_cell_chance: 0.15,
            growth_min_interval: 1_000.0,
            growth_max_interval: 10_000.0,
            growth_max_points: 9,
            growth_no_growth_weight: 3.0,
            empty_min_value: 0,
            empty_max_value: 9,
            empty_fluctuation_probability: 0.0017,
            noise_scroll_speed: 2.0,
            noise_scale_x: 0.08,
            noise_scale_y: 0.015,
            wave_threshold: 0.7,
            wave_peak_value: 300,
            wave_min_value: 50,
            payload_min_value: 100,
            payload_max_value: 900,
            payload_speed: 0.04,
            payload_split_min: 1,
            payload_split_max: 3,
            payload_split_reduction: 0.3,
            payload_blob_edge_fraction: 0.3,
            payload_blob_min_size: 1,
            payload_blob_max_size: 10,
            max_payload_count: 500,
            payload_overflow: PayloadOverflow::RejectSpawns,
            random_payload_probability: 0.001,
            random_payload_min_value: 20,
            random_payload_max_value: 150,
            consume_fade_duration: 5_000.0,
            max_fps: 60.0,
            fps_update_interval: 100.0,
            being_color: Rgb::new(255, 146, 29),
            being_fade_color: Rgb::new(255, 255, 100),
            empty_min_color: Rgb::new(70, 70, 70),
            empty_max_color: Rgb::new(140, 140, 140),
            empty_hover_color: Rgb::new(200, 200, 200),
            payload_min_color: Rgb::new(40, 40, 120),
            payload_max_color: Rgb::new(150, 150, 255),
        }
    }
}

macro_rules! define_field_config_error {
    (
        $(
            $variant:ident $( { $($field:ident : $type:ty),* } )? => $fmt:literal $(, $arg:expr)*
        );* $(;)?
    ) => {
        #[derive(Debug, Clone, PartialEq)]
        pub enum FieldConfigError {
            $(
                $variant $( { $($field : $type),* } )?,
            )*
        }

        impl std::fmt::Display for FieldConfigError {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(
                        Self::$variant $( { $($field),* } )? => write!(f, $fmt $(, $arg)*),
                    )*
                }
            }
        }
    };
}

define_field_config_error! {
    InvalidGridDimensions => "grid_rows and grid_cols must be greater than 0";
    GridTooLarge { max: usize, actual: usize } => "grid cell count ({actual}) exceeds supported maximum ({max})";
    InvalidCellWidth => "cell_width must be positive and finite";
    InvalidBeingDigits => "being_min_digits/being_max_digits must be within [1,19] and ordered";
    InvalidBeingMaxValue => "being_max_value must be positive";
    InvalidBeingBodySize => "being_body_min_size/being_body_max_size must be positive and ordered";
    InvalidBeingSingleCellChance => "being_single_cell_chance must be finite and within [0,1]";
    InvalidGrowthInterval => "growth_min_interval/growth_max_interval must be finite, non-negative, and ordered";
    InvalidGrowthNoGrowthWeight => "growth_no_growth_weight must be finite and non-negative";
    InvalidEmptyValueRange => "empty_min_value must be less than or equal to empty_max_value";
    InvalidEmptyFluctuationProbability => "empty_fluctuation_probability must be finite and within [0,1]";
    InvalidNoiseScrollSpeed => "noise_scroll_speed must be finite and non-negative";
    InvalidNoiseScale => "noise_scale_x and noise_scale_y must be finite and non-negative";
    InvalidWaveThreshold => "wave_threshold must be finite and within [0,1)";
    InvalidWaveRange => "wave_min_value must be less than or equal to wave_peak_value";
    InvalidPayloadValueRange => "payload_min_value/payload_max_value must be positive and ordered";
    InvalidPayloadSpeed => "payload_speed must be positive and finite";
    InvalidPayloadSplitRange => "payload_split_min must be less than or equal to payload_split_max";
    InvalidPayloadSplitReduction => "payload_split_reduction must be finite and within [0,1]";
    InvalidPayloadBlobEdgeFraction => "payload_blob_edge_fraction must be finite and within [0,1]";
    InvalidPayloadBlobSize => "payload_blob_min_size/payload_blob_max_size must be positive and ordered";
    InvalidRandomPayloadProbability => "random_payload_probability must be finite and within [0,1]";
    InvalidRandomPayloadValueRange => "random_payload_min_value must be less than or equal to random_payload_max_value";
    InvalidConsumeFadeDuration => "consume_fade_duration must be finite and non-negative";
    InvalidMaxFps => "max_fps must be positive and finite";
    InvalidFpsUpdateInterval => "fps_update_interval must be positive and finite";
}

impl std::error::Error for FieldConfigError {}

impl FieldConfig {
    pub const MAX_GRID_CELLS: usize = crate::constants::MAX_GRID_CELLS;

    /// Largest digit count whose powers of ten still fit in a `u64`.
    pub const MAX_BEING_DIGITS: u32 = 19;

    pub fn validate(&self) -> Result<(), FieldConfigError> {
        self.validate_grid()?;
        self.validate_beings()?;
        self.validate_growth()?;
        self.validate_empty_cells()?;
        self.validate_waves()?;
        self.validate_payloads()?;
        self.validate_frame()?;
        Ok(())
    }

    /// Minimum spacing between admitted frames, in milliseconds.
    pub fn frame_interval(&self) -> f64 {
        1000.0 / self.max_fps
    }

    /// Wave scroll advance per frame, in cells.
    pub fn scroll_per_frame(&self) -> f64 {
        self.noise_scroll_speed / self.cell_width
    }

    fn validate_grid(&self) -> Result<(), FieldConfigError> {
        if self.grid_rows == 0 || self.grid_cols == 0 {
            return Err(FieldConfigError::InvalidGridDimensions);
        }
        let cells = self.grid_rows.checked_mul(self.grid_cols).ok_or(
            FieldConfigError::GridTooLarge {
                max: Self::MAX_GRID_CELLS,
                actual: usize::MAX,
            },
        )?;
        if cells > Self::MAX_GRID_CELLS {
            return Err(FieldConfigError::GridTooLarge {
                max: Self::MAX_GRID_CELLS,
                actual: cells,
            });
        }
        if !(self.cell_width.is_finite() && self.cell_width > 0.0) {
            return Err(FieldConfigError::InvalidCellWidth);
        }
        Ok(())
    }

    fn validate_beings(&self) -> Result<(), FieldConfigError> {
        if !(self.being_min_digits >= 1
            && self.being_max_digits <= Self::MAX_BEING_DIGITS
            && self.being_min_digits <= self.being_max_digits)
        {
            return Err(FieldConfigError::InvalidBeingDigits);
        }
        if self.being_max_value == 0 {
            return Err(FieldConfigError::InvalidBeingMaxValue);
        }
        if !(self.being_body_min_size >= 1
            && self.being_body_min_size <= self.being_body_max_size)
        {
            return Err(FieldConfigError::InvalidBeingBodySize);
        }
        if !(self.being_single_cell_chance.is_finite()
            && (0.0..=1.0).contains(&self.being_single_cell_chance))
        {
            return Err(FieldConfigError::InvalidBeingSingleCellChance);
        }
        Ok(())
    }

    fn validate_growth(&self) -> Result<(), FieldConfigError> {
        if !(self.growth_min_interval.is_finite()
            && self.growth_max_interval.is_finite()
            && self.growth_min_interval >= 0.0
            && self.growth_min_interval <= self.growth_max_interval)
        {
            return Err(FieldConfigError::InvalidGrowthInterval);
        }
        if !(self.growth_no_growth_weight.is_finite() && self.growth_no_growth_weight >= 0.0) {
            return Err(FieldConfigError::InvalidGrowthNoGrowthWeight);
        }
        Ok(())
    }

    fn validate_empty_cells(&self) -> Result<(), FieldConfigError> {
        if self.empty_min_value > self.empty_max_value {
            return Err(FieldConfigError::InvalidEmptyValueRange);
        }
        if !(self.empty_fluctuation_probability.is_finite()
            && (0.0..=1.0).contains(&self.empty_fluctuation_probability))
        {
            return Err(FieldConfigError::InvalidEmptyFluctuationProbability);
        }
        Ok(())
    }

    fn validate_waves(&self) -> Result<(), FieldConfigError> {
        if !(self.noise_scroll_speed.is_finite() && self.noise_scroll_speed >= 0.0) {
            return Err(FieldConfigError::InvalidNoiseScrollSpeed);
        }
        if !(self.noise_scale_x.is_finite()
            && self.noise_scale_y.is_finite()
            && self.noise_scale_x >= 0.0
            && self.noise_scale_y >= 0.0)
        {
            return Err(FieldConfigError::InvalidNoiseScale);
        }
        if !(self.wave_threshold.is_finite() && (0.0..1.0).contains(&self.wave_threshold)) {
            return Err(FieldConfigError::InvalidWaveThreshold);
        }
        if self.wave_min_value > self.wave_peak_value {
            return Err(FieldConfigError::InvalidWaveRange);
        }
        Ok(())
    }

    fn validate_payloads(&self) -> Result<(), FieldConfigError> {
        if !(self.payload_min_value > 0 && self.payload_min_value <= self.payload_max_value) {
            return Err(FieldConfigError::InvalidPayloadValueRange);
        }
        if !(self.payload_speed.is_finite() && self.payload_speed > 0.0) {
            return Err(FieldConfigError::InvalidPayloadSpeed);
        }
        if self.payload_split_min > self.payload_split_max {
            return Err(FieldConfigError::InvalidPayloadSplitRange);
        }
        if !(self.payload_split_reduction.is_finite()
            && (0.0..=1.0).contains(&self.payload_split_reduction))
        {
            return Err(FieldConfigError::InvalidPayloadSplitReduction);
        }
        if !(self.payload_blob_edge_fraction.is_finite()
            && (0.0..=1.0).contains(&self.payload_blob_edge_fraction))
        {
            return Err(FieldConfigError::InvalidPayloadBlobEdgeFraction);
        }
        if !(self.payload_blob_min_size >= 1
            && self.payload_blob_min_size <= self.payload_blob_max_size)
        {
            return Err(FieldConfigError::InvalidPayloadBlobSize);
        }
        if !(self.random_payload_probability.is_finite()
            && (0.0..=1.0).contains(&self.random_payload_probability))
        {
            return Err(FieldConfigError::InvalidRandomPayloadProbability);
        }
        if self.random_payload_min_value > self.random_payload_max_value {
            return Err(FieldConfigError::InvalidRandomPayloadValueRange);
        }
        if !(self.consume_fade_duration.is_finite() && self.consume_fade_duration >= 0.0) {
            return Err(FieldConfigError::InvalidConsumeFadeDuration);
        }
        Ok(())
    }

    fn validate_frame(&self) -> Result<(), FieldConfigError> {
        if !(self.max_fps.is_finite() && self.max_fps > 0.0) {
            return Err(FieldConfigError::InvalidMaxFps);
        }
        if !(self.fps_update_interval.is_finite() && self.fps_update_interval > 0.0) {
            return Err(FieldConfigError::InvalidFpsUpdateInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_default() {
        let config = FieldConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_invalid_grid() {
        let config = FieldConfig {
            grid_rows: 0,
            ..FieldConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(FieldConfigError::InvalidGridDimensions)
        );

        let config = FieldConfig {
            grid_rows: FieldConfig::MAX_GRID_CELLS,
            grid_cols: 2,
            ..FieldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FieldConfigError::GridTooLarge { .. })
        ));

        let config = FieldConfig {
            grid_rows: usize::MAX,
            grid_cols: 2,
            ..FieldConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(FieldConfigError::GridTooLarge { .. })
        ));
    }

    #[test]
    fn validate_rejects_unordered_ranges() {
        let config = FieldConfig {
            empty_min_value: 5,
            empty_max_value: 4,
            ..FieldConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(FieldConfigError::InvalidEmptyValueRange)
        );

        let config = FieldConfig {
            payload_split_min: 4,
            payload_split_max: 3,
            ..FieldConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(FieldConfigError::InvalidPayloadSplitRange)
        );

        let config = FieldConfig {
            growth_min_interval: 2_000.0,
            growth_max_interval: 1_000.0,
            ..FieldConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(FieldConfigError::InvalidGrowthInterval)
        );
    }

    #[test]
    fn validate_rejects_bad_probabilities() {
        let config = FieldConfig {
            empty_fluctuation_probability: 1.5,
            ..FieldConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(FieldConfigError::InvalidEmptyFluctuationProbability)
        );

        let config = FieldConfig {
            random_payload_probability: f64::NAN,
            ..FieldConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(FieldConfigError::InvalidRandomPayloadProbability)
        );

        let config = FieldConfig {
            wave_threshold: 1.0,
            ..FieldConfig::default()
        };
        assert_eq!(config.validate(), Err(FieldConfigError::InvalidWaveThreshold));
    }

    #[test]
    fn validate_rejects_bad_digits_and_frame_cap() {
        let config = FieldConfig {
            being_max_digits: 20,
            ..FieldConfig::default()
        };
        assert_eq!(config.validate(), Err(FieldConfigError::InvalidBeingDigits));

        let config = FieldConfig {
            max_fps: 0.0,
            ..FieldConfig::default()
        };
        assert_eq!(config.validate(), Err(FieldConfigError::InvalidMaxFps));
    }

    #[test]
    fn derived_frame_quantities() {
        let config = FieldConfig::default();
        assert!((config.frame_interval() - 1000.0 / 60.0).abs() < 1e-12);
        assert!((config.scroll_per_frame() - 0.04).abs() < 1e-12);
    }

    #[test]
    fn deserialize_rejects_unknown_overflow_mode() {
        let invalid_json = r#"{ "payload_overflow": "evict_oldest" }"#;
        let result = serde_json::from_str::<FieldConfig>(invalid_json);
        assert!(
            result.is_err(),
            "unknown overflow mode should fail during deserialization"
        );
    }

    #[test]
    fn partial_config_json_deserializes_with_defaults() {
        let partial_json = r#"{
            "seed": 7,
            "grid_rows": 20,
            "grid_cols": 30,
            "payload_overflow": "unbounded",
            "being_color": { "r": 1, "g": 2, "b": 3 }
        }"#;
        let cfg: FieldConfig =
            serde_json::from_str(partial_json).expect("partial config should parse");
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.grid_rows, 20);
        assert_eq!(cfg.grid_cols, 30);
        assert_eq!(cfg.payload_overflow, PayloadOverflow::Unbounded);
        assert_eq!(cfg.being_color, Rgb::new(1, 2, 3));
        assert_eq!(cfg.beings_count, 100);
        assert_eq!(cfg.empty_max_value, 9);
        assert_eq!(cfg.payload_split_reduction, 0.3);
        assert_eq!(cfg.max_payload_count, 500);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn error_display_messages_are_preserved() {
        let cases = vec![
            (
                FieldConfigError::InvalidGridDimensions,
                "grid_rows and grid_cols must be greater than 0",
            ),
            (
                FieldConfigError::GridTooLarge {
                    max: 100,
                    actual: 200,
                },
                "grid cell count (200) exceeds supported maximum (100)",
            ),
            (
                FieldConfigError::InvalidBeingBodySize,
                "being_body_min_size/being_body_max_size must be positive and ordered",
            ),
            (
                FieldConfigError::InvalidEmptyValueRange,
                "empty_min_value must be less than or equal to empty_max_value",
            ),
            (
                FieldConfigError::InvalidWaveThreshold,
                "wave_threshold must be finite and within [0,1)",
            ),
            (
                FieldConfigError::InvalidPayloadSplitReduction,
                "payload_split_reduction must be finite and within [0,1]",
            ),
            (
                FieldConfigError::InvalidMaxFps,
                "max_fps must be positive and finite",
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.to_string(), expected);
        }
    }
}
