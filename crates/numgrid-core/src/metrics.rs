use serde::{Deserialize, Serialize};

/// Counters for one admitted frame.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct FrameMetrics {
    pub frame: usize,
    pub timestamp: f64,
    pub payload_count: usize,
    pub being_count: usize,
    /// Sum of all Being values. Fits in `u128` even at the value ceiling.
    pub total_being_value: u128,
    pub growth_firings: usize,
    pub growth_points: u64,
    pub fluctuations: usize,
    pub passive_spawns: usize,
    pub absorptions: usize,
    pub exits: usize,
    pub children_spawned: usize,
    pub refused_spawns: usize,
    pub fps: f64,
}

fn default_schema_version() -> u32 {
    1
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub seed: u64,
    pub frames: usize,
    pub sample_every: usize,
    pub beings_requested: usize,
    pub beings_placed: usize,
    pub final_payload_count: usize,
    pub final_total_being_value: u128,
    #[serde(default)]
    pub total_absorptions: usize,
    #[serde(default)]
    pub total_children_spawned: usize,
    #[serde(default)]
    pub total_refused_spawns: usize,
    #[serde(default)]
    pub total_update_us: u64,
    pub samples: Vec<FrameMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_without_schema_version_defaults_to_one() {
        let json = r#"{
            "seed": 1,
            "frames": 2,
            "sample_every": 1,
            "beings_requested": 3,
            "beings_placed": 3,
            "final_payload_count": 0,
            "final_total_being_value": 10,
            "samples": [{"frame": 1, "payload_count": 4}]
        }"#;
        let summary: RunSummary = serde_json::from_str(json).expect("legacy summary parses");
        assert_eq!(summary.schema_version, 1);
        assert_eq!(summary.total_absorptions, 0);
        assert_eq!(summary.samples[0].payload_count, 4);
        assert_eq!(summary.samples[0].growth_firings, 0);
    }
}
