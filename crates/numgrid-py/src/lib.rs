use numgrid_core::config::FieldConfig;
use numgrid_core::world::World;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Minimal PyO3 module exposing numgrid-core to Python.
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pyfunction]
fn default_config_json() -> PyResult<String> {
    serde_json::to_string(&FieldConfig::default())
        .map_err(|e| PyValueError::new_err(format!("failed to serialize default config: {e}")))
}

#[pyfunction]
fn validate_config_json(config_json: &str) -> PyResult<bool> {
    let config = parse_config(config_json).map_err(PyValueError::new_err)?;
    config
        .validate()
        .map(|_| true)
        .map_err(|e| PyValueError::new_err(format!("invalid field configuration: {e}")))
}

/// Run `frames` admitted frames and return
/// `(payload_count, being_count, total_update_us)`.
#[pyfunction]
#[pyo3(signature = (frames, config_json=None))]
fn run_frames(frames: usize, config_json: Option<&str>) -> PyResult<(usize, usize, u64)> {
    checked_frames(frames).map_err(PyValueError::new_err)?;
    let config = match config_json {
        Some(json) => parse_config(json).map_err(PyValueError::new_err)?,
        None => FieldConfig::default(),
    };
    let mut world = World::new(config)
        .map_err(|e| PyValueError::new_err(format!("invalid field configuration: {e}")))?;
    let summary = world
        .run_frames(frames, frames.max(1))
        .map_err(|e| PyValueError::new_err(format!("run failed: {e}")))?;
    Ok((
        summary.final_payload_count,
        summary.beings_placed,
        summary.total_update_us,
    ))
}

fn parse_config(config_json: &str) -> Result<FieldConfig, String> {
    serde_json::from_str(config_json).map_err(|e| format!("invalid config json: {e}"))
}

fn checked_frames(frames: usize) -> Result<usize, String> {
    if frames > World::MAX_RUN_FRAMES {
        return Err(format!(
            "frames ({frames}) exceeds supported maximum ({})",
            World::MAX_RUN_FRAMES
        ));
    }
    Ok(frames)
}

#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add_function(wrap_pyfunction!(default_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(validate_config_json, m)?)?;
    m.add_function(wrap_pyfunction!(run_frames, m)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_frames_rejects_too_many() {
        assert!(checked_frames(World::MAX_RUN_FRAMES + 1).is_err());
    }

    #[test]
    fn checked_frames_accepts_limit() {
        assert_eq!(
            checked_frames(World::MAX_RUN_FRAMES).expect("limit should be accepted"),
            World::MAX_RUN_FRAMES
        );
    }

    #[test]
    fn parse_config_fills_missing_fields_with_defaults() {
        let config = parse_config(r#"{"seed": 5, "grid_rows": 10}"#).expect("partial json parses");
        assert_eq!(config.seed, 5);
        assert_eq!(config.grid_rows, 10);
        assert_eq!(config.grid_cols, FieldConfig::default().grid_cols);
    }

    #[test]
    fn parse_config_reports_malformed_json() {
        let err = parse_config("{not json").expect_err("malformed json is rejected");
        assert!(err.starts_with("invalid config json"));
    }
}
