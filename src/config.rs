use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::segmenter::SelectionPolicy;
use crate::speed_filter::SpeedLimits;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Filter thresholds in m/s and m/s².
    pub limits: SpeedLimits,
    /// Marker window at `reference_zoom`, in meters.
    pub base_window_m: f64,
    pub reference_zoom: i32,
    /// Zoom used when the caller does not ask for one.
    pub default_zoom: i32,
    pub policy: SelectionPolicy,
    /// Worker threads for batch analysis; `None` uses every core.
    pub jobs: Option<usize>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            limits: SpeedLimits::cycling(),
            base_window_m: 250.0,
            reference_zoom: 14,
            default_zoom: 14,
            policy: SelectionPolicy::LastValid,
            jobs: None,
        }
    }
}

impl AnalysisConfig {
    /// Read a JSON config file; missing fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AnalysisConfig =
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.limits.is_valid() {
            return Err(ConfigError::Invalid(format!(
                "speed limits must be finite with min_speed < max_speed (got {:?})",
                self.limits
            )));
        }
        if !(self.base_window_m.is_finite() && self.base_window_m > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "base_window_m must be positive (got {})",
                self.base_window_m
            )));
        }
        if self.jobs == Some(0) {
            return Err(ConfigError::Invalid("jobs must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn worker_count(&self) -> usize {
        self.jobs.unwrap_or_else(num_cpus::get)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_window_m, 250.0);
        assert_eq!(config.reference_zoom, 14);
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{ "policy": "max-speed", "base_window_m": 500 }"#).unwrap();
        assert_eq!(config.policy, SelectionPolicy::MaxSpeed);
        assert_eq!(config.base_window_m, 500.0);
        assert_eq!(config.limits, SpeedLimits::cycling());
    }

    #[test]
    fn test_inverted_limits_rejected() {
        let config = AnalysisConfig {
            limits: SpeedLimits::new(10.0, 5.0, 1.0),
            ..AnalysisConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_non_positive_window_rejected() {
        let config = AnalysisConfig {
            base_window_m: 0.0,
            ..AnalysisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("gpx-velocity-config-{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{ "limits": { "min_speed": 1.0, "max_speed": 12.0, "max_acceleration": 0.5 }, "jobs": 2 }"#,
        )
        .unwrap();
        let config = AnalysisConfig::load(&path).unwrap();
        fs::remove_file(&path).ok();
        assert_eq!(config.limits, SpeedLimits::new(1.0, 12.0, 0.5));
        assert_eq!(config.worker_count(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = AnalysisConfig::load(Path::new("/nonexistent/gpx-velocity.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
