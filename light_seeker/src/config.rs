// THEORY:
// Every tunable of the seeker lives in one `SeekerConfig`. The defaults reproduce
// the robot's stock behavior exactly (720x720 captures, a 50 cm obstacle threshold,
// a ten second countdown, red warning and green moving lights), so a missing or
// partial YAML file is never an error. Only the values that would make the loop
// meaningless (zero-sized captures, zero-length waits) are rejected by `validate`.

use crate::error::ConfigError;
use crate::hardware::{Resolution, Rgb};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for the NavigationLoop and its devices.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SeekerConfig {
    pub resolution: Resolution,
    /// Readings strictly below this many centimeters count as an obstacle.
    pub obstacle_threshold_cm: f64,
    /// Number of countdown steps before the distance is measured again.
    pub obstacle_wait_steps: u32,
    pub obstacle_wait_step_ms: u64,
    /// Lets a stop request cut the obstacle countdown short.
    pub interruptible_wait: bool,
    pub safety_stop_duration_ms: u64,
    pub warning_color: Rgb,
    pub moving_color: Rgb,
    pub save_frames: bool,
    pub image_dir: PathBuf,
    pub report_path: PathBuf,
    /// Seed for the symmetric tie-break. `None` draws from OS entropy.
    pub tie_break_seed: Option<u64>,
}

impl Default for SeekerConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::SQUARE_720,
            obstacle_threshold_cm: 50.0,
            obstacle_wait_steps: 10,
            obstacle_wait_step_ms: 1000,
            interruptible_wait: true,
            safety_stop_duration_ms: 100,
            warning_color: Rgb(255, 0, 0),
            moving_color: Rgb(0, 255, 0),
            save_frames: true,
            image_dir: PathBuf::from("."),
            report_path: PathBuf::from("execution_log.txt"),
            tie_break_seed: None,
        }
    }
}

impl SeekerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: SeekerConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.resolution.width < 3 || self.resolution.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "resolution {}x{} is too small to split into three bands",
                self.resolution.width, self.resolution.height
            )));
        }
        if self.obstacle_threshold_cm.is_nan() || self.obstacle_threshold_cm < 0.0 {
            return Err(ConfigError::Invalid(
                "obstacle_threshold_cm must be a non-negative number".to_string(),
            ));
        }
        if self.obstacle_wait_steps == 0 {
            return Err(ConfigError::Invalid(
                "obstacle_wait_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn wait_step(&self) -> Duration {
        Duration::from_millis(self.obstacle_wait_step_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_stock_behavior() {
        let config = SeekerConfig::from_yaml("{}").unwrap();
        assert_eq!(config, SeekerConfig::default());
        assert_eq!(config.wait_step(), Duration::from_secs(1));
        assert_eq!(config.report_path, PathBuf::from("execution_log.txt"));
    }

    #[test]
    fn partial_yaml_overrides_only_named_fields() {
        let yaml = "
obstacle_threshold_cm: 35.5
moving_color: [0, 0, 255]
resolution:
  width: 320
  height: 240
tie_break_seed: 7
";
        let config = SeekerConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.obstacle_threshold_cm, 35.5);
        assert_eq!(config.moving_color, Rgb(0, 0, 255));
        assert_eq!(config.resolution, Resolution { width: 320, height: 240 });
        assert_eq!(config.tie_break_seed, Some(7));
        assert_eq!(config.obstacle_wait_steps, 10);
    }

    #[test]
    fn narrow_resolution_is_rejected() {
        let yaml = "resolution: { width: 2, height: 10 }";
        assert!(matches!(
            SeekerConfig::from_yaml(yaml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn missing_file_reports_path() {
        let err = SeekerConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.yaml"));
    }
}
