//! Configuration management for music-analysis

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::analytics::loyalty::DEFAULT_LOYALTY_THRESHOLD;
use crate::analytics::night_owl::{NightWindow, DEFAULT_TIMESTAMP_FORMAT};
use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Input table locations
    pub input: InputConfig,

    /// Output location
    pub output: OutputConfig,

    /// Analysis parameters
    pub analysis: AnalysisConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Worker threads for aggregation (0 = one per core)
    pub workers: usize,
}

/// Input file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Listening events CSV (user_id, song_id, timestamp, duration_sec)
    pub listening_logs: PathBuf,

    /// Song catalog CSV (song_id, title, artist, genre)
    pub songs_metadata: PathBuf,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving one CSV per result set
    pub dir: PathBuf,
}

/// Parameters of the analytic stages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Users whose favorite genre share is at most this value are kept (inclusive)
    pub loyalty_threshold: f64,

    /// First hour of the night window (inclusive)
    pub night_start_hour: u32,

    /// End hour of the night window (exclusive)
    pub night_end_hour: u32,

    /// chrono format of the event timestamp column
    pub timestamp_format: String,
}

// Default implementations

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            workers: 0,
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            listening_logs: PathBuf::from("listening_logs.csv"),
            songs_metadata: PathBuf::from("songs_metadata.csv"),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let window = NightWindow::default();
        Self {
            loyalty_threshold: DEFAULT_LOYALTY_THRESHOLD,
            night_start_hour: window.start_hour,
            night_end_hour: window.end_hour,
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, contents)?;
        Ok(())
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| Error::config("Could not determine config directory"))?;
        Ok(config_dir.join("music-analysis").join("config.toml"))
    }

    /// Validate configuration values.
    ///
    /// Call this after loading to ensure all values are within acceptable ranges.
    pub fn validate(&self) -> Result<()> {
        let threshold = self.analysis.loyalty_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(Error::config(format!(
                "loyalty_threshold must be in (0.0, 1.0], got {threshold}"
            )));
        }

        let (start, end) = (self.analysis.night_start_hour, self.analysis.night_end_hour);
        if start >= end || end > 24 {
            return Err(Error::config(format!(
                "night window must satisfy start < end <= 24, got [{start}, {end})"
            )));
        }

        if self.analysis.timestamp_format.trim().is_empty() {
            return Err(Error::config("timestamp_format must not be empty"));
        }

        // Validate log_level is a known level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "log_level must be one of {:?}, got '{}'",
                valid_levels, self.general.log_level
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!((config.analysis.loyalty_threshold - 0.75).abs() < f64::EPSILON);
        assert_eq!(config.analysis.night_start_hour, 0);
        assert_eq!(config.analysis.night_end_hour, 5);
    }

    #[test]
    fn test_defaults_match_stage_defaults() {
        let params = crate::analytics::AnalysisParams::from(&AnalysisConfig::default());
        let stage = crate::analytics::AnalysisParams::default();

        assert!((params.loyalty_threshold - stage.loyalty_threshold).abs() < f64::EPSILON);
        assert_eq!(params.night_window, stage.night_window);
        assert_eq!(params.timestamp_format, stage.timestamp_format);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [input]
            listening_logs = "data/logs.csv"

            [analysis]
            loyalty_threshold = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.input.listening_logs, PathBuf::from("data/logs.csv"));
        assert_eq!(
            config.input.songs_metadata,
            PathBuf::from("songs_metadata.csv")
        );
        assert!((config.analysis.loyalty_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.analysis.timestamp_format, "%Y-%m-%d %H:%M:%S");
        assert_eq!(config.output.dir, PathBuf::from("output"));
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let mut config = Config::default();
        config.analysis.loyalty_threshold = 0.0;
        assert!(config.validate().is_err());
        config.analysis.loyalty_threshold = 1.5;
        assert!(config.validate().is_err());
        config.analysis.loyalty_threshold = 1.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_night_window() {
        let mut config = Config::default();
        config.analysis.night_start_hour = 5;
        config.analysis.night_end_hour = 5;
        assert!(config.validate().is_err());

        config.analysis.night_start_hour = 22;
        config.analysis.night_end_hour = 25;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        let mut config = Config::default();
        config.general.log_level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed.analysis.night_end_hour, 5);
        assert_eq!(parsed.general.workers, 0);
    }
}
