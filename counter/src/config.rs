use crate::error::{CounterError, Result};
use reidtrack::{Palette, SessionConfig, StorageConfig, TrackerConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Configuration for the counting pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    /// Detections narrower than this (pixels) are reported but never tracked
    pub min_face_size: i32,

    pub tracker: TrackerConfig,

    pub sessions: SessionConfig,

    pub storage: StorageConfig,

    pub palette: Palette,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            min_face_size: 40,
            tracker: TrackerConfig::default(),
            sessions: SessionConfig::default(),
            storage: StorageConfig::default(),
            palette: Palette::default(),
        }
    }
}

impl CounterConfig {
    /// Load from a JSON file. Missing keys keep their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        log::info!("Loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_face_size < 0 {
            return Err(CounterError::config(format!(
                "min_face_size must be >= 0, got {}",
                self.min_face_size
            )));
        }
        self.tracker.validate()?;
        self.sessions.validate()?;
        self.storage.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_from_file_with_partial_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(
            &path,
            r#"{ "min_face_size": 60, "storage": { "rolling_window": 5 }, "tracker": { "reach": 2.0 } }"#,
        )
        .unwrap();

        let config = CounterConfig::from_file(&path).unwrap();
        assert_eq!(config.min_face_size, 60);
        assert_eq!(config.storage.rolling_window, 5);
        assert_eq!(config.storage.counter_file, StorageConfig::default().counter_file);
        assert_eq!(config.tracker.hit_limit, 3);
        assert_eq!(config.sessions, SessionConfig::default());
    }

    #[test]
    fn test_invalid_nested_value_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{ "tracker": { "size_smoothing": 3.0 } }"#).unwrap();

        assert!(matches!(
            CounterConfig::from_file(&path),
            Err(CounterError::TrackingError(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            CounterConfig::from_file("/nonexistent/settings.json"),
            Err(CounterError::IoError(_))
        ));
    }
}
