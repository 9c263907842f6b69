/// Configuration types for the proximity tracker, identity sessions and record storage
///
/// Every struct deserializes with missing keys falling back to `Default`, and
/// exposes `validate()` so malformed values are rejected before any state is built.
use crate::error::{ReidError, Result};
use crate::tracklet::TrackletParams;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for proximity tracking
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Aspect ratio (width / height) forced onto display boxes; 0 disables it
    pub ratio_lock: f32,
    /// Uniform scale applied to display boxes
    pub scale_factor: f32,
    /// Match radius as a multiple of the new detection's biggest edge
    pub reach: f32,
    /// Consecutive hits before a tracklet is activated
    pub hit_limit: u32,
    /// Consecutive misses before a tracklet is lost
    pub miss_limit: u32,
    /// Blend factor for display box position
    pub position_smoothing: f32,
    /// Blend factor for display box size
    pub size_smoothing: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            ratio_lock: 1.0,
            scale_factor: 1.5,
            reach: 1.5,
            hit_limit: 3,
            miss_limit: 7,
            position_smoothing: 0.5,
            size_smoothing: 0.5,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ratio_lock < 0.0 || !self.ratio_lock.is_finite() {
            return Err(ReidError::config(format!(
                "ratio_lock must be >= 0, got {}",
                self.ratio_lock
            )));
        }
        if self.scale_factor <= 0.0 || !self.scale_factor.is_finite() {
            return Err(ReidError::config(format!(
                "scale_factor must be > 0, got {}",
                self.scale_factor
            )));
        }
        if self.reach <= 0.0 || !self.reach.is_finite() {
            return Err(ReidError::config(format!("reach must be > 0, got {}", self.reach)));
        }
        if self.hit_limit == 0 || self.miss_limit == 0 {
            return Err(ReidError::config("hit_limit and miss_limit must be at least 1"));
        }
        for (name, factor) in [
            ("position_smoothing", self.position_smoothing),
            ("size_smoothing", self.size_smoothing),
        ] {
            if !(0.0..=1.0).contains(&factor) {
                return Err(ReidError::config(format!(
                    "{} must be within [0, 1], got {}",
                    name, factor
                )));
            }
        }
        Ok(())
    }

    pub fn tracklet_params(&self) -> TrackletParams {
        TrackletParams {
            hit_limit: self.hit_limit,
            miss_limit: self.miss_limit,
            position_smoothing: self.position_smoothing,
            size_smoothing: self.size_smoothing,
        }
    }
}

/// Configuration for embedding-based identity sessions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Capacity of each session's vector history
    pub max_vectors: usize,
    /// How many of the most recent vectors are averaged when measuring distance
    pub compare_window: usize,
    /// Vectors at or beyond this average distance never join a session
    pub match_threshold: f32,
    /// Countdown granted to a full (confirmed) session on every new vector
    pub long_life: u32,
    /// Countdown granted to a session that is not yet full
    pub pending_life: u32,
    /// Remaining-time fraction above which a session counts as freshly active
    pub active_fraction: f32,
    /// Also write records for sessions that expire without ever filling up
    pub keep_unconfirmed: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_vectors: 10,
            compare_window: 3,
            match_threshold: 0.5,
            long_life: 150,
            pending_life: 15,
            active_fraction: 0.9,
            keep_unconfirmed: false,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_vectors == 0 {
            return Err(ReidError::config("max_vectors must be at least 1"));
        }
        if self.compare_window == 0 {
            return Err(ReidError::config("compare_window must be at least 1"));
        }
        if self.match_threshold <= 0.0 || !self.match_threshold.is_finite() {
            return Err(ReidError::config(format!(
                "match_threshold must be > 0, got {}",
                self.match_threshold
            )));
        }
        if self.long_life == 0 || self.pending_life == 0 {
            return Err(ReidError::config("long_life and pending_life must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.active_fraction) {
            return Err(ReidError::config(format!(
                "active_fraction must be within [0, 1], got {}",
                self.active_fraction
            )));
        }
        Ok(())
    }
}

/// Where session ids and records are kept on disk
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Plain-text file holding the last issued session id
    pub counter_file: PathBuf,
    /// Directory receiving one JSON record per ended session
    pub output_dir: PathBuf,
    /// Maximum number of record files kept; the oldest are deleted first
    pub rolling_window: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            counter_file: PathBuf::from("session_index.txt"),
            output_dir: PathBuf::from("output"),
            rolling_window: 10_000,
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> Result<()> {
        if self.rolling_window == 0 {
            return Err(ReidError::config("rolling_window must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        TrackerConfig::default().validate().unwrap();
        SessionConfig::default().validate().unwrap();
        StorageConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SessionConfig = serde_json::from_str(r#"{ "max_vectors": 4 }"#).unwrap();
        assert_eq!(config.max_vectors, 4);
        assert_eq!(config.compare_window, 3);
        assert!(!config.keep_unconfirmed);
    }

    #[test]
    fn test_invalid_smoothing_rejected() {
        let config = TrackerConfig {
            size_smoothing: 1.2,
            ..TrackerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ReidError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_rolling_window_rejected() {
        let config = StorageConfig {
            rolling_window: 0,
            ..StorageConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
