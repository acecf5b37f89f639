//! Configuration management for runtime tuning
//!
//! This module provides configuration loading from JSON files, enabling
//! tick cadence and channel sizing to be adjusted without recompilation.
//! The countdown semantics themselves are not configurable.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub timer: TimerConfig,
    pub channels: ChannelConfig,
}

/// Countdown tick parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Milliseconds between tick callbacks
    pub tick_interval_ms: u64,
    /// Log a cadence line every N applied ticks (0 disables)
    pub log_every_n_ticks: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            // One tick per displayed second; the UI shows whole seconds
            tick_interval_ms: 1000,
            log_every_n_ticks: 60,
        }
    }
}

/// Channel sizing for state and event fan-out
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// Capacity of the lifecycle event broadcast channel
    pub event_capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            event_capacity: 128,
        }
    }
}

impl Default for AppConfig {
    /// Default configuration values (fallback if config file not found)
    fn default() -> Self {
        Self {
            timer: TimerConfig::default(),
            channels: ChannelConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// * `Ok(AppConfig)` - Loaded configuration
    /// * `Err` - If file doesn't exist or JSON is invalid, returns default config
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration on Android, where the file ships inside the APK
    /// and is not reachable through the filesystem.
    #[cfg(target_os = "android")]
    pub fn load_android() -> Self {
        log::info!(
            "[Config] Using default configuration (Android asset loading not yet implemented)"
        );
        Self::default()
    }

    /// Load configuration for non-Android platforms
    #[cfg(not(target_os = "android"))]
    pub fn load() -> Self {
        Self::load_from_file("assets/timer_config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.timer.tick_interval_ms, 1000);
        assert_eq!(config.timer.log_every_n_ticks, 60);
        assert_eq!(config.channels.event_capacity, 128);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.timer.tick_interval_ms, config.timer.tick_interval_ms);
        assert_eq!(
            parsed.channels.event_capacity,
            config.channels.event_capacity
        );
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("assets/does_not_exist.json");
        assert_eq!(config.timer.tick_interval_ms, 1000);
    }
}
