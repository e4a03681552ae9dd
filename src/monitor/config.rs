//! Monitor Configuration
//!
//! `MonitorConfig` holds the runtime knobs. `MonitorSettings` is the JSON
//! document the binary loads: the same knobs plus the markers and the
//! optional visibility box.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::types::{MarkerId, RoadId, WorldId};
use crate::markers::MarkerError;
use crate::monitor::line_monitor::LineMonitor;
use crate::{DEFAULT_RIDER_TIMEOUT_SECS, DEFAULT_SWEEP_INTERVAL_SECS};

/// Runtime configuration for a [`LineMonitor`] and its service.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Idle time before a rider's state is discarded. Zero disables expiry.
    pub rider_timeout: Duration,
    /// How often the service purges expired riders.
    pub sweep_interval: Duration,
    /// Bounded inbound sample queue size.
    pub sample_queue_capacity: usize,
    /// Bounded per-subscriber event channel size.
    pub subscriber_capacity: usize,
    /// Emit per-sample diagnostics.
    pub verbose: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            rider_timeout: Duration::from_secs(DEFAULT_RIDER_TIMEOUT_SECS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            sample_queue_capacity: 1024,
            subscriber_capacity: 256,
            verbose: false,
        }
    }
}

/// Configuration loading errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Settings file could not be read.
    #[error("Failed to read settings: {0}")]
    Io(#[from] std::io::Error),

    /// Settings are not valid JSON for this schema.
    #[error("Invalid settings: {0}")]
    Json(#[from] serde_json::Error),

    /// A configured marker was rejected.
    #[error("Marker error: {0}")]
    Marker(#[from] MarkerError),
}

/// Visibility box as configured: center and half-width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisibilitySettings {
    /// Center x
    pub x: f64,
    /// Center y
    pub y: f64,
    /// Half-width of the box
    pub radius: f64,
}

/// A configured line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSettings {
    /// Marker id
    pub id: MarkerId,
    /// Display name
    pub name: String,
    /// World
    pub world: WorldId,
    /// Road
    pub road: RoadId,
    /// Road time; below 2 is read as a lap fraction
    pub road_time: f64,
}

/// A configured distance mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistanceMarkSettings {
    /// Marker id
    pub id: MarkerId,
    /// Display name
    pub name: String,
    /// Threshold distance
    pub distance: u32,
}

/// Monitor settings document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Rider idle timeout (seconds, 0 = never)
    pub rider_timeout_secs: u64,
    /// Expired-rider sweep interval (seconds)
    pub sweep_interval_secs: u64,
    /// Inbound sample queue size
    pub sample_queue_capacity: usize,
    /// Per-subscriber channel size
    pub subscriber_capacity: usize,
    /// Per-sample diagnostics
    pub verbose: bool,
    /// Optional visibility box
    pub visibility: Option<VisibilitySettings>,
    /// Lines to register
    pub lines: Vec<LineSettings>,
    /// Distance marks to register
    pub distance_marks: Vec<DistanceMarkSettings>,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        let config = MonitorConfig::default();
        Self {
            rider_timeout_secs: config.rider_timeout.as_secs(),
            sweep_interval_secs: config.sweep_interval.as_secs(),
            sample_queue_capacity: config.sample_queue_capacity,
            subscriber_capacity: config.subscriber_capacity,
            verbose: config.verbose,
            visibility: None,
            lines: Vec::new(),
            distance_marks: Vec::new(),
        }
    }
}

impl MonitorSettings {
    /// Parse settings from JSON.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a settings file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Runtime knobs from these settings.
    pub fn config(&self) -> MonitorConfig {
        MonitorConfig {
            rider_timeout: Duration::from_secs(self.rider_timeout_secs),
            sweep_interval: Duration::from_secs(self.sweep_interval_secs.max(1)),
            sample_queue_capacity: self.sample_queue_capacity.max(1),
            subscriber_capacity: self.subscriber_capacity.max(1),
            verbose: self.verbose,
        }
    }

    /// Create a monitor with every configured marker registered.
    ///
    /// Fails on the first marker the registry rejects.
    pub fn build_monitor(&self) -> Result<LineMonitor, ConfigError> {
        let monitor = LineMonitor::new(self.config());

        for line in &self.lines {
            monitor.add_line(line.id, line.name.clone(), line.world, line.road, line.road_time)?;
        }
        for mark in &self.distance_marks {
            monitor.add_distance_mark(mark.id, mark.name.clone(), mark.distance);
        }
        if let Some(visibility) = self.visibility {
            monitor.set_visibility_box(visibility.x, visibility.y, visibility.radius);
        }

        info!(
            lines = self.lines.len(),
            distance_marks = self.distance_marks.len(),
            visibility = self.visibility.is_some(),
            "Monitor configured"
        );
        Ok(monitor)
    }
}
