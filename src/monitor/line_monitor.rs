//! Line Monitor
//!
//! Synchronous facade over the registries, the rider cache and the crossing
//! bus. Shareable across threads: registries sit behind reader/writer locks
//! and each rider behind its own mutex, so different riders update in
//! parallel while updates for one rider are serialized.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::core::sample::PlayerSample;
use crate::core::types::{MarkerId, RiderId, RoadId, RoadTime, WorldId};
use crate::markers::{DistanceMarkRegistry, Line, LineBracket, LineRegistry, MarkerError};
use crate::monitor::bus::{CrossingBus, ListenerId};
use crate::monitor::config::MonitorConfig;
use crate::monitor::events::CrossingEvent;
use crate::tracking::engine::{advance, Transition};
use crate::tracking::{RiderCache, VisibilityBox};

/// Turns rider samples into crossing events.
pub struct LineMonitor {
    config: MonitorConfig,
    lines: RwLock<LineRegistry>,
    distance_marks: RwLock<DistanceMarkRegistry>,
    riders: RiderCache,
    visibility: RwLock<Option<VisibilityBox>>,
    verbose: AtomicBool,
    bus: CrossingBus,
}

impl Default for LineMonitor {
    fn default() -> Self {
        Self::new(MonitorConfig::default())
    }
}

impl LineMonitor {
    /// Create a monitor with no markers.
    pub fn new(config: MonitorConfig) -> Self {
        info!(
            rider_timeout_ms = config.rider_timeout.as_millis() as u64,
            "Line monitor created"
        );
        Self {
            riders: RiderCache::new(config.rider_timeout),
            verbose: AtomicBool::new(config.verbose),
            lines: RwLock::new(LineRegistry::new()),
            distance_marks: RwLock::new(DistanceMarkRegistry::new()),
            visibility: RwLock::new(None),
            bus: CrossingBus::new(),
            config,
        }
    }

    /// Configuration this monitor was built with.
    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    // =========================================================================
    // Markers
    // =========================================================================

    /// Register a line. `road_time` below 2 is a legacy lap fraction.
    ///
    /// Fails without changing anything if the road already has a line at
    /// that road time.
    pub fn add_line(
        &self,
        id: MarkerId,
        name: impl Into<String>,
        world: WorldId,
        road: RoadId,
        road_time: f64,
    ) -> Result<(), MarkerError> {
        let line = self.lines.write().add_line(id, name, world, road, road_time)?;
        debug!(
            line = %line.id,
            name = %line.name,
            world,
            road,
            road_time = %line.road_time,
            "Line added"
        );
        Ok(())
    }

    /// Register a distance mark.
    pub fn add_distance_mark(&self, id: MarkerId, name: impl Into<String>, distance: u32) {
        let mark = self.distance_marks.write().add_distance_mark(id, name, distance);
        debug!(mark = %mark.id, name = %mark.name, distance, "Distance mark added");
    }

    /// Lines on a road, in road-time order.
    pub fn lines_on(&self, world: WorldId, road: RoadId) -> Vec<Arc<Line>> {
        self.lines.read().lines_on(world, road).cloned().collect()
    }

    /// Bracket a road position with the registered lines.
    pub fn find_lines(&self, world: WorldId, road: RoadId, road_time: RoadTime) -> LineBracket {
        self.lines.read().find_lines(world, road, road_time)
    }

    /// Number of registered lines.
    pub fn line_count(&self) -> usize {
        self.lines.read().len()
    }

    /// Number of registered distance marks.
    pub fn distance_mark_count(&self) -> usize {
        self.distance_marks.read().len()
    }

    // =========================================================================
    // Visibility & diagnostics
    // =========================================================================

    /// Only accept samples within `radius` of (`x`, `y`) on both axes.
    pub fn set_visibility_box(&self, x: f64, y: f64, radius: f64) {
        let bounds = VisibilityBox::around(x, y, radius);
        *self.visibility.write() = Some(bounds);
        info!(?bounds, "Visibility box set");
    }

    /// Accept samples from anywhere.
    pub fn clear_visibility_box(&self) {
        *self.visibility.write() = None;
        info!("Visibility box cleared");
    }

    /// Current visibility box, if any.
    pub fn visibility_box(&self) -> Option<VisibilityBox> {
        *self.visibility.read()
    }

    /// Toggle per-sample diagnostics. Has no effect on crossings.
    pub fn set_verbose(&self, enabled: bool) {
        self.verbose.store(enabled, Ordering::Relaxed);
    }

    /// Are per-sample diagnostics on?
    pub fn is_verbose(&self) -> bool {
        self.verbose.load(Ordering::Relaxed)
    }

    // =========================================================================
    // Subscribers
    // =========================================================================

    /// Register a crossing listener.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&CrossingEvent) + Send + Sync + 'static,
    {
        self.bus.subscribe(listener)
    }

    /// Remove a crossing listener.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    // =========================================================================
    // Riders
    // =========================================================================

    /// Process one sample.
    ///
    /// Publishes every resulting crossing to the listeners, in order, before
    /// returning them. Samples outside the visibility box evict the rider and
    /// produce nothing.
    pub fn update_rider_status(&self, sample: PlayerSample, server_world_time: i64) -> Vec<CrossingEvent> {
        let verbose = self.is_verbose();

        if let Some(bounds) = self.visibility_box() {
            if !bounds.contains(sample.x, sample.y) {
                if verbose {
                    debug!(
                        rider = %sample.id,
                        world = sample.world,
                        road = sample.road,
                        road_time = %sample.road_time,
                        x = sample.x,
                        y = sample.y,
                        altitude = sample.altitude,
                        ?bounds,
                        "Out of bounds update"
                    );
                }
                self.riders.remove(sample.id);
                return Vec::new();
            }
        }

        if verbose {
            debug!(
                rider = %sample.id,
                world = sample.world,
                road = sample.road,
                road_time = %sample.road_time,
                "Rider update"
            );
        }

        let rider = self.riders.get_or_track(sample.id);
        let mut rider = rider.lock();

        let result = {
            let lines = self.lines.read();
            let marks = self.distance_marks.read();
            advance(&mut rider, sample, server_world_time, &lines, &marks)
        };

        if verbose && result.transition == Transition::Relocated {
            debug!(rider = %rider.id, "Cursor re-seeded after road change or wraparound");
        }

        for event in &result.events {
            if verbose {
                debug!(
                    rider = %event.rider_id,
                    marker = %event.marker_id,
                    name = %event.marker_name,
                    kind = ?event.marker_kind,
                    "Crossing"
                );
            }
            self.bus.publish(event);
        }

        result.events
    }

    /// Forget a rider; its next sample starts fresh.
    pub fn forget_rider(&self, id: RiderId) -> bool {
        self.riders.remove(id)
    }

    /// Is the rider currently tracked?
    pub fn is_tracking(&self, id: RiderId) -> bool {
        self.riders.contains(id)
    }

    /// Approximate number of tracked riders.
    pub fn rider_count(&self) -> u64 {
        self.riders.len()
    }

    /// Purge riders past their idle timeout.
    pub fn sweep_expired_riders(&self) {
        self.riders.sweep();
    }
}

impl std::fmt::Debug for LineMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineMonitor")
            .field("lines", &self.line_count())
            .field("distance_marks", &self.distance_mark_count())
            .field("riders", &self.riders)
            .field("visibility", &self.visibility_box())
            .field("bus", &self.bus)
            .finish()
    }
}
