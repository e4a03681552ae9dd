//! Decoded Telemetry Sample
//!
//! One position report for one rider. Decoding from the transport protocol
//! happens upstream; this crate only consumes the decoded fields.

use serde::{Deserialize, Serialize};

use crate::core::types::{RiderId, RoadId, RoadTime, WorldId};

/// A single rider status report.
///
/// Units follow the telemetry source: distances and climbing in meters,
/// speed in millimeters per hour, cadence in rpm, power in watts, elapsed
/// time in seconds, world time in milliseconds.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSample {
    /// Rider identifier
    pub id: RiderId,
    /// World the rider is in
    pub world: WorldId,
    /// Road the rider is on
    pub road: RoadId,
    /// Position along the road
    pub road_time: RoadTime,
    /// Travelling in the road's forward direction?
    pub is_forward: bool,

    /// World x coordinate
    pub x: f64,
    /// World y coordinate
    pub y: f64,
    /// Altitude
    pub altitude: f64,
    /// Lateral road position
    pub road_position: u32,

    /// Cumulative ride distance
    pub distance: u32,
    /// Current speed
    pub speed: u32,
    /// Current cadence
    pub cadence: u32,
    /// Current heart rate
    pub heartrate: u32,
    /// Current power output
    pub power: u32,
    /// Elapsed ride time
    pub time: u32,
    /// Calories burned
    pub calories: u32,
    /// Cumulative climbing
    pub climbing: u32,

    /// Rider-side world clock at the time of the sample
    pub world_time: i64,
    /// Group event the rider belongs to (0 = none)
    pub group_id: u32,
    /// Sport code
    pub sport: u32,
    /// Ride-ons received
    pub ride_ons: u32,
    /// Completed laps
    pub laps: u32,
}

impl PlayerSample {
    /// Create a sample at a road position with all telemetry zeroed.
    pub fn at(id: RiderId, world: WorldId, road: RoadId, road_time: RoadTime) -> Self {
        Self {
            id,
            world,
            road,
            road_time,
            is_forward: true,
            ..Default::default()
        }
    }

    /// Is this sample on the same road (and world) as `other`?
    #[inline]
    pub fn same_road(&self, other: &PlayerSample) -> bool {
        self.world == other.world && self.road == other.road
    }

    /// Did the road position move against the reported direction?
    ///
    /// Moving against the direction means the coordinate wrapped around the
    /// end of the lap.
    #[inline]
    pub fn wrapped_from(&self, last: &PlayerSample) -> bool {
        (self.is_forward && self.road_time < last.road_time)
            || (!self.is_forward && self.road_time > last.road_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraparound_detection() {
        let last = PlayerSample::at(RiderId(1), 1, 1, RoadTime(990_000));
        let mut next = last.clone();
        next.road_time = RoadTime(10_000);
        assert!(next.wrapped_from(&last));

        next.is_forward = false;
        assert!(!next.wrapped_from(&last));

        next.road_time = RoadTime(995_000);
        assert!(next.wrapped_from(&last));
    }

    #[test]
    fn test_same_road_includes_world() {
        let a = PlayerSample::at(RiderId(1), 1, 5, RoadTime(0));
        let mut b = a.clone();
        assert!(a.same_road(&b));
        b.world = 2;
        assert!(!a.same_road(&b));
    }

    #[test]
    fn test_deserialize_partial_sample() {
        let sample: PlayerSample =
            serde_json::from_str(r#"{"id": 7, "world": 1, "road": 2, "road_time": 55000}"#).unwrap();
        assert_eq!(sample.id, RiderId(7));
        assert_eq!(sample.road_time, RoadTime(55_000));
        assert_eq!(sample.heartrate, 0);
    }
}
