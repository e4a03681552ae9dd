//! Crossing Events
//!
//! What subscribers receive when a rider passes a marker.

use serde::{Deserialize, Serialize};

use crate::core::interpolate::{lerp, lerp_rounded, lerp_wide};
use crate::core::sample::PlayerSample;
use crate::core::types::{MarkerId, RiderId};

/// Which kind of marker was crossed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    /// A line on a road
    Line,
    /// A cumulative-distance mark
    Distance,
}

/// Two consecutive samples for one rider, with the server clock at each.
#[derive(Clone, Copy, Debug)]
pub struct Segment<'a> {
    /// Previous sample
    pub from: &'a PlayerSample,
    /// Server world time when `from` was received
    pub from_server_time: i64,
    /// New sample
    pub to: &'a PlayerSample,
    /// Server world time when `to` was received
    pub to_server_time: i64,
}

/// A rider passed a marker between two samples.
///
/// Continuous fields are interpolated to the moment of the crossing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CrossingEvent {
    /// Crossed marker
    pub marker_id: MarkerId,
    /// Crossed marker's name
    pub marker_name: String,
    /// Line or distance mark
    pub marker_kind: MarkerKind,
    /// Rider who crossed
    pub rider_id: RiderId,
    /// Direction of travel, taken from the earlier sample
    pub forward: bool,

    /// Server world time at the crossing
    pub server_world_time: f64,
    /// Rider world time at the crossing
    pub player_world_time: f64,
    /// Lateral road position
    pub road_position: f64,
    /// Ride distance
    pub distance: f64,
    /// Speed
    pub speed: f64,
    /// Cadence, rounded
    pub cadence: u32,
    /// Heart rate, rounded
    pub heartrate: u32,
    /// Power
    pub power: f64,
    /// Elapsed ride time
    pub time: f64,
    /// Calories
    pub calories: f64,
    /// Climbing
    pub climbing: f64,
    /// World x
    pub x: f64,
    /// World y
    pub y: f64,
    /// Altitude
    pub altitude: f64,

    /// Group id of the earlier sample, or the later one if that was unset
    pub group_id: u32,
    /// Sport, from the later sample
    pub sport: u32,
    /// Ride-ons, from the later sample
    pub ride_ons: u32,
    /// Laps, from the later sample
    pub laps: u32,
}

impl CrossingEvent {
    /// Build a crossing at `factor` of the way along `segment`.
    pub fn interpolated(
        kind: MarkerKind,
        marker_id: MarkerId,
        marker_name: &str,
        segment: &Segment<'_>,
        factor: f64,
    ) -> Self {
        let old = segment.from;
        let new = segment.to;
        let f = |a: u32, b: u32| lerp(a as f64, b as f64, factor);

        Self {
            marker_id,
            marker_name: marker_name.to_owned(),
            marker_kind: kind,
            rider_id: new.id,
            forward: old.is_forward,

            server_world_time: lerp_wide(segment.from_server_time, segment.to_server_time, factor),
            player_world_time: lerp_wide(old.world_time, new.world_time, factor),
            road_position: f(old.road_position, new.road_position),
            distance: f(old.distance, new.distance),
            speed: f(old.speed, new.speed),
            cadence: lerp_rounded(old.cadence, new.cadence, factor),
            heartrate: lerp_rounded(old.heartrate, new.heartrate, factor),
            power: f(old.power, new.power),
            time: f(old.time, new.time),
            calories: f(old.calories, new.calories),
            climbing: f(old.climbing, new.climbing),
            x: lerp(old.x, new.x, factor),
            y: lerp(old.y, new.y, factor),
            altitude: lerp(old.altitude, new.altitude, factor),

            group_id: if old.group_id != 0 { old.group_id } else { new.group_id },
            sport: new.sport,
            ride_ons: new.ride_ons,
            laps: new.laps,
        }
    }
}
