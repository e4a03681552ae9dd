//! Marker Registries
//!
//! Configured timing markers. Both registries are read on every update and
//! written only when markers are registered.
//!
//! ## Module Structure
//!
//! - `lines`: per (world, road) ordered lines with bracket lookup
//! - `distance`: unordered cumulative-distance marks

pub mod distance;
pub mod lines;

pub use distance::{DistanceMark, DistanceMarkRegistry};
pub use lines::{Line, LineBracket, LineRegistry};

use crate::core::types::{MarkerId, RoadId, RoadTime, WorldId};

/// Marker registration errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarkerError {
    /// A line already occupies that road time on that road.
    #[error(
        "duplicate line {name} ({id}) at road time {road_time} on world {world} road {road}: {existing} is already there"
    )]
    DuplicateLine {
        /// Rejected line id
        id: MarkerId,
        /// Rejected line name
        name: String,
        /// World of the rejected line
        world: WorldId,
        /// Road of the rejected line
        road: RoadId,
        /// Contested road time
        road_time: RoadTime,
        /// Name of the line already there
        existing: String,
    },

    /// The configured road time cannot be expressed in wire units.
    #[error("invalid road time {value} for line {id}")]
    InvalidRoadTime {
        /// Rejected line id
        id: MarkerId,
        /// Value as configured
        value: f64,
    },
}
