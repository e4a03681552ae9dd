//! Core primitives.
//!
//! Identifiers, the fixed-point road coordinate, the decoded telemetry
//! sample and the interpolation math shared by line and distance crossings.

pub mod interpolate;
pub mod sample;
pub mod types;

// Re-export core types
pub use interpolate::{crossing_factor, lerp, lerp_rounded, lerp_wide};
pub use sample::PlayerSample;
pub use types::{MarkerId, RiderId, RoadId, RoadTime, WorldId};
