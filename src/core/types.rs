//! Identifier types and the fixed-point road coordinate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// World identifier. Worlds partition roads.
pub type WorldId = u32;

/// Road identifier, scoped to a world.
pub type RoadId = u32;

// =============================================================================
// IDS
// =============================================================================

/// Rider identifier as reported by the telemetry source.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RiderId(pub u64);

impl fmt::Display for RiderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a configured marker (line or distance mark).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarkerId(pub u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// ROAD TIME
// =============================================================================

/// Fixed-point units per lap of a road.
pub const ROAD_TIME_SCALE: f64 = 1_000_000.0;

/// Offset the wire format adds on top of the scaled lap fraction.
pub const ROAD_TIME_OFFSET: f64 = 5_000.0;

/// Configured values below this are legacy lap fractions, not wire units.
pub const LEGACY_FRACTION_LIMIT: f64 = 2.0;

/// Position along one lap of a road, in wire units (nominally `[0, 1_000_000)`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoadTime(pub u32);

impl RoadTime {
    /// Create from raw wire units.
    pub const fn new(units: u32) -> Self {
        Self(units)
    }

    /// Convert a lap fraction the way the wire encodes it:
    /// `round(fraction * 1_000_000) + 5_000`.
    ///
    /// Returns `None` if the result does not fit the wire range.
    pub fn from_fraction(fraction: f64) -> Option<Self> {
        Self::from_units((fraction * ROAD_TIME_SCALE).round() + ROAD_TIME_OFFSET)
    }

    /// Interpret a configured value.
    ///
    /// Anything below 2 is a legacy lap fraction and is converted with
    /// [`RoadTime::from_fraction`]; anything else is already in wire units.
    pub fn from_config(value: f64) -> Option<Self> {
        if value < LEGACY_FRACTION_LIMIT {
            Self::from_fraction(value)
        } else {
            Self::from_units(value.round())
        }
    }

    fn from_units(units: f64) -> Option<Self> {
        if units.is_finite() && units >= 0.0 && units <= u32::MAX as f64 {
            Some(Self(units as u32))
        } else {
            None
        }
    }

    /// Raw wire units.
    #[inline]
    pub fn units(self) -> u32 {
        self.0
    }

    /// Wire units as `f64`, for interpolation.
    #[inline]
    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }
}

impl fmt::Display for RoadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
