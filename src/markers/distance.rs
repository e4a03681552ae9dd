//! Distance Marks
//!
//! Markers on cumulative ride distance, independent of world and road.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::types::MarkerId;

/// A cumulative-distance threshold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistanceMark {
    /// Marker id
    pub id: MarkerId,
    /// Display name
    pub name: String,
    /// Threshold distance
    pub distance: u32,
}

impl DistanceMark {
    /// Is the mark passed when distance goes from `from` to `to`?
    ///
    /// Half-open on the way up: `from < distance <= to`. Never true when
    /// distance stays put or decreases.
    #[inline]
    pub fn crossed_between(&self, from: u32, to: u32) -> bool {
        from < self.distance && self.distance <= to
    }
}

/// All distance marks, in registration order.
///
/// No ordering or uniqueness is enforced, so every update scans every mark.
#[derive(Debug, Default)]
pub struct DistanceMarkRegistry {
    marks: Vec<Arc<DistanceMark>>,
}

impl DistanceMarkRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mark.
    pub fn add_distance_mark(&mut self, id: MarkerId, name: impl Into<String>, distance: u32) -> Arc<DistanceMark> {
        let mark = Arc::new(DistanceMark {
            id,
            name: name.into(),
            distance,
        });
        self.marks.push(Arc::clone(&mark));
        mark
    }

    /// Marks passed when distance goes from `from` to `to`, in registration order.
    pub fn crossed(&self, from: u32, to: u32) -> impl Iterator<Item = &Arc<DistanceMark>> + '_ {
        self.marks.iter().filter(move |mark| mark.crossed_between(from, to))
    }

    /// All marks in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<DistanceMark>> + '_ {
        self.marks.iter()
    }

    /// Number of marks.
    pub fn len(&self) -> usize {
        self.marks.len()
    }

    /// No marks registered?
    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}
