//! Line Registry
//!
//! Lines are timing gates pinned to a road time on one road. Each
//! (world, road) bucket keeps its lines ordered by road time with no
//! duplicates, so a rider's position can be bracketed by the line ahead and
//! the line behind in O(log n).

use std::collections::BTreeMap;
use std::ops::Bound::{Excluded, Unbounded};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::core::types::{MarkerId, RoadId, RoadTime, WorldId};
use crate::markers::MarkerError;

// =============================================================================
// LINE
// =============================================================================

/// A timing line on a road.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Line {
    /// Marker id
    pub id: MarkerId,
    /// Display name
    pub name: String,
    /// World the road belongs to
    pub world: WorldId,
    /// Road the line sits on
    pub road: RoadId,
    /// Position along the road, in wire units
    pub road_time: RoadTime,
}

/// The lines on either side of a road position.
#[derive(Clone, Debug, Default)]
pub struct LineBracket {
    /// First line strictly ahead of the position
    pub next: Option<Arc<Line>>,
    /// Last line at or behind the position
    pub prev: Option<Arc<Line>>,
}

impl LineBracket {
    /// No lines on either side.
    pub const EMPTY: LineBracket = LineBracket { next: None, prev: None };
}

type RoadLines = BTreeMap<RoadTime, Arc<Line>>;

// =============================================================================
// REGISTRY
// =============================================================================

/// All configured lines, bucketed by (world, road).
///
/// Lines are permanent once added; handles returned from lookups stay valid
/// for the life of the process.
#[derive(Debug, Default)]
pub struct LineRegistry {
    roads: BTreeMap<(WorldId, RoadId), RoadLines>,
    count: usize,
}

impl LineRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a line.
    ///
    /// `road_time` below 2 is a legacy lap fraction and is converted to wire
    /// units first (see [`RoadTime::from_config`]).
    pub fn add_line(
        &mut self,
        id: MarkerId,
        name: impl Into<String>,
        world: WorldId,
        road: RoadId,
        road_time: f64,
    ) -> Result<Arc<Line>, MarkerError> {
        let converted = RoadTime::from_config(road_time)
            .ok_or(MarkerError::InvalidRoadTime { id, value: road_time })?;

        self.insert(Line {
            id,
            name: name.into(),
            world,
            road,
            road_time: converted,
        })
    }

    /// Register a line whose road time is already in wire units.
    pub fn insert(&mut self, line: Line) -> Result<Arc<Line>, MarkerError> {
        let bucket = self.roads.entry((line.world, line.road)).or_default();

        if let Some(existing) = bucket.get(&line.road_time) {
            return Err(MarkerError::DuplicateLine {
                id: line.id,
                name: line.name,
                world: line.world,
                road: line.road,
                road_time: line.road_time,
                existing: existing.name.clone(),
            });
        }

        let line = Arc::new(line);
        bucket.insert(line.road_time, Arc::clone(&line));
        self.count += 1;
        Ok(line)
    }

    /// Bracket a road position.
    ///
    /// A position exactly on a line treats that line as `prev` (already
    /// crossed). Unknown roads yield [`LineBracket::EMPTY`].
    pub fn find_lines(&self, world: WorldId, road: RoadId, road_time: RoadTime) -> LineBracket {
        let Some(bucket) = self.roads.get(&(world, road)) else {
            return LineBracket::EMPTY;
        };

        LineBracket {
            next: bucket
                .range((Excluded(road_time), Unbounded))
                .next()
                .map(|(_, line)| Arc::clone(line)),
            prev: bucket
                .range(..=road_time)
                .next_back()
                .map(|(_, line)| Arc::clone(line)),
        }
    }

    /// The line following `line` on its road.
    pub fn after(&self, line: &Line) -> Option<Arc<Line>> {
        self.roads
            .get(&(line.world, line.road))?
            .range((Excluded(line.road_time), Unbounded))
            .next()
            .map(|(_, next)| Arc::clone(next))
    }

    /// The line preceding `line` on its road.
    pub fn before(&self, line: &Line) -> Option<Arc<Line>> {
        self.roads
            .get(&(line.world, line.road))?
            .range(..line.road_time)
            .next_back()
            .map(|(_, prev)| Arc::clone(prev))
    }

    /// Lines on a road in increasing road time.
    pub fn lines_on(&self, world: WorldId, road: RoadId) -> impl Iterator<Item = &Arc<Line>> + '_ {
        self.roads
            .get(&(world, road))
            .into_iter()
            .flat_map(|bucket| bucket.values())
    }

    /// Total number of lines.
    pub fn len(&self) -> usize {
        self.count
    }

    /// No lines registered?
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of (world, road) buckets with at least one line.
    pub fn road_count(&self) -> usize {
        self.roads.values().filter(|bucket| !bucket.is_empty()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn registry_with(times: &[u32]) -> LineRegistry {
        let mut registry = LineRegistry::new();
        for (i, t) in times.iter().enumerate() {
            registry
                .add_line(MarkerId(i as u64), format!("line {}", i), 1, 1, *t as f64)
                .unwrap();
        }
        registry
    }

    fn times_on(registry: &LineRegistry, world: WorldId, road: RoadId) -> Vec<u32> {
        registry.lines_on(world, road).map(|l| l.road_time.units()).collect()
    }

    #[test]
    fn test_add_line_converts_fractions() {
        let mut registry = LineRegistry::new();
        let line = registry.add_line(MarkerId(1), "line 1", 1, 1, 0.1).unwrap();
        assert_eq!(line.road_time, RoadTime(105_000));

        let line = registry.add_line(MarkerId(2), "line 2", 1, 1, 400_000.0).unwrap();
        assert_eq!(line.road_time, RoadTime(400_000));
    }

    #[test]
    fn test_out_of_order_inserts_stay_sorted() {
        let registry = registry_with(&[300_000, 100_000, 500_000, 200_000]);
        assert_eq!(times_on(&registry, 1, 1), vec![100_000, 200_000, 300_000, 500_000]);
        assert_eq!(registry.len(), 4);
        assert_eq!(registry.road_count(), 1);
    }

    #[test]
    fn test_duplicate_rejected_and_registry_unchanged() {
        let mut registry = registry_with(&[100_000, 200_000]);

        let err = registry
            .add_line(MarkerId(9), "clash", 1, 1, 200_000.0)
            .unwrap_err();
        match err {
            MarkerError::DuplicateLine { existing, road_time, .. } => {
                assert_eq!(existing, "line 1");
                assert_eq!(road_time, RoadTime(200_000));
            }
            other => panic!("unexpected error: {:?}", other),
        }

        assert_eq!(registry.len(), 2);
        assert_eq!(times_on(&registry, 1, 1), vec![100_000, 200_000]);
    }

    #[test]
    fn test_duplicate_via_fraction() {
        let mut registry = LineRegistry::new();
        registry.add_line(MarkerId(1), "a", 1, 1, 0.2).unwrap();
        assert!(registry.add_line(MarkerId(2), "b", 1, 1, 205_000.0).is_err());
    }

    #[test]
    fn test_same_time_on_other_road_allowed() {
        let mut registry = LineRegistry::new();
        registry.add_line(MarkerId(1), "a", 1, 1, 0.2).unwrap();
        registry.add_line(MarkerId(2), "b", 1, 2, 0.2).unwrap();
        registry.add_line(MarkerId(3), "c", 2, 1, 0.2).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.road_count(), 3);
    }

    #[test]
    fn test_invalid_road_time() {
        let mut registry = LineRegistry::new();
        let err = registry.add_line(MarkerId(1), "bad", 1, 1, f64::NAN).unwrap_err();
        assert!(matches!(err, MarkerError::InvalidRoadTime { .. }));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_find_lines_brackets() {
        let registry = registry_with(&[100_000, 200_000, 300_000]);

        let b = registry.find_lines(1, 1, RoadTime(150_000));
        assert_eq!(b.prev.unwrap().road_time, RoadTime(100_000));
        assert_eq!(b.next.unwrap().road_time, RoadTime(200_000));

        // Before the first line
        let b = registry.find_lines(1, 1, RoadTime(50_000));
        assert!(b.prev.is_none());
        assert_eq!(b.next.unwrap().road_time, RoadTime(100_000));

        // Past the last line: prev is the tail
        let b = registry.find_lines(1, 1, RoadTime(900_000));
        assert!(b.next.is_none());
        assert_eq!(b.prev.unwrap().road_time, RoadTime(300_000));
    }

    #[test]
    fn test_find_lines_exact_hit_is_prev() {
        let registry = registry_with(&[100_000, 200_000, 300_000]);
        let b = registry.find_lines(1, 1, RoadTime(200_000));
        assert_eq!(b.prev.unwrap().road_time, RoadTime(200_000));
        assert_eq!(b.next.unwrap().road_time, RoadTime(300_000));
    }

    #[test]
    fn test_find_lines_unknown_road() {
        let registry = registry_with(&[100_000]);
        let b = registry.find_lines(1, 99, RoadTime(0));
        assert!(b.next.is_none() && b.prev.is_none());
        let b = registry.find_lines(42, 1, RoadTime(0));
        assert!(b.next.is_none() && b.prev.is_none());
    }

    #[test]
    fn test_links() {
        let registry = registry_with(&[100_000, 200_000, 300_000]);
        let lines: Vec<_> = registry.lines_on(1, 1).cloned().collect();

        assert!(registry.before(&lines[0]).is_none());
        assert_eq!(registry.after(&lines[0]).unwrap(), lines[1]);
        assert_eq!(registry.before(&lines[2]).unwrap(), lines[1]);
        assert!(registry.after(&lines[2]).is_none());
    }

    proptest! {
        #[test]
        fn prop_sequence_sorted_and_linked(times in proptest::collection::vec(2u32..1_000_000, 0..40)) {
            let mut registry = LineRegistry::new();
            let mut accepted = std::collections::BTreeSet::new();
            for (i, t) in times.iter().enumerate() {
                let result = registry.add_line(MarkerId(i as u64), "l", 3, 7, *t as f64);
                prop_assert_eq!(result.is_ok(), accepted.insert(*t));
            }

            let lines: Vec<_> = registry.lines_on(3, 7).cloned().collect();
            prop_assert_eq!(lines.len(), accepted.len());
            for pair in lines.windows(2) {
                prop_assert!(pair[0].road_time < pair[1].road_time);
                let next = registry.after(&pair[0]).unwrap();
                prop_assert_eq!(&next, &pair[1]);
                let prev = registry.before(&next).unwrap();
                prop_assert_eq!(&prev, &pair[0]);
            }
        }

        #[test]
        fn prop_find_lines_brackets_query(
            times in proptest::collection::btree_set(2u32..1_000_000, 0..30),
            query in 0u32..1_100_000,
        ) {
            let mut registry = LineRegistry::new();
            for (i, t) in times.iter().enumerate() {
                registry.add_line(MarkerId(i as u64), "l", 1, 1, *t as f64).unwrap();
            }

            let bracket = registry.find_lines(1, 1, RoadTime(query));
            if let Some(prev) = &bracket.prev {
                prop_assert!(prev.road_time.units() <= query);
            } else {
                prop_assert!(times.iter().all(|t| *t > query));
            }
            if let Some(next) = &bracket.next {
                prop_assert!(next.road_time.units() > query);
            } else {
                prop_assert!(times.iter().all(|t| *t <= query));
            }
            if let (Some(prev), Some(next)) = (&bracket.prev, &bracket.next) {
                prop_assert_eq!(&registry.after(prev).unwrap(), next);
            }
        }
    }
}
