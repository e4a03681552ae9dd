//! Crossing Engine
//!
//! Moves a rider from its last sample to a new one and reports every marker
//! passed on the way.
//!
//! ## Transitions
//!
//! - `First`: no previous sample. Seed the cursor, emit nothing.
//! - `Relocated`: new road, new world, or the road time moved against the
//!   reported direction (lap wraparound). Re-seed the cursor; markers between
//!   the stale and fresh positions are never inferred as crossed.
//! - `Stationary`: same road time. No line walk.
//! - `Moving`: walk the cursor forward, or failing that backward, emitting a
//!   crossing per line passed.
//!
//! Distance marks are checked on every transition that has a previous sample
//! and are emitted after any line crossings.

use crate::core::interpolate::crossing_factor;
use crate::core::sample::PlayerSample;
use crate::markers::{DistanceMarkRegistry, Line, LineBracket, LineRegistry};
use crate::monitor::events::{CrossingEvent, MarkerKind, Segment};
use crate::tracking::rider::Rider;

/// How a new sample relates to the rider's last one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// First sample for this rider
    First,
    /// Road change or wraparound; cursor re-seeded
    Relocated,
    /// Road time unchanged
    Stationary,
    /// Continuous movement along the same road
    Moving,
}

/// Outcome of one update.
#[derive(Debug)]
pub struct AdvanceResult {
    /// How the sample was classified
    pub transition: Transition,
    /// Crossings in emission order
    pub events: Vec<CrossingEvent>,
}

/// Classify `sample` against the rider's previous sample.
pub fn classify(last: Option<&PlayerSample>, sample: &PlayerSample) -> Transition {
    match last {
        None => Transition::First,
        Some(last) if !sample.same_road(last) || sample.wrapped_from(last) => Transition::Relocated,
        Some(last) if sample.road_time == last.road_time => Transition::Stationary,
        Some(_) => Transition::Moving,
    }
}

/// Apply one sample to a rider.
///
/// On return the sample is the rider's last state. The caller is
/// responsible for holding the rider exclusively for the whole call.
pub fn advance(
    rider: &mut Rider,
    sample: PlayerSample,
    server_world_time: i64,
    lines: &LineRegistry,
    marks: &DistanceMarkRegistry,
) -> AdvanceResult {
    let transition = classify(rider.last_sample.as_ref(), &sample);
    let mut events = Vec::new();

    match transition {
        Transition::First | Transition::Relocated => {
            rider.cursor = lines.find_lines(sample.world, sample.road, sample.road_time);
        }
        Transition::Stationary | Transition::Moving => {}
    }

    if let Some(last) = rider.last_sample.as_ref() {
        let segment = Segment {
            from: last,
            from_server_time: rider.last_server_world_time,
            to: &sample,
            to_server_time: server_world_time,
        };

        if transition == Transition::Moving {
            walk_lines(&mut rider.cursor, &segment, lines, &mut events);
        }

        for mark in marks.crossed(last.distance, sample.distance) {
            let factor = crossing_factor(mark.distance as f64, last.distance as f64, sample.distance as f64);
            events.push(CrossingEvent::interpolated(
                MarkerKind::Distance,
                mark.id,
                &mark.name,
                &segment,
                factor,
            ));
        }
    }

    rider.record(sample, server_world_time);

    AdvanceResult { transition, events }
}

/// Walk the cursor to the segment's end position, emitting line crossings.
///
/// The forward walk crosses every line up to and including the new
/// position. The backward walk only runs when the forward walk crossed
/// nothing, so a sample landing exactly on a line crosses it once.
fn walk_lines(
    cursor: &mut LineBracket,
    segment: &Segment<'_>,
    lines: &LineRegistry,
    events: &mut Vec<CrossingEvent>,
) {
    let position = segment.to.road_time;
    let mut crossed_forward = false;

    while let Some(next) = cursor.next.clone().filter(|line| position >= line.road_time) {
        events.push(line_crossing(&next, segment));
        cursor.next = lines.after(&next);
        cursor.prev = Some(next);
        crossed_forward = true;
    }

    if crossed_forward {
        return;
    }

    while let Some(prev) = cursor.prev.clone().filter(|line| position <= line.road_time) {
        events.push(line_crossing(&prev, segment));
        cursor.prev = lines.before(&prev);
        cursor.next = Some(prev);
    }
}

fn line_crossing(line: &Line, segment: &Segment<'_>) -> CrossingEvent {
    let factor = crossing_factor(
        line.road_time.as_f64(),
        segment.from.road_time.as_f64(),
        segment.to.road_time.as_f64(),
    );
    CrossingEvent::interpolated(MarkerKind::Line, line.id, &line.name, segment, factor)
}
