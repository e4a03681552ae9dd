//! Rider Tracking State
//!
//! Per-rider cursor into the line registry plus the last accepted sample.

use crate::core::sample::PlayerSample;
use crate::core::types::RiderId;
use crate::markers::LineBracket;

/// Tracking record for one rider.
///
/// A fresh record has no last sample; the first accepted sample seeds the
/// cursor and every later one is measured against the previous.
#[derive(Clone, Debug)]
pub struct Rider {
    /// Rider identifier
    pub id: RiderId,
    /// Lines ahead of and behind the rider's last position
    pub cursor: LineBracket,
    pub(crate) last_sample: Option<PlayerSample>,
    pub(crate) last_server_world_time: i64,
}

impl Rider {
    /// Create an untracked rider.
    pub fn new(id: RiderId) -> Self {
        Self {
            id,
            cursor: LineBracket::default(),
            last_sample: None,
            last_server_world_time: 0,
        }
    }

    /// Has this rider produced an accepted sample yet?
    pub fn is_tracking(&self) -> bool {
        self.last_sample.is_some()
    }

    /// Last accepted sample.
    pub fn last_sample(&self) -> Option<&PlayerSample> {
        self.last_sample.as_ref()
    }

    /// Server world time of the last accepted sample.
    pub fn last_server_world_time(&self) -> i64 {
        self.last_server_world_time
    }

    /// Make `sample` the rider's last state.
    pub fn record(&mut self, sample: PlayerSample, server_world_time: i64) {
        self.last_sample = Some(sample);
        self.last_server_world_time = server_world_time;
    }
}
