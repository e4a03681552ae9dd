//! # Line Monitor
//!
//! Virtual timing gates for live rider telemetry. Position samples go in,
//! crossing events come out whenever a rider's interpolated path passes a
//! configured line on a road or a cumulative-distance mark.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      LINE MONITOR                            │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Shared primitives                         │
//! │  ├── types.rs    - Ids and the fixed-point RoadTime          │
//! │  ├── sample.rs   - Decoded telemetry sample                  │
//! │  └── interpolate.rs - Crossing interpolation math            │
//! │                                                              │
//! │  markers/        - Configured markers (read-mostly)          │
//! │  ├── lines.rs    - Per-road ordered line registry            │
//! │  └── distance.rs - Distance mark registry                    │
//! │                                                              │
//! │  tracking/       - Per-rider state                           │
//! │  ├── rider.rs    - Rider cursor + last sample                │
//! │  ├── engine.rs   - Transition classification + line walks    │
//! │  ├── cache.rs    - Expiring rider cache                      │
//! │  └── visibility.rs - Optional bounding box filter            │
//! │                                                              │
//! │  monitor/        - Public surface                            │
//! │  ├── events.rs   - Crossing events                           │
//! │  ├── bus.rs      - Ordered listener fan-out                  │
//! │  ├── line_monitor.rs - Synchronous facade                    │
//! │  ├── config.rs   - Runtime knobs + JSON settings             │
//! │  └── service.rs  - Async queue-backed service                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering Guarantee
//!
//! Every update for a rider runs under that rider's lock, from cursor lookup
//! through event publication. Events for one rider therefore reach every
//! listener in generation order: line crossings in walk order, then
//! distance-mark crossings.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod markers;
pub mod monitor;
pub mod tracking;

// Re-export commonly used types
pub use core::sample::PlayerSample;
pub use core::types::{MarkerId, RiderId, RoadId, RoadTime, WorldId};
pub use markers::{DistanceMark, Line, MarkerError};
pub use monitor::{
    CrossingEvent, ListenerId, LineMonitor, MarkerKind, MonitorConfig, MonitorHandle,
    MonitorService, MonitorSettings,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default idle time before a rider's tracking state is discarded (seconds).
pub const DEFAULT_RIDER_TIMEOUT_SECS: u64 = 10;

/// Default interval between expired-rider sweeps (seconds).
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
