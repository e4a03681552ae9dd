//! Line Monitor
//!
//! The facade that ties markers and rider tracking together, plus its
//! configuration and delivery layers.
//!
//! ## Module Structure
//!
//! - `events`: crossing event payload
//! - `bus`: synchronous listener fan-out
//! - `line_monitor`: marker registration and rider updates
//! - `config`: runtime knobs and the JSON settings document
//! - `service`: async worker with bounded queues

pub mod bus;
pub mod config;
pub mod events;
pub mod line_monitor;
pub mod service;

// Re-export key types
pub use bus::{CrossingBus, CrossingListener, ListenerId};
pub use config::{ConfigError, MonitorConfig, MonitorSettings};
pub use events::{CrossingEvent, MarkerKind, Segment};
pub use line_monitor::LineMonitor;
pub use service::{MonitorHandle, MonitorService, SampleEnvelope, ServiceError};
