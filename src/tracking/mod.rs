//! Rider Tracking
//!
//! Per-rider state and the transition logic that turns consecutive samples
//! into crossings.
//!
//! ## Module Structure
//!
//! - `rider`: cursor + last sample for one rider
//! - `engine`: transition classification and line/distance walks
//! - `cache`: expiring rider id → rider map
//! - `visibility`: optional bounding box for accepted samples

pub mod cache;
pub mod engine;
pub mod rider;
pub mod visibility;

// Re-export key types
pub use cache::{RiderCache, SharedRider};
pub use engine::{advance, classify, AdvanceResult, Transition};
pub use rider::Rider;
pub use visibility::VisibilityBox;
