//! Planar geometry for the division pipeline.
//!
//! Purpose
//! - Provide the envelope type (axis-aligned, any side may be unbounded),
//!   the canonical-frame transform (quarter-turn rotation, translation,
//!   uniform scale) and the small shared types the staircase core builds on.
//! - Keep numerics explicit: one shared epsilon, boundary-inclusive
//!   containment everywhere.

pub mod envelope;
pub mod transform;
mod types;

pub use envelope::{southern_side_for_open_pair, Envelope};
pub use transform::{rotate_quarters, rotate_rect, FrameTransform};
pub use types::{Rect, Side};

/// Membership/comparison epsilon shared by frontier and query code.
pub const GEOM_EPS: f64 = 1e-9;
