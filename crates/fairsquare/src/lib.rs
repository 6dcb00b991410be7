//! Half-proportional land division.
//!
//! Purpose
//! - Divide a planar region among colored agents, each valuing a finite set
//!   of equally weighted points, so that every agent receives a disjoint
//!   axis-aligned square containing a guaranteed number of its own points.
//! - The guarantee is a lower bound per agent, searched as high as feasible;
//!   full coverage of the region is not attempted (plots may leave gaps).
//!
//! Module map
//! - `geom`: envelopes with unbounded sides, the canonical-frame transform,
//!   shared planar types and tolerances.
//! - `value`: per-agent valuations and the minimal-square value query.
//! - `staircase`: the recursive peeling core over level and corner frontiers.
//! - `division`: envelope classification, the value search, the halving
//!   wrappers for mostly-open regions, and the public entry point.
//! - `square_max`: the single-rectangle helper that honors the aspect bound.
//! - `sampling`: deterministic point-cloud instances for tests and benches.

pub mod division;
pub mod geom;
pub mod sampling;
pub mod square_max;
pub mod staircase;
pub mod value;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::division::{
        half_proportional_division, AgentPoints, Division, DivisionError,
    };
    pub use crate::geom::{Envelope, Rect, Side};
    pub use crate::square_max::square_with_max_points;
    pub use crate::staircase::Landplot;
    pub use crate::value::{Quadrant, ValueFunction};
    pub use nalgebra::Vector2 as Vec2;
}
