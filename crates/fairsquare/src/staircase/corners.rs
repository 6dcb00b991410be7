//! Corner-form frontier for the two-wall staircase.
//!
//! Reflex corners of the free region, walked from south-east to north-west
//! (x non-increasing, y non-decreasing). Squares grow north-east from a
//! corner; the tie-break metric is the taxicab distance through the origin
//! corner, `x + y + size`.

use nalgebra::Vector2;

use crate::geom::{Rect, GEOM_EPS};
use crate::value::{Quadrant, ValueFunction};

/// Candidate square anchored at a frontier corner.
#[derive(Clone, Copy, Debug)]
pub struct CornerSquare {
    pub corner: Vector2<f64>,
    pub size: f64,
    pub taxicab: f64,
}

/// Ordered reflex corners of the free region.
#[derive(Clone, Debug)]
pub struct CornerFrontier {
    corners: Vec<Vector2<f64>>,
}

impl CornerFrontier {
    /// Fresh frontier: the single corner where the two walls meet.
    pub fn at_origin() -> Self {
        Self {
            corners: vec![Vector2::zeros()],
        }
    }

    pub fn from_corners(corners: Vec<Vector2<f64>>) -> Self {
        Self { corners }
    }

    #[inline]
    pub fn corners(&self) -> &[Vector2<f64>] {
        &self.corners
    }

    /// Cheapest satisfying square for one agent over all corners.
    pub fn best_square(&self, vf: &ValueFunction, required: f64) -> Option<CornerSquare> {
        let mut best: Option<CornerSquare> = None;
        for &corner in &self.corners {
            let size = vf.size_of_square_with_value(corner, required, Quadrant::NorthEast);
            if !size.is_finite() {
                continue;
            }
            let cand = CornerSquare {
                corner,
                size,
                taxicab: corner.x + corner.y + size,
            };
            if best.map_or(true, |b| cand.taxicab < b.taxicab) {
                best = Some(cand);
            }
        }
        best
    }

    /// Frontier after removing a square that grew north-east from one of the
    /// corners: keep corners south-east of it, insert its two new reflex
    /// corners, drop the corners it shades.
    pub fn carve_north_east(&self, square: &Rect) -> Self {
        if square.width() <= GEOM_EPS {
            return self.clone();
        }
        let n = self.corners.len();
        let mut out = Vec::with_capacity(n + 2);
        let mut c = 0;
        while c < n && self.corners[c].x >= square.maxx - GEOM_EPS {
            out.push(self.corners[c]);
            c += 1;
        }
        if c == n {
            panic!(
                "corner carve found no corner west of {:?} in {:?}",
                square, self.corners
            );
        }
        out.push(Vector2::new(square.maxx, self.corners[c].y));
        while c < n && self.corners[c].y < square.maxy - GEOM_EPS {
            c += 1;
        }
        // At least the anchored corner was shaded, so c > 0 here.
        out.push(Vector2::new(self.corners[c - 1].x, square.maxy));
        while c < n {
            out.push(self.corners[c]);
            c += 1;
        }
        Self { corners: out }
    }
}
