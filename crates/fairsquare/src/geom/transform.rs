//! Canonical-frame transform: quarter-turn rotation, translation, scale.
//!
//! The division variants all operate in a working frame where the designated
//! southern wall lies on the x axis and the width (when finite) is 1. The
//! forward map is rotate, then translate, then scale; the inverse is the
//! exact algebraic inverse and is applied to every output plot.

use nalgebra::Vector2;

use super::types::Rect;

/// Rotate a point by `quarters` counterclockwise quarter turns.
#[inline]
pub fn rotate_quarters(p: Vector2<f64>, quarters: u8) -> Vector2<f64> {
    match quarters % 4 {
        0 => p,
        1 => Vector2::new(-p.y, p.x),
        2 => Vector2::new(-p.x, -p.y),
        _ => Vector2::new(p.y, -p.x),
    }
}

/// Rotate a rectangle by quarter turns (corners move, bounds are re-sorted).
/// Works with infinite bounds since rotation only swaps and negates.
pub fn rotate_rect(r: &Rect, quarters: u8) -> Rect {
    let a = rotate_quarters(Vector2::new(r.minx, r.miny), quarters);
    let b = rotate_quarters(Vector2::new(r.maxx, r.maxy), quarters);
    Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
}

/// Affine map into the canonical frame: `p -> (rot(p) + t) * s`.
#[derive(Clone, Copy, Debug)]
pub struct FrameTransform {
    quarters: u8,
    translate: Vector2<f64>,
    scale: f64,
}

impl FrameTransform {
    pub fn new(quarters: u8, translate: Vector2<f64>, scale: f64) -> Self {
        Self {
            quarters: quarters % 4,
            translate,
            scale,
        }
    }

    #[inline]
    pub fn apply_point(&self, p: Vector2<f64>) -> Vector2<f64> {
        (rotate_quarters(p, self.quarters) + self.translate) * self.scale
    }

    #[inline]
    pub fn invert_point(&self, p: Vector2<f64>) -> Vector2<f64> {
        rotate_quarters(p / self.scale - self.translate, (4 - self.quarters) % 4)
    }

    pub fn apply_rect(&self, r: &Rect) -> Rect {
        let a = self.apply_point(Vector2::new(r.minx, r.miny));
        let b = self.apply_point(Vector2::new(r.maxx, r.maxy));
        Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }

    pub fn invert_rect(&self, r: &Rect) -> Rect {
        let a = self.invert_point(Vector2::new(r.minx, r.miny));
        let b = self.invert_point(Vector2::new(r.maxx, r.maxy));
        Rect::new(a.x.min(b.x), a.y.min(b.y), a.x.max(b.x), a.y.max(b.y))
    }
}
