//! Basic planar types: rectangles and cardinal sides.

use nalgebra::Vector2;

/// Axis-parallel rectangle `[minx, maxx] x [miny, maxy]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl Rect {
    #[inline]
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Self {
            minx,
            miny,
            maxx,
            maxy,
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.maxx - self.minx
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.maxy - self.miny
    }

    /// Boundary-inclusive containment.
    #[inline]
    pub fn contains_point(&self, p: Vector2<f64>) -> bool {
        self.minx <= p.x && p.x <= self.maxx && self.miny <= p.y && p.y <= self.maxy
    }

    /// True when the open interiors overlap by more than `eps` on both axes.
    pub fn interior_intersects(&self, other: &Rect, eps: f64) -> bool {
        let w = self.maxx.min(other.maxx) - self.minx.max(other.minx);
        let h = self.maxy.min(other.maxy) - self.miny.max(other.miny);
        w > eps && h > eps
    }
}

/// Cardinal side of an envelope.
///
/// Discriminants follow the rotation order used by canonicalization: one
/// counterclockwise quarter turn maps the side with index `q` onto South.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    South = 0,
    West = 1,
    North = 2,
    East = 3,
}

impl Side {
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn from_index(i: u8) -> Self {
        match i % 4 {
            0 => Side::South,
            1 => Side::West,
            2 => Side::North,
            _ => Side::East,
        }
    }

    #[inline]
    pub fn opposite(self) -> Self {
        Self::from_index(self.index() + 2)
    }
}
