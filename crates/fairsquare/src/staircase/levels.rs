//! Level-form frontier for the walled staircase variants.
//!
//! The frontier is a row of horizontal shelves covering the southern
//! boundary of the free region, ordered west to east. Every carve raises
//! the covered sub-interval and coalesces equal neighbors, so the shelf
//! count grows by at most a constant per assignment; that bound is what the
//! feasibility search's value guarantees rest on.

use crate::geom::{Rect, GEOM_EPS};

/// One horizontal shelf of the frontier.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Level {
    pub y: f64,
    pub minx: f64,
    pub maxx: f64,
}

/// Per-pass view of a level inside its neighborhood.
#[derive(Clone, Copy, Debug)]
pub struct LevelInfo {
    pub level: Level,
    /// Shelf height immediately west of this level (`inf` at a wall).
    pub y_west: f64,
    /// Shelf height immediately east of this level (`inf` at a wall).
    pub y_east: f64,
    /// Both neighbors are higher: a pocket that can be filled when nobody
    /// bids on it.
    pub is_knob: bool,
    /// Westmost x a square footed on this level may reach (its footprint
    /// may hover over contiguous lower shelves).
    pub west_ext: f64,
    /// Eastmost x a square footed on this level may reach.
    pub east_ext: f64,
}

/// Ordered shelves covering the southern boundary of the free region.
#[derive(Clone, Debug)]
pub struct LevelFrontier {
    levels: Vec<Level>,
}

impl LevelFrontier {
    /// Fresh frontier: one shelf at y=0 spanning the full width.
    pub fn new_south(width: f64) -> Self {
        Self {
            levels: vec![Level {
                y: 0.0,
                minx: 0.0,
                maxx: width,
            }],
        }
    }

    pub fn from_levels(levels: Vec<Level>) -> Self {
        Self { levels }
    }

    #[inline]
    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Derive the neighborhood view of every level.
    pub fn annotate(&self) -> Vec<LevelInfo> {
        let n = self.levels.len();
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            let level = self.levels[i];
            let y_west = if i == 0 {
                f64::INFINITY
            } else {
                self.levels[i - 1].y
            };
            let y_east = if i + 1 == n {
                f64::INFINITY
            } else {
                self.levels[i + 1].y
            };
            let mut j = i;
            while j > 0 && self.levels[j - 1].y <= level.y + GEOM_EPS {
                j -= 1;
            }
            let west_ext = self.levels[j].minx;
            let mut j = i;
            while j + 1 < n && self.levels[j + 1].y <= level.y + GEOM_EPS {
                j += 1;
            }
            let east_ext = self.levels[j].maxx;
            out.push(LevelInfo {
                level,
                y_west,
                y_east,
                is_knob: y_west > level.y + GEOM_EPS && y_east > level.y + GEOM_EPS,
                west_ext,
                east_ext,
            });
        }
        out
    }

    /// Remove a knob nobody bids on: raise it to the lower neighbor and
    /// merge, or drop it entirely when both neighbors are walls.
    pub fn fill_knob(&mut self, i: usize) {
        let y_west = if i == 0 {
            f64::INFINITY
        } else {
            self.levels[i - 1].y
        };
        let y_east = if i + 1 == self.levels.len() {
            f64::INFINITY
        } else {
            self.levels[i + 1].y
        };
        let target = y_west.min(y_east);
        if target.is_finite() {
            self.levels[i].y = target;
            self.coalesce();
        } else {
            self.levels.remove(i);
        }
    }

    /// Frontier after removing an awarded square whose base sits on one of
    /// the shelves. The covered sub-interval is raised to the square's top;
    /// partially covered shelves are split; equal neighbors merge. Pockets
    /// sealed under an overhang are abandoned (gaps are allowed).
    pub fn carve(&self, square: &Rect) -> Self {
        if square.width() <= GEOM_EPS {
            return self.clone();
        }
        let raised = Level {
            y: square.maxy,
            minx: square.minx,
            maxx: square.maxx,
        };
        let mut out = Vec::with_capacity(self.levels.len() + 2);
        let mut raised_pushed = false;
        for l in &self.levels {
            if l.maxx <= square.minx + GEOM_EPS {
                out.push(*l);
                continue;
            }
            if l.minx >= square.maxx - GEOM_EPS {
                if !raised_pushed {
                    out.push(raised);
                    raised_pushed = true;
                }
                out.push(*l);
                continue;
            }
            // Footprint overlaps this shelf; it must not cut into territory
            // that already rose above the square's base.
            if l.y > square.miny + GEOM_EPS {
                panic!(
                    "staircase carve hit a shelf above the square base: shelf {:?}, square {:?}",
                    l, square
                );
            }
            if l.minx < square.minx - GEOM_EPS {
                out.push(Level {
                    y: l.y,
                    minx: l.minx,
                    maxx: square.minx,
                });
            }
            if !raised_pushed {
                out.push(raised);
                raised_pushed = true;
            }
            if l.maxx > square.maxx + GEOM_EPS {
                out.push(Level {
                    y: l.y,
                    minx: square.maxx,
                    maxx: l.maxx,
                });
            }
        }
        if !raised_pushed {
            panic!(
                "staircase carve outside the frontier: square {:?}, levels {:?}",
                square, self.levels
            );
        }
        let mut next = Self { levels: out };
        next.coalesce();
        next
    }

    fn coalesce(&mut self) {
        let mut out: Vec<Level> = Vec::with_capacity(self.levels.len());
        for l in self.levels.drain(..) {
            if l.maxx - l.minx <= GEOM_EPS {
                continue;
            }
            if let Some(last) = out.last_mut() {
                if (last.y - l.y).abs() <= GEOM_EPS {
                    last.maxx = l.maxx;
                    continue;
                }
            }
            out.push(l);
        }
        self.levels = out;
    }
}
