//! Per-agent valuations: a finite point set with equally weighted points.

use nalgebra::Vector2;

use crate::geom::GEOM_EPS;

/// Quadrant into which an anchored square grows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quadrant {
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

/// One agent's valuation. The point set is read-only for the whole of one
/// division call; re-expressing the points in another coordinate frame goes
/// through `clone_with_new_points`.
#[derive(Clone, Debug)]
pub struct ValueFunction {
    pub points: Vec<Vector2<f64>>,
    pub color: Option<String>,
    /// Search ceiling for the value this agent may be asked to reach.
    /// Defaults to the point count; the driver overrides it with the
    /// per-variant target.
    pub total_value: f64,
}

impl ValueFunction {
    pub fn new(points: Vec<Vector2<f64>>, color: Option<String>) -> Self {
        let total_value = points.len() as f64;
        Self {
            points,
            color,
            total_value,
        }
    }

    pub fn with_total_value(
        points: Vec<Vector2<f64>>,
        color: Option<String>,
        total_value: f64,
    ) -> Self {
        Self {
            points,
            color,
            total_value,
        }
    }

    /// Same color and total-value policy, different point set.
    pub fn clone_with_new_points(&self, points: Vec<Vector2<f64>>) -> Self {
        Self {
            points,
            color: self.color.clone(),
            total_value: self.total_value,
        }
    }

    /// Minimal edge length of the axis-aligned square anchored at `anchor`,
    /// growing into `quadrant`, whose closed area contains at least
    /// `required` (rounded up) of this agent's points. `f64::INFINITY` when
    /// the quadrant never collects enough points at any size.
    ///
    /// A point's quadrant distance from the anchor is `max(dx, dy)` with
    /// quadrant-appropriate signs, so the answer is the k-th smallest such
    /// distance among the points inside the quadrant.
    pub fn size_of_square_with_value(
        &self,
        anchor: Vector2<f64>,
        required: f64,
        quadrant: Quadrant,
    ) -> f64 {
        let k = required.ceil().max(1.0) as usize;
        let mut dists: Vec<f64> = Vec::with_capacity(self.points.len());
        for p in &self.points {
            let (dx, dy) = quadrant_offsets(*p - anchor, quadrant);
            if dx >= -GEOM_EPS && dy >= -GEOM_EPS {
                dists.push(dx.max(dy).max(0.0));
            }
        }
        if dists.len() < k {
            return f64::INFINITY;
        }
        let (_, kth, _) = dists.select_nth_unstable_by(k - 1, |a, b| {
            a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
        });
        *kth
    }
}

#[inline]
fn quadrant_offsets(d: Vector2<f64>, quadrant: Quadrant) -> (f64, f64) {
    match quadrant {
        Quadrant::NorthEast => (d.x, d.y),
        Quadrant::NorthWest => (-d.x, d.y),
        Quadrant::SouthEast => (d.x, -d.y),
        Quadrant::SouthWest => (-d.x, -d.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::vector;

    fn vf(points: &[(f64, f64)]) -> ValueFunction {
        ValueFunction::new(points.iter().map(|&(x, y)| vector![x, y]).collect(), None)
    }

    #[test]
    fn north_east_query_picks_kth_distance() {
        let v = vf(&[(0.0, 0.0), (0.0, 300.0), (300.0, 0.0), (300.0, 300.0)]);
        let a = vector![0.0, 0.0];
        assert_eq!(v.size_of_square_with_value(a, 1.0, Quadrant::NorthEast), 0.0);
        assert_eq!(
            v.size_of_square_with_value(a, 2.0, Quadrant::NorthEast),
            300.0
        );
        assert_eq!(
            v.size_of_square_with_value(a, 4.0, Quadrant::NorthEast),
            300.0
        );
        assert!(v
            .size_of_square_with_value(a, 5.0, Quadrant::NorthEast)
            .is_infinite());
    }

    #[test]
    fn quadrants_restrict_membership() {
        let v = vf(&[(10.0, 10.0), (-10.0, 10.0), (10.0, -10.0), (-10.0, -10.0)]);
        let a = vector![0.0, 0.0];
        for q in [
            Quadrant::NorthEast,
            Quadrant::NorthWest,
            Quadrant::SouthEast,
            Quadrant::SouthWest,
        ] {
            assert_eq!(v.size_of_square_with_value(a, 1.0, q), 10.0);
            assert!(v.size_of_square_with_value(a, 2.0, q).is_infinite());
        }
    }

    #[test]
    fn boundary_points_count() {
        let v = vf(&[(5.0, 0.0), (0.0, 5.0)]);
        // Both points sit on the boundary of the 5x5 square.
        assert_eq!(
            v.size_of_square_with_value(vector![0.0, 0.0], 2.0, Quadrant::NorthEast),
            5.0
        );
    }

    #[test]
    fn fractional_required_rounds_up() {
        let v = vf(&[(1.0, 0.0), (2.0, 0.0), (3.0, 0.0)]);
        let a = vector![0.0, 0.0];
        assert_eq!(
            v.size_of_square_with_value(a, 1.5, Quadrant::NorthEast),
            2.0
        );
    }

    #[test]
    fn north_west_measures_leftward() {
        let v = vf(&[(8.0, 2.0), (6.0, 1.0)]);
        let a = vector![10.0, 0.0];
        assert_eq!(
            v.size_of_square_with_value(a, 2.0, Quadrant::NorthWest),
            4.0
        );
    }
}
