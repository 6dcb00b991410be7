//! Single-rectangle helper: the envelope-contained rectangle of bounded
//! aspect ratio containing the most points.
//!
//! Unlike the staircase core, which always produces exact squares, this
//! helper genuinely honors the aspect-ratio bound: when the envelope is too
//! wide (or too tall) it slides a window of the maximal admissible extent
//! over the candidate point coordinates and keeps the best count.

use nalgebra::Vector2;

use crate::geom::{Envelope, Rect};

/// Rectangle within `envelope` with width/height ratio at most
/// `max_aspect_ratio` containing the largest number of points.
/// Expects a bounded envelope.
pub fn square_with_max_points(
    points: &[Vector2<f64>],
    envelope: &Envelope,
    max_aspect_ratio: f64,
) -> Rect {
    let ar = max_aspect_ratio.max(1.0);
    let width = envelope.width();
    let height = envelope.height();
    let max_w = ar * height;
    let max_h = ar * width;
    if width <= max_w && height <= max_h {
        // The envelope itself satisfies the bound.
        return Rect::new(envelope.minx, envelope.miny, envelope.maxx, envelope.maxy);
    }
    if width > max_w {
        let mut xs: Vec<f64> = points
            .iter()
            .map(|p| p.x)
            .filter(|x| envelope.minx <= *x && *x <= envelope.maxx)
            .collect();
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        xs.dedup();
        if xs.is_empty() {
            return Rect::new(envelope.minx, envelope.miny, envelope.minx + max_w, envelope.maxy);
        }
        let mut best = Rect::new(xs[0], envelope.miny, (xs[0] + max_w).min(envelope.maxx), envelope.maxy);
        let mut best_num = 0usize;
        for &x in &xs {
            let cand = Rect::new(x, envelope.miny, (x + max_w).min(envelope.maxx), envelope.maxy);
            let num = points_in_rect(points, &cand);
            if num > best_num {
                best_num = num;
                best = cand;
            }
        }
        best
    } else {
        let mut ys: Vec<f64> = points
            .iter()
            .map(|p| p.y)
            .filter(|y| envelope.miny <= *y && *y <= envelope.maxy)
            .collect();
        ys.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        ys.dedup();
        if ys.is_empty() {
            return Rect::new(envelope.minx, envelope.miny, envelope.maxx, envelope.miny + max_h);
        }
        let mut best = Rect::new(envelope.minx, ys[0], envelope.maxx, (ys[0] + max_h).min(envelope.maxy));
        let mut best_num = 0usize;
        for &y in &ys {
            let cand = Rect::new(envelope.minx, y, envelope.maxx, (y + max_h).min(envelope.maxy));
            let num = points_in_rect(points, &cand);
            if num > best_num {
                best_num = num;
                best = cand;
            }
        }
        best
    }
}

fn points_in_rect(points: &[Vector2<f64>], rect: &Rect) -> usize {
    points.iter().filter(|p| rect.contains_point(**p)).count()
}
