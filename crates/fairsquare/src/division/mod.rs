//! Division driver.
//!
//! Purpose
//! - Classify the caller's envelope by its open sides, canonicalize into the
//!   working frame, run the largest-feasible-value search over the matching
//!   staircase variant, and map the resulting plots back.
//! - The 1-wall and 0-wall cases are higher-order wrappers: they halve the
//!   agents east/west at their indifference points and solve the halves with
//!   the next-more-constrained variant, comparing against the two degenerate
//!   everyone-on-one-side alternatives.
//!
//! The search re-runs the full recursive allocation from scratch for every
//! candidate value; agent counts are expected to stay small, so no
//! memoization is attempted across values.

use std::fmt;

use nalgebra::Vector2;
use tracing::{debug, warn};

use crate::geom::{
    rotate_rect, southern_side_for_open_pair, Envelope, FrameTransform, Rect, Side,
};
use crate::staircase::{corner_peel, CornerFrontier, Landplot, LevelFrontier, LevelPeel};
use crate::value::{Quadrant, ValueFunction};

/// Errors surfaced by the division driver.
#[derive(Debug)]
pub enum DivisionError {
    /// Both extents are non-positive after canonical rotation.
    DegenerateEnvelope { envelope: Envelope },
    /// `max_aspect_ratio` must be at least 1.
    InvalidAspectRatio { value: f64 },
}

impl fmt::Display for DivisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DivisionError::DegenerateEnvelope { envelope } => {
                write!(f, "zero-sized envelope: {:?}", envelope)
            }
            DivisionError::InvalidAspectRatio { value } => {
                write!(f, "max aspect ratio must be >= 1, got {}", value)
            }
        }
    }
}

impl std::error::Error for DivisionError {}

/// One agent's input: equally weighted points plus an optional color tag.
#[derive(Clone, Debug)]
pub struct AgentPoints {
    pub points: Vec<Vector2<f64>>,
    pub color: Option<String>,
}

/// Result of a division call. `plots` has at most one entry per agent;
/// agents without a point inside the envelope are absent, so callers must
/// match plots to agents by color rather than by position.
#[derive(Clone, Debug, Default)]
pub struct Division {
    pub plots: Vec<Landplot>,
    /// Largest per-agent value the search could guarantee, `None` when no
    /// agent could be placed.
    pub min_value_per_agent: Option<f64>,
}

/// Compute a half-proportional division of `envelope` among `agents`.
///
/// Each returned plot is an axis-aligned square containing at least
/// `min_value_per_agent` of its agent's points. The aspect-ratio bound is
/// accepted for interface compatibility; the staircase core always produces
/// exact squares (see `square_max` for the helper that honors it).
pub fn half_proportional_division(
    agents: &[AgentPoints],
    envelope: &Envelope,
    max_aspect_ratio: f64,
) -> Result<Division, DivisionError> {
    if !(max_aspect_ratio >= 1.0) {
        return Err(DivisionError::InvalidAspectRatio {
            value: max_aspect_ratio,
        });
    }
    let open = envelope.open_sides();
    let n = agents.len() as f64;
    let mut division = match open.len() {
        0 => {
            // The 4-wall staircase assumes the southern side is the shorter.
            let southern = if envelope.width() <= envelope.height() {
                Side::South
            } else {
                Side::East
            };
            run_division(
                NormVariant::Walls4,
                southern,
                &make_value_functions(agents, 2.0 * n),
                envelope,
            )?
        }
        1 => run_division(
            NormVariant::Walls3,
            open[0].opposite(),
            &make_value_functions(agents, 2.0 * n - 1.0),
            envelope,
        )?,
        2 => match southern_side_for_open_pair(open[0], open[1]) {
            Some(southern) => run_division(
                NormVariant::Walls2,
                southern,
                &make_value_functions(agents, 2.0 * n - 1.0),
                envelope,
            )?,
            None => {
                // Two opposite open sides: clamp one infinite bound and solve
                // as three walls. Known approximation, not an exact solution
                // of this configuration.
                warn!(
                    envelope = ?envelope,
                    "two opposite open sides, clamping and treating as three walls"
                );
                let mut env = *envelope;
                if !env.minx.is_finite() {
                    env.minx = 0.0;
                }
                if !env.miny.is_finite() {
                    env.miny = 0.0;
                }
                let open = env.open_sides();
                run_division(
                    NormVariant::Walls3,
                    open[0].opposite(),
                    &make_value_functions(agents, 2.0 * n - 1.0),
                    &env,
                )?
            }
        },
        3 => {
            let closed = closed_side(&open);
            run_walls1(
                &make_value_functions(agents, (2.0 * n - 2.0).max(1.0)),
                closed,
                envelope,
            )?
        }
        _ => run_walls0(
            &make_value_functions(agents, (2.0 * n - 4.0).max(1.0)),
            Side::South,
            envelope,
        )?,
    };
    for plot in &mut division.plots {
        plot.rect = round_rect3(&plot.rect);
    }
    Ok(division)
}

/// Round a coordinate to the fixed output precision (3 decimals).
#[inline]
pub fn round3(x: f64) -> f64 {
    (x * 1000.0).round() / 1000.0
}

fn round_rect3(r: &Rect) -> Rect {
    Rect::new(round3(r.minx), round3(r.miny), round3(r.maxx), round3(r.maxy))
}

fn make_value_functions(agents: &[AgentPoints], total_value: f64) -> Vec<ValueFunction> {
    agents
        .iter()
        .map(|a| ValueFunction::with_total_value(a.points.clone(), a.color.clone(), total_value))
        .collect()
}

fn closed_side(open: &[Side]) -> Side {
    for side in [Side::South, Side::West, Side::North, Side::East] {
        if !open.contains(&side) {
            return side;
        }
    }
    Side::South
}

/// Staircase variants driven directly by the value search.
#[derive(Clone, Copy, Debug)]
enum NormVariant {
    Walls4,
    Walls3,
    Walls2,
}

impl NormVariant {
    fn run(self, agents: &[ValueFunction], y_length: f64, required: f64) -> Vec<Landplot> {
        match self {
            NormVariant::Walls4 => {
                LevelPeel::closed(required, y_length).run(agents, &LevelFrontier::new_south(1.0))
            }
            NormVariant::Walls3 => LevelPeel::open_north(required, y_length)
                .run(agents, &LevelFrontier::new_south(1.0)),
            NormVariant::Walls2 => corner_peel(agents, &CornerFrontier::at_origin(), required),
        }
    }
}

/// Transform into the canonical frame for the designated southern side.
/// Returns the transform and the normalized northern extent.
fn canonical_transform(
    southern: Side,
    envelope: &Envelope,
) -> Result<(FrameTransform, f64), DivisionError> {
    let quarters = southern.index();
    let rotated = rotate_rect(
        &Rect::new(envelope.minx, envelope.miny, envelope.maxx, envelope.maxy),
        quarters,
    );
    let mut width = rotated.maxx - rotated.minx;
    let height = rotated.maxy - rotated.miny;
    if width <= 0.0 && height <= 0.0 {
        return Err(DivisionError::DegenerateEnvelope {
            envelope: *envelope,
        });
    }
    if width <= 0.0 {
        width = height / 1000.0;
    }
    let scale = if width.is_finite() { 1.0 / width } else { 1.0 };
    let tx = if rotated.minx.is_finite() {
        -rotated.minx
    } else if rotated.maxx.is_finite() {
        -rotated.maxx
    } else {
        0.0
    };
    let ty = if rotated.miny.is_finite() {
        -rotated.miny
    } else if rotated.maxy.is_finite() {
        -rotated.maxy
    } else {
        0.0
    };
    let y_length = height * scale;
    Ok((
        FrameTransform::new(quarters, Vector2::new(tx, ty), scale),
        y_length,
    ))
}

/// Restrict every agent to the envelope and express it in the working frame.
/// Agents with no point inside the envelope are dropped.
fn restrict_and_transform(
    agents: &[ValueFunction],
    envelope: &Envelope,
    transform: &FrameTransform,
) -> Vec<ValueFunction> {
    agents
        .iter()
        .filter_map(|vf| {
            let points: Vec<Vector2<f64>> = vf
                .points
                .iter()
                .filter(|p| envelope.contains(**p))
                .map(|p| transform.apply_point(*p))
                .collect();
            if points.is_empty() {
                warn!(color = ?vf.color, "agent has no points inside the envelope, dropping");
                None
            } else {
                Some(vf.clone_with_new_points(points))
            }
        })
        .collect()
}

/// Canonicalize and run the value search over a direct staircase variant.
fn run_division(
    variant: NormVariant,
    southern: Side,
    agents: &[ValueFunction],
    envelope: &Envelope,
) -> Result<Division, DivisionError> {
    if agents.is_empty() {
        return Ok(Division::default());
    }
    let (transform, y_length) = canonical_transform(southern, envelope)?;
    let agents = restrict_and_transform(agents, envelope, &transform);
    if agents.is_empty() {
        return Ok(Division::default());
    }

    // An agent can never receive more value than it has points, so the
    // per-variant target is clamped by the smallest point count. A lone
    // agent faces no competition and may aim for all of its points.
    let ceiling = if agents.len() == 1 {
        agents[0].points.len() as f64
    } else {
        agents
            .iter()
            .map(|vf| vf.total_value.min(vf.points.len() as f64))
            .fold(f64::INFINITY, f64::min)
    };

    let mut division = Division::default();
    let mut required = ceiling.floor().max(1.0);
    while required >= 1.0 {
        debug!(required, variant = ?variant, "trying value per agent");
        let plots = variant.run(&agents, y_length, required);
        if plots.len() == agents.len() {
            division = Division {
                plots,
                min_value_per_agent: Some(required),
            };
            break;
        }
        required -= 1.0;
    }

    for plot in &mut division.plots {
        plot.rect = transform.invert_rect(&plot.rect);
    }
    Ok(division)
}

/// 1-wall wrapper: one closed side (canonicalized to south), everything else
/// open. Halve the agents east/west and solve both halves as 2-wall
/// problems, also trying the two everyone-on-one-side alternatives.
fn run_walls1(
    agents: &[ValueFunction],
    southern: Side,
    envelope: &Envelope,
) -> Result<Division, DivisionError> {
    if agents.is_empty() {
        return Ok(Division::default());
    }
    let (transform, _y_length) = canonical_transform(southern, envelope)?;
    let agents = restrict_and_transform(agents, envelope, &transform);
    if agents.is_empty() {
        return Ok(Division::default());
    }

    let mut division = if agents.len() == 1 {
        lone_agent_on_wall(&agents[0])
    } else {
        let n = agents.len();
        let (minx, maxx) = x_extent(&agents);
        let mut candidates = Vec::with_capacity(3);

        let (west, split, east) = halving_east_west(&agents);
        let west_div = run_division(
            NormVariant::Walls2,
            Side::East,
            &west,
            &Envelope::new(f64::NEG_INFINITY, 0.0, split, f64::INFINITY),
        )?;
        let east_div = run_division(
            NormVariant::Walls2,
            Side::South,
            &east,
            &Envelope::new(split, 0.0, f64::INFINITY, f64::INFINITY),
        )?;
        candidates.push(merge_halves(west_div, east_div, n));

        debug!("trying everyone against the west wall");
        candidates.push(run_division(
            NormVariant::Walls2,
            Side::South,
            &agents,
            &Envelope::new(minx, 0.0, f64::INFINITY, f64::INFINITY),
        )?);
        debug!("trying everyone against the east wall");
        candidates.push(run_division(
            NormVariant::Walls2,
            Side::East,
            &agents,
            &Envelope::new(f64::NEG_INFINITY, 0.0, maxx, f64::INFINITY),
        )?);

        best_candidate(candidates, n)
    };

    for plot in &mut division.plots {
        plot.rect = transform.invert_rect(&plot.rect);
    }
    Ok(division)
}

/// 0-wall wrapper: fully open region. Same divide step as the 1-wall case,
/// with 1-wall sub-problems on the halves.
fn run_walls0(
    agents: &[ValueFunction],
    southern: Side,
    envelope: &Envelope,
) -> Result<Division, DivisionError> {
    if agents.is_empty() {
        return Ok(Division::default());
    }
    let (transform, _y_length) = canonical_transform(southern, envelope)?;
    let agents = restrict_and_transform(agents, envelope, &transform);
    if agents.is_empty() {
        return Ok(Division::default());
    }

    let mut division = if agents.len() == 1 {
        lone_agent_unbounded(&agents[0])
    } else {
        let n = agents.len();
        let (minx, maxx) = x_extent(&agents);
        let mut candidates = Vec::with_capacity(3);

        let (west, split, east) = halving_east_west(&agents);
        let west_div = run_walls1(
            &west,
            Side::East,
            &Envelope::new(f64::NEG_INFINITY, f64::NEG_INFINITY, split, f64::INFINITY),
        )?;
        let east_div = run_walls1(
            &east,
            Side::West,
            &Envelope::new(split, f64::NEG_INFINITY, f64::INFINITY, f64::INFINITY),
        )?;
        candidates.push(merge_halves(west_div, east_div, n));

        debug!("trying everyone west of the data");
        candidates.push(run_walls1(
            &agents,
            Side::East,
            &Envelope::new(f64::NEG_INFINITY, f64::NEG_INFINITY, maxx, f64::INFINITY),
        )?);
        debug!("trying everyone east of the data");
        candidates.push(run_walls1(
            &agents,
            Side::West,
            &Envelope::new(minx, f64::NEG_INFINITY, f64::INFINITY, f64::INFINITY),
        )?);

        best_candidate(candidates, n)
    };

    for plot in &mut division.plots {
        plot.rect = transform.invert_rect(&plot.rect);
    }
    Ok(division)
}

/// Split the agents into western and eastern halves at their indifference
/// points. Returns the halves and the dividing x.
///
/// An agent's halving point is the x where half of its points (weighted for
/// odd agent counts) lie to the west. It is computed exactly with guard
/// anchors placed far enough outside the agent's bounding box that the
/// growing square's height clears the data before its x sweep reaches it.
fn halving_east_west(
    agents: &[ValueFunction],
) -> (Vec<ValueFunction>, f64, Vec<ValueFunction>) {
    let n = agents.len();
    let (west_share, east_share) = if n % 2 == 0 {
        (0.5, 0.5)
    } else {
        let odd = 1.0 / n as f64;
        (0.5 * (1.0 + odd), 0.5 * (1.0 - odd))
    };
    let num_west = (n + 1) / 2;

    let mut keyed: Vec<(f64, &ValueFunction)> = agents
        .iter()
        .map(|vf| {
            let total = vf.points.len() as f64;
            (
                halving_point(vf, west_share * total, east_share * total),
                vf,
            )
        })
        .collect();
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let split = 0.5 * (keyed[num_west - 1].0 + keyed[num_west].0);
    debug!(split, "halving east/west");
    let west = keyed[..num_west].iter().map(|(_, vf)| (*vf).clone()).collect();
    let east = keyed[num_west..].iter().map(|(_, vf)| (*vf).clone()).collect();
    (west, split, east)
}

fn halving_point(vf: &ValueFunction, west_value: f64, east_value: f64) -> f64 {
    let (minx, maxx, miny, maxy) = point_bounds(vf);
    let guard = maxy - miny + 1.0;
    let west_guard = Vector2::new(minx - guard, miny);
    let east_guard = Vector2::new(maxx + guard, miny);
    let west_size = vf.size_of_square_with_value(west_guard, west_value, Quadrant::NorthEast);
    let east_size = vf.size_of_square_with_value(east_guard, east_value, Quadrant::NorthWest);
    0.5 * ((west_guard.x + west_size) + (east_guard.x - east_size))
}

/// Combine the two halves of a divide step; the guaranteed value only
/// survives when both halves placed everyone.
fn merge_halves(west: Division, east: Division, n: usize) -> Division {
    let mut plots = west.plots;
    plots.extend(east.plots);
    let min_value_per_agent = match (west.min_value_per_agent, east.min_value_per_agent) {
        (Some(w), Some(e)) if plots.len() == n => Some(w.min(e)),
        _ => None,
    };
    Division {
        plots,
        min_value_per_agent,
    }
}

/// Prefer complete allocations, then the largest guaranteed value.
fn best_candidate(candidates: Vec<Division>, n: usize) -> Division {
    let score = |d: &Division| (d.plots.len() == n, d.min_value_per_agent.unwrap_or(0.0));
    candidates
        .into_iter()
        .reduce(|best, c| if score(&c) > score(&best) { c } else { best })
        .unwrap_or_default()
}

/// A lone agent on a single wall takes the bounding square of its points,
/// grown tall enough to contain them all, seated on the wall.
fn lone_agent_on_wall(vf: &ValueFunction) -> Division {
    let (minx, maxx, _miny, maxy) = point_bounds(vf);
    let side = (maxx - minx).max(maxy);
    Division {
        plots: vec![Landplot {
            rect: Rect::new(minx, 0.0, minx + side, side),
            color: vf.color.clone(),
        }],
        min_value_per_agent: Some(vf.points.len() as f64),
    }
}

/// A lone agent in a fully open region takes the bounding square of its
/// points.
fn lone_agent_unbounded(vf: &ValueFunction) -> Division {
    let (minx, maxx, miny, maxy) = point_bounds(vf);
    let side = (maxx - minx).max(maxy - miny);
    Division {
        plots: vec![Landplot {
            rect: Rect::new(minx, miny, minx + side, miny + side),
            color: vf.color.clone(),
        }],
        min_value_per_agent: Some(vf.points.len() as f64),
    }
}

fn point_bounds(vf: &ValueFunction) -> (f64, f64, f64, f64) {
    let mut minx = f64::INFINITY;
    let mut maxx = f64::NEG_INFINITY;
    let mut miny = f64::INFINITY;
    let mut maxy = f64::NEG_INFINITY;
    for p in &vf.points {
        minx = minx.min(p.x);
        maxx = maxx.max(p.x);
        miny = miny.min(p.y);
        maxy = maxy.max(p.y);
    }
    (minx, maxx, miny, maxy)
}

fn x_extent(agents: &[ValueFunction]) -> (f64, f64) {
    let mut minx = f64::INFINITY;
    let mut maxx = f64::NEG_INFINITY;
    for vf in agents {
        for p in &vf.points {
            minx = minx.min(p.x);
            maxx = maxx.max(p.x);
        }
    }
    (minx, maxx)
}

#[cfg(test)]
mod tests;
