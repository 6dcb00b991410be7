//! Recursive staircase peeling.
//!
//! Purpose
//! - Award, per step, the single globally cheapest satisfying square among
//!   all remaining agents, carve it out of the frontier, and recurse on the
//!   remaining agents. Terminal when no agent remains (success) or no agent
//!   can place a finite square (failure for the requested value).
//! - Two frontier forms: shelves (`levels`) for the 3/4-wall variants and
//!   reflex corners (`corners`) for the 2-wall variant. The 0/1-wall cases
//!   are wrappers over these, implemented in `division`.
//!
//! Why this design
//! - Each recursive branch operates on its own frontier value; nothing is
//!   shared with sibling branches, so the east/west splits of the open
//!   variants stay independent.
//! - Recursion depth equals the agent count (each step removes one agent).

mod corners;
mod levels;

pub use corners::{CornerFrontier, CornerSquare};
pub use levels::{Level, LevelFrontier, LevelInfo};

use nalgebra::Vector2;
use tracing::debug;

use crate::geom::{Rect, GEOM_EPS};
use crate::value::{Quadrant, ValueFunction};

/// A plot awarded to one agent; the color is copied from the winner.
#[derive(Clone, Debug, PartialEq)]
pub struct Landplot {
    pub rect: Rect,
    pub color: Option<String>,
}

/// One agent's bid: a square and the metric it is judged by.
#[derive(Clone, Debug)]
struct Bid {
    rect: Rect,
    agent: usize,
    metric: f64,
}

/// Level-form peel for the 3- and 4-wall variants.
pub(crate) struct LevelPeel {
    required: f64,
    y_length: f64,
    /// Cap on square tops (`y_length / 2` in the 4-wall variant).
    y_cap: Option<f64>,
    northward_used: bool,
}

impl LevelPeel {
    /// 3-wall variant: the northern side is open, squares may overflow it.
    pub fn open_north(required: f64, y_length: f64) -> Self {
        Self {
            required,
            y_length,
            y_cap: None,
            northward_used: false,
        }
    }

    /// 4-wall variant: southern squares stay below `y_length / 2`; when the
    /// southern frontier dries up the search restarts once from the north.
    pub fn closed(required: f64, y_length: f64) -> Self {
        Self {
            required,
            y_length,
            y_cap: Some(y_length / 2.0),
            northward_used: false,
        }
    }

    pub fn run(&mut self, agents: &[ValueFunction], frontier: &LevelFrontier) -> Vec<Landplot> {
        if agents.is_empty() {
            return Vec::new();
        }
        let mut frontier = frontier.clone();

        // Fill knobs nobody bids on; keeps the shelf count bounded.
        loop {
            let infos = frontier.annotate();
            let knob = infos
                .iter()
                .position(|info| info.is_knob && self.level_bids(agents, info).is_empty());
            match knob {
                Some(i) => {
                    debug!(level = ?infos[i].level, "no bids on knob, filling");
                    frontier.fill_knob(i);
                }
                None => break,
            }
        }

        let mut bids = Vec::new();
        for info in frontier.annotate() {
            bids.extend(self.level_bids(agents, &info));
        }
        let best = bids
            .into_iter()
            .reduce(|acc, b| if b.metric < acc.metric { b } else { acc });
        let Some(best) = best else {
            return self.north_retry(agents);
        };

        let winner = &agents[best.agent];
        debug!(
            agents = agents.len(),
            agent = best.agent,
            rect = ?best.rect,
            "awarding level square"
        );
        let plot = Landplot {
            rect: best.rect,
            color: winner.color.clone(),
        };
        if agents.len() == 1 {
            return vec![plot];
        }
        let rest = without_agent(agents, best.agent);
        let carved = frontier.carve(&best.rect);
        let mut plots = self.run(&rest, &carved);
        plots.push(plot);
        plots
    }

    fn level_bids(&self, agents: &[ValueFunction], info: &LevelInfo) -> Vec<Bid> {
        let l = info.level;
        let mut bids = Vec::new();
        if info.y_west > l.y + GEOM_EPS {
            let anchor = Vector2::new(l.minx, l.y);
            for (i, vf) in agents.iter().enumerate() {
                let s = vf.size_of_square_with_value(anchor, self.required, Quadrant::NorthEast);
                if s.is_finite() && l.minx + s <= info.east_ext + GEOM_EPS && self.cap_ok(l.y + s)
                {
                    bids.push(Bid {
                        rect: Rect::new(l.minx, l.y, l.minx + s, l.y + s),
                        agent: i,
                        metric: l.y + s,
                    });
                }
            }
        }
        if info.y_east > l.y + GEOM_EPS {
            let anchor = Vector2::new(l.maxx, l.y);
            for (i, vf) in agents.iter().enumerate() {
                let s = vf.size_of_square_with_value(anchor, self.required, Quadrant::NorthWest);
                if s.is_finite() && l.maxx - s >= info.west_ext - GEOM_EPS && self.cap_ok(l.y + s)
                {
                    bids.push(Bid {
                        rect: Rect::new(l.maxx - s, l.y, l.maxx, l.y + s),
                        agent: i,
                        metric: l.y + s,
                    });
                }
            }
        }
        bids
    }

    #[inline]
    fn cap_ok(&self, top: f64) -> bool {
        self.y_cap.map_or(true, |cap| top <= cap + GEOM_EPS)
    }

    /// 4-wall fallback: nobody can bid on the southern frontier, so restart
    /// the remaining sub-problem once from the northern wall by reflecting
    /// the y axis. A second dry-up fails the attempt.
    fn north_retry(&mut self, agents: &[ValueFunction]) -> Vec<Landplot> {
        if self.y_cap.is_none() || self.northward_used || !self.y_length.is_finite() {
            debug!(
                agents = agents.len(),
                required = self.required,
                "no level square with the required value"
            );
            return Vec::new();
        }
        self.northward_used = true;
        debug!("no southern bids, restarting from the northern wall");
        let reflected: Vec<ValueFunction> = agents
            .iter()
            .map(|vf| {
                vf.clone_with_new_points(
                    vf.points
                        .iter()
                        .map(|p| Vector2::new(p.x, self.y_length - p.y))
                        .collect(),
                )
            })
            .collect();
        let plots = self.run(&reflected, &LevelFrontier::new_south(1.0));
        plots
            .into_iter()
            .map(|mut p| {
                p.rect = Rect::new(
                    p.rect.minx,
                    self.y_length - p.rect.maxy,
                    p.rect.maxx,
                    self.y_length - p.rect.miny,
                );
                p
            })
            .collect()
    }
}

/// Corner-form peel for the 2-wall variant.
pub(crate) fn corner_peel(
    agents: &[ValueFunction],
    frontier: &CornerFrontier,
    required: f64,
) -> Vec<Landplot> {
    if agents.is_empty() {
        return Vec::new();
    }
    let mut best: Option<(usize, CornerSquare)> = None;
    for (i, vf) in agents.iter().enumerate() {
        if let Some(sq) = frontier.best_square(vf, required) {
            if best.as_ref().map_or(true, |(_, b)| sq.taxicab < b.taxicab) {
                best = Some((i, sq));
            }
        }
    }
    let Some((agent, sq)) = best else {
        debug!(
            agents = agents.len(),
            required, "no corner square with the required value"
        );
        return Vec::new();
    };
    let rect = Rect::new(
        sq.corner.x,
        sq.corner.y,
        sq.corner.x + sq.size,
        sq.corner.y + sq.size,
    );
    debug!(agents = agents.len(), agent, rect = ?rect, "awarding corner square");
    let plot = Landplot {
        rect,
        color: agents[agent].color.clone(),
    };
    if agents.len() == 1 {
        return vec![plot];
    }
    let rest = without_agent(agents, agent);
    let carved = frontier.carve_north_east(&rect);
    let mut plots = corner_peel(&rest, &carved, required);
    plots.push(plot);
    plots
}

fn without_agent(agents: &[ValueFunction], skip: usize) -> Vec<ValueFunction> {
    agents
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != skip)
        .map(|(_, vf)| vf.clone())
        .collect()
}
