//! Deterministic point-cloud instances (replay-token sampling).
//!
//! Purpose
//! - Provide reproducible agent valuations for tests, benchmarks, and the
//!   CLI sampler. Determinism uses a replay token `(seed, index)` mixed into
//!   a single RNG, so instance `i` of a run can be regenerated in isolation.

use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Replay token making draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    #[inline]
    fn to_std_rng(self) -> StdRng {
        // SplitMix64-style mixing, cheap and stable.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        let k = mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15)));
        StdRng::seed_from_u64(k)
    }
}

/// Sampler configuration for one agent's point cloud.
#[derive(Clone, Copy, Debug)]
pub struct CloudCfg {
    pub points: usize,
    pub minx: f64,
    pub maxx: f64,
    pub miny: f64,
    pub maxy: f64,
    /// Snap coordinates to this grid step when positive (useful for
    /// boundary-stable test instances).
    pub grid: f64,
}

impl Default for CloudCfg {
    fn default() -> Self {
        Self {
            points: 16,
            minx: 0.0,
            maxx: 400.0,
            miny: 0.0,
            maxy: 400.0,
            grid: 0.0,
        }
    }
}

/// Draw a uniform point cloud inside the configured box.
pub fn draw_point_cloud(cfg: CloudCfg, tok: ReplayToken) -> Vec<Vector2<f64>> {
    let mut rng = tok.to_std_rng();
    let snap = |v: f64| {
        if cfg.grid > 0.0 {
            (v / cfg.grid).round() * cfg.grid
        } else {
            v
        }
    };
    (0..cfg.points)
        .map(|_| {
            Vector2::new(
                snap(rng.gen_range(cfg.minx..=cfg.maxx)),
                snap(rng.gen_range(cfg.miny..=cfg.maxy)),
            )
        })
        .collect()
}
