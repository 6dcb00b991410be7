use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::SubscriberBuilder;

use fairsquare::prelude::*;
use fairsquare::sampling::{draw_point_cloud, CloudCfg, ReplayToken};

#[derive(Parser)]
#[command(name = "fairsquare")]
#[command(about = "Half-proportional land division runner")]
struct Cmd {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
enum Action {
    /// Divide a JSON instance and print the land-plots as JSON
    Divide {
        #[arg(long)]
        input: PathBuf,
        /// Maximum aspect ratio for the pieces (the staircase core itself
        /// always produces exact squares)
        #[arg(long, default_value_t = 1.0)]
        aspect: f64,
    },
    /// Write a reproducible random instance file
    Sample {
        #[arg(long, default_value_t = 3)]
        agents: usize,
        #[arg(long, default_value_t = 16)]
        points: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        #[arg(long)]
        out: PathBuf,
    },
}

/// Instance file: agents with optional colors plus an envelope whose missing
/// bounds mean the matching side is open (unbounded).
#[derive(Serialize, Deserialize)]
struct InstanceFile {
    agents: Vec<AgentSpec>,
    envelope: EnvelopeSpec,
}

#[derive(Serialize, Deserialize)]
struct AgentSpec {
    #[serde(default)]
    color: Option<String>,
    points: Vec<[f64; 2]>,
}

#[derive(Serialize, Deserialize, Default)]
struct EnvelopeSpec {
    #[serde(default)]
    minx: Option<f64>,
    #[serde(default)]
    miny: Option<f64>,
    #[serde(default)]
    maxx: Option<f64>,
    #[serde(default)]
    maxy: Option<f64>,
}

#[derive(Serialize)]
struct PlotOut {
    minx: f64,
    miny: f64,
    maxx: f64,
    maxy: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    color: Option<String>,
}

#[derive(Serialize)]
struct DivisionOut {
    plots: Vec<PlotOut>,
    min_value_per_agent: Option<f64>,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    let cmd = Cmd::parse();
    match cmd.action {
        Action::Divide { input, aspect } => divide(&input, aspect),
        Action::Sample {
            agents,
            points,
            seed,
            out,
        } => sample(agents, points, seed, &out),
    }
}

fn divide(input: &PathBuf, aspect: f64) -> Result<()> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("reading instance {}", input.display()))?;
    let instance: InstanceFile = serde_json::from_str(&raw).context("parsing instance JSON")?;

    let agents: Vec<AgentPoints> = instance
        .agents
        .iter()
        .map(|a| AgentPoints {
            points: a.points.iter().map(|&[x, y]| Vec2::new(x, y)).collect(),
            color: a.color.clone(),
        })
        .collect();
    let env = Envelope::new(
        instance.envelope.minx.unwrap_or(f64::NEG_INFINITY),
        instance.envelope.miny.unwrap_or(f64::NEG_INFINITY),
        instance.envelope.maxx.unwrap_or(f64::INFINITY),
        instance.envelope.maxy.unwrap_or(f64::INFINITY),
    );

    let division = half_proportional_division(&agents, &env, aspect)?;
    tracing::info!(
        agents = agents.len(),
        plots = division.plots.len(),
        min_value = ?division.min_value_per_agent,
        "division complete"
    );
    let out = DivisionOut {
        plots: division
            .plots
            .iter()
            .map(|p| PlotOut {
                minx: p.rect.minx,
                miny: p.rect.miny,
                maxx: p.rect.maxx,
                maxy: p.rect.maxy,
                color: p.color.clone(),
            })
            .collect(),
        min_value_per_agent: division.min_value_per_agent,
    };
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

const COLORS: [&str; 6] = ["red", "green", "blue", "orange", "purple", "teal"];

fn sample(agents: usize, points: usize, seed: u64, out: &PathBuf) -> Result<()> {
    let cfg = CloudCfg {
        points,
        grid: 1.0,
        ..CloudCfg::default()
    };
    let instance = InstanceFile {
        agents: (0..agents)
            .map(|i| AgentSpec {
                color: Some(COLORS[i % COLORS.len()].to_string()),
                points: draw_point_cloud(
                    cfg,
                    ReplayToken {
                        seed,
                        index: i as u64,
                    },
                )
                .into_iter()
                .map(|p| [p.x, p.y])
                .collect(),
            })
            .collect(),
        envelope: EnvelopeSpec {
            minx: Some(cfg.minx),
            miny: Some(cfg.miny),
            maxx: Some(cfg.maxx),
            maxy: None, // open northern side
        },
    };
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(out, serde_json::to_vec_pretty(&instance)?)
        .with_context(|| format!("writing instance {}", out.display()))?;
    tracing::info!(agents, points, seed, out = %out.display(), "instance written");
    Ok(())
}
