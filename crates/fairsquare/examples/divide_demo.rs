//! Divide a small two-agent instance and print the plots.
//! Run with: cargo run -p fairsquare --example divide_demo

use fairsquare::prelude::*;

fn main() {
    let blue = AgentPoints {
        points: vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 300.0),
            Vec2::new(300.0, 0.0),
            Vec2::new(300.0, 300.0),
        ],
        color: Some("blue".to_string()),
    };
    let red = AgentPoints {
        points: vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(0.0, 400.0),
            Vec2::new(400.0, 0.0),
            Vec2::new(400.0, 400.0),
        ],
        color: Some("red".to_string()),
    };
    // Bounded on three sides, open to the north.
    let envelope = Envelope::new(0.0, 0.0, 400.0, f64::INFINITY);

    let division = half_proportional_division(&[blue, red], &envelope, 1.0)
        .expect("valid envelope");
    println!(
        "guaranteed value per agent: {:?}",
        division.min_value_per_agent
    );
    for plot in &division.plots {
        println!(
            "{:>6}: [{}, {}] x [{}, {}]",
            plot.color.as_deref().unwrap_or("-"),
            plot.rect.minx,
            plot.rect.maxx,
            plot.rect.miny,
            plot.rect.maxy
        );
    }
}
