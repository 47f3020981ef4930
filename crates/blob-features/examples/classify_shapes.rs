//! Classify a few synthetic contours and compare them by Hu moments.
//!
//! Usage: `cargo run -p blob-features --example classify_shapes [config.json]`
//!
//! The optional config is `{"shape": ShapeParams, "matching": MatchParams}`;
//! missing fields fall back to the defaults.

use std::{env, fs};

use blob_features::core::init_from_env;
use blob_features::{Blob, BlobBuilder, MatchParams, ShapeParams};
use log::{info, warn};
use nalgebra::Point2;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ExampleConfig {
    shape: ShapeParams,
    matching: MatchParams,
}

fn polygon(center: (f64, f64), radius: f64, sides: usize, phase_deg: f64) -> Vec<Point2<f64>> {
    (0..sides)
        .map(|i| {
            let t = (phase_deg + 360.0 * i as f64 / sides as f64).to_radians();
            Point2::new(center.0 + radius * t.cos(), center.1 + radius * t.sin())
        })
        .collect()
}

fn load_config() -> Result<ExampleConfig, Box<dyn std::error::Error>> {
    match env::args().nth(1) {
        Some(path) => Ok(serde_json::from_str(&fs::read_to_string(path)?)?),
        None => Ok(ExampleConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_from_env()?;
    let cfg = load_config()?;
    info!("config: {cfg:?}");

    let shapes: Vec<(&str, Blob<'static>)> = vec![
        ("square", BlobBuilder::new(polygon((40.0, 40.0), 30.0, 4, 45.0)).build()?),
        (
            "bar",
            BlobBuilder::from_xy(&[(0.0, 0.0), (60.0, 0.0), (60.0, 15.0), (0.0, 15.0)]).build()?,
        ),
        ("disk", BlobBuilder::new(polygon((50.0, 50.0), 35.0, 180, 0.0)).build()?),
        ("hexagon", BlobBuilder::new(polygon((50.0, 50.0), 35.0, 6, 0.0)).build()?),
    ];

    for (name, blob) in &shapes {
        let angle = match blob.angle() {
            Ok(a) => format!("{a:.1}"),
            Err(e) => format!("undefined ({e})"),
        };
        match blob.shape_flags(&cfg.shape) {
            Ok(flags) => println!(
                "{name:>8}: {blob}, angle {angle}, rectangle={} square={} circle={}",
                flags.rectangle,
                flags.square,
                flags.circle
            ),
            Err(e) => warn!("{name}: {e}"),
        }
    }

    for (i, (a_name, a)) in shapes.iter().enumerate() {
        for (b_name, b) in &shapes[i + 1..] {
            let d = a.match_moments_with(b, &cfg.matching)?;
            println!("{a_name:>8} vs {b_name:<8} {d:.4}");
        }
    }
    Ok(())
}
