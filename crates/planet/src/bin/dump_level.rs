//! Build a level headlessly and write a JSON summary of its geometry.
//!
//! Run: `cargo run -p planet --features test-tools --bin dump_level -- [config.json] [out.json]`
//!
//! Without a config the built-in defaults are used.

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use planet::{Level, LevelConfig};
use planet_geometry::{DirectionFlags, Span, Surface};

const DEFAULT_OUTPUT: &str = "level_summary.json";

/// Arc length between sampled poses in the summary.
const POSE_SAMPLE_INTERVAL: f32 = 1.0;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = env::args().collect();
    let config = match args.get(1) {
        Some(path) => {
            println!("Reading config from {path}");
            LevelConfig::from_path(path)?
        }
        None => {
            println!("Using default config");
            LevelConfig::default()
        }
    };
    let output_path = Path::new(args.get(2).map_or(DEFAULT_OUTPUT, String::as_str));

    println!("\n1. Building level...");
    let level = Level::load(&config)?;
    println!(
        "   Sphere: {} vertices, {} triangles in {} segments",
        level.sphere.vertices().len(),
        level.sphere.triangle_count(),
        level.sphere.segments().len()
    );
    println!(
        "   Path: {} vertices, {} segments, length={:.3}",
        level.path.vertices().len(),
        level.path.segment_count(),
        level.path.length()
    );

    println!("\n2. Writing summary...");
    let summary = serde_json::json!({
        "config": config,
        "sphere": sphere_summary(&level),
        "path": path_summary(&level),
    });
    File::create(output_path)?.write_all(serde_json::to_string_pretty(&summary)?.as_bytes())?;
    println!("   Saved to {}", output_path.display());

    Ok(())
}

fn sphere_summary(level: &Level) -> serde_json::Value {
    let sphere = &level.sphere;
    let (min_height, max_height) = sphere
        .vertices()
        .iter()
        .map(planet_geometry::SphereVertex::height)
        .fold((f32::MAX, f32::MIN), |(lo, hi), h| (lo.min(h), hi.max(h)));

    let surfaces: serde_json::Map<String, serde_json::Value> = Surface::ALL
        .iter()
        .map(|&surface| {
            let count: usize = sphere
                .segments()
                .iter()
                .map(|s| s.triangles(surface).len())
                .sum();
            (surface.name().to_string(), count.into())
        })
        .collect();

    serde_json::json!({
        "vertices": sphere.vertices().len(),
        "triangles": sphere.triangle_count(),
        "segments": sphere.segments().iter().map(|s| {
            serde_json::json!({
                "id": s.id(),
                "triangles": s.triangle_count(),
                "vertex_slots": s.vertex_slots(),
                "center": s.center().to_array(),
                "normal": s.normal().to_array(),
            })
        }).collect::<Vec<_>>(),
        "height": [min_height, max_height],
        "surfaces": surfaces,
    })
}

fn path_summary(level: &Level) -> serde_json::Value {
    let path = &level.path;
    let mut poses = Vec::new();
    let mut offset = 0.0;
    while offset < path.length() {
        if let Some(d) = path.direction_ex(offset, DirectionFlags::POS | DirectionFlags::YPR) {
            poses.push(serde_json::json!({
                "offset": offset,
                "pos": d.pos.to_array(),
                "ypr": [d.ypr.yaw, d.ypr.pitch, d.ypr.roll],
            }));
        }
        offset += POSE_SAMPLE_INTERVAL;
    }

    serde_json::json!({
        "length": path.length(),
        "is_loop": path.is_loop(),
        "vertices": path.vertices().iter().map(|v| {
            [v.lon.to_degrees(), v.lat.to_degrees(), v.height]
        }).collect::<Vec<_>>(),
        "segments": path.segments().iter().map(|s| {
            serde_json::json!({
                "offset": s.offset(),
                "end": s.end(),
                "steps": s.steps().len(),
            })
        }).collect::<Vec<_>>(),
        "poses": poses,
    })
}
