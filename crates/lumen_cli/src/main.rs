//! Lumen - render a built-in scene to a PNG.
//!
//! Usage: lumen --scene cornell --samples 64 --time-limit 30 -o cornell.png

mod cli;
mod scenes;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use lumen_renderer::{Camera, CameraConfig, ImageBuffer, RenderConfig, RenderHandle, RenderStatus};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::path::Path;
use std::thread;
use std::time::Duration;

/// Initialize the logger with a default level; RUST_LOG filters win when set.
fn init_logger(level: log::LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

fn load_camera_config(path: &Path) -> Result<CameraConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read camera file {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse camera file {}", path.display()))
}

/// Apply command line overrides on top of the scene or file camera.
fn apply_overrides(mut config: CameraConfig, args: &Args) -> CameraConfig {
    if let Some(width) = args.width {
        config.width = width;
    }
    if let Some(height) = args.height {
        config.height = height;
    }
    if let Some(samples) = args.samples {
        config.samples_per_pixel = samples;
    }
    if let Some(max_depth) = args.max_depth {
        config.max_depth = max_depth;
    }
    config
}

/// Cancel `handle` once `limit` has elapsed. The thread is detached; if the
/// render finishes first it simply outlives its purpose.
fn spawn_watchdog(handle: RenderHandle, limit: Duration) -> Result<()> {
    thread::Builder::new()
        .name("render-watchdog".into())
        .spawn(move || {
            thread::sleep(limit);
            if !handle.is_cancelled() {
                log::warn!("Time limit of {:.1}s reached, stopping render", limit.as_secs_f64());
                handle.cancel();
            }
        })
        .context("Failed to spawn watchdog thread")?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().next_u64());
    log::debug!("Seed {}", seed);
    let mut scene_rng = StdRng::seed_from_u64(seed);
    let scene = scenes::build(args.scene, args.texture.as_deref(), &mut scene_rng)?;

    let camera_config = match &args.camera {
        Some(path) => load_camera_config(path)?,
        None => scene.camera.clone(),
    };
    let camera_config = apply_overrides(camera_config, &args);
    let camera = Camera::new(&camera_config).context("Invalid camera configuration")?;

    let render_config = RenderConfig::default()
        .with_background(scene.background)
        .with_initial_stride(args.stride)
        .with_seed(seed);

    let mut image = ImageBuffer::new(camera.width(), camera.height());
    let mut task = camera.render(&scene.world, render_config);

    if let Some(secs) = args.time_limit {
        let limit = Duration::try_from_secs_f64(secs)
            .with_context(|| format!("Invalid time limit {secs}"))?;
        spawn_watchdog(task.handle(), limit)?;
    }

    let summary = pollster::block_on(task.run(&mut image));
    if summary.status == RenderStatus::Cancelled {
        log::warn!("Saving partial image ({} full passes)", summary.passes_completed);
    }

    image
        .save(&args.output)
        .with_context(|| format!("Failed to save {}", args.output.display()))?;
    Ok(())
}
