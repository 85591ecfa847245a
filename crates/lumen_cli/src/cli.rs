use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

/// Log levels selectable from the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Built-in demo scenes
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Random small spheres around three large ones
    Spheres,
    /// Closed box lit by a ceiling light
    Cornell,
    /// Cook-Torrance spheres over a roughness/metallic grid
    Materials,
}

/// Command line arguments
#[derive(Debug, Parser)]
#[command(name = "lumen")]
#[command(about = "Progressive CPU path tracer")]
pub struct Args {
    /// Scene to render
    #[arg(long, value_enum, default_value = "spheres")]
    pub scene: SceneKind,

    /// Image width in pixels (overrides the scene/camera file)
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels (overrides the scene/camera file)
    #[arg(long)]
    pub height: Option<u32>,

    /// Samples per pixel
    #[arg(long, short = 's')]
    pub samples: Option<u32>,

    /// Maximum bounces per path
    #[arg(long)]
    pub max_depth: Option<u32>,

    /// Camera configuration as JSON, replacing the scene's camera
    #[arg(long)]
    pub camera: Option<PathBuf>,

    /// Image used by textured surfaces in the materials scene
    #[arg(long)]
    pub texture: Option<PathBuf>,

    /// Stop rendering after this many seconds and keep what is done
    #[arg(long)]
    pub time_limit: Option<f64>,

    /// Coarsest progressive stride
    #[arg(long, default_value = "3")]
    pub stride: u32,

    /// Seed for the scene layout and sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Output image path
    #[arg(short, long, default_value = "output.png")]
    pub output: PathBuf,

    /// Logging level (RUST_LOG takes precedence)
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}
