use anyhow::{Context, Result};
use clap::Parser;
use roadline::config::{load_settings, project_paths};
use std::{fs, path::Path, path::PathBuf};

#[derive(Parser, Debug, Clone)]
#[command(name = "roadline")]
#[command(about = "Pseudo-3D road racer for the terminal")]
struct Cli {
    /// Track seed; the same seed always builds the same road (0 = random)
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// Force monochrome (no colors)
    #[arg(long, default_value_t = false)]
    no_color: bool,

    /// Start with sound muted
    #[arg(long, default_value_t = false)]
    mute: bool,

    /// Settings file (default: platform data directory)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log file; stdout belongs to the game screen. Filter with RUST_LOG.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(path: &Path) -> Result<()> {
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut paths = project_paths()?;
    if let Some(p) = cli.settings {
        paths.settings_path = p;
    }
    if let Some(p) = cli.log_file {
        paths.log_path = p;
    }
    init_logging(&paths.log_path)?;

    let mut settings = load_settings(&paths.settings_path);
    if let Some(seed) = cli.seed {
        settings.seed = seed;
    }
    if let Some(fps) = cli.fps {
        settings.fps = fps;
    }
    if cli.no_color {
        settings.enable_color = false;
    }
    if cli.mute {
        settings.muted = true;
    }
    log::info!(
        "starting: fps {} seed {} settings {}",
        settings.fps,
        settings.seed,
        paths.settings_path.display()
    );

    roadline::app::run(settings, paths)
}
