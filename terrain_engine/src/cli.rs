use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    about = "Headless terrain viewer session: loads a manifest, replays scripted input and prints frame summaries as JSON lines",
    version
)]
pub struct Args {
    /// Session manifest naming the terrain model and point datasets
    pub manifest: PathBuf,

    /// Viewer config overriding the one named by the manifest
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON input script to replay
    #[arg(long)]
    pub script: Option<PathBuf>,

    /// Simulated frame rate
    #[arg(long, default_value_t = 60.0)]
    pub fps: f64,

    /// Seconds of simulated time to run
    #[arg(long, default_value_t = 3.0)]
    pub duration: f64,

    /// Print every frame instead of only frames with events
    #[arg(long)]
    pub all_frames: bool,

    /// Start on the fitted pose without the intro pivot
    #[arg(long)]
    pub skip_intro: bool,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            bail!("--fps must be positive (got {})", self.fps);
        }
        if !(self.duration.is_finite() && self.duration >= 0.0) {
            bail!("--duration must not be negative (got {})", self.duration);
        }
        Ok(())
    }
}
