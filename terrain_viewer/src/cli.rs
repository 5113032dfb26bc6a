use std::path::PathBuf;

use anyhow::{Result, ensure};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Interactive terrain and survey marker viewer", version)]
pub struct Args {
    /// Session manifest naming the terrain model and point datasets
    pub manifest: PathBuf,

    /// Viewer configuration JSON; overrides the manifest's `config` entry
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Start on the fitted pose instead of pivoting in from overhead
    #[arg(long)]
    pub skip_intro: bool,

    /// Initial window width in physical pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Initial window height in physical pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,
}

impl Args {
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.width > 0 && self.height > 0,
            "window size must be non-zero (got {}x{})",
            self.width,
            self.height
        );
        Ok(())
    }
}
