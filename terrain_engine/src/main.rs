use std::io::{self, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Parser;
use terrain_engine::{LoadProgress, load_session, load_viewer_config};

mod cli;
mod script;

use cli::Args;
use script::InputScript;

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    args.validate()?;

    let config = args
        .config
        .as_deref()
        .map(load_viewer_config)
        .transpose()
        .context("loading viewer config")?;
    let script = match args.script.as_deref() {
        Some(path) => InputScript::load(path)?,
        None => InputScript { events: Vec::new() },
    };

    let mut progress = LoadProgress::default();
    let loaded = load_session(&args.manifest, config, &mut progress);
    log::info!("load progress: {progress}");
    let mut context =
        loaded.with_context(|| format!("loading session {}", args.manifest.display()))?;
    if args.skip_intro {
        context.skip_intro();
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let frames = (args.duration * args.fps).ceil() as u64;
    let mut pending = script.events.iter().peekable();

    for frame in 0..=frames {
        let now = frame as f64 / args.fps;
        let mut events = Vec::new();
        while let Some(step) = pending.next_if(|step| step.at <= now) {
            let input = step
                .event
                .to_input(context.config())
                .with_context(|| format!("script event at {:.3}s", step.at))?;
            events.extend(context.handle(input, now));
        }

        let mut snapshot = context.tick(now);
        events.append(&mut snapshot.events);
        snapshot.events = events;

        if args.all_frames || frame == frames || !snapshot.events.is_empty() {
            serde_json::to_writer(&mut out, &snapshot).context("writing frame summary")?;
            writeln!(out).context("writing frame summary")?;
        }
    }

    if let Some(step) = pending.next() {
        log::warn!("script events from {:.3}s on were never reached", step.at);
    }
    out.flush().context("flushing output")?;
    Ok(())
}
