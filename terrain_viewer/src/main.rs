mod cli;
mod input;
mod viewer;

use std::{sync::Arc, time::Instant};

use anyhow::{Context, Result};
use clap::Parser;
use pollster::FutureExt;
use terrain_engine::{LoadProgress, load_session, load_viewer_config};
use wgpu::SurfaceError;
use winit::{
    dpi::PhysicalSize,
    event::{ElementState, Event, KeyEvent, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::WindowBuilder,
};

use cli::Args;
use input::{KeyCommand, PointerTracker, wheel_event};
use viewer::ViewerState;

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

    let mut progress = LoadProgress::default();
    let loaded = load_session(&args.manifest, config, &mut progress);
    log::info!("load progress: {progress}");
    let mut context =
        loaded.with_context(|| format!("loading session {}", args.manifest.display()))?;
    if args.skip_intro {
        context.skip_intro();
    }

    let title = match args.manifest.file_stem() {
        Some(stem) => format!("Terrain Viewer - {}", stem.to_string_lossy()),
        None => "Terrain Viewer".to_string(),
    };

    let event_loop = EventLoop::new().context("creating winit event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&title)
            .with_inner_size(PhysicalSize::new(args.width, args.height))
            .build(&event_loop)
            .context("creating viewer window")?,
    );

    let mut state = ViewerState::new(window, context, title).block_on()?;
    let started = Instant::now();
    let mut pointer = PointerTracker::default();

    event_loop
        .run(move |event, target| {
            target.set_control_flow(ControlFlow::Poll);
            let now = started.elapsed().as_secs_f64();

            match event {
                Event::WindowEvent { window_id, event } if window_id == state.window().id() => {
                    match event {
                        WindowEvent::CloseRequested => target.exit(),
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    logical_key,
                                    state: ElementState::Pressed,
                                    repeat: false,
                                    ..
                                },
                            ..
                        } => {
                            let categories = state.context().config().categories.len();
                            match KeyCommand::from_key(&logical_key, categories) {
                                Some(KeyCommand::Exit) => target.exit(),
                                Some(command) => {
                                    if let Some(input) = command.input() {
                                        state.dispatch(input, now);
                                    }
                                }
                                None => {}
                            }
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            state.dispatch(pointer.moved(position.x, position.y), now);
                        }
                        WindowEvent::CursorLeft { .. } => state.dispatch(pointer.left(), now),
                        WindowEvent::MouseInput {
                            state: button_state,
                            button,
                            ..
                        } => {
                            if let Some(input) = pointer.button(button_state, button) {
                                state.dispatch(input, now);
                            }
                        }
                        WindowEvent::MouseWheel { delta, .. } => {
                            state.dispatch(wheel_event(delta), now);
                        }
                        WindowEvent::Resized(new_size) => state.resize(new_size, now),
                        WindowEvent::RedrawRequested => {
                            state.update(now);
                            match state.render() {
                                Ok(_) => {}
                                Err(SurfaceError::Lost) => state.resize(state.size(), now),
                                Err(SurfaceError::OutOfMemory) => target.exit(),
                                Err(err) => log::warn!("render error: {err:?}"),
                            }
                        }
                        _ => {}
                    }
                }
                Event::AboutToWait => state.window().request_redraw(),
                _ => {}
            }
        })
        .context("running viewer application")?;
    Ok(())
}
