//! Runtime state for the viewer window. Owns the wgpu device and surface plus
//! the `ViewerContext` that drives every frame; `main.rs` feeds it window
//! input and asks for a redraw. Submodules split the lifecycle: `init` for
//! setup, `layout` for resizes, `render` for the draw passes.

use std::sync::Arc;

use anyhow::Result;
use terrain_engine::{
    FrameSnapshot, InputEvent, OverlayContent, ViewerConfig, ViewerContext, ViewerEvent,
};
use wgpu::SurfaceError;
use winit::{dpi::PhysicalSize, window::Window};

mod init;
mod layout;
mod render;

struct MeshResources {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    /// Absent when the terrain has no triangles.
    vertex_buffer: Option<wgpu::Buffer>,
    vertex_count: u32,
    _depth_texture: wgpu::Texture,
    depth_view: wgpu::TextureView,
}

struct MarkerResources {
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
    uniform_buffer: wgpu::Buffer,
    vertex_buffer: wgpu::Buffer,
    instance_buffer: wgpu::Buffer,
    capacity: usize,
}

pub struct ViewerState {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: PhysicalSize<u32>,
    context: ViewerContext,
    mesh: MeshResources,
    markers: MarkerResources,
    background: wgpu::Color,
    title: String,
}

impl ViewerState {
    pub async fn new(window: Arc<Window>, context: ViewerContext, title: String) -> Result<Self> {
        init::new(window, context, title).await
    }

    pub fn window(&self) -> &Window {
        self.window.as_ref()
    }

    pub fn size(&self) -> PhysicalSize<u32> {
        self.size
    }

    pub fn context(&self) -> &ViewerContext {
        &self.context
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>, now: f64) {
        layout::resize(self, new_size, now);
    }

    pub fn dispatch(&mut self, event: InputEvent, now: f64) {
        let events = self.context.handle(event, now);
        self.report(&events);
    }

    /// Advances the core to `now` and picks up the colours it produced.
    pub fn update(&mut self, now: f64) -> FrameSnapshot {
        let snapshot = self.context.tick(now);
        self.background = clear_color(snapshot.background);
        self.report(&snapshot.events);
        snapshot
    }

    pub fn render(&mut self) -> Result<(), SurfaceError> {
        render::render(self)
    }

    fn report(&self, events: &[ViewerEvent]) {
        for event in events {
            match serde_json::to_string(event) {
                Ok(line) => log::debug!("{line}"),
                Err(err) => log::warn!("unserialisable viewer event {event:?}: {err}"),
            }
            match event {
                ViewerEvent::OverlayOpened { content, .. } => {
                    let title = overlay_title(&self.title, Some(content), self.context.config());
                    log::info!("{title}");
                    self.window.set_title(&title);
                }
                ViewerEvent::OverlayClosed { .. } => {
                    let content = self.context.overlay().content();
                    self.window
                        .set_title(&overlay_title(&self.title, content, self.context.config()));
                }
                _ => {}
            }
        }
    }
}

/// Element count for a draw call; anything past `u32::MAX` is left out.
fn draw_count(len: usize, what: &str) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| {
        log::error!("{len} {what} exceed the draw range; drawing {}", u32::MAX);
        u32::MAX
    })
}

fn clear_color(background: [f32; 3]) -> wgpu::Color {
    wgpu::Color {
        r: background[0] as f64,
        g: background[1] as f64,
        b: background[2] as f64,
        a: 1.0,
    }
}

/// Window title while a detail overlay is open.
fn overlay_title(base: &str, content: Option<&OverlayContent>, config: &ViewerConfig) -> String {
    match content {
        None => base.to_string(),
        Some(OverlayContent::Key { category, key }) => match config.category(*category) {
            Some(def) => format!("{base} - {}: {key}", def.name),
            None => format!("{base} - {key}"),
        },
        Some(OverlayContent::Explicit { body }) => {
            let first = body.lines().next().unwrap_or_default();
            format!("{base} - {first}")
        }
    }
}
