use std::{borrow::Cow, sync::Arc};

use super::super::markers::{
    MARKER_VERTICES, MarkerInstance, MarkerUniforms, MarkerVertex, marker_uniforms,
};
use super::super::mesh::{MeshUniforms, MeshVertex, mesh_uniforms, terrain_vertices};
use super::super::shaders::{MARKER_SHADER_SOURCE, MESH_SHADER_SOURCE};
use super::{MarkerResources, MeshResources, ViewerState, clear_color, draw_count};
use anyhow::{Context, Result};
use bytemuck::cast_slice;
use terrain_engine::{InputEvent, ViewerContext};
use wgpu::util::DeviceExt;
use winit::{dpi::PhysicalSize, window::Window};

pub(super) const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Bundles the wgpu objects tied to the viewer window.
struct WgpuBootstrap {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface_format: wgpu::TextureFormat,
    present_mode: wgpu::PresentMode,
    alpha_mode: wgpu::CompositeAlphaMode,
}

/// Brings up wgpu, uploads the terrain once and prepares the marker buffers,
/// then syncs the core's viewport to the window.
pub(super) async fn new(
    window: Arc<Window>,
    mut context: ViewerContext,
    title: String,
) -> Result<ViewerState> {
    let size = window.inner_size();
    let wgpu = bootstrap_wgpu(window.clone()).await?;

    // The session was built before the window existed.
    context.handle(
        InputEvent::Resize {
            width: size.width.max(1) as f32,
            height: size.height.max(1) as f32,
        },
        0.0,
    );
    let background = clear_color(context.crossfade().background());
    let view_projection = context.camera().view_projection();

    let vertices = terrain_vertices(context.terrain());
    log::info!(
        "uploading {} terrain vertices, {} markers",
        vertices.len(),
        context.markers().len()
    );
    let mesh = create_mesh_resources(
        &wgpu.device,
        size,
        wgpu.surface_format,
        &vertices,
        mesh_uniforms(view_projection, context.materials()),
    );
    let markers = create_marker_resources(
        &wgpu.device,
        wgpu.surface_format,
        marker_uniforms(context.camera(), view_projection),
    );

    let config = wgpu::SurfaceConfiguration {
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        format: wgpu.surface_format,
        width: size.width.max(1),
        height: size.height.max(1),
        present_mode: wgpu.present_mode,
        alpha_mode: wgpu.alpha_mode,
        view_formats: vec![],
        desired_maximum_frame_latency: 1,
    };
    wgpu.surface.configure(&wgpu.device, &config);

    Ok(ViewerState {
        window,
        surface: wgpu.surface,
        device: wgpu.device,
        queue: wgpu.queue,
        config,
        size,
        context,
        mesh,
        markers,
        background,
        title,
    })
}

async fn bootstrap_wgpu(window: Arc<Window>) -> Result<WgpuBootstrap> {
    let instance = wgpu::Instance::default();
    let surface = instance
        .create_surface(window.clone())
        .context("creating wgpu surface")?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            force_fallback_adapter: false,
            compatible_surface: Some(&surface),
        })
        .await
        .context("requesting wgpu adapter")?;

    let (device, queue) = adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: Some("terrain-viewer-device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
            },
            None,
        )
        .await
        .context("requesting wgpu device")?;

    let surface_caps = surface.get_capabilities(&adapter);
    let surface_format = surface_caps
        .formats
        .iter()
        .copied()
        .find(|format| format.is_srgb())
        .or_else(|| surface_caps.formats.first().copied())
        .context("surface reports no texture formats")?;
    let present_mode = surface_caps
        .present_modes
        .iter()
        .copied()
        .find(|mode| *mode == wgpu::PresentMode::Mailbox)
        .unwrap_or(wgpu::PresentMode::Fifo);
    let alpha_mode = surface_caps
        .alpha_modes
        .first()
        .copied()
        .unwrap_or(wgpu::CompositeAlphaMode::Opaque);

    Ok(WgpuBootstrap {
        surface,
        device,
        queue,
        surface_format,
        present_mode,
        alpha_mode,
    })
}

fn uniform_layout(device: &wgpu::Device, label: &str, size: usize) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some(label),
        entries: &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(size as u64),
            },
            count: None,
        }],
    })
}

fn create_mesh_resources(
    device: &wgpu::Device,
    size: PhysicalSize<u32>,
    surface_format: wgpu::TextureFormat,
    vertices: &[MeshVertex],
    initial: MeshUniforms,
) -> MeshResources {
    let bind_group_layout = uniform_layout(
        device,
        "mesh-uniform-layout",
        std::mem::size_of::<MeshUniforms>(),
    );

    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("mesh-uniform-buffer"),
        contents: cast_slice(&[initial]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("mesh-uniform-bind-group"),
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("mesh-shader"),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(MESH_SHADER_SOURCE)),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("mesh-pipeline-layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let vertex_layout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MeshVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32],
    };

    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("mesh-pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "mesh_vs_main",
            buffers: &[vertex_layout],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "mesh_fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        // Exported terrain winding is not consistent, so both sides are drawn.
        primitive: wgpu::PrimitiveState {
            cull_mode: None,
            ..wgpu::PrimitiveState::default()
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::LessEqual,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    });

    let vertex_buffer = (!vertices.is_empty()).then(|| {
        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("terrain-vertex-buffer"),
            contents: cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        })
    });

    let (depth_texture, depth_view) = create_depth_texture(device, size);

    MeshResources {
        pipeline,
        bind_group,
        uniform_buffer,
        vertex_buffer,
        vertex_count: draw_count(vertices.len(), "terrain vertices"),
        _depth_texture: depth_texture,
        depth_view,
    }
}

fn create_marker_resources(
    device: &wgpu::Device,
    surface_format: wgpu::TextureFormat,
    initial: MarkerUniforms,
) -> MarkerResources {
    let bind_group_layout = uniform_layout(
        device,
        "marker-uniform-layout",
        std::mem::size_of::<MarkerUniforms>(),
    );

    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("marker-uniform-buffer"),
        contents: cast_slice(&[initial]),
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("marker-uniform-bind-group"),
        layout: &bind_group_layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform_buffer.as_entire_binding(),
        }],
    });

    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("marker-shader"),
        source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(MARKER_SHADER_SOURCE)),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("marker-pipeline-layout"),
        bind_group_layouts: &[&bind_group_layout],
        push_constant_ranges: &[],
    });

    let vertex_layout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MarkerVertex>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &wgpu::vertex_attr_array![0 => Float32x2],
    };

    let instance_layout = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<MarkerInstance>() as u64,
        step_mode: wgpu::VertexStepMode::Instance,
        attributes: &[
            wgpu::VertexAttribute {
                offset: 0,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x3,
            },
            wgpu::VertexAttribute {
                offset: 12,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32,
            },
            wgpu::VertexAttribute {
                offset: 16,
                shader_location: 3,
                format: wgpu::VertexFormat::Float32x4,
            },
        ],
    };

    // Markers draw over the terrain without depth testing so a marker below
    // a roof stays visible and clickable.
    let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("marker-pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: "vs_main",
            buffers: &[vertex_layout, instance_layout],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: surface_format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState::default(),
        depth_stencil: None,
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
    });

    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("marker-vertex-buffer"),
        contents: cast_slice(&MARKER_VERTICES),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let initial_capacity = 64usize;
    let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("marker-instance-buffer"),
        size: (initial_capacity * std::mem::size_of::<MarkerInstance>()) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    MarkerResources {
        pipeline,
        bind_group,
        uniform_buffer,
        vertex_buffer,
        instance_buffer,
        capacity: initial_capacity,
    }
}

pub(super) fn create_depth_texture(
    device: &wgpu::Device,
    size: PhysicalSize<u32>,
) -> (wgpu::Texture, wgpu::TextureView) {
    let extent = wgpu::Extent3d {
        width: size.width.max(1),
        height: size.height.max(1),
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("terrain-depth-texture"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}
