use super::super::markers::{MarkerInstance, marker_instances, marker_uniforms};
use super::super::mesh::mesh_uniforms;
use super::{ViewerState, draw_count};
use bytemuck::cast_slice;
use wgpu::SurfaceError;

/// Terrain pass (clears colour and depth), then the marker pass on top.
pub(super) fn render(state: &mut ViewerState) -> Result<(), SurfaceError> {
    let frame = state.surface.get_current_texture()?;
    let view = frame
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());
    let mut encoder = state
        .device
        .create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("terrain-viewer-encoder"),
        });

    draw_terrain(state, &view, &mut encoder);
    draw_markers(state, &view, &mut encoder);

    state.queue.submit(std::iter::once(encoder.finish()));
    frame.present();
    Ok(())
}

fn draw_terrain(
    state: &mut ViewerState,
    view: &wgpu::TextureView,
    encoder: &mut wgpu::CommandEncoder,
) {
    let uniforms = mesh_uniforms(
        state.context.camera().view_projection(),
        state.context.materials(),
    );
    state
        .queue
        .write_buffer(&state.mesh.uniform_buffer, 0, cast_slice(&[uniforms]));

    let mesh = &state.mesh;
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("terrain-pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(state.background),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
            view: &mesh.depth_view,
            depth_ops: Some(wgpu::Operations {
                load: wgpu::LoadOp::Clear(1.0),
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    let Some(vertex_buffer) = mesh.vertex_buffer.as_ref() else {
        return;
    };
    pass.set_pipeline(&mesh.pipeline);
    pass.set_bind_group(0, &mesh.bind_group, &[]);
    pass.set_vertex_buffer(0, vertex_buffer.slice(..));
    pass.draw(0..mesh.vertex_count, 0..1);
}

fn draw_markers(
    state: &mut ViewerState,
    view: &wgpu::TextureView,
    encoder: &mut wgpu::CommandEncoder,
) {
    let instances = marker_instances(
        state.context.markers(),
        state.context.config(),
        state.context.pointer().hover(),
        state.context.pointer().base_size(),
    );
    if instances.is_empty() {
        return;
    }

    ensure_marker_capacity(state, instances.len());

    let camera = state.context.camera();
    let uniforms = marker_uniforms(camera, camera.view_projection());
    let markers = &state.markers;
    state
        .queue
        .write_buffer(&markers.uniform_buffer, 0, cast_slice(&[uniforms]));
    state
        .queue
        .write_buffer(&markers.instance_buffer, 0, cast_slice(&instances));

    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some("marker-pass"),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    let instance_bytes = (instances.len() * std::mem::size_of::<MarkerInstance>()) as u64;
    pass.set_pipeline(&markers.pipeline);
    pass.set_bind_group(0, &markers.bind_group, &[]);
    pass.set_vertex_buffer(0, markers.vertex_buffer.slice(..));
    pass.set_vertex_buffer(1, markers.instance_buffer.slice(0..instance_bytes));
    pass.draw(0..6, 0..draw_count(instances.len(), "marker instances"));
}

fn ensure_marker_capacity(state: &mut ViewerState, required: usize) {
    if required <= state.markers.capacity {
        return;
    }

    let new_capacity = required.next_power_of_two().max(64);
    let new_size = (new_capacity * std::mem::size_of::<MarkerInstance>()) as u64;
    state.markers.instance_buffer = state.device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("marker-instance-buffer"),
        size: new_size,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    state.markers.capacity = new_capacity;
}
