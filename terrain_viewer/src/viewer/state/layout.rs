use super::ViewerState;
use super::init::create_depth_texture;
use terrain_engine::InputEvent;
use winit::dpi::PhysicalSize;

pub(super) fn resize(state: &mut ViewerState, new_size: PhysicalSize<u32>, now: f64) {
    if new_size.width == 0 || new_size.height == 0 {
        return;
    }

    state.size = new_size;
    state.config.width = new_size.width;
    state.config.height = new_size.height;
    state.surface.configure(&state.device, &state.config);

    let (texture, view) = create_depth_texture(&state.device, new_size);
    state.mesh._depth_texture = texture;
    state.mesh.depth_view = view;

    state.dispatch(
        InputEvent::Resize {
            width: new_size.width as f32,
            height: new_size.height as f32,
        },
        now,
    );
}
