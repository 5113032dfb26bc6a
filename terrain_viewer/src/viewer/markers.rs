use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use terrain_engine::{CameraState, HoverState, MarkerSet, ViewerConfig};

#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub(super) struct MarkerVertex {
    pub position: [f32; 2],
}

/// One billboard. `radius` is the world-space half extent, matching the
/// sphere the pointer engine picks against.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub(super) struct MarkerInstance {
    pub center: [f32; 3],
    pub radius: f32,
    pub color: [f32; 4],
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub(super) struct MarkerUniforms {
    pub view_projection: [[f32; 4]; 4],
    /// Camera right and up axes, so quads face the viewer.
    pub right: [f32; 4],
    pub up: [f32; 4],
}

pub(super) const MARKER_VERTICES: [MarkerVertex; 6] = [
    MarkerVertex {
        position: [-1.0, -1.0],
    },
    MarkerVertex {
        position: [1.0, -1.0],
    },
    MarkerVertex {
        position: [-1.0, 1.0],
    },
    MarkerVertex {
        position: [-1.0, 1.0],
    },
    MarkerVertex {
        position: [1.0, -1.0],
    },
    MarkerVertex {
        position: [1.0, 1.0],
    },
];

const FALLBACK_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

pub(super) fn marker_uniforms(camera: &CameraState, view_projection: Mat4) -> MarkerUniforms {
    MarkerUniforms {
        view_projection: view_projection.to_cols_array_2d(),
        right: camera.right().extend(0.0).to_array(),
        up: camera.up().extend(0.0).to_array(),
    }
}

/// Instances for every visible marker. Colours follow the mode blend and the
/// hovered marker takes its category's highlight colour; alpha carries the
/// group opacity.
pub(super) fn marker_instances(
    markers: &MarkerSet,
    config: &ViewerConfig,
    hover: HoverState,
    base_size: f32,
) -> Vec<MarkerInstance> {
    let mut instances = Vec::with_capacity(markers.visible_len());
    for group in markers.groups().iter().filter(|group| group.is_visible()) {
        let category = config.category(group.category());
        let opacity = group.opacity();
        for (index, record) in group.records().iter().enumerate() {
            let hovered = hover
                .marker
                .is_some_and(|id| id.category == group.category() && id.index as usize == index);
            let color = match category {
                Some(def) if hovered => def.highlight_color,
                Some(def) => markers.color(def),
                None => FALLBACK_COLOR,
            };
            let scale = group.scale(index).unwrap_or(1.0);
            instances.push(MarkerInstance {
                center: record.position.to_array(),
                radius: base_size * scale,
                color: [color[0], color[1], color[2], opacity],
            });
        }
    }
    instances
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use terrain_engine::{CategoryDef, CategoryId, MarkerGroup, MarkerId, PointRecord};

    fn config() -> ViewerConfig {
        ViewerConfig {
            categories: vec![
                CategoryDef {
                    name: "wells".to_string(),
                    color: [0.2, 0.4, 0.9],
                    dark_color: Some([0.6, 0.8, 1.0]),
                    highlight_color: [1.0, 1.0, 0.0],
                },
                CategoryDef {
                    name: "trees".to_string(),
                    color: [0.1, 0.8, 0.2],
                    dark_color: None,
                    highlight_color: [1.0, 0.5, 0.0],
                },
            ],
            ..ViewerConfig::default()
        }
    }

    fn record(category: CategoryId, x: f32) -> PointRecord {
        PointRecord {
            position: Vec3::new(x, 2.0, -x),
            category,
            key: None,
            fields: Vec::new(),
        }
    }

    fn markers() -> MarkerSet {
        let mut set = MarkerSet::with_categories(2);
        let mut wells = MarkerGroup::new(CategoryId(0));
        wells.push(record(CategoryId(0), 1.0));
        wells.push(record(CategoryId(0), 2.0));
        let mut trees = MarkerGroup::new(CategoryId(1));
        trees.push(record(CategoryId(1), 3.0));
        set.insert_group(wells);
        set.insert_group(trees);
        set
    }

    #[test]
    fn hovered_marker_takes_highlight_colour_and_scale() {
        let mut set = markers();
        let hovered = MarkerId {
            category: CategoryId(0),
            index: 1,
        };
        set.set_scale(hovered, 1.5);
        let hover = HoverState {
            category: Some(CategoryId(0)),
            marker: Some(hovered),
        };

        let instances = marker_instances(&set, &config(), hover, 2.0);
        assert_eq!(instances.len(), 3);
        assert_eq!(instances[0].color[..3], [0.2, 0.4, 0.9]);
        assert_eq!(instances[0].radius, 2.0);
        assert_eq!(instances[1].color[..3], [1.0, 1.0, 0.0]);
        assert_eq!(instances[1].radius, 3.0);
        assert_eq!(instances[1].center, [2.0, 2.0, -2.0]);
        assert_eq!(instances[2].color[..3], [0.1, 0.8, 0.2]);
    }

    #[test]
    fn hidden_groups_are_skipped_and_opacity_is_alpha() {
        let mut set = markers();
        set.toggle(CategoryId(0));
        if let Some(trees) = set.group_mut(CategoryId(1)) {
            trees.set_opacity(0.25);
        }

        let instances = marker_instances(&set, &config(), HoverState::default(), 1.0);
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].color[3], 0.25);
    }

    #[test]
    fn colours_track_the_mode_blend() {
        let mut set = markers();
        set.set_mode_blend(1.0);
        let instances = marker_instances(&set, &config(), HoverState::default(), 1.0);
        assert_eq!(instances[0].color[..3], [0.6, 0.8, 1.0]);
        assert_eq!(instances[2].color[..3], [0.1, 0.8, 0.2]);
    }

    #[test]
    fn instance_layout_matches_pipeline_offsets() {
        assert_eq!(std::mem::size_of::<MarkerInstance>(), 32);
        assert_eq!(std::mem::size_of::<MarkerUniforms>() % 16, 0);
    }
}
