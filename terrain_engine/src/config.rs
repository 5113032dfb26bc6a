//! Tunable constants for the viewer. Every field has a default so a config
//! file only needs to mention what it overrides.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::markers::CategoryId;
use crate::materials::lerp_color;

/// US survey foot expressed in metres.
pub const US_SURVEY_FOOT: f64 = 1200.0 / 3937.0;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub transform: TransformConfig,
    pub camera: CameraConfig,
    pub mode: ModeConfig,
    pub markers: MarkerConfig,
    pub interaction: InteractionConfig,
    pub terrain: TerrainConfig,
    /// Ordered category table; a category's position is its `CategoryId`.
    pub categories: Vec<CategoryDef>,
}

impl ViewerConfig {
    pub fn category_id(&self, name: &str) -> Option<CategoryId> {
        self.categories
            .iter()
            .position(|category| category.name == name)
            .and_then(CategoryId::from_index)
    }

    pub fn category(&self, id: CategoryId) -> Option<&CategoryDef> {
        self.categories.get(id.index())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    /// Marker colour in light mode.
    pub color: [f32; 3],
    /// Marker colour in dark mode; light-mode colour when absent.
    #[serde(default)]
    pub dark_color: Option<[f32; 3]>,
    #[serde(default = "default_highlight")]
    pub highlight_color: [f32; 3],
}

impl CategoryDef {
    pub fn color_at(&self, t: f32) -> [f32; 3] {
        let dark = self.dark_color.unwrap_or(self.color);
        lerp_color(self.color, dark, t.clamp(0.0, 1.0))
    }
}

fn default_highlight() -> [f32; 3] {
    [1.0, 0.85, 0.3]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Survey units to metres.
    pub unit_scale: f64,
    /// Subtracted from every transformed coordinate, in metres.
    pub origin_offset: [f64; 3],
    /// Fixed lift of every marker above the scene origin plane, in metres.
    pub marker_elevation: f32,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            unit_scale: US_SURVEY_FOOT,
            origin_offset: [0.0, 0.0, 0.0],
            marker_elevation: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub zoom_padding: f32,
    /// Direction from the pivot towards the camera in the default view.
    pub isometric_direction: [f32; 3],
    /// Scene axis the camera's up vector points along when viewed from above.
    pub top_down_reference_axis: [f32; 3],
    pub near: f32,
    pub far: f32,
    pub min_half_height: f32,
    pub max_half_height: f32,
    pub min_polar_deg: f32,
    pub max_polar_deg: f32,
    /// Radians of orbit per pixel of drag.
    pub rotate_speed: f32,
    /// Exponential zoom rate per wheel unit.
    pub zoom_speed: f32,
    /// Per-second decay of residual orbit/pan/zoom motion.
    pub damping: f32,
    pub top_down_duration: f64,
    pub intro_duration: f64,
    pub initial_aspect: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom_padding: 0.6,
            isometric_direction: [1.0, 1.0, 1.0],
            top_down_reference_axis: [0.0, 0.0, -1.0],
            near: 0.1,
            far: 20_000.0,
            min_half_height: 1.0,
            max_half_height: 20_000.0,
            min_polar_deg: 0.0,
            max_polar_deg: 85.0,
            rotate_speed: 0.005,
            zoom_speed: 0.001,
            damping: 10.0,
            top_down_duration: 1.0,
            intro_duration: 2.0,
            initial_aspect: 16.0 / 9.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeConfig {
    pub crossfade_duration: f64,
    pub light_background: [f32; 3],
    pub dark_background: [f32; 3],
    pub start_dark: bool,
}

impl Default for ModeConfig {
    fn default() -> Self {
        Self {
            crossfade_duration: 0.8,
            light_background: [0.92, 0.93, 0.95],
            dark_background: [0.06, 0.07, 0.09],
            start_dark: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Base marker size as a fraction of the frustum half-height.
    pub size_factor: f32,
    pub hover_scale: f32,
    /// Per-second rate of the exponential scale approach.
    pub scale_rate: f32,
    pub scale_epsilon: f32,
    pub dimmed_opacity: f32,
    /// Pick sphere radius relative to the drawn marker radius.
    pub pick_radius_factor: f32,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            size_factor: 0.02,
            hover_scale: 1.6,
            scale_rate: 12.0,
            scale_epsilon: 1e-3,
            dimmed_opacity: 0.25,
            pick_radius_factor: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Pointer travel (pixels) beyond which a press/release is a drag.
    pub drag_threshold_px: f32,
    /// Seconds after an overlay closes during which clicks cannot reopen it.
    pub close_debounce: f64,
    pub double_click_window: f64,
}

impl InteractionConfig {
    pub fn drag_threshold_sq(&self) -> f32 {
        self.drag_threshold_px * self.drag_threshold_px
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 5.0,
            close_debounce: 0.3,
            double_click_window: 0.35,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    pub top_face_threshold: f32,
    /// Sub-node whose faces take the terrain blend.
    pub terrain_node: Option<String>,
    /// Sub-node whose side faces take the structure colour lerp.
    pub structure_node: Option<String>,
    pub ground_light: [f32; 3],
    pub ground_dark: [f32; 3],
    pub structure_light: [f32; 3],
    pub structure_dark: [f32; 3],
    /// Faces outside both sub-nodes while `terrain_node` resolves.
    pub untextured_color: [f32; 3],
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            top_face_threshold: 0.5,
            terrain_node: Some("terrain".to_string()),
            structure_node: Some("structures".to_string()),
            ground_light: [0.78, 0.76, 0.70],
            ground_dark: [0.16, 0.18, 0.22],
            structure_light: [0.86, 0.86, 0.88],
            structure_dark: [0.22, 0.24, 0.30],
            untextured_color: [0.55, 0.55, 0.52],
        }
    }
}

pub fn load_viewer_config(path: &Path) -> Result<ViewerConfig, LoadError> {
    let data = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&data).map_err(|source| LoadError::Json {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config: ViewerConfig = serde_json::from_str(
            r#"{
                "transform": { "origin_offset": [100.0, 0.0, 50.0] },
                "categories": [
                    { "name": "wells", "color": [0.2, 0.4, 0.9] },
                    { "name": "trees", "color": [0.1, 0.8, 0.2], "highlight_color": [1, 1, 1] }
                ]
            }"#,
        )
        .expect("config parses");

        assert_eq!(config.transform.origin_offset, [100.0, 0.0, 50.0]);
        assert_eq!(config.transform.unit_scale, US_SURVEY_FOOT);
        assert_eq!(config.markers, MarkerConfig::default());
        assert_eq!(config.categories[0].highlight_color, default_highlight());
        assert_eq!(config.categories[0].dark_color, None);
        assert_eq!(config.categories[0].color_at(1.0), [0.2, 0.4, 0.9]);
        assert_eq!(config.category_id("trees"), Some(CategoryId(1)));
        assert_eq!(config.category_id("roads"), None);
    }

    #[test]
    fn drag_threshold_is_compared_squared() {
        let interaction = InteractionConfig {
            drag_threshold_px: 4.0,
            ..InteractionConfig::default()
        };
        assert_eq!(interaction.drag_threshold_sq(), 16.0);
    }
}
