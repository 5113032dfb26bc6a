//! Survey space to scene space.
//!
//! Survey data is projected easting/northing in US survey feet. The scene is
//! metric and Y-up with north along −Z, recentred by a fixed origin offset so
//! coordinates stay small enough for `f32` geometry. Arithmetic happens in
//! `f64` and only the recentred result is narrowed.

use glam::Vec3;
use terrain_formats::SurveyBounds;

use crate::bounds::SceneBounds;
use crate::config::TransformConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurveyPoint {
    pub x: f64,
    pub y: f64,
}

impl SurveyPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Metres subtracted from every transformed coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OriginOffset {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl From<[f64; 3]> for OriginOffset {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateTransformer {
    unit_scale: f64,
    offset: OriginOffset,
    marker_elevation: f32,
}

impl CoordinateTransformer {
    pub fn new(unit_scale: f64, offset: OriginOffset, marker_elevation: f32) -> Self {
        Self {
            unit_scale,
            offset,
            marker_elevation,
        }
    }

    pub fn from_config(config: &TransformConfig) -> Self {
        Self::new(
            config.unit_scale,
            OriginOffset::from(config.origin_offset),
            config.marker_elevation,
        )
    }

    pub fn unit_scale(&self) -> f64 {
        self.unit_scale
    }

    pub fn offset(&self) -> OriginOffset {
        self.offset
    }

    /// Marker position for a survey point. Height is the configured lift,
    /// never taken from the data.
    pub fn to_scene(&self, point: SurveyPoint) -> Vec3 {
        Vec3::new(
            (point.x * self.unit_scale - self.offset.x) as f32,
            self.marker_elevation,
            (-(point.y * self.unit_scale) - self.offset.z) as f32,
        )
    }

    /// Terrain vertex `[easting, northing, elevation]` in survey units.
    pub fn vertex_to_scene(&self, position: [f64; 3]) -> Vec3 {
        let [easting, northing, elevation] = position;
        Vec3::new(
            (easting * self.unit_scale - self.offset.x) as f32,
            (elevation * self.unit_scale - self.offset.y) as f32,
            (-(northing * self.unit_scale) - self.offset.z) as f32,
        )
    }

    /// Normals only need the axis permutation; scale and offset do not apply.
    pub fn normal_to_scene(&self, normal: [f32; 3]) -> Vec3 {
        Vec3::new(normal[0], normal[2], -normal[1])
    }

    pub fn bounds_to_scene(&self, bounds: &SurveyBounds) -> SceneBounds {
        let mut scene = SceneBounds::from_point(self.vertex_to_scene(bounds.min));
        scene.update(self.vertex_to_scene(bounds.max).to_array());
        scene
    }
}
