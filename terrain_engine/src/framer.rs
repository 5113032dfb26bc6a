use glam::Vec3;

use crate::bounds::SceneBounds;
use crate::camera::CameraState;
use crate::config::CameraConfig;

/// Fits the orthographic frustum around a bounding box while keeping the
/// current view direction. Running it twice on the same input changes
/// nothing. The half-height stays inside the orbit rig's zoom range, so the
/// first interactive tick never snaps the zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFramer {
    pub padding: f32,
    pub min_half_height: f32,
    pub max_half_height: f32,
}

impl CameraFramer {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            padding: config.zoom_padding,
            min_half_height: config.min_half_height,
            max_half_height: config.max_half_height.max(config.min_half_height),
        }
    }

    pub fn fit(&self, camera: &mut CameraState, bounds: &SceneBounds) {
        let center = bounds.center();
        let diagonal = bounds.diagonal();
        let mut direction = camera.forward();
        if direction.length_squared() <= f32::EPSILON {
            direction = Vec3::NEG_Z;
        }
        // Far enough back that the whole box sits in front of the near plane.
        let distance = diagonal.max(1.0) * 2.0;

        let padded = bounds.largest_extent() * self.padding;
        if padded > self.max_half_height {
            log::warn!(
                "scene needs half-height {padded:.1}; capped at {:.1}",
                self.max_half_height
            );
        }
        camera.frustum_half_height = padded
            .min(self.max_half_height)
            .max(self.min_half_height)
            .max(f32::EPSILON);
        camera.target = center;
        camera.position = center - direction * distance;
        camera.far = camera.far.max(distance + diagonal * 2.0);

        log::info!(
            "framed {:.1} x {:.1} x {:.1} around {:?} (half-height {:.2})",
            bounds.size().x,
            bounds.size().y,
            bounds.size().z,
            center,
            camera.frustum_half_height
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::look_rotation;
    use crate::orbit::OrbitCameraRig;
    use glam::Vec2;

    const EPSILON: f32 = 1e-4;

    fn camera() -> CameraState {
        CameraState {
            position: Vec3::new(50.0, 50.0, 50.0),
            orientation: look_rotation(Vec3::new(-1.0, -1.0, -1.0), Vec3::Y),
            frustum_half_height: 1.0,
            target: Vec3::ZERO,
            aspect: 1.5,
            near: 0.1,
            far: 10.0,
        }
    }

    fn bounds() -> SceneBounds {
        SceneBounds {
            min: [-10.0, 0.0, -40.0],
            max: [30.0, 5.0, 0.0],
        }
    }

    #[test]
    fn half_height_is_padded_largest_extent() {
        let mut camera = camera();
        let framer = CameraFramer {
            padding: 0.6,
            min_half_height: 1.0,
            max_half_height: 1000.0,
        };
        framer.fit(&mut camera, &bounds());
        assert!((camera.frustum_half_height - 24.0).abs() <= EPSILON);
        assert_eq!(camera.target, Vec3::new(10.0, 2.5, -20.0));
        assert_eq!(camera.aspect, 1.5);
    }

    #[test]
    fn view_direction_is_preserved() {
        let mut camera = camera();
        let before = camera.forward();
        CameraFramer {
            padding: 1.0,
            min_half_height: 1.0,
            max_half_height: 1000.0,
        }
        .fit(&mut camera, &bounds());
        assert!((camera.forward() - before).abs().max_element() <= EPSILON);
        let to_target = (camera.target - camera.position).normalize();
        assert!((to_target - before).abs().max_element() <= EPSILON);
        assert!(camera.far > (camera.target - camera.position).length());
    }

    #[test]
    fn refitting_is_idempotent() {
        let framer = CameraFramer {
            padding: 0.75,
            min_half_height: 1.0,
            max_half_height: 1000.0,
        };
        let mut once = camera();
        framer.fit(&mut once, &bounds());
        let mut twice = once;
        framer.fit(&mut twice, &bounds());
        assert_eq!(once, twice);
    }

    #[test]
    fn degenerate_bounds_keep_a_usable_frustum() {
        let mut camera = camera();
        CameraFramer {
            padding: 0.6,
            min_half_height: 2.0,
            max_half_height: 1000.0,
        }
        .fit(&mut camera, &SceneBounds::from_point(Vec3::new(1.0, 2.0, 3.0)));
        assert_eq!(camera.frustum_half_height, 2.0);
        assert_eq!(camera.target, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn large_sites_stay_inside_the_orbit_zoom_range() {
        let config = CameraConfig::default();
        let mut camera = camera();
        CameraFramer::from_config(&config).fit(
            &mut camera,
            &SceneBounds {
                min: [-25_000.0, 0.0, -25_000.0],
                max: [25_000.0, 10.0, 25_000.0],
            },
        );
        assert_eq!(camera.frustum_half_height, config.max_half_height);

        let mut rig = OrbitCameraRig::new(camera, &config);
        rig.tick(0.0);
        rig.rotate(Vec2::new(1.0, 0.0));
        assert!(rig.tick(1.0 / 60.0).moved);
        assert_eq!(rig.camera().frustum_half_height, camera.frustum_half_height);
    }
}
