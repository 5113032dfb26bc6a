//! Orthographic camera state and the screen/scene conversions built on it.
//! The camera looks down its local −Z axis with local +Y up.

use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4};

use crate::animation::Interpolate;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    pub orientation: Quat,
    pub frustum_half_height: f32,
    /// Orbit pivot.
    pub target: Vec3,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl CameraState {
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    pub fn right(&self) -> Vec3 {
        self.orientation * Vec3::X
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            orientation: self.orientation,
        }
    }

    pub fn apply_pose(&mut self, pose: CameraPose) {
        self.position = pose.position;
        self.orientation = pose.orientation.normalize();
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position).inverse()
    }

    pub fn projection_matrix(&self) -> Mat4 {
        let half_height = self.frustum_half_height;
        let half_width = half_height * self.aspect;
        Mat4::orthographic_rh(
            -half_width,
            half_width,
            -half_height,
            half_height,
            self.near,
            self.far.max(self.near + 1.0),
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ray through a pixel (origin top-left, y down) of a viewport.
    pub fn ray_through(&self, pixel: Vec2, viewport: Vec2) -> Option<Ray> {
        if viewport.x <= 0.0 || viewport.y <= 0.0 {
            return None;
        }
        let ndc_x = pixel.x / viewport.x * 2.0 - 1.0;
        let ndc_y = 1.0 - pixel.y / viewport.y * 2.0;
        let half_height = self.frustum_half_height;
        let half_width = half_height * self.aspect;
        let origin = self.position
            + self.right() * (ndc_x * half_width)
            + self.up() * (ndc_y * half_height);
        Some(Ray {
            origin,
            direction: self.forward(),
        })
    }

    /// Pixel position of a scene point, `None` when it falls outside the
    /// depth range.
    pub fn project(&self, point: Vec3, viewport: Vec2) -> Option<Vec2> {
        let clip = self.view_projection() * Vec4::new(point.x, point.y, point.z, 1.0);
        if clip.w.abs() <= f32::EPSILON {
            return None;
        }
        let ndc = clip.truncate() / clip.w;
        if !(0.0..=1.0).contains(&ndc.z) {
            return None;
        }
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.x,
            (1.0 - ndc.y) * 0.5 * viewport.y,
        ))
    }

    /// Scene units covered by one vertical pixel.
    pub fn units_per_pixel(&self, viewport_height: f32) -> f32 {
        if viewport_height <= 0.0 {
            return 0.0;
        }
        self.frustum_half_height * 2.0 / viewport_height
    }
}

/// The animated part of a camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Interpolate for CameraPose {
    fn interpolate(from: Self, to: Self, t: f32) -> Self {
        Self {
            position: from.position.lerp(to.position, t),
            orientation: from.orientation.slerp(to.orientation, t).normalize(),
        }
    }
}

/// Orientation whose −Z axis points along `forward` and whose +Y axis lies
/// as close to `up` as possible. Falls back to another up axis when the two
/// are parallel.
pub fn look_rotation(forward: Vec3, up: Vec3) -> Quat {
    let forward = forward.normalize_or_zero();
    if forward == Vec3::ZERO {
        return Quat::IDENTITY;
    }
    let mut right = forward.cross(up);
    if right.length_squared() <= 1e-8 {
        let fallback = if forward.y.abs() < 0.9 { Vec3::Y } else { Vec3::NEG_Z };
        right = forward.cross(fallback);
    }
    let right = right.normalize();
    let up = right.cross(forward);
    Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Distance to the first intersection with a sphere in front of the
    /// origin.
    pub fn intersect_sphere(&self, center: Vec3, radius: f32) -> Option<f32> {
        let to_center = center - self.origin;
        let along = to_center.dot(self.direction);
        let closest_sq = to_center.length_squared() - along * along;
        let radius_sq = radius * radius;
        if closest_sq > radius_sq {
            return None;
        }
        let half_chord = (radius_sq - closest_sq).sqrt();
        let near = along - half_chord;
        let far = along + half_chord;
        if far < 0.0 {
            None
        } else if near >= 0.0 {
            Some(near)
        } else {
            Some(far)
        }
    }
}

/// Screen-space rectangle in pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl ScreenRect {
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && point.x <= self.x + self.width
            && point.y <= self.y + self.height
    }
}
