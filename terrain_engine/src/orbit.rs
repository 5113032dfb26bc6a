//! Orbit/pan/zoom camera rig.
//!
//! Pointer input does not move the camera directly. It adds to a residual
//! velocity that each tick spends a frame-rate independent fraction of, so a
//! drag of N pixels eventually rotates exactly N × `rotate_speed` radians no
//! matter how the frames fall. While an animation owns the camera the rig
//! ignores input; when the animation ends the pose is snapped to its end and
//! the residual velocity is cleared before control returns.

use glam::{Quat, Vec2, Vec3};

use crate::animation::{AnimationSlot, Easing, TaskId};
use crate::camera::{CameraPose, CameraState};
use crate::config::CameraConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RigMode {
    Interactive,
    Animating,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Velocity {
    yaw: f32,
    pitch: f32,
    pan: Vec3,
    log_zoom: f32,
}

impl Velocity {
    fn is_settled(&self) -> bool {
        self.yaw.abs() < 1e-6
            && self.pitch.abs() < 1e-6
            && self.pan.length_squared() < 1e-12
            && self.log_zoom.abs() < 1e-6
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RigTick {
    /// The camera moved this tick.
    pub moved: bool,
    /// The camera animation ended this tick.
    pub finished: Option<TaskId>,
}

#[derive(Debug, Clone)]
pub struct OrbitCameraRig {
    camera: CameraState,
    mode: RigMode,
    velocity: Velocity,
    channel: AnimationSlot<CameraPose>,
    last_tick: Option<f64>,
    rotate_speed: f32,
    zoom_speed: f32,
    damping: f32,
    min_polar: f32,
    max_polar: f32,
    min_half_height: f32,
    max_half_height: f32,
}

impl OrbitCameraRig {
    pub fn new(camera: CameraState, config: &CameraConfig) -> Self {
        let min_polar = config.min_polar_deg.to_radians().max(0.0);
        let max_polar = config
            .max_polar_deg
            .to_radians()
            .clamp(min_polar, std::f32::consts::PI);
        Self {
            camera,
            mode: RigMode::Interactive,
            velocity: Velocity::default(),
            channel: AnimationSlot::new(),
            last_tick: None,
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            damping: config.damping.max(0.0),
            min_polar,
            max_polar,
            min_half_height: config.min_half_height,
            max_half_height: config.max_half_height.max(config.min_half_height),
        }
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    /// Direct access for framing and resize. Callers must not use this to
    /// fight a running animation.
    pub fn camera_mut(&mut self) -> &mut CameraState {
        &mut self.camera
    }

    pub fn mode(&self) -> RigMode {
        self.mode
    }

    pub fn is_interactive(&self) -> bool {
        self.mode == RigMode::Interactive
    }

    pub fn active_animation(&self) -> Option<TaskId> {
        self.channel.active_task()
    }

    /// Pose the running animation will end on.
    pub fn animation_target(&self) -> Option<CameraPose> {
        self.channel.end_value()
    }

    /// Drag in pixels: +x orbits the camera to the left around the pivot,
    /// +y tilts it towards the horizon.
    pub fn rotate(&mut self, delta: Vec2) -> bool {
        if !self.is_interactive() {
            return false;
        }
        self.velocity.yaw -= delta.x * self.rotate_speed;
        self.velocity.pitch += delta.y * self.rotate_speed;
        true
    }

    /// Drag in pixels; the pivot follows the pointer.
    pub fn pan(&mut self, delta: Vec2, viewport_height: f32) -> bool {
        if !self.is_interactive() {
            return false;
        }
        let units = self.camera.units_per_pixel(viewport_height);
        self.velocity.pan +=
            self.camera.right() * (-delta.x * units) + self.camera.up() * (delta.y * units);
        true
    }

    /// Positive deltas zoom out.
    pub fn zoom(&mut self, delta: f32) -> bool {
        if !self.is_interactive() {
            return false;
        }
        self.velocity.log_zoom += delta * self.zoom_speed;
        true
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        if aspect.is_finite() && aspect > 0.0 {
            self.camera.aspect = aspect;
        }
    }

    /// Hands the camera to an animation ending on `to`. Replaces any camera
    /// animation already running.
    pub fn animate_to(
        &mut self,
        from: CameraPose,
        to: CameraPose,
        duration: f64,
        easing: Easing,
        now: f64,
    ) -> TaskId {
        self.velocity = Velocity::default();
        self.mode = RigMode::Animating;
        self.camera.apply_pose(from);
        let task = self.channel.start(from, to, duration, easing, now);
        log::debug!("camera animation {task:?} started ({duration:.2}s)");
        task
    }

    pub fn clear_velocity(&mut self) {
        self.velocity = Velocity::default();
    }

    pub fn tick(&mut self, now: f64) -> RigTick {
        let dt = self
            .last_tick
            .map(|last| (now - last).max(0.0) as f32)
            .unwrap_or(0.0);
        self.last_tick = Some(now);

        match self.mode {
            RigMode::Animating => self.tick_animation(now),
            RigMode::Interactive => RigTick {
                moved: self.apply_velocity(dt),
                finished: None,
            },
        }
    }

    fn tick_animation(&mut self, now: f64) -> RigTick {
        let Some(step) = self.channel.advance(now) else {
            // Nothing left to drive the camera.
            self.release();
            return RigTick {
                moved: false,
                finished: None,
            };
        };
        self.camera.apply_pose(step.value);
        if step.finished {
            self.release();
            log::debug!("camera animation {:?} finished", step.task);
        }
        RigTick {
            moved: true,
            finished: step.finished.then_some(step.task),
        }
    }

    fn release(&mut self) {
        self.velocity = Velocity::default();
        self.mode = RigMode::Interactive;
    }

    fn apply_velocity(&mut self, dt: f32) -> bool {
        if self.velocity.is_settled() {
            self.velocity = Velocity::default();
            return false;
        }
        if dt <= 0.0 {
            return false;
        }
        let alpha = if self.damping > 0.0 {
            1.0 - (-self.damping * dt).exp()
        } else {
            1.0
        };

        let yaw = self.velocity.yaw * alpha;
        let pitch = self.velocity.pitch * alpha;
        let pan = self.velocity.pan * alpha;
        let log_zoom = self.velocity.log_zoom * alpha;
        self.velocity.yaw -= yaw;
        self.velocity.pitch -= pitch;
        self.velocity.pan -= pan;
        self.velocity.log_zoom -= log_zoom;

        self.orbit(yaw, pitch);
        self.camera.position += pan;
        self.camera.target += pan;
        self.camera.frustum_half_height = (self.camera.frustum_half_height * log_zoom.exp())
            .clamp(self.min_half_height, self.max_half_height);
        true
    }

    /// Rotates the camera about the pivot: yaw about world Y, then pitch
    /// about the camera's right axis, holding the polar angle in range.
    fn orbit(&mut self, yaw: f32, pitch: f32) {
        let target = self.camera.target;
        let mut offset = self.camera.position - target;
        let mut orientation = self.camera.orientation;

        if yaw != 0.0 {
            let rotation = Quat::from_rotation_y(yaw);
            offset = rotation * offset;
            orientation = rotation * orientation;
        }

        let distance = offset.length();
        if distance > f32::EPSILON {
            let polar = (offset.y / distance).clamp(-1.0, 1.0).acos();
            let wanted = (polar + pitch).clamp(self.min_polar, self.max_polar);
            let applied = wanted - polar;
            if applied != 0.0 {
                let axis = orientation * Vec3::X;
                let rotation = Quat::from_axis_angle(axis.normalize(), applied);
                offset = rotation * offset;
                orientation = rotation * orientation;
            }
        }

        self.camera.position = target + offset;
        self.camera.orientation = orientation.normalize();
    }

    /// Angle between the camera offset and world up.
    pub fn polar_angle(&self) -> f32 {
        let offset = self.camera.position - self.camera.target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return 0.0;
        }
        (offset.y / distance).clamp(-1.0, 1.0).acos()
    }
}
