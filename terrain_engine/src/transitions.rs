//! Scripted camera moves: the overhead pivot and the opening intro. Both run
//! on the rig's single camera channel, so whichever starts last wins.

use glam::Vec3;

use crate::animation::{Easing, TaskId};
use crate::camera::{CameraPose, CameraState, look_rotation};
use crate::config::CameraConfig;
use crate::orbit::OrbitCameraRig;

/// Forward must be this close to straight down to count as overhead.
const OVERHEAD_TOLERANCE: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TopDownDirection {
    ToOverhead,
    Returning,
}

#[derive(Debug, Clone)]
pub struct TopDownTransitionController {
    reference_axis: Vec3,
    duration: f64,
    /// Pose to return to; kept until a return trip completes.
    stored: Option<CameraPose>,
    active: Option<TaskId>,
    direction: Option<TopDownDirection>,
}

impl TopDownTransitionController {
    pub fn from_config(config: &CameraConfig) -> Self {
        Self::new(
            Vec3::from_array(config.top_down_reference_axis),
            config.top_down_duration,
        )
    }

    pub fn new(reference_axis: Vec3, duration: f64) -> Self {
        Self {
            reference_axis: horizontal_axis(reference_axis),
            duration,
            stored: None,
            active: None,
            direction: None,
        }
    }

    pub fn reference_axis(&self) -> Vec3 {
        self.reference_axis
    }

    /// Overhead pose above the camera's pivot at the current pivot distance.
    /// Depends only on the pivot, that distance and the reference axis.
    pub fn overhead_pose(&self, camera: &CameraState) -> CameraPose {
        let distance = (camera.position - camera.target).length().max(1.0);
        overhead_pose(camera.target, distance, self.reference_axis)
    }

    pub fn is_overhead(&self, camera: &CameraState) -> bool {
        camera.forward().dot(Vec3::NEG_Y) >= 1.0 - OVERHEAD_TOLERANCE
            && camera.up().dot(self.reference_axis) >= 1.0 - OVERHEAD_TOLERANCE
    }

    /// Pivots to the overhead pose, or back to the pose held before the last
    /// pivot when the camera is already overhead.
    pub fn toggle(&mut self, rig: &mut OrbitCameraRig, now: f64) -> TopDownDirection {
        let camera = *rig.camera();
        let from = camera.pose();
        let running = self.is_running(rig);
        let was_returning = self.direction == Some(TopDownDirection::Returning);
        if was_returning && !running {
            self.stored = None;
        }

        // Mid-flight the camera is not yet overhead; judge by where it is going.
        let heading_overhead = if running {
            rig.animation_target()
                .is_some_and(|target| self.pose_is_overhead(&camera, target))
        } else {
            self.is_overhead(&camera)
        };

        let (to, direction) = match self.stored {
            Some(stored) if heading_overhead => (stored, TopDownDirection::Returning),
            _ => {
                // An interrupted return still owes the original pose.
                if !heading_overhead && !(was_returning && running) {
                    self.stored = Some(from);
                }
                (self.overhead_pose(&camera), TopDownDirection::ToOverhead)
            }
        };

        self.active = Some(rig.animate_to(from, to, self.duration, Easing::CubicInOut, now));
        self.direction = Some(direction);
        log::info!("top-down transition {direction:?} started");
        direction
    }

    pub fn is_running(&self, rig: &OrbitCameraRig) -> bool {
        self.active.is_some() && self.active == rig.active_animation()
    }

    fn pose_is_overhead(&self, camera: &CameraState, pose: CameraPose) -> bool {
        let mut probe = *camera;
        probe.apply_pose(pose);
        self.is_overhead(&probe)
    }
}

/// The opening move: start overhead and pivot out to the isometric view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntroSequence {
    pub direction: Vec3,
    pub reference_axis: Vec3,
    pub duration: f64,
}

impl IntroSequence {
    pub fn from_config(config: &CameraConfig) -> Self {
        let mut direction = Vec3::from_array(config.isometric_direction).normalize_or_zero();
        if direction == Vec3::ZERO {
            direction = Vec3::new(1.0, 1.0, 1.0).normalize();
        }
        Self {
            direction,
            reference_axis: horizontal_axis(Vec3::from_array(config.top_down_reference_axis)),
            duration: config.intro_duration,
        }
    }

    /// Isometric default pose around the camera's pivot.
    pub fn isometric_pose(&self, camera: &CameraState) -> CameraPose {
        let distance = (camera.position - camera.target).length().max(1.0);
        CameraPose {
            position: camera.target + self.direction * distance,
            orientation: look_rotation(-self.direction, Vec3::Y),
        }
    }

    pub fn start(&self, rig: &mut OrbitCameraRig, now: f64) -> TaskId {
        let camera = *rig.camera();
        let distance = (camera.position - camera.target).length().max(1.0);
        let from = overhead_pose(camera.target, distance, self.reference_axis);
        let to = self.isometric_pose(&camera);
        log::info!("intro pivot started ({:.2}s)", self.duration);
        rig.animate_to(from, to, self.duration, Easing::CubicOut, now)
    }
}

fn overhead_pose(target: Vec3, distance: f32, reference_axis: Vec3) -> CameraPose {
    CameraPose {
        position: target + Vec3::Y * distance,
        orientation: look_rotation(Vec3::NEG_Y, reference_axis),
    }
}

/// Projects an axis onto the ground plane; north (−Z) when nothing is left.
fn horizontal_axis(axis: Vec3) -> Vec3 {
    let flat = Vec3::new(axis.x, 0.0, axis.z).normalize_or_zero();
    if flat == Vec3::ZERO {
        Vec3::NEG_Z
    } else {
        flat
    }
}
