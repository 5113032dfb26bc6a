//! Ray picking against point markers. Each visible marker is a sphere whose
//! radius follows its drawn size.
//!
//! Ordering: the closest hit along the ray wins; equal distances go to the
//! lower `MarkerId`, so a pick is reproducible for a given scene and ray.

use glam::Vec3;

use crate::camera::Ray;
use crate::markers::{MarkerId, MarkerSet};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub marker: MarkerId,
    pub distance: f32,
    pub point: Vec3,
}

/// `base_radius` is the world radius of a marker at scale 1.
pub fn pick_marker(markers: &MarkerSet, ray: &Ray, base_radius: f32) -> Option<PickHit> {
    if base_radius <= 0.0 {
        return None;
    }
    let mut best: Option<(f32, MarkerId)> = None;
    for (id, record) in markers.visible_markers() {
        let scale = markers.scale(id).unwrap_or(1.0);
        let Some(distance) = ray.intersect_sphere(record.position, base_radius * scale) else {
            continue;
        };
        best = match best {
            Some((best_distance, best_id))
                if best_distance < distance || (best_distance == distance && best_id < id) =>
            {
                Some((best_distance, best_id))
            }
            _ => Some((distance, id)),
        };
    }
    let (distance, marker) = best?;
    Some(PickHit {
        marker,
        distance,
        point: ray.at(distance),
    })
}
