//! Terrain geometry in GPU layout. Colours live in the uniform block rather
//! than in the vertices, so a mode crossfade only rewrites one small buffer
//! per frame; each vertex just records which material it takes.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};
use terrain_engine::{MaterialSet, MeshTriangle, TerrainMesh};

const SURFACE_TERRAIN: f32 = 0.0;
const SURFACE_STRUCTURE: f32 = 1.0;
const SURFACE_UNTEXTURED: f32 = 2.0;

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// 0 for the terrain blend, 1 for the structure colour, 2 untextured.
    pub surface: f32,
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MeshUniforms {
    pub view_projection: [[f32; 4]; 4],
    pub terrain_color: [f32; 4],
    pub structure_color: [f32; 4],
    pub untextured_color: [f32; 4],
    /// Direction towards the light, in scene space.
    pub light_dir: [f32; 4],
}

pub fn mesh_uniforms(view_projection: Mat4, materials: &MaterialSet) -> MeshUniforms {
    let light = Vec3::new(0.35, 1.0, 0.25).normalize();
    MeshUniforms {
        view_projection: view_projection.to_cols_array_2d(),
        terrain_color: rgba(materials.terrain_color()),
        structure_color: rgba(materials.structure_color()),
        untextured_color: rgba(materials.untextured_color()),
        light_dir: light.extend(0.0).to_array(),
    }
}

/// Flattens the terrain into a non-indexed triangle list.
pub fn terrain_vertices(mesh: &TerrainMesh) -> Vec<MeshVertex> {
    let mut vertices = Vec::with_capacity(mesh.triangle_count() * 3);
    push_triangles(&mut vertices, &mesh.terrain, SURFACE_TERRAIN);
    push_triangles(&mut vertices, &mesh.structure_sides, SURFACE_STRUCTURE);
    push_triangles(&mut vertices, &mesh.untextured, SURFACE_UNTEXTURED);
    vertices
}

fn push_triangles(out: &mut Vec<MeshVertex>, triangles: &[MeshTriangle], surface: f32) {
    for triangle in triangles {
        let normal = triangle.normal.to_array();
        for position in triangle.positions {
            out.push(MeshVertex {
                position: position.to_array(),
                normal,
                surface,
            });
        }
    }
}

fn rgba(color: [f32; 3]) -> [f32; 4] {
    [color[0], color[1], color[2], 1.0]
}
