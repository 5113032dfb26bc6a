//! Backend-neutral material state for the terrain model and the scene-space
//! triangles each material applies to.

use glam::Vec3;
use terrain_formats::{FaceClass, TerrainNode, Triangle};

use crate::bounds::SceneBounds;
use crate::config::TerrainConfig;
use crate::transform::CoordinateTransformer;

/// Ground surface crossfading between its light and dark textures. The
/// renderer samples both and mixes by `blend_factor`.
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainMaterial {
    pub light: [f32; 3],
    pub dark: [f32; 3],
    blend: f32,
}

impl TerrainMaterial {
    pub fn new(light: [f32; 3], dark: [f32; 3]) -> Self {
        Self {
            light,
            dark,
            blend: 0.0,
        }
    }

    pub fn blend(&mut self, t: f32) {
        self.blend = t.clamp(0.0, 1.0);
    }

    pub fn blend_factor(&self) -> f32 {
        self.blend
    }

    /// Flat colour standing in for the mixed textures.
    pub fn color(&self) -> [f32; 3] {
        lerp_color(self.light, self.dark, self.blend)
    }
}

/// Building walls: a plain colour lerp between two endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureMaterial {
    pub light: [f32; 3],
    pub dark: [f32; 3],
    color: [f32; 3],
}

impl StructureMaterial {
    pub fn new(light: [f32; 3], dark: [f32; 3]) -> Self {
        Self {
            light,
            dark,
            color: light,
        }
    }

    pub fn blend(&mut self, t: f32) {
        self.color = lerp_color(self.light, self.dark, t.clamp(0.0, 1.0));
    }

    pub fn color(&self) -> [f32; 3] {
        self.color
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialSet {
    pub terrain: Vec<TerrainMaterial>,
    pub structures: Vec<StructureMaterial>,
    /// Faces outside both named subtrees; the mode never touches it.
    pub untextured: [f32; 3],
    blend: f32,
}

impl MaterialSet {
    pub fn from_config(config: &TerrainConfig) -> Self {
        Self {
            terrain: vec![TerrainMaterial::new(config.ground_light, config.ground_dark)],
            structures: vec![StructureMaterial::new(
                config.structure_light,
                config.structure_dark,
            )],
            untextured: config.untextured_color,
            blend: 0.0,
        }
    }

    /// Writes one scalar to every material.
    pub fn blend(&mut self, t: f32) {
        let t = t.clamp(0.0, 1.0);
        self.blend = t;
        for material in &mut self.terrain {
            material.blend(t);
        }
        for material in &mut self.structures {
            material.blend(t);
        }
    }

    pub fn blend_factor(&self) -> f32 {
        self.blend
    }

    pub fn terrain_color(&self) -> [f32; 3] {
        self.terrain
            .first()
            .map(TerrainMaterial::color)
            .unwrap_or([0.5; 3])
    }

    pub fn structure_color(&self) -> [f32; 3] {
        self.structures
            .first()
            .map(StructureMaterial::color)
            .unwrap_or([0.5; 3])
    }

    pub fn untextured_color(&self) -> [f32; 3] {
        self.untextured
    }
}

/// Exact at both endpoints.
pub fn lerp_color(from: [f32; 3], to: [f32; 3], t: f32) -> [f32; 3] {
    let s = 1.0 - t;
    [
        from[0] * s + to[0] * t,
        from[1] * s + to[1] * t,
        from[2] * s + to[2] * t,
    ]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshTriangle {
    pub positions: [Vec3; 3],
    /// Averaged face normal in scene space.
    pub normal: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    /// Drawn with the terrain material blend.
    Terrain,
    /// Side faces inside the structure subtree, drawn with the structure lerp.
    StructureSide,
    /// Outside both subtrees; keeps the fixed untextured colour.
    Untextured,
}

/// Which named subtrees a node sits under.
#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    terrain: bool,
    structure: bool,
}

/// Node names resolved against one model.
struct Subtrees<'a> {
    /// `None` when no terrain node resolved, in which case every face is
    /// terrain.
    terrain: Option<&'a str>,
    structure: Option<&'a str>,
    threshold: f32,
}

/// The terrain model in scene space, split by material.
#[derive(Debug, Clone, Default)]
pub struct TerrainMesh {
    pub terrain: Vec<MeshTriangle>,
    pub structure_sides: Vec<MeshTriangle>,
    pub untextured: Vec<MeshTriangle>,
    pub top_faces: usize,
    pub bounds: Option<SceneBounds>,
}

impl TerrainMesh {
    /// Classifies faces and moves them into scene space. Faces under the
    /// terrain node take the terrain blend. Side faces under the structure
    /// node take the structure material and its top faces keep the terrain
    /// blend. Anything else stays untextured.
    pub fn build(
        root: &TerrainNode,
        config: &TerrainConfig,
        transformer: &CoordinateTransformer,
    ) -> Self {
        let terrain = config.terrain_node.as_deref().filter(|name| {
            let found = root.find(name).is_some();
            if !found {
                log::warn!("terrain node '{name}' not found; blending every face");
            }
            found
        });
        let structure = config.structure_node.as_deref();
        if let Some(name) = structure {
            if root.find(name).is_none() {
                log::warn!("structure node '{name}' not found; no faces take the structure colour");
            }
        }

        let subtrees = Subtrees {
            terrain,
            structure,
            threshold: config.top_face_threshold,
        };
        let mut mesh = TerrainMesh::default();
        mesh.collect(root, &subtrees, Scope::default(), transformer);
        mesh.bounds = root
            .bounds()
            .map(|bounds| transformer.bounds_to_scene(&bounds));
        log::info!(
            "terrain mesh: {} blended faces ({} top), {} structure sides, {} untextured",
            mesh.terrain.len(),
            mesh.top_faces,
            mesh.structure_sides.len(),
            mesh.untextured.len()
        );
        mesh
    }

    fn collect(
        &mut self,
        node: &TerrainNode,
        subtrees: &Subtrees<'_>,
        scope: Scope,
        transformer: &CoordinateTransformer,
    ) {
        let name = Some(node.name.as_str());
        let scope = Scope {
            terrain: scope.terrain || subtrees.terrain.is_none() || subtrees.terrain == name,
            structure: scope.structure || subtrees.structure == name,
        };
        for triangle in node.local_triangles() {
            let class = triangle.classify(subtrees.threshold);
            let mesh_triangle = to_scene(&triangle, transformer);
            if class == FaceClass::Top {
                self.top_faces += 1;
            }
            match surface_kind(class, scope) {
                SurfaceKind::Terrain => self.terrain.push(mesh_triangle),
                SurfaceKind::StructureSide => self.structure_sides.push(mesh_triangle),
                SurfaceKind::Untextured => self.untextured.push(mesh_triangle),
            }
        }
        for child in &node.children {
            self.collect(child, subtrees, scope, transformer);
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.terrain.len() + self.structure_sides.len() + self.untextured.len()
    }
}

fn surface_kind(class: FaceClass, scope: Scope) -> SurfaceKind {
    match (class, scope.structure, scope.terrain) {
        (FaceClass::Side, true, _) => SurfaceKind::StructureSide,
        (FaceClass::Top, true, _) | (_, false, true) => SurfaceKind::Terrain,
        (_, false, false) => SurfaceKind::Untextured,
    }
}

fn to_scene(triangle: &Triangle, transformer: &CoordinateTransformer) -> MeshTriangle {
    MeshTriangle {
        positions: triangle
            .positions
            .map(|position| transformer.vertex_to_scene(position)),
        normal: transformer.normal_to_scene(triangle.averaged_normal()),
    }
}
