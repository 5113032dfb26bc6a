//! Terrain scene documents. A terrain export is a tree of named nodes, each
//! optionally carrying a triangle soup in survey space: positions are
//! `[easting, northing, elevation]` in survey feet and normals use the same
//! axis order (third component is vertical).

use std::{fs, path::Path};

use anyhow::{Context, Result, bail, ensure};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainNode {
    pub name: String,
    #[serde(default)]
    pub positions: Vec<[f64; 3]>,
    #[serde(default)]
    pub normals: Vec<[f32; 3]>,
    /// Indexed triangles; when absent positions are consumed three at a time.
    #[serde(default)]
    pub indices: Option<Vec<u32>>,
    #[serde(default)]
    pub children: Vec<TerrainNode>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub positions: [[f64; 3]; 3],
    pub normals: [[f32; 3]; 3],
}

impl Triangle {
    /// Mean of the vertex normals, normalised. Falls back to the winding
    /// normal when the per-vertex normals cancel out.
    pub fn averaged_normal(&self) -> [f32; 3] {
        let mut sum = [0.0_f32; 3];
        for normal in &self.normals {
            for axis in 0..3 {
                sum[axis] += normal[axis];
            }
        }
        normalize(sum).unwrap_or_else(|| self.face_normal())
    }

    pub fn face_normal(&self) -> [f32; 3] {
        let [a, b, c] = self.positions;
        let ab = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let ac = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        let cross = [
            (ab[1] * ac[2] - ab[2] * ac[1]) as f32,
            (ab[2] * ac[0] - ab[0] * ac[2]) as f32,
            (ab[0] * ac[1] - ab[1] * ac[0]) as f32,
        ];
        normalize(cross).unwrap_or([0.0, 0.0, 1.0])
    }

    pub fn classify(&self, top_threshold: f32) -> FaceClass {
        if self.averaged_normal()[2] > top_threshold {
            FaceClass::Top
        } else {
            FaceClass::Side
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceClass {
    Top,
    Side,
}

#[derive(Debug, Clone, Default)]
pub struct FaceSplit {
    pub top: Vec<Triangle>,
    pub side: Vec<Triangle>,
}

impl FaceSplit {
    pub fn len(&self) -> usize {
        self.top.len() + self.side.len()
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_empty() && self.side.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurveyBounds {
    pub min: [f64; 3],
    pub max: [f64; 3],
}

impl SurveyBounds {
    fn point(position: [f64; 3]) -> Self {
        Self {
            min: position,
            max: position,
        }
    }

    fn update(&mut self, position: [f64; 3]) {
        for axis in 0..3 {
            self.min[axis] = self.min[axis].min(position[axis]);
            self.max[axis] = self.max[axis].max(position[axis]);
        }
    }
}

impl TerrainNode {
    pub fn load(path: &Path) -> Result<Self> {
        let data =
            fs::read(path).with_context(|| format!("reading terrain model {}", path.display()))?;
        Self::parse(&data).with_context(|| format!("parsing terrain model {}", path.display()))
    }

    pub fn parse(data: &[u8]) -> Result<Self> {
        let node: TerrainNode = serde_json::from_slice(data)?;
        node.validate()?;
        Ok(node)
    }

    /// Checks every node's geometry so later iteration never has to.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.normals.is_empty() || self.normals.len() == self.positions.len(),
            "node '{}' has {} normals for {} positions",
            self.name,
            self.normals.len(),
            self.positions.len()
        );
        match &self.indices {
            Some(indices) => {
                ensure!(
                    indices.len() % 3 == 0,
                    "node '{}' index count {} is not a multiple of 3",
                    self.name,
                    indices.len()
                );
                if let Some(bad) = indices
                    .iter()
                    .find(|index| **index as usize >= self.positions.len())
                {
                    bail!(
                        "node '{}' index {} out of range ({} positions)",
                        self.name,
                        bad,
                        self.positions.len()
                    );
                }
            }
            None => ensure!(
                self.positions.len() % 3 == 0,
                "node '{}' position count {} is not a multiple of 3",
                self.name,
                self.positions.len()
            ),
        }
        for child in &self.children {
            child.validate()?;
        }
        Ok(())
    }

    /// Depth-first lookup of a node by exact name, including `self`.
    pub fn find(&self, name: &str) -> Option<&TerrainNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(name))
    }

    /// Triangles owned directly by this node (children excluded). A triangle
    /// naming a missing position is skipped; parsed documents never have one
    /// because `validate` rejects them.
    pub fn local_triangles(&self) -> Vec<Triangle> {
        let corners: Vec<[usize; 3]> = match &self.indices {
            Some(indices) => indices
                .chunks_exact(3)
                .map(|tri| [tri[0] as usize, tri[1] as usize, tri[2] as usize])
                .collect(),
            None => (0..self.positions.len() / 3)
                .map(|tri| [tri * 3, tri * 3 + 1, tri * 3 + 2])
                .collect(),
        };

        corners
            .into_iter()
            .filter_map(|[a, b, c]| {
                let positions = [
                    *self.positions.get(a)?,
                    *self.positions.get(b)?,
                    *self.positions.get(c)?,
                ];
                let mut triangle = Triangle {
                    positions,
                    normals: [[0.0; 3]; 3],
                };
                match (self.normals.get(a), self.normals.get(b), self.normals.get(c)) {
                    (Some(na), Some(nb), Some(nc)) => triangle.normals = [*na, *nb, *nc],
                    _ => {
                        let face = triangle.face_normal();
                        triangle.normals = [face; 3];
                    }
                }
                Some(triangle)
            })
            .collect()
    }

    /// Triangles of this node and every descendant.
    pub fn triangles(&self) -> Vec<Triangle> {
        let mut out = self.local_triangles();
        for child in &self.children {
            out.extend(child.triangles());
        }
        out
    }

    pub fn classify_faces(&self, top_threshold: f32) -> FaceSplit {
        let mut split = FaceSplit::default();
        for triangle in self.triangles() {
            match triangle.classify(top_threshold) {
                FaceClass::Top => split.top.push(triangle),
                FaceClass::Side => split.side.push(triangle),
            }
        }
        split
    }

    pub fn bounds(&self) -> Option<SurveyBounds> {
        let mut bounds: Option<SurveyBounds> = None;
        self.visit_positions(&mut |position| match bounds.as_mut() {
            Some(existing) => existing.update(position),
            None => bounds = Some(SurveyBounds::point(position)),
        });
        bounds
    }

    pub fn node_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(TerrainNode::node_count)
            .sum::<usize>()
    }

    fn visit_positions(&self, visit: &mut dyn FnMut([f64; 3])) {
        for position in &self.positions {
            visit(*position);
        }
        for child in &self.children {
            child.visit_positions(visit);
        }
    }
}

fn normalize(v: [f32; 3]) -> Option<[f32; 3]> {
    let length = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    if length <= f32::EPSILON || !length.is_finite() {
        return None;
    }
    Some([v[0] / length, v[1] / length, v[2] / length])
}

#[cfg(test)]
mod tests {
    use super::*;

    const TERRAIN_JSON: &str = r#"{
        "name": "site",
        "children": [
            {
                "name": "terrain",
                "positions": [[0,0,0],[10,0,0],[0,10,0]],
                "normals": [[0,0,1],[0,0,1],[0,0,1]]
            },
            {
                "name": "structures",
                "positions": [[0,0,0],[10,0,0],[10,0,10],[0,0,0],[0,10,10],[0,10,0]],
                "indices": [0,1,2,3,4,5]
            }
        ]
    }"#;

    #[test]
    fn finds_named_subtrees() {
        let node = TerrainNode::parse(TERRAIN_JSON.as_bytes()).expect("terrain parses");
        assert_eq!(node.node_count(), 3);
        assert!(node.find("structures").is_some());
        assert!(node.find("site").is_some());
        assert!(node.find("roads").is_none());
    }

    #[test]
    fn classifies_top_and_side_faces_by_vertical_normal() {
        let node = TerrainNode::parse(TERRAIN_JSON.as_bytes()).expect("terrain parses");
        let split = node.classify_faces(0.5);
        assert_eq!(split.top.len(), 1);
        assert_eq!(split.side.len(), 2);

        let structures = node.find("structures").expect("structures node");
        assert_eq!(structures.classify_faces(0.5).top.len(), 0);
    }

    #[test]
    fn missing_normals_fall_back_to_winding() {
        let node = TerrainNode {
            name: "flat".to_string(),
            positions: vec![[0.0, 0.0, 5.0], [1.0, 0.0, 5.0], [0.0, 1.0, 5.0]],
            normals: Vec::new(),
            indices: None,
            children: Vec::new(),
        };
        let triangles = node.triangles();
        assert_eq!(triangles.len(), 1);
        assert_eq!(triangles[0].averaged_normal(), [0.0, 0.0, 1.0]);
        assert_eq!(triangles[0].classify(0.9), FaceClass::Top);
    }

    #[test]
    fn bounds_cover_every_descendant() {
        let node = TerrainNode::parse(TERRAIN_JSON.as_bytes()).expect("terrain parses");
        let bounds = node.bounds().expect("bounds");
        assert_eq!(bounds.min, [0.0, 0.0, 0.0]);
        assert_eq!(bounds.max, [10.0, 10.0, 10.0]);
    }

    #[test]
    fn rejects_out_of_range_indices() {
        let err = TerrainNode::parse(
            br#"{"name":"bad","positions":[[0,0,0],[1,0,0],[0,1,0]],"indices":[0,1,7]}"#,
        )
        .expect_err("index 7 is out of range");
        assert!(err.to_string().contains("out of range"));
    }

    #[test]
    fn rejects_mismatched_normals() {
        let err = TerrainNode::parse(
            br#"{"name":"bad","positions":[[0,0,0],[1,0,0],[0,1,0]],"normals":[[0,0,1]]}"#,
        )
        .expect_err("normal count mismatch");
        assert!(err.to_string().contains("normals"));
    }

    #[test]
    fn unvalidated_nodes_skip_dangling_triangles() {
        let node = TerrainNode {
            name: "built".to_string(),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: Vec::new(),
            indices: Some(vec![0, 1, 2, 0, 1, 7]),
            children: Vec::new(),
        };
        assert!(node.validate().is_err());
        let triangles = node.local_triangles();
        assert_eq!(triangles.len(), 1);
        assert_eq!(triangles[0].positions[2], [0.0, 1.0, 0.0]);
    }
}
