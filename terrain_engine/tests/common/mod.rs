//! On-disk session fixture: a flat site with one building, category "A"
//! (three wells) and category "B" (two trees), origin offset (100, 0, 50),
//! unit scale 0.5.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use tempfile::TempDir;

pub const A_POINTS: [(f64, f64); 3] = [(200.0, 100.0), (260.0, 40.0), (320.0, 160.0)];
pub const B_POINTS: [(f64, f64); 2] = [(140.0, 20.0), (380.0, 80.0)];

pub struct SessionFixture {
    pub dir: TempDir,
    pub manifest: PathBuf,
}

impl SessionFixture {
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

pub fn write_session() -> Result<SessionFixture> {
    let dir = tempfile::tempdir()?;
    let root = dir.path();

    write_terrain(&root.join("site.json"))?;
    fs::write(
        root.join("wells.csv"),
        "well_id,easting,northing,depth\n\
         W-1,200,100,120\n\
         W-2,260,40,80\n\
         W-bad,not-a-number,55,10\n\
         W-3,320,160,95\n",
    )?;
    fs::write(
        root.join("trees.csv"),
        "x,y,species\n140,20,oak\n380,80,elm\n",
    )?;
    fs::write(
        root.join("viewer.json"),
        r#"{
            "transform": { "unit_scale": 0.5, "origin_offset": [100.0, 0.0, 50.0], "marker_elevation": 2.0 },
            "categories": [
                { "name": "A", "color": [0.2, 0.4, 0.9] },
                { "name": "B", "color": [0.1, 0.7, 0.2] }
            ]
        }"#,
    )?;
    let manifest = root.join("session.json");
    fs::write(
        &manifest,
        r#"{
            "terrain": "site.json",
            "config": "viewer.json",
            "datasets": [
                { "category": "A", "path": "wells.csv", "x_column": "easting", "y_column": "northing", "key_column": "well_id" },
                { "category": "B", "path": "trees.csv" }
            ]
        }"#,
    )?;

    Ok(SessionFixture { dir, manifest })
}

/// Ground quad over the data extent plus one wall and roof.
fn write_terrain(path: &Path) -> Result<()> {
    fs::write(
        path,
        r#"{
            "name": "site",
            "children": [
                {
                    "name": "terrain",
                    "positions": [[100,0,0],[420,0,0],[420,200,0],[100,200,0]],
                    "normals": [[0,0,1],[0,0,1],[0,0,1],[0,0,1]],
                    "indices": [0,1,2,0,2,3]
                },
                {
                    "name": "structures",
                    "positions": [
                        [150,150,0],[170,150,0],[170,150,10],
                        [150,150,10],[170,150,10],[150,170,10]
                    ],
                    "normals": [
                        [0,-1,0],[0,-1,0],[0,-1,0],
                        [0,0,1],[0,0,1],[0,0,1]
                    ]
                }
            ]
        }"#,
    )?;
    Ok(())
}

pub fn approx(expected: f32, actual: f32, tolerance: f32) -> bool {
    (expected - actual).abs() <= tolerance
}
