//! Session loading: a manifest names the terrain model, the point datasets
//! and their categories, and optionally a config file. Paths are relative to
//! the manifest. Any file that cannot be read aborts the load; malformed rows
//! inside a readable dataset are skipped.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use terrain_formats::{PointColumns, PointTable, TerrainNode};

use crate::config::{ViewerConfig, load_viewer_config};
use crate::context::ViewerContext;
use crate::error::LoadError;
use crate::markers::{MarkerGroup, MarkerSet};
use crate::materials::TerrainMesh;
use crate::transform::CoordinateTransformer;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionManifest {
    pub terrain: PathBuf,
    #[serde(default)]
    pub datasets: Vec<DatasetEntry>,
    #[serde(default)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// Must name a configured category.
    pub category: String,
    pub path: PathBuf,
    #[serde(default)]
    pub x_column: Option<String>,
    #[serde(default)]
    pub y_column: Option<String>,
    #[serde(default)]
    pub key_column: Option<String>,
}

impl DatasetEntry {
    fn columns(&self) -> PointColumns {
        let defaults = PointColumns::default();
        PointColumns {
            x: self.x_column.clone().unwrap_or(defaults.x),
            y: self.y_column.clone().unwrap_or(defaults.y),
            key: self.key_column.clone(),
        }
    }
}

impl SessionManifest {
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let data = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_slice(&data).map_err(|source| LoadError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum LoadPhase {
    Pending,
    Loading { completed: usize, total: usize },
    Ready,
    Failed { message: String },
}

/// Observable load state. A failed load stays visible as `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadProgress {
    phase: LoadPhase,
    skipped_rows: usize,
}

impl Default for LoadProgress {
    fn default() -> Self {
        Self {
            phase: LoadPhase::Pending,
            skipped_rows: 0,
        }
    }
}

impl LoadProgress {
    pub fn phase(&self) -> &LoadPhase {
        &self.phase
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.phase, LoadPhase::Failed { .. })
    }

    fn begin(&mut self, total: usize) {
        self.phase = LoadPhase::Loading {
            completed: 0,
            total,
        };
        self.skipped_rows = 0;
    }

    fn step(&mut self) {
        if let LoadPhase::Loading { completed, total } = &mut self.phase {
            *completed = (*completed + 1).min(*total);
        }
    }

    fn fail(&mut self, err: &LoadError) {
        log::error!("session load failed: {err}");
        self.phase = LoadPhase::Failed {
            message: err.to_string(),
        };
    }
}

impl fmt::Display for LoadProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.phase {
            LoadPhase::Pending => write!(f, "pending"),
            LoadPhase::Loading { completed, total } => write!(f, "loading {completed}/{total}"),
            LoadPhase::Ready => write!(f, "ready ({} rows skipped)", self.skipped_rows),
            LoadPhase::Failed { message } => write!(f, "failed: {message}"),
        }
    }
}

/// Loads everything a manifest names. `config` overrides the manifest's own
/// config file. Returns no context at all when anything fatal happens.
pub fn load_session(
    manifest_path: &Path,
    config: Option<ViewerConfig>,
    progress: &mut LoadProgress,
) -> Result<ViewerContext, LoadError> {
    let result = load_inner(manifest_path, config, progress);
    match &result {
        Ok(_) => progress.phase = LoadPhase::Ready,
        Err(err) => progress.fail(err),
    }
    result
}

fn load_inner(
    manifest_path: &Path,
    config: Option<ViewerConfig>,
    progress: &mut LoadProgress,
) -> Result<ViewerContext, LoadError> {
    let manifest = SessionManifest::load(manifest_path)?;
    let base = manifest_path.parent().unwrap_or_else(|| Path::new(""));
    progress.begin(manifest.datasets.len() + 1);

    let config = match (config, &manifest.config) {
        (Some(config), _) => config,
        (None, Some(path)) => load_viewer_config(&base.join(path))?,
        (None, None) => ViewerConfig::default(),
    };
    let transformer = CoordinateTransformer::from_config(&config.transform);

    let terrain_path = base.join(&manifest.terrain);
    let root = TerrainNode::load(&terrain_path).map_err(|err| LoadError::Terrain {
        path: terrain_path.clone(),
        message: format!("{err:#}"),
    })?;
    let terrain = TerrainMesh::build(&root, &config.terrain, &transformer);
    if terrain.triangle_count() == 0 {
        return Err(LoadError::EmptyTerrain { path: terrain_path });
    }
    progress.step();

    let mut markers = MarkerSet::with_categories(config.categories.len());
    for entry in &manifest.datasets {
        let path = base.join(&entry.path);
        let category =
            config
                .category_id(&entry.category)
                .ok_or_else(|| LoadError::UnknownCategory {
                    path: path.clone(),
                    category: entry.category.clone(),
                })?;
        let table =
            PointTable::open(&path, &entry.columns()).map_err(|err| LoadError::Dataset {
                path: path.clone(),
                message: format!("{err:#}"),
            })?;
        if !table.skipped.is_empty() {
            log::warn!(
                "{}: skipped {} malformed rows",
                path.display(),
                table.skipped.len()
            );
        }
        progress.skipped_rows += table.skipped.len();
        log::info!(
            "{}: {} markers for '{}'",
            path.display(),
            table.len(),
            entry.category
        );
        markers.insert_group(MarkerGroup::from_table(category, &table, &transformer));
        progress.step();
    }

    log::info!(
        "session ready: {} triangles, {} markers in {} categories",
        terrain.triangle_count(),
        markers.len(),
        config.categories.len()
    );
    Ok(ViewerContext::new(config, transformer, terrain, markers))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_defaults_optional_fields() {
        let manifest: SessionManifest = serde_json::from_str(
            r#"{"terrain":"site.json","datasets":[{"category":"wells","path":"wells.csv"}]}"#,
        )
        .expect("manifest parses");
        assert_eq!(manifest.config, None);
        let columns = manifest.datasets[0].columns();
        assert_eq!(columns, PointColumns::default());
    }

    #[test]
    fn progress_reports_failure_without_a_context() {
        let mut progress = LoadProgress::default();
        let result = load_session(
            Path::new("/definitely/not/here/session.json"),
            None,
            &mut progress,
        );
        assert!(matches!(result, Err(LoadError::Io { .. })));
        assert!(progress.is_failed());
        assert!(progress.to_string().starts_with("failed:"));
    }
}
