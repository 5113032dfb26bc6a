pub mod points;
pub mod terrain;

pub use points::{PointColumns, PointRow, PointTable, SkippedRow};
pub use terrain::{FaceClass, FaceSplit, SurveyBounds, TerrainNode, Triangle};
