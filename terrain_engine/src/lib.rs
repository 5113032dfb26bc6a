//! Geometry, camera and interaction core of the terrain viewer. Everything in
//! here is driven by an explicit `ViewerContext`: discrete input events go in
//! through `ViewerContext::handle`, one `ViewerContext::tick` runs per
//! displayed frame, and the renderer reads the resulting `FrameSnapshot`.

pub mod animation;
pub mod bounds;
pub mod camera;
pub mod config;
pub mod context;
pub mod crossfade;
pub mod error;
pub mod framer;
pub mod markers;
pub mod materials;
pub mod orbit;
pub mod overlay;
pub mod picking;
pub mod pointer;
pub mod session;
pub mod transform;
pub mod transitions;

pub use animation::{AnimationSlot, AnimationStep, Easing, Interpolate, TaskId};
pub use bounds::SceneBounds;
pub use camera::{CameraPose, CameraState, Ray, ScreenRect};
pub use config::{CategoryDef, ViewerConfig, load_viewer_config};
pub use context::{CameraSnapshot, FrameSnapshot, InputEvent, ViewerContext, ViewerEvent};
pub use crossfade::{ModeClass, ModeCrossfadeController, ModeFrame};
pub use error::LoadError;
pub use framer::CameraFramer;
pub use markers::{CategoryId, MarkerGroup, MarkerId, MarkerSet, PointRecord};
pub use materials::{MaterialSet, MeshTriangle, StructureMaterial, TerrainMaterial, TerrainMesh};
pub use orbit::{OrbitCameraRig, RigMode};
pub use picking::{PickHit, pick_marker};
pub use overlay::{DetailOverlayBridge, HistoryOp, HistoryOverlay, OverlayContent};
pub use pointer::{ClickOutcome, HoverState, HoverUpdate, PointerButton, PointerInteractionEngine};
pub use session::{DatasetEntry, LoadPhase, LoadProgress, SessionManifest, load_session};
pub use transform::{CoordinateTransformer, OriginOffset, SurveyPoint};
pub use transitions::{IntroSequence, TopDownDirection, TopDownTransitionController};
