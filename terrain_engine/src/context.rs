//! The owned viewer state. Front ends feed discrete [`InputEvent`]s into
//! [`ViewerContext::handle`] and call [`ViewerContext::tick`] once per frame;
//! both report what changed as [`ViewerEvent`]s.
//!
//! Tick order is fixed: camera animation and damping, mode crossfade, then
//! the pointer pass (hover before marker scaling), so nothing renders a
//! half-updated camera or reads stale hover.

use glam::{Vec2, Vec3};
use serde::Serialize;

use crate::bounds::SceneBounds;
use crate::camera::{CameraState, ScreenRect, look_rotation};
use crate::config::ViewerConfig;
use crate::crossfade::{ModeClass, ModeCrossfadeController};
use crate::framer::CameraFramer;
use crate::markers::{CategoryId, MarkerId, MarkerSet};
use crate::materials::{MaterialSet, TerrainMesh};
use crate::orbit::{OrbitCameraRig, RigMode};
use crate::overlay::{DetailOverlayBridge, HistoryOp, HistoryOverlay, OverlayContent};
use crate::pointer::{ClickOutcome, HoverState, PointerButton, PointerInteractionEngine};
use crate::transform::CoordinateTransformer;
use crate::transitions::{IntroSequence, TopDownDirection, TopDownTransitionController};

const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerMove { position: Vec2 },
    PointerDown { position: Vec2, button: PointerButton },
    PointerUp { position: Vec2, button: PointerButton },
    PointerLeave,
    /// Positive zooms out.
    Wheel { delta: f32 },
    DoubleActivate,
    ToggleMode,
    ToggleCategory(CategoryId),
    SetOverlayRegions(Vec<ScreenRect>),
    Resize { width: f32, height: f32 },
    Back,
    CloseOverlay,
    Refit,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ViewerEvent {
    IntroStarted,
    CameraAnimationFinished,
    TopDownStarted { direction: TopDownDirection },
    CameraRefit,
    HoverChanged {
        category: Option<CategoryId>,
        marker: Option<MarkerId>,
    },
    OverlayOpened {
        marker: MarkerId,
        content: OverlayContent,
    },
    OverlayClosed { by_back: bool },
    History { op: HistoryOp },
    ClickSuppressed { marker: MarkerId },
    ClickMissed,
    DragIgnored,
    ModeToggleStarted { target: f32 },
    ModeToggleIgnored,
    ModeSettled { class: ModeClass },
    CategoryVisibility {
        category: CategoryId,
        visible: bool,
        visible_markers: usize,
    },
    Resized { width: f32, height: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraSnapshot {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub forward: [f32; 3],
    pub up: [f32; 3],
    pub half_height: f32,
}

impl From<&CameraState> for CameraSnapshot {
    fn from(camera: &CameraState) -> Self {
        Self {
            position: camera.position.to_array(),
            target: camera.target.to_array(),
            forward: camera.forward().to_array(),
            up: camera.up().to_array(),
            half_height: camera.frustum_half_height,
        }
    }
}

/// Everything a renderer or test needs from one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSnapshot {
    pub frame: u64,
    pub time: f64,
    pub camera: CameraSnapshot,
    pub rig_mode: RigMode,
    pub mode_value: f32,
    pub mode_class: ModeClass,
    pub background: [f32; 3],
    pub terrain_color: [f32; 3],
    pub structure_color: [f32; 3],
    pub hover: HoverState,
    pub overlay_open: bool,
    pub visible_markers: usize,
    pub marker_size: f32,
    pub events: Vec<ViewerEvent>,
}

#[derive(Debug)]
pub struct ViewerContext {
    config: ViewerConfig,
    transformer: CoordinateTransformer,
    markers: MarkerSet,
    terrain: TerrainMesh,
    materials: MaterialSet,
    rig: OrbitCameraRig,
    framer: CameraFramer,
    top_down: TopDownTransitionController,
    intro: IntroSequence,
    crossfade: ModeCrossfadeController,
    pointer: PointerInteractionEngine,
    overlay: HistoryOverlay,
    viewport: Vec2,
    scene_bounds: Option<SceneBounds>,
    intro_pending: bool,
    frame: u64,
}

impl ViewerContext {
    /// Builds the scene, fits the camera to terrain and markers together and
    /// queues the intro pivot for the first tick.
    pub fn new(
        config: ViewerConfig,
        transformer: CoordinateTransformer,
        terrain: TerrainMesh,
        mut markers: MarkerSet,
    ) -> Self {
        let intro = IntroSequence::from_config(&config.camera);
        let aspect = if config.camera.initial_aspect > 0.0 {
            config.camera.initial_aspect
        } else {
            1.0
        };
        let camera = CameraState {
            position: intro.direction * 10.0,
            orientation: look_rotation(-intro.direction, Vec3::Y),
            frustum_half_height: 10.0,
            target: Vec3::ZERO,
            aspect,
            near: config.camera.near,
            far: config.camera.far,
        };

        let mut materials = MaterialSet::from_config(&config.terrain);
        let crossfade =
            ModeCrossfadeController::from_config(&config.mode, &mut materials, &mut markers);
        let mut context = Self {
            rig: OrbitCameraRig::new(camera, &config.camera),
            framer: CameraFramer::from_config(&config.camera),
            top_down: TopDownTransitionController::from_config(&config.camera),
            intro,
            crossfade,
            pointer: PointerInteractionEngine::new(
                config.markers.clone(),
                config.interaction.clone(),
            ),
            overlay: HistoryOverlay::new(),
            viewport: Vec2::new(DEFAULT_VIEWPORT_HEIGHT * aspect, DEFAULT_VIEWPORT_HEIGHT),
            scene_bounds: SceneBounds::union(terrain.bounds, markers.bounds()),
            intro_pending: true,
            frame: 0,
            config,
            transformer,
            markers,
            terrain,
            materials,
        };
        context.refit();
        context
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn transformer(&self) -> &CoordinateTransformer {
        &self.transformer
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    pub fn terrain(&self) -> &TerrainMesh {
        &self.terrain
    }

    pub fn materials(&self) -> &MaterialSet {
        &self.materials
    }

    pub fn camera(&self) -> &CameraState {
        self.rig.camera()
    }

    pub fn rig(&self) -> &OrbitCameraRig {
        &self.rig
    }

    pub fn crossfade(&self) -> &ModeCrossfadeController {
        &self.crossfade
    }

    pub fn overlay(&self) -> &HistoryOverlay {
        &self.overlay
    }

    pub fn pointer(&self) -> &PointerInteractionEngine {
        &self.pointer
    }

    pub fn top_down(&self) -> &TopDownTransitionController {
        &self.top_down
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn scene_bounds(&self) -> Option<SceneBounds> {
        self.scene_bounds
    }

    /// Drops the queued intro; the camera stays on the fitted pose.
    pub fn skip_intro(&mut self) {
        self.intro_pending = false;
    }

    pub fn tick(&mut self, now: f64) -> FrameSnapshot {
        let mut events = Vec::new();

        if self.intro_pending {
            self.intro_pending = false;
            self.intro.start(&mut self.rig, now);
            events.push(ViewerEvent::IntroStarted);
        }

        if self.rig.tick(now).finished.is_some() {
            events.push(ViewerEvent::CameraAnimationFinished);
        }

        if let Some(frame) = self.crossfade.tick(now, &mut self.materials, &mut self.markers) {
            if frame.settled {
                events.push(ViewerEvent::ModeSettled { class: frame.class });
            }
        }

        if let Some(update) =
            self.pointer
                .tick(now, self.rig.camera(), self.viewport, &mut self.markers)
        {
            events.push(ViewerEvent::HoverChanged {
                category: update.current.category,
                marker: update.current.marker,
            });
        }

        self.frame += 1;
        self.snapshot(now, events)
    }

    pub fn handle(&mut self, event: InputEvent, now: f64) -> Vec<ViewerEvent> {
        let mut events = Vec::new();
        match event {
            InputEvent::PointerMove { position } => {
                if let Some((button, delta)) = self.pointer.pointer_moved(position) {
                    match button {
                        PointerButton::Primary => self.rig.rotate(delta),
                        PointerButton::Secondary => self.rig.pan(delta, self.viewport.y),
                    };
                }
            }
            InputEvent::PointerDown { position, button } => {
                self.pointer.pointer_down(position, button);
            }
            InputEvent::PointerUp { position, button } => {
                let outcome = self.pointer.pointer_up(
                    position,
                    button,
                    now,
                    self.rig.camera(),
                    self.viewport,
                    &self.markers,
                    &mut self.overlay,
                );
                self.click_events(outcome, now, &mut events);
            }
            InputEvent::PointerLeave => self.pointer.pointer_left(),
            InputEvent::Wheel { delta } => {
                self.rig.zoom(delta);
            }
            InputEvent::DoubleActivate => self.start_top_down(now, &mut events),
            InputEvent::ToggleMode => match self.crossfade.toggle(now) {
                Some(target) => events.push(ViewerEvent::ModeToggleStarted { target }),
                None => events.push(ViewerEvent::ModeToggleIgnored),
            },
            InputEvent::ToggleCategory(category) => match self.markers.toggle(category) {
                Some(visible) => {
                    log::info!("category {category:?} visible: {visible}");
                    events.push(ViewerEvent::CategoryVisibility {
                        category,
                        visible,
                        visible_markers: self.markers.visible_len(),
                    });
                }
                None => log::warn!("toggle for unknown category {category:?}"),
            },
            InputEvent::SetOverlayRegions(regions) => self.pointer.set_overlay_regions(regions),
            InputEvent::Resize { width, height } => {
                if width > 0.0 && height > 0.0 {
                    self.viewport = Vec2::new(width, height);
                    self.rig.set_aspect(width / height);
                    events.push(ViewerEvent::Resized { width, height });
                }
            }
            InputEvent::Back => {
                if self.overlay.back(now) {
                    events.push(ViewerEvent::OverlayClosed { by_back: true });
                }
            }
            InputEvent::CloseOverlay => {
                if self.overlay.is_open() {
                    self.overlay.close(now);
                    events.push(ViewerEvent::OverlayClosed { by_back: false });
                }
            }
            InputEvent::Refit => {
                if self.rig.is_interactive() {
                    self.refit();
                    events.push(ViewerEvent::CameraRefit);
                } else {
                    log::warn!("refit ignored while the camera is animating");
                }
            }
        }

        events.extend(
            self.overlay
                .take_ops()
                .into_iter()
                .map(|op| ViewerEvent::History { op }),
        );
        events
    }

    fn click_events(&mut self, outcome: ClickOutcome, now: f64, events: &mut Vec<ViewerEvent>) {
        match outcome {
            ClickOutcome::Opened(marker) => {
                if let Some(content) = self.overlay.content().cloned() {
                    events.push(ViewerEvent::OverlayOpened { marker, content });
                }
            }
            ClickOutcome::Suppressed(marker) => {
                events.push(ViewerEvent::ClickSuppressed { marker });
            }
            ClickOutcome::Drag => events.push(ViewerEvent::DragIgnored),
            ClickOutcome::Miss => events.push(ViewerEvent::ClickMissed),
            ClickOutcome::DoubleClick => self.start_top_down(now, events),
            ClickOutcome::OverlayUi | ClickOutcome::Ignored => {}
        }
    }

    fn start_top_down(&mut self, now: f64, events: &mut Vec<ViewerEvent>) {
        let direction = self.top_down.toggle(&mut self.rig, now);
        events.push(ViewerEvent::TopDownStarted { direction });
    }

    fn refit(&mut self) {
        let Some(bounds) = self.scene_bounds else {
            log::warn!("nothing to frame");
            return;
        };
        self.rig.clear_velocity();
        self.framer.fit(self.rig.camera_mut(), &bounds);
    }

    fn snapshot(&self, now: f64, events: Vec<ViewerEvent>) -> FrameSnapshot {
        FrameSnapshot {
            frame: self.frame,
            time: now,
            camera: CameraSnapshot::from(self.rig.camera()),
            rig_mode: self.rig.mode(),
            mode_value: self.crossfade.value(),
            mode_class: self.crossfade.class(),
            background: self.crossfade.background(),
            terrain_color: self.materials.terrain_color(),
            structure_color: self.materials.structure_color(),
            hover: self.pointer.hover(),
            overlay_open: self.overlay.is_open(),
            visible_markers: self.markers.visible_len(),
            marker_size: self.pointer.base_size(),
            events,
        }
    }
}
