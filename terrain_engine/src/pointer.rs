//! Pointer-driven hover, highlight and click handling.
//!
//! Every tick resolves hover first (ray from the pointer, nearest visible
//! marker, group dimming) and only then animates marker scales, so the
//! scaling pass always sees this frame's hover. Clicks are classified on
//! release: travel beyond the drag threshold is a drag and never picks.

use std::collections::BTreeSet;

use glam::Vec2;
use serde::Serialize;

use crate::camera::{CameraState, ScreenRect};
use crate::config::{InteractionConfig, MarkerConfig};
use crate::markers::{CategoryId, MarkerId, MarkerSet, PointRecord};
use crate::overlay::{DetailOverlayBridge, OverlayContent};
use crate::picking::{PickHit, pick_marker};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HoverState {
    pub category: Option<CategoryId>,
    pub marker: Option<MarkerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoverUpdate {
    pub previous: HoverState,
    pub current: HoverState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "marker", rename_all = "snake_case")]
pub enum ClickOutcome {
    /// No matching press, or a non-primary click.
    Ignored,
    Drag,
    /// Released over an overlay region.
    OverlayUi,
    Miss,
    Opened(MarkerId),
    /// Hit a marker while the overlay was open or had just closed.
    Suppressed(MarkerId),
    DoubleClick,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    origin: Vec2,
    last: Vec2,
    button: PointerButton,
}

#[derive(Debug, Clone)]
pub struct PointerInteractionEngine {
    markers: MarkerConfig,
    interaction: InteractionConfig,
    pointer: Option<Vec2>,
    overlay_regions: Vec<ScreenRect>,
    hover: HoverState,
    animating: BTreeSet<MarkerId>,
    press: Option<Press>,
    last_click: Option<(f64, Vec2)>,
    base_size: f32,
    last_tick: Option<f64>,
}

impl PointerInteractionEngine {
    pub fn new(markers: MarkerConfig, interaction: InteractionConfig) -> Self {
        Self {
            markers,
            interaction,
            pointer: None,
            overlay_regions: Vec::new(),
            hover: HoverState::default(),
            animating: BTreeSet::new(),
            press: None,
            last_click: None,
            base_size: 0.0,
            last_tick: None,
        }
    }

    pub fn hover(&self) -> HoverState {
        self.hover
    }

    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// World radius of an unhovered marker this frame.
    pub fn base_size(&self) -> f32 {
        self.base_size
    }

    pub fn animating_count(&self) -> usize {
        self.animating.len()
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn set_overlay_regions(&mut self, regions: Vec<ScreenRect>) {
        self.overlay_regions = regions;
    }

    pub fn over_overlay(&self, position: Vec2) -> bool {
        self.overlay_regions
            .iter()
            .any(|region| region.contains(position))
    }

    /// Tracks the pointer and reports drag motion since the last move.
    pub fn pointer_moved(&mut self, position: Vec2) -> Option<(PointerButton, Vec2)> {
        self.pointer = Some(position);
        let press = self.press.as_mut()?;
        let delta = position - press.last;
        press.last = position;
        Some((press.button, delta))
    }

    pub fn pointer_left(&mut self) {
        self.pointer = None;
        self.press = None;
    }

    pub fn pointer_down(&mut self, position: Vec2, button: PointerButton) {
        self.pointer = Some(position);
        self.press = Some(Press {
            origin: position,
            last: position,
            button,
        });
    }

    #[allow(clippy::too_many_arguments)]
    pub fn pointer_up(
        &mut self,
        position: Vec2,
        button: PointerButton,
        now: f64,
        camera: &CameraState,
        viewport: Vec2,
        markers: &MarkerSet,
        overlay: &mut dyn DetailOverlayBridge,
    ) -> ClickOutcome {
        self.pointer = Some(position);
        let Some(press) = self.press.take() else {
            return ClickOutcome::Ignored;
        };
        if press.button != button {
            return ClickOutcome::Ignored;
        }
        if (position - press.origin).length_squared() > self.interaction.drag_threshold_sq() {
            self.last_click = None;
            log::debug!("release after drag ignored");
            return ClickOutcome::Drag;
        }
        if self.over_overlay(position) {
            return ClickOutcome::OverlayUi;
        }
        if button != PointerButton::Primary {
            return ClickOutcome::Ignored;
        }

        if let Some((at, origin)) = self.last_click.take() {
            let quick = now - at <= self.interaction.double_click_window;
            let still =
                (position - origin).length_squared() <= self.interaction.drag_threshold_sq();
            if quick && still {
                return ClickOutcome::DoubleClick;
            }
        }
        self.last_click = Some((now, position));

        let Some(hit) = self.pick(position, camera, viewport, markers) else {
            return ClickOutcome::Miss;
        };
        if overlay.is_open() || overlay.just_closed(now, self.interaction.close_debounce) {
            log::debug!("click on {:?} suppressed by overlay state", hit.marker);
            return ClickOutcome::Suppressed(hit.marker);
        }
        let Some(record) = markers.record(hit.marker) else {
            return ClickOutcome::Miss;
        };
        overlay.open(overlay_content(record), now);
        ClickOutcome::Opened(hit.marker)
    }

    /// Hover pass followed by the scale pass.
    pub fn tick(
        &mut self,
        now: f64,
        camera: &CameraState,
        viewport: Vec2,
        markers: &mut MarkerSet,
    ) -> Option<HoverUpdate> {
        let dt = self
            .last_tick
            .map(|last| (now - last).max(0.0) as f32)
            .unwrap_or(0.0);
        self.last_tick = Some(now);
        self.base_size = camera.frustum_half_height * self.markers.size_factor;

        let update = self.resolve_hover(camera, viewport, markers);
        self.animate_scales(dt, markers);
        update
    }

    fn resolve_hover(
        &mut self,
        camera: &CameraState,
        viewport: Vec2,
        markers: &mut MarkerSet,
    ) -> Option<HoverUpdate> {
        let hit = self
            .pointer
            .filter(|position| !self.over_overlay(*position))
            .and_then(|position| self.pick(position, camera, viewport, markers));
        let current = HoverState {
            category: hit.map(|hit| hit.marker.category),
            marker: hit.map(|hit| hit.marker),
        };
        let previous = self.hover;
        if current == previous {
            return None;
        }

        if current.category != previous.category {
            apply_dimming(markers, current.category, self.markers.dimmed_opacity);
        }
        if current.marker != previous.marker {
            self.animating.extend(previous.marker);
            self.animating.extend(current.marker);
            log::debug!("hover {:?} -> {:?}", previous.marker, current.marker);
        }
        self.hover = current;
        Some(HoverUpdate { previous, current })
    }

    fn animate_scales(&mut self, dt: f32, markers: &mut MarkerSet) {
        let keep = (-self.markers.scale_rate * dt).exp();
        let hovered = self.hover.marker;
        let hover_scale = self.markers.hover_scale;
        let epsilon = self.markers.scale_epsilon;

        self.animating.retain(|id| {
            let target = if Some(*id) == hovered { hover_scale } else { 1.0 };
            let current = markers.scale(*id).unwrap_or(target);
            let next = target + (current - target) * keep;
            if (next - target).abs() <= epsilon {
                markers.set_scale(*id, target);
                false
            } else {
                markers.set_scale(*id, next);
                true
            }
        });
    }

    fn pick(
        &self,
        position: Vec2,
        camera: &CameraState,
        viewport: Vec2,
        markers: &MarkerSet,
    ) -> Option<PickHit> {
        let ray = camera.ray_through(position, viewport)?;
        let radius = camera.frustum_half_height
            * self.markers.size_factor
            * self.markers.pick_radius_factor;
        pick_marker(markers, &ray, radius)
    }
}

/// Either every group at full opacity, or only the hovered category.
fn apply_dimming(markers: &mut MarkerSet, hovered: Option<CategoryId>, dimmed: f32) {
    for group in markers.groups_mut() {
        let opacity = match hovered {
            Some(category) if category != group.category() => dimmed,
            _ => 1.0,
        };
        group.set_opacity(opacity);
    }
}

fn overlay_content(record: &PointRecord) -> OverlayContent {
    match &record.key {
        Some(key) => OverlayContent::Key {
            category: record.category,
            key: key.clone(),
        },
        None => OverlayContent::Explicit {
            body: record
                .fields
                .iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(name, value)| format!("{name}: {value}"))
                .collect::<Vec<_>>()
                .join("\n"),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::look_rotation;
    use crate::markers::{MarkerGroup, PointRecord};
    use crate::overlay::HistoryOverlay;
    use glam::Vec3;

    const VIEWPORT: Vec2 = Vec2::new(100.0, 100.0);

    /// Records calls without any history semantics.
    #[derive(Default)]
    struct CountingOverlay {
        opened: Vec<OverlayContent>,
        open: bool,
        closed_at: Option<f64>,
    }

    impl DetailOverlayBridge for CountingOverlay {
        fn open(&mut self, content: OverlayContent, _now: f64) {
            self.opened.push(content);
            self.open = true;
        }

        fn close(&mut self, now: f64) {
            self.open = false;
            self.closed_at = Some(now);
        }

        fn is_open(&self) -> bool {
            self.open
        }

        fn just_closed(&self, now: f64, within: f64) -> bool {
            self.closed_at.is_some_and(|at| now - at <= within)
        }
    }

    fn camera() -> CameraState {
        CameraState {
            position: Vec3::new(0.0, 100.0, 0.0),
            orientation: look_rotation(Vec3::NEG_Y, Vec3::NEG_Z),
            frustum_half_height: 10.0,
            target: Vec3::ZERO,
            aspect: 1.0,
            near: 0.1,
            far: 500.0,
        }
    }

    fn record(x: f32, key: Option<&str>) -> PointRecord {
        PointRecord {
            position: Vec3::new(x, 0.0, 0.0),
            category: CategoryId(0),
            key: key.map(str::to_string),
            fields: vec![("name".to_string(), format!("marker at {x}"))],
        }
    }

    /// Category 0 at pixels (50,50) and (75,50); category 1 at (25,50).
    fn markers() -> MarkerSet {
        let mut set = MarkerSet::with_categories(2);
        let mut a = MarkerGroup::new(CategoryId(0));
        a.push(record(0.0, Some("a-0")));
        a.push(record(5.0, None));
        let mut b = MarkerGroup::new(CategoryId(1));
        b.push(record(-5.0, Some("b-0")));
        set.insert_group(a);
        set.insert_group(b);
        set
    }

    fn engine() -> PointerInteractionEngine {
        PointerInteractionEngine::new(MarkerConfig::default(), InteractionConfig::default())
    }

    fn id(category: u16, index: u32) -> MarkerId {
        MarkerId {
            category: CategoryId(category),
            index,
        }
    }

    fn click(
        engine: &mut PointerInteractionEngine,
        markers: &MarkerSet,
        overlay: &mut dyn DetailOverlayBridge,
        from: Vec2,
        to: Vec2,
        now: f64,
    ) -> ClickOutcome {
        engine.pointer_down(from, PointerButton::Primary);
        engine.pointer_moved(to);
        engine.pointer_up(
            to,
            PointerButton::Primary,
            now,
            &camera(),
            VIEWPORT,
            markers,
            overlay,
        )
    }

    fn assert_dimming_rule(markers: &MarkerSet, dimmed: f32) {
        let full = markers
            .groups()
            .iter()
            .filter(|group| group.opacity() == 1.0)
            .count();
        let dim = markers
            .groups()
            .iter()
            .filter(|group| group.opacity() == dimmed)
            .count();
        let total = markers.groups().len();
        assert!(
            full == total || (full == 1 && dim == total - 1),
            "{full} full / {dim} dimmed of {total}"
        );
    }

    #[test]
    fn short_click_on_a_marker_opens_once() {
        let markers = markers();
        let mut engine = engine();
        let mut overlay = CountingOverlay::default();
        let outcome = click(
            &mut engine,
            &markers,
            &mut overlay,
            Vec2::new(47.0, 49.0),
            Vec2::new(50.5, 50.5),
            1.0,
        );
        assert_eq!(outcome, ClickOutcome::Opened(id(0, 0)));
        assert_eq!(
            overlay.opened,
            vec![OverlayContent::Key {
                category: CategoryId(0),
                key: "a-0".to_string()
            }]
        );
    }

    #[test]
    fn drag_beyond_threshold_never_opens() {
        let markers = markers();
        let mut engine = engine();
        let mut overlay = CountingOverlay::default();
        let outcome = click(
            &mut engine,
            &markers,
            &mut overlay,
            Vec2::new(44.0, 50.0),
            Vec2::new(50.0, 50.0),
            1.0,
        );
        assert_eq!(outcome, ClickOutcome::Drag);
        assert!(overlay.opened.is_empty());
    }

    #[test]
    fn release_on_overlay_ui_never_opens() {
        let markers = markers();
        let mut engine = engine();
        engine.set_overlay_regions(vec![ScreenRect {
            x: 40.0,
            y: 40.0,
            width: 20.0,
            height: 20.0,
        }]);
        let mut overlay = CountingOverlay::default();
        let outcome = click(
            &mut engine,
            &markers,
            &mut overlay,
            Vec2::new(50.0, 50.0),
            Vec2::new(50.0, 50.0),
            1.0,
        );
        assert_eq!(outcome, ClickOutcome::OverlayUi);
        assert!(overlay.opened.is_empty());
    }

    #[test]
    fn open_or_recently_closed_overlay_suppresses_clicks() {
        let markers = markers();
        let mut engine = engine();
        let mut overlay = HistoryOverlay::new();
        let at = Vec2::new(75.0, 50.0);

        assert_eq!(
            click(&mut engine, &markers, &mut overlay, at, at, 0.0),
            ClickOutcome::Opened(id(0, 1))
        );
        assert_eq!(
            overlay.content(),
            Some(&OverlayContent::Explicit {
                body: "name: marker at 5".to_string()
            })
        );
        assert_eq!(
            click(&mut engine, &markers, &mut overlay, at, at, 1.0),
            ClickOutcome::Suppressed(id(0, 1))
        );

        overlay.close(2.0);
        assert_eq!(
            click(&mut engine, &markers, &mut overlay, at, at, 2.1),
            ClickOutcome::Suppressed(id(0, 1))
        );
        assert_eq!(
            click(&mut engine, &markers, &mut overlay, at, at, 3.0),
            ClickOutcome::Opened(id(0, 1))
        );
    }

    #[test]
    fn two_quick_clicks_make_a_double_click() {
        let markers = markers();
        let mut engine = engine();
        let mut overlay = CountingOverlay::default();
        let empty = Vec2::new(10.0, 90.0);
        assert_eq!(
            click(&mut engine, &markers, &mut overlay, empty, empty, 1.0),
            ClickOutcome::Miss
        );
        assert_eq!(
            click(&mut engine, &markers, &mut overlay, empty, empty, 1.2),
            ClickOutcome::DoubleClick
        );
        assert_eq!(
            click(&mut engine, &markers, &mut overlay, empty, empty, 1.3),
            ClickOutcome::Miss,
            "a third click starts a new pair"
        );
        assert_eq!(
            click(&mut engine, &markers, &mut overlay, empty, empty, 2.0),
            ClickOutcome::Miss,
            "too slow"
        );
    }

    #[test]
    fn hover_dims_other_categories_and_restores_on_exit() {
        let mut markers = markers();
        let mut engine = engine();
        let dimmed = MarkerConfig::default().dimmed_opacity;
        let camera = camera();

        let path = [
            Some(Vec2::new(50.0, 50.0)),
            Some(Vec2::new(75.0, 50.0)),
            Some(Vec2::new(25.0, 50.0)),
            Some(Vec2::new(10.0, 10.0)),
            Some(Vec2::new(25.0, 50.0)),
            None,
        ];
        for (frame, position) in path.into_iter().enumerate() {
            match position {
                Some(position) => {
                    engine.pointer_moved(position);
                }
                None => engine.pointer_left(),
            }
            engine.tick(frame as f64 / 60.0, &camera, VIEWPORT, &mut markers);
            assert_dimming_rule(&markers, dimmed);

            match engine.hover().category {
                Some(category) => {
                    for group in markers.groups() {
                        let expected = if group.category() == category { 1.0 } else { dimmed };
                        assert_eq!(group.opacity(), expected);
                    }
                }
                None => assert!(markers.groups().iter().all(|group| group.opacity() == 1.0)),
            }
        }
        assert_eq!(engine.hover(), HoverState::default());
    }

    #[test]
    fn hovered_marker_grows_then_pins_and_previous_shrinks() {
        let mut markers = markers();
        let mut engine = engine();
        let camera = camera();
        let config = MarkerConfig::default();

        engine.pointer_moved(Vec2::new(50.0, 50.0));
        let update = engine
            .tick(0.0, &camera, VIEWPORT, &mut markers)
            .expect("hover started");
        assert_eq!(update.current.marker, Some(id(0, 0)));

        let mut now = 0.0;
        for _ in 0..120 {
            now += 1.0 / 60.0;
            engine.tick(now, &camera, VIEWPORT, &mut markers);
        }
        assert_eq!(markers.scale(id(0, 0)), Some(config.hover_scale));
        assert_eq!(engine.animating_count(), 0);

        engine.pointer_moved(Vec2::new(10.0, 10.0));
        now += 1.0 / 60.0;
        engine.tick(now, &camera, VIEWPORT, &mut markers);
        let shrinking = markers.scale(id(0, 0)).expect("scale");
        assert!(shrinking < config.hover_scale && shrinking > 1.0);
        for _ in 0..120 {
            now += 1.0 / 60.0;
            engine.tick(now, &camera, VIEWPORT, &mut markers);
        }
        assert_eq!(markers.scale(id(0, 0)), Some(1.0));
        assert_eq!(engine.animating_count(), 0);
    }

    #[test]
    fn base_size_tracks_zoom() {
        let mut markers = markers();
        let mut engine = engine();
        let mut camera = camera();
        engine.tick(0.0, &camera, VIEWPORT, &mut markers);
        let near = engine.base_size();
        camera.frustum_half_height *= 4.0;
        engine.tick(0.1, &camera, VIEWPORT, &mut markers);
        assert!((engine.base_size() - near * 4.0).abs() <= 1e-6);
    }

    #[test]
    fn overlay_regions_block_hover() {
        let mut markers = markers();
        let mut engine = engine();
        engine.set_overlay_regions(vec![ScreenRect {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
        }]);
        engine.pointer_moved(Vec2::new(50.0, 50.0));
        assert!(engine.tick(0.0, &camera(), VIEWPORT, &mut markers).is_none());
        assert_eq!(engine.hover(), HoverState::default());
    }
}
