//! Light/dark mode crossfade. One scalar in [0, 1] drives the background
//! colour, every material blend, the marker colours and the binary style
//! class; they are all written from the same value in the same call.

use serde::Serialize;

use crate::animation::{AnimationSlot, Easing};
use crate::config::ModeConfig;
use crate::markers::MarkerSet;
use crate::materials::{MaterialSet, lerp_color};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeClass {
    Light,
    Dark,
}

impl ModeClass {
    /// Flips exactly at the midpoint.
    pub fn for_value(value: f32) -> Self {
        if value >= 0.5 {
            ModeClass::Dark
        } else {
            ModeClass::Light
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModeFrame {
    pub value: f32,
    pub background: [f32; 3],
    pub class: ModeClass,
    /// The transition reached its endpoint this frame.
    pub settled: bool,
}

#[derive(Debug, Clone)]
pub struct ModeCrossfadeController {
    channel: AnimationSlot<f32>,
    value: f32,
    background: [f32; 3],
    class: ModeClass,
    duration: f64,
    light_background: [f32; 3],
    dark_background: [f32; 3],
}

impl ModeCrossfadeController {
    pub fn from_config(
        config: &ModeConfig,
        materials: &mut MaterialSet,
        markers: &mut MarkerSet,
    ) -> Self {
        let mut controller = Self {
            channel: AnimationSlot::new(),
            value: 0.0,
            background: config.light_background,
            class: ModeClass::Light,
            duration: config.crossfade_duration,
            light_background: config.light_background,
            dark_background: config.dark_background,
        };
        let initial = if config.start_dark { 1.0 } else { 0.0 };
        controller.apply(initial, materials, markers);
        controller
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn background(&self) -> [f32; 3] {
        self.background
    }

    pub fn class(&self) -> ModeClass {
        self.class
    }

    pub fn is_transitioning(&self) -> bool {
        self.channel.is_active()
    }

    /// Starts a fade towards the opposite endpoint. Returns the target, or
    /// `None` when a fade is already running and the trigger was dropped.
    pub fn toggle(&mut self, now: f64) -> Option<f32> {
        if self.channel.is_active() {
            log::warn!("mode toggle ignored: crossfade already in flight");
            return None;
        }
        let target = if self.value >= 0.5 { 0.0 } else { 1.0 };
        self.channel
            .start(self.value, target, self.duration, Easing::Linear, now);
        log::info!("mode crossfade towards {target} started");
        Some(target)
    }

    pub fn tick(
        &mut self,
        now: f64,
        materials: &mut MaterialSet,
        markers: &mut MarkerSet,
    ) -> Option<ModeFrame> {
        let step = self.channel.advance(now)?;
        self.apply(step.value, materials, markers);
        if step.finished {
            log::info!("mode crossfade settled at {:?}", self.class);
        }
        Some(ModeFrame {
            value: self.value,
            background: self.background,
            class: self.class,
            settled: step.finished,
        })
    }

    fn apply(&mut self, value: f32, materials: &mut MaterialSet, markers: &mut MarkerSet) {
        self.value = value.clamp(0.0, 1.0);
        self.background = lerp_color(self.light_background, self.dark_background, self.value);
        materials.blend(self.value);
        markers.set_mode_blend(self.value);
        self.class = ModeClass::for_value(self.value);
    }
}
