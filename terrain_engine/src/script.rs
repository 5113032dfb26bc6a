//! Scripted input for headless sessions.

use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use glam::Vec2;
use serde::Deserialize;
use terrain_engine::{InputEvent, PointerButton, ScreenRect, ViewerConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct InputScript {
    #[serde(default)]
    pub events: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptStep {
    /// Seconds since session start.
    pub at: f64,
    pub event: ScriptEvent,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptButton {
    #[default]
    Primary,
    Secondary,
}

impl From<ScriptButton> for PointerButton {
    fn from(button: ScriptButton) -> Self {
        match button {
            ScriptButton::Primary => PointerButton::Primary,
            ScriptButton::Secondary => PointerButton::Secondary,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    PointerMove {
        x: f32,
        y: f32,
    },
    PointerDown {
        x: f32,
        y: f32,
        #[serde(default)]
        button: ScriptButton,
    },
    PointerUp {
        x: f32,
        y: f32,
        #[serde(default)]
        button: ScriptButton,
    },
    PointerLeave,
    Wheel {
        delta: f32,
    },
    DoubleActivate,
    ToggleMode,
    ToggleCategory {
        category: String,
    },
    /// Each rect is `[x, y, width, height]` in pixels.
    OverlayRegions {
        rects: Vec<[f32; 4]>,
    },
    Resize {
        width: f32,
        height: f32,
    },
    Back,
    CloseOverlay,
    Refit,
}

impl InputScript {
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read(path).with_context(|| format!("reading script {}", path.display()))?;
        let mut script: InputScript = serde_json::from_slice(&data)
            .with_context(|| format!("parsing script {}", path.display()))?;
        script.events.sort_by(|a, b| a.at.total_cmp(&b.at));
        Ok(script)
    }
}

impl ScriptEvent {
    /// Category names resolve through the session's config.
    pub fn to_input(&self, config: &ViewerConfig) -> Result<InputEvent> {
        Ok(match self {
            ScriptEvent::PointerMove { x, y } => InputEvent::PointerMove {
                position: Vec2::new(*x, *y),
            },
            ScriptEvent::PointerDown { x, y, button } => InputEvent::PointerDown {
                position: Vec2::new(*x, *y),
                button: (*button).into(),
            },
            ScriptEvent::PointerUp { x, y, button } => InputEvent::PointerUp {
                position: Vec2::new(*x, *y),
                button: (*button).into(),
            },
            ScriptEvent::PointerLeave => InputEvent::PointerLeave,
            ScriptEvent::Wheel { delta } => InputEvent::Wheel { delta: *delta },
            ScriptEvent::DoubleActivate => InputEvent::DoubleActivate,
            ScriptEvent::ToggleMode => InputEvent::ToggleMode,
            ScriptEvent::ToggleCategory { category } => InputEvent::ToggleCategory(
                config
                    .category_id(category)
                    .ok_or_else(|| anyhow!("script names unknown category '{category}'"))?,
            ),
            ScriptEvent::OverlayRegions { rects } => InputEvent::SetOverlayRegions(
                rects
                    .iter()
                    .map(|[x, y, width, height]| ScreenRect {
                        x: *x,
                        y: *y,
                        width: *width,
                        height: *height,
                    })
                    .collect(),
            ),
            ScriptEvent::Resize { width, height } => InputEvent::Resize {
                width: *width,
                height: *height,
            },
            ScriptEvent::Back => InputEvent::Back,
            ScriptEvent::CloseOverlay => InputEvent::CloseOverlay,
            ScriptEvent::Refit => InputEvent::Refit,
        })
    }
}
