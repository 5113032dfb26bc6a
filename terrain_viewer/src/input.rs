//! Window event translation. winit reports buttons without a position and
//! scroll in lines or pixels; the core wants positioned pointer events and a
//! signed zoom delta, so the cursor is tracked here between events.

use glam::Vec2;
use terrain_engine::{CategoryId, InputEvent, PointerButton};
use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::{Key, NamedKey};

/// Wheel travel in pixels per scroll line.
const LINE_PIXELS: f32 = 100.0;

#[derive(Debug, Default)]
pub struct PointerTracker {
    cursor: Option<Vec2>,
}

impl PointerTracker {
    pub fn moved(&mut self, x: f64, y: f64) -> InputEvent {
        let position = Vec2::new(x as f32, y as f32);
        self.cursor = Some(position);
        InputEvent::PointerMove { position }
    }

    pub fn left(&mut self) -> InputEvent {
        self.cursor = None;
        InputEvent::PointerLeave
    }

    /// `None` for buttons the core does not use, or before the cursor has
    /// entered the window.
    pub fn button(&self, state: ElementState, button: MouseButton) -> Option<InputEvent> {
        let button = pointer_button(button)?;
        let position = self.cursor?;
        Some(match state {
            ElementState::Pressed => InputEvent::PointerDown { position, button },
            ElementState::Released => InputEvent::PointerUp { position, button },
        })
    }
}

pub fn pointer_button(button: MouseButton) -> Option<PointerButton> {
    match button {
        MouseButton::Left => Some(PointerButton::Primary),
        MouseButton::Right | MouseButton::Middle => Some(PointerButton::Secondary),
        _ => None,
    }
}

/// Scrolling up (away from the user) zooms in, which the core expresses as a
/// negative delta.
pub fn wheel_event(delta: MouseScrollDelta) -> InputEvent {
    let delta = match delta {
        MouseScrollDelta::LineDelta(_, lines) => -lines * LINE_PIXELS,
        MouseScrollDelta::PixelDelta(position) => -position.y as f32,
    };
    InputEvent::Wheel { delta }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    Exit,
    ToggleMode,
    TopDown,
    Refit,
    Back,
    CloseOverlay,
    ToggleCategory(CategoryId),
}

impl KeyCommand {
    pub fn from_key(key: &Key, category_count: usize) -> Option<Self> {
        match key {
            Key::Named(NamedKey::Escape) => Some(Self::Exit),
            Key::Named(NamedKey::Backspace) => Some(Self::Back),
            Key::Named(NamedKey::Space) => Some(Self::TopDown),
            Key::Character(text) => match text.as_str() {
                "m" | "M" => Some(Self::ToggleMode),
                "t" | "T" => Some(Self::TopDown),
                "r" | "R" => Some(Self::Refit),
                "c" | "C" => Some(Self::CloseOverlay),
                digit => {
                    let index = digit.parse::<usize>().ok()?.checked_sub(1)?;
                    if index >= category_count {
                        return None;
                    }
                    CategoryId::from_index(index).map(Self::ToggleCategory)
                }
            },
            _ => None,
        }
    }

    /// The core event for this command; `Exit` is handled by the window.
    pub fn input(self) -> Option<InputEvent> {
        match self {
            Self::Exit => None,
            Self::ToggleMode => Some(InputEvent::ToggleMode),
            Self::TopDown => Some(InputEvent::DoubleActivate),
            Self::Refit => Some(InputEvent::Refit),
            Self::Back => Some(InputEvent::Back),
            Self::CloseOverlay => Some(InputEvent::CloseOverlay),
            Self::ToggleCategory(category) => Some(InputEvent::ToggleCategory(category)),
        }
    }
}
