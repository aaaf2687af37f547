//! # Input Module
//!
//! Turns macroquad's keyboard and mouse state into one [`FrameInput`] per frame: an
//! ordered batch of discrete events, the held movement direction, and a quit flag.
//!
//! Discrete events come from a macroquad input subscriber, so a click and a key press
//! in the same frame reach the game in the order they happened. Everything past
//! [`InputHandler::poll`] is plain data, so the game tick never reads macroquad's
//! global input state.

use macroquad::input::utils::{register_input_subscriber, repeat_all_miniquad_input};
use macroquad::miniquad::{EventHandler, KeyMods};
use macroquad::prelude::*;

/// Discrete key actions the dialogue system understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Move the option cursor up
    Up,
    /// Move the option cursor down
    Down,
    /// Select the highlighted option
    Confirm,
    /// Talk to an agent in range without clicking
    Interact,
}

/// A single input event, in the order it was observed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary pointer pressed, in screen coordinates
    PointerDown { position: Vec2 },
    Key(KeyAction),
}

/// Everything the game tick needs to know about one frame of input.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameInput {
    pub events: Vec<InputEvent>,
    /// Held direction, not normalized
    pub movement: Vec2,
    pub quit: bool,
}

impl FrameInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_event(mut self, event: InputEvent) -> Self {
        self.events.push(event);
        self
    }

    pub fn with_movement(mut self, movement: Vec2) -> Self {
        self.movement = movement;
        self
    }
}

/// Maps a key to the dialogue action it stands for.
///
/// # Examples
///
/// ```
/// use macroquad::input::KeyCode;
/// use wayfarer::{translate_key, KeyAction};
///
/// assert_eq!(translate_key(KeyCode::Enter), Some(KeyAction::Confirm));
/// assert_eq!(translate_key(KeyCode::X), None);
/// ```
pub fn translate_key(key: KeyCode) -> Option<KeyAction> {
    match key {
        KeyCode::Up => Some(KeyAction::Up),
        KeyCode::Down => Some(KeyAction::Down),
        KeyCode::Enter | KeyCode::KpEnter => Some(KeyAction::Confirm),
        KeyCode::E | KeyCode::Space => Some(KeyAction::Interact),
        _ => None,
    }
}

/// Direction implied by a set of held keys. WASD and the arrow keys both count.
pub fn movement_vector(held: impl Fn(KeyCode) -> bool) -> Vec2 {
    let mut direction = Vec2::ZERO;
    if held(KeyCode::W) || held(KeyCode::Up) {
        direction.y -= 1.0;
    }
    if held(KeyCode::S) || held(KeyCode::Down) {
        direction.y += 1.0;
    }
    if held(KeyCode::A) || held(KeyCode::Left) {
        direction.x -= 1.0;
    }
    if held(KeyCode::D) || held(KeyCode::Right) {
        direction.x += 1.0;
    }
    direction
}

/// Collects discrete events as macroquad replays them, in arrival order.
#[derive(Debug, Clone, PartialEq)]
struct EventRecorder {
    /// Physical pixels per screen pixel
    dpi_scale: f32,
    events: Vec<InputEvent>,
}

impl EventRecorder {
    fn new(dpi_scale: f32) -> Self {
        Self {
            dpi_scale,
            events: Vec::new(),
        }
    }

    fn take(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }
}

impl EventHandler for EventRecorder {
    fn update(&mut self) {}

    fn draw(&mut self) {}

    fn key_down_event(&mut self, keycode: KeyCode, _keymods: KeyMods, repeat: bool) {
        if repeat {
            return;
        }
        if let Some(action) = translate_key(keycode) {
            self.events.push(InputEvent::Key(action));
        }
    }

    fn mouse_button_down_event(&mut self, button: MouseButton, x: f32, y: f32) {
        if button == MouseButton::Left {
            self.events.push(InputEvent::PointerDown {
                position: vec2(x, y) / self.dpi_scale,
            });
        }
    }
}

/// Polls macroquad once per frame.
///
/// Must be created inside the macroquad main loop since it registers an input
/// subscriber with the running context.
#[derive(Debug)]
pub struct InputHandler {
    subscriber: usize,
    recorder: EventRecorder,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            subscriber: register_input_subscriber(),
            recorder: EventRecorder::new(1.0),
        }
    }

    /// Collects this frame's input.
    pub fn poll(&mut self) -> FrameInput {
        self.recorder.dpi_scale = macroquad::miniquad::window::dpi_scale();
        repeat_all_miniquad_input(&mut self.recorder, self.subscriber);

        FrameInput {
            events: self.recorder.take(),
            movement: movement_vector(is_key_down),
            quit: is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q),
        }
    }
}
