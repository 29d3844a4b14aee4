use std::collections::HashSet;

use super::types::{InputEvent, Key, MouseWheelDelta};

/// Per-frame input deltas.
///
/// `InputState` holds what is currently down; `InputFrame` holds what changed
/// since the last tick. Cleared by the runtime after each frame.
#[derive(Debug, Default)]
pub struct InputFrame {
    /// Raw events in arrival order.
    pub events: Vec<InputEvent>,

    /// Keys pressed this frame, including key-repeats.
    pub keys_pressed: Vec<Key>,

    /// Keys released this frame.
    pub keys_released: HashSet<Key>,

    /// Accumulated wheel lines this frame (positive = scrolled up).
    pub wheel_lines: f32,

    /// Accumulated wheel pixels this frame (positive = scrolled up).
    pub wheel_pixels: f32,
}

impl InputFrame {
    pub fn clear(&mut self) {
        self.events.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.wheel_lines = 0.0;
        self.wheel_pixels = 0.0;
    }

    pub fn push_event(&mut self, ev: InputEvent) {
        if let InputEvent::MouseWheel { delta, .. } = &ev {
            match *delta {
                MouseWheelDelta::Line { y, .. } => self.wheel_lines += y,
                MouseWheelDelta::Pixel { y, .. } => self.wheel_pixels += y,
            }
        }
        self.events.push(ev);
    }

    /// Vertical wheel movement this frame converted to pixels.
    pub fn wheel_delta_px(&self, line_height: f32) -> f32 {
        self.wheel_lines * line_height + self.wheel_pixels
    }
}
