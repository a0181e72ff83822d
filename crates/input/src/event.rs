use mapedit_common::Vector2D;

/// Mouse buttons as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Other(u16),
}

/// A raw event delivered by the host's windowing layer.
#[derive(Debug, Clone, PartialEq)]
pub enum RawInputEvent {
    /// Key identified by its logical name (`"w"`, `"ArrowUp"`, ...).
    KeyDown(String),
    KeyUp(String),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    /// Pointer position relative to the drawing surface.
    MouseMove(Vector2D),
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MouseState {
    pub left_pressed: bool,
    pub right_pressed: bool,
    pub coords: Vector2D,
}

/// Everything the tracker knows at one instant.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TrackerSnapshot {
    /// Held keys in press order, without duplicates.
    pub keys_pressed: Vec<String>,
    pub mouse: MouseState,
}

impl TrackerSnapshot {
    pub fn is_pressed(&self, key: &str) -> bool {
        self.keys_pressed.iter().any(|k| k == key)
    }
}
