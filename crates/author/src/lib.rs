//! The editor session: owns the player, camera, input pipeline and map
//! drawer, and advances them once per host frame.
//!
//! # Invariants
//! - Frames are only drawn after the map drawer finished its pre-render.
//! - A paused editor consumes no input and integrates no time.
//! - A failed load leaves the editor in `HadError`; loading again may recover.

mod editor;

pub use editor::{Editor, EditorError, EditorState, FrameReport};

pub fn crate_info() -> &'static str {
    "mapedit-author v0.1.0"
}
