//! Map rendering: the easing camera, the one-time world pre-render into
//! chunks, and per-frame compositing of visible chunks.
//!
//! # Invariants
//! - `Viewport::to_world` and `Viewport::to_canvas` are exact inverses.
//! - No pre-render surface exceeds the configured side ceiling.
//! - Frames are drawn only from a fully committed chunk grid.

mod map_drawer;
mod surface;
mod viewport;

pub use map_drawer::{MapDrawError, MapDrawer, MapDrawerState, plan_passes};
pub use surface::clear_surface;
pub use viewport::Viewport;

pub fn crate_info() -> &'static str {
    "mapedit-render v0.1.0"
}
