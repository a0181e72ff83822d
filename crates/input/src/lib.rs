//! Input pipeline: raw key and mouse events tracked into snapshots, then
//! mapped through key bindings to direction state.
//!
//! # Invariants
//! - A snapshot is emitted only when a raw event changes tracked state.
//! - A detached tracker observes nothing; re-attaching starts from a clean
//!   slate so no key stays stuck.
//! - Subscribers whose receiver was dropped are pruned on the next emit.

pub mod bindings;
pub mod event;
pub mod manager;
pub mod tracker;

pub use bindings::{DirectionBindings, KeyBindings, Keys};
pub use event::{MouseButton, MouseState, RawInputEvent, TrackerSnapshot};
pub use manager::{InputManager, InputState};
pub use tracker::InputTracker;

pub fn crate_info() -> &'static str {
    "mapedit-input v0.1.0"
}
