//! Map kernel: bounded entities and the player's motion integration.
//!
//! # Invariants
//! - After any update, a bound entity's position lies inside its bounds.
//! - Time is explicit: nothing here reads a clock.

pub mod bound;
pub mod player;

pub use bound::{BoundEntity, Positioned};
pub use player::{Player, QueuedInput};

pub fn crate_info() -> &'static str {
    "mapedit-kernel v0.1.0"
}
