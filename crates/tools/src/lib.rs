//! Developer tooling: editor inspection and frame timing for headless hosts.
//!
//! # Invariants
//! - Tools only read editor state; they never drive the session.

mod frame_timer;
mod inspector;

pub use frame_timer::{FrameStats, FrameTimer};
pub use inspector::{EditorInspector, EditorSummary};

pub fn crate_info() -> &'static str {
    "mapedit-tools v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("tools"));
    }
}
