//! Shared types for the map editor engine: vectors, bounds, map and engine
//! configuration.
//!
//! # Invariants
//! - Configuration is immutable once handed to a component.
//! - No process-wide mutable state: constants travel inside [`EngineConfig`].

mod config;
mod types;
mod vector;

pub use config::{ChunkPreference, EngineConfig, ImageDrawerConfig, MapConfig};
pub use types::{AxisRange, Bounds, Dimensions, DirectionState, GeometryError, Timestamp};
pub use vector::{Vector2D, Vector2DExt, Vector2DLike};

pub fn crate_info() -> &'static str {
    "mapedit-common v0.1.0"
}
