use serde::{Deserialize, Serialize};

use crate::types::{Dimensions, GeometryError};
use crate::vector::Vector2D;

/// Map configuration supplied by the (external) configuration layer.
///
/// Read-only to the engine. Only the fields the renderer needs are modelled;
/// the rest of the document is ignored on deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapConfig {
    #[serde(with = "crate::vector::as_object")]
    pub world_limits: Vector2D,
    pub tile_type: String,
}

impl MapConfig {
    pub fn new(world_limits: Vector2D, tile_type: impl Into<String>) -> Self {
        Self {
            world_limits,
            tile_type: tile_type.into(),
        }
    }

    /// Integer world size, validated finite and positive. Fractional limits
    /// are floored.
    pub fn world_dimensions(&self) -> Result<Dimensions, GeometryError> {
        let width = world_axis("world width", self.world_limits.x)?;
        let height = world_axis("world height", self.world_limits.y)?;
        Ok(Dimensions::new(width, height))
    }
}

fn world_axis(what: &'static str, value: f64) -> Result<u32, GeometryError> {
    if !value.is_finite() {
        return Err(GeometryError::NonFinite { what });
    }
    let floored = value.floor();
    if floored < 1.0 || floored > f64::from(u32::MAX) {
        return Err(GeometryError::NonPositive { what, value });
    }
    Ok(floored as u32)
}

/// Whether the chunk-size heuristic should favour few large chunks or many
/// small ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkPreference {
    #[default]
    Big,
    Small,
}

/// Where the image drawer looks for images and their sidecar metadata,
/// relative to the resource resolver's root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageDrawerConfig {
    pub img_dir: String,
    pub img_meta_dir: String,
}

impl Default for ImageDrawerConfig {
    fn default() -> Self {
        Self {
            img_dir: "imgs/game-images".into(),
            img_meta_dir: "meta/game-images".into(),
        }
    }
}

/// Engine-wide constants, passed explicitly to every component that needs
/// them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Side of one background tile, in world units.
    pub tile_size: u32,
    /// Fraction of the remaining distance the camera covers per millisecond.
    pub viewport_stickiness: f64,
    /// Player speed in world units per millisecond.
    pub player_speed: f64,
    /// Largest surface side the pre-render may allocate before halving.
    pub max_surface_dimension: u32,
    pub chunk_preference: ChunkPreference,
    /// Tile metadata document (`tileLocations`), relative to the resolver root.
    pub tiles_meta_file: String,
    pub images: ImageDrawerConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tile_size: 100,
            viewport_stickiness: 0.004,
            player_speed: 1.0,
            max_surface_dimension: 16_000,
            chunk_preference: ChunkPreference::Big,
            tiles_meta_file: "meta/tiles.meta.json".into(),
            images: ImageDrawerConfig::default(),
        }
    }
}
