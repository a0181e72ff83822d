use glam::DVec2;
use serde::{Deserialize, Serialize};

/// 2D vector used as the unit of every spatial computation.
///
/// Arithmetic (`+`, `-`, `* scalar`) returns new values; `+=` and `*=` mutate
/// in place for hot paths.
pub type Vector2D = DVec2;

/// Loosely-typed vector as it appears in configuration documents. Missing
/// components default to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vector2DLike {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
}

/// Constructors and helpers that glam does not provide under these names.
pub trait Vector2DExt: Sized {
    /// Vector with the given magnitude pointing at `theta` radians.
    fn from_polar(magnitude: f64, theta: f64) -> Self;

    fn from_object(obj: &Vector2DLike) -> Self;

    /// Per-axis floor.
    fn floor_axes(self) -> Self;
}

impl Vector2DExt for Vector2D {
    fn from_polar(magnitude: f64, theta: f64) -> Self {
        DVec2::new(magnitude * theta.cos(), magnitude * theta.sin())
    }

    fn from_object(obj: &Vector2DLike) -> Self {
        DVec2::new(obj.x.unwrap_or(0.0), obj.y.unwrap_or(0.0))
    }

    fn floor_axes(self) -> Self {
        self.floor()
    }
}

/// Serde adapter storing a [`Vector2D`] as `{ "x": .., "y": .. }` instead of
/// glam's `[x, y]` sequence form.
pub mod as_object {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Vector2D, Vector2DExt, Vector2DLike};

    pub fn serialize<S: Serializer>(v: &Vector2D, serializer: S) -> Result<S::Ok, S::Error> {
        Vector2DLike::from(*v).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vector2D, D::Error> {
        let like = Vector2DLike::deserialize(deserializer)?;
        Ok(Vector2D::from_object(&like))
    }
}

impl From<Vector2D> for Vector2DLike {
    fn from(v: Vector2D) -> Self {
        Self {
            x: Some(v.x),
            y: Some(v.y),
        }
    }
}
