use mapedit_common::{Bounds, Vector2D};

/// Anything with a world position another entity can follow.
pub trait Positioned {
    fn position(&self) -> Vector2D;
}

/// A position confined to an axis-aligned rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundEntity {
    pub position: Vector2D,
    bounds: Bounds,
}

impl BoundEntity {
    /// Place an entity at `position`. It is not clamped until
    /// [`BoundEntity::clamp_to_bounds`] runs.
    pub fn new(position: Vector2D, bounds: Bounds) -> Self {
        Self { position, bounds }
    }

    /// The rectangle this entity is confined to.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Inclusive on both ends of both axes.
    pub fn in_bounds(&self) -> bool {
        self.bounds.x().contains(self.position.x) && self.bounds.y().contains(self.position.y)
    }

    /// Clamp each axis independently. A no-op when already in bounds.
    pub fn clamp_to_bounds(&mut self) {
        self.position.x = self.bounds.x().clamp(self.position.x);
        self.position.y = self.bounds.y().clamp(self.position.y);
    }
}

impl Positioned for BoundEntity {
    fn position(&self) -> Vector2D {
        self.position
    }
}

impl Positioned for Vector2D {
    fn position(&self) -> Vector2D {
        *self
    }
}
