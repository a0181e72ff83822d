use mapedit_common::{Bounds, Dimensions, Vector2D};
use mapedit_kernel::{BoundEntity, Positioned};

/// Camera over the world. Its position is the world coordinate drawn at the
/// surface origin.
///
/// The bounds are the world bounds shifted by half the surface, so a tracked
/// entity at any world edge can still be centred.
#[derive(Debug, Clone)]
pub struct Viewport {
    body: BoundEntity,
    velocity: Vector2D,
    canvas_offset: Vector2D,
    target: Option<Vector2D>,
    stickiness: f64,
}

impl Viewport {
    /// A camera for a surface of `surface` pixels over `world`, starting at
    /// the clamped world origin without a target.
    pub fn new(surface: Dimensions, world: Bounds, stickiness: f64) -> Self {
        let canvas_offset = Vector2D::new(
            f64::from(surface.width) / 2.0,
            f64::from(surface.height) / 2.0,
        );
        let bounds = world.translated(-canvas_offset.x, -canvas_offset.y);
        let mut body = BoundEntity::new(Vector2D::ZERO, bounds);
        body.clamp_to_bounds();
        Self {
            body,
            velocity: Vector2D::ZERO,
            canvas_offset,
            target: None,
            stickiness,
        }
    }

    pub fn body(&self) -> &BoundEntity {
        &self.body
    }

    pub fn velocity(&self) -> Vector2D {
        self.velocity
    }

    pub fn canvas_offset(&self) -> Vector2D {
        self.canvas_offset
    }

    pub fn target(&self) -> Option<Vector2D> {
        self.target
    }

    /// Aim at `tracked`, keeping it at the centre of the surface.
    pub fn update_tracking_position(&mut self, tracked: &impl Positioned) {
        self.target = Some(tracked.position() - self.canvas_offset);
    }

    /// Track `tracked` and jump straight to it.
    pub fn center_on(&mut self, tracked: &impl Positioned) {
        self.update_tracking_position(tracked);
        if let Some(target) = self.target {
            self.body.position = target;
            self.velocity = Vector2D::ZERO;
            self.body.clamp_to_bounds();
        }
    }

    /// Ease toward the target by `stickiness * dt` of the remaining distance,
    /// capped at the whole distance.
    pub fn update(&mut self, dt: f64) {
        let Some(target) = self.target else {
            return;
        };
        let factor = (self.stickiness * dt).clamp(0.0, 1.0);
        self.velocity = (target - self.body.position) * factor;
        self.body.position += self.velocity;
        self.body.clamp_to_bounds();
    }

    /// World position to surface position.
    pub fn to_canvas(&self, world: Vector2D) -> Vector2D {
        world - self.body.position
    }

    /// Surface position to world position.
    pub fn to_world(&self, canvas: Vector2D) -> Vector2D {
        canvas + self.body.position
    }
}

impl Positioned for Viewport {
    fn position(&self) -> Vector2D {
        self.body.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(
            Dimensions::new(800, 600),
            Bounds::world(Dimensions::new(10_000, 10_000)),
            0.004,
        )
    }

    fn close(a: Vector2D, b: Vector2D) -> bool {
        (a - b).length() < 1e-9
    }

    #[test]
    fn canvas_and_world_round_trip() {
        let mut v = viewport();
        v.center_on(&Vector2D::new(1234.5, 987.25));
        for p in [
            Vector2D::ZERO,
            Vector2D::new(-50.5, 7.0),
            Vector2D::new(1e6, -3.25),
        ] {
            assert!(close(v.to_world(v.to_canvas(p)), p));
            assert!(close(v.to_canvas(v.to_world(p)), p));
        }
    }

    #[test]
    fn update_without_target_is_noop() {
        let mut v = viewport();
        let before = v.position();
        v.update(16.0);
        assert_eq!(v.position(), before);
        assert_eq!(v.velocity(), Vector2D::ZERO);
    }

    #[test]
    fn eases_a_fraction_of_the_distance() {
        let mut v = viewport();
        v.update_tracking_position(&Vector2D::new(5000.0, 5000.0));
        assert_eq!(v.target(), Some(Vector2D::new(4600.0, 4700.0)));
        v.update(100.0);
        assert!(close(v.position(), Vector2D::new(1840.0, 1880.0)));
    }

    #[test]
    fn long_frame_snaps_instead_of_overshooting() {
        let mut v = viewport();
        v.update_tracking_position(&Vector2D::new(5000.0, 5000.0));
        v.update(10_000.0);
        assert!(close(v.position(), Vector2D::new(4600.0, 4700.0)));
    }

    #[test]
    fn camera_is_clamped_to_shifted_world_bounds() {
        let mut v = viewport();
        v.update_tracking_position(&Vector2D::new(20_000.0, -500.0));
        v.update(1000.0);
        assert_eq!(v.position(), Vector2D::new(9600.0, -300.0));
        assert!(v.body().in_bounds());
    }

    #[test]
    fn centred_entity_lands_mid_surface() {
        let mut v = viewport();
        let player = Vector2D::new(3000.0, 2000.0);
        v.center_on(&player);
        assert_eq!(v.to_canvas(player), Vector2D::new(400.0, 300.0));
    }
}
