use std::collections::VecDeque;

use mapedit_common::{Bounds, DirectionState, Timestamp, Vector2D};

use crate::bound::{BoundEntity, Positioned};

/// A direction snapshot recorded for later replay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueuedInput {
    pub state: DirectionState,
    pub timestamp: Timestamp,
}

/// The player-controlled entity.
///
/// Speed is in world units per millisecond. Vertical and horizontal
/// components are independent, so a diagonal moves at `speed * sqrt(2)`.
#[derive(Debug, Clone)]
pub struct Player {
    body: BoundEntity,
    speed: f64,
    velocity: Vector2D,
    last_update_time: Timestamp,
    input_queue: VecDeque<QueuedInput>,
}

impl Player {
    /// A stationary player whose clock starts at `now`.
    pub fn new(position: Vector2D, speed: f64, bounds: Bounds, now: Timestamp) -> Self {
        Self {
            body: BoundEntity::new(position, bounds),
            speed,
            velocity: Vector2D::ZERO,
            last_update_time: now,
            input_queue: VecDeque::new(),
        }
    }

    pub fn body(&self) -> &BoundEntity {
        &self.body
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn velocity(&self) -> Vector2D {
        self.velocity
    }

    pub fn last_update_time(&self) -> Timestamp {
        self.last_update_time
    }

    /// Up wins over down, left wins over right.
    pub fn velocity_for(&self, state: &DirectionState) -> Vector2D {
        let y = if state.up {
            -self.speed
        } else if state.down {
            self.speed
        } else {
            0.0
        };
        let x = if state.left {
            -self.speed
        } else if state.right {
            self.speed
        } else {
            0.0
        };
        Vector2D::new(x, y)
    }

    /// Apply a direction snapshot to the velocity immediately.
    pub fn update_on_input(&mut self, state: &DirectionState) {
        self.velocity = self.velocity_for(state);
    }

    /// Integrate the current velocity up to `now`, then clamp.
    pub fn update(&mut self, now: Timestamp) {
        let dt = now - self.last_update_time;
        self.last_update_time = now;
        self.integrate(dt);
    }

    /// Move the integration baseline without moving the player.
    pub fn reset_clock(&mut self, now: Timestamp) {
        self.last_update_time = now;
    }

    /// Record a direction snapshot for [`Player::process_inputs`].
    pub fn queue_input(&mut self, state: DirectionState, timestamp: Timestamp) {
        self.input_queue.push_back(QueuedInput { state, timestamp });
    }

    pub fn queued_inputs(&self) -> usize {
        self.input_queue.len()
    }

    /// Replay queued inputs in order. Each entry integrates the velocity it
    /// implies over the interval since the previously processed timestamp.
    pub fn process_inputs(&mut self) {
        while let Some(input) = self.input_queue.pop_front() {
            self.velocity = self.velocity_for(&input.state);
            let dt = input.timestamp - self.last_update_time;
            self.last_update_time = input.timestamp;
            self.integrate(dt);
            tracing::trace!(
                timestamp = input.timestamp,
                x = self.body.position.x,
                y = self.body.position.y,
                "replayed input"
            );
        }
    }

    fn integrate(&mut self, dt: f64) {
        // A host clock stepping backwards must not move the player in reverse.
        let dt = dt.max(0.0);
        self.body.position += self.velocity * dt;
        self.body.clamp_to_bounds();
    }
}

impl Positioned for Player {
    fn position(&self) -> Vector2D {
        self.body.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapedit_common::Dimensions;

    fn bounds() -> Bounds {
        Bounds::world(Dimensions::new(40_000, 40_000))
    }

    fn held(up: bool, down: bool, left: bool, right: bool) -> DirectionState {
        DirectionState {
            up,
            down,
            left,
            right,
        }
    }

    #[test]
    fn up_beats_down_and_left_beats_right() {
        let p = Player::new(Vector2D::ZERO, 2.0, bounds(), 0.0);
        assert_eq!(p.velocity_for(&held(true, true, false, false)), Vector2D::new(0.0, -2.0));
        assert_eq!(p.velocity_for(&held(false, false, true, true)), Vector2D::new(-2.0, 0.0));
        assert_eq!(p.velocity_for(&held(false, true, false, true)), Vector2D::new(2.0, 2.0));
        assert_eq!(p.velocity_for(&DirectionState::default()), Vector2D::ZERO);
    }

    #[test]
    fn diagonal_speed_is_not_normalized() {
        let p = Player::new(Vector2D::ZERO, 1.0, bounds(), 0.0);
        let v = p.velocity_for(&held(true, false, true, false));
        assert!((v.length() - 2f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn holding_up_for_sixteen_seconds_moves_sixteen_thousand_units() {
        let mut p = Player::new(Vector2D::new(20_000.0, 20_000.0), 1.0, bounds(), 0.0);
        p.update_on_input(&held(true, false, false, false));
        for tick in 1..=1000 {
            p.update(f64::from(tick) * 16.0);
        }
        assert_eq!(p.position(), Vector2D::new(20_000.0, 4_000.0));
        assert_eq!(p.last_update_time(), 16_000.0);
    }

    #[test]
    fn movement_stops_at_the_top_edge() {
        let mut p = Player::new(Vector2D::new(500.0, 10_000.0), 1.0, bounds(), 0.0);
        p.update_on_input(&held(true, false, false, false));
        for tick in 1..=1000 {
            p.update(f64::from(tick) * 16.0);
            assert!(p.body().in_bounds());
        }
        assert_eq!(p.position(), Vector2D::new(500.0, 0.0));
    }

    #[test]
    fn reset_clock_skips_the_elapsed_interval() {
        let mut p = Player::new(Vector2D::new(100.0, 100.0), 1.0, bounds(), 0.0);
        p.update_on_input(&held(false, false, false, true));
        p.reset_clock(5_000.0);
        p.update(5_010.0);
        assert_eq!(p.position(), Vector2D::new(110.0, 100.0));
    }

    #[test]
    fn backwards_clock_does_not_move() {
        let mut p = Player::new(Vector2D::new(100.0, 100.0), 1.0, bounds(), 50.0);
        p.update_on_input(&held(false, true, false, false));
        p.update(20.0);
        assert_eq!(p.position(), Vector2D::new(100.0, 100.0));
        p.update(30.0);
        assert_eq!(p.position(), Vector2D::new(100.0, 110.0));
    }

    #[test]
    fn queued_inputs_replay_in_order() {
        let mut p = Player::new(Vector2D::new(1_000.0, 1_000.0), 1.0, bounds(), 0.0);
        p.queue_input(held(false, false, false, true), 10.0);
        p.queue_input(held(false, true, false, false), 30.0);
        p.queue_input(DirectionState::default(), 50.0);
        assert_eq!(p.queued_inputs(), 3);

        p.process_inputs();

        assert_eq!(p.queued_inputs(), 0);
        // 10ms right, then 20ms down, then 20ms idle.
        assert_eq!(p.position(), Vector2D::new(1_010.0, 1_020.0));
        assert_eq!(p.velocity(), Vector2D::ZERO);
        assert_eq!(p.last_update_time(), 50.0);
    }
}
