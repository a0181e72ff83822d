use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};
use mapedit_common::DirectionState;

use crate::bindings::KeyBindings;
use crate::event::{MouseState, RawInputEvent, TrackerSnapshot};
use crate::tracker::InputTracker;

/// Direction and mouse state after key bindings are applied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputState {
    pub direction: DirectionState,
    pub mouse: MouseState,
}

/// Owns an [`InputTracker`] and translates its snapshots through
/// [`KeyBindings`].
#[derive(Debug)]
pub struct InputManager {
    tracker: InputTracker,
    bindings: KeyBindings,
    state: InputState,
    subscribers: Vec<UnboundedSender<InputState>>,
}

impl InputManager {
    pub fn new(bindings: KeyBindings) -> Self {
        Self::with_tracker(InputTracker::new(), bindings)
    }

    pub fn with_tracker(tracker: InputTracker, bindings: KeyBindings) -> Self {
        Self {
            tracker,
            bindings,
            state: InputState::default(),
            subscribers: Vec::new(),
        }
    }

    /// Receive every mapped state from now on.
    pub fn subscribe(&mut self) -> UnboundedReceiver<InputState> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn state(&self) -> InputState {
        self.state
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn tracker(&self) -> &InputTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut InputTracker {
        &mut self.tracker
    }

    /// Feed a raw event through the tracker. Returns the mapped state if the
    /// tracker reported a change.
    pub fn handle_event(&mut self, event: RawInputEvent) -> Option<InputState> {
        let snapshot = self.tracker.handle_event(event)?;
        Some(self.apply_snapshot(&snapshot))
    }

    /// Map a tracker snapshot to direction state and re-emit it.
    pub fn apply_snapshot(&mut self, snapshot: &TrackerSnapshot) -> InputState {
        let held = |key: &str| snapshot.is_pressed(key);
        let b = &self.bindings.direction_bindings;
        self.state = InputState {
            direction: DirectionState {
                up: b.up.any_held(held),
                down: b.down.any_held(held),
                left: b.left.any_held(held),
                right: b.right.any_held(held),
            },
            mouse: snapshot.mouse,
        };
        let state = self.state;
        self.subscribers.retain(|tx| tx.unbounded_send(state).is_ok());
        state
    }

    /// Re-attach the tracker. Returns the cleared state if it was detached.
    pub fn start_tracking(&mut self) -> Option<InputState> {
        let snapshot = self.tracker.attach()?;
        Some(self.apply_snapshot(&snapshot))
    }

    /// Detach the tracker; raw events are dropped until tracking restarts.
    pub fn stop_tracking(&mut self) {
        self.tracker.detach();
    }
}
