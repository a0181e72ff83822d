use futures::channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded};

use crate::event::{MouseButton, MouseState, RawInputEvent, TrackerSnapshot};

/// Tracks held keys, held mouse buttons and the pointer position.
///
/// The host feeds raw events through [`InputTracker::handle_event`]; every
/// change is broadcast to subscribers as a [`TrackerSnapshot`].
#[derive(Debug)]
pub struct InputTracker {
    keys_pressed: Vec<String>,
    mouse: MouseState,
    attached: bool,
    subscribers: Vec<UnboundedSender<TrackerSnapshot>>,
}

impl Default for InputTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl InputTracker {
    /// A tracker that is already attached.
    pub fn new() -> Self {
        Self {
            keys_pressed: Vec::new(),
            mouse: MouseState::default(),
            attached: true,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> UnboundedReceiver<TrackerSnapshot> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        TrackerSnapshot {
            keys_pressed: self.keys_pressed.clone(),
            mouse: self.mouse,
        }
    }

    /// Apply a raw event. Returns the new snapshot if tracked state changed.
    pub fn handle_event(&mut self, event: RawInputEvent) -> Option<TrackerSnapshot> {
        if !self.attached {
            tracing::trace!(?event, "input detached, event dropped");
            return None;
        }
        let changed = match event {
            RawInputEvent::KeyDown(key) => {
                if self.keys_pressed.contains(&key) {
                    false
                } else {
                    self.keys_pressed.push(key);
                    true
                }
            }
            RawInputEvent::KeyUp(key) => {
                let Some(index) = self.keys_pressed.iter().position(|k| *k == key) else {
                    return None;
                };
                self.keys_pressed.remove(index);
                true
            }
            RawInputEvent::MouseDown(button) => self.set_button(button, true),
            RawInputEvent::MouseUp(button) => self.set_button(button, false),
            RawInputEvent::MouseMove(coords) => {
                let moved = self.mouse.coords != coords;
                self.mouse.coords = coords;
                moved
            }
        };
        if !changed {
            return None;
        }
        let snapshot = self.snapshot();
        self.broadcast(&snapshot);
        Some(snapshot)
    }

    /// Stop observing raw events.
    pub fn detach(&mut self) {
        self.attached = false;
    }

    /// Resume observing raw events. Held keys and buttons are forgotten, since
    /// their releases may have happened while detached, and one snapshot of
    /// the cleared state is emitted.
    pub fn attach(&mut self) -> Option<TrackerSnapshot> {
        if self.attached {
            return None;
        }
        self.attached = true;
        self.keys_pressed.clear();
        self.mouse.left_pressed = false;
        self.mouse.right_pressed = false;
        let snapshot = self.snapshot();
        self.broadcast(&snapshot);
        Some(snapshot)
    }

    fn set_button(&mut self, button: MouseButton, pressed: bool) -> bool {
        let slot = match button {
            MouseButton::Left => &mut self.mouse.left_pressed,
            MouseButton::Right => &mut self.mouse.right_pressed,
            MouseButton::Middle | MouseButton::Other(_) => return false,
        };
        let changed = *slot != pressed;
        *slot = pressed;
        changed
    }

    fn broadcast(&mut self, snapshot: &TrackerSnapshot) {
        self.subscribers
            .retain(|tx| tx.unbounded_send(snapshot.clone()).is_ok());
    }
}
