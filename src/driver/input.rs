use std::collections::{BTreeMap, BTreeSet};

use crate::events::capability::{Event, KeyCode, MouseButton};
use crate::foundation::core::Point;

/// Pointer and button state folded from the events seen so far.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    /// Last known pointer position in viewport pixels.
    pub pointer: Point,
    /// Keys currently held.
    pub keys: BTreeSet<KeyCode>,
    /// Mouse buttons currently held.
    pub buttons: BTreeSet<MouseButton>,
}

impl InputSnapshot {
    /// Fold one event into the snapshot.
    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::KeyDown { key } => {
                self.keys.insert(*key);
            }
            Event::KeyUp { key } => {
                self.keys.remove(key);
            }
            Event::MouseMove { position } => self.pointer = *position,
            Event::MouseButtonDown { button, position } => {
                self.pointer = *position;
                self.buttons.insert(*button);
            }
            Event::MouseButtonUp { button, position } => {
                self.pointer = *position;
                self.buttons.remove(button);
            }
            _ => {}
        }
    }

    /// Whether `key` is held.
    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.contains(&key)
    }

    /// Whether `button` is held.
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons.contains(&button)
    }
}

/// Platform event pump, polled once per rendered frame.
pub trait InputSource {
    /// Append pending events to `events`, oldest first.
    fn poll(&mut self, events: &mut Vec<Event>);
}

/// Source that never produces events.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoInput;

impl InputSource for NoInput {
    fn poll(&mut self, _events: &mut Vec<Event>) {}
}

/// Replays events keyed by the index of the poll (one poll per rendered frame).
#[derive(Clone, Debug, Default)]
pub struct ScriptedInput {
    script: BTreeMap<u64, Vec<Event>>,
    polls: u64,
}

impl ScriptedInput {
    /// Empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `event` on frame `frame` (0-based), after previously scripted events.
    pub fn at(mut self, frame: u64, event: Event) -> Self {
        self.script.entry(frame).or_default().push(event);
        self
    }

    /// Events not yet delivered.
    pub fn remaining(&self) -> usize {
        self.script.values().map(Vec::len).sum()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self, events: &mut Vec<Event>) {
        if let Some(due) = self.script.remove(&self.polls) {
            events.extend(due);
        }
        self.polls += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/driver/input.rs"]
mod tests;
