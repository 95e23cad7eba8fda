#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Input controller that folds raw host input into an [`Intent`] record.
//!
//! The controller only flips flags. Held flags (`left`, `right`, `fire`) mirror
//! whatever keys and pointers are currently pressed, while `bomb` is a one-shot
//! request that stays raised until the engine consumes it.

use std::collections::{BTreeMap, BTreeSet};

use savings_arcade_core::{InputEvent, Intent, Key, PointerButton, PointerId};

const LEFT_ZONE_END: f32 = 1.0 / 3.0;
const RIGHT_ZONE_START: f32 = 2.0 / 3.0;

/// Horizontal band of the field a pressed pointer currently occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Zone {
    Left,
    Fire,
    Right,
}

impl Zone {
    fn at(x: f32) -> Self {
        if x < LEFT_ZONE_END {
            Self::Left
        } else if x > RIGHT_ZONE_START {
            Self::Right
        } else {
            Self::Fire
        }
    }
}

/// Held action a key maps to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Action {
    Left,
    Right,
    Fire,
}

fn key_action(key: Key) -> Option<Action> {
    match key {
        Key::ArrowLeft | Key::A => Some(Action::Left),
        Key::ArrowRight | Key::D => Some(Action::Right),
        Key::Space => Some(Action::Fire),
        Key::B | Key::Other => None,
    }
}

/// Translates raw input into the intent record read by the engine.
#[derive(Debug, Default)]
pub struct InputController {
    attached: bool,
    intent: Intent,
    held_keys: BTreeSet<(Action, KeySlot)>,
    pointers: BTreeMap<PointerId, Zone>,
}

/// Distinguishes the physical keys mapped onto the same action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct KeySlot(u8);

impl KeySlot {
    fn of(key: Key) -> Self {
        Self(match key {
            Key::ArrowLeft => 0,
            Key::ArrowRight => 1,
            Key::A => 2,
            Key::D => 3,
            Key::Space => 4,
            Key::B => 5,
            Key::Other => 6,
        })
    }
}

impl InputController {
    /// Creates a detached controller with a cleared intent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts listening to input events.
    pub fn attach(&mut self) {
        self.attached = true;
        tracing::debug!("input controller attached");
    }

    /// Stops listening and releases every held input.
    pub fn detach(&mut self) {
        self.attached = false;
        self.release_all();
        self.intent.bomb = false;
        tracing::debug!("input controller detached");
    }

    /// Reports whether the controller is listening.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Current intent snapshot.
    #[must_use]
    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// Mutable access for the engine, which clears one-shot flags after reading.
    pub fn intent_mut(&mut self) -> &mut Intent {
        &mut self.intent
    }

    /// Applies a raw input event. Events arriving while detached are ignored.
    pub fn handle(&mut self, event: InputEvent) {
        if !self.attached {
            return;
        }

        match event {
            InputEvent::KeyDown(Key::B) => self.intent.bomb = true,
            InputEvent::KeyDown(key) => {
                if let Some(action) = key_action(key) {
                    let _ = self.held_keys.insert((action, KeySlot::of(key)));
                }
            }
            InputEvent::KeyUp(key) => {
                if let Some(action) = key_action(key) {
                    let _ = self.held_keys.remove(&(action, KeySlot::of(key)));
                }
            }
            InputEvent::PointerDown {
                button: PointerButton::Secondary,
                ..
            } => self.intent.bomb = true,
            InputEvent::PointerDown {
                pointer,
                x,
                button: PointerButton::Primary,
            } => {
                let _ = self.pointers.insert(pointer, Zone::at(x));
            }
            InputEvent::PointerMoved { pointer, x } => {
                if let Some(zone) = self.pointers.get_mut(&pointer) {
                    *zone = Zone::at(x);
                }
            }
            InputEvent::PointerUp { pointer } => {
                let _ = self.pointers.remove(&pointer);
            }
            InputEvent::FocusLost => self.release_all(),
        }

        self.refresh_held();
    }

    fn release_all(&mut self) {
        self.held_keys.clear();
        self.pointers.clear();
        self.refresh_held();
    }

    fn refresh_held(&mut self) {
        let key_held = |action: Action| self.held_keys.iter().any(|(held, _)| *held == action);
        let pointer_in = |zone: Zone| self.pointers.values().any(|held| *held == zone);

        let left = key_held(Action::Left) || pointer_in(Zone::Left);
        let right = key_held(Action::Right) || pointer_in(Zone::Right);
        let fire = key_held(Action::Fire) || pointer_in(Zone::Fire);

        self.intent.left = left;
        self.intent.right = right;
        self.intent.fire = fire;
    }
}
