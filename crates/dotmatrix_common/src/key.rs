use serde::{Deserialize, Serialize};

/// Host keyboard keys a frontend forwards to an emulator.
///
/// Only the keys the default bindings use are listed; anything else maps
/// to `None`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Z,
    X,
    A,
    S,
    Enter,
    Backspace,
    None,
}
