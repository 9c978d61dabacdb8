use std::path::PathBuf;

use crate::foundation::core::{IPoint, ISize, Point};

bitflags::bitflags! {
    /// Event capabilities a node can declare.
    ///
    /// Each flag selects one per-group registry. Combine with bitwise OR:
    /// `Capabilities::UPDATE | Capabilities::MOUSE_BUTTON_DOWN`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u16 {
        /// A file was dropped on the window.
        const DROP_FILE = 1 << 0;
        /// The viewport changed size.
        const RESIZE = 1 << 1;
        /// Per-frame update tick.
        const UPDATE = 1 << 2;
        /// The window moved on screen.
        const WINDOW_MOVE = 1 << 3;
        /// A key was pressed.
        const KEY_DOWN = 1 << 4;
        /// A key was released.
        const KEY_UP = 1 << 5;
        /// The pointer moved.
        const MOUSE_MOVE = 1 << 6;
        /// A mouse button was pressed.
        const MOUSE_BUTTON_DOWN = 1 << 7;
        /// A mouse button was released.
        const MOUSE_BUTTON_UP = 1 << 8;
        /// The window is closing.
        const WINDOW_QUIT = 1 << 9;
        /// The window was maximized.
        const WINDOW_MAXIMIZE = 1 << 10;
        /// The window was minimized.
        const WINDOW_MINIMIZE = 1 << 11;
        /// The window was restored.
        const WINDOW_RESTORE = 1 << 12;
    }
}

impl Capabilities {
    /// Number of distinct capabilities (one registry each).
    pub const COUNT: usize = 13;

    /// Registry slot of a single-flag value; `None` for empty or combined values.
    pub(crate) fn slot(self) -> Option<usize> {
        if self.bits().count_ones() != 1 {
            return None;
        }
        Some(self.bits().trailing_zeros() as usize)
    }
}

/// Keyboard key, as reported by the platform layer.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct KeyCode(pub u32);

/// Mouse button identifiers.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    /// Primary button.
    Left,
    /// Wheel button.
    Middle,
    /// Secondary button.
    Right,
    /// Any further button, by platform index.
    Other(u8),
}

/// Input and window lifecycle events delivered through the router.
///
/// The per-frame update is not an event: it is delivered through
/// [`Behavior::on_update`](crate::Behavior::on_update) to members of the
/// [`Capabilities::UPDATE`] registry.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// A file was dropped on the window.
    DropFile {
        /// Path of the dropped file.
        path: PathBuf,
    },
    /// The viewport changed size; `scale` is the recomputed appropriate scale.
    Resize {
        /// New viewport size.
        size: ISize,
        /// New appropriate scale.
        scale: f64,
    },
    /// The window moved.
    WindowMove {
        /// New window position on the desktop.
        position: IPoint,
    },
    /// A key was pressed.
    KeyDown {
        /// Key identifier.
        key: KeyCode,
    },
    /// A key was released.
    KeyUp {
        /// Key identifier.
        key: KeyCode,
    },
    /// The pointer moved.
    MouseMove {
        /// Pointer position in viewport pixels.
        position: Point,
    },
    /// A mouse button was pressed.
    MouseButtonDown {
        /// Button pressed.
        button: MouseButton,
        /// Pointer position in viewport pixels.
        position: Point,
    },
    /// A mouse button was released.
    MouseButtonUp {
        /// Button released.
        button: MouseButton,
        /// Pointer position in viewport pixels.
        position: Point,
    },
    /// The window is closing.
    WindowQuit,
    /// The window was maximized.
    WindowMaximize,
    /// The window was minimized.
    WindowMinimize,
    /// The window was restored.
    WindowRestore,
}

impl Event {
    /// Capability whose registry receives this event.
    pub fn capability(&self) -> Capabilities {
        match self {
            Self::DropFile { .. } => Capabilities::DROP_FILE,
            Self::Resize { .. } => Capabilities::RESIZE,
            Self::WindowMove { .. } => Capabilities::WINDOW_MOVE,
            Self::KeyDown { .. } => Capabilities::KEY_DOWN,
            Self::KeyUp { .. } => Capabilities::KEY_UP,
            Self::MouseMove { .. } => Capabilities::MOUSE_MOVE,
            Self::MouseButtonDown { .. } => Capabilities::MOUSE_BUTTON_DOWN,
            Self::MouseButtonUp { .. } => Capabilities::MOUSE_BUTTON_UP,
            Self::WindowQuit => Capabilities::WINDOW_QUIT,
            Self::WindowMaximize => Capabilities::WINDOW_MAXIMIZE,
            Self::WindowMinimize => Capabilities::WINDOW_MINIMIZE,
            Self::WindowRestore => Capabilities::WINDOW_RESTORE,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/events/capability.rs"]
mod tests;
