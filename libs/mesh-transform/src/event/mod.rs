//! # Events
//!
//! Input delivered to a running transform operation. Raw keys are first
//! translated through a [`Keymap`] into [`ModalEvent`]s; keys the keymap does
//! not bind are handled directly by the operation or the active mode.

use crate::snap::SnapTarget;
use glam::DVec2;

// =============================================================================
// RAW INPUT
// =============================================================================

/// Keys and buttons the operation reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Grab
    G,
    /// Rotate
    R,
    /// Scale
    S,
    /// X axis
    X,
    /// Y axis
    Y,
    /// Z axis
    Z,
    /// Clamp toggle
    C,
    /// Even toggle
    E,
    /// Flip toggle
    F,
    /// Proportional falloff
    O,
    /// Digit `0..=9`
    Digit(u8),
    /// Decimal point
    Period,
    /// Sign toggle
    Minus,
    /// Erase one typed character
    Backspace,
    /// Next numeric axis
    Tab,
    /// Escape
    Esc,
    /// Return
    Return,
    /// Numpad enter
    PadEnter,
    /// Space bar
    Space,
    /// Left mouse button
    LeftMouse,
    /// Middle mouse button
    MiddleMouse,
    /// Right mouse button
    RightMouse,
    /// Wheel up
    WheelUp,
    /// Wheel down
    WheelDown,
    /// Numpad plus
    PadPlus,
    /// Numpad minus
    PadMinus,
    /// Shift modifier
    Shift,
    /// Control modifier
    Ctrl,
    /// Alt modifier
    Alt,
    /// Arrow up
    Up,
    /// Arrow down
    Down,
    /// Page up
    PageUp,
    /// Page down
    PageDown,
}

/// Press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyState {
    /// Key went down
    Press,
    /// Key went up
    Release,
}

/// Modifier keys held while a key event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    /// Shift held
    pub shift: bool,
    /// Control held
    pub ctrl: bool,
    /// Alt held
    pub alt: bool,
}

impl Modifiers {
    /// No modifier.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    /// Shift only.
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };

    /// Alt only.
    pub const ALT: Self = Self {
        shift: false,
        ctrl: false,
        alt: true,
    };
}

// =============================================================================
// MODAL EVENTS
// =============================================================================

/// Semantic events produced by the keymap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ModalEvent {
    /// Abort and restore
    Cancel,
    /// Keep the result
    Confirm,
    /// Switch to translate
    Translate,
    /// Switch to rotate
    Rotate,
    /// Switch to resize
    Resize,
    /// Invert snapping while held
    SnapInvOn,
    /// Release the snapping inversion
    SnapInvOff,
    /// Toggle snapping
    SnapToggle,
    /// Constrain to X
    AxisX,
    /// Constrain to Y
    AxisY,
    /// Constrain to Z
    AxisZ,
    /// Constrain to the plane locking X
    PlaneX,
    /// Constrain to the plane locking Y
    PlaneY,
    /// Constrain to the plane locking Z
    PlaneZ,
    /// Drop the constraint
    ConsOff,
    /// Grow the proportional radius
    PropSizeUp,
    /// Shrink the proportional radius
    PropSizeDown,
    /// Scale the proportional radius by vertical pan pixels
    PropSize(f64),
}

/// Everything a running operation consumes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Mouse moved to a window position
    MouseMove(DVec2),
    /// Raw key or button
    Key {
        /// Key or button
        key: Key,
        /// Press or release
        state: KeyState,
        /// Modifiers held
        modifiers: Modifiers,
    },
    /// Pre-translated modal event
    Modal(ModalEvent),
    /// Host snapping query result for the current mouse position
    SnapTarget(Option<SnapTarget>),
}

impl Event {
    /// Key press without modifiers.
    pub fn press(key: Key) -> Self {
        Event::Key {
            key,
            state: KeyState::Press,
            modifiers: Modifiers::NONE,
        }
    }

    /// Key press with modifiers.
    pub fn press_with(key: Key, modifiers: Modifiers) -> Self {
        Event::Key {
            key,
            state: KeyState::Press,
            modifiers,
        }
    }

    /// Key release.
    pub fn release(key: Key) -> Self {
        Event::Key {
            key,
            state: KeyState::Release,
            modifiers: Modifiers::NONE,
        }
    }
}

// =============================================================================
// KEYMAP
// =============================================================================

/// One keymap binding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Binding {
    /// Bound key
    pub key: Key,
    /// Bound transition
    pub state: KeyState,
    /// Required modifiers; `None` matches any
    pub modifiers: Option<Modifiers>,
    /// Produced event
    pub event: ModalEvent,
}

/// Raw key to modal event translation table.
#[derive(Debug, Clone, PartialEq)]
pub struct Keymap {
    /// Bindings in lookup order
    pub bindings: Vec<Binding>,
}

impl Keymap {
    /// Empty keymap; every key reaches the raw handlers.
    pub fn empty() -> Self {
        Self { bindings: Vec::new() }
    }

    /// Adds a binding, keeping earlier bindings first in lookup order.
    pub fn bind(mut self, key: Key, state: KeyState, modifiers: Option<Modifiers>, event: ModalEvent) -> Self {
        self.bindings.push(Binding {
            key,
            state,
            modifiers,
            event,
        });
        self
    }

    /// Translates a raw key; `None` means the key stays raw.
    pub fn lookup(&self, key: Key, state: KeyState, modifiers: Modifiers) -> Option<ModalEvent> {
        self.bindings
            .iter()
            .find(|b| b.key == key && b.state == state && b.modifiers.map_or(true, |m| m == modifiers))
            .map(|b| b.event)
    }
}

impl Default for Keymap {
    fn default() -> Self {
        use KeyState::{Press, Release};
        let plain = Some(Modifiers::NONE);
        let shift = Some(Modifiers::SHIFT);
        Self::empty()
            .bind(Key::Esc, Press, None, ModalEvent::Cancel)
            .bind(Key::Return, Press, None, ModalEvent::Confirm)
            .bind(Key::PadEnter, Press, None, ModalEvent::Confirm)
            .bind(Key::G, Press, plain, ModalEvent::Translate)
            .bind(Key::R, Press, plain, ModalEvent::Rotate)
            .bind(Key::S, Press, plain, ModalEvent::Resize)
            .bind(Key::X, Press, plain, ModalEvent::AxisX)
            .bind(Key::Y, Press, plain, ModalEvent::AxisY)
            .bind(Key::Z, Press, plain, ModalEvent::AxisZ)
            .bind(Key::X, Press, shift, ModalEvent::PlaneX)
            .bind(Key::Y, Press, shift, ModalEvent::PlaneY)
            .bind(Key::Z, Press, shift, ModalEvent::PlaneZ)
            .bind(Key::Ctrl, Press, None, ModalEvent::SnapInvOn)
            .bind(Key::Ctrl, Release, None, ModalEvent::SnapInvOff)
            .bind(Key::PageUp, Press, None, ModalEvent::PropSizeUp)
            .bind(Key::PageDown, Press, None, ModalEvent::PropSizeDown)
    }
}
