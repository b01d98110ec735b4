//! mac-keypos: Key positions and modifier flags for macOS.
//!
//! - [`KeyPos`]: the 36 layout-independent key positions usable as switch
//!   triggers (letters A-Z and digits 0-9), carrying their exact hardware
//!   virtual keycodes.
//! - [`modifiers`]: raw `CGEventFlags` bit handling, including the
//!   device-dependent bits that distinguish the left and right Command keys.
//!
//! A key position identifies a physical key, not a character: the values are
//! the macOS `kVK_ANSI_*` constants reported by `NSEvent.keyCode` and by
//! CoreGraphics in the `kCGKeyboardEventKeycode` field. They are specific to
//! macOS (not USB HID usages, not Windows scan codes, not Unicode).

mod key;
pub use key::KeyPos;

pub mod modifiers;

/// macOS hardware virtual keycode (`kVK_*`, `NSEvent.keyCode`).
pub type Scancode = u16;
