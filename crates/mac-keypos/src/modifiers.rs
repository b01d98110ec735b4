//! Raw `CGEventFlags` bit handling for the switch modifier.
//!
//! CoreGraphics reports both Command keys under the single generic
//! `kCGEventFlagMaskCommand` bit. The left/right distinction only exists in
//! the device-dependent low bits (the `NX_DEVICE*KEYMASK` constants from
//! IOKit's `IOLLEvent.h`), which are populated for events coming from the
//! HID system.

/// Generic Command mask (`kCGEventFlagMaskCommand`). Set while either
/// Command key is held.
pub const MASK_COMMAND: u64 = 1 << 20;

/// Device-dependent bit for the left Command key (`NX_DEVICELCMDKEYMASK`).
pub const DEVICE_LEFT_COMMAND: u64 = 0x0000_0008;

/// Device-dependent bit for the right Command key (`NX_DEVICERCMDKEYMASK`).
pub const DEVICE_RIGHT_COMMAND: u64 = 0x0000_0010;

/// Returns true when the right Command key is held, judged from raw event
/// flag bits.
///
/// The right key counts as held iff its device bit is set together with the
/// generic Command bit. The generic bit alone (or the left device bit alone)
/// never qualifies, so ordinary left-⌘ shortcuts are unaffected. Detection is
/// bit presence, not exclusivity: with both Command keys down the right bit
/// is still set and the answer is true.
pub const fn right_command_held(flags: u64) -> bool {
    flags & DEVICE_RIGHT_COMMAND != 0 && flags & MASK_COMMAND != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_command_only_is_not_held() {
        assert!(!right_command_held(MASK_COMMAND | DEVICE_LEFT_COMMAND));
    }

    #[test]
    fn right_command_is_held() {
        assert!(right_command_held(MASK_COMMAND | DEVICE_RIGHT_COMMAND));
    }

    #[test]
    fn both_device_bits_behave_as_right_held() {
        assert!(right_command_held(
            MASK_COMMAND | DEVICE_LEFT_COMMAND | DEVICE_RIGHT_COMMAND
        ));
    }

    #[test]
    fn no_flags_is_not_held() {
        assert!(!right_command_held(0));
    }

    #[test]
    fn device_bit_without_generic_bit_is_not_held() {
        // A release event can clear the generic bit while stale device bits
        // linger in synthetic flag words; the generic bit gates the answer.
        assert!(!right_command_held(DEVICE_RIGHT_COMMAND));
    }

    #[test]
    fn unrelated_modifiers_do_not_qualify() {
        // Shift (1 << 17) plus its device bits.
        assert!(!right_command_held((1 << 17) | 0x0000_0002));
    }
}
