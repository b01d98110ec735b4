use std::fmt;

use crate::Scancode;

// Central mapping between variants, hardware keycodes, and trigger symbols.
// The keycode values are the `kVK_ANSI_*` constants from HIToolbox
// `Events.h`; they are positional and do not follow alphabetical order.
macro_rules! keypos_map {
    ($m:ident) => {
        $m! {
            A => 0x00, 'a',
            B => 0x0B, 'b',
            C => 0x08, 'c',
            D => 0x02, 'd',
            E => 0x0E, 'e',
            F => 0x03, 'f',
            G => 0x05, 'g',
            H => 0x04, 'h',
            I => 0x22, 'i',
            J => 0x26, 'j',
            K => 0x28, 'k',
            L => 0x25, 'l',
            M => 0x2E, 'm',
            N => 0x2D, 'n',
            O => 0x1F, 'o',
            P => 0x23, 'p',
            Q => 0x0C, 'q',
            R => 0x0F, 'r',
            S => 0x01, 's',
            T => 0x11, 't',
            U => 0x20, 'u',
            V => 0x09, 'v',
            W => 0x0D, 'w',
            X => 0x07, 'x',
            Y => 0x10, 'y',
            Z => 0x06, 'z',
            Digit0 => 0x1D, '0',
            Digit1 => 0x12, '1',
            Digit2 => 0x13, '2',
            Digit3 => 0x14, '3',
            Digit4 => 0x15, '4',
            Digit5 => 0x17, '5',
            Digit6 => 0x16, '6',
            Digit7 => 0x1A, '7',
            Digit8 => 0x1C, '8',
            Digit9 => 0x19, '9',
        }
    };
}

macro_rules! define_keypos {
    ( $( $name:ident => $code:literal, $ch:literal, )* ) => {
        /// A layout-independent position of a physical key usable as a switch
        /// trigger.
        ///
        /// Variants are assigned their exact macOS hardware virtual keycode
        /// (`kVK_ANSI_*`), so `KeyPos as u16` is the scancode.
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
        #[repr(u16)]
        pub enum KeyPos {
            $(
                #[allow(missing_docs, reason = "variant names are self-describing")]
                $name = $code,
            )*
        }

        impl KeyPos {
            /// All 36 key positions, in symbol order (A-Z then 0-9).
            pub const ALL: [Self; 36] = [ $( Self::$name, )* ];

            /// Looks up a `KeyPos` from a macOS hardware virtual keycode.
            ///
            /// Returns `None` for every keycode outside the 36 trigger
            /// symbols (punctuation, function keys, modifiers, ...).
            pub const fn from_scancode(sc: Scancode) -> Option<Self> {
                match sc {
                    $( $code => Some(Self::$name), )*
                    _ => None,
                }
            }

            /// The trigger symbol for this position: a lowercase letter or a
            /// digit.
            pub const fn to_char(self) -> char {
                match self {
                    $( Self::$name => $ch, )*
                }
            }

            /// Looks up the position for a trigger symbol. Letters are
            /// accepted in either case; anything outside A-Z / 0-9 is `None`.
            pub const fn from_char(c: char) -> Option<Self> {
                match c.to_ascii_lowercase() {
                    $( $ch => Some(Self::$name), )*
                    _ => None,
                }
            }
        }
    };
}

keypos_map!(define_keypos);

impl KeyPos {
    /// Returns the hardware virtual keycode (`kVK_ANSI_*`) for this position.
    pub const fn scancode(self) -> Scancode {
        self as u16
    }
}

impl TryFrom<Scancode> for KeyPos {
    type Error = ();
    fn try_from(value: Scancode) -> Result<Self, Self::Error> {
        Self::from_scancode(value).ok_or(())
    }
}

impl From<KeyPos> for Scancode {
    fn from(k: KeyPos) -> Self {
        k as u16
    }
}

impl fmt::Display for KeyPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn table_is_a_bijection() {
        assert_eq!(KeyPos::ALL.len(), 36);
        let mut codes = HashSet::new();
        let mut chars = HashSet::new();
        for k in KeyPos::ALL {
            assert!(codes.insert(k.scancode()), "duplicate scancode for {k:?}");
            assert!(chars.insert(k.to_char()), "duplicate symbol for {k:?}");
            assert_eq!(KeyPos::from_scancode(k.scancode()), Some(k));
            assert_eq!(KeyPos::from_char(k.to_char()), Some(k));
        }
    }

    #[test]
    fn spot_check_ansi_codes() {
        // kVK_ANSI_* values are positional; spot-check a few well-known ones.
        assert_eq!(KeyPos::A.scancode(), 0x00);
        assert_eq!(KeyPos::C.scancode(), 0x08);
        assert_eq!(KeyPos::M.scancode(), 0x2E);
        assert_eq!(KeyPos::Digit0.scancode(), 0x1D);
        assert_eq!(KeyPos::Digit1.scancode(), 0x12);
        assert_eq!(KeyPos::try_from(0x28u16).ok(), Some(KeyPos::K));
    }

    #[test]
    fn from_char_accepts_either_case() {
        assert_eq!(KeyPos::from_char('q'), Some(KeyPos::Q));
        assert_eq!(KeyPos::from_char('Q'), Some(KeyPos::Q));
        assert_eq!(KeyPos::from_char('7'), Some(KeyPos::Digit7));
        assert_eq!(KeyPos::from_char(';'), None);
        assert_eq!(KeyPos::from_char(' '), None);
    }

    #[test]
    fn non_trigger_scancodes_are_rejected() {
        // Space, Return, and the left Command key are real keycodes but not
        // trigger symbols.
        for sc in [0x31u16, 0x24, 0x37, 0xFFFF] {
            assert_eq!(KeyPos::from_scancode(sc), None);
        }
    }

    #[test]
    fn display_matches_symbol() {
        assert_eq!(KeyPos::G.to_string(), "g");
        assert_eq!(KeyPos::Digit4.to_string(), "4");
    }
}
