//! Static keyboard layout: three octaves mapped onto the qwerty rows.
//!
//! The table is read-only at runtime; which keys are currently held lives
//! with the input router, not here.

/// One playable key: a note, its frequency, and the terminal character
/// that triggers it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyBinding {
    pub note: &'static str,
    pub freq: f32,
    pub key: char,
    pub is_white: bool,
}

const fn white(note: &'static str, freq: f32, key: char) -> KeyBinding {
    KeyBinding {
        note,
        freq,
        key,
        is_white: true,
    }
}

const fn black(note: &'static str, freq: f32, key: char) -> KeyBinding {
    KeyBinding {
        note,
        freq,
        key,
        is_white: false,
    }
}

/// Three octaves, C3 through B5, across the q/a/z rows.
pub const KEY_BINDINGS: [KeyBinding; 36] = [
    // octave 1
    white("C", 130.81, 'q'),
    black("C#", 138.59, 'w'),
    white("D", 146.83, 'e'),
    black("D#", 155.56, 'r'),
    white("E", 164.81, 't'),
    white("F", 174.61, 'y'),
    black("F#", 185.00, 'u'),
    white("G", 196.00, 'i'),
    black("G#", 207.65, 'o'),
    white("A", 220.00, 'p'),
    black("A#", 233.08, '['),
    white("B", 246.94, ']'),
    // octave 2
    white("C", 261.63, 'a'),
    black("C#", 277.18, 's'),
    white("D", 293.66, 'd'),
    black("D#", 311.13, 'f'),
    white("E", 329.63, 'g'),
    white("F", 349.23, 'h'),
    black("F#", 369.99, 'j'),
    white("G", 392.00, 'k'),
    black("G#", 415.30, 'l'),
    white("A", 440.00, ';'),
    black("A#", 466.16, '\''),
    white("B", 493.88, '\\'),
    // octave 3
    white("C", 523.25, 'z'),
    black("C#", 554.37, 'x'),
    white("D", 587.33, 'c'),
    black("D#", 622.25, 'v'),
    white("E", 659.25, 'b'),
    white("F", 698.46, 'n'),
    black("F#", 739.99, 'm'),
    white("G", 783.99, ','),
    black("G#", 830.61, '.'),
    white("A", 880.00, '/'),
    black("A#", 932.33, '-'),
    white("B", 987.77, '='),
];

/// Look up the binding for a terminal character, if any.
pub fn binding_for(key: char) -> Option<&'static KeyBinding> {
    KEY_BINDINGS.iter().find(|b| b.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_full_octaves() {
        assert_eq!(KEY_BINDINGS.len(), 36);
        let whites = KEY_BINDINGS.iter().filter(|b| b.is_white).count();
        assert_eq!(whites, 21); // 7 white keys per octave
    }

    #[test]
    fn input_characters_are_unique() {
        for (i, a) in KEY_BINDINGS.iter().enumerate() {
            for b in &KEY_BINDINGS[i + 1..] {
                assert_ne!(a.key, b.key, "duplicate binding for '{}'", a.key);
            }
        }
    }

    #[test]
    fn concert_a_is_bound() {
        let binding = binding_for(';').expect("A4 binding");
        assert_eq!(binding.note, "A");
        assert_eq!(binding.freq, 440.0);
        assert!(binding.is_white);
    }

    #[test]
    fn unbound_characters_return_none() {
        assert!(binding_for('1').is_none());
        assert!(binding_for(' ').is_none());
    }

    #[test]
    fn frequencies_ascend() {
        for pair in KEY_BINDINGS.windows(2) {
            assert!(pair[0].freq < pair[1].freq);
        }
    }
}
