// The pitch table: one octave of C major that characters are mapped onto.
//
// Every character picks a scale degree by its code point modulo 7, so the
// table has exactly seven entries and never changes between conversions.
// Octave displacement for indented lines is applied by compose.rs on top of
// the value looked up here.

use serde::{Deserialize, Serialize};

/// Semitone offsets of the major scale degrees from the tonic.
pub const MAJOR_INTERVALS: [u8; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Tonic of the pitch table: middle C.
pub const REFERENCE_PITCH: u8 = 60;

const PITCH_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

/// Seven ascending MIDI pitches, one per scale degree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchTable {
    pitches: [u8; 7],
}

impl PitchTable {
    /// A major scale starting on `tonic`.
    pub fn major(tonic: u8) -> Self {
        PitchTable {
            pitches: MAJOR_INTERVALS.map(|iv| tonic.saturating_add(iv)),
        }
    }

    pub fn pitches(&self) -> &[u8; 7] {
        &self.pitches
    }

    /// Scale degree (0-6) selected by a character's code point.
    pub fn degree_of(c: char) -> usize {
        (u32::from(c) % 7) as usize
    }

    /// Pitch for a character, before any octave shift.
    pub fn pitch_for(&self, c: char) -> u8 {
        self.pitches[Self::degree_of(c)]
    }
}

/// Build the fixed C4 major pitch table.
pub fn build_scale() -> PitchTable {
    PitchTable::major(REFERENCE_PITCH)
}

/// Scientific pitch name, e.g. 60 -> "C4". Accepts out-of-range values so
/// unfolded melody pitches can still be displayed.
pub fn pitch_name(pitch: i32) -> String {
    let pc = pitch.rem_euclid(12) as usize;
    let octave = pitch.div_euclid(12) - 1;
    format!("{}{}", PITCH_NAMES[pc], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_c_major_table() {
        let scale = build_scale();
        // C4 D4 E4 F4 G4 A4 B4
        assert_eq!(scale.pitches(), &[60, 62, 64, 65, 67, 69, 71]);
    }

    #[test]
    fn test_degree_from_code_point() {
        // 'x' = 120, 120 % 7 = 1
        assert_eq!(PitchTable::degree_of('x'), 1);
        assert_eq!(build_scale().pitch_for('x'), 62);
        // '#' = 35, 35 % 7 = 0
        assert_eq!(build_scale().pitch_for('#'), 60);
        // Non-ASCII code points index the same table.
        assert_eq!(PitchTable::degree_of('é'), 233 % 7);
    }

    #[test]
    fn test_every_degree_reachable() {
        let scale = build_scale();
        let mut seen: Vec<u8> = ('a'..='g').map(|c| scale.pitch_for(c)).collect();
        seen.sort_unstable();
        assert_eq!(seen.as_slice(), scale.pitches());
    }

    #[test]
    fn test_pitch_name() {
        assert_eq!(pitch_name(60), "C4");
        assert_eq!(pitch_name(69), "A4");
        assert_eq!(pitch_name(72), "C5");
        assert_eq!(pitch_name(-1), "B-1");
    }
}
