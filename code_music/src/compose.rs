// Text-to-event mapping: turns source text into melody notes and chords.
//
// The walk is line by line, then character by character:
//
// - Lines that are blank after trimming are skipped outright. They emit
//   nothing and do not advance the note counter.
// - "Whitespace" is `is_space`: Unicode White_Space plus U+001C..U+001F.
// - Each leading whitespace character counts toward indentation; every four
//   of them raise the whole line by one octave.
// - Whitespace inside a line is skipped. Every other character becomes one
//   note: its code point modulo 7 picks a degree of the pitch table, and its
//   class (uppercase, lowercase, digit, other) picks velocity and note value.
// - A note counter runs across the whole document. Whenever it is a multiple
//   of four before a character is consumed, the next chord of the C-F-G-Am
//   cycle is appended. The chord track is therefore one chord per four
//   melody notes, rounded up.
//
// Both counters live in `compose` as locals; nothing is shared between
// calls. The only input from the complexity analysis is the tempo.

use serde::{Deserialize, Serialize};

use crate::events::{
    ChordEvent, ChordSymbol, NoteEvent, NoteValue, TempoMarker, VELOCITY_ACCENT, VELOCITY_NORMAL,
    VELOCITY_SOFT,
};
use crate::scale::PitchTable;

/// Tempo at complexity factor 1.0.
pub const BASE_TEMPO_BPM: f64 = 80.0;

/// Melody notes per accompaniment chord.
pub const NOTES_PER_CHORD: usize = 4;

/// Leading whitespace characters per octave of upward shift.
pub const INDENT_PER_OCTAVE: usize = 4;

/// Output of the composer before it is wrapped into a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub tempo: TempoMarker,
    pub melody: Vec<NoteEvent>,
    pub chords: Vec<ChordEvent>,
}

/// How a character is voiced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Upper,
    Lower,
    Digit,
    /// Punctuation, symbols, control characters, uncased letters and
    /// non-ASCII digits such as '½' or '٣'.
    Other,
}

impl CharClass {
    pub fn of(c: char) -> Self {
        if c.is_uppercase() {
            CharClass::Upper
        } else if c.is_lowercase() {
            CharClass::Lower
        } else if c.is_ascii_digit() {
            CharClass::Digit
        } else {
            CharClass::Other
        }
    }

    pub fn velocity(self) -> u8 {
        match self {
            CharClass::Upper => VELOCITY_ACCENT,
            CharClass::Lower => VELOCITY_NORMAL,
            CharClass::Digit | CharClass::Other => VELOCITY_SOFT,
        }
    }

    pub fn note_value(self) -> NoteValue {
        match self {
            CharClass::Upper => NoteValue::Quarter,
            CharClass::Digit => NoteValue::Sixteenth,
            CharClass::Lower | CharClass::Other => NoteValue::Eighth,
        }
    }
}

/// Tempo for a complexity factor: round(80 × factor).
pub fn tempo_for(complexity: f64) -> TempoMarker {
    TempoMarker {
        bpm: (BASE_TEMPO_BPM * complexity).round() as u32,
    }
}

/// Whitespace as far as the walk is concerned: Unicode White_Space plus the
/// information separators U+001C..U+001F, which also act as line and field
/// breaks.
pub fn is_space(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Octaves a line is shifted up by its indentation.
pub fn octave_shift(line: &str) -> usize {
    line.chars().take_while(|&c| is_space(c)).count() / INDENT_PER_OCTAVE
}

/// The note a single character produces on a line shifted by `octave_shift`.
pub fn note_for_char(c: char, octave_shift: usize, scale: &PitchTable) -> NoteEvent {
    let class = CharClass::of(c);
    let offset = i32::try_from(octave_shift.saturating_mul(12)).unwrap_or(i32::MAX);
    NoteEvent {
        pitch: i32::from(scale.pitch_for(c)).saturating_add(offset),
        duration: class.note_value(),
        velocity: class.velocity(),
    }
}

/// Walk `text` and produce the tempo, melody and chord sequences.
pub fn compose(text: &str, complexity: f64, scale: &PitchTable) -> Composition {
    let tempo = tempo_for(complexity);
    let mut melody = Vec::new();
    let mut chords = Vec::new();

    // Notes emitted so far, across all lines.
    let mut note_counter: usize = 0;
    // Position in the chord cycle.
    let mut chord_index: usize = 0;

    for line in text.split('\n') {
        if line.chars().all(is_space) {
            continue;
        }

        let shift = octave_shift(line);

        for c in line.chars().filter(|&c| !is_space(c)) {
            melody.push(note_for_char(c, shift, scale));

            if note_counter % NOTES_PER_CHORD == 0 {
                chords.push(ChordEvent {
                    symbol: ChordSymbol::nth_in_cycle(chord_index),
                });
                chord_index += 1;
            }

            note_counter += 1;
        }
    }

    Composition {
        tempo,
        melody,
        chords,
    }
}
