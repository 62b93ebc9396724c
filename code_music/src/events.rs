// Musical event types: the vocabulary shared by the composer, the assembler
// and the MIDI writer.
//
// A conversion produces exactly three kinds of event: one `TempoMarker`, an
// ordered list of `NoteEvent`s for the melody, and an ordered list of
// `ChordEvent`s for the accompaniment. Events carry musical values only
// (pitch, note value, velocity, chord symbol). Tick positions are derived
// later by midi.rs, so the model stays independent of any one file format.
//
// All types are plain values with serde derives so a finished document can be
// dumped as JSON for inspection.

use serde::{Deserialize, Serialize};

/// Velocity for uppercase letters.
pub const VELOCITY_ACCENT: u8 = 100;
/// Velocity for lowercase letters.
pub const VELOCITY_NORMAL: u8 = 80;
/// Velocity for digits, punctuation and everything else.
pub const VELOCITY_SOFT: u8 = 60;

/// Rhythmic value of a melody note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NoteValue {
    Quarter,
    Eighth,
    Sixteenth,
}

impl NoteValue {
    /// Length in quarter notes (1.0 = one beat in 4/4).
    pub fn quarter_length(self) -> f64 {
        match self {
            NoteValue::Quarter => 1.0,
            NoteValue::Eighth => 0.5,
            NoteValue::Sixteenth => 0.25,
        }
    }

    /// Length in MIDI ticks at the given resolution.
    pub fn ticks(self, ticks_per_quarter: u32) -> u32 {
        match self {
            NoteValue::Quarter => ticks_per_quarter,
            NoteValue::Eighth => ticks_per_quarter / 2,
            NoteValue::Sixteenth => ticks_per_quarter / 4,
        }
    }
}

/// One melody note. Immutable once appended to the melody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEvent {
    /// MIDI-style pitch number. Not clamped: deep indentation can push it past
    /// 127, and the MIDI writer folds it back into range.
    pub pitch: i32,
    pub duration: NoteValue,
    pub velocity: u8,
}

/// Chord symbols of the accompaniment, in cycle order (I-IV-V-vi in C).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChordSymbol {
    C,
    F,
    G,
    Am,
}

impl ChordSymbol {
    /// The fixed progression the chord track cycles through.
    pub const CYCLE: [ChordSymbol; 4] = [
        ChordSymbol::C,
        ChordSymbol::F,
        ChordSymbol::G,
        ChordSymbol::Am,
    ];

    /// Chord at position `index` of the cycle, wrapping after the 4th.
    pub fn nth_in_cycle(index: usize) -> ChordSymbol {
        Self::CYCLE[index % Self::CYCLE.len()]
    }

    /// The symbol as written on a lead sheet.
    pub fn label(self) -> &'static str {
        match self {
            ChordSymbol::C => "C",
            ChordSymbol::F => "F",
            ChordSymbol::G => "G",
            ChordSymbol::Am => "Am",
        }
    }

    /// Root-position triad voiced around C3.
    pub fn triad(self) -> [u8; 3] {
        match self {
            ChordSymbol::C => [48, 52, 55],  // C3 E3 G3
            ChordSymbol::F => [53, 57, 60],  // F3 A3 C4
            ChordSymbol::G => [55, 59, 62],  // G3 B3 D4
            ChordSymbol::Am => [57, 60, 64], // A3 C4 E4
        }
    }
}

/// One accompaniment chord.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChordEvent {
    pub symbol: ChordSymbol,
}

/// Tempo of the whole piece, placed first in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempoMarker {
    /// Quarter notes per minute.
    pub bpm: u32,
}

impl TempoMarker {
    /// Microseconds per quarter note, as stored in an SMF tempo meta event.
    pub fn micros_per_quarter(self) -> u32 {
        60_000_000 / self.bpm.max(1)
    }
}

/// General MIDI instrument a track is voiced with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Instrument {
    Piano,
}

impl Instrument {
    /// General MIDI program number (0-based).
    pub fn program(self) -> u8 {
        match self {
            Instrument::Piano => 0, // Acoustic Grand Piano
        }
    }
}
