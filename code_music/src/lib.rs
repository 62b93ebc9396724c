// Code Music: turns source code into a short piece of music.
//
// The mapping is fixed and deterministic. The same text always yields the
// same events and the same MIDI bytes. Structural patterns in the code set
// the tempo; each non-whitespace character becomes a melody note whose pitch
// comes from its code point and whose dynamics come from its case;
// indentation lifts whole lines by octaves; a I-IV-V-vi chord cycle
// advances once every four notes.
//
// Architecture:
// - complexity.rs: Regex pattern counts -> complexity factor in [0.5, 2.0]
// - scale.rs: The fixed C major pitch table characters are mapped onto
// - events.rs: Note, chord, tempo and instrument value types
// - compose.rs: The character walk producing tempo, melody and chords
// - document.rs: SourceText validation, document assembly, `convert`
// - midi.rs: SMF output via `midly`
// - filename.rs: Slugified download filenames
// - error.rs: `ConvertError`
//
// The HTTP front end lives in the `code_music_server` crate; the `code2midi`
// binary (main.rs) is the command-line front end.

pub mod complexity;
pub mod compose;
pub mod document;
pub mod error;
pub mod events;
pub mod filename;
pub mod midi;
pub mod scale;

pub use document::{MusicDocument, SourceText, assemble, convert};
pub use error::ConvertError;
