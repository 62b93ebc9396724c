// Document assembly and the top-level `convert` entry point.
//
// A `MusicDocument` is the finished, format-neutral piece: a tempo marker
// followed by the melody part and the chord part. Both parts start at time
// zero and advance independently; the only ordering guarantee is the event
// order inside each part. midi.rs decides how that becomes ticks.
//
// `convert` runs the whole pipeline for one validated `SourceText`:
// complexity -> pitch table -> composer -> assembler. Each call builds its
// own values and returns them; nothing outlives the call.

use serde::{Deserialize, Serialize};

use crate::complexity::ComplexityReport;
use crate::compose::compose;
use crate::error::ConvertError;
use crate::events::{ChordEvent, Instrument, NoteEvent, TempoMarker};
use crate::scale::build_scale;

/// Non-empty input text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceText(String);

impl SourceText {
    /// Wrap `text`, rejecting the zero-length string. Whitespace-only text is
    /// accepted and converts to a document with empty parts.
    pub fn new(text: impl Into<String>) -> Result<Self, ConvertError> {
        let text = text.into();
        if text.is_empty() {
            return Err(ConvertError::EmptyInput);
        }
        Ok(SourceText(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One instrument part: an ordered event list voiced by a single instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part<E> {
    pub name: String,
    pub instrument: Instrument,
    pub events: Vec<E>,
}

/// The assembled piece, ready for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MusicDocument {
    pub tempo: TempoMarker,
    pub melody: Part<NoteEvent>,
    pub chords: Part<ChordEvent>,
}

/// Combine a tempo marker and the two event sequences into a document. Both
/// parts are voiced with the piano.
pub fn assemble(
    tempo: TempoMarker,
    melody: Vec<NoteEvent>,
    chords: Vec<ChordEvent>,
) -> MusicDocument {
    MusicDocument {
        tempo,
        melody: Part {
            name: "Melody".to_string(),
            instrument: Instrument::Piano,
            events: melody,
        },
        chords: Part {
            name: "Chords".to_string(),
            instrument: Instrument::Piano,
            events: chords,
        },
    }
}

/// Convert source text into a music document.
pub fn convert(source: &SourceText) -> MusicDocument {
    let text = source.as_str();
    let report = ComplexityReport::analyze(text);
    let factor = report.factor();
    let scale = build_scale();
    let composition = compose(text, factor, &scale);

    log::debug!(
        "complexity {:?} -> factor {:.2}, tempo {} bpm, {} notes, {} chords",
        report,
        factor,
        composition.tempo.bpm,
        composition.melody.len(),
        composition.chords.len()
    );

    assemble(composition.tempo, composition.melody, composition.chords)
}
