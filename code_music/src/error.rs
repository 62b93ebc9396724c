// Error types for the conversion pipeline.
//
// The composer itself is total: every string maps to a document. Errors only
// arise at the edges, when input is validated (`SourceText::new`) and when a
// finished document is serialized or written to disk (`midi.rs`).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// Zero-length input. Rejected before any analysis runs.
    #[error("No code provided")]
    EmptyInput,
    /// The SMF writer failed while encoding the document.
    #[error("failed to serialize MIDI: {0}")]
    Midi(#[source] std::io::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
