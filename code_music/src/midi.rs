// MIDI output from music documents.
//
// Converts a MusicDocument into a Standard MIDI File (SMF Format 1, one
// track per part) for playback. Uses the `midly` crate for MIDI writing.
//
// Track layout:
// - Track 0: tempo + 4/4 time signature.
// - Track 1: melody on channel 0. Notes play back to back, each for its own
//   note value.
// - Track 2: chords on channel 1. Each chord is a root-position triad held
//   for a half note, back to back from tick 0.
//
// The two parts are not aligned to each other beyond sharing tick 0. A half
// note per chord is the nominal length of four eighth-note melody characters,
// so the parts line up for all-lowercase text and drift apart otherwise.
//
// Melody pitches above 127 (heavily indented lines) are folded down by
// octaves into the MIDI range.

use crate::document::{MusicDocument, Part};
use crate::error::ConvertError;
use crate::events::{ChordEvent, NoteEvent};
use midly::{
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind,
    num::{u4, u7, u15, u24, u28},
};
use std::path::Path;

/// Ticks per quarter note in MIDI output.
pub const TICKS_PER_QUARTER: u16 = 480;

/// How long each chord of the accompaniment is held.
pub const CHORD_TICKS: u32 = TICKS_PER_QUARTER as u32 * 2;

/// Velocity for accompaniment chords.
const CHORD_VELOCITY: u8 = 64;

const MELODY_CHANNEL: u8 = 0;
const CHORD_CHANNEL: u8 = 1;

/// Serialize a document to SMF bytes.
pub fn to_midi_bytes(doc: &MusicDocument) -> Result<Vec<u8>, ConvertError> {
    let smf = document_to_smf(doc);
    let mut buf = Vec::new();
    smf.write_std(&mut buf).map_err(ConvertError::Midi)?;
    Ok(buf)
}

/// Serialize a document and write it to a file.
pub fn write_midi(doc: &MusicDocument, path: &Path) -> Result<(), ConvertError> {
    let buf = to_midi_bytes(doc)?;
    std::fs::write(path, &buf)?;
    log::info!("wrote {} bytes of MIDI to {}", buf.len(), path.display());
    Ok(())
}

/// Fold a pitch into 0..=127 by whole octaves, keeping its pitch class.
pub fn fold_pitch(pitch: i32) -> u8 {
    let mut p = pitch;
    if p > 127 {
        p -= (p - 127 + 11) / 12 * 12;
    }
    if p < 0 {
        p += (-p + 11) / 12 * 12;
    }
    p as u8
}

/// Convert a document to an in-memory SMF.
fn document_to_smf(doc: &MusicDocument) -> Smf<'_> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    // Track 0: tempo track
    let mut tempo_track: Track<'_> = Vec::new();
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::new(
            doc.tempo.micros_per_quarter(),
        ))),
    });
    tempo_track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::TimeSignature(4, 2, 24, 8)),
    });
    tempo_track.push(end_of_track());
    smf.tracks.push(tempo_track);

    smf.tracks.push(melody_track(&doc.melody));
    smf.tracks.push(chord_track(&doc.chords));

    smf
}

/// Track name and program change that open every part.
fn part_header<'a, E>(part: &'a Part<E>, channel: u4) -> Track<'a> {
    vec![
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::TrackName(part.name.as_bytes())),
        },
        TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(part.instrument.program()),
                },
            },
        },
    ]
}

fn melody_track(part: &Part<NoteEvent>) -> Track<'_> {
    let channel = u4::new(MELODY_CHANNEL);
    let mut track = part_header(part, channel);

    for note in &part.events {
        let key = u7::new(fold_pitch(note.pitch));
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOn {
                    key,
                    vel: u7::new(note.velocity.min(127)),
                },
            },
        });
        track.push(TrackEvent {
            delta: u28::new(note.duration.ticks(u32::from(TICKS_PER_QUARTER))),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::NoteOff {
                    key,
                    vel: u7::new(0),
                },
            },
        });
    }

    track.push(end_of_track());
    track
}

fn chord_track(part: &Part<ChordEvent>) -> Track<'_> {
    let channel = u4::new(CHORD_CHANNEL);
    let mut track = part_header(part, channel);

    for chord in &part.events {
        let triad = chord.symbol.triad();
        for &pitch in &triad {
            track.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn {
                        key: u7::new(pitch),
                        vel: u7::new(CHORD_VELOCITY),
                    },
                },
            });
        }
        for (i, &pitch) in triad.iter().enumerate() {
            // The first release carries the whole hold time.
            let delta = if i == 0 { CHORD_TICKS } else { 0 };
            track.push(TrackEvent {
                delta: u28::new(delta),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff {
                        key: u7::new(pitch),
                        vel: u7::new(0),
                    },
                },
            });
        }
    }

    track.push(end_of_track());
    track
}

fn end_of_track() -> TrackEvent<'static> {
    TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{SourceText, convert};

    fn note_ons(track: &Track<'_>) -> Vec<(u8, u8)> {
        track
            .iter()
            .filter_map(|ev| match ev.kind {
                TrackEventKind::Midi {
                    message: MidiMessage::NoteOn { key, vel },
                    ..
                } => Some((key.as_int(), vel.as_int())),
                _ => None,
            })
            .collect()
    }

    fn total_ticks(track: &Track<'_>) -> u32 {
        track.iter().map(|ev| ev.delta.as_int()).sum()
    }

    #[test]
    fn test_document_to_smf_basic() {
        let doc = convert(&SourceText::new("Hi 2u").unwrap());
        let smf = document_to_smf(&doc);
        // 1 tempo track + melody + chords
        assert_eq!(smf.tracks.len(), 3);
        assert_eq!(smf.header.format, Format::Parallel);

        let melody = note_ons(&smf.tracks[1]);
        assert_eq!(melody.len(), 4);
        assert_eq!(melody[0].1, 100); // 'H'
        assert_eq!(melody[1].1, 80); // 'i'
        assert_eq!(melody[2].1, 60); // '2'

        // H = quarter, i = eighth, 2 = sixteenth, u = eighth
        assert_eq!(total_ticks(&smf.tracks[1]), 480 + 240 + 120 + 240);

        // One chord for four notes: a C major triad.
        assert_eq!(note_ons(&smf.tracks[2]), vec![(48, 64), (52, 64), (55, 64)]);
        assert_eq!(total_ticks(&smf.tracks[2]), CHORD_TICKS);
    }

    #[test]
    fn test_tempo_event() {
        let doc = convert(&SourceText::new("x").unwrap());
        let smf = document_to_smf(&doc);
        let tempo = smf.tracks[0].iter().find_map(|ev| match ev.kind {
            TrackEventKind::Meta(MetaMessage::Tempo(t)) => Some(t.as_int()),
            _ => None,
        });
        // 40 bpm
        assert_eq!(tempo, Some(1_500_000));
    }

    #[test]
    fn test_bytes_parse_back() {
        let doc = convert(&SourceText::new("def f(x):\n    return x\n").unwrap());
        let bytes = to_midi_bytes(&doc).unwrap();
        assert_eq!(&bytes[..4], b"MThd");
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.tracks.len(), 3);
        assert_eq!(note_ons(&smf.tracks[1]).len(), doc.melody.events.len());
        assert_eq!(note_ons(&smf.tracks[2]).len(), doc.chords.events.len() * 3);
    }

    #[test]
    fn test_fold_pitch() {
        assert_eq!(fold_pitch(60), 60);
        assert_eq!(fold_pitch(127), 127);
        assert_eq!(fold_pitch(128), 116);
        assert_eq!(fold_pitch(139), 127);
        assert_eq!(fold_pitch(140), 116);
        assert_eq!(fold_pitch(60 + 12 * 40), 120);
        assert_eq!(fold_pitch(-1), 11);
    }

    #[test]
    fn test_deep_indent_stays_in_range() {
        let text = format!("{}abc", " ".repeat(200));
        let doc = convert(&SourceText::new(text).unwrap());
        let bytes = to_midi_bytes(&doc).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        for (key, _) in note_ons(&smf.tracks[1]) {
            assert!(key <= 127);
        }
    }

    #[test]
    fn test_write_midi_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mid");
        let doc = convert(&SourceText::new("print(1)").unwrap());
        write_midi(&doc, &path).unwrap();
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, to_midi_bytes(&doc).unwrap());
    }
}
