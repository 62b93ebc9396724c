// Code Music converter: CLI entry point.
//
// Reads source code from a file (or stdin), converts it to music and writes a
// Standard MIDI File. The pipeline: complexity analysis → composition →
// assembly → MIDI output.
//
// Usage:
//   cargo run -p code_music -- [INPUT] [-o output.mid] [--json] [--notes] [-v]
//
// Without -o the file is named after the input text, like the web service
// does (`code_music_<slug>.mid`).

use clap::Parser;
use code_music::complexity::ComplexityReport;
use code_music::filename::download_filename;
use code_music::midi::write_midi;
use code_music::scale::pitch_name;
use code_music::{ConvertError, SourceText, convert};
use std::io::Read;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Turn source code into a MIDI file
#[derive(Parser)]
#[command(name = "code2midi")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Source file to convert (reads stdin when omitted or "-")
    input: Option<PathBuf>,

    /// Output MIDI file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the event document as JSON instead of writing MIDI
    #[arg(long)]
    json: bool,

    /// List every melody note
    #[arg(long)]
    notes: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<(), ConvertError> {
    let text = read_input(cli.input.as_ref())?;
    let source = SourceText::new(text)?;
    let report = ComplexityReport::analyze(source.as_str());
    let doc = convert(&source);

    if cli.json {
        let json = serde_json::to_string_pretty(&doc).map_err(std::io::Error::other)?;
        println!("{json}");
        return Ok(());
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(download_filename(source.as_str())));

    println!("=== Code Music ===");
    println!(
        "Patterns: {} functions, {} classes, {} loops, {} conditionals",
        report.functions, report.classes, report.loops, report.conditionals
    );
    println!("Complexity: {:.2}", report.factor());
    println!("Tempo: {} BPM", doc.tempo.bpm);
    println!("Melody: {} notes", doc.melody.events.len());
    println!("Chords: {}", doc.chords.events.len());

    if cli.notes {
        for (i, note) in doc.melody.events.iter().enumerate() {
            println!(
                "  {:>4}  {:<5} {:>4} beats  vel {}",
                i,
                pitch_name(note.pitch),
                note.duration.quarter_length(),
                note.velocity
            );
        }
    }

    write_midi(&doc, &output)?;
    println!("Wrote {}", output.display());
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String, ConvertError> {
    match path {
        Some(p) if p.as_os_str() != "-" => Ok(std::fs::read_to_string(p)?),
        _ => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}
