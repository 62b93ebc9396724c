// CLI entry point for the code music HTTP server.
//
// Starts the server and blocks until it stops. See `server.rs` for the
// request loop and `routes.rs` for the endpoints.
//
// Usage:
//   code-music-server [OPTIONS]
//     --config <FILE>       JSON config file (see config.rs)
//     --bind <ADDR>         Listen address (default: 127.0.0.1)
//     --port <PORT>         Listen port (default: 5000)
//     --output-dir <DIR>    Also save every generated file here
//     -v, --verbose         Debug logging

use clap::Parser;
use code_music_server::{ServerConfig, ServerError, start_server};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Serve the code-to-MIDI converter over HTTP
#[derive(Parser)]
#[command(name = "code-music-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address
    #[arg(long)]
    bind: Option<String>,

    /// Listen port
    #[arg(short, long)]
    port: Option<u16>,

    /// Directory to save generated files in
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let (handle, addr) = match start_server(config) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Failed to start server: {e}");
            std::process::exit(1);
        }
    };

    println!("Code Music listening on http://{addr}");
    println!("Press Ctrl+C to stop.");
    handle.join();
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// File config (or defaults) with command-line overrides applied.
fn build_config(cli: &Cli) -> Result<ServerConfig, ServerError> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = &cli.bind {
        config.bind_address = bind.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(dir) = &cli.output_dir {
        config.output_dir = Some(dir.clone());
    }
    Ok(config)
}
