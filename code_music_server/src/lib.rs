// code_music_server: HTTP front end for the `code_music` converter.
//
// Serves a small HTML form and a `POST /convert` endpoint that returns the
// generated Standard MIDI File as a download. All music logic lives in
// `code_music`; this crate only moves bytes.
//
// Module overview:
// - `server.rs`: tiny_http listener thread, `start_server`, `ServerHandle`.
// - `routes.rs`: Routing table, body extraction, status codes.
// - `config.rs`: `ServerConfig`, loadable from JSON.
// - `error.rs`:  `ServerError` for startup failures.
//
// The server can run as a standalone binary (`main.rs`) or be embedded via
// the library API (`start_server`), which is how the smoke test drives it.

pub mod config;
pub mod error;
pub mod routes;
pub mod server;

pub use config::ServerConfig;
pub use error::ServerError;
pub use server::{ServerHandle, start_server};
