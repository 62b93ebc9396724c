// Request routing for the HTTP front end.
//
// Routes:
// - `GET /`          the HTML form (static/index.html)
// - `POST /convert`  source code in, MIDI file out
//
// `route` is a plain function from (method, path, content type, body) to a
// `Reply`, so the whole routing table is testable without a socket.
// `handle_request` is the thin tiny_http adapter around it: it refuses a
// declared Content-Length over the limit before touching the body, otherwise
// reads the body up to the limit, calls `route`, and writes the reply.
//
// `POST /convert` takes the source text from the `code` field of an
// `application/x-www-form-urlencoded` form or an `application/json` object.
// Any other body is the raw source text.

use std::io::{Cursor, Read};

use code_music::filename::download_filename;
use code_music::midi::to_midi_bytes;
use code_music::{ConvertError, SourceText, convert};
use serde::Deserialize;
use tiny_http::{Header, Method, Request, Response, StatusCode};

use crate::config::ServerConfig;

const INDEX_HTML: &str = include_str!("../static/index.html");

pub const MIDI_CONTENT_TYPE: &str = "audio/midi";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Form or JSON body of `POST /convert`.
#[derive(Debug, Deserialize)]
struct ConvertRequest {
    #[serde(default)]
    code: String,
}

/// A response, independent of the HTTP library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    /// Download filename, sent as a Content-Disposition attachment.
    pub attachment: Option<String>,
}

impl Reply {
    fn text(status: u16, message: impl Into<String>) -> Self {
        Reply {
            status,
            content_type: TEXT_CONTENT_TYPE,
            body: message.into().into_bytes(),
            attachment: None,
        }
    }

    fn html(body: &str) -> Self {
        Reply {
            status: 200,
            content_type: HTML_CONTENT_TYPE,
            body: body.as_bytes().to_vec(),
            attachment: None,
        }
    }

    fn midi(bytes: Vec<u8>, filename: String) -> Self {
        Reply {
            status: 200,
            content_type: MIDI_CONTENT_TYPE,
            body: bytes,
            attachment: Some(filename),
        }
    }
}

/// Dispatch one request.
pub fn route(
    method: &Method,
    url: &str,
    content_type: Option<&str>,
    body: &[u8],
    config: &ServerConfig,
) -> Reply {
    let path = url.split('?').next().unwrap_or(url);
    match (path, method) {
        ("/", Method::Get) => Reply::html(INDEX_HTML),
        ("/convert", Method::Post) => convert_reply(content_type, body, config),
        ("/" | "/convert", _) => Reply::text(405, "Method not allowed"),
        _ => Reply::text(404, "Not found"),
    }
}

fn convert_reply(content_type: Option<&str>, body: &[u8], config: &ServerConfig) -> Reply {
    if body.len() > config.max_body_bytes {
        return Reply::text(413, "Request body too large");
    }

    let code = match extract_code(content_type, body) {
        Ok(code) => code,
        Err(reply) => return reply,
    };

    let source = match SourceText::new(code) {
        Ok(source) => source,
        Err(e @ ConvertError::EmptyInput) => return Reply::text(400, e.to_string()),
        Err(e) => return Reply::text(500, e.to_string()),
    };

    let doc = convert(&source);
    let bytes = match to_midi_bytes(&doc) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("MIDI serialization failed: {e}");
            return Reply::text(500, e.to_string());
        }
    };

    let filename = download_filename(source.as_str());
    if let Some(dir) = &config.output_dir
        && let Err(e) = save_copy(dir, &filename, &bytes)
    {
        log::error!("failed to save {filename} to {}: {e}", dir.display());
        return Reply::text(500, e.to_string());
    }

    log::info!(
        "converted {} chars -> {} notes, {} chords, {} bpm ({filename})",
        source.as_str().chars().count(),
        doc.melody.events.len(),
        doc.chords.events.len(),
        doc.tempo.bpm
    );
    Reply::midi(bytes, filename)
}

/// Pull the source text out of a request body.
fn extract_code(content_type: Option<&str>, body: &[u8]) -> Result<String, Reply> {
    let mime = content_type
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .unwrap_or_default();

    match mime.as_str() {
        "application/json" => serde_json::from_slice::<ConvertRequest>(body)
            .map(|req| req.code)
            .map_err(|e| Reply::text(400, format!("Invalid JSON body: {e}"))),
        "application/x-www-form-urlencoded" => {
            serde_urlencoded::from_bytes::<ConvertRequest>(body)
                .map(|req| req.code)
                .map_err(|e| Reply::text(400, format!("Invalid form body: {e}")))
        }
        _ => String::from_utf8(body.to_vec())
            .map_err(|_| Reply::text(400, "Request body is not valid UTF-8")),
    }
}

fn save_copy(dir: &std::path::Path, filename: &str, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    std::fs::write(dir.join(filename), bytes)
}

/// Read, route and answer one tiny_http request.
pub fn handle_request(mut request: Request, config: &ServerConfig) {
    let content_type = request
        .headers()
        .iter()
        .find(|h| h.field.equiv("Content-Type"))
        .map(|h| h.value.as_str().to_string());

    let declared_too_large = request
        .body_length()
        .is_some_and(|len| len > config.max_body_bytes);

    let reply = if declared_too_large {
        Reply::text(413, "Request body too large")
    } else {
        match read_body(&mut request, config.max_body_bytes) {
            Ok(body) => route(
                request.method(),
                request.url(),
                content_type.as_deref(),
                &body,
                config,
            ),
            Err(e) => Reply::text(400, format!("Failed to read request body: {e}")),
        }
    };

    log::debug!("{} {} -> {}", request.method(), request.url(), reply.status);

    if let Err(e) = request.respond(into_response(reply)) {
        log::warn!("failed to send response: {e}");
    }
}

/// Read at most `limit + 1` bytes, enough for `route` to see an oversized
/// body without buffering all of it.
fn read_body(request: &mut Request, limit: usize) -> std::io::Result<Vec<u8>> {
    let mut body = Vec::new();
    let cap = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    Read::take(request.as_reader(), cap).read_to_end(&mut body)?;
    Ok(body)
}

fn into_response(reply: Reply) -> Response<Cursor<Vec<u8>>> {
    let mut response = Response::from_data(reply.body).with_status_code(StatusCode(reply.status));
    if let Ok(header) = Header::from_bytes("Content-Type", reply.content_type) {
        response.add_header(header);
    }
    if let Some(filename) = reply.attachment {
        let disposition = format!("attachment; filename=\"{filename}\"");
        if let Ok(header) = Header::from_bytes("Content-Disposition", disposition.as_bytes()) {
            response.add_header(header);
        }
    }
    response
}
