// HTTP listener and request loop.
//
// Architecture: one background thread owns the `tiny_http::Server` and only
// accepts. Each request is handed to its own thread, which reads the body,
// converts and responds. A client that stalls mid-body ties up its own thread
// and nothing else, so the listener keeps accepting and `stop` still returns.
//
// The accept loop polls with `recv_timeout` so it can notice the
// `keep_running` flag. `ServerHandle::stop` clears the flag and joins the
// accept thread; request threads in flight finish on their own.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use tiny_http::Server;

use crate::config::ServerConfig;
use crate::error::ServerError;
use crate::routes::handle_request;

/// How often the loop wakes up to check for shutdown when idle.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Handle returned by `start_server` to control the running server.
pub struct ServerHandle {
    keep_running: Arc<AtomicBool>,
    thread: Option<thread::JoinHandle<()>>,
}

impl ServerHandle {
    /// Signal the server to stop and wait for it to shut down.
    pub fn stop(mut self) {
        self.keep_running.store(false, Ordering::SeqCst);
        self.join_thread();
    }

    /// Block until the server thread exits (it only exits on `stop` or a
    /// listener failure).
    pub fn join(mut self) {
        self.join_thread();
    }

    fn join_thread(&mut self) {
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

/// Start the server on a background thread. Returns a handle for stopping it
/// and the actual bound address (useful when port 0 is used to let the OS
/// pick a free port).
pub fn start_server(config: ServerConfig) -> Result<(ServerHandle, SocketAddr), ServerError> {
    let listen_addr = config.listen_addr();
    let server = Server::http(&listen_addr).map_err(|e| ServerError::Bind {
        addr: listen_addr.clone(),
        reason: e.to_string(),
    })?;
    let addr = server.server_addr().to_ip().ok_or_else(|| ServerError::Bind {
        addr: listen_addr,
        reason: "listener is not an IP socket".into(),
    })?;

    let keep_running = Arc::new(AtomicBool::new(true));
    let keep_running_clone = keep_running.clone();

    let thread = thread::spawn(move || {
        run_server(server, config, keep_running_clone);
    });

    log::info!("listening on http://{addr}");

    Ok((
        ServerHandle {
            keep_running,
            thread: Some(thread),
        },
        addr,
    ))
}

/// Accept loop. Runs until `keep_running` is set to false.
fn run_server(server: Server, config: ServerConfig, keep_running: Arc<AtomicBool>) {
    let config = Arc::new(config);
    while keep_running.load(Ordering::SeqCst) {
        match server.recv_timeout(POLL_INTERVAL) {
            Ok(Some(request)) => {
                let config = Arc::clone(&config);
                let spawned = thread::Builder::new()
                    .name("code-music-request".into())
                    .spawn(move || handle_request(request, &config));
                if let Err(e) = spawned {
                    log::error!("failed to spawn request thread: {e}");
                }
            }
            Ok(None) => {}
            Err(e) => {
                log::error!("listener failed: {e}");
                break;
            }
        }
    }
    log::info!("server stopped");
}
