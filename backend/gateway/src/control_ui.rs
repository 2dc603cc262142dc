//! Static UI Asset Server.
//!
//! Serves the browser client from a directory on disk, with `index.html` at `/`.

use std::path::Path;

use tower_http::services::ServeDir;
use tracing::{info, warn};

/// Returns a service for the static UI, or `None` if the directory does not exist.
pub fn static_files(dir: impl AsRef<Path>) -> Option<ServeDir> {
    let dir = dir.as_ref();
    if dir.is_dir() {
        info!(dir = %dir.display(), "Serving static UI assets");
        Some(ServeDir::new(dir))
    } else {
        warn!(dir = %dir.display(), "Static UI directory not found; serving API only");
        None
    }
}
