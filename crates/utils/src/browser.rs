//! Default-browser launch for composed preview documents.

use std::{io, path::Path};

/// Build the `file://` URL for a local path.
pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Open `path` with the OS-registered default handler, without blocking on
/// the handler process.
pub fn open_path(path: &Path) -> io::Result<()> {
    let url = file_url(path);
    tracing::info!(%url, "opening preview in default browser");
    open::that_detached(url)
}
