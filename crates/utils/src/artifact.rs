//! Temp artifact manager
//!
//! Ephemeral files bridging the editor and external tools: the source file
//! handed to an interpreter/compiler, the binary a compiler emits, the HTML
//! document a browser renders. Every artifact gets a UUID-unique path so
//! concurrent requests never collide, and is removed on drop unless
//! ownership is deliberately transferred (a browser may still be reading
//! the file after the call returns).

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Filename prefix for everything this manager creates. `sweep_stale` only
/// touches files carrying it.
const ARTIFACT_PREFIX: &str = "quill-";

/// What an artifact is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Source,
    Binary,
    Html,
}

/// A scoped temporary file. Deleted on drop on every exit path; call
/// [`TempArtifact::into_path`] to keep the file and take the path.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
    kind: ArtifactKind,
    owned: bool,
}

impl TempArtifact {
    /// Write `contents` (UTF-8) to a freshly named file in the platform
    /// temp directory.
    pub fn create(kind: ArtifactKind, extension: &str, contents: &str) -> io::Result<Self> {
        let path = std::env::temp_dir().join(format!(
            "{}{}{}",
            ARTIFACT_PREFIX,
            Uuid::new_v4(),
            extension
        ));
        fs::write(&path, contents)?;
        tracing::debug!(path = %path.display(), ?kind, "created temp artifact");
        Ok(Self {
            path,
            kind,
            owned: true,
        })
    }

    /// Take ownership of a path some external tool is about to produce
    /// (e.g. a compiler output), so it gets the same scoped cleanup. The
    /// file does not need to exist yet.
    pub fn adopt(path: PathBuf, kind: ArtifactKind) -> Self {
        Self {
            path,
            kind,
            owned: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Transfer ownership of the file to the caller: the file is left on
    /// disk (the next-launch sweep reclaims it) and the path is returned.
    pub fn into_path(mut self) -> PathBuf {
        self.owned = false;
        self.path.clone()
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if !self.owned {
            return;
        }
        if let Err(err) = fs::remove_file(&self.path) {
            if err.kind() != io::ErrorKind::NotFound {
                tracing::debug!(path = %self.path.display(), %err, "failed to remove temp artifact");
            }
        }
    }
}

/// Remove leftover artifacts from previous runs (the preview files whose
/// ownership was transferred to the browser). Only files in the platform
/// temp directory carrying our prefix and at least `max_age` old are
/// touched. Returns how many files were removed.
pub fn sweep_stale(max_age: Duration) -> io::Result<usize> {
    sweep_stale_in(&std::env::temp_dir(), max_age)
}

fn sweep_stale_in(dir: &Path, max_age: Duration) -> io::Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(ARTIFACT_PREFIX) {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let old_enough = metadata
            .modified()
            .ok()
            .and_then(|mtime| mtime.elapsed().ok())
            .is_some_and(|age| age >= max_age);
        if !old_enough {
            continue;
        }
        match fs::remove_file(entry.path()) {
            Ok(()) => removed += 1,
            Err(err) => {
                tracing::debug!(path = %entry.path().display(), %err, "failed to sweep artifact")
            }
        }
    }
    if removed > 0 {
        tracing::info!(removed, "swept stale temp artifacts");
    }
    Ok(removed)
}
