//! Toolchain discovery.
//!
//! Interpreters and compilers are resolved on PATH before anything is
//! spawned, so a missing toolchain surfaces as a distinct error kind
//! instead of a raw spawn diagnostic.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    #[error("`{0}` not found on PATH")]
    NotFound(String),
}

/// Resolve `tool` to an absolute path on PATH.
pub fn resolve(tool: &str) -> Result<PathBuf, ToolchainError> {
    which::which(tool).map_err(|_| ToolchainError::NotFound(tool.to_string()))
}

/// Whether `tool` can be resolved on PATH.
pub fn is_available(tool: &str) -> bool {
    which::which(tool).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_a_ubiquitous_tool() {
        // `sh` exists on every unix box this runs on
        let path = resolve("sh").unwrap();
        assert!(path.is_absolute());
    }

    #[test]
    fn missing_tool_is_a_distinct_error() {
        let err = resolve("definitely-not-a-real-tool-xyz").unwrap_err();
        assert!(matches!(err, ToolchainError::NotFound(_)));
        assert!(err.to_string().contains("definitely-not-a-real-tool-xyz"));
    }
}
