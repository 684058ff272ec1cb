//! Preview composer
//!
//! Wraps raw HTML/CSS/JavaScript into a browser-ready document. `compose`
//! is pure and deterministic; `write_preview` hands the document to the
//! temp-artifact manager. Opening the browser is the caller's side effect,
//! performed with the returned artifact's path.

use thiserror::Error;
use workspace_utils::artifact::{ArtifactKind, TempArtifact};

use crate::language::LanguageTag;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("live preview is only available for HTML, CSS, and JavaScript (got {0})")]
    UnsupportedLanguage(LanguageTag),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Compose a well-formed HTML document from raw source.
///
/// CSS is wrapped in a style block and JavaScript in a script block; HTML
/// passes through. If the text still carries no `<html` (any case) it is
/// wrapped in a minimal boilerplate document. Same input, byte-identical
/// output, with no timestamps or generated ids embedded.
pub fn compose(code: &str, language: LanguageTag) -> Result<String, PreviewError> {
    let snippet = match language {
        LanguageTag::Css => format!("<style>\n{code}\n</style>"),
        LanguageTag::JavaScript => format!("<script>\n{code}\n</script>"),
        LanguageTag::Html => code.to_string(),
        other => return Err(PreviewError::UnsupportedLanguage(other)),
    };

    if snippet.to_lowercase().contains("<html") {
        Ok(snippet)
    } else {
        Ok(format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<title>Live Preview</title>\n</head>\n<body>\n{snippet}\n</body>\n</html>"
        ))
    }
}

/// Compose and write the document UTF-8 to an `.html` temp artifact. The
/// artifact cleans itself up unless the caller transfers ownership with
/// [`TempArtifact::into_path`] after pointing a browser at it.
pub fn write_preview(code: &str, language: LanguageTag) -> Result<TempArtifact, PreviewError> {
    let document = compose(code, language)?;
    let artifact = TempArtifact::create(ArtifactKind::Html, ".html", &document)?;
    tracing::debug!(%language, path = %artifact.path().display(), "composed preview document");
    Ok(artifact)
}
