//! Language selector shared by the execution and preview paths.

use serde::{Deserialize, Serialize};

/// The languages the editor offers in its selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LanguageTag {
    Html,
    Css,
    JavaScript,
    Python,
    Cpp,
}

/// How a language's snippets are turned into observable behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionModel {
    /// Source file handed directly to an interpreter.
    Interpreted,
    /// Source file compiled to a binary, then the binary is run.
    Compiled,
    /// No execution model; rendered by a browser via the preview path.
    Markup,
}

impl LanguageTag {
    /// Source-file extension, dot included.
    pub fn extension(&self) -> &'static str {
        match self {
            LanguageTag::Html => ".html",
            LanguageTag::Css => ".css",
            LanguageTag::JavaScript => ".js",
            LanguageTag::Python => ".py",
            LanguageTag::Cpp => ".cpp",
        }
    }

    pub fn execution_model(&self) -> ExecutionModel {
        match self {
            LanguageTag::Python => ExecutionModel::Interpreted,
            LanguageTag::Cpp => ExecutionModel::Compiled,
            LanguageTag::Html | LanguageTag::Css | LanguageTag::JavaScript => {
                ExecutionModel::Markup
            }
        }
    }

    /// Whether the live-preview path accepts this language.
    pub fn previewable(&self) -> bool {
        matches!(self.execution_model(), ExecutionModel::Markup)
    }

    /// Render `text` as a one-line comment in this language's syntax.
    pub fn comment_line(&self, text: &str) -> String {
        match self {
            LanguageTag::Python => format!("# {text}"),
            LanguageTag::JavaScript | LanguageTag::Cpp => format!("// {text}"),
            LanguageTag::Css => format!("/* {text} */"),
            LanguageTag::Html => format!("<!-- {text} -->"),
        }
    }
}

impl std::fmt::Display for LanguageTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LanguageTag::Html => write!(f, "HTML"),
            LanguageTag::Css => write!(f, "CSS"),
            LanguageTag::JavaScript => write!(f, "JavaScript"),
            LanguageTag::Python => write!(f, "Python"),
            LanguageTag::Cpp => write!(f, "C++"),
        }
    }
}

impl std::str::FromStr for LanguageTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(LanguageTag::Html),
            "css" => Ok(LanguageTag::Css),
            "javascript" | "js" => Ok(LanguageTag::JavaScript),
            "python" | "py" => Ok(LanguageTag::Python),
            "c++" | "cpp" | "cxx" => Ok(LanguageTag::Cpp),
            _ => Err(format!("Unknown language: {}", s)),
        }
    }
}
