//! Prompt assembly for edit requests.

use executors::LanguageTag;

/// Everything a single edit request needs: assembled fresh per call, never
/// cached, rendered deterministically.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub language: LanguageTag,
    pub current_code: String,
    pub user_instruction: String,
}

impl PromptContext {
    pub fn new(
        language: LanguageTag,
        current_code: impl Into<String>,
        user_instruction: impl Into<String>,
    ) -> Self {
        Self {
            language,
            current_code: current_code.into(),
            user_instruction: user_instruction.into(),
        }
    }

    /// Render the prompt. The instruction is embedded verbatim and the
    /// backend is told to answer with raw code, no markdown fencing.
    pub fn render(&self) -> String {
        format!(
            r#"You are a coding assistant. The user is working in {language}.
Here is the current code:

{code}

Now the user is asking:
"{instruction}"

Respond with only the modified or new code. Do not include markdown, ```python, ```html, or any triple backticks.
Just give clean code."#,
            language = self.language,
            code = self.current_code,
            instruction = self.user_instruction,
        )
    }
}
