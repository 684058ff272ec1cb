//! Execution orchestrator
//!
//! Turns a snippet and a language selector into captured toolchain output:
//! interpreted languages run straight through their interpreter, compiled
//! languages go compile-then-run, markup languages come back with guidance
//! toward the preview path. One call, one or two child processes, no state
//! kept between calls.

use std::{
    process::Stdio,
    time::{Duration, Instant},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::process::Command;
use workspace_utils::{
    artifact::{ArtifactKind, TempArtifact},
    toolchain::{self, ToolchainError},
};

use crate::language::{ExecutionModel, LanguageTag};

/// Which phase of an execution a result (or failure) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticStage {
    Compile,
    Run,
}

impl std::fmt::Display for DiagnosticStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiagnosticStage::Compile => write!(f, "compile"),
            DiagnosticStage::Run => write!(f, "run"),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("{0}")]
    ToolchainNotFound(#[from] ToolchainError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{stage} step timed out after {timeout_ms}ms")]
    Timeout {
        stage: DiagnosticStage,
        timeout_ms: u64,
    },
}

/// Captured outcome of one execution request. Created once, rendered by the
/// shell, discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub stage: DiagnosticStage,
    /// Exit code of the child that produced this result. Informational
    /// only: a run-stage non-zero exit does not flip `success`, which
    /// tracks whether the snippet got to run at all.
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
}

impl ExecutionResult {
    /// Output-pane text: stdout followed by stderr.
    pub fn combined_output(&self) -> String {
        let mut combined = self.stdout.clone();
        combined.push_str(&self.stderr);
        combined
    }
}

/// Knobs for the orchestrator. Toolchain names are resolved on PATH at
/// execution time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    /// Timeout applied separately to the compile and run phases.
    pub timeout_ms: u64,
    pub python_interpreter: String,
    pub cpp_compiler: String,
    /// Appended to the source path to form the compiled-binary path.
    pub binary_extension: String,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            python_interpreter: "python3".to_string(),
            cpp_compiler: "g++".to_string(),
            binary_extension: ".out".to_string(),
        }
    }
}

impl ExecutorConfig {
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Runs snippets through external toolchains and captures their output.
#[derive(Debug, Clone, Default)]
pub struct ExecutionOrchestrator {
    config: ExecutorConfig,
}

impl ExecutionOrchestrator {
    pub fn new(config: ExecutorConfig) -> Self {
        Self { config }
    }

    /// Execute `code` according to `language`'s execution model.
    ///
    /// Returns `Err` only when the snippet never got to produce output
    /// (missing toolchain, IO failure, timeout). Compile failures are a
    /// successful *call* with `success = false` and the compiler's
    /// diagnostics in `stderr`.
    pub async fn execute(
        &self,
        code: &str,
        language: LanguageTag,
    ) -> Result<ExecutionResult, ExecutorError> {
        match language.execution_model() {
            ExecutionModel::Interpreted => self.run_interpreted(code, language).await,
            ExecutionModel::Compiled => self.compile_and_run(code, language).await,
            ExecutionModel::Markup => Ok(Self::preview_guidance(language)),
        }
    }

    async fn run_interpreted(
        &self,
        code: &str,
        language: LanguageTag,
    ) -> Result<ExecutionResult, ExecutorError> {
        let interpreter = toolchain::resolve(&self.config.python_interpreter)?;
        let source = TempArtifact::create(ArtifactKind::Source, language.extension(), code)?;

        let started = Instant::now();
        let mut command = Command::new(&interpreter);
        command.arg(source.path());
        let output = self.run_command(command, DiagnosticStage::Run).await?;

        tracing::debug!(
            %language,
            exit_code = ?output.status.code(),
            "interpreter finished"
        );

        Ok(ExecutionResult {
            success: true,
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            stage: DiagnosticStage::Run,
            exit_code: output.status.code(),
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    async fn compile_and_run(
        &self,
        code: &str,
        language: LanguageTag,
    ) -> Result<ExecutionResult, ExecutorError> {
        let compiler = toolchain::resolve(&self.config.cpp_compiler)?;
        let source = TempArtifact::create(ArtifactKind::Source, language.extension(), code)?;

        // Binary path = source path + appended extension, owned for cleanup
        let mut binary_path = source.path().as_os_str().to_owned();
        binary_path.push(&self.config.binary_extension);
        let binary = TempArtifact::adopt(binary_path.into(), ArtifactKind::Binary);

        let started = Instant::now();
        let mut compile = Command::new(&compiler);
        compile.arg(source.path()).arg("-o").arg(binary.path());
        let compile_output = self.run_command(compile, DiagnosticStage::Compile).await?;

        if !compile_output.status.success() {
            tracing::debug!(%language, exit_code = ?compile_output.status.code(), "compilation failed");
            return Ok(ExecutionResult {
                success: false,
                stdout: String::from_utf8_lossy(&compile_output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&compile_output.stderr).to_string(),
                stage: DiagnosticStage::Compile,
                exit_code: compile_output.status.code(),
                duration_ms: started.elapsed().as_millis() as u64,
            });
        }

        let run_output = self
            .run_command(Command::new(binary.path()), DiagnosticStage::Run)
            .await?;

        Ok(ExecutionResult {
            success: true,
            stdout: String::from_utf8_lossy(&run_output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&run_output.stderr).to_string(),
            stage: DiagnosticStage::Run,
            exit_code: run_output.status.code(),
            duration_ms: started.elapsed().as_millis() as u64,
        })
    }

    /// Run a prepared command with piped output and the configured timeout.
    /// The child holds no stdin; dropping the future kills the child.
    async fn run_command(
        &self,
        mut command: Command,
        stage: DiagnosticStage,
    ) -> Result<std::process::Output, ExecutorError> {
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tokio::time::timeout(Duration::from_millis(self.config.timeout_ms), command.output())
            .await
            .map_err(|_| ExecutorError::Timeout {
                stage,
                timeout_ms: self.config.timeout_ms,
            })?
            .map_err(ExecutorError::Io)
    }

    fn preview_guidance(language: LanguageTag) -> ExecutionResult {
        ExecutionResult {
            success: false,
            stdout: String::new(),
            stderr: format!("Run is not supported for {language}. Use Live Preview instead.\n"),
            stage: DiagnosticStage::Run,
            exit_code: None,
            duration_ms: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use workspace_utils::toolchain::is_available;

    #[tokio::test]
    async fn python_stdout_is_captured() {
        if !is_available("python3") {
            return;
        }
        let orchestrator = ExecutionOrchestrator::default();
        let result = orchestrator
            .execute("print(\"hi\")", LanguageTag::Python)
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.stage, DiagnosticStage::Run);
        assert_eq!(result.stdout, "hi\n");
        assert_eq!(result.stderr, "");
    }

    #[tokio::test]
    async fn python_nonzero_exit_is_still_a_successful_run() {
        if !is_available("python3") {
            return;
        }
        let orchestrator = ExecutionOrchestrator::default();
        let result = orchestrator
            .execute("import sys\nsys.exit(3)", LanguageTag::Python)
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.stage, DiagnosticStage::Run);
        assert_eq!(result.exit_code, Some(3));
    }

    #[tokio::test]
    async fn python_stderr_lands_in_the_result() {
        if !is_available("python3") {
            return;
        }
        let orchestrator = ExecutionOrchestrator::default();
        let result = orchestrator
            .execute(
                "import sys\nsys.stderr.write(\"warned\\n\")",
                LanguageTag::Python,
            )
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.stderr, "warned\n");
        assert_eq!(result.combined_output(), "warned\n");
    }

    #[tokio::test]
    async fn cpp_compile_error_skips_the_run_step() {
        if !is_available("g++") {
            return;
        }
        let orchestrator = ExecutionOrchestrator::default();
        let result = orchestrator
            .execute("int main(){return x;}", LanguageTag::Cpp)
            .await
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.stage, DiagnosticStage::Compile);
        assert!(result.stderr.contains('x'));
    }

    #[tokio::test]
    async fn cpp_compiles_and_runs() {
        if !is_available("g++") {
            return;
        }
        let orchestrator = ExecutionOrchestrator::default();
        let result = orchestrator
            .execute(
                "#include <iostream>\nint main(){ std::cout << \"built\\n\"; return 0; }",
                LanguageTag::Cpp,
            )
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.stage, DiagnosticStage::Run);
        assert_eq!(result.stdout, "built\n");
    }

    #[tokio::test]
    async fn markup_languages_point_at_the_preview_path() {
        let orchestrator = ExecutionOrchestrator::default();
        for language in [LanguageTag::Html, LanguageTag::Css, LanguageTag::JavaScript] {
            let result = orchestrator.execute("body {}", language).await.unwrap();
            assert!(!result.success);
            assert!(result.stderr.contains("Live Preview"));
        }
    }

    #[tokio::test]
    async fn missing_toolchain_is_a_distinct_error() {
        let orchestrator = ExecutionOrchestrator::new(ExecutorConfig {
            python_interpreter: "definitely-not-a-real-tool-xyz".to_string(),
            ..Default::default()
        });
        let err = orchestrator
            .execute("print(1)", LanguageTag::Python)
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::ToolchainNotFound(_)));
    }

    #[tokio::test]
    async fn long_running_scripts_hit_the_timeout() {
        if !is_available("python3") {
            return;
        }
        let orchestrator =
            ExecutionOrchestrator::new(ExecutorConfig::default().with_timeout_ms(200));
        let err = orchestrator
            .execute("import time\ntime.sleep(10)", LanguageTag::Python)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExecutorError::Timeout {
                stage: DiagnosticStage::Run,
                ..
            }
        ));
    }
}
