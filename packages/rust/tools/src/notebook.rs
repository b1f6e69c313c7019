//! Notebook conversion through the external converter.
//!
//! The converter is invoked twice per notebook: once to HTML for the
//! published article, once to Markdown for excerpting and figure
//! discovery. Both runs write into a caller-chosen output directory and
//! drop exported figures into a `<stem>_files/` folder next to the
//! converted document.

use std::path::Path;
use std::time::Duration;

use tracing::info;

use pressrun_shared::ToolError;

use crate::runner::{ToolOutput, ToolRunner};

/// Output formats the pipeline asks the converter for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertFormat {
    Html,
    Markdown,
}

impl ConvertFormat {
    /// The converter's name for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "markdown",
        }
    }
}

/// Builds and runs converter invocations over a [`ToolRunner`].
pub struct NotebookConverter<'a> {
    runner: &'a dyn ToolRunner,
    program: String,
    timeout: Duration,
}

impl<'a> NotebookConverter<'a> {
    /// A converter invoking `program` (run as `<program> nbconvert ...`).
    pub fn new(runner: &'a dyn ToolRunner, program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            runner,
            program: program.into(),
            timeout,
        }
    }

    /// Render `notebook` to an HTML article in `output_dir`.
    pub fn to_html(&self, notebook: &Path, output_dir: &Path) -> Result<ToolOutput, ToolError> {
        self.convert(notebook, output_dir, ConvertFormat::Html)
    }

    /// Render `notebook` to Markdown in `output_dir`.
    pub fn to_markdown(&self, notebook: &Path, output_dir: &Path) -> Result<ToolOutput, ToolError> {
        self.convert(notebook, output_dir, ConvertFormat::Markdown)
    }

    fn convert(
        &self,
        notebook: &Path,
        output_dir: &Path,
        format: ConvertFormat,
    ) -> Result<ToolOutput, ToolError> {
        let args = vec![
            "nbconvert".to_string(),
            "--to".to_string(),
            format.as_str().to_string(),
            "--output-dir".to_string(),
            output_dir.display().to_string(),
            notebook.display().to_string(),
        ];
        info!(notebook = %notebook.display(), format = format.as_str(), "converting notebook");
        self.runner.run(&self.program, &args, self.timeout)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    /// Records every invocation and answers Ok.
    #[derive(Default)]
    struct RecordingRunner {
        calls: RefCell<Vec<(String, Vec<String>, Duration)>>,
    }

    impl ToolRunner for RecordingRunner {
        fn run(
            &self,
            program: &str,
            args: &[String],
            timeout: Duration,
        ) -> Result<ToolOutput, ToolError> {
            self.calls
                .borrow_mut()
                .push((program.to_string(), args.to_vec(), timeout));
            Ok(ToolOutput::default())
        }
    }

    #[test]
    fn html_invocation_shape() {
        let runner = RecordingRunner::default();
        let converter = NotebookConverter::new(&runner, "jupyter", Duration::from_secs(60));
        converter
            .to_html(Path::new("drafts/2024-03-05.ipynb"), Path::new("web/articles"))
            .expect("converted");

        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        let (program, args, timeout) = &calls[0];
        assert_eq!(program, "jupyter");
        assert_eq!(
            args,
            &[
                "nbconvert",
                "--to",
                "html",
                "--output-dir",
                "web/articles",
                "drafts/2024-03-05.ipynb"
            ]
        );
        assert_eq!(*timeout, Duration::from_secs(60));
    }

    #[test]
    fn markdown_invocation_shape() {
        let runner = RecordingRunner::default();
        let converter = NotebookConverter::new(&runner, "jupyter", Duration::from_secs(60));
        converter
            .to_markdown(Path::new("drafts/a.ipynb"), Path::new("/tmp/ws"))
            .expect("converted");

        let calls = runner.calls.borrow();
        assert_eq!(calls[0].1[2], "markdown");
        assert_eq!(calls[0].1[4], "/tmp/ws");
    }

    #[test]
    fn converter_error_passes_through() {
        struct FailingRunner;
        impl ToolRunner for FailingRunner {
            fn run(
                &self,
                program: &str,
                _args: &[String],
                timeout: Duration,
            ) -> Result<ToolOutput, ToolError> {
                Err(ToolError::Timeout {
                    program: program.to_string(),
                    timeout_secs: timeout.as_secs(),
                })
            }
        }

        let converter = NotebookConverter::new(&FailingRunner, "jupyter", Duration::from_secs(1));
        let err = converter
            .to_html(Path::new("a.ipynb"), Path::new("out"))
            .expect_err("runner failed");
        assert!(matches!(err, ToolError::Timeout { .. }));
    }
}
