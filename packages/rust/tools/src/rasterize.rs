//! Formula rasterization through the external helper.
//!
//! The helper receives the bare formula text (no `$` delimiters) and the
//! PNG path to produce. A run that exits zero without creating the file
//! is still a failure.

use std::path::Path;
use std::time::Duration;

use tracing::info;

use pressrun_shared::ToolError;

use crate::runner::ToolRunner;

/// Builds and runs rasterizer invocations over a [`ToolRunner`].
pub struct FormulaRasterizer<'a> {
    runner: &'a dyn ToolRunner,
    program: String,
    timeout: Duration,
}

impl<'a> FormulaRasterizer<'a> {
    /// A rasterizer invoking `program` (run as `<program> -o <png> <formula>`).
    pub fn new(runner: &'a dyn ToolRunner, program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            runner,
            program: program.into(),
            timeout,
        }
    }

    /// Rasterize `formula` into the PNG at `output`.
    pub fn rasterize(&self, formula: &str, output: &Path) -> Result<(), ToolError> {
        let args = vec![
            "-o".to_string(),
            output.display().to_string(),
            formula.to_string(),
        ];
        info!(formula, output = %output.display(), "rasterizing formula");
        self.runner.run(&self.program, &args, self.timeout)?;

        if !output.is_file() {
            return Err(ToolError::MissingOutput {
                program: self.program.clone(),
                path: output.to_path_buf(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use crate::runner::ToolOutput;

    use super::*;

    /// Answers Ok and optionally writes the requested output file,
    /// the way a real rasterizer would.
    #[derive(Default)]
    struct ScriptedRasterizer {
        create_output: bool,
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl ToolRunner for ScriptedRasterizer {
        fn run(
            &self,
            _program: &str,
            args: &[String],
            _timeout: Duration,
        ) -> Result<ToolOutput, ToolError> {
            self.calls.borrow_mut().push(args.to_vec());
            if self.create_output {
                std::fs::write(&args[1], b"png").expect("write fake png");
            }
            Ok(ToolOutput::default())
        }
    }

    #[test]
    fn rasterize_passes_formula_and_output() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("2024-03-05_latex_00.png");

        let runner = ScriptedRasterizer {
            create_output: true,
            ..ScriptedRasterizer::default()
        };
        let rasterizer = FormulaRasterizer::new(&runner, "l2p", Duration::from_secs(30));
        rasterizer.rasterize("E=mc^2", &out).expect("rasterized");

        let calls = runner.calls.borrow();
        assert_eq!(calls[0][0], "-o");
        assert_eq!(calls[0][1], out.display().to_string());
        assert_eq!(calls[0][2], "E=mc^2");
        assert!(out.is_file());
    }

    #[test]
    fn missing_output_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("never-written.png");

        let runner = ScriptedRasterizer::default();
        let rasterizer = FormulaRasterizer::new(&runner, "l2p", Duration::from_secs(30));
        let err = rasterizer.rasterize("x^2", &out).expect_err("no output file");
        assert!(matches!(err, ToolError::MissingOutput { .. }));
    }
}
