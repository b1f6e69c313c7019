//! Bounded external process invocation.
//!
//! Every external program the pipeline runs goes through the
//! [`ToolRunner`] trait, so tests can substitute a scripted double.
//! [`ProcessRunner`] is the real thing: it spawns the program, polls for
//! exit against a hard deadline, and kills anything that overstays.

use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use pressrun_shared::ToolError;

/// How often the bounded wait polls the child for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Longest stderr tail carried into an error message.
const STDERR_LIMIT: usize = 2000;

/// Captured outcome of a successful tool invocation.
///
/// The tools run here produce files, not stdout; stderr is kept for
/// diagnostics.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Everything the program wrote to stderr.
    pub stderr: String,
}

/// Seam for invoking external programs.
pub trait ToolRunner {
    /// Run `program` with `args`, waiting at most `timeout`.
    ///
    /// `Ok` only for a zero exit status within the deadline.
    fn run(&self, program: &str, args: &[String], timeout: Duration)
    -> Result<ToolOutput, ToolError>;
}

/// [`ToolRunner`] backed by real subprocesses.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(
        &self,
        program: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<ToolOutput, ToolError> {
        debug!(program, ?args, "running external tool");

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ToolError::Spawn {
                program: program.to_string(),
                source: e,
            })?;

        // Drain stderr on a helper thread so a chatty tool cannot fill the
        // pipe and stall behind it.
        let mut stderr_pipe = child.stderr.take();
        let stderr_reader = std::thread::spawn(move || {
            let mut buf = String::new();
            if let Some(pipe) = stderr_pipe.as_mut() {
                let _ = pipe.read_to_string(&mut buf);
            }
            buf
        });

        let deadline = Instant::now() + timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {
                    if Instant::now() >= deadline {
                        warn!(
                            program,
                            timeout_secs = timeout.as_secs(),
                            "tool ran past its deadline, killing"
                        );
                        let _ = child.kill();
                        let _ = child.wait();
                        let _ = stderr_reader.join();
                        return Err(ToolError::Timeout {
                            program: program.to_string(),
                            timeout_secs: timeout.as_secs(),
                        });
                    }
                    std::thread::sleep(POLL_INTERVAL);
                }
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    let _ = stderr_reader.join();
                    return Err(ToolError::Io {
                        program: program.to_string(),
                        source: e,
                    });
                }
            }
        };

        let stderr = stderr_reader.join().unwrap_or_default();

        if !status.success() {
            return Err(ToolError::Failed {
                program: program.to_string(),
                status,
                stderr: stderr_tail(&stderr),
            });
        }

        debug!(program, ?status, "tool finished");
        Ok(ToolOutput { stderr })
    }
}

/// The last [`STDERR_LIMIT`] characters of stderr, trimmed. Tools print
/// their actual error at the bottom.
fn stderr_tail(stderr: &str) -> String {
    let trimmed = stderr.trim();
    let chars = trimmed.chars().count();
    if chars <= STDERR_LIMIT {
        return trimmed.to_string();
    }
    trimmed
        .chars()
        .skip(chars - STDERR_LIMIT)
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sh(script: &str) -> Vec<String> {
        vec!["-c".into(), script.into()]
    }

    #[test]
    fn stderr_tail_keeps_short_text() {
        assert_eq!(stderr_tail("  oops \n"), "oops");
    }

    #[test]
    fn stderr_tail_keeps_the_end() {
        let long = format!("{}END", "x".repeat(3000));
        let tail = stderr_tail(&long);
        assert_eq!(tail.chars().count(), STDERR_LIMIT);
        assert!(tail.ends_with("END"));
    }

    #[cfg(unix)]
    #[test]
    fn run_succeeds_on_zero_exit() {
        let out = ProcessRunner
            .run("sh", &sh("exit 0"), Duration::from_secs(5))
            .expect("zero exit");
        assert!(out.stderr.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn run_surfaces_status_and_stderr() {
        let err = ProcessRunner
            .run("sh", &sh("echo bad input >&2; exit 3"), Duration::from_secs(5))
            .expect_err("non-zero exit");
        match err {
            ToolError::Failed { status, stderr, .. } => {
                assert_eq!(status.code(), Some(3));
                assert!(stderr.contains("bad input"));
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn run_kills_on_deadline() {
        let started = Instant::now();
        let err = ProcessRunner
            .run("sh", &sh("sleep 30"), Duration::from_millis(200))
            .expect_err("deadline exceeded");
        assert!(matches!(err, ToolError::Timeout { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn spawn_failure_names_the_program() {
        let err = ProcessRunner
            .run("pressrun-no-such-tool", &[], Duration::from_secs(1))
            .expect_err("spawn failure");
        assert!(err.to_string().contains("Is `pressrun-no-such-tool` installed"));
    }
}
