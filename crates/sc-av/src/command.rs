//! Builder for executing external tool commands with timeout support.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Default command timeout: 5 minutes.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Output captured from a tool execution.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    /// Process exit status.
    pub status: ExitStatus,
    /// Captured standard output (lossy UTF-8). Empty for streaming runs.
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
}

/// A builder for constructing and executing external tool invocations.
///
/// # Example
///
/// ```no_run
/// use sc_av::ToolCommand;
/// use std::path::PathBuf;
///
/// # async fn example() -> sc_core::Result<()> {
/// let output = ToolCommand::new(PathBuf::from("ffprobe"))
///     .arg("-v").arg("quiet")
///     .arg("-print_format").arg("json")
///     .arg("-show_streams")
///     .arg("/path/to/video.mkv")
///     .execute()
///     .await?;
/// println!("{}", output.stdout);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: PathBuf,
    args: Vec<String>,
    timeout: Duration,
}

impl ToolCommand {
    /// Create a new command for the given program path.
    pub fn new(program: PathBuf) -> Self {
        Self {
            program,
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Append a single argument.
    pub fn arg(&mut self, s: impl Into<String>) -> &mut Self {
        self.args.push(s.into());
        self
    }

    /// Append multiple arguments.
    pub fn args(&mut self, iter: impl IntoIterator<Item = impl Into<String>>) -> &mut Self {
        self.args.extend(iter.into_iter().map(Into::into));
        self
    }

    /// Set the maximum execution time.
    pub fn timeout(&mut self, d: Duration) -> &mut Self {
        self.timeout = d;
        self
    }

    fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.program.to_string_lossy().to_string())
    }

    /// Execute the command, capturing stdout and stderr.
    ///
    /// # Errors
    ///
    /// - Returns [`sc_core::Error::Tool`] if the process times out (message
    ///   includes the timeout duration).
    /// - Returns [`sc_core::Error::Tool`] if the process exits with a non-zero
    ///   status (message includes stderr).
    /// - Returns [`sc_core::Error::Tool`] if spawning the process fails.
    pub async fn execute(&self) -> sc_core::Result<ToolOutput> {
        let program_name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let child = cmd.spawn().map_err(|e| sc_core::Error::Tool {
            tool: program_name.clone(),
            message: format!("failed to spawn: {e}"),
        })?;

        // Wait with timeout.
        let result = tokio::time::timeout(self.timeout, child.wait_with_output()).await;

        match result {
            Ok(Ok(output)) => {
                let tool_output = ToolOutput {
                    status: output.status,
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                };

                if !output.status.success() {
                    return Err(sc_core::Error::Tool {
                        tool: program_name,
                        message: format!(
                            "exited with status {}: {}",
                            output.status,
                            tool_output.stderr.trim()
                        ),
                    });
                }

                Ok(tool_output)
            }
            Ok(Err(e)) => Err(sc_core::Error::Tool {
                tool: program_name,
                message: format!("I/O error waiting for process: {e}"),
            }),
            Err(_elapsed) => {
                // Timeout expired; the cancelled wait_with_output future
                // drops the child and tokio reaps it.
                Err(sc_core::Error::Tool {
                    tool: program_name,
                    message: format!("timed out after {:?}", self.timeout),
                })
            }
        }
    }

    /// Execute the command and deliver each stdout line to `on_line` as it
    /// arrives.
    ///
    /// stderr is drained concurrently so the child can never stall on a full
    /// pipe; its full text is captured and returned (and included in the
    /// error message on non-zero exit).
    ///
    /// If `cancel` is provided and fires mid-run, the child is killed and an
    /// [`sc_core::Error::Tool`] with message "cancelled" is returned.
    pub async fn execute_streaming(
        &self,
        mut on_line: impl FnMut(&str),
        cancel: Option<CancellationToken>,
    ) -> sc_core::Result<ToolOutput> {
        let program_name = self.program_name();
        let tool_err = |message: String| sc_core::Error::Tool {
            tool: program_name.clone(),
            message,
        };

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(Stdio::null());
        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        let mut child = cmd
            .spawn()
            .map_err(|e| tool_err(format!("failed to spawn: {e}")))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| tool_err("stdout pipe missing".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| tool_err("stderr pipe missing".to_string()))?;

        let stderr_task = tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
            String::from_utf8_lossy(&buf).to_string()
        });

        let cancel = cancel.unwrap_or_default();
        let deadline = tokio::time::Instant::now() + self.timeout;
        let mut lines = BufReader::new(stdout).lines();

        loop {
            tokio::select! {
                next = lines.next_line() => match next {
                    Ok(Some(line)) => on_line(&line),
                    Ok(None) => break,
                    Err(e) => {
                        let _ = child.kill().await;
                        let _ = stderr_task.await;
                        return Err(tool_err(format!("I/O error reading stdout: {e}")));
                    }
                },
                _ = cancel.cancelled() => {
                    let _ = child.kill().await;
                    let _ = stderr_task.await;
                    return Err(tool_err("cancelled".to_string()));
                }
                _ = tokio::time::sleep_until(deadline) => {
                    let _ = child.kill().await;
                    let _ = stderr_task.await;
                    return Err(tool_err(format!("timed out after {:?}", self.timeout)));
                }
            }
        }

        let status = tokio::time::timeout(self.timeout, child.wait())
            .await
            .map_err(|_| tool_err(format!("timed out after {:?}", self.timeout)))?
            .map_err(|e| tool_err(format!("I/O error waiting for process: {e}")))?;

        let stderr_text = stderr_task.await.unwrap_or_default();

        if !status.success() {
            return Err(tool_err(format!(
                "exited with status {}: {}",
                status,
                stderr_text.trim()
            )));
        }

        Ok(ToolOutput {
            status,
            stdout: String::new(),
            stderr: stderr_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn execute_echo() {
        // `echo` should be universally available.
        let output = ToolCommand::new(PathBuf::from("echo"))
            .arg("hello")
            .execute()
            .await;

        match output {
            Ok(out) => {
                assert!(out.status.success());
                assert!(out.stdout.trim().contains("hello"));
            }
            Err(_) => {
                // On some minimal environments echo may not exist; skip.
            }
        }
    }

    #[tokio::test]
    async fn execute_nonexistent_tool() {
        let result = ToolCommand::new(PathBuf::from("nonexistent_tool_xyz_12345"))
            .execute()
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn timeout_fires() {
        // `sleep 10` should be killed well before 10 seconds.
        let result = ToolCommand::new(PathBuf::from("sleep"))
            .arg("10")
            .timeout(Duration::from_millis(100))
            .execute()
            .await;
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("timed out"), "unexpected error: {err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn streaming_delivers_lines_in_order() {
        let mut seen = Vec::new();
        let result = ToolCommand::new(PathBuf::from("sh"))
            .arg("-c")
            .arg("printf 'one\\ntwo\\nthree\\n'")
            .execute_streaming(|line| seen.push(line.to_string()), None)
            .await;
        assert!(result.is_ok());
        assert_eq!(seen, vec!["one", "two", "three"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn streaming_nonzero_exit_includes_stderr() {
        let result = ToolCommand::new(PathBuf::from("sh"))
            .arg("-c")
            .arg("echo oops >&2; exit 3")
            .execute_streaming(|_| {}, None)
            .await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("oops"), "unexpected error: {err}");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn streaming_cancellation_kills_child() {
        let token = CancellationToken::new();
        token.cancel();
        let result = ToolCommand::new(PathBuf::from("sleep"))
            .arg("10")
            .execute_streaming(|_| {}, Some(token))
            .await;
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cancelled"), "unexpected error: {err}");
    }
}
