//! Progress-supervised transcode execution.
//!
//! Launches ffmpeg with a plan-derived argument list, reads the
//! `-progress -` key=value stream from its stdout line by line, and
//! translates the lines into [`ProgressEvent`]s as they arrive.

use std::path::Path;
use std::time::Duration;

use sc_core::units::time_to_seconds;
use sc_core::{ProgressEvent, Targets, TranscodePlan};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::args::build_args;
use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Transcodes can legitimately run for hours; allow a full day.
const TRANSCODE_TIMEOUT: Duration = Duration::from_secs(86_400);

/// Run the transcode described by `plan` from `input` to `output`, delivering
/// a [`ProgressEvent`] to `on_event` for every progress line recognized.
///
/// Events are delivered in stream order. `Elapsed` and `TotalSize` values are
/// clamped to be monotonically non-decreasing within the run; a terminal
/// [`ProgressEvent::Completed`] is delivered once the stream ends and the
/// process has exited cleanly.
///
/// Unrecognized progress lines (ffmpeg emits many other key=value fields) are
/// ignored. If `cancel` fires mid-run the child is killed and an
/// [`sc_core::Error::Tool`] is returned; any partial output file is left on
/// disk for the caller to deal with.
pub async fn run_transcode(
    tools: &ToolRegistry,
    input: &Path,
    output: &Path,
    plan: &TranscodePlan,
    targets: &Targets,
    mut on_event: impl FnMut(ProgressEvent),
    cancel: Option<CancellationToken>,
) -> sc_core::Result<()> {
    let ffmpeg = tools.require("ffmpeg")?;

    let mut cmd = ToolCommand::new(ffmpeg.path.clone());
    cmd.timeout(TRANSCODE_TIMEOUT);
    cmd.arg("-i");
    cmd.arg(input.to_string_lossy().as_ref());
    cmd.args(build_args(plan, targets));
    cmd.arg(output.to_string_lossy().as_ref());

    info!(input = %input.display(), output = %output.display(), "starting transcode");

    let mut last_elapsed = 0u64;
    let mut last_size = 0u64;

    cmd.execute_streaming(
        |line| {
            if let Some(event) = parse_progress_line(line) {
                let event = match event {
                    ProgressEvent::Elapsed { seconds } => {
                        last_elapsed = last_elapsed.max(seconds);
                        ProgressEvent::Elapsed {
                            seconds: last_elapsed,
                        }
                    }
                    ProgressEvent::TotalSize { bytes } => {
                        last_size = last_size.max(bytes);
                        ProgressEvent::TotalSize { bytes: last_size }
                    }
                    other => other,
                };
                on_event(event);
            }
        },
        cancel,
    )
    .await?;

    debug!(
        elapsed_seconds = last_elapsed,
        total_bytes = last_size,
        "transcode finished"
    );
    on_event(ProgressEvent::Completed);
    Ok(())
}

/// Translate one progress line into an event, or `None` for the many
/// key=value fields not consumed here.
fn parse_progress_line(line: &str) -> Option<ProgressEvent> {
    if line.starts_with("out_time=") {
        let seconds = time_to_seconds(line, "out_time=")?;
        return Some(ProgressEvent::Elapsed { seconds });
    }
    if let Some(rest) = line.strip_prefix("total_size=") {
        let bytes = first_integer(rest)?;
        return Some(ProgressEvent::TotalSize { bytes });
    }
    None
}

/// Extract the first embedded unsigned integer literal.
fn first_integer(text: &str) -> Option<u64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let len = rest.bytes().take_while(u8::is_ascii_digit).count();
    rest[..len].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_time_line() {
        assert_eq!(
            parse_progress_line("out_time=00:00:30.123456"),
            Some(ProgressEvent::Elapsed { seconds: 30 })
        );
    }

    #[test]
    fn total_size_line() {
        assert_eq!(
            parse_progress_line("total_size=1048576"),
            Some(ProgressEvent::TotalSize { bytes: 1048576 })
        );
    }

    #[test]
    fn unrelated_lines_are_ignored() {
        for line in [
            "frame=100",
            "fps=25.0",
            "bitrate= 200.3kbits/s",
            "progress=continue",
            "out_time_ms=30123456",
            "",
        ] {
            assert_eq!(parse_progress_line(line), None, "line: {line:?}");
        }
    }

    #[test]
    fn malformed_out_time_is_ignored() {
        assert_eq!(parse_progress_line("out_time=N/A"), None);
        assert_eq!(parse_progress_line("out_time=1:2:3"), None);
    }

    #[test]
    fn first_integer_extraction() {
        assert_eq!(first_integer("1048576"), Some(1048576));
        assert_eq!(first_integer("  42trailing"), Some(42));
        assert_eq!(first_integer("N/A"), None);
    }
}
