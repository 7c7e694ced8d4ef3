//! # sc-av
//!
//! Everything in shrinkcast that talks to external tools. This crate wraps
//! the `ffmpeg`/`ffprobe` CLIs behind typed entry points:
//!
//! - **Tool management** ([`ToolRegistry`]) -- discovery of tool binaries on
//!   `PATH` or via config overrides.
//! - **Command execution** ([`ToolCommand`]) -- async subprocess builder with
//!   timeouts, captured or streaming output, and cancellation.
//! - **Probing** ([`probe_source`]) -- stream metadata via ffprobe JSON.
//! - **Bitrate estimation** ([`estimate_audio_bitrate`]) -- effective audio
//!   bitrate measured with a stream-copy pass.
//! - **Analysis** ([`analyze`]) -- probe plus estimate plus decision in one
//!   call, producing a [`sc_core::TranscodePlan`].
//! - **Argument building** ([`build_args`]) -- plan to ffmpeg argument list.
//! - **Transcoding** ([`run_transcode`]) -- supervised execution with live
//!   progress events.

use std::path::Path;

use sc_core::{decide, Limits, TranscodePlan};

pub mod args;
pub mod command;
pub mod estimate;
pub mod probe;
pub mod tools;
pub mod transcode;

pub use args::build_args;
pub use command::{ToolCommand, ToolOutput};
pub use estimate::estimate_audio_bitrate;
pub use probe::probe_source;
pub use tools::{ToolConfig, ToolInfo, ToolRegistry};
pub use transcode::run_transcode;

/// Analyze `path` and decide which transcode parameters must change.
///
/// Probes the stream layout first; when an audio stream is present, a
/// stream-copy pass measures the effective audio bitrate and the total
/// duration. Files without audio plan with a zero duration (progress is then
/// reported as elapsed time only).
///
/// # Errors
///
/// Fails before any transcode is spawned: missing video stream, unparseable
/// probe output, or a tool failure all abort the job here.
pub async fn analyze(
    tools: &ToolRegistry,
    path: &Path,
    limits: &Limits,
) -> sc_core::Result<TranscodePlan> {
    let source = probe_source(tools, path).await?;

    let estimate = if source.has_audio {
        Some(estimate_audio_bitrate(tools, path).await?)
    } else {
        None
    };

    Ok(decide(&source, estimate.as_ref(), limits))
}
