//! Effective audio bitrate measurement via an ffmpeg stream-copy pass.
//!
//! Container metadata lies about audio bitrate often enough that the original
//! rate is measured instead: `ffmpeg -i <file> -c copy -f null -` demuxes the
//! whole file without re-encoding and its summary reports the exact number of
//! audio bytes plus the total duration. Dividing one by the other gives the
//! true average rate.

use std::path::Path;
use std::time::Duration;

use sc_core::units::time_to_seconds;
use sc_core::AudioEstimate;
use tracing::{debug, warn};

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Stream-copy passes walk the whole file; allow up to an hour.
const ESTIMATE_TIMEOUT: Duration = Duration::from_secs(3600);

/// Measure the effective audio bitrate of `path`.
///
/// Returns a degraded estimate (`bitrate_kbps: None`) rather than an error
/// when the reported duration is zero, since a rate cannot be derived by
/// dividing by zero and the caller can still plan the video parameters.
///
/// # Errors
///
/// - [`sc_core::Error::Probe`] when the summary lacks the audio size or the
///   timestamp marker.
/// - [`sc_core::Error::Tool`] when ffmpeg fails or times out.
pub async fn estimate_audio_bitrate(
    tools: &ToolRegistry,
    path: &Path,
) -> sc_core::Result<AudioEstimate> {
    let ffmpeg = tools.require("ffmpeg")?;

    let mut cmd = ToolCommand::new(ffmpeg.path.clone());
    cmd.timeout(ESTIMATE_TIMEOUT);
    cmd.arg("-i");
    cmd.arg(path.to_string_lossy().as_ref());
    cmd.args(["-c", "copy", "-f", "null", "-"]);

    // ffmpeg writes the summary to stderr.
    let output = cmd.execute().await?;
    let estimate = parse_copy_summary(&output.stderr)?;
    debug!(
        bitrate_kbps = ?estimate.bitrate_kbps,
        duration_seconds = estimate.duration_seconds,
        "measured audio bitrate"
    );
    Ok(estimate)
}

/// Extract the audio byte count and duration from an ffmpeg stream-copy
/// summary and derive the average bitrate.
fn parse_copy_summary(stderr: &str) -> sc_core::Result<AudioEstimate> {
    let audio_kb = find_audio_kb(stderr).ok_or_else(|| {
        sc_core::Error::probe("ffmpeg", "copy summary has no audio size".to_string())
    })?;
    let duration_seconds = time_to_seconds(stderr, "time=").ok_or_else(|| {
        sc_core::Error::probe("ffmpeg", "copy summary has no timestamp".to_string())
    })?;

    if duration_seconds == 0 {
        warn!("copy pass reported zero duration; audio bitrate unknown");
        return Ok(AudioEstimate {
            bitrate_kbps: None,
            duration_seconds: 0,
        });
    }

    Ok(AudioEstimate {
        bitrate_kbps: Some(audio_kb * 8 / duration_seconds),
        duration_seconds,
    })
}

/// Find the first `audio:<digits>kB` marker and return the number.
fn find_audio_kb(text: &str) -> Option<u64> {
    const MARKER: &str = "audio:";
    for (i, _) in text.match_indices(MARKER) {
        let rest = &text[i + MARKER.len()..];
        let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
        if digits > 0 && rest[digits..].starts_with("kB") {
            return rest[..digits].parse().ok();
        }
    }
    None
}
