//! Stream probing via `ffprobe`.
//!
//! Shells out to `ffprobe -v quiet -print_format json -show_streams` and maps
//! the JSON output into an [`sc_core::SourceInfo`].

use std::path::Path;

use serde::Deserialize;
use sc_core::SourceInfo;

use crate::command::ToolCommand;
use crate::tools::ToolRegistry;

/// Probe `path` and extract the properties the planner needs.
///
/// The first stream with `codec_type == "video"` is the authoritative video
/// stream; audio presence means at least one stream with
/// `codec_type == "audio"` exists.
///
/// # Errors
///
/// - [`sc_core::Error::MissingVideoStream`] when no video stream is present.
/// - [`sc_core::Error::Probe`] when ffprobe output cannot be interpreted
///   (malformed JSON, missing or malformed frame rate).
/// - [`sc_core::Error::Tool`] when ffprobe itself fails to run.
pub async fn probe_source(tools: &ToolRegistry, path: &Path) -> sc_core::Result<SourceInfo> {
    let ffprobe = tools.require("ffprobe")?;

    let mut cmd = ToolCommand::new(ffprobe.path.clone());
    cmd.timeout(ffprobe.timeout);
    cmd.args(["-v", "quiet", "-print_format", "json", "-show_streams"]);
    cmd.arg(path.to_string_lossy().as_ref());

    let output = cmd.execute().await?;
    let ff: FfprobeOutput = serde_json::from_str(&output.stdout)
        .map_err(|e| sc_core::Error::probe("ffprobe", format!("JSON parse error: {e}")))?;

    parse_probe_output(path, ff)
}

// ---------------------------------------------------------------------------
// JSON structures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
}

// ---------------------------------------------------------------------------
// Parsing helpers
// ---------------------------------------------------------------------------

fn parse_probe_output(path: &Path, output: FfprobeOutput) -> sc_core::Result<SourceInfo> {
    let has_audio = output
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    let video = output
        .streams
        .into_iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| sc_core::Error::missing_video_stream(path))?;

    let rate_str = video.r_frame_rate.as_deref().unwrap_or("");
    let frame_rate = parse_frame_rate(rate_str).ok_or_else(|| {
        sc_core::Error::probe("ffprobe", format!("malformed frame rate {rate_str:?}"))
    })?;

    Ok(SourceInfo {
        frame_rate,
        height: video.height.unwrap_or(0),
        video_codec: video.codec_name.unwrap_or_default(),
        has_audio,
    })
}

/// Parse ffprobe's rational frame rate (`"30000/1001"`, `"25/1"`, or a bare
/// decimal). A zero denominator yields 0.0 rather than a parse failure; files
/// with no frames report `0/0` and those should plan as "no rate change", not
/// abort the analysis.
fn parse_frame_rate(rate_str: &str) -> Option<f64> {
    if let Some((num, den)) = rate_str.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den == 0.0 {
            return Some(0.0);
        }
        return Some(num / den);
    }
    rate_str.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn stream(codec_type: &str, codec_name: &str, height: u32, rate: &str) -> FfprobeStream {
        FfprobeStream {
            codec_type: Some(codec_type.into()),
            codec_name: Some(codec_name.into()),
            height: Some(height),
            r_frame_rate: Some(rate.into()),
        }
    }

    #[test]
    fn frame_rate_fraction() {
        assert!((parse_frame_rate("24000/1001").unwrap() - 23.976).abs() < 0.01);
        assert_eq!(parse_frame_rate("30/1"), Some(30.0));
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("0/0"), Some(0.0));
        assert_eq!(parse_frame_rate("invalid"), None);
        assert_eq!(parse_frame_rate(""), None);
    }

    #[test]
    fn first_video_stream_wins() {
        let output = FfprobeOutput {
            streams: vec![
                stream("audio", "aac", 0, "0/0"),
                stream("video", "h264", 1080, "30000/1001"),
                stream("video", "mjpeg", 320, "25/1"),
            ],
        };
        let info = parse_probe_output(Path::new("in.mp4"), output).unwrap();
        assert_eq!(info.video_codec, "h264");
        assert_eq!(info.height, 1080);
        assert!((info.frame_rate - 29.97).abs() < 0.01);
        assert!(info.has_audio);
    }

    #[test]
    fn audio_only_file_is_an_error() {
        let output = FfprobeOutput {
            streams: vec![stream("audio", "mp3", 0, "0/0")],
        };
        let err = parse_probe_output(Path::new("song.mp3"), output).unwrap_err();
        match err {
            sc_core::Error::MissingVideoStream { path } => {
                assert_eq!(path, PathBuf::from("song.mp3"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_frame_rate_is_a_probe_error() {
        let output = FfprobeOutput {
            streams: vec![stream("video", "h264", 720, "not-a-rate")],
        };
        let err = parse_probe_output(Path::new("in.mp4"), output).unwrap_err();
        assert!(matches!(err, sc_core::Error::Probe { .. }));
    }

    #[test]
    fn video_without_audio() {
        let output = FfprobeOutput {
            streams: vec![stream("video", "hevc", 720, "10/1")],
        };
        let info = parse_probe_output(Path::new("in.mp4"), output).unwrap();
        assert!(!info.has_audio);
    }
}
