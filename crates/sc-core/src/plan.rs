//! Transcode plan decision: which parameters must change.

use serde::{Deserialize, Serialize};

use crate::config::Limits;

/// The source-file properties the planner looks at, extracted from a stream
/// probe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    /// Frame rate in fps.
    pub frame_rate: f64,
    /// Height in pixels.
    pub height: u32,
    /// Video codec name as reported by the prober (e.g. "hevc", "h264").
    pub video_codec: String,
    /// Whether the file has at least one audio stream.
    pub has_audio: bool,
}

/// Effective audio bitrate measured by a stream-copy pass over the file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AudioEstimate {
    /// Measured bitrate in kbps. `None` when the pass reported a zero
    /// duration and no rate could be derived.
    pub bitrate_kbps: Option<u64>,
    /// Total duration in seconds.
    pub duration_seconds: u64,
}

/// The decided set of per-parameter change flags plus total duration.
///
/// Immutable: produced once per job, consumed by the argument builder, then
/// discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscodePlan {
    /// The frame rate exceeds the limit.
    pub frame_rate: bool,
    /// The resolution exceeds the limit. Implies a video re-encode: scaling
    /// cannot be expressed as a stream copy.
    pub resolution: bool,
    /// The video codec is not the target codec.
    pub video_codec: bool,
    /// The audio bitrate exceeds the limit. Always false without an audio
    /// stream.
    pub audio_codec: bool,
    /// Total duration in seconds, or 0 when no audio stream was present to
    /// measure it.
    pub total_seconds: u64,
}

impl TranscodePlan {
    /// Whether the video stream must be re-encoded (rather than copied).
    pub fn needs_video_encode(&self) -> bool {
        self.resolution || self.video_codec
    }

    /// Whether any parameter must change at all.
    pub fn needs_any_change(&self) -> bool {
        self.frame_rate || self.resolution || self.video_codec || self.audio_codec
    }
}

/// Decide which parameters must change for `source` to fit within `limits`.
///
/// Pure function of its inputs. Each threshold carries a headroom margin (see
/// [`Limits`]) so files that are already marginally compliant are left alone.
/// The audio decision is only evaluated when an audio stream exists and a
/// bitrate could be measured.
pub fn decide(
    source: &SourceInfo,
    audio: Option<&AudioEstimate>,
    limits: &Limits,
) -> TranscodePlan {
    let audio_codec = source.has_audio
        && audio
            .and_then(|a| a.bitrate_kbps)
            .is_some_and(|kbps| kbps > limits.audio_bitrate_cutoff());

    TranscodePlan {
        frame_rate: source.frame_rate >= limits.frame_rate_cutoff(),
        resolution: source.height > limits.height_cutoff(),
        video_codec: source.video_codec != limits.video_codec,
        audio_codec,
        total_seconds: audio.map(|a| a.duration_seconds).unwrap_or(0),
    }
}
