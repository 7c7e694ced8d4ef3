//! Application configuration types.
//!
//! The top-level [`Config`] is deserialized from TOML and carries the decision
//! thresholds, the encode targets, and external tool path overrides. Every
//! section defaults sensibly so an empty file (or no file at all) is valid.
//!
//! Thresholds are plain data passed explicitly into the planner and argument
//! builder; there is no global state to reconfigure.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Decision thresholds, each with a headroom margin so files that are only
/// marginally over a limit are not re-encoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum acceptable frame rate in fps.
    pub max_frame_rate: f64,
    /// Slack above `max_frame_rate` before a change is required.
    pub frame_rate_headroom: f64,
    /// Maximum acceptable height in pixels.
    pub max_height: u32,
    /// Slack above `max_height` before a change is required.
    pub height_headroom: u32,
    /// The video codec name (as reported by the prober) that needs no
    /// re-encode.
    pub video_codec: String,
    /// Maximum acceptable audio bitrate in kbps.
    pub max_audio_bitrate_kbps: u64,
    /// Slack above `max_audio_bitrate_kbps` before a change is required.
    pub audio_bitrate_headroom_kbps: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_frame_rate: 10.0,
            frame_rate_headroom: 1.0,
            max_height: 720,
            height_headroom: 20,
            video_codec: "hevc".to_string(),
            max_audio_bitrate_kbps: 32,
            audio_bitrate_headroom_kbps: 5,
        }
    }
}

impl Limits {
    /// Frame rates at or above this value require a change.
    pub fn frame_rate_cutoff(&self) -> f64 {
        self.max_frame_rate + self.frame_rate_headroom
    }

    /// Heights strictly above this value require a change.
    pub fn height_cutoff(&self) -> u32 {
        self.max_height + self.height_headroom
    }

    /// Audio bitrates strictly above this value (kbps) require a change.
    pub fn audio_bitrate_cutoff(&self) -> u64 {
        self.max_audio_bitrate_kbps + self.audio_bitrate_headroom_kbps
    }
}

/// Encoder settings applied to whichever parameters the plan says must
/// change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Targets {
    /// Target frame rate in fps.
    pub frame_rate: u32,
    /// Target height in pixels; width follows, preserving aspect ratio.
    pub scale_height: u32,
    /// Video encoder name passed to ffmpeg.
    pub video_encoder: String,
    /// Constant rate factor for the video encoder.
    pub video_crf: u32,
    /// Audio encoder name passed to ffmpeg.
    pub audio_encoder: String,
    /// Target audio bitrate in kbps.
    pub audio_bitrate_kbps: u64,
}

impl Default for Targets {
    fn default() -> Self {
        Self {
            frame_rate: 10,
            scale_height: 720,
            video_encoder: "libx265".to_string(),
            video_crf: 28,
            audio_encoder: "libopus".to_string(),
            audio_bitrate_kbps: 32,
        }
    }
}

/// External tool path overrides. When unset, tools are found on `PATH`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Custom path to the ffmpeg executable.
    pub ffmpeg_path: Option<PathBuf>,
    /// Custom path to the ffprobe executable.
    pub ffprobe_path: Option<PathBuf>,
}

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limits: Limits,
    pub targets: Targets,
    pub tools: ToolsConfig,
}

impl Config {
    /// Deserialize a `Config` from a TOML string.
    ///
    /// String-based so the caller can read the file however it sees fit.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| Error::Config(format!("config parse error: {e}")))
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }
}
