//! Unified error type for shrinkcast.
//!
//! All crates funnel their failures into [`Error`]. Every planning failure
//! aborts a job before any transcode process is spawned; only [`Error::Tool`]
//! can occur after spawn, in which case any partial output file is left on
//! disk for the caller to inspect.

use std::path::PathBuf;

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning or supervising a transcode.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input file has no video stream; there is nothing to transcode.
    #[error("no video stream in {}", path.display())]
    MissingVideoStream {
        /// The file that was probed.
        path: PathBuf,
    },

    /// Output from an external tool did not match the expected format.
    #[error("probe error [{tool}]: {message}")]
    Probe {
        /// Name of the tool whose output could not be parsed.
        tool: String,
        /// Human-readable description of the mismatch.
        message: String,
    },

    /// An external tool failed to spawn, timed out, or exited with a failure
    /// status.
    #[error("tool error [{tool}]: {message}")]
    Tool {
        /// Name of the tool that failed.
        tool: String,
        /// Human-readable error description.
        message: String,
    },

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// An I/O operation failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Convenience constructor for [`Error::MissingVideoStream`].
    pub fn missing_video_stream(path: impl Into<PathBuf>) -> Self {
        Error::MissingVideoStream { path: path.into() }
    }

    /// Convenience constructor for [`Error::Probe`].
    pub fn probe(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Probe {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Convenience constructor for [`Error::Tool`].
    pub fn tool(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_video_stream_display() {
        let err = Error::missing_video_stream("/tmp/clip.webm");
        assert_eq!(err.to_string(), "no video stream in /tmp/clip.webm");
    }

    #[test]
    fn probe_display() {
        let err = Error::probe("ffprobe", "invalid frame rate");
        assert_eq!(err.to_string(), "probe error [ffprobe]: invalid frame rate");
    }

    #[test]
    fn tool_display() {
        let err = Error::tool("ffmpeg", "exited with status 1");
        assert_eq!(err.to_string(), "tool error [ffmpeg]: exited with status 1");
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn result_alias() {
        fn ok_fn() -> Result<i32> {
            Ok(7)
        }
        assert_eq!(ok_fn().unwrap(), 7);
    }
}
