//! Progress events emitted while supervising a transcode.
//!
//! Events are transient: the supervisor produces them in the order the
//! underlying progress lines arrive, the front end renders the latest value
//! of each kind, and nothing is stored beyond that.

use serde::{Deserialize, Serialize};

/// One normalized update derived from the external transcoder's textual
/// progress stream.
///
/// Within one job, `Elapsed.seconds` and `TotalSize.bytes` are monotonically
/// non-decreasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProgressEvent {
    /// Output timestamp the transcoder has reached so far.
    Elapsed {
        /// Seconds of output produced.
        seconds: u64,
    },
    /// Cumulative size of the output written so far.
    TotalSize {
        /// Bytes written.
        bytes: u64,
    },
    /// Terminal event: the progress stream ended and the process exited
    /// cleanly.
    Completed,
}

/// Percentage of the job completed, or `None` when the total duration is
/// unknown (zero). Callers with no total report elapsed time only.
pub fn percent_complete(elapsed_seconds: u64, total_seconds: u64) -> Option<f64> {
    if total_seconds == 0 {
        return None;
    }
    Some(elapsed_seconds as f64 / total_seconds as f64 * 100.0)
}
