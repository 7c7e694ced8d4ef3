//! Deterministic mapping from a transcode plan to ffmpeg arguments.

use sc_core::{Targets, TranscodePlan};

/// Build the ordered ffmpeg argument list for `plan`.
///
/// The list never contains input or output paths; the caller inserts the
/// input path (after `-i`) before it and appends the output path after it.
/// Same plan in, byte-identical list out.
///
/// Order matters to ffmpeg:
/// 1. `-y` (overwrite output) always comes first.
/// 2. `-r <fps>` when the frame rate must drop.
/// 3. One video block. A resolution change subsumes the codec switch, since
///    scaling forces a re-encode anyway: scale filter plus encoder plus CRF
///    in a single emission. A codec-only change emits encoder plus CRF
///    without the filter. Otherwise the video stream is copied.
/// 4. One audio block: encoder plus bitrate, or stream copy.
/// 5. The fixed trailer: experimental codec negotiation, machine-readable
///    progress on stdout, statistics suppressed.
pub fn build_args(plan: &TranscodePlan, targets: &Targets) -> Vec<String> {
    let mut args: Vec<String> = vec!["-y".into()];

    if plan.frame_rate {
        args.push("-r".into());
        args.push(targets.frame_rate.to_string());
    }

    if plan.resolution {
        args.push("-vf".into());
        args.push(format!("scale=-2:{}", targets.scale_height));
        args.push("-c:v".into());
        args.push(targets.video_encoder.clone());
        args.push("-crf".into());
        args.push(targets.video_crf.to_string());
    } else if plan.video_codec {
        args.push("-c:v".into());
        args.push(targets.video_encoder.clone());
        args.push("-crf".into());
        args.push(targets.video_crf.to_string());
    } else {
        args.push("-c:v".into());
        args.push("copy".into());
    }

    if plan.audio_codec {
        args.push("-c:a".into());
        args.push(targets.audio_encoder.clone());
        args.push("-b:a".into());
        args.push(format!("{}K", targets.audio_bitrate_kbps));
    } else {
        args.push("-c:a".into());
        args.push("copy".into());
    }

    args.extend(
        ["-strict", "experimental", "-progress", "-", "-nostats"]
            .map(String::from),
    );

    args
}
