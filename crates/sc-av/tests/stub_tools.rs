//! Integration tests driving the analysis pipeline and the progress
//! supervisor against stub ffmpeg/ffprobe shell scripts.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use sc_av::{analyze, run_transcode, ToolRegistry};
use sc_core::config::ToolsConfig;
use sc_core::{Limits, ProgressEvent, Targets, TranscodePlan};

/// Write an executable shell script and return its path.
fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// A registry whose ffmpeg/ffprobe are stubs emitting canned output.
///
/// The ffprobe stub reports a 60fps 1080p h264 file with an aac audio
/// stream. The ffmpeg stub answers the stream-copy estimation pass with a
/// summary claiming 960kB of audio over two minutes (64 kbps), and any other
/// invocation with a short progress stream.
fn stub_registry(dir: &Path) -> ToolRegistry {
    let ffprobe = write_script(
        dir,
        "ffprobe",
        r#"cat <<'EOF'
{"streams":[{"codec_type":"video","codec_name":"h264","height":1080,"r_frame_rate":"60/1"},{"codec_type":"audio","codec_name":"aac"}]}
EOF"#,
    );
    let ffmpeg = write_script(
        dir,
        "ffmpeg",
        r#"case "$*" in
*"-f null"*)
    printf 'size=N/A time=00:02:00.00 bitrate=N/A speed=100x\n' >&2
    printf 'video:5000kB audio:960kB subtitle:0kB other streams:0kB\n' >&2
    ;;
*)
    printf 'frame=10\n'
    printf 'out_time=00:00:30.000000\n'
    printf 'total_size=1048576\n'
    printf 'out_time=00:01:00.000000\n'
    printf 'total_size=524288\n'
    printf 'progress=end\n'
    ;;
esac
exit 0"#,
    );

    ToolRegistry::discover(&ToolsConfig {
        ffmpeg_path: Some(ffmpeg),
        ffprobe_path: Some(ffprobe),
    })
}

#[tokio::test]
async fn analyze_flags_every_parameter() {
    let dir = tempfile::tempdir().unwrap();
    let tools = stub_registry(dir.path());

    let plan = analyze(&tools, Path::new("source.mp4"), &Limits::default())
        .await
        .unwrap();

    assert_eq!(
        plan,
        TranscodePlan {
            frame_rate: true,
            resolution: true,
            video_codec: true,
            audio_codec: true,
            total_seconds: 120,
        }
    );
}

#[tokio::test]
async fn transcode_emits_events_in_stream_order() {
    let dir = tempfile::tempdir().unwrap();
    let tools = stub_registry(dir.path());
    let plan = TranscodePlan {
        frame_rate: true,
        resolution: true,
        video_codec: true,
        audio_codec: true,
        total_seconds: 120,
    };

    let mut events = Vec::new();
    run_transcode(
        &tools,
        Path::new("in.mp4"),
        Path::new("out.mp4"),
        &plan,
        &Targets::default(),
        |e| events.push(e),
        None,
    )
    .await
    .unwrap();

    assert_eq!(
        events,
        vec![
            ProgressEvent::Elapsed { seconds: 30 },
            ProgressEvent::TotalSize { bytes: 1048576 },
            ProgressEvent::Elapsed { seconds: 60 },
            // A size smaller than one already seen is clamped upward.
            ProgressEvent::TotalSize { bytes: 1048576 },
            ProgressEvent::Completed,
        ]
    );
}

#[tokio::test]
async fn failing_transcoder_surfaces_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let ffprobe = write_script(dir.path(), "ffprobe", "exit 0");
    let ffmpeg = write_script(
        dir.path(),
        "ffmpeg",
        "echo 'Unknown encoder libx265' >&2\nexit 1",
    );
    let tools = ToolRegistry::discover(&ToolsConfig {
        ffmpeg_path: Some(ffmpeg),
        ffprobe_path: Some(ffprobe),
    });

    let err = run_transcode(
        &tools,
        Path::new("in.mp4"),
        Path::new("out.mp4"),
        &TranscodePlan {
            frame_rate: false,
            resolution: false,
            video_codec: true,
            audio_codec: false,
            total_seconds: 0,
        },
        &Targets::default(),
        |_| {},
        None,
    )
    .await
    .unwrap_err();

    let msg = err.to_string();
    assert!(msg.contains("Unknown encoder"), "unexpected error: {msg}");
}
