//! Command implementations: analysis, planning, and the supervised transcode
//! with terminal progress rendering.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use sc_av::{analyze, probe_source, run_transcode, ToolRegistry};
use sc_core::units::{format_seconds, sizeof_fmt};
use sc_core::{percent_complete, Config, ProgressEvent, TranscodePlan};
use tokio_util::sync::CancellationToken;

/// Analyze `input` and run the resulting transcode, rendering progress lines
/// as events arrive.
pub async fn run(config: &Config, input: &Path, output: Option<PathBuf>) -> Result<()> {
    if !input.exists() {
        bail!("Input file does not exist: {:?}", input);
    }

    let tools = ToolRegistry::discover(&config.tools);

    tracing::info!("Analyzing {:?}", input);
    let plan = analyze(&tools, input, &config.limits)
        .await
        .context("could not analyze source file")?;

    print_plan(&plan);

    let output = match output {
        Some(p) => p,
        None => input.with_extension("mp4"),
    };
    if output == input {
        bail!(
            "Output path equals input path: {:?} (pass --output to pick another name)",
            output
        );
    }
    println!("Output: {}", output.display());

    // The supervisor owns the child process; rendering state lives here and
    // only this loop mutates it.
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<ProgressEvent>();
    let cancel = CancellationToken::new();

    let ctrl_c_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; stopping transcode");
            ctrl_c_token.cancel();
        }
    });

    let worker = {
        let tools = tools.clone();
        let input = input.to_path_buf();
        let output = output.clone();
        let plan = plan.clone();
        let targets = config.targets.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            run_transcode(
                &tools,
                &input,
                &output,
                &plan,
                &targets,
                move |event| {
                    let _ = tx.send(event);
                },
                Some(cancel),
            )
            .await
        })
    };

    let total = plan.total_seconds;
    while let Some(event) = rx.recv().await {
        render_event(event, total);
    }

    worker
        .await
        .context("transcode worker panicked")?
        .context("transcoding process failed")?;

    println!("Wrote {}", output.display());
    Ok(())
}

/// Render one progress event as a terminal line.
fn render_event(event: ProgressEvent, total_seconds: u64) {
    match event {
        ProgressEvent::Elapsed { seconds } => {
            match percent_complete(seconds, total_seconds) {
                Some(pct) => println!(
                    "  {} / {} ({:.1}%)",
                    format_seconds(seconds),
                    format_seconds(total_seconds),
                    pct.min(100.0)
                ),
                // No known duration; report elapsed time only.
                None => println!("  {}", format_seconds(seconds)),
            }
        }
        ProgressEvent::TotalSize { bytes } => {
            println!("  written {}", sizeof_fmt(bytes));
        }
        ProgressEvent::Completed => {
            println!("  done (100%)");
        }
    }
}

/// Analyze `input` and print the plan without transcoding.
pub async fn show_plan(config: &Config, input: &Path, json: bool) -> Result<()> {
    if !input.exists() {
        bail!("Input file does not exist: {:?}", input);
    }

    let tools = ToolRegistry::discover(&config.tools);
    let plan = analyze(&tools, input, &config.limits)
        .await
        .context("could not analyze source file")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
    } else {
        print_plan(&plan);
        println!(
            "ffmpeg arguments: {}",
            sc_av::build_args(&plan, &config.targets).join(" ")
        );
    }
    Ok(())
}

fn print_plan(plan: &TranscodePlan) {
    let flag = |b: bool| if b { "change" } else { "keep" };
    println!("Frame rate:  {}", flag(plan.frame_rate));
    println!("Resolution:  {}", flag(plan.resolution));
    println!("Video codec: {}", flag(plan.video_codec));
    println!("Audio codec: {}", flag(plan.audio_codec));
    if plan.total_seconds > 0 {
        println!("Duration:    {}", format_seconds(plan.total_seconds));
    }
    if !plan.needs_any_change() {
        println!("File is already within limits; streams will be copied.");
    }
}

/// Probe `file` and display its stream properties.
pub async fn show_probe(config: &Config, file: &Path, json: bool) -> Result<()> {
    if !file.exists() {
        bail!("File does not exist: {:?}", file);
    }

    let tools = ToolRegistry::discover(&config.tools);
    let info = probe_source(&tools, file)
        .await
        .context("could not analyze source file")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("File: {}", file.display());
        println!("Video codec: {}", info.video_codec);
        println!("Height: {}", info.height);
        println!("Frame rate: {:.3} fps", info.frame_rate);
        println!(
            "Audio: {}",
            if info.has_audio { "present" } else { "none" }
        );
    }
    Ok(())
}

/// Report availability of the external tools.
pub fn check_tools(config: &Config) -> Result<()> {
    let tools = ToolRegistry::discover(&config.tools);

    let mut missing = false;
    for info in tools.check_all() {
        if info.available {
            let path = info
                .path
                .map(|p| p.display().to_string())
                .unwrap_or_default();
            let version = info.version.unwrap_or_else(|| "unknown version".into());
            println!("  {:<10} {} ({})", info.name, path, version);
        } else {
            missing = true;
            println!("  {:<10} MISSING", info.name);
        }
    }

    if missing {
        bail!("Some required tools are missing; install ffmpeg and ffprobe");
    }
    println!("All tools available.");
    Ok(())
}
