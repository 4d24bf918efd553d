//! Headless model inspector.
//!
//! ```text
//! model_inspector <model.gltf|glb> [animation.glb] [--seconds N] [--fps N] [--speed X] [--json] [--realtime]
//! ```
//!
//! Loads the model, prints its metadata and placement, then simulates playback at a
//! fixed frame rate and prints every published snapshot. With `--realtime` frames are
//! paced against the wall clock and fed measured deltas instead. When a second file is
//! given its clips are loaded in the background and retargeted onto the model
//! halfway through the run.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use stagehand::Timer;
use stagehand::prelude::*;

struct Args {
    model: PathBuf,
    animation: Option<PathBuf>,
    seconds: f32,
    fps: f32,
    speed: Option<f32>,
    json: bool,
    realtime: bool,
}

impl Args {
    fn parse() -> anyhow::Result<Self> {
        let mut positional = Vec::new();
        let mut seconds = 3.0;
        let mut fps = 60.0;
        let mut speed = None;
        let mut json = false;
        let mut realtime = false;

        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--seconds" => seconds = next_number(&mut iter, "--seconds")?,
                "--fps" => fps = next_number(&mut iter, "--fps")?,
                "--speed" => speed = Some(next_number(&mut iter, "--speed")?),
                "--json" => json = true,
                "--realtime" => realtime = true,
                flag if flag.starts_with("--") => bail!("unknown flag {flag}"),
                _ => positional.push(PathBuf::from(arg)),
            }
        }

        let mut positional = positional.into_iter();
        let Some(model) = positional.next() else {
            bail!(
                "usage: model_inspector <model.gltf|glb> [animation.glb] [--seconds N] [--fps N] [--speed X] [--json] [--realtime]"
            );
        };

        Ok(Self {
            model,
            animation: positional.next(),
            seconds,
            fps,
            speed,
            json,
            realtime,
        })
    }
}

fn next_number(iter: &mut impl Iterator<Item = String>, flag: &str) -> anyhow::Result<f32> {
    let value = iter.next().with_context(|| format!("{flag} needs a value"))?;
    value
        .parse()
        .with_context(|| format!("{flag}: '{value}' is not a number"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse()?;

    let mut viewer = Viewer::gltf(ViewerSettings::default());
    let placement = viewer
        .load_model_path(&args.model)
        .with_context(|| format!("failed to load {}", args.model.display()))?;

    if let Some(info) = viewer.model_info() {
        if args.json {
            println!("{}", serde_json::to_string_pretty(info)?);
        } else {
            println!("Model:      {}", args.model.display());
            println!("Generator:  {}", info.generator.as_deref().unwrap_or("unknown"));
            println!("Version:    {}", info.version);
            println!(
                "Counts:     {} nodes, {} meshes, {} animations, {} skins",
                info.counts.nodes, info.counts.meshes, info.counts.animations, info.counts.skins
            );
            if !info.extensions_used.is_empty() {
                println!("Extensions: {}", info.extensions_used.join(", "));
            }
        }
    }

    print_placement(&placement, args.json)?;

    if let Some(speed) = args.speed {
        viewer.set_speed(speed)?;
    }

    // Background parse of the animation-only file, committed mid-run.
    let mut pending = match &args.animation {
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read {}", path.display()))?;
            let request = viewer.begin_external_clip(bytes)?;
            Some(tokio::spawn(request.resolve()))
        }
        None => None,
    };

    let fps = if args.fps > 0.0 { args.fps } else { 60.0 };
    let frame_time = 1.0 / fps;
    let frames = (args.seconds.max(0.0) * fps).round() as usize;
    let mut timer = Timer::new();

    for frame in 0..frames {
        let dt = if args.realtime {
            tokio::time::sleep(Duration::from_secs_f32(frame_time)).await;
            timer.tick();
            timer.dt_seconds()
        } else {
            frame_time
        };

        if frame == frames / 2
            && let Some(task) = pending.take()
        {
            match task.await? {
                Ok(parsed) => {
                    let outcome = viewer.commit_external(parsed);
                    println!("External clips: {outcome:?}");
                }
                Err(e) => log::warn!("External animation rejected: {e}"),
            }
        }

        if let Some(snapshot) = viewer.update(dt) {
            print_snapshot(frame, &snapshot, args.json)?;
        }
    }

    Ok(())
}

fn print_placement(placement: &Placement, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(placement)?);
        return Ok(());
    }

    if placement.fallback {
        println!("Placement:  no geometry, default camera");
    } else {
        println!(
            "Placement:  offset {:.3}, scale {:.4}",
            placement.offset, placement.scale
        );
        println!(
            "Camera:     {:.3} -> {:.3} (near {:.4}, far {:.1})",
            placement.camera_position,
            placement.camera_target,
            placement.camera_near,
            placement.camera_far
        );
    }
    Ok(())
}

fn print_snapshot(frame: usize, snapshot: &AnimationSnapshot, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string(snapshot)?);
        return Ok(());
    }

    println!(
        "[{frame:>5}] {:<8} {:<24} {:>7.3}/{:<7.3} x{:.2}",
        format!("{:?}", snapshot.status),
        snapshot.current_clip.as_deref().unwrap_or("-"),
        snapshot.time,
        snapshot.duration,
        snapshot.speed
    );
    Ok(())
}
