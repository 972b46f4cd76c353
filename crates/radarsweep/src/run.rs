use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use renderer::{export_frame, export_sequence, Composition};
use sceneconfig::{frames_for_duration, SceneConfig, VideoConfig};
use scheduler::SECONDS_PER_ROTATION;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::cli::{
    parse_export_format, Cli, Command, RenderArgs, SceneArgs, ScheduleArgs, StillArgs, VideoArgs,
};
use crate::paths::AppPaths;

pub fn initialise_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Explicit(PathBuf),
    Discovered(PathBuf),
    Defaults,
}

pub fn run(cli: Cli) -> Result<()> {
    let paths = AppPaths::discover()?;
    let (config, source) = load_config(cli.video.config.as_deref(), &paths)?;
    let video = resolve_video(&config, &cli.video)?;
    tracing::debug!(
        config_dir = %paths.config_dir().display(),
        source = ?source,
        fps = video.fps,
        frames = video.duration_in_frames,
        width = video.width,
        height = video.height,
        "resolved radarsweep configuration"
    );

    let composition = Composition::new(video);
    match cli.command {
        Command::Still(args) => run_still(&composition, args),
        Command::Render(args) => run_render(&composition, &config, args),
        Command::Scene(args) => run_scene(&composition, args),
        Command::Schedule(args) => run_schedule(&composition, args),
        Command::Where => run_where(&paths, &source),
    }
}

pub fn load_config(
    explicit: Option<&Path>,
    paths: &AppPaths,
) -> Result<(SceneConfig, ConfigSource)> {
    if let Some(path) = explicit {
        let config = read_config(path)?;
        return Ok((config, ConfigSource::Explicit(path.to_path_buf())));
    }

    let discovered = paths.config_file();
    if discovered.is_file() {
        let config = read_config(&discovered)?;
        return Ok((config, ConfigSource::Discovered(discovered)));
    }

    tracing::debug!(path = %discovered.display(), "no scene config found; using defaults");
    Ok((SceneConfig::default(), ConfigSource::Defaults))
}

fn read_config(path: &Path) -> Result<SceneConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read scene config {}", path.display()))?;
    let config = SceneConfig::from_toml_str(&raw)
        .with_context(|| format!("failed to load scene config {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded scene config");
    Ok(config)
}

/// Applies command-line overrides on top of the configured video settings.
pub fn resolve_video(config: &SceneConfig, overrides: &VideoArgs) -> Result<VideoConfig> {
    let mut video = config.video_config();
    if let Some(fps) = overrides.fps {
        video.fps = fps;
        // A configured wall-clock duration keeps its length at the new rate.
        if let (None, Some(duration)) = (config.video.duration_frames, config.video.duration) {
            video.duration_in_frames = frames_for_duration(duration, fps);
        }
    }
    if let Some(frames) = overrides.frames {
        video.duration_in_frames = frames;
    }
    if let Some(duration) = overrides.duration {
        video.duration_in_frames = frames_for_duration(duration, video.fps);
    }
    if let Some((width, height)) = overrides.size {
        video.width = width;
        video.height = height;
    }
    video
        .validate()
        .context("invalid video settings after applying command-line overrides")?;
    Ok(video)
}

fn run_still(composition: &Composition, args: StillArgs) -> Result<()> {
    let format = parse_export_format(&args.output).map_err(anyhow::Error::msg)?;
    let total = composition.video().duration_in_frames;
    if args.frame >= total {
        tracing::warn!(
            frame = args.frame,
            total,
            "frame lies beyond the end of the sequence"
        );
    }
    export_frame(composition, args.frame, &args.output, format)?;
    tracing::info!(frame = args.frame, path = %args.output.display(), "exported still frame");
    Ok(())
}

fn run_render(composition: &Composition, config: &SceneConfig, args: RenderArgs) -> Result<()> {
    let directory = args
        .output
        .unwrap_or_else(|| config.export.directory.clone());
    let start = args.start.unwrap_or(0);
    let end = args
        .end
        .unwrap_or(composition.video().duration_in_frames);
    let report = export_sequence(composition, start..end, &directory)?;
    println!(
        "Exported {} frames to {}",
        report.frames_written,
        report.directory.display()
    );
    Ok(())
}

fn run_scene(composition: &Composition, args: SceneArgs) -> Result<()> {
    let scene = composition.frame(args.frame);
    let json = scene.to_json().context("failed to serialise scene graph")?;
    println!("{json}");
    Ok(())
}

#[derive(Debug, Serialize)]
struct ScheduleReport {
    fps: f64,
    total_frames: u32,
    seconds_per_rotation: f64,
    rotations: f64,
    points: Vec<PointReveal>,
}

#[derive(Debug, Serialize)]
struct PointReveal {
    index: usize,
    angle_degrees: f64,
    delay: f64,
    is_special: bool,
    reveal_frame: f64,
    edge_reveal_frame: f64,
}

fn schedule_report(composition: &Composition) -> ScheduleReport {
    let schedule = composition.schedule();
    let points = composition
        .layout()
        .points()
        .iter()
        .enumerate()
        .map(|(index, point)| PointReveal {
            index,
            angle_degrees: point.angle.to_degrees(),
            delay: point.delay,
            is_special: point.is_special,
            reveal_frame: schedule.point(index),
            edge_reveal_frame: schedule.edge(index),
        })
        .collect();
    let video = composition.video();
    ScheduleReport {
        fps: video.fps,
        total_frames: video.duration_in_frames,
        seconds_per_rotation: SECONDS_PER_ROTATION,
        rotations: schedule.rotations(),
        points,
    }
}

fn run_schedule(composition: &Composition, args: ScheduleArgs) -> Result<()> {
    let report = schedule_report(composition);
    if args.json {
        let json =
            serde_json::to_string_pretty(&report).context("failed to serialise schedule")?;
        println!("{json}");
        return Ok(());
    }

    println!(
        "{} points over {} frames at {} fps ({:.3} rotations)",
        report.points.len(),
        report.total_frames,
        report.fps,
        report.rotations
    );
    println!(
        "  {:>5}  {:>9}  {:>7}  {:>7}  {:>10}  {:>10}",
        "index", "angle", "delay", "special", "point", "edge"
    );
    for point in &report.points {
        println!(
            "  {:>5}  {:>9.3}  {:>7.4}  {:>7}  {:>10.2}  {:>10.2}",
            point.index,
            point.angle_degrees,
            point.delay,
            if point.is_special { "yes" } else { "" },
            point.reveal_frame,
            point.edge_reveal_frame
        );
    }
    Ok(())
}

fn run_where(paths: &AppPaths, source: &ConfigSource) -> Result<()> {
    println!("Configuration:");
    println!("  config dir:  {}", paths.config_dir().display());
    println!("  config file: {}", paths.config_file().display());
    match source {
        ConfigSource::Explicit(path) => println!("  active:      {} (--config)", path.display()),
        ConfigSource::Discovered(path) => println!("  active:      {}", path.display()),
        ConfigSource::Defaults => println!("  active:      built-in defaults"),
    }
    Ok(())
}
