use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use renderer::ExportFormat;

#[derive(Parser, Debug)]
#[command(
    name = "radarsweep",
    author,
    version,
    about = "Radar sweep sequence renderer"
)]
pub struct Cli {
    #[command(flatten)]
    pub video: VideoArgs,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug, Default)]
pub struct VideoArgs {
    /// Scene configuration file; defaults to `radarsweep.toml` in the config directory.
    #[arg(long, value_name = "FILE", env = "RADARSWEEP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Frames per second of the sequence.
    #[arg(long, value_name = "FPS", global = true)]
    pub fps: Option<f64>,

    /// Length of the sequence in frames.
    #[arg(long, value_name = "N", conflicts_with = "duration", global = true)]
    pub frames: Option<u32>,

    /// Length of the sequence as a duration (e.g. `20s`, `1m 30s`).
    #[arg(long, value_name = "DURATION", value_parser = parse_duration, global = true)]
    pub duration: Option<Duration>,

    /// Output resolution (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", value_parser = parse_size, global = true)]
    pub size: Option<(u32, u32)>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export a single frame as a PNG image or a JSON scene graph.
    Still(StillArgs),
    /// Export a numbered PNG sequence.
    Render(RenderArgs),
    /// Print the scene graph of one frame as JSON.
    Scene(SceneArgs),
    /// Print the frame at which every point and edge is revealed.
    Schedule(ScheduleArgs),
    /// Print the resolved configuration locations.
    Where,
}

#[derive(Args, Debug)]
pub struct StillArgs {
    /// Frame to evaluate.
    #[arg(long, default_value_t = 0)]
    pub frame: u32,

    /// Destination file; the extension selects the format (`.png` or `.json`).
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Directory for the numbered frames; defaults to `export.directory`.
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// First frame to export.
    #[arg(long, value_name = "FRAME")]
    pub start: Option<u32>,

    /// Frame to stop before; defaults to the sequence length.
    #[arg(long, value_name = "FRAME")]
    pub end: Option<u32>,
}

#[derive(Args, Debug)]
pub struct SceneArgs {
    /// Frame to evaluate.
    #[arg(long, default_value_t = 0)]
    pub frame: u32,
}

#[derive(Args, Debug)]
pub struct ScheduleArgs {
    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}

pub fn parse_export_format(path: &Path) -> Result<ExportFormat, String> {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => Ok(ExportFormat::Png),
        Some("json") => Ok(ExportFormat::Json),
        None => Err("export path has no extension; expected .png or .json".to_string()),
        Some(other) => Err(format!(
            "unsupported export format '.{other}'; expected .png or .json"
        )),
    }
}

pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("duration must not be empty".to_string());
    }
    if let Ok(seconds) = trimmed.parse::<f64>() {
        if !seconds.is_finite() || seconds <= 0.0 {
            return Err("duration must be a positive number of seconds".to_string());
        }
        return Ok(Duration::from_secs_f64(seconds));
    }
    let duration = humantime::parse_duration(trimmed)
        .map_err(|err| format!("invalid duration '{trimmed}': {err}"))?;
    if duration.is_zero() {
        return Err("duration must be greater than zero".to_string());
    }
    Ok(duration)
}

pub fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("size must not be empty".to_string());
    }
    let (w, h) = trimmed
        .split_once(['x', 'X'])
        .ok_or_else(|| "expected WIDTHxHEIGHT".to_string())?;
    let width = w
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid width in size".to_string())?;
    let height = h
        .trim()
        .parse::<u32>()
        .map_err(|_| "invalid height in size".to_string())?;
    if width == 0 || height == 0 {
        return Err("size dimensions must be greater than zero".into());
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_size_variants() {
        assert_eq!(parse_size("1280x720").unwrap(), (1280, 720));
        assert_eq!(parse_size(" 64X48 ").unwrap(), (64, 48));
        assert!(parse_size("1280").is_err());
        assert!(parse_size("0x720").is_err());
        assert!(parse_size("widexhigh").is_err());
    }

    #[test]
    fn parses_durations() {
        assert_eq!(parse_duration("20s").unwrap(), Duration::from_secs(20));
        assert_eq!(parse_duration("1m 30s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("2.5").unwrap(), Duration::from_millis(2500));
        assert!(parse_duration("0").is_err());
        assert!(parse_duration("soon").is_err());
    }

    #[test]
    fn export_format_follows_extension() {
        assert_eq!(
            parse_export_format(Path::new("out/frame.PNG")).unwrap(),
            ExportFormat::Png
        );
        assert_eq!(
            parse_export_format(Path::new("scene.json")).unwrap(),
            ExportFormat::Json
        );
        assert!(parse_export_format(Path::new("frame")).is_err());
        assert!(parse_export_format(Path::new("frame.exr")).is_err());
    }

    #[test]
    fn global_options_follow_the_subcommand() {
        let cli = Cli::try_parse_from([
            "radarsweep",
            "still",
            "--frame",
            "12",
            "--output",
            "a.png",
            "--size",
            "320x180",
            "--fps",
            "24",
        ])
        .unwrap();
        assert_eq!(cli.video.size, Some((320, 180)));
        assert_eq!(cli.video.fps, Some(24.0));
        match cli.command {
            Command::Still(args) => {
                assert_eq!(args.frame, 12);
                assert_eq!(args.output, PathBuf::from("a.png"));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn frames_and_duration_conflict() {
        let result = Cli::try_parse_from([
            "radarsweep",
            "--frames",
            "100",
            "--duration",
            "5s",
            "schedule",
        ]);
        assert!(result.is_err());
    }
}
