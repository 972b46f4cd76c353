use std::path::PathBuf;
use std::time::Duration;

use serde::de::{Deserializer, Error as _};
use serde::{Deserialize, Serialize};

pub const DEFAULT_FPS: f64 = 30.0;
pub const DEFAULT_DURATION_FRAMES: u32 = 600;
pub const DEFAULT_WIDTH: u32 = 1920;
pub const DEFAULT_HEIGHT: u32 = 1080;
pub const DEFAULT_EXPORT_DIR: &str = "frames";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Per-frame context supplied by the rendering host.
///
/// The composition is evaluated as a pure function of the current frame and
/// this value, so it carries everything that varies between hosts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoConfig {
    pub fps: f64,
    pub duration_in_frames: u32,
    pub width: u32,
    pub height: u32,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            duration_in_frames: DEFAULT_DURATION_FRAMES,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl VideoConfig {
    pub fn width_f64(&self) -> f64 {
        f64::from(self.width)
    }

    pub fn height_f64(&self) -> f64 {
        f64::from(self.height)
    }

    pub fn total_frames(&self) -> f64 {
        f64::from(self.duration_in_frames)
    }

    pub fn duration_seconds(&self) -> f64 {
        self.total_frames() / self.fps
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fps.is_finite() || self.fps <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "video fps must be a positive number (got {})",
                self.fps
            )));
        }
        if self.duration_in_frames == 0 {
            return Err(ConfigError::Invalid(
                "video duration must cover at least one frame".into(),
            ));
        }
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "video size must be greater than zero (got {}x{})",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SceneConfig {
    pub version: u32,
    #[serde(default)]
    pub video: VideoSection,
    #[serde(default)]
    pub export: ExportSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoSection {
    #[serde(default = "default_fps")]
    pub fps: f64,
    #[serde(default, deserialize_with = "deserialize_duration_opt")]
    pub duration: Option<Duration>,
    #[serde(default)]
    pub duration_frames: Option<u32>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

impl Default for VideoSection {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            duration: None,
            duration_frames: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExportSection {
    #[serde(default = "default_export_dir")]
    pub directory: PathBuf,
}

impl Default for ExportSection {
    fn default() -> Self {
        Self {
            directory: default_export_dir(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            version: 1,
            video: VideoSection::default(),
            export: ExportSection::default(),
        }
    }
}

fn default_fps() -> f64 {
    DEFAULT_FPS
}

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(DEFAULT_EXPORT_DIR)
}

/// Converts a wall-clock duration into a whole number of frames.
pub fn frames_for_duration(duration: Duration, fps: f64) -> u32 {
    (duration.as_secs_f64() * fps).round() as u32
}

/// `video.duration` accepts seconds as a number or a humantime string.
#[derive(Deserialize)]
#[serde(untagged)]
enum DurationValue {
    Seconds(f64),
    Text(String),
}

fn deserialize_duration_opt<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    let duration = match DurationValue::deserialize(deserializer)? {
        DurationValue::Seconds(seconds) if seconds.is_finite() && seconds.is_sign_positive() => {
            Duration::from_secs_f64(seconds)
        }
        DurationValue::Seconds(seconds) => {
            return Err(D::Error::custom(format!(
                "duration must be a non-negative number of seconds (got {seconds})"
            )));
        }
        DurationValue::Text(text) => humantime::parse_duration(&text)
            .map_err(|err| D::Error::custom(format!("invalid duration '{text}': {err}")))?,
    };
    Ok(Some(duration))
}

impl SceneConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let raw: SceneConfig = toml::from_str(input)?;
        raw.validate()?;
        Ok(raw)
    }

    /// Resolves the `[video]` table into the host context the renderer consumes.
    pub fn video_config(&self) -> VideoConfig {
        let video = &self.video;
        let duration_in_frames = match (video.duration_frames, video.duration) {
            (Some(frames), _) => frames,
            (None, Some(duration)) => frames_for_duration(duration, video.fps),
            (None, None) => DEFAULT_DURATION_FRAMES,
        };
        VideoConfig {
            fps: video.fps,
            duration_in_frames,
            width: video.width,
            height: video.height,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != 1 {
            return Err(ConfigError::Invalid(format!(
                "unsupported config version {}; expected 1",
                self.version
            )));
        }

        if self.video.duration.is_some() && self.video.duration_frames.is_some() {
            return Err(ConfigError::Invalid(
                "video.duration and video.duration_frames are mutually exclusive".into(),
            ));
        }

        if self.export.directory.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "export.directory may not be empty".into(),
            ));
        }

        self.video_config().validate()
    }
}
