use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::raster::rasterize;
use crate::scene::{Composition, Scene};

/// File formats supported by the export pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Rasterized frame.
    Png,
    /// Declarative scene graph for an external renderer.
    Json,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Json => "json",
        }
    }
}

/// Summary of a finished sequence export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceReport {
    pub directory: PathBuf,
    pub frames_written: u32,
}

pub fn frame_file_name(frame: u32, format: ExportFormat) -> String {
    format!("frame_{frame:05}.{}", format.extension())
}

/// Writes an already composed scene to `path`.
pub fn write_scene(scene: &Scene, path: &Path, format: ExportFormat) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create export directory {}", parent.display()))?;
    }

    match format {
        ExportFormat::Png => {
            let image = rasterize(scene);
            image
                .save_with_format(path, image::ImageFormat::Png)
                .with_context(|| format!("failed to write PNG frame to {}", path.display()))?;
        }
        ExportFormat::Json => {
            let json = scene.to_json().context("failed to serialise scene graph")?;
            fs::write(path, json)
                .with_context(|| format!("failed to write scene graph to {}", path.display()))?;
        }
    }

    tracing::debug!(
        frame = scene.frame,
        nodes = scene.node_count(),
        path = %path.display(),
        ?format,
        "exported frame"
    );
    Ok(())
}

pub fn export_frame(
    composition: &Composition,
    frame: u32,
    path: &Path,
    format: ExportFormat,
) -> Result<()> {
    write_scene(&composition.frame(frame), path, format)
}

/// Renders every frame in `frames` into `directory` as numbered PNG files.
pub fn export_sequence(
    composition: &Composition,
    frames: Range<u32>,
    directory: &Path,
) -> Result<SequenceReport> {
    if frames.is_empty() {
        bail!(
            "frame range {}..{} is empty; nothing to export",
            frames.start,
            frames.end
        );
    }

    fs::create_dir_all(directory).with_context(|| {
        format!("failed to create export directory {}", directory.display())
    })?;

    let total = frames.end - frames.start;
    tracing::info!(
        directory = %directory.display(),
        start = frames.start,
        end = frames.end,
        "exporting frame sequence"
    );

    for (done, frame) in frames.clone().enumerate() {
        let path = directory.join(frame_file_name(frame, ExportFormat::Png));
        export_frame(composition, frame, &path, ExportFormat::Png)?;
        let done = done as u32 + 1;
        if done % 50 == 0 || done == total {
            tracing::info!(done, total, "frame sequence progress");
        }
    }

    Ok(SequenceReport {
        directory: directory.to_path_buf(),
        frames_written: total,
    })
}

#[cfg(test)]
mod tests {
    use sceneconfig::VideoConfig;
    use tempfile::TempDir;

    use super::*;

    fn tiny() -> Composition {
        Composition::new(VideoConfig {
            fps: 10.0,
            duration_in_frames: 30,
            width: 32,
            height: 24,
        })
    }

    #[test]
    fn names_frames_with_zero_padding() {
        assert_eq!(frame_file_name(7, ExportFormat::Png), "frame_00007.png");
        assert_eq!(frame_file_name(12345, ExportFormat::Json), "frame_12345.json");
    }

    #[test]
    fn writes_png_with_frame_dimensions() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/still.png");
        export_frame(&tiny(), 3, &path, ExportFormat::Png).unwrap();
        let image = image::open(&path).unwrap();
        assert_eq!((image.width(), image.height()), (32, 24));
    }

    #[test]
    fn writes_scene_graph_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scene.json");
        export_frame(&tiny(), 0, &path, ExportFormat::Json).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["frame"], 0);
        assert_eq!(value["nodes"][0]["kind"], "fill");
        assert_eq!(value["nodes"][1]["kind"], "group");
    }

    #[test]
    fn exports_each_frame_of_a_range() {
        let dir = TempDir::new().unwrap();
        let report = export_sequence(&tiny(), 4..7, dir.path()).unwrap();
        assert_eq!(report.frames_written, 3);
        for frame in 4..7 {
            assert!(dir.path().join(frame_file_name(frame, ExportFormat::Png)).exists());
        }
        assert!(!dir.path().join(frame_file_name(7, ExportFormat::Png)).exists());
    }

    #[test]
    fn rejects_empty_ranges() {
        let dir = TempDir::new().unwrap();
        assert!(export_sequence(&tiny(), 5..5, dir.path()).is_err());
    }
}
