use std::f64::consts::TAU;

use sceneconfig::VideoConfig;
use serde::Serialize;

use crate::layout::Layout;

/// Time the radar takes to complete one full turn.
pub const SECONDS_PER_ROTATION: f64 = 3.0;

/// Where the sweep is at a given frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SweepState {
    /// Accumulated rotation of the leading edge in degrees; not wrapped.
    pub rotation_degrees: f64,
    /// Number of full turns the sweep makes over the whole sequence.
    pub rotations: f64,
}

impl SweepState {
    pub fn at(frame: u32, video: &VideoConfig) -> Self {
        Self {
            rotation_degrees: 360.0 * f64::from(frame) / video.fps / SECONDS_PER_ROTATION,
            rotations: rotations(video),
        }
    }
}

pub fn rotations(video: &VideoConfig) -> f64 {
    video.total_frames() / video.fps / SECONDS_PER_ROTATION
}

/// Normalised time in `[0, 1]` at which the sweep first reveals a point.
///
/// The pass index `k` is the smallest integer with
/// `k >= delay * (rotations - 1) - angle / 2π`; the reveal happens when the
/// leading edge crosses `angle` during that pass.
pub fn reveal_fraction(angle: f64, delay: f64, rotations: f64) -> f64 {
    let turn = angle / TAU;
    let pass = (delay * (rotations - 1.0) - turn).ceil();
    (pass + turn) / rotations
}

pub fn reveal_frame(angle: f64, delay: f64, rotations: f64, total_frames: f64) -> f64 {
    reveal_fraction(angle, delay, rotations) * total_frames
}

pub fn edge_reveal_frame(from: f64, to: f64) -> f64 {
    from.max(to)
}

pub fn is_revealed(frame: u32, reveal_frame: f64) -> bool {
    f64::from(frame) >= reveal_frame
}

/// Polygon edge ending at `to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub reveal_frame: f64,
}

/// Reveal frames for every point of a layout under one video configuration.
///
/// Cheap to build; callers recompute it from the layout instead of caching it
/// between frames.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    point_frames: Vec<f64>,
    rotations: f64,
}

impl Schedule {
    pub fn compute(layout: &Layout, video: &VideoConfig) -> Self {
        let rotations = rotations(video);
        let total_frames = video.total_frames();
        let point_frames = layout
            .points()
            .iter()
            .map(|point| reveal_frame(point.angle, point.delay, rotations, total_frames))
            .collect();
        Self {
            point_frames,
            rotations,
        }
    }

    pub fn rotations(&self) -> f64 {
        self.rotations
    }

    pub fn len(&self) -> usize {
        self.point_frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.point_frames.is_empty()
    }

    pub fn point(&self, index: usize) -> f64 {
        self.point_frames[index]
    }

    pub fn point_frames(&self) -> &[f64] {
        &self.point_frames
    }

    fn previous(&self, index: usize) -> usize {
        (index + self.point_frames.len() - 1) % self.point_frames.len()
    }

    /// Reveal frame of the edge joining `index` to the point before it.
    pub fn edge(&self, index: usize) -> f64 {
        edge_reveal_frame(self.point(self.previous(index)), self.point(index))
    }

    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        (0..self.point_frames.len()).map(move |to| Edge {
            from: self.previous(to),
            to,
            reveal_frame: self.edge(to),
        })
    }
}
