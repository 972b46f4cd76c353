use std::f64::consts::TAU;

use serde::Serialize;

use crate::random::random;

/// Points per radius band.
pub const COUNT: usize = 10;
/// Number of radius bands around the circle.
pub const SIDES: usize = 7;
/// Base distance of every point from the centre, in layout units.
pub const RADIUS: f64 = 400.0;
/// Power applied to the raw random reveal fraction; values above 1 bias
/// points towards revealing early in their pass.
pub const DELAY_EXPONENT: f64 = 1.2;

const RADIUS_FALLOFF: f64 = 3.0;

/// One vertex of the radar polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    /// Horizontal offset from the frame centre.
    pub x: f64,
    /// Vertical offset from the frame centre (negative is up).
    pub y: f64,
    /// Reveal fraction within the point's sweep pass, in `[0, 1]`.
    pub delay: f64,
    /// Bearing in radians, 0 pointing up and increasing clockwise.
    pub angle: f64,
    pub is_special: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub count: usize,
    pub sides: usize,
    pub radius: f64,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            count: COUNT,
            sides: SIDES,
            radius: RADIUS,
        }
    }
}

/// The closed polygon swept by the radar, in drawing order.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    points: Vec<Point>,
}

impl Layout {
    pub fn generate(params: &LayoutParams) -> Self {
        let total = params.count * params.sides;
        let points = (0..total).map(|index| place(index, params)).collect();
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Point> {
        self.points.get(index)
    }

    /// Index of the point that precedes `index` along the closed polygon.
    pub fn previous(&self, index: usize) -> usize {
        (index + self.points.len() - 1) % self.points.len()
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::generate(&LayoutParams::default())
    }
}

fn place(index: usize, params: &LayoutParams) -> Point {
    let total = params.count * params.sides;
    let angle = TAU / total as f64 * index as f64;
    let band_offset = (index % params.count) as f64 - params.count as f64 / 2.0;
    let radius = params.radius - RADIUS_FALLOFF * band_offset * band_offset;

    // The penultimate point always closes out its pass.
    let delay = if index + 2 == total {
        1.0
    } else {
        random(&format!("xdelay-{index}")).powf(DELAY_EXPONENT)
    };

    Point {
        x: radius * angle.sin(),
        y: -radius * angle.cos(),
        delay,
        angle,
        is_special: index % params.count == 0,
    }
}
