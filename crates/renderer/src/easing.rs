/// Easing curves used by the frame-driven animations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Easing {
    Linear,
    /// `1 - (1 - t)^3`.
    CubicOut,
    /// `1 - (1 - t)^n`.
    PolyOut(i32),
}

impl Easing {
    pub fn sample(self, t: f64) -> f64 {
        let clamped = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => clamped,
            Easing::CubicOut => 1.0 - (1.0 - clamped).powi(3),
            Easing::PolyOut(power) => 1.0 - (1.0 - clamped).powi(power),
        }
    }
}

/// Maps `input` from `input_range` onto `output_range` through `easing`.
///
/// Progress is clamped to the input range, so the result never leaves the
/// output range.
pub fn interpolate(
    input: f64,
    input_range: (f64, f64),
    output_range: (f64, f64),
    easing: Easing,
) -> f64 {
    let (in_start, in_end) = input_range;
    let (out_start, out_end) = output_range;
    let progress = (input - in_start) / (in_end - in_start);
    out_start + easing.sample(progress) * (out_end - out_start)
}
