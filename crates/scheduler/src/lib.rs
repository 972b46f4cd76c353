//! Point layout and sweep timing for the radar sequence.
//!
//! [`Layout`] places the polygon once; [`Schedule`] maps every point onto the
//! frame at which the rotating sweep first uncovers it. Both are pure functions
//! of their inputs, so any frame can be recomputed independently.

mod layout;
mod random;
mod sweep;

pub use layout::{Layout, LayoutParams, Point, COUNT, DELAY_EXPONENT, RADIUS, SIDES};
pub use random::random;
pub use sweep::{
    edge_reveal_frame, is_revealed, reveal_fraction, reveal_frame, rotations, Edge, Schedule,
    SweepState, SECONDS_PER_ROTATION,
};
