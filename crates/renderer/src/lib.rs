//! Renderer crate for the radar sweep sequence.
//!
//! Every frame is described declaratively before anything is painted:
//!
//! ```text
//!   VideoConfig + frame ──▶ compose() ──▶ Scene ──▶ rasterize() ──▶ RgbaImage
//!          ▲                   │                         │
//!   Layout + Schedule ─────────┘                         └─▶ export (PNG / JSON)
//! ```
//!
//! [`compose`] is a pure function of the frame number and host configuration,
//! so frames can be produced in any order, skipped, or re-rendered and always
//! come out identical. The [`Scene`] can be handed to an external renderer as
//! JSON or painted by the built-in CPU rasterizer.

mod easing;
mod export;
mod raster;
mod scene;

pub use easing::{interpolate, Easing};
pub use export::{
    export_frame, export_sequence, frame_file_name, write_scene, ExportFormat, SequenceReport,
};
pub use raster::rasterize;
pub use scene::{compose, flash_opacity, glow_spread, Composition, Glow, Node, Rgba, Scene, Vec2};
