use std::fmt;

use scheduler::{is_revealed, Layout, Point, Schedule, SweepState};
use sceneconfig::VideoConfig;
use serde::{Serialize, Serializer};

use crate::easing::{interpolate, Easing};

const BACKGROUND: Rgba = Rgba::opaque(0x11_11_11);
const HALO: Rgba = Rgba::opaque(0xAA_AA_AA);
const EDGE: Rgba = Rgba::opaque(0x55_55_55);
const SPECIAL_POINT: Rgba = Rgba::opaque(0xFF_00_00);
const PLAIN_POINT: Rgba = Rgba::opaque(0xFF_FF_FF);

const STAGE_SCALE: f64 = 0.95;
const GLOW_BLUR: f64 = 15.0;
const VIGNETTE_SPREAD: f64 = 5.0;
const SPECIAL_DIAMETER: f64 = 6.0;
const PLAIN_DIAMETER: f64 = 3.0;
/// Frames over which a freshly revealed point's glow settles.
const GLOW_SETTLE_FRAMES: f64 = 40.0;
const GLOW_SPREAD_START: f64 = 7.0;
const GLOW_SPREAD_END: f64 = 1.0;
const EDGE_THICKNESS: f64 = 1.0;
/// Width of the fading wedge trailing the sweep's leading edge.
const CONE_ARC_DEGREES: f64 = 5.0;
const MARKER_THICKNESS: f64 = 1.0;
const FLASH_SECONDS: f64 = 1.0;

/// Straight-alpha sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn opaque(hex: u32) -> Self {
        Self {
            r: (hex >> 16) as u8,
            g: (hex >> 8) as u8,
            b: hex as u8,
            a: u8::MAX,
        }
    }

    pub const BLACK: Rgba = Rgba::opaque(0);
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Soft halo around a disc, modelled on a CSS box-shadow with no offset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Glow {
    pub blur: f64,
    pub spread: f64,
    pub color: Rgba,
}

/// One element of the declarative frame description.
///
/// Positions are in frame pixels with the origin at the top-left corner.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    /// Covers the whole frame.
    Fill { color: Rgba, opacity: f64 },
    /// Children drawn with a uniform scale about `origin`.
    Group {
        origin: Vec2,
        scale: f64,
        children: Vec<Node>,
    },
    Disc {
        center: Vec2,
        diameter: f64,
        color: Rgba,
        glow: Option<Glow>,
    },
    /// Straight line of `length` centred on `center`, rotated by `angle_radians`
    /// from the +x axis.
    Segment {
        center: Vec2,
        length: f64,
        thickness: f64,
        angle_radians: f64,
        color: Rgba,
    },
    /// Radar beam: a wedge of `arc_degrees` fading in towards the leading edge
    /// at `rotation_degrees` (0 = up, clockwise), plus a marker line along it.
    Cone {
        center: Vec2,
        rotation_degrees: f64,
        arc_degrees: f64,
        color: Rgba,
        marker_length: f64,
        marker_thickness: f64,
    },
}

/// Everything needed to paint a single frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub frame: u32,
    pub width: u32,
    pub height: u32,
    pub nodes: Vec<Node>,
}

impl Scene {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Total number of nodes, groups included.
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[Node]) -> usize {
            nodes
                .iter()
                .map(|node| match node {
                    Node::Group { children, .. } => 1 + count(children),
                    _ => 1,
                })
                .sum()
        }
        count(&self.nodes)
    }
}

/// The radar sequence bound to a host video configuration.
#[derive(Debug, Clone)]
pub struct Composition {
    video: VideoConfig,
    layout: Layout,
}

impl Composition {
    pub fn new(video: VideoConfig) -> Self {
        Self::with_layout(video, Layout::default())
    }

    pub fn with_layout(video: VideoConfig, layout: Layout) -> Self {
        Self { video, layout }
    }

    pub fn video(&self) -> &VideoConfig {
        &self.video
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn schedule(&self) -> Schedule {
        Schedule::compute(&self.layout, &self.video)
    }

    pub fn frame(&self, frame: u32) -> Scene {
        compose(frame, &self.video, &self.layout)
    }
}

/// Builds the scene for `frame`. Pure: the same inputs always produce the
/// same scene, independent of any previously composed frame.
pub fn compose(frame: u32, video: &VideoConfig, layout: &Layout) -> Scene {
    let schedule = Schedule::compute(layout, video);
    let sweep = SweepState::at(frame, video);
    let center = Vec2::new(video.width_f64() / 2.0, video.height_f64() / 2.0);

    let mut stage = Vec::with_capacity(layout.len() * 2 + 2);
    stage.push(vignette(video, center));
    stage.extend(edges(frame, layout, &schedule, center));
    stage.extend(points(frame, layout, &schedule, center));
    stage.push(cone(&sweep, video, center));

    Scene {
        frame,
        width: video.width,
        height: video.height,
        nodes: vec![
            Node::Fill {
                color: BACKGROUND,
                opacity: 1.0,
            },
            Node::Group {
                origin: center,
                scale: STAGE_SCALE,
                children: stage,
            },
            Node::Fill {
                color: HALO,
                opacity: flash_opacity(frame, video),
            },
        ],
    }
}

/// Opacity of the opening flash, fading out over the first second.
pub fn flash_opacity(frame: u32, video: &VideoConfig) -> f64 {
    let seconds = f64::from(frame) / video.fps;
    interpolate(seconds, (0.0, FLASH_SECONDS), (1.0, 0.0), Easing::CubicOut)
}

/// Glow spread of a point `frames_since_reveal` frames after it appeared.
pub fn glow_spread(frames_since_reveal: f64) -> f64 {
    interpolate(
        frames_since_reveal,
        (0.0, GLOW_SETTLE_FRAMES),
        (GLOW_SPREAD_START, GLOW_SPREAD_END),
        Easing::PolyOut(3),
    )
}

fn vignette(video: &VideoConfig, center: Vec2) -> Node {
    Node::Disc {
        center,
        diameter: video.height_f64(),
        color: Rgba::BLACK,
        glow: Some(Glow {
            blur: GLOW_BLUR,
            spread: VIGNETTE_SPREAD,
            color: HALO,
        }),
    }
}

fn edges<'a>(
    frame: u32,
    layout: &'a Layout,
    schedule: &'a Schedule,
    center: Vec2,
) -> impl Iterator<Item = Node> + 'a {
    let points = layout.points();
    schedule
        .edges()
        .filter(move |edge| is_revealed(frame, edge.reveal_frame))
        .map(move |edge| segment_between(&points[edge.from], &points[edge.to], center))
}

fn segment_between(from: &Point, to: &Point, center: Vec2) -> Node {
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    Node::Segment {
        center: Vec2::new(
            center.x + (from.x + to.x) / 2.0,
            center.y + (from.y + to.y) / 2.0,
        ),
        length: dx.hypot(dy),
        thickness: EDGE_THICKNESS,
        angle_radians: dy.atan2(dx),
        color: EDGE,
    }
}

fn points<'a>(
    frame: u32,
    layout: &'a Layout,
    schedule: &'a Schedule,
    center: Vec2,
) -> impl Iterator<Item = Node> + 'a {
    layout
        .points()
        .iter()
        .zip(schedule.point_frames())
        .filter(move |(_, reveal)| is_revealed(frame, **reveal))
        .map(move |(point, reveal)| {
            let (color, diameter) = if point.is_special {
                (SPECIAL_POINT, SPECIAL_DIAMETER)
            } else {
                (PLAIN_POINT, PLAIN_DIAMETER)
            };
            Node::Disc {
                center: Vec2::new(center.x + point.x, center.y + point.y),
                diameter,
                color,
                glow: Some(Glow {
                    blur: GLOW_BLUR,
                    spread: glow_spread(f64::from(frame) - reveal),
                    color,
                }),
            }
        })
}

fn cone(sweep: &SweepState, video: &VideoConfig, center: Vec2) -> Node {
    Node::Cone {
        center,
        rotation_degrees: sweep.rotation_degrees,
        arc_degrees: CONE_ARC_DEGREES,
        color: HALO,
        marker_length: video.height_f64() / 2.0,
        marker_thickness: MARKER_THICKNESS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video() -> VideoConfig {
        VideoConfig {
            fps: 30.0,
            duration_in_frames: 600,
            width: 1920,
            height: 1080,
        }
    }

    fn stage(scene: &Scene) -> &[Node] {
        match &scene.nodes[1] {
            Node::Group { children, .. } => children,
            other => panic!("expected stage group, got {other:?}"),
        }
    }

    fn discs(scene: &Scene) -> Vec<&Node> {
        stage(scene)
            .iter()
            .filter(|node| matches!(node, Node::Disc { .. }))
            .skip(1)
            .collect()
    }

    fn segments(scene: &Scene) -> usize {
        stage(scene)
            .iter()
            .filter(|node| matches!(node, Node::Segment { .. }))
            .count()
    }

    #[test]
    fn composing_twice_is_byte_identical() {
        let composition = Composition::new(video());
        for frame in [0, 5, 100, 599] {
            let first = composition.frame(frame).to_json().unwrap();
            let second = composition.frame(frame).to_json().unwrap();
            assert_eq!(first.as_bytes(), second.as_bytes());
        }
    }

    #[test]
    fn frames_do_not_depend_on_evaluation_order() {
        let composition = Composition::new(video());
        let early = composition.frame(5);
        let _ = composition.frame(100);
        assert_eq!(composition.frame(5), early);
    }

    #[test]
    fn scene_layers_background_stage_and_flash() {
        let scene = Composition::new(video()).frame(0);
        assert!(matches!(
            scene.nodes[0],
            Node::Fill { color: BACKGROUND, opacity } if opacity == 1.0
        ));
        assert!(matches!(
            scene.nodes[1],
            Node::Group { scale, .. } if scale == STAGE_SCALE
        ));
        assert!(matches!(scene.nodes[2], Node::Fill { color: HALO, .. }));
        assert!(matches!(stage(&scene).first(), Some(Node::Disc { color: Rgba::BLACK, .. })));
        assert!(matches!(stage(&scene).last(), Some(Node::Cone { .. })));
    }

    #[test]
    fn flash_fades_over_the_first_second() {
        let config = video();
        assert_eq!(flash_opacity(0, &config), 1.0);
        let midway = flash_opacity(15, &config);
        assert!((midway - 0.125).abs() < 1e-12);
        assert_eq!(flash_opacity(30, &config), 0.0);
        assert_eq!(flash_opacity(300, &config), 0.0);
    }

    #[test]
    fn points_appear_exactly_at_their_reveal_frame() {
        let composition = Composition::new(video());
        let schedule = composition.schedule();
        // Point 0 reveals on frame 90 with the default layout.
        let reveal = schedule.point(0);
        assert!((reveal - 90.0).abs() < 1e-9);
        let threshold = reveal.ceil() as u32;

        let is_first_point = |node: &&Node| match node {
            Node::Disc { center, .. } => (center.x - 960.0).abs() < 1e-9 && center.y < 540.0,
            _ => false,
        };
        let before = composition.frame(threshold - 1);
        assert!(!discs(&before).iter().any(is_first_point));
        let at = composition.frame(threshold);
        assert!(discs(&at).iter().any(is_first_point));
    }

    #[test]
    fn visible_counts_follow_the_schedule() {
        let composition = Composition::new(video());
        let schedule = composition.schedule();
        for frame in [0, 50, 200, 450, 600] {
            let scene = composition.frame(frame);
            let expected_points = schedule
                .point_frames()
                .iter()
                .filter(|reveal| is_revealed(frame, **reveal))
                .count();
            let expected_edges = schedule
                .edges()
                .filter(|edge| is_revealed(frame, edge.reveal_frame))
                .count();
            assert_eq!(discs(&scene).len(), expected_points, "frame {frame}");
            assert_eq!(segments(&scene), expected_edges, "frame {frame}");
        }
    }

    #[test]
    fn everything_is_visible_by_the_last_frame() {
        let composition = Composition::new(video());
        let scene = composition.frame(600);
        assert_eq!(discs(&scene).len(), composition.layout().len());
        assert_eq!(segments(&scene), composition.layout().len());
    }

    #[test]
    fn special_points_are_large_and_red() {
        let composition = Composition::new(video());
        let scene = composition.frame(600);
        let special = discs(&scene)
            .into_iter()
            .filter(|node| match node {
                Node::Disc {
                    color, diameter, ..
                } => *color == SPECIAL_POINT && *diameter == SPECIAL_DIAMETER,
                _ => false,
            })
            .count();
        assert_eq!(special, scheduler::SIDES);
    }

    #[test]
    fn glow_settles_after_forty_frames() {
        assert_eq!(glow_spread(0.0), GLOW_SPREAD_START);
        assert_eq!(glow_spread(40.0), GLOW_SPREAD_END);
        assert_eq!(glow_spread(400.0), GLOW_SPREAD_END);
        let early = glow_spread(10.0);
        assert!(early < GLOW_SPREAD_START && early > GLOW_SPREAD_END);
    }

    #[test]
    fn segments_span_their_endpoints() {
        let layout = Layout::default();
        let from = layout.get(3).unwrap();
        let to = layout.get(4).unwrap();
        let center = Vec2::new(960.0, 540.0);
        match segment_between(from, to, center) {
            Node::Segment {
                center: mid,
                length,
                angle_radians,
                ..
            } => {
                let half = Vec2::new(
                    angle_radians.cos() * length / 2.0,
                    angle_radians.sin() * length / 2.0,
                );
                assert!((mid.x + half.x - (center.x + to.x)).abs() < 1e-9);
                assert!((mid.y + half.y - (center.y + to.y)).abs() < 1e-9);
                assert!((mid.x - half.x - (center.x + from.x)).abs() < 1e-9);
            }
            other => panic!("expected segment, got {other:?}"),
        }
    }

    #[test]
    fn cone_turns_at_a_constant_rate() {
        let composition = Composition::new(video());
        let rotation = |frame| match stage(&composition.frame(frame)).last() {
            Some(Node::Cone {
                rotation_degrees, ..
            }) => *rotation_degrees,
            other => panic!("expected cone, got {other:?}"),
        };
        assert_eq!(rotation(0), 0.0);
        assert!((rotation(90) - 360.0).abs() < 1e-9);
        assert!((rotation(20) - 80.0).abs() < 1e-9);
    }

    #[test]
    fn colours_serialise_as_hex() {
        let json = serde_json::to_string(&Rgba::opaque(0x12_34_56)).unwrap();
        assert_eq!(json, "\"#123456ff\"");
    }
}
