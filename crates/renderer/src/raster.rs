//! CPU rasterizer for [`Scene`] values.
//!
//! Nodes are painted in order with straight-alpha "over" compositing into an
//! opaque sRGB canvas. Shapes are anti-aliased by pixel coverage; glows use a
//! smoothstep falloff that approximates a blurred CSS box-shadow.

use image::RgbaImage;

use crate::scene::{Glow, Node, Rgba, Scene, Vec2};

pub fn rasterize(scene: &Scene) -> RgbaImage {
    let mut canvas = Canvas::new(scene.width, scene.height);
    canvas.paint_all(&scene.nodes, Transform::IDENTITY);
    canvas.into_image()
}

/// Uniform scale followed by a translation.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Transform {
    scale: f64,
    offset: Vec2,
}

impl Transform {
    const IDENTITY: Transform = Transform {
        scale: 1.0,
        offset: Vec2::new(0.0, 0.0),
    };

    fn point(self, p: Vec2) -> Vec2 {
        Vec2::new(
            p.x * self.scale + self.offset.x,
            p.y * self.scale + self.offset.y,
        )
    }

    fn length(self, value: f64) -> f64 {
        value * self.scale
    }

    fn scaled_about(self, origin: Vec2, scale: f64) -> Transform {
        let inner = Vec2::new(origin.x * (1.0 - scale), origin.y * (1.0 - scale));
        Transform {
            scale: self.scale * scale,
            offset: Vec2::new(
                inner.x * self.scale + self.offset.x,
                inner.y * self.scale + self.offset.y,
            ),
        }
    }
}

struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 3]>,
}

impl Canvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 3]; width as usize * height as usize],
        }
    }

    fn paint_all(&mut self, nodes: &[Node], transform: Transform) {
        for node in nodes {
            self.paint(node, transform);
        }
    }

    fn paint(&mut self, node: &Node, transform: Transform) {
        match node {
            Node::Fill { color, opacity } => {
                let (width, height) = (self.width as f64, self.height as f64);
                self.shade(
                    Vec2::new(0.0, 0.0),
                    Vec2::new(width, height),
                    *color,
                    |_| *opacity,
                );
            }
            Node::Group {
                origin,
                scale,
                children,
            } => self.paint_all(children, transform.scaled_about(*origin, *scale)),
            Node::Disc {
                center,
                diameter,
                color,
                glow,
            } => {
                let center = transform.point(*center);
                let radius = transform.length(diameter / 2.0);
                if let Some(glow) = glow {
                    self.glow(center, radius, glow, transform);
                }
                self.shade_disc(center, radius, *color);
            }
            Node::Segment {
                center,
                length,
                thickness,
                angle_radians,
                color,
            } => self.segment(
                transform.point(*center),
                transform.length(*length),
                transform.length(*thickness),
                *angle_radians,
                *color,
            ),
            Node::Cone {
                center,
                rotation_degrees,
                arc_degrees,
                color,
                marker_length,
                marker_thickness,
            } => {
                let center = transform.point(*center);
                self.cone(center, *rotation_degrees, *arc_degrees, *color);

                let bearing = rotation_degrees.to_radians();
                let direction = Vec2::new(bearing.sin(), -bearing.cos());
                let length = transform.length(*marker_length);
                self.segment(
                    Vec2::new(
                        center.x + direction.x * length / 2.0,
                        center.y + direction.y * length / 2.0,
                    ),
                    length,
                    transform.length(*marker_thickness),
                    direction.y.atan2(direction.x),
                    *color,
                );
            }
        }
    }

    fn glow(&mut self, center: Vec2, radius: f64, glow: &Glow, transform: Transform) {
        let extent = radius + transform.length(glow.spread);
        let blur = transform.length(glow.blur);
        let reach = extent + blur;
        self.shade(
            Vec2::new(center.x - reach, center.y - reach),
            Vec2::new(center.x + reach, center.y + reach),
            glow.color,
            |p| {
                let distance = (p.x - center.x).hypot(p.y - center.y);
                if blur <= f64::EPSILON {
                    coverage(extent - distance)
                } else {
                    1.0 - smoothstep(extent - blur / 2.0, extent + blur / 2.0, distance)
                }
            },
        );
    }

    fn shade_disc(&mut self, center: Vec2, radius: f64, color: Rgba) {
        let reach = radius + 1.0;
        self.shade(
            Vec2::new(center.x - reach, center.y - reach),
            Vec2::new(center.x + reach, center.y + reach),
            color,
            |p| coverage(radius - (p.x - center.x).hypot(p.y - center.y)),
        );
    }

    fn segment(&mut self, center: Vec2, length: f64, thickness: f64, angle: f64, color: Rgba) {
        let (sin, cos) = angle.sin_cos();
        let reach = length / 2.0 + thickness + 1.0;
        self.shade(
            Vec2::new(center.x - reach, center.y - reach),
            Vec2::new(center.x + reach, center.y + reach),
            color,
            |p| {
                let (dx, dy) = (p.x - center.x, p.y - center.y);
                let along = dx * cos + dy * sin;
                let across = -dx * sin + dy * cos;
                coverage(length / 2.0 - along.abs()) * coverage(thickness / 2.0 - across.abs())
            },
        );
    }

    fn cone(&mut self, center: Vec2, rotation_degrees: f64, arc_degrees: f64, color: Rgba) {
        let (width, height) = (self.width as f64, self.height as f64);
        let start = 360.0 - arc_degrees;
        self.shade(
            Vec2::new(0.0, 0.0),
            Vec2::new(width, height),
            color,
            |p| {
                let bearing = (p.x - center.x).atan2(center.y - p.y).to_degrees();
                let relative = (bearing - rotation_degrees).rem_euclid(360.0);
                if relative >= start {
                    (relative - start) / arc_degrees
                } else {
                    0.0
                }
            },
        );
    }

    /// Blends `color` over every pixel in `[min, max)` using the coverage
    /// returned by `alpha` for the pixel centre.
    fn shade(&mut self, min: Vec2, max: Vec2, color: Rgba, alpha: impl Fn(Vec2) -> f64) {
        let x0 = min.x.floor().max(0.0) as u32;
        let y0 = min.y.floor().max(0.0) as u32;
        let x1 = (max.x.ceil().max(0.0) as u32).min(self.width);
        let y1 = (max.y.ceil().max(0.0) as u32).min(self.height);
        let source = [
            f32::from(color.r) / 255.0,
            f32::from(color.g) / 255.0,
            f32::from(color.b) / 255.0,
        ];
        let opacity = f32::from(color.a) / 255.0;

        for y in y0..y1 {
            for x in x0..x1 {
                let centre = Vec2::new(f64::from(x) + 0.5, f64::from(y) + 0.5);
                let weight = alpha(centre).clamp(0.0, 1.0) as f32 * opacity;
                if weight <= 0.0 {
                    continue;
                }
                let pixel = &mut self.pixels[pixel_index(self.width, x, y)];
                for (channel, value) in pixel.iter_mut().zip(source) {
                    *channel = *channel * (1.0 - weight) + value * weight;
                }
            }
        }
    }

    fn into_image(self) -> RgbaImage {
        let width = self.width;
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let [r, g, b] = self.pixels[pixel_index(width, x, y)];
            image::Rgba([to_byte(r), to_byte(g), to_byte(b), u8::MAX])
        })
    }
}

/// Row-major offset of `(x, y)`, computed in `usize` like the buffer length.
fn pixel_index(width: u32, x: u32, y: u32) -> usize {
    y as usize * width as usize + x as usize
}

/// Fraction of a pixel covered by a shape whose edge lies `inside` pixels
/// beyond the pixel centre.
fn coverage(inside: f64) -> f64 {
    (inside + 0.5).clamp(0.0, 1.0)
}

fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
