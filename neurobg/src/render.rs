//! Drawing primitives and the capability the simulation draws through.
//!
//! Coordinates are logical pixels with the origin in the top-left corner.
//! Scaling to device pixels is the backend's business.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Point at `t` along the segment `self → to`; `t` is not clamped.
    pub fn lerp(self, to: Point, t: f32) -> Point {
        Point {
            x: self.x + (to.x - self.x) * t,
            y: self.y + (to.y - self.y) * t,
        }
    }

    pub fn distance(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn alpha(self, a: f32) -> Rgba {
        Rgba {
            r: self.0 as f32 / 255.0,
            g: self.1 as f32 / 255.0,
            b: self.2 as f32 / 255.0,
            a: a.clamp(0.0, 1.0),
        }
    }
}

/// Straight (non-premultiplied) color, channels in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientStop {
    /// 0 at the gradient start, 1 at its end
    pub offset: f32,
    pub color: Rgba,
}

impl GradientStop {
    pub const fn new(offset: f32, color: Rgba) -> Self {
        Self { offset, color }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CircleStyle {
    Fill,
    Stroke { width: f32 },
}

/// Anything the simulation can draw on.
pub trait Renderer {
    fn draw_circle(&mut self, center: Point, radius: f32, color: Rgba, style: CircleStyle);

    /// Line whose color is interpolated between `stops` from `from` to `to`.
    fn draw_line_gradient(&mut self, from: Point, to: Point, width: f32, stops: &[GradientStop]);

    /// Filled disc whose color is interpolated between `stops` from the center outwards.
    fn draw_radial_glow(&mut self, center: Point, radius: f32, stops: &[GradientStop]);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Circle {
        center: Point,
        radius: f32,
        color: Rgba,
        style: CircleStyle,
    },
    Line {
        from: Point,
        to: Point,
        width: f32,
        stops: Vec<GradientStop>,
    },
    Glow {
        center: Point,
        radius: f32,
        stops: Vec<GradientStop>,
    },
}

/// Records draw calls in submission order.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Renderer for DrawList {
    fn draw_circle(&mut self, center: Point, radius: f32, color: Rgba, style: CircleStyle) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            color,
            style,
        });
    }

    fn draw_line_gradient(&mut self, from: Point, to: Point, width: f32, stops: &[GradientStop]) {
        self.commands.push(DrawCommand::Line {
            from,
            to,
            width,
            stops: stops.to_vec(),
        });
    }

    fn draw_radial_glow(&mut self, center: Point, radius: f32, stops: &[GradientStop]) {
        self.commands.push(DrawCommand::Glow {
            center,
            radius,
            stops: stops.to_vec(),
        });
    }
}
