//! Retained drawing primitives handed to a [`Surface`](super::Surface), and
//! the viewport transform that places them on screen.

use crate::status::Color;

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    pub fn translate(&self, by: Point) -> Rect {
        Rect::new(self.x + by.x, self.y + by.y, self.width, self.height)
    }

    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        bounds: Rect,
        radius: f64,
        fill: Option<Color>,
        stroke: Option<Color>,
        line_width: f64,
        dashed: bool,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Color,
    },
    Text {
        at: Point,
        text: String,
        fill: Color,
        size: f64,
    },
    Image {
        bounds: Rect,
        href: String,
    },
    /// An SVG-style path; `arrow` puts an arrow head at the last point.
    Path {
        d: String,
        stroke: Color,
        line_width: f64,
        arrow: bool,
    },
}

/// All shapes of one node, drawn and hit-tested together.
#[derive(Debug, Clone, PartialEq)]
pub struct Group {
    pub id: String,
    pub bounds: Rect,
    pub shapes: Vec<Shape>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub size: Size,
    pub viewport: Viewport,
    pub edges: Vec<Shape>,
    pub nodes: Vec<Group>,
}

impl Scene {
    pub fn group(&self, id: &str) -> Option<&Group> {
        self.nodes.iter().find(|g| g.id == id)
    }
}

/// Maps layout (world) coordinates to screen coordinates:
/// `screen = world * scale + offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scale: f64,
    pub offset: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            scale: 1.0,
            offset: Point::default(),
        }
    }
}

impl Viewport {
    pub fn to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.offset.x, p.y * self.scale + self.offset.y)
    }

    pub fn to_world(&self, p: Point) -> Point {
        Point::new(
            (p.x - self.offset.x) / self.scale,
            (p.y - self.offset.y) / self.scale,
        )
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset.x += dx;
        self.offset.y += dy;
    }

    /// Scales by `factor` while keeping the world point under `center` fixed.
    pub fn zoom(&mut self, factor: f64, center: Point) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }

        let anchor = self.to_world(center);
        self.scale = (self.scale * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        self.offset = Point::new(
            center.x - anchor.x * self.scale,
            center.y - anchor.y * self.scale,
        );
    }

    /// Scales and centres `bounds` inside `size`, leaving `padding` on every
    /// side.
    pub fn fit(bounds: Rect, size: Size, padding: f64) -> Self {
        if bounds.width <= 0.0 || bounds.height <= 0.0 {
            return Self::default();
        }

        let available = Size::new(
            (size.width - 2.0 * padding).max(1.0),
            (size.height - 2.0 * padding).max(1.0),
        );
        let scale = (available.width / bounds.width)
            .min(available.height / bounds.height)
            .clamp(MIN_ZOOM, MAX_ZOOM);

        let center = bounds.center();
        Self {
            scale,
            offset: Point::new(
                size.width / 2.0 - center.x * scale,
                size.height / 2.0 - center.y * scale,
            ),
        }
    }
}
