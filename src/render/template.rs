//! Node and edge templates: turns a laid-out model into scene shapes.

use std::collections::HashMap;

use super::{
    layout::{Layout, NodeBox, STEP_ROW_HEIGHT, TITLE_HEIGHT},
    scene::{Group, Point, Rect, Scene, Shape, Size, Viewport},
};
use crate::{
    graph::{GraphModel, Node, Variant},
    status::{Color, optional_status_color},
};

const NODE_STROKE: Color = Color::rgb(0x69, 0xC0, 0xFF);
const LABEL: Color = Color::rgb(0x59, 0x59, 0x59);
const MUTED: Color = Color::rgb(0x99, 0x99, 0x99);
const EDGE: Color = Color::rgb(0xAA, 0xAA, 0xAA);
const LOOP_REACH: f64 = 24.0;

pub const HOVER_STROKE: Color = Color::rgb(0x18, 0x90, 0xFF);
pub const HOVER_FILL: Color = Color::rgb(0xE6, 0xF7, 0xFF);
pub const HOVER_LINE_WIDTH: f64 = 2.0;

/// Per-handle view state layered on top of the layout.
pub(crate) struct ViewState<'a> {
    pub size: Size,
    pub viewport: Viewport,
    pub offsets: &'a HashMap<String, Point>,
    pub hovered: Option<&'a str>,
    pub icon: Option<&'a str>,
}

impl ViewState<'_> {
    pub fn bounds_of(&self, node: &NodeBox) -> Rect {
        match self.offsets.get(&node.id) {
            Some(offset) => node.bounds.translate(*offset),
            None => node.bounds,
        }
    }
}

pub(crate) fn draw(model: &GraphModel, layout: &Layout, view: &ViewState<'_>) -> Scene {
    let curved = model.variant == Variant::Verbose;

    let edges = model
        .edges
        .iter()
        .filter_map(|edge| {
            let source = view.bounds_of(layout.get(&edge.source)?);
            if edge.source == edge.target {
                return Some(loop_shape(source, layout.rankdir.is_vertical(), curved));
            }
            let target = view.bounds_of(layout.get(&edge.target)?);
            Some(edge_shape(source, target, layout.rankdir.is_vertical(), curved))
        })
        .collect();

    let nodes = layout
        .boxes
        .iter()
        .map(|node_box| {
            let bounds = view.bounds_of(node_box);
            let hovered = view.hovered == Some(node_box.id.as_str());
            let shapes = match model.node(&node_box.id) {
                Some(node) if model.variant == Variant::Verbose => {
                    verbose_card(node, bounds, hovered, view.icon)
                }
                Some(node) => simple_card(node, bounds, hovered),
                None => placeholder(&node_box.id, bounds),
            };
            Group {
                id: node_box.id.clone(),
                bounds,
                shapes,
            }
        })
        .collect();

    Scene {
        size: view.size,
        viewport: view.viewport,
        edges,
        nodes,
    }
}

fn main_box(bounds: Rect, radius: f64, stroke: Color, hovered: bool) -> Shape {
    if hovered {
        Shape::Rect {
            bounds,
            radius,
            fill: Some(HOVER_FILL),
            stroke: Some(HOVER_STROKE),
            line_width: HOVER_LINE_WIDTH,
            dashed: false,
        }
    } else {
        Shape::Rect {
            bounds,
            radius,
            fill: Some(Color::WHITE),
            stroke: Some(stroke),
            line_width: 1.0,
            dashed: false,
        }
    }
}

fn simple_card(node: &Node, b: Rect, hovered: bool) -> Vec<Shape> {
    let mut shapes = vec![
        main_box(b, 5.0, NODE_STROKE, hovered),
        Shape::Rect {
            bounds: Rect::new(b.x, b.y, 4.0, b.height),
            radius: 2.0,
            fill: Some(node.color),
            stroke: None,
            line_width: 0.0,
            dashed: false,
        },
        Shape::Text {
            at: Point::new(b.x + 14.0, b.y + 20.0),
            text: node.label.clone(),
            fill: LABEL,
            size: 14.0,
        },
    ];

    if !node.description.is_empty() {
        shapes.push(Shape::Text {
            at: Point::new(b.x + 14.0, b.y + 46.0),
            text: node.description.clone(),
            fill: MUTED,
            size: 12.0,
        });
    }

    shapes
}

fn verbose_card(node: &Node, b: Rect, hovered: bool, icon: Option<&str>) -> Vec<Shape> {
    let mut shapes = vec![
        main_box(b, 2.0, node.color, hovered),
        Shape::Rect {
            bounds: Rect::new(b.x, b.y, b.width, TITLE_HEIGHT),
            radius: 2.0,
            fill: Some(node.color),
            stroke: None,
            line_width: 0.0,
            dashed: false,
        },
    ];

    shapes.push(match icon {
        Some(href) => Shape::Image {
            bounds: Rect::new(b.x + 4.0, b.y + 2.0, 16.0, 16.0),
            href: href.to_string(),
        },
        None => Shape::Circle {
            center: Point::new(b.x + 12.0, b.y + 10.0),
            radius: 5.0,
            fill: Color::WHITE,
        },
    });

    shapes.push(Shape::Text {
        at: Point::new(b.x + 24.0, b.y + 5.0),
        text: node.label.clone(),
        fill: Color::WHITE,
        size: 12.0,
    });

    for (i, step) in node.steps.iter().enumerate() {
        let row = b.y + TITLE_HEIGHT + i as f64 * STEP_ROW_HEIGHT;
        shapes.push(Shape::Circle {
            center: Point::new(b.x + 20.0, row + 21.0),
            radius: 3.0,
            fill: optional_status_color(step.status.as_ref()),
        });
        shapes.push(Shape::Text {
            at: Point::new(b.x + 30.0, row + 15.0),
            text: step.name.clone(),
            fill: MUTED,
            size: 12.0,
        });
    }

    shapes
}

fn placeholder(id: &str, b: Rect) -> Vec<Shape> {
    vec![
        Shape::Rect {
            bounds: b,
            radius: 4.0,
            fill: None,
            stroke: Some(EDGE),
            line_width: 1.0,
            dashed: true,
        },
        Shape::Text {
            at: Point::new(b.x + 8.0, b.y + 11.0),
            text: id.to_string(),
            fill: MUTED,
            size: 12.0,
        },
    ]
}

/// Connects the facing sides of two boxes; the arrow points at `target`.
fn anchors(source: Rect, target: Rect, vertical: bool) -> (Point, Point, bool) {
    let (s, t) = (source.center(), target.center());

    if vertical {
        if target.y >= source.bottom() {
            return (Point::new(s.x, source.bottom()), Point::new(t.x, target.y), true);
        }
        if target.bottom() <= source.y {
            return (Point::new(s.x, source.y), Point::new(t.x, target.bottom()), true);
        }
    } else {
        if target.x >= source.right() {
            return (Point::new(source.right(), s.y), Point::new(target.x, t.y), false);
        }
        if target.right() <= source.x {
            return (Point::new(source.x, s.y), Point::new(target.right(), t.y), false);
        }
    }

    // Overlapping along the rank axis (same rank or dragged): use the other one.
    if vertical {
        if t.x >= s.x {
            (Point::new(source.right(), s.y), Point::new(target.x, t.y), false)
        } else {
            (Point::new(source.x, s.y), Point::new(target.right(), t.y), false)
        }
    } else if t.y >= s.y {
        (Point::new(s.x, source.bottom()), Point::new(t.x, target.y), true)
    } else {
        (Point::new(s.x, source.y), Point::new(t.x, target.bottom()), true)
    }
}

fn edge_shape(source: Rect, target: Rect, vertical: bool, curved: bool) -> Shape {
    let (from, to, along_y) = anchors(source, target, vertical);

    let d = if !curved {
        format!("M {:.1} {:.1} L {:.1} {:.1}", from.x, from.y, to.x, to.y)
    } else if along_y {
        let mid = (from.y + to.y) / 2.0;
        format!(
            "M {:.1} {:.1} C {:.1} {:.1}, {:.1} {:.1}, {:.1} {:.1}",
            from.x, from.y, from.x, mid, to.x, mid, to.x, to.y
        )
    } else {
        let mid = (from.x + to.x) / 2.0;
        format!(
            "M {:.1} {:.1} C {:.1} {:.1}, {:.1} {:.1}, {:.1} {:.1}",
            from.x, from.y, mid, from.y, mid, to.y, to.x, to.y
        )
    };

    Shape::Path {
        d,
        stroke: EDGE,
        line_width: if curved { 0.8 } else { 1.0 },
        arrow: true,
    }
}

/// A task depending on itself: an arc leaving and re-entering the side of
/// its box that faces along the rank, so it stays clear of rank-to-rank edges.
fn loop_shape(b: Rect, vertical: bool, curved: bool) -> Shape {
    let d = if vertical {
        let x = b.right();
        let (y1, y2) = (b.y + b.height * 0.3, b.y + b.height * 0.7);
        format!(
            "M {:.1} {:.1} C {:.1} {:.1}, {:.1} {:.1}, {:.1} {:.1}",
            x,
            y1,
            x + LOOP_REACH,
            y1,
            x + LOOP_REACH,
            y2,
            x,
            y2
        )
    } else {
        let y = b.bottom();
        let (x1, x2) = (b.x + b.width * 0.7, b.x + b.width * 0.3);
        format!(
            "M {:.1} {:.1} C {:.1} {:.1}, {:.1} {:.1}, {:.1} {:.1}",
            x1,
            y,
            x1,
            y + LOOP_REACH,
            x2,
            y + LOOP_REACH,
            x2,
            y
        )
    };

    Shape::Path {
        d,
        stroke: EDGE,
        line_width: if curved { 0.8 } else { 1.0 },
        arrow: true,
    }
}
