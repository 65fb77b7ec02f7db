use std::fmt;

use super::{
    Surface,
    scene::{Scene, Shape, Size},
};
use crate::error::{GraphError, Result};

/// Serialises a scene as a standalone SVG document.
pub fn to_svg(scene: &Scene) -> String {
    SvgDocument(scene).to_string()
}

struct SvgDocument<'a>(&'a Scene);

impl fmt::Display for SvgDocument<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scene = self.0;
        let (w, h) = (num(scene.size.width), num(scene.size.height));
        let v = scene.viewport;

        writeln!(
            f,
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
        )?;
        writeln!(
            f,
            r##"<defs><marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="8" markerHeight="8" orient="auto"><path d="M 0 0 L 10 5 L 0 10 z" fill="#AAAAAA"/></marker></defs>"##
        )?;
        writeln!(
            f,
            r#"<g transform="matrix({} 0 0 {} {} {})">"#,
            num(v.scale),
            num(v.scale),
            num(v.offset.x),
            num(v.offset.y)
        )?;

        writeln!(f, r#"<g class="edges">"#)?;
        for shape in &scene.edges {
            write_shape(f, shape)?;
        }
        writeln!(f, "</g>")?;

        for group in &scene.nodes {
            writeln!(f, r#"<g class="node" data-id="{}">"#, escape(&group.id))?;
            for shape in &group.shapes {
                write_shape(f, shape)?;
            }
            writeln!(f, "</g>")?;
        }

        writeln!(f, "</g>")?;
        writeln!(f, "</svg>")
    }
}

fn write_shape(f: &mut fmt::Formatter<'_>, shape: &Shape) -> fmt::Result {
    match shape {
        Shape::Rect {
            bounds,
            radius,
            fill,
            stroke,
            line_width,
            dashed,
        } => {
            write!(
                f,
                r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}""#,
                num(bounds.x),
                num(bounds.y),
                num(bounds.width),
                num(bounds.height),
                num(*radius)
            )?;
            match fill {
                Some(fill) => write!(f, r#" fill="{fill}""#)?,
                None => write!(f, r#" fill="none""#)?,
            }
            if let Some(stroke) = stroke {
                write!(f, r#" stroke="{stroke}" stroke-width="{}""#, num(*line_width))?;
            }
            if *dashed {
                write!(f, r#" stroke-dasharray="4 3""#)?;
            }
            writeln!(f, "/>")
        }
        Shape::Circle {
            center,
            radius,
            fill,
        } => writeln!(
            f,
            r#"<circle cx="{}" cy="{}" r="{}" fill="{fill}"/>"#,
            num(center.x),
            num(center.y),
            num(*radius)
        ),
        Shape::Text {
            at,
            text,
            fill,
            size,
        } => writeln!(
            f,
            r#"<text x="{}" y="{}" font-size="{}" fill="{fill}" dominant-baseline="hanging">{}</text>"#,
            num(at.x),
            num(at.y),
            num(*size),
            escape(text)
        ),
        Shape::Image { bounds, href } => writeln!(
            f,
            r#"<image x="{}" y="{}" width="{}" height="{}" xlink:href="{}"/>"#,
            num(bounds.x),
            num(bounds.y),
            num(bounds.width),
            num(bounds.height),
            escape(href)
        ),
        Shape::Path {
            d,
            stroke,
            line_width,
            arrow,
        } => {
            write!(
                f,
                r#"<path d="{d}" fill="none" stroke="{stroke}" stroke-width="{}""#,
                num(*line_width)
            )?;
            if *arrow {
                write!(f, r#" marker-end="url(#arrow)""#)?;
            }
            writeln!(f, "/>")
        }
    }
}

fn num(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// A surface that keeps the rendered SVG in memory.
///
/// The most recent frame stays readable through [`MemorySurface::svg`] after
/// the surface has been released.
#[derive(Debug, Default)]
pub struct MemorySurface {
    id: String,
    size: Option<Size>,
    attached: bool,
    frames: usize,
    svg: Option<String>,
}

impl MemorySurface {
    /// A surface that has not been laid out yet and cannot be measured.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_size(id: impl Into<String>, size: Size) -> Self {
        Self {
            size: Some(size),
            ..Self::new(id)
        }
    }

    pub fn svg(&self) -> Option<&str> {
        self.svg.as_deref()
    }

    pub fn into_svg(self) -> Option<String> {
        self.svg
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Frames presented since the surface was last acquired.
    pub fn frames(&self) -> usize {
        self.frames
    }
}

impl Surface for MemorySurface {
    fn id(&self) -> &str {
        &self.id
    }

    fn measure(&self) -> Option<Size> {
        self.size
    }

    fn acquire(&mut self) -> Result<()> {
        if self.attached {
            return Err(GraphError::SurfaceBusy(self.id.clone()));
        }
        self.attached = true;
        self.frames = 0;
        self.svg = None;
        Ok(())
    }

    fn present(&mut self, scene: &Scene) -> Result<()> {
        self.svg = Some(to_svg(scene));
        self.frames += 1;
        Ok(())
    }

    fn release(&mut self) {
        self.attached = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        render::scene::{Group, Point, Rect, Viewport},
        status::Color,
    };

    fn scene(shapes: Vec<Shape>) -> Scene {
        Scene {
            size: Size::new(200.0, 100.0),
            viewport: Viewport::default(),
            edges: Vec::new(),
            nodes: vec![Group {
                id: "a&b".to_string(),
                bounds: Rect::new(0.0, 0.0, 10.0, 10.0),
                shapes,
            }],
        }
    }

    #[test]
    fn text_is_escaped() {
        let svg = to_svg(&scene(vec![Shape::Text {
            at: Point::new(1.0, 2.0),
            text: "<build> & \"test\"".to_string(),
            fill: Color::NEUTRAL,
            size: 12.0,
        }]));

        assert!(svg.contains("&lt;build&gt; &amp; &quot;test&quot;"));
        assert!(svg.contains(r#"data-id="a&amp;b""#));
    }

    #[test]
    fn document_has_size_and_transform() {
        let svg = to_svg(&scene(Vec::new()));
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"width="200" height="100""#));
        assert!(svg.contains(r#"matrix(1 0 0 1 0 0)"#));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn dashed_rect_without_fill() {
        let svg = to_svg(&scene(vec![Shape::Rect {
            bounds: Rect::new(0.0, 0.0, 80.5, 36.0),
            radius: 4.0,
            fill: None,
            stroke: Some(Color::NEUTRAL),
            line_width: 1.0,
            dashed: true,
        }]));

        assert!(svg.contains(r##"width="80.5" height="36" rx="4" fill="none" stroke="#5D7092" stroke-width="1" stroke-dasharray="4 3"/>"##));
    }

    #[test]
    fn surface_refuses_second_acquire_until_released() {
        let mut surface = MemorySurface::new("graph");
        surface.acquire().unwrap();
        assert!(matches!(surface.acquire(), Err(GraphError::SurfaceBusy(_))));

        surface.release();
        assert!(surface.acquire().is_ok());
    }
}
