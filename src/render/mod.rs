//! Drawing a [`GraphModel`] onto a host surface.
//!
//! [`open`] acquires the surface, lays the model out, fits it into the
//! surface and presents the first frame. The returned [`Handle`] owns the
//! surface until it is closed or dropped; either path releases it.

pub mod dot;
pub mod layout;
pub mod scene;
pub mod svg;
mod template;

use std::collections::HashMap;

use tracing::{debug, trace};

pub use layout::{Layout, RankDir};
pub use scene::{Point, Rect, Scene, Size, Viewport};
pub use svg::MemorySurface;

use crate::{error::Result, graph::GraphModel, graph::Variant};
use template::ViewState;

pub const FALLBACK_SIZE: Size = Size::new(1500.0, 500.0);
pub const VERBOSE_ZOOM: f64 = 0.7;

/// A host area a graph can be drawn into.
pub trait Surface {
    fn id(&self) -> &str;

    /// Available drawing area, `None` when the host has not been laid out.
    fn measure(&self) -> Option<Size>;

    /// Creates a fresh drawing context. Fails while another handle holds it.
    fn acquire(&mut self) -> Result<()>;

    fn present(&mut self, scene: &Scene) -> Result<()>;

    /// Disposes the drawing context. Must be safe to call more than once.
    fn release(&mut self);
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderOptions {
    /// Used when the surface cannot be measured.
    pub fallback_size: Size,
    /// Defaults to `TB` for the spec view and `RL` for the run view.
    pub rankdir: Option<RankDir>,
    pub padding: f64,
    /// Image drawn in the title bar of run-view nodes.
    pub icon: Option<String>,
    /// Extra zoom applied after fitting; defaults to 0.7 for the run view.
    pub initial_zoom: Option<f64>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            fallback_size: FALLBACK_SIZE,
            rankdir: None,
            padding: 20.0,
            icon: None,
            initial_zoom: None,
        }
    }
}

/// Everything that is rebuilt from scratch on every (re)draw.
struct RenderState {
    layout: Layout,
    viewport: Viewport,
    hovered: Option<String>,
    offsets: HashMap<String, Point>,
}

pub struct Handle<'s> {
    surface: &'s mut dyn Surface,
    model: GraphModel,
    options: RenderOptions,
    size: Size,
    state: RenderState,
}

/// Mounts `model` on `surface`.
pub fn open<'s>(
    surface: &'s mut dyn Surface,
    model: GraphModel,
    options: RenderOptions,
) -> Result<Handle<'s>> {
    surface.acquire()?;

    let size = match surface.measure() {
        Some(size) if !size.is_empty() => size,
        _ => {
            debug!(
                "Surface '{}' has no size yet, using {}x{}",
                surface.id(),
                options.fallback_size.width,
                options.fallback_size.height
            );
            options.fallback_size
        }
    };

    let state = RenderState::build(&model, &options, size);
    let mut handle = Handle {
        surface,
        model,
        options,
        size,
        state,
    };

    // A failed first frame drops the handle, which releases the surface.
    handle.present()?;
    debug!(
        "Mounted graph on '{}' ({} nodes, {} edges)",
        handle.surface.id(),
        handle.model.nodes.len(),
        handle.model.edges.len()
    );
    Ok(handle)
}

pub fn close(handle: Handle<'_>) {
    handle.close();
}

impl RenderState {
    fn build(model: &GraphModel, options: &RenderOptions, size: Size) -> Self {
        let rankdir = options
            .rankdir
            .unwrap_or_else(|| RankDir::for_variant(model.variant));
        let layout = Layout::compute(model, rankdir);

        let mut viewport = Viewport::fit(layout.bounds(), size, options.padding);
        let zoom = options.initial_zoom.or(match model.variant {
            Variant::Verbose => Some(VERBOSE_ZOOM),
            Variant::Simple => None,
        });
        if let Some(zoom) = zoom {
            viewport.zoom(zoom, Point::new(size.width / 2.0, size.height / 2.0));
        }

        Self {
            layout,
            viewport,
            hovered: None,
            offsets: HashMap::new(),
        }
    }
}

impl<'s> Handle<'s> {
    pub fn model(&self) -> &GraphModel {
        &self.model
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn viewport(&self) -> Viewport {
        self.state.viewport
    }

    pub fn layout(&self) -> &Layout {
        &self.state.layout
    }

    pub fn hovered(&self) -> Option<&str> {
        self.state.hovered.as_deref()
    }

    /// The scene as it would be presented right now.
    pub fn scene(&self) -> Scene {
        let view = ViewState {
            size: self.size,
            viewport: self.state.viewport,
            offsets: &self.state.offsets,
            hovered: self.state.hovered.as_deref(),
            icon: self.options.icon.as_deref(),
        };
        template::draw(&self.model, &self.state.layout, &view)
    }

    fn present(&mut self) -> Result<()> {
        let scene = self.scene();
        self.surface.present(&scene)
    }

    /// Highlights a task node. Placeholders and unknown ids are ignored.
    pub fn pointer_enter(&mut self, id: &str) -> Result<()> {
        if self.model.node(id).is_none() {
            trace!("Pointer entered unknown node '{}'", id);
            return Ok(());
        }
        if self.state.hovered.as_deref() == Some(id) {
            return Ok(());
        }
        self.state.hovered = Some(id.to_string());
        self.present()
    }

    pub fn pointer_leave(&mut self, id: &str) -> Result<()> {
        if self.state.hovered.as_deref() != Some(id) {
            return Ok(());
        }
        self.state.hovered = None;
        self.present()
    }

    /// The task node under a screen point, if any.
    pub fn hit_test(&self, point: Point) -> Option<&str> {
        let world = self.state.viewport.to_world(point);
        self.state
            .layout
            .boxes
            .iter()
            .rev()
            .filter(|b| !b.placeholder)
            .find(|b| self.node_bounds(&b.id).is_some_and(|r| r.contains(world)))
            .map(|b| b.id.as_str())
    }

    /// Moves the pointer to a screen point, entering and leaving nodes as it
    /// crosses their borders.
    pub fn pointer_move(&mut self, point: Point) -> Result<()> {
        let target = self.hit_test(point).map(str::to_string);
        if target == self.state.hovered {
            return Ok(());
        }
        if let Some(previous) = self.state.hovered.clone() {
            self.pointer_leave(&previous)?;
        }
        match target {
            Some(id) => self.pointer_enter(&id),
            None => Ok(()),
        }
    }

    /// Current bounds of a node in layout coordinates, drag offset included.
    pub fn node_bounds(&self, id: &str) -> Option<Rect> {
        let node = self.state.layout.get(id)?;
        Some(match self.state.offsets.get(id) {
            Some(offset) => node.bounds.translate(*offset),
            None => node.bounds,
        })
    }

    /// Drags the canvas by a screen-space delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> Result<()> {
        self.state.viewport.pan(dx, dy);
        self.present()
    }

    /// Drags one node by a screen-space delta. The new position only lives
    /// as long as this handle's current drawing.
    pub fn drag_node(&mut self, id: &str, dx: f64, dy: f64) -> Result<()> {
        if self.state.layout.get(id).is_none() {
            trace!("Ignoring drag of unknown node '{}'", id);
            return Ok(());
        }
        let scale = self.state.viewport.scale;
        let offset = self.state.offsets.entry(id.to_string()).or_default();
        offset.x += dx / scale;
        offset.y += dy / scale;
        self.present()
    }

    pub fn zoom(&mut self, factor: f64, center: Point) -> Result<()> {
        self.state.viewport.zoom(factor, center);
        self.present()
    }

    pub fn fit_view(&mut self) -> Result<()> {
        let bounds = self
            .state
            .layout
            .boxes
            .iter()
            .filter_map(|b| self.node_bounds(&b.id))
            .reduce(|acc, r| acc.union(&r))
            .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0));
        self.state.viewport = Viewport::fit(bounds, self.size, self.options.padding);
        self.present()
    }

    /// Adopts a new surface size and refits the graph.
    pub fn resize(&mut self, size: Size) -> Result<()> {
        if size.is_empty() {
            return Ok(());
        }
        self.size = size;
        self.fit_view()
    }

    /// Replaces the model. All view state (hover, dragged nodes, zoom and pan)
    /// is discarded and rebuilt as on a fresh mount.
    pub fn redraw(&mut self, model: GraphModel) -> Result<()> {
        self.model = model;
        self.state = RenderState::build(&self.model, &self.options, self.size);
        self.present()
    }

    pub fn close(self) {}
}

impl Drop for Handle<'_> {
    fn drop(&mut self) {
        debug!("Releasing surface '{}'", self.surface.id());
        self.surface.release();
    }
}
