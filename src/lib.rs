//! Pipeline task dependency graphs: build a renderer-independent
//! [`GraphModel`](graph::GraphModel) from a pipeline spec (optionally merged
//! with a run's status) and draw it onto a [`Surface`](render::Surface).

pub mod client;
pub mod config;
pub mod error;
pub mod graph;
pub mod output;
pub mod render;
pub mod status;
pub mod task;

pub use error::{GraphError, Result};
pub use graph::{Edge, GraphModel, Node, Variant, build_graph, build_graph_verbose};
pub use render::{Handle, RenderOptions, Surface, close, open};
pub use status::{Color, Status, status_color};
pub use task::{Step, Task, TaskSpec};
