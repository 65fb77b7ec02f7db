use clap::ValueEnum;
use serde::Deserialize;

#[derive(ValueEnum, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Rendered graph as an SVG document.
    Svg,
    /// Graphviz source.
    Dot,
    /// The graph model as JSON.
    Json,
}
