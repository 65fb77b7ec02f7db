//! Layered placement of a [`GraphModel`]: dependency levels become ranks,
//! every node gets a box sized by its template.

use std::collections::HashMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::scene::{Rect, Size};
use crate::{
    graph::{GraphModel, Node, Variant},
    task::DependencyLevels,
};

pub const SIMPLE_MIN_WIDTH: f64 = 270.0;
pub const SIMPLE_HEIGHT: f64 = 80.0;
pub const SIMPLE_CHAR_WIDTH: f64 = 8.0;

pub const VERBOSE_MIN_WIDTH: f64 = 150.0;
pub const BASE_HEIGHT: f64 = 40.0;
pub const STEP_ROW_HEIGHT: f64 = 20.0;
pub const TITLE_HEIGHT: f64 = 20.0;
pub const VERBOSE_CHAR_WIDTH: f64 = 7.0;

pub const PLACEHOLDER_MIN_WIDTH: f64 = 80.0;
pub const PLACEHOLDER_HEIGHT: f64 = 36.0;

pub const RANK_SEP: f64 = 60.0;
pub const NODE_SEP: f64 = 30.0;

/// Direction in which ranks advance, named after the dependent-to-dependency
/// flow: with `TB` dependents sit on top and their dependencies below.
#[derive(ValueEnum, Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RankDir {
    #[value(name = "TB")]
    #[serde(rename = "TB")]
    TopBottom,
    #[value(name = "BT")]
    #[serde(rename = "BT")]
    BottomTop,
    #[value(name = "LR")]
    #[serde(rename = "LR")]
    LeftRight,
    #[value(name = "RL")]
    #[serde(rename = "RL")]
    RightLeft,
}

impl RankDir {
    pub fn for_variant(variant: Variant) -> Self {
        match variant {
            Variant::Simple => RankDir::TopBottom,
            Variant::Verbose => RankDir::RightLeft,
        }
    }

    pub fn is_vertical(self) -> bool {
        matches!(self, RankDir::TopBottom | RankDir::BottomTop)
    }

    fn dependencies_first(self) -> bool {
        matches!(self, RankDir::BottomTop | RankDir::RightLeft)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RankDir::TopBottom => "TB",
            RankDir::BottomTop => "BT",
            RankDir::LeftRight => "LR",
            RankDir::RightLeft => "RL",
        }
    }
}

/// Template size of a node. Verbose nodes grow by one row per step.
pub fn node_size(node: &Node, variant: Variant) -> Size {
    match variant {
        Variant::Simple => {
            let widest = node
                .label
                .chars()
                .count()
                .max(node.description.chars().count());
            Size::new(
                SIMPLE_MIN_WIDTH.max(14.0 + SIMPLE_CHAR_WIDTH * widest as f64),
                SIMPLE_HEIGHT,
            )
        }
        Variant::Verbose => {
            let title = 24.0 + VERBOSE_CHAR_WIDTH * node.label.chars().count() as f64 + 8.0;
            let steps = node
                .steps
                .iter()
                .map(|s| 30.0 + VERBOSE_CHAR_WIDTH * s.name.chars().count() as f64 + 8.0)
                .fold(0.0, f64::max);
            Size::new(
                VERBOSE_MIN_WIDTH.max(title).max(steps),
                BASE_HEIGHT + STEP_ROW_HEIGHT * node.steps.len() as f64,
            )
        }
    }
}

fn placeholder_size(id: &str) -> Size {
    Size::new(
        PLACEHOLDER_MIN_WIDTH.max(16.0 + VERBOSE_CHAR_WIDTH * id.chars().count() as f64),
        PLACEHOLDER_HEIGHT,
    )
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeBox {
    pub id: String,
    pub bounds: Rect,
    /// Stands in for a dependency that names no task of the model.
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub rankdir: RankDir,
    pub boxes: Vec<NodeBox>,
}

impl Layout {
    pub fn compute(model: &GraphModel, rankdir: RankDir) -> Self {
        let levels = DependencyLevels::compute(
            model.nodes.iter().map(|n| n.id.as_str()),
            model
                .edges
                .iter()
                .map(|e| (e.source.as_str(), e.target.as_str())),
        );

        for cycle in levels.cycles() {
            warn!("Dependency cycle between tasks: {}", cycle.join(", "));
        }

        let mut layers = levels.layers();
        if !rankdir.dependencies_first() {
            layers.reverse();
        }
        order_layers(&mut layers, model);

        let sizes: HashMap<&str, Size> = model
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), node_size(n, model.variant)))
            .collect();

        let vertical = rankdir.is_vertical();
        let mut boxes = Vec::new();
        let mut rank_pos = 0.0;

        for layer in &layers {
            let layer_sizes: Vec<(Size, bool)> = layer
                .iter()
                .map(|id| match sizes.get(id.as_str()) {
                    Some(size) => (*size, false),
                    None => (placeholder_size(id), true),
                })
                .collect();

            let along = |s: &Size| if vertical { s.height } else { s.width };
            let across = |s: &Size| if vertical { s.width } else { s.height };

            let thickness = layer_sizes.iter().map(|(s, _)| along(s)).fold(0.0, f64::max);
            let span = layer_sizes.iter().map(|(s, _)| across(s)).sum::<f64>()
                + NODE_SEP * layer_sizes.len().saturating_sub(1) as f64;

            let mut cross = -span / 2.0;
            for (id, (size, placeholder)) in layer.iter().zip(layer_sizes) {
                let rank = rank_pos + (thickness - along(&size)) / 2.0;
                let bounds = if vertical {
                    Rect::new(cross, rank, size.width, size.height)
                } else {
                    Rect::new(rank, cross, size.width, size.height)
                };
                cross += across(&size) + NODE_SEP;

                boxes.push(NodeBox {
                    id: id.clone(),
                    bounds,
                    placeholder,
                });
            }

            rank_pos += thickness + RANK_SEP;
        }

        debug!(
            "Laid out {} nodes in {} ranks ({})",
            boxes.len(),
            layers.len(),
            rankdir.as_str()
        );

        Self { rankdir, boxes }
    }

    pub fn get(&self, id: &str) -> Option<&NodeBox> {
        self.boxes.iter().find(|b| b.id == id)
    }

    pub fn bounds(&self) -> Rect {
        self.boxes
            .iter()
            .map(|b| b.bounds)
            .reduce(|acc, r| acc.union(&r))
            .unwrap_or(Rect::new(0.0, 0.0, 0.0, 0.0))
    }
}

/// One sweep of the barycenter heuristic: each layer is ordered by the mean
/// position of its neighbours in the layers already placed.
fn order_layers(layers: &mut [Vec<String>], model: &GraphModel) {
    let mut neighbours: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in &model.edges {
        neighbours.entry(&edge.source).or_default().push(&edge.target);
        neighbours.entry(&edge.target).or_default().push(&edge.source);
    }

    let mut position: HashMap<String, f64> = HashMap::new();

    for layer in layers.iter_mut() {
        let keys: HashMap<String, f64> = layer
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let placed: Vec<f64> = neighbours
                    .get(id.as_str())
                    .into_iter()
                    .flatten()
                    .filter_map(|n| position.get(*n).copied())
                    .collect();
                let key = if placed.is_empty() {
                    i as f64
                } else {
                    placed.iter().sum::<f64>() / placed.len() as f64
                };
                (id.clone(), key)
            })
            .collect();

        layer.sort_by(|a, b| keys[a].total_cmp(&keys[b]));

        for (i, id) in layer.iter().enumerate() {
            position.insert(id.clone(), i as f64);
        }
    }
}
