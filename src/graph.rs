//! Renderer-independent graph model built from a task collection.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    status::{Color, Status, optional_status_color},
    task::{Step, Task, TaskSpec},
};

/// Which node template a model is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// Spec view: label and description only.
    Simple,
    /// Run view: status title bar plus one row per step.
    Verbose,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    pub steps: Vec<Step>,
    pub color: Color,
}

/// A dependency relation, from the dependent task to its dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphModel {
    pub variant: Variant,
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

impl GraphModel {
    pub fn empty(variant: Variant) -> Self {
        Self {
            variant,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Edges whose target is not a node of this model. They are kept as-is;
    /// the layout draws them towards a placeholder.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| self.node(&e.target).is_none())
    }
}

struct Builder {
    model: GraphModel,
    index: HashMap<String, usize>,
}

impl Builder {
    fn new(variant: Variant) -> Self {
        Self {
            model: GraphModel::empty(variant),
            index: HashMap::new(),
        }
    }

    /// A repeated id replaces the earlier node in place.
    fn node(&mut self, node: Node) {
        match self.index.get(&node.id) {
            Some(&i) => self.model.nodes[i] = node,
            None => {
                self.index.insert(node.id.clone(), self.model.nodes.len());
                self.model.nodes.push(node);
            }
        }
    }

    fn edges(&mut self, source: &str, dependencies: &[String]) {
        self.model.edges.extend(dependencies.iter().map(|dep| Edge {
            source: source.to_string(),
            target: dep.clone(),
        }));
    }
}

/// Builds the spec view of a pipeline from its name-to-task mapping.
pub fn build_graph<'a, I>(tasks: I) -> GraphModel
where
    I: IntoIterator<Item = (&'a String, &'a TaskSpec)>,
{
    let mut builder = Builder::new(Variant::Simple);

    for (name, task) in tasks {
        builder.node(Node {
            id: name.clone(),
            label: name.clone(),
            description: task.description.clone(),
            status: None,
            steps: Vec::new(),
            color: optional_status_color(None),
        });
        builder.edges(name, &task.dependencies);
    }

    builder.model
}

/// Builds the run view of a pipeline: every node carries its task's status
/// and steps.
pub fn build_graph_verbose(tasks: &[Task]) -> GraphModel {
    let mut builder = Builder::new(Variant::Verbose);

    for task in tasks {
        builder.node(Node {
            id: task.name.clone(),
            label: task.name.clone(),
            description: task.description.clone(),
            status: task.status.clone(),
            steps: task.steps.clone(),
            color: optional_status_color(task.status.as_ref()),
        });
        builder.edges(&task.name, &task.dependencies);
    }

    builder.model
}
