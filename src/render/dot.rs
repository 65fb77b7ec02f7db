use std::fmt::Write;

use super::layout::RankDir;
use crate::{
    graph::{GraphModel, Variant},
    status::optional_status_color,
};

/// Exports a model as a Graphviz `digraph`, colored the same way as the
/// rendered graph.
pub fn to_dot(model: &GraphModel, rankdir: RankDir) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_dot(&mut out, model, rankdir);
    out
}

fn write_dot(out: &mut String, model: &GraphModel, rankdir: RankDir) -> std::fmt::Result {
    writeln!(out, "digraph pipeline {{")?;
    writeln!(out, "  rankdir={};", rankdir.as_str())?;
    writeln!(out, "  node [shape=box, style=\"rounded,filled\", fontname=\"Helvetica\"];")?;
    writeln!(out, "  edge [color=\"#AAAAAA\"];")?;

    for node in &model.nodes {
        let mut label = node.label.clone();
        match model.variant {
            Variant::Simple if !node.description.is_empty() => {
                label.push('\n');
                label.push_str(&node.description);
            }
            Variant::Verbose => {
                for step in &node.steps {
                    let status = step.status.as_ref().map_or("-", |s| s.as_str());
                    label.push_str(&format!("\n{} [{}]", step.name, status));
                }
            }
            Variant::Simple => {}
        }

        let color = optional_status_color(node.status.as_ref());
        writeln!(
            out,
            "  \"{}\" [label=\"{}\", color=\"{}\", fillcolor=\"#FFFFFF\"];",
            quote(&node.id),
            quote(&label),
            color
        )?;
    }

    let mut placeholders: Vec<&str> = model.dangling_edges().map(|e| e.target.as_str()).collect();
    placeholders.sort_unstable();
    placeholders.dedup();
    for id in placeholders {
        writeln!(
            out,
            "  \"{}\" [style=\"rounded,dashed\", color=\"#AAAAAA\"];",
            quote(id)
        )?;
    }

    for edge in &model.edges {
        writeln!(
            out,
            "  \"{}\" -> \"{}\";",
            quote(&edge.source),
            quote(&edge.target)
        )?;
    }

    writeln!(out, "}}")
}

fn quote(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{graph::build_graph_verbose, task::Task};

    #[test]
    fn exports_nodes_edges_and_placeholders() {
        let tasks: Vec<Task> = serde_json::from_str(
            r#"[
                {"name": "deploy", "dependencies": ["build", "nonexistent"], "status": "Error"},
                {"name": "build", "steps": [{"name": "make", "status": "Success"}]}
            ]"#,
        )
        .unwrap();

        let dot = to_dot(&build_graph_verbose(&tasks), RankDir::RightLeft);

        assert!(dot.starts_with("digraph pipeline {"));
        assert!(dot.contains("rankdir=RL;"));
        assert!(dot.contains(r##""deploy" [label="deploy", color="#E8684A""##));
        assert!(dot.contains(r#"label="build\nmake [Success]""#));
        assert!(dot.contains(r#""nonexistent" [style="rounded,dashed""#));
        assert!(dot.contains(r#""deploy" -> "build";"#));
        assert!(dot.contains(r#""deploy" -> "nonexistent";"#));
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(quote("say \"hi\""), "say \\\"hi\\\"");
    }
}
