use std::collections::HashMap;

use petgraph::{
    algo::tarjan_scc,
    graph::{DiGraph, NodeIndex},
};

/// Layer ranks for a dependency graph.
///
/// A node's level is 0 when it has no dependencies and otherwise one more than
/// the highest level among its dependencies. Members of a cycle share a level,
/// and targets that were never declared as nodes sit at level 0.
#[derive(Debug, Default, Clone)]
pub struct DependencyLevels {
    order: Vec<String>,
    levels: HashMap<String, usize>,
    cycles: Vec<Vec<String>>,
}

impl DependencyLevels {
    /// `edges` run from the dependent to its dependency.
    pub fn compute<'a>(
        ids: impl IntoIterator<Item = &'a str>,
        edges: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        let mut graph: DiGraph<&str, ()> = DiGraph::new();
        let mut index: HashMap<&str, NodeIndex> = HashMap::new();

        for id in ids {
            index.entry(id).or_insert_with(|| graph.add_node(id));
        }

        for (source, target) in edges {
            let source = *index.entry(source).or_insert_with(|| graph.add_node(source));
            let target = *index.entry(target).or_insert_with(|| graph.add_node(target));
            graph.add_edge(source, target, ());
        }

        // Components come out in reverse topological order, so every
        // dependency component is ranked before its dependents.
        let components = tarjan_scc(&graph);
        let mut component_of = vec![0; graph.node_count()];
        for (i, component) in components.iter().enumerate() {
            for node in component {
                component_of[node.index()] = i;
            }
        }

        let mut component_level = vec![0usize; components.len()];
        let mut cycles = Vec::new();

        for (i, component) in components.iter().enumerate() {
            component_level[i] = component
                .iter()
                .flat_map(|&node| graph.neighbors(node))
                .filter(|dep| component_of[dep.index()] != i)
                .map(|dep| component_level[component_of[dep.index()]] + 1)
                .max()
                .unwrap_or(0);

            let self_loop = component.len() == 1 && graph.contains_edge(component[0], component[0]);
            if component.len() > 1 || self_loop {
                let mut members: Vec<NodeIndex> = component.clone();
                members.sort();
                cycles.push(members.iter().map(|n| graph[*n].to_string()).collect());
            }
        }

        let order: Vec<String> = graph.node_indices().map(|n| graph[n].to_string()).collect();
        let levels = graph
            .node_indices()
            .map(|n| (graph[n].to_string(), component_level[component_of[n.index()]]))
            .collect();

        Self {
            order,
            levels,
            cycles,
        }
    }

    pub fn level(&self, id: &str) -> Option<usize> {
        self.levels.get(id).copied()
    }

    pub fn max_level(&self) -> usize {
        self.levels.values().copied().max().unwrap_or(0)
    }

    /// Node ids grouped by level, lowest level first. Within a level ids keep
    /// the order in which they were first seen.
    pub fn layers(&self) -> Vec<Vec<String>> {
        if self.order.is_empty() {
            return Vec::new();
        }

        let mut layers = vec![Vec::new(); self.max_level() + 1];
        for id in &self.order {
            layers[self.levels[id]].push(id.clone());
        }
        layers
    }

    /// Each cycle is listed once, members in first-seen order.
    pub fn cycles(&self) -> &[Vec<String>] {
        &self.cycles
    }
}

pub fn find_cycles<'a>(
    ids: impl IntoIterator<Item = &'a str>,
    edges: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Vec<Vec<String>> {
    DependencyLevels::compute(ids, edges).cycles
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chain_levels() {
        let levels = DependencyLevels::compute(
            ["deploy", "build", "compile"],
            [("deploy", "build"), ("build", "compile")],
        );

        assert_eq!(levels.level("compile"), Some(0));
        assert_eq!(levels.level("build"), Some(1));
        assert_eq!(levels.level("deploy"), Some(2));
        assert!(levels.cycles().is_empty());
    }

    #[test]
    fn level_is_longest_path() {
        let levels = DependencyLevels::compute(
            ["a", "b", "c", "d"],
            [("a", "b"), ("b", "c"), ("a", "d"), ("d", "c"), ("a", "c")],
        );

        assert_eq!(levels.level("a"), Some(2));
        assert_eq!(
            levels.layers(),
            vec![vec!["c".to_string()], vec!["b".to_string(), "d".to_string()], vec!["a".to_string()]]
        );
    }

    #[test]
    fn dangling_target_sits_at_level_zero() {
        let levels = DependencyLevels::compute(["deploy"], [("deploy", "nonexistent")]);

        assert_eq!(levels.level("nonexistent"), Some(0));
        assert_eq!(levels.level("deploy"), Some(1));
    }

    #[test]
    fn cycle_members_share_a_level() {
        let levels = DependencyLevels::compute(
            ["a", "b", "c", "root"],
            [("a", "b"), ("b", "a"), ("c", "a"), ("a", "root")],
        );

        assert_eq!(levels.level("root"), Some(0));
        assert_eq!(levels.level("a"), Some(1));
        assert_eq!(levels.level("b"), Some(1));
        assert_eq!(levels.level("c"), Some(2));
        assert_eq!(levels.cycles(), &[vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let cycles = find_cycles(["solo"], [("solo", "solo")]);
        assert_eq!(cycles, vec![vec!["solo".to_string()]]);
    }

    #[test]
    fn empty_graph_has_no_layers() {
        let levels = DependencyLevels::compute(Vec::<&str>::new(), Vec::<(&str, &str)>::new());
        assert!(levels.layers().is_empty());
        assert_eq!(levels.max_level(), 0);
    }
}
