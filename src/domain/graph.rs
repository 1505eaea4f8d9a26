//! Id-to-id relation index for cases.
//!
//! A [`Case`] holds its related cases by value, which says nothing about
//! whether the same case turns up again further down. The [`CaseGraph`] keeps
//! relations as an edge list between case ids instead, so cycles can be found
//! and refused.

use std::collections::HashMap;

use petgraph::{
    Direction,
    algo::{has_path_connecting, is_cyclic_directed, tarjan_scc},
    graphmap::DiGraphMap,
};
use thiserror::Error;

use crate::Case;

/// Errors that can occur when relating cases.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    /// One of the cases is not in the graph.
    #[error("case {0} not found")]
    UnknownCase(String),
    /// The relation would close a loop back to the originating case.
    #[error("relating {from} → {to} would create a cycle")]
    Cycle {
        /// Id of the case the relation starts from.
        from: String,
        /// Id of the related case.
        to: String,
    },
}

/// Result of relating two cases.
#[derive(Debug, PartialEq, Eq)]
pub struct LinkOutcome {
    /// Whether the relation existed before.
    pub already_linked: bool,
}

/// Directed graph of case relations.
///
/// Nodes are case ids, and an edge `a → b` means `b` is one of `a`'s related
/// cases.
#[derive(Debug, Default, Clone)]
pub struct CaseGraph {
    /// Case ids, indexed by node number.
    ids: Vec<String>,

    /// Reverse lookup from id to node number.
    nodes: HashMap<String, usize>,

    /// Edges point from a case to the cases related to it.
    graph: DiGraphMap<usize, ()>,
}

impl CaseGraph {
    /// Creates a new graph with pre-allocated capacity for the given number of
    /// cases.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::with_capacity(capacity),
            nodes: HashMap::with_capacity(capacity),
            graph: DiGraphMap::with_capacity(capacity, capacity * 2),
        }
    }

    /// Build the relation graph of a set of cases.
    ///
    /// Nested related cases are walked recursively. Each nested case with an
    /// id becomes a node, and so does each `containing → nested` pair of ids
    /// an edge. Cases without an id take no part, though their nested cases
    /// still do. Cycles already present in the data are kept.
    #[must_use]
    pub fn from_cases<'a>(cases: impl IntoIterator<Item = &'a Case>) -> Self {
        let cases = cases.into_iter();
        let mut graph = Self::with_capacity(cases.size_hint().0);
        for case in cases {
            graph.add_case(case);
        }
        graph
    }

    fn add_case(&mut self, case: &Case) {
        let from = case.id().map(|id| self.insert(id));
        if from.is_none() {
            tracing::debug!("Skipping case without id");
        }

        for related in case.related_cases() {
            if let (Some(from), Some(to)) = (from, related.id()) {
                let to = self.insert(to);
                self.graph.add_edge(from, to, ());
            }
            self.add_case(related);
        }
    }

    /// Add a case id to the graph.
    ///
    /// Returns the node number, which is stable for the life of the graph.
    /// Inserting an id twice is a no-op.
    pub fn insert(&mut self, id: &str) -> usize {
        if let Some(&node) = self.nodes.get(id) {
            return node;
        }
        let node = self.ids.len();
        self.ids.push(id.to_string());
        self.nodes.insert(id.to_string(), node);
        self.graph.add_node(node);
        node
    }

    /// Whether the graph knows about the given case id.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// The number of cases in the graph.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Whether the graph is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The number of relations in the graph.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Relate `to` to `from`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::UnknownCase`] when either id is not in the graph,
    /// or [`LinkError::Cycle`] if the relation would introduce a new cycle.
    pub fn link(&mut self, from: &str, to: &str) -> Result<LinkOutcome, LinkError> {
        let from_node = self.node(from)?;
        let to_node = self.node(to)?;

        let cycle = || LinkError::Cycle {
            from: from.to_string(),
            to: to.to_string(),
        };

        if from_node == to_node {
            return Err(cycle());
        }

        let already_linked = self.graph.contains_edge(from_node, to_node);

        if !already_linked && self.link_would_create_cycle(from_node, to_node) {
            return Err(cycle());
        }

        self.graph.add_edge(from_node, to_node, ());

        Ok(LinkOutcome { already_linked })
    }

    /// Remove the relation `from → to`.
    ///
    /// Returns `true` if the relation existed.
    pub fn unlink(&mut self, from: &str, to: &str) -> bool {
        let (Some(&from), Some(&to)) = (self.nodes.get(from), self.nodes.get(to)) else {
            return false;
        };
        self.graph.remove_edge(from, to).is_some()
    }

    /// Ids of the cases related to `id`, sorted.
    #[must_use]
    pub fn related(&self, id: &str) -> Vec<&str> {
        self.neighbours(id, Direction::Outgoing)
    }

    /// Ids of the cases that list `id` as related, sorted.
    #[must_use]
    pub fn referenced_by(&self, id: &str) -> Vec<&str> {
        self.neighbours(id, Direction::Incoming)
    }

    /// Determine whether the graph contains any cycles.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.graph)
    }

    /// Return all cycles in the graph as sorted sets of case ids.
    ///
    /// A case related to itself counts as a cycle of one.
    #[must_use]
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || component
                        .first()
                        .is_some_and(|&node| self.graph.contains_edge(node, node))
            })
            .map(|component| {
                let mut ids: Vec<String> = component
                    .into_iter()
                    .map(|node| self.ids[node].clone())
                    .collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }

    fn node(&self, id: &str) -> Result<usize, LinkError> {
        self.nodes
            .get(id)
            .copied()
            .ok_or_else(|| LinkError::UnknownCase(id.to_string()))
    }

    fn neighbours(&self, id: &str, direction: Direction) -> Vec<&str> {
        let Some(&node) = self.nodes.get(id) else {
            return Vec::new();
        };
        let mut ids: Vec<&str> = self
            .graph
            .neighbors_directed(node, direction)
            .map(|n| self.ids[n].as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    fn link_would_create_cycle(&self, from: usize, to: usize) -> bool {
        if !has_path_connecting(&self.graph, to, from, None) {
            return false;
        }

        // Both ends already sit on a common cycle, so this edge adds no new one.
        if has_path_connecting(&self.graph, from, to, None) {
            return false;
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn case(id: &str, related: Vec<Case>) -> Case {
        let mut case = Case::new();
        case.set_id(id.to_string());
        case.set_related_cases(related);
        case
    }

    fn graph_of(ids: &[&str]) -> CaseGraph {
        let mut graph = CaseGraph::default();
        for id in ids {
            graph.insert(id);
        }
        graph
    }

    #[test]
    fn builds_edges_from_nested_cases() {
        let cases = [case(
            "a",
            vec![case("b", vec![case("c", vec![])]), case("d", vec![])],
        )];

        let graph = CaseGraph::from_cases(&cases);

        assert_eq!(graph.len(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert_eq!(graph.related("a"), ["b", "d"]);
        assert_eq!(graph.related("b"), ["c"]);
        assert_eq!(graph.referenced_by("c"), ["b"]);
        assert!(!graph.has_cycles());
    }

    #[test]
    fn cases_without_id_are_skipped_but_walked() {
        let mut anonymous = case("x", vec![case("y", vec![])]);
        anonymous.set_id(None);

        let graph = CaseGraph::from_cases(&[case("a", vec![anonymous])]);

        assert!(graph.contains("a"));
        assert!(graph.contains("y"));
        assert!(!graph.contains("x"));
        assert!(graph.related("a").is_empty());
    }

    #[test]
    fn detects_id_cycles_in_nested_data() {
        let cases = [case("a", vec![case("b", vec![case("a", vec![])])])];

        let graph = CaseGraph::from_cases(&cases);

        assert!(graph.has_cycles());
        assert_eq!(graph.cycles(), vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let graph = CaseGraph::from_cases(&[case("a", vec![case("a", vec![])])]);
        assert_eq!(graph.cycles(), vec![vec!["a".to_string()]]);
    }

    #[test]
    fn prevents_new_cycle_when_linking() {
        let mut graph = graph_of(&["a", "b"]);

        graph.link("b", "a").expect("initial link should succeed");
        assert!(!graph.has_cycles());

        let err = graph.link("a", "b").expect_err("link should create a cycle");
        assert_eq!(
            err,
            LinkError::Cycle {
                from: "a".to_string(),
                to: "b".to_string()
            }
        );
        assert!(!graph.has_cycles());
    }

    #[test]
    fn allows_link_within_existing_cycle() {
        let cases = [case(
            "a",
            vec![case("b", vec![case("c", vec![case("a", vec![])])])],
        )];
        let mut graph = CaseGraph::from_cases(&cases);
        assert!(graph.has_cycles());

        // a, b and c already reach each other, so a shortcut adds no new cycle.
        let outcome = graph.link("a", "c").expect("link within cycle is allowed");
        assert!(!outcome.already_linked);
        assert_eq!(graph.cycles().len(), 1);
    }

    #[test]
    fn rejects_linking_case_to_itself() {
        let mut graph = graph_of(&["a"]);
        assert!(matches!(graph.link("a", "a"), Err(LinkError::Cycle { .. })));
    }

    #[test]
    fn linking_twice_reports_already_linked() {
        let mut graph = graph_of(&["a", "b"]);
        assert!(!graph.link("a", "b").unwrap().already_linked);
        assert!(graph.link("a", "b").unwrap().already_linked);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn linking_unknown_case_returns_error() {
        let mut graph = graph_of(&["a"]);
        assert_eq!(
            graph.link("a", "missing"),
            Err(LinkError::UnknownCase("missing".to_string()))
        );
        assert_eq!(
            graph.link("missing", "a"),
            Err(LinkError::UnknownCase("missing".to_string()))
        );
    }

    #[test]
    fn unlink_removes_edge() {
        let mut graph = graph_of(&["a", "b"]);
        graph.link("a", "b").unwrap();

        assert!(graph.unlink("a", "b"));
        assert!(!graph.unlink("a", "b"));
        assert!(!graph.unlink("a", "missing"));
        assert!(graph.related("a").is_empty());
    }
}
