//! Dependency ordering of the tables in one descriptor.

use crate::error::{BuildError, BuildResult};
use crate::manifest::TableSpec;
use petgraph::algo::{tarjan_scc, toposort};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

/// Tables of a descriptor as a graph.
///
/// Node indices equal declaration positions. An edge runs from a referenced
/// table to the table that references it, so a topological walk yields
/// referenced tables first.
pub(crate) struct TableGraph<'a> {
    graph: DiGraph<&'a str, ()>,
}

impl<'a> TableGraph<'a> {
    /// Build the graph. Table names must already be unique.
    pub(crate) fn build(tables: &'a [TableSpec]) -> Self {
        let mut graph = DiGraph::new();
        let mut node_map: HashMap<&str, NodeIndex> = HashMap::new();

        for table in tables {
            let idx = graph.add_node(table.name.as_str());
            node_map.insert(table.name.as_str(), idx);
        }

        for table in tables {
            let Some(&dependent) = node_map.get(table.name.as_str()) else {
                continue;
            };
            for referenced in table.referenced_tables() {
                // Tables outside this descriptor already exist
                if let Some(&dependency) = node_map.get(referenced) {
                    graph.update_edge(dependency, dependent, ());
                }
            }
        }

        Self { graph }
    }

    /// Declaration positions in dependency order.
    ///
    /// Among tables whose dependencies are satisfied the earliest declared
    /// comes first, so a manifest that is already correctly ordered is
    /// returned unchanged.
    pub(crate) fn order(&self) -> BuildResult<Vec<usize>> {
        if let Err(cycle) = toposort(&self.graph, None) {
            return Err(BuildError::CircularReference {
                cycle: self.find_cycle_path(cycle.node_id()),
            });
        }

        let mut in_degree: Vec<usize> = self
            .graph
            .node_indices()
            .map(|n| self.graph.edges_directed(n, Direction::Incoming).count())
            .collect();

        let mut ready: BinaryHeap<Reverse<usize>> = in_degree
            .iter()
            .enumerate()
            .filter(|(_, degree)| **degree == 0)
            .map(|(position, _)| Reverse(position))
            .collect();

        let mut order = Vec::with_capacity(in_degree.len());
        while let Some(Reverse(position)) = ready.pop() {
            order.push(position);
            for edge in self.graph.edges(NodeIndex::new(position)) {
                let target = edge.target().index();
                in_degree[target] -= 1;
                if in_degree[target] == 0 {
                    ready.push(Reverse(target));
                }
            }
        }

        Ok(order)
    }

    /// Shortest path from `start` back to itself, staying inside its
    /// strongly connected component, for error reporting
    fn find_cycle_path(&self, start: NodeIndex) -> String {
        let members: HashSet<NodeIndex> = tarjan_scc(&self.graph)
            .into_iter()
            .find(|component| component.contains(&start))
            .unwrap_or_default()
            .into_iter()
            .collect();

        let mut parent: HashMap<NodeIndex, NodeIndex> = HashMap::new();
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for edge in self.graph.edges(node) {
                let target = edge.target();
                if target == start {
                    let mut path = vec![node];
                    let mut current = node;
                    while let Some(&previous) = parent.get(&current) {
                        path.push(previous);
                        current = previous;
                    }
                    path.reverse();
                    path.push(start);
                    return path
                        .into_iter()
                        .map(|n| self.graph[n])
                        .collect::<Vec<_>>()
                        .join(" -> ");
                }
                if members.contains(&target) && !parent.contains_key(&target) {
                    parent.insert(target, node);
                    queue.push_back(target);
                }
            }
        }

        self.graph[start].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ColumnSpec;

    fn table(name: &str, refs: &[&str]) -> TableSpec {
        let mut columns = vec![ColumnSpec::new("Id", "Int32").primary_key()];
        for r in refs {
            columns.push(ColumnSpec::new(format!("{r}Id"), "Int32").references(*r, "Id"));
        }
        TableSpec::new(name, columns)
    }

    #[test]
    fn test_independent_tables_keep_declaration_order() {
        let tables = vec![table("C", &[]), table("A", &[]), table("B", &[])];
        assert_eq!(TableGraph::build(&tables).order().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_referenced_table_moves_first() {
        let tables = vec![table("Child", &["Parent"]), table("Parent", &[])];
        assert_eq!(TableGraph::build(&tables).order().unwrap(), vec![1, 0]);
    }

    #[test]
    fn test_chain_and_external_reference() {
        let tables = vec![
            table("OrderLines", &["Orders", "Products"]),
            table("Orders", &["Customers", "Regions"]),
            table("Customers", &[]),
            table("Products", &[]),
        ];
        // Regions is not part of the descriptor and is ignored
        assert_eq!(
            TableGraph::build(&tables).order().unwrap(),
            vec![2, 1, 3, 0]
        );
    }

    #[test]
    fn test_cycle_detected() {
        let tables = vec![table("A", &["B"]), table("B", &["A"])];
        let err = TableGraph::build(&tables).order().unwrap_err();
        match err {
            BuildError::CircularReference { cycle } => {
                assert!(cycle.contains("A"));
                assert!(cycle.contains("B"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_cycle_path_excludes_tables_off_the_cycle() {
        // Ledger hangs off the Orders/Invoices cycle but is not part of it
        let tables = vec![
            table("Orders", &["Invoices"]),
            table("Invoices", &["Orders"]),
            table("Ledger", &["Orders", "Invoices"]),
        ];
        let err = TableGraph::build(&tables).order().unwrap_err();
        match err {
            BuildError::CircularReference { cycle } => {
                assert!(!cycle.contains("Ledger"), "{cycle}");
                let parts: Vec<&str> = cycle.split(" -> ").collect();
                assert_eq!(parts.len(), 3, "{cycle}");
                assert_eq!(parts.first(), parts.last());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_self_reference_is_not_a_cycle() {
        let tables = vec![table("Nodes", &["Nodes"])];
        assert_eq!(TableGraph::build(&tables).order().unwrap(), vec![0]);
    }
}
