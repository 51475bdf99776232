use petgraph::algo::tarjan_scc;
use petgraph::graph::{Graph, NodeIndex};
use petgraph::visit::Dfs;
use petgraph::Directed;
use std::collections::HashMap;
use treebank_protocol::{Deprel, TokenId};

/// The basic dependency tree of one sentence. Node 0 is the artificial
/// root; edges run from head to dependent.
pub struct DependencyGraph {
    graph: Graph<u32, Deprel, Directed>,
    index_map: HashMap<u32, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        let mut graph = Graph::new();
        let root = graph.add_node(0);
        let mut index_map = HashMap::new();
        index_map.insert(0, root);
        Self { graph, index_map }
    }

    fn node(&mut self, id: u32) -> NodeIndex {
        *self
            .index_map
            .entry(id)
            .or_insert_with(|| self.graph.add_node(id))
    }

    pub fn add_token(&mut self, id: TokenId) {
        self.node(id.get());
    }

    pub fn add_relation(&mut self, head: u32, dependent: TokenId, deprel: Deprel) {
        let from = self.node(head);
        let to = self.node(dependent.get());
        self.graph.add_edge(from, to, deprel);
    }

    /// Groups of tokens that depend on each other in a loop, each sorted by ID.
    /// A token that is its own head forms a group of one.
    pub fn cycles(&self) -> Vec<Vec<TokenId>> {
        let mut cycles: Vec<Vec<TokenId>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.len() > 1
                    || self.graph.contains_edge(component[0], component[0])
            })
            .map(|component| {
                let mut ids: Vec<TokenId> = component
                    .into_iter()
                    .map(|idx| TokenId::new(self.graph[idx]))
                    .collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Tokens that cannot be reached by following heads down from the root.
    pub fn unreachable(&self) -> Vec<TokenId> {
        let root = self.index_map[&0];
        let mut seen = vec![false; self.graph.node_count()];
        let mut dfs = Dfs::new(&self.graph, root);
        while let Some(idx) = dfs.next(&self.graph) {
            seen[idx.index()] = true;
        }

        let mut ids: Vec<TokenId> = self
            .graph
            .node_indices()
            .filter(|idx| !seen[idx.index()])
            .map(|idx| TokenId::new(self.graph[idx]))
            .collect();
        ids.sort();
        ids
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
