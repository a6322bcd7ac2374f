//! Generic directed dependency graph.
//!
//! The render graph is rebuilt in full for every loaded scene and stays
//! small, so this layer favors simplicity: successor lists in insertion
//! order, predecessor queries by linear scan, and a depth-first postorder
//! for the execution order. Determinism matters: for a fixed sequence of
//! `add_node`/`connect` calls the topological order is always the same.

/// Index of a node inside a [`DependencyGraph`].
pub type NodeId = usize;

/// A directed graph of payload nodes with deterministic traversal order.
#[derive(Debug)]
pub struct DependencyGraph<T> {
    nodes: Vec<T>,
    /// Successor lists in edge insertion order, duplicates ignored.
    next: Vec<Vec<NodeId>>,
}

impl<T> Default for DependencyGraph<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> DependencyGraph<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            next: Vec::new(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.next.iter().map(Vec::len).sum()
    }

    pub fn node(&self, id: NodeId) -> &T {
        &self.nodes[id]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.nodes[id]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &T)> {
        self.nodes.iter().enumerate()
    }

    /// Add a node and return its ID.
    pub fn add_node(&mut self, payload: T) -> NodeId {
        self.nodes.push(payload);
        self.next.push(Vec::new());
        self.nodes.len() - 1
    }

    /// Add the edge `from -> to`. Duplicate edges are ignored.
    pub fn connect(&mut self, from: NodeId, to: NodeId) {
        let nexts = &mut self.next[from];
        if !nexts.contains(&to) {
            nexts.push(to);
        }
    }

    /// Remove the edge `from -> to` if present.
    pub fn disconnect(&mut self, from: NodeId, to: NodeId) {
        self.next[from].retain(|&id| id != to);
    }

    /// Successors of a node, in edge insertion order.
    pub fn node_out(&self, id: NodeId) -> &[NodeId] {
        &self.next[id]
    }

    /// Predecessors of a node, computed by linear scan.
    pub fn node_in(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        for (from, nexts) in self.next.iter().enumerate() {
            if nexts.contains(&id) {
                result.push(from);
            }
        }
        result
    }

    /// A valid execution order: for every edge `a -> b`, `a` comes before
    /// `b`. Produced by depth-first postorder from every unvisited node,
    /// reversed.
    pub fn topological_order(&self) -> Vec<NodeId> {
        let mut visited = vec![false; self.nodes.len()];
        let mut postorder = Vec::with_capacity(self.nodes.len());
        for start in 0..self.nodes.len() {
            if visited[start] {
                continue;
            }
            self.dfs_postorder(start, &mut visited, &mut postorder);
        }
        postorder.reverse();
        postorder
    }

    fn dfs_postorder(&self, start: NodeId, visited: &mut [bool], out: &mut Vec<NodeId>) {
        // Iterative DFS; the stack entry remembers how far into the
        // successor list we are.
        let mut stack = vec![(start, 0usize)];
        visited[start] = true;
        while let Some(&(node, cursor)) = stack.last() {
            let nexts = &self.next[node];
            if cursor < nexts.len() {
                stack.last_mut().unwrap().1 += 1;
                let next = nexts[cursor];
                if !visited[next] {
                    visited[next] = true;
                    stack.push((next, 0));
                }
            } else {
                out.push(node);
                stack.pop();
            }
        }
    }

    /// Whether the graph contains a cycle (a node reachable from itself).
    ///
    /// The builder above this layer is responsible for never producing
    /// one; this exists for validation and tests.
    pub fn has_cycle(&self) -> bool {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }
        let mut color = vec![Color::White; self.nodes.len()];
        for start in 0..self.nodes.len() {
            if color[start] != Color::White {
                continue;
            }
            let mut stack = vec![(start, 0usize)];
            color[start] = Color::Gray;
            while let Some(&(node, cursor)) = stack.last() {
                let nexts = &self.next[node];
                if cursor < nexts.len() {
                    stack.last_mut().unwrap().1 += 1;
                    let next = nexts[cursor];
                    match color[next] {
                        Color::Gray => return true,
                        Color::White => {
                            color[next] = Color::Gray;
                            stack.push((next, 0));
                        }
                        Color::Black => {}
                    }
                } else {
                    color[node] = Color::Black;
                    stack.pop();
                }
            }
        }
        false
    }

    /// Serialize the graph to `.dot` text for external visualization.
    ///
    /// `label` supplies the display label of each node.
    pub fn to_graphviz(&self, label: impl Fn(NodeId, &T) -> String) -> String {
        let mut out = String::from("digraph framegraph {\nnode [shape=box]\n");
        for (id, node) in self.nodes.iter().enumerate() {
            out.push_str(&format!("n{id}[label=\"{}\"]\n", label(id, node)));
        }
        for (from, nexts) in self.next.iter().enumerate() {
            for to in nexts {
                out.push_str(&format!("n{from}->n{to}\n"));
            }
        }
        out.push('}');
        out
    }
}
