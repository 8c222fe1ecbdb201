//! Trie of content path segments, stored as an arena of nodes addressed by index.
//!
//! After condensation the structure is a DAG: several parents can share one child.
//! Parent lists are back-references used by condensation and node ordering only.

mod condense;
mod order;

pub use order::OrderedNode;

use tracing::{debug, trace};

use crate::error::{CodecError, Result};

pub type NodeId = usize;

/// An edge: the segment consumed and the node it leads to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodePair {
    pub name: String,
    pub connection: NodeId,
}

#[derive(Clone, Debug, Default)]
pub struct PathNode {
    pub id: NodeId,
    children: Vec<NodePair>,
    parents: Vec<NodeId>,
}

impl PathNode {
    fn new(id: NodeId) -> Self {
        Self { id, ..Default::default() }
    }

    /// Edges sorted by segment name.
    pub fn children(&self) -> &[NodePair] {
        &self.children
    }

    pub fn parents(&self) -> &[NodeId] {
        &self.parents
    }

    fn add_child(&mut self, pair: NodePair) {
        let pos = self.children.partition_point(|c| c.name <= pair.name);
        self.children.insert(pos, pair);
    }

    fn add_parent(&mut self, parent: NodeId) {
        if !self.parents.contains(&parent) {
            self.parents.push(parent);
        }
    }
}

#[derive(Clone, Debug)]
pub struct PathTree {
    nodes: Vec<PathNode>,
    active: Vec<bool>,
    root: NodeId,
    end_marker: Option<NodeId>,
}

impl PathTree {
    fn empty() -> Self {
        Self { nodes: Vec::new(), active: Vec::new(), root: 0, end_marker: None }
    }

    /// Builds the segment trie of `paths`. Segments are the non-empty pieces
    /// between slashes; every path ends on the single shared end marker.
    pub fn build<S: AsRef<str>>(paths: &[S]) -> Result<Self> {
        if paths.is_empty() {
            return Err(CodecError::MalformedInput("no content paths to encode".into()));
        }

        let mut tree = Self::empty();
        tree.root = tree.new_node();
        tree.end_marker = Some(tree.new_node());

        for path in paths {
            let path = path.as_ref();
            let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

            if segments.is_empty() {
                debug!("Skipping content path without segments: {:?}", path);
                continue;
            }
            if segments.iter().any(|s| s.contains('\0')) {
                return Err(CodecError::MalformedInput(format!("segment with a NUL byte in {path:?}")));
            }

            tree.insert(&segments);
        }

        if tree.nodes[tree.root].children.is_empty() {
            return Err(CodecError::MalformedInput("no content path has a non-empty segment".into()));
        }

        Ok(tree)
    }

    /// Rebuilds a graph of `node_count` nodes from decoded `(parent, name, child)` edges.
    /// The root is the only node without parents that has children.
    pub fn from_links<I>(node_count: usize, links: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NodeId, String, NodeId)>,
    {
        let mut tree = Self::empty();
        for _ in 0..node_count {
            tree.new_node();
        }

        for (parent, name, child) in links {
            if parent >= node_count || child >= node_count {
                return Err(CodecError::CorruptPayload(format!("edge {parent} -> {child} outside {node_count} nodes")));
            }
            tree.link(parent, name, child);
        }

        tree.root = tree
            .find_root()
            .ok_or_else(|| CodecError::CorruptPayload("no unique root in decoded path graph".into()))?;

        Ok(tree)
    }

    fn new_node(&mut self) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(PathNode::new(id));
        self.active.push(true);
        id
    }

    fn link(&mut self, parent: NodeId, name: String, child: NodeId) {
        self.nodes[parent].add_child(NodePair { name, connection: child });
        self.nodes[child].add_parent(parent);
    }

    fn insert(&mut self, segments: &[&str]) {
        let end = self.end_marker.unwrap_or_default();
        let mut parent = self.root;

        for (i, &segment) in segments.iter().enumerate() {
            if i + 1 == segments.len() {
                let present = self.nodes[parent]
                    .children
                    .iter()
                    .any(|c| c.name == segment && c.connection == end);
                if !present {
                    self.link(parent, segment.to_string(), end);
                }
                return;
            }

            let existing = self.nodes[parent]
                .children
                .iter()
                .find(|c| c.name == segment && c.connection != end)
                .map(|c| c.connection);

            parent = match existing {
                Some(next) => next,
                None => {
                    let next = self.new_node();
                    self.link(parent, segment.to_string(), next);
                    trace!("Created node {} under {} for {:?}", next, parent, segment);
                    next
                }
            };
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn end_marker(&self) -> Option<NodeId> {
        self.end_marker
    }

    pub fn node(&self, id: NodeId) -> &PathNode {
        &self.nodes[id]
    }

    /// Structural equality: same number of edges, and each edge of `a` has an
    /// edge of `b` with the same name leading to an equivalent node.
    ///
    /// Within one node a name leads to at most one childless node (the end
    /// marker) and at most one node with children, so every edge has a single
    /// candidate partner.
    pub fn is_equivalent(&self, a: NodeId, b: NodeId) -> bool {
        let mut pending = vec![(a, b)];

        while let Some((a, b)) = pending.pop() {
            if a == b {
                continue;
            }

            let (a, b) = (&self.nodes[a], &self.nodes[b]);
            if a.children.len() != b.children.len() {
                return false;
            }

            for pair in a.children.iter() {
                let leaf = self.nodes[pair.connection].children.is_empty();
                let partner = b
                    .children
                    .iter()
                    .find(|other| other.name == pair.name && self.nodes[other.connection].children.is_empty() == leaf);

                match partner {
                    Some(other) => pending.push((pair.connection, other.connection)),
                    None => return false,
                }
            }
        }

        true
    }

    fn find_root(&self) -> Option<NodeId> {
        let mut candidates = self
            .nodes
            .iter()
            .filter(|n| self.active[n.id] && n.parents.is_empty() && !n.children.is_empty());

        match (candidates.next(), candidates.next()) {
            (Some(root), None) => Some(root.id),
            _ => None,
        }
    }

    /// Distinct nodes reachable from the root, in depth-first discovery order.
    pub fn reachable(&self) -> Vec<NodeId> {
        let mut seen = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            if seen[id] {
                continue;
            }
            seen[id] = true;
            order.push(id);

            for pair in self.nodes[id].children.iter().rev() {
                if !seen[pair.connection] {
                    stack.push(pair.connection);
                }
            }
        }

        order
    }

    pub fn node_count(&self) -> usize {
        self.reachable().len()
    }

    /// Every root-to-leaf walk as a `/`-joined path, in child order.
    pub fn paths(&self) -> Result<Vec<String>> {
        let mut urls = Vec::new();
        let mut prefix = String::new();
        // (node, next child, prefix length before entering the node)
        let mut stack: Vec<(NodeId, usize, usize)> = vec![(self.root, 0, 0)];

        while let Some(frame) = stack.last_mut() {
            let (id, next, entered_at) = *frame;
            let children = &self.nodes[id].children;

            let Some(pair) = children.get(next) else {
                if children.is_empty() {
                    urls.push(prefix.clone());
                }
                prefix.truncate(entered_at);
                stack.pop();
                continue;
            };
            frame.1 += 1;

            // A walk longer than the node count revisits a node.
            if stack.len() > self.nodes.len() {
                return Err(CodecError::CorruptPayload("path graph contains a cycle".into()));
            }

            let entered_at = prefix.len();
            prefix.push('/');
            prefix.push_str(&pair.name);
            stack.push((pair.connection, 0, entered_at));
        }

        Ok(urls)
    }

    pub fn dump(&self) {
        let mut stack = vec![(self.root, 0)];

        while let Some((id, tab)) = stack.pop() {
            let node = &self.nodes[id];
            let mut rep = format!("{}Node [{}]", "  ".repeat(tab + 1), node.id);

            for parent in node.parents.iter() {
                rep.push_str(&format!(" ^ [{}]", parent));
            }
            for pair in node.children.iter() {
                rep.push_str(&format!(" v [{} {{{}}} ]", pair.name, pair.connection));
            }
            debug!("{}", rep);

            // Bounded like paths(), so a cyclic decoded graph still terminates.
            if tab < self.nodes.len() {
                for pair in node.children.iter().rev() {
                    stack.push((pair.connection, tab + 1));
                }
            }
        }
    }
}
