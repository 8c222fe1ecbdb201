use std::collections::HashMap;

use super::{NodeId, PathTree};

/// A slot of the canonical node order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderedNode {
    Node(NodeId),
    /// Empty node appended when the tree has only two distinct nodes, so the
    /// node alphabet keeps at least two symbols once the root is dropped.
    Padding,
}

impl PathTree {
    /// Distinct segment names by ascending edge count; ties keep first-discovery order.
    pub fn order_segments(&self) -> Vec<String> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut seen = vec![false; self.nodes.len()];

        // Depth-first: every edge is counted, then its target is entered once.
        let mut stack: Vec<(NodeId, usize)> = vec![(self.root, 0)];
        seen[self.root] = true;

        while let Some(frame) = stack.last_mut() {
            let (id, next) = *frame;
            let Some(pair) = self.nodes[id].children.get(next) else {
                stack.pop();
                continue;
            };
            frame.1 += 1;

            match index.get(pair.name.as_str()) {
                Some(&i) => counts[i].1 += 1,
                None => {
                    index.insert(pair.name.as_str(), counts.len());
                    counts.push((pair.name.clone(), 1));
                }
            }

            if !seen[pair.connection] {
                seen[pair.connection] = true;
                stack.push((pair.connection, 0));
            }
        }

        counts.sort_by_key(|&(_, count)| count);
        counts.into_iter().map(|(name, _)| name).collect()
    }

    /// Distinct reachable nodes by ascending parent count, ties by id. The root has
    /// no parents and the lowest id, so it always comes first.
    pub fn order_nodes(&self) -> Vec<OrderedNode> {
        let mut nodes = self.reachable();
        nodes.sort_by_key(|&id| (self.nodes[id].parents.len(), id));

        let mut order: Vec<OrderedNode> = nodes.into_iter().map(OrderedNode::Node).collect();
        if order.len() == 2 {
            order.push(OrderedNode::Padding);
        }

        order
    }
}
