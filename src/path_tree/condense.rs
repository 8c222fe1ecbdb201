use std::mem::take;

use tracing::{debug, trace};

use crate::error::{CodecError, Result};

use super::{NodeId, PathTree};

impl PathTree {
    /// Merges structurally equivalent subtrees, working upwards from the end marker.
    ///
    /// Each location compares all pairs of its parents, so the cost is quadratic in
    /// the parent count times the equivalence check. Inputs are one entitlement's
    /// content paths.
    pub fn condense(&mut self) -> Result<()> {
        let end = self
            .end_marker
            .ok_or_else(|| CodecError::InternalInvariantViolation("condensing a tree without end marker".into()))?;

        let before = self.node_count();
        let mut pending = vec![end];
        let mut queued = vec![false; self.nodes.len()];
        queued[end] = true;

        while let Some(location) = pending.pop() {
            queued[location] = false;
            if !self.active[location] {
                continue;
            }

            self.merge_equivalent_parents(location);

            for &parent in self.nodes[location].parents.iter() {
                if !queued[parent] {
                    queued[parent] = true;
                    pending.push(parent);
                }
            }
        }

        self.root = self.find_root().ok_or_else(|| {
            CodecError::InternalInvariantViolation("no unique root after condensation".into())
        })?;

        debug!("Condensed path tree from {} to {} nodes", before, self.node_count());

        Ok(())
    }

    fn merge_equivalent_parents(&mut self, location: NodeId) {
        let mut parents = self.nodes[location].parents.clone();
        parents.sort_unstable();

        for (i, &merged) in parents.iter().enumerate() {
            if !self.active[merged] {
                continue;
            }

            for &candidate in parents[i + 1..].iter() {
                if self.active[candidate] && self.is_equivalent(merged, candidate) {
                    self.merge(merged, candidate);
                }
            }
        }
    }

    /// Redirects every edge into `removed` onto `merged`, which has the lower id,
    /// then drops `removed`.
    fn merge(&mut self, merged: NodeId, removed: NodeId) {
        trace!("Merging node {} into {}", removed, merged);

        let grandparents = take(&mut self.nodes[removed].parents);

        for &grandparent in grandparents.iter() {
            for pair in self.nodes[grandparent].children.iter_mut() {
                if pair.connection == removed {
                    pair.connection = merged;
                }
            }
            self.nodes[merged].add_parent(grandparent);
        }

        self.detach(removed);
    }

    /// Deactivates `id` and every descendant left without parents.
    fn detach(&mut self, id: NodeId) {
        let mut stack = vec![id];

        while let Some(node) = stack.pop() {
            self.active[node] = false;

            for pair in take(&mut self.nodes[node].children) {
                let child = &mut self.nodes[pair.connection];
                child.parents.retain(|&p| p != node);

                if child.parents.is_empty() && self.active[pair.connection] {
                    stack.push(pair.connection);
                }
            }
        }
    }
}
