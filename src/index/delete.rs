//! Exact lookup and removal with branch pruning.

use crate::common::{NodeId, Result};
use crate::index::NodeTree;

impl NodeTree {
    /// Locate the terminal node for exactly `key`.
    ///
    /// A key that ends inside a compressed sequence, or on a node that is
    /// not terminal, is not found.
    pub fn find_node(&mut self, key: &[u8]) -> Result<Option<NodeId>> {
        let mut current = match key.first().and_then(|b| self.root_index.get(b)) {
            Some(&id) => id,
            None => return Ok(None),
        };

        let mut pos = 1;
        loop {
            let node = self.arena.get(current);
            if !node.sequence.is_empty() {
                let found = node.terminal && node.sequence == key[pos..];
                return Ok(found.then_some(current));
            }
            if pos == key.len() {
                return Ok(node.terminal.then_some(current));
            }

            match self.find_child(current, key[pos])? {
                Some(child) => {
                    current = child;
                    pos += 1;
                }
                None => return Ok(None),
            }
        }
    }

    /// Values attached to exactly `key`.
    pub fn get(&mut self, key: &[u8]) -> Result<Option<&[Vec<u8>]>> {
        Ok(self
            .find_node(key)?
            .map(|id| self.arena.get(id).values.as_slice()))
    }

    /// Remove `key` and return its values, or `None` if it was absent.
    pub fn remove(&mut self, key: &[u8]) -> Result<Option<Vec<Vec<u8>>>> {
        let id = match self.find_node(key)? {
            Some(id) => id,
            None => return Ok(None),
        };

        let node = self.arena.get_mut(id);
        node.terminal = false;
        let values = std::mem::take(&mut node.values);
        self.size -= 1;

        self.prune(id)?;
        Ok(Some(values))
    }

    /// Drop the dead branch ending at `id`, a node that just lost its key.
    ///
    /// Walks up through non-terminal single-child ancestors and detaches the
    /// highest of them. The surviving parent is re-compressed if that left
    /// it with one leaf child.
    fn prune(&mut self, id: NodeId) -> Result<()> {
        if !self.arena.get(id).is_leaf() {
            return self.recompress(id);
        }

        let mut top = id;
        let parent = loop {
            let parent = self.arena.get(top).parent.unwrap_or(NodeId::ROOT);
            if parent.is_root() || self.arena.get(parent).terminal {
                break parent;
            }
            if self.children(parent)?.len() != 1 {
                break parent;
            }
            top = parent;
        };

        let element = self.arena.get(top).element;
        self.remove_child(parent, top)?;

        if parent.is_root() {
            self.root_index.remove(&element);
            Ok(())
        } else {
            self.recompress(parent)
        }
    }

    /// Fold a lone leaf child back into its parent's sequence, repeating
    /// upward while the result is again a lone leaf.
    fn recompress(&mut self, id: NodeId) -> Result<()> {
        let mut current = id;

        while !current.is_root() {
            let node = self.arena.get(current);
            if node.terminal || !node.sequence.is_empty() {
                break;
            }

            let children = self.child_ids(current)?;
            let child = match children.as_slice() {
                [only] if self.arena.get(*only).is_leaf() => *only,
                _ => break,
            };

            let absorbed = self.arena.get_mut(child);
            let mut sequence = Vec::with_capacity(1 + absorbed.sequence.len());
            sequence.push(absorbed.element);
            sequence.append(&mut absorbed.sequence);
            let terminal = absorbed.terminal;
            let values = std::mem::take(&mut absorbed.values);

            self.remove_child(current, child)?;

            let node = self.arena.get_mut(current);
            node.sequence = sequence;
            node.terminal = terminal;
            node.values = values;

            current = node.parent.unwrap_or(NodeId::ROOT);
        }
        Ok(())
    }
}
