//! Insertion with edge splitting.
//!
//! A fresh first byte gets one compressed top-level node holding the rest of
//! the key. Later keys walk single-byte children and split a compressed edge
//! where they diverge from it:
//!
//! ```text
//!   insert "cart" into  c─[art]        insert "car"  into  c─[at]
//!
//!   c                                  c
//!   └─a                                └─a
//!     ├─t  (old key, keeps values)       ├─t  (old key)
//!     └─r─[t]  (new key)                 └─r  (new key, ends on the branch)
//! ```

use crate::common::{NodeId, Result};
use crate::index::node::Node;
use crate::index::NodeTree;

impl NodeTree {
    /// Attach `value` to `key`, creating the key if needed.
    ///
    /// Inserting the same key twice appends a second value. An empty key is
    /// ignored.
    pub fn insert(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Ok(());
        }

        let id = self.resolve_path(key)?;
        let node = self.arena.get_mut(id);
        if !node.terminal {
            node.terminal = true;
            self.size += 1;
        }
        node.values.push(value.to_vec());
        Ok(())
    }

    /// Find or build the node for `key` and return it.
    fn resolve_path(&mut self, key: &[u8]) -> Result<NodeId> {
        let first = key[0];
        let mut current = match self.root_index.get(&first) {
            Some(&id) => id,
            None => {
                let id = self.add_child(NodeId::ROOT, Node::new(first, &key[1..]))?;
                self.root_index.insert(first, id);
                return Ok(id);
            }
        };

        for (i, &byte) in key.iter().enumerate().skip(1) {
            match self.find_child(current, byte)? {
                Some(child) => current = child,
                None => {
                    let rest = &key[i..];
                    if self.arena.get(current).sequence == rest {
                        return Ok(current);
                    }
                    return self.split(current, rest);
                }
            }
        }

        // The key ends on `current`; give its compressed tail its own node.
        self.fragment(current)?;
        Ok(current)
    }

    /// Branch `rest` off `id`, splitting the node's compressed sequence at
    /// the first byte where the two differ.
    ///
    /// Returns the node that ends `rest`.
    fn split(&mut self, id: NodeId, rest: &[u8]) -> Result<NodeId> {
        if self.arena.get(id).sequence.is_empty() {
            return self.add_child(id, Node::new(rest[0], &rest[1..]));
        }

        let common = self
            .arena
            .get(id)
            .sequence
            .iter()
            .zip(rest)
            .take_while(|(a, b)| a == b)
            .count();
        // The shared chain plus up to two branches, before anything moves
        self.arena.ensure_room(common + 2)?;

        let node = self.arena.get_mut(id);
        let sequence = std::mem::take(&mut node.sequence);
        let terminal = std::mem::take(&mut node.terminal);
        let values = std::mem::take(&mut node.values);

        let tail = self.add_chain(id, &sequence[..common])?;

        let old_rest = &sequence[common..];
        let new_rest = &rest[common..];
        match (old_rest.split_first(), new_rest.split_first()) {
            (Some((&old_first, old_tail)), Some((&new_first, new_tail))) => {
                self.add_child(tail, Node::continuing(old_first, old_tail, terminal, values))?;
                self.add_child(tail, Node::new(new_first, new_tail))
            }
            (None, Some((&new_first, new_tail))) => {
                let node = self.arena.get_mut(tail);
                node.terminal = terminal;
                node.values = values;
                self.add_child(tail, Node::new(new_first, new_tail))
            }
            (Some((&old_first, old_tail)), None) => {
                self.add_child(tail, Node::continuing(old_first, old_tail, terminal, values))?;
                Ok(tail)
            }
            (None, None) => {
                let node = self.arena.get_mut(tail);
                node.terminal = terminal;
                node.values = values;
                Ok(tail)
            }
        }
    }

    /// Move a node's compressed sequence, terminal flag and values into a
    /// new only child, so a shorter key can end on the node itself.
    ///
    /// The node keeps its slot and its place under its parent.
    fn fragment(&mut self, id: NodeId) -> Result<()> {
        let node = self.arena.get_mut(id);
        if node.sequence.is_empty() {
            return Ok(());
        }

        let sequence = std::mem::take(&mut node.sequence);
        let terminal = std::mem::take(&mut node.terminal);
        let values = std::mem::take(&mut node.values);

        self.add_child(
            id,
            Node::continuing(sequence[0], &sequence[1..], terminal, values),
        )?;
        Ok(())
    }
}
