//! Bounded fuzzy traversal.
//!
//! The search explores states `(node, query position, typos left)` depth
//! first. From each state it tries:
//!
//! ```text
//!   exact      child matches query[pos]        → (child, pos + 1, t)
//!   substitute child differs from query[pos]   → (child, pos + 1, t - 1)
//!   insert     extra byte in the key           → (child, pos,     t - 1)
//!   delete     extra byte in the query         → (node,  pos + 1, t - 1)
//! ```
//!
//! States wait on an explicit stack, so key length never costs native
//! stack depth. The states reached from one node are pushed in reverse, which
//! pops them in the order they were produced.
//!
//! Terminal nodes reached this way are checked against the query with the
//! full typo budget. A memo keyed by `(node, pos)` drops states that were
//! already explored with at least as many typos left.
//!
//! A wildcard query only records keys found by enumerating the subtree
//! where the literal prefix runs out, filtered to keys that start with that
//! prefix.

use crate::common::{NodeId, Result};
use crate::index::{bytes_match, NodeTree};
use crate::search::distance::within_distance;
use crate::search::SearchContext;

/// One pending traversal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    node: NodeId,
    pos: usize,
    typos: isize,
}

impl Frame {
    #[inline]
    fn new(node: NodeId, pos: usize, typos: isize) -> Self {
        Self { node, pos, typos }
    }
}

/// Run one search over `tree`, filling `ctx.found`.
pub fn run(tree: &mut NodeTree, ctx: &mut SearchContext<'_>) -> Result<()> {
    if ctx.max_results == 0 {
        return Ok(());
    }

    let mut stack = vec![Frame::new(NodeId::ROOT, 0, ctx.max_typos as isize)];
    let mut next = Vec::new();

    while let Some(frame) = stack.pop() {
        if ctx.is_full() {
            break;
        }
        visit(tree, ctx, frame, &mut next)?;
        stack.extend(next.drain(..).rev());
    }
    Ok(())
}

/// Explore one state and push the states it leads to onto `next`, in the
/// order they should run.
fn visit(
    tree: &mut NodeTree,
    ctx: &mut SearchContext<'_>,
    frame: Frame,
    next: &mut Vec<Frame>,
) -> Result<()> {
    let Frame { node, pos, typos } = frame;
    if typos < 0 || !ctx.enter(node, pos, typos) {
        return Ok(());
    }

    if let Some(wildcard) = ctx.wildcard {
        if pos > wildcard {
            return Ok(());
        }
        if pos == wildcard || sequence_covers(tree, node, &ctx.query[pos..wildcard]) {
            return enumerate(tree, ctx, node);
        }
    } else {
        check_candidate(tree, ctx, node);
    }

    let children = tree.child_ids(node)?;
    if children.is_empty() {
        return Ok(());
    }

    let len = ctx.query.len();
    let after = (pos + 1).min(len);
    let wanted = ctx.query.get(pos).copied();

    if let Some(byte) = wanted {
        if let Some(child) = tree.child_case_insensitive(node, byte)? {
            next.push(Frame::new(child, after, typos));
        }
    }

    for (i, &child) in children.iter().enumerate() {
        let cost = match wanted {
            Some(byte) if bytes_match(tree.node(child).element, byte) => 0,
            _ => 1,
        };
        next.push(Frame::new(child, after, typos - cost));
        next.push(Frame::new(child, pos, typos - 1));
        // Skipping a query byte does not depend on the child
        if i == 0 && pos < len {
            next.push(Frame::new(node, after, typos - 1));
        }
    }
    Ok(())
}

/// Record `node` if it is terminal and its key is within the full typo
/// budget of the query.
fn check_candidate(tree: &NodeTree, ctx: &mut SearchContext<'_>, node: NodeId) {
    if node.is_root() || !tree.node(node).terminal || ctx.is_settled(node) {
        return;
    }

    let key = tree.key_of(node);
    if within_distance(&key.to_ascii_lowercase(), &ctx.query, ctx.max_typos) {
        ctx.offer(node, key, &tree.node(node).values);
    } else {
        ctx.mark_too_far(node);
    }
}

/// True if the rest of the literal prefix ends inside the compressed
/// sequence of `node`.
fn sequence_covers(tree: &NodeTree, node: NodeId, rest: &[u8]) -> bool {
    let sequence = &tree.node(node).sequence;
    !sequence.is_empty()
        && sequence.len() >= rest.len()
        && sequence.iter().zip(rest).all(|(&a, &b)| bytes_match(a, b))
}

/// Record every terminal node below `from` (inclusive) whose key starts
/// with the literal prefix, ignoring ASCII case.
///
/// One path buffer follows the walk, so each node only compares the bytes
/// it adds to its parent's key.
fn enumerate(tree: &mut NodeTree, ctx: &mut SearchContext<'_>, from: NodeId) -> Result<()> {
    let literal = ctx.literal().to_vec();
    // Nodes with children carry no sequence, so the parent's key is the path
    let mut path = match tree.node(from).parent {
        Some(parent) => tree.key_of(parent),
        None => Vec::new(),
    };
    // (node, path length above it, first byte not yet compared)
    let mut stack = vec![(from, path.len(), 0)];

    while let Some((node, depth, checked)) = stack.pop() {
        if ctx.is_full() {
            break;
        }
        if !ctx.enumerated.insert(node) {
            continue;
        }

        path.truncate(depth);
        if !node.is_root() {
            path.push(tree.node(node).element);
        }
        let branch = path.len();
        path.extend_from_slice(&tree.node(node).sequence);

        if !agrees_with(&path, &literal, checked) {
            continue;
        }
        if !node.is_root() && tree.node(node).terminal && path.len() >= literal.len() {
            ctx.offer(node, path.clone(), &tree.node(node).values);
        }

        // Reverse so siblings come off the stack in stored order.
        let children = tree.child_ids(node)?;
        stack.extend(children.into_iter().rev().map(|child| (child, branch, branch)));
    }
    Ok(())
}

/// True if `path[from..]` matches the lowercased `literal` wherever both
/// have a byte.
fn agrees_with(path: &[u8], literal: &[u8], from: usize) -> bool {
    let end = path.len().min(literal.len());
    from >= end
        || path[from..end]
            .iter()
            .zip(&literal[from..end])
            .all(|(&key, &wanted)| key.to_ascii_lowercase() == wanted)
}
