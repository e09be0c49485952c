//! Reconstructs a canonical Huffman decoding tree from the `(order,
//! length_counts)` pair a header carries — the inverse of [`crate::huffman`]'s
//! canonical assignment, needing none of the original frequencies.

use crate::alphabet::Symbol;
use crate::error::ArchiverError;
use crate::tree::{NodeHandle, TreeStore};

/// A tree store specialised for decoding: interior nodes carry no
/// meaningful info (only leaves are ever inspected), so the decoder seeds
/// each internal node with a placeholder symbol.
pub type DecodingTreeStore = TreeStore<Symbol>;

/// Rebuilds the decoding tree for one file entry's header.
///
/// `order` lists symbols sorted by `(code length, symbol)`; `length_counts`
/// gives the run length of each increasing length class, starting at
/// length 1. Returns the tree along with a handle to its root.
pub fn build_tree(
    order: &[Symbol],
    length_counts: &[u32],
) -> Result<(DecodingTreeStore, NodeHandle), ArchiverError> {
    let mut store = DecodingTreeStore::new();

    // A single-symbol alphabet needs no bits at all: the encoder assigns it
    // a zero-length code, so no length class ever mentions it.
    if let [only] = order {
        if !length_counts.is_empty() {
            return Err(ArchiverError::MalformedArchive(
                "single-symbol header carries unexpected length classes".to_string(),
            ));
        }
        let root = store.leaf(*only);
        return Ok((store, root));
    }

    let mut stack: Vec<(NodeHandle, u32)> = Vec::new();
    let mut index = 0usize;
    for (length_minus_one, &count) in length_counts.iter().enumerate() {
        let length = (length_minus_one + 1) as u32;
        for _ in 0..count {
            let symbol = *order.get(index).ok_or_else(|| {
                ArchiverError::MalformedArchive(
                    "canonical order shorter than length counts claim".to_string(),
                )
            })?;
            index += 1;
            let handle = store.leaf(symbol);
            push(&mut stack, &mut store, handle, length)?;
        }
    }

    if index != order.len() {
        return Err(ArchiverError::MalformedArchive(
            "canonical order longer than length counts claim".to_string(),
        ));
    }

    match stack.as_slice() {
        [(root, 0)] => Ok((store, *root)),
        _ => Err(ArchiverError::MalformedArchive(
            "header's code lengths do not form a complete prefix code".to_string(),
        )),
    }
}

/// Pushes `handle` at `depth`, recursively merging it with the stack's top
/// entry whenever both sit at the same depth. Two already-complete
/// subtrees (depth 0) merging together is the telltale sign of a header
/// that cannot come from a valid canonical assignment.
fn push(
    stack: &mut Vec<(NodeHandle, u32)>,
    store: &mut DecodingTreeStore,
    handle: NodeHandle,
    depth: u32,
) -> Result<(), ArchiverError> {
    if let Some(&(top_handle, top_depth)) = stack.last() {
        if top_depth == depth {
            if depth == 0 {
                return Err(ArchiverError::MalformedArchive(
                    "two complete subtrees cannot be merged further".to_string(),
                ));
            }
            stack.pop();
            let united = store.unite(top_handle, handle, 0);
            return push(stack, store, united, depth - 1);
        }
    }
    stack.push((handle, depth));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebuilds_three_leaf_tree() {
        // lengths: a->1, b->2, c->2 (a single bit distinguishes a from the rest)
        let order = vec![1u16, 2u16, 3u16];
        let counts = vec![1u32, 2u32];
        let (store, root) = build_tree(&order, &counts).unwrap();

        assert!(!store.is_leaf(root));
        let (left, right) = store.children(root).unwrap();
        assert!(store.is_leaf(left));
        assert_eq!(*store.info(left), 1);
        assert!(!store.is_leaf(right));
        let (rl, rr) = store.children(right).unwrap();
        assert_eq!(*store.info(rl), 2);
        assert_eq!(*store.info(rr), 3);
    }

    #[test]
    fn single_symbol_tree_has_zero_depth_root() {
        let order = vec![42u16];
        let counts: Vec<u32> = vec![];
        let (store, root) = build_tree(&order, &counts).unwrap();
        assert!(store.is_leaf(root));
        assert_eq!(*store.info(root), 42);
    }

    #[test]
    fn incomplete_code_is_rejected() {
        // Claims two length-1 symbols, but only one is listed.
        let order = vec![1u16];
        let counts = vec![2u32];
        assert!(build_tree(&order, &counts).is_err());
    }

    #[test]
    fn overlong_order_is_rejected() {
        let order = vec![1u16, 2u16, 3u16, 4u16];
        let counts = vec![2u32];
        assert!(build_tree(&order, &counts).is_err());
    }
}
