//! Arena-backed binary trees shared by tree construction (Huffman code
//! building) and tree reconstruction (canonical decoding).
//!
//! The original double-pointer `shared_ptr` forest is replaced here with a
//! flat `Vec` of nodes addressed by an integer handle: nodes are never
//! freed individually, the whole arena drops at once, and there is no
//! reference counting to get wrong.

use bit_vec::BitVec;

/// An opaque reference to a node inside a [`TreeStore`]. Only valid for the
/// store that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeHandle(u32);

enum NodeKind {
    Leaf,
    Internal { left: NodeHandle, right: NodeHandle },
}

struct Node<Info> {
    info: Info,
    kind: NodeKind,
}

/// An arena of binary tree nodes, each carrying an `Info` payload supplied
/// by the caller. Leaves carry whatever the caller needs to identify a
/// symbol; internal nodes carry whatever combined info the caller's
/// combiner produced, which matters during construction (for comparing
/// subtrees) but is never consulted while walking a decoded tree.
pub struct TreeStore<Info> {
    nodes: Vec<Node<Info>>,
}

impl<Info: Clone> TreeStore<Info> {
    pub fn new() -> Self {
        TreeStore { nodes: Vec::new() }
    }

    /// Allocates a fresh leaf carrying `info`.
    pub fn leaf(&mut self, info: Info) -> NodeHandle {
        self.nodes.push(Node {
            info,
            kind: NodeKind::Leaf,
        });
        NodeHandle((self.nodes.len() - 1) as u32)
    }

    /// Allocates a fresh internal node joining `left` and `right`, carrying
    /// the caller's pre-combined `info` for the new subtree.
    pub fn unite(&mut self, left: NodeHandle, right: NodeHandle, info: Info) -> NodeHandle {
        self.nodes.push(Node {
            info,
            kind: NodeKind::Internal { left, right },
        });
        NodeHandle((self.nodes.len() - 1) as u32)
    }

    pub fn is_leaf(&self, handle: NodeHandle) -> bool {
        matches!(self.nodes[handle.0 as usize].kind, NodeKind::Leaf)
    }

    pub fn info(&self, handle: NodeHandle) -> &Info {
        &self.nodes[handle.0 as usize].info
    }

    /// The `(left, right)` children of an internal node, or `None` for a leaf.
    pub fn children(&self, handle: NodeHandle) -> Option<(NodeHandle, NodeHandle)> {
        match self.nodes[handle.0 as usize].kind {
            NodeKind::Internal { left, right } => Some((left, right)),
            NodeKind::Leaf => None,
        }
    }

    /// Walks every leaf reachable from `root`, emitting `(info, path)` pairs
    /// where `path` records the left(`false`)/right(`true`) turns taken to
    /// reach it. A single-leaf tree yields one entry with an empty path.
    pub fn enumerate_paths(&self, root: NodeHandle) -> Vec<(Info, BitVec)> {
        let mut out = Vec::new();
        let mut path = BitVec::new();
        self.walk(root, &mut path, &mut out);
        out
    }

    fn walk(&self, handle: NodeHandle, path: &mut BitVec, out: &mut Vec<(Info, BitVec)>) {
        match self.nodes[handle.0 as usize].kind {
            NodeKind::Leaf => {
                out.push((self.nodes[handle.0 as usize].info.clone(), path.clone()));
            }
            NodeKind::Internal { left, right } => {
                path.push(false);
                self.walk(left, path, out);
                path.pop();

                path.push(true);
                self.walk(right, path, out);
                path.pop();
            }
        }
    }
}

impl<Info: Clone> Default for TreeStore<Info> {
    fn default() -> Self {
        Self::new()
    }
}
