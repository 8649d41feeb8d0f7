use std::cmp::Ordering;

/// Weight-balance tolerance: no child subtree may hold more than `ALPHA`
/// of its parent's weight. Must stay in (0.5, 1); larger values rebuild
/// less often at the cost of deeper trees.
pub const ALPHA: f64 = 0.75;

/// Handle to a node slot in the tree arena. Slots are never freed; a
/// rebuild relinks existing slots instead of allocating new ones.
pub type NodeId = usize;

/// Values stored in a [`BalancedTree`] bring their own total order and the
/// measure tracked as a per-subtree maximum.
pub trait TreeValue {
    /// Type of the per-subtree maximum.
    type Max: Copy + Ord + std::fmt::Debug;

    /// Total order over stored values. `Equal` marks an exact duplicate,
    /// which `insert` rejects before touching the structure.
    fn tree_cmp(&self, other: &Self) -> Ordering;

    /// This value's own contribution to the subtree maximum.
    fn measure(&self) -> Self::Max;
}

#[derive(Debug)]
struct Node<T: TreeValue> {
    value: T,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    /// Nodes in the subtree rooted here, including this one.
    weight: usize,
    /// Maximum measure over the subtree rooted here.
    max: T::Max,
}

enum Placed {
    Duplicate,
    Leaf { id: NodeId, depth: usize },
}

/// Weight-balanced binary search tree over an arena of nodes.
///
/// Created non-empty from its first value. Insertion rejects exact
/// duplicates and restores balance scapegoat-style: when a new leaf lands
/// deeper than `floor(log_{1/ALPHA}(size))`, the lowest ancestor whose
/// weight balance is broken has its subtree rebuilt into perfect height
/// balance. Parent back-links are plain arena indices, written only when a
/// node is (re)linked as a child, and are used for upward walks only.
#[derive(Debug)]
pub struct BalancedTree<T: TreeValue> {
    nodes: Vec<Node<T>>,
    root: NodeId,
}

impl<T: TreeValue> BalancedTree<T> {
    /// Creates a tree rooted at its first value.
    pub fn new(value: T) -> Self {
        let max = value.measure();
        Self {
            nodes: vec![Node {
                value,
                parent: None,
                left: None,
                right: None,
                weight: 1,
                max,
            }],
            root: 0,
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn value(&self, id: NodeId) -> &T {
        &self.nodes[id].value
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].left
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].right
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn weight(&self, id: NodeId) -> usize {
        self.nodes[id].weight
    }

    /// Stored maximum measure of the subtree at `id`.
    pub fn subtree_max(&self, id: NodeId) -> T::Max {
        self.nodes[id].max
    }

    /// Inserts `value`; returns `false` (and changes nothing) when a value
    /// with an equal key is already present.
    pub fn insert(&mut self, value: T) -> bool {
        // Size snapshot for the depth trigger, taken before the descent.
        let size = self.nodes[self.root].weight;
        match self.place(self.root, value, 0) {
            Placed::Duplicate => false,
            Placed::Leaf { id, depth } => {
                if depth + 1 > Self::depth_limit(size) {
                    self.restore_balance(id);
                }
                true
            }
        }
    }

    /// Nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        self.height_below(self.root)
    }

    /// Values in ascending key order.
    pub fn values_in_order(&self) -> Vec<&T> {
        let mut ids = Vec::with_capacity(self.nodes.len());
        self.flatten(self.root, &mut ids);
        ids.into_iter().map(|id| &self.nodes[id].value).collect()
    }

    fn place(&mut self, at: NodeId, value: T, depth: usize) -> Placed {
        let branch = value.tree_cmp(&self.nodes[at].value);
        if branch == Ordering::Equal {
            return Placed::Duplicate;
        }
        let slot = if branch == Ordering::Greater {
            self.nodes[at].right
        } else {
            self.nodes[at].left
        };
        let placed = match slot {
            Some(child) => self.place(child, value, depth + 1),
            None => {
                let id = self.alloc(value, at);
                if branch == Ordering::Greater {
                    self.nodes[at].right = Some(id);
                } else {
                    self.nodes[at].left = Some(id);
                }
                Placed::Leaf {
                    id,
                    depth: depth + 1,
                }
            }
        };
        // Re-derive weight and max from the children on every unwind; after
        // a duplicate rejection deeper down this is a no-op.
        self.refresh(at);
        placed
    }

    fn alloc(&mut self, value: T, parent: NodeId) -> NodeId {
        let id = self.nodes.len();
        let max = value.measure();
        self.nodes.push(Node {
            value,
            parent: Some(parent),
            left: None,
            right: None,
            weight: 1,
            max,
        });
        id
    }

    /// Recomputes `weight` and `max` at `id` from its current children.
    /// Both ordinary insertion and rebuild go through here, so the
    /// augmentation stays consistent no matter which path mutated the
    /// structure.
    fn refresh(&mut self, id: NodeId) {
        let node = &self.nodes[id];
        let mut weight = 1;
        let mut max = node.value.measure();
        for child in [node.left, node.right].into_iter().flatten() {
            let c = &self.nodes[child];
            weight += c.weight;
            max = max.max(c.max);
        }
        let node = &mut self.nodes[id];
        node.weight = weight;
        node.max = max;
    }

    // floor(log_{1/ALPHA}(size)): the deepest a leaf may land before the
    // scapegoat walk runs.
    fn depth_limit(size: usize) -> usize {
        if size <= 1 {
            return 0;
        }
        ((size as f64).ln() / (1.0 / ALPHA).ln()).floor() as usize
    }

    /// Walks up from the freshly placed leaf and rebuilds the first subtree
    /// whose weight balance is broken. Weights along the path are already
    /// refreshed by the unwind in `place`. If no node on the path violates
    /// the bound, nothing is rebuilt.
    fn restore_balance(&mut self, from: NodeId) {
        let mut cur = Some(from);
        while let Some(id) = cur {
            if self.is_overweight(id) {
                self.rebuild(id);
                return;
            }
            cur = self.nodes[id].parent;
        }
    }

    // child.weight > ALPHA * node.weight, kept in integers for ALPHA = 3/4.
    fn is_overweight(&self, id: NodeId) -> bool {
        let node = &self.nodes[id];
        [node.left, node.right]
            .into_iter()
            .flatten()
            .any(|c| self.nodes[c].weight * 4 > node.weight * 3)
    }

    /// Rebuilds the subtree at `at` into perfect height balance: flatten
    /// the node ids in key order, then relink the same slots by recursive
    /// median selection. Ancestor weights and maxes are untouched (the node
    /// set is unchanged); the parent's child-index swap is the single point
    /// where the new subtree becomes visible.
    fn rebuild(&mut self, at: NodeId) {
        let parent = self.nodes[at].parent;
        let mut order = Vec::with_capacity(self.nodes[at].weight);
        self.flatten(at, &mut order);
        let Some(new_root) = self.relink(&order, parent) else {
            return;
        };
        match parent {
            None => self.root = new_root,
            Some(p) => {
                if self.nodes[p].left == Some(at) {
                    self.nodes[p].left = Some(new_root);
                } else {
                    self.nodes[p].right = Some(new_root);
                }
            }
        }
    }

    fn flatten(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if let Some(l) = self.nodes[id].left {
            self.flatten(l, out);
        }
        out.push(id);
        if let Some(r) = self.nodes[id].right {
            self.flatten(r, out);
        }
    }

    fn relink(&mut self, ids: &[NodeId], parent: Option<NodeId>) -> Option<NodeId> {
        if ids.is_empty() {
            return None;
        }
        let mid = ids[ids.len() / 2];
        let left = self.relink(&ids[..ids.len() / 2], Some(mid));
        let right = self.relink(&ids[ids.len() / 2 + 1..], Some(mid));
        let node = &mut self.nodes[mid];
        node.parent = parent;
        node.left = left;
        node.right = right;
        self.refresh(mid);
        Some(mid)
    }

    fn height_below(&self, id: NodeId) -> usize {
        let node = &self.nodes[id];
        1 + [node.left, node.right]
            .into_iter()
            .flatten()
            .map(|c| self.height_below(c))
            .max()
            .unwrap_or(0)
    }
}
