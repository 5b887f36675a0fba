use std::ops::{Index, IndexMut};
use math_rb3d::AABB;
use smallvec::{smallvec, SmallVec};
use crate::NodeIndex;

pub(crate) enum NodeKind<T>
{
    Leaf(Vec<T>),
    Inner(Vec<NodeIndex>),
}

pub(crate) struct Node<T>
{
    pub bounds: AABB, // tight union of the children's bounds
    pub height: u32, // leaves are 1
    pub kind: NodeKind<T>,
    retired: bool,
}
impl<T> Node<T>
{
    #[inline] #[must_use] pub fn is_leaf(&self) -> bool { matches!(self.kind, NodeKind::Leaf(_)) }

    #[inline] #[must_use]
    pub fn len(&self) -> usize
    {
        match &self.kind
        {
            NodeKind::Leaf(items) => items.len(),
            NodeKind::Inner(children) => children.len(),
        }
    }

    #[inline] #[must_use] pub fn is_empty(&self) -> bool { self.len() == 0 }

    // empty for leaves
    #[inline] #[must_use]
    pub fn children(&self) -> &[NodeIndex]
    {
        match &self.kind
        {
            NodeKind::Inner(children) => children,
            NodeKind::Leaf(_) => &[],
        }
    }

    // empty for inner nodes
    #[inline] #[must_use]
    pub fn items(&self) -> &[T]
    {
        match &self.kind
        {
            NodeKind::Leaf(items) => items,
            NodeKind::Inner(_) => &[],
        }
    }
}

// Per-tree node storage. Retired slots are kept on a free list and handed out again before
// the arena grows, so steady insert/remove churn stops allocating once it reaches its high-water mark
pub(crate) struct NodeArena<T>
{
    nodes: Vec<Node<T>>,
    free: Vec<NodeIndex>,
}
impl<T> NodeArena<T>
{
    #[inline] #[must_use]
    pub fn new() -> Self
    {
        Self
        {
            nodes: Vec::new(),
            free: Vec::new(),
        }
    }

    #[inline] #[must_use] pub fn live_count(&self) -> usize { self.nodes.len() - self.free.len() }
    #[inline] #[must_use] pub fn free_count(&self) -> usize { self.free.len() }

    fn alloc(&mut self, height: u32, kind: NodeKind<T>) -> NodeIndex
    {
        match self.free.pop()
        {
            Some(index) =>
            {
                let node = &mut self.nodes[index.index()];
                debug_assert!(node.retired, "Free list held a live node {index:?}");
                node.bounds = AABB::EMPTY;
                node.height = height;
                node.kind = kind;
                node.retired = false;
                index
            }
            None =>
            {
                self.nodes.push(Node
                {
                    bounds: AABB::EMPTY,
                    height,
                    kind,
                    retired: false,
                });
                NodeIndex::some(self.nodes.len() - 1)
            }
        }
    }

    // bounds are left EMPTY, callers compute them once the items are in place
    #[inline] #[must_use]
    pub fn alloc_leaf(&mut self, items: Vec<T>) -> NodeIndex
    {
        self.alloc(1, NodeKind::Leaf(items))
    }

    #[inline] #[must_use]
    pub fn alloc_inner(&mut self, height: u32, children: Vec<NodeIndex>) -> NodeIndex
    {
        debug_assert!(height > 1, "Inner nodes sit above the leaves");
        self.alloc(height, NodeKind::Inner(children))
    }

    // Retires a single node. Its children (items or node links) are dropped, detached nodes must be freed separately
    pub fn free(&mut self, index: NodeIndex)
    {
        let node = &mut self.nodes[index.index()];
        debug_assert!(!node.retired, "Double free of node {index:?}");
        node.bounds = AABB::EMPTY;
        node.height = 1;
        node.kind = NodeKind::Leaf(Vec::new());
        node.retired = true;
        self.free.push(index);
    }

    // Retires a node and every node beneath it
    pub fn free_subtree(&mut self, root: NodeIndex)
    {
        let mut stack: SmallVec<[NodeIndex; 32]> = smallvec![root];
        while let Some(top) = stack.pop()
        {
            stack.extend_from_slice(self[top].children());
            self.free(top);
        }
    }
}
impl<T> Index<NodeIndex> for NodeArena<T>
{
    type Output = Node<T>;
    #[inline]
    fn index(&self, index: NodeIndex) -> &Self::Output
    {
        let node = &self.nodes[index.index()];
        debug_assert!(!node.retired, "Accessed retired node {index:?}");
        node
    }
}
impl<T> IndexMut<NodeIndex> for NodeArena<T>
{
    #[inline]
    fn index_mut(&mut self, index: NodeIndex) -> &mut Self::Output
    {
        let node = &mut self.nodes[index.index()];
        debug_assert!(!node.retired, "Accessed retired node {index:?}");
        node
    }
}
