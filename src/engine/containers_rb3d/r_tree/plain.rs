use std::fmt::{Debug, Display, Formatter};
use serde::{Deserialize, Serialize};
use math_rb3d::AABB;
use crate::{BoundsPolicy, NodeIndex};
use super::node::NodeKind;
use super::RTree;

// Self-describing copy of a tree's structure, e.g. for persisting via serde (JSON, TOML, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlainNode<T>
{
    pub min_x: f32,
    pub min_y: f32,
    pub min_z: f32,
    pub max_x: f32,
    pub max_y: f32,
    pub max_z: f32,
    pub height: u32,
    pub leaf: bool,
    pub children: Vec<PlainChild<T>>,
}
impl<T> PlainNode<T>
{
    #[inline] #[must_use]
    pub fn bounds(&self) -> AABB
    {
        AABB::from_bounds(self.min_x, self.min_y, self.min_z, self.max_x, self.max_y, self.max_z)
    }

    #[must_use]
    fn with_bounds(bounds: AABB, height: u32, leaf: bool, children: Vec<PlainChild<T>>) -> Self
    {
        Self
        {
            min_x: bounds.min.x,
            min_y: bounds.min.y,
            min_z: bounds.min.z,
            max_x: bounds.max.x,
            max_y: bounds.max.y,
            max_z: bounds.max.z,
            height,
            leaf,
            children,
        }
    }
}

// Leaves hold items, everything else holds nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlainChild<T>
{
    Node(PlainNode<T>),
    Item(T),
}

pub enum PlainTreeError
{
    NodeInLeaf { height: u32 },
    ItemInInner { height: u32 },
    LeafHeight(u32),
    InnerHeight(u32),
    HeightMismatch { parent: u32, child: u32 },
    NodeFill { height: u32, len: usize, max: usize },
}
impl Debug for PlainTreeError
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            Self::NodeInLeaf { height } => write!(f, "Leaf node (height {height}) has a node child"),
            Self::ItemInInner { height } => write!(f, "Inner node (height {height}) has an item child"),
            Self::LeafHeight(height) => write!(f, "Leaf node has height {height}, leaves must be at height 1"),
            Self::InnerHeight(height) => write!(f, "Inner node has height {height}, inner nodes must be above 1"),
            Self::HeightMismatch { parent, child } => write!(f, "Node of height {child} is a child of a node of height {parent}"),
            Self::NodeFill { height, len, max } => write!(f, "Node (height {height}) has {len} children, expected 1 to {max}"),
        }
    }
}
impl Display for PlainTreeError
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { Debug::fmt(self, f) }
}
impl std::error::Error for PlainTreeError { }

impl<T: Clone, P> RTree<T, P>
{
    // Copies the tree's structure
    #[must_use]
    pub fn to_plain(&self) -> PlainNode<T>
    {
        self.node_to_plain(self.root)
    }

    fn node_to_plain(&self, index: NodeIndex) -> PlainNode<T>
    {
        let node = &self.arena[index];
        let children = match &node.kind
        {
            NodeKind::Leaf(items) => items.iter().cloned().map(PlainChild::Item).collect(),
            NodeKind::Inner(children) => children.iter().map(|&child| PlainChild::Node(self.node_to_plain(child))).collect(),
        };
        PlainNode::with_bounds(node.bounds, node.height, node.is_leaf(), children)
    }
}
impl<T, P> RTree<T, P>
{
    // Moves the tree's structure out, consuming it
    #[must_use]
    pub fn into_plain(mut self) -> PlainNode<T>
    {
        self.take_plain(self.root)
    }

    fn take_plain(&mut self, index: NodeIndex) -> PlainNode<T>
    {
        let node = &mut self.arena[index];
        let (bounds, height, leaf) = (node.bounds, node.height, node.is_leaf());
        let kind = std::mem::replace(&mut node.kind, NodeKind::Leaf(Vec::new()));
        let children = match kind
        {
            NodeKind::Leaf(items) => items.into_iter().map(PlainChild::Item).collect(),
            NodeKind::Inner(children) => children.into_iter().map(|child| PlainChild::Node(self.take_plain(child))).collect(),
        };
        PlainNode::with_bounds(bounds, height, leaf, children)
    }
}
impl<T, P: BoundsPolicy<T>> RTree<T, P>
{
    // Replaces the tree's contents with a previously exported structure. The structure is checked for
    // kinds, heights and fill (1 to max_entries children, only the root leaf may be empty), node bounds
    // are recomputed from the items. On error the tree is left unchanged
    pub fn from_plain(&mut self, plain: PlainNode<T>) -> Result<&mut Self, PlainTreeError>
    {
        let mut imported = Vec::new();
        let mut count = 0;
        let root = match self.import_plain(plain, true, &mut imported, &mut count)
        {
            Ok(root) => root,
            Err(err) =>
            {
                for node in imported
                {
                    self.arena.free(node);
                }
                return Err(err);
            }
        };

        self.arena.free_subtree(self.root);
        self.root = root;
        self.len = count;
        log::debug!("Imported tree of {count} items, height {}", self.height());
        Ok(self)
    }

    fn import_plain(&mut self, plain: PlainNode<T>, is_root: bool, imported: &mut Vec<NodeIndex>, count: &mut usize) -> Result<NodeIndex, PlainTreeError>
    {
        let len = plain.children.len();
        let allow_empty = is_root && plain.leaf;
        if len > self.max_entries || (len == 0 && !allow_empty)
        {
            return Err(PlainTreeError::NodeFill { height: plain.height, len, max: self.max_entries });
        }

        let node = match plain.leaf
        {
            true =>
            {
                if plain.height != 1
                {
                    return Err(PlainTreeError::LeafHeight(plain.height));
                }

                let items = plain.children.into_iter()
                    .map(|child| match child
                    {
                        PlainChild::Item(item) => Ok(item),
                        PlainChild::Node(_) => Err(PlainTreeError::NodeInLeaf { height: plain.height }),
                    })
                    .collect::<Result<Vec<_>, _>>()?;

                *count += items.len();
                self.arena.alloc_leaf(items)
            }
            false =>
            {
                if plain.height < 2
                {
                    return Err(PlainTreeError::InnerHeight(plain.height));
                }

                let mut children = Vec::with_capacity(plain.children.len());
                for child in plain.children
                {
                    match child
                    {
                        PlainChild::Node(child) if child.height + 1 == plain.height =>
                        {
                            children.push(self.import_plain(child, false, imported, count)?);
                        }
                        PlainChild::Node(child) => return Err(PlainTreeError::HeightMismatch { parent: plain.height, child: child.height }),
                        PlainChild::Item(_) => return Err(PlainTreeError::ItemInInner { height: plain.height }),
                    }
                }

                self.arena.alloc_inner(plain.height, children)
            }
        };

        imported.push(node);
        self.calc_bounds(node);
        Ok(node)
    }
}

#[cfg(test)]
mod tests
{
    use glam::Vec3;
    use super::*;
    use super::super::tests::points;

    #[test]
    fn to_plain_shape()
    {
        let mut tree = RTree::new(8);
        tree.load(points(20));

        let plain = tree.to_plain();
        assert_eq!(plain.height, 2);
        assert!(!plain.leaf);
        assert_eq!(plain.bounds(), tree.bounds());
        for child in &plain.children
        {
            let PlainChild::Node(child) = child else { panic!("Expected a node") };
            assert!(child.leaf);
            assert_eq!(child.height, 1);
        }
    }

    #[test]
    fn round_trip()
    {
        let mut tree = RTree::new(8);
        tree.load(points(100));
        tree.remove(&AABB::point(Vec3::new(3.0, 3.0, 0.0)));
        let plain = tree.to_plain();

        let mut copy = RTree::new(8);
        copy.insert(AABB::point(Vec3::splat(-1.0)));
        copy.from_plain(plain.clone()).unwrap();
        assert_eq!(copy.len(), 99);
        assert_eq!(copy.to_plain(), plain);
        copy.check_invariants().unwrap();

        assert_eq!(tree.into_plain(), plain);
    }

    #[test]
    fn rejects_malformed()
    {
        let item = AABB::point(Vec3::ZERO);
        let leaf = |children| PlainNode::with_bounds(item, 1, true, children);

        let mut tree = RTree::new(8);
        tree.insert(item);

        let bad_leaf = PlainNode::with_bounds(item, 1, true, vec![PlainChild::Node(leaf(vec![]))]);
        assert!(matches!(tree.from_plain(bad_leaf), Err(PlainTreeError::NodeInLeaf { height: 1 })));

        let bad_inner = PlainNode::with_bounds(item, 2, false, vec![PlainChild::Item(item)]);
        assert!(matches!(tree.from_plain(bad_inner), Err(PlainTreeError::ItemInInner { height: 2 })));

        let tall_leaf = PlainNode::<AABB>::with_bounds(item, 3, true, vec![]);
        assert!(matches!(tree.from_plain(tall_leaf), Err(PlainTreeError::LeafHeight(3))));

        let skipped = PlainNode::with_bounds(item, 3, false, vec![
            PlainChild::Node(PlainNode::with_bounds(item, 2, false, vec![PlainChild::Node(leaf(vec![PlainChild::Item(item)]))])),
            PlainChild::Node(leaf(vec![PlainChild::Item(item)])),
        ]);
        assert!(matches!(tree.from_plain(skipped), Err(PlainTreeError::HeightMismatch { parent: 3, child: 1 })));

        // failed imports leave the tree as it was
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.all(), vec![&item]);
        assert_eq!(tree.arena.live_count(), 1);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn rejects_bad_fill()
    {
        let item = AABB::point(Vec3::ZERO);
        let leaf = |n: usize| PlainNode::with_bounds(item, 1, true, vec![PlainChild::Item(item); n]);

        let mut tree = RTree::new(8);
        tree.load(points(20));
        let before = tree.to_plain();

        let empty_inner = PlainNode::<AABB>::with_bounds(item, 2, false, vec![]);
        assert!(matches!(tree.from_plain(empty_inner), Err(PlainTreeError::NodeFill { height: 2, len: 0, max: 8 })));

        let empty_leaf = PlainNode::with_bounds(item, 2, false, vec![PlainChild::Node(leaf(3)), PlainChild::Node(leaf(0))]);
        assert!(matches!(tree.from_plain(empty_leaf), Err(PlainTreeError::NodeFill { height: 1, len: 0, max: 8 })));

        let overfull = PlainNode::with_bounds(item, 2, false, vec![PlainChild::Node(leaf(4)), PlainChild::Node(leaf(9))]);
        assert!(matches!(tree.from_plain(overfull), Err(PlainTreeError::NodeFill { height: 1, len: 9, max: 8 })));

        let wide_root = PlainNode::with_bounds(item, 2, false, (0..9).map(|_| PlainChild::Node(leaf(1))).collect());
        assert!(matches!(tree.from_plain(wide_root), Err(PlainTreeError::NodeFill { height: 2, len: 9, max: 8 })));

        assert_eq!(tree.to_plain(), before);
        tree.check_invariants().unwrap();

        // an empty root leaf is an empty tree
        tree.from_plain(PlainNode::with_bounds(AABB::EMPTY, 1, true, vec![])).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn recomputes_bounds()
    {
        let item = AABB::new(Vec3::ZERO, Vec3::ONE);
        let plain = PlainNode::with_bounds(AABB::EMPTY, 1, true, vec![PlainChild::Item(item)]);

        let mut tree = RTree::new(8);
        tree.from_plain(plain).unwrap();
        assert_eq!(tree.bounds(), item);
    }
}
