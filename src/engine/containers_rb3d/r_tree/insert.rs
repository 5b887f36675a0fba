use math_rb3d::{Axis, AABB};
use smallvec::SmallVec;
use crate::{BoundsPolicy, NodeIndex};
use super::node::NodeKind;
use super::RTree;

// What gets placed into the tree: a single item into a leaf, or a whole subtree into an inner node
pub(super) enum Entry<T>
{
    Item(T),
    Node(NodeIndex),
}

impl<T, P: BoundsPolicy<T>> RTree<T, P>
{
    // Adds a single item, None is a no-op
    pub fn insert(&mut self, item: impl Into<Option<T>>) -> &mut Self
    {
        if let Some(item) = item.into()
        {
            let level = self.leaf_level();
            self.insert_entry(Entry::Item(item), level);
            self.len += 1;
        }
        self
    }

    // level counts from the root (0), the entry ends up as a child of a node at that depth
    pub(super) fn insert_entry(&mut self, entry: Entry<T>, level: usize)
    {
        let bounds = match &entry
        {
            Entry::Item(item) => self.policy.bounds(item),
            Entry::Node(node) => self.arena[*node].bounds,
        };

        #[cfg(debug_assertions)]
        if bounds.min.is_nan() || bounds.max.is_nan()
        {
            log::warn!("Inserting an entry with NaN bounds {bounds:?}, queries may not find it");
        }

        let mut path = SmallVec::<[NodeIndex; 16]>::new();
        let target = self.choose_subtree(bounds, level, &mut path);

        let node = &mut self.arena[target];
        match (&mut node.kind, entry)
        {
            (NodeKind::Leaf(items), Entry::Item(item)) => items.push(item),
            (NodeKind::Inner(children), Entry::Node(child)) => children.push(child),
            _ => unreachable!("Entry does not match the kind of node {target:?} at level {level}"),
        }
        node.bounds.union_with(bounds);

        // split overflowing nodes, walking back towards the root
        let mut level = path.len() - 1;
        loop
        {
            if self.arena[path[level]].len() <= self.max_entries
            {
                break;
            }

            self.split(&path, level);
            if level == 0
            {
                // the root was split, its replacement already has fresh bounds
                return;
            }
            level -= 1;
        }

        for &ancestor in &path[..=level]
        {
            self.arena[ancestor].bounds.union_with(bounds);
        }
    }

    // finds the node at `level` (or the leaf above it) whose bounds need the least enlargement
    fn choose_subtree(&self, bounds: AABB, level: usize, path: &mut SmallVec<[NodeIndex; 16]>) -> NodeIndex
    {
        let mut node = self.root;
        loop
        {
            path.push(node);
            let hydrated = &self.arena[node];
            if hydrated.is_leaf() || path.len() - 1 == level
            {
                return node;
            }

            let mut min_volume = f32::INFINITY;
            let mut min_enlargement = f32::INFINITY;
            let mut target = None;

            for &child in hydrated.children()
            {
                let child_bounds = self.arena[child].bounds;
                let volume = child_bounds.volume();
                let enlargement = bounds.enlarged_volume(child_bounds) - volume;

                if enlargement < min_enlargement
                {
                    min_enlargement = enlargement;
                    min_volume = volume.min(min_volume);
                    target = Some(child);
                }
                else if enlargement == min_enlargement && volume < min_volume
                {
                    min_volume = volume;
                    target = Some(child);
                }
            }

            node = match target
            {
                Some(child) => child,
                None => hydrated.children()[0], // everything NaN/infinite
            };
        }
    }

    // splits path[level] in two, registering the new sibling with its parent (or growing a new root)
    fn split(&mut self, path: &[NodeIndex], level: usize)
    {
        let node = path[level];
        let count = self.arena[node].len();
        let min = self.min_entries;

        self.choose_split_axis(node, min, count);
        let split_index = self.choose_split_index(node, min, count);

        let height = self.arena[node].height;
        let sibling = match &mut self.arena[node].kind
        {
            NodeKind::Leaf(items) => NodeKind::Leaf(items.split_off(split_index)),
            NodeKind::Inner(children) => NodeKind::Inner(children.split_off(split_index)),
        };
        let sibling = match sibling
        {
            NodeKind::Leaf(items) => self.arena.alloc_leaf(items),
            NodeKind::Inner(children) => self.arena.alloc_inner(height, children),
        };

        self.calc_bounds(node);
        self.calc_bounds(sibling);
        log::trace!("Split {node:?} (height {height}) at {split_index}/{count} into {sibling:?}");

        match level
        {
            0 => self.split_root(node, sibling),
            _ => match &mut self.arena[path[level - 1]].kind
            {
                NodeKind::Inner(children) => children.push(sibling),
                NodeKind::Leaf(_) => unreachable!("Parent of {node:?} is a leaf"),
            },
        }
    }

    // replaces the root with a new node one level taller holding both halves
    pub(super) fn split_root(&mut self, node: NodeIndex, sibling: NodeIndex)
    {
        let height = self.arena[node].height + 1;
        let root = self.arena.alloc_inner(height, vec![node, sibling]);
        self.calc_bounds(root);
        self.root = root;
        log::trace!("Grew root {root:?} to height {height}");
    }

    // leaves the children sorted along the axis with the smallest total split margin
    fn choose_split_axis(&mut self, node: NodeIndex, min: usize, count: usize)
    {
        let x_margin = self.all_dist_margin(node, min, count, Axis::X);
        let y_margin = self.all_dist_margin(node, min, count, Axis::Y);
        let z_margin = self.all_dist_margin(node, min, count, Axis::Z);

        // children come back sorted by z from the last pass
        if x_margin < y_margin && x_margin < z_margin
        {
            self.sort_children(node, Axis::X);
        }
        else if y_margin < x_margin && y_margin < z_margin
        {
            self.sort_children(node, Axis::Y);
        }
    }

    // sum of the margins of every valid split along an axis
    fn all_dist_margin(&mut self, node: NodeIndex, min: usize, count: usize, axis: Axis) -> f32
    {
        self.sort_children(node, axis);

        let mut left = self.dist_bounds(node, 0, min);
        let mut right = self.dist_bounds(node, count - min, count);
        let mut margin = left.margin() + right.margin();

        for i in min..(count - min)
        {
            left.union_with(self.child_bounds(node, i));
            margin += left.margin();
        }
        for i in (min..(count - min)).rev()
        {
            right.union_with(self.child_bounds(node, i));
            margin += right.margin();
        }

        margin
    }

    // split position with the least overlap between the halves, then the least total volume
    fn choose_split_index(&self, node: NodeIndex, min: usize, count: usize) -> usize
    {
        let mut min_overlap = f32::INFINITY;
        let mut min_volume = f32::INFINITY;
        let mut index = None;

        for i in min..=(count - min)
        {
            let left = self.dist_bounds(node, 0, i);
            let right = self.dist_bounds(node, i, count);

            let overlap = left.intersection_volume(right);
            let volume = left.volume() + right.volume();

            if overlap < min_overlap
            {
                min_overlap = overlap;
                min_volume = volume.min(min_volume);
                index = Some(i);
            }
            else if overlap == min_overlap && volume < min_volume
            {
                min_volume = volume;
                index = Some(i);
            }
        }

        index.unwrap_or(min)
    }

    // stable sort of a node's children by their lower bound on an axis
    fn sort_children(&mut self, node: NodeIndex, axis: Axis)
    {
        let Self { arena, policy, .. } = self;
        let mut children = match &mut arena[node].kind
        {
            NodeKind::Leaf(items) =>
            {
                items.sort_by(|a, b| policy.compare_min(axis, a, b));
                return;
            }
            NodeKind::Inner(children) => std::mem::take(children),
        };

        children.sort_by(|&a, &b| arena[a].bounds.min_on(axis).total_cmp(&arena[b].bounds.min_on(axis)));
        arena[node].kind = NodeKind::Inner(children);
    }
}
