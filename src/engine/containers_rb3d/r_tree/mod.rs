// An R-tree over axis-aligned boxes with R*-style node splits and OMT bulk loading.
// Items live directly in the leaves, the tree only derives their bounds through a BoundsPolicy

mod bulk_load;
mod insert;
mod node;
mod plain;
mod query;
mod raycast;
mod remove;

pub use plain::{PlainChild, PlainNode, PlainTreeError};
pub use raycast::RayHit;

use std::fmt::{Debug, Formatter};
use math_rb3d::AABB;
use parking_lot::Mutex;
use crate::{BoundsPolicy, Bounded, DefaultPolicy, FieldNames, FieldPolicy, NamedFields, NodeIndex, TreeConfig};
use node::{NodeArena, NodeKind};
use raycast::RayCandidate;

pub const DEFAULT_MAX_ENTRIES: usize = 16;
pub const MIN_MAX_ENTRIES: usize = 8;

pub struct RTree<T, P = DefaultPolicy>
{
    arena: NodeArena<T>,
    root: NodeIndex, // never none, an empty tree is an empty leaf
    len: usize,
    max_entries: usize,
    min_entries: usize,
    policy: P,
    ray_scratch: Mutex<Vec<RayCandidate>>, // heap storage reused across raycasts
}
impl<T: Bounded> RTree<T, DefaultPolicy>
{
    #[must_use]
    pub fn new(max_entries: usize) -> Self
    {
        Self::with_policy(max_entries, DefaultPolicy)
    }
}
impl<T: NamedFields> RTree<T, FieldPolicy>
{
    // items addressed by attribute names, e.g. ["minXX", "minYY", "minZZ", "maxXX", "maxYY", "maxZZ"]
    #[must_use]
    pub fn with_format(max_entries: usize, names: FieldNames) -> Self
    {
        Self::with_policy(max_entries, FieldPolicy::new(names))
    }

    // uses the config's format, or the default minX..maxZ names
    #[must_use]
    pub fn from_config(config: &TreeConfig) -> Self
    {
        Self::with_format(config.max_entries, config.format.clone().unwrap_or_default())
    }
}
impl<T: Bounded> Default for RTree<T, DefaultPolicy>
{
    fn default() -> Self { Self::new(DEFAULT_MAX_ENTRIES) }
}
impl<T, P> RTree<T, P>
{
    #[inline] #[must_use] pub fn len(&self) -> usize { self.len }
    #[inline] #[must_use] pub fn is_empty(&self) -> bool { self.len == 0 }

    #[inline] #[must_use] pub fn height(&self) -> u32 { self.arena[self.root].height }

    // union of everything stored, AABB::EMPTY for an empty tree
    #[inline] #[must_use] pub fn bounds(&self) -> AABB { self.arena[self.root].bounds }

    #[inline] #[must_use] pub fn max_entries(&self) -> usize { self.max_entries }
    #[inline] #[must_use] pub fn min_entries(&self) -> usize { self.min_entries }

    #[inline] #[must_use] pub fn policy(&self) -> &P { &self.policy }

    // Callers changing the policy of a non-empty tree must keep it consistent with the stored items
    #[inline] #[must_use] pub fn policy_mut(&mut self) -> &mut P { &mut self.policy }

    // depth (from the root, 0-based) at which leaves sit
    #[inline] #[must_use]
    fn leaf_level(&self) -> usize
    {
        self.height() as usize - 1
    }
}
impl<T, P: BoundsPolicy<T>> RTree<T, P>
{
    #[must_use]
    pub fn with_policy(max_entries: usize, policy: P) -> Self
    {
        let max_entries = max_entries.max(MIN_MAX_ENTRIES);
        let mut arena = NodeArena::new();
        let root = arena.alloc_leaf(Vec::new());
        Self
        {
            arena,
            root,
            len: 0,
            max_entries,
            min_entries: (max_entries * 2).div_ceil(5).max(4), // 40%, at least 4
            policy,
            ray_scratch: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn with_config(config: &TreeConfig, policy: P) -> Self
    {
        Self::with_policy(config.max_entries, policy)
    }

    // Removes everything, retiring all nodes for reuse
    pub fn clear(&mut self) -> &mut Self
    {
        log::debug!("Clearing tree of {} items ({} nodes, {} retired)", self.len, self.arena.live_count(), self.arena.free_count());
        self.reset_root();
        self.len = 0;
        self
    }

    fn reset_root(&mut self)
    {
        self.arena.free_subtree(self.root);
        self.root = self.arena.alloc_leaf(Vec::new());
    }

    #[inline] #[must_use]
    fn child_bounds(&self, node: NodeIndex, child: usize) -> AABB
    {
        match &self.arena[node].kind
        {
            NodeKind::Leaf(items) => self.policy.bounds(&items[child]),
            NodeKind::Inner(children) => self.arena[children[child]].bounds,
        }
    }

    // union of the bounds of children [start, end)
    #[must_use]
    fn dist_bounds(&self, node: NodeIndex, start: usize, end: usize) -> AABB
    {
        match &self.arena[node].kind
        {
            NodeKind::Leaf(items) => items[start..end].iter()
                .fold(AABB::EMPTY, |acc, item| acc.unioned_with(self.policy.bounds(item))),
            NodeKind::Inner(children) => children[start..end].iter()
                .fold(AABB::EMPTY, |acc, child| acc.unioned_with(self.arena[*child].bounds)),
        }
    }

    fn calc_bounds(&mut self, node: NodeIndex)
    {
        let bounds = self.dist_bounds(node, 0, self.arena[node].len());
        self.arena[node].bounds = bounds;
    }

    // Walks the whole tree checking balance, fill, tight bounds and the item count.
    // Non-root nodes are only checked for 1 to max_entries children, removal may leave them below min_entries
    pub fn check_invariants(&self) -> Result<(), String>
    {
        let mut items = 0;
        let mut stack = vec![(self.root, self.height())];
        while let Some((index, expected_height)) = stack.pop()
        {
            let node = &self.arena[index];
            if node.height != expected_height
            {
                return Err(format!("{index:?} has height {} but should be {expected_height}", node.height));
            }
            if index != self.root && (node.is_empty() || node.len() > self.max_entries)
            {
                return Err(format!("{index:?} has {} children (max {})", node.len(), self.max_entries));
            }
            let bounds = self.dist_bounds(index, 0, node.len());
            if bounds != node.bounds
            {
                return Err(format!("{index:?} bounds {:?} should be {bounds:?}", node.bounds));
            }

            match &node.kind
            {
                NodeKind::Leaf(leaf_items) =>
                {
                    if node.height != 1
                    {
                        return Err(format!("Leaf {index:?} at height {}", node.height));
                    }
                    items += leaf_items.len();
                }
                NodeKind::Inner(children) =>
                {
                    stack.extend(children.iter().map(|&child| (child, expected_height - 1)));
                }
            }
        }

        match items == self.len
        {
            true => Ok(()),
            false => Err(format!("Counted {items} items but len is {}", self.len)),
        }
    }
}
impl<T: Debug, P> Debug for RTree<T, P>
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "RTree ({} items, height {})", self.len, self.height())?;

        let mut queue = vec![(0, self.root)];
        while let Some((depth, node)) = queue.pop()
        {
            if f.alternate()
            {
                write!(f, "\n{:4}  ", node.index())?;
            }
            else
            {
                f.write_str("\n  ")?;
            }

            for i in 0..depth
            {
                f.write_str([" ┗━ ", "━━ "][i.min(1)])?;
            }
            let hydrated = &self.arena[node];
            write!(f, "[h{}] {:?}", hydrated.height, hydrated.bounds)?;
            match &hydrated.kind
            {
                NodeKind::Leaf(items) =>
                {
                    f.write_str(" (Leaf) ")?;
                    f.debug_list().entries(items).finish()?;
                }
                NodeKind::Inner(children) =>
                {
                    queue.extend(children.iter().rev().map(|&child| (depth + 1, child)));
                }
            }
        }

        Ok(())
    }
}
