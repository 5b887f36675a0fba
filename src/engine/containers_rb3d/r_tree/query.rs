use math_rb3d::AABB;
use smallvec::{smallvec, SmallVec};
use crate::{BoundsPolicy, NodeIndex};
use super::node::NodeKind;
use super::RTree;

impl<T, P: BoundsPolicy<T>> RTree<T, P>
{
    // All items overlapping the bounds (boundary-inclusive), in no particular order
    #[must_use]
    pub fn search(&self, bounds: AABB) -> Vec<&T>
    {
        let mut result = Vec::new();
        if !bounds.overlaps(self.bounds())
        {
            return result;
        }

        let mut stack: SmallVec<[NodeIndex; 32]> = smallvec![self.root];
        while let Some(top) = stack.pop()
        {
            match &self.arena[top].kind
            {
                NodeKind::Leaf(items) =>
                {
                    result.extend(items.iter().filter(|item| bounds.overlaps(self.policy.bounds(item))));
                }
                NodeKind::Inner(children) =>
                {
                    for &child in children
                    {
                        let child_bounds = self.arena[child].bounds;
                        if !bounds.overlaps(child_bounds)
                        {
                            continue;
                        }

                        // everything below is a match, skip the per-item tests
                        if bounds.fully_contains(child_bounds)
                        {
                            self.collect_non_empty(child, &mut result);
                        }
                        else
                        {
                            stack.push(child);
                        }
                    }
                }
            }
        }

        result
    }

    // Whether any item overlaps the bounds, stops at the first one found
    #[must_use]
    pub fn collides(&self, bounds: AABB) -> bool
    {
        if !bounds.overlaps(self.bounds())
        {
            return false;
        }

        let mut stack: SmallVec<[NodeIndex; 32]> = smallvec![self.root];
        while let Some(top) = stack.pop()
        {
            match &self.arena[top].kind
            {
                NodeKind::Leaf(items) =>
                {
                    if items.iter().any(|item| bounds.overlaps(self.policy.bounds(item)))
                    {
                        return true;
                    }
                }
                NodeKind::Inner(children) =>
                {
                    for &child in children
                    {
                        let child_bounds = self.arena[child].bounds;
                        if !bounds.overlaps(child_bounds)
                        {
                            continue;
                        }

                        // nodes are never empty below the root
                        if bounds.fully_contains(child_bounds)
                        {
                            return true;
                        }
                        stack.push(child);
                    }
                }
            }
        }

        false
    }

    // like collect_all, minus items with empty bounds (they overlap nothing)
    fn collect_non_empty<'t>(&'t self, node: NodeIndex, result: &mut Vec<&'t T>)
    {
        let mut stack: SmallVec<[NodeIndex; 32]> = smallvec![node];
        while let Some(top) = stack.pop()
        {
            match &self.arena[top].kind
            {
                NodeKind::Leaf(items) => result.extend(items.iter().filter(|item| !self.policy.bounds(item).is_empty())),
                NodeKind::Inner(children) => stack.extend_from_slice(children),
            }
        }
    }
}
impl<T, P> RTree<T, P>
{
    // Every stored item, in traversal order
    #[must_use]
    pub fn all(&self) -> Vec<&T>
    {
        let mut result = Vec::with_capacity(self.len);
        self.collect_all(self.root, &mut result);
        result
    }

    fn collect_all<'t>(&'t self, node: NodeIndex, result: &mut Vec<&'t T>)
    {
        let mut stack: SmallVec<[NodeIndex; 32]> = smallvec![node];
        while let Some(top) = stack.pop()
        {
            match &self.arena[top].kind
            {
                NodeKind::Leaf(items) => result.extend(items.iter()),
                NodeKind::Inner(children) => stack.extend_from_slice(children),
            }
        }
    }
}
