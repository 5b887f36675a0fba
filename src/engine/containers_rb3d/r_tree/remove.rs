use smallvec::SmallVec;
use crate::{BoundsPolicy, NodeIndex};
use super::node::NodeKind;
use super::RTree;

impl<T, P: BoundsPolicy<T>> RTree<T, P>
{
    // Removes the first stored item equal to `item`, None or a missing item is a no-op
    pub fn remove<'i>(&mut self, item: impl Into<Option<&'i T>>) -> &mut Self
        where T: PartialEq + 'i
    {
        self.remove_with(item, |a, b| a == b)
    }

    // Like remove, but with a caller-defined equality, called as (item, candidate).
    // Only candidates whose leaf fully contains the item's bounds are considered
    pub fn remove_with<'i>(&mut self, item: impl Into<Option<&'i T>>, mut equals: impl FnMut(&T, &T) -> bool) -> &mut Self
        where T: 'i
    {
        let Some(item) = item.into() else { return self };
        let bounds = self.policy.bounds(item);

        let mut path = SmallVec::<[NodeIndex; 16]>::new();
        let mut indexes = SmallVec::<[usize; 16]>::new();
        let mut node = Some(self.root);
        let mut parent = None;
        let mut i = 0;
        let mut going_up = false;

        // depth-first, only descending into nodes that could hold the item
        while node.is_some() || !path.is_empty()
        {
            let current = match node
            {
                Some(current) => current,
                None =>
                {
                    let Some(current) = path.pop() else { break };
                    i = indexes.pop().unwrap_or(0);
                    parent = path.last().copied();
                    going_up = true;
                    current
                }
            };

            let found = self.arena[current].items().iter().position(|candidate| equals(item, candidate));
            if let Some(found) = found
            {
                if let NodeKind::Leaf(items) = &mut self.arena[current].kind
                {
                    items.remove(found);
                }
                path.push(current);
                self.len -= 1;
                self.condense(&path);
                return self;
            }

            let hydrated = &self.arena[current];
            if !going_up && !hydrated.is_leaf() && hydrated.bounds.fully_contains(bounds)
            {
                // down
                path.push(current);
                indexes.push(i);
                i = 0;
                parent = Some(current);
                node = hydrated.children().first().copied();
            }
            else if let Some(parent) = parent
            {
                // right
                i += 1;
                node = self.arena[parent].children().get(i).copied();
                going_up = false;
            }
            else
            {
                node = None;
            }
        }

        self
    }

    // drops emptied nodes along the path and tightens the bounds of the rest
    fn condense(&mut self, path: &[NodeIndex])
    {
        for level in (0..path.len()).rev()
        {
            let node = path[level];
            if !self.arena[node].is_empty()
            {
                self.calc_bounds(node);
                continue;
            }

            match level
            {
                0 => self.reset_root(),
                _ =>
                {
                    if let NodeKind::Inner(siblings) = &mut self.arena[path[level - 1]].kind
                    {
                        if let Some(position) = siblings.iter().position(|&sibling| sibling == node)
                        {
                            siblings.remove(position);
                        }
                    }
                    self.arena.free(node);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests
{
    use glam::Vec3;
    use super::*;
    use math_rb3d::AABB;
    use super::super::tests::points;

    #[test]
    fn remove_items()
    {
        let items = points(100);
        let mut tree = RTree::new(8);
        tree.load(items.clone());

        tree.remove(&items[0]).remove(&items[1]).remove(&items[2]);
        assert_eq!(tree.len(), 97);
        assert!(tree.search(AABB::new(Vec3::ZERO, Vec3::splat(2.5))).is_empty());
        tree.check_invariants().unwrap();

        tree.remove(None);
        tree.remove(&AABB::point(Vec3::splat(-50.0)));
        assert_eq!(tree.len(), 97);
    }

    #[test]
    fn remove_everything()
    {
        let items = points(100);
        let mut tree = RTree::new(8);
        tree.load(items.clone());

        for item in &items
        {
            tree.remove(item);
            tree.check_invariants().unwrap();
        }
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.bounds(), AABB::EMPTY);
        assert_eq!(tree.arena.live_count(), 1);
    }

    #[test]
    fn remove_with_equality()
    {
        #[derive(Debug, Clone)]
        struct Tagged { bounds: AABB, id: u32 }
        impl crate::Bounded for Tagged
        {
            fn aabb(&self) -> AABB { self.bounds }
        }

        let items: Vec<Tagged> = points(30).into_iter().zip(0..).map(|(bounds, id)| Tagged { bounds, id }).collect();
        let mut tree = RTree::new(8);
        tree.load(items.clone());

        let probe = Tagged { bounds: items[7].bounds, id: 7 };
        tree.remove_with(&probe, |a, b| a.id == b.id);
        assert_eq!(tree.len(), 29);
        assert!(tree.all().iter().all(|t| t.id != 7));

        // bounds must still lead to the item
        let misplaced = Tagged { bounds: AABB::point(Vec3::splat(-1.0)), id: 8 };
        tree.remove_with(&misplaced, |a, b| a.id == b.id);
        assert_eq!(tree.len(), 29);
        tree.check_invariants().unwrap();
    }
}
