use std::cmp::Ordering;
use math_rb3d::{Axis, AABB};
use smallvec::{smallvec, SmallVec};
use crate::{BoundsPolicy, NodeIndex};
use super::insert::Entry;
use super::node::NodeKind;
use super::RTree;

impl<T, P: BoundsPolicy<T>> RTree<T, P>
{
    // Bulk-inserts a batch of items. Much faster than inserting one by one and gives better query performance.
    // Small batches (under min_entries) are inserted individually, larger ones are packed (OMT) into a
    // subtree and merged with the existing tree
    pub fn load(&mut self, items: impl IntoIterator<Item = T>) -> &mut Self
    {
        let items: Vec<T> = items.into_iter().collect();
        let count = items.len();
        if count == 0
        {
            return self;
        }

        if count < self.min_entries
        {
            for item in items
            {
                self.insert(item);
            }
            return self;
        }

        let mut packed = self.pack(items);
        let packed_height = self.arena[packed].height;
        log::debug!("Bulk loaded {count} items into a subtree of height {packed_height} (tree has {} items, height {})",
            self.len, self.height());

        if self.arena[self.root].is_empty()
        {
            self.arena.free_subtree(self.root);
            self.root = packed;
        }
        else if self.height() == packed_height
        {
            self.split_root(self.root, packed);
        }
        else
        {
            // graft the shorter tree into the taller
            if self.height() < packed_height
            {
                std::mem::swap(&mut self.root, &mut packed);
            }
            let level = (self.height() - self.arena[packed].height - 1) as usize;
            self.insert_entry(Entry::Node(packed), level);
        }

        self.len += count;
        self
    }

    // packs the items into a fresh balanced subtree, returning its root
    fn pack(&mut self, mut items: Vec<T>) -> NodeIndex
    {
        // leaves are allocated while the items are partitioned in place, then filled in order
        let mut fills = Vec::new();
        let root = self.build(&mut items, None, &mut fills);

        let mut drain = items.into_iter();
        for (leaf, len) in fills
        {
            if let NodeKind::Leaf(leaf_items) = &mut self.arena[leaf].kind
            {
                leaf_items.extend(drain.by_ref().take(len));
            }
        }
        debug_assert!(drain.next().is_none(), "Packed items left over");

        root
    }

    fn build(&mut self, items: &mut [T], height: Option<u32>, fills: &mut Vec<(NodeIndex, usize)>) -> NodeIndex
    {
        let count = items.len();
        let mut max = self.max_entries;

        if count <= max
        {
            let bounds = items.iter().fold(AABB::EMPTY, |acc, item| acc.unioned_with(self.policy.bounds(item)));
            let leaf = self.arena.alloc_leaf(Vec::with_capacity(count));
            self.arena[leaf].bounds = bounds;
            fills.push((leaf, count));
            return leaf;
        }

        let height = match height
        {
            Some(height) => height,
            None =>
            {
                // target height of the packed tree, and root entries needed to make full use of storage
                let mut height = 1;
                let mut capacity = max;
                while capacity < count
                {
                    capacity = capacity.saturating_mul(max);
                    height += 1;
                }
                max = count.div_ceil(max.pow(height - 1));
                height
            }
        };

        // split the items into roughly cubic tiles
        let cube_root = (max as f64).cbrt();
        let n3 = count.div_ceil(max);
        let n2 = n3 * (cube_root * cube_root).ceil() as usize;
        let n1 = n3 * cube_root.ceil() as usize;

        let mut children = Vec::with_capacity(max);
        multi_select(items, n1, |a, b| self.policy.compare_min(Axis::X, a, b));
        for x_slice in items.chunks_mut(n1)
        {
            multi_select(x_slice, n2, |a, b| self.policy.compare_min(Axis::Y, a, b));
            for y_slice in x_slice.chunks_mut(n2)
            {
                multi_select(y_slice, n3, |a, b| self.policy.compare_min(Axis::Z, a, b));
                for z_slice in y_slice.chunks_mut(n3)
                {
                    children.push(self.build(z_slice, Some(height - 1), fills));
                }
            }
        }

        let node = self.arena.alloc_inner(height, children);
        self.calc_bounds(node);
        node
    }
}

// Partially orders items so that every consecutive run of `group` is unsorted internally,
// but no item of one run compares less than any item of an earlier run
fn multi_select<T>(items: &mut [T], group: usize, mut compare: impl FnMut(&T, &T) -> Ordering)
{
    let mut stack: SmallVec<[(usize, usize); 32]> = smallvec![(0, items.len())];
    while let Some((left, right)) = stack.pop()
    {
        if right - left <= group
        {
            continue;
        }

        let mid = left + (right - left).div_ceil(2 * group) * group;
        items[left..right].select_nth_unstable_by(mid - left, &mut compare);

        stack.push((left, mid));
        stack.push((mid, right));
    }
}

#[cfg(test)]
mod tests
{
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use super::*;
    use super::super::tests::points;

    #[test]
    fn multi_select_groups()
    {
        let mut rng = StdRng::seed_from_u64(1234);
        let mut values: Vec<u32> = (0..100).collect();
        for i in (1..values.len()).rev()
        {
            values.swap(i, rng.random_range(0..=i));
        }

        multi_select(&mut values, 10, u32::cmp);
        for (group, chunk) in values.chunks(10).enumerate()
        {
            let mut chunk = chunk.to_vec();
            chunk.sort();
            let expected: Vec<u32> = (group as u32 * 10..(group as u32 + 1) * 10).collect();
            assert_eq!(chunk, expected);
        }
    }

    #[test]
    fn load_heights()
    {
        let mut tree = RTree::new(16);
        tree.load(points(16));
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.len(), 16);

        let mut tree = RTree::new(16);
        tree.load(points(17));
        assert_eq!(tree.height(), 2);
        tree.check_invariants().unwrap();

        let mut tree = RTree::new(16);
        tree.load(points(16 * 16 + 1));
        assert_eq!(tree.height(), 3);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn load_small_batch_inserts()
    {
        let mut tree = RTree::new(8);
        tree.load(points(3));
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.height(), 1);

        tree.load(Vec::new());
        assert_eq!(tree.len(), 3);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn load_merges()
    {
        // same height, a new root over both
        let mut tree = RTree::new(8);
        tree.load(points(20)).load(points(20));
        assert_eq!(tree.len(), 40);
        assert_eq!(tree.height(), 3);
        tree.check_invariants().unwrap();

        // smaller batch grafted into the bigger tree, its root has room so the height holds
        let mut tree = RTree::new(8);
        tree.load(points(300));
        let height = tree.height();
        tree.load(points(10));
        assert_eq!(tree.len(), 310);
        assert_eq!(tree.height(), height);
        tree.check_invariants().unwrap();

        // bigger batch, the existing tree is grafted into it
        let mut tree = RTree::new(8);
        tree.load(points(10)).load(points(300));
        assert_eq!(tree.len(), 310);
        assert_eq!(tree.height(), height);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn load_infinite()
    {
        let mut tree = RTree::new(8);
        tree.load(vec![AABB::UNIVERSE; 10]);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.all().len(), 10);
        tree.check_invariants().unwrap();
    }

    #[test]
    fn load_keeps_items()
    {
        let mut rng = StdRng::seed_from_u64(99);
        let items: Vec<AABB> = (0..1000)
            .map(|_|
            {
                let min = Vec3::new(rng.random_range(0.0..100.0), rng.random_range(0.0..100.0), rng.random_range(0.0..100.0));
                AABB::new(min, min + Vec3::splat(rng.random_range(0.0..5.0)))
            })
            .collect();

        let mut tree = RTree::new(10);
        tree.load(items.clone());
        tree.check_invariants().unwrap();

        let mut all: Vec<AABB> = tree.all().into_iter().copied().collect();
        let mut expected = items;
        let key = |a: &AABB, b: &AABB| a.min.x.total_cmp(&b.min.x)
            .then(a.min.y.total_cmp(&b.min.y))
            .then(a.min.z.total_cmp(&b.min.z))
            .then(a.max.x.total_cmp(&b.max.x));
        all.sort_by(key);
        expected.sort_by(key);
        assert_eq!(all, expected);
    }
}
