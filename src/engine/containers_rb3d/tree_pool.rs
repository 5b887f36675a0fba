use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicUsize, Ordering};
use crossbeam::queue::SegQueue;
use crate::{BoundsPolicy, RTree};

// Recycles whole trees (and their node storage) between users. Trees are cleared on return.
// Safe to share between threads
pub struct TreePool<T, P>
{
    free: SegQueue<RTree<T, P>>,
    max_entries: usize,
    policy: P,
    created: AtomicUsize,
}
impl<T, P: BoundsPolicy<T> + Clone> TreePool<T, P>
{
    #[must_use]
    pub fn new(max_entries: usize, policy: P) -> Self
    {
        Self
        {
            free: SegQueue::new(),
            max_entries,
            policy,
            created: AtomicUsize::new(0),
        }
    }

    #[inline] #[must_use] pub fn free_count(&self) -> usize { self.free.len() }
    #[inline] #[must_use] pub fn total_count(&self) -> usize { self.created.load(Ordering::Relaxed) }

    // An empty tree, owned by the caller until it's handed back with give_back
    #[must_use]
    pub fn take_owned(&self) -> RTree<T, P>
    {
        match self.free.pop()
        {
            Some(tree) => tree,
            None =>
            {
                // can create extra trees if others are returned concurrently, they will get reused later
                let created = self.created.fetch_add(1, Ordering::Relaxed) + 1;
                log::debug!("Tree pool grew to {created} trees");
                RTree::with_policy(self.max_entries, self.policy.clone())
            }
        }
    }

    pub fn give_back(&self, mut tree: RTree<T, P>)
    {
        debug_assert_eq!(tree.max_entries(), self.max_entries.max(crate::MIN_MAX_ENTRIES), "Tree was not created by this pool");
        tree.clear();
        self.free.push(tree);
    }

    // An empty tree that returns to the pool when dropped
    #[must_use]
    pub fn take(&self) -> PooledTree<'_, T, P>
    {
        PooledTree
        {
            pool: self,
            tree: ManuallyDrop::new(self.take_owned()),
        }
    }
}

#[must_use]
pub struct PooledTree<'p, T, P: BoundsPolicy<T> + Clone>
{
    pool: &'p TreePool<T, P>,
    tree: ManuallyDrop<RTree<T, P>>,
}
impl<'p, T, P: BoundsPolicy<T> + Clone> PooledTree<'p, T, P>
{
    // detach from the pool, it must be handed back manually (or dropped)
    #[inline] #[must_use]
    pub fn into_inner(self) -> RTree<T, P>
    {
        let mut this = ManuallyDrop::new(self);
        // SAFETY: `this` is never dropped, so the tree is only taken once
        unsafe { ManuallyDrop::take(&mut this.tree) }
    }
}
impl<'p, T, P: BoundsPolicy<T> + Clone> Deref for PooledTree<'p, T, P>
{
    type Target = RTree<T, P>;
    fn deref(&self) -> &Self::Target { &self.tree }
}
impl<'p, T, P: BoundsPolicy<T> + Clone> DerefMut for PooledTree<'p, T, P>
{
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.tree }
}
impl<'p, T, P: BoundsPolicy<T> + Clone> Drop for PooledTree<'p, T, P>
{
    fn drop(&mut self)
    {
        // SAFETY: the tree is not touched again after this
        let tree = unsafe { ManuallyDrop::take(&mut self.tree) };
        self.pool.give_back(tree);
    }
}

#[cfg(test)]
mod tests
{
    use glam::Vec3;
    use math_rb3d::AABB;
    use crate::DefaultPolicy;
    use super::*;

    #[test]
    fn reuse()
    {
        let pool = TreePool::<AABB, _>::new(8, DefaultPolicy);
        assert_eq!(pool.total_count(), 0);
        assert_eq!(pool.free_count(), 0);

        {
            let mut tree = pool.take();
            tree.insert(AABB::point(Vec3::ONE));
            assert_eq!(tree.len(), 1);
            assert_eq!(pool.total_count(), 1);
        }
        assert_eq!(pool.free_count(), 1);

        {
            let tree = pool.take();
            assert!(tree.is_empty(), "Returned trees are cleared");
            let other = pool.take();
            assert_eq!(pool.total_count(), 2);
            assert_eq!(other.max_entries(), 8);
        }
        assert_eq!(pool.free_count(), 2);

        let owned = pool.take().into_inner();
        assert_eq!(pool.free_count(), 1);
        pool.give_back(owned);
        assert_eq!(pool.free_count(), 2);
        assert_eq!(pool.total_count(), 2);
    }

    #[test]
    fn shared_between_threads()
    {
        let pool = TreePool::<AABB, _>::new(16, DefaultPolicy);
        std::thread::scope(|scope|
        {
            for t in 0..4
            {
                let pool = &pool;
                scope.spawn(move ||
                {
                    for i in 0..50
                    {
                        let mut tree = pool.take();
                        tree.insert(AABB::point(Vec3::new(t as f32, i as f32, 0.0)));
                        assert_eq!(tree.len(), 1);
                    }
                });
            }
        });

        assert!(pool.total_count() <= 4);
        assert_eq!(pool.free_count(), pool.total_count());
    }
}
