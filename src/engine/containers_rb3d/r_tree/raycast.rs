use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt::{Debug, Formatter};
use glam::Vec3;
use math_rb3d::Ray;
use crate::{BoundsPolicy, NodeIndex};
use super::node::NodeKind;
use super::RTree;

// Nearest item along a ray. A miss has an infinite distance and no item
pub struct RayHit<'t, T>
{
    pub distance: f32,
    pub item: Option<&'t T>,
}
impl<'t, T> RayHit<'t, T>
{
    #[inline] #[must_use]
    pub const fn miss() -> Self
    {
        Self { distance: f32::INFINITY, item: None }
    }

    #[inline] #[must_use] pub const fn is_hit(&self) -> bool { self.item.is_some() }
}
impl<T> Clone for RayHit<'_, T>
{
    fn clone(&self) -> Self { *self }
}
impl<T> Copy for RayHit<'_, T> { }
impl<T: PartialEq> PartialEq for RayHit<'_, T>
{
    fn eq(&self, other: &Self) -> bool
    {
        self.distance == other.distance && self.item == other.item
    }
}
impl<T: Debug> Debug for RayHit<'_, T>
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self.item
        {
            Some(item) => write!(f, "Hit {item:?} @ {}", self.distance),
            None => f.write_str("Miss"),
        }
    }
}

// Node waiting to be visited, keyed by the distance to its bounds.
// Ordered in reverse so the max-heap pops the nearest first
#[derive(Clone, Copy)]
pub(super) struct RayCandidate
{
    distance: f32,
    node: NodeIndex,
}
impl Ord for RayCandidate
{
    fn cmp(&self, other: &Self) -> Ordering
    {
        other.distance.total_cmp(&self.distance)
            .then_with(|| other.node.cmp(&self.node))
    }
}
impl PartialOrd for RayCandidate
{
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> { Some(self.cmp(other)) }
}
impl PartialEq for RayCandidate
{
    fn eq(&self, other: &Self) -> bool { self.cmp(other) == Ordering::Equal }
}
impl Eq for RayCandidate { }

impl<T, P: BoundsPolicy<T>> RTree<T, P>
{
    // Nearest item hit by the ray, within max_length (in units of the direction's length).
    // Items the origin is inside of are hit at distance 0
    #[must_use]
    pub fn raycast(&self, origin: Vec3, direction: Vec3, max_length: f32) -> RayHit<'_, T>
    {
        self.raycast_ray(&Ray::new(origin, direction), max_length)
    }

    // raycast, with the reciprocal of the direction precomputed
    #[must_use]
    pub fn raycast_inv(&self, origin: Vec3, inv_direction: Vec3, max_length: f32) -> RayHit<'_, T>
    {
        self.raycast_ray(&Ray::from_inverse(origin, inv_direction), max_length)
    }

    #[must_use]
    pub fn raycast_ray(&self, ray: &Ray, max_length: f32) -> RayHit<'_, T>
    {
        if ray.is_degenerate() || ray.hit_distance(self.bounds()) == f32::INFINITY
        {
            return RayHit::miss();
        }

        let mut queue = self.take_ray_queue();
        queue.push(RayCandidate { distance: 0.0, node: self.root });

        let mut best = max_length;
        let mut best_item = None;
        while let Some(&nearest) = queue.peek()
        {
            // nothing left that could beat the current hit
            if !(nearest.distance < best)
            {
                break;
            }
            queue.pop();

            match &self.arena[nearest.node].kind
            {
                NodeKind::Inner(children) =>
                {
                    for &child in children
                    {
                        let distance = ray.hit_distance(self.arena[child].bounds);
                        if distance < best
                        {
                            queue.push(RayCandidate { distance, node: child });
                        }
                    }
                }
                NodeKind::Leaf(items) =>
                {
                    for item in items
                    {
                        let distance = ray.hit_distance(self.policy.bounds(item));
                        if distance < best
                        {
                            if distance == 0.0
                            {
                                self.return_ray_queue(queue);
                                return RayHit { distance, item: Some(item) };
                            }
                            best = distance;
                            best_item = Some(item);
                        }
                    }
                }
            }
        }

        self.return_ray_queue(queue);
        match best_item
        {
            Some(item) => RayHit { distance: best, item: Some(item) },
            None => RayHit::miss(),
        }
    }

    // reuses the tree's heap storage, unless another raycast holds it
    fn take_ray_queue(&self) -> BinaryHeap<RayCandidate>
    {
        let storage = match self.ray_scratch.try_lock()
        {
            Some(mut scratch) => std::mem::take(&mut *scratch),
            None => Vec::new(),
        };
        BinaryHeap::from(storage)
    }

    fn return_ray_queue(&self, mut queue: BinaryHeap<RayCandidate>)
    {
        queue.clear();
        let storage = queue.into_vec();
        if let Some(mut scratch) = self.ray_scratch.try_lock()
        {
            if scratch.capacity() < storage.capacity()
            {
                *scratch = storage;
            }
        }
    }
}
