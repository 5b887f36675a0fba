use glam::Vec3;
use crate::AABB;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray
{
    pub origin: Vec3,
    pub direction: Vec3,
    pub inv_direction: Vec3, // 1/direction per component, +/-inf along axes the ray is parallel to
}
impl Ray
{
    // direction does not need to be normalized, hit distances are in units of its length
    #[inline] #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self
    {
        Self
        {
            origin,
            direction,
            inv_direction: direction.recip(),
        }
    }

    #[inline] #[must_use]
    pub fn from_inverse(origin: Vec3, inv_direction: Vec3) -> Self
    {
        Self
        {
            origin,
            direction: inv_direction.recip(),
            inv_direction,
        }
    }

    // a zero direction never hits anything
    #[inline] #[must_use]
    pub fn is_degenerate(&self) -> bool
    {
        self.inv_direction.x.is_infinite() &&
        self.inv_direction.y.is_infinite() &&
        self.inv_direction.z.is_infinite()
    }

    #[inline] #[must_use]
    pub fn hit_distance(&self, aabb: AABB) -> f32
    {
        aabb.ray_hit_distance(self.origin, self.inv_direction)
    }

    #[inline] #[must_use]
    pub fn point_at(&self, distance: f32) -> Vec3
    {
        self.origin + self.direction * distance
    }
}
