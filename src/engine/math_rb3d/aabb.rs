use glam::Vec3;
use serde::{Deserialize, Serialize};
use crate::Axis;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AABB
{
    pub min: Vec3,
    pub max: Vec3,
}
impl AABB
{
    pub const UNIVERSE: Self = Self { min: Vec3::NEG_INFINITY, max: Vec3::INFINITY }; // for 'everything' queries
    pub const EMPTY: Self = Self { min: Vec3::INFINITY, max: Vec3::NEG_INFINITY }; // identity for union, overlaps nothing

    #[inline] #[must_use] pub const fn new(min: Vec3, max: Vec3) -> Self { Self { min, max } }

    #[inline] #[must_use]
    pub const fn from_bounds(min_x: f32, min_y: f32, min_z: f32, max_x: f32, max_y: f32, max_z: f32) -> Self
    {
        Self
        {
            min: Vec3::new(min_x, min_y, min_z),
            max: Vec3::new(max_x, max_y, max_z),
        }
    }

    #[inline] #[must_use] pub fn point(p: Vec3) -> Self { Self { min: p, max: p } }

    #[inline] #[must_use] pub fn size(self) -> Vec3 { self.max - self.min }
    #[inline] #[must_use] pub fn center(self) -> Vec3 { (self.min + self.max) / 2.0 }

    #[inline] #[must_use]
    pub fn volume(self) -> f32
    {
        let size = self.size();
        size.x * size.y * size.z
    }

    // sum of the edge lengths along each axis
    #[inline] #[must_use]
    pub fn margin(self) -> f32
    {
        let size = self.size();
        size.x + size.y + size.z
    }

    #[inline] #[must_use] pub fn min_on(self, axis: Axis) -> f32 { axis.of(self.min) }
    #[inline] #[must_use] pub fn max_on(self, axis: Axis) -> f32 { axis.of(self.max) }

    // true for EMPTY (or anything else inverted on some axis)
    #[inline] #[must_use]
    pub fn is_empty(self) -> bool
    {
        self.min.cmpgt(self.max).any()
    }

    // no NaNs and min <= max on every axis
    #[inline] #[must_use]
    pub fn is_valid(self) -> bool
    {
        !self.min.is_nan() && !self.max.is_nan() && self.min.cmple(self.max).all()
    }

    #[inline]
    pub fn union_with(&mut self, other: Self)
    {
        *self = self.unioned_with(other);
    }

    #[inline] #[must_use]
    pub fn unioned_with(self, rhs: Self) -> Self
    {
        Self
        {
            min: self.min.min(rhs.min),
            max: self.max.max(rhs.max),
        }
    }

    // volume of the union of the two boxes
    #[inline] #[must_use]
    pub fn enlarged_volume(self, rhs: Self) -> f32
    {
        self.unioned_with(rhs).volume()
    }

    #[must_use]
    pub fn intersection_volume(self, rhs: Self) -> f32
    {
        let min = self.min.max(rhs.min);
        let max = self.max.min(rhs.max);
        let size = (max - min).max(Vec3::ZERO);
        size.x * size.y * size.z
    }

    #[must_use]
    pub fn fully_contains(self, rhs: Self) -> bool
    {
        self.min.cmple(rhs.min).all() &&
        self.max.cmpge(rhs.max).all()
    }

    // boundary-inclusive, empty (inverted) boxes overlap nothing
    #[must_use]
    pub fn overlaps(self, rhs: Self) -> bool
    {
        !self.is_empty() && !rhs.is_empty() &&
        self.min.cmple(rhs.max).all() &&
        self.max.cmpge(rhs.min).all()
    }

    // Slab test. Returns the distance along the ray (in units of the direction's length) to the
    // nearest point of the box, clamped to 0 when the origin is inside, or +inf on a miss.
    // inv_direction components of +/-inf are only meaningful if the direction component is 0
    #[must_use]
    pub fn ray_hit_distance(self, origin: Vec3, inv_direction: Vec3) -> f32
    {
        let t0 = (self.min - origin) * inv_direction;
        let t1 = (self.max - origin) * inv_direction;

        let near = t0.min(t1);
        let far = t0.max(t1);

        let t_min = near.max_element().max(0.0);
        let t_max = far.min_element();
        if t_max >= t_min { t_min } else { f32::INFINITY }
    }
}
impl Default for AABB
{
    fn default() -> Self { Self::EMPTY }
}
impl From<[f32; 6]> for AABB
{
    fn from(b: [f32; 6]) -> Self
    {
        Self::from_bounds(b[0], b[1], b[2], b[3], b[4], b[5])
    }
}
