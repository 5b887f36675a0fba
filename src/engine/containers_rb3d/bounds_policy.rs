use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt::{Debug, Formatter};
use std::hash::BuildHasher;
use serde::{Deserialize, Serialize};
use math_rb3d::{Axis, AABB};

// How a tree sees its items. Implementations must be pure and agree with each other:
// compare_min(axis) has to order items the same way as the min bound bounds() reports for that axis
pub trait BoundsPolicy<T>
{
    fn bounds(&self, item: &T) -> AABB;

    // total order of two items by their lower bound on an axis
    fn compare_min(&self, axis: Axis, a: &T, b: &T) -> Ordering
    {
        compare_by_bounds(self, axis, a, b)
    }
}

#[inline]
pub fn compare_by_bounds<T, P: BoundsPolicy<T> + ?Sized>(policy: &P, axis: Axis, a: &T, b: &T) -> Ordering
{
    policy.bounds(a).min_on(axis).total_cmp(&policy.bounds(b).min_on(axis))
}

pub trait Bounded
{
    fn aabb(&self) -> AABB;
}
impl Bounded for AABB
{
    #[inline] fn aabb(&self) -> AABB { *self }
}
impl<B: Bounded> Bounded for Box<B>
{
    #[inline] fn aabb(&self) -> AABB { (**self).aabb() }
}
impl<B: Bounded> Bounded for std::sync::Arc<B>
{
    #[inline] fn aabb(&self) -> AABB { (**self).aabb() }
}

// Items that know their own bounds
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DefaultPolicy;
impl<T: Bounded> BoundsPolicy<T> for DefaultPolicy
{
    #[inline]
    fn bounds(&self, item: &T) -> AABB { item.aabb() }

    #[inline]
    fn compare_min(&self, axis: Axis, a: &T, b: &T) -> Ordering
    {
        a.aabb().min_on(axis).total_cmp(&b.aabb().min_on(axis))
    }
}

// Names of the six attributes an item stores its bounds in,
// ordered min x, min y, min z, max x, max y, max z.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[String; 6]", into = "[String; 6]")]
pub struct FieldNames
{
    pub min_x: String,
    pub min_y: String,
    pub min_z: String,
    pub max_x: String,
    pub max_y: String,
    pub max_z: String,
}
impl FieldNames
{
    #[must_use]
    pub fn new(names: [&str; 6]) -> Self
    {
        Self::from(names.map(str::to_owned))
    }

    #[inline] #[must_use]
    pub fn min_name(&self, axis: Axis) -> &str
    {
        match axis
        {
            Axis::X => &self.min_x,
            Axis::Y => &self.min_y,
            Axis::Z => &self.min_z,
        }
    }
}
impl Default for FieldNames
{
    fn default() -> Self
    {
        Self::new(["minX", "minY", "minZ", "maxX", "maxY", "maxZ"])
    }
}
impl From<[String; 6]> for FieldNames
{
    fn from(names: [String; 6]) -> Self
    {
        let [min_x, min_y, min_z, max_x, max_y, max_z] = names;
        Self { min_x, min_y, min_z, max_x, max_y, max_z }
    }
}
impl From<FieldNames> for [String; 6]
{
    fn from(names: FieldNames) -> Self
    {
        [names.min_x, names.min_y, names.min_z, names.max_x, names.max_y, names.max_z]
    }
}

// Items whose coordinates are looked up by attribute name. Missing attributes read as NaN
pub trait NamedFields
{
    fn field(&self, name: &str) -> f32;
}
impl<S: BuildHasher> NamedFields for HashMap<String, f32, S>
{
    fn field(&self, name: &str) -> f32 { self.get(name).copied().unwrap_or(f32::NAN) }
}
impl NamedFields for BTreeMap<String, f32>
{
    fn field(&self, name: &str) -> f32 { self.get(name).copied().unwrap_or(f32::NAN) }
}

// Reads bounds from named attributes, see FieldNames
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FieldPolicy
{
    names: FieldNames,
}
impl FieldPolicy
{
    #[inline] #[must_use] pub fn new(names: FieldNames) -> Self { Self { names } }
    #[inline] #[must_use] pub fn names(&self) -> &FieldNames { &self.names }
}
impl<T: NamedFields> BoundsPolicy<T> for FieldPolicy
{
    fn bounds(&self, item: &T) -> AABB
    {
        AABB::from_bounds(
            item.field(&self.names.min_x),
            item.field(&self.names.min_y),
            item.field(&self.names.min_z),
            item.field(&self.names.max_x),
            item.field(&self.names.max_y),
            item.field(&self.names.max_z))
    }

    fn compare_min(&self, axis: Axis, a: &T, b: &T) -> Ordering
    {
        let name = self.names.min_name(axis);
        a.field(name).total_cmp(&b.field(name))
    }
}

pub type BoundsFn<T> = Box<dyn Fn(&T) -> AABB + Send + Sync>;
pub type CompareFn<T> = Box<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

// Fully caller-defined extraction. Without an explicit comparison for an axis,
// items are ordered by the min bound the extraction reports
pub struct CustomPolicy<T>
{
    bounds_fn: BoundsFn<T>,
    compare_fns: [Option<CompareFn<T>>; 3],
}
impl<T> CustomPolicy<T>
{
    #[must_use]
    pub fn new(bounds_fn: impl Fn(&T) -> AABB + Send + Sync + 'static) -> Self
    {
        Self
        {
            bounds_fn: Box::new(bounds_fn),
            compare_fns: [None, None, None],
        }
    }

    #[must_use]
    pub fn with_compare_fn(mut self, axis: Axis, compare_fn: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self
    {
        self.set_compare_fn(axis, compare_fn);
        self
    }

    pub fn set_bounds_fn(&mut self, bounds_fn: impl Fn(&T) -> AABB + Send + Sync + 'static)
    {
        self.bounds_fn = Box::new(bounds_fn);
    }

    pub fn set_compare_fn(&mut self, axis: Axis, compare_fn: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static)
    {
        self.compare_fns[axis.index()] = Some(Box::new(compare_fn));
    }
}
impl<T> BoundsPolicy<T> for CustomPolicy<T>
{
    #[inline]
    fn bounds(&self, item: &T) -> AABB { (self.bounds_fn)(item) }

    fn compare_min(&self, axis: Axis, a: &T, b: &T) -> Ordering
    {
        match &self.compare_fns[axis.index()]
        {
            Some(compare_fn) => compare_fn(a, b),
            None => compare_by_bounds(self, axis, a, b),
        }
    }
}
impl<T> Debug for CustomPolicy<T>
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        f.debug_struct("CustomPolicy")
            .field("compare_x", &self.compare_fns[0].is_some())
            .field("compare_y", &self.compare_fns[1].is_some())
            .field("compare_z", &self.compare_fns[2].is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests
{
    use glam::Vec3;
    use super::*;

    fn named(values: [(&str, f32); 6]) -> HashMap<String, f32>
    {
        values.into_iter().map(|(k, v)| (k.to_owned(), v)).collect()
    }

    #[test]
    fn default_policy()
    {
        let a = AABB::new(Vec3::ZERO, Vec3::ONE);
        let b = AABB::new(Vec3::new(2.0, -1.0, 0.0), Vec3::splat(3.0));
        assert_eq!(DefaultPolicy.bounds(&a), a);
        assert_eq!(DefaultPolicy.compare_min(Axis::X, &a, &b), Ordering::Less);
        assert_eq!(DefaultPolicy.compare_min(Axis::Y, &a, &b), Ordering::Greater);
        assert_eq!(DefaultPolicy.compare_min(Axis::Z, &a, &b), Ordering::Equal);
    }

    #[test]
    fn field_policy()
    {
        let policy = FieldPolicy::new(FieldNames::new(["minXX", "minYY", "minZZ", "maxXX", "maxYY", "maxZZ"]));
        let item = named([("minXX", 1.0), ("minYY", 2.0), ("minZZ", 3.0), ("maxXX", 4.0), ("maxYY", 5.0), ("maxZZ", 6.0)]);
        assert_eq!(policy.bounds(&item), AABB::from([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]));

        let other = named([("minXX", 0.0), ("minYY", 2.0), ("minZZ", 9.0), ("maxXX", 4.0), ("maxYY", 5.0), ("maxZZ", 10.0)]);
        assert_eq!(policy.compare_min(Axis::X, &item, &other), Ordering::Greater);
        assert_eq!(policy.compare_min(Axis::Y, &item, &other), Ordering::Equal);
        assert_eq!(policy.compare_min(Axis::Z, &item, &other), Ordering::Less);
    }

    #[test]
    fn missing_fields_are_nan()
    {
        let policy = FieldPolicy::default();
        let item: BTreeMap<String, f32> = BTreeMap::new();
        assert!(!policy.bounds(&item).is_valid());
    }

    #[test]
    fn field_names_from_array()
    {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Wrapper { format: FieldNames }

        let wrapper: Wrapper = toml::from_str(r#"format = ["a", "b", "c", "d", "e", "f"]"#).unwrap();
        assert_eq!(wrapper.format, FieldNames::new(["a", "b", "c", "d", "e", "f"]));
        assert_eq!(wrapper.format.min_name(Axis::Y), "b");

        let serialized = toml::to_string(&wrapper).unwrap();
        assert_eq!(toml::from_str::<Wrapper>(&serialized).unwrap(), wrapper);
    }

    #[test]
    fn custom_policy()
    {
        struct Nested { corners: (Vec3, Vec3) }

        let mut policy = CustomPolicy::new(|n: &Nested| AABB::new(n.corners.0, n.corners.1));
        let a = Nested { corners: (Vec3::ZERO, Vec3::ONE) };
        let b = Nested { corners: (Vec3::splat(0.5), Vec3::splat(2.0)) };
        assert_eq!(policy.bounds(&a), AABB::new(Vec3::ZERO, Vec3::ONE));
        assert_eq!(policy.compare_min(Axis::X, &a, &b), Ordering::Less);

        // reversed x ordering
        policy.set_compare_fn(Axis::X, |a: &Nested, b: &Nested| b.corners.0.x.total_cmp(&a.corners.0.x));
        assert_eq!(policy.compare_min(Axis::X, &a, &b), Ordering::Greater);
        assert_eq!(policy.compare_min(Axis::Y, &a, &b), Ordering::Less);

        policy.set_bounds_fn(|_: &Nested| AABB::EMPTY);
        assert_eq!(policy.bounds(&a), AABB::EMPTY);
    }
}
