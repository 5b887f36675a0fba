use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis
{
    X,
    Y,
    Z,
}
impl Axis
{
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    #[inline] #[must_use]
    pub const fn index(self) -> usize
    {
        match self
        {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    #[inline] #[must_use]
    pub fn of(self, v: Vec3) -> f32
    {
        match self
        {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn components()
    {
        let v = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(Axis::X.of(v), 1.0);
        assert_eq!(Axis::Y.of(v), 2.0);
        assert_eq!(Axis::Z.of(v), 3.0);

        for axis in Axis::ALL
        {
            assert_eq!(axis.of(v), v[axis.index()]);
        }
    }
}
