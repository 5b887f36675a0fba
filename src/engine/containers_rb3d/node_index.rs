use std::fmt::{Debug, Formatter};

// Handle into a node arena. u32 keeps the inner child lists compact
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeIndex(u32);
impl NodeIndex
{
    const NONE: u32 = u32::MAX;

    #[inline] #[must_use] pub const fn none() -> Self { Self(Self::NONE) }

    #[inline] #[must_use]
    pub const fn some(n: usize) -> Self
    {
        debug_assert!(n < Self::NONE as usize, "Node index out of range");
        Self(n as u32)
    }

    #[inline] #[must_use] pub const fn is_none(self) -> bool { self.0 == Self::NONE }
    #[inline] #[must_use] pub const fn is_some(self) -> bool { self.0 != Self::NONE }

    #[inline] #[must_use]
    pub const fn get(self) -> Option<usize>
    {
        match self.is_some()
        {
            true => Some(self.0 as usize),
            false => None,
        }
    }

    // panics (in debug) on none
    #[inline] #[must_use]
    pub const fn index(self) -> usize
    {
        debug_assert!(self.is_some(), "Dereferenced a none node index");
        self.0 as usize
    }
}
impl Default for NodeIndex
{
    fn default() -> Self { Self::none() }
}
impl Debug for NodeIndex
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self.get()
        {
            Some(n) => write!(f, "#{n}"),
            None => f.write_str("#none"),
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn basic()
    {
        assert!(NodeIndex::none().is_none());
        assert!(NodeIndex::default().is_none());
        assert!(NodeIndex::some(0).is_some());
        assert!(NodeIndex::some(1).is_some());
        assert_eq!(NodeIndex::some(17).get(), Some(17));
        assert_eq!(NodeIndex::none().get(), None);
        assert_eq!(NodeIndex::some(3).index(), 3);
    }

    #[test]
    fn debug_format()
    {
        assert_eq!(format!("{:?}", NodeIndex::some(5)), "#5");
        assert_eq!(format!("{:?}", NodeIndex::none()), "#none");
    }
}
