//! Fixed-size lookup tables keyed by closed enumerations.
//!
//! [`EnumMap`] stores exactly one value per variant of an [`EnumKey`] type. The table is
//! allocated once with [`EnumKey::COUNT`] slots and never grows or shrinks, so every key
//! always resolves to a value.

use std::fmt;

/// A closed enumeration usable as an [`EnumMap`] key.
pub trait EnumKey: Copy + 'static {
    /// Number of variants.
    const COUNT: usize;

    /// Every variant, ordered by [`index`](Self::index).
    const ALL: &'static [Self];

    /// Position of the variant inside [`ALL`](Self::ALL).
    fn index(self) -> usize;

    /// Looks up a variant by position, returning `None` when out of range.
    #[must_use]
    fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Implements [`EnumKey`] for a fieldless enum, listing its variants in declaration order.
macro_rules! enum_key {
    ($ty:ty => [$($variant:ident),+ $(,)?]) => {
        impl $crate::enum_map::EnumKey for $ty {
            const COUNT: usize = [$(<$ty>::$variant),+].len();
            const ALL: &'static [Self] = &[$(<$ty>::$variant),+];

            fn index(self) -> usize {
                self as usize
            }
        }
    };
}

pub(crate) use enum_key;

/// A map holding one `V` for every variant of `K`.
#[derive(Clone, PartialEq, Eq)]
pub struct EnumMap<K: EnumKey, V> {
    values: Box<[V]>,
    _key: std::marker::PhantomData<K>,
}

impl<K: EnumKey, V> EnumMap<K, V> {
    /// Builds the table by evaluating `f` once per variant.
    pub fn from_fn(f: impl FnMut(K) -> V) -> Self {
        Self {
            values: K::ALL.iter().copied().map(f).collect(),
            _key: std::marker::PhantomData,
        }
    }

    /// Returns the value stored for `key`.
    #[must_use]
    pub fn get(&self, key: K) -> &V {
        &self.values[key.index()]
    }

    /// Returns a mutable reference to the value stored for `key`.
    pub fn get_mut(&mut self, key: K) -> &mut V {
        &mut self.values[key.index()]
    }

    /// Replaces the value stored for `key`, returning the previous one.
    pub fn set(&mut self, key: K, value: V) -> V {
        std::mem::replace(self.get_mut(key), value)
    }

    /// Bounds-checked lookup by raw position.
    #[must_use]
    pub fn get_index(&self, index: usize) -> Option<&V> {
        self.values.get(index)
    }

    /// Iterates over `(key, value)` pairs in variant order.
    pub fn iter(&self) -> impl Iterator<Item = (K, &V)> {
        K::ALL.iter().copied().zip(self.values.iter())
    }

    /// Calls `f` for every `(key, value)` pair, allowing values to be updated in place.
    pub fn for_each_mut(&mut self, mut f: impl FnMut(K, &mut V)) {
        for (key, value) in K::ALL.iter().copied().zip(self.values.iter_mut()) {
            f(key, value);
        }
    }
}

impl<K: EnumKey, V: Default> Default for EnumMap<K, V> {
    fn default() -> Self {
        Self::from_fn(|_| V::default())
    }
}

impl<K: EnumKey + fmt::Debug, V: fmt::Debug> fmt::Debug for EnumMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{EnumKey, EnumMap, enum_key};

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    enum Digit {
        Zero,
        One,
        Two,
    }

    enum_key!(Digit => [Zero, One, Two]);

    /// Table Layout
    /// Every variant owns exactly one slot and lookups map back to the right key.
    #[test]
    fn test_one_value_per_variant() {
        let map = EnumMap::<Digit, usize>::from_fn(Digit::index);

        assert_eq!(Digit::COUNT, 3);
        for (key, value) in map.iter() {
            assert_eq!(*value, key.index());
        }
        assert_eq!(map.get(Digit::Two), &2);
    }

    /// Bounds Checking
    /// Raw positions beyond the variant count resolve to nothing.
    #[test]
    fn test_out_of_range_index() {
        let map = EnumMap::<Digit, u8>::default();

        assert!(map.get_index(2).is_some());
        assert!(map.get_index(3).is_none());
        assert_eq!(Digit::from_index(1), Some(Digit::One));
        assert_eq!(Digit::from_index(Digit::COUNT), None);
    }

    /// In-place Updates
    #[test]
    fn test_set_and_for_each_mut() {
        let mut map = EnumMap::<Digit, u8>::default();

        assert_eq!(map.set(Digit::One, 7), 0);
        map.for_each_mut(|key, value| *value += key.index() as u8);

        assert_eq!(map.get(Digit::Zero), &0);
        assert_eq!(map.get(Digit::One), &8);
        assert_eq!(map.get(Digit::Two), &2);
    }
}
