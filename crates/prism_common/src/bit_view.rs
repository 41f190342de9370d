//! Borrowed views that redirect bit indices into another bitmask.
//!
//! Both views are bounded: reads past their size return `false` and writes
//! past it fail with [`BitError::OutOfBounds`].

use crate::bit_group::BitGroup;
use crate::bitmask::{BitError, Bitmask};

/// A contiguous window `[offset, offset + size)` of another bitmask.
///
/// This is how individual STEW fields are written inside a configuration
/// word.
pub struct BitmaskSlice<'a> {
    source: &'a mut dyn Bitmask,
    offset: usize,
    nbits: usize,
}

impl<'a> BitmaskSlice<'a> {
    /// Creates a window of `nbits` bits starting at `offset` in `source`.
    pub fn new(source: &'a mut dyn Bitmask, offset: usize, nbits: usize) -> Self {
        Self {
            source,
            offset,
            nbits,
        }
    }
}

impl Bitmask for BitmaskSlice<'_> {
    fn size(&self) -> usize {
        self.nbits
    }

    fn get(&self, bit: usize) -> bool {
        bit < self.nbits && self.source.get(self.offset + bit)
    }

    fn write(&mut self, bit: usize, value: bool) -> Result<(), BitError> {
        if bit >= self.nbits {
            return Err(BitError::OutOfBounds {
                bit,
                size: self.nbits,
            });
        }
        self.source.write(self.offset + bit, value)
    }

    fn resize(&mut self, count: usize) -> Result<(), BitError> {
        if count > self.nbits {
            return Err(BitError::OutOfBounds {
                bit: count,
                size: self.nbits,
            });
        }
        Ok(())
    }
}

/// A bitmask whose index `i` is redirected through a [`BitGroup`].
pub struct MappedBitmask<'a> {
    source: &'a mut dyn Bitmask,
    group: &'a dyn BitGroup,
}

impl<'a> MappedBitmask<'a> {
    /// Views `source` through `group`.
    pub fn new(source: &'a mut dyn Bitmask, group: &'a dyn BitGroup) -> Self {
        Self { source, group }
    }
}

impl Bitmask for MappedBitmask<'_> {
    fn size(&self) -> usize {
        self.group.size()
    }

    fn get(&self, bit: usize) -> bool {
        bit < self.group.size() && self.source.get(self.group.map(bit))
    }

    fn write(&mut self, bit: usize, value: bool) -> Result<(), BitError> {
        if bit >= self.group.size() {
            return Err(BitError::OutOfBounds {
                bit,
                size: self.group.size(),
            });
        }
        self.source.write(self.group.map(bit), value)
    }

    fn resize(&mut self, count: usize) -> Result<(), BitError> {
        if count > self.group.size() {
            return Err(BitError::OutOfBounds {
                bit: count,
                size: self.group.size(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bit_group::{MappedGroup, OffsetGroup};
    use crate::bitmask::{ones, DynamicBitmask, FixedBitmask};

    #[test]
    fn slice_writes_through() {
        let mut word = FixedBitmask::new(32);
        {
            let mut field = BitmaskSlice::new(&mut word, 8, 6);
            field.write_integer(0b10_1101).unwrap();
            assert_eq!(field.read_integer(0, 6), 0b10_1101);
        }
        assert_eq!(word.read_integer(8, 6), 0b10_1101);
        assert_eq!(word.count(), 4);
    }

    #[test]
    fn slice_overflow_is_an_error() {
        let mut word = FixedBitmask::new(32);
        let mut field = BitmaskSlice::new(&mut word, 0, 3);
        assert_eq!(
            field.write_integer(8),
            Err(BitError::OutOfBounds { bit: 3, size: 3 })
        );
        assert!(!field.get(3));
    }

    #[test]
    fn mapped_scatters_bits() {
        let mut storage = DynamicBitmask::new();
        let group = MappedGroup::from_indices(vec![5, 1, 9]);
        {
            let mut view = MappedBitmask::new(&mut storage, &group);
            view.write_integer(0b101).unwrap();
            assert!(view.get(0));
            assert!(!view.get(1));
            assert!(view.get(2));
        }
        assert_eq!(ones(&storage).collect::<Vec<_>>(), vec![5, 9]);
    }

    #[test]
    fn mapped_with_offset_group() {
        let mut storage = DynamicBitmask::with_size(16);
        let group = OffsetGroup::new(4, 4);
        let mut view = MappedBitmask::new(&mut storage, &group);
        view.set(3).unwrap();
        assert!(view.set(4).is_err());
        drop(view);
        assert!(storage.get(7));
    }
}
