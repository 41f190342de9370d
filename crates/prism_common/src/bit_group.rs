//! Composable virtual-to-physical bit index mappings.
//!
//! A [`BitGroup`] maps a small virtual index space `[0, size)` into another
//! index space. Groups compose: a [`SliceGroup`] or [`ConcatGroup`] can wrap
//! any other group, and a [`MappedGroup`] can absorb the image of any group.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A pure function from `[0, size)` into some other index space.
pub trait BitGroup {
    /// Returns the number of virtual indices.
    fn size(&self) -> usize;

    /// Maps virtual index `bit` to its target index.
    ///
    /// # Panics
    ///
    /// Panics if `bit >= self.size()`.
    fn map(&self, bit: usize) -> usize;

    /// Iterates the image of the group in virtual index order.
    fn indices(&self) -> Box<dyn Iterator<Item = usize> + '_> {
        Box::new((0..self.size()).map(move |i| self.map(i)))
    }
}

impl<G: BitGroup + ?Sized> BitGroup for &G {
    fn size(&self) -> usize {
        (**self).size()
    }

    fn map(&self, bit: usize) -> usize {
        (**self).map(bit)
    }
}

/// Affine mapping: `i -> offset + i` for `i < count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetGroup {
    offset: usize,
    count: usize,
}

impl OffsetGroup {
    /// Creates a mapping of `count` indices starting at `offset`.
    pub fn new(offset: usize, count: usize) -> Self {
        Self { offset, count }
    }
}

impl BitGroup for OffsetGroup {
    fn size(&self) -> usize {
        self.count
    }

    fn map(&self, bit: usize) -> usize {
        assert!(bit < self.count, "bit {bit} outside offset group of {}", self.count);
        self.offset + bit
    }
}

/// Restricts `parent` to the virtual sub-range `[offset, offset + count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceGroup<G> {
    parent: G,
    offset: usize,
    count: usize,
}

impl<G: BitGroup> SliceGroup<G> {
    /// Creates a slice of `parent`.
    ///
    /// # Panics
    ///
    /// Panics if the range reaches past the end of `parent`.
    pub fn new(parent: G, offset: usize, count: usize) -> Self {
        assert!(
            offset + count <= parent.size(),
            "slice {offset}+{count} outside group of {}",
            parent.size()
        );
        Self {
            parent,
            offset,
            count,
        }
    }
}

impl<G: BitGroup> BitGroup for SliceGroup<G> {
    fn size(&self) -> usize {
        self.count
    }

    fn map(&self, bit: usize) -> usize {
        assert!(bit < self.count, "bit {bit} outside slice of {}", self.count);
        self.parent.map(self.offset + bit)
    }
}

/// Concatenation of two groups; indices of `lo` come first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConcatGroup<H, L> {
    hi: H,
    lo: L,
}

impl<H: BitGroup, L: BitGroup> ConcatGroup<H, L> {
    /// Lays `hi` above `lo`.
    pub fn new(hi: H, lo: L) -> Self {
        Self { hi, lo }
    }
}

impl<H: BitGroup, L: BitGroup> BitGroup for ConcatGroup<H, L> {
    fn size(&self) -> usize {
        self.hi.size() + self.lo.size()
    }

    fn map(&self, bit: usize) -> usize {
        let lo = self.lo.size();
        if bit < lo {
            self.lo.map(bit)
        } else {
            self.hi.map(bit - lo)
        }
    }
}

/// An explicit lookup table; the owned form stored inside expressions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappedGroup {
    table: Vec<usize>,
}

impl MappedGroup {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table holding exactly the given indices.
    pub fn from_indices(table: Vec<usize>) -> Self {
        Self { table }
    }

    /// Materializes the image of any group.
    pub fn from_group(group: &dyn BitGroup) -> Self {
        Self {
            table: group.indices().collect(),
        }
    }

    /// Appends the image of `group` after the current entries.
    pub fn concat(&mut self, group: &dyn BitGroup) {
        self.table.extend(group.indices());
    }

    /// Returns the raw table.
    pub fn as_slice(&self) -> &[usize] {
        &self.table
    }
}

impl BitGroup for MappedGroup {
    fn size(&self) -> usize {
        self.table.len()
    }

    fn map(&self, bit: usize) -> usize {
        self.table[bit]
    }
}

impl fmt::Display for MappedGroup {
    /// Renders `I3` for a single index and `I{1,2}` for several.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table.as_slice() {
            [single] => write!(f, "I{single}"),
            many => {
                f.write_str("I{")?;
                for (i, idx) in many.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{idx}")?;
                }
                f.write_str("}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_maps_affinely() {
        let g = OffsetGroup::new(8, 4);
        assert_eq!(g.size(), 4);
        assert_eq!(g.indices().collect::<Vec<_>>(), vec![8, 9, 10, 11]);
    }

    #[test]
    #[should_panic(expected = "outside offset group")]
    fn offset_out_of_range_panics() {
        OffsetGroup::new(0, 2).map(2);
    }

    #[test]
    fn slice_of_offset() {
        let g = SliceGroup::new(OffsetGroup::new(10, 8), 2, 3);
        assert_eq!(g.indices().collect::<Vec<_>>(), vec![12, 13, 14]);
    }

    #[test]
    fn concat_low_first() {
        let g = ConcatGroup::new(OffsetGroup::new(100, 2), OffsetGroup::new(0, 3));
        assert_eq!(g.size(), 5);
        assert_eq!(g.indices().collect::<Vec<_>>(), vec![0, 1, 2, 100, 101]);
    }

    #[test]
    fn mapped_wraps_composition() {
        let inner = ConcatGroup::new(OffsetGroup::new(4, 1), OffsetGroup::new(9, 1));
        let mut table = MappedGroup::from_group(&inner);
        table.concat(&SliceGroup::new(&inner, 1, 1));
        assert_eq!(table.as_slice(), &[9, 4, 4]);
    }

    #[test]
    fn mapped_display() {
        assert_eq!(MappedGroup::from_indices(vec![3]).to_string(), "I3");
        assert_eq!(MappedGroup::from_indices(vec![1, 2]).to_string(), "I{1,2}");
    }

    #[test]
    fn mapped_serde_is_plain_array() {
        let g = MappedGroup::from_indices(vec![5, 6]);
        let json = serde_json::to_string(&g).unwrap();
        assert_eq!(json, "[5,6]");
        let back: MappedGroup = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);
    }
}
