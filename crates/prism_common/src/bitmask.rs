//! Bit-addressable vectors with set algebra.
//!
//! [`Bitmask`] is the abstract interface: zero-based bit positions, reads past
//! the current size return `false`, and writes either grow the vector
//! ([`DynamicBitmask`]) or fail with [`BitError::OutOfBounds`]
//! ([`FixedBitmask`] and the views in [`bit_view`](crate::bit_view)).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of bits packed per storage word.
const BITS_PER_WORD: usize = 64;

/// Errors raised by bit-level writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BitError {
    /// A write or resize reached past the bound of a fixed-size bitmask.
    #[error("bit {bit} is out of bounds for a fixed bitmask of {size} bits")]
    OutOfBounds {
        /// The offending bit position (or requested size for a resize).
        bit: usize,
        /// The bound of the bitmask.
        size: usize,
    },

    /// A serialized bitmask whose word storage disagrees with its size.
    #[error("malformed bitmask: {words} word(s) for {nbits} bits, or bits set past the end")]
    Malformed {
        /// The declared size in bits.
        nbits: usize,
        /// The number of storage words supplied.
        words: usize,
    },
}

/// An ordered sequence of boolean values.
///
/// Bits at or beyond [`size`](Self::size) read as `false` and are never
/// materialized. `fns`/`ffs` use `size()` as the "nothing found" sentinel, so
/// set bits can be enumerated with:
///
/// ```
/// # use prism_common::{Bitmask, DynamicBitmask};
/// # let mask = DynamicBitmask::from_u64(0b1010, 4);
/// let mut bit = mask.ffs();
/// while bit < mask.size() {
///     // ...
///     bit = mask.fns(bit);
/// }
/// ```
pub trait Bitmask {
    /// Returns the current number of addressable bits.
    fn size(&self) -> usize;

    /// Returns the value of `bit`, or `false` when `bit >= size()`.
    fn get(&self, bit: usize) -> bool;

    /// Writes `value` at `bit`, growing the vector if the implementation allows it.
    fn write(&mut self, bit: usize, value: bool) -> Result<(), BitError>;

    /// Grows the vector to at least `count` bits. Shrinking is never performed.
    fn resize(&mut self, count: usize) -> Result<(), BitError>;

    /// Finds the next set bit strictly after `cursor`, or `size()` if none.
    fn fns(&self, cursor: usize) -> usize {
        let size = self.size();
        let mut bit = cursor.saturating_add(1);
        while bit < size && !self.get(bit) {
            bit += 1;
        }
        bit.min(size)
    }

    /// Finds the first set bit, or `size()` if none.
    fn ffs(&self) -> usize {
        let size = self.size();
        (0..size).find(|&bit| self.get(bit)).unwrap_or(size)
    }

    /// Returns the number of set bits.
    fn count(&self) -> usize {
        let mut n = 0;
        let mut bit = self.ffs();
        while bit < self.size() {
            n += 1;
            bit = self.fns(bit);
        }
        n
    }

    /// Sets `bit` to one.
    fn set(&mut self, bit: usize) -> Result<(), BitError> {
        self.write(bit, true)
    }

    /// Clears `bit` to zero.
    fn clear(&mut self, bit: usize) -> Result<(), BitError> {
        self.write(bit, false)
    }

    /// Clears every set bit.
    fn reset(&mut self) -> Result<(), BitError> {
        let mut bit = self.ffs();
        while bit < self.size() {
            self.clear(bit)?;
            bit = self.fns(bit);
        }
        Ok(())
    }

    /// Writes the binary representation of `value` starting at bit 0.
    ///
    /// Bits above the highest set bit of `value` are left untouched.
    fn write_integer(&mut self, mut value: u64) -> Result<(), BitError> {
        let mut bit = 0;
        while value != 0 {
            self.write(bit, value & 1 != 0)?;
            value >>= 1;
            bit += 1;
        }
        Ok(())
    }

    /// Reads `width` bits (at most 64) starting at `offset` as an integer.
    fn read_integer(&self, offset: usize, width: usize) -> u64 {
        (0..width.min(64)).fold(0, |acc, i| acc | (u64::from(self.get(offset + i)) << i))
    }

    /// Returns the four bits starting at `bit` as a nibble.
    fn nibble(&self, bit: usize) -> u8 {
        let end = (bit + 4).min(self.size());
        (bit..end).fold(0, |acc, i| acc | (u8::from(self.get(i)) << (i - bit)))
    }

    /// Copies every bit of `from` (including zeros) into the same positions.
    fn copy_from(&mut self, from: &dyn Bitmask) -> Result<(), BitError> {
        for bit in 0..from.size() {
            self.write(bit, from.get(bit))?;
        }
        Ok(())
    }

    /// Sets every bit that is set in `from`, leaving other bits untouched.
    fn copy_ones(&mut self, from: &dyn Bitmask) -> Result<(), BitError> {
        for bit in ones(from) {
            self.set(bit)?;
        }
        Ok(())
    }

    /// Writes `self | other` into `out`.
    ///
    /// `self` and `other` may be the same vector. The aliased forms
    /// `out == self` and `out == other` are spelled
    /// [`union_with`](Self::union_with) on the aliased side.
    fn set_union(&self, out: &mut dyn Bitmask, other: &dyn Bitmask) -> Result<(), BitError> {
        out.reset()?;
        out.copy_ones(other)?;
        let mut bit = self.ffs();
        while bit < self.size() {
            out.set(bit)?;
            bit = self.fns(bit);
        }
        Ok(())
    }

    /// Writes `self & other` into `out`.
    ///
    /// `self` and `other` may be the same vector. The aliased forms
    /// `out == self` and `out == other` are spelled
    /// [`intersect_with`](Self::intersect_with) on the aliased side.
    fn set_intersection(
        &self,
        out: &mut dyn Bitmask,
        other: &dyn Bitmask,
    ) -> Result<(), BitError> {
        out.reset()?;
        let mut bit = self.ffs();
        while bit < self.size() {
            if other.get(bit) {
                out.set(bit)?;
            }
            bit = self.fns(bit);
        }
        Ok(())
    }

    /// In-place union: `self |= other`.
    fn union_with(&mut self, other: &dyn Bitmask) -> Result<(), BitError> {
        self.copy_ones(other)
    }

    /// In-place intersection: `self &= other`.
    fn intersect_with(&mut self, other: &dyn Bitmask) -> Result<(), BitError> {
        let mut bit = self.ffs();
        while bit < self.size() {
            if !other.get(bit) {
                self.clear(bit)?;
            }
            bit = self.fns(bit);
        }
        Ok(())
    }

    /// Returns `true` if both vectors hold the same bits when zero-extended.
    fn equals(&self, other: &dyn Bitmask) -> bool {
        let mut l = self.ffs();
        let mut r = other.ffs();
        while l < self.size() && r < other.size() && l == r {
            l = self.fns(l);
            r = other.fns(r);
        }
        l >= self.size() && r >= other.size()
    }

    /// Copies `width` bits starting at `offset` into a new fixed-size vector.
    fn extract(&self, offset: usize, width: usize) -> FixedBitmask {
        let mut out = FixedBitmask::new(width);
        for i in 0..width {
            if self.get(offset + i) {
                out.words[i / BITS_PER_WORD] |= 1 << (i % BITS_PER_WORD);
            }
        }
        out
    }

    /// Renders the vector as hex digits, most significant nibble first.
    ///
    /// With `len_prefix` the result is in Verilog style, e.g. `8'h5a`.
    fn to_hex(&self, len_prefix: bool) -> String {
        let size = self.size();
        let mut digits = String::new();
        let mut nv = (size + 3) & !3;
        while nv > 0 {
            nv -= 4;
            let c = self.nibble(nv);
            digits.push(char::from_digit(u32::from(c), 16).unwrap_or('?'));
        }
        if digits.is_empty() {
            digits.push('0');
        }
        if len_prefix {
            format!("{size}'h{digits}")
        } else {
            digits
        }
    }
}

/// Iterates the set bits of `mask` in ascending order.
pub fn ones(mask: &dyn Bitmask) -> impl Iterator<Item = usize> + '_ {
    let first = mask.ffs();
    std::iter::successors((first < mask.size()).then_some(first), move |&bit| {
        let next = mask.fns(bit);
        (next < mask.size()).then_some(next)
    })
}

/// Returns the number of storage words needed for `nbits` bits.
fn word_count(nbits: usize) -> usize {
    nbits.div_ceil(BITS_PER_WORD)
}

fn word_get(words: &[u64], nbits: usize, bit: usize) -> bool {
    bit < nbits && words[bit / BITS_PER_WORD] & (1 << (bit % BITS_PER_WORD)) != 0
}

fn word_write(words: &mut [u64], bit: usize, value: bool) {
    let mask = 1u64 << (bit % BITS_PER_WORD);
    if value {
        words[bit / BITS_PER_WORD] |= mask;
    } else {
        words[bit / BITS_PER_WORD] &= !mask;
    }
}

/// Finds the first set bit at or after `start`, or `nbits`.
fn word_scan(words: &[u64], nbits: usize, start: usize) -> usize {
    if start >= nbits {
        return nbits;
    }
    let mut idx = start / BITS_PER_WORD;
    let mut val = words[idx] & (!0u64 << (start % BITS_PER_WORD));
    loop {
        if val != 0 {
            return (idx * BITS_PER_WORD + val.trailing_zeros() as usize).min(nbits);
        }
        idx += 1;
        if idx >= word_count(nbits) {
            return nbits;
        }
        val = words[idx];
    }
}

fn word_popcount(words: &[u64], nbits: usize) -> usize {
    words[..word_count(nbits)]
        .iter()
        .map(|w| w.count_ones() as usize)
        .sum()
}

/// Serialized form shared by both bitmask kinds, checked before use.
///
/// The word helpers index `words` up to `word_count(nbits)` and assume bits
/// past `nbits` are clear.
#[derive(Deserialize)]
struct RawBitmask {
    nbits: usize,
    words: Vec<u64>,
}

impl RawBitmask {
    fn check(self) -> Result<(usize, Vec<u64>), BitError> {
        let malformed = BitError::Malformed {
            nbits: self.nbits,
            words: self.words.len(),
        };
        if self.words.len() != word_count(self.nbits) {
            return Err(malformed);
        }
        let tail = self.nbits % BITS_PER_WORD;
        if tail != 0 && self.words.last().is_some_and(|w| w >> tail != 0) {
            return Err(malformed);
        }
        Ok((self.nbits, self.words))
    }
}

impl TryFrom<RawBitmask> for DynamicBitmask {
    type Error = BitError;

    fn try_from(raw: RawBitmask) -> Result<Self, BitError> {
        let (nbits, words) = raw.check()?;
        Ok(Self { nbits, words })
    }
}

impl TryFrom<RawBitmask> for FixedBitmask {
    type Error = BitError;

    fn try_from(raw: RawBitmask) -> Result<Self, BitError> {
        let (nbits, words) = raw.check()?;
        Ok(Self { nbits, words })
    }
}

/// A growable bit vector.
///
/// Writes beyond the current size extend the vector. Equality is
/// zero-extended: `4'h1 == 8'h01`.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "RawBitmask")]
pub struct DynamicBitmask {
    nbits: usize,
    words: Vec<u64>,
}

impl DynamicBitmask {
    /// Creates an empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an all-zero vector of `nbits` bits.
    pub fn with_size(nbits: usize) -> Self {
        Self {
            nbits,
            words: vec![0; word_count(nbits)],
        }
    }

    /// Creates a vector of `width` bits holding the low bits of `value`.
    pub fn from_u64(value: u64, width: usize) -> Self {
        let mut mask = Self::with_size(width);
        for bit in 0..width.min(64) {
            if (value >> bit) & 1 != 0 {
                word_write(&mut mask.words, bit, true);
            }
        }
        mask
    }

    /// Creates a copy of any bitmask, preserving its size.
    pub fn from_bitmask(from: &dyn Bitmask) -> Self {
        let mut mask = Self::with_size(from.size());
        for bit in ones(from) {
            word_write(&mut mask.words, bit, true);
        }
        mask
    }

    /// Writes `value` at `bit`, growing as needed. Never fails.
    pub fn put(&mut self, bit: usize, value: bool) {
        if bit >= self.nbits {
            self.nbits = bit + 1;
            if word_count(self.nbits) > self.words.len() {
                self.words.resize(word_count(self.nbits), 0);
            }
        }
        word_write(&mut self.words, bit, value);
    }

    /// Sets `bit`, growing as needed. Never fails.
    pub fn insert(&mut self, bit: usize) {
        self.put(bit, true);
    }

    /// Clears every bit not set in `other`. The size is unchanged, so this
    /// never fails.
    pub fn intersect(&mut self, other: &dyn Bitmask) {
        let mut bit = self.ffs();
        while bit < self.nbits {
            if !other.get(bit) {
                word_write(&mut self.words, bit, false);
            }
            bit = self.fns(bit);
        }
    }

    /// Parses a binary string; the leftmost character is the most significant bit.
    ///
    /// Returns `None` if the string contains characters other than `0` and `1`.
    pub fn from_binary_str(s: &str) -> Option<Self> {
        let mut mask = Self::with_size(s.len());
        for (i, c) in s.chars().rev().enumerate() {
            match c {
                '0' => {}
                '1' => word_write(&mut mask.words, i, true),
                _ => return None,
            }
        }
        Some(mask)
    }
}

impl Bitmask for DynamicBitmask {
    fn size(&self) -> usize {
        self.nbits
    }

    fn get(&self, bit: usize) -> bool {
        word_get(&self.words, self.nbits, bit)
    }

    fn write(&mut self, bit: usize, value: bool) -> Result<(), BitError> {
        self.put(bit, value);
        Ok(())
    }

    fn resize(&mut self, count: usize) -> Result<(), BitError> {
        if count > self.nbits {
            self.nbits = count;
            if word_count(count) > self.words.len() {
                self.words.resize(word_count(count), 0);
            }
        }
        Ok(())
    }

    fn fns(&self, cursor: usize) -> usize {
        word_scan(&self.words, self.nbits, cursor.saturating_add(1))
    }

    fn ffs(&self) -> usize {
        word_scan(&self.words, self.nbits, 0)
    }

    fn count(&self) -> usize {
        word_popcount(&self.words, self.nbits)
    }
}

impl PartialEq for DynamicBitmask {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for DynamicBitmask {}

impl fmt::Display for DynamicBitmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex(true))
    }
}

impl fmt::Debug for DynamicBitmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DynamicBitmask({self})")
    }
}

/// A bit vector with a fixed bound.
///
/// Writes at or beyond the bound fail with [`BitError::OutOfBounds`]; this is
/// how field overflows (e.g. a jump target too large for its field) surface.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawBitmask")]
pub struct FixedBitmask {
    nbits: usize,
    words: Vec<u64>,
}

impl FixedBitmask {
    /// Creates an all-zero vector of exactly `nbits` bits.
    pub fn new(nbits: usize) -> Self {
        Self {
            nbits,
            words: vec![0; word_count(nbits)],
        }
    }

    /// Creates a vector of `width` bits holding `value`.
    ///
    /// Fails if `value` does not fit in `width` bits.
    pub fn from_u64(value: u64, width: usize) -> Result<Self, BitError> {
        let mut mask = Self::new(width);
        mask.write_integer(value)?;
        Ok(mask)
    }
}

impl Bitmask for FixedBitmask {
    fn size(&self) -> usize {
        self.nbits
    }

    fn get(&self, bit: usize) -> bool {
        word_get(&self.words, self.nbits, bit)
    }

    fn write(&mut self, bit: usize, value: bool) -> Result<(), BitError> {
        if bit >= self.nbits {
            return Err(BitError::OutOfBounds {
                bit,
                size: self.nbits,
            });
        }
        word_write(&mut self.words, bit, value);
        Ok(())
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

    fn fns(&self, cursor: usize) -> usize {
        word_scan(&self.words, self.nbits, cursor.saturating_add(1))
    }

    fn ffs(&self) -> usize {
        word_scan(&self.words, self.nbits, 0)
    }

    fn count(&self) -> usize {
        word_popcount(&self.words, self.nbits)
    }
}

impl fmt::Display for FixedBitmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex(true))
    }
}

impl fmt::Debug for FixedBitmask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedBitmask({self})")
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_mask() -> impl Strategy<Value = DynamicBitmask> {
        prop::collection::vec(any::<bool>(), 0..160).prop_map(|bits| {
            let mut mask = DynamicBitmask::with_size(bits.len());
            for (i, b) in bits.into_iter().enumerate() {
                mask.write(i, b).unwrap();
            }
            mask
        })
    }

    fn span(a: &DynamicBitmask, b: &DynamicBitmask) -> usize {
        a.size().max(b.size()) + 8
    }

    proptest! {
        #[test]
        fn union_matches_or(a in arb_mask(), b in arb_mask()) {
            let mut out = DynamicBitmask::new();
            a.set_union(&mut out, &b).unwrap();
            for i in 0..span(&a, &b) {
                prop_assert_eq!(out.get(i), a.get(i) || b.get(i));
            }
        }

        #[test]
        fn union_aliased_forms(a in arb_mask(), b in arb_mask()) {
            // out == this
            let mut this = a.clone();
            this.union_with(&b).unwrap();
            // out == other
            let mut other = b.clone();
            other.union_with(&a).unwrap();
            // this == other
            let mut same = DynamicBitmask::new();
            a.set_union(&mut same, &a).unwrap();
            for i in 0..span(&a, &b) {
                prop_assert_eq!(this.get(i), a.get(i) || b.get(i));
                prop_assert_eq!(other.get(i), a.get(i) || b.get(i));
                prop_assert_eq!(same.get(i), a.get(i));
            }
        }

        #[test]
        fn intersection_matches_and(a in arb_mask(), b in arb_mask()) {
            let mut out = DynamicBitmask::from_u64(u64::MAX, 64);
            a.set_intersection(&mut out, &b).unwrap();
            for i in 0..span(&a, &b) {
                prop_assert_eq!(out.get(i), a.get(i) && b.get(i));
            }
        }

        #[test]
        fn intersection_aliased_forms(a in arb_mask(), b in arb_mask()) {
            let mut this = a.clone();
            this.intersect_with(&b).unwrap();
            let mut other = b.clone();
            other.intersect_with(&a).unwrap();
            let mut same = DynamicBitmask::new();
            a.set_intersection(&mut same, &a).unwrap();
            for i in 0..span(&a, &b) {
                prop_assert_eq!(this.get(i), a.get(i) && b.get(i));
                prop_assert_eq!(other.get(i), a.get(i) && b.get(i));
                prop_assert_eq!(same.get(i), a.get(i));
            }
        }

        #[test]
        fn enumeration_is_exact(a in arb_mask()) {
            let expected: Vec<usize> = (0..a.size()).filter(|&i| a.get(i)).collect();
            let found: Vec<usize> = ones(&a).collect();
            prop_assert_eq!(&found, &expected);
            prop_assert_eq!(a.count(), expected.len());
        }

        #[test]
        fn fixed_and_dynamic_agree(a in arb_mask()) {
            let mut fixed = FixedBitmask::new(a.size());
            fixed.copy_from(&a).unwrap();
            prop_assert_eq!(ones(&fixed).collect::<Vec<_>>(), ones(&a).collect::<Vec<_>>());
            prop_assert!(fixed.equals(&a));
        }
    }
}
