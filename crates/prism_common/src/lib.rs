//! Shared foundational types used across the PRISM compiler.
//!
//! This crate provides the bit-addressable vectors that every value in the
//! compiler is expressed in, the composable index mappings used to express
//! wiring as index indirection, source positions, and the common error type.

#![warn(missing_docs)]

pub mod bit_group;
pub mod bit_view;
pub mod bitmask;
pub mod file_pos;
pub mod result;

pub use bit_group::{BitGroup, ConcatGroup, MappedGroup, OffsetGroup, SliceGroup};
pub use bit_view::{BitmaskSlice, MappedBitmask};
pub use bitmask::{ones, BitError, Bitmask, DynamicBitmask, FixedBitmask};
pub use file_pos::FilePos;
pub use result::{CompileError, PrismResult};
