//! The State Table Execution Word (STEW) layout descriptor.
//!
//! A [`Stew`] does not hold configuration bits; it describes where each field
//! lives inside one word of the image. Fields of the same kind are looked up
//! by their order of appearance, so the item list order is significant: the
//! n-th `Jmp`/`Out`/`Cfg` item belongs to the n-th component slot.

use prism_common::{CompileError, PrismResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of a field inside a STEW word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// The fall-through ("increment") flag set on partial states.
    Inc,
    /// The packed input multiplexer selections.
    Mux,
    /// A jump target, one per static component.
    Jmp,
    /// An output vector, one per transition slot.
    Out,
    /// A component configuration (lookup table contents).
    Cfg,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inc => "INC",
            Self::Mux => "MUX",
            Self::Jmp => "JMP",
            Self::Out => "OUT",
            Self::Cfg => "CFG",
        })
    }
}

/// One field of a STEW word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StewItem {
    /// The field kind.
    #[serde(rename = "type")]
    pub kind: FieldKind,
    /// Bit offset of the field inside the word.
    pub offset: usize,
    /// Width of the field in bits.
    pub size: usize,
}

impl StewItem {
    /// Creates a field descriptor.
    pub fn new(kind: FieldKind, offset: usize, size: usize) -> Self {
        Self { kind, offset, size }
    }
}

/// The layout of every word in the configuration image.
///
/// Fields are not checked for overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stew {
    /// Number of words (physical state slots) in the image.
    pub count: usize,
    /// Width of each word in bits.
    pub size: usize,
    /// Field descriptors in declaration order.
    pub items: Vec<StewItem>,
}

impl Stew {
    /// Returns the `nth` field of `kind`, counting from zero.
    pub fn field(&self, kind: FieldKind, nth: usize) -> Option<&StewItem> {
        self.items.iter().filter(|item| item.kind == kind).nth(nth)
    }

    /// Like [`field`](Self::field), but a missing field is a configuration mismatch.
    pub fn require(&self, kind: FieldKind, nth: usize) -> PrismResult<&StewItem> {
        self.field(kind, nth).ok_or_else(|| {
            CompileError::mismatch(format!(
                "STEW has no {kind} field #{nth} required by the decision tree"
            ))
        })
    }

    /// Returns the number of fields of `kind`.
    pub fn count_of(&self, kind: FieldKind) -> usize {
        self.items.iter().filter(|item| item.kind == kind).count()
    }

    /// Returns the total number of bits in the image.
    pub fn image_bits(&self) -> usize {
        self.count * self.size
    }

    /// Returns the bit offset of word `index` inside the image.
    ///
    /// Word 0 occupies the most significant bits.
    pub fn word_offset(&self, index: usize) -> usize {
        (self.count - index - 1) * self.size
    }
}
