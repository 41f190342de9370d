//! The compiled configuration image.

use prism_arch::{FieldKind, MuxConfig, Stew};
use prism_common::{Bitmask, BitmaskSlice, FixedBitmask};
use serde::{Deserialize, Serialize};

/// A flat `count x size` bit image, one STEW word per physical state.
///
/// Word 0 occupies the most significant bits of the image, so the image
/// reads in state order when printed most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigImage {
    bits: FixedBitmask,
    stew: Stew,
    muxes: MuxConfig,
    control: u32,
    module: String,
    config: String,
}

impl ConfigImage {
    /// Creates an all-zero image laid out by `stew`.
    pub fn new(stew: Stew, muxes: MuxConfig) -> Self {
        Self {
            bits: FixedBitmask::new(stew.image_bits()),
            stew,
            muxes,
            control: 0,
            module: String::new(),
            config: String::new(),
        }
    }

    /// Attaches the module and configuration names used in report headers.
    pub fn with_labels(mut self, module: impl Into<String>, config: impl Into<String>) -> Self {
        self.module = module.into();
        self.config = config.into();
        self
    }

    /// Returns the compiled module name.
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Returns the name of the hardware configuration the image targets.
    pub fn config_name(&self) -> &str {
        &self.config
    }

    /// Returns the word layout.
    pub fn stew(&self) -> &Stew {
        &self.stew
    }

    /// Returns the multiplexer bank shape.
    pub fn muxes(&self) -> MuxConfig {
        self.muxes
    }

    /// Returns the whole image.
    pub fn bits(&self) -> &FixedBitmask {
        &self.bits
    }

    /// Returns the FSM control register.
    pub fn control(&self) -> u32 {
        self.control
    }

    /// Replaces the FSM control register.
    pub fn set_control(&mut self, control: u32) {
        self.control = control;
    }

    /// Returns the number of words.
    pub fn word_count(&self) -> usize {
        self.stew.count
    }

    /// Returns a copy of word `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`word_count`](Self::word_count).
    pub fn word(&self, index: usize) -> FixedBitmask {
        assert!(index < self.stew.count, "word {index} outside image");
        self.bits.extract(self.stew.word_offset(index), self.stew.size)
    }

    /// Returns a writable view of word `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is not below [`word_count`](Self::word_count).
    pub fn word_mut(&mut self, index: usize) -> BitmaskSlice<'_> {
        assert!(index < self.stew.count, "word {index} outside image");
        let offset = self.stew.word_offset(index);
        BitmaskSlice::new(&mut self.bits, offset, self.stew.size)
    }

    /// Returns the `nth` field of `kind` in word `index`, or `None` if the
    /// layout has no such field.
    pub fn field(&self, index: usize, kind: FieldKind, nth: usize) -> Option<FixedBitmask> {
        let item = self.stew.field(kind, nth)?;
        Some(self.word(index).extract(item.offset, item.size))
    }

    /// Returns the selection programmed into multiplexer `mux` of word `index`.
    pub fn mux_select(&self, index: usize, mux: usize) -> Option<u64> {
        let item = self.stew.field(FieldKind::Mux, 0)?;
        let bits = self.muxes.bits;
        if mux >= self.muxes.count {
            return None;
        }
        Some(self.word(index).read_integer(item.offset + mux * bits, bits))
    }
}
