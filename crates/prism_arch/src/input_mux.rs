//! Physical input multiplexers.

use crate::stew::{FieldKind, Stew};
use prism_common::{Bitmask, BitmaskSlice, CompileError, PrismResult};
use serde::{Deserialize, Serialize};

/// Shape of the input multiplexer bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuxConfig {
    /// Select bits per multiplexer.
    #[serde(rename = "size")]
    pub bits: usize,
    /// Number of multiplexers.
    pub count: usize,
}

impl MuxConfig {
    /// Returns the number of selectable design inputs, `2^bits`.
    pub fn inputs(&self) -> usize {
        1 << self.bits
    }
}

/// Writes multiplexer selections into the `Mux` field of a STEW word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputMux {
    config: MuxConfig,
}

impl InputMux {
    /// Creates a writer for the given bank shape.
    pub fn new(config: MuxConfig) -> Self {
        Self { config }
    }

    /// Returns the bank shape.
    pub fn config(&self) -> MuxConfig {
        self.config
    }

    /// Packs `selects[mux]` as a `bits`-wide integer at
    /// `mux_field.offset + mux * bits` for every multiplexer.
    pub fn write(&self, word: &mut dyn Bitmask, stew: &Stew, selects: &[usize]) -> PrismResult<()> {
        let field = stew.require(FieldKind::Mux, 0)?;
        let MuxConfig { bits, count } = self.config;
        if field.size < bits * count {
            return Err(CompileError::mismatch(format!(
                "STEW MUX field holds {} bits, {count} muxes of {bits} bits need {}",
                field.size,
                bits * count
            )));
        }
        for (mux, &select) in selects.iter().enumerate().take(count) {
            let mut slice = BitmaskSlice::new(word, field.offset + mux * bits, bits);
            slice.write_integer(select as u64)?;
        }
        Ok(())
    }
}
