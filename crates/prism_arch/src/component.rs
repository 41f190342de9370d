//! Programmable components evaluated once per state word.

use prism_common::{BitGroup, Bitmask, DynamicBitmask, MappedBitmask, PrismResult};
use prism_ir::Expr;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The hardware block type of a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentKind {
    /// A lookup table with `2^input_size` configuration bits.
    Lut,
}

/// A component and the window of virtual inputs that feed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// The block type.
    #[serde(rename = "type")]
    pub kind: ComponentKind,
    /// First virtual input index of this component.
    #[serde(rename = "offset")]
    pub input_offset: usize,
    /// Number of input pins.
    #[serde(rename = "size")]
    pub input_size: usize,
}

impl Component {
    /// Creates a lookup table with `input_size` pins starting at virtual
    /// input `input_offset`.
    pub fn lut(input_size: usize, input_offset: usize) -> Self {
        Self {
            kind: ComponentKind::Lut,
            input_offset,
            input_size,
        }
    }

    /// Returns the number of configuration bits.
    pub fn config_bits(&self) -> usize {
        match self.kind {
            ComponentKind::Lut => 1 << self.input_size,
        }
    }

    /// Programs the component so that it computes `expr`.
    ///
    /// `pins` maps each input pin to the design input it observes. Every
    /// table row is produced by driving the pins with the row index and
    /// evaluating `expr` over the resulting design inputs.
    ///
    /// # Panics
    ///
    /// Panics if `pins` does not cover exactly `input_size` pins.
    pub fn program(&self, out: &mut dyn Bitmask, pins: &dyn BitGroup, expr: &Expr) -> PrismResult<()> {
        assert_eq!(pins.size(), self.input_size, "pin group does not match component width");
        for row in 0..self.config_bits() {
            let mut inputs = DynamicBitmask::new();
            MappedBitmask::new(&mut inputs, pins).write_integer(row as u64)?;
            out.write(row, expr.evaluate_logic(&inputs))?;
        }
        debug!("    LUT<{}> {{ {} }} = {}", self.input_size, expr, out.to_hex(true));
        Ok(())
    }
}
