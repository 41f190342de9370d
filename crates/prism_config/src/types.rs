//! Configuration types deserialized from a hardware configuration file.

use prism_arch::{Component, FieldKind, MuxConfig, Stew, StewItem, WireMap};
use prism_common::PrismResult;
use serde::{Deserialize, Serialize};

/// A complete description of one PRISM chip variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HardwareConfig {
    /// Human-readable name of the variant.
    #[serde(default)]
    pub title: String,
    /// Free-form version string.
    #[serde(default)]
    pub version: String,
    /// Shared multiplexer fan-out as `(virtual input, mux)` pairs.
    #[serde(default)]
    pub wiremap: Vec<(usize, usize)>,
    /// The input multiplexer bank.
    pub muxes: MuxConfig,
    /// The decision tree components.
    pub decision_tree: DecisionTreeConfig,
    /// The STEW word layout.
    pub stew: Stew,
}

/// The components evaluated for every state word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DecisionTreeConfig {
    /// Components computing transition guards, highest priority first.
    /// Their order must match the `Jmp`, `Out` and `Cfg` field order.
    pub static_components: Vec<Component>,
    /// Components computing conditional output bits, bit 0 first.
    #[serde(default)]
    pub conditional_components: Vec<Component>,
}

impl HardwareConfig {
    /// Returns the built-in "LUT4+LUT4" parameter set.
    ///
    /// Seven 4-bit multiplexers feed two static 4-input lookup tables and
    /// three conditional 2-input ones; the image holds 48 words of 168 bits.
    pub fn fallback() -> Self {
        Self {
            title: "LUT4+LUT4".to_string(),
            version: String::new(),
            wiremap: vec![(4, 3), (8, 0), (9, 1), (10, 2), (11, 3), (12, 5), (13, 6)],
            muxes: MuxConfig { bits: 4, count: 7 },
            decision_tree: DecisionTreeConfig {
                static_components: vec![Component::lut(4, 0), Component::lut(4, 4)],
                conditional_components: vec![
                    Component::lut(2, 8),
                    Component::lut(2, 10),
                    Component::lut(2, 12),
                ],
            },
            stew: Stew {
                count: 48,
                size: 168,
                items: vec![
                    StewItem::new(FieldKind::Inc, 0, 1),
                    StewItem::new(FieldKind::Mux, 1, 28),
                    StewItem::new(FieldKind::Jmp, 29, 6),
                    StewItem::new(FieldKind::Jmp, 35, 6),
                    StewItem::new(FieldKind::Out, 65, 24),
                    StewItem::new(FieldKind::Out, 89, 24),
                    // the default output goes last
                    StewItem::new(FieldKind::Out, 41, 24),
                    StewItem::new(FieldKind::Cfg, 121, 16),
                    StewItem::new(FieldKind::Cfg, 137, 16),
                    StewItem::new(FieldKind::Cfg, 153, 4),
                    StewItem::new(FieldKind::Cfg, 157, 4),
                    StewItem::new(FieldKind::Cfg, 161, 4),
                ],
            },
        }
    }

    /// Returns every component, static ones first.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.decision_tree
            .static_components
            .iter()
            .chain(&self.decision_tree.conditional_components)
    }

    /// Returns the total number of virtual component inputs.
    pub fn virtual_inputs(&self) -> usize {
        self.components().map(|c| c.input_size).sum()
    }

    /// Resolves the multiplexer fan-out for this configuration.
    pub fn wire_map(&self) -> PrismResult<WireMap> {
        WireMap::new(self.muxes, self.virtual_inputs(), &self.wiremap)
    }
}
