//! Hardware description of the PRISM chip.
//!
//! This crate describes the parts of the chip the state table compiler
//! targets: the [`Stew`] word layout, the physical input multiplexers
//! ([`InputMux`]), the fan-out of multiplexers onto virtual component inputs
//! ([`WireMap`]), and the lookup-table [`Component`]s programmed per state.

#![warn(missing_docs)]

pub mod component;
pub mod input_mux;
pub mod stew;
pub mod wire_map;

pub use component::{Component, ComponentKind};
pub use input_mux::{InputMux, MuxConfig};
pub use stew::{FieldKind, Stew, StewItem};
pub use wire_map::WireMap;
