//! Compiles an FSM always-block into a PRISM configuration image.
//!
//! The front end reports the block's scopes and assignments to a
//! [`ParseContextTree`], which folds them into one decision diagram shared
//! by every state. [`ParseContextTree::write_states`] then walks the diagram
//! once per state and hands each state's ordered transitions to the
//! [`DecisionTree`], which splits states that need more than one word and
//! programs the lookup tables, jump targets, outputs and multiplexer
//! selections of every word.
//!
//! [`DesignScript`] is the serialized form of the front-end events and
//! [`CompileSession`] ties a design to a hardware configuration.

#![warn(missing_docs)]

pub mod arena;
pub mod decision_tree;
pub mod parse_context;
pub mod script;
pub mod session;

pub use decision_tree::{DecisionTree, StateMap};
pub use parse_context::{Destination, ParseContextTree};
pub use script::{BuildOp, DesignScript};
pub use session::CompileSession;
