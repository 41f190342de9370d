//! Symbolic expressions and transition records for the PRISM compiler.
//!
//! [`Expr`] is the expression algebra used for guards and computed outputs.
//! [`Transition`], [`ConditionalOutput`] and [`VirtualState`] are the
//! per-state records the decision diagram produces and the state table
//! compiler consumes.

#![warn(missing_docs)]

pub mod expr;
pub mod state;

pub use expr::Expr;
pub use state::{ConditionalOutput, Transition, VirtualState};
