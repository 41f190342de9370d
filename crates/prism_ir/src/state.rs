//! Per-state transition records.

use crate::expr::Expr;
use prism_common::{DynamicBitmask, FilePos};
use std::fmt;

/// One guarded edge of a state: when `guard` holds, drive `output` and jump
/// to `state`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// One bit per declared output wire.
    pub output: DynamicBitmask,
    /// The condition under which this transition fires.
    pub guard: Expr,
    /// The target state id.
    pub state: u32,
}

impl Transition {
    /// Creates a transition.
    pub fn new(output: DynamicBitmask, guard: Expr, state: u32) -> Self {
        Self {
            output,
            guard,
            state,
        }
    }

    /// Returns `true` if this is an unconditional jump to `index` itself.
    pub fn is_fallthrough(&self, index: u32) -> bool {
        self.state == index && matches!(self.guard, Expr::True)
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "XIT(state={}, output={}, expr={})",
            self.state, self.output, self.guard
        )
    }
}

/// An output bit asserted only when `expr` holds, independent of which
/// transition fires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalOutput {
    /// The conditional output index.
    pub output: u32,
    /// The boolean condition driving it.
    pub expr: Expr,
}

impl fmt::Display for ConditionalOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "COUT(output={}, expr={})", self.output, self.expr)
    }
}

/// A state as seen by the state table compiler.
///
/// Produced fresh for each compilation and consumed when the image is
/// written. A state whose transitions did not fit one word is split; the
/// upper half is marked `partial` and carries the steady-state output that
/// holds while control falls through to the lower half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualState {
    /// The state id (the physical slot for synthesized states).
    pub index: u32,
    /// Where the state's `case` arm was opened, if declared.
    pub pos: Option<FilePos>,
    /// Set when the state continues in a lower split-off state.
    pub partial: bool,
    /// Output driven while falling through to the lower state.
    pub partial_output: DynamicBitmask,
    /// Ordered transitions; earlier entries take priority.
    pub transitions: Vec<Transition>,
    /// Conditional outputs active in this state.
    pub conditional_outputs: Vec<ConditionalOutput>,
}

impl VirtualState {
    /// Creates an empty state.
    pub fn new(index: u32, pos: Option<FilePos>) -> Self {
        Self {
            index,
            pos,
            partial: false,
            partial_output: DynamicBitmask::new(),
            transitions: Vec::new(),
            conditional_outputs: Vec::new(),
        }
    }

    /// Returns the output bits shared by every transition of this state.
    pub fn steady_state(&self) -> DynamicBitmask {
        let mut iter = self.transitions.iter();
        let Some(first) = iter.next() else {
            return DynamicBitmask::new();
        };
        let mut out = first.output.clone();
        for x in iter {
            out.intersect(&x.output);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_common::Bitmask;

    fn out(v: u64) -> DynamicBitmask {
        DynamicBitmask::from_u64(v, 8)
    }

    #[test]
    fn fallthrough_requires_literal_true_and_self() {
        let t = Transition::new(out(0), Expr::True, 4);
        assert!(t.is_fallthrough(4));
        assert!(!t.is_fallthrough(5));
        let guarded = Transition::new(out(0), Expr::input(0).into_logic(), 4);
        assert!(!guarded.is_fallthrough(4));
    }

    #[test]
    fn steady_state_is_intersection() {
        let mut vs = VirtualState::new(0, None);
        vs.transitions.push(Transition::new(out(0b1110), Expr::input(0).into_logic(), 1));
        vs.transitions.push(Transition::new(out(0b0111), Expr::input(1).into_logic(), 2));
        vs.transitions.push(Transition::new(out(0b0110), Expr::True, 0));
        assert_eq!(vs.steady_state(), out(0b0110));
    }

    #[test]
    fn steady_state_keeps_the_first_width() {
        let mut vs = VirtualState::new(0, None);
        vs.transitions.push(Transition::new(DynamicBitmask::from_u64(0xf, 4), Expr::True, 0));
        vs.transitions.push(Transition::new(out(0xf5), Expr::input(0).into_logic(), 1));
        let steady = vs.steady_state();
        assert_eq!(steady.size(), 4);
        assert_eq!(steady.read_integer(0, 4), 0x5);
    }

    #[test]
    fn steady_state_of_empty_state() {
        let vs = VirtualState::new(3, None);
        assert_eq!(vs.steady_state().count(), 0);
    }

    #[test]
    fn display_formats() {
        let t = Transition::new(DynamicBitmask::from_u64(0x3, 4), Expr::True, 2);
        assert_eq!(t.to_string(), "XIT(state=2, output=4'h3, expr=true)");
        let c = ConditionalOutput {
            output: 1,
            expr: Expr::False,
        };
        assert_eq!(c.to_string(), "COUT(output=1, expr=false)");
    }
}
