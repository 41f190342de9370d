//! Recorded front-end event streams.
//!
//! A front end drives [`ParseContextTree`] with a sequence of scope and
//! assignment events. [`DesignScript`] is that sequence in serialized form,
//! so a design can be compiled without the front end in the same process.

use crate::parse_context::{Destination, ParseContextTree};
use prism_common::{CompileError, FilePos, PrismResult};
use prism_ir::Expr;
use serde::{Deserialize, Serialize};

/// One front-end event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BuildOp {
    /// `if (cond)`: open a conditional scope on its true side.
    Split {
        /// The condition.
        cond: Expr,
        /// Source position of the `if`.
        #[serde(default)]
        pos: Option<FilePos>,
    },
    /// `else`: move to the other side of the innermost scope.
    SwitchSplit {
        /// `true` to go back to the true side.
        #[serde(default)]
        visit_true: bool,
    },
    /// Close the innermost scope.
    Join,
    /// A blocking assignment of a constant bit.
    Assign {
        /// What is assigned.
        dest: Destination,
        /// The bit value.
        value: bool,
    },
    /// `curr_state = state`; `None` stays in the current state.
    SetTargetState {
        /// The next state id.
        #[serde(default)]
        state: Option<u32>,
    },
    /// A `case` arm for one state id.
    SplitStateCase {
        /// The state id.
        state: u32,
        /// Source position of the arm.
        #[serde(default)]
        pos: Option<FilePos>,
    },
    /// The `default` arm of the state switch.
    DefaultStateCase {
        /// Source position of the arm.
        #[serde(default)]
        pos: Option<FilePos>,
    },
    /// Start of `case (var)` over the state variable.
    EnterStateSwitch {
        /// The state variable name.
        var: String,
    },
    /// End of the state switch.
    ExitStateSwitch,
}

/// A named module and the events that build its decision diagram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignScript {
    /// Module name, used to label the image.
    pub module: String,
    /// Events in source order.
    pub ops: Vec<BuildOp>,
}

impl DesignScript {
    /// Parses a script from JSON.
    pub fn from_json(text: &str) -> PrismResult<Self> {
        serde_json::from_str(text).map_err(|e| CompileError::script(e.to_string(), None))
    }

    /// Replays every event into a fresh diagram.
    ///
    /// Fails on the first event the diagram rejects, on `else` or `join`
    /// with no open scope, or when scopes are still open at the end. The
    /// latter reports the position of the innermost unclosed scope.
    pub fn replay(&self) -> PrismResult<ParseContextTree> {
        let mut tree = ParseContextTree::new();
        // source positions of the scopes still open, innermost last
        let mut open: Vec<Option<FilePos>> = Vec::new();
        for op in &self.ops {
            match op {
                BuildOp::Split { cond, pos } => {
                    tree.split(cond.clone());
                    open.push(pos.clone());
                }
                BuildOp::SwitchSplit { visit_true } => {
                    if open.is_empty() {
                        return Err(CompileError::script("else outside of a conditional", None));
                    }
                    tree.switch_split(*visit_true)?;
                }
                BuildOp::Join => {
                    if open.pop().is_none() {
                        return Err(CompileError::script("join outside of a conditional", None));
                    }
                    tree.join()?;
                }
                BuildOp::Assign { dest, value } => tree.assign(*dest, *value)?,
                BuildOp::SetTargetState { state } => tree.set_target_state(*state),
                BuildOp::SplitStateCase { state, pos } => {
                    tree.split_state_case(*state, pos.clone())?;
                    open.push(pos.clone());
                }
                BuildOp::DefaultStateCase { pos } => tree.default_state_case(pos.clone()),
                BuildOp::EnterStateSwitch { var } => tree.enter_state_switch(var),
                BuildOp::ExitStateSwitch => tree.exit_state_switch(),
            }
        }
        if let Some(innermost) = open.last() {
            return Err(CompileError::script(
                format!(
                    "{} conditional scope(s) left open in module {}",
                    open.len(),
                    self.module
                ),
                innermost.clone(),
            ));
        }
        Ok(tree)
    }
}
