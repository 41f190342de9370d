//! The decision diagram builder.
//!
//! The front end walks the always-block and mirrors every conditional scope
//! with [`split`](ParseContextTree::split) / [`switch_split`](ParseContextTree::switch_split)
//! / [`join`](ParseContextTree::join), and every assignment with
//! [`assign`](ParseContextTree::assign). The result is one binary decision
//! diagram for the whole block. `case(state)` arms become branches on a
//! synthetic state test, so a single diagram serves as the transition table
//! of every state: walking it for state `s` takes the matching side of each
//! state test and both sides of every other branch.

use crate::arena::{Arena, NodeId};
use crate::decision_tree::{DecisionTree, StateMap};
use prism_bitstream::ConfigImage;
use prism_common::{Bitmask, CompileError, DynamicBitmask, FilePos, PrismResult};
use prism_ir::{ConditionalOutput, Expr, Transition, VirtualState};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// The target of an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// A state output bit, written into every visible leaf.
    Output(usize),
    /// A conditional output, asserted under the guard of the current scope.
    ConditionalOutput(u32),
    /// A bit of the 32-bit FSM control register.
    Control(u32),
}

#[derive(Debug, Clone)]
enum Condition {
    /// The synthetic `curr_state == id` test of a `case(state)` arm.
    State(u32),
    Expr(Expr),
}

#[derive(Debug, Clone)]
enum Node {
    /// `links[0]` is taken when `cond` holds.
    Branch { cond: Condition, links: [NodeId; 2] },
    /// `target` of `None` stays in the current state.
    Leaf {
        output: DynamicBitmask,
        target: Option<u32>,
    },
}

#[derive(Debug, Clone)]
struct CondOut {
    value: bool,
    expr: Expr,
}

/// Conditional outputs accumulated for one `case` arm.
#[derive(Debug, Clone, Default)]
struct StateScope {
    pos: Option<FilePos>,
    cond_out: BTreeMap<u32, CondOut>,
}

impl StateScope {
    fn inherit(global: &StateScope, pos: Option<FilePos>) -> Self {
        Self {
            pos,
            cond_out: global.cond_out.clone(),
        }
    }

    /// Folds one more assignment of `value` under `expr` into output `bit`.
    ///
    /// The first assignment fixes the polarity; later ones of the same value
    /// widen the condition and ones of the opposite value carve it out.
    fn merge_conditional_output(&mut self, bit: u32, expr: Expr, value: bool) {
        match self.cond_out.remove(&bit) {
            Some(prev) if prev.value == value => {
                self.cond_out.insert(
                    bit,
                    CondOut {
                        value,
                        expr: Expr::logic_or(prev.expr, expr),
                    },
                );
            }
            Some(prev) => {
                self.cond_out.insert(
                    bit,
                    CondOut {
                        value: prev.value,
                        expr: Expr::logic_and(prev.expr, Expr::logic_not(expr)),
                    },
                );
            }
            None => {
                self.cond_out.insert(bit, CondOut { value, expr });
            }
        }
    }

    fn conditional_outputs(&self) -> Vec<ConditionalOutput> {
        self.cond_out
            .iter()
            .map(|(&output, c)| ConditionalOutput {
                output,
                expr: if c.value {
                    c.expr.clone()
                } else {
                    Expr::logic_not(c.expr.clone())
                },
            })
            .collect()
    }
}

/// Which `case` arm assignments currently belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Active {
    Outside,
    Declared(usize),
    Default,
}

/// Builds the decision diagram of one always-block.
#[derive(Debug, Clone)]
pub struct ParseContextTree {
    nodes: Arena<NodeId, Node>,
    root: NodeId,
    current: NodeId,
    /// Open branches, innermost last, with the side being visited
    /// (0 = condition holds).
    scopes: Vec<(NodeId, usize)>,
    states: Vec<(u32, StateScope)>,
    default: Option<StateScope>,
    global: StateScope,
    active: Active,
    control: u32,
}

impl Default for ParseContextTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ParseContextTree {
    /// Creates a diagram holding one empty leaf.
    pub fn new() -> Self {
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::Leaf {
            output: DynamicBitmask::new(),
            target: None,
        });
        Self {
            nodes,
            root,
            current: root,
            scopes: Vec::new(),
            states: Vec::new(),
            default: None,
            global: StateScope::default(),
            active: Active::Outside,
            control: 0,
        }
    }

    /// Splits the visible node on `cond` and enters its true side.
    ///
    /// Both sides start as copies of the node that was visible.
    pub fn split(&mut self, cond: Expr) {
        self.split_on(Condition::Expr(cond));
    }

    fn split_on(&mut self, cond: Condition) {
        let copy = self.clone_subtree(self.current);
        let branch = self.nodes.alloc(Node::Branch {
            cond,
            links: [self.current, copy],
        });
        self.relink(branch);
        self.scopes.push((branch, 0));
    }

    /// Points the link that leads to the visible node at `node` instead.
    fn relink(&mut self, node: NodeId) {
        match self.scopes.last() {
            Some(&(parent, side)) => {
                if let Node::Branch { links, .. } = &mut self.nodes[parent] {
                    links[side] = node;
                }
            }
            None => self.root = node,
        }
    }

    /// Moves to the true or false side of the innermost open branch.
    pub fn switch_split(&mut self, visit_true: bool) -> PrismResult<()> {
        let (branch, side) = self
            .scopes
            .last_mut()
            .ok_or_else(|| CompileError::internal("switch outside of a conditional"))?;
        *side = usize::from(!visit_true);
        let Node::Branch { links, .. } = &self.nodes[*branch] else {
            return Err(CompileError::internal("open scope is not a branch"));
        };
        self.current = links[*side];
        Ok(())
    }

    /// Closes the innermost open branch.
    ///
    /// When both sides ended up identical the branch is dropped and the
    /// visible side takes its place; otherwise the branch itself becomes
    /// the visible node.
    pub fn join(&mut self) -> PrismResult<()> {
        let (branch, side) = self
            .scopes
            .pop()
            .ok_or_else(|| CompileError::internal("join outside of a conditional"))?;
        let Node::Branch { links, .. } = &self.nodes[branch] else {
            return Err(CompileError::internal("open scope is not a branch"));
        };
        let links = *links;

        if self.subtree_eq(links[0], links[1]) {
            self.current = links[side];
            self.relink(self.current);
        } else {
            self.current = branch;
        }
        Ok(())
    }

    /// Performs an assignment in the visible scope.
    ///
    /// Output bits are written into every visible leaf. Conditional outputs
    /// are merged into the open `case` arm, or into every arm when outside
    /// of the state switch. Fails for a control bit past the 32-bit register.
    pub fn assign(&mut self, dest: Destination, value: bool) -> PrismResult<()> {
        match dest {
            Destination::Output(bit) => {
                for leaf in self.leaves(self.current) {
                    if let Node::Leaf { output, .. } = &mut self.nodes[leaf] {
                        output.put(bit, value);
                    }
                }
            }
            Destination::ConditionalOutput(bit) => {
                let expr = self.path_guard();
                match self.active {
                    Active::Declared(i) => {
                        self.states[i].1.merge_conditional_output(bit, expr, value);
                    }
                    Active::Default => {
                        if let Some(scope) = &mut self.default {
                            scope.merge_conditional_output(bit, expr, value);
                        }
                    }
                    Active::Outside => {
                        for (_, scope) in &mut self.states {
                            scope.merge_conditional_output(bit, expr.clone(), value);
                        }
                        if let Some(scope) = &mut self.default {
                            scope.merge_conditional_output(bit, expr.clone(), value);
                        }
                        self.global.merge_conditional_output(bit, expr, value);
                    }
                }
            }
            Destination::Control(bit) => {
                if bit >= u32::BITS {
                    return Err(CompileError::internal(format!(
                        "control bit {bit} outside the 32-bit register"
                    )));
                }
                if value {
                    self.control |= 1 << bit;
                } else {
                    self.control &= !(1 << bit);
                }
            }
        }
        Ok(())
    }

    /// Sets the next state of every visible leaf; `None` stays in the
    /// current state.
    pub fn set_target_state(&mut self, state: Option<u32>) {
        for leaf in self.leaves(self.current) {
            if let Node::Leaf { target, .. } = &mut self.nodes[leaf] {
                *target = state;
            }
        }
    }

    /// Opens the `case` arm for `state`.
    ///
    /// The arm starts with the conditional outputs assigned so far outside
    /// the state switch.
    pub fn split_state_case(&mut self, state: u32, pos: Option<FilePos>) -> PrismResult<()> {
        if self.states.iter().any(|&(s, _)| s == state) {
            return Err(CompileError::DuplicateState {
                state,
                pos: pos.unwrap_or_default(),
            });
        }
        self.states.push((state, StateScope::inherit(&self.global, pos)));
        self.active = Active::Declared(self.states.len() - 1);
        self.split_on(Condition::State(state));
        Ok(())
    }

    /// Opens the `default` arm of the state switch.
    pub fn default_state_case(&mut self, pos: Option<FilePos>) {
        self.default = Some(StateScope::inherit(&self.global, pos));
        self.active = Active::Default;
    }

    /// Marks the start of a `case` over the state variable `var`.
    pub fn enter_state_switch(&mut self, var: &str) {
        debug!("state switch on {var}");
    }

    /// Marks the end of the state switch.
    pub fn exit_state_switch(&mut self) {
        if self.default.is_none() {
            self.default = Some(StateScope::inherit(&self.global, None));
        }
        self.active = Active::Outside;
    }

    /// Returns the FSM control register.
    pub fn control(&self) -> u32 {
        self.control
    }

    /// Returns the declared state ids in declaration order.
    pub fn declared_states(&self) -> impl Iterator<Item = u32> + '_ {
        self.states.iter().map(|&(s, _)| s)
    }

    /// Returns the ordered transitions of `state`.
    ///
    /// Taken branches come before the untaken ones, so each transition is
    /// implicitly guarded by every earlier guard being false.
    pub fn transitions(&self, state: u32) -> Vec<Transition> {
        let mut out = Vec::new();
        self.collect(self.root, None, state, &mut out);
        out
    }

    fn collect(&self, node: NodeId, guard: Option<&Expr>, state: u32, out: &mut Vec<Transition>) {
        match &self.nodes[node] {
            Node::Branch {
                cond: Condition::State(s),
                links,
            } => self.collect(links[usize::from(*s != state)], guard, state, out),
            Node::Branch {
                cond: Condition::Expr(e),
                links,
            } => {
                let taken = match guard {
                    None => e.clone().into_logic(),
                    Some(g) => Expr::logic_and(g.clone(), e.clone()),
                };
                self.collect(links[0], Some(&taken), state, out);
                self.collect(links[1], guard, state, out);
            }
            Node::Leaf { output, target } => out.push(Transition::new(
                output.clone(),
                guard.cloned().unwrap_or(Expr::True),
                target.unwrap_or(state),
            )),
        }
    }

    /// Compiles every state into `image`.
    ///
    /// Declared states take the first words in declaration order, split as
    /// needed; every remaining word gets the transitions of the default arm
    /// for its own index.
    pub fn write_states(&self, tree: &DecisionTree, image: &mut ConfigImage) -> PrismResult<()> {
        image.set_control(self.control);
        let stew = image.stew().clone();

        let mut physical = Vec::new();
        let mut state_map = StateMap::new();
        for (state, scope) in &self.states {
            let mut vs = VirtualState::new(*state, scope.pos.clone());
            vs.transitions = self.transitions(*state);
            vs.conditional_outputs = scope.conditional_outputs();
            tree.split_state(&mut physical, vs, &mut state_map);
        }

        if physical.len() > stew.count {
            return Err(CompileError::capacity(
                format!(
                    "{} physical states needed, the STEW holds {}",
                    physical.len(),
                    stew.count
                ),
                None,
            ));
        }

        for (slot, vs) in physical.iter().enumerate() {
            tree.write_state(&mut image.word_mut(slot), &stew, vs, &mut state_map)?;
        }

        let fallback = self.default.as_ref().unwrap_or(&self.global);
        for slot in physical.len()..stew.count {
            let index = slot as u32;
            let mut vs = VirtualState::new(index, None);
            vs.conditional_outputs = fallback.conditional_outputs();
            vs.transitions = self.transitions(index);
            tree.write_state(&mut image.word_mut(slot), &stew, &vs, &mut state_map)?;
        }
        Ok(())
    }

    /// Conjunction of every open non-state branch on the path to the
    /// visible node, negated where the false side is visited.
    fn path_guard(&self) -> Expr {
        let mut guard: Option<Expr> = None;
        for &(branch, side) in self.scopes.iter().rev() {
            let Node::Branch {
                cond: Condition::Expr(e),
                ..
            } = &self.nodes[branch]
            else {
                continue;
            };
            let term = if side == 0 {
                e.clone().into_logic()
            } else {
                Expr::logic_not(e.clone())
            };
            guard = Some(match guard {
                None => term,
                Some(g) => Expr::logic_and(g, term),
            });
        }
        guard.unwrap_or(Expr::True)
    }

    fn leaves(&self, from: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            match &self.nodes[id] {
                Node::Branch { links, .. } => stack.extend([links[1], links[0]]),
                Node::Leaf { .. } => out.push(id),
            }
        }
        out
    }

    fn clone_subtree(&mut self, id: NodeId) -> NodeId {
        let node = self.nodes[id].clone();
        let node = match node {
            Node::Branch { cond, links } => {
                let t = self.clone_subtree(links[0]);
                let f = self.clone_subtree(links[1]);
                Node::Branch { cond, links: [t, f] }
            }
            leaf => leaf,
        };
        self.nodes.alloc(node)
    }

    /// Structural equality; branch conditions are not compared.
    fn subtree_eq(&self, a: NodeId, b: NodeId) -> bool {
        match (&self.nodes[a], &self.nodes[b]) {
            (Node::Branch { links: la, .. }, Node::Branch { links: lb, .. }) => {
                self.subtree_eq(la[0], lb[0]) && self.subtree_eq(la[1], lb[1])
            }
            (
                Node::Leaf {
                    output: oa,
                    target: ta,
                },
                Node::Leaf {
                    output: ob,
                    target: tb,
                },
            ) => ta == tb && oa.equals(ob),
            _ => false,
        }
    }
}
