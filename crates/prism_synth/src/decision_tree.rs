//! The state table compiler.
//!
//! A [`DecisionTree`] knows the component budget of one STEW word. It splits
//! virtual states whose transitions do not fit into chains of physical words
//! and writes each physical word: output and jump fields, the fall-through
//! flag, the lookup tables of every component, and the multiplexer selects
//! that wire design inputs onto component pins.

use prism_arch::{Component, FieldKind, Stew, StewItem, WireMap};
use prism_common::{
    ones, Bitmask, BitmaskSlice, CompileError, DynamicBitmask, MappedGroup, PrismResult,
    SliceGroup,
};
use prism_config::HardwareConfig;
use prism_ir::{Expr, VirtualState};
use std::collections::BTreeMap;
use tracing::debug;

/// Maps a state id to the physical word its first half occupies.
pub type StateMap = BTreeMap<u32, usize>;

/// The per-word component budget and wiring of one chip variant.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    wires: WireMap,
    components: Vec<Component>,
    n_static: usize,
    n_inputs: usize,
}

impl DecisionTree {
    /// Builds the compiler for `config`.
    ///
    /// Fails if the wire map does not resolve or a component's input window
    /// reaches past the virtual input space.
    pub fn new(config: &HardwareConfig) -> PrismResult<Self> {
        let wires = config.wire_map()?;
        let components: Vec<Component> = config.components().copied().collect();
        if let Some(c) = components
            .iter()
            .find(|c| c.input_offset + c.input_size > wires.virtual_inputs())
        {
            return Err(CompileError::mismatch(format!(
                "component inputs {}+{} outside the {} virtual inputs",
                c.input_offset,
                c.input_size,
                wires.virtual_inputs()
            )));
        }
        Ok(Self {
            wires,
            components,
            n_static: config.decision_tree.static_components.len(),
            n_inputs: config.muxes.inputs(),
        })
    }

    /// Returns the number of transition slots per word.
    pub fn static_components(&self) -> usize {
        self.n_static
    }

    /// Returns the number of conditional output components.
    pub fn conditional_components(&self) -> usize {
        self.components.len() - self.n_static
    }

    /// Returns the number of design inputs the multiplexers can select.
    pub fn design_inputs(&self) -> usize {
        self.n_inputs
    }

    /// Splits `vs` into as many physical states as its transitions need and
    /// appends them to `out`.
    ///
    /// The first `S` transitions stay in the upper state, which is marked
    /// partial and records the steady-state output of the remainder; the
    /// remainder continues in the next word. A remainder of `S + 1`
    /// transitions ending in a fall-through fits as is, because the
    /// fall-through needs no jump field. `state_map` records the word of
    /// the upper state.
    pub fn split_state(
        &self,
        out: &mut Vec<VirtualState>,
        mut vs: VirtualState,
        state_map: &mut StateMap,
    ) {
        state_map.insert(vs.index, out.len());

        while vs.transitions.len() > self.n_static {
            if vs.transitions.len() == self.n_static + 1
                && vs.transitions.last().is_some_and(|x| x.is_fallthrough(vs.index))
            {
                break;
            }

            let mut lower = VirtualState::new(vs.index, vs.pos.clone());
            lower.transitions = vs.transitions.split_off(self.n_static);
            lower.conditional_outputs = vs.conditional_outputs.clone();
            vs.partial_output = lower.steady_state();
            vs.partial = true;
            out.push(vs);
            vs = lower;
        }
        out.push(vs);
    }

    fn fits(&self, vs: &VirtualState) -> bool {
        let n = vs.transitions.len();
        n <= self.n_static
            || (n == self.n_static + 1
                && vs.transitions.last().is_some_and(|x| x.is_fallthrough(vs.index)))
    }

    /// Writes one physical state into `word`.
    ///
    /// A jump to a state missing from `state_map` is only allowed when it
    /// targets `vs` itself, in which case the state id doubles as its word
    /// index and is recorded.
    pub fn write_state(
        &self,
        word: &mut dyn Bitmask,
        stew: &Stew,
        vs: &VirtualState,
        state_map: &mut StateMap,
    ) -> PrismResult<()> {
        let n_components = self.components.len();
        let n_virtual = self.wires.virtual_inputs();
        let pos = &vs.pos;

        debug!(
            "STATE {}{}: ({} transitions, {} conditional outputs)",
            vs.index,
            if vs.partial { " (partial)" } else { "" },
            vs.transitions.len(),
            vs.conditional_outputs.len()
        );

        if !self.fits(vs) {
            return Err(CompileError::capacity(
                format!(
                    "state {} has {} transitions, a word holds {}",
                    vs.index,
                    vs.transitions.len(),
                    self.n_static
                ),
                pos.clone(),
            ));
        }

        let mut exprs: Vec<Option<&Expr>> = vec![None; n_components];

        debug!("  Breakdown:");
        for (comp, x) in vs.transitions.iter().enumerate() {
            debug!("    {x}");
            let out_field = stew.require(FieldKind::Out, comp)?;

            if comp != self.n_static {
                let jmp = stew.require(FieldKind::Jmp, comp)?;
                let slot = match state_map.get(&x.state).copied() {
                    Some(slot) => slot,
                    None if x.state == vs.index => {
                        state_map.insert(vs.index, vs.index as usize);
                        vs.index as usize
                    }
                    None => {
                        return Err(CompileError::UndefinedJumpTarget {
                            target: x.state,
                            pos: pos.clone(),
                        })
                    }
                };
                if (slot as u64).checked_shr(jmp.size as u32).unwrap_or(0) != 0 {
                    return Err(CompileError::capacity(
                        format!("word {slot} does not fit the {}-bit JMP field", jmp.size),
                        pos.clone(),
                    ));
                }
                BitmaskSlice::new(word, jmp.offset, jmp.size).write_integer(slot as u64)?;
                exprs[comp] = Some(&x.guard);
            }

            write_field(word, out_field, &x.output)?;
        }

        if vs.partial {
            let inc = stew.require(FieldKind::Inc, 0)?;
            let out_field = stew.require(FieldKind::Out, vs.transitions.len())?;
            write_field(word, out_field, &vs.partial_output)?;
            word.set(inc.offset)?;
        }

        for cout in &vs.conditional_outputs {
            debug!("    {cout}");
            let comp = self.n_static + cout.output as usize;
            if comp >= n_components {
                return Err(CompileError::capacity(
                    format!("conditional output {} has no component", cout.output),
                    pos.clone(),
                ));
            }
            exprs[comp] = Some(&cout.expr);
        }

        // design input -> pins of every component that reads it
        let mut req = vec![DynamicBitmask::new(); self.n_inputs];
        let mut req_count = vec![0usize; self.n_inputs];
        let mut comp_mapping = vec![0usize; n_virtual];
        for (comp, c) in self.components.iter().enumerate() {
            let inputs = exprs[comp].map(Expr::inputs).unwrap_or_default();
            if inputs.count() > c.input_size {
                return Err(CompileError::capacity(
                    format!(
                        "component {comp} reads {} inputs but has {} pins",
                        inputs.count(),
                        c.input_size
                    ),
                    pos.clone(),
                ));
            }
            for i in ones(&inputs) {
                if i >= self.n_inputs {
                    return Err(CompileError::capacity(
                        format!("input {i} is beyond the {} selectable inputs", self.n_inputs),
                        pos.clone(),
                    ));
                }
                for bit in 0..c.input_size {
                    req[i].insert(c.input_offset + bit);
                }
                req_count[i] += 1;
            }
            for bit in 0..c.input_size {
                comp_mapping[c.input_offset + bit] = comp;
            }
        }

        let mut wire_mapping: Vec<Option<usize>> = vec![None; n_virtual];
        let mut used = DynamicBitmask::new();
        for i in 0..self.n_inputs {
            while req_count[i] > 0 {
                // a virtual input can only be used once
                let mut mask = req[i].clone();
                for bit in ones(&used) {
                    mask.put(bit, false);
                }

                let which = self.wires.best_fit(&mask, req_count[i]).ok_or_else(|| {
                    CompileError::NoSuitableWire {
                        inputs: req[i].to_string(),
                        pos: pos.clone(),
                    }
                })?;

                for v in which {
                    let c = &self.components[comp_mapping[v]];
                    if req[i].get(v) {
                        req_count[i] -= 1;
                    }
                    for bit in 0..c.input_size {
                        req[i].put(c.input_offset + bit, false);
                    }
                    wire_mapping[v] = Some(i);
                    used.insert(v);
                }
            }
        }

        debug!("  Components:");
        // unallocated pins observe a scratch input no expression reads
        let pins = MappedGroup::from_indices(
            wire_mapping
                .iter()
                .enumerate()
                .map(|(v, w)| w.unwrap_or(self.n_inputs + v))
                .collect(),
        );
        for (comp, c) in self.components.iter().enumerate() {
            let group = SliceGroup::new(&pins, c.input_offset, c.input_size);
            let cfg = stew.require(FieldKind::Cfg, comp)?;
            let default = Expr::literal(comp < self.n_static);
            let mut table = BitmaskSlice::new(word, cfg.offset, cfg.size);
            c.program(&mut table, &group, exprs[comp].unwrap_or(&default))?;
        }

        debug!("  Wire mapping:");
        for (v, w) in wire_mapping.iter().enumerate() {
            let real = w.map_or_else(|| " -".to_string(), |w| format!("{w:2}"));
            debug!(
                "    WIRE (virtual -> real) = {{ {v:2} -> {real} }}[ Component {:2} ]",
                comp_mapping[v]
            );
        }

        self.wires.write(word, stew, &wire_mapping)
    }
}

/// Copies the low `item.size` bits of `bits` into the field.
fn write_field(word: &mut dyn Bitmask, item: &StewItem, bits: &dyn Bitmask) -> PrismResult<()> {
    let mut slice = BitmaskSlice::new(word, item.offset, item.size);
    for i in 0..item.size {
        slice.write(i, bits.get(i))?;
    }
    Ok(())
}
