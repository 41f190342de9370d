//! Fan-out of physical multiplexers onto virtual component inputs.
//!
//! Every virtual component input is driven by exactly one multiplexer, but a
//! multiplexer may drive several virtual inputs. The explicit mapping table
//! lists the shared ones; every other virtual input `v` is driven by
//! multiplexer `v - k`, where `k` is the number of explicitly mapped virtual
//! inputs below `v`.

use crate::input_mux::{InputMux, MuxConfig};
use crate::stew::Stew;
use prism_common::{ones, Bitmask, CompileError, PrismResult};

/// Resolved multiplexer fan-out and the wire allocation heuristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireMap {
    muxes: InputMux,
    mappings: Vec<(usize, usize)>,
    full_map: Vec<usize>,
    counts: Vec<usize>,
}

impl WireMap {
    /// Resolves the fan-out of `n_virtual` virtual inputs.
    ///
    /// `mappings` holds `(virtual input, mux)` pairs. Fails if a mapping
    /// names the same virtual input twice or any virtual input resolves to a
    /// multiplexer outside the bank.
    pub fn new(
        config: MuxConfig,
        n_virtual: usize,
        mappings: &[(usize, usize)],
    ) -> PrismResult<Self> {
        let mut mappings = mappings.to_vec();
        mappings.sort_unstable();
        if let Some(w) = mappings.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(CompileError::mismatch(format!(
                "wire-map lists virtual input {} twice",
                w[0].0
            )));
        }

        let mut map = Self {
            muxes: InputMux::new(config),
            mappings,
            full_map: Vec::with_capacity(n_virtual),
            counts: vec![0; config.count],
        };
        for v in 0..n_virtual {
            let mux = map.lookup(v);
            if mux >= config.count {
                return Err(CompileError::mismatch(format!(
                    "virtual input {v} resolves to mux {mux}, only {} muxes exist",
                    config.count
                )));
            }
            map.full_map.push(mux);
            map.counts[mux] += 1;
        }
        Ok(map)
    }

    /// Returns the multiplexer that drives virtual input `id`.
    pub fn lookup(&self, id: usize) -> usize {
        match self.mappings.binary_search_by_key(&id, |&(v, _)| v) {
            Ok(i) => self.mappings[i].1,
            Err(below) => id - below,
        }
    }

    /// Returns the multiplexer bank.
    pub fn muxes(&self) -> &InputMux {
        &self.muxes
    }

    /// Returns the number of virtual inputs.
    pub fn virtual_inputs(&self) -> usize {
        self.full_map.len()
    }

    /// Returns the multiplexer driving each virtual input.
    pub fn full_map(&self) -> &[usize] {
        &self.full_map
    }

    /// Returns the number of virtual inputs each multiplexer drives.
    pub fn fan_out(&self, mux: usize) -> usize {
        self.counts[mux]
    }

    /// Picks the multiplexer best suited to serve the demand in `outputs`.
    ///
    /// `outputs` marks the still-available virtual inputs of every component
    /// that needs the design input being placed; `nparty` is the number of
    /// such components. A multiplexer whose whole fan-out is wanted and which
    /// satisfies every party at once wins immediately. Otherwise candidates
    /// score one point each for having their fan-out fully wanted, for
    /// satisfying every party, and for being shared when more than one party
    /// waits. Returns every virtual input driven by the winner, or `None`
    /// when no multiplexer is wanted at all.
    pub fn best_fit(&self, outputs: &dyn Bitmask, nparty: usize) -> Option<Vec<usize>> {
        let mut table = vec![0usize; self.counts.len()];
        for r in ones(outputs) {
            if let Some(&mux) = self.full_map.get(r) {
                table[mux] += 1;
            }
        }

        let mut best_score = 0;
        let mut best_mux = 0;
        for (mux, &wanted) in table.iter().enumerate() {
            if wanted == 0 {
                continue;
            }
            let mut score = 1;
            if self.counts[mux] == wanted {
                if wanted == nparty {
                    best_score = 0xff;
                    best_mux = mux;
                    break;
                }
                score += 1;
            }
            if wanted == nparty {
                score += 1;
            }
            if nparty != 1 && wanted != 1 {
                score += 1;
            }
            if score > best_score {
                best_score = score;
                best_mux = mux;
            }
        }

        if best_score == 0 {
            return None;
        }
        Some(
            self.full_map
                .iter()
                .enumerate()
                .filter(|&(_, &mux)| mux == best_mux)
                .map(|(v, _)| v)
                .collect(),
        )
    }

    /// Programs the multiplexer selections of one STEW word.
    ///
    /// `wire_mapping[v]` is the design input allocated to virtual input `v`,
    /// or `None` if `v` is unused in this word. Multiplexers with no
    /// allocated virtual input select input 0. Fails if two virtual inputs
    /// sharing a multiplexer were given different design inputs.
    pub fn write(
        &self,
        word: &mut dyn Bitmask,
        stew: &Stew,
        wire_mapping: &[Option<usize>],
    ) -> PrismResult<()> {
        let mut selects: Vec<Option<usize>> = vec![None; self.counts.len()];
        for (v, &mux) in self.full_map.iter().enumerate() {
            let Some(input) = wire_mapping.get(v).copied().flatten() else {
                continue;
            };
            match selects[mux] {
                Some(prev) if prev != input => {
                    return Err(CompileError::internal(format!(
                        "mux {mux} driven by inputs {prev} and {input}"
                    )));
                }
                _ => selects[mux] = Some(input),
            }
        }
        let selects: Vec<usize> = selects.into_iter().map(|s| s.unwrap_or(0)).collect();
        self.muxes.write(word, stew, &selects)
    }
}
