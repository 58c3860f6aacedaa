use serde::Serialize;

use crate::chemistry::{
    get_ppm, ChemError, EncodedCompound, ReagentIon, SpeciesRegistry, TOTAL_SPECIES,
};

use super::config::SearchConfig;

/// One combination of species whose mass lies within tolerance of the target
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CandidatePermutation {
    /// Elemental counts of the combination (no polyatomic groups)
    pub compound: EncodedCompound,
    /// Sum of the chosen species' masses
    pub theoretical_mass: f64,
}

impl CandidatePermutation {
    /// ppm error of this candidate against an observed mass
    pub fn ppm_error(&self, observed_mz: f64) -> f64 {
        get_ppm(observed_mz, self.theoretical_mass)
    }
}

/// Candidates plus bookkeeping from one search
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Recorded candidates in discovery order
    pub candidates: Vec<CandidatePermutation>,
    /// Search nodes visited
    pub nodes_visited: usize,
    /// True if the node budget ran out before the tree was exhausted
    pub truncated: bool,
}

/// Mass-constrained enumeration of species combinations.
///
/// The search is a depth-first walk over combinations with repetition of the
/// species reachable under a reagent ion, visited in ascending registry index
/// order. A branch is recorded (and not extended) as soon as the mass chosen
/// so far is within `ppm_tolerance` of the target. A species is skipped when
/// taking it would overshoot the target by `pruning_slack` or more.
#[derive(Debug, Clone)]
pub struct Resolver<'a> {
    registry: &'a SpeciesRegistry,
    config: SearchConfig,
}

impl<'a> Resolver<'a> {
    /// Resolver with the default configuration
    pub fn new(registry: &'a SpeciesRegistry) -> Self {
        Self::with_config(registry, SearchConfig::default())
    }

    /// Resolver with an explicit configuration
    pub fn with_config(registry: &'a SpeciesRegistry, config: SearchConfig) -> Self {
        Self { registry, config }
    }

    /// Registry the resolver searches over
    pub fn registry(&self) -> &'a SpeciesRegistry {
        self.registry
    }

    /// Active configuration
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Enumerate every candidate for `target_mass` under `ion`
    pub fn search(
        &self,
        target_mass: f64,
        ion: ReagentIon,
    ) -> Result<Vec<CandidatePermutation>, ChemError> {
        Ok(self.search_with_stats(target_mass, ion)?.candidates)
    }

    /// Like [`Resolver::search`], also reporting how much of the tree was walked
    pub fn search_with_stats(
        &self,
        target_mass: f64,
        ion: ReagentIon,
    ) -> Result<SearchOutcome, ChemError> {
        if !target_mass.is_finite() {
            return Err(ChemError::InvalidArgument(format!(
                "target mass must be finite, got {}",
                target_mass
            )));
        }
        self.config.validate()?;

        let mut walk = SearchWalk {
            target: target_mass,
            masses: self.registry.all_masses(),
            order: self.registry.mask_for(ion).iter().collect(),
            config: &self.config,
            nodes: 0,
            truncated: false,
            chosen: EncodedCompound::empty(),
            found: Vec::new(),
        };
        walk.run();

        if walk.truncated {
            log::warn!(
                "Search for m/z {:.6} ({}) stopped after {} nodes; keeping {} candidates",
                target_mass,
                ion,
                walk.nodes,
                walk.found.len()
            );
        }
        log::debug!(
            "m/z {:.6} ({}): {} candidates, {} nodes",
            target_mass,
            ion,
            walk.found.len(),
            walk.nodes
        );

        Ok(SearchOutcome {
            candidates: walk.found,
            nodes_visited: walk.nodes,
            truncated: walk.truncated,
        })
    }
}

struct SearchWalk<'w> {
    target: f64,
    masses: &'w [f64; TOTAL_SPECIES],
    order: Vec<usize>,
    config: &'w SearchConfig,
    nodes: usize,
    truncated: bool,
    chosen: EncodedCompound,
    found: Vec<CandidatePermutation>,
}

/// One open node of the walk; the path depth is bounded only by the target
/// mass, so nodes live on a heap stack rather than the call stack
struct Frame {
    /// Next position in `order` to try from this node
    next: usize,
    /// Target mass not yet covered by `chosen`
    remaining: f64,
    /// Species taken to reach this node, undone when the node is popped
    taken: Option<usize>,
}

impl SearchWalk<'_> {
    fn run(&mut self) {
        if !self.visit(self.target) {
            return;
        }
        let mut stack = vec![Frame {
            next: 0,
            remaining: self.target,
            taken: None,
        }];

        while let Some(frame) = stack.last_mut() {
            let mut step = None;
            while frame.next < self.order.len() {
                let pos = frame.next;
                frame.next += 1;
                let idx = self.order[pos];
                let next = frame.remaining - self.masses[idx];
                if next > -self.config.pruning_slack {
                    step = Some((pos, idx, next));
                    break;
                }
            }

            let Some((pos, idx, next)) = step else {
                if let Some(idx) = stack.pop().and_then(|frame| frame.taken) {
                    self.untake(idx);
                }
                continue;
            };

            self.chosen.add_count(idx, 1);
            if self.visit(next) {
                // Combinations with repetition: children start at the same position
                stack.push(Frame {
                    next: pos,
                    remaining: next,
                    taken: Some(idx),
                });
            } else {
                self.untake(idx);
            }

            if self.truncated {
                return;
            }
        }
    }

    /// Count a node against the budget and record it if it lands in the
    /// window. Returns whether the node should be extended.
    fn visit(&mut self, remaining: f64) -> bool {
        if self.nodes >= self.config.max_nodes {
            self.truncated = true;
            return false;
        }
        self.nodes += 1;

        let theoretical = self.target - remaining;
        if get_ppm(self.target, theoretical).abs() <= self.config.ppm_tolerance {
            self.found.push(CandidatePermutation {
                compound: self.chosen,
                theoretical_mass: theoretical,
            });
            return false;
        }
        true
    }

    fn untake(&mut self, idx: usize) {
        self.chosen.set_count(idx, self.chosen.count(idx) - 1);
    }
}
