//! # Search Module
//!
//! Branch-and-bound enumeration of species combinations matching an observed
//! mass. The reagent ion's mask restricts which species can be chosen; the
//! search never records charge corrections or polyatomic groups, those are
//! folded in afterwards by [`crate::chemistry::unsimplify`].

mod config;
mod resolver;

#[cfg(test)]
mod tests;

pub use config::{SearchConfig, DEFAULT_MAX_NODES, DEFAULT_PPM_TOLERANCE, DEFAULT_PRUNING_SLACK};
pub use resolver::{CandidatePermutation, Resolver, SearchOutcome};
