//! # mzresolve - Elemental Formula Resolution for Reagent-Ion Mass Spectrometry
//!
//! `mzresolve` enumerates every combination of elements and adduct groups whose
//! mass falls within a ppm window of an observed peak, turns each candidate into
//! a fixed-width feature row, and builds labeled training data for a model that
//! ranks those candidates.
//!
//! ## Key Features
//!
//! - **Exact Encoding**: Compounds are stored as integer unit counts per species;
//!   feature rows carry the `0.01` scaled view, so equality never depends on
//!   floating-point noise.
//!
//! - **Reagent-Ion Aware Search**: Ammonium (NH4+) and nitrosyl (NO+) ionisation
//!   restrict the reachable species; the ion of an assigned formula is inferred
//!   from the elements it uses.
//!
//! - **Adduct Factoring**: NH4 groups are factored out of elemental formulas for
//!   the feature rows and expanded back for comparison and display.
//!
//! - **Parallel Dataset Building**: Peak lists are processed by a rayon worker
//!   pool writing through one mutex-guarded sink; the set of rows written does
//!   not depend on the thread count.
//!
//! ## Quick Start
//!
//! ```rust
//! use mzresolve::chemistry::{decode, simplify, ReagentIon, SpeciesRegistry};
//! use mzresolve::search::Resolver;
//!
//! let registry = SpeciesRegistry::new();
//! let resolver = Resolver::new(&registry);
//!
//! // Ethanol, C2H6O
//! let candidates = resolver.search(46.041865, ReagentIon::Ammonium)?;
//! assert!(candidates
//!     .iter()
//!     .any(|c| decode(&registry, &simplify(&registry, &c.compound)) == "C2H6O"));
//! # Ok::<(), mzresolve::chemistry::ChemError>(())
//! ```
//!
//! ## Feature Rows
//!
//! ```rust
//! use mzresolve::chemistry::{ReagentIon, SpeciesRegistry};
//! use mzresolve::features::{mz_to_data, DEFAULT_N_FEATURES};
//! use mzresolve::search::Resolver;
//!
//! let registry = SpeciesRegistry::new();
//! let resolver = Resolver::new(&registry);
//! let data = mz_to_data(&resolver, 46.041865, ReagentIon::Ammonium, DEFAULT_N_FEATURES)?;
//! assert_eq!(data.features.ncols(), DEFAULT_N_FEATURES);
//! assert_eq!(data.features.nrows(), data.encoded_compounds.len());
//! # Ok::<(), mzresolve::chemistry::ChemError>(())
//! ```
//!
//! ## Architecture
//!
//! - [`chemistry`]: species registry, compound codec, adduct factoring, criteria
//! - [`search`]: bounded combinatorial mass search
//! - [`features`]: feature-row assembly
//! - [`dataset`]: peak lists, combo files, downsampling and train/test splits
//! - [`inference`]: preprocessing and ranking around an injected scoring model
//!
//! ## Feature Row Layout
//!
//! | Columns | Content |
//! |---------|---------|
//! | 0..4 | Criteria flags (0.0 / 1.0) |
//! | 4..17 | Scaled species counts in registry order |
//! | 17..n-1 | Zero padding when wider rows are requested |
//! | n-1 | ppm error |

#![warn(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![allow(clippy::too_many_arguments)]

pub mod chemistry;
pub mod dataset;
pub mod features;
pub mod inference;
pub mod search;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::chemistry::{
        check_criteria, compound_mass, decode, encode, find_reagent_ion, get_ppm, simplify,
        unsimplify, ChemError, CriteriaResult, EncodedCompound, ReagentIon, SpeciesRegistry,
    };
    pub use crate::dataset::{
        BatchStats, BuilderConfig, DatasetBuilder, DatasetError, LabelBalance, PeakList,
    };
    pub use crate::features::{mz_to_data, MsData, DEFAULT_N_FEATURES};
    pub use crate::inference::{
        postprocess, preprocess, score_batch, score_peak, CandidateScorer, InferenceError,
        RankedCandidate,
    };
    pub use crate::search::{CandidatePermutation, Resolver, SearchConfig};
}
