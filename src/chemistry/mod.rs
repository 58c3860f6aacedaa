//! # Chemistry Module
//!
//! Species registry, fixed-point compound encoding and the formula-level
//! transforms built on top of them.
//!
//! ## Layout
//!
//! 1. **Registry**: the 13 searchable species (8 elements, the charge
//!    correction and 4 polyatomic adduct groups), their masses, the display
//!    permutation and the per-reagent-ion search masks.
//!
//! 2. **Compound**: [`EncodedCompound`], one exact unit count per species, with
//!    the `0.01` scaled view used by feature rows.
//!
//! 3. **Codec**: formula text to compound and back.
//!
//! 4. **Polyatomic**: factoring adduct groups in and out, reagent-ion inference.
//!
//! 5. **Criteria**: hydrogen parity and bound rules.

mod codec;
mod compound;
mod criteria;
mod error;
mod polyatomic;
mod registry;

pub use codec::{decode, decode_all, decode_scaled, elemental_recipe, encode, encode_all};
pub use compound::{
    compound_mass, compounds_are_equal, get_ppm, scaled_compounds_are_equal, scaled_to_count,
    EncodedCompound, CHEM_SCALE_FACTOR,
};
pub use criteria::{check_criteria, CriteriaResult};
pub use error::ChemError;
pub use polyatomic::{
    find_reagent_ion, simplify, simplify_all, unsimplify, unsimplify_all, uses_reagent_ion,
    FACTORED_GROUPS,
};
pub use registry::{
    IonMask, ReagentIon, Species, SpeciesKind, SpeciesRegistry, CHARGE_IDX, N_CRITERIA,
    POLYATOMIC_START_IDX, TOTAL_SPECIES,
};
