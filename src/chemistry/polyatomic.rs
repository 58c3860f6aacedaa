//! Factoring polyatomic groups in and out of encoded compounds, and reagent-ion
//! consistency checks.

use super::compound::EncodedCompound;
use super::registry::{ReagentIon, SpeciesRegistry, POLYATOMIC_START_IDX, TOTAL_SPECIES};

/// Number of polyatomic groups (counted from [`POLYATOMIC_START_IDX`]) that
/// [`unsimplify`] tries to factor out. Only NH4 is folded in.
pub const FACTORED_GROUPS: usize = 1;

/// Factor polyatomic groups out of a purely elemental compound.
///
/// For each factored group whose elemental recipe fits inside the compound,
/// one unit of the group is added and the recipe subtracted. At most one unit
/// per group is folded in per call.
pub fn unsimplify(registry: &SpeciesRegistry, compound: &EncodedCompound) -> EncodedCompound {
    let mut factored = *compound;

    for group_idx in POLYATOMIC_START_IDX..POLYATOMIC_START_IDX + FACTORED_GROUPS {
        let Some(recipe) = registry.recipe(group_idx) else {
            continue;
        };

        let contains_group = (0..TOTAL_SPECIES).all(|k| factored.count(k) >= recipe.count(k));
        if !contains_group {
            continue;
        }

        factored.add_count(group_idx, 1);
        for k in 0..TOTAL_SPECIES {
            factored.set_count(k, factored.count(k) - recipe.count(k));
        }
    }

    factored
}

/// [`unsimplify`] applied row by row
pub fn unsimplify_all(
    registry: &SpeciesRegistry,
    compounds: &[EncodedCompound],
) -> Vec<EncodedCompound> {
    compounds
        .iter()
        .map(|compound| unsimplify(registry, compound))
        .collect()
}

/// Expand every polyatomic group into its elemental recipe
pub fn simplify(registry: &SpeciesRegistry, compound: &EncodedCompound) -> EncodedCompound {
    let mut simplified = EncodedCompound::empty();
    for idx in 0..POLYATOMIC_START_IDX {
        simplified.set_count(idx, compound.count(idx));
    }

    for group_idx in POLYATOMIC_START_IDX..TOTAL_SPECIES {
        let n_groups = compound.count(group_idx);
        if n_groups == 0 {
            continue;
        }
        if let Some(recipe) = registry.recipe(group_idx) {
            for k in 0..TOTAL_SPECIES {
                simplified.add_count(k, recipe.count(k).saturating_mul(n_groups));
            }
        }
    }

    simplified
}

/// [`simplify`] applied row by row
pub fn simplify_all(
    registry: &SpeciesRegistry,
    compounds: &[EncodedCompound],
) -> Vec<EncodedCompound> {
    compounds
        .iter()
        .map(|compound| simplify(registry, compound))
        .collect()
}

/// True when every non-group species outside the ion's mask has a zero count
pub fn uses_reagent_ion(
    registry: &SpeciesRegistry,
    compound: &EncodedCompound,
    ion: ReagentIon,
) -> bool {
    let mask = registry.mask_for(ion);
    (0..POLYATOMIC_START_IDX)
        .filter(|&idx| !mask.contains(idx))
        .all(|idx| compound.count(idx) == 0)
}

/// First configured reagent ion the compound is consistent with
pub fn find_reagent_ion(registry: &SpeciesRegistry, compound: &EncodedCompound) -> Option<ReagentIon> {
    registry
        .reagent_ions()
        .iter()
        .copied()
        .find(|&ion| uses_reagent_ion(registry, compound, ion))
}
