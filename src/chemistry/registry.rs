//! The species registry: every chemical species the resolver knows about.
//!
//! The table is fixed at 13 entries (8 elements, the charge correction and 4
//! polyatomic adduct groups). Registry indices double as the column order of
//! encoded compounds and as the search order of the resolver, so the searchable
//! elements are laid out by ascending mass.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::codec::elemental_recipe;
use super::compound::EncodedCompound;
use super::error::ChemError;

/// Number of species in the registry (and length of every encoded compound)
pub const TOTAL_SPECIES: usize = 13;

/// Index of the charge-correction pseudo-species
pub const CHARGE_IDX: usize = 8;

/// First index of the polyatomic adduct groups; everything before it is
/// elemental (or the charge correction)
pub const POLYATOMIC_START_IDX: usize = 9;

/// Number of plausibility criteria evaluated per candidate
pub const N_CRITERIA: usize = 4;

/// Species table in registry order: (symbol, monoisotopic mass)
const SPECIES_TABLE: [(&str, f64); TOTAL_SPECIES] = [
    ("H", 1.00782503),
    ("C", 12.0),
    ("N", 14.003074),
    ("O", 15.99491462),
    ("F", 18.998403),
    ("Si", 28.0855),
    ("S", 31.97207117),
    ("Cl", 35.4532),
    ("+", -0.000548),
    ("NH4", 18.03437412),
    ("NH3", 17.02654909),
    ("H3O", 19.01838971),
    ("H2O", 18.01056468),
];

/// Rendering order: carbon first, then hydrogen and the heteroatoms, adduct
/// groups, and the charge correction last
const DISPLAY_ORDER: [usize; TOTAL_SPECIES] = [1, 0, 2, 3, 4, 5, 6, 7, 9, 10, 11, 12, 8];

/// What kind of entry a registry slot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeciesKind {
    /// A plain element
    Element,
    /// The electron-mass charge correction
    Charge,
    /// A polyatomic adduct group such as NH4
    Polyatomic,
}

/// A single registry entry
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Species {
    /// Chemical symbol, unique within the registry
    pub symbol: &'static str,
    /// Monoisotopic mass in Da
    pub mass: f64,
    /// Registry (search-order) index
    pub index: usize,
    /// Element, charge correction or polyatomic group
    pub kind: SpeciesKind,
}

impl Species {
    /// Polyatomic groups are rendered in parentheses by the codec
    pub fn is_polyatomic(&self) -> bool {
        self.kind == SpeciesKind::Polyatomic
    }
}

/// Supported reagent ions.
///
/// The variant order is the configured lookup order used when inferring the
/// ion of an assigned formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReagentIon {
    /// Ammonium (NH4+) chemical ionisation; only C, H, N and O are reachable
    #[serde(rename = "NH4")]
    Ammonium,
    /// Nitrosyl (NO+) chemical ionisation; all eight elements are reachable
    #[serde(rename = "NO")]
    Nitrosyl,
}

impl ReagentIon {
    /// All supported ions, in lookup order
    pub const ALL: [ReagentIon; 2] = [ReagentIon::Ammonium, ReagentIon::Nitrosyl];

    /// External name of the ion
    pub fn name(&self) -> &'static str {
        match self {
            ReagentIon::Ammonium => "NH4",
            ReagentIon::Nitrosyl => "NO",
        }
    }

    /// Returns all accepted names.
    pub fn variants() -> &'static [&'static str] {
        &["NH4", "NO"]
    }

    fn mask_symbols(&self) -> &'static [&'static str] {
        match self {
            ReagentIon::Ammonium => &["H", "C", "N", "O"],
            ReagentIon::Nitrosyl => &["H", "C", "N", "O", "F", "Si", "S", "Cl"],
        }
    }
}

impl fmt::Display for ReagentIon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReagentIon {
    type Err = ChemError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "NH4" => Ok(ReagentIon::Ammonium),
            "NO" => Ok(ReagentIon::Nitrosyl),
            other => Err(ChemError::InvalidArgument(format!(
                "Invalid reagent ion '{}'. Valid options: {}",
                other,
                ReagentIon::variants().join(", ")
            ))),
        }
    }
}

/// Ordered set of registry indices reachable under one reagent ion.
///
/// Stored as a bitset over the 13-slot universe, so iteration is always in
/// ascending index (and therefore ascending mass) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IonMask {
    bits: u16,
}

impl IonMask {
    fn from_indices(indices: impl IntoIterator<Item = usize>) -> Self {
        let bits = indices
            .into_iter()
            .filter(|&idx| idx < TOTAL_SPECIES)
            .fold(0u16, |acc, idx| acc | (1 << idx));
        Self { bits }
    }

    /// Whether `idx` is reachable
    pub fn contains(&self, idx: usize) -> bool {
        idx < TOTAL_SPECIES && self.bits & (1 << idx) != 0
    }

    /// Number of reachable species
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// True when no species is reachable
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Reachable indices in ascending order
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..TOTAL_SPECIES).filter(move |&idx| self.contains(idx))
    }
}

/// Immutable table of chemical species, display order and reagent-ion masks.
///
/// Build it once at start-up and pass it around by reference; nothing in it
/// changes after construction, so it can be shared freely across threads.
#[derive(Debug, Clone)]
pub struct SpeciesRegistry {
    species: [Species; TOTAL_SPECIES],
    masses: [f64; TOTAL_SPECIES],
    masks: [IonMask; ReagentIon::ALL.len()],
    recipes: [EncodedCompound; TOTAL_SPECIES - POLYATOMIC_START_IDX],
}

impl Default for SpeciesRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SpeciesRegistry {
    /// Build the registry with its 13 species and the per-ion masks
    pub fn new() -> Self {
        let species: [Species; TOTAL_SPECIES] = std::array::from_fn(|index| {
            let (symbol, mass) = SPECIES_TABLE[index];
            let kind = if index == CHARGE_IDX {
                SpeciesKind::Charge
            } else if index >= POLYATOMIC_START_IDX {
                SpeciesKind::Polyatomic
            } else {
                SpeciesKind::Element
            };
            Species {
                symbol,
                mass,
                index,
                kind,
            }
        });
        let masses = std::array::from_fn(|index| SPECIES_TABLE[index].1);

        let masks = ReagentIon::ALL.map(|ion| {
            IonMask::from_indices(ion.mask_symbols().iter().filter_map(|symbol| {
                SPECIES_TABLE.iter().position(|(s, _)| s == symbol)
            }))
        });

        let mut registry = Self {
            species,
            masses,
            masks,
            recipes: Default::default(),
        };

        // Group recipes come from scanning the group symbol as a flat formula
        let recipes = std::array::from_fn(|offset| {
            let symbol = SPECIES_TABLE[POLYATOMIC_START_IDX + offset].0;
            let recipe = elemental_recipe(&registry, symbol).unwrap_or_default();
            debug_assert!(!recipe.is_empty(), "group {} has no elemental recipe", symbol);
            recipe
        });
        registry.recipes = recipes;
        registry
    }

    /// Monoisotopic mass of a symbol
    pub fn mass_of(&self, symbol: &str) -> Result<f64, ChemError> {
        Ok(self.masses[self.index_of(symbol)?])
    }

    /// Registry index of a symbol
    pub fn index_of(&self, symbol: &str) -> Result<usize, ChemError> {
        self.species
            .iter()
            .position(|s| s.symbol == symbol)
            .ok_or_else(|| ChemError::LookupError(symbol.to_string()))
    }

    /// Species reachable under a reagent ion
    pub fn mask_for(&self, ion: ReagentIon) -> IonMask {
        self.masks[ion as usize]
    }

    /// Masses aligned to registry index
    pub fn all_masses(&self) -> &[f64; TOTAL_SPECIES] {
        &self.masses
    }

    /// Rendering permutation of the registry indices
    pub fn display_order(&self) -> &'static [usize; TOTAL_SPECIES] {
        &DISPLAY_ORDER
    }

    /// Supported reagent ions in lookup order
    pub fn reagent_ions(&self) -> &'static [ReagentIon] {
        &ReagentIon::ALL
    }

    /// Entry at a registry index
    pub fn species(&self, idx: usize) -> Option<&Species> {
        self.species.get(idx)
    }

    /// Symbol at a registry index
    pub fn symbol(&self, idx: usize) -> Option<&'static str> {
        self.species.get(idx).map(|s| s.symbol)
    }

    /// All entries in registry order
    pub fn all_species(&self) -> &[Species; TOTAL_SPECIES] {
        &self.species
    }

    /// Polyatomic group entries
    pub fn polyatomics(&self) -> &[Species] {
        &self.species[POLYATOMIC_START_IDX..]
    }

    /// Elemental composition of the polyatomic group at registry index `idx`
    pub fn recipe(&self, idx: usize) -> Option<&EncodedCompound> {
        idx.checked_sub(POLYATOMIC_START_IDX)
            .and_then(|offset| self.recipes.get(offset))
    }
}
