//! Textual formula <-> encoded compound conversion.
//!
//! Formula grammar:
//!
//! - `(Sym)` optionally followed by a count: `Sym` is looked up directly in
//!   the registry (normally a polyatomic group such as `NH4`).
//! - `Sym` optionally followed by a count, where `Sym` is an uppercase letter
//!   with an optional lowercase letter, or the charge sign `+`.
//!
//! Parenthesized tokens are consumed first, left to right. Each one is cut out
//! of the string together with its count before the remaining flat run of
//! element/count pairs is scanned. Counts default to 1 and accumulate when a
//! symbol repeats.

use super::compound::EncodedCompound;
use super::error::ChemError;
use super::registry::{SpeciesRegistry, TOTAL_SPECIES};

/// Encode a single formula.
///
/// A formula that is exactly a registered polyatomic symbol (e.g. `"NH4"`)
/// encodes as one unit of that group. Groups whose symbol is also how
/// [`decode`] renders their elemental recipe (`"H2O"`, `"H3O"`) are excluded,
/// so those strings always encode elementally.
///
/// # Examples
///
/// ```
/// use mzresolve::chemistry::{encode, SpeciesRegistry};
///
/// let registry = SpeciesRegistry::new();
/// let compound = encode(&registry, "C2H6O").unwrap();
/// assert_eq!(compound.count(registry.index_of("C").unwrap()), 2);
/// assert_eq!(compound.count(registry.index_of("H").unwrap()), 6);
/// ```
pub fn encode(registry: &SpeciesRegistry, formula: &str) -> Result<EncodedCompound, ChemError> {
    let trimmed = formula.trim();
    if trimmed.is_empty() {
        return Err(ChemError::format(formula, "empty formula"));
    }

    let mut compound = EncodedCompound::empty();

    if let Some(group) = registry
        .polyatomics()
        .iter()
        .find(|s| s.symbol == trimmed && !decodes_to_own_symbol(registry, s.index))
    {
        compound.set_count(group.index, 1);
        return Ok(compound);
    }

    // Parenthesized pass; whatever is left over is collected for the flat pass
    let mut flat = String::with_capacity(trimmed.len());
    let mut remaining = trimmed;
    while let Some(open) = remaining.find('(') {
        flat.push_str(&remaining[..open]);
        let after_open = &remaining[open + 1..];
        let close = after_open
            .find(')')
            .ok_or_else(|| ChemError::format(formula, "unclosed '('"))?;
        let name = &after_open[..close];
        let idx = registry
            .index_of(name)
            .map_err(|_| ChemError::format(formula, format!("unknown group '({})'", name)))?;
        let (count, tail) = split_count(formula, &after_open[close + 1..])?;
        compound
            .checked_add_count(idx, count.unwrap_or(1))
            .ok_or_else(|| ChemError::format(formula, "count overflow"))?;
        remaining = tail;
    }
    flat.push_str(remaining);

    scan_elements(registry, formula, &flat, &mut compound)?;
    Ok(compound)
}

/// Encode several formulas, one compound per formula
pub fn encode_all<S: AsRef<str>>(
    registry: &SpeciesRegistry,
    formulas: &[S],
) -> Result<Vec<EncodedCompound>, ChemError> {
    formulas
        .iter()
        .map(|formula| encode(registry, formula.as_ref()))
        .collect()
}

/// Elemental composition of a symbol, obtained by scanning it as a flat formula
/// (`"NH4"` -> N1 H4). Used as the expansion recipe of polyatomic groups.
pub fn elemental_recipe(
    registry: &SpeciesRegistry,
    symbol: &str,
) -> Result<EncodedCompound, ChemError> {
    let mut compound = EncodedCompound::empty();
    scan_elements(registry, symbol, symbol, &mut compound)?;
    Ok(compound)
}

/// Render a compound as a formula in display order.
///
/// Elements print their count when it exceeds one. Polyatomic groups always
/// print as `(Sym)` without a count.
pub fn decode(registry: &SpeciesRegistry, compound: &EncodedCompound) -> String {
    let mut out = String::new();
    for &idx in registry.display_order() {
        let count = compound.count(idx);
        if count == 0 {
            continue;
        }

        let symbol = registry.all_species()[idx].symbol;
        if symbol.len() > 2 {
            out.push('(');
            out.push_str(symbol);
            out.push(')');
            continue;
        }

        out.push_str(symbol);
        if count > 1 {
            out.push_str(&count.to_string());
        }
    }
    out
}

/// Decode several compounds
pub fn decode_all(registry: &SpeciesRegistry, compounds: &[EncodedCompound]) -> Vec<String> {
    compounds
        .iter()
        .map(|compound| decode(registry, compound))
        .collect()
}

/// Decode a raw scaled row
pub fn decode_scaled(registry: &SpeciesRegistry, values: &[f64]) -> Result<String, ChemError> {
    if values.len() != TOTAL_SPECIES {
        return Err(ChemError::ShapeError {
            expected: TOTAL_SPECIES,
            actual: values.len(),
        });
    }
    let compound = EncodedCompound::from_scaled(values)?;
    Ok(decode(registry, &compound))
}

/// True when the flat rendering of a group's recipe is the group symbol itself
fn decodes_to_own_symbol(registry: &SpeciesRegistry, group_idx: usize) -> bool {
    registry.recipe(group_idx).is_some_and(|recipe| {
        decode(registry, recipe) == registry.all_species()[group_idx].symbol
    })
}

/// Split a leading decimal count off `text`
fn split_count<'a>(formula: &str, text: &'a str) -> Result<(Option<u32>, &'a str), ChemError> {
    let digits = text.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return Ok((None, text));
    }
    let count = text[..digits]
        .parse::<u32>()
        .map_err(|e| ChemError::format(formula, format!("bad count '{}': {}", &text[..digits], e)))?;
    Ok((Some(count), &text[digits..]))
}

fn scan_elements(
    registry: &SpeciesRegistry,
    formula: &str,
    text: &str,
    compound: &mut EncodedCompound,
) -> Result<(), ChemError> {
    let bytes = text.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let c = bytes[pos];
        let symbol_len = if c == b'+' {
            1
        } else if c.is_ascii_uppercase() {
            if bytes.get(pos + 1).is_some_and(|n| n.is_ascii_lowercase()) {
                2
            } else {
                1
            }
        } else {
            let unexpected = text[pos..].chars().next().unwrap_or_default();
            return Err(ChemError::format(
                formula,
                format!("unexpected character '{}'", unexpected),
            ));
        };

        let symbol = &text[pos..pos + symbol_len];
        let idx = registry
            .index_of(symbol)
            .map_err(|_| ChemError::format(formula, format!("unknown symbol '{}'", symbol)))?;
        let (count, tail) = split_count(formula, &text[pos + symbol_len..])?;
        compound
            .checked_add_count(idx, count.unwrap_or(1))
            .ok_or_else(|| ChemError::format(formula, "count overflow"))?;
        pos = text.len() - tail.len();
    }

    Ok(())
}
