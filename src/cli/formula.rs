use anyhow::{Context, Result};
use serde::Serialize;

use mzresolve::chemistry::{
    check_criteria, decode, encode, find_reagent_ion, simplify, unsimplify, CriteriaResult,
    ReagentIon, SpeciesRegistry,
};

#[derive(Serialize)]
struct FormulaReport {
    input: String,
    formula: String,
    unsimplified_formula: String,
    mass: f64,
    reagent_ion: Option<ReagentIon>,
    counts: Vec<(String, u32)>,
    criteria: CriteriaResult,
}

/// Inspect formulas: canonical form, adduct factoring, mass and criteria
pub fn run(formulas: Vec<String>, json: bool) -> Result<()> {
    let registry = SpeciesRegistry::new();

    let mut reports = Vec::with_capacity(formulas.len());
    for input in formulas {
        let encoded = encode(&registry, &input)
            .with_context(|| format!("Failed to parse formula: {}", input))?;
        let elemental = simplify(&registry, &encoded);
        let factored = unsimplify(&registry, &elemental);

        let counts = registry
            .display_order()
            .iter()
            .filter(|&&idx| elemental.count(idx) > 0)
            .filter_map(|&idx| {
                registry
                    .symbol(idx)
                    .map(|symbol| (symbol.to_string(), elemental.count(idx)))
            })
            .collect();

        reports.push(FormulaReport {
            formula: decode(&registry, &elemental),
            unsimplified_formula: decode(&registry, &factored),
            mass: elemental.mass(&registry),
            reagent_ion: find_reagent_ion(&registry, &elemental),
            counts,
            criteria: check_criteria(&registry, &factored),
            input,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        println!("{}", report.input);
        println!("  Formula:        {}", report.formula);
        println!("  Unsimplified:   {}", report.unsimplified_formula);
        println!("  Mass:           {:.6}", report.mass);
        match report.reagent_ion {
            Some(ion) => println!("  Reagent ion:    {}", ion),
            None => println!("  Reagent ion:    none"),
        }
        let counts: Vec<String> = report
            .counts
            .iter()
            .map(|(symbol, count)| format!("{}={}", symbol, count))
            .collect();
        println!("  Counts:         {}", counts.join(" "));
        println!(
            "  Criteria:       {:?} ({})",
            report.criteria.mask,
            if report.criteria.passed { "pass" } else { "fail" }
        );
        println!();
    }

    Ok(())
}
