use super::*;
use crate::chemistry::{
    compounds_are_equal, decode, encode, ChemError, ReagentIon, SpeciesRegistry,
};

#[test]
fn test_exact_combination_has_zero_ppm() -> Result<(), ChemError> {
    let registry = SpeciesRegistry::new();
    let resolver = Resolver::new(&registry);
    let methane = encode(&registry, "CH4")?;
    let target = methane.mass(&registry);

    let candidates = resolver.search(target, ReagentIon::Ammonium)?;
    let hit = candidates
        .iter()
        .find(|c| compounds_are_equal(&c.compound, &methane))
        .expect("CH4 should be enumerated");
    assert!(hit.ppm_error(target).abs() < 1e-6);
    assert!((hit.theoretical_mass - target).abs() < 1e-9);

    Ok(())
}

#[test]
fn test_candidates_within_tolerance() -> Result<(), ChemError> {
    let registry = SpeciesRegistry::new();
    let resolver = Resolver::new(&registry);
    let target = 46.04186;

    let candidates = resolver.search(target, ReagentIon::Ammonium)?;
    assert!(!candidates.is_empty());
    for candidate in &candidates {
        assert!(candidate.ppm_error(target).abs() <= DEFAULT_PPM_TOLERANCE);
        assert!((candidate.compound.mass(&registry) - candidate.theoretical_mass).abs() < 1e-6);
    }

    let ethanol = encode(&registry, "C2H6O")?;
    assert!(candidates
        .iter()
        .any(|c| compounds_are_equal(&c.compound, &ethanol)));

    Ok(())
}

#[test]
fn test_search_respects_mask() -> Result<(), ChemError> {
    let registry = SpeciesRegistry::new();
    let resolver = Resolver::new(&registry);
    let mask = registry.mask_for(ReagentIon::Ammonium);

    for target in [31.0184, 59.0497, 88.0524] {
        for candidate in resolver.search(target, ReagentIon::Ammonium)? {
            for idx in 0..crate::chemistry::TOTAL_SPECIES {
                if !mask.contains(idx) {
                    assert_eq!(candidate.compound.count(idx), 0);
                }
            }
        }
    }

    Ok(())
}

#[test]
fn test_nitrosyl_reaches_halogens() -> Result<(), ChemError> {
    let registry = SpeciesRegistry::new();
    let resolver = Resolver::new(&registry);
    let chloromethane = encode(&registry, "CH3Cl")?;
    let target = chloromethane.mass(&registry);

    let nitrosyl = resolver.search(target, ReagentIon::Nitrosyl)?;
    assert!(nitrosyl
        .iter()
        .any(|c| compounds_are_equal(&c.compound, &chloromethane)));

    let ammonium = resolver.search(target, ReagentIon::Ammonium)?;
    assert!(!ammonium
        .iter()
        .any(|c| compounds_are_equal(&c.compound, &chloromethane)));

    Ok(())
}

#[test]
fn test_no_duplicate_multisets() -> Result<(), ChemError> {
    let registry = SpeciesRegistry::new();
    let resolver = Resolver::new(&registry);

    let candidates = resolver.search(60.02113, ReagentIon::Ammonium)?;
    let mut formulas: Vec<String> = candidates
        .iter()
        .map(|c| decode(&registry, &c.compound))
        .collect();
    let total = formulas.len();
    formulas.sort();
    formulas.dedup();
    assert_eq!(formulas.len(), total);

    Ok(())
}

#[test]
fn test_small_and_negative_targets_terminate() -> Result<(), ChemError> {
    let registry = SpeciesRegistry::new();
    let resolver = Resolver::new(&registry);

    assert!(resolver.search(0.0, ReagentIon::Nitrosyl)?.is_empty());
    assert!(resolver.search(-5.0, ReagentIon::Nitrosyl)?.is_empty());

    Ok(())
}

#[test]
fn test_non_finite_target_rejected() {
    let registry = SpeciesRegistry::new();
    let resolver = Resolver::new(&registry);

    for target in [f64::NAN, f64::INFINITY] {
        assert!(matches!(
            resolver.search(target, ReagentIon::Ammonium),
            Err(ChemError::InvalidArgument(_))
        ));
    }
}

#[test]
fn test_node_budget_truncates() -> Result<(), ChemError> {
    let registry = SpeciesRegistry::new();
    let config = SearchConfig::default().with_max_nodes(50);
    let resolver = Resolver::with_config(&registry, config);

    let outcome = resolver.search_with_stats(250.0, ReagentIon::Nitrosyl)?;
    assert!(outcome.truncated);
    assert_eq!(outcome.nodes_visited, 50);

    let full = Resolver::new(&registry).search_with_stats(16.0313, ReagentIon::Ammonium)?;
    assert!(!full.truncated);

    Ok(())
}

#[test]
fn test_deep_target_runs_on_small_stack() {
    // The all-hydrogen branch alone is ~19 800 species deep
    let handle = std::thread::Builder::new()
        .stack_size(256 * 1024)
        .spawn(|| {
            let registry = SpeciesRegistry::new();
            let config = SearchConfig::default().with_max_nodes(100_000);
            Resolver::with_config(&registry, config)
                .search_with_stats(2.0e4, ReagentIon::Ammonium)
                .map(|outcome| {
                    let tolerance = config.ppm_tolerance;
                    let in_window = outcome
                        .candidates
                        .iter()
                        .all(|c| c.ppm_error(2.0e4).abs() <= tolerance);
                    (outcome.candidates.len(), outcome.truncated, in_window)
                })
        })
        .unwrap();

    let (found, truncated, in_window) = handle.join().unwrap().unwrap();
    assert!(found > 0);
    assert!(truncated);
    assert!(in_window);
}

#[test]
fn test_invalid_config_rejected() {
    let registry = SpeciesRegistry::new();
    let config = SearchConfig {
        max_nodes: 0,
        ..SearchConfig::default()
    };
    let resolver = Resolver::with_config(&registry, config);
    assert!(resolver.search(16.0, ReagentIon::Ammonium).is_err());

    let config = SearchConfig::default().with_ppm_tolerance(f64::NAN);
    assert!(config.validate().is_err());
}

#[test]
fn test_strict_window_is_subset() -> Result<(), ChemError> {
    let registry = SpeciesRegistry::new();
    let target = 74.0368;
    let wide = Resolver::new(&registry).search(target, ReagentIon::Ammonium)?;
    let narrow =
        Resolver::with_config(&registry, SearchConfig::strict()).search(target, ReagentIon::Ammonium)?;

    assert!(narrow.len() <= wide.len());
    for candidate in &narrow {
        assert!(wide
            .iter()
            .any(|w| compounds_are_equal(&w.compound, &candidate.compound)));
    }

    Ok(())
}
