#![no_main]

use libfuzzer_sys::fuzz_target;
use mzresolve::chemistry::{
    check_criteria, decode, encode, find_reagent_ion, simplify, unsimplify, SpeciesRegistry,
};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Parsing must either succeed or return an error, never panic
    let registry = SpeciesRegistry::new();
    if let Ok(compound) = encode(&registry, text) {
        let elemental = simplify(&registry, &compound);
        let factored = unsimplify(&registry, &elemental);
        let _ = decode(&registry, &factored);
        let _ = find_reagent_ion(&registry, &elemental);
        let _ = check_criteria(&registry, &factored);
    }
});
