#![no_main]

use libfuzzer_sys::fuzz_target;
use mzresolve::chemistry::SpeciesRegistry;
use mzresolve::dataset::PeakList;

fuzz_target!(|data: &[u8]| {
    // Malformed peak lists must surface as errors
    if let Ok(peaks) = PeakList::from_reader(data) {
        let registry = SpeciesRegistry::new();
        let _ = peaks.encode_assignments(&registry);
    }
});
