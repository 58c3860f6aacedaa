use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mzresolve::chemistry::{ReagentIon, SpeciesRegistry};
use mzresolve::dataset::{BuilderConfig, DatasetBuilder, PeakList};
use mzresolve::features::{mz_to_data, DEFAULT_N_FEATURES};
use mzresolve::search::Resolver;

/// Benchmark the raw search at increasing target masses
fn bench_search(c: &mut Criterion) {
    let registry = SpeciesRegistry::new();
    let resolver = Resolver::new(&registry);
    let mut group = c.benchmark_group("search");

    for mz in [46.041865, 88.052430, 130.062994] {
        for ion in ReagentIon::ALL {
            group.bench_with_input(
                BenchmarkId::new(ion.name(), format!("{:.0}", mz)),
                &mz,
                |b, &mz| b.iter(|| resolver.search(black_box(mz), ion)),
            );
        }
    }

    group.finish();
}

/// Benchmark search plus feature-row assembly
fn bench_mz_to_data(c: &mut Criterion) {
    let registry = SpeciesRegistry::new();
    let resolver = Resolver::new(&registry);

    c.bench_function("mz_to_data_88", |b| {
        b.iter(|| {
            mz_to_data(
                &resolver,
                black_box(88.052430),
                ReagentIon::Ammonium,
                DEFAULT_N_FEATURES,
            )
        })
    });
}

/// Build an in-memory peak list of `n` assigned rows
fn make_peak_list(n: usize) -> PeakList {
    let assigned = [
        ("C2H6O", 46.041865),
        ("CH4O", 32.026215),
        ("C3H6O", 58.041865),
        ("C4H8O2", 88.052430),
        ("CH3Cl", 50.476675),
    ];
    let mut text = String::from("peak\trt\tintensity\tformula\tmass\n");
    for i in 0..n {
        let (formula, mass) = assigned[i % assigned.len()];
        text.push_str(&format!("{}\t{}\t1000\t{}\t{}\n", i, i, formula, mass));
    }
    PeakList::from_reader(text.as_bytes()).unwrap()
}

/// Benchmark combo-file building with different thread counts
fn bench_dataset_builder(c: &mut Criterion) {
    let registry = SpeciesRegistry::new();
    let peaks = make_peak_list(200);
    let assignments = peaks.encode_assignments(&registry).unwrap();

    let mut group = c.benchmark_group("dataset_builder");
    group.throughput(Throughput::Elements(peaks.len() as u64));
    group.sample_size(10);

    for threads in [1, 4, 8] {
        let config = BuilderConfig {
            threads,
            ..BuilderConfig::default()
        };
        let builder = DatasetBuilder::new(Resolver::new(&registry), config);

        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}threads", threads)),
            &threads,
            |b, _| {
                b.iter(|| {
                    builder
                        .write_combos(&peaks, &assignments, Vec::new(), Vec::new())
                        .unwrap()
                })
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_search, bench_mz_to_data, bench_dataset_builder);
criterion_main!(benches);
