use agri_core::{CropCatalog, CropSelection};
use agri_runtime::{run_scenario, sweep_growth_rates, EnsembleConfig, ScenarioConfig};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn bench_scenario(c: &mut Criterion) {
    let catalog = CropCatalog::builtin();
    let cfg = ScenarioConfig {
        crop: CropSelection::All,
        ensemble: Some(EnsembleConfig::default()),
        ..ScenarioConfig::default()
    };
    c.bench_function("all crops scenario with 1k rainfall draws", |b| {
        b.iter(|| {
            let _ = black_box(run_scenario(&catalog, &cfg));
        })
    });
}

fn bench_sweep(c: &mut Criterion) {
    let catalog = CropCatalog::builtin();
    let rates: Vec<f64> = (10..=150).map(|r| f64::from(r) / 10.0).collect();
    c.bench_function("growth sweep 1-15% by 0.1", |b| {
        b.iter(|| {
            let _ = black_box(sweep_growth_rates(&catalog, CropSelection::All, &rates));
        })
    });
}

criterion_group!(benches, bench_scenario, bench_sweep);
criterion_main!(benches);
