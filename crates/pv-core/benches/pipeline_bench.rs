// ─────────────────────────────────────────────────────────────────────
// SCPN PV Core — Analysis Pipeline Benchmark
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────

use criterion::{criterion_group, criterion_main, Criterion};
use pv_core::batch::{analyze_batch, BatchItem};
use pv_core::IvAnalyzer;
use pv_diagnostics::{add_noise, NoiseModel, SingleDiodeCell};
use pv_types::config::AnalysisConfig;
use pv_types::curve::{CorrectionCoefficients, MeasurementContext};
use pv_types::results::DiodeParameters;
use std::hint::black_box;

fn module() -> SingleDiodeCell {
    SingleDiodeCell::new(
        DiodeParameters {
            i_l: 9.2,
            i_0: 2e-10,
            rs: 0.004,
            rsh: 450.0,
            n: 1.15,
        },
        45.0,
    )
    .with_cells_in_series(60)
}

fn items(count: usize) -> Vec<BatchItem> {
    let context = MeasurementContext {
        module_area_m2: Some(1.64),
        coefficients: Some(CorrectionCoefficients {
            alpha_isc: 0.0005,
            beta_voc: -0.003,
            gamma_pmax: -0.004,
        }),
        spectral_mismatch_factor: 1.0,
    };
    (0..count)
        .map(|k| {
            let irradiance = 200.0 + 800.0 * k as f64 / count as f64;
            let clean = module()
                .iv_curve(120, irradiance)
                .expect("benchmark sweep should build");
            let noise = NoiseModel {
                voltage_sigma: 0.01,
                current_sigma: 0.005,
                seed: k as u64,
            };
            BatchItem {
                curve: add_noise(&clean, &noise).expect("noise model should be valid"),
                context,
            }
        })
        .collect()
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("iv_pipeline");
    group.sample_size(10);

    let batch = items(32);
    let extraction_only = IvAnalyzer::new(AnalysisConfig {
        fit_diode_model: false,
        ..AnalysisConfig::default()
    })
    .expect("default config is valid");
    let full = IvAnalyzer::default();

    group.bench_function("single_curve_with_fit", |b| {
        b.iter(|| black_box(full.analyze(&batch[0].curve, &batch[0].context)))
    });
    group.bench_function("batch_32_extraction_only", |b| {
        b.iter(|| black_box(analyze_batch(&extraction_only, &batch)))
    });
    group.bench_function("batch_32_with_fit", |b| {
        b.iter(|| black_box(analyze_batch(&full, &batch)))
    });

    group.finish();
}

criterion_group!(benches, bench_pipeline);
criterion_main!(benches);
