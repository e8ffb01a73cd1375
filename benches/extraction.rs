use criterion::{black_box, criterion_group, criterion_main, Criterion};

use mzextract::chromatogram::{
    extract_chromatograms, ChromatogramPointRequest, ExtractionSettings, SimpleScan,
};
use mzextract::scan::{MsOrder, ScanEventSummary, ScanPolarity, SignalContinuity, SimpleScanData};
use mzextract::{BandedHistogram, MassTolerance};

fn make_scans(n: usize) -> Vec<SimpleScan> {
    (0..n)
        .map(|i| {
            let masses: Vec<f64> = (0..2000).map(|j| 100.0 + j as f64 * 0.45).collect();
            let intensities: Vec<f64> = (0..2000).map(|j| ((i * 31 + j * 17) % 997) as f64).collect();
            let (order, precursors) = if i % 4 == 0 {
                (MsOrder::MS1, vec![])
            } else {
                (MsOrder::MS2, vec![450.0 + (i % 7) as f64])
            };
            let event = ScanEventSummary::new(
                order,
                precursors,
                ScanPolarity::Positive,
                SignalContinuity::Centroid,
            );
            SimpleScan::new(
                i as f64 * 0.01,
                SimpleScanData::new(masses, intensities).unwrap(),
                event,
            )
        })
        .collect()
}

fn chromatogram_extraction(c: &mut Criterion) {
    let scans = make_scans(1000);
    let tolerance = MassTolerance::ppm(10.0).unwrap();
    let requests: Vec<_> = (0..50)
        .map(|i| ChromatogramPointRequest::mass_window(200.0 + i as f64, 200.5 + i as f64))
        .chain([
            ChromatogramPointRequest::neutral_loss(18.0106, tolerance),
            ChromatogramPointRequest::TotalIonCurrent,
            ChromatogramPointRequest::BasePeak,
        ])
        .collect();
    let settings = ExtractionSettings::default();
    c.bench_function("extract_chromatograms", |b| {
        b.iter(|| extract_chromatograms(black_box(&requests), black_box(&scans), &settings))
    });
    let settings = ExtractionSettings::ms1_only();
    c.bench_function("extract_chromatograms_ms1", |b| {
        b.iter(|| extract_chromatograms(black_box(&requests), black_box(&scans), &settings))
    });
}

fn banding(c: &mut Criterion) {
    let charges: Vec<i32> = (0..100_000).map(|i| (i % 7) + 1).collect();
    let masses: Vec<f64> = (0..100_000).map(|i| 100.0 + (i % 1777) as f64 * 0.73).collect();
    let histogram = BandedHistogram::default();
    c.bench_function("band_charges", |b| {
        b.iter(|| histogram.build(black_box(&charges), true))
    });
    c.bench_function("band_masses", |b| {
        b.iter(|| histogram.build(black_box(&masses), false))
    });
}

criterion_group!(benches, chromatogram_extraction, banding);
criterion_main!(benches);
