use criterion::{criterion_group, criterion_main, Criterion};
use lowbit_core::{
    CoefficientPlane, Cover, DctCarrier, Embedder, Extractor, NoDiagnostics, Perceptibility,
    Selection,
};

fn carrier() -> DctCarrier {
    let mut rng = fastrand::Rng::with_seed(42);
    let planes = ["Y", "Cr", "Cb"]
        .into_iter()
        .map(|label| {
            let mut plane = CoefficientPlane::new(label, 64, 64);
            for value in plane.coefficients.iter_mut() {
                *value = rng.i16(-24..24);
            }
            plane
        })
        .collect();
    DctCarrier::new(planes)
}

pub fn dct_embedding(c: &mut Criterion) {
    let cover = Cover::new(carrier());
    let perceptibility = Perceptibility::from_parameter(3).expect("valid perceptibility");
    let payload = vec![0xA5; cover.capacity(perceptibility).bytes()];

    c.bench_function("DCT Embedding", |b| {
        b.iter(|| {
            Embedder::with_diagnostics(&NoDiagnostics)
                .embed(&cover, &payload, perceptibility)
                .expect("Cannot embed payload")
        })
    });

    let stego = Embedder::with_diagnostics(&NoDiagnostics)
        .embed(&cover, &payload, perceptibility)
        .expect("Cannot embed payload");
    c.bench_function("DCT Extraction", |b| {
        b.iter(|| {
            Extractor::with_diagnostics(&NoDiagnostics)
                .extract(&stego)
                .expect("Cannot extract payload")
        })
    });
}

criterion_group!(benches, dct_embedding);
criterion_main!(benches);
