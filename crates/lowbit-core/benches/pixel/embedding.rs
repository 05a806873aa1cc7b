use criterion::{criterion_group, criterion_main, Criterion};
use lowbit_core::{BitsPerChannel, Cover, Embedder, Extractor, NoDiagnostics, PixelCarrier};

pub fn pixel_embedding(c: &mut Criterion) {
    let mut rng = fastrand::Rng::with_seed(7);
    let samples = std::iter::repeat_with(|| rng.u8(..))
        .take(512 * 512 * 4)
        .collect();
    let carrier = PixelCarrier::new(512, 512, 4, samples).expect("valid carrier");
    let cover = Cover::new(carrier);
    let payload = b"Hello World!".repeat(1000);

    c.bench_function("Pixel Embedding", |b| {
        b.iter(|| {
            Embedder::with_diagnostics(&NoDiagnostics)
                .embed(&cover, &payload, BitsPerChannel::default())
                .expect("Cannot embed payload")
        })
    });

    let stego = Embedder::with_diagnostics(&NoDiagnostics)
        .embed(&cover, &payload, BitsPerChannel::default())
        .expect("Cannot embed payload");
    c.bench_function("Pixel Extraction", |b| {
        b.iter(|| {
            Extractor::with_diagnostics(&NoDiagnostics)
                .extract(&stego)
                .expect("Cannot extract payload")
        })
    });
}

criterion_group!(benches, pixel_embedding);
criterion_main!(benches);
