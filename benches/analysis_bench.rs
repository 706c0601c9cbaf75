//! Performance benchmarks for image analysis

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use pixelcheck::{analyze_image, AnalysisConfig, PixelBuffer, Rgba};

fn synthetic_image() -> PixelBuffer {
    // 512x512 diagonal gradient with a fine ripple
    PixelBuffer::from_fn(512, 512, |x, y| {
        let ripple = ((x * 7 + y * 13) % 11) as u8;
        Rgba::opaque(
            ((x / 2) as u8).wrapping_add(ripple),
            ((y / 2) as u8).wrapping_add(ripple),
            (((x + y) / 4) as u8).wrapping_add(ripple),
        )
    })
    .expect("valid dimensions")
}

fn bench_analyze_image(c: &mut Criterion) {
    let image = synthetic_image();

    let mut group = c.benchmark_group("analyze_image_512");
    for parallel in [true, false] {
        let config = AnalysisConfig {
            parallel_extraction: parallel,
            ..AnalysisConfig::default()
        };
        let name = if parallel { "parallel" } else { "sequential" };
        group.bench_function(name, |b| {
            b.iter(|| {
                let _ = analyze_image(black_box(image.clone()), None, black_box(config.clone()));
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_analyze_image);
criterion_main!(benches);
