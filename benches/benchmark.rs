// Extraction and ranking benchmarks
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::{DynamicImage, Rgb, RgbImage};
use rand::prelude::*;
use vismatch::{
    CanonicalImage, Catalog, CatalogEntry, FeatureExtractor, FeatureVector, Ranker, SearchParams,
    SimilarityScorer, FEATURE_DIM,
};

fn generate_random_vector(rng: &mut impl Rng) -> FeatureVector {
    let data: Vec<f32> = (0..FEATURE_DIM).map(|_| rng.random_range(0.0f32..1.0f32)).collect();
    FeatureVector::fitted(data)
}

fn generate_catalog(size: usize) -> Catalog {
    let mut rng = rand::rng();
    Catalog::from_entries((0..size).map(|i| {
        CatalogEntry::new(
            i as u64,
            format!("Product {}", i),
            if i % 2 == 0 { "Shirts" } else { "Dresses" },
            format!("images/{}.jpg", i),
            Some(generate_random_vector(&mut rng)),
        )
    }))
    .expect("unique ids")
}

fn generate_image(width: u32, height: u32) -> DynamicImage {
    let mut rng = rand::rng();
    let image = RgbImage::from_fn(width, height, |_, _| Rgb([rng.random(), rng.random(), rng.random()]));
    DynamicImage::ImageRgb8(image)
}

fn benchmark_extract(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract");
    let extractor = FeatureExtractor::default();

    for (w, h) in [(224, 224), (640, 480), (1920, 1080)] {
        let image = generate_image(w, h);
        group.bench_with_input(BenchmarkId::new("image", format!("{}x{}", w, h)), &image, |b, image| {
            b.iter(|| extractor.extract(black_box(image)));
        });
    }

    let canonical = CanonicalImage::from(generate_image(224, 168).to_rgb8());
    group.bench_function("canonical_224x168", |b| {
        b.iter(|| extractor.extract_canonical(black_box(&canonical)));
    });

    group.finish();
}

fn benchmark_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");
    let mut rng = rand::rng();
    let query = generate_random_vector(&mut rng);
    let params = SearchParams::default();

    for size in [1_000, 10_000, 100_000] {
        let catalog = generate_catalog(size);
        for (name, scorer) in [
            ("weighted", SimilarityScorer::weighted()),
            ("cosine", SimilarityScorer::cosine()),
        ] {
            let ranker = Ranker::new(scorer);
            group.bench_with_input(BenchmarkId::new(name, size), &catalog, |b, catalog| {
                b.iter(|| ranker.rank(black_box(&query), catalog, &params));
            });
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_extract, benchmark_rank);
criterion_main!(benches);
