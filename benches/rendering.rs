use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use projection_morph::animation::{
    interpolate, normalize, render_frame, AnimationConfig, AxisLimits, Embedding,
};
use projection_morph::data::{make_blobs, Projection};

fn create_embeddings(n_per_class: usize) -> (Vec<Embedding>, Vec<u32>) {
    let centers = vec![
        vec![0.0, 0.0, 5.0, 0.0],
        vec![4.0, 1.0, 0.0, 5.0],
        vec![1.0, 5.0, 2.5, 2.5],
    ];
    let dataset = make_blobs(n_per_class, &centers, 0.8, 42).unwrap();
    let embeddings = vec![
        Projection::Axes { x: 0, y: 1 }.project(&dataset).unwrap(),
        Projection::Axes { x: 2, y: 3 }.project(&dataset).unwrap(),
    ];
    (embeddings, dataset.labels().to_vec())
}

fn bench_interpolate(c: &mut Criterion) {
    let mut group = c.benchmark_group("interpolate");

    for n in [100, 1000, 10000].iter() {
        let (embeddings, _) = create_embeddings(*n);
        let a = normalize(&embeddings[0]).unwrap();
        let b = normalize(&embeddings[1]).unwrap();

        group.bench_with_input(BenchmarkId::new("30_frames", n * 3), n, |bench, _| {
            bench.iter(|| {
                let frames = interpolate(&a, &b, 30).unwrap();
                black_box(frames.map(|f| f.len()).sum::<usize>())
            })
        });
    }

    group.finish();
}

fn bench_render_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_frame");
    group.sample_size(20);

    let config = AnimationConfig::default();
    let style = config.render_style();

    for n in [100, 1000].iter() {
        let (embeddings, labels) = create_embeddings(*n);
        let normalized = normalize(&embeddings[0]).unwrap();
        let limits = AxisLimits::from_embeddings([&normalized], config.axis_margin).unwrap();
        let colors = config.color_map(&labels);

        group.bench_with_input(BenchmarkId::new("640x480", n * 3), n, |bench, _| {
            bench.iter(|| {
                black_box(
                    render_frame(normalized.points(), &labels, &colors, &limits, &style).unwrap(),
                )
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_interpolate, bench_render_frame);
criterion_main!(benches);
