use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use bspline_rs::{integration, uniform_knots, BSplineGenerator, Spline};

fn cubic_basis(internal: usize) -> Vec<Spline<f64>> {
    let knots = uniform_knots(0.0, 10.0, internal, 4).unwrap();
    BSplineGenerator::new(knots).unwrap().generate_bsplines(4).unwrap()
}

fn bench_generate_bsplines(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_bsplines");
    for order in [2usize, 4, 6] {
        let knots = uniform_knots(0.0, 10.0, 50, order).unwrap();
        let generator = BSplineGenerator::new(knots).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(order), &order, |b, &order| {
            b.iter(|| black_box(generator.generate_bsplines(black_box(order)).unwrap()))
        });
    }
    group.finish();
}

fn bench_product(c: &mut Criterion) {
    let basis = cubic_basis(50);
    let (a, b) = (&basis[20], &basis[22]);

    c.bench_function("spline_product", |bencher| {
        bencher.iter(|| black_box(black_box(a) * black_box(b)))
    });
}

fn bench_overlap_matrix(c: &mut Criterion) {
    let basis = cubic_basis(30);

    c.bench_function("overlap_matrix", |b| {
        b.iter(|| {
            let mut total = 0.0;
            for bi in &basis {
                for bj in &basis {
                    total += integration::overlap(bi, bj).unwrap();
                }
            }
            black_box(total)
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let basis = cubic_basis(50);
    let sum = basis.iter().fold(Spline::zero(basis[0].grid().clone(), 3), |acc, b| acc + b);

    c.bench_function("evaluate_sum", |b| {
        b.iter(|| black_box(sum.evaluate(black_box(4.321))))
    });
}

criterion_group!(
    benches,
    bench_generate_bsplines,
    bench_product,
    bench_overlap_matrix,
    bench_evaluate
);
criterion_main!(benches);
