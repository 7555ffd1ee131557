//! Benchmarks for term evaluation.
//!
//! Includes:
//! - Summation over growing ranges
//! - Simpson integration at several accuracies
//! - Ridders root solving
//! - Analytic against numerical derivatives

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use termcalc::prelude::*;

fn evaluate(doc: &Document, id: EquationId, args: &[NumericValue]) -> NumericValue {
    let report = validate(doc);
    let mut evaluator = Evaluator::new(doc, &report, CancelToken::new());
    evaluator.evaluate_call(id, args).unwrap_or_default()
}

/// Benchmark Σ_{i=1}^{n} 1/i².
fn bench_summation(c: &mut Criterion) {
    let mut group = c.benchmark_group("summation");

    for n in [100.0, 1_000.0, 10_000.0] {
        let mut doc = Document::new();
        let arena = doc.arena_mut();
        let i = arena.argument("i");
        let square = arena.mult(i, i);
        let body = arena.divide(1.0.into(), square);
        let sum = arena.summation("i", 1.0.into(), n.into(), body);
        let id = doc.add_constant("s", sum);

        group.bench_with_input(BenchmarkId::new("inverse_squares", n), &n, |b, _| {
            b.iter(|| black_box(evaluate(&doc, id, &[])));
        });
    }

    group.finish();
}

/// Benchmark ∫_0^π sin(x) dx.
fn bench_integral(c: &mut Criterion) {
    let mut group = c.benchmark_group("integral");

    for precision in [1e-4, 1e-8, 1e-12] {
        let mut doc = Document::with_settings(DocumentSettings::default().with_precision(precision));
        let arena = doc.arena_mut();
        let x = arena.argument("x");
        let Ok(sine) = arena.call(FunctionKind::Sin, x) else {
            return;
        };
        let integral = arena.integral("x", 0.0.into(), std::f64::consts::PI.into(), sine);
        let id = doc.add_constant("area", integral);

        group.bench_with_input(BenchmarkId::new("sine", precision), &precision, |b, _| {
            b.iter(|| black_box(evaluate(&doc, id, &[])));
        });
    }

    group.finish();
}

/// Benchmark the root of x³ - 2x - 5 on [2, 3].
fn bench_solve(c: &mut Criterion) {
    let mut doc = Document::new();
    let arena = doc.arena_mut();
    let x = arena.argument("x");
    let square = arena.mult(x, x);
    let cube = arena.mult(square, x);
    let twice = arena.mult(2.0.into(), x);
    let difference = arena.minus(cube, twice);
    let body = arena.minus(difference, 5.0.into());
    let root = arena.solve("x", 2.0.into(), 3.0.into(), body);
    let id = doc.add_constant("r", root);

    c.bench_function("solve_cubic", |b| {
        b.iter(|| black_box(evaluate(&doc, id, &[])));
    });
}

/// Benchmark d/dx of exp(x)·x analytically and of |x|·x numerically.
fn bench_derivative(c: &mut Criterion) {
    let mut group = c.benchmark_group("derivative");

    for (name, kind) in [("analytic", FunctionKind::Exp), ("numerical", FunctionKind::Abs)] {
        let mut doc = Document::new();
        let arena = doc.arena_mut();
        let x = arena.argument("x");
        let Ok(inner) = arena.call(kind, x) else {
            return;
        };
        let body = arena.mult(inner, x);
        let derivative = arena.derivative("x", body);
        let id = doc.add_function("f", &["x"], derivative);
        let at = [NumericValue::real(1.5)];

        group.bench_function(name, |b| {
            b.iter(|| black_box(evaluate(&doc, id, &at)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_summation,
    bench_integral,
    bench_solve,
    bench_derivative
);
criterion_main!(benches);
