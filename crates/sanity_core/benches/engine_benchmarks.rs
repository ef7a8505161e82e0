//! Criterion benchmarks for sanity_core evaluation, sweeps and Monte Carlo
//!
//! Run with: cargo bench -p sanity_core

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use sanity_core::expr::{Formula, SymbolTable};
use sanity_core::model::{Distribution, LabSession, VariableEntry, VariableId};
use sanity_core::units::{UnitExpr, UnitOp};
use sanity_core::{evaluate_formula, run_monte_carlo_with_rng, run_sweep};

fn create_beam_session() -> LabSession {
    let mut session = LabSession::new(
        "P * L^3 / (3 * E * I)",
        vec![
            VariableEntry::new("load", "P", 1200.0)
                .with_unit("N")
                .with_range(1000.0, 1500.0)
                .with_distribution(Distribution::Normal),
            VariableEntry::new("length", "L", 2.0)
                .with_unit("m")
                .with_range(1.8, 2.2)
                .with_distribution(Distribution::Uniform),
            VariableEntry::new("modulus", "E", 200e9).with_unit("N/m^2"),
            VariableEntry::new("inertia", "I", 8e-6).with_unit("m^4"),
        ],
    );
    session.expected_unit = Some("m".into());
    session
}

fn bench_unit_algebra(c: &mut Criterion) {
    let a = UnitExpr::parse("kg m^2/s^2");
    let b = UnitExpr::parse("W/(m^2 K)");

    c.bench_function("unit_parse", |b| {
        b.iter(|| UnitExpr::parse(black_box("kg·m²/(s² K)")))
    });
    c.bench_function("unit_combine", |bench| {
        bench.iter(|| UnitExpr::combine(black_box(&a), black_box(&b), UnitOp::Divide))
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let session = create_beam_session();

    c.bench_function("evaluate_formula", |b| {
        b.iter(|| evaluate_formula(black_box(&session)))
    });

    let formula = Formula::compile(&session.formula).unwrap();
    let table = SymbolTable::from_variables(&session.variables);
    c.bench_function("evaluate_compiled", |b| {
        b.iter(|| formula.evaluate_result(black_box(&table), Some("m")))
    });
}

fn bench_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("sweep");
    let load = VariableId::new("load");

    for points in [10, 50, 200] {
        let mut session = create_beam_session();
        session.sweep.points = points;
        group.bench_with_input(BenchmarkId::from_parameter(points), &session, |b, session| {
            b.iter(|| run_sweep(black_box(session), Some(&load)))
        });
    }
    group.finish();
}

fn bench_monte_carlo(c: &mut Criterion) {
    let mut group = c.benchmark_group("monte_carlo");
    group.sample_size(20);

    for iterations in [100, 1_000, 10_000] {
        let mut session = create_beam_session();
        session.monte_carlo.iterations = iterations;
        group.bench_with_input(
            BenchmarkId::from_parameter(iterations),
            &session,
            |b, session| {
                b.iter(|| {
                    let mut rng = SmallRng::seed_from_u64(42);
                    run_monte_carlo_with_rng(black_box(session), &mut rng)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_unit_algebra,
    bench_evaluate,
    bench_sweep,
    bench_monte_carlo
);
criterion_main!(benches);
