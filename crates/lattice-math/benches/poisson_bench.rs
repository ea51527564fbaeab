use criterion::{criterion_group, criterion_main, Criterion};
use glam::DVec3;
use lattice_math::poisson::{step_toward_poisson_solution, GaussSeidelColor, RelaxationParams};
use lattice_math::{solve_poisson, solve_poisson_multigrid};
use lattice_types::config::{BoundaryCondition, MultigridConfig, PoissonConfig};
use lattice_types::field::VectorField;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

fn random_source(n: usize) -> VectorField {
    let mut rng = StdRng::seed_from_u64(42);
    VectorField::from_fn([n, n, n], DVec3::splat(1.0 / n as f64), |_| {
        DVec3::new(
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
            rng.gen_range(-1.0..1.0),
        )
    })
    .unwrap()
}

fn bench_red_black_step_64(c: &mut Criterion) {
    let source = random_source(64);
    let mut soln = VectorField::with_shape_of(&source, DVec3::ZERO);
    let params = RelaxationParams::new(source.spacing(), 1.8).unwrap();

    c.bench_function("red_black_step_serial_64^3", |b| {
        b.iter(|| {
            for color in [GaussSeidelColor::Red, GaussSeidelColor::Black] {
                step_toward_poisson_solution(
                    &mut soln,
                    &source,
                    0,
                    64,
                    color,
                    BoundaryCondition::Neumann,
                    &params,
                )
                .unwrap();
            }
        })
    });
}

fn bench_serial_vs_parallel(c: &mut Criterion) {
    let source = random_source(96);
    let cfg = PoissonConfig::default()
        .with_boundary_condition(BoundaryCondition::Neumann)
        .with_max_iterations(10);
    let serial_cfg = PoissonConfig {
        parallel: false,
        ..cfg.clone()
    };

    let mut group = c.benchmark_group("poisson_96^3_10rounds");
    group.sample_size(10);

    group.bench_function("serial", |b| {
        b.iter(|| {
            let mut soln = VectorField::with_shape_of(&source, DVec3::ZERO);
            let stats = solve_poisson(&mut soln, &source, &serial_cfg).unwrap();
            black_box(stats.mean);
        })
    });

    group.bench_function("parallel", |b| {
        b.iter(|| {
            let mut soln = VectorField::with_shape_of(&source, DVec3::ZERO);
            let stats = solve_poisson(&mut soln, &source, &cfg).unwrap();
            black_box(stats.mean);
        })
    });

    group.finish();
}

fn bench_multigrid_65(c: &mut Criterion) {
    let source = random_source(65);
    let cfg = MultigridConfig {
        steps_per_level: 8,
        ..MultigridConfig::default()
    };

    let mut group = c.benchmark_group("multigrid_65^3");
    group.sample_size(10);
    group.bench_function("cascade_8_per_level", |b| {
        b.iter(|| {
            let mut soln = VectorField::with_shape_of(&source, DVec3::ZERO);
            let stats = solve_poisson_multigrid(&mut soln, &source, &cfg).unwrap();
            black_box(stats.max);
        })
    });
    group.finish();
}

criterion_group!(
    benches,
    bench_red_black_step_64,
    bench_serial_vs_parallel,
    bench_multigrid_65
);
criterion_main!(benches);
