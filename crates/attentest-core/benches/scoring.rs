use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;

use attentest_core::clock::ManualClock;
use attentest_core::config::TovaConfig;
use attentest_core::counters::{PhaseCounters, PhaseState, ResponseTimeSeries};
use attentest_core::engine::TovaEngine;
use attentest_core::results::PhaseResult;
use attentest_core::simulation::{run_simulated_session, NoopObserver, ResponderProfile};
use attentest_core::statistics::d_prime;

fn bench_d_prime(c: &mut Criterion) {
    let mut group = c.benchmark_group("d_prime");

    group.bench_function("interior", |b| {
        b.iter(|| d_prime(black_box(0.8), black_box(0.1), black_box(90), black_box(310)))
    });

    group.bench_function("edge_corrected", |b| {
        b.iter(|| d_prime(black_box(1.0), black_box(0.0), black_box(90), black_box(310)))
    });

    group.finish();
}

fn bench_finalize(c: &mut Criterion) {
    let times: Vec<f64> = (0..300).map(|i| 300.0 + (i % 40) as f64 * 5.0).collect();
    let phase = PhaseState {
        counters: PhaseCounters {
            stimuli_shown: 300,
            target_stimuli: 68,
            non_target_stimuli: 232,
            correct_responses: 60,
            commission_errors: 12,
            ..Default::default()
        },
        response_times: ResponseTimeSeries::from(times),
    };

    c.bench_function("finalize_tova_phase", |b| {
        b.iter(|| PhaseResult::finalize(black_box(phase.clone()), true))
    });
}

fn bench_simulated_tova(c: &mut Criterion) {
    c.bench_function("simulated_tova_session", |b| {
        b.iter(|| {
            let clock = ManualClock::new();
            let mut engine = TovaEngine::seeded(TovaConfig::default(), clock.clone(), 1).unwrap();
            let mut rng = StdRng::seed_from_u64(1);
            run_simulated_session(
                &mut engine,
                &clock,
                &ResponderProfile::attentive(),
                &mut rng,
                &NoopObserver,
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_d_prime, bench_finalize, bench_simulated_tova);
criterion_main!(benches);
