//! Full-session scenarios driven through the public engine API with a
//! manual clock.

use std::time::Duration;

use attentest_core::classifier::{IgnoreReason, ResponseOutcome};
use attentest_core::clock::{Clock, ManualClock};
use attentest_core::config::{CptConfig, MemoryConfig, TovaConfig};
use attentest_core::engine::{CptEngine, MemoryEngine, TovaEngine};
use attentest_core::error::SessionError;
use attentest_core::model::{MemoryMode, ParticipantInfo, PhaseId, SessionStatus};
use attentest_core::simulation::{run_simulated_session, NoopObserver, ResponderProfile};
use attentest_core::statistics::probit;
use attentest_core::traits::AttentionTest;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

#[test]
fn tova_perfect_performance_over_100_stimuli() {
    let clock = ManualClock::new();
    let config = TovaConfig {
        infrequent_ratio: 0.225,
        ..Default::default()
    };
    let isi = config.timings().inter_stimulus_interval;
    let mut engine = TovaEngine::seeded(config, clock.clone(), 2024).unwrap();
    engine.set_participant(ParticipantInfo::new("Test Subject", 30, "other", "2026-10-16"));
    engine.start();

    for _ in 0..100 {
        let onset = clock.now();
        engine.generate_stimulus().unwrap();
        if engine.current_is_target() {
            clock.advance(ms(300));
            assert_eq!(
                engine.process_response(),
                ResponseOutcome::Hit { latency_ms: 300.0 }
            );
        }
        clock.set(onset + isi);
        engine.end_response_window();
        engine.check_time_remaining();
    }

    // 100 stimuli take 200 s, well before the 600 s phase switch
    let results = engine.end_test().unwrap();
    assert_eq!(results.participant.name, "Test Subject");
    let phase = results.phase(PhaseId::InfrequentTargets).unwrap();
    let c = &phase.counters;
    assert_eq!(c.stimuli_shown, 100);
    assert!(c.target_stimuli > 0 && c.non_target_stimuli > 0);
    assert_eq!(c.correct_responses, c.target_stimuli);
    assert_eq!(c.commission_errors, 0);
    assert_eq!(c.omission_errors, 0);
    assert_eq!(phase.hit_rate, 1.0);
    assert_eq!(phase.false_alarm_rate, 0.0);

    let n_t = c.target_stimuli as f64;
    let n_n = c.non_target_stimuli as f64;
    let expected = probit(1.0 - 1.0 / (2.0 * n_t)).unwrap() - probit(1.0 / (2.0 * n_n)).unwrap();
    assert!((phase.d_prime - expected).abs() < 1e-9);

    assert_eq!(phase.mean_rt, 300.0);
    assert_eq!(phase.rt_var, 0.0);
    let acs = phase.acs_score.unwrap();
    assert!((0.0..=100.0).contains(&acs), "acs {acs}");
}

#[test]
fn debounce_discards_presses_closer_than_200ms() {
    let clock = ManualClock::new();
    let config = CptConfig {
        target_ratio: 0.0,
        ..Default::default()
    };
    let mut engine = CptEngine::seeded(config, clock.clone(), 1).unwrap();
    engine.start();
    engine.generate_stimulus();

    clock.advance(ms(300));
    assert!(engine.process_response().is_accepted());
    clock.advance(ms(199));
    assert_eq!(
        engine.process_response(),
        ResponseOutcome::Ignored(IgnoreReason::Debounced)
    );
    assert_eq!(engine.counters().commission_errors, 1);

    // measured from the last accepted press, not the dropped one
    clock.advance(ms(1));
    assert!(engine.process_response().is_accepted());
    assert_eq!(engine.counters().commission_errors, 2);
}

#[test]
fn dmt_hit_requires_match_delay_positions_back() {
    let clock = ManualClock::new();
    let config = MemoryConfig {
        mode: MemoryMode::Dmt,
        target_probability: 1.0,
        ..Default::default()
    };
    let mut engine = MemoryEngine::seeded(config, clock.clone(), 77).unwrap();
    engine.start();

    let mut shown = Vec::new();
    for _ in 0..3 {
        shown.push(engine.generate_stimulus().unwrap());
        clock.advance(ms(1500));
        assert!(matches!(
            engine.process_response(),
            ResponseOutcome::Commission { .. }
        ));
    }

    let fourth = engine.generate_stimulus().unwrap();
    assert_eq!(fourth, shown[0]);
    clock.advance(ms(620));
    assert_eq!(
        engine.process_response(),
        ResponseOutcome::Hit { latency_ms: 620.0 }
    );

    let results = engine.end_test().unwrap();
    let dmt = results.phase(PhaseId::Dmt).unwrap();
    assert_eq!(dmt.counters.target_stimuli, 1);
    assert_eq!(dmt.counters.correct_responses, 1);
    assert_eq!(dmt.counters.commission_errors, 3);
    // DMT-only mode still exposes both phase keys
    assert!(results.phase(PhaseId::Imt).is_some());
}

#[test]
fn dmt_look_back_reaches_into_imt_history() {
    let clock = ManualClock::new();
    let config = MemoryConfig {
        mode: MemoryMode::Both,
        duration_secs: 12,
        target_probability: 1.0,
        ..Default::default()
    };
    let mut engine = MemoryEngine::seeded(config, clock.clone(), 8).unwrap();
    engine.start();

    let first = engine.generate_stimulus().unwrap();
    for _ in 0..3 {
        clock.advance(ms(1500));
        assert_eq!(engine.generate_stimulus().unwrap(), first);
    }

    clock.set(Duration::from_secs(6));
    engine.check_time_remaining();
    assert_eq!(engine.active_phase(), PhaseId::Dmt);

    let carried = engine.generate_stimulus().unwrap();
    assert_eq!(carried, first);
    assert!(engine.current_is_target());
    assert_eq!(engine.counters().target_stimuli, 1);
}

#[test]
fn second_end_test_is_rejected_without_touching_results() {
    let clock = ManualClock::new();
    let mut engine = MemoryEngine::seeded(MemoryConfig::default(), clock.clone(), 4).unwrap();
    assert_eq!(engine.end_test().unwrap_err(), SessionError::NotStarted);

    engine.start();
    engine.generate_stimulus();
    let first = engine.end_test().unwrap();
    assert_eq!(engine.status(), SessionStatus::Ended);

    assert_eq!(engine.end_test().unwrap_err(), SessionError::AlreadyEnded);
    assert_eq!(engine.generate_stimulus(), None);
    let frozen = engine.results().unwrap();
    assert_eq!(frozen.phases.len(), 2);
    assert_eq!(frozen.phases, first.phases);
}

#[test]
fn omissions_equal_targets_minus_hits_for_every_phase() {
    let profiles = [
        ResponderProfile::attentive(),
        ResponderProfile::inattentive(),
        ResponderProfile::impulsive(),
    ];

    for (seed, profile) in profiles.iter().enumerate() {
        let seed = seed as u64;
        let clock = ManualClock::new();
        let mut rng = StdRng::seed_from_u64(seed);

        let config = CptConfig {
            duration_secs: 90,
            ..Default::default()
        };
        let mut cpt = CptEngine::seeded(config, clock.clone(), seed).unwrap();
        let cpt_results =
            run_simulated_session(&mut cpt, &clock, profile, &mut rng, &NoopObserver).unwrap();

        let clock = ManualClock::new();
        let config = MemoryConfig {
            duration_secs: 90,
            ..Default::default()
        };
        let mut memory = MemoryEngine::seeded(config, clock.clone(), seed).unwrap();
        let memory_results =
            run_simulated_session(&mut memory, &clock, profile, &mut rng, &NoopObserver).unwrap();

        let clock = ManualClock::new();
        let config = TovaConfig {
            duration_secs: 90,
            ..Default::default()
        };
        let mut tova = TovaEngine::seeded(config, clock.clone(), seed).unwrap();
        let tova_results =
            run_simulated_session(&mut tova, &clock, profile, &mut rng, &NoopObserver).unwrap();

        for results in [&cpt_results, &memory_results, &tova_results] {
            for (id, phase) in &results.phases {
                let c = &phase.counters;
                assert_eq!(
                    c.omission_errors,
                    c.target_stimuli - c.correct_responses,
                    "{id} with profile {profile:?}"
                );
                assert!(phase.hit_rate <= 1.0);
                assert!(phase.false_alarm_rate <= 1.0);
                assert!(phase.d_prime.is_finite());
            }
        }
    }
}

#[test]
fn late_tova_response_counts_for_closed_window() {
    let clock = ManualClock::new();
    let config = TovaConfig {
        infrequent_ratio: 1.0,
        ..Default::default()
    };
    let mut engine = TovaEngine::seeded(config, clock.clone(), 0).unwrap();
    engine.start();

    engine.generate_stimulus();
    clock.advance(ms(2000));
    engine.end_response_window();
    assert_eq!(engine.counters().omission_errors, 1);

    clock.advance(ms(250));
    assert!(matches!(
        engine.process_response(),
        ResponseOutcome::Hit { .. }
    ));

    let results = engine.end_test().unwrap();
    let phase = results.phase(PhaseId::InfrequentTargets).unwrap();
    assert_eq!(phase.counters.omission_errors, 0);
    assert_eq!(phase.hit_rate, 1.0);
}
