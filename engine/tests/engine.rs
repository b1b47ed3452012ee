use std::collections::HashSet;

use flappy_core::{CollisionCause, Event, GameSnapshot, GameStatus, StartError, Tuning};
use flappy_engine::Engine;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

fn playing_engine(tuning: Tuning) -> Engine {
    let mut engine = Engine::new(tuning).expect("valid tuning");
    engine.mark_assets_ready();
    engine.start().expect("assets ready");
    engine
}

/// Flaps whenever the bird sinks below a line just above the next gap's floor.
fn autopilot_flap(snapshot: &GameSnapshot) -> bool {
    let bird = snapshot.bird;
    let line = snapshot
        .pipes
        .iter()
        .find(|pipe| pipe.right() >= bird.x)
        .map_or(snapshot.playfield.ground_y() - 150.0, |pipe| {
            pipe.gap_bottom(&snapshot.playfield) - 25.0
        });
    bird.bottom() > line
}

fn assert_invariants(snapshot: &GameSnapshot, tuning: &Tuning) {
    for pipe in &snapshot.pipes {
        assert_eq!(
            pipe.top_height + tuning.pipe_gap + pipe.bottom_height,
            tuning.height - tuning.ground_height,
            "gap invariant broken for {pipe:?}"
        );
    }
    assert!(
        snapshot.pipes.windows(2).all(|pair| pair[0].x > pair[1].x),
        "pipes out of spawn order: {:?}",
        snapshot.pipes
    );
}

#[test]
fn single_tick_applies_gravity() {
    let mut engine = playing_engine(Tuning::default());

    let snapshot = engine.tick();

    assert_eq!(snapshot.bird.y, 300.5);
    assert_eq!(snapshot.bird.velocity, 0.5);
}

#[test]
fn falling_bird_ends_the_run_on_the_ground() {
    let mut engine = playing_engine(Tuning::default());

    for _ in 0..32 {
        assert_eq!(engine.tick().status, GameStatus::Playing);
    }

    let snapshot = engine.tick();
    assert_eq!(snapshot.status, GameStatus::Over);
    assert!(snapshot.bird.bottom() >= 620.0);
    assert!(engine.events().contains(&Event::RunEnded {
        cause: CollisionCause::Ground,
        final_score: 0,
    }));
}

#[test]
fn terminal_state_is_frozen_until_reset() {
    let mut engine = playing_engine(Tuning::default());
    while engine.tick().status == GameStatus::Playing {}
    let frozen = engine.snapshot();

    for _ in 0..50 {
        engine.flap();
        assert!(engine.events().is_empty());
        assert_eq!(engine.start(), Ok(()));
        assert!(engine.events().is_empty());
        assert_eq!(engine.tick(), frozen);
        assert!(engine.events().is_empty());
    }
}

#[test]
fn flap_always_sets_flap_strength() {
    let mut engine = playing_engine(Tuning::default());

    for ticks in [0, 1, 5, 12] {
        for _ in 0..ticks {
            let _ = engine.tick();
        }
        engine.flap();
        assert_eq!(engine.snapshot().bird.velocity, -8.0);
        assert_eq!(engine.events(), &[Event::BirdFlapped { velocity: -8.0 }]);
    }
}

#[test]
fn flap_is_ignored_before_start() {
    let mut engine = Engine::new(Tuning::default()).expect("valid");
    engine.mark_assets_ready();

    engine.flap();

    assert_eq!(engine.snapshot().bird.velocity, 0.0);
}

#[test]
fn start_waits_for_assets() {
    let mut engine = Engine::new(Tuning::default()).expect("valid");

    assert!(!engine.is_ready());
    assert_eq!(engine.start(), Err(StartError::AssetsNotReady));
    assert_eq!(engine.status(), GameStatus::Ready);

    engine.mark_assets_ready();
    assert!(engine.is_ready());
    assert_eq!(engine.start(), Ok(()));
    assert_eq!(engine.status(), GameStatus::Playing);
}

#[test]
fn restart_after_game_over() {
    let mut engine = playing_engine(Tuning::default());
    while engine.tick().status == GameStatus::Playing {}

    engine.reset();
    let snapshot = engine.snapshot();
    assert_eq!(snapshot.status, GameStatus::Ready);
    assert_eq!(snapshot.score, 0);
    assert!(snapshot.pipes.is_empty());
    assert_eq!(snapshot.bird.y, 300.0);
    assert!(engine.is_ready());

    assert_eq!(engine.start(), Ok(()));
    let snapshot = engine.tick();
    assert_eq!(snapshot.status, GameStatus::Playing);
    assert_eq!(snapshot.tick, 1);
}

#[test]
fn autopilot_clears_pipes_and_scores_each_once() {
    let tuning = Tuning::default();
    let mut engine = playing_engine(tuning.clone());
    let mut scored = HashSet::new();
    let mut previous = 0;

    for _ in 0..2_000 {
        if autopilot_flap(&engine.snapshot()) {
            engine.flap();
        }
        let snapshot = engine.tick();
        assert_eq!(snapshot.status, GameStatus::Playing, "autopilot crashed");
        assert_invariants(&snapshot, &tuning);

        for event in engine.events() {
            if let Event::ScoreIncreased { pipe, .. } = event {
                assert!(scored.insert(*pipe), "pipe {pipe:?} scored twice");
            }
        }
        assert_eq!(engine.score(), snapshot.score);
        assert!(snapshot.score >= previous);
        assert!(snapshot.score - previous <= 1);
        previous = snapshot.score;
    }

    assert!(previous >= 10, "expected steady scoring, got {previous}");
    assert_eq!(previous as usize, scored.len());
}

#[test]
fn random_inputs_preserve_invariants() {
    let tuning = Tuning::default();
    let mut rng = ChaCha8Rng::seed_from_u64(0x00f1_a770);

    for _ in 0..20 {
        let mut engine = playing_engine(tuning.clone());
        let mut previous = 0;
        let mut frozen: Option<GameSnapshot> = None;

        for _ in 0..3_000 {
            if rng.gen_bool(0.08) {
                engine.flap();
            }
            let snapshot = engine.tick();
            assert_invariants(&snapshot, &tuning);
            assert!(snapshot.score >= previous);
            previous = snapshot.score;

            if snapshot.status == GameStatus::Over {
                if frozen.is_none() {
                    frozen = Some(snapshot.clone());
                }
                assert_eq!(frozen.as_ref(), Some(&snapshot));
            } else {
                assert!(frozen.is_none(), "left the terminal state without reset");
                assert_eq!(snapshot.status, GameStatus::Playing);
            }
        }

        assert!(frozen.is_some(), "random flapping should end the run");
    }
}

#[test]
fn identical_inputs_replay_identically() {
    let run = || {
        let mut engine = playing_engine(Tuning::default());
        let mut log = Vec::new();
        for _ in 0..1_500 {
            if autopilot_flap(&engine.snapshot()) {
                engine.flap();
            }
            let _ = engine.tick();
            log.extend(engine.events().iter().cloned());
        }
        log
    };

    assert_eq!(run(), run());
}

#[test]
fn spawning_continues_across_restarts() {
    let mut engine = playing_engine(Tuning::default());
    let _ = engine.tick();
    let first = engine.snapshot().pipes[0];

    engine.reset();
    engine.start().expect("assets ready");
    let _ = engine.tick();
    let second = engine.snapshot().pipes[0];

    assert_eq!(first.x, second.x);
    assert_ne!(first.id, second.id);
}
