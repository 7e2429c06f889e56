//! Integration test: whole episodes through the session controller
//!
//! Drives sessions with the deterministic scheduler: start, fly, score,
//! crash, restart, and best-score persistence across sessions.

use flappy::config::{GameConfig, SpawnPolicy};
use flappy::core::{CollisionKind, Session, SessionEvent, SessionState};
use flappy::scheduler::{drive, ManualStepper};
use flappy::utils::persistence::{FileScoreStore, MemoryScoreStore, ScoreStore};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::ops::ControlFlow;
use std::path::PathBuf;

const FRAME_MS: f64 = 16.0;

fn new_session<S: ScoreStore>(store: S, seed: u64) -> Session<S, ChaCha8Rng> {
    Session::new(
        GameConfig::default(),
        store,
        ChaCha8Rng::seed_from_u64(seed),
    )
}

/// Gaps drawn from a narrower band so the autopilot can always reach the next one.
fn autopilot_session(seed: u64) -> Session<MemoryScoreStore, ChaCha8Rng> {
    let mut config = GameConfig::default();
    config.pipes.min_margin = 120.0;
    Session::new(
        config,
        MemoryScoreStore::new(),
        ChaCha8Rng::seed_from_u64(seed),
    )
}

/// Flap whenever the bird sinks below the middle of the next gap.
fn autopilot<S: ScoreStore>(session: &mut Session<S, ChaCha8Rng>) {
    let bird = session.bird();
    let centre = bird.y + bird.height / 2.0;
    let target = session
        .pipes()
        .pipes()
        .iter()
        .find(|p| p.right() >= bird.x)
        .map(|p| p.gap_top + p.gap_size / 2.0)
        .unwrap_or(300.0);
    if centre > target + 25.0 {
        session.on_flap();
    }
}

/// Start an episode, then place a pipe just in front of the bird's trailing
/// edge and the bird just above the ground so the next tick both scores and
/// crashes.
fn score_one_and_crash<S: ScoreStore>(
    session: &mut Session<S, ChaCha8Rng>,
    start_ms: f64,
) -> Vec<SessionEvent> {
    session.on_flap();
    session.tick(start_ms);
    session.tick(start_ms + FRAME_MS);
    assert_eq!(session.pipes().len(), 1);

    let bird_x = session.bird().x;
    let pipe = &mut session.pipes_mut().pipes_mut()[0];
    pipe.x = bird_x - pipe.width - 0.5;
    session.bird_mut().y = 480.0;
    session.tick(start_ms + 2.0 * FRAME_MS)
}

fn temp_score_path(name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(format!("flappy_session_test_{}_{}", name, std::process::id()))
        .join("flappybird_highscore")
}

// =============================================================================
// Lifecycle
// =============================================================================

#[test]
fn test_session_waits_for_first_flap() {
    let mut session = new_session(MemoryScoreStore::new(), 1);
    let mut stepper = ManualStepper::new(FRAME_MS).with_limit(120);
    drive(&mut stepper, |now| {
        session.tick(now);
        ControlFlow::Continue(())
    });
    assert_eq!(session.state(), SessionState::Idle);
    assert!(session.pipes().is_empty());
}

#[test]
fn test_unattended_bird_hits_ground() {
    let mut session = new_session(MemoryScoreStore::new(), 2);
    session.on_flap();

    let mut crash = None;
    let mut stepper = ManualStepper::new(FRAME_MS).with_limit(1000);
    drive(&mut stepper, |now| {
        for event in session.tick(now) {
            if let SessionEvent::Crashed(kind) = event {
                crash = Some(kind);
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    });

    assert_eq!(crash, Some(CollisionKind::Ground));
    assert_eq!(session.state(), SessionState::Ended);
    assert_eq!(session.score(), 0);
}

#[test]
fn test_autopilot_scores_pipes() {
    let mut session = autopilot_session(99);
    session.on_flap();

    let mut stepper = ManualStepper::new(FRAME_MS).with_limit(1500);
    let mut last_total = 0;
    drive(&mut stepper, |now| {
        autopilot(&mut session);
        for event in session.tick(now) {
            if let SessionEvent::Scored { total } = event {
                assert!(total > last_total);
                last_total = total;
            }
        }
        if session.state() == SessionState::Running {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    });

    assert_eq!(session.state(), SessionState::Running);
    assert!(session.score() >= 3, "score {}", session.score());
    assert_eq!(session.score(), last_total);
}

#[test]
fn test_score_and_crash_on_same_tick() {
    let mut session = new_session(MemoryScoreStore::new(), 3);
    let events = score_one_and_crash(&mut session, 0.0);
    assert_eq!(
        events,
        vec![
            SessionEvent::Scored { total: 1 },
            SessionEvent::Crashed(CollisionKind::Ground),
            SessionEvent::NewBest(1),
        ]
    );
    assert_eq!(session.score(), 1);
    assert_eq!(session.best_score(), 1);
}

#[test]
fn test_pipe_scores_only_once() {
    let mut session = new_session(MemoryScoreStore::new(), 4);
    session.on_flap();
    session.tick(0.0);
    session.tick(FRAME_MS);
    let bird_x = session.bird().x;
    let pipe = &mut session.pipes_mut().pipes_mut()[0];
    pipe.x = bird_x - pipe.width - 0.5;

    let mut scored = 0;
    for i in 2..10 {
        // Keep the bird airborne
        session.on_flap();
        for event in session.tick(i as f64 * FRAME_MS) {
            if matches!(event, SessionEvent::Scored { .. }) {
                scored += 1;
            }
        }
    }
    assert_eq!(scored, 1);
    assert_eq!(session.score(), 1);
}

#[test]
fn test_flap_after_crash_starts_fresh_episode() {
    let mut session = new_session(MemoryScoreStore::new(), 5);
    score_one_and_crash(&mut session, 0.0);
    assert_eq!(session.state(), SessionState::Ended);

    session.on_flap();
    let events = session.tick(5_000.0);
    assert_eq!(events, vec![SessionEvent::Started, SessionEvent::Flapped]);
    assert_eq!(session.score(), 0);
    assert!(session.pipes().is_empty());
    assert!(session.bird().alive);
    assert_eq!(session.best_score(), 1);
}

#[test]
fn test_restart_key_after_crash() {
    let mut session = new_session(MemoryScoreStore::new(), 6);
    score_one_and_crash(&mut session, 0.0);
    session.on_restart();
    assert_eq!(session.tick(100.0), vec![SessionEvent::Started]);
    assert_eq!(session.state(), SessionState::Running);
    // Restart does not flap
    assert_eq!(session.bird().velocity, 0.0);
}

#[test]
fn test_restart_from_idle_falls_without_flap() {
    let mut session = new_session(MemoryScoreStore::new(), 12);
    session.on_restart();
    assert_eq!(session.tick(0.0), vec![SessionEvent::Started]);
    let start_y = session.bird().y;

    for i in 1..=10 {
        session.tick(i as f64 * FRAME_MS);
    }

    assert!(session.bird().y > start_y);
    assert!(session.bird().velocity > 0.0);
    assert_eq!(session.state(), SessionState::Running);
}

// =============================================================================
// Degenerate spawn settings
// =============================================================================

fn run_with_spawn(config: GameConfig) -> (Session<MemoryScoreStore, ChaCha8Rng>, f64) {
    let mut session = Session::new(
        config,
        MemoryScoreStore::new(),
        ChaCha8Rng::seed_from_u64(13),
    );
    session.on_flap();
    let mut stepper = ManualStepper::new(FRAME_MS).with_limit(100);
    drive(&mut stepper, |now| {
        session.on_flap();
        session.tick(now);
        ControlFlow::Continue(())
    });
    (session, stepper.now_ms())
}

#[test]
fn test_zero_spawn_distance_does_not_hang() {
    for distance in [0.0, -50.0] {
        let mut config = GameConfig::default();
        config.pipes.spawn_distance = distance;
        let (session, end_ms) = run_with_spawn(config);
        assert_eq!(end_ms, 100.0 * FRAME_MS);
        assert_eq!(session.config().pipes.spawn_distance, distance);
        assert!(!session.pipes().is_empty());
        assert!(session.pipes().len() < 1000);
    }
}

#[test]
fn test_zero_spawn_interval_does_not_hang() {
    let mut config = GameConfig::default();
    config.pipes.spawn_policy = SpawnPolicy::Timed { interval_ms: 0.0 };
    let (session, end_ms) = run_with_spawn(config);
    assert_eq!(end_ms, 100.0 * FRAME_MS);
    assert_eq!(
        session.config().pipes.spawn_policy,
        SpawnPolicy::Timed { interval_ms: 0.0 }
    );
    assert!(!session.pipes().is_empty());
}

// =============================================================================
// Determinism
// =============================================================================

#[test]
fn test_same_seed_same_pipes() {
    let run = |seed: u64| {
        let mut session = autopilot_session(seed);
        session.on_flap();
        let mut stepper = ManualStepper::new(FRAME_MS).with_limit(400);
        drive(&mut stepper, |now| {
            autopilot(&mut session);
            session.tick(now);
            ControlFlow::Continue(())
        });
        session.snapshot()
    };
    assert_eq!(run(7), run(7));
}

#[test]
fn test_different_seeds_differ() {
    let gaps = |seed: u64| {
        let mut session = autopilot_session(seed);
        session.on_flap();
        let mut stepper = ManualStepper::new(FRAME_MS).with_limit(300);
        drive(&mut stepper, |now| {
            autopilot(&mut session);
            session.tick(now);
            ControlFlow::Continue(())
        });
        session
            .pipes()
            .pipes()
            .iter()
            .map(|p| p.gap_top)
            .collect::<Vec<_>>()
    };
    assert_ne!(gaps(1), gaps(2));
}

// =============================================================================
// Best score persistence
// =============================================================================

#[test]
fn test_best_score_survives_new_session() {
    let path = temp_score_path("survives");
    let _ = std::fs::remove_file(&path);

    let mut first = new_session(FileScoreStore::at(&path), 8);
    assert_eq!(first.best_score(), 0);
    score_one_and_crash(&mut first, 0.0);

    let second = new_session(FileScoreStore::at(&path), 9);
    assert_eq!(second.best_score(), 1);

    if let Some(dir) = path.parent() {
        let _ = std::fs::remove_dir_all(dir);
    }
}

#[test]
fn test_equal_score_does_not_rewrite_best() {
    let mut session = new_session(MemoryScoreStore::with_best(1), 10);
    let events = score_one_and_crash(&mut session, 0.0);
    assert!(!events.iter().any(|e| matches!(e, SessionEvent::NewBest(_))));
    assert_eq!(session.store().writes(), 0);
}

#[test]
fn test_boxed_store_works_with_session() {
    let store: Box<dyn ScoreStore> = Box::new(MemoryScoreStore::with_best(4));
    let session = new_session(store, 11);
    assert_eq!(session.best_score(), 4);
}
