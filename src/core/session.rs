//! Session controller.
//!
//! Owns the clock, the bird, the obstacle stream, the score and the
//! best-score port, and runs the Idle → Running → Ended cycle (with an
//! optional Paused detour). One call to [`Session::tick`] per frame: queued
//! input is applied first, then physics, then the judge.

use super::bird::Bird;
use super::clock::Clock;
use super::geometry::Rect;
use super::judge::{self, CollisionKind};
use super::pipes::PipeStream;
use crate::config::GameConfig;
use crate::input::{InputEvent, InputQueue};
use crate::utils::persistence::ScoreStore;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the first flap.
    Idle,
    Running,
    /// Frozen mid-episode; no simulation happens.
    Paused,
    /// The bird crashed. The last frame stays on screen until the next flap.
    Ended,
}

/// Something that happened during a tick, for sound and visual cues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Started,
    Flapped,
    Scored { total: u32 },
    Paused,
    Resumed,
    Crashed(CollisionKind),
    /// The finished episode beat the stored best.
    NewBest(u32),
}

/// Read-only view of the bird for renderers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BirdView {
    pub bounds: Rect,
    pub velocity: f64,
    pub rotation: f64,
    pub flapping: bool,
    pub alive: bool,
}

/// Read-only view of one pipe pair for renderers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeView {
    pub id: u64,
    pub top: Rect,
    pub bottom: Rect,
    pub scored: bool,
}

/// Everything a renderer needs, taken after a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub state: SessionState,
    pub bird: BirdView,
    pub pipes: Vec<PipeView>,
    pub score: u32,
    pub best_score: u32,
    pub playfield_width: f64,
    pub playfield_height: f64,
    pub ground_y: f64,
    /// Distance the ground has scrolled, for parallax.
    pub ground_offset: f64,
}

pub struct Session<S, R> {
    config: GameConfig,
    state: SessionState,
    clock: Clock,
    bird: Bird,
    pipes: PipeStream,
    score: u32,
    best_score: u32,
    ground_offset: f64,
    input: InputQueue,
    store: S,
    rng: R,
}

impl<S: ScoreStore, R: Rng> Session<S, R> {
    /// Create an idle session. The best score is read from `store` once, here.
    pub fn new(config: GameConfig, store: S, rng: R) -> Self {
        let best_score = store.load_best_score();
        tracing::debug!(best_score, "session created");
        Self {
            state: SessionState::Idle,
            clock: Clock::new(&config.clock),
            bird: Bird::new(&config.bird),
            pipes: PipeStream::new(&config),
            score: 0,
            best_score,
            ground_offset: 0.0,
            input: InputQueue::new(),
            store,
            rng,
            config,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn best_score(&self) -> u32 {
        self.best_score
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn bird(&self) -> &Bird {
        &self.bird
    }

    pub fn bird_mut(&mut self) -> &mut Bird {
        &mut self.bird
    }

    pub fn pipes(&self) -> &PipeStream {
        &self.pipes
    }

    pub fn pipes_mut(&mut self) -> &mut PipeStream {
        &mut self.pipes
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Pending input, applied at the start of the next tick.
    pub fn input_mut(&mut self) -> &mut InputQueue {
        &mut self.input
    }

    pub fn on_flap(&mut self) {
        self.input.push(InputEvent::Flap);
    }

    pub fn on_pause_toggle(&mut self) {
        self.input.push(InputEvent::PauseToggle);
    }

    pub fn on_restart(&mut self) {
        self.input.push(InputEvent::Restart);
    }

    pub fn on_focus_lost(&mut self) {
        self.input.push(InputEvent::FocusLost);
    }

    /// Advance one frame whose timestamp is `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        let pending: Vec<InputEvent> = self.input.drain().collect();
        let mut entered_running = false;
        for input in pending {
            entered_running |= self.apply_input(input, &mut events);
        }

        // Entering Running re-seeds the clock so idle or paused wall-time
        // never shows up as a delta.
        let delta_ms = if entered_running {
            self.clock.restart_at(now_ms);
            0.0
        } else {
            self.clock.tick(now_ms)
        };

        if self.state == SessionState::Running && delta_ms > 0.0 {
            self.step(delta_ms, &mut events);
        }
        events
    }

    /// Returns true if this input moved the session into Running.
    fn apply_input(&mut self, input: InputEvent, events: &mut Vec<SessionEvent>) -> bool {
        match (self.state, input) {
            (SessionState::Idle | SessionState::Ended, InputEvent::Flap) => {
                self.start_episode(events);
                if self.bird.flap() {
                    events.push(SessionEvent::Flapped);
                }
                true
            }
            (SessionState::Running, InputEvent::Flap) => {
                if self.bird.flap() {
                    events.push(SessionEvent::Flapped);
                }
                false
            }
            (SessionState::Running, InputEvent::PauseToggle | InputEvent::FocusLost) => {
                self.state = SessionState::Paused;
                tracing::debug!(score = self.score, "paused");
                events.push(SessionEvent::Paused);
                false
            }
            (SessionState::Paused, InputEvent::PauseToggle) => {
                self.state = SessionState::Running;
                tracing::debug!(score = self.score, "resumed");
                events.push(SessionEvent::Resumed);
                true
            }
            (SessionState::Paused, InputEvent::Restart) => {
                self.end_episode(events);
                self.start_episode(events);
                true
            }
            (SessionState::Idle | SessionState::Ended, InputEvent::Restart) => {
                self.start_episode(events);
                true
            }
            _ => false,
        }
    }

    fn step(&mut self, delta_ms: f64, events: &mut Vec<SessionEvent>) {
        let dt = self.clock.normalize(delta_ms);

        self.bird.update(dt, delta_ms);
        self.pipes.update(dt, delta_ms, &mut self.rng);
        self.ground_offset += self.config.pipes.speed * dt;

        let verdict = judge::evaluate(
            &self.bird.bounds(),
            self.pipes.pipes(),
            self.pipes.ground_y(),
            &self.config.judge,
        );

        for id in &verdict.passed {
            self.pipes.mark_scored(*id);
        }
        if verdict.score_delta > 0 {
            self.score = self.score.saturating_add(verdict.score_delta);
            events.push(SessionEvent::Scored { total: self.score });
        }

        if let Some(kind) = verdict.collision {
            tracing::debug!(?kind, score = self.score, "crashed");
            events.push(SessionEvent::Crashed(kind));
            self.end_episode(events);
        }
    }

    fn start_episode(&mut self, events: &mut Vec<SessionEvent>) {
        self.bird = Bird::new(&self.config.bird);
        self.pipes.reset();
        self.score = 0;
        self.ground_offset = 0.0;
        self.state = SessionState::Running;
        tracing::debug!(best_score = self.best_score, "episode started");
        events.push(SessionEvent::Started);
    }

    /// Freeze the episode and commit the best score.
    fn end_episode(&mut self, events: &mut Vec<SessionEvent>) {
        self.bird.kill();
        self.state = SessionState::Ended;

        if self.score > self.best_score {
            self.best_score = self.score;
            tracing::info!(best_score = self.best_score, "new best score");
            events.push(SessionEvent::NewBest(self.best_score));
            if let Err(e) = self.store.save_best_score(self.best_score) {
                tracing::warn!(error = %e, "could not persist best score");
            }
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let ground_y = self.pipes.ground_y();
        Snapshot {
            state: self.state,
            bird: BirdView {
                bounds: self.bird.bounds(),
                velocity: self.bird.velocity,
                rotation: self.bird.rotation,
                flapping: self.bird.is_flapping(),
                alive: self.bird.alive,
            },
            pipes: self
                .pipes
                .pipes()
                .iter()
                .map(|p| PipeView {
                    id: p.id,
                    top: p.top_rect(),
                    bottom: p.bottom_rect(ground_y),
                    scored: p.scored,
                })
                .collect(),
            score: self.score,
            best_score: self.best_score,
            playfield_width: self.config.playfield.width,
            playfield_height: self.config.playfield.height,
            ground_y,
            ground_offset: self.ground_offset,
        }
    }
}
