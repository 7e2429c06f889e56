//! Simulation core: clock, bird, obstacle stream, judge and session controller.
//!
//! Nothing in here touches the terminal, the filesystem or wall-clock time
//! directly. Time arrives as timestamps, randomness as an injected `Rng`, and
//! storage through the [`ScoreStore`](crate::utils::persistence::ScoreStore) port.

pub mod bird;
pub mod clock;
pub mod geometry;
pub mod judge;
pub mod pipes;
pub mod session;

pub use bird::Bird;
pub use clock::Clock;
pub use geometry::Rect;
pub use judge::{evaluate, CollisionKind, Verdict};
pub use pipes::{Pipe, PipeStream};
pub use session::{BirdView, PipeView, Session, SessionEvent, SessionState, Snapshot};
