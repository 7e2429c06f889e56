//! Input handling.
//!
//! Terminal events are translated into logical [`InputEvent`]s and buffered in
//! an [`InputQueue`]. The session drains the queue once at the start of each
//! tick, so input order is preserved and nothing mutates game state between
//! ticks.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::collections::VecDeque;

/// Logical actions the simulation understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Flap (Space, Up, Enter, w, k). Also starts an episode from Idle/Ended.
    Flap,
    /// Pause or resume (p, Esc).
    PauseToggle,
    /// Start over (r).
    Restart,
    /// The terminal lost focus; pauses a running episode.
    FocusLost,
}

/// What a terminal event means to the frontend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalAction {
    Game(InputEvent),
    /// Leave the program (q, Ctrl-C).
    Quit,
}

/// FIFO of pending input, drained once per tick.
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    events: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push_back(event);
    }

    /// Take every pending event in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = InputEvent> + '_ {
        self.events.drain(..)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Map a key press to an action. Releases and repeats are ignored.
pub fn map_key(key: KeyEvent) -> Option<TerminalAction> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(TerminalAction::Quit);
    }

    let event = match key.code {
        KeyCode::Char(' ')
        | KeyCode::Up
        | KeyCode::Enter
        | KeyCode::Char('w')
        | KeyCode::Char('k') => InputEvent::Flap,
        KeyCode::Char('p') | KeyCode::Esc => InputEvent::PauseToggle,
        KeyCode::Char('r') => InputEvent::Restart,
        KeyCode::Char('q') => return Some(TerminalAction::Quit),
        _ => return None,
    };
    Some(TerminalAction::Game(event))
}

/// Map any terminal event (keys, focus changes) to an action.
pub fn map_terminal_event(event: &Event) -> Option<TerminalAction> {
    match event {
        Event::Key(key) => map_key(*key),
        Event::FocusLost => Some(TerminalAction::Game(InputEvent::FocusLost)),
        _ => None,
    }
}
