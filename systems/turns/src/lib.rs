#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Turn scheduling system that hands the turn from worm to worm.
//!
//! The world reports depleted action points, deaths and worms leaving the
//! terrain as events. This system reacts to them by activating the next live
//! worm in identifier order, wrapping around after the last one.

use worms_core::{Command, Event, ObjectId, WormView};

/// Pure system that rotates the active worm.
#[derive(Debug, Default)]
pub struct Turns {
    current: Option<ObjectId>,
}

impl Turns {
    /// Creates a scheduler that has not handed out a turn yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Worm that received the most recent turn.
    #[must_use]
    pub const fn current(&self) -> Option<ObjectId> {
        self.current
    }

    /// Consumes world events and emits at most one activation command.
    pub fn handle(&mut self, events: &[Event], worms: &WormView, out: &mut Vec<Command>) {
        let mut turn_over = false;
        for event in events {
            match event {
                Event::GameStarted => turn_over = true,
                Event::WormActivated { worm } => {
                    self.current = Some(*worm);
                    turn_over = false;
                }
                Event::ActionPointsDepleted { worm }
                | Event::WormDied { worm }
                | Event::WormFellOffWorld { worm } => {
                    if self.current == Some(*worm) {
                        turn_over = true;
                    }
                }
                _ => {}
            }
        }

        if !turn_over || is_finished(worms) {
            return;
        }

        if let Some(worm) = self.next_worm(worms) {
            out.push(Command::Activate { worm });
        }
    }

    fn next_worm(&self, worms: &WormView) -> Option<ObjectId> {
        let mut live = worms
            .iter()
            .filter(|snapshot| snapshot.alive)
            .map(|snapshot| snapshot.id);
        match self.current {
            None => live.next(),
            Some(current) => {
                let candidates: Vec<ObjectId> = live.collect();
                candidates
                    .iter()
                    .copied()
                    .find(|id| *id > current)
                    .or_else(|| candidates.first().copied())
            }
        }
    }
}

/// Reports whether at most one live worm remains.
#[must_use]
pub fn is_finished(worms: &WormView) -> bool {
    worms.iter().filter(|snapshot| snapshot.alive).count() <= 1
}

/// The last worm standing, once the game is finished.
#[must_use]
pub fn winner(worms: &WormView) -> Option<ObjectId> {
    let mut live = worms.iter().filter(|snapshot| snapshot.alive);
    match (live.next(), live.next()) {
        (Some(snapshot), None) => Some(snapshot.id),
        _ => None,
    }
}
