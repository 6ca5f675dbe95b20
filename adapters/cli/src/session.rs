//! Couples the world with the turn scheduler and pumps events between them.

use tracing::{info, warn};
use worms_core::{Command, Event, WorldError};
use worms_system_turns::Turns;
use worms_world::{self as world, query, World};

/// Running match that keeps the world and the scheduler in lock step.
#[derive(Debug)]
pub(crate) struct Session {
    world: World,
    turns: Turns,
}

impl Session {
    /// Wraps a fully populated world whose game has not started yet.
    pub(crate) fn new(world: World) -> Self {
        Self {
            world,
            turns: Turns::new(),
        }
    }

    /// World driven by the session.
    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Applies the command and every follow-up command the scheduler issues.
    ///
    /// Returns all events in the order the world emitted them. A rejected
    /// command leaves the world untouched and reports the rejection.
    pub(crate) fn submit(&mut self, command: Command) -> Result<Vec<Event>, WorldError> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events)?;
        Ok(self.settle(events))
    }

    /// Feeds events to the scheduler until it stops issuing commands.
    ///
    /// Follow-up commands the world rejects are logged and dropped; the events
    /// emitted so far stay in the returned log.
    fn settle(&mut self, mut events: Vec<Event>) -> Vec<Event> {
        let mut log = Vec::new();
        while !events.is_empty() {
            for event in &events {
                if let Event::WormActivated { worm } = event {
                    info!(worm = worm.get(), "turn_started");
                }
            }
            let mut follow_ups = Vec::new();
            self.turns
                .handle(&events, &query::worm_view(&self.world), &mut follow_ups);
            log.append(&mut events);
            self.apply_follow_ups(follow_ups, &mut events);
        }
        log
    }

    fn apply_follow_ups(&mut self, commands: Vec<Command>, out_events: &mut Vec<Event>) {
        for command in commands {
            if let Err(error) = world::apply(&mut self.world, command.clone(), out_events) {
                warn!(?command, %error, "follow_up_rejected");
            }
        }
    }
}
