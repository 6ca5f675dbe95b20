#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Worms engine.
//!
//! The world owns the terrain and every attached object. Adapters and systems
//! mutate it exclusively through [`apply`] and read it through [`query`].

mod geometry;
mod motion;
mod objects;
mod registry;
mod terrain;
mod vitality;

use std::sync::atomic::{AtomicU32, Ordering};

use rand::Rng;
use tracing::{debug, info};
use worms_core::{
    Command, ConfigurationError, Event, IllegalStateError, ObjectId, OutOfBoundsError,
    OwnershipError, Position, Tuning, WorldDimensions, WorldError, WorldId,
};

pub use geometry::{
    is_adjacent_to_ceiling, is_adjacent_to_floor, is_adjacent_to_impassable_terrain, is_passable,
    scan_annulus,
};
pub use motion::{step_cost, turn_cost};
pub use objects::{Body, GameObject, ProjectileState, WormState};
pub use terrain::{PassableMap, Terrain};
pub use vitality::{max_points, Vitality};

use registry::ObjectRegistry;

static NEXT_WORLD_ID: AtomicU32 = AtomicU32::new(0);

/// Represents the authoritative Worms world state.
#[derive(Debug)]
pub struct World {
    id: WorldId,
    terrain: Terrain,
    tuning: Tuning,
    objects: ObjectRegistry,
    active: Option<ObjectId>,
    started: bool,
}

impl World {
    /// Creates a world with default tuning.
    #[must_use]
    pub fn new(dimensions: WorldDimensions, map: PassableMap) -> Self {
        Self::assemble(dimensions, map, Tuning::default())
    }

    /// Creates a world with the provided tuning constants.
    ///
    /// Fails when a constant lies outside the range checked by [`Tuning::validate`].
    pub fn with_tuning(
        dimensions: WorldDimensions,
        map: PassableMap,
        tuning: Tuning,
    ) -> Result<Self, ConfigurationError> {
        tuning.validate()?;
        Ok(Self::assemble(dimensions, map, tuning))
    }

    fn assemble(dimensions: WorldDimensions, map: PassableMap, tuning: Tuning) -> Self {
        let id = WorldId::new(NEXT_WORLD_ID.fetch_add(1, Ordering::Relaxed));
        debug!(
            world = id.get(),
            columns = map.columns(),
            rows = map.rows(),
            "world_created"
        );
        Self {
            id,
            terrain: Terrain::new(dimensions, map),
            tuning,
            objects: ObjectRegistry::new(),
            active: None,
            started: false,
        }
    }

    /// Identifier stamped onto every attached object.
    #[must_use]
    pub const fn id(&self) -> WorldId {
        self.id
    }

    /// Replaces the passability grid wholesale; the world extent is unchanged.
    pub fn replace_terrain(&mut self, map: PassableMap) {
        debug!(
            world = self.id.get(),
            columns = map.columns(),
            rows = map.rows(),
            "terrain_replaced"
        );
        self.terrain.replace_map(map);
    }

    /// Adds an object to the world and returns its identifier.
    ///
    /// Objects still attached to some world are rejected, as are worms and
    /// food once the game has started.
    pub fn attach(&mut self, mut object: GameObject) -> Result<ObjectId, OwnershipError> {
        if let Some(owner) = object.world() {
            return Err(OwnershipError::AlreadyAttached(owner));
        }
        let kind = object.kind();
        if self.started && !kind.may_join_running_game() {
            return Err(OwnershipError::GameStarted(kind));
        }

        object.stamp(Some(self.id));
        let id = self.objects.insert(object)?;
        debug!(world = self.id.get(), object = id.get(), kind = ?kind, "object_attached");
        Ok(id)
    }

    /// Places the object at the provided position and attaches it.
    pub fn attach_at(
        &mut self,
        mut object: GameObject,
        position: Position,
    ) -> Result<ObjectId, WorldError> {
        if !self.terrain.is_located_in_world(position, object.radius()) {
            return Err(OutOfBoundsError::position(position).into());
        }
        object.set_position(position);
        Ok(self.attach(object)?)
    }

    /// Removes an object from the world and hands it back unstamped.
    ///
    /// Detaching the active worm leaves the world without an active worm.
    pub fn detach(&mut self, id: ObjectId) -> Result<GameObject, OwnershipError> {
        let mut object = self
            .objects
            .remove(id)
            .ok_or(OwnershipError::NotAMember(id))?;
        object.stamp(None);
        if self.active == Some(id) {
            self.active = None;
        }
        debug!(world = self.id.get(), object = id.get(), "object_detached");
        Ok(object)
    }

    /// Closes the world to new worms and food.
    ///
    /// Fails when no live worm could take the first turn.
    pub fn start_game(&mut self, out_events: &mut Vec<Event>) -> Result<(), WorldError> {
        if query::live_worms(self).is_empty() {
            return Err(IllegalStateError::NoLiveWorms.into());
        }
        self.started = true;
        info!(world = self.id.get(), "game_started");
        out_events.push(Event::GameStarted);
        Ok(())
    }

    /// Searches for a spot where a body of the provided radius rests on the floor.
    ///
    /// Each attempt draws a random open position and lets it drop onto the
    /// floor below. Returns `None` when every attempt fails.
    pub fn random_floor_position<R>(
        &self,
        rng: &mut R,
        radius: f64,
        attempts: usize,
    ) -> Option<Position>
    where
        R: Rng + ?Sized,
    {
        let dimensions = self.terrain.dimensions();
        let (min_x, max_x) = (radius, dimensions.width() - radius);
        let (min_y, max_y) = (radius, dimensions.height() - radius);
        if !(radius > 0.0 && min_x <= max_x && min_y <= max_y) {
            return None;
        }

        for _ in 0..attempts {
            let candidate =
                Position::new(rng.gen_range(min_x..=max_x), rng.gen_range(min_y..=max_y));
            if !is_passable(&self.terrain, candidate, radius) {
                continue;
            }
            if is_adjacent_to_floor(&self.terrain, candidate, radius) {
                return Some(candidate);
            }
            if let Some(landing) =
                motion::landing_below(&self.terrain, &self.tuning, candidate, radius)
            {
                return Some(landing);
            }
        }
        None
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Rejected commands leave the world untouched and push no events.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    match command {
        Command::StartGame => world.start_game(out_events),
        Command::Activate { worm } => motion::activate(world, worm, out_events),
        Command::Turn { worm, angle } => motion::turn(world, worm, angle, out_events),
        Command::Move { worm } => motion::move_worm(world, worm, out_events),
        Command::Fall { worm } => motion::fall(world, worm, out_events),
        Command::Jump { worm, time_step } => motion::jump(world, worm, time_step, out_events),
        Command::SelectNextWeapon { worm } => motion::select_next_weapon(world, worm, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use worms_core::{
        ObjectId, ObjectKind, Position, Tuning, WorldDimensions, WorldError, WormView,
    };

    use super::{motion, GameObject, Terrain, World};

    /// Extent of the world in world units.
    #[must_use]
    pub fn dimensions(world: &World) -> WorldDimensions {
        world.terrain.dimensions()
    }

    /// Provides read-only access to the terrain.
    #[must_use]
    pub fn terrain(world: &World) -> &Terrain {
        &world.terrain
    }

    /// Tuning constants the world was created with.
    #[must_use]
    pub fn tuning(world: &World) -> &Tuning {
        &world.tuning
    }

    /// Looks up an attached object.
    #[must_use]
    pub fn object(world: &World, id: ObjectId) -> Option<&GameObject> {
        world.objects.get(id)
    }

    /// Identifiers of every attached object of the provided kind, in insertion order.
    #[must_use]
    pub fn objects_of_kind(world: &World, kind: ObjectKind) -> Vec<ObjectId> {
        world
            .objects
            .iter()
            .filter(|(_, object)| object.kind() == kind)
            .map(|(id, _)| id)
            .collect()
    }

    /// Objects of the provided kind whose bodies overlap the circle, in insertion order.
    #[must_use]
    pub fn overlapping(
        world: &World,
        kind: ObjectKind,
        center: Position,
        radius: f64,
    ) -> Vec<ObjectId> {
        world.objects.overlapping(kind, center, radius)
    }

    /// Captures a read-only view of every attached worm.
    #[must_use]
    pub fn worm_view(world: &World) -> WormView {
        let snapshots = world
            .objects
            .iter()
            .filter_map(|(id, object)| object.snapshot(id, world.active == Some(id)))
            .collect();
        WormView::from_snapshots(snapshots)
    }

    /// Identifiers of the attached worms that are still alive.
    #[must_use]
    pub fn live_worms(world: &World) -> Vec<ObjectId> {
        world
            .objects
            .iter()
            .filter(|(_, object)| {
                object
                    .as_worm()
                    .is_some_and(|worm| worm.vitality().is_alive())
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// Worm currently holding the turn.
    #[must_use]
    pub fn active_worm(world: &World) -> Option<ObjectId> {
        world.active
    }

    /// Reports whether the game has started.
    #[must_use]
    pub fn is_started(world: &World) -> bool {
        world.started
    }

    /// Reports whether the worm is alive.
    pub fn is_alive(world: &World, worm: ObjectId) -> Result<bool, WorldError> {
        let (_, state) = motion::lookup(world, worm)?;
        Ok(state.vitality().is_alive())
    }

    /// Reports whether the worm holds the turn.
    pub fn is_active(world: &World, worm: ObjectId) -> Result<bool, WorldError> {
        let _ = motion::lookup(world, worm)?;
        Ok(world.active == Some(worm))
    }

    /// Reports whether the worm can afford to turn by the angle.
    pub fn can_turn(world: &World, worm: ObjectId, angle: f64) -> Result<bool, WorldError> {
        motion::can_turn(world, worm, angle)
    }

    /// Reports whether the worm finds an affordable step.
    pub fn can_move(world: &World, worm: ObjectId) -> Result<bool, WorldError> {
        motion::can_move(world, worm)
    }

    /// Reports whether the worm hangs in the air.
    pub fn can_fall(world: &World, worm: ObjectId) -> Result<bool, WorldError> {
        motion::can_fall(world, worm)
    }

    /// Reports whether a jump sampled with the time step would displace the worm.
    pub fn can_jump(world: &World, worm: ObjectId, time_step: f64) -> Result<bool, WorldError> {
        motion::can_jump(world, worm, time_step)
    }
}
