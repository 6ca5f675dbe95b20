//! TOML scenario files describing a terrain, its inhabitants and a scripted match.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use rand::Rng;
use serde::Deserialize;
use tracing::debug;
use worms_core::{Command, ObjectId, Position, Tuning, WorldDimensions};
use worms_world::{GameObject, PassableMap, World};

/// Random positions drawn before a worm without coordinates is given up on.
const PLACEMENT_ATTEMPTS: usize = 1_000;

/// Sampling interval used by jumps that do not specify one.
const DEFAULT_JUMP_TIME_STEP: f64 = 0.01;

/// Match description loaded from disk.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Scenario {
    /// Horizontal extent of the world in world units.
    pub(crate) width: f64,
    /// Vertical extent of the world in world units.
    pub(crate) height: f64,
    /// Terrain picture drawn top row first, `.` passable and `#` solid.
    pub(crate) terrain: String,
    /// Overrides for the motion constants.
    #[serde(default)]
    pub(crate) tuning: Tuning,
    /// Worms attached before the game starts, in turn order.
    #[serde(default)]
    pub(crate) worms: Vec<WormEntry>,
    /// Food rations scattered over the terrain.
    #[serde(default)]
    pub(crate) food: Vec<FoodEntry>,
    /// Actions performed in sequence by whichever worm holds the turn.
    #[serde(default)]
    pub(crate) actions: Vec<Action>,
}

/// Worm listed in a scenario.
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct WormEntry {
    pub(crate) name: String,
    #[serde(default = "default_worm_radius")]
    pub(crate) radius: f64,
    /// Horizontal coordinate; omitted together with `y` for random placement.
    pub(crate) x: Option<f64>,
    pub(crate) y: Option<f64>,
    #[serde(default)]
    pub(crate) direction: f64,
}

/// Food ration listed in a scenario.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FoodEntry {
    pub(crate) x: f64,
    pub(crate) y: f64,
}

/// Scripted action applied to the active worm.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub(crate) enum Action {
    /// Turns by the signed angle in radians.
    Turn {
        /// Angle added to the facing direction.
        angle: f64,
    },
    /// Walks one step.
    Move,
    /// Drops onto the floor below.
    Fall,
    /// Jumps with every remaining action point.
    Jump {
        /// Trajectory sampling interval in seconds.
        #[serde(default = "default_jump_time_step")]
        time_step: f64,
    },
    /// Cycles the selected weapon.
    SelectNextWeapon,
}

impl Action {
    /// Binds the action to the worm that performs it.
    pub(crate) fn command(self, worm: ObjectId) -> Command {
        match self {
            Self::Turn { angle } => Command::Turn { worm, angle },
            Self::Move => Command::Move { worm },
            Self::Fall => Command::Fall { worm },
            Self::Jump { time_step } => Command::Jump { worm, time_step },
            Self::SelectNextWeapon => Command::SelectNextWeapon { worm },
        }
    }
}

impl Scenario {
    /// Reads and parses the scenario stored at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to load scenario at {}", path.display()))
    }

    /// Parses a scenario from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse scenario toml contents")
    }

    /// Builds the world described by the scenario.
    ///
    /// Worms without coordinates are dropped onto a random floor spot drawn
    /// from `rng`.
    pub(crate) fn build<R>(&self, rng: &mut R) -> Result<World>
    where
        R: Rng + ?Sized,
    {
        let dimensions =
            WorldDimensions::new(self.width, self.height).context("invalid world extent")?;
        let map = PassableMap::from_ascii(&self.terrain).context("invalid terrain picture")?;
        let mut world = World::with_tuning(dimensions, map, self.tuning.clone())
            .context("invalid tuning")?;

        for entry in &self.worms {
            let position = match (entry.x, entry.y) {
                (Some(x), Some(y)) => Position::new(x, y),
                (None, None) => world
                    .random_floor_position(rng, entry.radius, PLACEMENT_ATTEMPTS)
                    .with_context(|| format!("no floor spot fits worm {:?}", entry.name))?,
                _ => bail!("worm {:?} needs both coordinates or neither", entry.name),
            };
            let worm = GameObject::worm(
                entry.name.as_str(),
                position,
                entry.radius,
                entry.direction,
            )
            .with_context(|| format!("invalid worm {:?}", entry.name))?;
            let id = world
                .attach_at(worm, position)
                .with_context(|| format!("failed to place worm {:?}", entry.name))?;
            debug!(
                worm = id.get(),
                name = %entry.name,
                x = position.x(),
                y = position.y(),
                "worm_placed"
            );
        }

        for entry in &self.food {
            let position = Position::new(entry.x, entry.y);
            let food = GameObject::food(position).context("invalid food ration")?;
            let id = world
                .attach_at(food, position)
                .with_context(|| format!("failed to place food at ({}, {})", entry.x, entry.y))?;
            debug!(food = id.get(), x = entry.x, y = entry.y, "food_placed");
        }

        Ok(world)
    }
}

fn default_worm_radius() -> f64 {
    0.5
}

fn default_jump_time_step() -> f64 {
    DEFAULT_JUMP_TIME_STEP
}
