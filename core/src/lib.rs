#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Worms engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired worm actions, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems such as the turn scheduler consume event
//! streams, query immutable snapshots, and respond exclusively with new
//! command batches.

use std::f64::consts::TAU;

use serde::{Deserialize, Serialize};

mod error;
mod tuning;

pub use error::{
    ConfigurationError, IllegalStateError, OutOfBoundsError, OwnershipError, WorldError,
};
pub use tuning::{Tuning, MAX_FALL_REFINEMENT_STEPS, MAX_FAN_STEPS, MIN_RADIAL_STEP_PIXELS};

/// Largest admissible world width or height.
pub const MAX_WORLD_EXTENT: f64 = f64::MAX;

/// Density shared by every spherical body, expressed in kilograms per cubic meter.
pub const BODY_DENSITY: f64 = 1062.0;

/// Smallest radius a worm may have.
pub const WORM_MIN_RADIUS: f64 = 0.25;

/// Fixed radius of a food ration.
pub const FOOD_RADIUS: f64 = 0.20;

/// Factor applied to a radius to obtain the outer edge of the terrain contact margin.
pub const ADJACENCY_MARGIN: f64 = 1.1;

/// Commands that express all permissible worm actions.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Marks the game as started; worms and food can no longer be attached.
    StartGame,
    /// Hands the turn to the provided worm.
    Activate {
        /// Worm that becomes the active worm.
        worm: ObjectId,
    },
    /// Turns a worm by the provided angle.
    Turn {
        /// Worm that turns.
        worm: ObjectId,
        /// Signed angle in radians added to the worm's direction.
        angle: f64,
    },
    /// Walks a worm one step along its facing direction.
    Move {
        /// Worm that moves.
        worm: ObjectId,
    },
    /// Lets a worm drop until it lands or leaves the world.
    Fall {
        /// Worm that falls.
        worm: ObjectId,
    },
    /// Launches a worm along a ballistic trajectory.
    Jump {
        /// Worm that jumps.
        worm: ObjectId,
        /// Sampling interval in seconds used to trace the trajectory.
        time_step: f64,
    },
    /// Cycles the worm's selected weapon.
    SelectNextWeapon {
        /// Worm whose weapon selection changes.
        worm: ObjectId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Announces that the game started.
    GameStarted,
    /// Announces that a worm received the turn.
    WormActivated {
        /// Worm that became active.
        worm: ObjectId,
    },
    /// Confirms that a worm turned.
    WormTurned {
        /// Worm that turned.
        worm: ObjectId,
        /// Direction after the turn, in `[0, 2π)`.
        direction: f64,
        /// Action points charged for the turn.
        cost: u32,
    },
    /// Confirms that a worm walked to a new position.
    WormMoved {
        /// Worm that moved.
        worm: ObjectId,
        /// Position before the step.
        from: Position,
        /// Position the step selected, before any follow-up fall.
        to: Position,
        /// Action points charged for the step.
        cost: u32,
    },
    /// Confirms that a worm fell and landed.
    WormFell {
        /// Worm that fell.
        worm: ObjectId,
        /// Position the fall started from.
        from: Position,
        /// Landing position.
        to: Position,
        /// Hit points lost on impact.
        damage: u32,
    },
    /// Confirms that a worm completed a jump.
    WormJumped {
        /// Worm that jumped.
        worm: ObjectId,
        /// Take-off position.
        from: Position,
        /// End of the sampled trajectory.
        to: Position,
    },
    /// Reports that a worm consumed a food ration.
    FoodEaten {
        /// Worm that ate.
        worm: ObjectId,
        /// Food ration that was consumed and detached.
        food: ObjectId,
        /// Worm radius after growing.
        radius: f64,
    },
    /// Reports that the worm's selected weapon changed.
    WeaponSelected {
        /// Worm holding the weapon.
        worm: ObjectId,
        /// Weapon that is now selected.
        weapon: WeaponKind,
    },
    /// Reports that a worm spent its last action point.
    ActionPointsDepleted {
        /// Worm whose action points reached zero.
        worm: ObjectId,
    },
    /// Reports that a worm lost its last hit point.
    WormDied {
        /// Worm that died.
        worm: ObjectId,
    },
    /// Reports that a worm dropped out of the terrain and was removed from the world.
    WormFellOffWorld {
        /// Worm that left the world.
        worm: ObjectId,
    },
}

/// Point in world space, measured from the bottom-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    x: f64,
    y: f64,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Horizontal coordinate.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Vertical coordinate, growing upwards.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn distance_to(self, other: Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Returns the position displaced by the provided deltas.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Reports whether both coordinates are finite numbers.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Extent of a world measured in world units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldDimensions {
    width: f64,
    height: f64,
}

impl WorldDimensions {
    /// Validates and creates world dimensions.
    ///
    /// Both extents must be finite and lie in `(0, MAX_WORLD_EXTENT]`.
    pub fn new(width: f64, height: f64) -> Result<Self, ConfigurationError> {
        if !is_valid_extent(width) {
            return Err(ConfigurationError::InvalidWidth(width));
        }
        if !is_valid_extent(height) {
            return Err(ConfigurationError::InvalidHeight(height));
        }
        Ok(Self { width, height })
    }

    /// Width of the world.
    #[must_use]
    pub const fn width(&self) -> f64 {
        self.width
    }

    /// Height of the world.
    #[must_use]
    pub const fn height(&self) -> f64 {
        self.height
    }
}

fn is_valid_extent(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value <= MAX_WORLD_EXTENT
}

/// Location of a single terrain pixel expressed as column and row indices.
///
/// Row zero is the bottom row of the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new pixel coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the pixel.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the pixel, counted from the bottom.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Unique identifier assigned to an object attached to a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Creates a new object identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier of a world; objects carry it while attached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WorldId(u32);

impl WorldId {
    /// Creates a new world identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Kinds of objects that can populate a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// Mobile creature controlled by a team.
    Worm,
    /// Stationary ration that makes worms grow.
    Food,
    /// Transient projectile fired by a weapon.
    Projectile,
}

impl ObjectKind {
    /// Reports whether objects of this kind may join a world after the game started.
    #[must_use]
    pub const fn may_join_running_game(self) -> bool {
        matches!(self, Self::Projectile)
    }
}

/// Weapons carried by worms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    /// Light, cheap weapon.
    Rifle,
    /// Heavy explosive launcher.
    Bazooka,
}

/// One of the four quadrants around a circle's center.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// Right of and above the center.
    UpperRight,
    /// Left of and above the center.
    UpperLeft,
    /// Left of and below the center.
    LowerLeft,
    /// Right of and below the center.
    LowerRight,
}

impl Quadrant {
    /// Every quadrant in counter-clockwise order starting at the upper right.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::UpperRight,
        Quadrant::UpperLeft,
        Quadrant::LowerLeft,
        Quadrant::LowerRight,
    ];

    /// Signs applied to a horizontal and vertical offset to land in this quadrant.
    #[must_use]
    pub const fn signs(self) -> (f64, f64) {
        match self {
            Self::UpperRight => (1.0, 1.0),
            Self::UpperLeft => (-1.0, 1.0),
            Self::LowerLeft => (-1.0, -1.0),
            Self::LowerRight => (1.0, -1.0),
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::UpperRight => 0,
            Self::UpperLeft => 1,
            Self::LowerLeft => 2,
            Self::LowerRight => 3,
        }
    }
}

/// Selects which quadrants participate in a terrain scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QuadrantMask([bool; 4]);

impl QuadrantMask {
    /// Every quadrant participates.
    pub const ALL: QuadrantMask = QuadrantMask([true; 4]);
    /// Only the two quadrants above the center participate.
    pub const UPPER: QuadrantMask = QuadrantMask([true, true, false, false]);
    /// Only the two quadrants below the center participate.
    pub const LOWER: QuadrantMask = QuadrantMask([false, false, true, true]);

    /// Creates a mask from flags ordered upper-right, upper-left, lower-left, lower-right.
    #[must_use]
    pub const fn new(flags: [bool; 4]) -> Self {
        Self(flags)
    }

    /// Creates a mask from an arbitrary slice.
    ///
    /// Slices that do not hold exactly four flags select every quadrant.
    #[must_use]
    pub fn from_slice(flags: &[bool]) -> Self {
        match <[bool; 4]>::try_from(flags) {
            Ok(array) => Self(array),
            Err(_) => Self::ALL,
        }
    }

    /// Reports whether the quadrant participates.
    #[must_use]
    pub const fn contains(&self, quadrant: Quadrant) -> bool {
        self.0[quadrant.index()]
    }

    /// Iterates over the participating quadrants.
    pub fn iter(self) -> impl Iterator<Item = Quadrant> {
        Quadrant::ALL
            .into_iter()
            .filter(move |quadrant| self.contains(*quadrant))
    }
}

impl Default for QuadrantMask {
    fn default() -> Self {
        Self::ALL
    }
}

/// Immutable representation of a single worm's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct WormSnapshot {
    /// Identifier allocated to the worm by the world.
    pub id: ObjectId,
    /// Display name of the worm.
    pub name: String,
    /// Center of the worm's body.
    pub position: Position,
    /// Radius of the worm's body.
    pub radius: f64,
    /// Facing direction in `[0, 2π)`.
    pub direction: f64,
    /// Remaining action points.
    pub action_points: u32,
    /// Action point ceiling derived from the worm's mass.
    pub max_action_points: u32,
    /// Remaining hit points.
    pub hit_points: u32,
    /// Hit point ceiling derived from the worm's mass.
    pub max_hit_points: u32,
    /// Indicates whether the worm is alive.
    pub alive: bool,
    /// Indicates whether the worm holds the turn.
    pub active: bool,
}

/// Read-only snapshot describing all worms within a world.
#[derive(Clone, Debug, Default)]
pub struct WormView {
    snapshots: Vec<WormSnapshot>,
}

impl WormView {
    /// Creates a new worm view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<WormSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured worm snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &WormSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot of a single worm.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&WormSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<WormSnapshot> {
        self.snapshots
    }
}

/// Maps any angle onto its representative in `[0, 2π)`.
#[must_use]
pub fn normalize_angle(angle: f64) -> f64 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Mass of a spherical body with the provided radius.
#[must_use]
pub fn mass_of(radius: f64) -> f64 {
    BODY_DENSITY * (4.0 / 3.0) * std::f64::consts::PI * radius.powi(3)
}

#[cfg(test)]
mod tests {
    use super::{
        mass_of, normalize_angle, CellCoord, ObjectId, ObjectKind, Position, Quadrant,
        QuadrantMask, WeaponKind, WorldDimensions,
    };
    use serde::{de::DeserializeOwned, Serialize};
    use std::f64::consts::{PI, TAU};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn object_id_round_trips_through_bincode() {
        assert_round_trip(&ObjectId::new(42));
    }

    #[test]
    fn cell_coord_round_trips_through_bincode() {
        assert_round_trip(&CellCoord::new(5, 7));
    }

    #[test]
    fn kinds_round_trip_through_bincode() {
        assert_round_trip(&ObjectKind::Food);
        assert_round_trip(&WeaponKind::Bazooka);
    }

    #[test]
    fn dimensions_reject_non_positive_extents() {
        assert!(WorldDimensions::new(0.0, 1.0).is_err());
        assert!(WorldDimensions::new(1.0, -3.0).is_err());
        assert!(WorldDimensions::new(f64::NAN, 1.0).is_err());
        assert!(WorldDimensions::new(f64::INFINITY, 1.0).is_err());
        assert!(WorldDimensions::new(10.36, 15.877).is_ok());
    }

    #[test]
    fn normalize_angle_wraps_into_single_turn() {
        assert!((normalize_angle(-PI / 2.0) - 3.0 * PI / 2.0).abs() < 1e-12);
        assert!(normalize_angle(TAU).abs() < 1e-12);
        assert!((normalize_angle(5.0 * PI) - PI).abs() < 1e-9);
        assert_eq!(normalize_angle(f64::NAN), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Position::new(1.0, 1.0);
        let b = Position::new(4.0, 5.0);
        assert!((a.distance_to(b) - 5.0).abs() < 1e-12);
        assert!((b.distance_to(a) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn quadrant_mask_falls_back_to_all_for_wrong_length() {
        assert_eq!(QuadrantMask::from_slice(&[true, false]), QuadrantMask::ALL);
        assert_eq!(
            QuadrantMask::from_slice(&[false, false, true, true]),
            QuadrantMask::LOWER
        );
        let lower: Vec<Quadrant> = QuadrantMask::LOWER.iter().collect();
        assert_eq!(lower, vec![Quadrant::LowerLeft, Quadrant::LowerRight]);
    }

    #[test]
    fn mass_grows_with_cube_of_radius() {
        let small = mass_of(0.5);
        let large = mass_of(1.0);
        assert!((large / small - 8.0).abs() < 1e-9);
        assert!((mass_of(1.0) - 4448.495_197_483_147).abs() < 1e-6);
    }
}
