//! Error kinds raised by world construction, queries, ownership changes and worm actions.

use thiserror::Error;

use crate::{CellCoord, ObjectId, ObjectKind, Position, WorldId};

/// Invalid world, terrain or object configuration.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigurationError {
    /// The world width is not finite or lies outside `(0, MAX_WORLD_EXTENT]`.
    #[error("invalid world width {0}")]
    InvalidWidth(f64),
    /// The world height is not finite or lies outside `(0, MAX_WORLD_EXTENT]`.
    #[error("invalid world height {0}")]
    InvalidHeight(f64),
    /// The terrain holds no rows or no columns.
    #[error("terrain map must hold at least one row and one column")]
    EmptyTerrain,
    /// A terrain row differs in length from the first row.
    #[error("terrain row {row} holds {actual} pixels, expected {expected}")]
    RaggedTerrain {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },
    /// A terrain picture contains a character that is neither passable nor impassable.
    #[error("unexpected terrain character {character:?} in line {line}")]
    InvalidTerrainCharacter {
        /// Offending character.
        character: char,
        /// Zero-based line of the picture holding the character.
        line: usize,
    },
    /// A radius is not finite or lies below the lower bound of its object kind.
    #[error("radius {radius} is below the lower bound {lower_bound}")]
    InvalidRadius {
        /// Rejected radius.
        radius: f64,
        /// Smallest radius admitted for the object kind.
        lower_bound: f64,
    },
    /// A position holds a coordinate that is not a finite number.
    #[error("position ({x}, {y}) is not finite")]
    NonFinitePosition {
        /// Horizontal coordinate.
        x: f64,
        /// Vertical coordinate.
        y: f64,
    },
    /// A worm name does not start with an uppercase letter followed by letters, quotes or spaces.
    #[error("invalid worm name {0:?}")]
    InvalidName(String),
    /// A tuning constant lies outside its admissible range.
    #[error("tuning constant `{field}` has invalid value {value}")]
    InvalidTuning {
        /// Name of the offending field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },
}

/// A position or pixel lies outside the world.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum OutOfBoundsError {
    /// The position maps to no pixel of the terrain.
    #[error("position ({x}, {y}) lies outside the world")]
    Position {
        /// Horizontal coordinate.
        x: f64,
        /// Vertical coordinate.
        y: f64,
    },
    /// The pixel lies outside the terrain grid.
    #[error("pixel ({}, {}) lies outside the terrain", .0.column(), .0.row())]
    Cell(CellCoord),
}

impl OutOfBoundsError {
    /// Builds the error describing an out-of-world position.
    #[must_use]
    pub const fn position(position: Position) -> Self {
        Self::Position {
            x: position.x(),
            y: position.y(),
        }
    }
}

/// Violations of the single-world ownership rules.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum OwnershipError {
    /// The object still belongs to a world and must be detached first.
    #[error("object already belongs to world {}", .0.get())]
    AlreadyAttached(WorldId),
    /// The identifier names no member of this world.
    #[error("object {} is not a member of this world", .0.get())]
    NotAMember(ObjectId),
    /// Worms and food cannot join a game that already started.
    #[error("cannot add {0:?} objects after the game started")]
    GameStarted(ObjectKind),
    /// Every object identifier of the world has been handed out.
    #[error("world ran out of object identifiers")]
    IdentifiersExhausted,
}

/// An action was requested while its precondition does not hold.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum IllegalStateError {
    /// The worm cannot afford or perform the turn.
    #[error("worm {} cannot turn", .0.get())]
    CannotTurn(ObjectId),
    /// No step is available or affordable.
    #[error("worm {} cannot move", .0.get())]
    CannotMove(ObjectId),
    /// The worm cannot jump from its current state.
    #[error("worm {} cannot jump", .0.get())]
    CannotJump(ObjectId),
    /// The worm already rests on solid ground.
    #[error("worm {} cannot fall", .0.get())]
    CannotFall(ObjectId),
    /// The worm is dead.
    #[error("worm {} is dead", .0.get())]
    Dead(ObjectId),
    /// The object is not a worm.
    #[error("object {} is not a worm", .0.get())]
    NotAWorm(ObjectId),
    /// The game cannot start without a live worm.
    #[error("no live worm can take the first turn")]
    NoLiveWorms,
}

/// Umbrella error returned by world entry points.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum WorldError {
    /// Invalid configuration.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// Out-of-world position or pixel.
    #[error(transparent)]
    OutOfBounds(#[from] OutOfBoundsError),
    /// Ownership violation.
    #[error(transparent)]
    Ownership(#[from] OwnershipError),
    /// Precondition violation.
    #[error(transparent)]
    IllegalState(#[from] IllegalStateError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn umbrella_error_keeps_source_message() {
        let error = WorldError::from(IllegalStateError::CannotMove(ObjectId::new(3)));
        assert_eq!(error.to_string(), "worm 3 cannot move");
    }

    #[test]
    fn out_of_bounds_reports_coordinates() {
        let error = OutOfBoundsError::position(Position::new(-1.0, 2.5));
        assert_eq!(error.to_string(), "position (-1, 2.5) lies outside the world");
    }
}
